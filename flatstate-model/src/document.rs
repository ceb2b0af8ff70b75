//! Schemas declared as JSON.
//!
//! A document names its entity types once and refers to them by key
//! everywhere else, which is what lets entities point at themselves or at each
//! other:
//!
//! ```json
//! {
//!   "entities": {
//!     "users": { "delete_key": "deleted", "definition": { "friends": ["users"] } },
//!     "posts": { "definition": { "author": "users" } }
//!   },
//!   "root": ["posts"]
//! }
//! ```
//!
//! Node forms: a string names an entity; an array is a list declaration; an
//! object tagged with `"$kind"` (`union`, `values`, `array`, `object`) is the
//! explicit variant; any other object is an object schema.

use flatstate_types::kind_name;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    ArraySchema, EntitySchema, MergeStrategy, ObjectSchema, Polymorphic, Schema, SchemaError, SchemaResult,
    UnionSchema, ValuesSchema,
};

/// A complete schema declaration: entity types plus the root node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub entities: BTreeMap<String, EntityDeclaration>,
    pub root: SchemaNode,
}

/// Declaration of one entity type. The table key is the map key it is
/// declared under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDeclaration {
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_key: Option<String>,
    #[serde(default)]
    pub merge: MergeStrategy,
    #[serde(default)]
    pub definition: BTreeMap<String, SchemaNode>,
}

fn default_id_attribute() -> String {
    "id".to_string()
}

/// One node of a declared schema tree.
///
/// Any object carrying `"$kind"` is read as a [`TaggedNode`] and must be a
/// valid one; only objects without the tag are object schemas.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SchemaNode {
    Entity(String),
    List(Vec<SchemaNode>),
    Tagged(TaggedNode),
    Object(BTreeMap<String, SchemaNode>),
}

const KIND_TAG: &str = "$kind";

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let node = match Value::deserialize(deserializer)? {
            Value::String(key) => Self::Entity(key),
            Value::Array(nodes) => Self::List(from_node(Value::Array(nodes))?),
            Value::Object(fields) if fields.contains_key(KIND_TAG) => Self::Tagged(from_node(Value::Object(fields))?),
            Value::Object(fields) => Self::Object(from_node(Value::Object(fields))?),
            other => {
                return Err(de::Error::custom(format!(
                    "expected a schema node (string, array or object), found {}",
                    kind_name(&other)
                )));
            }
        };
        Ok(node)
    }
}

fn from_node<T, E>(value: Value) -> Result<T, E>
where
    T: serde::de::DeserializeOwned,
    E: de::Error,
{
    serde_json::from_value(value).map_err(E::custom)
}

/// Explicitly tagged schema nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "$kind", rename_all = "snake_case")]
pub enum TaggedNode {
    Union {
        schemas: BTreeMap<String, SchemaNode>,
        attribute: String,
    },
    Values {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<Box<SchemaNode>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schemas: Option<BTreeMap<String, SchemaNode>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<Box<SchemaNode>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schemas: Option<BTreeMap<String, SchemaNode>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },
    Object {
        fields: BTreeMap<String, SchemaNode>,
    },
}

type Registry = BTreeMap<String, Arc<EntitySchema>>;

impl SchemaDocument {
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> SchemaResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Builds the schema tree, linking entity references by key.
    pub fn build(&self) -> SchemaResult<Schema> {
        let registry: Registry = self
            .entities
            .iter()
            .map(|(key, decl)| (key.clone(), decl.to_schema(key)))
            .collect();

        // Definitions are attached in a second pass so references can cycle.
        for (key, decl) in &self.entities {
            let fields = decl
                .definition
                .iter()
                .map(|(field, node)| Ok((field.clone(), node.build(&registry)?)))
                .collect::<SchemaResult<Vec<_>>>()?;
            if let Some(entity) = registry.get(key) {
                entity.define(fields);
            }
        }

        self.root.build(&registry)
    }
}

impl EntityDeclaration {
    fn to_schema(&self, key: &str) -> Arc<EntitySchema> {
        let mut builder = EntitySchema::builder(key)
            .id_attribute(self.id_attribute.clone())
            .merge(self.merge.clone());
        if let Some(delete_key) = &self.delete_key {
            builder = builder.delete_key(delete_key.clone());
        }
        builder.build()
    }
}

impl SchemaNode {
    fn build(&self, registry: &Registry) -> SchemaResult<Schema> {
        match self {
            Self::Entity(key) => registry
                .get(key)
                .map(Schema::from)
                .ok_or_else(|| SchemaError::UnknownEntity(key.clone())),
            Self::List(nodes) => Ok(Schema::Array(ArraySchema::List(build_all(nodes, registry)?))),
            Self::Object(fields) => Ok(Schema::Object(build_object(fields, registry)?)),
            Self::Tagged(tagged) => tagged.build(registry),
        }
    }
}

impl TaggedNode {
    fn build(&self, registry: &Registry) -> SchemaResult<Schema> {
        match self {
            Self::Union { schemas, attribute } => Ok(Schema::Union(UnionSchema::new(
                build_map(schemas, registry)?,
                attribute.as_str(),
            ))),
            Self::Values {
                schema,
                schemas,
                attribute,
            } => Ok(Schema::Values(ValuesSchema::new(build_polymorphic(
                "values",
                schema.as_deref(),
                schemas.as_ref(),
                attribute.as_deref(),
                registry,
            )?))),
            Self::Array {
                schema,
                schemas,
                attribute,
            } => Ok(Schema::Array(ArraySchema::Polymorphic(build_polymorphic(
                "array",
                schema.as_deref(),
                schemas.as_ref(),
                attribute.as_deref(),
                registry,
            )?))),
            Self::Object { fields } => Ok(Schema::Object(build_object(fields, registry)?)),
        }
    }
}

fn build_polymorphic(
    kind: &str,
    schema: Option<&SchemaNode>,
    schemas: Option<&BTreeMap<String, SchemaNode>>,
    attribute: Option<&str>,
    registry: &Registry,
) -> SchemaResult<Polymorphic> {
    match (schemas, schema) {
        (Some(schemas), _) => {
            let attribute = attribute.ok_or_else(|| SchemaError::MissingDiscriminator { kind: kind.to_string() })?;
            Ok(Polymorphic::keyed(build_map(schemas, registry)?, attribute))
        }
        (None, Some(schema)) => Ok(Polymorphic::single(schema.build(registry)?)),
        (None, None) => Err(SchemaError::IncompletePolymorphic { kind: kind.to_string() }),
    }
}

fn build_all(nodes: &[SchemaNode], registry: &Registry) -> SchemaResult<Vec<Schema>> {
    nodes.iter().map(|node| node.build(registry)).collect()
}

fn build_map(nodes: &BTreeMap<String, SchemaNode>, registry: &Registry) -> SchemaResult<BTreeMap<String, Schema>> {
    nodes
        .iter()
        .map(|(key, node)| Ok((key.clone(), node.build(registry)?)))
        .collect()
}

fn build_object(fields: &BTreeMap<String, SchemaNode>, registry: &Registry) -> SchemaResult<ObjectSchema> {
    Ok(ObjectSchema::new(build_map(fields, registry)?))
}
