use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{EntitySchema, Polymorphic, SchemaAttribute, SchemaError, SchemaResult};

/// A node of a schema tree.
///
/// The engines dispatch on the variant, so every kind of subtree the engine
/// understands is listed here.
#[derive(Clone, Debug)]
pub enum Schema {
    Entity(Arc<EntitySchema>),
    Object(ObjectSchema),
    Array(ArraySchema),
    Union(UnionSchema),
    Values(ValuesSchema),
}

impl Schema {
    /// Homogeneous array of `element`.
    pub fn list(element: impl Into<Schema>) -> Self {
        Self::Array(ArraySchema::List(vec![element.into()]))
    }

    /// Plain object with the given field schemas.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::Object(ObjectSchema::new(fields))
    }

    /// Array whose element schema is resolved per element.
    pub fn array_of(polymorphic: Polymorphic) -> Self {
        Self::Array(ArraySchema::Polymorphic(polymorphic))
    }

    pub fn union<K, I>(schemas: I, attribute: impl Into<SchemaAttribute>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::Union(UnionSchema::new(schemas, attribute))
    }

    /// Dictionary whose every value uses `schema`.
    pub fn values(schema: impl Into<Schema>) -> Self {
        Self::Values(ValuesSchema::new(Polymorphic::single(schema)))
    }

    /// The entity schema, if this node is one.
    pub fn as_entity(&self) -> Option<&Arc<EntitySchema>> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }
}

impl From<Arc<EntitySchema>> for Schema {
    fn from(entity: Arc<EntitySchema>) -> Self {
        Self::Entity(entity)
    }
}

impl From<&Arc<EntitySchema>> for Schema {
    fn from(entity: &Arc<EntitySchema>) -> Self {
        Self::Entity(Arc::clone(entity))
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Self::Object(object)
    }
}

impl From<ArraySchema> for Schema {
    fn from(array: ArraySchema) -> Self {
        Self::Array(array)
    }
}

impl From<UnionSchema> for Schema {
    fn from(union: UnionSchema) -> Self {
        Self::Union(union)
    }
}

impl From<ValuesSchema> for Schema {
    fn from(values: ValuesSchema) -> Self {
        Self::Values(values)
    }
}

/// Plain structural container: declared fields are transformed, the rest pass
/// through untouched.
#[derive(Clone, Debug, Default)]
pub struct ObjectSchema {
    fields: BTreeMap<String, Schema>,
}

impl ObjectSchema {
    pub fn new<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, Schema> {
        &self.fields
    }
}

/// Repetition of one sub-schema, or of per-element resolved schemas.
#[derive(Clone, Debug)]
pub enum ArraySchema {
    /// Declared element schemas. Exactly one is valid; anything else is
    /// rejected when the array is transformed.
    List(Vec<Schema>),
    Polymorphic(Polymorphic),
}

impl ArraySchema {
    /// The single element schema of a list declaration.
    pub fn single_schema(definition: &[Schema]) -> SchemaResult<&Schema> {
        match definition {
            [element] => Ok(element),
            _ => Err(SchemaError::InvalidArrayDefinition {
                found: definition.len(),
            }),
        }
    }
}

/// A single value whose schema is picked by a discriminator.
#[derive(Clone, Debug)]
pub struct UnionSchema {
    inner: Polymorphic,
}

impl UnionSchema {
    pub fn new<K, I>(schemas: I, attribute: impl Into<SchemaAttribute>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self {
            inner: Polymorphic::keyed(schemas, attribute),
        }
    }

    pub fn with_resolver<K, I, F>(schemas: I, resolve: F) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
        F: Fn(&Value, &Value, Option<&str>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            inner: Polymorphic::keyed_with(schemas, resolve),
        }
    }

    pub fn polymorphic(&self) -> &Polymorphic {
        &self.inner
    }
}

/// Dictionary whose values share one schema, fixed or resolved per value.
#[derive(Clone, Debug)]
pub struct ValuesSchema {
    inner: Polymorphic,
}

impl ValuesSchema {
    pub fn new(inner: Polymorphic) -> Self {
        Self { inner }
    }

    pub fn polymorphic(&self) -> &Polymorphic {
        &self.inner
    }
}
