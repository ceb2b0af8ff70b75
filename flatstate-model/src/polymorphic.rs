//! Discriminator handling shared by polymorphic arrays, unions and values.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::Schema;

/// Resolves a schema key from `(value, parent, key)`.
pub type ResolveFn = Arc<dyn Fn(&Value, &Value, Option<&str>) -> Option<String> + Send + Sync>;

/// How the schema key of a polymorphic value is found.
#[derive(Clone)]
pub enum SchemaAttribute {
    /// Read the named attribute off the value. Strings and numbers are accepted.
    Field(String),
    /// Compute the key from the value, its parent and the key it sits under.
    Resolver(ResolveFn),
}

impl SchemaAttribute {
    pub fn resolve(&self, value: &Value, parent: &Value, key: Option<&str>) -> Option<String> {
        match self {
            Self::Field(name) => match value.get(name)? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
            Self::Resolver(resolve) => resolve(value, parent, key),
        }
    }
}

impl fmt::Debug for SchemaAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<&str> for SchemaAttribute {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for SchemaAttribute {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

/// Picks the concrete schema for a value.
///
/// A `Single` schema applies to every value and leaves normalized results
/// untagged. `Keyed` schemas are chosen per value by the attribute, and the
/// normalized result is tagged as `{ "id": .., "schema": .. }` so that
/// denormalization can find the right table again.
#[derive(Clone, Debug)]
pub enum Polymorphic {
    Single(Box<Schema>),
    Keyed {
        schemas: BTreeMap<String, Schema>,
        attribute: SchemaAttribute,
    },
}

impl Polymorphic {
    pub fn single(schema: impl Into<Schema>) -> Self {
        Self::Single(Box::new(schema.into()))
    }

    pub fn keyed<K, I>(schemas: I, attribute: impl Into<SchemaAttribute>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::Keyed {
            schemas: schemas.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            attribute: attribute.into(),
        }
    }

    /// Keyed schemas resolved by a function instead of an attribute.
    pub fn keyed_with<K, I, F>(schemas: I, resolve: F) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
        F: Fn(&Value, &Value, Option<&str>) -> Option<String> + Send + Sync + 'static,
    {
        Self::keyed(schemas, SchemaAttribute::Resolver(Arc::new(resolve)))
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// The schema key a value resolves to. Always `None` for a single schema.
    pub fn schema_key(&self, value: &Value, parent: &Value, key: Option<&str>) -> Option<String> {
        match self {
            Self::Single(_) => None,
            Self::Keyed { attribute, .. } => attribute.resolve(value, parent, key),
        }
    }

    /// The concrete schema for a value, paired with the key it resolved to.
    pub fn infer(&self, value: &Value, parent: &Value, key: Option<&str>) -> Option<(&Schema, Option<String>)> {
        match self {
            Self::Single(schema) => Some((&**schema, None)),
            Self::Keyed { .. } => {
                let schema_key = self.schema_key(value, parent, key)?;
                self.schema_for(&schema_key).map(|schema| (schema, Some(schema_key)))
            }
        }
    }

    /// Looks up a member schema by key. A single schema answers every key.
    pub fn schema_for(&self, schema_key: &str) -> Option<&Schema> {
        match self {
            Self::Single(schema) => Some(&**schema),
            Self::Keyed { schemas, .. } => schemas.get(schema_key),
        }
    }
}
