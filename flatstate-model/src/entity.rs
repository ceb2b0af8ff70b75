use flatstate_types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::Schema;

/// Derives an id from `(value, parent, key)`.
pub type IdFn = Arc<dyn Fn(&Value, &Value, Option<&str>) -> Option<EntityId> + Send + Sync>;

/// Combines an existing table row with an incoming one.
pub type MergeFn = Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>;

/// Prepares a copy of the input before its nested fields are normalized.
pub type ProcessFn = Arc<dyn Fn(&Value, &Value, Option<&str>) -> Value + Send + Sync>;

/// How an entity's id is derived from its data and position.
#[derive(Clone)]
pub enum IdStrategy {
    /// Read the named attribute off the value.
    Attribute(String),
    /// Compute the id from the value, its parent and the key it sits under.
    Derive(IdFn),
}

impl Default for IdStrategy {
    fn default() -> Self {
        Self::Attribute("id".to_string())
    }
}

impl fmt::Debug for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Self::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

/// How repeated occurrences of the same id are combined during normalization.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Shallow merge; fields of the incoming occurrence overwrite existing ones.
    #[default]
    PerField,
    /// The incoming occurrence replaces the stored row.
    Replace,
    /// Existing fields win; the incoming occurrence only fills gaps.
    KeepExisting,
    /// Caller-provided merge.
    #[serde(skip)]
    Custom(MergeFn),
}

impl fmt::Debug for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerField => f.write_str("PerField"),
            Self::Replace => f.write_str("Replace"),
            Self::KeepExisting => f.write_str("KeepExisting"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for MergeStrategy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PerField, Self::PerField)
            | (Self::Replace, Self::Replace)
            | (Self::KeepExisting, Self::KeepExisting) => true,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A uniquely identified record type, stored in the table named by its key.
///
/// The field definition sits behind a lock so that schemas can be wired up
/// after construction, which is how self-referential and mutually referential
/// entity types are declared:
///
/// ```
/// use flatstate_model::{EntitySchema, Schema};
///
/// let user = EntitySchema::new("users");
/// user.define([("friends", Schema::list(user.clone()))]);
/// assert!(user.definition().contains_key("friends"));
/// ```
///
/// A schema that references itself keeps itself alive; declare schemas once
/// and share them.
pub struct EntitySchema {
    key: String,
    id: IdStrategy,
    merge: MergeStrategy,
    process: Option<ProcessFn>,
    delete_key: Option<String>,
    definition: RwLock<Arc<BTreeMap<String, Schema>>>,
}

impl EntitySchema {
    /// Creates a schema with default strategies: id attribute `"id"`,
    /// per-field merge, no delete key and an empty definition.
    pub fn new(key: impl Into<String>) -> Arc<Self> {
        Self::builder(key).build()
    }

    pub fn builder(key: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            key: key.into(),
            id: IdStrategy::default(),
            merge: MergeStrategy::default(),
            process: None,
            delete_key: None,
            definition: BTreeMap::new(),
        }
    }

    /// The schema key, i.e. the name of this entity's table.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn id_strategy(&self) -> &IdStrategy {
        &self.id
    }

    pub fn merge_strategy(&self) -> &MergeStrategy {
        &self.merge
    }

    /// Name of the property whose truthy value marks an entity as deleted.
    pub fn delete_key(&self) -> Option<&str> {
        self.delete_key.as_deref()
    }

    /// Adds (or replaces) field definitions.
    pub fn define<K, I>(&self, fields: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        let mut guard = self.definition.write().unwrap_or_else(|e| e.into_inner());
        let mut next = BTreeMap::clone(&guard);
        next.extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        *guard = Arc::new(next);
    }

    /// Snapshot of the field definitions.
    pub fn definition(&self) -> Arc<BTreeMap<String, Schema>> {
        Arc::clone(&self.definition.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Derives the id of `value`.
    ///
    /// With an attribute strategy, objects yield the attribute's value and a
    /// bare string or number is taken to be its own id.
    pub fn id_of(&self, value: &Value, parent: &Value, key: Option<&str>) -> Option<EntityId> {
        match &self.id {
            IdStrategy::Attribute(name) => match value {
                Value::Object(fields) => fields.get(name).and_then(EntityId::from_value),
                other => EntityId::from_value(other),
            },
            IdStrategy::Derive(derive) => derive(value, parent, key),
        }
    }

    /// Combines a stored row with a new occurrence of the same entity.
    pub fn merge(&self, existing: &Value, incoming: &Value) -> Value {
        match &self.merge {
            MergeStrategy::PerField => shallow_merge(existing, incoming),
            MergeStrategy::Replace => incoming.clone(),
            MergeStrategy::KeepExisting => shallow_merge(incoming, existing),
            MergeStrategy::Custom(merge) => merge(existing, incoming),
        }
    }

    /// Copy of `value` that normalization will rewrite in place.
    pub fn process(&self, value: &Value, parent: &Value, key: Option<&str>) -> Value {
        match &self.process {
            Some(process) => process(value, parent, key),
            None => value.clone(),
        }
    }
}

impl fmt::Debug for EntitySchema {
    // Definitions may point back at this schema, so only field names are shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let definition = self.definition();
        f.debug_struct("EntitySchema")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("merge", &self.merge)
            .field("delete_key", &self.delete_key)
            .field("fields", &definition.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Shallow merge: fields of `over` overwrite fields of `base`. Non-object
/// operands are not merged; `over` wins.
fn shallow_merge(base: &Value, over: &Value) -> Value {
    match (base, over) {
        (Value::Object(base), Value::Object(over)) => {
            let mut merged = base.clone();
            merged.extend(over.iter().map(|(k, v)| (k.clone(), v.clone())));
            Value::Object(merged)
        }
        _ => over.clone(),
    }
}

/// Builder for [`EntitySchema`].
pub struct EntitySchemaBuilder {
    key: String,
    id: IdStrategy,
    merge: MergeStrategy,
    process: Option<ProcessFn>,
    delete_key: Option<String>,
    definition: BTreeMap<String, Schema>,
}

impl EntitySchemaBuilder {
    /// Reads the id from the named attribute.
    pub fn id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id = IdStrategy::Attribute(name.into());
        self
    }

    /// Derives the id with a function of `(value, parent, key)`.
    pub fn id_with<F>(mut self, derive: F) -> Self
    where
        F: Fn(&Value, &Value, Option<&str>) -> Option<EntityId> + Send + Sync + 'static,
    {
        self.id = IdStrategy::Derive(Arc::new(derive));
        self
    }

    pub fn merge(mut self, strategy: MergeStrategy) -> Self {
        self.merge = strategy;
        self
    }

    pub fn merge_with<F>(self, merge: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        self.merge(MergeStrategy::Custom(Arc::new(merge)))
    }

    pub fn process_with<F>(mut self, process: F) -> Self
    where
        F: Fn(&Value, &Value, Option<&str>) -> Value + Send + Sync + 'static,
    {
        self.process = Some(Arc::new(process));
        self
    }

    pub fn delete_key(mut self, key: impl Into<String>) -> Self {
        self.delete_key = Some(key.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.definition.insert(name.into(), schema.into());
        self
    }

    pub fn build(self) -> Arc<EntitySchema> {
        Arc::new(EntitySchema {
            key: self.key,
            id: self.id,
            merge: self.merge,
            process: self.process,
            delete_key: self.delete_key,
            definition: RwLock::new(Arc::new(self.definition)),
        })
    }
}
