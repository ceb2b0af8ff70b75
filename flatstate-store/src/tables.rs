use flatstate_model::EntitySchema;
use flatstate_types::EntityId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::{EntitySource, StoreError, StoreResult};

/// The entity table set: schema key → id → entity.
///
/// Tables and rows keep the order in which they were first added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityTables {
    tables: IndexMap<String, IndexMap<String, Value>>,
}

impl EntityTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entity, merging it into an existing row with the schema's
    /// merge strategy.
    pub fn add(&mut self, schema: &EntitySchema, id: &EntityId, entity: Value) {
        let table = self.tables.entry(schema.key().to_string()).or_default();
        match table.get_mut(id.key().as_ref()) {
            Some(existing) => {
                trace!(schema = schema.key(), id = %id, "merging repeated entity");
                *existing = schema.merge(existing, &entity);
            }
            None => {
                table.insert(id.key().into_owned(), entity);
            }
        }
    }

    /// Stores an entity as-is, returning the row it replaced.
    pub fn insert(&mut self, schema_key: impl Into<String>, id: impl Into<String>, entity: Value) -> Option<Value> {
        self.tables.entry(schema_key.into()).or_default().insert(id.into(), entity)
    }

    pub fn table(&self, schema_key: &str) -> Option<&IndexMap<String, Value>> {
        self.tables.get(schema_key)
    }

    pub fn schema_keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Total number of entities across all tables.
    pub fn len(&self) -> usize {
        self.tables.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads tables from `{ "<schema key>": { "<id>": <entity> } }`.
    pub fn from_value(value: Value) -> StoreResult<Self> {
        let Value::Object(tables) = value else {
            return Err(StoreError::InvalidData("entity tables must be a JSON object".into()));
        };
        let mut out = Self::new();
        for (schema_key, table) in tables {
            let Value::Object(rows) = table else {
                return Err(StoreError::InvalidData(format!("table {schema_key} must be a JSON object")));
            };
            let table = out.tables.entry(schema_key).or_default();
            table.extend(rows);
        }
        Ok(out)
    }

    pub fn into_value(self) -> Value {
        Value::Object(
            self.tables
                .into_iter()
                .map(|(schema_key, rows)| (schema_key, Value::Object(rows.into_iter().collect::<Map<_, _>>())))
                .collect(),
        )
    }
}

impl EntitySource for EntityTables {
    fn get(&self, schema_key: &str, id: &str) -> Option<&Value> {
        self.tables.get(schema_key)?.get(id)
    }
}
