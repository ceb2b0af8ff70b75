use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{EntitySource, EntityTables, StoreError, StoreResult};

type Table = BTreeMap<String, Arc<Value>>;

/// Persistent entity tables with structural sharing.
///
/// Every update returns a new version; untouched tables and rows are shared
/// with the previous version rather than copied. Lookups are path based
/// (`get_in(["users", "1"])`), so this container reports itself as immutable
/// to the engine.
#[derive(Debug, Clone, Default)]
pub struct SharedTables {
    tables: Arc<BTreeMap<String, Arc<Table>>>,
}

impl SharedTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies a normalize result into a shared container.
    pub fn from_tables(tables: &EntityTables) -> Self {
        let mut out = BTreeMap::new();
        for schema_key in tables.schema_keys() {
            let rows = tables
                .table(schema_key)
                .into_iter()
                .flatten()
                .map(|(id, entity)| (id.clone(), Arc::new(entity.clone())))
                .collect::<Table>();
            out.insert(schema_key.to_string(), Arc::new(rows));
        }
        Self { tables: Arc::new(out) }
    }

    /// Reads tables from `{ "<schema key>": { "<id>": <entity> } }`.
    pub fn from_value(value: &Value) -> StoreResult<Self> {
        Ok(Self::from_tables(&EntityTables::from_value(value.clone())?))
    }

    /// A new version with `entity` stored at `[schema_key, id]`.
    #[must_use]
    pub fn with_entity(&self, schema_key: &str, id: &str, entity: Value) -> Self {
        let mut tables = BTreeMap::clone(&self.tables);
        let mut table = tables.get(schema_key).map(|t| Table::clone(t)).unwrap_or_default();
        table.insert(id.to_string(), Arc::new(entity));
        tables.insert(schema_key.to_string(), Arc::new(table));
        Self { tables: Arc::new(tables) }
    }

    /// A new version without the entity at `[schema_key, id]`.
    #[must_use]
    pub fn without_entity(&self, schema_key: &str, id: &str) -> Self {
        let Some(table) = self.tables.get(schema_key) else {
            return self.clone();
        };
        if !table.contains_key(id) {
            return self.clone();
        }
        let mut table = Table::clone(table);
        table.remove(id);
        let mut tables = BTreeMap::clone(&self.tables);
        tables.insert(schema_key.to_string(), Arc::new(table));
        Self { tables: Arc::new(tables) }
    }

    /// Whether both versions hold the very same table for `schema_key`.
    pub fn shares_table_with(&self, other: &Self, schema_key: &str) -> bool {
        match (self.tables.get(schema_key), other.tables.get(schema_key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Total number of entities across all tables.
    pub fn len(&self) -> usize {
        self.tables.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntitySource for SharedTables {
    fn get(&self, schema_key: &str, id: &str) -> Option<&Value> {
        self.get_in(&[schema_key, id])
    }

    /// `[schema_key, id, field, ..]`: the first two segments pick the entity,
    /// any further segments descend into it.
    fn get_in(&self, path: &[&str]) -> Option<&Value> {
        let [schema_key, id, rest @ ..] = path else {
            return None;
        };
        let entity: &Value = self.tables.get(*schema_key)?.get(*id)?;
        rest.iter().try_fold(entity, |value, segment| match value {
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            other => other.get(*segment),
        })
    }

    fn is_immutable_container(&self) -> bool {
        true
    }
}
