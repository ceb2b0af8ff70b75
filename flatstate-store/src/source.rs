//! The capability denormalization needs from an entity container.

use serde_json::Value;

/// Read access to entities, keyed by schema key and id.
///
/// Plain nested mappings answer [`EntitySource::get`]. Containers that are
/// addressed by path report [`EntitySource::is_immutable_container`] and answer
/// [`EntitySource::get_in`] instead. Deletion flags are always read through
/// [`EntitySource::property`].
pub trait EntitySource {
    /// Plain nested lookup: `source[schema_key][id]`.
    fn get(&self, schema_key: &str, id: &str) -> Option<&Value>;

    /// Path lookup. `[schema_key, id]` addresses an entity.
    fn get_in(&self, path: &[&str]) -> Option<&Value> {
        match path {
            [schema_key, id] => self.get(schema_key, id),
            _ => None,
        }
    }

    /// Whether lookups should go through [`EntitySource::get_in`].
    fn is_immutable_container(&self) -> bool {
        false
    }

    /// Reads a property of an entity held by this container.
    fn property<'a>(&self, entity: &'a Value, key: &str) -> Option<&'a Value> {
        entity.get(key)
    }

    /// Looks an entity up the way this container prefers.
    fn entity(&self, schema_key: &str, id: &str) -> Option<&Value> {
        if self.is_immutable_container() {
            self.get_in(&[schema_key, id])
        } else {
            self.get(schema_key, id)
        }
    }
}

impl EntitySource for Value {
    fn get(&self, schema_key: &str, id: &str) -> Option<&Value> {
        Value::get(self, schema_key).and_then(|table| Value::get(table, id))
    }
}
