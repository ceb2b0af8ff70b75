//! Normalization: nested tree → entity tables and a result skeleton.

use flatstate_model::{ArraySchema, EntitySchema, ObjectSchema, Polymorphic, Schema};
use flatstate_store::EntityTables;
use flatstate_types::{is_structural, kind_name, property_order};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::{EngineError, EngineResult};

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    pub entities: EntityTables,
    pub result: Value,
}

/// Splits `input` into entity tables and a result skeleton.
///
/// `input` must be an object or an array.
pub fn normalize(input: &Value, schema: &Schema) -> EngineResult<Normalized> {
    if !is_structural(input) {
        return Err(EngineError::InvalidInput {
            found: kind_name(input).to_string(),
        });
    }

    let mut normalizer = Normalizer::default();
    let result = normalizer.visit(input, input, None, schema)?;
    debug!(
        tables = normalizer.entities.schema_keys().count(),
        entities = normalizer.entities.len(),
        "normalized input"
    );

    Ok(Normalized {
        entities: normalizer.entities,
        result,
    })
}

/// Per-call normalization state.
#[derive(Default)]
struct Normalizer {
    entities: EntityTables,
    /// Schema key → ids of the entities on the current traversal path.
    visiting: HashMap<String, HashSet<String>>,
}

impl Normalizer {
    fn visit(&mut self, value: &Value, parent: &Value, key: Option<&str>, schema: &Schema) -> EngineResult<Value> {
        if !is_structural(value) {
            return Ok(value.clone());
        }

        match schema {
            Schema::Entity(entity) => self.visit_entity(entity, value, parent, key),
            Schema::Object(object) => self.visit_object(object, value),
            Schema::Array(ArraySchema::List(definition)) => self.visit_list(definition, value, parent, key),
            Schema::Array(ArraySchema::Polymorphic(polymorphic)) => {
                self.visit_polymorphic_array(polymorphic, value, parent, key)
            }
            Schema::Union(union) => self.normalize_value(union.polymorphic(), value, parent, key),
            Schema::Values(values) => self.visit_values(values.polymorphic(), value),
        }
    }

    fn visit_entity(
        &mut self,
        schema: &EntitySchema,
        value: &Value,
        parent: &Value,
        key: Option<&str>,
    ) -> EngineResult<Value> {
        let id = schema.id_of(value, parent, key).ok_or_else(|| EngineError::MissingId {
            schema: schema.key().to_string(),
        })?;
        let id_key = id.key().into_owned();

        let on_path = self.visiting.entry(schema.key().to_string()).or_default();
        if !on_path.insert(id_key.clone()) {
            trace!(schema = schema.key(), id = %id, "entity already on the traversal path");
            return Ok(id.to_value());
        }

        let mut processed = schema.process(value, parent, key);
        if let Value::Object(fields) = &mut processed {
            let definition = schema.definition();
            for (field, sub) in definition.iter() {
                let normalized = match fields.get(field) {
                    Some(child) if is_structural(child) => self.visit(child, value, Some(field), sub)?,
                    _ => continue,
                };
                fields.insert(field.clone(), normalized);
            }
        }

        if let Some(on_path) = self.visiting.get_mut(schema.key()) {
            on_path.remove(&id_key);
        }
        self.entities.add(schema, &id, processed);
        Ok(id.to_value())
    }

    fn visit_object(&mut self, schema: &ObjectSchema, value: &Value) -> EngineResult<Value> {
        let Value::Object(fields) = value else {
            return Ok(value.clone());
        };

        let mut out = fields.clone();
        for (field, sub) in schema.fields() {
            if let Some(child) = fields.get(field) {
                let normalized = self.visit(child, value, Some(field), sub)?;
                out.insert(field.clone(), normalized);
            }
        }
        Ok(Value::Object(out))
    }

    /// Arrays hand their own parent down to their elements; the array itself
    /// carries nothing an id or discriminator could be derived from.
    fn visit_list(
        &mut self,
        definition: &[Schema],
        value: &Value,
        parent: &Value,
        key: Option<&str>,
    ) -> EngineResult<Value> {
        let element = ArraySchema::single_schema(definition)?;
        let items = sequence(value)
            .into_iter()
            .map(|item| self.visit(item, parent, key, element))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Value::Array(items))
    }

    fn visit_polymorphic_array(
        &mut self,
        polymorphic: &Polymorphic,
        value: &Value,
        parent: &Value,
        key: Option<&str>,
    ) -> EngineResult<Value> {
        let mut items = Vec::new();
        for item in sequence(value) {
            let normalized = self.normalize_value(polymorphic, item, parent, key)?;
            if !normalized.is_null() {
                items.push(normalized);
            }
        }
        Ok(Value::Array(items))
    }

    fn visit_values(&mut self, polymorphic: &Polymorphic, value: &Value) -> EngineResult<Value> {
        let Value::Object(entries) = value else {
            return Ok(value.clone());
        };

        let mut out = Map::new();
        for (entry_key, entry) in property_order(entries) {
            if entry.is_null() {
                continue;
            }
            let normalized = self.normalize_value(polymorphic, entry, value, Some(entry_key))?;
            out.insert(entry_key.clone(), normalized);
        }
        Ok(Value::Object(out))
    }

    /// Normalizes one polymorphic value. Keyed results are tagged with the
    /// schema they resolved to.
    fn normalize_value(
        &mut self,
        polymorphic: &Polymorphic,
        value: &Value,
        parent: &Value,
        key: Option<&str>,
    ) -> EngineResult<Value> {
        let Some((schema, schema_key)) = polymorphic.infer(value, parent, key) else {
            trace!(key = ?key, "no schema matched polymorphic value");
            return Ok(value.clone());
        };

        let normalized = self.visit(value, parent, key, schema)?;
        Ok(match schema_key {
            Some(schema_key) if !normalized.is_null() => json!({ "id": normalized, "schema": schema_key }),
            _ => normalized,
        })
    }
}

/// Elements of an array, or the values of an object taken as a sequence in
/// property order.
fn sequence(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(fields) => property_order(fields).into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    }
}
