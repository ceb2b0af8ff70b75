//! Denormalization: result skeleton + entity source → nested tree.

use flatstate_model::{ArraySchema, EntitySchema, ObjectSchema, Polymorphic, Schema};
use flatstate_store::EntitySource;
use flatstate_types::{EntityId, is_truthy, property_order};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::{EngineResult, Resolved};

/// Rebuilds a nested tree from a result skeleton.
///
/// `None` input means there is nothing to denormalize yet and yields
/// [`Resolved::Absent`]. Unknown references resolve to `Absent` and deleted
/// ones to [`Resolved::Tombstone`]; arrays and values drop both, object fields
/// hold `null` in their place.
pub fn denormalize<S>(input: Option<&Value>, schema: &Schema, entities: &S) -> EngineResult<Resolved>
where
    S: EntitySource + ?Sized,
{
    let Some(input) = input else {
        return Ok(Resolved::Absent);
    };

    let mut denormalizer = Denormalizer {
        source: entities,
        cache: HashMap::new(),
    };
    let resolved = denormalizer.unvisit(input, schema)?;
    debug!(
        cached = denormalizer.cache.values().map(HashMap::len).sum::<usize>(),
        "denormalized input"
    );
    Ok(resolved)
}

/// Per-call denormalization state.
struct Denormalizer<'s, S: ?Sized> {
    source: &'s S,
    /// Schema key → id → reconstructed entity. While an entity is being
    /// rebuilt its slot holds the flat table record.
    cache: HashMap<String, HashMap<String, Value>>,
}

impl<'s, S> Denormalizer<'s, S>
where
    S: EntitySource + ?Sized,
{
    fn unvisit(&mut self, input: &Value, schema: &Schema) -> EngineResult<Resolved> {
        match schema {
            Schema::Object(object) => self.unvisit_object(object, input).map(Resolved::Value),
            Schema::Array(ArraySchema::List(definition)) => self.unvisit_list(definition, input),
            _ if input.is_null() => Ok(Resolved::Value(Value::Null)),
            Schema::Entity(entity) => self.unvisit_entity(entity, input),
            Schema::Array(ArraySchema::Polymorphic(polymorphic)) => self.unvisit_polymorphic_array(polymorphic, input),
            Schema::Union(union) => self.denormalize_value(union.polymorphic(), input),
            Schema::Values(values) => self.unvisit_values(values.polymorphic(), input),
        }
    }

    fn unvisit_entity(&mut self, schema: &EntitySchema, input: &Value) -> EngineResult<Resolved> {
        let source = self.source;
        let (entity, id) = if input.is_object() {
            if self.is_deleted(schema, input) {
                trace!(schema = schema.key(), "inline entity is deleted");
                return Ok(Resolved::Tombstone);
            }
            (input, schema.id_of(input, &Value::Null, None))
        } else {
            let Some(id) = EntityId::from_value(input) else {
                return Ok(Resolved::Absent);
            };
            match source.entity(schema.key(), &id.key()) {
                None => {
                    trace!(schema = schema.key(), id = %id, "entity not found");
                    return Ok(Resolved::Absent);
                }
                Some(entity) if self.is_deleted(schema, entity) => {
                    trace!(schema = schema.key(), id = %id, "entity is deleted");
                    return Ok(Resolved::Tombstone);
                }
                Some(entity) => (entity, Some(id)),
            }
        };

        if !entity.is_object() {
            return Ok(Resolved::Value(entity.clone()));
        }

        let Some(id) = id else {
            return self.unvisit_fields(schema, entity).map(Resolved::Value);
        };
        let id_key = id.key().into_owned();
        if let Some(cached) = self.cache.get(schema.key()).and_then(|table| table.get(&id_key)) {
            trace!(schema = schema.key(), id = %id, "entity resolved from cache");
            return Ok(Resolved::Value(cached.clone()));
        }

        // References reached while this entity is rebuilt see its flat record.
        self.cache
            .entry(schema.key().to_string())
            .or_default()
            .insert(id_key.clone(), entity.clone());
        let rebuilt = self.unvisit_fields(schema, entity)?;
        self.cache
            .entry(schema.key().to_string())
            .or_default()
            .insert(id_key, rebuilt.clone());
        Ok(Resolved::Value(rebuilt))
    }

    fn unvisit_fields(&mut self, schema: &EntitySchema, entity: &Value) -> EngineResult<Value> {
        let Value::Object(fields) = entity else {
            return Ok(entity.clone());
        };

        let mut out = fields.clone();
        let definition = schema.definition();
        for (field, sub) in definition.iter() {
            if let Some(child) = fields.get(field) {
                let value = self.unvisit(child, sub)?.or_null();
                out.insert(field.clone(), value);
            }
        }
        Ok(Value::Object(out))
    }

    fn unvisit_object(&mut self, schema: &ObjectSchema, input: &Value) -> EngineResult<Value> {
        let Value::Object(fields) = input else {
            return Ok(input.clone());
        };

        let mut out = fields.clone();
        for (field, sub) in schema.fields() {
            match fields.get(field) {
                None | Some(Value::Null) => {}
                Some(child) => {
                    let value = self.unvisit(child, sub)?.or_null();
                    out.insert(field.clone(), value);
                }
            }
        }
        Ok(Value::Object(out))
    }

    fn unvisit_list(&mut self, definition: &[Schema], input: &Value) -> EngineResult<Resolved> {
        let element = ArraySchema::single_schema(definition)?;
        match input {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match self.unvisit(item, element)? {
                        Resolved::Value(value) => out.push(value),
                        dropped => trace!(?dropped, "dropping array element"),
                    }
                }
                Ok(Resolved::Value(Value::Array(out)))
            }
            Value::Object(_) if element.as_entity().is_some_and(|entity| self.is_deleted(entity, input)) => {
                Ok(Resolved::Tombstone)
            }
            other => Ok(Resolved::Value(other.clone())),
        }
    }

    fn unvisit_polymorphic_array(&mut self, polymorphic: &Polymorphic, input: &Value) -> EngineResult<Resolved> {
        let Value::Array(items) = input else {
            return Ok(Resolved::Value(input.clone()));
        };

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match self.denormalize_value(polymorphic, item)? {
                Resolved::Value(value) => out.push(value),
                dropped => trace!(?dropped, "dropping array element"),
            }
        }
        Ok(Resolved::Value(Value::Array(out)))
    }

    fn unvisit_values(&mut self, polymorphic: &Polymorphic, input: &Value) -> EngineResult<Resolved> {
        let Value::Object(entries) = input else {
            return Ok(Resolved::Value(input.clone()));
        };

        let mut out = Map::new();
        for (entry_key, entry) in property_order(entries) {
            match self.denormalize_value(polymorphic, entry)? {
                Resolved::Value(value) => {
                    out.insert(entry_key.clone(), value);
                }
                dropped => trace!(key = %entry_key, ?dropped, "dropping value entry"),
            }
        }
        Ok(Resolved::Value(Value::Object(out)))
    }

    /// Reverses [`Polymorphic`] normalization. Keyed values are expected in
    /// their tagged `{ "id", "schema" }` form; anything else passes through.
    fn denormalize_value(&mut self, polymorphic: &Polymorphic, input: &Value) -> EngineResult<Resolved> {
        match polymorphic {
            Polymorphic::Single(schema) => self.unvisit(input, schema),
            Polymorphic::Keyed { .. } => {
                let Some(schema_key) = input.get("schema").and_then(Value::as_str) else {
                    return Ok(Resolved::Value(input.clone()));
                };
                let Some(schema) = polymorphic.schema_for(schema_key) else {
                    trace!(schema = schema_key, "no schema matched tagged value");
                    return Ok(Resolved::Value(input.clone()));
                };
                let id = match input.get("id") {
                    Some(id) if !id.is_null() => id,
                    _ => input,
                };
                self.unvisit(id, schema)
            }
        }
    }

    fn is_deleted(&self, schema: &EntitySchema, entity: &Value) -> bool {
        schema
            .delete_key()
            .and_then(|key| self.source.property(entity, key))
            .is_some_and(is_truthy)
    }
}
