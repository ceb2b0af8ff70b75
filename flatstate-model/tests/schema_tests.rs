use flatstate_model::{ArraySchema, EntitySchema, Polymorphic, Schema, SchemaAttribute, SchemaError};
use serde_json::json;

// ── Array definitions ────────────────────────────────────────────

#[test]
fn list_with_one_schema_is_valid() {
    let users = EntitySchema::new("users");
    let Schema::Array(ArraySchema::List(definition)) = Schema::list(&users) else {
        panic!("expected a list schema");
    };
    let element = ArraySchema::single_schema(&definition).unwrap();
    assert_eq!(element.as_entity().unwrap().key(), "users");
}

#[test]
fn list_with_two_schemas_is_rejected() {
    let definition = vec![Schema::from(&EntitySchema::new("a")), Schema::from(&EntitySchema::new("b"))];
    let err = ArraySchema::single_schema(&definition).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArrayDefinition { found: 2 }));
    assert_eq!(
        err.to_string(),
        "expected schema definition to be a single schema, but found 2"
    );
}

#[test]
fn empty_list_is_rejected() {
    let err = ArraySchema::single_schema(&[]).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArrayDefinition { found: 0 }));
}

// ── Polymorphic resolution ───────────────────────────────────────

fn pets() -> Polymorphic {
    Polymorphic::keyed(
        [
            ("cats", Schema::from(&EntitySchema::new("cats"))),
            ("dogs", Schema::from(&EntitySchema::new("dogs"))),
        ],
        "type",
    )
}

#[test]
fn keyed_resolution_by_attribute() {
    let pets = pets();
    let (schema, key) = pets.infer(&json!({"id": 1, "type": "dogs"}), &json!(null), None).unwrap();
    assert_eq!(schema.as_entity().unwrap().key(), "dogs");
    assert_eq!(key.as_deref(), Some("dogs"));
    assert!(!pets.is_single());
}

#[test]
fn keyed_resolution_unknown_discriminator() {
    let pets = pets();
    assert!(pets.infer(&json!({"id": 1, "type": "fish"}), &json!(null), None).is_none());
    assert!(pets.infer(&json!({"id": 1}), &json!(null), None).is_none());
}

#[test]
fn numeric_discriminators_are_accepted() {
    let attribute = SchemaAttribute::from("kind");
    assert_eq!(attribute.resolve(&json!({"kind": 2}), &json!(null), None), Some("2".to_string()));
    assert_eq!(attribute.resolve(&json!({"kind": true}), &json!(null), None), None);
}

#[test]
fn resolver_function_sees_value() {
    let pets = Polymorphic::keyed_with(
        [("cats", Schema::from(&EntitySchema::new("cats")))],
        |value, _, _| value.get("meows").map(|_| "cats".to_string()),
    );
    assert_eq!(pets.schema_key(&json!({"meows": true}), &json!(null), None).as_deref(), Some("cats"));
    assert!(pets.schema_for("cats").is_some());
    assert!(pets.schema_for("dogs").is_none());
}

#[test]
fn single_schema_answers_everything_untagged() {
    let single = Polymorphic::single(&EntitySchema::new("users"));
    assert!(single.is_single());
    assert_eq!(single.schema_key(&json!({"id": 1}), &json!(null), None), None);
    let (schema, key) = single.infer(&json!({"id": 1}), &json!(null), None).unwrap();
    assert_eq!(schema.as_entity().unwrap().key(), "users");
    assert!(key.is_none());
    assert!(single.schema_for("anything").is_some());
}

// ── Constructors ─────────────────────────────────────────────────

#[test]
fn object_schema_fields() {
    let users = EntitySchema::new("users");
    let Schema::Object(object) = Schema::object([("author", Schema::from(&users))]) else {
        panic!("expected an object schema");
    };
    assert_eq!(object.fields().len(), 1);
    assert!(object.fields().contains_key("author"));
}

#[test]
fn union_and_values_wrap_polymorphic() {
    let users = EntitySchema::new("users");
    let Schema::Union(union) = Schema::union([("users", Schema::from(&users))], "type") else {
        panic!("expected a union schema");
    };
    assert!(!union.polymorphic().is_single());

    let Schema::Values(values) = Schema::values(&users) else {
        panic!("expected a values schema");
    };
    assert!(values.polymorphic().is_single());
}
