use flatstate_engine::{EngineError, denormalize, normalize};
use flatstate_model::{ArraySchema, EntitySchema, Schema, SchemaError};
use serde_json::json;

fn two_element_array() -> Schema {
    Schema::Array(ArraySchema::List(vec![
        EntitySchema::new("users").into(),
        EntitySchema::new("groups").into(),
    ]))
}

#[test]
fn normalize_rejects_multi_schema_list() {
    let err = normalize(&json!([{"id": 1}]), &two_element_array()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Schema(SchemaError::InvalidArrayDefinition { found: 2 })
    ));
}

#[test]
fn denormalize_rejects_multi_schema_list() {
    let err = denormalize(Some(&json!([1])), &two_element_array(), &json!({})).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Schema(SchemaError::InvalidArrayDefinition { found: 2 })
    ));
}

#[test]
fn empty_list_declaration_is_rejected() {
    let schema = Schema::Array(ArraySchema::List(Vec::new()));
    let err = normalize(&json!([]), &schema).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Schema(SchemaError::InvalidArrayDefinition { found: 0 })
    ));
}

#[test]
fn nested_errors_abort_the_whole_call() {
    let users = EntitySchema::new("users");
    let posts = EntitySchema::builder("posts").field("author", &users).build();
    let input = json!([{"id": 1, "author": {"name": "no id"}}]);

    let err = normalize(&input, &Schema::list(posts)).unwrap_err();

    assert!(matches!(err, EngineError::MissingId { ref schema } if schema == "users"));
}

#[test]
fn error_messages() {
    let invalid = EngineError::InvalidInput {
        found: "string".to_string(),
    };
    assert_eq!(
        invalid.to_string(),
        "unexpected input given to normalize: expected an object or array, found string"
    );

    let missing = EngineError::MissingId {
        schema: "users".to_string(),
    };
    assert_eq!(missing.to_string(), "entity of schema users has no usable id");

    let schema: EngineError = SchemaError::InvalidArrayDefinition { found: 3 }.into();
    assert_eq!(
        schema.to_string(),
        "expected schema definition to be a single schema, but found 3"
    );
}
