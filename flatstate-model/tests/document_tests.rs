use flatstate_model::{ArraySchema, MergeStrategy, Schema, SchemaDocument, SchemaError, SchemaNode};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parses_entities_with_defaults() {
    let doc = SchemaDocument::from_json(r#"{ "entities": { "users": {} }, "root": "users" }"#).unwrap();
    let users = &doc.entities["users"];
    assert_eq!(users.id_attribute, "id");
    assert_eq!(users.delete_key, None);
    assert_eq!(users.merge, MergeStrategy::PerField);
    assert!(users.definition.is_empty());
    assert!(matches!(doc.root, SchemaNode::Entity(ref key) if key == "users"));
}

#[test]
fn parses_merge_strategy_names() {
    let doc = SchemaDocument::from_value(json!({
        "entities": { "users": { "merge": "keep_existing", "id_attribute": "slug" } },
        "root": ["users"]
    }))
    .unwrap();
    assert_eq!(doc.entities["users"].merge, MergeStrategy::KeepExisting);
    assert_eq!(doc.entities["users"].id_attribute, "slug");
    assert!(matches!(doc.root, SchemaNode::List(ref nodes) if nodes.len() == 1));
}

#[test]
fn rejects_malformed_json() {
    let err = SchemaDocument::from_json("{ not json").unwrap_err();
    assert!(matches!(err, SchemaError::Document(_)));
    assert!(err.to_string().contains("invalid schema document"));
}

#[test]
fn malformed_tagged_node_is_rejected() {
    let err = SchemaDocument::from_value(json!({
        "entities": { "users": {} },
        "root": { "$kind": "union", "schemas": { "users": "users" } }
    }))
    .unwrap_err();
    assert!(matches!(err, SchemaError::Document(_)));
    assert!(err.to_string().contains("attribute"));
}

#[test]
fn unknown_kind_is_rejected() {
    let err = SchemaDocument::from_value(json!({ "root": { "$kind": "tuple" } })).unwrap_err();
    assert!(matches!(err, SchemaError::Document(_)));
    assert!(err.to_string().contains("tuple"));
}

#[test]
fn scalar_node_is_rejected() {
    let err = SchemaDocument::from_value(json!({ "root": 3 })).unwrap_err();
    assert!(err.to_string().contains("found number"));
}

#[test]
fn untagged_object_is_an_object_schema() {
    let doc = SchemaDocument::from_value(json!({
        "entities": { "users": {} },
        "root": { "kind": "users" }
    }))
    .unwrap();
    assert!(matches!(doc.root, SchemaNode::Object(ref fields) if fields.contains_key("kind")));
}

// ── Building ─────────────────────────────────────────────────────

#[test]
fn builds_self_referencing_entities() {
    let doc = SchemaDocument::from_value(json!({
        "entities": {
            "users": { "delete_key": "deleted", "definition": { "friends": ["users"] } }
        },
        "root": "users"
    }))
    .unwrap();
    let schema = doc.build().unwrap();
    let users = schema.as_entity().unwrap();
    assert_eq!(users.key(), "users");
    assert_eq!(users.delete_key(), Some("deleted"));

    let definition = users.definition();
    let Schema::Array(ArraySchema::List(elements)) = &definition["friends"] else {
        panic!("expected a list schema");
    };
    let element = ArraySchema::single_schema(elements).unwrap();
    assert_eq!(element.as_entity().unwrap().key(), "users");
}

#[test]
fn builds_tagged_nodes() {
    let doc = SchemaDocument::from_value(json!({
        "entities": { "cats": {}, "dogs": {} },
        "root": {
            "pet": { "$kind": "union", "schemas": { "cats": "cats", "dogs": "dogs" }, "attribute": "type" },
            "by_name": { "$kind": "values", "schema": "cats" },
            "mixed": { "$kind": "array", "schemas": { "cats": "cats", "dogs": "dogs" }, "attribute": "type" },
            "meta": { "$kind": "object", "fields": { "owner": "dogs" } }
        }
    }))
    .unwrap();
    let Schema::Object(root) = doc.build().unwrap() else {
        panic!("expected an object schema");
    };
    assert!(matches!(root.fields()["pet"], Schema::Union(_)));
    assert!(matches!(root.fields()["by_name"], Schema::Values(ref v) if v.polymorphic().is_single()));
    assert!(matches!(root.fields()["mixed"], Schema::Array(ArraySchema::Polymorphic(_))));
    assert!(matches!(root.fields()["meta"], Schema::Object(ref o) if o.fields().contains_key("owner")));
}

#[test]
fn unknown_entity_reference_fails() {
    let doc = SchemaDocument::from_value(json!({
        "entities": { "posts": { "definition": { "author": "people" } } },
        "root": ["posts"]
    }))
    .unwrap();
    let err = doc.build().unwrap_err();
    assert!(matches!(err, SchemaError::UnknownEntity(ref key) if key == "people"));
}

#[test]
fn keyed_values_without_attribute_fails() {
    let doc = SchemaDocument::from_value(json!({
        "entities": { "cats": {} },
        "root": { "$kind": "values", "schemas": { "cats": "cats" } }
    }))
    .unwrap();
    let err = doc.build().unwrap_err();
    assert!(matches!(err, SchemaError::MissingDiscriminator { ref kind } if kind == "values"));
}

#[test]
fn polymorphic_without_schemas_fails() {
    let doc = SchemaDocument::from_value(json!({ "root": { "$kind": "array" } })).unwrap();
    let err = doc.build().unwrap_err();
    assert!(matches!(err, SchemaError::IncompletePolymorphic { ref kind } if kind == "array"));
}

#[test]
fn multi_element_list_builds_but_stays_invalid() {
    let doc = SchemaDocument::from_value(json!({
        "entities": { "a": {}, "b": {} },
        "root": ["a", "b"]
    }))
    .unwrap();
    let Schema::Array(ArraySchema::List(elements)) = doc.build().unwrap() else {
        panic!("expected a list schema");
    };
    assert!(ArraySchema::single_schema(&elements).is_err());
}
