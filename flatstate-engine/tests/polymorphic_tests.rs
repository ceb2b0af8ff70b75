use flatstate_engine::{denormalize, normalize};
use flatstate_model::{EntitySchema, Polymorphic, Schema, UnionSchema, ValuesSchema};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn members() -> (Arc<EntitySchema>, Arc<EntitySchema>) {
    (EntitySchema::new("users"), EntitySchema::new("groups"))
}

fn keyed(users: &Arc<EntitySchema>, groups: &Arc<EntitySchema>) -> Polymorphic {
    Polymorphic::keyed([("users", Schema::from(users)), ("groups", Schema::from(groups))], "type")
}

// ── Unions ───────────────────────────────────────────────────────

#[test]
fn union_tags_results_with_the_schema_key() {
    let (users, groups) = members();
    let schema = Schema::object([(
        "owner",
        Schema::union([("users", Schema::from(&users)), ("groups", Schema::from(&groups))], "type"),
    )]);
    let input = json!({"owner": {"id": 1, "type": "groups", "name": "admins"}});

    let normalized = normalize(&input, &schema).unwrap();

    assert_eq!(normalized.result, json!({"owner": {"id": 1, "schema": "groups"}}));
    assert_eq!(
        normalized.entities.clone().into_value(),
        json!({"groups": {"1": {"id": 1, "type": "groups", "name": "admins"}}})
    );

    let rebuilt = denormalize(Some(&normalized.result), &schema, &normalized.entities).unwrap();
    assert_eq!(rebuilt.or_null(), input);
}

#[test]
fn union_resolver_function_picks_the_schema() {
    let (users, groups) = members();
    let union = UnionSchema::with_resolver(
        [("users", Schema::from(&users)), ("groups", Schema::from(&groups))],
        |value, _, _| {
            let key = if value.get("username").is_some() { "users" } else { "groups" };
            Some(key.to_string())
        },
    );
    let schema = Schema::list(union);
    let input = json!([{"id": 1, "username": "a"}, {"id": 1, "members": 3}]);

    let normalized = normalize(&input, &schema).unwrap();

    assert_eq!(
        normalized.result,
        json!([{"id": 1, "schema": "users"}, {"id": 1, "schema": "groups"}])
    );
    let rebuilt = denormalize(Some(&normalized.result), &schema, &normalized.entities).unwrap();
    assert_eq!(rebuilt.or_null(), input);
}

#[test]
fn unmatched_union_value_passes_through() {
    let (users, groups) = members();
    let schema = Schema::object([(
        "owner",
        Schema::union([("users", Schema::from(&users)), ("groups", Schema::from(&groups))], "type"),
    )]);
    let input = json!({"owner": {"id": 1, "type": "robots"}});

    let normalized = normalize(&input, &schema).unwrap();

    assert_eq!(normalized.result, input);
    assert!(normalized.entities.is_empty());
    let rebuilt = denormalize(Some(&normalized.result), &schema, &normalized.entities).unwrap();
    assert_eq!(rebuilt.or_null(), input);
}

// ── Polymorphic arrays ───────────────────────────────────────────

#[test]
fn polymorphic_array_spreads_over_tables() {
    let (users, groups) = members();
    let schema = Schema::array_of(keyed(&users, &groups));
    let input = json!([
        {"id": 1, "type": "users", "name": "A"},
        {"id": 1, "type": "groups", "name": "G"}
    ]);

    let normalized = normalize(&input, &schema).unwrap();

    assert_eq!(
        normalized.result,
        json!([{"id": 1, "schema": "users"}, {"id": 1, "schema": "groups"}])
    );
    assert_eq!(
        normalized.entities.clone().into_value(),
        json!({
            "users": {"1": {"id": 1, "type": "users", "name": "A"}},
            "groups": {"1": {"id": 1, "type": "groups", "name": "G"}}
        })
    );

    let rebuilt = denormalize(Some(&normalized.result), &schema, &normalized.entities).unwrap();
    assert_eq!(rebuilt.or_null(), input);
}

#[test]
fn polymorphic_array_drops_missing_members() {
    let (users, groups) = members();
    let schema = Schema::array_of(keyed(&users, &groups));
    let tables = json!({"users": {"1": {"id": 1}}});
    let result = json!([{"id": 1, "schema": "users"}, {"id": 2, "schema": "groups"}]);

    let rebuilt = denormalize(Some(&result), &schema, &tables).unwrap();

    assert_eq!(rebuilt.or_null(), json!([{"id": 1}]));
}

#[test]
fn single_schema_array_of_is_untagged() {
    let (users, _) = members();
    let schema = Schema::array_of(Polymorphic::single(&users));

    let normalized = normalize(&json!([{"id": 3}]), &schema).unwrap();

    assert_eq!(normalized.result, json!([3]));
}

// ── Values ───────────────────────────────────────────────────────

#[test]
fn keyed_values_round_trip() {
    let (users, groups) = members();
    let schema = Schema::Values(ValuesSchema::new(keyed(&users, &groups)));
    let input = json!({
        "first": {"id": 1, "type": "users"},
        "second": {"id": 1, "type": "groups"}
    });

    let normalized = normalize(&input, &schema).unwrap();

    assert_eq!(
        normalized.result,
        json!({
            "first": {"id": 1, "schema": "users"},
            "second": {"id": 1, "schema": "groups"}
        })
    );
    let rebuilt = denormalize(Some(&normalized.result), &schema, &normalized.entities).unwrap();
    assert_eq!(rebuilt.or_null(), input);
}

#[test]
fn values_of_plain_objects_round_trip() {
    let (users, _) = members();
    let schema = Schema::values(Schema::object([("owner", Schema::from(&users))]));
    let input = json!({"a": {"owner": {"id": 1}, "n": 1}, "b": {"owner": {"id": 2}, "n": 2}});

    let normalized = normalize(&input, &schema).unwrap();

    assert_eq!(normalized.result, json!({"a": {"owner": 1, "n": 1}, "b": {"owner": 2, "n": 2}}));
    let rebuilt = denormalize(Some(&normalized.result), &schema, &normalized.entities).unwrap();
    assert_eq!(rebuilt.or_null(), input);
}
