//! Validation with path-carrying errors

use crate::common::arena_from_json;
use dyntype::{validate, ObjectType, RawArena, Type, Value};

// ============================================================================
// Happy paths
// ============================================================================

#[test]
fn json_round_trip_through_inferred_type() {
    let (mut arena, root) = arena_from_json(r#"{"name": "web", "ports": [80, 443]}"#);
    let ty = dyntype::infer_simple(&mut arena, root);
    let value = validate(&mut arena, root, &ty).unwrap();
    assert_eq!(value.attribute("name").unwrap().as_string(), "web");
    assert_eq!(
        value.attribute("ports").unwrap().element(1),
        Some(&Value::number(443))
    );
}

#[test]
fn strict_primitive_coercions() {
    let mut arena = RawArena::new();
    let h = arena.string("1");
    assert_eq!(validate(&mut arena, h, &Type::Bool).unwrap(), Value::bool(true));
    let h = arena.string("1");
    assert_eq!(validate(&mut arena, h, &Type::Number).unwrap(), Value::number(1));
    let h = arena.string("1");
    assert_eq!(validate(&mut arena, h, &Type::String).unwrap(), Value::string("1"));
}

#[test]
fn dynamic_wraps_the_concrete_value() {
    let (mut arena, root) = arena_from_json(r#"[true, false]"#);
    let v = validate(&mut arena, root, &Type::Dynamic).unwrap();
    assert!(v.ty().is_dynamic());
    assert_eq!(v.as_dynamic().ty(), &Type::list(Type::Bool));
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn element_failure_names_its_index() {
    let (mut arena, root) = arena_from_json(r#"[1, "bad", 3]"#);
    let err = validate(&mut arena, root, &Type::list(Type::Number)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "At [1]: string \"bad\" is not numeric"
    );
}

#[test]
fn nested_failure_composes_the_full_path() {
    let (mut arena, root) = arena_from_json(r#"{"servers": [{"port": 1}, {"port": "x"}]}"#);
    let server = Type::object([("port".to_string(), Type::Number)]).unwrap();
    let ty = Type::object([("servers".to_string(), Type::list(server))]).unwrap();
    let err = validate(&mut arena, root, &ty).unwrap_err();
    assert!(
        err.to_string().starts_with("At servers[1].port:"),
        "got {}",
        err
    );
    assert_eq!(err.path.len(), 3);
}

#[test]
fn error_context_is_exposed_as_pairs() {
    let (mut arena, root) = arena_from_json(r#"["fine", 42]"#);
    let err = validate(&mut arena, root, &Type::list(Type::String)).unwrap_err();
    let ctx = err.context();
    assert!(ctx.iter().any(|(k, v)| *k == "path" && v == "[1]"));
    assert!(ctx.iter().any(|(k, _)| *k == "value_repr"));
}

#[test]
fn object_attribute_policies() {
    let ty = Type::Object(
        ObjectType::new(
            [
                ("host".to_string(), Type::String),
                ("port".to_string(), Type::Number),
            ],
            ["port".to_string()],
        )
        .unwrap(),
    );

    let (mut arena, root) = arena_from_json(r#"{"host": "a"}"#);
    let v = validate(&mut arena, root, &ty).unwrap();
    assert_eq!(v.attribute("port"), Some(&Value::null(Type::Number)));

    let (mut arena, root) = arena_from_json(r#"{"host": "a", "tls": true}"#);
    assert!(validate(&mut arena, root, &ty).is_err());

    let (mut arena, root) = arena_from_json(r#"{"port": 443}"#);
    assert!(validate(&mut arena, root, &ty).is_err());
}

#[test]
fn sets_deduplicate_and_reject_nulls() {
    let (mut arena, root) = arena_from_json(r#"[1, 1, 2]"#);
    let v = validate(&mut arena, root, &Type::set(Type::Number)).unwrap();
    assert_eq!(v.as_set().len(), 2);

    let (mut arena, root) = arena_from_json(r#"[1, null]"#);
    let err = validate(&mut arena, root, &Type::set(Type::Number)).unwrap_err();
    assert!(err.to_string().starts_with("At [1]:"), "got {}", err);
}
