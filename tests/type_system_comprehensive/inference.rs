//! Inference over raw host data
//!
//! The engine must discover the most specific type raw data supports,
//! and widen to dynamic only when the data genuinely disagrees.

use crate::common::arena_from_json;
use dyntype::{
    infer, infer_simple, InferOptions, InferenceCache, ObjectType, RawArena, SharedSchemaCache,
    Type,
};

// ============================================================================
// Shape discovery
// ============================================================================

#[test]
fn json_document_infers_to_object() {
    let (mut arena, root) = arena_from_json(r#"{"name": "web", "ports": [80, 443]}"#);
    let ty = infer_simple(&mut arena, root);
    let expected = Type::object([
        ("name".to_string(), Type::String),
        ("ports".to_string(), Type::list(Type::Number)),
    ])
    .unwrap();
    assert_eq!(ty, expected);
}

#[test]
fn mixed_elements_widen_to_dynamic() {
    let (mut arena, root) = arena_from_json(r#"[1, "a"]"#);
    assert_eq!(infer_simple(&mut arena, root), Type::list(Type::Dynamic));
}

#[test]
fn empty_containers() {
    let (mut arena, root) = arena_from_json("[]");
    assert_eq!(infer_simple(&mut arena, root), Type::list(Type::Dynamic));

    let (mut arena, root) = arena_from_json("{}");
    assert_eq!(
        infer_simple(&mut arena, root),
        Type::Object(ObjectType::empty())
    );
}

#[test]
fn non_string_keys_produce_a_map() {
    let mut arena = RawArena::new();
    let k = arena.float(1.5);
    let v = arena.bool(true);
    let map = arena.map([(k, v)]);
    assert_eq!(infer_simple(&mut arena, map), Type::map(Type::Bool));
}

#[test]
fn deeply_nested_structures() {
    let (mut arena, root) =
        arena_from_json(r#"{"servers": [{"host": "a", "port": 1}, {"host": "b", "port": 2}]}"#);
    let server = Type::object([
        ("host".to_string(), Type::String),
        ("port".to_string(), Type::Number),
    ])
    .unwrap();
    let expected = Type::object([("servers".to_string(), Type::list(server))]).unwrap();
    assert_eq!(infer_simple(&mut arena, root), expected);
}

// ============================================================================
// Memoization
// ============================================================================

#[test]
fn repeated_shapes_are_typed_once_per_pass() {
    let (mut arena, root) = arena_from_json(r#"[{"a": 1}, {"a": 2}, {"a": 3}]"#);
    let mut cache = InferenceCache::new();
    let ty = infer(&mut arena, root, &mut cache, &InferOptions::default());
    let inner = Type::object([("a".to_string(), Type::Number)]).unwrap();
    assert_eq!(ty, Type::list(inner));
    // Three structurally distinct keys at most: the three leaves vary,
    // so the per-pass cache holds an entry per distinct object shape
    // plus the outer list.
    assert!(!cache.is_empty());
}

#[test]
fn shared_cache_accumulates_across_passes() {
    let shared = SharedSchemaCache::new();
    let opts = InferOptions {
        adapter: None,
        shared: Some(&shared),
    };

    let (mut arena, root) = arena_from_json(r#"{"x": 1}"#);
    let mut cache = InferenceCache::new();
    let first = infer(&mut arena, root, &mut cache, &opts);
    let populated = shared.len();
    assert!(populated > 0);

    let (mut arena, root) = arena_from_json(r#"{"x": 99}"#);
    let mut cache = InferenceCache::new();
    let second = infer(&mut arena, root, &mut cache, &opts);
    assert_eq!(first, second);
}
