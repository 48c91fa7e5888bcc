//! Property tests: inference/validation agreement and wire stability

use dyntype::{infer_simple, validate, ObjectType, RawArena, Type};
use proptest::prelude::*;

/// Finite JSON documents of bounded depth.
fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|i| serde_json::json!(i)),
        (-1e9f64..1e9f64).prop_map(|f| serde_json::json!(f)),
        "[a-z0-9]{0,8}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Types with a wire projection (everything but capsules).
fn arb_type() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::Bool),
        Just(Type::Number),
        Just(Type::String),
        Just(Type::Dynamic),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Type::list),
            inner.clone().prop_map(Type::map),
            inner.clone().prop_map(Type::set),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Type::Tuple),
            prop::collection::btree_map("[a-z]{1,5}", inner, 0..4)
                .prop_map(|m| Type::Object(ObjectType::new(m, []).unwrap())),
        ]
    })
}

proptest! {
    /// Data always validates against its own inferred type.
    #[test]
    fn validate_accepts_the_inferred_type(doc in arb_json()) {
        let mut arena = RawArena::new();
        let root = arena.json(&doc);
        let ty = infer_simple(&mut arena, root);
        let result = validate(&mut arena, root, &ty);
        prop_assert!(result.is_ok(), "{:?} failed: {:?}", doc, result.err());
    }

    /// The wire projection parses back to an equal type.
    #[test]
    fn wire_projection_round_trips(ty in arb_type()) {
        let wire = ty.to_wire().unwrap();
        prop_assert_eq!(Type::from_wire(&wire).unwrap(), ty);
    }

    /// Inference is deterministic for equal documents.
    #[test]
    fn inference_is_deterministic(doc in arb_json()) {
        let mut arena = RawArena::new();
        let first = arena.json(&doc);
        let second = arena.json(&doc);
        prop_assert_eq!(
            infer_simple(&mut arena, first),
            infer_simple(&mut arena, second)
        );
    }
}
