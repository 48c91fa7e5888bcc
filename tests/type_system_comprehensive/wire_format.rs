//! Wire projection of types

use dyntype::{ObjectType, Type};
use serde_json::json;

#[test]
fn canonical_forms() {
    assert_eq!(Type::String.to_wire().unwrap(), json!("string"));
    assert_eq!(
        Type::map(Type::list(Type::Number)).to_wire().unwrap(),
        json!(["map", ["list", "number"]])
    );
    let ty = Type::Object(
        ObjectType::new(
            [
                ("b".to_string(), Type::Bool),
                ("a".to_string(), Type::Number),
            ],
            [],
        )
        .unwrap(),
    );
    // Attributes always render in name order.
    assert_eq!(
        serde_json::to_string(&ty.to_wire().unwrap()).unwrap(),
        r#"["object",{"a":"number","b":"bool"}]"#
    );
}

#[test]
fn parse_rejects_malformed_projections() {
    for bad in [
        json!(["list"]),
        json!(["object", "nope"]),
        json!(["set", "bogus"]),
        json!(true),
    ] {
        assert!(Type::from_wire(&bad).is_err(), "accepted {}", bad);
    }
}

#[test]
fn optional_attributes_round_trip() {
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
    let wire = ty.to_wire().unwrap();
    assert_eq!(Type::from_wire(&wire).unwrap(), ty);
}
