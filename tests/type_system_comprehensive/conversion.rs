//! The explicit conversion matrix

use dyntype::{convert, ConversionError, Known, Mark, Type, Value};

#[test]
fn identity_and_dynamic() {
    let v = Value::number(7);
    assert_eq!(convert(&v, &Type::Number).unwrap(), v);

    let wrapped = convert(&v, &Type::Dynamic).unwrap();
    assert_eq!(convert(&wrapped, &Type::Number).unwrap(), v);
}

#[test]
fn primitive_matrix() {
    assert_eq!(
        convert(&Value::number(8), &Type::String).unwrap(),
        Value::string("8")
    );
    assert_eq!(
        convert(&Value::string("8"), &Type::Number).unwrap(),
        Value::number(8)
    );
    assert_eq!(
        convert(&Value::bool(false), &Type::String).unwrap(),
        Value::string("false")
    );
    assert_eq!(
        convert(&Value::string("TRUE"), &Type::Bool).unwrap(),
        Value::bool(true)
    );
    // No implicit bool/number bridge.
    assert!(convert(&Value::bool(true), &Type::Number).is_err());
}

#[test]
fn collection_reshaping() {
    let list = Value::known(
        Type::list(Type::Number),
        Known::List(vec![Value::number(3), Value::number(3), Value::number(1)]),
    );
    let set = convert(&list, &Type::set(Type::Number)).unwrap();
    assert_eq!(set.as_set().len(), 2);

    let tuple = convert(&list, &Type::Tuple(vec![Type::Number; 3])).unwrap();
    assert_eq!(tuple.element(0), Some(&Value::number(3)));

    let wrong_arity = Type::Tuple(vec![Type::Number; 2]);
    assert!(matches!(
        convert(&list, &wrong_arity),
        Err(ConversionError::Incompatible { .. })
    ));
}

#[test]
fn object_flattens_to_map() {
    let ty = Type::object([
        ("a".to_string(), Type::Number),
        ("b".to_string(), Type::String),
    ])
    .unwrap();
    let obj = Value::known(
        ty,
        Known::Object(
            [
                ("a".to_string(), Value::number(1)),
                ("b".to_string(), Value::string("2")),
            ]
            .into(),
        ),
    );
    // Every attribute converts to string, so map(string) works.
    let map = convert(&obj, &Type::map(Type::String)).unwrap();
    assert_eq!(map.key("a"), Some(&Value::string("1")));
    // map(bool) has no conversion from "2".
    assert!(convert(&obj, &Type::map(Type::Bool)).is_err());
}

#[test]
fn null_unknown_and_marks_pass_through() {
    assert_eq!(
        convert(&Value::null(Type::Bool), &Type::String).unwrap(),
        Value::null(Type::String)
    );
    let marked = Value::number(5).mark(Mark::sensitive());
    let s = convert(&marked, &Type::String).unwrap();
    assert!(s.has_mark(&Mark::sensitive()));
}

#[test]
fn failures_name_both_types() {
    let err = convert(&Value::string("x"), &Type::list(Type::Bool)).unwrap_err();
    assert_eq!(err.to_string(), "cannot convert from string to list(bool)");
}
