//! Capsule types: opaque host payloads with pluggable ops

use std::sync::Arc;

use dyntype::{
    convert, validate, CapsuleOps, CapsuleType, ConversionError, HostValue, Known, Mark,
    RawArena, Type, Value,
};

#[derive(Debug, PartialEq)]
struct Credentials {
    user: String,
}

struct CredentialOps;

impl CapsuleOps for CredentialOps {
    fn equal(&self, a: &HostValue, b: &HostValue) -> bool {
        match (a.downcast_ref::<Credentials>(), b.downcast_ref::<Credentials>()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn hash(&self, v: &HostValue) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        if let Some(c) = v.downcast_ref::<Credentials>() {
            c.user.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn convert(&self, value: &Value, target: &Type) -> Option<Value> {
        if *target != Type::String {
            return None;
        }
        let c = value.as_capsule().downcast_ref::<Credentials>()?;
        Some(Value::string(c.user.clone()))
    }
}

fn creds_type() -> Type {
    Type::Capsule(CapsuleType::with_ops::<Credentials>(
        "credentials",
        Arc::new(CredentialOps),
    ))
}

fn creds_value(ty: &Type, user: &str) -> Value {
    Value::known(
        ty.clone(),
        Known::Capsule(HostValue::new(Credentials { user: user.into() })),
    )
}

#[test]
fn custom_equality_overrides_identity() {
    let ty = creds_type();
    let a = creds_value(&ty, "ada");
    let b = creds_value(&ty, "ada");
    let c = creds_value(&ty, "bob");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn plain_capsules_use_payload_identity() {
    let ty = Type::Capsule(CapsuleType::new::<Credentials>("credentials"));
    let a = creds_value(&ty, "ada");
    let b = creds_value(&ty, "ada");
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn a_plain_capsule_type_never_equals_one_with_ops() {
    let plain = Type::Capsule(CapsuleType::new::<Credentials>("credentials"));
    assert_ne!(plain, creds_type());
}

#[test]
fn validation_checks_the_host_kind() {
    let ty = creds_type();
    let mut arena = RawArena::new();
    let ok = arena.capsule(HostValue::new(Credentials { user: "ada".into() }));
    assert!(validate(&mut arena, ok, &ty).is_ok());
    let wrong = arena.capsule(HostValue::new("not credentials".to_string()));
    assert!(validate(&mut arena, wrong, &ty).is_err());
}

#[test]
fn conversion_goes_through_the_hook() {
    let v = creds_value(&creds_type(), "ada").mark(Mark::sensitive());
    let s = convert(&v, &Type::String).unwrap();
    assert_eq!(s.as_string(), "ada");
    assert!(s.has_mark(&Mark::sensitive()));

    // The hook declines non-string targets.
    assert!(matches!(
        convert(&v, &Type::Number),
        Err(ConversionError::Incompatible { .. })
    ));

    // Without any ops, conversion fails before the hook stage.
    let plain = Type::Capsule(CapsuleType::new::<Credentials>("credentials"));
    let v = creds_value(&plain, "ada");
    assert!(matches!(
        convert(&v, &Type::String),
        Err(ConversionError::MissingConvertHook { .. })
    ));
}
