//! Explicit conversions between typed values
//!
//! `convert` is the only sanctioned way to move a value between types.
//! The coercion matrix is closed: identity, dynamic wrap/unwrap,
//! primitive string round-trips, collection reshaping, object-to-map
//! flattening, and capsule hooks. Anything else fails with a
//! [`ConversionError`] naming both types.
//!
//! Marks survive every conversion, including those delegated to a
//! capsule hook.

use std::collections::BTreeMap;

use dyntype_core::error::ConversionError;
use dyntype_core::number::Number;
use dyntype_core::types::Type;
use dyntype_core::value::{Known, Value, ValueState};

pub use dyntype_core::types::unify as unify_types;

/// Convert `value` to `target`.
pub fn convert(value: &Value, target: &Type) -> Result<Value, ConversionError> {
    if value.ty() == target {
        return Ok(value.clone());
    }

    let (bare, marks) = value.clone().unmark();
    let converted = convert_bare(&bare, target)?;
    Ok(converted.with_marks(marks))
}

fn convert_bare(value: &Value, target: &Type) -> Result<Value, ConversionError> {
    // Capsules own their conversions in both directions.
    if let Type::Capsule(_) = value.ty() {
        return capsule_convert(value, target);
    }
    if let Type::Capsule(_) = target {
        return capsule_convert(value, target);
    }

    // Null and unknown pass through retyped; a refinement survives.
    match value.state() {
        ValueState::Null => return Ok(Value::null(target.clone())),
        ValueState::Unknown(r) => {
            return Ok(Value::unknown_refined(target.clone(), r.clone()));
        }
        ValueState::Known(_) => {}
    }

    if target.is_dynamic() {
        return Ok(Value::known(
            Type::Dynamic,
            Known::Dynamic(Box::new(value.clone())),
        ));
    }
    if value.ty().is_dynamic() {
        // Unwrap and restart from the top so the identity short-circuit
        // (and the wrapped value's own marks) apply to the payload.
        return convert(value.as_dynamic(), target);
    }

    match (value.ty(), target) {
        (Type::Number, Type::String) => Ok(Value::string(value.as_number().to_string())),
        (Type::Bool, Type::String) => {
            Ok(Value::string(if value.as_bool() { "true" } else { "false" }))
        }
        (Type::String, Type::Number) => match Number::parse(value.as_string()) {
            Some(n) => Ok(Value::number(n)),
            None => Err(ConversionError::Unparseable {
                value: value.as_string().to_string(),
                to: "number".to_string(),
            }),
        },
        (Type::String, Type::Bool) => match value.as_string().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::bool(true)),
            "false" | "0" => Ok(Value::bool(false)),
            _ => Err(ConversionError::Unparseable {
                value: value.as_string().to_string(),
                to: "bool".to_string(),
            }),
        },

        (Type::List(_), Type::List(elem)) => {
            let elems = convert_elements(value.as_list(), elem)?;
            Ok(Value::known(target.clone(), Known::List(elems)))
        }
        (Type::Set(_), Type::List(elem)) => {
            let elems = convert_elements(value.as_set(), elem)?;
            Ok(Value::known(target.clone(), Known::List(elems)))
        }
        (Type::List(_), Type::Set(elem)) => {
            let elems = dedup(convert_elements(value.as_list(), elem)?);
            Ok(Value::known(target.clone(), Known::Set(elems)))
        }
        (Type::Set(_), Type::Set(elem)) => {
            let elems = dedup(convert_elements(value.as_set(), elem)?);
            Ok(Value::known(target.clone(), Known::Set(elems)))
        }
        (Type::Tuple(_), Type::List(elem)) => {
            let elems = convert_elements(value.as_tuple(), elem)?;
            Ok(Value::known(target.clone(), Known::List(elems)))
        }
        (Type::Tuple(_), Type::Set(elem)) => {
            let elems = dedup(convert_elements(value.as_tuple(), elem)?);
            Ok(Value::known(target.clone(), Known::Set(elems)))
        }
        (Type::List(_), Type::Tuple(elems)) => {
            let items = value.as_list();
            if items.len() != elems.len() {
                return Err(incompatible(value, target));
            }
            let items: Result<Vec<Value>, ConversionError> = items
                .iter()
                .zip(elems)
                .map(|(v, t)| convert(v, t))
                .collect();
            Ok(Value::known(target.clone(), Known::Tuple(items?)))
        }

        (Type::Object(_), Type::Map(elem)) => {
            // Objects flatten to maps when every attribute converts to
            // the element type.
            let mut out = BTreeMap::new();
            for (name, attr) in value.as_object() {
                out.insert(name.clone(), convert(attr, elem)?);
            }
            Ok(Value::known(target.clone(), Known::Map(out)))
        }

        _ => Err(incompatible(value, target)),
    }
}

fn capsule_convert(value: &Value, target: &Type) -> Result<Value, ConversionError> {
    let ct = match (value.ty(), target) {
        (Type::Capsule(ct), _) => ct,
        (_, Type::Capsule(ct)) => ct,
        _ => unreachable!(),
    };
    let ops = ct.ops().ok_or_else(|| ConversionError::MissingConvertHook {
        capsule: ct.name().to_string(),
        to: target.to_string(),
    })?;
    let converted = ops
        .convert(value, target)
        .ok_or_else(|| incompatible(value, target))?;
    if converted.ty() != target {
        return Err(ConversionError::HookWrongType {
            expected: target.to_string(),
            actual: converted.ty().to_string(),
        });
    }
    Ok(converted)
}

fn convert_elements(items: &[Value], elem: &Type) -> Result<Vec<Value>, ConversionError> {
    items.iter().map(|v| convert(v, elem)).collect()
}

fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn incompatible(value: &Value, target: &Type) -> ConversionError {
    ConversionError::Incompatible {
        from: value.ty().to_string(),
        to: target.to_string(),
    }
}
