//! Validation of raw host data against types
//!
//! `validate` turns untyped arena data into a typed [`Value`] or a
//! [`ValidationError`] that names exactly where the data diverged.
//! Errors are re-raised at each container boundary with the failing
//! element's path step prepended, so the final error reads from the
//! validation root down to the fault.
//!
//! Coercions here are deliberately narrow: strings parse into bools
//! and numbers only in their strict canonical spellings, and nothing
//! is ever silently dropped or defaulted (missing optional attributes
//! become typed nulls, the one documented exception).

use dyntype_core::error::{ValidationError, ValidationErrorKind};
use dyntype_core::number::Number;
use dyntype_core::path::PathStep;
use dyntype_core::raw::{string_entries, RawArena, RawHandle, RawNode};
use dyntype_core::types::Type;
use dyntype_core::value::{Known, Value};
use unicode_normalization::UnicodeNormalization;

use crate::infer::infer_simple;

/// Hard ceiling on nesting depth. Exceeding it is a validation error,
/// never a stack overflow: validation recurses per level, so the
/// ceiling must leave the guard reachable within a default 2 MiB
/// thread stack, debug frames included.
pub const MAX_VALIDATION_DEPTH: usize = 128;

/// Validate the raw data at `handle` against `ty`.
pub fn validate(
    arena: &mut RawArena,
    handle: RawHandle,
    ty: &Type,
) -> Result<Value, ValidationError> {
    let result = validate_at(arena, handle, ty, 0);
    if let Err(err) = &result {
        tracing::debug!(
            target_type = %ty,
            path = %err.path,
            error = %err,
            "validation failed"
        );
    }
    result
}

fn validate_at(
    arena: &mut RawArena,
    handle: RawHandle,
    ty: &Type,
    depth: usize,
) -> Result<Value, ValidationError> {
    if depth > MAX_VALIDATION_DEPTH {
        return Err(ValidationError::new(
            ValidationErrorKind::Mismatch {
                expected: ty.to_string(),
                actual: "deeper nesting than supported".into(),
            },
            format!("maximum validation depth {} exceeded", MAX_VALIDATION_DEPTH),
        ));
    }

    // Already-typed values short-circuit; the engine never re-walks
    // them.
    if let RawNode::Value(v) = arena.get(handle) {
        let v = v.clone();
        return if ty.is_dynamic() {
            Ok(wrap_dynamic(v))
        } else if v.ty().usable_as(ty) {
            Ok(v)
        } else {
            Err(ValidationError::mismatch(ty.to_string(), v.ty().to_string()))
        };
    }

    if matches!(arena.get(handle), RawNode::Null) {
        return Ok(Value::null(ty.clone()));
    }

    match ty {
        Type::Bool => validate_bool(arena, handle),
        Type::Number => validate_number(arena, handle),
        Type::String => validate_string(arena, handle),
        Type::List(elem) => validate_list(arena, handle, elem, depth),
        Type::Set(elem) => validate_set(arena, handle, elem, depth),
        Type::Tuple(elems) => validate_tuple(arena, handle, ty, elems, depth),
        Type::Map(elem) => validate_map(arena, handle, elem, depth),
        Type::Object(_) => validate_object(arena, handle, ty, depth),
        Type::Dynamic => validate_dynamic(arena, handle, depth),
        Type::Capsule(_) => validate_capsule(arena, handle, ty),
    }
}

fn validate_bool(arena: &RawArena, handle: RawHandle) -> Result<Value, ValidationError> {
    match arena.get(handle) {
        RawNode::Bool(b) => Ok(Value::bool(*b)),
        RawNode::String(s) => match parse_bool_strict(s) {
            Some(b) => Ok(Value::bool(b)),
            None => Err(ValidationError::bool(format!(
                "string {:?} is not a boolean; expected \"true\", \"false\", \"1\" or \"0\"",
                s
            ))
            .with_value_repr(raw_repr(arena, handle))),
        },
        other => Err(ValidationError::bool(format!(
            "cannot validate {} as bool",
            raw_kind(other)
        ))
        .with_value_repr(raw_repr(arena, handle))),
    }
}

/// Strict boolean spellings, case-insensitive.
fn parse_bool_strict(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn validate_number(arena: &RawArena, handle: RawHandle) -> Result<Value, ValidationError> {
    match arena.get(handle) {
        RawNode::Int(i) => Ok(Value::number(*i)),
        RawNode::Float(f) => match Number::float(*f) {
            Some(n) => Ok(Value::number(n)),
            None => Err(ValidationError::number(
                "number cannot be NaN or infinite",
            )
            .with_value_repr(raw_repr(arena, handle))),
        },
        RawNode::String(s) => match Number::parse(s) {
            Some(n) => Ok(Value::number(n)),
            None => Err(ValidationError::number(format!(
                "string {:?} is not numeric",
                s
            ))
            .with_value_repr(raw_repr(arena, handle))),
        },
        other => Err(ValidationError::number(format!(
            "cannot validate {} as number",
            raw_kind(other)
        ))
        .with_value_repr(raw_repr(arena, handle))),
    }
}

fn validate_string(arena: &RawArena, handle: RawHandle) -> Result<Value, ValidationError> {
    match arena.get(handle) {
        // NFC so that equality and cache keys agree with inference.
        RawNode::String(s) => Ok(Value::string(s.nfc().collect::<String>())),
        RawNode::Bytes(b) => match std::str::from_utf8(b) {
            Ok(s) => Ok(Value::string(s.nfc().collect::<String>())),
            Err(_) => Err(ValidationError::string("bytes are not valid UTF-8")
                .with_value_repr(raw_repr(arena, handle))),
        },
        other => Err(ValidationError::string(format!(
            "cannot validate {} as string",
            raw_kind(other)
        ))
        .with_value_repr(raw_repr(arena, handle))),
    }
}

fn validate_list(
    arena: &mut RawArena,
    handle: RawHandle,
    elem: &Type,
    depth: usize,
) -> Result<Value, ValidationError> {
    let children = match arena.get(handle) {
        RawNode::List(c) | RawNode::Tuple(c) => c.clone(),
        other => {
            return Err(ValidationError::list(
                format!("cannot validate {} as list", raw_kind(other)),
                None,
            )
            .with_value_repr(raw_repr(arena, handle)));
        }
    };
    let mut out = Vec::with_capacity(children.len());
    for (i, child) in children.iter().enumerate() {
        reject_null_element(arena, *child, elem, ValidationErrorKind::List {
            length: Some(children.len()),
        })
        .map_err(|e| e.at(PathStep::Index(i)))?;
        let v = validate_at(arena, *child, elem, depth + 1)
            .map_err(|e| e.at(PathStep::Index(i)))?;
        out.push(v);
    }
    Ok(Value::known(Type::list(elem.clone()), Known::List(out)))
}

fn validate_set(
    arena: &mut RawArena,
    handle: RawHandle,
    elem: &Type,
    depth: usize,
) -> Result<Value, ValidationError> {
    let children = match arena.get(handle) {
        RawNode::Set(c) | RawNode::List(c) | RawNode::Tuple(c) => c.clone(),
        other => {
            return Err(ValidationError::set(format!(
                "cannot validate {} as set",
                raw_kind(other)
            ))
            .with_value_repr(raw_repr(arena, handle)));
        }
    };
    let mut out: Vec<Value> = Vec::with_capacity(children.len());
    for (i, child) in children.iter().enumerate() {
        reject_null_element(arena, *child, elem, ValidationErrorKind::Set)
            .map_err(|e| e.at(PathStep::Index(i)))?;
        let v = validate_at(arena, *child, elem, depth + 1)
            .map_err(|e| e.at(PathStep::Index(i)))?;
        // Sets keep distinct members; duplicates collapse silently.
        if !out.contains(&v) {
            out.push(v);
        }
    }
    Ok(Value::known(Type::set(elem.clone()), Known::Set(out)))
}

fn reject_null_element(
    arena: &RawArena,
    child: RawHandle,
    elem: &Type,
    kind: ValidationErrorKind,
) -> Result<(), ValidationError> {
    if matches!(arena.get(child), RawNode::Null) && !elem.is_dynamic() {
        return Err(ValidationError::new(
            kind,
            "null elements are not allowed here",
        ));
    }
    Ok(())
}

fn validate_tuple(
    arena: &mut RawArena,
    handle: RawHandle,
    ty: &Type,
    elems: &[Type],
    depth: usize,
) -> Result<Value, ValidationError> {
    let children = match arena.get(handle) {
        RawNode::Tuple(c) | RawNode::List(c) => c.clone(),
        other => {
            return Err(ValidationError::tuple(format!(
                "cannot validate {} as tuple",
                raw_kind(other)
            ))
            .with_value_repr(raw_repr(arena, handle)));
        }
    };
    if children.len() != elems.len() {
        return Err(ValidationError::tuple(format!(
            "expected {} elements, got {}",
            elems.len(),
            children.len()
        ))
        .with_value_repr(raw_repr(arena, handle)));
    }
    let mut out = Vec::with_capacity(elems.len());
    for (i, (child, elem)) in children.iter().zip(elems).enumerate() {
        let v = validate_at(arena, *child, elem, depth + 1)
            .map_err(|e| e.at(PathStep::Index(i)))?;
        out.push(v);
    }
    Ok(Value::known(ty.clone(), Known::Tuple(out)))
}

fn validate_map(
    arena: &mut RawArena,
    handle: RawHandle,
    elem: &Type,
    depth: usize,
) -> Result<Value, ValidationError> {
    let entries = match arena.get(handle) {
        RawNode::Map(entries) => entries.clone(),
        other => {
            return Err(ValidationError::map(format!(
                "cannot validate {} as map",
                raw_kind(other)
            ))
            .with_value_repr(raw_repr(arena, handle)));
        }
    };
    let by_name = match string_entries(arena, &entries) {
        Some(by_name) => by_name,
        None => {
            return Err(ValidationError::map("map keys must be strings")
                .with_value_repr(raw_repr(arena, handle)));
        }
    };
    let mut out = std::collections::BTreeMap::new();
    for (key, child) in by_name {
        let key: String = key.nfc().collect();
        let v = validate_at(arena, child, elem, depth + 1)
            .map_err(|e| e.at(PathStep::Key(key.clone())))?;
        out.insert(key, v);
    }
    Ok(Value::known(Type::map(elem.clone()), Known::Map(out)))
}

fn validate_object(
    arena: &mut RawArena,
    handle: RawHandle,
    ty: &Type,
    depth: usize,
) -> Result<Value, ValidationError> {
    let obj = match ty {
        Type::Object(obj) => obj.clone(),
        _ => unreachable!(),
    };
    let entries = match arena.get(handle) {
        RawNode::Map(entries) => entries.clone(),
        other => {
            return Err(ValidationError::attribute(
                "",
                format!("cannot validate {} as object", raw_kind(other)),
            )
            .with_value_repr(raw_repr(arena, handle)));
        }
    };
    let by_name = match string_entries(arena, &entries) {
        Some(by_name) => by_name,
        None => {
            return Err(ValidationError::attribute(
                "",
                "object attribute names must be strings",
            )
            .with_value_repr(raw_repr(arena, handle)));
        }
    };
    let by_name: std::collections::BTreeMap<String, RawHandle> = by_name
        .into_iter()
        .map(|(k, v)| (k.nfc().collect::<String>(), v))
        .collect();

    for name in by_name.keys() {
        if obj.attr(name).is_none() {
            return Err(ValidationError::attribute(
                name.clone(),
                format!("unexpected attribute {:?}", name),
            ));
        }
    }

    let mut out = std::collections::BTreeMap::new();
    for (name, attr_ty) in obj.attrs() {
        match by_name.get(name) {
            Some(&child) => {
                let v = validate_at(arena, child, attr_ty, depth + 1)
                    .map_err(|e| e.at(PathStep::Attr(name.clone())))?;
                out.insert(name.clone(), v);
            }
            None if obj.is_optional(name) => {
                out.insert(name.clone(), Value::null(attr_ty.clone()));
            }
            None => {
                return Err(ValidationError::attribute(
                    name.clone(),
                    format!("missing required attribute {:?}", name),
                ));
            }
        }
    }
    Ok(Value::known(ty.clone(), Known::Object(out)))
}

fn validate_dynamic(
    arena: &mut RawArena,
    handle: RawHandle,
    depth: usize,
) -> Result<Value, ValidationError> {
    let inferred = infer_simple(arena, handle);
    if inferred.is_dynamic() {
        // Nothing concrete could be discovered. Nulls were handled
        // above, so this is data the type system cannot carry.
        return Err(ValidationError::mismatch(
            "a concrete type".to_string(),
            "dynamic".to_string(),
        )
        .with_value_repr(raw_repr(arena, handle)));
    }
    let inner = validate_at(arena, handle, &inferred, depth + 1)?;
    Ok(wrap_dynamic(inner))
}

fn wrap_dynamic(inner: Value) -> Value {
    let (bare, marks) = inner.unmark();
    Value::known(Type::Dynamic, Known::Dynamic(Box::new(bare))).with_marks(marks)
}

fn validate_capsule(
    arena: &RawArena,
    handle: RawHandle,
    ty: &Type,
) -> Result<Value, ValidationError> {
    let ct = match ty {
        Type::Capsule(ct) => ct,
        _ => unreachable!(),
    };
    match arena.get(handle) {
        RawNode::Capsule(payload) if payload.kind() == ct.kind() => Ok(Value::known(
            ty.clone(),
            Known::Capsule(payload.clone()),
        )),
        RawNode::Capsule(payload) => Err(ValidationError::capsule(format!(
            "expected {} payload, got {}",
            ct.kind().name(),
            payload.kind().name()
        ))),
        other => Err(ValidationError::capsule(format!(
            "cannot validate {} as capsule",
            raw_kind(other)
        ))
        .with_value_repr(raw_repr(arena, handle))),
    }
}

fn raw_kind(node: &RawNode) -> &'static str {
    match node {
        RawNode::Null => "null",
        RawNode::Bool(_) => "bool",
        RawNode::Int(_) | RawNode::Float(_) => "number",
        RawNode::String(_) => "string",
        RawNode::Bytes(_) => "bytes",
        RawNode::List(_) => "list",
        RawNode::Tuple(_) => "tuple",
        RawNode::Set(_) => "set",
        RawNode::Map(_) => "map",
        RawNode::Capsule(_) => "capsule",
        RawNode::Value(_) => "value",
    }
}

/// Short diagnostic rendering of a raw node. Containers summarize
/// instead of recursing; the error's truncation cap bounds the rest.
fn raw_repr(arena: &RawArena, handle: RawHandle) -> String {
    match arena.get(handle) {
        RawNode::Null => "null".to_string(),
        RawNode::Bool(b) => b.to_string(),
        RawNode::Int(i) => i.to_string(),
        RawNode::Float(f) => f.to_string(),
        RawNode::String(s) => format!("{:?}", s),
        RawNode::Bytes(b) => format!("<{} bytes>", b.len()),
        RawNode::List(c) => format!("<list of {}>", c.len()),
        RawNode::Tuple(c) => format!("<tuple of {}>", c.len()),
        RawNode::Set(c) => format!("<set of {}>", c.len()),
        RawNode::Map(e) => format!("<map of {}>", e.len()),
        RawNode::Capsule(h) => format!("<{}>", h.kind().name()),
        RawNode::Value(v) => v.to_string(),
    }
}
