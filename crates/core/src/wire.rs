//! Wire projection of types
//!
//! Types serialize to a compact JSON shape shared with other tooling:
//! primitives are bare strings, containers are tagged arrays.
//!
//! ```text
//! "bool" | "number" | "string" | "dynamic"
//! ["list", T] | ["map", T] | ["set", T]
//! ["tuple", [T, ...]]
//! ["object", {"name": T, ...}] | ["object", {...}, ["optional", ...]]
//! ```
//!
//! Capsule types are host-process constructs and have no wire form.

use serde_json::{json, Value as Json};

use crate::error::ValidationError;
use crate::types::{ObjectType, Type};

impl Type {
    /// Project this type to its wire form.
    ///
    /// Object attributes render in sorted name order, so equal types
    /// project to byte-identical JSON.
    pub fn to_wire(&self) -> Result<Json, ValidationError> {
        Ok(match self {
            Type::Bool => json!("bool"),
            Type::Number => json!("number"),
            Type::String => json!("string"),
            Type::Dynamic => json!("dynamic"),
            Type::List(e) => json!(["list", e.to_wire()?]),
            Type::Map(e) => json!(["map", e.to_wire()?]),
            Type::Set(e) => json!(["set", e.to_wire()?]),
            Type::Tuple(elems) => {
                let elems: Result<Vec<Json>, ValidationError> =
                    elems.iter().map(Type::to_wire).collect();
                json!(["tuple", elems?])
            }
            Type::Object(obj) => {
                let mut attrs = serde_json::Map::new();
                for (name, ty) in obj.attrs() {
                    attrs.insert(name.clone(), ty.to_wire()?);
                }
                if obj.optional().is_empty() {
                    json!(["object", attrs])
                } else {
                    let optional: Vec<&String> = obj.optional().iter().collect();
                    json!(["object", attrs, optional])
                }
            }
            Type::Capsule(c) => {
                return Err(ValidationError::type_definition(format!(
                    "capsule type {:?} has no wire form",
                    c.name()
                )));
            }
        })
    }

    /// Parse a wire projection back into a type.
    pub fn from_wire(wire: &Json) -> Result<Type, ValidationError> {
        match wire {
            Json::String(s) => match s.as_str() {
                "bool" => Ok(Type::Bool),
                "number" => Ok(Type::Number),
                "string" => Ok(Type::String),
                "dynamic" => Ok(Type::Dynamic),
                other => Err(ValidationError::type_definition(format!(
                    "unknown primitive type name {:?}",
                    other
                ))),
            },
            Json::Array(parts) => from_wire_tagged(parts),
            other => Err(ValidationError::type_definition(format!(
                "type projection must be a string or array, got {}",
                json_kind(other)
            ))),
        }
    }
}

fn from_wire_tagged(parts: &[Json]) -> Result<Type, ValidationError> {
    let tag = match parts.first() {
        Some(Json::String(tag)) => tag.as_str(),
        _ => {
            return Err(ValidationError::type_definition(
                "type projection array must start with a tag string",
            ));
        }
    };
    match tag {
        "list" | "map" | "set" => {
            if parts.len() != 2 {
                return Err(ValidationError::type_definition(format!(
                    "{:?} projection takes exactly one element type",
                    tag
                )));
            }
            let element = Type::from_wire(&parts[1])?;
            Ok(match tag {
                "list" => Type::list(element),
                "map" => Type::map(element),
                _ => Type::set(element),
            })
        }
        "tuple" => {
            let elems = match parts.get(1) {
                Some(Json::Array(elems)) if parts.len() == 2 => elems,
                _ => {
                    return Err(ValidationError::type_definition(
                        "\"tuple\" projection takes an array of element types",
                    ));
                }
            };
            let elems: Result<Vec<Type>, ValidationError> =
                elems.iter().map(Type::from_wire).collect();
            Ok(Type::Tuple(elems?))
        }
        "object" => {
            let attrs = match parts.get(1) {
                Some(Json::Object(attrs)) => attrs,
                _ => {
                    return Err(ValidationError::type_definition(
                        "\"object\" projection takes an attribute map",
                    ));
                }
            };
            let optional: Vec<String> = match parts.get(2) {
                None => Vec::new(),
                Some(Json::Array(names)) if parts.len() == 3 => names
                    .iter()
                    .map(|n| match n {
                        Json::String(s) => Ok(s.clone()),
                        _ => Err(ValidationError::type_definition(
                            "optional attribute names must be strings",
                        )),
                    })
                    .collect::<Result<_, _>>()?,
                _ => {
                    return Err(ValidationError::type_definition(
                        "\"object\" projection takes at most attributes and optional names",
                    ));
                }
            };
            let mut fields = Vec::with_capacity(attrs.len());
            for (name, ty) in attrs {
                fields.push((name.clone(), Type::from_wire(ty)?));
            }
            Ok(Type::Object(ObjectType::new(fields, optional)?))
        }
        other => Err(ValidationError::type_definition(format!(
            "unknown type projection tag {:?}",
            other
        ))),
    }
}

fn json_kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
