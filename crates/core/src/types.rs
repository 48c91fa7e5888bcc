//! Type model
//!
//! The closed set of type constructors:
//!
//! - Primitives: `Bool`, `Number`, `String`
//! - Homogeneous collections: `List`, `Map`, `Set`
//! - Heterogeneous structures: `Tuple`, `Object`
//! - `Dynamic`, the deferred-typing wildcard
//! - `Capsule`, an opaque wrapper around host values
//!
//! Types are plain values: cheap to clone, compared structurally, and
//! hashable so they can serve as cache keys. Capsule types are the one
//! exception to pure structure; their identity includes the handler set
//! they were registered with.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use unicode_normalization::UnicodeNormalization;

use crate::capsule::CapsuleType;
use crate::error::ValidationError;

// ============================================================================
// Object schemas
// ============================================================================

/// Schema of an object type: a fixed attribute set, with a subset of
/// attributes marked optional.
///
/// Attribute names are NFC-normalized at construction so that two
/// schemas built from differently-composed Unicode spellings of the
/// same name compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    attrs: BTreeMap<String, Type>,
    optional: BTreeSet<String>,
}

impl ObjectType {
    /// Build an object schema. Fails if an attribute name is empty or
    /// an optional name is not a declared attribute.
    pub fn new(
        attrs: impl IntoIterator<Item = (String, Type)>,
        optional: impl IntoIterator<Item = String>,
    ) -> Result<Self, ValidationError> {
        let mut normalized = BTreeMap::new();
        for (name, ty) in attrs {
            let name: String = name.nfc().collect();
            if name.is_empty() {
                return Err(ValidationError::type_definition(
                    "object attribute names must be non-empty",
                ));
            }
            normalized.insert(name, ty);
        }
        let mut opt = BTreeSet::new();
        for name in optional {
            let name: String = name.nfc().collect();
            if !normalized.contains_key(&name) {
                return Err(ValidationError::type_definition(format!(
                    "optional attribute {:?} is not declared",
                    name
                )));
            }
            opt.insert(name);
        }
        Ok(ObjectType {
            attrs: normalized,
            optional: opt,
        })
    }

    /// The empty object schema.
    pub fn empty() -> Self {
        ObjectType {
            attrs: BTreeMap::new(),
            optional: BTreeSet::new(),
        }
    }

    /// Declared attributes in name order.
    pub fn attrs(&self) -> &BTreeMap<String, Type> {
        &self.attrs
    }

    /// Type of a declared attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&Type> {
        self.attrs.get(name)
    }

    /// Whether `name` is declared optional.
    pub fn is_optional(&self, name: &str) -> bool {
        self.optional.contains(name)
    }

    /// Optional attribute names in name order.
    pub fn optional(&self) -> &BTreeSet<String> {
        &self.optional
    }
}

// ============================================================================
// Type
// ============================================================================

/// A type in the dynamic type system.
#[derive(Debug, Clone)]
pub enum Type {
    /// Boolean
    Bool,
    /// Arbitrary numeric (integer or finite float)
    Number,
    /// Unicode string
    String,
    /// Ordered homogeneous sequence
    List(Box<Type>),
    /// String-keyed homogeneous mapping
    Map(Box<Type>),
    /// Unordered homogeneous collection of distinct values
    Set(Box<Type>),
    /// Fixed-arity positionally-typed sequence
    Tuple(Vec<Type>),
    /// Fixed attribute schema
    Object(ObjectType),
    /// Deferred typing; the concrete type is discovered at validation
    Dynamic,
    /// Opaque host value
    Capsule(CapsuleType),
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn map(element: Type) -> Self {
        Type::Map(Box::new(element))
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    /// Object schema with all attributes required.
    pub fn object(
        attrs: impl IntoIterator<Item = (String, Type)>,
    ) -> Result<Self, ValidationError> {
        Ok(Type::Object(ObjectType::new(attrs, [])?))
    }

    /// Short name of the type constructor, without element types.
    pub fn type_name(&self) -> &'static str {
        match self {
            Type::Bool => "bool",
            Type::Number => "number",
            Type::String => "string",
            Type::List(_) => "list",
            Type::Map(_) => "map",
            Type::Set(_) => "set",
            Type::Tuple(_) => "tuple",
            Type::Object(_) => "object",
            Type::Dynamic => "dynamic",
            Type::Capsule(_) => "capsule",
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Bool | Type::Number | Type::String)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    /// Element type of a homogeneous collection.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(e) | Type::Map(e) | Type::Set(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a value of `self` can be used where `other` is expected
    /// without conversion.
    ///
    /// `Dynamic` is permissive in both directions. Collections are
    /// covariant in their element type; tuples must match pointwise at
    /// the same arity; objects must declare the same attributes with
    /// pointwise-usable types. Capsule types are usable only as
    /// themselves (or `Dynamic`).
    pub fn usable_as(&self, other: &Type) -> bool {
        if matches!(self, Type::Dynamic) || matches!(other, Type::Dynamic) {
            return true;
        }
        match (self, other) {
            (Type::Bool, Type::Bool) => true,
            (Type::Number, Type::Number) => true,
            (Type::String, Type::String) => true,
            (Type::List(a), Type::List(b))
            | (Type::Map(a), Type::Map(b))
            | (Type::Set(a), Type::Set(b)) => a.usable_as(b),
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.usable_as(y))
            }
            (Type::Object(a), Type::Object(b)) => {
                if a.attrs.len() != b.attrs.len() {
                    return false;
                }
                a.attrs.iter().zip(&b.attrs).all(|((an, at), (bn, bt))| {
                    an == bn && at.usable_as(bt)
                }) && a.optional.is_subset(&b.optional)
            }
            (Type::Capsule(a), Type::Capsule(b)) => a.equal(b),
            _ => false,
        }
    }
}

/// Compute the single type that can represent every member of `types`.
///
/// An empty slice unifies to `Dynamic`. When all members are equal the
/// result is that type; any disagreement collapses to `Dynamic` rather
/// than inventing a structural supertype.
pub fn unify(types: &[Type]) -> Type {
    let mut iter = types.iter();
    let first = match iter.next() {
        Some(t) => t,
        None => return Type::Dynamic,
    };
    if iter.all(|t| t == first) {
        first.clone()
    } else {
        Type::Dynamic
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Bool, Type::Bool) => true,
            (Type::Number, Type::Number) => true,
            (Type::String, Type::String) => true,
            (Type::Dynamic, Type::Dynamic) => true,
            (Type::List(a), Type::List(b)) => a == b,
            (Type::Map(a), Type::Map(b)) => a == b,
            (Type::Set(a), Type::Set(b)) => a == b,
            (Type::Tuple(a), Type::Tuple(b)) => a == b,
            (Type::Object(a), Type::Object(b)) => a == b,
            (Type::Capsule(a), Type::Capsule(b)) => a.equal(b),
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Type::Bool | Type::Number | Type::String | Type::Dynamic => {}
            Type::List(e) | Type::Map(e) | Type::Set(e) => e.hash(state),
            Type::Tuple(elems) => elems.hash(state),
            Type::Object(obj) => {
                obj.attrs.hash(state);
                obj.optional.hash(state);
            }
            Type::Capsule(c) => c.hash_into(state),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Dynamic => write!(f, "dynamic"),
            Type::List(e) => write!(f, "list({})", e),
            Type::Map(e) => write!(f, "map({})", e),
            Type::Set(e) => write!(f, "set({})", e),
            Type::Tuple(elems) => {
                write!(f, "tuple(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, ")")
            }
            Type::Object(obj) => {
                write!(f, "object({{")?;
                for (i, (name, ty)) in obj.attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let marker = if obj.is_optional(name) { "?" } else { "" };
                    write!(f, "{}{}: {}", name, marker, ty)?;
                }
                write!(f, "}})")
            }
            Type::Capsule(c) => write!(f, "capsule({})", c.name()),
        }
    }
}
