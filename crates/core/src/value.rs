//! Value model
//!
//! A [`Value`] is a typed runtime cell with exactly three states:
//!
//! - **Null**: typed absence
//! - **Unknown**: a yet-unresolved value, optionally narrowed by a
//!   [`Refinement`]
//! - **Known**: a concrete payload matching the value's type
//!
//! Values additionally carry a set of [`Mark`]s, opaque tags that
//! propagate through operations. Marks are insignificant to equality
//! and hashing.
//!
//! Known-state accessors (`as_bool`, `as_list`, ...) panic on variant
//! mismatch. Reaching them with the wrong variant is a programming
//! error, not a data error; data errors are caught at validation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::capsule::HostValue;
use crate::error::ValidationError;
use crate::marks::Mark;
use crate::number::Number;
use crate::path::PathStep;
use crate::refine::Refinement;
use crate::types::Type;

// ============================================================================
// State representation
// ============================================================================

/// The three-state payload of a value.
#[derive(Debug, Clone)]
pub enum ValueState {
    /// Typed absence
    Null,
    /// Not yet resolved, possibly narrowed
    Unknown(Refinement),
    /// Concrete payload
    Known(Known),
}

/// A concrete payload. The variant always matches the owning value's
/// type constructor.
#[derive(Debug, Clone)]
pub enum Known {
    Bool(bool),
    Number(Number),
    String(String),
    /// Ordered elements
    List(Vec<Value>),
    /// Distinct elements in canonical order
    Set(Vec<Value>),
    /// String-keyed entries
    Map(BTreeMap<String, Value>),
    /// Positional elements
    Tuple(Vec<Value>),
    /// Attribute values keyed by declared name
    Object(BTreeMap<String, Value>),
    /// Opaque host payload
    Capsule(HostValue),
    /// The concrete value discovered for a dynamic slot
    Dynamic(Box<Value>),
}

// ============================================================================
// Value
// ============================================================================

/// A typed runtime value.
#[derive(Debug, Clone)]
pub struct Value {
    ty: Type,
    state: ValueState,
    marks: BTreeSet<Mark>,
}

impl Value {
    /// A known value. The caller guarantees the payload variant matches
    /// the type constructor; validation is the enforcing entry point.
    pub fn known(ty: Type, known: Known) -> Self {
        Value {
            ty,
            state: ValueState::Known(known),
            marks: BTreeSet::new(),
        }
    }

    /// The null value of `ty`.
    pub fn null(ty: Type) -> Self {
        Value {
            ty,
            state: ValueState::Null,
            marks: BTreeSet::new(),
        }
    }

    /// An unrefined unknown of `ty`.
    pub fn unknown(ty: Type) -> Self {
        Value::unknown_refined(ty, Refinement::none())
    }

    /// An unknown of `ty` narrowed by `refinement`.
    pub fn unknown_refined(ty: Type, refinement: Refinement) -> Self {
        Value {
            ty,
            state: ValueState::Unknown(refinement),
            marks: BTreeSet::new(),
        }
    }

    pub fn bool(b: bool) -> Self {
        Value::known(Type::Bool, Known::Bool(b))
    }

    pub fn number(n: impl Into<Number>) -> Self {
        Value::known(Type::Number, Known::Number(n.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::known(Type::String, Known::String(s.into()))
    }

    // ------------------------------------------------------------------
    // State inspection
    // ------------------------------------------------------------------

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn state(&self) -> &ValueState {
        &self.state
    }

    pub fn is_null(&self) -> bool {
        matches!(self.state, ValueState::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.state, ValueState::Unknown(_))
    }

    pub fn is_known(&self) -> bool {
        matches!(self.state, ValueState::Known(_))
    }

    /// The refinement of an unknown value, if this value is unknown.
    pub fn refinement(&self) -> Option<&Refinement> {
        match &self.state {
            ValueState::Unknown(r) => Some(r),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Known accessors (panic on variant mismatch)
    // ------------------------------------------------------------------

    fn payload(&self) -> &Known {
        match &self.state {
            ValueState::Known(k) => k,
            ValueState::Null => panic!("accessed known payload of a null value"),
            ValueState::Unknown(_) => panic!("accessed known payload of an unknown value"),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self.payload() {
            Known::Bool(b) => *b,
            other => panic!("as_bool on {}", known_name(other)),
        }
    }

    pub fn as_number(&self) -> &Number {
        match self.payload() {
            Known::Number(n) => n,
            other => panic!("as_number on {}", known_name(other)),
        }
    }

    pub fn as_string(&self) -> &str {
        match self.payload() {
            Known::String(s) => s,
            other => panic!("as_string on {}", known_name(other)),
        }
    }

    pub fn as_list(&self) -> &[Value] {
        match self.payload() {
            Known::List(v) => v,
            other => panic!("as_list on {}", known_name(other)),
        }
    }

    pub fn as_set(&self) -> &[Value] {
        match self.payload() {
            Known::Set(v) => v,
            other => panic!("as_set on {}", known_name(other)),
        }
    }

    pub fn as_tuple(&self) -> &[Value] {
        match self.payload() {
            Known::Tuple(v) => v,
            other => panic!("as_tuple on {}", known_name(other)),
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        match self.payload() {
            Known::Map(m) => m,
            other => panic!("as_map on {}", known_name(other)),
        }
    }

    pub fn as_object(&self) -> &BTreeMap<String, Value> {
        match self.payload() {
            Known::Object(m) => m,
            other => panic!("as_object on {}", known_name(other)),
        }
    }

    pub fn as_capsule(&self) -> &HostValue {
        match self.payload() {
            Known::Capsule(h) => h,
            other => panic!("as_capsule on {}", known_name(other)),
        }
    }

    /// The concrete value behind a known dynamic slot.
    pub fn as_dynamic(&self) -> &Value {
        match self.payload() {
            Known::Dynamic(v) => v,
            other => panic!("as_dynamic on {}", known_name(other)),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self.state, ValueState::Known(Known::Bool(true)))
    }

    pub fn is_false(&self) -> bool {
        matches!(self.state, ValueState::Known(Known::Bool(false)))
    }

    // ------------------------------------------------------------------
    // Container access
    // ------------------------------------------------------------------

    /// Positional element of a known list, set, or tuple.
    pub fn element(&self, index: usize) -> Option<&Value> {
        match &self.state {
            ValueState::Known(Known::List(v))
            | ValueState::Known(Known::Set(v))
            | ValueState::Known(Known::Tuple(v)) => v.get(index),
            _ => None,
        }
    }

    /// Attribute of a known object.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        match &self.state {
            ValueState::Known(Known::Object(m)) => m.get(name),
            _ => None,
        }
    }

    /// Entry of a known map.
    pub fn key(&self, key: &str) -> Option<&Value> {
        match &self.state {
            ValueState::Known(Known::Map(m)) => m.get(key),
            _ => None,
        }
    }

    /// Element count of a known container, or string length in
    /// characters. `None` for null/unknown values and non-containers.
    pub fn len(&self) -> Option<usize> {
        match &self.state {
            ValueState::Known(Known::List(v))
            | ValueState::Known(Known::Set(v))
            | ValueState::Known(Known::Tuple(v)) => Some(v.len()),
            ValueState::Known(Known::Map(m)) | ValueState::Known(Known::Object(m)) => {
                Some(m.len())
            }
            ValueState::Known(Known::String(s)) => Some(s.chars().count()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    // ------------------------------------------------------------------
    // Immutable updates
    // ------------------------------------------------------------------

    /// Return a copy of a known map with `key` set to `value`. The new
    /// value's type must be usable as the map's element type.
    pub fn with_key(
        &self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Value, ValidationError> {
        let elem_ty = match &self.ty {
            Type::Map(e) => e.as_ref(),
            _ => {
                return Err(ValidationError::mismatch("map", self.ty.type_name()));
            }
        };
        let key = key.into();
        if !value.ty.usable_as(elem_ty) {
            return Err(ValidationError::mismatch(
                elem_ty.to_string(),
                value.ty.to_string(),
            )
            .at(PathStep::Key(key)));
        }
        let mut entries = self.as_map().clone();
        entries.insert(key, value);
        let mut out = Value::known(self.ty.clone(), Known::Map(entries));
        out.marks = self.marks.clone();
        Ok(out)
    }

    /// Return a copy of a known map without `key`.
    pub fn without_key(&self, key: &str) -> Result<Value, ValidationError> {
        if !matches!(self.ty, Type::Map(_)) {
            return Err(ValidationError::mismatch("map", self.ty.type_name()));
        }
        let mut entries = self.as_map().clone();
        entries.remove(key);
        let mut out = Value::known(self.ty.clone(), Known::Map(entries));
        out.marks = self.marks.clone();
        Ok(out)
    }

    /// Return a copy of a known list with `value` appended.
    pub fn append(&self, value: Value) -> Result<Value, ValidationError> {
        let elem_ty = match &self.ty {
            Type::List(e) => e.as_ref(),
            _ => {
                return Err(ValidationError::mismatch("list", self.ty.type_name()));
            }
        };
        let index = self.as_list().len();
        if !value.ty.usable_as(elem_ty) {
            return Err(ValidationError::mismatch(
                elem_ty.to_string(),
                value.ty.to_string(),
            )
            .at(PathStep::Index(index)));
        }
        let mut elems = self.as_list().to_vec();
        elems.push(value);
        let mut out = Value::known(self.ty.clone(), Known::List(elems));
        out.marks = self.marks.clone();
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Marks
    // ------------------------------------------------------------------

    pub fn marks(&self) -> &BTreeSet<Mark> {
        &self.marks
    }

    pub fn is_marked(&self) -> bool {
        !self.marks.is_empty()
    }

    pub fn has_mark(&self, mark: &Mark) -> bool {
        self.marks.contains(mark)
    }

    /// Attach one mark.
    pub fn mark(mut self, mark: Mark) -> Self {
        self.marks.insert(mark);
        self
    }

    /// Attach a set of marks.
    pub fn with_marks(mut self, marks: impl IntoIterator<Item = Mark>) -> Self {
        self.marks.extend(marks);
        self
    }

    /// Split into the bare value and its marks.
    pub fn unmark(mut self) -> (Value, BTreeSet<Mark>) {
        let marks = std::mem::take(&mut self.marks);
        (self, marks)
    }
}

fn known_name(k: &Known) -> &'static str {
    match k {
        Known::Bool(_) => "bool",
        Known::Number(_) => "number",
        Known::String(_) => "string",
        Known::List(_) => "list",
        Known::Set(_) => "set",
        Known::Map(_) => "map",
        Known::Tuple(_) => "tuple",
        Known::Object(_) => "object",
        Known::Capsule(_) => "capsule",
        Known::Dynamic(_) => "dynamic",
    }
}

// ============================================================================
// Equality and hashing
// ============================================================================

// Marks never participate. Capsule payloads delegate to the type's ops
// when present, otherwise host pointer identity.

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.ty != other.ty {
            return false;
        }
        match (&self.state, &other.state) {
            (ValueState::Null, ValueState::Null) => true,
            (ValueState::Unknown(a), ValueState::Unknown(b)) => a == b,
            (ValueState::Known(a), ValueState::Known(b)) => self.known_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    fn known_eq(&self, a: &Known, b: &Known) -> bool {
        match (a, b) {
            (Known::Bool(x), Known::Bool(y)) => x == y,
            (Known::Number(x), Known::Number(y)) => x == y,
            (Known::String(x), Known::String(y)) => x == y,
            (Known::List(x), Known::List(y))
            | (Known::Set(x), Known::Set(y))
            | (Known::Tuple(x), Known::Tuple(y)) => x == y,
            (Known::Map(x), Known::Map(y)) | (Known::Object(x), Known::Object(y)) => x == y,
            (Known::Dynamic(x), Known::Dynamic(y)) => x == y,
            (Known::Capsule(x), Known::Capsule(y)) => match &self.ty {
                Type::Capsule(ct) => match ct.ops() {
                    Some(ops) => ops.equal(x, y),
                    None => x.ptr_eq(y),
                },
                _ => x.ptr_eq(y),
            },
            _ => false,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        match &self.state {
            ValueState::Null => 0u8.hash(state),
            // Refinements are compared but not hashed; unequal
            // refinements may collide.
            ValueState::Unknown(_) => 1u8.hash(state),
            ValueState::Known(k) => {
                2u8.hash(state);
                match k {
                    Known::Bool(b) => b.hash(state),
                    Known::Number(n) => n.hash(state),
                    Known::String(s) => s.hash(state),
                    Known::List(v) | Known::Set(v) | Known::Tuple(v) => v.hash(state),
                    Known::Map(m) | Known::Object(m) => m.hash(state),
                    Known::Dynamic(v) => v.hash(state),
                    Known::Capsule(h) => {
                        let digest = match &self.ty {
                            Type::Capsule(ct) => match ct.ops() {
                                Some(ops) => ops.hash(h),
                                None => h.identity_hash(),
                            },
                            _ => h.identity_hash(),
                        };
                        digest.hash(state);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ValueState::Null => write!(f, "null"),
            ValueState::Unknown(_) => write!(f, "<unknown of {}>", self.ty),
            ValueState::Known(k) => match k {
                Known::Bool(b) => write!(f, "{}", b),
                Known::Number(n) => write!(f, "{}", n),
                Known::String(s) => write!(f, "{:?}", s),
                Known::List(v) | Known::Set(v) | Known::Tuple(v) => {
                    write!(f, "[")?;
                    for (i, e) in v.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", e)?;
                    }
                    write!(f, "]")
                }
                Known::Map(m) | Known::Object(m) => {
                    write!(f, "{{")?;
                    for (i, (k, v)) in m.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{:?}: {}", k, v)?;
                    }
                    write!(f, "}}")
                }
                Known::Capsule(_) => write!(f, "<{}>", self.ty),
                Known::Dynamic(v) => write!(f, "{}", v),
            },
        }
    }
}
