//! Core types for the dyntype runtime
//!
//! This crate defines the data model shared by every engine:
//! - Type: the closed set of type constructors (primitives, collections,
//!   structures, Dynamic, Capsule)
//! - Value: three-state typed values (null / unknown / known) with marks
//! - Number: unified integer/float numerics with total ordering
//! - Refinement: partial knowledge attached to unknown values
//! - RawArena/RawHandle: slot-indexed storage for untyped host data
//! - AttrPath: root-to-fault paths built while errors unwind
//! - CapsuleOps/HostValue: opaque host payloads with pluggable behavior
//! - Error: error type hierarchy
//! - Wire projection: the JSON form of types

#![warn(clippy::all)]

// Module declarations
pub mod capsule;
pub mod error;
pub mod marks;
pub mod number;
pub mod path;
pub mod raw;
pub mod refine;
pub mod types;
pub mod value;
pub mod wire;

// Re-export commonly used types
pub use capsule::{CapsuleOps, CapsuleType, HostKind, HostValue};
pub use error::{
    AdapterError, ConversionError, Error, FunctionError, Result, ValidationError,
    ValidationErrorKind, VALUE_REPR_MAX_LEN,
};
pub use marks::Mark;
pub use number::Number;
pub use path::{AttrPath, PathStep};
pub use raw::{string_entries, RawArena, RawHandle, RawNode};
pub use refine::Refinement;
pub use types::{unify, ObjectType, Type};
pub use value::{Known, Value, ValueState};
