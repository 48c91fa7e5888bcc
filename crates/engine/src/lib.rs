//! Engines over the dyntype data model
//!
//! This crate houses everything that walks raw host data or computes
//! over values:
//! - structural: cycle-safe, value-based cache keys for raw data
//! - cache: per-pass and shared inference caches (injected, never
//!   global)
//! - infer: iterative type inference with memoization
//! - validate: raw-to-value validation with path-carrying errors
//! - convert: the explicit conversion matrix, including capsule hooks
//! - refinement: arithmetic/comparison over refined unknowns
//! - adapter: the foreign-record flattening seam

#![warn(clippy::all)]

pub mod adapter;
pub mod cache;
pub mod convert;
pub mod infer;
pub mod refinement;
pub mod structural;
pub mod validate;

pub use adapter::{NoRecords, RecordAdapter};
pub use cache::{InferenceCache, KeyCache, SharedSchemaCache};
pub use convert::{convert, unify_types};
pub use infer::{infer, infer_simple, InferOptions};
pub use refinement::{
    abs, add, divide, equal, greater_than, greater_than_or_equal, length, less_than,
    less_than_or_equal, max_fn, min_fn, multiply, negate, not_equal, subtract,
};
pub use structural::{
    shape_key, structural_key, ShapeKey, StructuralKey, MAP_VALUE_KEY_MAX_LEN,
    SEQ_VALUE_KEY_MAX_LEN, SET_VALUE_KEY_MAX_LEN,
};
pub use validate::{validate, MAX_VALIDATION_DEPTH};
