//! dyntype - dynamic value/type runtime for structured host data
//!
//! dyntype marshals untyped host data into a closed type system: infer
//! a type from raw data, validate the data against it, and move typed
//! values between types explicitly. Values are three-state (null,
//! unknown, known), and unknown values can carry refinements that
//! arithmetic and comparisons keep propagating.
//!
//! # Quick Start
//!
//! ```ignore
//! use dyntype::{RawArena, infer_simple, validate};
//!
//! let mut arena = RawArena::new();
//! let doc: serde_json::Value =
//!     serde_json::from_str(r#"{"name": "web", "ports": [80, 443]}"#)?;
//! let root = arena.json(&doc);
//!
//! // Discover the most specific type the data supports...
//! let ty = infer_simple(&mut arena, root);
//!
//! // ...and validate against it to get a typed value.
//! let value = validate(&mut arena, root, &ty)?;
//! assert_eq!(value.attribute("name").unwrap().as_string(), "web");
//! ```
//!
//! # Architecture
//!
//! The data model (types, values, marks, refinements, the raw arena)
//! lives in `dyntype-core`; everything that walks data (inference,
//! validation, conversion, structural cache keys, refined-unknown
//! propagation) lives in `dyntype-engine`. This crate re-exports both.

pub use dyntype_core::*;
pub use dyntype_engine::*;
