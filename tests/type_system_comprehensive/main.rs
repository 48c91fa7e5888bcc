//! Type System Integration Tests
//!
//! End-to-end coverage across the public facade:
//! - inference over raw host data, including memoization
//! - validation with path-carrying errors
//! - the explicit conversion matrix
//! - structural cache keys (determinism, cycles, thread isolation)
//! - refined-unknown propagation
//! - capsule types with custom ops
//! - the wire projection of types

#[path = "../common/mod.rs"]
mod common;

mod capsules;
mod conversion;
mod inference;
mod refinements;
mod round_trip;
mod structural_keys;
mod validation;
mod wire_format;
