//! Refinements for unknown values
//!
//! An unknown value may still carry partial knowledge: numeric bounds,
//! collection-length bounds, a known string prefix, or the fact that it
//! is (or is not) null once it resolves. The propagation engine consumes
//! and combines these bounds; they are discarded the moment a value
//! resolves to known.
//!
//! Absence of a bound means "unconstrained in that direction".

use crate::number::Number;
use serde::{Deserialize, Serialize};

/// Partial knowledge attached to an unknown value.
///
/// Numeric bounds pair the bound with an inclusivity flag:
/// `(10, true)` means `>= 10` as a lower bound, `(10, false)` means
/// `> 10`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    /// Whether the value is known to be null (or known non-null) once
    /// it resolves.
    pub is_known_null: Option<bool>,
    /// A prefix the resolved string is known to start with.
    pub string_prefix: Option<String>,
    /// Lower numeric bound and inclusivity.
    pub number_lower: Option<(Number, bool)>,
    /// Upper numeric bound and inclusivity.
    pub number_upper: Option<(Number, bool)>,
    /// Lower bound on collection length.
    pub length_lower: Option<usize>,
    /// Upper bound on collection length.
    pub length_upper: Option<usize>,
}

impl Refinement {
    /// The unrefined unknown: no constraints at all.
    pub fn none() -> Self {
        Refinement::default()
    }

    pub fn is_unrefined(&self) -> bool {
        *self == Refinement::default()
    }

    pub fn number_lower(bound: impl Into<Number>, inclusive: bool) -> Self {
        Refinement {
            number_lower: Some((bound.into(), inclusive)),
            ..Refinement::default()
        }
    }

    pub fn number_upper(bound: impl Into<Number>, inclusive: bool) -> Self {
        Refinement {
            number_upper: Some((bound.into(), inclusive)),
            ..Refinement::default()
        }
    }

    pub fn number_range(
        lower: impl Into<Number>,
        lower_inclusive: bool,
        upper: impl Into<Number>,
        upper_inclusive: bool,
    ) -> Self {
        Refinement {
            number_lower: Some((lower.into(), lower_inclusive)),
            number_upper: Some((upper.into(), upper_inclusive)),
            ..Refinement::default()
        }
    }

    pub fn length_range(lower: Option<usize>, upper: Option<usize>) -> Self {
        Refinement {
            length_lower: lower,
            length_upper: upper,
            ..Refinement::default()
        }
    }

    pub fn with_string_prefix(prefix: impl Into<String>) -> Self {
        Refinement {
            string_prefix: Some(prefix.into()),
            ..Refinement::default()
        }
    }

    /// Exact collection length, when lower and upper bounds coincide.
    pub fn exact_length(&self) -> Option<usize> {
        match (self.length_lower, self.length_upper) {
            (Some(lo), Some(hi)) if lo == hi => Some(lo),
            _ => None,
        }
    }
}
