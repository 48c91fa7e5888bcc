//! Value marks
//!
//! A mark is an opaque metadata tag attached to a value (the canonical
//! example is `"sensitive"`). Marks travel with a value through
//! operations but are insignificant to equality and hashing; callers
//! strip them with [`crate::Value::unmark`] before raw computation and
//! re-attach them afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An opaque metadata tag.
///
/// `details` is normalized to a sorted set so marks are hashable and
/// order-insensitive regardless of how callers assembled them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mark {
    name: String,
    details: BTreeSet<String>,
}

impl Mark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: BTreeSet::new(),
        }
    }

    pub fn with_details<I, S>(name: impl Into<String>, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            details: details.into_iter().map(Into::into).collect(),
        }
    }

    /// The conventional mark for values that must not be displayed.
    pub fn sensitive() -> Self {
        Mark::new("sensitive")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn details(&self) -> &BTreeSet<String> {
        &self.details
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
