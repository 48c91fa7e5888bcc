//! Paths into nested values
//!
//! This module defines types for addressing a location inside a nested
//! value:
//! - `PathStep`: one navigation step (index, attribute, or map key)
//! - `AttrPath`: an ordered sequence of steps from the root
//!
//! Validation builds paths incrementally as it unwinds: each recursive
//! boundary prepends the step where the failure occurred, so the final
//! error carries the full root-to-fault path.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// One step into a nested value.
///
/// # Examples
///
/// ```
/// use dyntype_core::path::PathStep;
///
/// assert_eq!(PathStep::Index(0).to_string(), "[0]");
/// assert_eq!(PathStep::Attr("name".into()).to_string(), ".name");
/// assert_eq!(PathStep::Key("env".into()).to_string(), "[\"env\"]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathStep {
    /// Index into a list, set, or tuple
    Index(usize),
    /// Attribute of an object
    Attr(String),
    /// Key into a map
    Key(String),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Index(i) => write!(f, "[{}]", i),
            PathStep::Attr(a) => write!(f, ".{}", a),
            PathStep::Key(k) => write!(f, "[{:?}]", k),
        }
    }
}

/// An immutable path from the root of a value to a nested element.
///
/// # Examples
///
/// ```
/// use dyntype_core::path::AttrPath;
///
/// let root = AttrPath::root();
/// assert!(root.is_root());
/// assert_eq!(root.to_string(), "(root)");
///
/// let p = AttrPath::root().attr("servers").index(2).attr("port");
/// assert_eq!(p.to_string(), "servers[2].port");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttrPath {
    steps: SmallVec<[PathStep; 4]>,
}

impl AttrPath {
    /// The empty path.
    pub fn root() -> Self {
        AttrPath::default()
    }

    pub fn from_steps(steps: impl IntoIterator<Item = PathStep>) -> Self {
        AttrPath {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Append an index step.
    pub fn index(mut self, i: usize) -> Self {
        self.steps.push(PathStep::Index(i));
        self
    }

    /// Append an attribute step.
    pub fn attr(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep::Attr(name.into()));
        self
    }

    /// Append a map-key step.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.steps.push(PathStep::Key(key.into()));
        self
    }

    /// A copy of this path with `step` prepended. Used while unwinding
    /// nested validation failures.
    pub fn prepended(&self, step: PathStep) -> Self {
        let mut steps = SmallVec::with_capacity(self.steps.len() + 1);
        steps.push(step);
        steps.extend(self.steps.iter().cloned());
        AttrPath { steps }
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "(root)");
        }
        for (i, step) in self.steps.iter().enumerate() {
            // The leading dot is dropped for the first attribute step.
            match step {
                PathStep::Attr(a) if i == 0 => write!(f, "{}", a)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_display() {
        assert_eq!(AttrPath::root().to_string(), "(root)");
    }

    #[test]
    fn test_mixed_display() {
        let p = AttrPath::root().attr("a").index(1).key("k");
        assert_eq!(p.to_string(), "a[1][\"k\"]");
    }

    #[test]
    fn test_index_first_display() {
        let p = AttrPath::root().index(3).attr("x");
        assert_eq!(p.to_string(), "[3].x");
    }

    #[test]
    fn test_serde_round_trip() {
        // The step list must serialize like a plain sequence.
        let p = AttrPath::root().attr("a").index(1).key("k");
        let json = serde_json::to_string(&p).unwrap();
        let back: AttrPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_prepended() {
        let inner = AttrPath::root().attr("b");
        let outer = inner.prepended(PathStep::Index(0));
        assert_eq!(outer.steps().len(), 2);
        assert_eq!(outer.to_string(), "[0].b");
        // Original is untouched.
        assert_eq!(inner.to_string(), "b");
    }
}
