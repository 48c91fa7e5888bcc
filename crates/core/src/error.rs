//! Error types for the dyntype runtime
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Validation failures carry a path from the validation root: nested
//! failures are re-raised at each recursive boundary with the failing
//! element's step prepended, so callers never reconstruct path context
//! themselves. The user-visible string is `At <path>: <message>` when a
//! non-trivial path exists.

use crate::path::{AttrPath, PathStep};
use thiserror::Error;

/// Result type alias for dyntype operations
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length of the offending-value representation carried by a
/// validation error. Longer representations are truncated with `...`.
pub const VALUE_REPR_MAX_LEN: usize = 200;

/// Classification of a validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Malformed type construction (bad attribute name, malformed wire
    /// projection, ...)
    TypeDefinition,
    /// Bool validation failure
    Bool,
    /// Number validation failure
    Number,
    /// String validation failure
    String,
    /// List validation failure, annotated with the raw length when known
    List { length: Option<usize> },
    /// Map validation failure
    Map,
    /// Set validation failure
    Set,
    /// Tuple validation failure
    Tuple,
    /// Object attribute failure, annotated with the offending field
    Attribute { name: String },
    /// Capsule validation failure
    Capsule,
    /// Expected one type, found another
    Mismatch { expected: String, actual: String },
}

impl ValidationErrorKind {
    /// The type name reported in diagnostics for this failure class.
    pub fn type_name(&self) -> &'static str {
        match self {
            ValidationErrorKind::TypeDefinition => "TypeDefinition",
            ValidationErrorKind::Bool => "Bool",
            ValidationErrorKind::Number => "Number",
            ValidationErrorKind::String => "String",
            ValidationErrorKind::List { .. } => "List",
            ValidationErrorKind::Map => "Map",
            ValidationErrorKind::Set => "Set",
            ValidationErrorKind::Tuple => "Tuple",
            ValidationErrorKind::Attribute { .. } => "Object",
            ValidationErrorKind::Capsule => "Capsule",
            ValidationErrorKind::Mismatch { .. } => "Mismatch",
        }
    }
}

/// A validation failure with full root-to-fault context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.path_prefixed())]
pub struct ValidationError {
    /// Failure classification
    pub kind: ValidationErrorKind,
    /// Human-readable description (without path prefix)
    pub message: String,
    /// Best-effort truncated representation of the offending raw value
    pub value_repr: Option<String>,
    /// Path from the validation root to the failing element
    pub path: AttrPath,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        ValidationError {
            kind,
            message: message.into(),
            value_repr: None,
            path: AttrPath::root(),
        }
    }

    /// Attach a truncated representation of the offending value.
    pub fn with_value_repr(mut self, repr: impl Into<String>) -> Self {
        self.value_repr = Some(truncate_repr(repr.into()));
        self
    }

    pub fn type_definition(message: impl Into<String>) -> Self {
        ValidationError::new(ValidationErrorKind::TypeDefinition, message)
    }

    pub fn bool(message: impl Into<String>) -> Self {
        ValidationError::new(ValidationErrorKind::Bool, message)
    }

    pub fn number(message: impl Into<String>) -> Self {
        ValidationError::new(ValidationErrorKind::Number, message)
    }

    pub fn string(message: impl Into<String>) -> Self {
        ValidationError::new(ValidationErrorKind::String, message)
    }

    pub fn list(message: impl Into<String>, length: Option<usize>) -> Self {
        ValidationError::new(ValidationErrorKind::List { length }, message)
    }

    pub fn map(message: impl Into<String>) -> Self {
        ValidationError::new(ValidationErrorKind::Map, message)
    }

    pub fn set(message: impl Into<String>) -> Self {
        ValidationError::new(ValidationErrorKind::Set, message)
    }

    pub fn tuple(message: impl Into<String>) -> Self {
        ValidationError::new(ValidationErrorKind::Tuple, message)
    }

    pub fn attribute(name: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::new(
            ValidationErrorKind::Attribute { name: name.into() },
            message,
        )
    }

    pub fn capsule(message: impl Into<String>) -> Self {
        ValidationError::new(ValidationErrorKind::Capsule, message)
    }

    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        let message = format!("Expected {}, got {}", expected, actual);
        ValidationError::new(ValidationErrorKind::Mismatch { expected, actual }, message)
    }

    /// Re-raise this error from one level up: the failing element's step
    /// is prepended to the path. Lower layers never swallow errors.
    pub fn at(mut self, step: PathStep) -> Self {
        self.path = self.path.prepended(step);
        self
    }

    fn path_prefixed(&self) -> String {
        if self.path.is_root() {
            self.message.clone()
        } else {
            format!("At {}: {}", self.path, self.message)
        }
    }

    /// Diagnostic context as plain key/value pairs for an external
    /// observability sink.
    pub fn context(&self) -> Vec<(&'static str, String)> {
        let mut ctx = vec![
            ("type", self.kind.type_name().to_string()),
            ("path", self.path.to_string()),
            ("path_depth", self.path.len().to_string()),
        ];
        if let Some(repr) = &self.value_repr {
            ctx.push(("value_repr", repr.clone()));
        }
        match &self.kind {
            ValidationErrorKind::List { length: Some(n) } => {
                ctx.push(("collection_length", n.to_string()));
            }
            ValidationErrorKind::Attribute { name } => {
                ctx.push(("attribute", name.clone()));
            }
            ValidationErrorKind::Mismatch { expected, actual } => {
                ctx.push(("expected", expected.clone()));
                ctx.push(("actual", actual.clone()));
            }
            _ => {}
        }
        ctx
    }
}

fn truncate_repr(mut repr: String) -> String {
    if repr.len() > VALUE_REPR_MAX_LEN {
        let mut cut = VALUE_REPR_MAX_LEN;
        while !repr.is_char_boundary(cut) {
            cut -= 1;
        }
        repr.truncate(cut);
        repr.push_str("...");
    }
    repr
}

/// Conversion failures are always explicit; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// No coercion exists between the two types
    #[error("cannot convert from {from} to {to}")]
    Incompatible {
        /// Source type rendering
        from: String,
        /// Target type rendering
        to: String,
    },

    /// A capsule conversion was requested but the type carries no
    /// convert hook
    #[error("capsule type {capsule} has no convert hook for target {to}")]
    MissingConvertHook {
        /// Capsule type name
        capsule: String,
        /// Target type rendering
        to: String,
    },

    /// A capsule convert hook returned a value of the wrong type
    #[error("capsule convert hook returned {actual}, expected {expected}")]
    HookWrongType {
        /// Requested target type
        expected: String,
        /// Type of the hook's result
        actual: String,
    },

    /// A primitive value could not be parsed into the target type
    #[error("cannot parse {value:?} as {to}")]
    Unparseable {
        /// Offending source rendering
        value: String,
        /// Target type rendering
        to: String,
    },
}

/// Misuse of a refinement/standard-library operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("function error: {0}")]
pub struct FunctionError(pub String);

/// Failure at the foreign-record adapter seam.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record adapter error: {0}")]
pub struct AdapterError(pub String);

/// Error type for the dyntype runtime
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Validation failure (includes type-definition errors)
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Conversion failure
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Function misuse
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// Adapter failure
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_path() {
        let err = ValidationError::bool("Cannot convert f64 to bool");
        assert_eq!(err.to_string(), "Cannot convert f64 to bool");
    }

    #[test]
    fn test_display_with_path() {
        let err = ValidationError::number("not a number")
            .at(PathStep::Attr("port".into()))
            .at(PathStep::Index(2))
            .at(PathStep::Attr("servers".into()));
        assert_eq!(err.to_string(), "At servers[2].port: not a number");
    }

    #[test]
    fn test_path_prepend_order() {
        // Innermost failure first, steps prepended while unwinding.
        let err = ValidationError::string("bad").at(PathStep::Index(1));
        assert_eq!(err.path.steps(), &[PathStep::Index(1)]);
        let err = err.at(PathStep::Index(0));
        assert_eq!(
            err.path.steps(),
            &[PathStep::Index(0), PathStep::Index(1)]
        );
    }

    #[test]
    fn test_value_repr_truncation() {
        let long = "x".repeat(500);
        let err = ValidationError::string("too long").with_value_repr(long);
        let repr = err.value_repr.unwrap();
        assert_eq!(repr.len(), VALUE_REPR_MAX_LEN + 3);
        assert!(repr.ends_with("..."));
    }

    #[test]
    fn test_context_pairs() {
        let err = ValidationError::attribute("name", "missing required attribute")
            .with_value_repr("{}");
        let ctx = err.context();
        assert!(ctx.contains(&("type", "Object".to_string())));
        assert!(ctx.contains(&("attribute", "name".to_string())));
        assert!(ctx.contains(&("path", "(root)".to_string())));
    }

    #[test]
    fn test_mismatch_message() {
        let err = ValidationError::mismatch("number", "string");
        assert_eq!(err.to_string(), "Expected number, got string");
    }

    #[test]
    fn test_conversion_error_display() {
        let err = ConversionError::Incompatible {
            from: "string".into(),
            to: "list(number)".into(),
        };
        assert!(err.to_string().contains("cannot convert"));
        let err = ConversionError::MissingConvertHook {
            capsule: "Creds".into(),
            to: "string".into(),
        };
        assert!(err.to_string().contains("no convert hook"));
    }

    #[test]
    fn test_error_from_impls() {
        let e: Error = ValidationError::bool("x").into();
        assert!(matches!(e, Error::Validation(_)));
        let e: Error = FunctionError("bad operand".into()).into();
        assert!(matches!(e, Error::Function(_)));
    }
}
