//! Numeric payload for the value model
//!
//! The type system has a single `number` type, so this module unifies
//! integers and floats behind one payload with consistent semantics:
//!
//! - **Cross-representation equality**: `Int(1) == Float(1.0)`. There is
//!   one number domain, not two (unlike a wire codec, which may care
//!   about representation).
//! - **Hash agrees with equality**: an integral float hashes like the
//!   integer it equals.
//! - **Total order**: validation rejects NaN and infinities, so every
//!   representable `Number` is finite and `Ord` is total.
//!
//! Integer arithmetic widens to float on overflow rather than wrapping.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A finite numeric value: integer or floating point.
///
/// Construct floats through [`Number::float`] so the finiteness
/// invariant holds; `From<i64>` / `From<f64>` are provided for
/// convenience in tests and builders (`From<f64>` panics on non-finite
/// input, which is a programming error, not a validation error).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Number {
    /// 64-bit signed integer
    Int(i64),
    /// Finite IEEE-754 double
    Float(f64),
}

impl Number {
    /// Wrap a float, rejecting NaN and infinities.
    pub fn float(f: f64) -> Option<Number> {
        if f.is_finite() {
            Some(Number::Float(f))
        } else {
            None
        }
    }

    /// Parse a number from its string form: integer first, then float.
    pub fn parse(s: &str) -> Option<Number> {
        let s = s.trim();
        if let Ok(i) = s.parse::<i64>() {
            return Some(Number::Int(i));
        }
        s.parse::<f64>().ok().and_then(Number::float)
    }

    /// The value as a float (lossy for very large integers).
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// The value as an integer, if it is one exactly.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => Some(i),
            Number::Float(f) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match *self {
            Number::Int(i) => i < 0,
            Number::Float(f) => f < 0.0,
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(s) => Number::Int(s),
                None => Number::Float(a as f64 + b as f64),
            },
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn sub(&self, other: &Number) -> Number {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_sub(b) {
                Some(s) => Number::Int(s),
                None => Number::Float(a as f64 - b as f64),
            },
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }

    pub fn mul(&self, other: &Number) -> Number {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(p) => Number::Int(p),
                None => Number::Float(a as f64 * b as f64),
            },
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }

    /// Division always runs in the float domain; the caller must reject a
    /// zero divisor first.
    pub fn div(&self, other: &Number) -> Number {
        Number::Float(self.as_f64() / other.as_f64())
    }

    pub fn neg(&self) -> Number {
        match *self {
            Number::Int(i) => match i.checked_neg() {
                Some(n) => Number::Int(n),
                None => Number::Float(-(i as f64)),
            },
            Number::Float(f) => Number::Float(-f),
        }
    }

    pub fn abs(&self) -> Number {
        if self.is_negative() {
            self.neg()
        } else {
            *self
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Int(a), Number::Float(b)) | (Number::Float(b), Number::Int(a)) => {
                Number::Float(b).as_i64() == Some(a)
            }
        }
    }
}

// Total: NaN is unrepresentable (see module docs).
impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            // Finite floats always compare.
            (a, b) => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integral floats must hash like their integer equal.
        match self.as_i64() {
            Some(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            None => {
                1u8.hash(state);
                self.as_f64().to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => match Number::Float(v).as_i64() {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", v),
            },
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Int(i)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::float(f).expect("non-finite float has no Number representation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(n: &Number) -> u64 {
        let mut h = DefaultHasher::new();
        n.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_cross_representation_equality() {
        assert_eq!(Number::Int(1), Number::Float(1.0));
        assert_eq!(Number::Float(1.0), Number::Int(1));
        assert_ne!(Number::Int(1), Number::Float(1.5));
        assert_ne!(Number::Int(2), Number::Int(3));
    }

    #[test]
    fn test_hash_agrees_with_equality() {
        assert_eq!(hash_of(&Number::Int(42)), hash_of(&Number::Float(42.0)));
        assert_ne!(hash_of(&Number::Int(42)), hash_of(&Number::Float(42.5)));
    }

    #[test]
    fn test_float_rejects_non_finite() {
        assert!(Number::float(f64::NAN).is_none());
        assert!(Number::float(f64::INFINITY).is_none());
        assert!(Number::float(f64::NEG_INFINITY).is_none());
        assert!(Number::float(1.25).is_some());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Number::parse("123"), Some(Number::Int(123)));
        assert_eq!(Number::parse("123.45"), Some(Number::Float(123.45)));
        assert_eq!(Number::parse("-1.5e2"), Some(Number::Float(-150.0)));
        assert_eq!(Number::parse(" 7 "), Some(Number::Int(7)));
        assert_eq!(Number::parse("NaN"), None);
        assert_eq!(Number::parse("abc"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::Int(123).to_string(), "123");
        assert_eq!(Number::Float(123.45).to_string(), "123.45");
        assert_eq!(Number::Float(-150.0).to_string(), "-150");
        assert_eq!(Number::Int(0).to_string(), "0");
    }

    #[test]
    fn test_overflow_widens_to_float() {
        let big = Number::Int(i64::MAX);
        let sum = big.add(&Number::Int(1));
        assert!(matches!(sum, Number::Float(_)));
    }

    #[test]
    fn test_ordering() {
        assert!(Number::Int(1) < Number::Float(1.5));
        assert!(Number::Float(2.0) > Number::Int(1));
        assert_eq!(Number::Int(3).cmp(&Number::Float(3.0)), Ordering::Equal);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(Number::Int(2).add(&Number::Int(3)), Number::Int(5));
        assert_eq!(Number::Int(2).mul(&Number::Float(1.5)), Number::Float(3.0));
        assert_eq!(Number::Int(7).sub(&Number::Int(10)), Number::Int(-3));
        assert_eq!(Number::Int(-4).abs(), Number::Int(4));
        assert_eq!(Number::Int(4).neg(), Number::Int(-4));
        assert_eq!(Number::Int(1).div(&Number::Int(2)), Number::Float(0.5));
    }
}
