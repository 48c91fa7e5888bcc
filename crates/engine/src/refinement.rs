//! Arithmetic and comparison over values that may be unknown
//!
//! Unknown operands do not poison everything. A refinement narrows
//! what an unknown could resolve to, and these operations propagate
//! that narrowing instead of discarding it:
//!
//! - Arithmetic shifts or combines numeric bounds, with the combined
//!   bound inclusive only when both contributing bounds are.
//! - Comparisons resolve to known booleans when the operand ranges
//!   cannot overlap.
//! - `length` resolves when the length bounds pin a single size, and
//!   otherwise carries the bounds over onto the numeric result.
//!
//! Marks are stripped before computing and the union of the operand
//! marks is re-attached to the result. Wrongly-typed operands are a
//! [`FunctionError`], never a panic.

use std::collections::BTreeSet;

use dyntype_core::error::FunctionError;
use dyntype_core::marks::Mark;
use dyntype_core::number::Number;
use dyntype_core::refine::Refinement;
use dyntype_core::types::Type;
use dyntype_core::value::Value;

type Result<T> = std::result::Result<T, FunctionError>;

// ============================================================================
// Numeric ranges
// ============================================================================

/// A numeric operand viewed as a (possibly unbounded) range.
#[derive(Debug, Clone, Copy)]
struct Range {
    lower: Option<(Number, bool)>,
    upper: Option<(Number, bool)>,
}

impl Range {
    fn exact(n: Number) -> Self {
        Range {
            lower: Some((n, true)),
            upper: Some((n, true)),
        }
    }

    fn from_refinement(r: &Refinement) -> Self {
        Range {
            lower: r.number_lower,
            upper: r.number_upper,
        }
    }
}

enum Operand {
    Known(Number),
    Unknown(Range),
}

fn numeric_operand(v: &Value) -> Result<Operand> {
    if v.ty() != &Type::Number {
        return Err(FunctionError(format!(
            "expected a number operand, got {}",
            v.ty()
        )));
    }
    if v.is_null() {
        return Err(FunctionError("numeric operand is null".into()));
    }
    if let Some(r) = v.refinement() {
        return Ok(Operand::Unknown(Range::from_refinement(r)));
    }
    Ok(Operand::Known(*v.as_number()))
}

fn collect_marks(values: &[&Value]) -> BTreeSet<Mark> {
    let mut marks = BTreeSet::new();
    for v in values {
        marks.extend(v.marks().iter().cloned());
    }
    marks
}

fn unknown_number(lower: Option<(Number, bool)>, upper: Option<(Number, bool)>) -> Value {
    let mut r = Refinement::none();
    r.number_lower = lower;
    r.number_upper = upper;
    Value::unknown_refined(Type::Number, r)
}

fn unknown_bool() -> Value {
    Value::unknown(Type::Bool)
}

// Combined bounds are inclusive only when both inputs are.
fn combine(
    a: Option<(Number, bool)>,
    b: Option<(Number, bool)>,
    op: impl Fn(&Number, &Number) -> Number,
) -> Option<(Number, bool)> {
    match (a, b) {
        (Some((x, xi)), Some((y, yi))) => Some((op(&x, &y), xi && yi)),
        _ => None,
    }
}

fn shift(bound: Option<(Number, bool)>, by: &Number) -> Option<(Number, bool)> {
    bound.map(|(b, i)| (b.add(by), i))
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `a + b`, propagating bounds through unknowns.
pub fn add(a: &Value, b: &Value) -> Result<Value> {
    let marks = collect_marks(&[a, b]);
    let result = match (numeric_operand(a)?, numeric_operand(b)?) {
        (Operand::Known(x), Operand::Known(y)) => Value::number(x.add(&y)),
        (Operand::Known(k), Operand::Unknown(r)) | (Operand::Unknown(r), Operand::Known(k)) => {
            unknown_number(shift(r.lower, &k), shift(r.upper, &k))
        }
        (Operand::Unknown(x), Operand::Unknown(y)) => unknown_number(
            combine(x.lower, y.lower, Number::add),
            combine(x.upper, y.upper, Number::add),
        ),
    };
    Ok(result.with_marks(marks))
}

/// `a - b`. Subtraction pairs each bound of `a` with the opposite
/// bound of `b`.
pub fn subtract(a: &Value, b: &Value) -> Result<Value> {
    let marks = collect_marks(&[a, b]);
    let result = match (numeric_operand(a)?, numeric_operand(b)?) {
        (Operand::Known(x), Operand::Known(y)) => Value::number(x.sub(&y)),
        (Operand::Unknown(r), Operand::Known(k)) => {
            let neg = k.neg();
            unknown_number(shift(r.lower, &neg), shift(r.upper, &neg))
        }
        (Operand::Known(k), Operand::Unknown(r)) => unknown_number(
            r.upper.map(|(u, i)| (k.sub(&u), i)),
            r.lower.map(|(l, i)| (k.sub(&l), i)),
        ),
        (Operand::Unknown(x), Operand::Unknown(y)) => unknown_number(
            combine(x.lower, y.upper, Number::sub),
            combine(x.upper, y.lower, Number::sub),
        ),
    };
    Ok(result.with_marks(marks))
}

/// `a * b`. A known scalar scales the bounds; a negative scalar also
/// flips and swaps them. Two unknowns propagate only the sign-safe
/// zero lower bound.
pub fn multiply(a: &Value, b: &Value) -> Result<Value> {
    let marks = collect_marks(&[a, b]);
    let result = match (numeric_operand(a)?, numeric_operand(b)?) {
        (Operand::Known(x), Operand::Known(y)) => Value::number(x.mul(&y)),
        (Operand::Known(k), Operand::Unknown(r)) | (Operand::Unknown(r), Operand::Known(k)) => {
            if k.is_zero() {
                Value::number(0)
            } else if k.is_negative() {
                unknown_number(
                    r.upper.map(|(u, i)| (u.mul(&k), i)),
                    r.lower.map(|(l, i)| (l.mul(&k), i)),
                )
            } else {
                unknown_number(
                    r.lower.map(|(l, i)| (l.mul(&k), i)),
                    r.upper.map(|(u, i)| (u.mul(&k), i)),
                )
            }
        }
        (Operand::Unknown(x), Operand::Unknown(y)) => {
            let zero = Number::Int(0);
            let nonneg = |r: &Range| {
                matches!(r.lower, Some((l, _)) if l >= zero)
            };
            if nonneg(&x) && nonneg(&y) {
                unknown_number(Some((zero, true)), None)
            } else {
                unknown_number(None, None)
            }
        }
    };
    Ok(result.with_marks(marks))
}

/// `a / b`. Division resolves only when both operands are known;
/// bounds do not survive it.
pub fn divide(a: &Value, b: &Value) -> Result<Value> {
    let marks = collect_marks(&[a, b]);
    let result = match (numeric_operand(a)?, numeric_operand(b)?) {
        (Operand::Known(x), Operand::Known(y)) => {
            if y.is_zero() {
                return Err(FunctionError("division by zero".into()));
            }
            Value::number(x.div(&y))
        }
        _ => unknown_number(None, None),
    };
    Ok(result.with_marks(marks))
}

/// `-a`, flipping and swapping the bounds of an unknown.
pub fn negate(a: &Value) -> Result<Value> {
    let marks = collect_marks(&[a]);
    let result = match numeric_operand(a)? {
        Operand::Known(x) => Value::number(x.neg()),
        Operand::Unknown(r) => unknown_number(
            r.upper.map(|(u, i)| (u.neg(), i)),
            r.lower.map(|(l, i)| (l.neg(), i)),
        ),
    };
    Ok(result.with_marks(marks))
}

/// `|a|`, clamping the bounds of an unknown into the non-negative
/// range.
pub fn abs(a: &Value) -> Result<Value> {
    let marks = collect_marks(&[a]);
    let zero = Number::Int(0);
    let result = match numeric_operand(a)? {
        Operand::Known(x) => Value::number(x.abs()),
        Operand::Unknown(r) => {
            if matches!(r.lower, Some((l, _)) if l >= zero) {
                // Already non-negative; bounds carry over unchanged.
                unknown_number(r.lower, r.upper)
            } else if matches!(r.upper, Some((u, _)) if u <= zero) {
                // Entirely non-positive; negation flips the range.
                unknown_number(
                    r.upper.map(|(u, i)| (u.neg(), i)),
                    r.lower.map(|(l, i)| (l.neg(), i)),
                )
            } else {
                let upper = match (r.lower, r.upper) {
                    (Some((l, li)), Some((u, ui))) => {
                        let la = l.abs();
                        let ua = u.abs();
                        if la > ua {
                            Some((la, li))
                        } else {
                            Some((ua, ui))
                        }
                    }
                    _ => None,
                };
                unknown_number(Some((zero, true)), upper)
            }
        }
    };
    Ok(result.with_marks(marks))
}

// ============================================================================
// Comparisons
// ============================================================================

fn range_of(op: &Operand) -> Range {
    match op {
        Operand::Known(n) => Range::exact(*n),
        Operand::Unknown(r) => *r,
    }
}

/// `a < b` holds for every resolution iff a's upper stays below b's
/// lower. Touching bounds still decide it when at least one side is
/// exclusive.
fn always_less(a: &Range, b: &Range) -> bool {
    match (a.upper, b.lower) {
        (Some((au, aui)), Some((bl, bli))) => au < bl || (au == bl && !(aui && bli)),
        _ => false,
    }
}

/// `a <= b` holds for every resolution iff the ranges touch at most at
/// a point.
fn always_less_or_equal(a: &Range, b: &Range) -> bool {
    match (a.upper, b.lower) {
        (Some((au, _)), Some((bl, _))) => au <= bl,
        _ => false,
    }
}

fn compare(a: &Value, b: &Value, decide: impl Fn(&Range, &Range) -> Option<bool>) -> Result<Value> {
    let marks = collect_marks(&[a, b]);
    let (x, y) = (numeric_operand(a)?, numeric_operand(b)?);
    let result = match decide(&range_of(&x), &range_of(&y)) {
        Some(v) => Value::bool(v),
        None => unknown_bool(),
    };
    Ok(result.with_marks(marks))
}

pub fn less_than(a: &Value, b: &Value) -> Result<Value> {
    compare(a, b, |x, y| {
        if always_less(x, y) {
            Some(true)
        } else if always_less_or_equal(y, x) {
            Some(false)
        } else {
            None
        }
    })
}

pub fn less_than_or_equal(a: &Value, b: &Value) -> Result<Value> {
    compare(a, b, |x, y| {
        if always_less_or_equal(x, y) {
            Some(true)
        } else if always_less(y, x) {
            Some(false)
        } else {
            None
        }
    })
}

pub fn greater_than(a: &Value, b: &Value) -> Result<Value> {
    less_than(b, a)
}

pub fn greater_than_or_equal(a: &Value, b: &Value) -> Result<Value> {
    less_than_or_equal(b, a)
}

/// `a == b` over possibly-unknown values. Disjoint numeric ranges
/// resolve to false; everything else unknown stays unknown.
pub fn equal(a: &Value, b: &Value) -> Result<Value> {
    let marks = collect_marks(&[a, b]);
    let result = if a.is_known() && b.is_known() {
        let (ba, _) = a.clone().unmark();
        let (bb, _) = b.clone().unmark();
        Value::bool(ba == bb)
    } else if disjoint_numbers(a, b) {
        Value::bool(false)
    } else {
        unknown_bool()
    };
    Ok(result.with_marks(marks))
}

pub fn not_equal(a: &Value, b: &Value) -> Result<Value> {
    let marks = collect_marks(&[a, b]);
    let eq = equal(a, b)?;
    let result = if eq.is_known() {
        Value::bool(!eq.as_bool())
    } else {
        unknown_bool()
    };
    Ok(result.with_marks(marks))
}

fn disjoint_numbers(a: &Value, b: &Value) -> bool {
    let (x, y) = match (numeric_operand(a), numeric_operand(b)) {
        (Ok(x), Ok(y)) => (range_of(&x), range_of(&y)),
        _ => return false,
    };
    always_less(&x, &y) || always_less(&y, &x)
}

// ============================================================================
// Reducers
// ============================================================================

/// Smallest of the operands. Resolves when a known operand lies at or
/// below every other operand's lower bound; otherwise the surviving
/// bounds carry over.
pub fn min_fn(values: &[Value]) -> Result<Value> {
    reduce(values, true)
}

/// Largest of the operands, mirror of [`min_fn`].
pub fn max_fn(values: &[Value]) -> Result<Value> {
    reduce(values, false)
}

fn reduce(values: &[Value], minimizing: bool) -> Result<Value> {
    if values.is_empty() {
        return Err(FunctionError("reducer needs at least one operand".into()));
    }
    let refs: Vec<&Value> = values.iter().collect();
    let marks = collect_marks(&refs);

    let mut best_known: Option<Number> = None;
    let mut ranges = Vec::with_capacity(values.len());
    for v in values {
        match numeric_operand(v)? {
            Operand::Known(n) => {
                best_known = Some(match best_known {
                    None => n,
                    Some(cur) => {
                        if (minimizing && n < cur) || (!minimizing && n > cur) {
                            n
                        } else {
                            cur
                        }
                    }
                });
                ranges.push(Range::exact(n));
            }
            Operand::Unknown(r) => ranges.push(r),
        }
    }

    if let Some(k) = best_known {
        let dominated = ranges.iter().all(|r| {
            if minimizing {
                matches!(r.lower, Some((l, _)) if l >= k)
            } else {
                matches!(r.upper, Some((u, _)) if u <= k)
            }
        });
        if dominated {
            return Ok(Value::number(k).with_marks(marks));
        }
    }

    // Unresolved: the result's bounds are the extremes the operands
    // still allow.
    let lower = fold_bounds(ranges.iter().map(|r| r.lower), minimizing);
    let upper = fold_bounds(ranges.iter().map(|r| r.upper), minimizing);
    Ok(unknown_number(lower, upper).with_marks(marks))
}

fn fold_bounds(
    bounds: impl Iterator<Item = Option<(Number, bool)>>,
    minimizing: bool,
) -> Option<(Number, bool)> {
    let mut acc: Option<(Number, bool)> = None;
    for bound in bounds {
        let (b, i) = bound?;
        acc = Some(match acc {
            None => (b, i),
            Some((cur, ci)) => {
                if (minimizing && b < cur) || (!minimizing && b > cur) {
                    (b, i)
                } else if b == cur {
                    (cur, ci && i)
                } else {
                    (cur, ci)
                }
            }
        });
    }
    acc
}

// ============================================================================
// Length
// ============================================================================

/// Element count of a collection, resolving through unknowns whenever
/// the length bounds pin a single size.
pub fn length(v: &Value) -> Result<Value> {
    let collection = matches!(
        v.ty(),
        Type::List(_) | Type::Set(_) | Type::Map(_) | Type::Tuple(_)
    );
    if !collection {
        return Err(FunctionError(format!(
            "length of a non-collection {}",
            v.ty()
        )));
    }
    let marks = collect_marks(&[v]);
    if v.is_null() {
        return Err(FunctionError("length of a null collection".into()));
    }

    // Tuple arity is part of the type; even an unknown tuple has a
    // known length.
    if let Type::Tuple(elems) = v.ty() {
        return Ok(Value::number(elems.len() as i64).with_marks(marks));
    }

    let result = match v.refinement() {
        None => Value::number(v.len().unwrap_or(0) as i64),
        Some(r) => match r.exact_length() {
            Some(n) => Value::number(n as i64),
            None => {
                // Narrowing is never dropped: the length bounds become
                // numeric bounds on the unknown count.
                let lower = r.length_lower.map(|n| (Number::Int(n as i64), true));
                let upper = r.length_upper.map(|n| (Number::Int(n as i64), true));
                unknown_number(lower, upper)
            }
        },
    };
    Ok(result.with_marks(marks))
}
