//! Refined-unknown propagation through operations

use dyntype::{
    add, greater_than, length, less_than, max_fn, min_fn, multiply, Mark, Number, Refinement,
    Type, Value,
};

fn unknown_number(r: Refinement) -> Value {
    Value::unknown_refined(Type::Number, r)
}

#[test]
fn comparison_resolves_on_disjoint_ranges() {
    let below_ten = unknown_number(Refinement::number_upper(10, false));
    assert_eq!(
        less_than(&below_ten, &Value::number(20)).unwrap(),
        Value::bool(true)
    );
    let at_least_thirty = unknown_number(Refinement::number_lower(30, true));
    assert_eq!(
        greater_than(&at_least_thirty, &Value::number(20)).unwrap(),
        Value::bool(true)
    );
}

#[test]
fn addition_keeps_the_lower_bound() {
    let a = unknown_number(Refinement::number_lower(0, true));
    let b = unknown_number(Refinement::number_lower(0, true));
    let sum = add(&a, &b).unwrap();
    assert!(sum.is_unknown());
    let r = sum.refinement().unwrap();
    assert_eq!(r.number_lower, Some((Number::Int(0), true)));
    assert_eq!(r.number_upper, None);
}

#[test]
fn scaling_flips_bounds_under_a_negative_scalar() {
    let r = unknown_number(Refinement::number_range(1, true, 2, true));
    let scaled = multiply(&r, &Value::number(-3)).unwrap();
    let r = scaled.refinement().unwrap();
    assert_eq!(r.number_lower, Some((Number::Int(-6), true)));
    assert_eq!(r.number_upper, Some((Number::Int(-3), true)));
}

#[test]
fn length_resolves_when_bounds_pin_one_size() {
    let pinned = Value::unknown_refined(
        Type::list(Type::String),
        Refinement::length_range(Some(3), Some(3)),
    );
    assert_eq!(length(&pinned).unwrap(), Value::number(3));

    let loose = Value::unknown_refined(
        Type::list(Type::String),
        Refinement::length_range(Some(2), Some(5)),
    );
    let n = length(&loose).unwrap();
    assert!(n.is_unknown());
    assert_eq!(
        n.refinement().unwrap().number_lower,
        Some((Number::Int(2), true))
    );
}

#[test]
fn reducers_resolve_when_a_known_operand_dominates() {
    let at_least_five = unknown_number(Refinement::number_lower(5, true));
    assert_eq!(
        min_fn(&[Value::number(2), at_least_five.clone()]).unwrap(),
        Value::number(2)
    );
    // 2 does not dominate from above, so max stays unknown.
    assert!(max_fn(&[Value::number(2), at_least_five]).unwrap().is_unknown());
}

#[test]
fn marks_union_across_operands() {
    let a = Value::number(1).mark(Mark::new("lineage"));
    let b = unknown_number(Refinement::number_lower(0, true)).mark(Mark::sensitive());
    let sum = add(&a, &b).unwrap();
    assert!(sum.has_mark(&Mark::new("lineage")));
    assert!(sum.has_mark(&Mark::sensitive()));
}
