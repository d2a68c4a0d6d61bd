//! Integration tests for the Term Bridge
//!
//! Host values copied into a solver heap must read back unchanged, and
//! unification through the bridge must not depend on argument order.

mod common;

use common::assert_eq;
use hornet_runtime::bridge::{self, FromHost, HostValue, ToHost};
use hornet_runtime::Solver;
use proptest::prelude::*;

fn solver() -> Solver {
    Solver::new("", "true.").unwrap()
}

fn atom_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_]{0,6}",
        "[A-Z][a-z]{0,4}",
        Just("[]".to_string()),
        ".{0,8}",
    ]
}

fn number() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1_000_000i64..1_000_000).prop_map(|n| n as f64),
        -1e9f64..1e9,
    ]
}

fn host_value() -> impl Strategy<Value = HostValue> {
    let leaf = prop_oneof![
        number().prop_map(HostValue::Number),
        atom_name().prop_map(HostValue::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            ("[a-z]{1,4}", prop::collection::vec(inner.clone(), 1..4))
                .prop_map(|(functor, args)| bridge::compound(functor, args)),
            prop::collection::vec(inner, 0..5).prop_map(bridge::list),
        ]
    })
}

proptest! {
    #[test]
    fn prop_allocate_then_read_is_identity(value in host_value()) {
        let mut solver = solver();
        let mut bridge = solver.bridge();
        let handle = bridge.allocate(&value);
        prop_assert_eq!(bridge.read(handle), value);
    }

    #[test]
    fn prop_unify_is_symmetric(a in host_value(), b in host_value()) {
        let mut left = solver();
        let mut left_bridge = left.bridge();
        let (la, lb) = (left_bridge.allocate(&a), left_bridge.allocate(&b));
        let forward = left_bridge.unify(la, lb);

        let mut right = solver();
        let mut right_bridge = right.bridge();
        let (ra, rb) = (right_bridge.allocate(&a), right_bridge.allocate(&b));
        let backward = right_bridge.unify(rb, ra);

        prop_assert_eq!(forward, backward);
        prop_assert_eq!(forward, a == b);
    }

    #[test]
    fn prop_fresh_variable_unifies_with_anything(value in host_value()) {
        let mut solver = solver();
        let mut bridge = solver.bridge();
        let var = bridge.fresh_variable();
        let handle = bridge.allocate(&value);
        prop_assert!(bridge.unify(handle, var));
        prop_assert_eq!(bridge.read(var), value);
    }

    #[test]
    fn prop_vec_conversion_round_trips(items in prop::collection::vec(-1000i64..1000, 0..8)) {
        let value = items.clone().to_host();
        prop_assert_eq!(Vec::<i64>::from_host(&value), Ok(items));
    }
}

#[test]
fn test_nested_list_round_trip() {
    let value = bridge::list(vec![
        1.0.into(),
        bridge::list(vec!["a".into(), 2.5.into()]),
        bridge::compound("point", vec![0.0.into(), (-3.0).into()]),
    ]);
    let mut solver = solver();
    let mut bridge = solver.bridge();
    let handle = bridge.allocate(&value);
    assert_eq!(bridge.render(handle), "[1,[a,2.5],point(0,-3)]");
    assert_eq!(bridge.read(handle), value);
}

#[test]
fn test_partial_list_keeps_variable_tail() {
    let mut solver = solver();
    let mut bridge = solver.bridge();
    let tail = bridge.fresh_variable();
    let tail_value = bridge.read(tail);
    let value = bridge::list_with_tail(vec![1.0.into(), 2.0.into()], tail_value.clone());
    let handle = bridge.allocate(&value);
    assert_eq!(bridge.read(handle), value);

    let rest = bridge.allocate(&bridge::list(vec![3.0.into()]));
    assert!(bridge.unify(tail, rest));
    assert_eq!(bridge.render(handle), "[1,2,3]");
    assert_eq!(
        Vec::<f64>::from_host(&bridge.read(handle)),
        Ok(vec![1.0, 2.0, 3.0])
    );
}

#[test]
fn test_large_and_fractional_numbers_stay_floats() {
    let mut solver = solver();
    let mut bridge = solver.bridge();
    for n in [0.5, -2.25, 1e20, f64::MAX] {
        let handle = bridge.allocate(&HostValue::Number(n));
        assert_eq!(bridge.read(handle), HostValue::Number(n));
    }
    let whole = bridge.allocate(&HostValue::Number(42.0));
    assert_eq!(bridge.render(whole), "42");
}

#[test]
fn test_failed_unify_leaves_no_bindings() {
    let mut solver = solver();
    let mut bridge = solver.bridge();
    let x = bridge.fresh_variable();
    let x_value = bridge.read(x);
    let left = bridge.allocate(&bridge::compound("f", vec![x_value, "a".into()]));
    let right = bridge.allocate(&bridge::compound("f", vec![1.0.into(), "b".into()]));
    assert!(!bridge.unify(left, right));
    let var = bridge.read(x).as_var().unwrap();
    assert!(bridge.is_unbound(var));
}

#[test]
fn test_long_list_round_trip() {
    let items: Vec<HostValue> = (0..100_000i64).map(HostValue::from).collect();
    let value = bridge::list(items);
    let mut solver = solver();
    let mut bridge = solver.bridge();
    let handle = bridge.allocate(&value);
    let back = bridge.read(handle);
    assert!(back == value, "long list changed across the bridge");
    assert_eq!(back.as_list().map(|items| items.len()), Some(100_000));
    assert_eq!(
        Vec::<i64>::from_host(&back).map(|items| items[99_999]),
        Ok(99_999)
    );
}

#[test]
fn test_deeply_nested_compound_round_trip() {
    let value = (0..100_000).fold(HostValue::from("leaf"), |inner, _| {
        bridge::compound("wrap", vec![inner])
    });
    let copy = value.clone();
    let mut solver = solver();
    let mut bridge = solver.bridge();
    let handle = bridge.allocate(&value);
    assert!(bridge.read(handle) == copy);
    assert!(bridge.read(handle) != HostValue::from("leaf"));
}
