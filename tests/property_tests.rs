//! Property-based tests for properties, checks and machines.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use propstate::builder::{MachineBuilder, TypeBuilder};
use propstate::check::{Check, Reducer};
use propstate::machine::{State, StateHistory, StateTransition, Transition};
use propstate::props::{Cmp, Property};
use propstate::{ErrorKind, Value};
use proptest::prelude::*;

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

/// Combine leaves `lo..hi` pairwise, splitting wherever `seeds` say.
fn nest(op: Reducer, lo: usize, hi: usize, seeds: &[usize]) -> Check<()> {
    if hi - lo == 1 {
        return Check::k(lo as i64);
    }
    let split = lo + 1 + seeds[(lo * 7 + hi) % seeds.len()] % (hi - lo - 1);
    Check::make(op, nest(op, lo, split, seeds), nest(op, split, hi, seeds))
}

prop_compose! {
    fn arbitrary_reducer()(variant in 0..3u8) -> Reducer {
        match variant {
            0 => Reducer::And,
            1 => Reducer::Or,
            _ => Reducer::Add,
        }
    }
}

proptest! {
    #[test]
    fn chained_checks_flatten_to_leaf_count(
        op in arbitrary_reducer(),
        leaves in 3..16usize,
        seeds in prop::collection::vec(any::<usize>(), 1..32),
    ) {
        let check = nest(op, 0, leaves, &seeds);

        prop_assert_eq!(check.op(), Some(op));
        prop_assert_eq!(check.checks().len(), leaves);
        let order: Vec<_> = check.checks().iter().map(|c| c.value().cloned()).collect();
        let expected: Vec<_> = (0..leaves).map(|i| Some(Value::Int(i as i64))).collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn flattened_sum_matches_arithmetic(
        leaves in 3..16usize,
        seeds in prop::collection::vec(any::<usize>(), 1..32),
    ) {
        let check = nest(Reducer::Add, 0, leaves, &seeds);
        let expected = (leaves * (leaves - 1) / 2) as i64;
        prop_assert_eq!(check.check(&()).unwrap(), Value::Int(expected));
    }

    #[test]
    fn subtraction_never_flattens(a in any::<i32>(), b in any::<i32>(), c in any::<i32>()) {
        let check = Check::<()>::k(a) - b - c;
        prop_assert_eq!(check.checks().len(), 2);
        prop_assert_eq!(
            check.check(&()).unwrap(),
            Value::Int(i64::from(a) - i64::from(b) - i64::from(c))
        );
    }

    #[test]
    fn cmp_matches_integer_ordering(bound in -1000i64..1000, x in -1000i64..1000) {
        let value = Value::Int(x);
        prop_assert_eq!(Cmp::gt(bound).test(&value), x > bound);
        prop_assert_eq!(Cmp::ge(bound).test(&value), x >= bound);
        prop_assert_eq!(Cmp::lt(bound).test(&value), x < bound);
        prop_assert_eq!(Cmp::le(bound).test(&value), x <= bound);
    }

    #[test]
    fn read_only_accepts_exactly_one_set(values in prop::collection::vec(any::<i64>(), 1..8)) {
        let def = TypeBuilder::new("Once")
            .field("id", Property::read_only())
            .build()
            .unwrap();
        let mut record = def.instantiate();

        prop_assert!(record.set("id", values[0]).is_ok());
        for value in &values[1..] {
            let err = record.set("id", *value).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::Attribute);
        }
        prop_assert_eq!(record.get("id").unwrap(), Value::Int(values[0]));
    }

    #[test]
    fn registry_is_own_fields_over_inherited(
        base_mask in prop::collection::vec(any::<bool>(), NAMES.len()),
        sub_mask in prop::collection::vec(any::<bool>(), NAMES.len()),
    ) {
        let declare = |builder: TypeBuilder, mask: &[bool]| {
            NAMES
                .iter()
                .zip(mask)
                .filter(|(_, declared)| **declared)
                .fold(builder, |builder, (name, _)| builder.field(name, Property::new()))
        };
        let base = declare(TypeBuilder::new("Base"), &base_mask[..]).build().unwrap();
        let sub = declare(TypeBuilder::new("Sub").extends(&base), &sub_mask[..])
            .build()
            .unwrap();

        for (i, name) in NAMES.iter().enumerate() {
            let accessor = sub.field(name);
            prop_assert_eq!(accessor.is_some(), base_mask[i] || sub_mask[i]);
            if let Some(accessor) = accessor {
                let owner = if sub_mask[i] { sub.handle() } else { base.handle() };
                prop_assert_eq!(accessor.owner().unwrap(), owner);
            }
            prop_assert_eq!(base.field(name).is_some(), base_mask[i]);
        }
    }

    #[test]
    fn cyclic_machine_returns_to_start(states in 2..8usize, fires in 0..40usize) {
        let cycle: Vec<_> = (0..states).map(|_| State::new()).collect();
        let next = Transition::new(
            (0..states).map(|i| (cycle[i].clone(), cycle[(i + 1) % states].clone())),
        )
        .unwrap();
        let kind = cycle
            .iter()
            .enumerate()
            .fold(MachineBuilder::new("Ring"), |builder, (i, state)| {
                builder.state(&format!("s{i}"), state)
            })
            .transition("next", next)
            .build()
            .unwrap();

        let mut machine = kind.instantiate().unwrap();
        let mut history = StateHistory::new();
        for _ in 0..fires {
            machine.fire_recorded("next", &mut history).unwrap();
        }

        prop_assert_eq!(machine.current_state(), Some(cycle[fires % states].clone()));
        prop_assert_eq!(history.len(), fires);
        prop_assert_eq!(history.get_path().len(), if fires == 0 { 0 } else { fires + 1 });
    }

    #[test]
    fn history_path_follows_connected_steps(steps in prop::collection::vec("[a-z]{1,8}", 2..8)) {
        let mut history = StateHistory::new();
        for pair in steps.windows(2) {
            history.record(StateTransition {
                transition: "step".to_string(),
                from: pair[0].clone(),
                to: pair[1].clone(),
                timestamp: Utc::now(),
            });
        }

        let expected: Vec<&str> = steps.iter().map(String::as_str).collect();
        prop_assert_eq!(history.len(), steps.len() - 1);
        prop_assert_eq!(history.get_path(), expected);
    }

    #[test]
    fn history_roundtrip_serialization(steps in prop::collection::vec("[a-z]{1,8}", 2..6)) {
        let mut history = StateHistory::new();
        for pair in steps.windows(2) {
            history.record(StateTransition {
                transition: "step".to_string(),
                from: pair[0].clone(),
                to: pair[1].clone(),
                timestamp: Utc::now(),
            });
        }

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(deserialized, history);
    }
}
