//! Search-space generation and mapping invariants.
//!
//! Covers brute-force agreement between the chain-of-trees generator and the
//! unconstrained product, bijectivity of the index mapping, validity of the
//! coordinate mapping, and the round-trip between the two.

use std::collections::HashSet;

use afinar::{Constraint, Range, SearchSpace, TuningError, TuningParam, Value};
use proptest::prelude::*;

const N: i64 = 12;

/// `wpt` divides N, `ls` divides N/wpt (the classic work-split space).
fn work_split_space() -> SearchSpace {
    SearchSpace::new(vec![
        TuningParam::new("wpt", Range::interval(1, N)).with_constraint(Constraint::new(
            ["wpt"],
            |v: &[Value]| v[0].as_int().is_some_and(|wpt| N % wpt == 0),
        )),
        TuningParam::new("ls", Range::interval(1, N)).with_constraint(Constraint::new(
            ["ls", "wpt"],
            |v: &[Value]| match (v[0].as_int(), v[1].as_int()) {
                (Some(ls), Some(wpt)) => ls != 0 && (N / wpt) % ls == 0,
                _ => false,
            },
        )),
    ])
    .expect("space")
}

fn int(config: &afinar::Configuration, name: &str) -> i64 {
    config
        .get(name)
        .and_then(Value::as_int)
        .unwrap_or_else(|| panic!("missing {name}"))
}

#[test]
fn unconstrained_product() {
    let space = SearchSpace::new(vec![
        TuningParam::new("p1", Range::set([1, 2])),
        TuningParam::new("p2", Range::set([10, 20])),
    ])
    .expect("space");
    assert_eq!(space.constrained_size(), 4);
    assert_eq!(space.unconstrained_size(), 4);

    let first = space.configuration_at(0).expect("config");
    assert_eq!((int(&first, "p1"), int(&first, "p2")), (1, 10));
    let last = space.configuration_at(3).expect("config");
    assert_eq!((int(&last, "p1"), int(&last, "p2")), (2, 20));
}

#[test]
fn work_split_matches_brute_force() {
    let space = work_split_space();

    let mut expected = Vec::new();
    for wpt in 1..=N {
        if N % wpt != 0 {
            continue;
        }
        for ls in 1..=N {
            if (N / wpt) % ls == 0 {
                expected.push((wpt, ls));
            }
        }
    }
    assert_eq!(expected.len(), 28);
    assert_eq!(space.constrained_size(), 28);
    assert_eq!(space.unconstrained_size(), (N * N) as u64);

    // the generator must enumerate exactly these configurations, in declared
    // enumeration order
    for (i, (wpt, ls)) in expected.iter().enumerate() {
        let config = space.configuration_at(i as u64).expect("config");
        assert_eq!(int(&config, "wpt"), *wpt);
        assert_eq!(int(&config, "ls"), *ls);
    }
}

#[test]
fn fully_constrained_space_is_an_error() {
    let result = SearchSpace::new(vec![TuningParam::new("p", Range::set([1, 2, 3]))
        .with_constraint(Constraint::new(["p"], |v: &[Value]| {
            v[0].as_int().is_some_and(|p| p > 3)
        }))]);
    assert!(matches!(result, Err(TuningError::EmptySearchSpace)));
}

#[test]
fn index_mapping_is_a_bijection() {
    let space = work_split_space();
    let mut seen = HashSet::new();
    for i in 0..space.constrained_size() {
        let config = space.configuration_at(i).expect("config");
        let wpt = int(&config, "wpt");
        let ls = int(&config, "ls");
        assert_eq!(N % wpt, 0, "index {i} produced invalid wpt");
        assert_eq!((N / wpt) % ls, 0, "index {i} produced invalid ls");
        assert!(seen.insert((wpt, ls)), "index {i} duplicates a configuration");
        assert_eq!(space.index_of(&config), Some(i));
    }
    assert_eq!(seen.len() as u64, space.constrained_size());
}

#[test]
fn first_group_is_most_significant() {
    let space = SearchSpace::new(vec![
        TuningParam::new("mode", Range::set(["scalar", "vector"])),
        TuningParam::new("unroll", Range::set([1, 2, 4])),
    ])
    .expect("space");
    for i in 0..3 {
        let config = space.configuration_at(i).expect("config");
        assert_eq!(config.get("mode"), Some(&Value::from("scalar")));
    }
    for i in 3..6 {
        let config = space.configuration_at(i).expect("config");
        assert_eq!(config.get("mode"), Some(&Value::from("vector")));
    }
}

#[test]
fn heterogeneous_value_domains() {
    let space = SearchSpace::new(vec![
        TuningParam::new("kernel", Range::set(["tiled", "naive"])),
        TuningParam::new("alpha", Range::generated(0, 3, 1, |i| {
            Value::Float(f64::from(i as i32) / 4.0)
        })),
        TuningParam::new("fuse", Range::set([Value::Bool(false), Value::Bool(true)])),
    ])
    .expect("space");
    assert_eq!(space.constrained_size(), 16);
    let config = space.configuration_at(15).expect("config");
    assert_eq!(config.get("kernel"), Some(&Value::from("naive")));
    assert_eq!(config.get("alpha"), Some(&Value::Float(0.75)));
    assert_eq!(config.get("fuse"), Some(&Value::Bool(true)));
}

#[test]
fn coordinates_round_trip_through_index() {
    let space = work_split_space();
    let d = space.num_params();
    for step in 1..=10 {
        let c = f64::from(step) / 10.0;
        let coords = vec![c; d];
        let config = space.configuration_at_coordinates(&coords).expect("config");
        let index = space.index_of(&config).expect("in space");
        let roundtrip = space.configuration_at(index).expect("config");
        assert_eq!(roundtrip, config);
    }
}

#[test]
fn generation_time_is_recorded() {
    let space = work_split_space();
    // zero-duration generation is plausible on a fast machine; the field just
    // has to be populated and sane
    assert!(space.generation_time().as_secs() < 60);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// |SP| equals the brute-force count over the unconstrained product for a
    /// three-parameter space with a two-link dependency chain.
    #[test]
    fn prop_chain_size_matches_brute_force(
        a_max in 1i64..8,
        b_max in 1i64..8,
        c_max in 1i64..8,
        m in 1i64..5,
    ) {
        let brute: Vec<(i64, i64, i64)> = (1..=a_max)
            .flat_map(|a| (1..=b_max).map(move |b| (a, b)))
            .filter(|&(a, b)| (a + b) % m == 0)
            .flat_map(|(a, b)| (1..=c_max).map(move |c| (a, b, c)))
            .filter(|&(_, b, c)| c % b.min(m).max(1) == 0)
            .collect();

        let result = SearchSpace::new(vec![
            TuningParam::new("a", Range::interval(1, a_max)),
            TuningParam::new("b", Range::interval(1, b_max)).with_constraint(Constraint::new(
                ["b", "a"],
                move |v: &[Value]| {
                    let (b, a) = (v[0].as_int().unwrap_or(0), v[1].as_int().unwrap_or(0));
                    (a + b) % m == 0
                },
            )),
            TuningParam::new("c", Range::interval(1, c_max)).with_constraint(Constraint::new(
                ["c", "b"],
                move |v: &[Value]| {
                    let (c, b) = (v[0].as_int().unwrap_or(0), v[1].as_int().unwrap_or(0));
                    c % b.min(m).max(1) == 0
                },
            )),
        ]);

        match result {
            Ok(space) => {
                prop_assert_eq!(space.constrained_size(), brute.len() as u64);
                // spot-check the bijection on every index
                for (i, (a, b, c)) in brute.iter().enumerate() {
                    let config = space.configuration_at(i as u64).expect("config");
                    prop_assert_eq!(int(&config, "a"), *a);
                    prop_assert_eq!(int(&config, "b"), *b);
                    prop_assert_eq!(int(&config, "c"), *c);
                    prop_assert_eq!(space.index_of(&config), Some(i as u64));
                }
            }
            Err(TuningError::EmptySearchSpace) => prop_assert!(brute.is_empty()),
            Err(other) => return Err(TestCaseError::fail(format!("unexpected: {other}"))),
        }
    }

    /// Every coordinate in (0,1]^D maps to a valid configuration.
    #[test]
    fn prop_coordinates_yield_valid_configs(
        c1 in 0.0f64..1.0,
        c2 in 0.0f64..1.0,
    ) {
        let space = work_split_space();
        let coords = vec![1.0 - c1, 1.0 - c2];
        let config = space.configuration_at_coordinates(&coords).expect("config");
        let wpt = int(&config, "wpt");
        let ls = int(&config, "ls");
        prop_assert_eq!(N % wpt, 0);
        prop_assert_eq!((N / wpt) % ls, 0);
    }
}
