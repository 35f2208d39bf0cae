//! Seeded matches reproduce exactly.

use brawl_core::prelude::*;
use brawl_test_utils::determinism::{
    find_first_divergence, match_outcome_bytes, run_parallel_matches, verify_match_determinism,
};
use brawl_test_utils::fixtures::{place, policy_match, rules, scripted_match};
use brawl_test_utils::strategies::paired_script;
use proptest::prelude::*;

#[test]
fn policy_matches_are_byte_identical() {
    let first = match_outcome_bytes(&mut policy_match(42));
    let second = match_outcome_bytes(&mut policy_match(42));
    assert!(!first.is_empty(), "policy fighters land something");
    assert_eq!(first, second);
}

#[test]
fn different_seeds_diverge() {
    let a = match_outcome_bytes(&mut policy_match(1));
    let b = match_outcome_bytes(&mut policy_match(2));
    assert_ne!(a, b);
}

#[test]
fn repeated_runs_agree() {
    verify_match_determinism(4, || policy_match(7)).assert_deterministic();
}

#[test]
fn parallel_runs_agree() {
    run_parallel_matches(|| policy_match(99), 4).assert_deterministic();
}

#[test]
fn scripted_runs_never_diverge() {
    let setup = || {
        scripted_match(
            3,
            &[ActionId::Jab, ActionId::Cross, ActionId::Hook],
            &[ActionId::Guard, ActionId::Jab, ActionId::Evade, ActionId::Uppercut],
        )
    };
    assert_eq!(find_first_divergence(setup, 5_000), None);
}

#[test]
fn outcome_records_survive_encoding() {
    let mut controller = policy_match(5);
    let mut records = Vec::new();
    controller.run_match(|outcome| records.push(outcome.clone()));
    for record in records.iter().take(20) {
        let bytes = record.to_bytes().unwrap();
        assert_eq!(&TickOutcome::from_bytes(&bytes).unwrap(), record);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any paired script replays to the same state and records.
    #[test]
    fn prop_scripts_replay_identically(
        seed in any::<u64>(),
        gap in 60i32..300,
        script in paired_script(300),
    ) {
        let run = || {
            let mut engine = CombatEngine::new(rules(), seed);
            place(&mut engine, gap);
            let mut bytes = Vec::new();
            for (one, two) in &script {
                engine.submit(Slot::One, *one);
                engine.submit(Slot::Two, *two);
                if let Some(outcome) = engine.step() {
                    bytes.extend(outcome.to_bytes().unwrap());
                }
            }
            (engine.state_hash(), bytes)
        };
        prop_assert_eq!(run(), run());
    }
}
