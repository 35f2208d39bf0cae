//! End-to-end combat scenarios with fixed rolls.
//!
//! Every scenario places the two combatants, submits actions, and steps
//! the engine until the strike resolves.

use brawl_core::prelude::*;
use brawl_test_utils::fixtures::{engine_at, fixed, midpoint_engine, place, step_until_outcome};
use brawl_test_utils::rolls::FixedRolls;

#[test]
fn light_attack_against_idle_defender() {
    let mut engine = midpoint_engine();
    place(&mut engine, 140);

    let started = engine.submit(Slot::One, Some(ActionId::Jab)).unwrap();
    assert_eq!(started, Ok(Execution::Started));
    assert_eq!(engine.combatant(Slot::One).resources().stamina(), fixed(92));

    let outcome = step_until_outcome(&mut engine, 10).unwrap();
    let entry = outcome.by(Slot::One).unwrap();
    assert_eq!(entry.zone, Zone::Body);
    assert_eq!(entry.damage, 10);
    assert!(!entry.crit && !entry.counter && !entry.blocked && !entry.dodged);
    assert_eq!(entry.combo_count, 1);

    let defender = engine.combatant(Slot::Two);
    assert_eq!(defender.resources().health(), defender.resources().max_health() - 10);
    assert_eq!(engine.combatant(Slot::One).combo().count(), 1);
}

#[test]
fn guarded_light_attack() {
    let mut engine = midpoint_engine();
    place(&mut engine, 140);

    engine.submit(Slot::Two, Some(ActionId::Guard)).unwrap().unwrap();
    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();

    let outcome = step_until_outcome(&mut engine, 10).unwrap();
    let entry = outcome.by(Slot::One).unwrap();
    assert_eq!(entry.damage, 3);
    assert!(entry.blocked);
    assert!(!entry.guard_broken);
    assert_eq!(entry.combo_count, 1);

    let defender = engine.combatant(Slot::Two);
    assert!(defender.is_guarding(), "guard survives a blocked hit");
    assert_eq!(defender.resources().health(), 97);
    assert_eq!(defender.action().map(|a| a.id()), Some(ActionId::Guard));
    assert_eq!(defender.combo().count(), 0);
    assert_eq!(defender.stats().blocks, 1);
}

#[test]
fn guard_breaker_clears_guard() {
    let mut engine = midpoint_engine();
    place(&mut engine, 160);

    engine.submit(Slot::Two, Some(ActionId::Guard)).unwrap().unwrap();
    engine.submit(Slot::One, Some(ActionId::Cross)).unwrap().unwrap();

    let outcome = step_until_outcome(&mut engine, 10).unwrap();
    let entry = outcome.by(Slot::One).unwrap();
    assert!(entry.guard_broken);
    assert!(!entry.blocked);
    assert!(!engine.combatant(Slot::Two).is_guarding());
}

#[test]
fn head_wins_over_body() {
    let mut engine = midpoint_engine();
    // The cross reaches 95..125 high at this gap, covering the head's
    // lower edge and the body's upper edge.
    place(&mut engine, 140);

    engine.submit(Slot::One, Some(ActionId::Cross)).unwrap().unwrap();
    assert_eq!(engine.distance(), fixed(60));

    let outcome = step_until_outcome(&mut engine, 10).unwrap();
    assert_eq!(outcome.by(Slot::One).unwrap().zone, Zone::Head);
}

#[test]
fn evade_slips_a_strike() {
    let mut engine = midpoint_engine();
    place(&mut engine, 140);

    engine.submit(Slot::Two, Some(ActionId::Evade)).unwrap().unwrap();
    engine.combatant_mut(Slot::Two).place_at(fixed(540));
    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();

    let outcome = step_until_outcome(&mut engine, 10).unwrap();
    let entry = outcome.by(Slot::One).unwrap();
    assert!(entry.dodged);
    assert_eq!(entry.damage, 0);
    assert_eq!(entry.combo_count, 0);
    assert_eq!(engine.combatant(Slot::Two).resources().health(), 100);
    assert_eq!(engine.combatant(Slot::Two).stats().dodges, 1);
}

#[test]
fn trade_reports_both_sides() {
    let mut engine = midpoint_engine();
    place(&mut engine, 200);

    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
    engine.submit(Slot::Two, Some(ActionId::Jab)).unwrap().unwrap();

    let outcome = step_until_outcome(&mut engine, 10).unwrap();
    assert!(outcome.trade);
    let one = outcome.by(Slot::One).unwrap();
    let two = outcome.by(Slot::Two).unwrap();
    assert_eq!(one.damage, two.damage);
    assert_eq!(one.zone, two.zone);
    assert_eq!(engine.combatant(Slot::One).resources().health(), 90);
    assert_eq!(engine.combatant(Slot::Two).resources().health(), 90);
    for slot in Slot::BOTH {
        assert_eq!(engine.combatant(slot).combo().count(), 1);
    }
}

#[test]
fn trade_rolls_are_independent() {
    // Slot two rolls a crit; slot one's strike must come out the same as
    // in a plain midpoint trade.
    let mut plain = engine_at(200, [FixedRolls::midpoint(), FixedRolls::midpoint()]);
    let mut lucky = engine_at(200, [FixedRolls::midpoint(), FixedRolls::always(0.01)]);
    for engine in [&mut plain, &mut lucky] {
        engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
        engine.submit(Slot::Two, Some(ActionId::Jab)).unwrap().unwrap();
    }

    let plain = step_until_outcome(&mut plain, 10).unwrap();
    let lucky = step_until_outcome(&mut lucky, 10).unwrap();
    assert!(lucky.by(Slot::Two).unwrap().crit);
    assert_eq!(plain.by(Slot::One), lucky.by(Slot::One));
}

#[test]
fn counter_and_trade_do_not_stack() {
    // Defender winding up an uppercut is caught in startup: a counter,
    // and no trade because the defender never reached its active frames.
    let mut engine = midpoint_engine();
    place(&mut engine, 140);
    engine.submit(Slot::Two, Some(ActionId::Uppercut)).unwrap().unwrap();
    engine.combatant_mut(Slot::Two).place_at(fixed(540));
    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();

    let outcome = step_until_outcome(&mut engine, 10).unwrap();
    assert!(!outcome.trade);
    assert_eq!(outcome.entries.len(), 1);
    assert!(outcome.by(Slot::One).unwrap().counter);

    // Both active on the same tick: a trade, neither side a counter.
    let mut engine = midpoint_engine();
    place(&mut engine, 200);
    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
    engine.submit(Slot::Two, Some(ActionId::Jab)).unwrap().unwrap();
    let outcome = step_until_outcome(&mut engine, 10).unwrap();
    assert!(outcome.trade);
    assert!(outcome.entries.iter().all(|e| !e.counter));
}

#[test]
fn heavy_hit_knocks_down() {
    let mut engine = engine_at(100, [FixedRolls::always(0.3), FixedRolls::midpoint()]);
    engine.submit(Slot::One, Some(ActionId::Uppercut)).unwrap().unwrap();

    let outcome = step_until_outcome(&mut engine, 15).unwrap();
    assert!(outcome.caused_knockdown());
    let entry = outcome.by(Slot::One).unwrap();
    assert!(entry.damage >= 40);
    assert!(!entry.staggered, "a knockdown replaces the stagger");

    let defender = engine.combatant(Slot::Two);
    assert!(defender.is_knocked_down());
    assert!(!defender.can_act());
    assert_eq!(defender.stats().knockdowns, 1);

    for _ in 0..engine.rules().combat.stun.knockdown {
        engine.step();
    }
    assert!(!engine.combatant(Slot::Two).is_knocked_down());
}

#[test]
fn combo_builds_and_names_sequences() {
    let mut engine = midpoint_engine();
    place(&mut engine, 140);

    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
    let first = step_until_outcome(&mut engine, 10).unwrap();
    assert_eq!(first.by(Slot::One).unwrap().combo_count, 1);

    while engine.combatant(Slot::One).action().is_some() {
        engine.step();
    }
    place(&mut engine, 160);
    engine.submit(Slot::One, Some(ActionId::Cross)).unwrap().unwrap();
    let second = step_until_outcome(&mut engine, 10).unwrap();
    let entry = second.by(Slot::One).unwrap();
    assert_eq!(entry.combo_count, 2);
    assert_eq!(entry.combo_name.as_deref(), Some("One-Two"));
    assert_eq!(engine.combatant(Slot::One).stats().style_points, 10);
}

#[test]
fn combo_label_reports_run_length() {
    let mut engine = midpoint_engine();
    place(&mut engine, 140);
    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
    let first = step_until_outcome(&mut engine, 10).unwrap();
    assert_eq!(first.by(Slot::One).unwrap().combo_name, None);

    while engine.combatant(Slot::One).action().is_some() {
        engine.step();
    }
    place(&mut engine, 140);
    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
    let second = step_until_outcome(&mut engine, 10).unwrap();
    let entry = second.by(Slot::One).unwrap();
    assert_eq!(entry.combo_count, 2);
    assert_eq!(entry.combo_name.as_deref(), Some("Nice!"));
}

#[test]
fn combo_expires_after_window() {
    let mut engine = midpoint_engine();
    place(&mut engine, 140);
    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
    step_until_outcome(&mut engine, 10).unwrap();
    assert_eq!(engine.combatant(Slot::One).combo().count(), 1);

    for _ in 0..engine.rules().combat.combo.window {
        engine.step();
    }
    assert_eq!(engine.combatant(Slot::One).combo().count(), 0);
    assert_eq!(engine.combatant(Slot::One).combo().best_count(), 1);
}

#[test]
fn unknown_identifier_is_idle() {
    let mut engine = midpoint_engine();
    let before = engine.state_hash();
    assert!(engine.submit(Slot::One, ActionId::parse("haymaker")).is_none());
    assert_eq!(engine.state_hash(), before);
    assert_eq!(ActionId::parse(" BLOCK "), Some(ActionId::Guard));
}

#[test]
fn stunned_combatant_rejects_actions() {
    let mut engine = midpoint_engine();
    place(&mut engine, 140);
    engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
    step_until_outcome(&mut engine, 10).unwrap();

    let result = engine.submit(Slot::Two, Some(ActionId::Jab)).unwrap();
    assert_eq!(result, Err(Rejection::Stunned));
    assert_eq!(engine.combatant(Slot::Two).resources().stamina(), fixed(100));
}
