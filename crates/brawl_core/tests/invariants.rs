//! Property tests over arbitrary action scripts.

use brawl_core::catalog::{ActionCatalog, ActionId};
use brawl_core::combo::ComboBonus;
use brawl_core::config::CombatConfig;
use brawl_core::damage::{resolve_strike, StrikeInput};
use brawl_core::prelude::*;
use brawl_core::regions::Zone;
use brawl_test_utils::fixtures::{fixed, midpoint_engine, place, rules};
use brawl_test_utils::rolls::FixedRolls;
use brawl_test_utils::strategies::{attack_id, distance, paired_script};
use proptest::prelude::*;

fn seeded(seed: u64, gap: i32) -> CombatEngine {
    let mut engine = CombatEngine::new(rules(), seed);
    place(&mut engine, gap);
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Health and stamina stay inside their pools.
    #[test]
    fn prop_resources_stay_in_bounds(
        seed in any::<u64>(),
        gap in distance(),
        script in paired_script(400),
    ) {
        let mut engine = seeded(seed, gap);
        for (one, two) in script {
            engine.submit(Slot::One, one);
            engine.submit(Slot::Two, two);
            engine.step();
            for slot in Slot::BOTH {
                let r = engine.combatant(slot).resources();
                prop_assert!(r.health() <= r.max_health());
                prop_assert!(r.stamina() >= fixed(0));
                prop_assert!(r.stamina() <= r.max_stamina());
            }
        }
    }

    /// Always throwing the heaviest attack cannot break the pools either.
    #[test]
    fn prop_heaviest_attack_spam_stays_in_bounds(seed in any::<u64>(), gap in distance()) {
        let mut engine = seeded(seed, gap);
        for _ in 0..2_000 {
            engine.submit(Slot::One, Some(ActionId::Uppercut));
            engine.submit(Slot::Two, Some(ActionId::Uppercut));
            engine.step();
        }
        for slot in Slot::BOTH {
            let r = engine.combatant(slot).resources();
            prop_assert!(r.health() <= r.max_health());
            prop_assert!(r.stamina() >= fixed(0));
        }
    }

    /// Combo counts only grow, or drop straight to zero.
    #[test]
    fn prop_combo_never_decrements(
        seed in any::<u64>(),
        gap in distance(),
        script in paired_script(400),
    ) {
        let mut engine = seeded(seed, gap);
        let mut previous = [0u32; 2];
        for (one, two) in script {
            engine.submit(Slot::One, one);
            engine.submit(Slot::Two, two);
            let outcome = engine.step();
            let traded = outcome.as_ref().is_some_and(|o| o.trade);
            for slot in Slot::BOTH {
                let count = engine.combatant(slot).combo().count();
                let before = previous[slot.index()];
                // In a trade the hit taken resets first, then the hit landed counts.
                let restarted = traded && count == 1;
                prop_assert!(count == 0 || count >= before || restarted, "{before} -> {count}");
                previous[slot.index()] = count;
            }

            // A defender that took a connecting hit and did not land one
            // itself ends the tick with no combo.
            if let Some(outcome) = outcome {
                for entry in outcome.entries.iter().filter(|e| !e.dodged) {
                    let defender = entry.attacker.other();
                    let landed = outcome.by(defender).is_some_and(|e| !e.dodged);
                    if !landed {
                        prop_assert_eq!(engine.combatant(defender).combo().count(), 0);
                    }
                }
            }
        }
    }

    /// A non-breaking strike on a guard keeps at most 30% of the unguarded damage.
    #[test]
    fn prop_guard_bound(
        action in attack_id(),
        unit in 0.0f64..1.0,
        power in 50u32..200,
        defense in 50u32..200,
        exhausted in any::<bool>(),
        counter in any::<bool>(),
        combo in 100u32..150,
    ) {
        let catalog = ActionCatalog::standard().unwrap();
        let config = CombatConfig::standard().unwrap();
        let spec = catalog.get(action).unwrap();
        prop_assume!(!spec.breaks_guard);

        let input = |guarding| StrikeInput {
            action: spec,
            zone: Zone::Body,
            attacker_power_pct: power,
            attacker_exhausted: exhausted,
            combo: ComboBonus::PerHit(combo),
            defender_defense_pct: defense,
            defender_guarding: guarding,
            defender_evading: false,
            defender_in_startup: counter,
        };
        let open = resolve_strike(&input(false), &config, 0, &mut FixedRolls::always(unit));
        let guarded = resolve_strike(&input(true), &config, 0, &mut FixedRolls::always(unit));

        let bound = open.raw_damage.to_num::<f64>() * 0.30 + 1e-6;
        prop_assert!(guarded.raw_damage.to_num::<f64>() <= bound);
        prop_assert!(f64::from(guarded.damage) <= bound);
        prop_assert_eq!(guarded.blocked, !guarded.dodged);
    }
}

#[test]
fn outcome_silent_without_contact() {
    let mut engine = midpoint_engine();
    place(&mut engine, 400);
    engine.submit(Slot::One, Some(ActionId::Jab));
    for _ in 0..30 {
        assert!(engine.step().is_none());
    }
}
