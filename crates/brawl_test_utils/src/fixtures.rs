//! Fixture helpers.
//!
//! Builders for the common setups: standard rules, an engine with known
//! rolls, and two combatants placed a given distance apart.

use std::sync::Arc;

use brawl_core::catalog::ActionId;
use brawl_core::combatant::Slot;
use brawl_core::config::Ruleset;
use brawl_core::engine::CombatEngine;
use brawl_core::math::Fixed;
use brawl_core::policy::FallbackPolicy;
use brawl_core::round::MatchController;
use brawl_core::source::ScriptedSource;

use crate::rolls::FixedRolls;

/// Slot one's anchor in placed fixtures.
pub const LEFT_X: i32 = 400;

/// Shorthand for a whole fixed-point value.
#[must_use]
pub fn fixed(value: i32) -> Fixed {
    Fixed::from_num(value)
}

/// The bundled rules.
///
/// # Panics
///
/// Panics if the bundled tables fail to load.
#[must_use]
pub fn rules() -> Arc<Ruleset> {
    Ruleset::standard()
        .expect("bundled tables load")
        .shared()
}

/// Engine whose rolls always land midpoint damage at 0.5.
#[must_use]
pub fn midpoint_engine() -> CombatEngine<FixedRolls> {
    CombatEngine::with_rngs(rules(), [FixedRolls::midpoint(), FixedRolls::midpoint()])
}

/// Engine with the given roll sources, combatants `distance` apart.
#[must_use]
pub fn engine_at(distance: i32, rolls: [FixedRolls; 2]) -> CombatEngine<FixedRolls> {
    let mut engine = CombatEngine::with_rngs(rules(), rolls);
    place(&mut engine, distance);
    engine
}

/// Put slot one at [`LEFT_X`] and slot two `distance` to its right.
pub fn place<R: brawl_core::rng::CombatRng>(engine: &mut CombatEngine<R>, distance: i32) {
    engine.combatant_mut(Slot::One).place_at(fixed(LEFT_X));
    engine
        .combatant_mut(Slot::Two)
        .place_at(fixed(LEFT_X + distance));
}

/// Step until an outcome is produced or `max_ticks` pass.
pub fn step_until_outcome<R: brawl_core::rng::CombatRng>(
    engine: &mut CombatEngine<R>,
    max_ticks: u32,
) -> Option<brawl_core::outcome::TickOutcome> {
    (0..max_ticks).find_map(|_| engine.step())
}

/// Seeded controller with the fallback policy in both corners.
#[must_use]
pub fn policy_match(seed: u64) -> MatchController {
    let rules = rules();
    let engine = CombatEngine::new(Arc::clone(&rules), seed);
    MatchController::new(
        engine,
        Box::new(FallbackPolicy::new(Arc::clone(&rules)).seeded(seed, Slot::One)),
        Box::new(FallbackPolicy::new(rules).seeded(seed, Slot::Two)),
    )
}

/// Seeded controller replaying two scripts.
#[must_use]
pub fn scripted_match(seed: u64, one: &[ActionId], two: &[ActionId]) -> MatchController {
    let engine = CombatEngine::new(rules(), seed);
    MatchController::new(
        engine,
        Box::new(ScriptedSource::repeating(
            one.iter().copied().map(Some).collect(),
        )),
        Box::new(ScriptedSource::repeating(
            two.iter().copied().map(Some).collect(),
        )),
    )
}
