//! Damage and outcome calculation for a single strike.
//!
//! The formula runs in a fixed order so that seeded runs reproduce exactly:
//!
//! ```text
//! base   = roll(min..=max)
//! dmg    = base x power x zone x combo
//! dmg    = dmg x crit            (on a crit roll)
//! dmg    = dmg x counter         (defender caught in startup)
//! dmg    = dmg / defense
//! dmg    = dmg x (1 - guard)     (guarding, not broken)
//!        | dmg x guard_break     (guarding, broken)
//! dmg    = dmg x exhaustion      (attacker exhausted)
//! final  = floor(dmg)
//! ```
//!
//! Rolls are consumed in the order dodge, hit, damage, crit, stun.

use serde::{Deserialize, Serialize};

use crate::catalog::{ActionId, ActionSpec};
use crate::combo::ComboBonus;
use crate::config::CombatConfig;
use crate::math::{apply_percent, fixed_serde, floor_to_u32, per_tick, Fixed};
use crate::regions::Zone;
use crate::rng::CombatRng;

/// Everything the formula reads, captured before any hit this tick applies.
#[derive(Debug, Clone, Copy)]
pub struct StrikeInput<'a> {
    /// Attacking action.
    pub action: &'a ActionSpec,
    /// Zone struck.
    pub zone: Zone,
    /// Attacker power, percent.
    pub attacker_power_pct: u32,
    /// Attacker stamina below the exhaustion threshold.
    pub attacker_exhausted: bool,
    /// Attacker's combo bonus for this hit.
    pub combo: ComboBonus,
    /// Defender defense, percent.
    pub defender_defense_pct: u32,
    /// Defender guard is up.
    pub defender_guarding: bool,
    /// Defender is inside an evade window.
    pub defender_evading: bool,
    /// Defender's own action is in startup.
    pub defender_in_startup: bool,
}

/// Computed result of one strike, before it is applied to the defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    /// Attacking action.
    pub action: ActionId,
    /// Zone struck.
    pub zone: Zone,
    /// Rolled base damage.
    pub base_damage: u32,
    /// Damage before flooring.
    #[serde(with = "fixed_serde")]
    pub raw_damage: Fixed,
    /// Final damage.
    pub damage: u32,
    /// Crit rolled.
    pub crit: bool,
    /// Defender caught winding up.
    pub counter: bool,
    /// Absorbed by guard.
    pub blocked: bool,
    /// Avoided entirely.
    pub dodged: bool,
    /// Guard broken by this strike.
    pub guard_broken: bool,
    /// Action's stun chance proc'd.
    pub stun_proc: bool,
    /// Knockback speed, pixels per tick.
    #[serde(with = "fixed_serde")]
    pub knockback: Fixed,
}

impl Strike {
    /// Connected, whether or not a guard absorbed it.
    #[must_use]
    pub const fn connected(&self) -> bool {
        !self.dodged
    }

    /// Landed clean.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !self.dodged && !self.blocked
    }

    fn avoided(action: ActionId, zone: Zone) -> Self {
        Self {
            action,
            zone,
            base_damage: 0,
            raw_damage: Fixed::ZERO,
            damage: 0,
            crit: false,
            counter: false,
            blocked: false,
            dodged: true,
            guard_broken: false,
            stun_proc: false,
            knockback: Fixed::ZERO,
        }
    }
}

/// Resolve a strike.
///
/// `evade_chance` is the defender's chance to slip the strike when
/// `input.defender_evading` is set.
pub fn resolve_strike<R: CombatRng + ?Sized>(
    input: &StrikeInput<'_>,
    config: &CombatConfig,
    evade_chance: u32,
    rng: &mut R,
) -> Strike {
    let action = input.action;
    let rules = &config.damage;

    if input.defender_evading && rng.chance(evade_chance) {
        return Strike::avoided(action.id, input.zone);
    }
    if !rng.chance(action.hit_chance) {
        return Strike::avoided(action.id, input.zone);
    }

    let base_damage = rng.roll_range(action.damage.min, action.damage.max);
    let crit = rng.chance(rules.base_crit_chance + action.crit_bonus);
    let stun_proc = action.stun_chance > 0 && rng.chance(action.stun_chance);

    let mut dmg = Fixed::from_num(base_damage);
    dmg = apply_percent(dmg, input.attacker_power_pct);
    dmg = apply_percent(dmg, input.zone.multiplier_pct(&config.zones));
    dmg = input.combo.apply(dmg);

    if crit {
        dmg = apply_percent(dmg, rules.crit_multiplier_pct);
    }
    let counter = input.defender_in_startup;
    if counter {
        dmg = apply_percent(dmg, rules.counter_multiplier_pct);
    }

    dmg = dmg * Fixed::from_num(100) / Fixed::from_num(input.defender_defense_pct.max(1));

    let mut blocked = false;
    let mut guard_broken = false;
    if input.defender_guarding {
        if action.breaks_guard {
            dmg = apply_percent(dmg, rules.guard_break_multiplier_pct);
            guard_broken = true;
        } else {
            dmg = apply_percent(dmg, 100 - rules.guard_reduction_pct);
            blocked = true;
        }
    }

    if input.attacker_exhausted {
        dmg = apply_percent(dmg, rules.exhaustion_penalty_pct);
    }

    let mut knockback = per_tick(config.knockback.force_per_sec);
    if crit {
        knockback = apply_percent(knockback, config.knockback.crit_scale_pct);
    }
    if blocked {
        knockback = apply_percent(knockback, config.knockback.blocked_scale_pct);
    }

    Strike {
        action: action.id,
        zone: input.zone,
        base_damage,
        raw_damage: dmg,
        damage: floor_to_u32(dmg),
        crit,
        counter,
        blocked,
        dodged: false,
        guard_broken,
        stun_proc,
        knockback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionCatalog;
    use crate::rng::testing::Midpoint;

    struct Fixture {
        catalog: ActionCatalog,
        config: CombatConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: ActionCatalog::standard().unwrap(),
                config: CombatConfig::standard().unwrap(),
            }
        }

        fn input(&self, id: ActionId, zone: Zone) -> StrikeInput<'_> {
            StrikeInput {
                action: self.catalog.get(id).unwrap(),
                zone,
                attacker_power_pct: 100,
                attacker_exhausted: false,
                combo: ComboBonus::default(),
                defender_defense_pct: 100,
                defender_guarding: false,
                defender_evading: false,
                defender_in_startup: false,
            }
        }

        fn strike(&self, input: &StrikeInput<'_>, unit: f64) -> Strike {
            let mut rng = Midpoint(Fixed::from_num(unit));
            resolve_strike(input, &self.config, 70, &mut rng)
        }
    }

    #[test]
    fn test_plain_jab_to_body() {
        let f = Fixture::new();
        let strike = f.strike(&f.input(ActionId::Jab, Zone::Body), 0.5);
        assert_eq!(strike.base_damage, 10);
        assert_eq!(strike.damage, 10);
        assert!(!strike.crit && !strike.blocked && !strike.dodged && !strike.counter);
        assert_eq!(strike.knockback, Fixed::from_num(2.5));
    }

    #[test]
    fn test_zone_multipliers() {
        let f = Fixture::new();
        assert_eq!(f.strike(&f.input(ActionId::Jab, Zone::Head), 0.5).damage, 15);
        assert_eq!(f.strike(&f.input(ActionId::Jab, Zone::Legs), 0.5).damage, 8);
    }

    #[test]
    fn test_guard_keeps_thirty_percent() {
        let f = Fixture::new();
        let mut input = f.input(ActionId::Jab, Zone::Body);
        input.defender_guarding = true;
        let strike = f.strike(&input, 0.5);
        assert_eq!(strike.damage, 3);
        assert!(strike.blocked);
        assert!(!strike.guard_broken);
        assert_eq!(strike.knockback, Fixed::from_num(0.75));
    }

    #[test]
    fn test_guard_break_halves_and_flags() {
        let f = Fixture::new();
        let mut input = f.input(ActionId::Cross, Zone::Body);
        input.defender_guarding = true;
        // Cross midpoint of 18..=25 is 21.
        let strike = f.strike(&input, 0.5);
        assert_eq!(strike.base_damage, 21);
        assert_eq!(strike.damage, 10);
        assert!(strike.guard_broken);
        assert!(!strike.blocked);
    }

    #[test]
    fn test_crit_doubles() {
        let f = Fixture::new();
        // 0.01 is under the 5% base crit chance.
        let strike = f.strike(&f.input(ActionId::Jab, Zone::Body), 0.01);
        assert!(strike.crit);
        assert_eq!(strike.damage, 20);
        assert_eq!(strike.knockback, Fixed::from_num(3.75));
    }

    #[test]
    fn test_counter_multiplies() {
        let f = Fixture::new();
        let mut input = f.input(ActionId::Jab, Zone::Body);
        input.defender_in_startup = true;
        let strike = f.strike(&input, 0.5);
        assert!(strike.counter);
        assert_eq!(strike.damage, 15);
    }

    #[test]
    fn test_exhaustion_and_defense() {
        let f = Fixture::new();
        let mut input = f.input(ActionId::Jab, Zone::Body);
        input.attacker_exhausted = true;
        assert_eq!(f.strike(&input, 0.5).damage, 7);

        let mut input = f.input(ActionId::Jab, Zone::Body);
        input.defender_defense_pct = 200;
        assert_eq!(f.strike(&input, 0.5).damage, 5);
    }

    #[test]
    fn test_combo_bonus_applies() {
        let f = Fixture::new();
        let mut input = f.input(ActionId::Cross, Zone::Body);
        input.combo = ComboBonus::Sequence(110);
        // 21 x 1.10 = 23.1
        assert_eq!(f.strike(&input, 0.5).damage, 23);
    }

    #[test]
    fn test_miss_when_roll_above_hit_chance() {
        let f = Fixture::new();
        let strike = f.strike(&f.input(ActionId::Uppercut, Zone::Body), 0.5);
        assert!(strike.dodged);
        assert_eq!(strike.damage, 0);
        assert_eq!(strike.knockback, Fixed::ZERO);
    }

    #[test]
    fn test_evading_defender_slips() {
        let f = Fixture::new();
        let mut input = f.input(ActionId::Jab, Zone::Body);
        input.defender_evading = true;
        let strike = f.strike(&input, 0.5);
        assert!(strike.dodged);
        assert!(!strike.connected());
    }

    #[test]
    fn test_stun_proc_on_heavy() {
        let f = Fixture::new();
        // 0.1 passes hook's 60% hit, 30% crit and 20% stun checks.
        let strike = f.strike(&f.input(ActionId::Hook, Zone::Body), 0.1);
        assert!(strike.stun_proc);
        assert!(strike.crit);
        assert_eq!(strike.damage, 66);
    }
}
