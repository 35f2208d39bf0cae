//! The match loop.
//!
//! [`CombatEngine`] owns both combatants and advances them one tick at a
//! time. Within a tick the order is fixed:
//!
//! 1. Each combatant turns to face the other
//! 2. Both action state machines advance
//! 3. The clinch override runs, suspending strikes while held
//! 4. Both armed actions are tested against the other's hurt regions, and
//!    every strike is computed from the same pre-strike snapshot
//! 5. Strikes are applied to defenders, then credited to attackers
//!
//! A tick with no strike returns `None`.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::catalog::ActionId;
use crate::collision::CollisionHit;
use crate::combatant::{Actable, Combatant, DamageResult, Execution, Rejection, Slot};
use crate::config::{CombatConfig, Ruleset};
use crate::damage::{resolve_strike, Strike, StrikeInput};
use crate::math::{per_tick, percent_fraction, Fixed};
use crate::outcome::{CombatOutcome, TickOutcome};
use crate::rng::{CombatRng, SeededRng};
use crate::spatial::RangeZone;

/// Outcome records kept for presentation layers.
pub const RECENT_OUTCOMES: usize = 10;

/// Two combatants and the per-tick rules between them.
#[derive(Debug, Clone)]
pub struct CombatEngine<R = SeededRng> {
    rules: Arc<Ruleset>,
    fighters: [Combatant; 2],
    rngs: [R; 2],
    tick: u64,
    clinch_ticks: u32,
    momentum: Fixed,
    recent: VecDeque<TickOutcome>,
}

impl CombatEngine {
    /// Engine with one seeded roll stream per combatant.
    #[must_use]
    pub fn new(rules: Arc<Ruleset>, seed: u64) -> Self {
        Self::with_rngs(rules, [SeededRng::new(seed, 0), SeededRng::new(seed, 1)])
    }
}

impl<R: CombatRng> CombatEngine<R> {
    /// Engine with caller-supplied roll sources, slot one first.
    #[must_use]
    pub fn with_rngs(rules: Arc<Ruleset>, rngs: [R; 2]) -> Self {
        let fighters = [
            Combatant::new(Slot::One, &rules.combat),
            Combatant::new(Slot::Two, &rules.combat),
        ];
        let mut engine = Self {
            rules,
            fighters,
            rngs,
            tick: 0,
            clinch_ticks: 0,
            momentum: Fixed::ZERO,
            recent: VecDeque::with_capacity(RECENT_OUTCOMES),
        };
        engine.face_each_other();
        engine
    }

    /// Shared rules.
    #[must_use]
    pub fn rules(&self) -> &Arc<Ruleset> {
        &self.rules
    }

    /// Ticks simulated so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// A combatant.
    #[must_use]
    pub fn combatant(&self, slot: Slot) -> &Combatant {
        &self.fighters[slot.index()]
    }

    /// A combatant, for scenario setup.
    pub fn combatant_mut(&mut self, slot: Slot) -> &mut Combatant {
        &mut self.fighters[slot.index()]
    }

    /// Gap between the two anchors.
    #[must_use]
    pub fn distance(&self) -> Fixed {
        self.fighters[0]
            .position()
            .distance_to(self.fighters[1].position())
    }

    /// Current range zone.
    #[must_use]
    pub fn range_zone(&self) -> RangeZone {
        RangeZone::classify(self.distance(), &self.rules.combat.ranges)
    }

    /// A clinch is holding.
    #[must_use]
    pub const fn is_clinched(&self) -> bool {
        self.clinch_ticks > 0
    }

    /// Ticks left in the clinch.
    #[must_use]
    pub const fn clinch_ticks(&self) -> u32 {
        self.clinch_ticks
    }

    /// Momentum in `[-1, 1]`, positive favoring slot one.
    #[must_use]
    pub const fn momentum(&self) -> Fixed {
        self.momentum
    }

    /// Most recent outcome records, oldest first.
    pub fn recent_outcomes(&self) -> impl Iterator<Item = &TickOutcome> {
        self.recent.iter()
    }

    /// Hand a chosen action to a combatant before the tick runs.
    ///
    /// `None` means the source chose nothing; the combatant stays as it is.
    pub fn submit(
        &mut self,
        slot: Slot,
        choice: Option<ActionId>,
    ) -> Option<Result<Execution, Rejection>> {
        let id = choice?;
        self.face_each_other();

        let rules = Arc::clone(&self.rules);
        let was_left = self.is_left(slot);
        let result = self.fighters[slot.index()].execute(id, &rules);
        match result {
            Ok(execution) => {
                self.keep_apart(slot, was_left);
                if id == ActionId::Clinch && execution == Execution::Started {
                    let reach = rules.catalog.get(id).map_or(0, |spec| spec.range);
                    if self.distance() <= Fixed::from_num(reach) && !self.is_clinched() {
                        self.start_clinch();
                    }
                }
            }
            Err(reason) => {
                tracing::trace!(slot = ?slot, action = %id, %reason, "Execute rejected");
            }
        }
        Some(result)
    }

    /// Advance one tick.
    pub fn step(&mut self) -> Option<TickOutcome> {
        self.tick += 1;
        let rules = Arc::clone(&self.rules);

        // 1. Facing
        self.face_each_other();

        // 2. Action state machines. A chained action moves like a
        // submitted one and obeys the same spacing.
        let was_left = Slot::BOTH.map(|slot| self.is_left(slot));
        let chained = [
            self.fighters[0].tick(&rules).chained.is_some(),
            self.fighters[1].tick(&rules).chained.is_some(),
        ];
        for slot in Slot::BOTH {
            if chained[slot.index()] {
                self.keep_apart(slot, was_left[slot.index()]);
            }
        }

        // 3. Clinch override
        let clinched = self.update_clinch(&rules.combat);

        // 4-5. Strikes
        let outcome = if clinched {
            None
        } else {
            self.resolve_strikes(&rules)
        };

        if let Some(outcome) = &outcome {
            if self.recent.len() == RECENT_OUTCOMES {
                self.recent.pop_front();
            }
            self.recent.push_back(outcome.clone());
        }

        #[cfg(feature = "debug-validation")]
        self.validate();

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Combat state hash");
        }

        outcome
    }

    /// Round reset for both combatants.
    pub fn reset_round(&mut self) {
        for fighter in &mut self.fighters {
            fighter.reset();
        }
        self.clinch_ticks = 0;
        self.momentum = Fixed::ZERO;
        self.recent.clear();
        self.face_each_other();
    }

    /// Match reset for both combatants.
    pub fn reset_match(&mut self) {
        self.reset_round();
        for fighter in &mut self.fighters {
            fighter.reset_match();
        }
        self.tick = 0;
    }

    /// Hash of the simulation state for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.clinch_ticks.hash(&mut hasher);
        self.momentum.to_bits().hash(&mut hasher);

        for fighter in &self.fighters {
            let resources = fighter.resources();
            resources.health().hash(&mut hasher);
            resources.stamina().to_bits().hash(&mut hasher);
            resources.stun_ticks().hash(&mut hasher);
            resources.is_blocking().hash(&mut hasher);

            let position = fighter.position();
            position.x().to_bits().hash(&mut hasher);
            position.knockback().to_bits().hash(&mut hasher);
            position.facing().hash(&mut hasher);

            if let Some(action) = fighter.action() {
                action.id().hash(&mut hasher);
                action.phase().hash(&mut hasher);
                action.elapsed().hash(&mut hasher);
                action.has_struck().hash(&mut hasher);
            }
            fighter.queued().hash(&mut hasher);
            fighter.knockdown_ticks().hash(&mut hasher);
            fighter.combo().count().hash(&mut hasher);
            fighter.combo().timer().hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Whether `slot` stands left of its opponent. Ties go to slot one.
    fn is_left(&self, slot: Slot) -> bool {
        let me = self.fighters[slot.index()].position().x();
        let opponent = self.fighters[slot.other().index()].position().x();
        match me.cmp(&opponent) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => slot == Slot::One,
        }
    }

    /// Hold `slot` at least the minimum separation from its opponent,
    /// on the side it stood before moving.
    fn keep_apart(&mut self, slot: Slot, was_left: bool) {
        let min_gap = Fixed::from_num(self.rules.combat.arena.min_separation);
        let (me, opponent) = pair_mut(&mut self.fighters, slot);
        me.keep_clear_of(opponent.position().x(), min_gap, was_left);
    }

    fn face_each_other(&mut self) {
        let x1 = self.fighters[0].position().x();
        let x2 = self.fighters[1].position().x();
        self.fighters[0].face_towards(x2);
        self.fighters[1].face_towards(x1);
    }

    /// Returns `true` while the clinch suspends strikes.
    fn update_clinch(&mut self, config: &CombatConfig) -> bool {
        if self.clinch_ticks > 0 {
            self.clinch_ticks -= 1;
            let bonus = per_tick(config.clinch.stamina_bonus_per_sec);
            for fighter in &mut self.fighters {
                fighter.restore_stamina(bonus);
            }
            if self.clinch_ticks == 0 {
                self.break_clinch(config);
            }
            return true;
        }

        let both_up = self.fighters.iter().all(|f| !f.is_knocked_down());
        if both_up && self.distance() < Fixed::from_num(config.clinch.auto_distance) {
            self.start_clinch();
            return true;
        }
        false
    }

    fn start_clinch(&mut self) {
        self.clinch_ticks = self.rules.combat.clinch.duration;
        tracing::debug!(tick = self.tick, distance = %self.distance(), "Clinch");
    }

    fn break_clinch(&mut self, config: &CombatConfig) {
        let x1 = self.fighters[0].position().x();
        let x2 = self.fighters[1].position().x();
        let mid = (x1 + x2) / Fixed::from_num(2);
        let half = Fixed::from_num(config.clinch.break_distance) / Fixed::from_num(2);
        let (left, right) = if x1 <= x2 { (0, 1) } else { (1, 0) };
        let left_x = self.fighters[left].position().x();
        let right_x = self.fighters[right].position().x();
        self.fighters[left].shift(mid - half - left_x);
        self.fighters[right].shift(mid + half - right_x);
        tracing::debug!(tick = self.tick, distance = %self.distance(), "Clinch broken");
    }

    fn resolve_strikes(&mut self, rules: &Ruleset) -> Option<TickOutcome> {
        let config = &rules.combat;

        // Snapshot both sides before anything lands.
        let hurt = [
            self.fighters[0].hurt_regions(config),
            self.fighters[1].hurt_regions(config),
        ];
        let profiles = [
            self.fighters[0].strike_profile(config),
            self.fighters[1].strike_profile(config),
        ];
        let evade_chance = rules
            .catalog
            .get(ActionId::Evade)
            .map_or(0, |spec| spec.hit_chance);

        let mut strikes: [Option<(CollisionHit, Strike)>; 2] = [None, None];
        for slot in Slot::BOTH {
            let (i, j) = (slot.index(), slot.other().index());
            let Some(hit) = self.fighters[i].strike_at(&hurt[j]) else {
                continue;
            };
            let Some(action) = self.fighters[i].action().map(|a| a.id()) else {
                continue;
            };
            let Some(spec) = rules.catalog.get(action) else {
                tracing::error!(slot = ?slot, action = %action, "Active action has no catalog entry");
                debug_assert!(false, "active action without catalog entry");
                continue;
            };

            let (attacker, defender) = (&profiles[i], &profiles[j]);
            let input = StrikeInput {
                action: spec,
                zone: hit.zone,
                attacker_power_pct: attacker.power_pct,
                attacker_exhausted: attacker.exhausted,
                combo: attacker.combo,
                defender_defense_pct: defender.defense_pct,
                defender_guarding: defender.guarding,
                defender_evading: defender.evading,
                defender_in_startup: defender.in_startup,
            };
            let strike = resolve_strike(&input, config, evade_chance, &mut self.rngs[i]);
            strikes[i] = Some((hit, strike));
        }

        if strikes.iter().all(Option::is_none) {
            return None;
        }
        let trade = strikes
            .iter()
            .all(|s| s.as_ref().is_some_and(|(_, strike)| strike.connected()));

        // Defenders first: a hit taken breaks a combo before that
        // combatant's own strike is credited.
        let mut applied = [DamageResult::default(); 2];
        for slot in Slot::BOTH {
            let (i, j) = (slot.index(), slot.other().index());
            if let Some((_, strike)) = &strikes[i] {
                applied[i] = self.fighters[j].receive_hit(strike, profiles[i].x, config);
            }
        }

        let mut entries = Vec::with_capacity(2);
        for slot in Slot::BOTH {
            let i = slot.index();
            let Some((hit, strike)) = strikes[i] else {
                continue;
            };
            let completed = self.fighters[i].record_strike(&strike, applied[i].damage, config);
            let combo_name = if strike.dodged {
                None
            } else {
                completed.or_else(|| {
                    self.fighters[i]
                        .combo()
                        .sequence_name(&config.combo)
                        .map(str::to_owned)
                })
            };
            self.shift_momentum(slot, applied[i].damage, config);

            tracing::debug!(
                tick = self.tick,
                attacker = ?slot,
                action = %strike.action,
                zone = ?strike.zone,
                damage = strike.damage,
                crit = strike.crit,
                blocked = strike.blocked,
                dodged = strike.dodged,
                "Strike resolved"
            );

            entries.push(CombatOutcome {
                attacker: slot,
                action: strike.action,
                damage: strike.damage,
                zone: strike.zone,
                crit: strike.crit,
                counter: strike.counter,
                blocked: strike.blocked,
                dodged: strike.dodged,
                guard_broken: strike.guard_broken,
                staggered: strike.stun_proc && strike.is_clean() && !applied[i].knockdown,
                combo_count: self.fighters[i].combo().count(),
                combo_name,
                knockdown: applied[i].knockdown,
                x: hit.x,
                y: hit.y,
            });
        }

        if trade {
            tracing::debug!(tick = self.tick, "Trade");
        }

        Some(TickOutcome {
            tick: self.tick,
            entries,
            trade,
            momentum: self.momentum,
        })
    }

    fn shift_momentum(&mut self, attacker: Slot, damage: u32, config: &CombatConfig) {
        let cap = percent_fraction(config.momentum.per_hit_cap_pct);
        let shift = (Fixed::from_num(damage) / Fixed::from_num(100)).min(cap);
        let signed = match attacker {
            Slot::One => shift,
            Slot::Two => -shift,
        };
        self.momentum = (self.momentum + signed).clamp(-Fixed::ONE, Fixed::ONE);
    }

    #[cfg(feature = "debug-validation")]
    fn validate(&self) {
        for fighter in &self.fighters {
            let r = fighter.resources();
            assert!(r.health() <= r.max_health(), "health above maximum");
            assert!(r.stamina() >= Fixed::ZERO, "negative stamina");
            assert!(r.stamina() <= r.max_stamina(), "stamina above maximum");
            let combo = fighter.combo();
            assert_eq!(combo.count() > 0, combo.timer() > 0, "combo timer out of step");
        }
    }
}

fn pair_mut(fighters: &mut [Combatant; 2], slot: Slot) -> (&mut Combatant, &mut Combatant) {
    let (one, two) = fighters.split_at_mut(1);
    match slot {
        Slot::One => (&mut one[0], &mut two[0]),
        Slot::Two => (&mut two[0], &mut one[0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionPhase;
    use crate::rng::testing::Midpoint;
    use crate::spatial::Facing;

    fn engine() -> CombatEngine<Midpoint> {
        CombatEngine::with_rngs(
            Ruleset::standard().unwrap().shared(),
            [Midpoint::half(), Midpoint::half()],
        )
    }

    fn place(engine: &mut CombatEngine<Midpoint>, one: i32, two: i32) {
        engine
            .combatant_mut(Slot::One)
            .place_at(Fixed::from_num(one));
        engine
            .combatant_mut(Slot::Two)
            .place_at(Fixed::from_num(two));
        engine.face_each_other();
    }

    fn run_until_outcome(engine: &mut CombatEngine<Midpoint>, max: u32) -> Option<TickOutcome> {
        (0..max).find_map(|_| engine.step())
    }

    #[test]
    fn test_starts_facing_each_other() {
        let engine = engine();
        assert_eq!(
            engine.combatant(Slot::One).position().facing(),
            Facing::Right
        );
        assert_eq!(engine.combatant(Slot::Two).position().facing(), Facing::Left);
        assert_eq!(engine.range_zone(), RangeZone::Far);
    }

    #[test]
    fn test_idle_ticks_are_silent() {
        let mut engine = engine();
        for _ in 0..120 {
            assert!(engine.step().is_none());
        }
        assert_eq!(engine.tick(), 120);
    }

    #[test]
    fn test_none_choice_is_no_op() {
        let mut engine = engine();
        let before = engine.state_hash();
        assert!(engine.submit(Slot::One, None).is_none());
        assert_eq!(engine.state_hash(), before);
    }

    #[test]
    fn test_jab_lands_on_active_frame() {
        let mut engine = engine();
        place(&mut engine, 400, 540);
        engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
        assert!(engine.step().is_none());
        assert!(engine.step().is_none());
        let outcome = engine.step().unwrap();
        assert_eq!(outcome.tick, 3);
        assert_eq!(outcome.entries.len(), 1);
        assert!(!outcome.trade);
        let entry = outcome.by(Slot::One).unwrap();
        assert_eq!(entry.damage, 10);
        assert_eq!(entry.combo_count, 1);
        assert_eq!(engine.combatant(Slot::Two).resources().health(), 90);
        assert_eq!(outcome.momentum, Fixed::from_num(10) / Fixed::from_num(100));
    }

    #[test]
    fn test_trade_reports_both() {
        let mut engine = engine();
        place(&mut engine, 400, 600);
        engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
        engine.submit(Slot::Two, Some(ActionId::Jab)).unwrap().unwrap();
        assert_eq!(engine.distance(), Fixed::from_num(80));

        let outcome = run_until_outcome(&mut engine, 5).unwrap();
        assert!(outcome.trade);
        assert_eq!(outcome.entries.len(), 2);
        for slot in Slot::BOTH {
            let entry = outcome.by(slot).unwrap();
            assert_eq!(entry.damage, 10);
            assert!(!entry.counter);
            assert_eq!(entry.combo_count, 1);
        }
        assert_eq!(outcome.momentum, Fixed::ZERO);
    }

    #[test]
    fn test_counter_against_wind_up() {
        let mut engine = engine();
        place(&mut engine, 400, 540);
        engine.submit(Slot::Two, Some(ActionId::Uppercut)).unwrap().unwrap();
        place(&mut engine, 400, 540);
        engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();

        let outcome = run_until_outcome(&mut engine, 5).unwrap();
        let entry = outcome.by(Slot::One).unwrap();
        assert!(entry.counter);
        assert_eq!(entry.damage, 15);
        assert!(!outcome.trade);
        assert!(engine.combatant(Slot::Two).action().is_none());
    }

    #[test]
    fn test_auto_clinch_suspends_strikes() {
        let mut engine = engine();
        place(&mut engine, 500, 530);
        assert!(engine.step().is_none());
        assert!(engine.is_clinched());

        let stamina_before = engine.combatant(Slot::One).resources().stamina();
        for _ in 0..engine.rules().combat.clinch.duration {
            assert!(engine.step().is_none());
        }
        assert!(!engine.is_clinched());
        assert!(engine.distance() >= Fixed::from_num(engine.rules().combat.clinch.break_distance));
        assert!(engine.combatant(Slot::One).resources().stamina() >= stamina_before);
    }

    #[test]
    fn test_advance_cannot_pass_opponent() {
        let mut engine = engine();
        place(&mut engine, 500, 560);
        engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
        assert_eq!(engine.distance(), Fixed::from_num(30));
        assert!(engine.combatant(Slot::One).position().x() < engine.combatant(Slot::Two).position().x());
    }

    #[test]
    fn test_chained_advance_cannot_pass_opponent() {
        let mut engine = engine();
        place(&mut engine, 400, 500);
        engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
        run_until_outcome(&mut engine, 5).unwrap();

        while engine.combatant(Slot::One).phase() != ActionPhase::Recovery {
            engine.step();
        }
        let queued = engine.submit(Slot::One, Some(ActionId::Jab)).unwrap();
        assert_eq!(queued, Ok(Execution::Queued));

        let min_gap = Fixed::from_num(engine.rules().combat.arena.min_separation);
        let mut chained = false;
        for _ in 0..20 {
            engine.step();
            chained |= engine.combatant(Slot::One).queued().is_none()
                && engine.combatant(Slot::One).action().is_some();
            let one = engine.combatant(Slot::One).position().x();
            let two = engine.combatant(Slot::Two).position().x();
            assert!(one < two, "slot one crossed over at tick {}", engine.tick());
            assert!(engine.distance() >= min_gap);
        }
        assert!(chained);
    }

    #[test]
    fn test_reset_round_restores() {
        let mut engine = engine();
        place(&mut engine, 400, 540);
        engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
        run_until_outcome(&mut engine, 5).unwrap();
        engine.reset_round();
        let two = engine.combatant(Slot::Two);
        assert_eq!(two.resources().health(), 100);
        assert_eq!(two.position().x(), Fixed::from_num(880));
        assert_eq!(engine.combatant(Slot::One).phase(), ActionPhase::None);
        assert_eq!(engine.momentum(), Fixed::ZERO);
        assert_eq!(engine.combatant(Slot::One).stats().hits_landed, 1);

        engine.reset_match();
        assert_eq!(engine.combatant(Slot::One).stats().hits_landed, 0);
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn test_recent_outcomes_bounded() {
        let mut engine = engine();
        let mut ticks = Vec::new();
        for _ in 0..(RECENT_OUTCOMES + 4) {
            while engine.combatant(Slot::One).action().is_some() {
                engine.step();
            }
            place(&mut engine, 400, 540);
            engine
                .combatant_mut(Slot::Two)
                .resources_mut()
                .set_health(100);
            engine.submit(Slot::One, Some(ActionId::Jab)).unwrap().unwrap();
            ticks.push(run_until_outcome(&mut engine, 5).unwrap().tick);
        }
        let log: Vec<u64> = engine.recent_outcomes().map(|o| o.tick).collect();
        assert_eq!(log.len(), RECENT_OUTCOMES);
        assert_eq!(log, ticks[4..].to_vec());
    }
}
