//! The combatant aggregate.
//!
//! A [`Combatant`] owns its resources, position, current action, chain
//! queue, combo tracker and statistics. The match loop drives it through
//! the [`Actable`] contract and the per-tick [`Combatant::tick`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{ActionPhase, ActiveAction, PhaseChange};
use crate::catalog::{ActionCatalog, ActionId, ActionSpec};
use crate::collision::{self, CollisionHit};
use crate::combo::{ComboBonus, ComboTracker};
use crate::config::{CombatConfig, Ruleset};
use crate::damage::Strike;
use crate::math::{fixed_serde, Fixed};
use crate::regions::{Pose, WorldHurtRegion};
use crate::resources::CombatantResources;
use crate::spatial::PositionAndRange;
use crate::stats::CombatStats;

/// Which corner a combatant fights from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Starts on the left.
    One,
    /// Starts on the right.
    Two,
}

impl Slot {
    /// Both slots in resolution order.
    pub const BOTH: [Slot; 2] = [Slot::One, Slot::Two];

    /// Array index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// The opposing slot.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

/// How an accepted execute took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Execution {
    /// Began immediately.
    Started,
    /// Queued to follow the current action's recovery.
    Queued,
    /// Took effect and finished at once (no frames).
    Instant,
}

/// Why an execute was refused. Refusals leave the combatant unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Stun timer running.
    #[error("combatant is stunned")]
    Stunned,
    /// On the canvas.
    #[error("combatant is knocked down")]
    KnockedDown,
    /// Another action is running and the request cannot chain from it.
    #[error("busy with {current} in {phase:?}")]
    Busy {
        /// Running action.
        current: ActionId,
        /// Its phase.
        phase: ActionPhase,
    },
    /// No stamina left for a costed action.
    #[error("out of stamina for {0}")]
    OutOfStamina(ActionId),
    /// The catalog has no entry for the request.
    #[error("no catalog entry for {0}")]
    UnknownAction(ActionId),
}

/// Effect of a strike once applied to its defender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    /// Health actually removed.
    pub damage: u32,
    /// Guard absorbed the strike.
    pub blocked: bool,
    /// Guard was broken.
    pub guard_broken: bool,
    /// Strike avoided entirely.
    pub dodged: bool,
    /// The defender's action was cancelled.
    pub interrupted: bool,
    /// Stun applied, ticks.
    pub stun_ticks: u32,
    /// The strike knocked the defender down.
    pub knockdown: bool,
}

/// Capability contract the match loop relies on.
pub trait Actable {
    /// Whether a non-chained action could start now.
    fn can_act(&self) -> bool;

    /// Attempt an action.
    fn execute(&mut self, id: ActionId, rules: &Ruleset) -> Result<Execution, Rejection>;

    /// Apply a resolved strike from an attacker standing at `attacker_x`.
    fn receive_hit(&mut self, strike: &Strike, attacker_x: Fixed, config: &CombatConfig)
        -> DamageResult;
}

/// Per-tick changes reported by [`Combatant::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatantTick {
    /// Phase boundary crossed.
    pub phase_change: Option<PhaseChange>,
    /// Queued action that began this tick.
    pub chained: Option<ActionId>,
    /// Combo expired this tick.
    pub combo_expired: bool,
    /// Got back up from a knockdown.
    pub got_up: bool,
}

/// Read-only snapshot handed to decision sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantView {
    /// Corner.
    pub slot: Slot,
    /// Current health.
    pub health: u32,
    /// Health percent, whole.
    pub health_pct: u32,
    /// Current stamina, whole.
    pub stamina: u32,
    /// Stamina percent, whole.
    pub stamina_pct: u32,
    /// Anchor x.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Running action.
    pub action: Option<ActionId>,
    /// Its phase.
    pub phase: ActionPhase,
    /// Last action executed.
    pub last_action: Option<ActionId>,
    /// Current combo length.
    pub combo_count: u32,
    /// Ready for a new action.
    pub can_act: bool,
}

/// Pre-tick values the damage formula reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StrikeProfile {
    pub x: Fixed,
    pub power_pct: u32,
    pub defense_pct: u32,
    pub exhausted: bool,
    pub combo: ComboBonus,
    pub guarding: bool,
    pub evading: bool,
    pub in_startup: bool,
}

/// One fighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    slot: Slot,
    resources: CombatantResources,
    position: PositionAndRange,
    action: Option<ActiveAction>,
    queued: Option<ActionId>,
    combo: ComboTracker,
    knockdown_ticks: u32,
    last_action: Option<ActionId>,
    stats: CombatStats,
    #[serde(with = "fixed_serde")]
    start_x: Fixed,
}

impl Combatant {
    /// A fresh combatant in its corner.
    #[must_use]
    pub fn new(slot: Slot, config: &CombatConfig) -> Self {
        let start = match slot {
            Slot::One => config.arena.start_x.0,
            Slot::Two => config.arena.start_x.1,
        };
        let start_x = Fixed::from_num(start);
        Self {
            slot,
            resources: CombatantResources::new(&config.fighter, &config.stamina),
            position: PositionAndRange::new(start_x, &config.arena),
            action: None,
            queued: None,
            combo: ComboTracker::new(),
            knockdown_ticks: 0,
            last_action: None,
            stats: CombatStats::default(),
            start_x,
        }
    }

    /// Corner.
    #[must_use]
    pub const fn slot(&self) -> Slot {
        self.slot
    }

    /// Resources.
    #[must_use]
    pub const fn resources(&self) -> &CombatantResources {
        &self.resources
    }

    /// Mutable resources, for scenario setup.
    pub fn resources_mut(&mut self) -> &mut CombatantResources {
        &mut self.resources
    }

    /// Position.
    #[must_use]
    pub const fn position(&self) -> &PositionAndRange {
        &self.position
    }

    /// Move the anchor, for scenario setup.
    pub fn place_at(&mut self, x: Fixed) {
        self.position.reset(x);
    }

    /// Running action.
    #[must_use]
    pub const fn action(&self) -> Option<&ActiveAction> {
        self.action.as_ref()
    }

    /// Action queued behind the current one.
    #[must_use]
    pub const fn queued(&self) -> Option<ActionId> {
        self.queued
    }

    /// Phase of the running action.
    #[must_use]
    pub fn phase(&self) -> ActionPhase {
        self.action.map_or(ActionPhase::None, |a| a.phase())
    }

    /// Last action executed.
    #[must_use]
    pub const fn last_action(&self) -> Option<ActionId> {
        self.last_action
    }

    /// Combo tracker.
    #[must_use]
    pub const fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    /// Statistics.
    #[must_use]
    pub const fn stats(&self) -> &CombatStats {
        &self.stats
    }

    /// Health as a percent.
    #[must_use]
    pub fn health_percent(&self) -> Fixed {
        self.resources.health_percent()
    }

    /// Stamina as a percent.
    #[must_use]
    pub fn stamina_percent(&self) -> Fixed {
        self.resources.stamina_percent()
    }

    /// Health has reached zero.
    #[must_use]
    pub const fn is_knocked_out(&self) -> bool {
        self.resources.is_depleted()
    }

    /// Ticks left on the canvas.
    #[must_use]
    pub const fn knockdown_ticks(&self) -> u32 {
        self.knockdown_ticks
    }

    /// On the canvas.
    #[must_use]
    pub const fn is_knocked_down(&self) -> bool {
        self.knockdown_ticks > 0 || self.resources.is_depleted()
    }

    /// Guard up.
    #[must_use]
    pub const fn is_guarding(&self) -> bool {
        self.resources.is_blocking()
    }

    /// Inside an evade's live window.
    #[must_use]
    pub fn is_evading(&self) -> bool {
        self.action
            .is_some_and(|a| a.id() == ActionId::Evade && a.phase() == ActionPhase::Active)
    }

    /// Stance for hurt-region selection.
    #[must_use]
    pub fn pose(&self) -> Pose {
        if self.is_knocked_down() {
            return Pose::Knockdown;
        }
        if self.resources.is_blocking() {
            return Pose::Blocking;
        }
        match self.action {
            Some(a) if a.id() == ActionId::Evade && a.phase() != ActionPhase::Recovery => {
                Pose::Crouching
            }
            Some(a) if a.id().is_attack() => Pose::Attacking,
            _ => Pose::Idle,
        }
    }

    /// Hurt regions placed at the current anchor.
    #[must_use]
    pub fn hurt_regions(&self, config: &CombatConfig) -> Vec<WorldHurtRegion> {
        config
            .hurt_regions
            .place(self.pose(), self.position.x(), self.position.facing())
    }

    /// Snapshot for decision sources.
    #[must_use]
    pub fn view(&self) -> CombatantView {
        CombatantView {
            slot: self.slot,
            health: self.resources.health(),
            health_pct: crate::math::floor_to_u32(self.health_percent()),
            stamina: self.resources.stamina_whole(),
            stamina_pct: crate::math::floor_to_u32(self.stamina_percent()),
            x: self.position.x(),
            action: self.action.map(|a| a.id()),
            phase: self.phase(),
            last_action: self.last_action,
            combo_count: self.combo.count(),
            can_act: self.can_act(),
        }
    }

    /// Advance timers, the action state machine, stamina and knockback.
    pub fn tick(&mut self, rules: &Ruleset) -> CombatantTick {
        let mut report = CombatantTick::default();
        let idle = self.action.is_none();

        self.resources.tick_stun();

        if self.knockdown_ticks > 0 {
            self.knockdown_ticks -= 1;
            if self.knockdown_ticks == 0 && !self.resources.is_depleted() {
                report.got_up = true;
                tracing::debug!(slot = ?self.slot, "Back on feet");
            }
        }

        if let Some(action) = self.action.as_mut() {
            if let Some(change) = action.advance() {
                if action.id() == ActionId::Guard {
                    self.resources.set_blocking(change.to == ActionPhase::Active);
                }
                tracing::trace!(
                    slot = ?self.slot,
                    action = %action.id(),
                    from = ?change.from,
                    to = ?change.to,
                    "Action phase change"
                );
                report.phase_change = Some(change);
            }
            if action.is_finished() {
                let chain_len = action.chain_len();
                self.action = None;
                report.chained = self.start_queued(rules, chain_len);
            }
        }

        let regen = self.resources.regen_per_tick(idle);
        self.resources.restore_stamina(regen);
        self.position.step_knockback(rules.combat.knockback.decay_pct);
        report.combo_expired = self.combo.tick();
        report
    }

    /// Test this combatant's armed action against `defender`.
    pub(crate) fn strike_at(&mut self, defender: &[WorldHurtRegion]) -> Option<CollisionHit> {
        let x = self.position.x();
        let facing = self.position.facing();
        let action = self.action.as_mut()?;
        collision::resolve(action, x, facing, defender)
    }

    pub(crate) fn strike_profile(&self, config: &CombatConfig) -> StrikeProfile {
        StrikeProfile {
            x: self.position.x(),
            power_pct: self.resources.power_pct(),
            defense_pct: self.resources.defense_pct(),
            exhausted: self.resources.is_exhausted(),
            combo: self.combo.bonus(&config.combo),
            guarding: self.resources.is_blocking(),
            evading: self.is_evading(),
            in_startup: self.phase() == ActionPhase::Startup,
        }
    }

    /// Credit a strike this combatant threw. Returns a newly completed
    /// combo name.
    pub(crate) fn record_strike(
        &mut self,
        strike: &Strike,
        applied: u32,
        config: &CombatConfig,
    ) -> Option<String> {
        if strike.dodged {
            return None;
        }
        self.stats.hits_landed += 1;
        self.stats.damage_dealt += applied;

        let extends = strike.is_clean() || (strike.blocked && config.combo.count_blocked_hits);
        if !extends {
            return None;
        }
        let completed = self
            .combo
            .register_hit(strike.action, strike.damage, &config.combo)
            .map(|combo| {
                self.stats.style_points += combo.style_points;
                combo.name.clone()
            });
        self.stats.max_combo = self.stats.max_combo.max(self.combo.count());
        completed
    }

    pub(crate) fn face_towards(&mut self, x: Fixed) {
        self.position.face_towards(x);
    }

    pub(crate) fn shift(&mut self, dx: Fixed) {
        self.position.shift(dx);
    }

    pub(crate) fn restore_stamina(&mut self, amount: Fixed) {
        self.resources.restore_stamina(amount);
    }

    /// Round reset: resources and position restored, action and combo cleared.
    pub fn reset(&mut self) {
        self.resources.restore();
        self.position.reset(self.start_x);
        self.action = None;
        self.queued = None;
        self.combo.break_combo();
        self.knockdown_ticks = 0;
        self.last_action = None;
    }

    /// Match reset: a round reset that also zeroes statistics.
    pub fn reset_match(&mut self) {
        self.reset();
        self.combo.clear_records();
        self.stats = CombatStats::default();
    }

    fn cancel_action(&mut self) -> bool {
        self.queued = None;
        self.resources.set_blocking(false);
        self.action.take().is_some()
    }

    fn chain_allowed(current: &ActiveAction, next: &ActionSpec) -> bool {
        next.is_chainable() && current.chain_len() < next.max_chain
    }

    fn begin(
        &mut self,
        spec: &ActionSpec,
        speed_pct: u32,
        chain_len: u32,
    ) -> Result<Execution, Rejection> {
        if !self.resources.spend_stamina(spec.stamina_cost) {
            return Err(Rejection::OutOfStamina(spec.id));
        }
        self.position.step_forward(spec.movement);
        self.last_action = Some(spec.id);

        match ActiveAction::start(spec, speed_pct, chain_len) {
            Some(action) => {
                if spec.id == ActionId::Guard {
                    self.resources
                        .set_blocking(action.phase() == ActionPhase::Active);
                }
                self.action = Some(action);
                Ok(Execution::Started)
            }
            None => Ok(Execution::Instant),
        }
    }

    fn start_queued(&mut self, rules: &Ruleset, prior_chain: u32) -> Option<ActionId> {
        let next = self.queued.take()?;
        let Some(spec) = rules.catalog.get(next) else {
            tracing::error!(action = %next, "Queued action has no catalog entry");
            debug_assert!(false, "queued action without catalog entry");
            return None;
        };
        if self.resources.stamina() <= Fixed::ZERO {
            tracing::trace!(slot = ?self.slot, action = %next, "Chain dropped, no stamina");
            return None;
        }
        let speed = self.resources.effective_speed_pct();
        self.begin(spec, speed, prior_chain + 1).ok().map(|_| next)
    }

    /// Pull the anchor back so it stays at least `gap` from `other_x` on
    /// the side it started from.
    pub(crate) fn keep_clear_of(&mut self, other_x: Fixed, gap: Fixed, was_left: bool) {
        let x = self.position.x();
        if was_left && x > other_x - gap {
            self.position.shift(other_x - gap - x);
        } else if !was_left && x < other_x + gap {
            self.position.shift(other_x + gap - x);
        }
    }
}

impl Actable for Combatant {
    fn can_act(&self) -> bool {
        if self.is_knocked_down() || self.resources.is_stunned() {
            return false;
        }
        match self.action {
            None => true,
            Some(a) => a.phase() == ActionPhase::Recovery && self.queued.is_none(),
        }
    }

    fn execute(&mut self, id: ActionId, rules: &Ruleset) -> Result<Execution, Rejection> {
        if self.is_knocked_down() {
            return Err(Rejection::KnockedDown);
        }
        if self.resources.is_stunned() {
            return Err(Rejection::Stunned);
        }
        let catalog: &ActionCatalog = &rules.catalog;
        let spec = catalog.get(id).ok_or(Rejection::UnknownAction(id))?;

        if let Some(current) = self.action {
            let busy = Rejection::Busy {
                current: current.id(),
                phase: current.phase(),
            };
            if current.phase() != ActionPhase::Recovery
                || self.queued.is_some()
                || !Self::chain_allowed(&current, spec)
            {
                return Err(busy);
            }
            if spec.stamina_cost > 0 && self.resources.stamina() <= Fixed::ZERO {
                return Err(Rejection::OutOfStamina(id));
            }
            self.queued = Some(id);
            return Ok(Execution::Queued);
        }

        let speed = self.resources.effective_speed_pct();
        let result = self.begin(spec, speed, 1);
        if let Ok(execution) = result {
            tracing::trace!(
                slot = ?self.slot,
                action = %id,
                ?execution,
                "Action executed"
            );
        }
        result
    }

    fn receive_hit(
        &mut self,
        strike: &Strike,
        attacker_x: Fixed,
        config: &CombatConfig,
    ) -> DamageResult {
        if strike.dodged {
            self.stats.dodges += 1;
            return DamageResult {
                dodged: true,
                ..DamageResult::default()
            };
        }

        let applied = self.resources.take_damage(strike.damage);
        self.stats.damage_taken += applied;
        if strike.blocked {
            self.stats.blocks += 1;
        } else {
            self.stats.hits_taken += 1;
        }
        self.combo.break_combo();

        let interrupted = if strike.blocked {
            false
        } else {
            self.cancel_action()
        };

        let knockdown =
            strike.damage >= config.damage.knockdown_threshold || self.resources.is_depleted();
        let stun_ticks = if knockdown {
            self.cancel_action();
            self.knockdown_ticks = config.stun.knockdown;
            self.stats.knockdowns += 1;
            self.position.halt();
            tracing::debug!(slot = ?self.slot, damage = strike.damage, "Knocked down");
            0
        } else if strike.blocked {
            config.stun.block
        } else if strike.crit || strike.damage >= config.damage.heavy_hit_threshold {
            config.stun.heavy_hit
        } else {
            config.stun.light_hit
        };
        self.resources.stun(stun_ticks);
        if strike.stun_proc && !strike.blocked && !knockdown {
            self.resources.stun(config.stun.stagger);
        }

        if !knockdown {
            self.position.apply_knockback(attacker_x, strike.knockback);
        }

        DamageResult {
            damage: applied,
            blocked: strike.blocked,
            guard_broken: strike.guard_broken,
            dodged: false,
            interrupted,
            stun_ticks: self.resources.stun_ticks(),
            knockdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::Zone;

    fn rules() -> Ruleset {
        Ruleset::standard().unwrap()
    }

    fn strike(action: ActionId, damage: u32) -> Strike {
        Strike {
            action,
            zone: Zone::Body,
            base_damage: damage,
            raw_damage: Fixed::from_num(damage),
            damage,
            crit: false,
            counter: false,
            blocked: false,
            dodged: false,
            guard_broken: false,
            stun_proc: false,
            knockback: Fixed::from_num(2.5),
        }
    }

    fn run_ticks(c: &mut Combatant, rules: &Ruleset, n: u32) {
        for _ in 0..n {
            c.tick(rules);
        }
    }

    #[test]
    fn test_execute_spends_stamina_and_moves() {
        let rules = rules();
        let mut c = Combatant::new(Slot::One, &rules.combat);
        assert_eq!(c.execute(ActionId::Jab, &rules), Ok(Execution::Started));
        assert_eq!(c.resources().stamina(), Fixed::from_num(92));
        assert_eq!(c.position().x(), Fixed::from_num(460));
        assert_eq!(c.phase(), ActionPhase::Startup);
        assert_eq!(c.pose(), Pose::Attacking);
        assert_eq!(c.last_action(), Some(ActionId::Jab));
    }

    #[test]
    fn test_busy_rejects_without_change() {
        let rules = rules();
        let mut c = Combatant::new(Slot::One, &rules.combat);
        c.execute(ActionId::Hook, &rules).unwrap();
        let before = c.clone();
        let err = c.execute(ActionId::Jab, &rules).unwrap_err();
        assert!(matches!(err, Rejection::Busy { current: ActionId::Hook, .. }));
        assert_eq!(c, before);
    }

    #[test]
    fn test_chain_queues_during_recovery() {
        let rules = rules();
        let mut c = Combatant::new(Slot::One, &rules.combat);
        c.execute(ActionId::Jab, &rules).unwrap();
        run_ticks(&mut c, &rules, 5);
        assert_eq!(c.phase(), ActionPhase::Recovery);
        assert!(c.can_act());
        assert_eq!(c.execute(ActionId::Jab, &rules), Ok(Execution::Queued));
        assert!(!c.can_act());

        run_ticks(&mut c, &rules, 3);
        assert_eq!(c.queued(), Some(ActionId::Jab));
        let report = c.tick(&rules);
        assert_eq!(report.chained, Some(ActionId::Jab));
        assert_eq!(c.action().map(|a| a.chain_len()), Some(2));
        assert_eq!(c.phase(), ActionPhase::Startup);
    }

    #[test]
    fn test_non_chainable_rejected_in_recovery() {
        let rules = rules();
        let mut c = Combatant::new(Slot::One, &rules.combat);
        c.execute(ActionId::Jab, &rules).unwrap();
        run_ticks(&mut c, &rules, 5);
        assert!(matches!(
            c.execute(ActionId::Cross, &rules),
            Err(Rejection::Busy { .. })
        ));
    }

    #[test]
    fn test_chain_limit() {
        let mut current = ActiveAction::start(
            rules().catalog.get(ActionId::Jab).unwrap(),
            100,
            3,
        )
        .unwrap();
        current.advance();
        let rules = rules();
        let jab = rules.catalog.get(ActionId::Jab).unwrap();
        assert!(!Combatant::chain_allowed(&current, jab));
    }

    #[test]
    fn test_stunned_cannot_act() {
        let rules = rules();
        let mut c = Combatant::new(Slot::Two, &rules.combat);
        c.resources_mut().stun(5);
        assert!(!c.can_act());
        assert_eq!(c.execute(ActionId::Jab, &rules), Err(Rejection::Stunned));
    }

    #[test]
    fn test_empty_stamina_rejects_costed_action() {
        let rules = rules();
        let mut c = Combatant::new(Slot::One, &rules.combat);
        c.resources_mut().set_stamina(0);
        assert_eq!(
            c.execute(ActionId::Jab, &rules),
            Err(Rejection::OutOfStamina(ActionId::Jab))
        );
        assert_eq!(c.execute(ActionId::Recover, &rules), Ok(Execution::Instant));
    }

    #[test]
    fn test_partial_stamina_still_executes() {
        let rules = rules();
        let mut c = Combatant::new(Slot::One, &rules.combat);
        c.resources_mut().set_stamina(10);
        assert_eq!(c.execute(ActionId::Hook, &rules), Ok(Execution::Started));
        assert_eq!(c.resources().stamina(), Fixed::ZERO);
    }

    #[test]
    fn test_guard_raises_on_active() {
        let rules = rules();
        let mut c = Combatant::new(Slot::Two, &rules.combat);
        c.execute(ActionId::Guard, &rules).unwrap();
        assert!(!c.is_guarding());
        run_ticks(&mut c, &rules, 2);
        assert!(c.is_guarding());
        assert_eq!(c.pose(), Pose::Blocking);
        run_ticks(&mut c, &rules, 30);
        assert!(!c.is_guarding());
    }

    #[test]
    fn test_unguarded_hit_interrupts_and_stuns() {
        let rules = rules();
        let mut c = Combatant::new(Slot::Two, &rules.combat);
        c.execute(ActionId::Hook, &rules).unwrap();
        let result = c.receive_hit(&strike(ActionId::Jab, 10), Fixed::from_num(400), &rules.combat);
        assert!(result.interrupted);
        assert_eq!(result.damage, 10);
        assert_eq!(result.stun_ticks, rules.combat.stun.light_hit);
        assert!(c.action().is_none());
        assert_eq!(c.resources().health(), 90);
        assert!(c.position().knockback() > Fixed::ZERO);
    }

    #[test]
    fn test_blocked_hit_keeps_guard() {
        let rules = rules();
        let mut c = Combatant::new(Slot::Two, &rules.combat);
        c.execute(ActionId::Guard, &rules).unwrap();
        run_ticks(&mut c, &rules, 2);
        let mut s = strike(ActionId::Jab, 3);
        s.blocked = true;
        let result = c.receive_hit(&s, Fixed::from_num(400), &rules.combat);
        assert!(!result.interrupted);
        assert!(c.is_guarding());
        assert_eq!(result.stun_ticks, rules.combat.stun.block);
        assert_eq!(c.stats().blocks, 1);
    }

    #[test]
    fn test_guard_break_clears_guard() {
        let rules = rules();
        let mut c = Combatant::new(Slot::Two, &rules.combat);
        c.execute(ActionId::Guard, &rules).unwrap();
        run_ticks(&mut c, &rules, 2);
        let mut s = strike(ActionId::Cross, 10);
        s.guard_broken = true;
        let result = c.receive_hit(&s, Fixed::from_num(400), &rules.combat);
        assert!(result.guard_broken);
        assert!(result.interrupted);
        assert!(!c.is_guarding());
        assert!(c.action().is_none());
    }

    #[test]
    fn test_heavy_damage_knocks_down() {
        let rules = rules();
        let mut c = Combatant::new(Slot::Two, &rules.combat);
        let result = c.receive_hit(&strike(ActionId::Uppercut, 45), Fixed::from_num(400), &rules.combat);
        assert!(result.knockdown);
        assert_eq!(c.pose(), Pose::Knockdown);
        assert!(!c.can_act());
        run_ticks(&mut c, &rules, rules.combat.stun.knockdown - 1);
        assert!(c.is_knocked_down());
        let report = c.tick(&rules);
        assert!(report.got_up);
        assert!(c.can_act());
    }

    #[test]
    fn test_hit_taken_breaks_combo() {
        let rules = rules();
        let mut c = Combatant::new(Slot::One, &rules.combat);
        c.record_strike(&strike(ActionId::Jab, 10), 10, &rules.combat);
        c.record_strike(&strike(ActionId::Jab, 10), 10, &rules.combat);
        assert_eq!(c.combo().count(), 2);
        c.receive_hit(&strike(ActionId::Jab, 10), Fixed::from_num(880), &rules.combat);
        assert_eq!(c.combo().count(), 0);
        assert_eq!(c.stats().max_combo, 2);
    }

    #[test]
    fn test_dodged_strike_counts_for_defender_only() {
        let rules = rules();
        let mut a = Combatant::new(Slot::One, &rules.combat);
        let mut b = Combatant::new(Slot::Two, &rules.combat);
        let mut s = strike(ActionId::Jab, 0);
        s.dodged = true;
        let result = b.receive_hit(&s, a.position().x(), &rules.combat);
        assert!(result.dodged);
        assert!(a.record_strike(&s, 0, &rules.combat).is_none());
        assert_eq!(b.stats().dodges, 1);
        assert_eq!(a.stats().hits_landed, 0);
        assert_eq!(a.combo().count(), 0);
    }

    #[test]
    fn test_reset_and_reset_match() {
        let rules = rules();
        let mut c = Combatant::new(Slot::One, &rules.combat);
        c.execute(ActionId::Jab, &rules).unwrap();
        c.record_strike(&strike(ActionId::Jab, 10), 10, &rules.combat);
        c.receive_hit(&strike(ActionId::Jab, 10), Fixed::from_num(880), &rules.combat);

        c.reset();
        assert_eq!(c.resources().health(), 100);
        assert_eq!(c.position().x(), Fixed::from_num(400));
        assert!(c.action().is_none());
        assert_eq!(c.combo().count(), 0);
        assert_eq!(c.stats().hits_landed, 1);

        c.reset_match();
        assert_eq!(*c.stats(), CombatStats::default());
    }

    #[test]
    fn test_idle_regen_faster_than_acting() {
        let rules = rules();
        let mut idle = Combatant::new(Slot::One, &rules.combat);
        let mut busy = Combatant::new(Slot::Two, &rules.combat);
        idle.resources_mut().set_stamina(50);
        busy.resources_mut().set_stamina(62);
        busy.execute(ActionId::Guard, &rules).unwrap();
        let base = Fixed::from_num(50);
        run_ticks(&mut idle, &rules, 1);
        run_ticks(&mut busy, &rules, 1);
        let idle_gain = idle.resources().stamina() - base;
        let busy_gain = busy.resources().stamina() - base;
        assert!(idle_gain > busy_gain);
        assert!(busy_gain > Fixed::ZERO);
    }
}
