//! Combatant resources: health, stamina and fixed modifiers.
//!
//! Health and stamina are clamped to `[0, max]` on every mutation.
//! Exhaustion is derived from stamina on each query and never stored.

use serde::{Deserialize, Serialize};

use crate::config::{FighterDefaults, StaminaConfig};
use crate::math::{fixed_serde, percent_of, Fixed};

/// Health, stamina, modifiers and stun state of one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantResources {
    health: u32,
    max_health: u32,
    #[serde(with = "fixed_serde")]
    stamina: Fixed,
    #[serde(with = "fixed_serde")]
    max_stamina: Fixed,
    power_pct: u32,
    speed_pct: u32,
    defense_pct: u32,
    is_blocking: bool,
    stun_ticks: u32,
    stamina_rules: StaminaConfig,
}

impl CombatantResources {
    /// Full resources from fighter defaults.
    #[must_use]
    pub fn new(fighter: &FighterDefaults, stamina: &StaminaConfig) -> Self {
        Self {
            health: fighter.max_health,
            max_health: fighter.max_health,
            stamina: Fixed::from_num(fighter.max_stamina),
            max_stamina: Fixed::from_num(fighter.max_stamina),
            power_pct: fighter.power_pct,
            speed_pct: fighter.speed_pct,
            defense_pct: fighter.defense_pct,
            is_blocking: false,
            stun_ticks: 0,
            stamina_rules: *stamina,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Current stamina.
    #[must_use]
    pub const fn stamina(&self) -> Fixed {
        self.stamina
    }

    /// Maximum stamina.
    #[must_use]
    pub const fn max_stamina(&self) -> Fixed {
        self.max_stamina
    }

    /// Stamina rounded down to a whole number.
    #[must_use]
    pub fn stamina_whole(&self) -> u32 {
        self.stamina.floor().to_num::<u32>()
    }

    /// Health as a percent of maximum.
    #[must_use]
    pub fn health_percent(&self) -> Fixed {
        percent_of(Fixed::from_num(self.health), Fixed::from_num(self.max_health))
    }

    /// Stamina as a percent of maximum.
    #[must_use]
    pub fn stamina_percent(&self) -> Fixed {
        percent_of(self.stamina, self.max_stamina)
    }

    /// Outgoing damage modifier, percent.
    #[must_use]
    pub const fn power_pct(&self) -> u32 {
        self.power_pct
    }

    /// Incoming damage divisor, percent.
    #[must_use]
    pub const fn defense_pct(&self) -> u32 {
        self.defense_pct
    }

    /// Speed modifier after fatigue, percent.
    #[must_use]
    pub fn effective_speed_pct(&self) -> u32 {
        if self.is_exhausted() {
            (self.speed_pct * self.stamina_rules.exhausted_speed_pct / 100).max(1)
        } else {
            self.speed_pct
        }
    }

    /// Stamina is below the exhaustion threshold.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.stamina < Fixed::from_num(self.stamina_rules.exhaustion_threshold)
    }

    /// Guard is up.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.is_blocking
    }

    /// A stun timer is running.
    #[must_use]
    pub const fn is_stunned(&self) -> bool {
        self.stun_ticks > 0
    }

    /// Remaining stun ticks.
    #[must_use]
    pub const fn stun_ticks(&self) -> u32 {
        self.stun_ticks
    }

    /// Health has reached zero.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.health == 0
    }

    pub(crate) fn set_blocking(&mut self, blocking: bool) {
        self.is_blocking = blocking;
    }

    /// Remove health, clamped at zero. Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.health);
        self.health -= applied;
        applied
    }

    /// Pay for an action.
    ///
    /// A cost above current stamina drains what is left and still succeeds.
    /// Only a positive cost against an empty pool is refused.
    pub fn spend_stamina(&mut self, cost: u32) -> bool {
        let cost = Fixed::from_num(cost);
        if cost > Fixed::ZERO && self.stamina <= Fixed::ZERO {
            return false;
        }
        self.stamina = (self.stamina - cost).max(Fixed::ZERO);
        true
    }

    /// Add stamina, clamped at maximum.
    pub fn restore_stamina(&mut self, amount: Fixed) {
        self.stamina = (self.stamina + amount.max(Fixed::ZERO)).min(self.max_stamina);
    }

    /// Stamina regained over one tick.
    #[must_use]
    pub fn regen_per_tick(&self, idle: bool) -> Fixed {
        let mut per_sec = self.stamina_rules.regen_per_sec;
        if idle && !self.is_blocking {
            per_sec += self.stamina_rules.idle_bonus_per_sec;
        }
        crate::math::per_tick(per_sec)
    }

    /// Stun for at least `ticks`. Never shortens a running stun.
    pub fn stun(&mut self, ticks: u32) {
        self.stun_ticks = self.stun_ticks.max(ticks);
    }

    /// Count the stun timer down by one tick.
    pub fn tick_stun(&mut self) {
        self.stun_ticks = self.stun_ticks.saturating_sub(1);
    }

    /// Restore to full at a round boundary.
    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.stamina = self.max_stamina;
        self.is_blocking = false;
        self.stun_ticks = 0;
    }

    #[cfg(test)]
    pub(crate) fn set_stamina(&mut self, stamina: u32) {
        self.stamina = Fixed::from_num(stamina).min(self.max_stamina);
    }

    #[cfg(test)]
    pub(crate) fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }
}
