//! Combo tracking.
//!
//! Each combatant tracks its own run of consecutive landed hits. The run
//! expires after a fixed window without a new hit and breaks at once when
//! the combatant is hit.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::ActionId;
use crate::config::{ComboConfig, NamedCombo};
use crate::math::{apply_percent, Fixed};

/// Damage bonus a combo grants to the next hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboBonus {
    /// No recognized sequence: flat bonus per prior hit, percent.
    PerHit(u32),
    /// A recognized sequence is active, percent.
    Sequence(u32),
}

impl ComboBonus {
    /// Multiplier as a percent.
    #[must_use]
    pub const fn percent(self) -> u32 {
        match self {
            Self::PerHit(pct) | Self::Sequence(pct) => pct,
        }
    }

    /// Scale a damage value.
    #[must_use]
    pub fn apply(self, value: Fixed) -> Fixed {
        apply_percent(value, self.percent())
    }
}

impl Default for ComboBonus {
    fn default() -> Self {
        Self::PerHit(100)
    }
}

/// Running combo for one combatant.
///
/// `count > 0` exactly when `timer > 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboTracker {
    count: u32,
    damage: u32,
    recent: VecDeque<ActionId>,
    timer: u32,
    active_sequence: Option<usize>,
    best_count: u32,
    best_damage: u32,
    style_points: u32,
}

impl ComboTracker {
    /// Empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits in the current run.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Damage in the current run.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Ticks until the run expires.
    #[must_use]
    pub const fn timer(&self) -> u32 {
        self.timer
    }

    /// Recent actions, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.recent.iter().copied()
    }

    /// Longest run seen this match.
    #[must_use]
    pub const fn best_count(&self) -> u32 {
        self.best_count
    }

    /// Most damage in one run this match.
    #[must_use]
    pub const fn best_damage(&self) -> u32 {
        self.best_damage
    }

    /// Style points earned this match.
    #[must_use]
    pub const fn style_points(&self) -> u32 {
        self.style_points
    }

    /// Recognized sequence currently boosting damage.
    #[must_use]
    pub fn active_sequence<'c>(&self, config: &'c ComboConfig) -> Option<&'c NamedCombo> {
        self.active_sequence
            .and_then(|index| config.sequences.get(index))
    }

    /// Bonus for the next hit in this run.
    #[must_use]
    pub fn bonus(&self, config: &ComboConfig) -> ComboBonus {
        match self.active_sequence(config) {
            Some(combo) => ComboBonus::Sequence(combo.bonus_pct),
            None => ComboBonus::PerHit(100 + config.per_hit_bonus_pct * self.count),
        }
    }

    /// Record a landed hit.
    ///
    /// Returns the sequence completed by this hit, if any.
    pub fn register_hit<'c>(
        &mut self,
        action: ActionId,
        damage: u32,
        config: &'c ComboConfig,
    ) -> Option<&'c NamedCombo> {
        self.count += 1;
        self.damage = self.damage.saturating_add(damage);
        self.timer = config.window;

        self.recent.push_back(action);
        while self.recent.len() > config.buffer_len {
            self.recent.pop_front();
        }

        self.best_count = self.best_count.max(self.count);
        self.best_damage = self.best_damage.max(self.damage);

        let (index, combo) = self.match_sequence(config)?;
        self.active_sequence = Some(index);
        self.style_points += combo.style_points;
        tracing::debug!(combo = %combo.name, hits = self.count, "Combo sequence recognized");
        Some(combo)
    }

    /// Count the expiry timer down. Returns `true` if the run expired.
    pub fn tick(&mut self) -> bool {
        if self.timer == 0 {
            return false;
        }
        self.timer -= 1;
        if self.timer == 0 {
            self.break_combo();
            return true;
        }
        false
    }

    /// End the current run immediately.
    pub fn break_combo(&mut self) {
        self.count = 0;
        self.damage = 0;
        self.timer = 0;
        self.recent.clear();
        self.active_sequence = None;
    }

    /// Clear the run and all match records.
    pub fn clear_records(&mut self) {
        *self = Self::default();
    }

    /// Display name for the current run.
    #[must_use]
    pub fn sequence_name<'c>(&self, config: &'c ComboConfig) -> Option<&'c str> {
        if let Some(combo) = self.active_sequence(config) {
            return Some(combo.name.as_str());
        }
        match self.count {
            0 | 1 => None,
            2 => Some("Nice!"),
            3 | 4 => Some("COMBO!"),
            _ => Some("FURY!"),
        }
    }

    /// Longest recognized sequence matching the tail of the buffer.
    fn match_sequence<'c>(&self, config: &'c ComboConfig) -> Option<(usize, &'c NamedCombo)> {
        config
            .sequences
            .iter()
            .enumerate()
            .filter(|(_, combo)| self.tail_matches(&combo.sequence))
            .max_by(|(ia, a), (ib, b)| a.sequence.len().cmp(&b.sequence.len()).then(ib.cmp(ia)))
    }

    fn tail_matches(&self, sequence: &[ActionId]) -> bool {
        if sequence.len() > self.recent.len() || sequence.len() > self.count as usize {
            return false;
        }
        let start = self.recent.len() - sequence.len();
        self.recent
            .iter()
            .skip(start)
            .zip(sequence)
            .all(|(seen, wanted)| seen == wanted)
    }
}
