//! Cumulative per-match statistics.

use serde::{Deserialize, Serialize};

/// Running totals for one combatant across a match.
///
/// Kept across round resets, zeroed by a match reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Damage dealt to the opponent.
    pub damage_dealt: u32,
    /// Damage received.
    pub damage_taken: u32,
    /// Strikes that connected, guarded or not.
    pub hits_landed: u32,
    /// Strikes received without a guard.
    pub hits_taken: u32,
    /// Strikes absorbed by guard.
    pub blocks: u32,
    /// Strikes slipped or missed against this combatant.
    pub dodges: u32,
    /// Longest combo.
    pub max_combo: u32,
    /// Times knocked down.
    pub knockdowns: u32,
    /// Style points from recognized combos.
    pub style_points: u32,
}

impl CombatStats {
    /// Fraction of received strikes that were guarded or avoided, percent.
    #[must_use]
    pub fn defense_rate_pct(&self) -> u32 {
        let defended = self.blocks + self.dodges;
        let total = defended + self.hits_taken;
        if total == 0 {
            return 0;
        }
        defended * 100 / total
    }
}
