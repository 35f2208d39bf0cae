//! Structured combat outcome records.
//!
//! A [`TickOutcome`] is emitted for every tick in which at least one strike
//! connected or was avoided. It is the whole contract toward presentation
//! layers, which must not reach into combatant internals.

use serde::{Deserialize, Serialize};

use crate::catalog::ActionId;
use crate::combatant::Slot;
use crate::error::{CombatError, Result};
use crate::math::{fixed_serde, Fixed};
use crate::regions::Zone;

/// One strike's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Attacking corner.
    pub attacker: Slot,
    /// Attacking action.
    pub action: ActionId,
    /// Final damage.
    pub damage: u32,
    /// Zone struck.
    pub zone: Zone,
    /// Crit.
    pub crit: bool,
    /// Counter against a wind-up.
    pub counter: bool,
    /// Absorbed by guard.
    pub blocked: bool,
    /// Avoided.
    pub dodged: bool,
    /// Guard broken.
    pub guard_broken: bool,
    /// Stagger proc.
    pub staggered: bool,
    /// Attacker's combo length after this strike.
    pub combo_count: u32,
    /// Label for the attacker's run: its named sequence, else a length label.
    pub combo_name: Option<String>,
    /// Defender knocked down.
    pub knockdown: bool,
    /// Effect placement, x.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Effect placement, y.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Every strike resolved in one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// Tick number.
    pub tick: u64,
    /// Strikes in resolution order (slot one first).
    pub entries: Vec<CombatOutcome>,
    /// Both combatants connected this tick.
    pub trade: bool,
    /// Momentum after the tick, in `[-1, 1]`, positive favoring slot one.
    #[serde(with = "fixed_serde")]
    pub momentum: Fixed,
}

impl TickOutcome {
    /// Entry for a given attacker.
    #[must_use]
    pub fn by(&self, attacker: Slot) -> Option<&CombatOutcome> {
        self.entries.iter().find(|e| e.attacker == attacker)
    }

    /// Any entry knocked a defender down.
    #[must_use]
    pub fn caused_knockdown(&self) -> bool {
        self.entries.iter().any(|e| e.knockdown)
    }

    /// Binary encoding for byte-exact comparisons.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| CombatError::Serialization(e.to_string()))
    }

    /// Decode from [`TickOutcome::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| CombatError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(attacker: Slot) -> CombatOutcome {
        CombatOutcome {
            attacker,
            action: ActionId::Jab,
            damage: 10,
            zone: Zone::Body,
            crit: false,
            counter: false,
            blocked: false,
            dodged: false,
            guard_broken: false,
            staggered: false,
            combo_count: 1,
            combo_name: None,
            knockdown: false,
            x: Fixed::from_num(515),
            y: Fixed::from_num(102.5),
        }
    }

    #[test]
    fn test_lookup_by_attacker() {
        let outcome = TickOutcome {
            tick: 4,
            entries: vec![entry(Slot::Two)],
            trade: false,
            momentum: Fixed::ZERO,
        };
        assert!(outcome.by(Slot::One).is_none());
        assert_eq!(outcome.by(Slot::Two).map(|e| e.damage), Some(10));
        assert!(!outcome.caused_knockdown());
    }

    #[test]
    fn test_bytes_are_stable() {
        let outcome = TickOutcome {
            tick: 9,
            entries: vec![entry(Slot::One), entry(Slot::Two)],
            trade: true,
            momentum: Fixed::from_num(-0.1),
        };
        let bytes = outcome.to_bytes().unwrap();
        assert_eq!(bytes, outcome.clone().to_bytes().unwrap());
        assert_eq!(TickOutcome::from_bytes(&bytes).unwrap(), outcome);
    }
}
