//! Roll sources with known results.

use std::collections::VecDeque;

use brawl_core::math::Fixed;
use brawl_core::rng::CombatRng;

/// Which value `roll_range` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DamageRoll {
    /// Lower bound.
    Min,
    /// Integer midpoint.
    #[default]
    Midpoint,
    /// Upper bound.
    Max,
}

/// Returns scripted unit rolls, then a fallback value forever.
#[derive(Debug, Clone)]
pub struct FixedRolls {
    units: VecDeque<Fixed>,
    fallback: Fixed,
    damage: DamageRoll,
}

impl FixedRolls {
    /// Every unit roll returns `unit`.
    #[must_use]
    pub fn always(unit: f64) -> Self {
        Self {
            units: VecDeque::new(),
            fallback: Fixed::from_num(unit),
            damage: DamageRoll::Midpoint,
        }
    }

    /// Midpoint damage and a 0.5 unit roll: attacks above 50% hit rate
    /// land, no crit, no stun proc.
    #[must_use]
    pub fn midpoint() -> Self {
        Self::always(0.5)
    }

    /// Unit rolls taken in order, then `fallback`.
    #[must_use]
    pub fn sequence(units: &[f64], fallback: f64) -> Self {
        Self {
            units: units.iter().map(|&u| Fixed::from_num(u)).collect(),
            ..Self::always(fallback)
        }
    }

    /// Choose the damage roll.
    #[must_use]
    pub fn with_damage(mut self, damage: DamageRoll) -> Self {
        self.damage = damage;
        self
    }
}

impl CombatRng for FixedRolls {
    fn roll_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        match self.damage {
            DamageRoll::Min => min,
            DamageRoll::Midpoint => min + (max - min) / 2,
            DamageRoll::Max => max,
        }
    }

    fn roll_unit(&mut self) -> Fixed {
        self.units.pop_front().unwrap_or(self.fallback)
    }
}
