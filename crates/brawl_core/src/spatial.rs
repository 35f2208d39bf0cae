//! One-dimensional ring positioning.
//!
//! Combatants stand on a line. Each has an anchor x, a facing, and a
//! decaying knockback velocity. Range zones classify the gap between them.

use serde::{Deserialize, Serialize};

use crate::config::{ArenaConfig, RangeThresholds};
use crate::math::{apply_percent, fixed_serde, Fixed};

/// Knockback velocities below this snap to zero.
const KNOCKBACK_REST: Fixed = Fixed::from_bits(1 << 28); // 1/16 px per tick

/// Direction a combatant faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Toward increasing x.
    #[default]
    Right,
    /// Toward decreasing x.
    Left,
}

impl Facing {
    /// `+1` for right, `-1` for left.
    #[must_use]
    pub fn sign(self) -> Fixed {
        match self {
            Self::Right => Fixed::ONE,
            Self::Left => -Fixed::ONE,
        }
    }
}

/// Distance band between the two combatants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RangeZone {
    /// Bodies nearly touching.
    Clinch,
    /// Normal striking distance.
    Punch,
    /// One step out.
    Medium,
    /// Out of reach, still engaged.
    Safe,
    /// Disengaged.
    Far,
}

impl RangeZone {
    /// Classify a distance.
    #[must_use]
    pub fn classify(distance: Fixed, thresholds: &RangeThresholds) -> Self {
        if distance <= Fixed::from_num(thresholds.clinch) {
            Self::Clinch
        } else if distance <= Fixed::from_num(thresholds.punch) {
            Self::Punch
        } else if distance <= Fixed::from_num(thresholds.medium) {
            Self::Medium
        } else if distance <= Fixed::from_num(thresholds.safe) {
            Self::Safe
        } else {
            Self::Far
        }
    }

    /// Close enough to land strikes.
    #[must_use]
    pub const fn is_striking(self) -> bool {
        matches!(self, Self::Clinch | Self::Punch)
    }
}

/// Position, facing and knockback of one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAndRange {
    #[serde(with = "fixed_serde")]
    x: Fixed,
    facing: Facing,
    /// Signed knockback velocity, pixels per tick.
    #[serde(with = "fixed_serde")]
    knockback: Fixed,
    #[serde(with = "fixed_serde")]
    min_x: Fixed,
    #[serde(with = "fixed_serde")]
    max_x: Fixed,
}

impl PositionAndRange {
    /// Place a combatant at `x` inside the arena's walkable span.
    #[must_use]
    pub fn new(x: Fixed, arena: &ArenaConfig) -> Self {
        let min_x = Fixed::from_num(arena.ring_left + arena.body_inset);
        let max_x = Fixed::from_num(arena.ring_right - arena.body_inset);
        Self {
            x: x.clamp(min_x, max_x),
            facing: Facing::Right,
            knockback: Fixed::ZERO,
            min_x,
            max_x,
        }
    }

    /// Anchor x.
    #[must_use]
    pub const fn x(&self) -> Fixed {
        self.x
    }

    /// Current facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Current knockback velocity.
    #[must_use]
    pub const fn knockback(&self) -> Fixed {
        self.knockback
    }

    /// Whether a knockback impulse is still moving this combatant.
    #[must_use]
    pub fn is_knocked_back(&self) -> bool {
        self.knockback != Fixed::ZERO
    }

    /// Absolute gap to another combatant.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> Fixed {
        (self.x - other.x).abs()
    }

    /// Turn to face `other_x`. Holds the current facing when exactly level.
    pub fn face_towards(&mut self, other_x: Fixed) {
        if other_x > self.x {
            self.facing = Facing::Right;
        } else if other_x < self.x {
            self.facing = Facing::Left;
        }
    }

    /// Move along the facing direction. Negative `delta` steps back.
    pub fn step_forward(&mut self, delta: i32) {
        self.set_x(self.x + self.facing.sign() * Fixed::from_num(delta));
    }

    /// Move by a signed world-space amount.
    pub fn shift(&mut self, dx: Fixed) {
        self.set_x(self.x + dx);
    }

    /// Start a knockback pushing away from `source_x`.
    ///
    /// `speed` is a non-negative per-tick velocity.
    pub fn apply_knockback(&mut self, source_x: Fixed, speed: Fixed) {
        let direction = if source_x > self.x {
            -Fixed::ONE
        } else if source_x < self.x {
            Fixed::ONE
        } else {
            -self.facing.sign()
        };
        self.knockback = direction * speed;
    }

    /// Advance knockback by one tick, then decay it.
    pub fn step_knockback(&mut self, decay_pct: u32) {
        if self.knockback == Fixed::ZERO {
            return;
        }
        self.shift(self.knockback);
        self.knockback = apply_percent(self.knockback, decay_pct);
        if self.knockback.abs() < KNOCKBACK_REST {
            self.knockback = Fixed::ZERO;
        }
    }

    /// Stop any knockback.
    pub fn halt(&mut self) {
        self.knockback = Fixed::ZERO;
    }

    /// Restore to a starting position with no motion.
    pub fn reset(&mut self, x: Fixed) {
        self.knockback = Fixed::ZERO;
        self.facing = Facing::Right;
        self.set_x(x);
    }

    fn set_x(&mut self, x: Fixed) {
        self.x = x.clamp(self.min_x, self.max_x);
    }
}
