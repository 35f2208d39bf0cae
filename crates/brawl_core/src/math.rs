//! Fixed-point math utilities for deterministic simulation.
//!
//! Every fractional quantity in the combat core is a [`Fixed`].
//! Multipliers are stored as whole percents and applied with
//! [`apply_percent`], which multiplies before dividing so that
//! values like `10 x 30%` land exactly on `3`.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Simulation ticks per simulated second.
pub const TICK_RATE: u32 = 60;

/// Scale `value` by `pct` percent.
#[must_use]
pub fn apply_percent(value: Fixed, pct: u32) -> Fixed {
    value * Fixed::from_num(pct) / Fixed::from_num(100)
}

/// A whole percent as a fraction (`90` becomes `0.9`).
#[must_use]
pub fn percent_fraction(pct: u32) -> Fixed {
    Fixed::from_num(pct) / Fixed::from_num(100)
}

/// Convert a per-second rate into a per-tick amount.
#[must_use]
pub fn per_tick(rate_per_sec: u32) -> Fixed {
    Fixed::from_num(rate_per_sec) / Fixed::from_num(TICK_RATE)
}

/// `value` as a percent of `max`, in `[0, 100]`.
///
/// Returns zero when `max` is zero.
#[must_use]
pub fn percent_of(value: Fixed, max: Fixed) -> Fixed {
    if max <= Fixed::ZERO {
        return Fixed::ZERO;
    }
    (value * Fixed::from_num(100) / max).clamp(Fixed::ZERO, Fixed::from_num(100))
}

/// Floor a non-negative fixed value to a whole number.
///
/// Negative inputs clamp to zero.
#[must_use]
pub fn floor_to_u32(value: Fixed) -> u32 {
    if value <= Fixed::ZERO {
        0
    } else {
        value.floor().to_num::<u32>()
    }
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}
