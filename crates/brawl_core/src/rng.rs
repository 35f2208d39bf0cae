//! Seeded randomness for combat rolls.
//!
//! The combat core never touches an ambient random source. Every roll goes
//! through [`CombatRng`], and a match owns one stream per combatant so that
//! the rolls made for one attacker never shift the other's sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::math::{percent_fraction, Fixed};

/// Source of combat rolls.
pub trait CombatRng {
    /// Uniform integer in `min..=max`. Returns `min` when `max <= min`.
    fn roll_range(&mut self, min: u32, max: u32) -> u32;

    /// Uniform fixed-point value in `[0, 1)`.
    fn roll_unit(&mut self) -> Fixed;

    /// Roll against a whole-percent chance.
    ///
    /// Zero never succeeds; 100 or more always succeeds.
    fn chance(&mut self, pct: u32) -> bool {
        self.roll_unit() < percent_fraction(pct)
    }
}

/// ChaCha-backed roll source.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    /// Create a roll source for `seed`, using an independent `stream`.
    #[must_use]
    pub fn new(seed: u64, stream: u64) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(seed);
        inner.set_stream(stream);
        Self { inner }
    }
}

impl CombatRng for SeededRng {
    fn roll_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    fn roll_unit(&mut self) -> Fixed {
        // 32 random bits fill exactly the fractional part.
        Fixed::from_bits(i64::from(self.inner.gen::<u32>()))
    }
}
