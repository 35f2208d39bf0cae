//! # Brawl Core
//!
//! Deterministic two-fighter melee combat simulation.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond parsing bundled tables
//! - No system randomness (every roll comes from a seeded stream)
//! - No floating-point math in the tick path (uses fixed-point)
//!
//! Identical seeds and identical action choices produce byte-identical
//! outcome records, which is what the determinism harness in
//! `brawl_test_utils` checks.
//!
//! ## Crate Structure
//!
//! - [`catalog`] - Action catalog, the static per-action stat table
//! - [`config`] - Combat tuning and the shared [`Ruleset`](config::Ruleset)
//! - [`combatant`] - One fighter: resources, position, action state machine
//! - [`collision`] - Hit-region against hurt-region resolution
//! - [`damage`] - Damage and outcome rolls
//! - [`combo`] - Combo tracking and named sequences
//! - [`engine`] - The per-tick match loop
//! - [`policy`] - Rule-based fallback decisions
//! - [`personality`] - Fighting styles that weight open policy choices
//! - [`round`] - Rounds and best-of matches
//! - [`math`] - Fixed-point helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action;
pub mod catalog;
pub mod clock;
pub mod collision;
pub mod combatant;
pub mod combo;
pub mod config;
pub mod damage;
pub mod engine;
pub mod error;
pub mod math;
pub mod outcome;
pub mod personality;
pub mod policy;
pub mod regions;
pub mod resources;
pub mod rng;
pub mod round;
pub mod source;
pub mod spatial;
pub mod stats;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::ActionPhase;
    pub use crate::catalog::{ActionCatalog, ActionId, ActionSpec, AttackTier};
    pub use crate::combatant::{
        Actable, Combatant, CombatantView, DamageResult, Execution, Rejection, Slot,
    };
    pub use crate::config::{CombatConfig, Ruleset};
    pub use crate::engine::CombatEngine;
    pub use crate::error::{CombatError, Result};
    pub use crate::math::{Fixed, TICK_RATE};
    pub use crate::outcome::{CombatOutcome, TickOutcome};
    pub use crate::personality::Personality;
    pub use crate::policy::FallbackPolicy;
    pub use crate::regions::Zone;
    pub use crate::rng::{CombatRng, SeededRng};
    pub use crate::round::{BoxedSource, MatchController, MatchResult, RoundEnding, RoundResult};
    pub use crate::source::{ActionSource, IdleSource, ScriptedSource};
    pub use crate::spatial::RangeZone;
    pub use crate::stats::CombatStats;
}
