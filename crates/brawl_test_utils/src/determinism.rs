//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given an identical seed and identical choices.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: the tick path uses
//!   [`brawl_core::math::Fixed`] throughout.
//!
//! - **Shared random streams**: each combatant rolls from its own seeded
//!   stream, so one side's rolls never shift the other's.
//!
//! - **Map iteration order**: the catalog is a `BTreeMap` and the engine
//!   always resolves slot one before slot two.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: module-level determinism (rolls, damage, combos)
//! 2. **Property tests**: arbitrary scripts still replay identically
//! 3. **Integration tests**: full matches are reproducible byte for byte
//! 4. **Parallel tests**: running N matches on threads all match

use std::thread;

use brawl_core::outcome::TickOutcome;
use brawl_core::rng::CombatRng;
use brawl_core::round::MatchController;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use brawl_test_utils::determinism::verify_determinism;
/// use brawl_test_utils::fixtures::policy_match;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     600, // 600 ticks each
///     || policy_match(42),
///     |controller| { controller.step(); },
///     |controller| controller.engine().state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        tracing::warn!(runs, ticks, "State hashes diverged");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Encode every outcome record of a full match.
///
/// Two runs are byte-identical exactly when these buffers are equal.
///
/// # Panics
///
/// Panics if a record fails to encode.
pub fn match_outcome_bytes<R: CombatRng>(controller: &mut MatchController<R>) -> Vec<u8> {
    let mut bytes = Vec::new();
    controller.run_match(|outcome: &TickOutcome| {
        bytes.extend(outcome.to_bytes().expect("outcome encodes"));
    });
    bytes
}

/// Run full matches repeatedly and compare their outcome bytes.
pub fn verify_match_determinism<R, F>(runs: usize, setup_fn: F) -> DeterminismResult
where
    R: CombatRng,
    F: Fn() -> MatchController<R>,
{
    let mut ticks = 0;
    let hashes = (0..runs)
        .map(|_| {
            let mut controller = setup_fn();
            let bytes = match_outcome_bytes(&mut controller);
            ticks = controller.engine().tick();
            fnv1a(&bytes) ^ controller.engine().state_hash()
        })
        .collect::<Vec<_>>();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks,
    }
}

/// Run N matches on scoped threads and collect final state hashes.
///
/// Catches non-determinism that only shows up under thread scheduling
/// or memory layout differences.
pub fn run_parallel_matches<R, F>(setup_fn: F, num_matches: usize) -> DeterminismResult
where
    R: CombatRng,
    F: Fn() -> MatchController<R> + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| {
                s.spawn(|| {
                    let mut controller = setup_fn();
                    let bytes = match_outcome_bytes(&mut controller);
                    fnv1a(&bytes) ^ controller.engine().state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("match thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: 0,
    }
}

/// Step two controllers side by side, finding the first divergent tick.
///
/// # Returns
///
/// `None` if the runs agree for `num_ticks`, `Some(tick)` at the first
/// tick whose state hashes differ.
pub fn find_first_divergence<R, F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    R: CombatRng,
    F: Fn() -> MatchController<R>,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.engine().state_hash() != b.engine().state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        a.step();
        b.step();

        if a.engine().state_hash() != b.engine().state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Stable byte hash, independent of the std hasher's keys.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::policy_match;

    #[test]
    fn test_verify_determinism_detects_divergence() {
        let counter = std::sync::atomic::AtomicU64::new(0);
        let result = verify_determinism(
            3,
            1,
            || (),
            |()| {},
            |()| counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 3);
    }

    #[test]
    fn test_policy_match_is_stable() {
        let result = verify_determinism(
            3,
            1_200,
            || policy_match(11),
            |controller| {
                controller.step();
            },
            |controller| controller.engine().state_hash(),
        );
        result.assert_deterministic();
        assert_eq!(result.ticks, 1_200);
    }

    #[test]
    fn test_no_divergence_over_a_round() {
        assert_eq!(find_first_divergence(|| policy_match(5), 2_000), None);
    }
}
