//! Batch match runner for balance testing.
//!
//! Runs many seeds in parallel using rayon and aggregates the reports.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use brawl_core::config::Ruleset;

use crate::metrics::{BatchSummary, MatchReport};
use crate::runner::{play_match, SourceKind};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to run
    pub match_count: u32,
    /// Seed of the first match; later matches count up from it
    pub seed_start: u64,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Corner sources, slot one first
    pub sources: [SourceKind; 2],
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            match_count: 100,
            seed_start: 0,
            parallel: 0,
            output_dir: PathBuf::from("results"),
            sources: [SourceKind::Policy; 2],
        }
    }
}

impl BatchConfig {
    /// Config for `match_count` matches.
    #[must_use]
    pub fn new(match_count: u32) -> Self {
        Self {
            match_count,
            ..Default::default()
        }
    }

    /// Set output directory
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set corner sources
    #[must_use]
    pub fn with_sources(mut self, one: SourceKind, two: SourceKind) -> Self {
        self.sources = [one, two];
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match reports, in seed order
    pub matches: Vec<MatchReport>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// A match that failed to complete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index
    pub match_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run a batch of matches
pub fn run_batch(rules: &Arc<Ruleset>, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        "Starting batch run: {} matches from seed {}",
        config.match_count, config.seed_start
    );

    if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<MatchReport, BatchError>> = (0..config.match_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            match play_match(rules, seed, config.sources) {
                Ok((report, _)) => {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 100 == 0 {
                        debug!("Progress: {}/{}", done, config.match_count);
                    }
                    Ok(report)
                }
                Err(e) => {
                    warn!("Match {} failed: {}", i, e);
                    Err(BatchError {
                        match_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (matches, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let matches: Vec<MatchReport> = matches.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_reports(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        matches.len(),
        duration_seconds,
        matches.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
        errors,
    }
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Runs compared.
    pub runs: u32,
    /// Final state hash of each run.
    pub hashes: Vec<u64>,
    /// Whether every run's outcome stream and hash matched the first.
    pub identical: bool,
}

/// Play the same seed `runs` times and compare outcome streams byte for byte.
pub fn verify_determinism(
    rules: &Arc<Ruleset>,
    seed: u64,
    runs: u32,
    sources: [SourceKind; 2],
) -> crate::error::Result<VerifyReport> {
    let results = (0..runs)
        .map(|_| play_match(rules, seed, sources))
        .collect::<crate::error::Result<Vec<_>>>()?;
    let hashes: Vec<u64> = results.iter().map(|(r, _)| r.final_state_hash).collect();

    let mut identical = true;
    if let Some((first, first_bytes)) = results.first() {
        for (run, (report, bytes)) in results.iter().enumerate().skip(1) {
            if report != first || bytes != first_bytes {
                warn!(run, seed, "Run diverged from the first");
                identical = false;
            }
        }
    }

    Ok(VerifyReport {
        runs,
        hashes,
        identical,
    })
}
