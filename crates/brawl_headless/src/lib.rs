//! Headless match runner for policy testing and CI verification.
//!
//! This crate runs fights without any presentation layer:
//!
//! - **Policy testing**: pit the fallback policy, idle corners, or an
//!   external controller against each other
//! - **Balance sweeps**: play thousands of seeds in parallel and aggregate
//!   win rates and knockout counts
//! - **CI verification**: check that a seed replays byte for byte
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: action requests for corners driven by `stdin`
//! - **stdout**: outcome records, round results and the match summary
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the full request/response format.
//!
//! # Example
//!
//! ```bash
//! # Policy against policy
//! cargo run -p brawl_headless -- run --seed 7
//!
//! # Drive corner one from a script
//! ./controller | cargo run -p brawl_headless -- run --slot-one stdin
//!
//! # Verify determinism
//! cargo run -p brawl_headless -- verify --seed 7 --runs 10
//! ```

pub mod batch;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod runner;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, VerifyReport};
pub use error::{Result, RunnerError};
pub use metrics::{BatchSummary, MatchReport};
pub use protocol::{ActionRequest, ChannelSource, Response};
pub use runner::{load_rules, play_match, MatchRunner, RunConfig, SourceKind};
