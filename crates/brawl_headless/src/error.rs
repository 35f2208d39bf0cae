//! Runner errors.

use thiserror::Error;

use brawl_core::error::CombatError;

/// Result alias for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Error type for runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Reading tables or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A table failed to load.
    #[error("Invalid configuration: {0}")]
    Config(#[from] CombatError),
    /// JSON encoding failed.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A source kind that cannot run unattended was requested.
    #[error("Unsupported source: {0}")]
    InteractiveSource(&'static str),
}
