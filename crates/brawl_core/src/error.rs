//! Error types for the combat core.
//!
//! Gameplay refusals (not enough stamina, busy, stunned) are not errors.
//! They are reported through [`crate::combatant::Rejection`] instead.

use thiserror::Error;

use crate::catalog::ActionId;

/// Result type alias using [`CombatError`].
pub type Result<T> = std::result::Result<T, CombatError>;

/// Errors raised while loading or encoding combat data.
#[derive(Debug, Error)]
pub enum CombatError {
    /// A configuration table failed to parse.
    #[error("Failed to parse {table} table: {message}")]
    ConfigParse {
        /// Which table was being parsed.
        table: &'static str,
        /// Parser message.
        message: String,
    },

    /// A configuration table parsed but holds invalid values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration table has a version this build does not understand.
    #[error("Unsupported {table} table version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Which table was being loaded.
        table: &'static str,
        /// Version found in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// The catalog has no entry for an action identifier.
    #[error("Action catalog has no entry for '{0}'")]
    MissingCatalogEntry(ActionId),

    /// An action identifier string did not name a known action.
    #[error("Unknown action identifier: {0}")]
    UnknownAction(String),

    /// Binary encoding of a record or snapshot failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
