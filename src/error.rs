//! Errors surfaced by the alert engine.
//!
//! Malformed fields, unknown periods, bad dates and persistence failures all
//! degrade to defaults and never appear here. Only caller contract
//! violations do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    /// The snapshot is not a sequence of record-like objects.
    #[error("Invalid budget snapshot: {0}")]
    InvalidInput(String),

    #[error("Unknown alert tier '{0}'. Expected all, critical, warning, info or success.")]
    UnknownTier(String),
}
