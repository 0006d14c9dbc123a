//! Errors raised while saving or restoring a router checkpoint.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Checkpoint binary encoding failed: {0}")]
    Binary(#[from] bincode::Error),

    /// Written by a different checkpoint format
    #[error("Checkpoint format v{found} cannot be restored here (expects v{supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Saved state is not declared in the router's table
    #[error("Checkpoint state '{0}' is not in the transition table")]
    UnknownState(String),
}
