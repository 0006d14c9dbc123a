//! Build errors for router construction.

use crate::core::TableViolation;
use thiserror::Error;

/// Errors that can occur when building a router.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition table declares no states. Add at least one state")]
    NoStates,

    #[error("Transition table failed validation with {} violation(s)", .0.len())]
    InvalidTable(Vec<TableViolation>),

    #[error("Invalid router config: {0}")]
    Config(#[from] serde_json::Error),
}
