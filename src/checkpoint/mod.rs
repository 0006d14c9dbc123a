//! Checkpoint and restore for routers.
//!
//! A checkpoint captures where a router is (state name, params, history) so a
//! session can be resumed after a restart. The transition table itself is not
//! saved; a checkpoint is restored into a router built from the same table.

use crate::core::{CurrentState, Params, StateHistory, TransitionTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a router.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Start state the router was configured with
    pub start_state: String,

    /// Start params the router was configured with
    pub start_params: Params,

    /// Current state of the router
    pub current_state: CurrentState,

    /// Transition history
    pub history: StateHistory,
}

impl Checkpoint {
    pub fn new(
        start_state: String,
        start_params: Params,
        current_state: CurrentState,
        history: StateHistory,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            start_state,
            start_params,
            current_state,
            history,
        }
    }

    /// Check the format version and that the saved state exists in `table`.
    pub fn validate(&self, table: &TransitionTable) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if !table.contains(&self.current_state.name) {
            return Err(CheckpointError::UnknownState(
                self.current_state.name.clone(),
            ));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
