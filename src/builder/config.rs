//! Declarative router configuration.

use crate::builder::error::BuildError;
use crate::core::{Params, TransitionTable};
use serde::{Deserialize, Serialize};

/// State name used when no start state is configured.
pub const DEFAULT_START_STATE: &str = "HOME";

/// Router configuration, loadable from JSON.
///
/// # Example
///
/// ```rust
/// use waymark::builder::RouterConfig;
///
/// let config = RouterConfig::from_json(r#"{
///     "states": {
///         "HOME": { "actions": { "GO": "PAGE" }, "route": "/" },
///         "PAGE": { "actions": { "BACK": "HOME" }, "route": "/page" }
///     },
///     "query": { "tab": "main" }
/// }"#).unwrap();
///
/// assert_eq!(config.start_state, "HOME");
/// assert!(!config.strict);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub states: TransitionTable,

    #[serde(default = "default_start_state", alias = "startState")]
    pub start_state: String,

    /// Initial params, also the defaults for cleared keys
    #[serde(default)]
    pub query: Params,

    /// Reject tables whose actions target undeclared states
    #[serde(default)]
    pub strict: bool,
}

fn default_start_state() -> String {
    DEFAULT_START_STATE.to_string()
}

impl RouterConfig {
    pub fn new(states: TransitionTable) -> Self {
        Self {
            states,
            start_state: default_start_state(),
            query: Params::new(),
            strict: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }
}
