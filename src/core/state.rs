//! Router state values.

use super::params::{Params, Query};
use serde::{Deserialize, Serialize};

/// The router's current position: a state name plus its params.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    pub name: String,
    pub params: Params,
}

impl CurrentState {
    pub fn new(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// A candidate state: either forced via `set_current_state` or proposed to
/// persistence by `emit`.
///
/// Params are a [`Query`] so a key can be explicitly cleared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateRequest {
    pub name: String,
    #[serde(default)]
    pub params: Query,
}

impl StateRequest {
    pub fn new(name: impl Into<String>, params: impl Into<Query>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
        }
    }
}

impl From<CurrentState> for StateRequest {
    fn from(state: CurrentState) -> Self {
        Self {
            name: state.name,
            params: state.params.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ParamValue;

    #[test]
    fn request_from_current_state_keeps_values() {
        let state = CurrentState::new("PAGE", Params::new().with("id", "5"));
        let request = StateRequest::from(state);

        assert_eq!(request.name, "PAGE");
        assert_eq!(request.params.get("id"), Some(&Some(ParamValue::from("5"))));
    }

    #[test]
    fn request_deserializes_without_params() {
        let request: StateRequest = serde_json::from_str(r#"{"name":"HOME"}"#).unwrap();
        assert_eq!(request.name, "HOME");
        assert!(request.params.is_empty());
    }
}
