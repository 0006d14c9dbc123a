//! Builder for constructing routers.

use crate::builder::config::{RouterConfig, DEFAULT_START_STATE};
use crate::builder::error::BuildError;
use crate::core::{Params, TableViolation, TransitionTable};
use crate::persistence::Persistence;
use crate::router::Router;
use std::sync::Arc;
use stillwater::validation::Validation;

/// Builder for constructing routers with a fluent API.
pub struct RouterBuilder {
    table: TransitionTable,
    start_state: String,
    query: Params,
    persistence: Option<Arc<dyn Persistence>>,
    strict: bool,
}

impl RouterBuilder {
    /// Start from a transition table (required).
    pub fn new(table: TransitionTable) -> Self {
        Self {
            table,
            start_state: DEFAULT_START_STATE.to_string(),
            query: Params::new(),
            persistence: None,
            strict: false,
        }
    }

    /// Start from a deserialized config.
    pub fn from_config(config: RouterConfig) -> Self {
        Self {
            table: config.states,
            start_state: config.start_state,
            query: config.query,
            persistence: None,
            strict: config.strict,
        }
    }

    /// Set the start state (defaults to `"HOME"`).
    pub fn start_state(mut self, state: impl Into<String>) -> Self {
        self.start_state = state.into();
        self
    }

    /// Set the initial params, which double as defaults for cleared keys.
    pub fn query(mut self, query: Params) -> Self {
        self.query = query;
        self
    }

    /// Attach a persistence collaborator.
    pub fn persistence(mut self, persistence: Arc<dyn Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Fail the build when an action targets an undeclared state. Without
    /// this, such targets are only logged and fall back at apply time.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Build and seed the router.
    pub fn build(self) -> Result<Router, BuildError> {
        if self.table.is_empty() {
            return Err(BuildError::NoStates);
        }

        if let Validation::Failure(violations) = self.table.validate() {
            let violations: Vec<TableViolation> = violations.iter().cloned().collect();
            if self.strict {
                return Err(BuildError::InvalidTable(violations));
            }
            for violation in &violations {
                tracing::warn!(%violation, "transition table violation");
            }
        }

        if !self.table.contains(&self.start_state) {
            tracing::warn!(
                start_state = %self.start_state,
                "start state not declared, the first declared state will be used"
            );
        }

        Ok(Router::start(
            self.table,
            self.start_state,
            self.query,
            self.persistence,
        ))
    }
}
