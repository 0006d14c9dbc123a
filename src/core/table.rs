//! Declarative transition table.
//!
//! The table maps each state name to the actions it accepts and, optionally,
//! the external route it is persisted under. Declaration order is preserved:
//! the first declared state is the fallback for unknown state names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Problems found when validating a transition table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableViolation {
    #[error("Transition table declares no states")]
    Empty,

    #[error("Action '{action}' in state '{state}' targets unknown state '{target}'")]
    DanglingTarget {
        state: String,
        action: String,
        target: String,
    },
}

/// One state in the table: its outgoing actions and optional route.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDefinition {
    #[serde(default)]
    pub actions: IndexMap<String, String>,

    #[serde(default, alias = "url", skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

impl StateDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the external route for this state.
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Declare an action leading to `target`.
    pub fn action(mut self, action: impl Into<String>, target: impl Into<String>) -> Self {
        self.actions.insert(action.into(), target.into());
        self
    }
}

/// Read-only mapping from state name to its definition.
///
/// # Example
///
/// ```rust
/// use waymark::core::{StateDefinition, TransitionTable};
///
/// let table = TransitionTable::new()
///     .state("HOME", StateDefinition::new().route("/").action("GO", "PAGE"))
///     .state("PAGE", StateDefinition::new().route("/page").action("BACK", "HOME"));
///
/// assert_eq!(table.transition("HOME", "GO"), Some("PAGE"));
/// assert_eq!(table.transition("HOME", "BACK"), None);
/// assert_eq!(table.first_state(), Some("HOME"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionTable {
    states: IndexMap<String, StateDefinition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: add (or replace) a state definition.
    pub fn state(mut self, name: impl Into<String>, definition: StateDefinition) -> Self {
        self.states.insert(name.into(), definition);
        self
    }

    /// Target state for `action` taken from `state`, if declared.
    ///
    /// Unknown states and undeclared actions both yield `None`.
    pub fn transition(&self, state: &str, action: &str) -> Option<&str> {
        self.states
            .get(state)
            .and_then(|def| def.actions.get(action))
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&StateDefinition> {
        self.states.get(name)
    }

    /// The first declared state name.
    pub fn first_state(&self) -> Option<&str> {
        self.states.keys().next().map(String::as_str)
    }

    /// Declared route of a state.
    pub fn route_of(&self, name: &str) -> Option<&str> {
        self.states.get(name).and_then(|def| def.route.as_deref())
    }

    /// State names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, StateDefinition> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check every action target against the declared states.
    ///
    /// Accumulates all violations instead of stopping at the first one.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<TableViolation>> {
        if self.states.is_empty() {
            return Validation::fail(TableViolation::Empty);
        }

        let checks: Vec<Validation<(), NonEmptyVec<TableViolation>>> = self
            .states
            .iter()
            .flat_map(move |(state, def)| {
                def.actions.iter().map(move |(action, target)| {
                    if self.states.contains_key(target) {
                        Validation::success(())
                    } else {
                        Validation::fail(TableViolation::DanglingTarget {
                            state: state.clone(),
                            action: action.clone(),
                            target: target.clone(),
                        })
                    }
                })
            })
            .collect();

        if checks.is_empty() {
            return Validation::success(());
        }

        Validation::all_vec(checks).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TransitionTable {
        TransitionTable::new()
            .state(
                "HOME",
                StateDefinition::new()
                    .route("/")
                    .action("GO", "PAGE")
                    .action("ABOUT", "ABOUT"),
            )
            .state("PAGE", StateDefinition::new().route("/page").action("BACK", "HOME"))
            .state("ABOUT", StateDefinition::new().action("BACK", "HOME"))
    }

    #[test]
    fn transition_follows_declared_action() {
        let table = table();
        assert_eq!(table.transition("HOME", "GO"), Some("PAGE"));
        assert_eq!(table.transition("PAGE", "BACK"), Some("HOME"));
    }

    #[test]
    fn transition_ignores_undeclared_action() {
        let table = table();
        assert_eq!(table.transition("PAGE", "GO"), None);
        assert_eq!(table.transition("NOWHERE", "GO"), None);
    }

    #[test]
    fn first_state_follows_declaration_order() {
        let table = TransitionTable::new()
            .state("Z", StateDefinition::new())
            .state("A", StateDefinition::new());
        assert_eq!(table.first_state(), Some("Z"));
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Z", "A"]);
    }

    #[test]
    fn route_of_reads_declared_route() {
        let table = table();
        assert_eq!(table.route_of("PAGE"), Some("/page"));
        assert_eq!(table.route_of("ABOUT"), None);
    }

    #[test]
    fn validate_accepts_closed_table() {
        assert!(table().validate().is_success());
    }

    #[test]
    fn validate_reports_every_dangling_target() {
        let table = TransitionTable::new()
            .state(
                "HOME",
                StateDefinition::new().action("GO", "MISSING").action("UP", "HOME"),
            )
            .state("PAGE", StateDefinition::new().action("BACK", "GONE"));

        match table.validate() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().any(|e| matches!(
                    e,
                    TableViolation::DanglingTarget { target, .. } if target == "MISSING"
                )));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    TableViolation::DanglingTarget { target, .. } if target == "GONE"
                )));
            }
            Validation::Success(_) => panic!("Expected violations, got success"),
        }
    }

    #[test]
    fn validate_rejects_empty_table() {
        match TransitionTable::new().validate() {
            Validation::Failure(errors) => {
                assert!(errors.iter().any(|e| matches!(e, TableViolation::Empty)));
            }
            Validation::Success(_) => panic!("Expected violations, got success"),
        }
    }

    #[test]
    fn deserializes_url_alias_in_declaration_order() {
        let json = r#"{
            "PAGE": { "actions": { "BACK": "HOME" }, "url": "/page" },
            "HOME": { "actions": { "GO": "PAGE" }, "route": "/" }
        }"#;
        let table: TransitionTable = serde_json::from_str(json).unwrap();

        assert_eq!(table.first_state(), Some("PAGE"));
        assert_eq!(table.route_of("PAGE"), Some("/page"));
        assert_eq!(table.transition("HOME", "GO"), Some("PAGE"));
    }
}
