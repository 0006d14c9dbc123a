//! Builder API for router construction.
//!
//! This module provides a fluent builder, a serde-backed config, and macros
//! for declaring transition tables with minimal boilerplate.

pub mod config;
pub mod error;
pub mod macros;
pub mod router;

pub use config::{RouterConfig, DEFAULT_START_STATE};
pub use error::BuildError;
pub use router::RouterBuilder;

use crate::router::Router;

/// Build a router straight from a JSON config.
///
/// # Example
///
/// ```
/// use waymark::builder::router_from_json;
/// use waymark::core::Query;
///
/// let router = router_from_json(r#"{
///     "states": {
///         "HOME": { "actions": { "GO": "PAGE" } },
///         "PAGE": { "actions": { "BACK": "HOME" } }
///     }
/// }"#).unwrap();
///
/// router.emit("GO", Query::new());
/// assert_eq!(router.state(), "PAGE");
/// ```
pub fn router_from_json(json: &str) -> Result<Router, BuildError> {
    RouterBuilder::from_config(RouterConfig::from_json(json)?).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_from_json_builds_router() {
        let router = router_from_json(
            r#"{ "states": { "START": { "actions": { "NEXT": "START" } } }, "startState": "START" }"#,
        )
        .unwrap();
        assert_eq!(router.state(), "START");
    }

    #[test]
    fn router_from_json_reports_parse_errors() {
        assert!(matches!(router_from_json("[]"), Err(BuildError::Config(_))));
    }

    #[test]
    fn router_from_json_honors_strict() {
        let result = router_from_json(
            r#"{ "states": { "HOME": { "actions": { "GO": "MISSING" } } }, "strict": true }"#,
        );
        assert!(matches!(result, Err(BuildError::InvalidTable(_))));
    }
}
