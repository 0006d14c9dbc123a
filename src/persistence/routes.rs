//! Route to state name lookup.

use crate::core::TransitionTable;
use std::collections::HashMap;

/// Case-insensitive mapping from declared route to owning state name.
///
/// States without a declared route are not reachable through persistence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReverseRoutes {
    routes: HashMap<String, String>,
}

impl ReverseRoutes {
    /// Build the lookup from every declared route in `table`.
    ///
    /// When two states share a route, the later declaration wins.
    pub fn from_table(table: &TransitionTable) -> Self {
        let routes = table
            .iter()
            .filter_map(|(name, def)| {
                def.route
                    .as_ref()
                    .map(|route| (route.to_lowercase(), name.clone()))
            })
            .collect();
        Self { routes }
    }

    /// State name owning `route`, compared case-insensitively.
    pub fn resolve(&self, route: &str) -> Option<&str> {
        self.routes.get(&route.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
