//! Macros for declaring transition tables and params.

/// Declare a [`TransitionTable`](crate::core::TransitionTable) inline.
///
/// Each state is written as `NAME => "route" { ACTION => TARGET, ... }`; the
/// route is optional. Declaration order is kept, so the first state listed is
/// the fallback for unknown state names.
///
/// # Example
///
/// ```
/// use waymark::transition_table;
///
/// let table = transition_table! {
///     HOME => "/" { GO => PAGE, ABOUT => ABOUT },
///     PAGE => "/page" { BACK => HOME },
///     ABOUT { BACK => HOME },
/// };
///
/// assert_eq!(table.transition("HOME", "ABOUT"), Some("ABOUT"));
/// assert_eq!(table.route_of("PAGE"), Some("/page"));
/// assert_eq!(table.route_of("ABOUT"), None);
/// ```
#[macro_export]
macro_rules! transition_table {
    (
        $(
            $state:ident $(=> $route:literal)? {
                $( $action:ident => $target:ident ),* $(,)?
            }
        ),* $(,)?
    ) => {{
        let table = $crate::core::TransitionTable::new();
        $(
            let table = table.state(
                stringify!($state),
                $crate::core::StateDefinition::new()
                    $(.route($route))?
                    $(.action(stringify!($action), stringify!($target)))*,
            );
        )*
        table
    }};
}

/// Build [`Params`](crate::core::Params) from `key => value` pairs.
///
/// # Example
///
/// ```
/// use waymark::core::ParamValue;
/// use waymark::params;
///
/// let params = params! { "q" => "rust", "page" => 2 };
///
/// assert_eq!(params.get("q"), Some(&ParamValue::from("rust")));
/// assert_eq!(params.get("page"), Some(&ParamValue::Number(2.0)));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::core::Params::new()
    };
    ($($key:literal => $value:expr),+ $(,)?) => {
        $crate::core::Params::new()$(.with($key, $value))+
    };
}

#[cfg(test)]
mod tests {
    use crate::core::ParamValue;

    #[test]
    fn transition_table_keeps_declaration_order() {
        let table = transition_table! {
            LIST { OPEN => ITEM },
            ITEM => "/item" { CLOSE => LIST },
        };

        assert_eq!(table.first_state(), Some("LIST"));
        assert_eq!(table.transition("ITEM", "CLOSE"), Some("LIST"));
        assert_eq!(table.route_of("LIST"), None);
    }

    #[test]
    fn transition_table_accepts_states_without_actions() {
        let table = transition_table! {
            DONE {},
        };
        assert!(table.contains("DONE"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn params_macro_builds_map() {
        let empty = params! {};
        assert!(empty.is_empty());

        let params = params! { "id" => "5", "n" => 1.5 };
        assert_eq!(params.get("id"), Some(&ParamValue::from("5")));
        assert_eq!(params.get("n"), Some(&ParamValue::Number(1.5)));
    }
}
