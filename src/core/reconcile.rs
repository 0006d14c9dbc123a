//! Parameter reconciliation.
//!
//! Every state change runs the incoming parameters through two passes:
//!
//! 1. Each key the current params already track takes the incoming value if
//!    one is present and non-null, otherwise its start default (which may be
//!    absent, removing the key). The key is consumed from the incoming set.
//! 2. Whatever is left in the incoming set is new and gets added as-is.
//!
//! A null (`None`) incoming value is the same as an absent one: it clears the
//! key back to its default.

use super::params::{ParamValue, Params, Query};
use serde::{Deserialize, Serialize};

/// A single key whose value changed during reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamChange {
    pub key: String,
    pub previous: Option<ParamValue>,
    pub current: Option<ParamValue>,
}

/// Reconcile `params` in place against `defaults` and `incoming`.
///
/// Tracked keys are updated key by key; new keys are inserted. Returns the
/// keys whose value actually changed, in processing order.
pub fn reconcile_in_place(params: &mut Params, defaults: &Params, incoming: Query) -> Vec<ParamChange> {
    let mut incoming = incoming;
    let mut changes = Vec::new();

    let tracked: Vec<String> = params.keys().cloned().collect();
    for key in tracked {
        let next = match incoming.take(&key) {
            Some(Some(value)) => Some(value),
            _ => defaults.get(&key).cloned(),
        };
        let previous = match &next {
            Some(value) => params.insert(key.clone(), value.clone()),
            None => params.remove(&key),
        };
        if !same_value(previous.as_ref(), next.as_ref()) {
            changes.push(ParamChange {
                key,
                previous,
                current: next,
            });
        }
    }

    for (key, value) in incoming {
        // A brand-new key that arrives cleared has nothing to track.
        if let Some(value) = value {
            params.insert(key.clone(), value.clone());
            changes.push(ParamChange {
                key,
                previous: None,
                current: Some(value),
            });
        }
    }

    changes
}

fn same_value(a: Option<&ParamValue>, b: Option<&ParamValue>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_as(b),
        (None, None) => true,
        _ => false,
    }
}

/// Pure form of [`reconcile_in_place`].
///
/// # Example
///
/// ```rust
/// use waymark::core::{reconcile, ParamValue, Params, Query};
///
/// let defaults = Params::new().with("tab", "overview");
/// let existing = Params::new().with("tab", "files").with("id", "5");
///
/// let next = reconcile(&existing, &defaults, &Query::new().set("id", "6").set("sort", "asc"));
///
/// assert_eq!(next.get("tab"), Some(&ParamValue::from("overview")));
/// assert_eq!(next.get("id"), Some(&ParamValue::from("6")));
/// assert_eq!(next.get("sort"), Some(&ParamValue::from("asc")));
/// ```
pub fn reconcile(existing: &Params, defaults: &Params, incoming: &Query) -> Params {
    let mut next = existing.clone();
    reconcile_in_place(&mut next, defaults, incoming.clone());
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_key_adopts_incoming_value() {
        let existing = Params::new().with("q", "1");
        let next = reconcile(&existing, &Params::new(), &Query::new().set("q", "2"));
        assert_eq!(next.get("q"), Some(&ParamValue::from("2")));
    }

    #[test]
    fn tracked_key_missing_from_incoming_reverts_to_default() {
        let defaults = Params::new().with("q", "start");
        let existing = Params::new().with("q", "changed");
        let next = reconcile(&existing, &defaults, &Query::new());
        assert_eq!(next.get("q"), Some(&ParamValue::from("start")));
    }

    #[test]
    fn null_incoming_value_reverts_to_default() {
        let defaults = Params::new().with("q", "start");
        let existing = Params::new().with("q", "changed");
        let next = reconcile(&existing, &defaults, &Query::new().clear("q"));
        assert_eq!(next.get("q"), Some(&ParamValue::from("start")));
    }

    #[test]
    fn tracked_key_without_default_is_removed() {
        let existing = Params::new().with("q", "1");
        let next = reconcile(&existing, &Params::new(), &Query::new().clear("q"));
        assert!(!next.contains_key("q"));
    }

    #[test]
    fn new_key_is_added_with_exact_value() {
        let defaults = Params::new().with("fresh", "ignored");
        let next = reconcile(&Params::new(), &defaults, &Query::new().set("fresh", 9));
        assert_eq!(next.get("fresh"), Some(&ParamValue::Number(9.0)));
    }

    #[test]
    fn new_key_arriving_cleared_is_not_tracked() {
        let next = reconcile(&Params::new(), &Params::new(), &Query::new().clear("x"));
        assert!(next.is_empty());
    }

    #[test]
    fn in_place_reports_only_real_changes() {
        let defaults = Params::new().with("a", "1");
        let mut params = Params::new().with("a", "1").with("b", "2");

        let changes = reconcile_in_place(
            &mut params,
            &defaults,
            Query::new().set("a", "1").set("b", "3").set("c", "4"),
        );

        let keys: Vec<&str> = changes.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert_eq!(changes[0].previous, Some(ParamValue::from("2")));
        assert_eq!(changes[0].current, Some(ParamValue::from("3")));
        assert_eq!(changes[1].previous, None);
    }

    #[test]
    fn unchanged_nan_is_not_a_change() {
        let mut params = Params::new().with("ratio", f64::NAN);
        let changes = reconcile_in_place(
            &mut params,
            &Params::new(),
            Query::new().set("ratio", f64::NAN),
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn in_place_reports_removal() {
        let mut params = Params::new().with("gone", "1");
        let changes = reconcile_in_place(&mut params, &Params::new(), Query::new());

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].current, None);
        assert!(params.is_empty());
    }

    #[test]
    fn reconcile_is_pure() {
        let defaults = Params::new().with("a", "0");
        let existing = Params::new().with("a", "1").with("b", "2");
        let incoming = Query::new().clear("a").set("c", "3");

        let first = reconcile(&existing, &defaults, &incoming);
        let second = reconcile(&existing, &defaults, &incoming);

        assert_eq!(first, second);
        assert_eq!(existing.get("a"), Some(&ParamValue::from("1")));
    }
}
