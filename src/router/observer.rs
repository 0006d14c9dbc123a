//! Change notification for router observers.

use crate::core::{CurrentState, ParamChange, Params};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A single applied change, delivered once to every observer.
#[derive(Clone, Debug, PartialEq)]
pub enum RouterEvent {
    /// The state name changed. `current` already carries the reconciled
    /// params, so observers never see a new name with stale params.
    StateChanged {
        previous: String,
        current: CurrentState,
    },

    /// Same state, params updated in place.
    ParamsChanged {
        state: String,
        changes: Vec<ParamChange>,
        params: Params,
    },
}

impl RouterEvent {
    /// Name of the state after the change.
    pub fn state(&self) -> &str {
        match self {
            Self::StateChanged { current, .. } => &current.name,
            Self::ParamsChanged { state, .. } => state,
        }
    }

    /// Params after the change.
    pub fn params(&self) -> &Params {
        match self {
            Self::StateChanged { current, .. } => &current.params,
            Self::ParamsChanged { params, .. } => params,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&RouterEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Observer)>>,
}

impl Observers {
    pub(crate) fn subscribe(&self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    // Snapshot first so observers may subscribe, unsubscribe or emit.
    pub(crate) fn notify(&self, event: &RouterEvent) {
        let observers: Vec<Observer> = self
            .entries
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn event() -> RouterEvent {
        RouterEvent::StateChanged {
            previous: "HOME".to_string(),
            current: CurrentState::new("PAGE", Params::new()),
        }
    }

    #[test]
    fn notify_reaches_every_observer() {
        let observers = Observers::default();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = Arc::clone(&count);
            observers.subscribe(Arc::new(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }

        observers.notify(&event());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unsubscribe_removes_only_that_observer() {
        let observers = Observers::default();
        let first = observers.subscribe(Arc::new(|_| {}));
        let _second = observers.subscribe(Arc::new(|_| {}));

        assert!(observers.unsubscribe(first));
        assert!(!observers.unsubscribe(first));
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn event_accessors_read_post_change_values() {
        let event = event();
        assert_eq!(event.state(), "PAGE");
        assert!(event.params().is_empty());
    }
}
