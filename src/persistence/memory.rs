//! In-process history stack implementing [`Persistence`].

use super::{ListenCallback, Persistence, PersistenceSnapshot};
use crate::core::{Params, StateRequest, TransitionTable};
use parking_lot::Mutex;
use std::sync::Arc;

/// When a write becomes visible to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// Notify listeners from inside `write`
    #[default]
    Immediate,

    /// Queue the notification until [`MemoryPersistence::flush`]
    Deferred,
}

#[derive(Default)]
struct Stack {
    entries: Vec<PersistenceSnapshot>,
    cursor: usize,
    pending: usize,
}

impl Stack {
    fn current(&self) -> Option<&PersistenceSnapshot> {
        self.entries.get(self.cursor)
    }

    fn push(&mut self, snapshot: PersistenceSnapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
    }
}

/// Browser-history style persistence kept in memory.
///
/// Writes map the proposed state to its declared route and push a new entry,
/// dropping any forward entries. `navigate`, `back` and `forward` simulate
/// changes made outside the router.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use waymark::core::Params;
/// use waymark::persistence::{CommitMode, MemoryPersistence, Persistence};
///
/// let history = Arc::new(MemoryPersistence::with_mode(CommitMode::Deferred));
/// history.navigate("/page", Params::new().with("id", "5"));
///
/// let snapshot = history.current_state().unwrap();
/// assert_eq!(snapshot.name, "/page");
/// ```
#[derive(Default)]
pub struct MemoryPersistence {
    stack: Mutex<Stack>,
    listeners: Mutex<Vec<Arc<dyn Fn() + Send + Sync>>>,
    mode: CommitMode,
}

impl MemoryPersistence {
    /// Empty history that notifies immediately.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: CommitMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// History seeded with an existing entry, as if the process started on
    /// that route.
    pub fn starting_at(route: impl Into<String>, params: Params) -> Self {
        let persistence = Self::new();
        persistence
            .stack
            .lock()
            .push(PersistenceSnapshot::new(route, params));
        persistence
    }

    /// Builder-style commit mode override.
    pub fn mode(mut self, mode: CommitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Deliver queued notifications. Returns how many were delivered.
    pub fn flush(&self) -> usize {
        let pending = std::mem::take(&mut self.stack.lock().pending);
        for _ in 0..pending {
            self.notify();
        }
        pending
    }

    /// Number of writes waiting for [`flush`](Self::flush).
    pub fn pending(&self) -> usize {
        self.stack.lock().pending
    }

    /// External navigation: push an entry and notify right away.
    pub fn navigate(&self, route: impl Into<String>, params: Params) {
        self.stack
            .lock()
            .push(PersistenceSnapshot::new(route, params));
        self.notify();
    }

    /// Step back one entry. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let moved = {
            let mut stack = self.stack.lock();
            if stack.cursor > 0 && !stack.entries.is_empty() {
                stack.cursor -= 1;
                true
            } else {
                false
            }
        };
        if moved {
            self.notify();
        }
        moved
    }

    /// Step forward one entry. Returns `false` at the end of history.
    pub fn forward(&self) -> bool {
        let moved = {
            let mut stack = self.stack.lock();
            if stack.cursor + 1 < stack.entries.len() {
                stack.cursor += 1;
                true
            } else {
                false
            }
        };
        if moved {
            self.notify();
        }
        moved
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<PersistenceSnapshot> {
        self.stack.lock().entries.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    // Listeners re-enter through `current_state`, so no lock is held while
    // they run.
    fn notify(&self) {
        let listeners: Vec<_> = self.listeners.lock().iter().cloned().collect();
        for listener in listeners {
            listener();
        }
    }
}

impl Persistence for MemoryPersistence {
    fn write(&self, proposed: &StateRequest, table: &TransitionTable) {
        let route = table
            .route_of(&proposed.name)
            .unwrap_or(proposed.name.as_str())
            .to_string();
        let snapshot = PersistenceSnapshot::new(route, proposed.params.compact());

        tracing::trace!(route = %snapshot.name, "persisting proposed state");

        let notify_now = {
            let mut stack = self.stack.lock();
            stack.push(snapshot);
            match self.mode {
                CommitMode::Immediate => true,
                CommitMode::Deferred => {
                    stack.pending += 1;
                    false
                }
            }
        };
        if notify_now {
            self.notify();
        }
    }

    fn listen(&self, callback: ListenCallback) {
        self.listeners.lock().push(Arc::from(callback));
    }

    fn current_state(&self) -> Option<PersistenceSnapshot> {
        self.stack.lock().current().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ParamValue, Query, StateDefinition};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table() -> TransitionTable {
        TransitionTable::new()
            .state("HOME", StateDefinition::new().route("/").action("GO", "PAGE"))
            .state("PAGE", StateDefinition::new().route("/page"))
            .state("PLAIN", StateDefinition::new())
    }

    fn counter(persistence: &MemoryPersistence) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        persistence.listen(Box::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        count
    }

    #[test]
    fn empty_history_has_no_snapshot() {
        assert!(MemoryPersistence::new().current_state().is_none());
    }

    #[test]
    fn write_maps_state_to_route_and_drops_cleared_params() {
        let persistence = MemoryPersistence::new();
        let request = StateRequest::new("PAGE", Query::new().set("id", "5").clear("q"));

        persistence.write(&request, &table());

        let snapshot = persistence.current_state().unwrap();
        assert_eq!(snapshot.name, "/page");
        assert_eq!(snapshot.params.get("id"), Some(&ParamValue::from("5")));
        assert!(!snapshot.params.contains_key("q"));
    }

    #[test]
    fn write_keeps_name_for_state_without_route() {
        let persistence = MemoryPersistence::new();
        persistence.write(&StateRequest::new("PLAIN", Query::new()), &table());
        assert_eq!(persistence.current_state().unwrap().name, "PLAIN");
    }

    #[test]
    fn immediate_mode_notifies_inside_write() {
        let persistence = MemoryPersistence::new();
        let count = counter(&persistence);

        persistence.write(&StateRequest::new("PAGE", Query::new()), &table());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(persistence.pending(), 0);
    }

    #[test]
    fn deferred_mode_waits_for_flush() {
        let persistence = MemoryPersistence::with_mode(CommitMode::Deferred);
        let count = counter(&persistence);

        persistence.write(&StateRequest::new("PAGE", Query::new()), &table());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(persistence.pending(), 1);

        assert_eq!(persistence.flush(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(persistence.flush(), 0);
    }

    #[test]
    fn back_and_forward_move_cursor() {
        let persistence = MemoryPersistence::starting_at("/", Params::new());
        let count = counter(&persistence);
        persistence.navigate("/page", Params::new());

        assert!(persistence.back());
        assert_eq!(persistence.current_state().unwrap().name, "/");
        assert!(!persistence.back());

        assert!(persistence.forward());
        assert_eq!(persistence.current_state().unwrap().name, "/page");
        assert!(!persistence.forward());

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn write_after_back_drops_forward_entries() {
        let persistence = MemoryPersistence::starting_at("/", Params::new());
        persistence.navigate("/page", Params::new());
        persistence.back();

        persistence.write(&StateRequest::new("PLAIN", Query::new()), &table());

        let names: Vec<String> = persistence.entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["/".to_string(), "PLAIN".to_string()]);
    }
}
