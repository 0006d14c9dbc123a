//! The router: current state, transitions and the persistence binding.

use super::observer::{Observers, RouterEvent, SubscriptionId};
use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::core::{
    reconcile, reconcile_in_place, CurrentState, Params, Query, StateHistory, StateRequest,
    StateTransition, TransitionTable,
};
use crate::persistence::{Persistence, PersistenceSnapshot, ReverseRoutes};
use chrono::Utc;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// What `emit` did with an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// The action is not declared for the current state
    Ignored,

    /// Applied locally (no persistence bound)
    Applied { target: String },

    /// Written to persistence; applied once persistence notifies back
    Proposed { target: String },
}

/// A persistence collaborator the router is bound to, with its route lookup.
struct Bridge {
    persistence: Arc<dyn Persistence>,
    routes: ReverseRoutes,
}

/// Restored history waiting for its state to come back from persistence.
struct PendingRestore {
    state: String,
    history: StateHistory,
}

struct Inner {
    current: CurrentState,
    history: StateHistory,
    pending_restore: Option<PendingRestore>,
}

struct Shared {
    table: TransitionTable,
    start_state: String,
    start_params: Params,
    bridge: Option<Bridge>,
    inner: RwLock<Inner>,
    observers: Observers,
}

/// Table-driven state machine router.
///
/// Cloning a `Router` yields another handle to the same state.
///
/// # Example
///
/// ```rust
/// use waymark::builder::RouterBuilder;
/// use waymark::core::{ParamValue, Query};
/// use waymark::transition_table;
///
/// let router = RouterBuilder::new(transition_table! {
///     HOME { GO => PAGE },
///     PAGE { BACK => HOME },
/// })
/// .build()
/// .unwrap();
///
/// router.emit("GO", Query::new().set("q", "1"));
/// assert_eq!(router.state(), "PAGE");
/// assert_eq!(router.params().get("q"), Some(&ParamValue::from("1")));
///
/// router.emit("BACK", Query::new());
/// assert_eq!(router.state(), "HOME");
/// assert_eq!(router.params().get("q"), None);
/// ```
#[derive(Clone)]
pub struct Router {
    shared: Arc<Shared>,
}

impl Router {
    /// Construct and seed the router. Table sanity is the builder's job.
    ///
    /// A persistence collaborator is only bound when it already holds a
    /// snapshot. Without one the router starts from `start_state` and runs
    /// unbound, applying transitions locally.
    pub(crate) fn start(
        table: TransitionTable,
        start_state: String,
        start_params: Params,
        persistence: Option<Arc<dyn Persistence>>,
    ) -> Self {
        let snapshot = persistence.as_ref().and_then(|p| p.current_state());
        let (bridge, seed) = match (persistence, snapshot) {
            (Some(persistence), Some(snapshot)) => {
                let routes = ReverseRoutes::from_table(&table);
                let seed = seed_from_snapshot(snapshot, &routes, &start_state, &start_params);
                (Some(Bridge { persistence, routes }), seed)
            }
            (Some(_), None) => {
                tracing::warn!("persistence has no snapshot, router runs unbound");
                (None, StateRequest::new(start_state.clone(), start_params.clone()))
            }
            (None, _) => (None, StateRequest::new(start_state.clone(), start_params.clone())),
        };
        let current = initial_state(&table, &start_params, seed);

        tracing::debug!(
            state = %current.name,
            persistence = bridge.is_some(),
            "router started"
        );

        let shared = Arc::new(Shared {
            table,
            start_state,
            start_params,
            bridge,
            inner: RwLock::new(Inner {
                current,
                history: StateHistory::new(),
                pending_restore: None,
            }),
            observers: Observers::default(),
        });

        // Registered after seeding, so a notification can never observe an
        // unseeded router.
        if let Some(bridge) = &shared.bridge {
            let weak: Weak<Shared> = Arc::downgrade(&shared);
            bridge.persistence.listen(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.sync_from_persistence();
                }
            }));
        }

        Self { shared }
    }

    /// Current state name.
    pub fn state(&self) -> String {
        self.shared.inner.read().current.name.clone()
    }

    /// Snapshot of the current state name and params.
    pub fn current_state(&self) -> CurrentState {
        self.shared.inner.read().current.clone()
    }

    /// Snapshot of the current params.
    pub fn params(&self) -> Params {
        self.shared.inner.read().current.params.clone()
    }

    pub fn table(&self) -> &TransitionTable {
        &self.shared.table
    }

    pub fn start_state(&self) -> &str {
        &self.shared.start_state
    }

    /// Defaults used to refill cleared or omitted params.
    pub fn start_params(&self) -> &Params {
        &self.shared.start_params
    }

    /// Whether the router is bound to a persistence collaborator.
    pub fn has_persistence(&self) -> bool {
        self.shared.bridge.is_some()
    }

    /// Resolve an external route to a state name. Always `None` when no
    /// persistence is bound.
    pub fn resolve_route(&self, route: &str) -> Option<String> {
        self.shared
            .bridge
            .as_ref()
            .and_then(|bridge| bridge.routes.resolve(route))
            .map(str::to_string)
    }

    /// Transition history (state name changes only).
    pub fn history(&self) -> StateHistory {
        self.shared.inner.read().history.clone()
    }

    /// Trigger `action` from the current state with `params` on top of the
    /// current params.
    ///
    /// Only the keys in `params` count as supplied: tracked keys left out
    /// fall back to their start defaults, as with any other state change.
    /// Undeclared actions are ignored. With persistence bound the resolved
    /// state is written out and nothing changes locally until persistence
    /// notifies back.
    pub fn emit(&self, action: &str, params: impl Into<Query>) -> EmitOutcome {
        let extra = params.into();
        let (target, resolved) = {
            let inner = self.shared.inner.read();
            let Some(target) = self.shared.table.transition(&inner.current.name, action) else {
                tracing::debug!(
                    state = %inner.current.name,
                    action,
                    "action not declared for state, ignoring"
                );
                return EmitOutcome::Ignored;
            };
            let resolved = reconcile(&inner.current.params, &self.shared.start_params, &extra);
            (target.to_string(), resolved)
        };

        match &self.shared.bridge {
            Some(bridge) => {
                tracing::debug!(action, target = %target, "proposing transition to persistence");
                let proposal = StateRequest::new(target.clone(), resolved);
                bridge.persistence.write(&proposal, &self.shared.table);
                EmitOutcome::Proposed { target }
            }
            None => {
                self.shared.apply(StateRequest::new(target.clone(), extra));
                EmitOutcome::Applied { target }
            }
        }
    }

    /// Force the router into `candidate`.
    ///
    /// Unknown state names fall back to the first declared state, leaving
    /// params untouched.
    pub fn set_current_state(&self, candidate: StateRequest) {
        self.shared.apply(candidate);
    }

    /// Register an observer called once per applied change.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&RouterEvent) + Send + Sync + 'static,
    {
        self.shared.observers.subscribe(Arc::new(observer))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.observers.unsubscribe(id)
    }

    /// Capture the current state and history.
    pub fn checkpoint(&self) -> Checkpoint {
        let inner = self.shared.inner.read();
        Checkpoint::new(
            self.shared.start_state.clone(),
            self.shared.start_params.clone(),
            inner.current.clone(),
            inner.history.clone(),
        )
    }

    /// Re-apply a checkpoint.
    ///
    /// Without persistence the saved state goes through the normal
    /// reconciliation path and the saved history replaces the current one.
    /// With persistence bound the saved state is only written out; the state
    /// and history land together when persistence notifies back with it.
    pub fn restore(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        checkpoint.validate(&self.shared.table)?;

        let request = StateRequest::from(checkpoint.current_state.clone());
        match &self.shared.bridge {
            Some(bridge) => {
                self.shared.inner.write().pending_restore = Some(PendingRestore {
                    state: checkpoint.current_state.name.clone(),
                    history: checkpoint.history.clone(),
                });
                bridge.persistence.write(&request, &self.shared.table);
            }
            None => {
                self.shared.apply(request);
                self.shared.inner.write().history = checkpoint.history.clone();
            }
        }

        tracing::debug!(
            checkpoint = %checkpoint.id,
            state = %checkpoint.current_state.name,
            "restored checkpoint"
        );
        Ok(())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("current", &self.current_state())
            .field("start_state", &self.shared.start_state)
            .field("persistence", &self.has_persistence())
            .field("observers", &self.shared.observers.len())
            .finish()
    }
}

impl Shared {
    fn apply(&self, candidate: StateRequest) {
        let event = {
            let mut inner = self.inner.write();
            let event = inner.transition(&self.table, &self.start_params, candidate);
            inner.settle_restore();
            event
        };

        if let Some(event) = event {
            if let RouterEvent::StateChanged { previous, current } = &event {
                tracing::debug!(from = %previous, to = %current.name, "state changed");
            }
            self.observers.notify(&event);
        }
    }

    fn sync_from_persistence(&self) {
        let Some(bridge) = &self.bridge else {
            return;
        };
        let Some(snapshot) = bridge.persistence.current_state() else {
            tracing::debug!("persistence notified without a snapshot, ignoring");
            return;
        };
        match bridge.routes.resolve(&snapshot.name) {
            Some(name) => {
                let params = self.start_params.merge(&Query::from(snapshot.params));
                self.apply(StateRequest::new(name, params));
            }
            None => {
                tracing::debug!(route = %snapshot.name, "unresolved persisted route, ignoring");
            }
        }
    }
}

impl Inner {
    fn transition(
        &mut self,
        table: &TransitionTable,
        start_params: &Params,
        candidate: StateRequest,
    ) -> Option<RouterEvent> {
        if !table.contains(&candidate.name) {
            let Some(first) = table.first_state() else {
                tracing::warn!(state = %candidate.name, "unknown state and empty table");
                return None;
            };
            tracing::warn!(
                state = %candidate.name,
                fallback = first,
                "unknown state, falling back to first declared state"
            );
            return (self.current.name != first).then(|| self.enter(first.to_string()));
        }

        let changes = reconcile_in_place(&mut self.current.params, start_params, candidate.params);
        for change in &changes {
            tracing::trace!(key = %change.key, current = ?change.current, "param updated");
        }

        if self.current.name != candidate.name {
            Some(self.enter(candidate.name))
        } else if !changes.is_empty() {
            Some(RouterEvent::ParamsChanged {
                state: self.current.name.clone(),
                changes,
                params: self.current.params.clone(),
            })
        } else {
            None
        }
    }

    // Name and params change under the same write lock.
    fn enter(&mut self, name: String) -> RouterEvent {
        let previous = std::mem::replace(&mut self.current.name, name);
        self.history = self.history.record(StateTransition {
            from: previous.clone(),
            to: self.current.name.clone(),
            params: self.current.params.clone(),
            timestamp: Utc::now(),
        });
        RouterEvent::StateChanged {
            previous,
            current: self.current.clone(),
        }
    }

    // The first change after a restore is written settles it.
    fn settle_restore(&mut self) {
        let Some(pending) = self.pending_restore.take() else {
            return;
        };
        if pending.state == self.current.name {
            self.history = pending.history;
        } else {
            tracing::debug!(
                expected = %pending.state,
                landed = %self.current.name,
                "persistence settled elsewhere, dropping restored history"
            );
        }
    }
}

fn seed_from_snapshot(
    snapshot: PersistenceSnapshot,
    routes: &ReverseRoutes,
    start_state: &str,
    start_params: &Params,
) -> StateRequest {
    match routes.resolve(&snapshot.name) {
        Some(name) => StateRequest::new(name, start_params.merge(&Query::from(snapshot.params))),
        None => {
            tracing::warn!(
                route = %snapshot.name,
                start_state,
                "persisted route does not resolve, using start state"
            );
            StateRequest::new(start_state, start_params.clone())
        }
    }
}

// Same rules as `Inner::transition`, starting from the start params and
// without history or notifications.
fn initial_state(table: &TransitionTable, start_params: &Params, seed: StateRequest) -> CurrentState {
    if table.contains(&seed.name) {
        let params = reconcile(start_params, start_params, &seed.params);
        return CurrentState::new(seed.name, params);
    }
    let name = table.first_state().unwrap_or_default().to_string();
    tracing::warn!(state = %seed.name, fallback = %name, "unknown start state, using first declared state");
    CurrentState::new(name, start_params.clone())
}
