//! Two-way binding with an external persistence layer.
//!
//! A persistence collaborator (browser history, a URL bar, a session store)
//! owns the authoritative snapshot once it is attached. The router proposes
//! transitions through [`Persistence::write`] and only applies them when the
//! collaborator notifies it through the callback registered with
//! [`Persistence::listen`].

mod memory;
mod routes;

pub use memory::{CommitMode, MemoryPersistence};
pub use routes::ReverseRoutes;

use crate::core::{Params, StateRequest, TransitionTable};
use serde::{Deserialize, Serialize};

/// Callback registered by the router. Invoked with no arguments; the router
/// re-reads [`Persistence::current_state`] itself.
pub type ListenCallback = Box<dyn Fn() + Send + Sync>;

/// Snapshot held by the persistence collaborator.
///
/// `name` is a route (or a state name for states without one).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistenceSnapshot {
    pub name: String,
    #[serde(default)]
    pub params: Params,
}

impl PersistenceSnapshot {
    pub fn new(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Capability the router needs from a persistence layer.
///
/// `write` is fire-and-forget: any resulting state change reaches the router
/// later, through a `listen` notification. Implementations may notify from
/// inside `write`; the router holds no locks while calling it.
pub trait Persistence: Send + Sync {
    /// Propose a new state. The full table is passed so the collaborator can
    /// map state names to routes.
    fn write(&self, proposed: &StateRequest, table: &TransitionTable);

    /// Register a change callback.
    fn listen(&self, callback: ListenCallback);

    /// Current snapshot, or `None` when nothing has been persisted yet.
    fn current_state(&self) -> Option<PersistenceSnapshot>;
}
