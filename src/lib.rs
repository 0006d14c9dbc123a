//! Waymark: a table-driven state machine router
//!
//! Waymark keeps a single current state (a name plus key/value params) and
//! moves it through a declarative table of named actions. It can be bound to
//! an external persistence layer, such as a history stack or URL bar, which
//! then becomes the source of truth: transitions are proposed to it and
//! applied when it notifies back.
//!
//! # Core Concepts
//!
//! - **Transition table**: state name -> { action -> target state, route }
//! - **Reconciliation**: params are merged, not replaced, on every change;
//!   cleared or omitted keys fall back to the start params
//! - **Persistence binding**: routes resolve to states and back, with
//!   write-then-notify round trips
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use waymark::builder::RouterBuilder;
//! use waymark::core::{ParamValue, Params, Query};
//! use waymark::persistence::MemoryPersistence;
//! use waymark::transition_table;
//!
//! let history = Arc::new(MemoryPersistence::starting_at(
//!     "/page",
//!     Params::new().with("id", "5"),
//! ));
//!
//! let router = RouterBuilder::new(transition_table! {
//!     HOME => "/" { GO => PAGE },
//!     PAGE => "/page" { BACK => HOME },
//! })
//! .persistence(history.clone())
//! .build()
//! .unwrap();
//!
//! assert_eq!(router.state(), "PAGE");
//! assert_eq!(router.params().get("id"), Some(&ParamValue::from("5")));
//!
//! router.emit("BACK", Query::new());
//! assert_eq!(router.state(), "HOME");
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod persistence;
pub mod router;

// Re-export commonly used types
pub use builder::{BuildError, RouterBuilder, RouterConfig};
pub use crate::core::{CurrentState, ParamValue, Params, Query, StateRequest, TransitionTable};
pub use persistence::{Persistence, PersistenceSnapshot};
pub use router::{EmitOutcome, Router, RouterEvent};
