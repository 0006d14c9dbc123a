//! The router shell around the pure core.
//!
//! A [`Router`] owns the current state, drives transitions from the
//! [`TransitionTable`](crate::core::TransitionTable), keeps an optional
//! persistence collaborator in sync and notifies observers of every applied
//! change.
//!
//! # Key Concepts
//!
//! - **emit**: the only transition entry point for application code
//! - **set_current_state**: force a state, as persistence notifications do
//! - **Observers**: one [`RouterEvent`] per applied change, never a partial one

mod machine;
mod observer;

pub use machine::{EmitOutcome, Router};
pub use observer::{RouterEvent, SubscriptionId};
