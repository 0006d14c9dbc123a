//! Core router types and pure logic.
//!
//! This module holds the data model and the side-effect free pieces:
//! - Parameter values and maps
//! - The declarative transition table
//! - Parameter reconciliation
//! - Immutable transition history

mod history;
mod params;
mod reconcile;
mod state;
mod table;

pub use history::{StateHistory, StateTransition};
pub use params::{ParamValue, Params, Query};
pub use reconcile::{reconcile, reconcile_in_place, ParamChange};
pub use state::{CurrentState, StateRequest};
pub use table::{StateDefinition, TableViolation, TransitionTable};
