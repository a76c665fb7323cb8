//! Application-level orchestration utilities.
//!
//! This module owns the background task lifecycle (dispatch, completion
//! accounting, shutdown) and the channel plumbing between worker and UI
//! contexts. UI/CLI layers call into this module to keep responsibilities
//! separated.

mod controller;
mod lifecycle;

pub use controller::{run_controller, UiCommand};
pub use lifecycle::{
    ActiveTaskCounter, AlreadyDestroyed, ShutdownCoordinator, ShutdownState, StatusReporter,
};
