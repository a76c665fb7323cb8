//! Lifecycle primitives shared between the worker and UI contexts.

use crate::model::AppEvent;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

/// Counts background tasks in flight. Drives control enable/disable and the
/// activity indicator in UI layers: zero means idle and safe to re-enable.
///
/// All mutation goes through the lock; callers only see
/// increment/decrement/is_idle, never the raw count cell.
#[derive(Debug, Default)]
pub struct ActiveTaskCounter {
    count: Mutex<u32>,
}

impl ActiveTaskCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once when a task starts. Returns the new in-flight count.
    pub fn increment(&self) -> u32 {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
        *count
    }

    /// Called once when a task's completion path runs, success or failure.
    /// Going below zero breaks the start/finish pairing: fatal in debug
    /// builds, clamped in release builds.
    pub fn decrement(&self) -> u32 {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        debug_assert!(*count > 0, "task counter decremented below zero");
        if *count == 0 {
            error!("task counter decremented at zero; clamping");
        } else {
            *count -= 1;
        }
        *count
    }

    pub fn active(&self) -> u32 {
        *self.count.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_idle(&self) -> bool {
        self.active() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    NotRequested,
    ConfirmedClosing,
    Closed,
}

/// Returned by a teardown attempt after the application has already been
/// torn down. Swallowed and logged by callers, never surfaced to the user.
#[derive(Debug, Error)]
#[error("application already destroyed")]
pub struct AlreadyDestroyed;

/// Governs application exit. Teardown's observable effect happens at most
/// once per process; a duplicate invocation is caught and logged instead of
/// propagating.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    state: ShutdownState,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            state: ShutdownState::NotRequested,
        }
    }

    pub fn state(&self) -> ShutdownState {
        self.state
    }

    /// Mark that the user confirmed closing while work was still in flight.
    /// A declined prompt never calls this: the close request is fully
    /// cancelled and the state stays `NotRequested`.
    pub fn begin_close(&mut self) {
        if self.state == ShutdownState::NotRequested {
            self.state = ShutdownState::ConfirmedClosing;
        }
    }

    /// Run `teardown` and transition to `Closed`. A second call is the
    /// already-destroyed condition: logged and reported, `teardown` not run.
    pub fn teardown<F: FnOnce()>(&mut self, teardown: F) -> Result<(), AlreadyDestroyed> {
        if self.state == ShutdownState::Closed {
            error!("teardown invoked again; application already destroyed");
            return Err(AlreadyDestroyed);
        }
        teardown();
        self.state = ShutdownState::Closed;
        info!("application closed");
        Ok(())
    }
}

/// Thread-safe status sink. Messages are marshaled onto the UI-owning
/// thread through the event channel, never applied to UI state directly.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: UnboundedSender<AppEvent>,
}

impl StatusReporter {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }

    /// Callable from any context. Best-effort: a closed UI drops the message.
    pub fn report(&self, message: impl Into<String>) {
        let _ = self.tx.send(AppEvent::Status(message.into()));
    }

    pub fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }
}
