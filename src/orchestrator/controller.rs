//! Background task controller.
//!
//! Owns dispatch and completion accounting and emits events for
//! presentation layers.

use super::lifecycle::{ActiveTaskCounter, StatusReporter};
use crate::engine;
use crate::model::{file_name, AppEvent, Task, TaskReport};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Commands emitted by UI layers to control background work.
#[derive(Debug, Clone)]
pub enum UiCommand {
    /// Run a validated task on a worker. Callers check preconditions first.
    Dispatch(Task),
    /// Exit the controller. Any in-flight workers are abandoned and die
    /// with the process; their output may be left partial.
    Quit,
}

/// Orchestrate background tasks based on UI commands and emit events back
/// to presentation layers.
///
/// For every dispatched task: one counter increment and one `TaskStarted`
/// up front, then exactly one counter decrement, one `TaskFinished`, and one
/// best-effort `LogsChanged` after the worker's I/O has fully terminated.
/// The `TaskFinished` for a task can never be observed before its operation
/// has returned or failed.
pub async fn run_controller(
    reporter: StatusReporter,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
    counter: Arc<ActiveTaskCounter>,
) -> Result<()> {
    let mut workers: JoinSet<TaskReport> = JoinSet::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Dispatch(task)) => {
                        let active = counter.increment();
                        info!("task dispatched; {active} active");
                        reporter.emit(AppEvent::TaskStarted { active });
                        // Workers talk back only through the reporter; the
                        // in-progress status comes from the worker context.
                        let worker_reporter = reporter.clone();
                        workers.spawn_blocking(move || {
                            worker_reporter.report(format!(
                                "{} {}...",
                                task.kind.verb(),
                                file_name(&task.input)
                            ));
                            engine::run(task)
                        });
                    }
                    Some(UiCommand::Quit) | None => {
                        if !workers.is_empty() {
                            warn!(
                                "quitting with {} task(s) in flight; their output may be left partial",
                                workers.len()
                            );
                        }
                        break;
                    }
                }
            }
            // When no workers are running, park this branch instead of
            // polling `join_next` on an empty set.
            joined = async {
                if workers.is_empty() {
                    futures::future::pending().await
                } else {
                    workers.join_next().await
                }
            } => {
                if let Some(join_res) = joined {
                    let active = counter.decrement();
                    let idle = active == 0;
                    let message = match join_res {
                        Ok(report) => {
                            info!("task finished; {active} active");
                            report.message
                        }
                        Err(e) => {
                            warn!("worker join failed: {e}");
                            format!("Task failed: {e}")
                        }
                    };
                    reporter.emit(AppEvent::TaskFinished { message, idle });
                    reporter.emit(AppEvent::LogsChanged);
                }
            }
        }
    }

    // Dropping the set detaches any remaining blocking workers; they are
    // killed when the process exits (documented abandon-on-quit behavior).
    Ok(())
}
