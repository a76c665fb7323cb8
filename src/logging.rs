//! Process-wide logging to an append-only file.
//!
//! Lines carry timestamp, level, thread name, and message; the Logs tab
//! reads the whole file back for display. Observability only: task
//! correctness never depends on the log.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILE: &str = "lzpack.log";

/// Initialize the global subscriber writing to `path`. Called once from
/// `main` before any task dispatch; the returned guard flushes buffered
/// lines when dropped, which is the process's log flush point.
pub fn init(path: &Path) -> Result<WorkerGuard> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_thread_names(true)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("install logging subscriber: {e}"))?;
    Ok(guard)
}

/// Read the whole log for display. A missing file is created with an
/// initial line rather than treated as an error.
pub fn read_log(path: &Path) -> String {
    if !path.exists() {
        let created = "Log file created.";
        if let Err(e) = fs::write(path, format!("{created}\n")) {
            return format!("Error creating log file: {e}");
        }
        return created.to_string();
    }
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("error reading log file: {e}");
            format!("Error reading log file: {e}")
        }
    }
}
