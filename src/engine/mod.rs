//! Blocking execution of compress/decompress tasks.
//!
//! Everything here runs on a worker thread, never on the UI-owning thread.
//! Callers dispatch through `spawn_blocking` and receive the outcome as a
//! `TaskReport`; no failure escapes as a panic or an unhandled error.

pub mod codec;

use crate::model::{file_name, Task, TaskKind, TaskReport};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

/// Failure categories for a task. Each renders as the status message shown
/// to the user; keyword classification keys off these strings.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Input or output path missing.")]
    MissingArgument,
    #[error("Error: Input file '{0}' not found.")]
    NotFound(String),
    #[error("LZMA error for '{file}'. File may be corrupt or not LZMA/XZ data: {source}")]
    Codec { file: String, source: io::Error },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Check task preconditions. Callers reject synchronously on error instead
/// of spawning a worker.
pub fn validate(task: &Task) -> Result<(), TaskError> {
    if task.input.as_os_str().is_empty() || task.output.as_os_str().is_empty() {
        warn!("{:?} rejected: path missing", task.kind);
        return Err(TaskError::MissingArgument);
    }
    if !task.input.exists() {
        warn!(
            "{:?} rejected: input '{}' not found",
            task.kind,
            task.input.display()
        );
        return Err(TaskError::NotFound(file_name(&task.input)));
    }
    Ok(())
}

/// Run `task` to completion and fold the outcome into a report. Blocking.
pub fn run(task: Task) -> TaskReport {
    let mut report = TaskReport::pending(&task);
    match execute(&task) {
        Ok(message) => {
            info!("{message}");
            report.succeed(message);
        }
        Err(err) => {
            error!(
                "{} failed for '{}': {err}",
                task.kind.noun(),
                task.input.display()
            );
            report.fail(failure_message(task.kind, &err));
        }
    }
    info!("{} task finalized for '{}'", task.kind.noun(), task.input.display());
    report
}

fn execute(task: &Task) -> Result<String, TaskError> {
    info!(
        "{} task starting: '{}' -> '{}'",
        task.kind.noun(),
        task.input.display(),
        task.output.display()
    );
    let input = File::open(&task.input).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TaskError::NotFound(file_name(&task.input)),
        _ => TaskError::Io(e),
    })?;
    let output = File::create(&task.output).map_err(TaskError::Io)?;

    let mut reader = BufReader::new(input);
    let writer = BufWriter::new(output);
    let mut writer = match task.kind {
        TaskKind::Compress => codec::compress_stream(&mut reader, writer),
        TaskKind::Decompress => codec::decompress_stream(&mut reader, writer),
    }
    .map_err(|e| categorize(e, &task.input))?;
    writer.flush().map_err(TaskError::Io)?;

    Ok(format!(
        "{} successfully: {}",
        task.kind.done(),
        task.output.display()
    ))
}

fn failure_message(kind: TaskKind, err: &TaskError) -> String {
    match err {
        TaskError::Io(e) => format!("{} error: {e}", kind.noun()),
        other => other.to_string(),
    }
}

// xz2 surfaces liblzma failures as io errors wrapping `stream::Error`;
// anything else during the copy is ordinary I/O.
fn categorize(err: io::Error, input: &Path) -> TaskError {
    let codec = err.kind() == io::ErrorKind::InvalidData
        || err
            .get_ref()
            .is_some_and(|inner| inner.is::<xz2::stream::Error>());
    if codec {
        TaskError::Codec {
            file: file_name(input),
            source: err,
        }
    } else {
        TaskError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use std::path::PathBuf;

    fn task(kind: TaskKind, input: &str, output: &str) -> Task {
        Task {
            kind,
            input: PathBuf::from(input),
            output: PathBuf::from(output),
        }
    }

    #[test]
    fn empty_paths_are_missing_arguments() {
        let err = validate(&task(TaskKind::Compress, "", "out.lzma")).unwrap_err();
        assert!(matches!(err, TaskError::MissingArgument));
        let err = validate(&task(TaskKind::Decompress, "in.lzma", "")).unwrap_err();
        assert!(matches!(err, TaskError::MissingArgument));
    }

    #[test]
    fn nonexistent_input_is_not_found() {
        let err = validate(&task(
            TaskKind::Compress,
            "/definitely/not/here.txt",
            "out.lzma",
        ))
        .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn failed_run_reports_once_with_categorized_message() {
        let report = run(task(
            TaskKind::Decompress,
            "/definitely/not/here.lzma",
            "/tmp/out",
        ));
        assert_eq!(report.status, TaskStatus::Failed);
        assert!(report.message.contains("not found"));
    }
}
