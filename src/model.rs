use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension written by compression and recognized by decompression.
pub const COMPRESSED_EXTENSION: &str = "lzma";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Compress,
    Decompress,
}

impl TaskKind {
    /// Progressive verb for in-flight status lines.
    pub fn verb(self) -> &'static str {
        match self {
            TaskKind::Compress => "Compressing",
            TaskKind::Decompress => "Decompressing",
        }
    }

    pub fn done(self) -> &'static str {
        match self {
            TaskKind::Compress => "Compressed",
            TaskKind::Decompress => "Decompressed",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            TaskKind::Compress => "Compression",
            TaskKind::Decompress => "Decompression",
        }
    }
}

/// One unit of work: an operation from an input file to an output file.
/// Owned by the worker that executes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub kind: TaskKind,
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Final outcome of a task, serializable for `--json` headless output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub kind: TaskKind,
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: TaskStatus,
    pub message: String,
}

impl TaskReport {
    pub fn pending(task: &Task) -> Self {
        Self {
            kind: task.kind,
            input: task.input.clone(),
            output: task.output.clone(),
            status: TaskStatus::Pending,
            message: String::new(),
        }
    }

    pub fn succeed(&mut self, message: String) {
        self.status = TaskStatus::Succeeded;
        self.message = message;
    }

    pub fn fail(&mut self, message: String) {
        self.status = TaskStatus::Failed;
        self.message = message;
    }
}

/// Events emitted by the controller and consumed by UI layers.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A worker was dispatched; `active` is the in-flight count after it.
    TaskStarted { active: u32 },
    /// A worker finished (success or failure). Sent exactly once per task,
    /// strictly after its I/O has terminated. `idle` means no tasks remain.
    TaskFinished { message: String, idle: bool },
    /// A plain status line for the status bar.
    Status(String),
    /// The log file gained new entries; viewers should re-read it.
    LogsChanged,
}

/// Display style for a status message. Keyword-based and best-effort; this
/// only affects coloring, never behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Error,
    Success,
    Neutral,
}

const ERROR_KEYWORDS: [&str; 4] = ["error", "failed", "missing", "corrupt"];

impl StatusLevel {
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if ERROR_KEYWORDS.iter().any(|w| lower.contains(w)) {
            StatusLevel::Error
        } else if lower.contains("success") {
            StatusLevel::Success
        } else {
            StatusLevel::Neutral
        }
    }
}

/// Suggested output path for compressing `input`: the input name plus the
/// compressed extension.
pub fn suggest_compress_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(COMPRESSED_EXTENSION);
    PathBuf::from(name)
}

/// Suggested output path for decompressing `input`: strips a trailing
/// compressed extension (case-insensitive), otherwise appends
/// `.decompressed`.
pub fn suggest_decompress_output(input: &Path) -> PathBuf {
    if let Some(ext) = input.extension().and_then(|e| e.to_str()) {
        if ext.eq_ignore_ascii_case(COMPRESSED_EXTENSION) {
            return input.with_extension("");
        }
    }
    let mut name = input.as_os_str().to_os_string();
    name.push(".decompressed");
    PathBuf::from(name)
}

/// Last path component for status messages, falling back to the full path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
