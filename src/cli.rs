use crate::engine;
use crate::logging;
use crate::model::{self, Task, TaskKind, TaskStatus};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "lzpack",
    version,
    about = "LZMA file compression with an optional TUI"
)]
pub struct Cli {
    /// Compress FILE and exit (no TUI)
    #[arg(long, value_name = "FILE", conflicts_with = "decompress")]
    pub compress: Option<PathBuf>,

    /// Decompress FILE and exit (no TUI)
    #[arg(long, value_name = "FILE")]
    pub decompress: Option<PathBuf>,

    /// Output path for --compress/--decompress (defaults to the suggested name)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the task report as JSON (headless modes only)
    #[arg(long)]
    pub json: bool,

    /// Run silently: suppress all output except errors (for scripted usage)
    #[arg(long)]
    pub silent: bool,

    /// Log file location
    #[arg(long, default_value = logging::DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Directory the file picker opens in (defaults to the home directory)
    #[arg(long)]
    pub start_dir: Option<PathBuf>,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.compress.is_some() || self.decompress.is_some()
    }
}

pub async fn run(args: Cli) -> Result<()> {
    // Validate that --silent and --json only make sense for one-shot runs
    if (args.silent || args.json) && !args.is_headless() {
        return Err(anyhow::anyhow!(
            "--silent/--json require --compress or --decompress"
        ));
    }

    if args.is_headless() {
        return run_headless(args).await;
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(args).await
    }
    #[cfg(not(feature = "tui"))]
    {
        // Fallback when built without TUI support.
        Err(anyhow::anyhow!(
            "built without the tui feature; use --compress or --decompress"
        ))
    }
}

/// Build the one-shot task from headless arguments.
fn build_task(args: &Cli) -> Option<Task> {
    let (kind, input) = match (&args.compress, &args.decompress) {
        (Some(p), _) => (TaskKind::Compress, p.clone()),
        (None, Some(p)) => (TaskKind::Decompress, p.clone()),
        (None, None) => return None,
    };
    let output = args.output.clone().unwrap_or_else(|| match kind {
        TaskKind::Compress => model::suggest_compress_output(&input),
        TaskKind::Decompress => model::suggest_decompress_output(&input),
    });
    Some(Task {
        kind,
        input,
        output,
    })
}

/// Run a single task without the TUI and print its report.
async fn run_headless(args: Cli) -> Result<()> {
    let Some(task) = build_task(&args) else {
        return Err(anyhow::anyhow!("nothing to do"));
    };

    // Precondition failures reject synchronously; no worker is spawned.
    engine::validate(&task)?;

    let (out_tx, out_handle) = if args.silent {
        (None, None)
    } else {
        let (tx, handle) = spawn_output_writer();
        (Some(tx), Some(handle))
    };

    if let Some(tx) = out_tx.as_ref() {
        let _ = tx.send(OutputLine::Stderr(format!(
            "{} {}...",
            task.kind.verb(),
            model::file_name(&task.input)
        )));
    }

    let report = tokio::task::spawn_blocking(move || engine::run(task))
        .await
        .context("worker thread failed")?;

    if let Some(tx) = out_tx.as_ref() {
        if args.json {
            let out = serde_json::to_string_pretty(&report)?;
            let _ = tx.send(OutputLine::Stdout(out));
        } else {
            let _ = tx.send(OutputLine::Stdout(report.message.clone()));
        }
    }

    drop(out_tx);
    if let Some(handle) = out_handle {
        let _ = handle.await;
    }

    if report.status == TaskStatus::Failed {
        return Err(anyhow::anyhow!(report.message));
    }
    Ok(())
}
