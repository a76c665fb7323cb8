use lzpack::model::{AppEvent, Task, TaskKind, TaskStatus};
use lzpack::orchestrator::{run_controller, ActiveTaskCounter, StatusReporter, UiCommand};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

async fn next_event(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> AppEvent {
    timeout(Duration::from_secs(60), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

fn compress_task(input: &Path, output: &Path) -> Task {
    Task {
        kind: TaskKind::Compress,
        input: input.to_path_buf(),
        output: output.to_path_buf(),
    }
}

#[tokio::test]
async fn completion_event_arrives_once_and_only_after_io_finished() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("input.txt");
    fs::write(&input, b"some content worth compressing").unwrap();
    let output = tmp.path().join("input.txt.lzma");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let counter = Arc::new(ActiveTaskCounter::new());

    let controller = tokio::spawn(run_controller(
        StatusReporter::new(event_tx),
        cmd_rx,
        counter.clone(),
    ));

    cmd_tx
        .send(UiCommand::Dispatch(compress_task(&input, &output)))
        .unwrap();

    match next_event(&mut event_rx).await {
        AppEvent::TaskStarted { active } => assert_eq!(active, 1),
        other => panic!("expected TaskStarted, got {other:?}"),
    }

    let (message, idle) = loop {
        match next_event(&mut event_rx).await {
            AppEvent::TaskFinished { message, idle } => break (message, idle),
            AppEvent::Status(_) => {}
            other => panic!("unexpected event before completion: {other:?}"),
        }
    };
    assert!(idle);
    assert!(message.contains("successfully"), "{message}");

    // The event must not be observable before the output is complete: the
    // file already decompresses back to the original bytes at this point.
    let restored = tmp.path().join("restored.txt");
    let report = lzpack::engine::run(Task {
        kind: TaskKind::Decompress,
        input: output,
        output: restored.clone(),
    });
    assert_eq!(report.status, TaskStatus::Succeeded, "{}", report.message);
    assert_eq!(
        fs::read(&restored).unwrap(),
        b"some content worth compressing"
    );

    assert!(matches!(
        next_event(&mut event_rx).await,
        AppEvent::LogsChanged
    ));
    assert!(counter.is_idle());

    cmd_tx.send(UiCommand::Quit).unwrap();
    controller.await.unwrap().unwrap();

    // No second completion for the same task.
    assert!(event_rx.try_recv().is_err());
}

#[tokio::test]
async fn failed_task_still_reports_exactly_once() {
    let tmp = tempfile::tempdir().unwrap();
    let bogus = tmp.path().join("bogus.lzma");
    fs::write(&bogus, b"definitely not compressed data").unwrap();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let counter = Arc::new(ActiveTaskCounter::new());

    let controller = tokio::spawn(run_controller(
        StatusReporter::new(event_tx),
        cmd_rx,
        counter.clone(),
    ));

    cmd_tx
        .send(UiCommand::Dispatch(Task {
            kind: TaskKind::Decompress,
            input: bogus,
            output: tmp.path().join("out.bin"),
        }))
        .unwrap();

    let mut finished = 0;
    loop {
        match next_event(&mut event_rx).await {
            AppEvent::TaskFinished { message, idle } => {
                finished += 1;
                assert!(idle);
                assert!(message.to_lowercase().contains("corrupt"), "{message}");
                break;
            }
            AppEvent::TaskStarted { .. } | AppEvent::Status(_) => {}
            AppEvent::LogsChanged => {}
        }
    }
    assert_eq!(finished, 1);
    assert!(counter.is_idle());

    cmd_tx.send(UiCommand::Quit).unwrap();
    controller.await.unwrap().unwrap();
}

#[tokio::test]
async fn counter_returns_to_zero_after_concurrent_tasks() {
    let tmp = tempfile::tempdir().unwrap();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let counter = Arc::new(ActiveTaskCounter::new());

    let controller = tokio::spawn(run_controller(
        StatusReporter::new(event_tx),
        cmd_rx,
        counter.clone(),
    ));

    for i in 0..3 {
        let input = tmp.path().join(format!("file{i}.txt"));
        fs::write(&input, format!("contents of file number {i}")).unwrap();
        let output = tmp.path().join(format!("file{i}.txt.lzma"));
        cmd_tx
            .send(UiCommand::Dispatch(compress_task(&input, &output)))
            .unwrap();
    }

    let mut idle_flags = Vec::new();
    while idle_flags.len() < 3 {
        if let AppEvent::TaskFinished { idle, .. } = next_event(&mut event_rx).await {
            idle_flags.push(idle);
        }
    }

    // Once every dispatched task has finished, the count is back at zero
    // and the final completion reports the idle transition.
    assert_eq!(idle_flags.last(), Some(&true));
    assert!(counter.is_idle());

    cmd_tx.send(UiCommand::Quit).unwrap();
    controller.await.unwrap().unwrap();
}

#[tokio::test]
async fn no_quit_means_tasks_run_to_completion() {
    // A declined close sends no command at all; dispatched work must finish
    // and report normally afterward.
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("keep-going.txt");
    fs::write(&input, b"still running after the user said no").unwrap();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let counter = Arc::new(ActiveTaskCounter::new());

    let controller = tokio::spawn(run_controller(
        StatusReporter::new(event_tx),
        cmd_rx,
        counter.clone(),
    ));

    cmd_tx
        .send(UiCommand::Dispatch(compress_task(
            &input,
            &tmp.path().join("keep-going.txt.lzma"),
        )))
        .unwrap();

    let message = loop {
        if let AppEvent::TaskFinished { message, .. } = next_event(&mut event_rx).await {
            break message;
        }
    };
    assert!(message.contains("successfully"), "{message}");
    assert!(counter.is_idle());

    cmd_tx.send(UiCommand::Quit).unwrap();
    controller.await.unwrap().unwrap();
}

#[test]
fn status_reporter_is_safe_from_any_context() {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let reporter = StatusReporter::new(event_tx);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let reporter = reporter.clone();
            std::thread::spawn(move || reporter.report(format!("message {i}")))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    drop(reporter);

    let mut received = 0;
    while let Ok(ev) = event_rx.try_recv() {
        assert!(matches!(ev, AppEvent::Status(_)));
        received += 1;
    }
    assert_eq!(received, 4);
}
