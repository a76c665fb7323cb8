use lzpack::engine;
use lzpack::model::{
    suggest_compress_output, suggest_decompress_output, Task, TaskKind, TaskStatus,
};
use std::fs;
use std::path::Path;

fn run_roundtrip(data: &[u8]) {
    let tmp = tempfile::tempdir().unwrap();
    let original = tmp.path().join("payload.bin");
    fs::write(&original, data).unwrap();

    let compressed = suggest_compress_output(&original);
    let report = engine::run(Task {
        kind: TaskKind::Compress,
        input: original.clone(),
        output: compressed.clone(),
    });
    assert_eq!(report.status, TaskStatus::Succeeded, "{}", report.message);

    let restored = tmp.path().join("restored.bin");
    let report = engine::run(Task {
        kind: TaskKind::Decompress,
        input: compressed,
        output: restored.clone(),
    });
    assert_eq!(report.status, TaskStatus::Succeeded, "{}", report.message);

    assert_eq!(fs::read(&restored).unwrap(), data);
}

#[test]
fn roundtrip_empty_file() {
    run_roundtrip(b"");
}

#[test]
fn roundtrip_single_byte() {
    run_roundtrip(b"\x42");
}

#[test]
fn roundtrip_small_text() {
    run_roundtrip(b"hello lzpack, hello lzpack, hello lzpack");
}

#[test]
fn roundtrip_large_file() {
    // Past 10 MiB the copy loop has cycled its buffer many times over.
    let mut data = Vec::with_capacity(12 * 1024 * 1024);
    let mut x: u32 = 0x2545_f491;
    while data.len() < 12 * 1024 * 1024 {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(b"lzpack payload block ");
    }
    run_roundtrip(&data);
}

#[test]
fn corrupt_input_reports_codec_error() {
    let tmp = tempfile::tempdir().unwrap();
    let bogus = tmp.path().join("bogus.lzma");
    fs::write(&bogus, b"this is not an xz stream at all").unwrap();

    let report = engine::run(Task {
        kind: TaskKind::Decompress,
        input: bogus,
        output: tmp.path().join("out.bin"),
    });
    assert_eq!(report.status, TaskStatus::Failed);
    assert!(
        report.message.to_lowercase().contains("corrupt"),
        "{}",
        report.message
    );
}

#[test]
fn success_and_failure_messages_classify_for_display() {
    use lzpack::model::StatusLevel;

    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("note.txt");
    fs::write(&input, b"note").unwrap();

    let report = engine::run(Task {
        kind: TaskKind::Compress,
        input,
        output: tmp.path().join("note.txt.lzma"),
    });
    assert_eq!(StatusLevel::classify(&report.message), StatusLevel::Success);

    let report = engine::run(Task {
        kind: TaskKind::Decompress,
        input: tmp.path().join("gone.lzma"),
        output: tmp.path().join("gone"),
    });
    assert_eq!(StatusLevel::classify(&report.message), StatusLevel::Error);
}

#[test]
fn preconditions_reject_synchronously() {
    let err = engine::validate(&Task {
        kind: TaskKind::Compress,
        input: "".into(),
        output: "out.lzma".into(),
    })
    .unwrap_err();
    assert!(err.to_string().to_lowercase().contains("missing"));

    let err = engine::validate(&Task {
        kind: TaskKind::Compress,
        input: "/no/such/file.txt".into(),
        output: "out.lzma".into(),
    })
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn suggested_names_follow_the_derivation_rule() {
    assert_eq!(
        suggest_compress_output(Path::new("report.txt")),
        Path::new("report.txt.lzma")
    );
    assert_eq!(
        suggest_decompress_output(Path::new("archive.lzma")),
        Path::new("archive")
    );
    assert_eq!(
        suggest_decompress_output(Path::new("data.bin")),
        Path::new("data.bin.decompressed")
    );
}
