use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log_reformatter::{
    LineParser, LogTail, ReformatError, Reformatter, ServiceTags, StructuredLogRecord,
};
use oncall_telemetry::{LineOutcome, ReformatterMetrics, Registry};
use tokio::time::timeout;

const POLL: Duration = Duration::from_millis(5);
const WAIT: Duration = Duration::from_secs(5);

fn temp_log(initial: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("log-reformatter-{}.log", uuid::Uuid::new_v4()));
    std::fs::write(&path, initial).unwrap();
    path
}

fn append(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
}

#[tokio::test]
async fn existing_content_is_skipped() {
    let path = temp_log("2025-01-15 08:30:45,123 - oncall - INFO - before start\n");
    let mut tail = LogTail::open(&path, POLL).await.unwrap();

    append(&path, b"after start\n");

    let line = timeout(WAIT, tail.next_line()).await.unwrap().unwrap();
    assert_eq!(line, "after start");
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn partial_lines_are_reassembled() {
    let path = temp_log("");
    let mut tail = LogTail::open(&path, POLL).await.unwrap();

    append(&path, b"2025-01-15 08:30:45,123 - onc");
    let writer = {
        let path = path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            append(&path, b"all - INFO - done\r\nnext\n");
        })
    };

    let first = timeout(WAIT, tail.next_line()).await.unwrap().unwrap();
    let second = timeout(WAIT, tail.next_line()).await.unwrap().unwrap();
    writer.await.unwrap();

    assert_eq!(first, "2025-01-15 08:30:45,123 - oncall - INFO - done");
    assert_eq!(second, "next");
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn invalid_utf8_is_replaced() {
    let path = temp_log("");
    let mut tail = LogTail::open(&path, POLL).await.unwrap();

    append(&path, b"bad \xff byte\n");

    let line = timeout(WAIT, tail.next_line()).await.unwrap().unwrap();
    assert_eq!(line, "bad \u{fffd} byte");
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn missing_file_is_reported() {
    let path = std::env::temp_dir().join(format!("missing-{}.log", uuid::Uuid::new_v4()));

    let err = LogTail::open(&path, POLL).await.unwrap_err();

    assert!(matches!(err, ReformatError::MissingFile { path: ref missing } if *missing == path));
    assert_eq!(err.to_string(), format!("Log file not found: {}", path.display()));
}

#[tokio::test]
async fn reformatter_writes_one_json_line_per_input_line() {
    let path = temp_log("");
    let tail = LogTail::open(&path, POLL).await.unwrap();
    let parser = LineParser::new(ServiceTags::default()).unwrap();
    let metrics = ReformatterMetrics::register(&Registry::new()).unwrap();
    let mut reformatter = Reformatter::new(tail, parser, metrics.clone());

    append(
        &path,
        b"2025-01-15 08:30:45,123 - oncall - ERROR - create failed\nplain text\n2025-13-40 08:30:45,123 - oncall - INFO - bad date\n",
    );

    let mut out = Vec::new();
    for _ in 0..3 {
        timeout(WAIT, reformatter.step(&mut out)).await.unwrap().unwrap();
    }

    let text = String::from_utf8(out).unwrap();
    let records: Vec<StructuredLogRecord> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].level, "error");
    assert_eq!(records[0].logger.as_deref(), Some("oncall"));
    assert_eq!(records[0].timestamp, "2025-01-15T08:30:45.123000Z");
    assert_eq!(records[1].level, "info");
    assert_eq!(records[1].message, "plain text");
    assert_eq!(records[2].level, "error");
    assert!(records[2].message.contains("Original line: 2025-13-40"));
    assert!(records.iter().all(|record| record.tags == ServiceTags::default()));

    assert_eq!(metrics.lines(LineOutcome::Structured), 1);
    assert_eq!(metrics.lines(LineOutcome::Passthrough), 1);
    assert_eq!(metrics.lines(LineOutcome::Error), 1);
    std::fs::remove_file(&path).ok();
}
