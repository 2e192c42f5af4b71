use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::batch::Batch;
use crate::config::ReplayConfig;
use crate::console::{AsyncConsole, ConsoleWriter};
use crate::pipeline::{IngestionError, Orchestrator, Summary};
use crate::record::{ParseError, ReplayRecord};
use crate::sink::{EventSink, SendError};

// Minimal record for driving the pipeline: the line is the value, and a
// literal "malformed" line fails to parse.
#[derive(Debug, Clone, Serialize)]
struct PlainRecord {
    value: String,
}

fn parse_plain(line: &str) -> Result<String, ParseError> {
    if line == "malformed" {
        return Err(ParseError::EmptyLine);
    }
    Ok(line.to_string())
}

impl ReplayRecord for PlainRecord {
    const NAME: &'static str = "PlainRecord";

    fn parse(line: &str) -> Result<Self, ParseError> {
        Ok(PlainRecord {
            value: parse_plain(line)?,
        })
    }

    fn partition_key(&self) -> String {
        self.value.clone()
    }
}

// Second record type so orchestrator tests can tell runs apart by name.
#[derive(Debug, Clone, Serialize)]
struct AltRecord {
    value: String,
}

impl ReplayRecord for AltRecord {
    const NAME: &'static str = "AltRecord";

    fn parse(line: &str) -> Result<Self, ParseError> {
        Ok(AltRecord {
            value: parse_plain(line)?,
        })
    }

    fn partition_key(&self) -> String {
        self.value.clone()
    }
}

// Sink that stores every batch it receives.
#[derive(Default)]
struct CollectingSink {
    batches: Mutex<Vec<Batch>>,
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn send(&self, batch: Batch) -> Result<(), SendError> {
        self.batches.lock().unwrap().push(batch);
        Ok(())
    }
}

// Sink that fails on the nth send.
struct FailingSink {
    fail_at: usize,
    sent: AtomicUsize,
}

#[async_trait]
impl EventSink for FailingSink {
    async fn send(&self, _batch: Batch) -> Result<(), SendError> {
        let index = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        if index == self.fail_at {
            return Err(SendError::new("connection reset"));
        }
        Ok(())
    }
}

// Sink that triggers the cancellation token after a number of sends.
struct CancellingSink {
    cancel: CancellationToken,
    cancel_after: usize,
    sent: AtomicUsize,
}

#[async_trait]
impl EventSink for CancellingSink {
    async fn send(&self, _batch: Batch) -> Result<(), SendError> {
        let sent = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        if sent == self.cancel_after {
            self.cancel.cancel();
        }
        Ok(())
    }
}

fn test_config(batch_capacity: usize) -> ReplayConfig {
    ReplayConfig {
        batch_capacity,
        min_delay_ms: 0,
        max_delay_ms: 0,
        progress_interval: 10,
        run_for: None,
    }
}

fn write_source(dir: &TempDir, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.path().join(name);
    let mut contents = String::from("header\n");
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    std::fs::write(&path, contents).unwrap();
    path
}

fn numbered_lines(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("line-{i:02}")).collect()
}

fn quiet_console() -> (AsyncConsole, ConsoleWriter) {
    let console = AsyncConsole::with_writer(CancellationToken::new(), |_| {});
    let writer = console.writer();
    (console, writer)
}

fn capturing_console() -> (AsyncConsole, ConsoleWriter, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let console = AsyncConsole::with_writer(CancellationToken::new(), move |line| {
        sink.lock().unwrap().push(line)
    });
    let writer = console.writer();
    (console, writer, lines)
}

#[tokio::test]
async fn test_replays_all_lines_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let lines = numbered_lines(25);
    let path = write_source(&dir, "trip_data_1.csv", &lines);

    let sink = CollectingSink::default();
    let (_console, writer) = quiet_console();
    let cancel = CancellationToken::new();
    // {"value":"line-XX"} is 19 bytes; three per 60-byte batch.
    let config = test_config(60);

    let summary = run_source::<PlainRecord, _>(&path, &sink, 1, &writer, &cancel, &config)
        .await
        .unwrap();

    assert_eq!(
        summary,
        Summary {
            lines_read: 25,
            batches_sent: 9,
            cancelled: false
        }
    );

    let batches = sink.batches.lock().unwrap();
    let mut replayed = Vec::new();
    for batch in batches.iter() {
        assert!(batch.size() <= 60);
        for event in batch.events() {
            let value: serde_json::Value = serde_json::from_slice(event.payload()).unwrap();
            replayed.push(value["value"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(replayed, lines);
}

#[tokio::test]
async fn test_empty_file_produces_no_batches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trip_data_1.csv");
    std::fs::write(&path, "").unwrap();

    let sink = CollectingSink::default();
    let (_console, writer) = quiet_console();
    let summary = run_source::<PlainRecord, _>(
        &path,
        &sink,
        1,
        &writer,
        &CancellationToken::new(),
        &test_config(60),
    )
    .await
    .unwrap();

    assert_eq!(summary, Summary::default());
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_header_only_file_produces_no_batches() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "trip_data_1.csv", &[]);

    let sink = CollectingSink::default();
    let (_console, writer) = quiet_console();
    let summary = run_source::<PlainRecord, _>(
        &path,
        &sink,
        1,
        &writer,
        &CancellationToken::new(),
        &test_config(60),
    )
    .await
    .unwrap();

    assert_eq!(summary.lines_read, 0);
    assert_eq!(summary.batches_sent, 0);
}

#[tokio::test]
async fn test_malformed_line_aborts_with_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines = numbered_lines(5);
    lines[2] = "malformed".to_string();
    let path = write_source(&dir, "trip_data_1.csv", &lines);

    let sink = CollectingSink::default();
    let (_console, writer) = quiet_console();
    let err = run_source::<PlainRecord, _>(
        &path,
        &sink,
        1,
        &writer,
        &CancellationToken::new(),
        &test_config(60),
    )
    .await
    .unwrap_err();

    // data line 3 sits on physical line 4, after the header
    match err {
        IngestionError::InvalidRecord {
            source_name,
            line_number,
            ..
        } => {
            assert_eq!(source_name, "PlainRecord");
            assert_eq!(line_number, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_oversized_record_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "trip_data_1.csv", &["x".repeat(100)]);

    let sink = CollectingSink::default();
    let (_console, writer) = quiet_console();
    let err = run_source::<PlainRecord, _>(
        &path,
        &sink,
        1,
        &writer,
        &CancellationToken::new(),
        &test_config(60),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, IngestionError::EventTooLarge { .. }));
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_progress_messages_every_tenth_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "trip_data_1.csv", &numbered_lines(25));

    let sink = CollectingSink::default();
    let (console, writer, messages) = capturing_console();
    // capacity 30 holds exactly one 19-byte event per batch
    let config = test_config(30);

    let summary =
        run_source::<PlainRecord, _>(&path, &sink, 1, &writer, &CancellationToken::new(), &config)
            .await
            .unwrap();
    drop(writer);
    console.done().await;

    assert_eq!(summary.batches_sent, 25);
    let messages = messages.lock().unwrap();
    assert_eq!(
        *messages,
        vec![
            "PlainRecord lines consumed: 11".to_string(),
            "Created 10 PlainRecord batches".to_string(),
            "PlainRecord lines consumed: 21".to_string(),
            "Created 20 PlainRecord batches".to_string(),
            "Created 25 total PlainRecord batches".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_send_failure_aborts_with_batch_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "trip_data_1.csv", &numbered_lines(10));

    let sink = FailingSink {
        fail_at: 2,
        sent: AtomicUsize::new(0),
    };
    let (_console, writer) = quiet_console();
    let err = run_source::<PlainRecord, _>(
        &path,
        &sink,
        1,
        &writer,
        &CancellationToken::new(),
        &test_config(30),
    )
    .await
    .unwrap_err();

    match err {
        IngestionError::SendFailed { batch_index, .. } => assert_eq!(batch_index, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_cancellation_stops_after_current_send() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "trip_data_1.csv", &numbered_lines(50));

    let cancel = CancellationToken::new();
    let sink = CancellingSink {
        cancel: cancel.clone(),
        cancel_after: 3,
        sent: AtomicUsize::new(0),
    };
    let (_console, writer) = quiet_console();

    let summary = run_source::<PlainRecord, _>(&path, &sink, 1, &writer, &cancel, &test_config(30))
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.batches_sent, 3);
    assert_eq!(sink.sent.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_orchestrator_runs_multiple_replays_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let ride_1 = write_source(&dir, "trip_data_1.csv", &numbered_lines(5));
    let ride_2 = write_source(&dir, "trip_data_2.csv", &numbered_lines(5));
    let fare_1 = write_source(&dir, "trip_fare_1.csv", &numbered_lines(4));

    let mut orchestrator = Orchestrator::new(Arc::new(test_config(60)));
    orchestrator.add_replay::<PlainRecord>(
        vec![ride_1, ride_2],
        Arc::new(CollectingSink::default()),
        100,
    );
    orchestrator.add_replay::<AltRecord>(vec![fare_1], Arc::new(CollectingSink::default()), 200);

    let outcomes = orchestrator.run_all(&CancellationToken::new()).await;
    assert_eq!(outcomes.len(), 2);

    let plain = outcomes.iter().find(|o| o.name == "PlainRecord").unwrap();
    let summary = plain.result.as_ref().unwrap();
    assert_eq!(summary.lines_read, 10);
    assert!(!summary.cancelled);

    let alt = outcomes.iter().find(|o| o.name == "AltRecord").unwrap();
    assert_eq!(alt.result.as_ref().unwrap().lines_read, 4);
}

#[tokio::test]
async fn test_one_failed_run_does_not_cancel_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_source(&dir, "trip_data_1.csv", &["malformed".to_string()]);
    let good = write_source(&dir, "trip_fare_1.csv", &numbered_lines(6));

    let mut orchestrator = Orchestrator::new(Arc::new(test_config(60)));
    orchestrator.add_replay::<PlainRecord>(vec![bad], Arc::new(CollectingSink::default()), 100);
    orchestrator.add_replay::<AltRecord>(vec![good], Arc::new(CollectingSink::default()), 200);

    let outcomes = orchestrator.run_all(&CancellationToken::new()).await;

    let failed = outcomes.iter().find(|o| o.name == "PlainRecord").unwrap();
    assert!(failed.is_failure());

    let survivor = outcomes.iter().find(|o| o.name == "AltRecord").unwrap();
    assert_eq!(survivor.result.as_ref().unwrap().lines_read, 6);
}

#[tokio::test]
async fn test_deadline_cancels_all_replays() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "trip_data_1.csv", &numbered_lines(500));

    let config = ReplayConfig {
        batch_capacity: 30,
        min_delay_ms: 10,
        max_delay_ms: 10,
        progress_interval: 10,
        run_for: Some(std::time::Duration::from_millis(100)),
    };
    let mut orchestrator = Orchestrator::new(Arc::new(config));
    orchestrator.add_replay::<PlainRecord>(vec![path], Arc::new(CollectingSink::default()), 100);

    let outcomes = orchestrator.run_all(&CancellationToken::new()).await;
    let summary = outcomes[0].result.as_ref().unwrap();
    assert!(summary.cancelled);
    assert!(summary.batches_sent < 500);
}
