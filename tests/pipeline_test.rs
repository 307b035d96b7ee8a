//! Integration tests for the full acquisition pipeline

use margmon::acquisition::{Acquisition, StopReason};
use margmon::config::Config;
use margmon::core::{StatsHistory, StatsSnapshot};
use margmon::display::{NullSink, SnapshotSink};
use margmon::ledger::{Ledger, LEDGER_HEADER};
use margmon::transport::{ConnectionError, MockTransport, ScriptEvent};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use uuid::Uuid;

fn pipeline_config() -> Config {
    Config {
        window_size: 5,
        history_size: 100,
        poll_interval: Duration::from_millis(1),
        ..Config::default()
    }
}

fn temp_ledger_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("margmon-pipeline-{tag}-{}.txt", Uuid::new_v4()))
}

struct RecordingSink {
    published: Vec<StatsSnapshot>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            published: Vec::new(),
        }
    }
}

impl SnapshotSink for RecordingSink {
    fn publish(&mut self, snapshot: &StatsSnapshot, _history: &StatsHistory) {
        self.published.push(*snapshot);
    }
}

#[test]
fn test_two_records_fill_window_history_and_ledger() {
    let path = temp_ledger_path("two-records");
    let ledger = Ledger::create_new(&path).expect("Failed to create ledger");

    let transport = MockTransport::with_lines(["1 0 0 0 0 0 0 0 0", "0 3 4 0 0 0 0 0 0"]);
    let mut session = Acquisition::new(transport, &pipeline_config()).with_ledger(ledger);
    let cancel = AtomicBool::new(false);
    let mut sink = NullSink;

    let summary = session.run(&cancel, &mut sink).expect("Failed to open transport");

    // Both records land in the window in arrival order
    let window = session.window().snapshot();
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].accel(), [1.0, 0.0, 0.0]);
    assert_eq!(window[1].accel(), [0.0, 3.0, 4.0]);

    // One snapshot per record
    assert_eq!(session.history().len(), 2);
    let latest = session.history().latest().expect("Missing snapshot");
    // Accel magnitudes are 1 and 5
    assert_eq!(latest.acc_mean, 3.0);
    assert_eq!(latest.acc_std, 2.0);

    assert_eq!(summary.stats.lines_received, 2);
    assert_eq!(summary.stats.records_accepted, 2);
    assert_eq!(summary.stats.records_persisted, 2);
    assert_eq!(summary.stop, StopReason::ConnectionLost(ConnectionError::Closed));

    // Ledger holds the header once plus one row per record
    let content = std::fs::read_to_string(&path).expect("Failed to read ledger");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec![LEDGER_HEADER, "1; 0; 0; 0; 0; 0; 0; 0; 0", "0; 3; 4; 0; 0; 0; 0; 0; 0"]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_rolling_window_discards_oldest_sample() {
    let config = Config {
        window_size: 2,
        ..pipeline_config()
    };
    let transport = MockTransport::with_lines([
        "1 0 0 0 0 0 0 0 0",
        "2 0 0 0 0 0 0 0 0",
        "3 0 0 0 0 0 0 0 0",
    ]);
    let mut session = Acquisition::new(transport, &config);
    let cancel = AtomicBool::new(false);
    let mut sink = NullSink;

    session.run(&cancel, &mut sink).expect("Failed to open transport");

    // Window kept the last two samples; magnitudes 2 and 3
    assert_eq!(session.window().len(), 2);
    let latest = session.history().latest().expect("Missing snapshot");
    assert_eq!(latest.acc_mean, 2.5);
    assert_eq!(latest.acc_std, 0.5);

    // Every cycle still produced a snapshot
    assert_eq!(session.history().len(), 3);
}

#[test]
fn test_malformed_and_blank_lines_do_not_reach_the_window() {
    let transport = MockTransport::with_lines([
        "1 0 0 0 0 0 0 0 0",
        "A: 1.5, -2.0; B: 0.0",
        "",
        "0 1 0 0 0 0 0 0 0",
    ]);
    let mut session = Acquisition::new(transport, &pipeline_config());
    let cancel = AtomicBool::new(false);
    let mut sink = RecordingSink::new();

    let summary = session.run(&cancel, &mut sink).expect("Failed to open transport");

    assert_eq!(summary.stats.lines_received, 4);
    assert_eq!(summary.stats.records_accepted, 2);
    assert_eq!(summary.stats.parse_failures, 1);
    assert_eq!(session.window().len(), 2);
    assert_eq!(session.history().len(), 2);
    assert_eq!(sink.published.len(), 2);
}

#[test]
fn test_cancelled_before_start_reads_nothing() {
    let transport = MockTransport::with_lines(["1 2 3 4 5 6 7 8 9"]);
    let mut session = Acquisition::new(transport, &pipeline_config());
    let cancel = AtomicBool::new(true);
    let mut sink = NullSink;

    let summary = session.run(&cancel, &mut sink).expect("Failed to open transport");

    assert_eq!(summary.stop, StopReason::Cancelled);
    assert_eq!(summary.stats.lines_received, 0);
    assert!(session.window().is_empty());
    assert!(session.history().is_empty());
}

#[test]
fn test_open_failure_surfaces_without_summary() {
    let transport = MockTransport::failing("port is in use");
    let mut session = Acquisition::new(transport, &pipeline_config());
    let cancel = AtomicBool::new(false);
    let mut sink = NullSink;

    match session.run(&cancel, &mut sink) {
        Err(ConnectionError::OpenFailed { reason, .. }) => {
            assert!(reason.contains("port is in use"));
        }
        other => panic!("expected OpenFailed, got {other:?}"),
    }
}

#[test]
fn test_disconnect_mid_stream_preserves_cause_and_data() {
    let transport = MockTransport::with_script(vec![
        ScriptEvent::Line("0 3 4 0 0 0 0 0 0".to_string()),
        ScriptEvent::Disconnect,
    ]);
    let mut session = Acquisition::new(transport, &pipeline_config());
    let cancel = AtomicBool::new(false);
    let mut sink = NullSink;

    let summary = session.run(&cancel, &mut sink).expect("Failed to open transport");

    assert_eq!(summary.stop, StopReason::ConnectionLost(ConnectionError::Closed));
    assert_eq!(session.history().len(), 1);
    let latest = session.history().latest().expect("Missing snapshot");
    assert_eq!(latest.acc_mean, 5.0);
    assert_eq!(latest.acc_std, 0.0);
}

#[test]
fn test_decimal_comma_mode_parses_localized_feed() {
    let config = Config {
        decimal_comma: true,
        ..pipeline_config()
    };
    let transport = MockTransport::with_lines([
        "9,81; 0,12; 0,05; 0,01; 0,02; 0,00; 22,10; 5,30; -41,20",
    ]);
    let mut session = Acquisition::new(transport, &config);
    let cancel = AtomicBool::new(false);
    let mut sink = NullSink;

    let summary = session.run(&cancel, &mut sink).expect("Failed to open transport");

    assert_eq!(summary.stats.records_accepted, 1);
    assert_eq!(summary.stats.parse_failures, 0);
    let latest = session.history().latest().expect("Missing snapshot");
    assert!(latest.acc_mean > 9.8 && latest.acc_mean < 9.82);
}

#[test]
fn test_ledger_append_continues_existing_file() {
    let path = temp_ledger_path("append");

    // First session writes the header and one record
    {
        let ledger = Ledger::create_new(&path).expect("Failed to create ledger");
        let transport = MockTransport::with_lines(["1 0 0 0 0 0 0 0 0"]);
        let mut session = Acquisition::new(transport, &pipeline_config()).with_ledger(ledger);
        let cancel = AtomicBool::new(false);
        let mut sink = NullSink;
        session.run(&cancel, &mut sink).expect("Failed to open transport");
    }

    // Second session reopens the same file in append mode
    {
        let ledger = Ledger::append_to(&path).expect("Failed to reopen ledger");
        let transport = MockTransport::with_lines(["2 0 0 0 0 0 0 0 0"]);
        let mut session = Acquisition::new(transport, &pipeline_config()).with_ledger(ledger);
        let cancel = AtomicBool::new(false);
        let mut sink = NullSink;
        session.run(&cancel, &mut sink).expect("Failed to open transport");
    }

    let content = std::fs::read_to_string(&path).expect("Failed to read ledger");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            LEDGER_HEADER,
            "1; 0; 0; 0; 0; 0; 0; 0; 0",
            "2; 0; 0; 0; 0; 0; 0; 0; 0",
        ]
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_snapshots_reach_the_sink_each_cycle() {
    let transport = MockTransport::with_lines([
        "1 0 0 0 0 0 0 0 0",
        "2 0 0 0 0 0 0 0 0",
        "3 0 0 0 0 0 0 0 0",
    ]);
    let mut session = Acquisition::new(transport, &pipeline_config());
    let cancel = AtomicBool::new(false);
    let mut sink = RecordingSink::new();

    session.run(&cancel, &mut sink).expect("Failed to open transport");

    assert_eq!(sink.published.len(), 3);
    let last_published = sink.published.last().copied().expect("Missing snapshot");
    let latest = session.history().latest().expect("Missing snapshot");
    assert_eq!(last_published, latest);
}

#[test]
fn test_zero_window_size_produces_empty_statistics() {
    let config = Config {
        window_size: 0,
        ..pipeline_config()
    };
    let transport = MockTransport::with_lines(["1 2 3 4 5 6 7 8 9"]);
    let mut session = Acquisition::new(transport, &config);
    let cancel = AtomicBool::new(false);
    let mut sink = NullSink;

    let summary = session.run(&cancel, &mut sink).expect("Failed to open transport");

    assert_eq!(summary.stats.records_accepted, 1);
    assert!(session.window().is_empty());

    // A snapshot is still produced each cycle, with all statistics at zero
    assert_eq!(session.history().len(), 1);
    let latest = session.history().latest().expect("Missing snapshot");
    assert_eq!(latest, StatsSnapshot::default());
}
