//! Acquisition session: the loop that turns transport lines into statistics.
//!
//! One `Acquisition` owns the whole pipeline for a session: transport,
//! parser, rolling window, history, and optional ledger. The loop is
//! single-threaded; concurrency lives inside the transport, which hands
//! over complete lines through its bounded `read_line` wait.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::core::{compute, LineParser, SampleWindow, StatsHistory};
use crate::display::SnapshotSink;
use crate::ledger::Ledger;
use crate::transport::{ConnectionError, Transport};

/// Link state as seen by the acquisition loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// No open connection.
    Disconnected,
    /// Connection open, no data seen yet.
    Connected,
    /// Data has flowed at least once this session.
    Reading,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "disconnected"),
            LinkState::Connected => write!(f, "connected"),
            LinkState::Reading => write!(f, "reading"),
        }
    }
}

/// Counters tracked over one acquisition session.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SessionStats {
    /// Lines handed over by the transport, including blank and malformed ones
    pub lines_received: u64,
    /// Lines that parsed into a full sample
    pub records_accepted: u64,
    /// Lines rejected by the parser
    pub parse_failures: u64,
    /// Statistics snapshots pushed into the history
    pub snapshots_produced: u64,
    /// Records written to the ledger
    pub records_persisted: u64,
    /// Ledger writes that failed
    pub persist_failures: u64,
}

/// Why a session's loop stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The cancellation flag was raised.
    Cancelled,
    /// The transport reported a terminal error mid-session.
    ConnectionLost(ConnectionError),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::ConnectionLost(err) => write!(f, "connection lost: {err}"),
        }
    }
}

/// Record of one finished acquisition session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub host: String,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stats: SessionStats,
    pub stop: StopReason,
}

impl SessionSummary {
    /// Multiline summary for display at session end.
    pub fn render(&self) -> String {
        let duration_secs = (self.finished_at - self.started_at).num_seconds();
        format!(
            "Session Statistics:\n\
             - Session: {}\n\
             - Source: {}\n\
             - Lines received: {}\n\
             - Records accepted: {}\n\
             - Parse failures: {}\n\
             - Records persisted: {}\n\
             - Persist failures: {}\n\
             - Snapshots produced: {}\n\
             - Duration: {} seconds\n\
             - Stopped: {}",
            self.session_id,
            self.source,
            self.stats.lines_received,
            self.stats.records_accepted,
            self.stats.parse_failures,
            self.stats.records_persisted,
            self.stats.persist_failures,
            self.stats.snapshots_produced,
            duration_secs,
            self.stop,
        )
    }
}

/// One acquisition session over a transport.
pub struct Acquisition<T: Transport> {
    transport: T,
    parser: LineParser,
    window: SampleWindow,
    history: StatsHistory,
    ledger: Option<Ledger>,
    poll_interval: Duration,
    state: LinkState,
    stats: SessionStats,
    session_id: Uuid,
    started_at: DateTime<Utc>,
}

impl<T: Transport> Acquisition<T> {
    /// Build a session over `transport` with sizes and parsing taken from `config`.
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            transport,
            parser: LineParser::new(config.decimal_comma),
            window: SampleWindow::new(config.window_size),
            history: StatsHistory::new(config.history_size),
            ledger: None,
            poll_interval: config.poll_interval,
            state: LinkState::Disconnected,
            stats: SessionStats::default(),
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    /// Attach a ledger; every accepted record is appended to it.
    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn history(&self) -> &StatsHistory {
        &self.history
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        self.ledger.as_ref()
    }

    /// Open the transport. A failed open is reported, not retried.
    pub fn connect(&mut self) -> Result<(), ConnectionError> {
        self.transport.open()?;
        self.state = LinkState::Connected;
        info!("connected to {}", self.transport.describe());
        Ok(())
    }

    /// Run the session until cancelled or the connection is lost.
    ///
    /// Connects first if `connect` was not called. Returns `Err` only when
    /// opening the transport fails; anything that stops an already-running
    /// session is reported through the summary's stop reason. The transport
    /// is closed on every exit from the loop.
    pub fn run(
        &mut self,
        cancel: &AtomicBool,
        sink: &mut dyn SnapshotSink,
    ) -> Result<SessionSummary, ConnectionError> {
        if self.state == LinkState::Disconnected {
            self.connect()?;
        }
        self.started_at = Utc::now();

        let stop = loop {
            // Checked first so a raised flag wins over pending data.
            if cancel.load(Ordering::SeqCst) {
                break StopReason::Cancelled;
            }

            match self.transport.read_line(self.poll_interval) {
                Ok(Some(line)) => {
                    if self.state != LinkState::Reading {
                        info!("receiving data from {}", self.transport.describe());
                        self.state = LinkState::Reading;
                    }
                    self.process_line(&line, sink);
                }
                Ok(None) => {
                    // Nothing within the poll interval; loop back to the flag.
                }
                Err(err) => {
                    warn!("transport error on {}: {err}", self.transport.describe());
                    break StopReason::ConnectionLost(err);
                }
            }
        };

        self.transport.close();
        self.state = LinkState::Disconnected;
        info!("session {} stopped: {stop}", self.session_id);

        Ok(self.finish(stop))
    }

    /// Run one line through parse, persist, window, stats, and display.
    ///
    /// A malformed line is counted and logged; the window, history, and
    /// ledger stay untouched by it.
    fn process_line(&mut self, raw: &str, sink: &mut dyn SnapshotSink) {
        self.stats.lines_received += 1;

        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        let sample = match self.parser.parse(line) {
            Ok(sample) => sample,
            Err(err) => {
                self.stats.parse_failures += 1;
                warn!("discarding record: {err}");
                debug!("offending line: {line:?}");
                return;
            }
        };
        self.stats.records_accepted += 1;

        if let Some(ledger) = self.ledger.as_mut() {
            match ledger.append(&sample) {
                Ok(()) => self.stats.records_persisted += 1,
                Err(err) => {
                    self.stats.persist_failures += 1;
                    warn!("ledger append failed: {err}");
                }
            }
        }

        self.window.push(sample);
        let snapshot = compute(&self.window.snapshot());
        self.history.push(snapshot);
        self.stats.snapshots_produced += 1;

        sink.publish(&snapshot, &self.history);
    }

    fn finish(&self, stop: StopReason) -> SessionSummary {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        SessionSummary {
            session_id: self.session_id,
            host,
            source: self.transport.describe(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            stats: self.stats,
            stop,
        }
    }
}
