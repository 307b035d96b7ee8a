//! Display collaborator: consumes one statistics snapshot per cycle.
//!
//! The acquisition loop publishes a full snapshot each cycle through the
//! `SnapshotSink` trait. The console renderer enforces its own minimum
//! period between redraws, so rendering cadence stays independent of
//! acquisition cadence; intermediate frames are simply dropped.

use crate::core::history::StatsHistory;
use crate::core::stats::StatsSnapshot;
use chrono::Local;
use std::time::{Duration, Instant};

/// Default minimum period between console redraws.
pub const DEFAULT_DISPLAY_PERIOD: Duration = Duration::from_millis(1000);

/// Consumer of per-cycle statistics snapshots.
pub trait SnapshotSink {
    /// Called once per acquisition cycle with the freshly computed snapshot
    /// and read access to the history behind it.
    fn publish(&mut self, snapshot: &StatsSnapshot, history: &StatsHistory);
}

/// Renders the latest snapshot as a single console line.
pub struct ConsoleDisplay {
    min_period: Duration,
    last_render: Option<Instant>,
}

impl ConsoleDisplay {
    /// Create a renderer that redraws at most once per `min_period`.
    pub fn new(min_period: Duration) -> Self {
        Self {
            min_period,
            last_render: None,
        }
    }

    fn due(&self) -> bool {
        match self.last_render {
            Some(at) => at.elapsed() >= self.min_period,
            None => true,
        }
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_PERIOD)
    }
}

impl SnapshotSink for ConsoleDisplay {
    fn publish(&mut self, snapshot: &StatsSnapshot, history: &StatsHistory) {
        if !self.due() {
            return;
        }
        self.last_render = Some(Instant::now());
        println!(
            "[{}] {}",
            Local::now().format("%H:%M:%S"),
            format_snapshot_line(snapshot, history)
        );
    }
}

/// One-line rendering of a snapshot: mean ± std per sensor, plus how much
/// of the trend history is filled.
pub fn format_snapshot_line(snapshot: &StatsSnapshot, history: &StatsHistory) -> String {
    format!(
        "acc {:.3}±{:.3} | gyro {:.3}±{:.3} | mag {:.3}±{:.3} | history {}/{}",
        snapshot.acc_mean,
        snapshot.acc_std,
        snapshot.gyro_mean,
        snapshot.gyro_std,
        snapshot.mag_mean,
        snapshot.mag_std,
        history.len(),
        history.capacity()
    )
}

/// Sink that discards every snapshot, for quiet runs.
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn publish(&mut self, _snapshot: &StatsSnapshot, _history: &StatsHistory) {}
}
