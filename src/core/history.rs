//! Bounded history of statistics snapshots for trend display and export.
//!
//! Every acquisition cycle appends one snapshot; beyond the configured
//! capacity the oldest is evicted. The history is sized independently of
//! the sample window: the window smooths short-term statistics, the history
//! keeps the long-term trend.

use crate::core::stats::StatsSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default history capacity in snapshots.
pub const DEFAULT_HISTORY_SIZE: usize = 1000;

/// Fixed-capacity FIFO buffer of successive statistics snapshots.
#[derive(Debug, Clone)]
pub struct StatsHistory {
    snapshots: VecDeque<StatsSnapshot>,
    capacity: usize,
}

/// The six stat fields as aligned columns, oldest first.
///
/// Same index = same acquisition cycle across all six sequences, which is
/// the layout plotting and export consumers want.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSeries {
    pub acc_mean: Vec<f64>,
    pub acc_std: Vec<f64>,
    pub gyro_mean: Vec<f64>,
    pub gyro_std: Vec<f64>,
    pub mag_mean: Vec<f64>,
    pub mag_std: Vec<f64>,
}

impl StatsSeries {
    /// Number of cycles covered (all six sequences share it).
    pub fn len(&self) -> usize {
        self.acc_mean.len()
    }

    /// Whether no cycles are covered.
    pub fn is_empty(&self) -> bool {
        self.acc_mean.is_empty()
    }
}

impl StatsHistory {
    /// Create an empty history holding at most `capacity` snapshots.
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a snapshot, evicting the oldest one if the history is full.
    pub fn push(&mut self, snapshot: StatsSnapshot) {
        if self.capacity == 0 {
            return;
        }
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Most recent snapshot, if any.
    pub fn latest(&self) -> Option<StatsSnapshot> {
        self.snapshots.back().copied()
    }

    /// The six stat fields as aligned columns, oldest first.
    pub fn series(&self) -> StatsSeries {
        let mut series = StatsSeries::default();
        for snapshot in &self.snapshots {
            series.acc_mean.push(snapshot.acc_mean);
            series.acc_std.push(snapshot.acc_std);
            series.gyro_mean.push(snapshot.gyro_mean);
            series.gyro_std.push(snapshot.gyro_std);
            series.mag_mean.push(snapshot.mag_mean);
            series.mag_std.push(snapshot.mag_std);
        }
        series
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the history holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum number of snapshots the history can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for StatsHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
