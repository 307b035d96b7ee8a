//! Core telemetry pipeline: parsing, windowing, statistics, history.
//!
//! This module contains:
//! - Line parsing into validated 9-axis sample vectors
//! - The bounded sliding window of recent samples
//! - Magnitude statistics computed over window snapshots
//! - The bounded history of statistics snapshots

pub mod history;
pub mod parse;
pub mod stats;
pub mod window;

// Re-export commonly used types
pub use history::{StatsHistory, StatsSeries, DEFAULT_HISTORY_SIZE};
pub use parse::{LineParser, ParseError, SampleVector, SAMPLE_WIDTH};
pub use stats::{compute, magnitude, MagnitudeSet, StatsSnapshot};
pub use window::{SampleWindow, DEFAULT_WINDOW_SIZE};
