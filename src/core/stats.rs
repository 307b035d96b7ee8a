//! Magnitude statistics over a window of samples.
//!
//! Each sensor triple is reduced to its Euclidean magnitude, and the
//! magnitudes across the window reduce to a mean and a population standard
//! deviation per sensor. Everything is recomputed from the snapshot on every
//! call; nothing is patched incrementally.

use crate::core::parse::SampleVector;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Euclidean magnitude of one sensor triple.
pub fn magnitude(triple: [f64; 3]) -> f64 {
    (triple[0] * triple[0] + triple[1] * triple[1] + triple[2] * triple[2]).sqrt()
}

/// Per-sensor magnitude sequences, one entry per window sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagnitudeSet {
    pub accel: Vec<f64>,
    pub gyro: Vec<f64>,
    pub mag: Vec<f64>,
}

impl MagnitudeSet {
    /// Compute all three magnitude sequences from a window snapshot.
    pub fn from_samples(samples: &[SampleVector]) -> Self {
        Self {
            accel: samples.iter().map(|s| magnitude(s.accel())).collect(),
            gyro: samples.iter().map(|s| magnitude(s.gyro())).collect(),
            mag: samples.iter().map(|s| magnitude(s.mag())).collect(),
        }
    }

    /// Number of window samples the set was derived from.
    pub fn len(&self) -> usize {
        self.accel.len()
    }

    /// Whether the set was derived from an empty snapshot.
    pub fn is_empty(&self) -> bool {
        self.accel.is_empty()
    }
}

/// Mean and population standard deviation of each sensor's magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub acc_mean: f64,
    pub acc_std: f64,
    pub gyro_mean: f64,
    pub gyro_std: f64,
    pub mag_mean: f64,
    pub mag_std: f64,
}

/// Reduce a window snapshot to its magnitude statistics.
///
/// An empty snapshot yields the all-zero snapshot ("no data yet"), which is
/// a defined result rather than an error.
pub fn compute(samples: &[SampleVector]) -> StatsSnapshot {
    let magnitudes = MagnitudeSet::from_samples(samples);
    let (acc_mean, acc_std) = mean_and_population_std(&magnitudes.accel);
    let (gyro_mean, gyro_std) = mean_and_population_std(&magnitudes.gyro);
    let (mag_mean, mag_std) = mean_and_population_std(&magnitudes.mag);

    StatsSnapshot {
        acc_mean,
        acc_std,
        gyro_mean,
        gyro_std,
        mag_mean,
        mag_std,
    }
}

/// Mean and population standard deviation (divisor N) of a value sequence.
///
/// Guarded for no data, where statrs would return NaN.
fn mean_and_population_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    (values.mean(), values.population_std_dev())
}
