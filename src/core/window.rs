//! Bounded sliding window over recent sample vectors.
//!
//! The acquisition loop pushes each accepted sample here; once the window
//! is full the oldest sample is evicted. Statistics are always derived from
//! a snapshot of the current contents, never from the live buffer.

use crate::core::parse::SampleVector;
use std::collections::VecDeque;

/// Default window capacity in samples.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Fixed-capacity FIFO buffer of the most recent samples.
///
/// Capacity is set at construction and never changes. A capacity of zero is
/// valid; such a window stays empty and every snapshot is empty.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<SampleVector>,
    capacity: usize,
}

impl SampleWindow {
    /// Create an empty window holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one if the window is full.
    pub fn push(&mut self, sample: SampleVector) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> Vec<SampleVector> {
        self.samples.iter().copied().collect()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples the window can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}
