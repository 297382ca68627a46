use std::collections::VecDeque;
use std::time::Duration;

/// Bounded ring of recent durations.
///
/// Once `capacity` samples are stored, pushing evicts the oldest one.
#[derive(Debug, Clone)]
pub struct TimingRing {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl TimingRing {
    /// Creates an empty ring. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mean of the stored samples, `None` when empty.
    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<Duration> {
        self.samples.back().copied()
    }

    /// Samples from oldest to newest.
    pub fn to_vec(&self) -> Vec<Duration> {
        self.samples.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
