//! Bounded per-source arrival history.

use crate::config::DeltaPolicy;
use std::collections::VecDeque;

/// Outcome of recording one arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arrival {
    /// First timestamp in the window; no frequency yet.
    First,
    /// Appended, with the derived instantaneous frequency.
    Recorded { frequency: f64 },
    /// Non-positive delta under [`DeltaPolicy::DropSample`]; window unchanged.
    Dropped { delta: f64 },
}

/// Sliding window of arrival timestamps and the frequencies derived from
/// consecutive pairs of them.
///
/// `frequencies[k]` is always derived from `timestamps[k]` and
/// `timestamps[k + 1]`: both queues are trimmed from the front by count, so
/// once full the window holds `capacity` timestamps and `capacity - 1`
/// frequencies.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    timestamps: VecDeque<f64>,
    frequencies: VecDeque<f64>,
    capacity: usize,
    delta_policy: DeltaPolicy,
}

impl SampleWindow {
    /// Create an empty window. `capacity` is clamped to at least 2.
    pub fn new(capacity: usize, delta_policy: DeltaPolicy) -> Self {
        let capacity = capacity.max(2);
        Self {
            timestamps: VecDeque::with_capacity(capacity + 1),
            frequencies: VecDeque::with_capacity(capacity),
            capacity,
            delta_policy,
        }
    }

    /// Record an arrival at `timestamp` (seconds).
    ///
    /// A delta `dt > 0` yields frequency `1 / dt`. A delta `dt <= 0`
    /// (duplicate or out-of-order timestamp) yields frequency 0, or drops
    /// the arrival under [`DeltaPolicy::DropSample`].
    pub fn record_arrival(&mut self, timestamp: f64) -> Arrival {
        let arrival = match self.timestamps.back() {
            None => Arrival::First,
            Some(&previous) => {
                let dt = timestamp - previous;
                if dt > 0.0 {
                    Arrival::Recorded {
                        frequency: 1.0 / dt,
                    }
                } else if self.delta_policy == DeltaPolicy::DropSample {
                    return Arrival::Dropped { delta: dt };
                } else {
                    Arrival::Recorded { frequency: 0.0 }
                }
            }
        };

        self.timestamps.push_back(timestamp);
        if let Arrival::Recorded { frequency } = arrival {
            self.frequencies.push_back(frequency);
        }

        self.prune();
        arrival
    }

    fn prune(&mut self) {
        while self.timestamps.len() > self.capacity {
            self.timestamps.pop_front();
        }
        while self.frequencies.len() > self.capacity - 1 {
            self.frequencies.pop_front();
        }
    }

    /// Arrival timestamps, oldest first.
    pub fn timestamps(&self) -> &VecDeque<f64> {
        &self.timestamps
    }

    /// Instantaneous frequencies, oldest first.
    pub fn frequencies(&self) -> &VecDeque<f64> {
        &self.frequencies
    }

    /// Most recent arrival timestamp.
    pub fn last_timestamp(&self) -> Option<f64> {
        self.timestamps.back().copied()
    }

    /// Most recent instantaneous frequency.
    pub fn last_frequency(&self) -> Option<f64> {
        self.frequencies.back().copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Clear all data.
    pub fn clear(&mut self) {
        self.timestamps.clear();
        self.frequencies.clear();
    }
}
