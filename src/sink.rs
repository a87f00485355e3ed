//! Publication interface.

use crate::metric::MetricName;
use std::collections::BTreeMap;

/// Receiver of derived scalars.
///
/// Called once per non-empty statistic per recomputation pass. Implementations
/// own their consistency story towards readers; the engine never reads back.
pub trait MetricsSink {
    fn publish(&mut self, metric: &MetricName, value: f64);
}

impl<S: MetricsSink + ?Sized> MetricsSink for &mut S {
    fn publish(&mut self, metric: &MetricName, value: f64) {
        (**self).publish(metric, value);
    }
}

impl<S: MetricsSink + ?Sized> MetricsSink for Box<S> {
    fn publish(&mut self, metric: &MetricName, value: f64) {
        (**self).publish(metric, value);
    }
}

/// Sink that keeps the latest value per metric name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    values: BTreeMap<String, f64>,
    publishes: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value published under `name` (e.g. `A:AvgFreq`).
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Total number of publish calls received.
    pub fn publishes(&self) -> u64 {
        self.publishes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take the accumulated values, leaving the sink empty.
    pub fn drain(&mut self) -> BTreeMap<String, f64> {
        std::mem::take(&mut self.values)
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.publishes = 0;
    }
}

impl MetricsSink for MemorySink {
    fn publish(&mut self, metric: &MetricName, value: f64) {
        self.publishes += 1;
        self.values.insert(metric.to_string(), value);
    }
}
