// Syncprof Exporter - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for sync profiles.
//!
//! Engine outputs map onto three gauge families:
//!
//! | Engine name | Prometheus series |
//! |-------------|-------------------|
//! | `A:AvgFreq` | `syncprof_source_frequency_hz{source="A",stat="avg"}` |
//! | `A:Timestamp` | `syncprof_source_last_timestamp_seconds{source="A"}` |
//! | `A_vs_B:StdDiff` | `syncprof_pair_offset_seconds{pair="A_vs_B",stat="std"}` |

use lazy_static::lazy_static;
use prometheus::{
    register_gauge, register_gauge_vec, register_int_counter, Encoder, Gauge, GaugeVec,
    IntCounter, TextEncoder,
};
use syncprof::{MetricName, MetricTarget, MetricsSink, Stat};

lazy_static! {
    // ============================================================
    // Engine outputs
    // ============================================================

    /// Per-source update frequency statistics.
    pub static ref SOURCE_FREQUENCY_HZ: GaugeVec = register_gauge_vec!(
        "syncprof_source_frequency_hz",
        "Update frequency statistics per source in Hz",
        &["source", "stat"]
    ).unwrap();

    /// Most recent timestamp reported by each source.
    pub static ref SOURCE_LAST_TIMESTAMP: GaugeVec = register_gauge_vec!(
        "syncprof_source_last_timestamp_seconds",
        "Most recent timestamp reported by the source",
        &["source"]
    ).unwrap();

    /// Per-pair timestamp offset statistics.
    pub static ref PAIR_OFFSET_SECONDS: GaugeVec = register_gauge_vec!(
        "syncprof_pair_offset_seconds",
        "Timestamp offset statistics per source pair in seconds",
        &["pair", "stat"]
    ).unwrap();

    // ============================================================
    // Exporter Metrics
    // ============================================================

    /// Events applied to the engine.
    pub static ref EVENTS_TOTAL: IntCounter = register_int_counter!(
        "syncprof_events_total",
        "Events recorded by the engine"
    ).unwrap();

    /// Events the engine refused (unknown source, engine not running).
    pub static ref EVENTS_REJECTED_TOTAL: IntCounter = register_int_counter!(
        "syncprof_events_rejected_total",
        "Events rejected by the engine"
    ).unwrap();

    /// Number of configured sources.
    pub static ref SOURCES_CONFIGURED: Gauge = register_gauge!(
        "syncprof_sources_configured",
        "Number of configured sources"
    ).unwrap();
}

/// Sink that writes engine outputs into the Prometheus gauges.
///
/// It also keeps every update of the current pass so the worker can copy
/// them into the table served at `/values`.
#[derive(Debug, Default)]
pub struct PrometheusSink {
    updates: Vec<(String, f64)>,
}

impl PrometheusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the updates collected since the last call.
    pub fn take_updates(&mut self) -> Vec<(String, f64)> {
        std::mem::take(&mut self.updates)
    }
}

impl MetricsSink for PrometheusSink {
    fn publish(&mut self, metric: &MetricName, value: f64) {
        match metric.target() {
            MetricTarget::Source { source } if metric.stat() == Stat::Timestamp => {
                SOURCE_LAST_TIMESTAMP
                    .with_label_values(&[source.as_str()])
                    .set(value);
            }
            MetricTarget::Source { source } => {
                SOURCE_FREQUENCY_HZ
                    .with_label_values(&[source.as_str(), metric.stat().label()])
                    .set(value);
            }
            target @ MetricTarget::Pair { .. } => {
                PAIR_OFFSET_SECONDS
                    .with_label_values(&[target.prefix().as_str(), metric.stat().label()])
                    .set(value);
            }
        }
        self.updates.push((metric.to_string(), value));
    }
}

/// Record the number of configured sources.
pub fn set_sources_configured(count: usize) {
    SOURCES_CONFIGURED.set(count as f64);
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
