// Syncprof Exporter - Prometheus exporter for sync profile statistics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Syncprof Exporter
//!
//! Runs a [`syncprof::Aggregator`] behind a single ingest queue and exposes
//! its output over HTTP and Prometheus.
//!
//! ```text
//! POST /events ──┐
//! CSV replay ────┤                 ┌──────────────┐    PrometheusSink ──► /metrics
//! file polling ──┼─► mpsc queue ──►│    Worker    │──►
//! simulation ────┘                 │ (Aggregator) │    EngineView ─────► /values, /status
//!                                  └──────────────┘
//! ```
//!
//! Every ingestion path only holds an [`IngestHandle`]; the worker task is the
//! sole owner of the engine, so events are applied strictly one at a time.

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod poll;
pub mod replay;
#[cfg(feature = "simulate")]
pub mod simulate;
pub mod worker;

pub use config::{CliOverrides, ExporterConfig};
pub use error::{ExporterError, Result};
pub use http::{router, AppState};
pub use metrics::{encode_metrics, PrometheusSink};
pub use poll::{FileSource, PollSource, Poller};
pub use replay::{ReplayConfig, ReplayEngine, ReplayState};
pub use worker::{EngineView, IngestHandle, SharedView, SourceEvent, Worker};

/// Exporter version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_secs_is_recent() {
        // 2024-01-01
        assert!(now_secs() > 1_704_067_200.0);
    }
}
