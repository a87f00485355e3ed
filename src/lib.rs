//! # Syncprof - Source synchronization profiler
//!
//! Streaming statistics over a set of independently updating signal sources.
//! Every source emits timestamped update events at its own cadence; syncprof
//! derives two families of metrics from them:
//!
//! - **Update frequency** per source, over a bounded recent history
//! - **Timestamp offset** for every pair of sources, to characterize skew
//!   between sources that are expected to track each other
//!
//! ## Quick Start
//!
//! ```rust
//! use syncprof::{Aggregator, EngineConfig, MemorySink, SourceRegistry};
//!
//! let registry = SourceRegistry::from_names(["A", "B"]).unwrap();
//! let mut aggregator = Aggregator::new(registry, EngineConfig::default()).unwrap();
//! aggregator.start();
//!
//! let mut sink = MemorySink::new();
//! for (source, timestamp) in [("A", 1.0), ("B", 1.05), ("A", 2.0), ("B", 2.1)] {
//!     aggregator.record_event(source, timestamp, &mut sink).unwrap();
//! }
//!
//! assert_eq!(sink.get("A:AvgFreq"), Some(1.0));
//! assert!((sink.get("A_vs_B:AvgDiff").unwrap() + 0.075).abs() < 1e-9);
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   ingestion (push / poll)          syncprof core                 publication
//!  ┌──────────────────────┐   ┌──────────────────────────────┐   ┌─────────────┐
//!  │ (source, timestamp)  │──►│ Aggregator::record_event     │   │             │
//!  └──────────────────────┘   │   SampleWindow (per source)  │   │ MetricsSink │
//!                             │   FrequencyStatsCalculator   │──►│  publish()  │
//!                             │   PairwiseDiffCalculator     │   │             │
//!                             └──────────────────────────────┘   └─────────────┘
//! ```
//!
//! The core performs no I/O and spawns nothing. Callers that receive events
//! from several threads must funnel them through a single owner of the
//! [`Aggregator`] (see the `syncprof-exporter` crate for a channel-based
//! worker).
//!
//! ## Modules
//!
//! - [`registry`]: Ordered source list and pair enumeration
//! - [`window`]: Bounded per-source arrival history
//! - [`stats`]: Population statistics primitives
//! - [`frequency`]: Per-source frequency statistics
//! - [`pairwise`]: Per-pair timestamp offset statistics
//! - [`metric`]: Metric names and the per-source/per-pair handle table
//! - [`sink`]: Publication interface
//! - [`aggregator`]: Event recording and recomputation passes

// Modules
pub mod aggregator;
pub mod config;
pub mod error;
pub mod frequency;
pub mod metric;
pub mod pairwise;
pub mod registry;
pub mod sink;
pub mod stats;
pub mod window;

// Re-exports for convenient access
pub use aggregator::{Aggregator, EngineState, PassReport};
pub use config::{DeltaPolicy, EngineConfig};
pub use error::{Result, SyncError};
pub use frequency::{FrequencyStats, FrequencyStatsCalculator};
pub use metric::{MetricName, MetricTable, MetricTarget, PairMetrics, SourceMetrics, Stat};
pub use pairwise::{PairDiffStats, PairwiseDiffCalculator};
pub use registry::{SourceId, SourceRegistry, SourceSpec};
pub use sink::{MemorySink, MetricsSink};
pub use stats::Summary;
pub use window::{Arrival, SampleWindow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of arrivals kept per source
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_pass() {
        let registry = SourceRegistry::from_names(["x", "y"]).unwrap();
        let mut aggregator = Aggregator::new(registry, EngineConfig::default()).unwrap();
        aggregator.start();

        let mut sink = MemorySink::new();
        aggregator.record_event("x", 0.0, &mut sink).unwrap();
        aggregator.record_event("x", 0.5, &mut sink).unwrap();

        assert_eq!(sink.get("x:InstantFreq"), Some(2.0));
        assert_eq!(sink.get("y:InstantFreq"), None);
    }
}
