// Syncprof Testdata - Synthetic update stream generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Syncprof Testdata
//!
//! Synthetic update streams for sets of sources that are nominally expected
//! to track each other, with the imperfections a synchronization profiler is
//! meant to expose:
//!
//! - **Jitter**: Gaussian noise on each arrival time
//! - **Offset**: Constant skew of one source against the others
//! - **Dropouts**: Randomly missed updates
//! - **Clock steps**: A source's clock jumping forwards or backwards
//!
//! ## Quick Start
//!
//! ```rust
//! use syncprof_testdata::{generate_events, ScenarioConfig, SourceProfile};
//!
//! let config = ScenarioConfig::new()
//!     .with_duration_secs(10.0)
//!     .with_seed(7)
//!     .with_source(SourceProfile::periodic("bpm1", 0.1))
//!     .with_source(SourceProfile::periodic("bpm2", 0.1).with_offset(0.002));
//!
//! let log = generate_events(&config);
//! assert_eq!(log.source_names(), &["bpm1".to_string(), "bpm2".to_string()]);
//! assert!(log.len() > 150);
//! ```
//!
//! ## Presets
//!
//! [`presets`] provides ready-made scenarios (`synchronized`, `skewed`,
//! `mixed_rates`, `clock_regression`, `dropouts`), also selectable by name
//! through [`presets::by_name`].

pub mod event_log;
pub mod generator;
pub mod presets;
pub mod profile;

// Re-exports for convenience
pub use event_log::{Event, EventLog, EventLogError};
pub use generator::generate_events;
pub use profile::{
    ClockStep, ScenarioConfig, ScenarioError, SourceProfile, MAX_UPDATES_PER_SOURCE,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
