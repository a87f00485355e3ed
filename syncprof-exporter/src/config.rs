// Syncprof Exporter - Configuration
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Exporter configuration: JSON file plus command-line overrides.
//!
//! ```json
//! {
//!   "sources": [
//!     {"name": "bpm1", "address": "/var/run/bpm1.stamp"},
//!     {"name": "bpm2", "address": "/var/run/bpm2.stamp"}
//!   ],
//!   "engine": {"window_capacity": 100, "delta_policy": "record_zero"},
//!   "poll_interval_ms": 1000,
//!   "listen_port": 9100
//! }
//! ```

use crate::error::{ExporterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use syncprof::{DeltaPolicy, EngineConfig, SourceRegistry, SourceSpec};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 9100;

/// Default depth of the ingest queue.
pub const DEFAULT_QUEUE_DEPTH: usize = 1024;

/// Complete exporter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Sources in registry order.
    pub sources: Vec<SourceSpec>,
    /// Engine settings.
    pub engine: EngineConfig,
    /// Poll every source at this interval. Polling is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    /// HTTP listen port.
    pub listen_port: u16,
    /// Bound of the ingest queue.
    pub queue_depth: usize,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            engine: EngineConfig::default(),
            poll_interval_ms: None,
            listen_port: DEFAULT_PORT,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

/// Values given on the command line. Unset values leave the file's alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub sources: Vec<String>,
    pub port: Option<u16>,
    pub capacity: Option<usize>,
    pub drop_non_positive: bool,
    pub poll_interval_ms: Option<u64>,
}

impl ExporterConfig {
    /// Parse a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExporterError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Apply command-line overrides.
    ///
    /// Positional source names replace the file's sources; each one is read
    /// from an address equal to its name.
    pub fn apply(&mut self, overrides: &CliOverrides) {
        if !overrides.sources.is_empty() {
            self.sources = overrides
                .sources
                .iter()
                .map(|name| SourceSpec::named(name.as_str()))
                .collect();
        }
        if let Some(port) = overrides.port {
            self.listen_port = port;
        }
        if let Some(capacity) = overrides.capacity {
            self.engine.window_capacity = capacity;
        }
        if overrides.drop_non_positive {
            self.engine.delta_policy = DeltaPolicy::DropSample;
        }
        if overrides.poll_interval_ms.is_some() {
            self.poll_interval_ms = overrides.poll_interval_ms;
        }
    }

    /// Check everything that can be checked before starting.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.queue_depth == 0 {
            return Err(ExporterError::Config(
                "queue_depth must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == Some(0) {
            return Err(ExporterError::Config(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the source registry.
    pub fn registry(&self) -> Result<SourceRegistry> {
        Ok(SourceRegistry::new(self.sources.clone())?)
    }
}
