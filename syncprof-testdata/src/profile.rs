// Syncprof Testdata - Scenario configuration
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Source profiles and scenario configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on generated updates per source and stretch.
pub const MAX_UPDATES_PER_SOURCE: usize = 1_000_000;

/// A scenario that cannot be generated.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("Invalid duration {0}s")]
    InvalidDuration(f64),

    #[error("Source '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },
}

/// How one synthetic source updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Source name.
    pub name: String,
    /// Nominal update period in seconds.
    pub period_secs: f64,
    /// Standard deviation of Gaussian jitter on each arrival, in seconds.
    #[serde(default)]
    pub jitter_secs: f64,
    /// Constant offset added to every timestamp, in seconds.
    #[serde(default)]
    pub offset_secs: f64,
    /// Probability that an update is missed.
    #[serde(default)]
    pub dropout_probability: f64,
    /// Optional clock step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_step: Option<ClockStep>,
}

/// A jump of a source's reported clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockStep {
    /// Scenario time (seconds from start) at which the step happens.
    pub at_secs: f64,
    /// Size of the step; negative values move the clock backwards.
    pub step_secs: f64,
}

impl SourceProfile {
    /// A perfectly periodic source.
    pub fn periodic(name: &str, period_secs: f64) -> Self {
        Self {
            name: name.to_string(),
            period_secs,
            jitter_secs: 0.0,
            offset_secs: 0.0,
            dropout_probability: 0.0,
            clock_step: None,
        }
    }

    /// Add arrival jitter.
    pub fn with_jitter(mut self, std_secs: f64) -> Self {
        self.jitter_secs = std_secs;
        self
    }

    /// Add a constant offset.
    pub fn with_offset(mut self, offset_secs: f64) -> Self {
        self.offset_secs = offset_secs;
        self
    }

    /// Drop updates with the given probability.
    pub fn with_dropouts(mut self, probability: f64) -> Self {
        self.dropout_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Step the clock at `at_secs` by `step_secs`.
    pub fn with_clock_step(mut self, at_secs: f64, step_secs: f64) -> Self {
        self.clock_step = Some(ClockStep { at_secs, step_secs });
        self
    }

    /// Nominal update rate in Hz.
    pub fn nominal_rate_hz(&self) -> f64 {
        if self.period_secs > 0.0 {
            1.0 / self.period_secs
        } else {
            0.0
        }
    }
}

/// A complete scenario: time span, seed and sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Start time in seconds since the Unix epoch.
    pub start_time_secs: f64,
    /// Scenario length in seconds.
    pub duration_secs: f64,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Sources, in registry order.
    pub sources: Vec<SourceProfile>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            start_time_secs: 1_706_745_600.0, // 2024-02-01 00:00:00 UTC
            duration_secs: 60.0,
            seed: None,
            sources: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_time(mut self, secs: f64) -> Self {
        self.start_time_secs = secs;
        self
    }

    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_source(mut self, source: SourceProfile) -> Self {
        self.sources.push(source);
        self
    }

    /// Parse a scenario from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Source names in order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }

    /// Check that every source can be generated: positive finite periods,
    /// non-negative jitter, and at most [`MAX_UPDATES_PER_SOURCE`] updates.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(ScenarioError::InvalidDuration(self.duration_secs));
        }
        for source in &self.sources {
            let invalid = |reason: String| ScenarioError::InvalidProfile {
                name: source.name.clone(),
                reason,
            };
            if !source.period_secs.is_finite() || source.period_secs <= 0.0 {
                return Err(invalid(format!(
                    "period must be positive, got {}",
                    source.period_secs
                )));
            }
            if !source.jitter_secs.is_finite() || source.jitter_secs < 0.0 {
                return Err(invalid(format!(
                    "jitter must be non-negative, got {}",
                    source.jitter_secs
                )));
            }
            if self.duration_secs / source.period_secs > MAX_UPDATES_PER_SOURCE as f64 {
                return Err(invalid(format!(
                    "more than {} updates in {}s",
                    MAX_UPDATES_PER_SOURCE, self.duration_secs
                )));
            }
        }
        Ok(())
    }
}
