//! Engine configuration.
//!
//! Consumed once at startup; nothing here is adjustable while the engine
//! is running.

use crate::error::{Result, SyncError};
use crate::DEFAULT_WINDOW_CAPACITY;
use serde::{Deserialize, Serialize};

/// Configuration for the statistics engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of arrival timestamps kept per source.
    pub window_capacity: usize,

    /// What to do with an arrival that is not strictly after the previous one.
    pub delta_policy: DeltaPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            delta_policy: DeltaPolicy::RecordZero,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with a custom window capacity
    pub fn with_capacity(window_capacity: usize) -> Self {
        Self {
            window_capacity,
            ..Default::default()
        }
    }

    /// Check that the configuration can drive an engine.
    pub fn validate(&self) -> Result<()> {
        // Two timestamps are needed for a single frequency.
        if self.window_capacity < 2 {
            return Err(SyncError::InvalidConfig(format!(
                "window_capacity must be at least 2, got {}",
                self.window_capacity
            )));
        }
        Ok(())
    }
}

/// Handling of non-positive deltas between consecutive arrivals
/// (duplicate timestamps or a clock stepping backwards).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaPolicy {
    /// Keep the arrival and record a frequency of 0.
    #[default]
    RecordZero,
    /// Discard the arrival entirely; the window is left untouched.
    DropSample,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.window_capacity, 100);
        assert_eq!(config.delta_policy, DeltaPolicy::RecordZero);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_too_small() {
        assert!(matches!(
            EngineConfig::with_capacity(1).validate(),
            Err(SyncError::InvalidConfig(_))
        ));
        assert!(EngineConfig::with_capacity(2).validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig {
            window_capacity: 32,
            delta_policy: DeltaPolicy::DropSample,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("drop_sample"));
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: EngineConfig = serde_json::from_str(r#"{"window_capacity": 10}"#).unwrap();
        assert_eq!(parsed.window_capacity, 10);
        assert_eq!(parsed.delta_policy, DeltaPolicy::RecordZero);
    }
}
