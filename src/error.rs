//! Error types for syncprof
//!
//! None of these are raised by numeric input: arrivals and recomputation
//! passes never fail. Errors come from building the registry/configuration
//! and from events that cannot be applied (unknown source, engine not
//! running), which the ingestion side logs and drops.

use crate::aggregator::EngineState;
use thiserror::Error;

/// Result type alias for syncprof operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Main error type for syncprof operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Event references a source that is not in the registry
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Same source name registered twice
    #[error("Duplicate source: {0}")]
    DuplicateSource(String),

    /// Registry built from an empty source list
    #[error("Source registry is empty")]
    EmptyRegistry,

    /// Source name cannot be used in metric names
    #[error("Invalid source name {name:?}: {reason}")]
    InvalidSourceName { name: String, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Event offered while the engine is not running
    #[error("Engine is not running (state: {0:?})")]
    NotRunning(EngineState),
}

impl SyncError {
    /// True for errors that only mean "this event was dropped".
    pub fn is_rejected_event(&self) -> bool {
        matches!(self, SyncError::UnknownSource(_) | SyncError::NotRunning(_))
    }
}
