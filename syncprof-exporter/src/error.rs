// Syncprof Exporter - Error types
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the exporter.

use syncprof::SyncError;
use thiserror::Error;

/// Exporter errors.
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine refused the registry or configuration.
    #[error("Engine error: {0}")]
    Engine(#[from] SyncError),

    /// Replay failure.
    #[error("Replay error: {0}")]
    Replay(#[from] crate::replay::ReplayError),

    /// The worker has shut down and no longer accepts events.
    #[error("Ingest queue closed")]
    QueueClosed,

    /// A background task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for exporter operations.
pub type Result<T> = std::result::Result<T, ExporterError>;
