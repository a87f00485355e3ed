// Syncprof Exporter - Event log replay
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Replay of recorded event logs.
//!
//! The log is a CSV file with a header and one update per row:
//!
//! ```text
//! source,timestamp,value
//! bpm1,1706745600.000,0.0
//! bpm2,1706745600.002,0.0
//! ```
//!
//! `value` is optional. Rows are sent in file order; the pause between two
//! rows is their timestamp gap divided by the speed multiplier. When looping,
//! the engine is not reset: each pass shifts the timestamps forward so the
//! sources keep advancing.

use crate::worker::{IngestHandle, SourceEvent};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for event log replay.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Path to the CSV event log.
    pub csv_path: String,
    /// Replay speed multiplier (1.0 = real-time, 10.0 = 10x faster).
    pub speed: f64,
    /// Whether to loop the log.
    pub loop_replay: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            csv_path: String::new(),
            speed: 1.0,
            loop_replay: false,
        }
    }
}

/// State of the replay engine.
#[derive(Debug, Default)]
pub struct ReplayState {
    /// Current row index.
    pub position: AtomicUsize,
    /// Rows in the log.
    pub total_rows: AtomicUsize,
    /// Completed passes over the log.
    pub loops: AtomicUsize,
    /// Whether replay is running.
    pub running: AtomicBool,
}

/// One row of the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayRow {
    pub source: String,
    pub timestamp: f64,
    pub value: Option<f64>,
}

/// Summary of a loaded log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogInfo {
    pub row_count: usize,
    /// Source names in order of first appearance.
    pub sources: Vec<String>,
    pub duration_secs: f64,
}

/// Feeds an event log into the ingest queue.
pub struct ReplayEngine {
    config: ReplayConfig,
    state: Arc<ReplayState>,
    rows: Vec<ReplayRow>,
}

impl ReplayEngine {
    /// Load an event log.
    pub fn from_csv(config: ReplayConfig) -> Result<Self, ReplayError> {
        let path = Path::new(&config.csv_path);
        if !path.exists() {
            return Err(ReplayError::FileNotFound(config.csv_path.clone()));
        }
        if config.speed.is_nan() || config.speed <= 0.0 {
            return Err(ReplayError::InvalidFormat(format!(
                "speed must be positive, got {}",
                config.speed
            )));
        }

        let rows = Self::parse_csv(path)?;
        if rows.is_empty() {
            return Err(ReplayError::EmptyLog);
        }

        let state = Arc::new(ReplayState::default());
        state.total_rows.store(rows.len(), Ordering::SeqCst);

        let engine = Self {
            config,
            state,
            rows,
        };
        let info = engine.log_info();
        if engine.config.loop_replay && info.duration_secs <= 0.0 {
            return Err(ReplayError::InvalidFormat(
                "looping needs a log spanning a positive time".to_string(),
            ));
        }
        info!(
            "Loaded event log: {} rows, {} sources, {:.3}s",
            info.row_count,
            info.sources.len(),
            info.duration_secs
        );
        Ok(engine)
    }

    /// Parse a CSV event log.
    pub fn parse_csv(path: &Path) -> Result<Vec<ReplayRow>, ReplayError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let source_col = column("source").ok_or_else(|| {
            ReplayError::InvalidFormat("missing 'source' column".to_string())
        })?;
        let timestamp_col = column("timestamp").ok_or_else(|| {
            ReplayError::InvalidFormat("missing 'timestamp' column".to_string())
        })?;
        let value_col = column("value");

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let line = index + 2;

            let source = match record.get(source_col) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => {
                    return Err(ReplayError::InvalidFormat(format!(
                        "line {}: missing source",
                        line
                    )))
                }
            };
            let timestamp: f64 = record
                .get(timestamp_col)
                .and_then(|s| s.parse().ok())
                .filter(|t: &f64| t.is_finite())
                .ok_or_else(|| {
                    ReplayError::InvalidFormat(format!("line {}: invalid timestamp", line))
                })?;
            let value = value_col
                .and_then(|i| record.get(i))
                .and_then(|s| s.parse().ok());

            rows.push(ReplayRow {
                source,
                timestamp,
                value,
            });
        }

        Ok(rows)
    }

    pub fn state(&self) -> Arc<ReplayState> {
        Arc::clone(&self.state)
    }

    pub fn rows(&self) -> &[ReplayRow] {
        &self.rows
    }

    pub fn log_info(&self) -> LogInfo {
        let mut sources: Vec<String> = Vec::new();
        for row in &self.rows {
            if !sources.contains(&row.source) {
                sources.push(row.source.clone());
            }
        }
        LogInfo {
            row_count: self.rows.len(),
            sources,
            duration_secs: self.span_secs(),
        }
    }

    fn span_secs(&self) -> f64 {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp).max(0.0),
            _ => 0.0,
        }
    }

    /// Mean timestamp gap between consecutive rows.
    fn mean_gap_secs(&self) -> f64 {
        let gaps = self.rows.len().saturating_sub(1).max(1) as f64;
        self.span_secs() / gaps
    }

    /// Send the log into the queue. Returns when the log ends (without
    /// looping), the queue closes, or [`ReplayEngine::stop`] is called.
    pub async fn run(&self, ingest: IngestHandle) {
        self.state.running.store(true, Ordering::SeqCst);
        info!(
            "Starting replay: speed={}, loop={}",
            self.config.speed, self.config.loop_replay
        );

        // Each loop continues one mean gap after the previous one ended.
        let gap = self.mean_gap_secs();
        let shift = self.span_secs() + gap;
        let mut offset = 0.0;

        'replay: loop {
            for (position, row) in self.rows.iter().enumerate() {
                if !self.state.running.load(Ordering::SeqCst) {
                    break 'replay;
                }
                self.state.position.store(position, Ordering::SeqCst);

                let mut event = SourceEvent::new(row.source.as_str(), row.timestamp + offset);
                event.value = row.value;
                if ingest.send(event).await.is_err() {
                    warn!("Ingest queue closed, stopping replay");
                    break 'replay;
                }

                if let Some(next) = self.rows.get(position + 1) {
                    let gap = (next.timestamp - row.timestamp).max(0.0);
                    match self.pause(gap) {
                        Some(pause) if !pause.is_zero() => sleep(pause).await,
                        Some(_) => {}
                        None => {
                            warn!(
                                "Gap of {}s after row {} is too long to replay, stopping",
                                gap, position
                            );
                            break 'replay;
                        }
                    }
                }
            }

            self.state.loops.fetch_add(1, Ordering::SeqCst);
            if !self.config.loop_replay {
                info!("Event log complete, stopping");
                break;
            }
            offset += shift;
            debug!("Event log complete, looping with offset {:.3}s", offset);
            match self.pause(gap) {
                Some(pause) => sleep(pause).await,
                None => break,
            }
        }

        self.state
            .position
            .store(self.rows.len(), Ordering::SeqCst);
        self.state.running.store(false, Ordering::SeqCst);
    }

    /// Wall-clock pause for a timestamp gap, or `None` if it does not fit a
    /// `Duration`.
    fn pause(&self, gap: f64) -> Option<Duration> {
        Duration::try_from_secs_f64(gap / self.config.speed).ok()
    }

    /// Stop the replay after the current row.
    pub fn stop(&self) {
        self.state.running.store(false, Ordering::SeqCst);
    }
}

/// Replay errors.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Empty event log")]
    EmptyLog,
}
