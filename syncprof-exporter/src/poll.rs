// Syncprof Exporter - Source polling
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Periodic polling of sources.
//!
//! One interval timer drives every source: on each tick the [`Poller`] asks
//! its [`PollSource`] for every registered source's current timestamp and
//! queues the result. Failures are logged and skipped. Every successful read
//! is recorded, even when the timestamp did not move.

use crate::worker::{IngestHandle, SourceEvent};
use std::path::PathBuf;
use std::time::{Duration, UNIX_EPOCH};
use syncprof::SourceSpec;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Poll errors.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("IO error for {address}: {source}")]
    Io {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No timestamp available for {0}")]
    Unavailable(String),
}

/// A reading of one source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: f64,
    pub value: Option<f64>,
}

/// Reads the current state of a source.
pub trait PollSource: Send {
    fn read(&mut self, source: &SourceSpec) -> Result<Reading, PollError>;
}

/// Treats each source address as a file path; the update timestamp is the
/// file's modification time.
#[derive(Debug, Default, Clone)]
pub struct FileSource {
    base_dir: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative addresses against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn path_of(&self, address: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(address),
            None => PathBuf::from(address),
        }
    }
}

impl PollSource for FileSource {
    fn read(&mut self, source: &SourceSpec) -> Result<Reading, PollError> {
        let io_err = |e: std::io::Error| PollError::Io {
            address: source.address.clone(),
            source: e,
        };
        let metadata = std::fs::metadata(self.path_of(&source.address)).map_err(io_err)?;
        let modified = metadata.modified().map_err(io_err)?;
        let since_epoch = modified
            .duration_since(UNIX_EPOCH)
            .map_err(|_| PollError::Unavailable(source.address.clone()))?;

        Ok(Reading {
            timestamp: since_epoch.as_secs_f64(),
            value: Some(metadata.len() as f64),
        })
    }
}

/// Polls every source once per tick.
pub struct Poller<P: PollSource> {
    source: P,
    specs: Vec<SourceSpec>,
    period: Duration,
}

impl<P: PollSource> Poller<P> {
    pub fn new(source: P, specs: Vec<SourceSpec>, period: Duration) -> Self {
        Self {
            source,
            specs,
            period,
        }
    }

    /// Read every source once and queue the results. Returns the number of
    /// events queued, or `None` once the queue has closed.
    pub async fn poll_once(&mut self, ingest: &IngestHandle) -> Option<usize> {
        let mut queued = 0;
        for spec in &self.specs {
            match self.source.read(spec) {
                Ok(reading) => {
                    let mut event = SourceEvent::new(spec.name.as_str(), reading.timestamp);
                    event.value = reading.value;
                    if ingest.send(event).await.is_err() {
                        return None;
                    }
                    queued += 1;
                }
                Err(e) => warn!("Poll of {} failed: {}", spec.name, e),
            }
        }
        Some(queued)
    }

    /// Poll until the queue closes or `shutdown` fires.
    pub async fn run(mut self, ingest: IngestHandle, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Polling {} sources every {:?}",
            self.specs.len(),
            self.period
        );
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => match self.poll_once(&ingest).await {
                    Some(queued) => debug!("Poll queued {} events", queued),
                    None => break,
                },
            }
        }
        info!("Poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::Worker;
    use std::collections::HashMap;
    use syncprof::{Aggregator, EngineConfig, SourceRegistry};

    /// Scripted readings per address.
    struct ScriptedSource {
        readings: HashMap<String, Vec<f64>>,
    }

    impl PollSource for ScriptedSource {
        fn read(&mut self, source: &SourceSpec) -> Result<Reading, PollError> {
            let queue = self
                .readings
                .get_mut(&source.address)
                .ok_or_else(|| PollError::Unavailable(source.address.clone()))?;
            if queue.is_empty() {
                return Err(PollError::Unavailable(source.address.clone()));
            }
            Ok(Reading {
                timestamp: queue.remove(0),
                value: None,
            })
        }
    }

    #[test]
    fn test_file_source_reads_mtime() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"abc").unwrap();

        let spec = SourceSpec::new("f", file.path().to_string_lossy());
        let reading = FileSource::new().read(&spec).unwrap();
        assert!(reading.timestamp > 1_704_067_200.0);
        assert_eq!(reading.value, Some(3.0));
    }

    #[test]
    fn test_file_source_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stamp"), b"").unwrap();

        let mut source = FileSource::with_base_dir(dir.path());
        assert!(source.read(&SourceSpec::new("s", "stamp")).is_ok());
        assert!(matches!(
            source.read(&SourceSpec::new("s", "missing")),
            Err(PollError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_poll_once_skips_failures() {
        let registry = SourceRegistry::from_names(["pa", "pb"]).unwrap();
        let specs: Vec<SourceSpec> = registry.iter().map(|(_, s)| s.clone()).collect();
        let aggregator = Aggregator::new(registry, EngineConfig::default()).unwrap();
        let (worker, handle, view) = Worker::new(aggregator, 8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(worker.run(shutdown_rx));

        let source = ScriptedSource {
            readings: HashMap::from([("pa".to_string(), vec![10.0, 10.5, 10.5])]),
        };
        let mut poller = Poller::new(source, specs, Duration::from_millis(10));

        for _ in 0..3 {
            assert_eq!(poller.poll_once(&handle).await, Some(1));
        }
        drop(handle);
        let aggregator = task.await.unwrap();

        let window = aggregator.window("pa").unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window.last_frequency(), Some(0.0));
        assert!(aggregator.window("pb").unwrap().is_empty());
        assert_eq!(view.read().await.events_recorded, 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let registry = SourceRegistry::from_names(["pc", "pd"]).unwrap();
        let specs: Vec<SourceSpec> = registry.iter().map(|(_, s)| s.clone()).collect();
        let aggregator = Aggregator::new(registry, EngineConfig::default()).unwrap();
        let (worker, handle, _view) = Worker::new(aggregator, 8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let source = ScriptedSource {
            readings: HashMap::new(),
        };
        let poller = Poller::new(source, specs, Duration::from_millis(5));
        let poll_task = tokio::spawn(poller.run(handle, shutdown_rx.clone()));
        let worker_task = tokio::spawn(worker.run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown_tx.send(true).unwrap();

        poll_task.await.unwrap();
        let aggregator = worker_task.await.unwrap();
        assert_eq!(aggregator.events_recorded(), 0);
    }
}
