// Syncprof Exporter - Simulated sources
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Live simulation from a synthetic scenario.
//!
//! The scenario is re-based on the current wall clock and its events are
//! queued at their arrival times (scaled by the speed multiplier). With
//! `repeat`, a fresh stretch of the scenario is generated each time the
//! previous one runs out.

use crate::error::{ExporterError, Result};
use crate::worker::{IngestHandle, SourceEvent};
use std::path::Path;
use std::time::Duration;
use syncprof_testdata::{generate_events, presets, ScenarioConfig};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

/// Resolve `--simulate`: a preset name or the path of a JSON scenario.
pub fn load_scenario(spec: &str) -> Result<ScenarioConfig> {
    if let Some(config) = presets::by_name(spec) {
        return Ok(config);
    }
    if Path::new(spec).exists() {
        let text = std::fs::read_to_string(spec)?;
        let config = ScenarioConfig::from_json(&text)?;
        config
            .validate()
            .map_err(|e| ExporterError::Config(format!("scenario {}: {}", spec, e)))?;
        return Ok(config);
    }
    Err(ExporterError::Config(format!(
        "unknown scenario '{}' (presets: {})",
        spec,
        presets::PRESET_NAMES.join(", ")
    )))
}

/// Streams a scenario into the ingest queue.
pub struct Simulator {
    scenario: ScenarioConfig,
    speed: f64,
    repeat: bool,
}

impl Simulator {
    pub fn new(scenario: ScenarioConfig, speed: f64) -> Self {
        Self {
            scenario,
            speed: if speed > 0.0 { speed } else { 1.0 },
            repeat: true,
        }
    }

    /// Stop after one stretch of the scenario.
    pub fn once(mut self) -> Self {
        self.repeat = false;
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.scenario.source_names()
    }

    /// Run until the scenario ends (without repeat), the queue closes or
    /// `shutdown` fires. Returns the number of events queued.
    pub async fn run(self, ingest: IngestHandle, shutdown: watch::Receiver<bool>) -> usize {
        info!(
            "Simulating {} sources for {:.1}s stretches at {}x",
            self.scenario.sources.len(),
            self.scenario.duration_secs,
            self.speed
        );

        let mut scenario = self.scenario.clone().with_start_time(crate::now_secs());
        let mut stretch: u64 = 0;
        let mut queued = 0;

        loop {
            if let Some(seed) = self.scenario.seed {
                scenario.seed = Some(seed.wrapping_add(stretch));
            }
            let log = generate_events(&scenario);
            debug!("Generated stretch {} with {} events", stretch, log.len());

            let mut previous = scenario.start_time_secs;
            for event in log.events() {
                if *shutdown.borrow() {
                    return queued;
                }
                let pause = (event.emitted_at - previous).max(0.0) / self.speed;
                if pause > 0.0 {
                    sleep(Duration::from_secs_f64(pause)).await;
                }
                previous = event.emitted_at;

                let queued_event =
                    SourceEvent::new(event.source.as_str(), event.timestamp).with_value(event.value);
                if ingest.send(queued_event).await.is_err() {
                    return queued;
                }
                queued += 1;
            }

            if !self.repeat {
                return queued;
            }
            stretch += 1;
            scenario.start_time_secs += scenario.duration_secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncprof_testdata::SourceProfile;

    #[test]
    fn test_load_preset() {
        let config = load_scenario("skewed").unwrap();
        assert_eq!(config.sources.len(), 3);
    }

    #[test]
    fn test_load_json_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"start_time_secs": 0, "duration_secs": 1, "sources": [{"name": "s", "period_secs": 0.5}]}"#,
        )
        .unwrap();

        let config = load_scenario(&file.path().to_string_lossy()).unwrap();
        assert_eq!(config.source_names(), vec!["s"]);
    }

    #[test]
    fn test_json_file_with_tiny_period_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"start_time_secs": 0, "duration_secs": 60, "sources": [{"name": "s", "period_secs": 1e-12}]}"#,
        )
        .unwrap();

        assert!(matches!(
            load_scenario(&file.path().to_string_lossy()),
            Err(ExporterError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_scenario() {
        assert!(matches!(
            load_scenario("no-such-preset"),
            Err(ExporterError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_simulator_queues_whole_stretch() {
        let scenario = ScenarioConfig::new()
            .with_duration_secs(0.55)
            .with_seed(1)
            .with_source(SourceProfile::periodic("sa", 0.1))
            .with_source(SourceProfile::periodic("sb", 0.1).with_offset(0.01));

        let (tx, mut rx) = tokio::sync::mpsc::channel(64);
        let handle = IngestHandle::from_sender(tx);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let queued = Simulator::new(scenario, 100.0)
            .once()
            .run(handle, shutdown_rx)
            .await;
        assert_eq!(queued, 10);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.source, "sa");
        assert_eq!(second.source, "sb");
        assert!((second.timestamp - first.timestamp - 0.01).abs() < 1e-6);
    }
}
