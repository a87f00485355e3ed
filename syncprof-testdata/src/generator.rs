// Syncprof Testdata - Core generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Event stream generation.
//!
//! Each source emits at `start + k * period` plus Gaussian jitter. The
//! reported timestamp additionally carries the source's offset and, past
//! its clock step, the step amount. Events from all sources are merged in
//! arrival order.

use crate::event_log::{Event, EventLog};
use crate::profile::{ScenarioConfig, SourceProfile, MAX_UPDATES_PER_SOURCE};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

/// Generate an event log from a scenario.
pub fn generate_events(config: &ScenarioConfig) -> EventLog {
    let mut rng: Box<dyn RngCore> = match config.seed {
        Some(s) => Box::new(StdRng::seed_from_u64(s)),
        None => Box::new(StdRng::from_entropy()),
    };

    let mut log = EventLog::new(config.source_names());
    log.seed = config.seed;

    let mut events: Vec<Event> = Vec::new();
    for source in &config.sources {
        events.extend(source_events(config, source, &mut *rng));
    }

    // Stable, so simultaneous arrivals keep registry order.
    events.sort_by(|a, b| a.emitted_at.total_cmp(&b.emitted_at));
    log.events = events;
    log
}

fn source_events(
    config: &ScenarioConfig,
    source: &SourceProfile,
    rng: &mut dyn RngCore,
) -> Vec<Event> {
    // Also false for NaN.
    let usable = source.period_secs > 0.0 && config.duration_secs > 0.0;
    if !usable {
        return Vec::new();
    }

    let jitter = if source.jitter_secs > 0.0 {
        Normal::new(0.0, source.jitter_secs).ok()
    } else {
        None
    };

    let updates = ((config.duration_secs / source.period_secs).floor() as usize)
        .min(MAX_UPDATES_PER_SOURCE);
    let mut events = Vec::with_capacity(updates);

    for k in 0..updates {
        let nominal = k as f64 * source.period_secs;

        if source.dropout_probability > 0.0 && rng.gen::<f64>() < source.dropout_probability {
            continue;
        }

        let noise = jitter.map(|d| d.sample(&mut *rng)).unwrap_or(0.0);
        let emitted_at = config.start_time_secs + nominal + noise;

        let step = match source.clock_step {
            Some(step) if nominal >= step.at_secs => step.step_secs,
            _ => 0.0,
        };

        events.push(Event {
            source: source.name.clone(),
            emitted_at,
            timestamp: emitted_at + source.offset_secs + step,
            value: k as f64,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sources() -> ScenarioConfig {
        ScenarioConfig::new()
            .with_start_time(100.0)
            .with_duration_secs(10.0)
            .with_seed(42)
            .with_source(SourceProfile::periodic("a", 1.0))
            .with_source(SourceProfile::periodic("b", 0.5).with_offset(0.25))
    }

    #[test]
    fn test_periodic_counts() {
        let log = generate_events(&two_sources());
        assert_eq!(log.for_source("a").count(), 10);
        assert_eq!(log.for_source("b").count(), 20);
    }

    #[test]
    fn test_sorted_by_arrival() {
        let config =
            two_sources().with_source(SourceProfile::periodic("c", 0.3).with_jitter(0.01));
        let log = generate_events(&config);
        assert!(log
            .events()
            .windows(2)
            .all(|w| w[0].emitted_at <= w[1].emitted_at));
    }

    #[test]
    fn test_offset_applied() {
        let log = generate_events(&two_sources());
        let first_b = log.for_source("b").next().unwrap();
        assert!((first_b.timestamp - 100.25).abs() < 1e-9);
        assert!((first_b.emitted_at - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_simultaneous_keep_source_order() {
        let log = generate_events(&two_sources());
        assert_eq!(log.events()[0].source, "a");
        assert_eq!(log.events()[1].source, "b");
    }

    #[test]
    fn test_seed_reproducible() {
        let config = ScenarioConfig::new()
            .with_duration_secs(5.0)
            .with_seed(3)
            .with_source(
                SourceProfile::periodic("a", 0.1)
                    .with_jitter(0.005)
                    .with_dropouts(0.2),
            );

        let first = generate_events(&config);
        let second = generate_events(&config);
        assert_eq!(first.events, second.events);
    }

    #[test]
    fn test_dropouts_reduce_count() {
        let config = ScenarioConfig::new()
            .with_duration_secs(100.0)
            .with_seed(5)
            .with_source(SourceProfile::periodic("a", 0.1).with_dropouts(0.5));

        let count = generate_events(&config).len();
        assert!(count > 300 && count < 700, "count = {}", count);
    }

    #[test]
    fn test_clock_step_moves_backwards() {
        let config = ScenarioConfig::new()
            .with_start_time(0.0)
            .with_duration_secs(6.0)
            .with_seed(1)
            .with_source(SourceProfile::periodic("a", 1.0).with_clock_step(3.0, -2.5));

        let times: Vec<f64> = generate_events(&config)
            .for_source("a")
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(times.len(), 6);
        assert!((times[2] - 2.0).abs() < 1e-9);
        assert!((times[3] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_updates_are_bounded() {
        let config = ScenarioConfig::new()
            .with_start_time(0.0)
            .with_duration_secs(1.0)
            .with_seed(1)
            .with_source(SourceProfile::periodic("a", 1e-300));
        assert_eq!(generate_events(&config).len(), MAX_UPDATES_PER_SOURCE);
    }

    #[test]
    fn test_degenerate_period() {
        let config = ScenarioConfig::new()
            .with_seed(1)
            .with_source(SourceProfile::periodic("a", 0.0));
        assert!(generate_events(&config).is_empty());
    }
}
