// Syncprof Testdata - Preset scenarios
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Ready-made scenarios.

use crate::profile::{ScenarioConfig, SourceProfile};

/// Names accepted by [`by_name`].
pub const PRESET_NAMES: &[&str] = &[
    "synchronized",
    "skewed",
    "mixed_rates",
    "clock_regression",
    "dropouts",
];

/// Two 10 Hz sources with small independent jitter.
pub fn synchronized() -> ScenarioConfig {
    ScenarioConfig::new()
        .with_duration_secs(60.0)
        .with_source(SourceProfile::periodic("bpm1", 0.1).with_jitter(0.001))
        .with_source(SourceProfile::periodic("bpm2", 0.1).with_jitter(0.001))
}

/// Three 10 Hz sources, the second lagging by 5 ms and the third leading by 20 ms.
pub fn skewed() -> ScenarioConfig {
    ScenarioConfig::new()
        .with_duration_secs(60.0)
        .with_source(SourceProfile::periodic("ref", 0.1).with_jitter(0.0005))
        .with_source(
            SourceProfile::periodic("lagging", 0.1)
                .with_jitter(0.0005)
                .with_offset(0.005),
        )
        .with_source(
            SourceProfile::periodic("leading", 0.1)
                .with_jitter(0.0005)
                .with_offset(-0.020),
        )
}

/// Sources at 1 Hz, 10 Hz and 50 Hz.
pub fn mixed_rates() -> ScenarioConfig {
    ScenarioConfig::new()
        .with_duration_secs(30.0)
        .with_source(SourceProfile::periodic("slow", 1.0))
        .with_source(SourceProfile::periodic("medium", 0.1).with_jitter(0.002))
        .with_source(SourceProfile::periodic("fast", 0.02).with_jitter(0.001))
}

/// Two 1 Hz sources; the second steps its clock back by 2.5 s after 10 s.
pub fn clock_regression() -> ScenarioConfig {
    ScenarioConfig::new()
        .with_duration_secs(20.0)
        .with_source(SourceProfile::periodic("primary", 1.0))
        .with_source(SourceProfile::periodic("secondary", 1.0).with_clock_step(10.0, -2.5))
}

/// Two 10 Hz sources, one missing a fifth of its updates.
pub fn dropouts() -> ScenarioConfig {
    ScenarioConfig::new()
        .with_duration_secs(60.0)
        .with_source(SourceProfile::periodic("steady", 0.1))
        .with_source(SourceProfile::periodic("flaky", 0.1).with_dropouts(0.2))
}

/// Look up a preset by name.
pub fn by_name(name: &str) -> Option<ScenarioConfig> {
    match name {
        "synchronized" => Some(synchronized()),
        "skewed" => Some(skewed()),
        "mixed_rates" => Some(mixed_rates()),
        "clock_regression" => Some(clock_regression()),
        "dropouts" => Some(dropouts()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_events;

    #[test]
    fn test_all_presets_resolve() {
        for name in PRESET_NAMES {
            let config = by_name(name).unwrap_or_else(|| panic!("missing preset {}", name));
            assert!(config.sources.len() >= 2, "{}", name);
        }
        assert!(by_name("nope").is_none());
    }

    #[test]
    fn test_skewed_offsets() {
        let log = generate_events(&skewed().with_seed(11).with_duration_secs(1.0));
        let first_ref = log.for_source("ref").next().unwrap();
        let first_lag = log.for_source("lagging").next().unwrap();
        assert!(first_lag.timestamp > first_ref.timestamp);
    }

    #[test]
    fn test_mixed_rates_counts() {
        let log = generate_events(&mixed_rates().with_seed(2));
        assert_eq!(log.for_source("slow").count(), 30);
        assert!(log.for_source("fast").count() > 1000);
    }
}
