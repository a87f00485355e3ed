//! Per-source update frequency statistics.

use crate::stats::Summary;
use crate::window::SampleWindow;

/// Frequency statistics of one source, in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyStats {
    /// Frequency derived from the two most recent arrivals.
    pub instant: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Number of frequencies the aggregates were taken over.
    pub samples: usize,
}

/// Reduces a [`SampleWindow`] to [`FrequencyStats`].
///
/// Aggregates are recomputed over the whole window on every call; windows
/// hold at most a few hundred values.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyStatsCalculator;

impl FrequencyStatsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute frequency statistics, or `None` while fewer than two
    /// arrivals are in the window.
    pub fn compute(&self, window: &SampleWindow) -> Option<FrequencyStats> {
        let instant = window.last_frequency()?;
        let summary = Summary::of(window.frequencies().iter().copied())?;

        Some(FrequencyStats {
            instant,
            avg: summary.mean,
            min: summary.min,
            max: summary.max,
            std: summary.std,
            samples: summary.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeltaPolicy;
    use approx::assert_relative_eq;

    fn window_with(timestamps: &[f64]) -> SampleWindow {
        let mut w = SampleWindow::new(100, DeltaPolicy::RecordZero);
        for &t in timestamps {
            w.record_arrival(t);
        }
        w
    }

    #[test]
    fn test_empty_window() {
        let calc = FrequencyStatsCalculator::new();
        assert!(calc.compute(&window_with(&[])).is_none());
    }

    #[test]
    fn test_single_arrival() {
        let calc = FrequencyStatsCalculator::new();
        assert!(calc.compute(&window_with(&[42.0])).is_none());
    }

    #[test]
    fn test_instant_is_last_delta() {
        let calc = FrequencyStatsCalculator::new();
        let stats = calc.compute(&window_with(&[0.0, 1.0, 1.5, 1.75])).unwrap();
        assert_relative_eq!(stats.instant, 4.0);
        assert_eq!(stats.samples, 3);
    }

    #[test]
    fn test_aggregates() {
        let calc = FrequencyStatsCalculator::new();
        // Frequencies: 1, 2, 4
        let stats = calc.compute(&window_with(&[0.0, 1.0, 1.5, 1.75])).unwrap();
        assert_relative_eq!(stats.avg, 7.0 / 3.0);
        assert_relative_eq!(stats.min, 1.0);
        assert_relative_eq!(stats.max, 4.0);
        let var = ((1.0f64 - 7.0 / 3.0).powi(2)
            + (2.0f64 - 7.0 / 3.0).powi(2)
            + (4.0f64 - 7.0 / 3.0).powi(2))
            / 3.0;
        assert_relative_eq!(stats.std, var.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_frequency_included() {
        let calc = FrequencyStatsCalculator::new();
        let stats = calc.compute(&window_with(&[5.0, 5.0])).unwrap();
        assert_eq!(stats.instant, 0.0);
        assert_eq!(stats.avg, 0.0);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let calc = FrequencyStatsCalculator::new();
        let w = window_with(&[0.0, 0.1, 0.3, 0.35]);
        assert_eq!(calc.compute(&w), calc.compute(&w));
    }
}
