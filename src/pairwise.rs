//! Pairwise timestamp offset statistics.
//!
//! Aggregates pair the two windows **by position**: `a.timestamps[k]` is
//! compared with `b.timestamps[k]` for every `k` both windows have. This is
//! not a time alignment. Once two sources update at different rates their
//! windows drift out of phase and the aggregates lose meaning; `current`
//! (latest against latest) stays meaningful regardless.

use crate::stats::Summary;
use crate::window::SampleWindow;

/// Offset statistics for an ordered pair `(a, b)`, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDiffStats {
    /// Latest timestamp of `a` minus latest timestamp of `b`.
    pub current: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation of the paired offsets.
    pub std: f64,
    /// Number of positionally paired timestamps.
    pub paired: usize,
}

/// Reduces two [`SampleWindow`]s to [`PairDiffStats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseDiffCalculator;

impl PairwiseDiffCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute offset statistics of `a` relative to `b`, or `None` if
    /// either window has no arrivals.
    pub fn compute(&self, a: &SampleWindow, b: &SampleWindow) -> Option<PairDiffStats> {
        let current = a.last_timestamp()? - b.last_timestamp()?;

        let diffs = a
            .timestamps()
            .iter()
            .zip(b.timestamps().iter())
            .map(|(ta, tb)| ta - tb);
        let summary = Summary::of(diffs)?;

        Some(PairDiffStats {
            current,
            avg: summary.mean,
            min: summary.min,
            max: summary.max,
            std: summary.std,
            paired: summary.count,
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
    fn test_either_empty() {
        let calc = PairwiseDiffCalculator::new();
        let empty = window_with(&[]);
        let one = window_with(&[1.0]);
        assert!(calc.compute(&empty, &one).is_none());
        assert!(calc.compute(&one, &empty).is_none());
        assert!(calc.compute(&empty, &empty).is_none());
    }

    #[test]
    fn test_single_arrival_each() {
        let calc = PairwiseDiffCalculator::new();
        let stats = calc
            .compute(&window_with(&[10.2]), &window_with(&[10.0]))
            .unwrap();
        assert_relative_eq!(stats.current, 0.2, epsilon = 1e-12);
        assert_relative_eq!(stats.avg, 0.2, epsilon = 1e-12);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.paired, 1);
    }

    #[test]
    fn test_positional_pairing() {
        let calc = PairwiseDiffCalculator::new();
        let a = window_with(&[1.0, 2.0, 3.0]);
        let b = window_with(&[1.1, 2.3]);
        let stats = calc.compute(&a, &b).unwrap();

        assert_eq!(stats.paired, 2);
        assert_relative_eq!(stats.avg, -0.2, epsilon = 1e-12);
        assert_relative_eq!(stats.min, -0.3, epsilon = 1e-12);
        assert_relative_eq!(stats.max, -0.1, epsilon = 1e-12);
        assert_relative_eq!(stats.std, 0.1, epsilon = 1e-12);
        // Latest against latest, not the last paired index.
        assert_relative_eq!(stats.current, 3.0 - 2.3, epsilon = 1e-12);
    }

    #[test]
    fn test_reversed_pair_negates() {
        let calc = PairwiseDiffCalculator::new();
        let a = window_with(&[1.0, 2.0, 3.0]);
        let b = window_with(&[1.1, 2.3]);
        let ab = calc.compute(&a, &b).unwrap();
        let ba = calc.compute(&b, &a).unwrap();

        assert_relative_eq!(ab.current, -ba.current);
        assert_relative_eq!(ab.avg, -ba.avg);
        assert_relative_eq!(ab.min, -ba.max);
        assert_relative_eq!(ab.std, ba.std);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let calc = PairwiseDiffCalculator::new();
        let a = window_with(&[1.0, 2.0]);
        let b = window_with(&[1.5, 2.5, 3.5]);
        assert_eq!(calc.compute(&a, &b), calc.compute(&a, &b));
    }
}
