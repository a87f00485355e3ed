//! Population statistics primitives.

/// Mean, extrema and population standard deviation of a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation (divisor = count).
    pub std: f64,
}

impl Summary {
    /// Summarize a sequence, or `None` if it is empty.
    ///
    /// Two passes over the values: the mean first, then the squared
    /// deviations from it.
    pub fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Clone,
    {
        let values = values.into_iter();

        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.clone() {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        if count == 0 {
            return None;
        }

        let n = count as f64;
        let mean = sum / n;
        let sum_sq: f64 = values.map(|v| (v - mean).powi(2)).sum();

        Some(Self {
            count,
            mean,
            min,
            max,
            std: (sum_sq / n).sqrt(),
        })
    }
}
