//! Sample statistics
//!
//! Summaries of repeated measurements used by the charts.

use serde::{Deserialize, Serialize};

/// Calculate percentile value from sorted array
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let fraction = idx - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

/// Median of unsorted samples, mean of the two middle values for even counts
pub fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile(&sorted, 50.0)
}

/// Summary statistics of a sample set
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// First quartile
    pub q1: f64,
    pub median: f64,
    /// Third quartile
    pub q3: f64,
}

impl SampleStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let variance =
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / sorted.len() as f64;

        Self {
            count: sorted.len(),
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
            q1: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            q3: percentile(&sorted, 75.0),
        }
    }

    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Whisker ends at 1.5 IQR, clamped to the observed range
    pub fn whiskers(&self, sorted: &[f64]) -> (f64, f64) {
        let lo_fence = self.q1 - 1.5 * self.iqr();
        let hi_fence = self.q3 + 1.5 * self.iqr();
        let lo = sorted
            .iter()
            .copied()
            .find(|v| *v >= lo_fence)
            .unwrap_or(self.min);
        let hi = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= hi_fence)
            .unwrap_or(self.max);
        (lo, hi)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "n={} min={:.3}s median={:.3}s mean={:.3}s max={:.3}s std={:.3}s",
            self.count, self.min, self.median, self.mean, self.max, self.std_dev
        )
    }
}
