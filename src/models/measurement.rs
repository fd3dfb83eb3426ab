//! Measurement models
//!
//! One `Measurement` per execution, one `CaseResult` per test case.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a single ebe invocation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Wall clock time in seconds
    pub elapsed_secs: f64,
    /// CPU usage in percent (may exceed 100 on multiple cores)
    pub cpu_percent: f64,
    /// Compilation precision in percent, compile cases only
    pub precision_percent: Option<f64>,
}

impl Measurement {
    pub fn new(elapsed_secs: f64, cpu_percent: f64) -> Self {
        Self {
            elapsed_secs,
            cpu_percent,
            precision_percent: None,
        }
    }

    pub fn with_precision(mut self, precision_percent: f64) -> Self {
        self.precision_percent = Some(precision_percent);
        self
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s cpu={:.0}%", self.elapsed_secs, self.cpu_percent)?;
        if let Some(p) = self.precision_percent {
            write!(f, " precision={p:.2}%")?;
        }
        Ok(())
    }
}

/// All measurements of one test case, in invocation order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub times: Vec<f64>,
    #[serde(rename = "cpus")]
    pub cpu_usages: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precisions: Vec<f64>,
}

impl CaseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one measurement
    pub fn push(&mut self, measurement: &Measurement) {
        self.times.push(measurement.elapsed_secs);
        self.cpu_usages.push(measurement.cpu_percent);
        if let Some(p) = measurement.precision_percent {
            self.precisions.push(p);
        }
    }

    /// Number of recorded iterations
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Best precision reached over all iterations
    pub fn max_precision(&self) -> Option<f64> {
        self.precisions.iter().copied().reduce(f64::max)
    }

    /// Whether every compiled output matched the expected one at least once
    pub fn is_exact(&self) -> bool {
        self.max_precision().map(|p| p == 100.0).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut result = CaseResult::new();
        result.push(&Measurement::new(1.5, 90.0).with_precision(80.0));
        result.push(&Measurement::new(0.5, 99.0).with_precision(100.0));

        assert_eq!(result.len(), 2);
        assert_eq!(result.times, vec![1.5, 0.5]);
        assert_eq!(result.cpu_usages, vec![90.0, 99.0]);
        assert_eq!(result.max_precision(), Some(100.0));
        assert!(result.is_exact());
    }

    #[test]
    fn test_interpret_result_serialization() {
        let mut result = CaseResult::new();
        result.push(&Measurement::new(0.25, 50.0));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["times"][0], 0.25);
        assert_eq!(json["cpus"][0], 50.0);
        assert!(json.get("precisions").is_none());
        assert!(!result.is_exact());
    }

    #[test]
    fn test_measurement_display() {
        let m = Measurement::new(1.23, 45.0).with_precision(100.0);
        assert_eq!(m.to_string(), "1.23s cpu=45% precision=100.00%");
    }
}
