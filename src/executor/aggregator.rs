//! Measurement aggregation
//!
//! Runs every test case a fixed number of times, one invocation after the
//! other, and collects the measurements per case name.

use std::collections::BTreeMap;
use tracing::info;

use super::runner::CaseRunner;
use crate::error::{BenchError, BenchResult};
use crate::models::{CaseResult, Measurement, TestCase};
use crate::results::SampleStats;
use crate::utils::Timer;

/// Something that can measure one iteration of a test case
#[allow(async_fn_in_trait)]
pub trait MeasureCase {
    async fn measure(&self, case: &TestCase) -> BenchResult<Measurement>;
}

impl MeasureCase for CaseRunner {
    async fn measure(&self, case: &TestCase) -> BenchResult<Measurement> {
        self.run(case).await
    }
}

/// Sequential benchmark aggregator
pub struct Aggregator<M> {
    measurer: M,
    iterations: u32,
}

impl<M: MeasureCase> Aggregator<M> {
    pub fn new(measurer: M, iterations: u32) -> BenchResult<Self> {
        if iterations == 0 {
            return Err(BenchError::Config(
                "iteration count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            measurer,
            iterations,
        })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Run all cases, stopping at the first error
    pub async fn run(&self, cases: &[TestCase]) -> BenchResult<BTreeMap<String, CaseResult>> {
        let mut results = BTreeMap::new();
        let total = cases.len();

        for (idx, case) in cases.iter().enumerate() {
            let timer = Timer::start(case.name());
            let result = self.run_case(case, idx + 1, total).await?;
            info!(
                "[{}/{}] {} done, {} iteration(s) in {:.2}s: {}",
                idx + 1,
                total,
                case.name(),
                result.len(),
                timer.stop().as_secs_f64(),
                SampleStats::from_samples(&result.times).format_summary()
            );
            results.insert(case.name().to_string(), result);
        }

        Ok(results)
    }

    async fn run_case(&self, case: &TestCase, position: usize, total: usize) -> BenchResult<CaseResult> {
        let mut result = CaseResult::new();

        for iteration in 1..=self.iterations {
            let measurement = self.measurer.measure(case).await?;
            info!(
                "[{}/{}] {} iteration {}/{}: {}",
                position,
                total,
                case.name(),
                iteration,
                self.iterations,
                measurement
            );
            result.push(&measurement);
        }

        Ok(result)
    }
}
