//! Benchmark execution engine
//!
//! Runs test cases through the measurement helper and aggregates the results.

mod aggregator;
mod parser;
mod runner;

pub use aggregator::Aggregator;
pub use runner::{ebe_version, CaseRunner, RunnerConfig};
