//! Benchmark results module
//!
//! Report model, persistence and sample statistics.

mod report;
mod stats;
mod storage;

pub use report::{BenchmarkInfo, BenchmarkReport, EbeInfo, KindResults, PlatformInfo};
pub use stats::{median, SampleStats};
pub use storage::ResultsStorage;
