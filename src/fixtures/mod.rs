//! Benchmark fixture discovery
//!
//! Finds compile and interpret test cases in fixture directories.

mod scanner;

pub use scanner::{FixtureScanner, ScanConfig};
