//! Data models for Ebe benchmarking
//!
//! This module contains all data structures shared by the scanner, runner and reports.

mod measurement;
mod test_case;

pub use measurement::{CaseResult, Measurement};
pub use test_case::{CaseFiles, CaseKind, TestCase};
