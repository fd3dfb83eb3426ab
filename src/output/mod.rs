//! Output module
//!
//! Text rendering of benchmark reports.

mod formatter;

pub use formatter::{ChartKind, ChartRenderer};
