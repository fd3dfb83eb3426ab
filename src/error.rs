//! Error types for the benchmark pipeline
//!
//! Structural defects only skip the affected case directory unless
//! warnings are escalated. Every other error aborts the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Benchmark pipeline errors
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Invalid test case in {dir}: {defect}")]
    StructuralDefect { dir: PathBuf, defect: String },

    #[error("Could not parse {stream} output of {case}: {reason}")]
    Parse {
        case: String,
        stream: &'static str,
        reason: String,
    },

    #[error("{case} did not finish within {secs} seconds")]
    Timeout { case: String, secs: u64 },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BenchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type BenchResult<T> = std::result::Result<T, BenchError>;
