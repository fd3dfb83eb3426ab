//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::CaseKind;

/// Benchmark harness and result plotters for the Ebe compiler/interpreter
#[derive(Parser, Debug)]
#[command(name = "ebe-bench")]
#[command(version)]
#[command(about = "Run and plot Ebe benchmarks")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run compile and/or interpret benchmarks
    Run(RunArgs),

    /// Plot benchmark results
    Plot(PlotArgs),

    /// Plot ebe analytics (-a) output
    Analytics(AnalyticsArgs),

    /// List discovered benchmark cases
    List(ListArgs),

    /// Show or create configuration
    Config(ConfigArgs),
}

/// Fixture selection shared by `run` and `list`
#[derive(Parser, Debug)]
pub struct FixtureArgs {
    /// Select compile cases
    #[arg(short, long)]
    pub compile: bool,

    /// Select interpret cases
    #[arg(short, long)]
    pub interpret: bool,

    /// Directory with compile cases
    #[arg(long)]
    pub compile_dir: Option<PathBuf>,

    /// Directory with interpret cases
    #[arg(long)]
    pub interpret_dir: Option<PathBuf>,

    /// Abort on invalid fixture directories instead of skipping them
    #[arg(short = 'W', long)]
    pub warnings_as_errors: bool,

    /// Configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl FixtureArgs {
    /// Selected kinds; neither flag means both
    pub fn kinds(&self) -> Vec<CaseKind> {
        match (self.compile, self.interpret) {
            (true, false) => vec![CaseKind::Compile],
            (false, true) => vec![CaseKind::Interpret],
            _ => CaseKind::all(),
        }
    }
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub fixtures: FixtureArgs,

    /// Path to the ebe executable
    #[arg(long)]
    pub ebe: Option<PathBuf>,

    /// Number of iterations per case
    #[arg(short = 'n', long)]
    pub iterations: Option<u32>,

    /// Timeout per invocation in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Measurement helper script
    #[arg(long)]
    pub measure: Option<PathBuf>,

    /// Interpreter used to run the measurement helper
    #[arg(long)]
    pub shell: Option<String>,

    /// Write the report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for reports named after the run ID
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Also export every measurement as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Arguments for plot command
#[derive(Parser, Debug)]
pub struct PlotArgs {
    /// Benchmark result files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Generate a box plot instead of a bar graph
    #[arg(short, long)]
    pub boxplot: bool,

    /// Output file
    #[arg(short, long, default_value = "benchmark_graph.txt")]
    pub output: PathBuf,

    /// Do not print platform information
    #[arg(short = 'i', long)]
    pub no_platform_info: bool,

    /// Chart width in characters
    #[arg(long, default_value = "50")]
    pub width: usize,
}

/// Arguments for analytics command
#[derive(Parser, Debug)]
pub struct AnalyticsArgs {
    /// Analytics CSV file
    pub data: PathBuf,

    /// Output file
    pub output: Option<PathBuf>,

    /// X axis label
    pub xlabel: Option<String>,

    /// Y axis label
    pub ylabel: Option<String>,

    /// Chart title
    pub title: Option<String>,

    /// Chart width in characters
    #[arg(long, default_value = "60")]
    pub width: usize,

    /// Chart height in lines
    #[arg(long, default_value = "16")]
    pub height: usize,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub fixtures: FixtureArgs,

    /// Show role files of each case
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Destination (YAML or JSON by extension)
        #[arg(default_value = "ebe-bench.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show supported environment variables
    Env,
}
