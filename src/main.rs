//! Ebe Bench - Benchmark harness for the Ebe compiler/interpreter
//!
//! Discovers benchmark fixtures, runs every case through a timing helper a
//! fixed number of times and writes a JSON report. Reports can then be
//! rendered as text charts.
//!
//! ## Features
//!
//! - Compile (`ebec`) and interpret (`ebei`) benchmark suites
//! - Per-iteration wall time, CPU usage and compile precision
//! - Platform metadata in every report
//! - Bar charts, box plots and multi-report comparisons
//! - Plots of ebe analytics (`-a`) output
//!
//! ## Usage
//!
//! ```bash
//! # Run both suites with ebe from a sibling checkout
//! ebe-bench run --ebe ../ebe/build/ebe
//!
//! # Compile cases only, 10 iterations, abort on broken fixtures
//! ebe-bench run -c -n 10 -W
//!
//! # Plot one or more reports
//! ebe-bench plot benchmark_20261019_120000_0042.json --boxplot
//!
//! # Plot an analytics file
//! ebe-bench analytics data.csv graph.txt generation fitness
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod analytics;
mod cli;
mod config;
mod error;
mod executor;
mod fixtures;
mod models;
mod output;
mod results;
mod utils;

use cli::Args;
use config::{AppConfig, EnvConfig};
use executor::{ebe_version, Aggregator, CaseRunner};
use fixtures::FixtureScanner;
use models::CaseKind;
use output::{ChartKind, ChartRenderer};
use results::{BenchmarkInfo, BenchmarkReport, EbeInfo, PlatformInfo, ResultsStorage};
use utils::{init_logger, LogLevel, Timer};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load()?;

    let level = if args.verbose {
        LogLevel::from_verbose(true)
    } else {
        env.log_level
            .as_deref()
            .and_then(LogLevel::from_str)
            .unwrap_or(LogLevel::Info)
    };
    init_logger(level);

    match args.command {
        cli::Command::Run(run_args) => {
            run_benchmark(run_args, &env).await?;
        }
        cli::Command::Plot(plot_args) => {
            plot_results(plot_args)?;
        }
        cli::Command::Analytics(analytics_args) => {
            plot_analytics(analytics_args)?;
        }
        cli::Command::List(list_args) => {
            list_cases(list_args, &env)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &env)?;
        }
    }

    Ok(())
}

/// Layer file, environment and command line settings
fn load_config(path: Option<&Path>, env: &EnvConfig) -> Result<AppConfig> {
    let env_path = env.config_file.as_ref().map(PathBuf::from);
    let path = path.or(env_path.as_deref());
    Ok(AppConfig::load_or_default(path)?.with_env(env))
}

fn apply_fixture_args(config: &mut AppConfig, args: &cli::FixtureArgs) {
    if let Some(dir) = &args.compile_dir {
        config.compile_dir = dir.clone();
    }
    if let Some(dir) = &args.interpret_dir {
        config.interpret_dir = dir.clone();
    }
    if args.warnings_as_errors {
        config.warnings_as_errors = true;
    }
}

fn fixture_root(config: &AppConfig, kind: CaseKind) -> &Path {
    match kind {
        CaseKind::Compile => &config.compile_dir,
        CaseKind::Interpret => &config.interpret_dir,
    }
}

async fn run_benchmark(args: cli::RunArgs, env: &EnvConfig) -> Result<()> {
    let mut config = load_config(args.fixtures.config.as_deref(), env)?;
    apply_fixture_args(&mut config, &args.fixtures);
    if let Some(ebe) = args.ebe {
        config.ebe = ebe;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(script) = args.measure {
        config.measure_script = script;
    }
    if let Some(shell) = args.shell {
        config.shell = shell;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    config.validate()?;

    let kinds = args.fixtures.kinds();
    let scanner = FixtureScanner::new(config.scan_config());
    let aggregator = Aggregator::new(CaseRunner::new(config.runner_config()), config.iterations)?;

    let version = ebe_version(&config.ebe).await;
    info!(
        "Benchmarking ebe {} ({}) with {} iteration(s), timeout {}s",
        version,
        config.ebe.display(),
        aggregator.iterations(),
        config.timeout_secs
    );

    let mut report = BenchmarkReport::new(
        EbeInfo {
            path: config.ebe.display().to_string(),
            version,
        },
        BenchmarkInfo::new(config.iterations, config.timeout_secs),
        PlatformInfo::detect(),
    );

    let mut suites = Vec::new();
    for kind in kinds {
        let root = fixture_root(&config, kind);
        let outcome = scanner.scan(root, kind)?;
        if !outcome.warnings.is_empty() {
            warn!(
                "Skipped {} invalid {} fixture(s) in {}",
                outcome.warnings.len(),
                kind,
                root.display()
            );
        }
        suites.push((kind, outcome.cases));
    }

    let timer = Timer::start("benchmark run");
    for (kind, cases) in suites {
        info!("Running {} {} case(s)", cases.len(), kind);
        let results = aggregator.run(&cases).await?;
        report.set_results(kind, results);
    }
    let elapsed = timer.stop();

    let path = match &args.output {
        Some(path) => {
            ResultsStorage::save_to(&report, path)?;
            path.clone()
        }
        None => ResultsStorage::new(&config.output_dir).save(&report)?,
    };
    if let Some(csv) = &args.csv {
        ResultsStorage::export_csv(&report, csv)?;
        println!("✓ Measurements exported: {}", csv.display());
    }

    println!(
        "✓ {} case(s) benchmarked in {:.1}s",
        report.case_count(),
        elapsed.as_secs_f64()
    );
    println!("✓ Report saved: {}", path.display());
    Ok(())
}

fn plot_results(args: cli::PlotArgs) -> Result<()> {
    let mut renderer = ChartRenderer::new(args.width);
    if args.no_platform_info {
        renderer = renderer.no_platform_info();
    }

    let reports = args
        .files
        .iter()
        .map(|f| -> Result<(String, BenchmarkReport)> {
            Ok((f.display().to_string(), ResultsStorage::load(f)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let chart = if args.boxplot {
        ChartKind::Box
    } else {
        ChartKind::Bar
    };

    let output = match reports.as_slice() {
        [(_, report)] => renderer.render(report, chart),
        _ => renderer.comparison(&reports),
    };

    print!("{output}");
    std::fs::write(&args.output, &output)
        .map_err(|e| error::BenchError::io(&args.output, e))?;
    println!("✓ Graph saved: {}", args.output.display());
    Ok(())
}

fn plot_analytics(args: cli::AnalyticsArgs) -> Result<()> {
    let series = analytics::load(&args.data)?;
    if series.is_empty() {
        bail!("No data points in {}", args.data.display());
    }

    let chart = analytics::AnalyticsChart {
        width: args.width,
        height: args.height,
        ..analytics::AnalyticsChart::new()
    }
    .title(args.title)
    .xlabel(args.xlabel)
    .ylabel(args.ylabel)
    .render(&series);

    print!("{chart}");
    if let Some(output) = &args.output {
        std::fs::write(output, &chart).map_err(|e| error::BenchError::io(output, e))?;
        println!("✓ Graph saved: {}", output.display());
    }
    Ok(())
}

fn list_cases(args: cli::ListArgs, env: &EnvConfig) -> Result<()> {
    let mut config = load_config(args.fixtures.config.as_deref(), env)?;
    apply_fixture_args(&mut config, &args.fixtures);
    let scanner = FixtureScanner::new(config.scan_config());

    for kind in args.fixtures.kinds() {
        let root = fixture_root(&config, kind);
        let outcome = scanner.scan(root, kind)?;

        println!("\n{} cases ({}) in {}", kind.title(), kind.report_key(), root.display());
        println!("──────────────────────────────────────────────────────────────────────");
        for case in &outcome.cases {
            if args.detailed {
                println!("  {} ({})", case.name(), case.dir().display());
                for path in case.paths() {
                    println!("    {}", path.display());
                }
                if !case.args().is_empty() {
                    println!("    args: {}", case.args());
                }
            } else {
                println!("  {}", case.name());
            }
        }
        for warning in &outcome.warnings {
            println!("  ✗ {}: {}", warning.dir.display(), warning.defect);
        }
        println!(
            "\n  {} case(s), {} skipped",
            outcome.cases.len(),
            outcome.warnings.len()
        );
    }
    Ok(())
}

fn manage_config(args: cli::ConfigArgs, env: &EnvConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show { config } => {
            let config = load_config(config.as_deref(), env)?;
            println!("{}", serde_yaml::to_string(&config)?);
            if env.has_any() {
                env.print_summary();
            }
        }

        cli::ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }
            AppConfig::default().save(&path)?;
            println!("✓ Configuration file created: {}", path.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
        }
    }
    Ok(())
}
