//! Benchmark report model
//!
//! The JSON document written after a benchmark run and read back by the
//! plotter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tracing::debug;

use crate::models::{CaseKind, CaseResult};

/// Results of one case kind, keyed by case name
pub type KindResults = BTreeMap<String, CaseResult>;

/// Benchmarked executable
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EbeInfo {
    pub path: String,
    pub version: String,
}

/// Benchmark run metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkInfo {
    /// Unique run ID
    pub id: String,
    /// When the run started
    pub date: DateTime<Utc>,
    /// Iterations per test case
    pub iterations: u32,
    /// Per-invocation timeout in seconds
    pub timeout: u64,
    /// Version of this tool
    pub tool_version: String,
}

impl BenchmarkInfo {
    pub fn new(iterations: u32, timeout: u64) -> Self {
        Self {
            id: generate_run_id(),
            date: Utc::now(),
            iterations,
            timeout,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Processor information
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CpuInfo {
    pub model: String,
    #[serde(default)]
    pub cores: usize,
    /// Maximum frequency in MHz
    pub freq_max: f64,
}

/// Memory information
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total memory in bytes
    pub size: u64,
}

/// Machine the benchmark ran on
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os: String,
    #[serde(default)]
    pub arch: String,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu: CpuInfo {
                model: "unknown".to_string(),
                cores: std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1),
                freq_max: 0.0,
            },
            memory: MemoryInfo::default(),
        }
    }
}

impl PlatformInfo {
    /// Best-effort detection, unknown fields keep their defaults
    pub fn detect() -> Self {
        let mut info = Self::default();

        if let Ok(content) = fs::read_to_string("/etc/os-release") {
            if let Some(name) = parse_os_release(&content) {
                info.os = name;
            }
        }

        if let Ok(content) = fs::read_to_string("/proc/cpuinfo") {
            let (model, mhz) = parse_cpuinfo(&content);
            if let Some(model) = model {
                info.cpu.model = model;
            }
            if let Some(mhz) = mhz {
                info.cpu.freq_max = mhz;
            }
        }

        // cpufreq reports kHz and is more accurate than the current clock in cpuinfo
        if let Ok(content) = fs::read_to_string("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq") {
            if let Ok(khz) = content.trim().parse::<f64>() {
                info.cpu.freq_max = khz / 1000.0;
            }
        }

        if let Ok(content) = fs::read_to_string("/proc/meminfo") {
            if let Some(size) = parse_meminfo(&content) {
                info.memory.size = size;
            }
        }

        debug!("Detected platform: {:?}", info);
        info
    }

    /// Text printed under charts
    pub fn describe(&self) -> String {
        format!(
            "Processor: {} @ {} MHz\nRam: {:.2} GB\nOS: {}",
            self.cpu.model,
            self.cpu.freq_max,
            self.memory.size as f64 / 1e9,
            self.os
        )
    }
}

/// `PRETTY_NAME` from os-release
fn parse_os_release(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|l| l.strip_prefix("PRETTY_NAME="))
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

/// Model name and highest `cpu MHz` from /proc/cpuinfo
fn parse_cpuinfo(content: &str) -> (Option<String>, Option<f64>) {
    let mut model = None;
    let mut mhz: Option<f64> = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "model name" if model.is_none() => model = Some(value.trim().to_string()),
            "cpu MHz" => {
                if let Ok(v) = value.trim().parse::<f64>() {
                    mhz = Some(mhz.map_or(v, |m| m.max(v)));
                }
            }
            _ => {}
        }
    }

    (model, mhz)
}

/// `MemTotal` from /proc/meminfo, in bytes
fn parse_meminfo(content: &str) -> Option<u64> {
    let line = content.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

/// Results of both case kinds, `None` when a kind was not run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResultsByKind {
    #[serde(default)]
    pub ebec: Option<KindResults>,
    #[serde(default)]
    pub ebei: Option<KindResults>,
}

/// A complete benchmark report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub ebe: EbeInfo,
    pub benchmark: BenchmarkInfo,
    pub platform: PlatformInfo,
    pub results: ResultsByKind,
}

impl BenchmarkReport {
    pub fn new(ebe: EbeInfo, benchmark: BenchmarkInfo, platform: PlatformInfo) -> Self {
        Self {
            ebe,
            benchmark,
            platform,
            results: ResultsByKind::default(),
        }
    }

    pub fn set_results(&mut self, kind: CaseKind, results: KindResults) {
        match kind {
            CaseKind::Compile => self.results.ebec = Some(results),
            CaseKind::Interpret => self.results.ebei = Some(results),
        }
    }

    pub fn results(&self, kind: CaseKind) -> Option<&KindResults> {
        match kind {
            CaseKind::Compile => self.results.ebec.as_ref(),
            CaseKind::Interpret => self.results.ebei.as_ref(),
        }
    }

    /// Kinds present in this report, compile first
    pub fn kinds(&self) -> Vec<CaseKind> {
        CaseKind::all()
            .into_iter()
            .filter(|k| self.results(*k).is_some())
            .collect()
    }

    /// Chart title
    pub fn title(&self) -> String {
        format!("Ebe {} benchmarks", self.ebe.version)
    }

    /// Total number of measured cases
    pub fn case_count(&self) -> usize {
        self.kinds()
            .into_iter()
            .filter_map(|k| self.results(k))
            .map(|r| r.len())
            .sum()
    }
}

/// Generate unique run ID
fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}
