//! Configuration module
//!
//! Handles loading, layering and validating configuration. Precedence is
//! command line, then environment, then config file, then defaults.

mod env;

pub use env::{print_env_help, EnvConfig};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::executor::RunnerConfig;
use crate::fixtures::ScanConfig;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &["./ebe-bench.yaml", "./ebe-bench.yml", "./.ebe-bench.yaml"];

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path to the ebe executable
    pub ebe: PathBuf,

    /// Measurement helper script
    pub measure_script: PathBuf,

    /// Interpreter used to run the helper
    pub shell: String,

    /// Iterations per test case
    pub iterations: u32,

    /// Time budget per invocation in seconds
    pub timeout_secs: u64,

    /// Extra seconds before a hung helper is killed
    pub grace_secs: u64,

    /// Compile case fixtures
    pub compile_dir: PathBuf,

    /// Interpret case fixtures
    pub interpret_dir: PathBuf,

    /// Abort on any invalid fixture directory
    pub warnings_as_errors: bool,

    /// Directory for benchmark reports
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ebe: PathBuf::from("ebe"),
            measure_script: PathBuf::from("scripts/measure.sh"),
            shell: "sh".to_string(),
            iterations: 5,
            timeout_secs: 60,
            grace_secs: 5,
            compile_dir: PathBuf::from("benchmarks/ebec"),
            interpret_dir: PathBuf::from("benchmarks/ebei"),
            warnings_as_errors: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        let user_config = dirs::config_dir().map(|d| d.join("ebe-bench").join("config.yaml"));

        CONFIG_LOCATIONS
            .iter()
            .map(PathBuf::from)
            .chain(user_config)
            .find(|p| p.exists())
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Load the explicit file, else a discovered one, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match Self::find() {
                Some(p) => {
                    tracing::debug!("Using config file {}", p.display());
                    Self::load(p)
                }
                None => Ok(Self::default()),
            },
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(ebe) = &env.ebe {
            self.ebe = PathBuf::from(ebe);
        }
        if let Some(script) = &env.measure_script {
            self.measure_script = PathBuf::from(script);
        }
        if let Some(iterations) = env.iterations {
            self.iterations = iterations;
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(dir) = &env.compile_dir {
            self.compile_dir = PathBuf::from(dir);
        }
        if let Some(dir) = &env.interpret_dir {
            self.interpret_dir = PathBuf::from(dir);
        }
        if let Some(strict) = env.warnings_as_errors {
            self.warnings_as_errors = strict;
        }
        if let Some(dir) = &env.output_dir {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ebe.as_os_str().is_empty() {
            bail!("Path to ebe must not be empty");
        }
        if self.iterations == 0 {
            bail!("Iteration count must be at least 1");
        }
        if self.timeout_secs == 0 {
            bail!("Timeout must be at least 1 second");
        }
        if self.shell.trim().is_empty() {
            bail!("Shell must not be empty");
        }
        if !self.measure_script.is_file() {
            bail!(
                "Measurement helper not found: {}",
                self.measure_script.display()
            );
        }
        Ok(())
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::new(&self.ebe)
            .with_measure_script(&self.measure_script)
            .with_shell(&self.shell)
            .with_timeout(self.timeout_secs)
            .with_grace(self.grace_secs)
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new().warnings_as_errors(self.warnings_as_errors)
    }
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
