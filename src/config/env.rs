//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Environment variable prefix
const ENV_PREFIX: &str = "EBE_BENCH";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Path to ebe from EBE_BENCH_EBE
    pub ebe: Option<String>,
    /// Helper script from EBE_BENCH_MEASURE
    pub measure_script: Option<String>,
    /// Iterations from EBE_BENCH_ITERATIONS
    pub iterations: Option<u32>,
    /// Timeout from EBE_BENCH_TIMEOUT
    pub timeout: Option<u64>,
    /// Compile fixtures from EBE_BENCH_COMPILE_DIR
    pub compile_dir: Option<String>,
    /// Interpret fixtures from EBE_BENCH_INTERPRET_DIR
    pub interpret_dir: Option<String>,
    /// Escalate mode from EBE_BENCH_WARNINGS_AS_ERRORS
    pub warnings_as_errors: Option<bool>,
    /// Report directory from EBE_BENCH_OUTPUT_DIR
    pub output_dir: Option<String>,
    /// Config file from EBE_BENCH_CONFIG
    pub config_file: Option<String>,
    /// Log level from EBE_BENCH_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Numeric variables that do not parse are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        Ok(Self {
            ebe: get("EBE"),
            measure_script: get("MEASURE"),
            iterations: parse_number("ITERATIONS", get("ITERATIONS"))?,
            timeout: parse_number("TIMEOUT", get("TIMEOUT"))?,
            compile_dir: get("COMPILE_DIR"),
            interpret_dir: get("INTERPRET_DIR"),
            warnings_as_errors: get("WARNINGS_AS_ERRORS").map(|v| parse_bool(&v)),
            output_dir: get("OUTPUT_DIR"),
            config_file: get("CONFIG"),
            log_level: get("LOG"),
        })
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.ebe.is_some()
            || self.measure_script.is_some()
            || self.iterations.is_some()
            || self.timeout.is_some()
            || self.compile_dir.is_some()
            || self.interpret_dir.is_some()
            || self.warnings_as_errors.is_some()
            || self.output_dir.is_some()
            || self.config_file.is_some()
            || self.log_level.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_EBE:                {:?}", ENV_PREFIX, self.ebe);
        println!("  {}_MEASURE:            {:?}", ENV_PREFIX, self.measure_script);
        println!("  {}_ITERATIONS:         {:?}", ENV_PREFIX, self.iterations);
        println!("  {}_TIMEOUT:            {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_COMPILE_DIR:        {:?}", ENV_PREFIX, self.compile_dir);
        println!("  {}_INTERPRET_DIR:      {:?}", ENV_PREFIX, self.interpret_dir);
        println!("  {}_WARNINGS_AS_ERRORS: {:?}", ENV_PREFIX, self.warnings_as_errors);
        println!("  {}_OUTPUT_DIR:         {:?}", ENV_PREFIX, self.output_dir);
        println!("  {}_CONFIG:             {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_LOG:                {:?}", ENV_PREFIX, self.log_level);
    }
}

fn parse_number<T>(name: &str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {ENV_PREFIX}_{name}: '{v}'"))
        })
        .transpose()
}

/// Parse a boolean environment value
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Print all EBE_BENCH environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_EBE                 Path to the ebe executable");
    println!("  {ENV_PREFIX}_MEASURE             Measurement helper script");
    println!("  {ENV_PREFIX}_ITERATIONS          Iterations per test case");
    println!("  {ENV_PREFIX}_TIMEOUT             Timeout per invocation in seconds");
    println!("  {ENV_PREFIX}_COMPILE_DIR         Compile case fixtures");
    println!("  {ENV_PREFIX}_INTERPRET_DIR       Interpret case fixtures");
    println!("  {ENV_PREFIX}_WARNINGS_AS_ERRORS  Abort on invalid fixtures (true/false)");
    println!("  {ENV_PREFIX}_OUTPUT_DIR          Directory for benchmark reports");
    println!("  {ENV_PREFIX}_CONFIG              Path to configuration file");
    println!("  {ENV_PREFIX}_LOG                 Log level (trace, debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_EBE=../ebe/build/ebe");
    println!("  export {ENV_PREFIX}_ITERATIONS=10");
    println!("  ebe-bench run --compile");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.ebe.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_from_lookup() {
        let config = EnvConfig::from_lookup(lookup(&[
            ("EBE_BENCH_EBE", "../ebe/build/ebe"),
            ("EBE_BENCH_ITERATIONS", " 12 "),
            ("EBE_BENCH_TIMEOUT", "90"),
            ("EBE_BENCH_WARNINGS_AS_ERRORS", "Yes"),
        ]))
        .unwrap();

        assert_eq!(config.ebe.as_deref(), Some("../ebe/build/ebe"));
        assert_eq!(config.iterations, Some(12));
        assert_eq!(config.timeout, Some(90));
        assert_eq!(config.warnings_as_errors, Some(true));
        assert!(config.has_any());
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = EnvConfig::from_lookup(lookup(&[("EBE_BENCH_ITERATIONS", "many")])).unwrap_err();
        assert!(err.to_string().contains("EBE_BENCH_ITERATIONS"));
    }

    #[test]
    fn test_bool_parsing() {
        let config = EnvConfig::from_lookup(lookup(&[("EBE_BENCH_WARNINGS_AS_ERRORS", "0")])).unwrap();
        assert_eq!(config.warnings_as_errors, Some(false));
    }
}
