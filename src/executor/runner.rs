//! Test case execution
//!
//! Runs ebe once per call through the measurement helper and parses what it
//! reports.
//!
//! The helper is invoked with a structured argument list, never through a
//! shell command string:
//!
//! ```text
//! <shell> <measure-script> --timeout <secs> -- <ebe> <ebe-args...>
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::parser::{parse_diagnostic, parse_precision};
use crate::error::{BenchError, BenchResult};
use crate::models::{CaseFiles, Measurement, TestCase};

/// Sink for the compiled program's output
#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// Case runner configuration
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Path to the ebe executable
    pub ebe: PathBuf,
    /// Measurement helper script
    pub measure_script: PathBuf,
    /// Interpreter used to run the helper
    pub shell: String,
    /// Time budget per invocation, enforced by the helper
    pub timeout_secs: u64,
    /// Extra time before the runner itself kills the helper
    pub grace_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            ebe: PathBuf::from("ebe"),
            measure_script: PathBuf::from("scripts/measure.sh"),
            shell: "sh".to_string(),
            timeout_secs: 60,
            grace_secs: 5,
        }
    }
}

impl RunnerConfig {
    pub fn new(ebe: impl Into<PathBuf>) -> Self {
        Self {
            ebe: ebe.into(),
            ..Default::default()
        }
    }

    pub fn with_measure_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.measure_script = path.into();
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_grace(mut self, secs: u64) -> Self {
        self.grace_secs = secs;
        self
    }

    /// Deadline after which the runner kills the helper
    pub fn hard_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.saturating_add(self.grace_secs))
    }
}

/// Runs single test case iterations
pub struct CaseRunner {
    config: RunnerConfig,
}

impl CaseRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Arguments passed to ebe for a test case.
    ///
    /// The `.args` string is split on whitespace without any shell quoting
    /// rules, so a quoted value containing spaces ends up as several
    /// arguments.
    pub fn ebe_args(&self, case: &TestCase) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        match case.files() {
            CaseFiles::Compile {
                input,
                expected_output,
            } => {
                args.push("-in".into());
                args.push(input.into());
                args.push("-out".into());
                args.push(expected_output.into());
                args.push("-o".into());
                args.push(NULL_DEVICE.into());
            }
            CaseFiles::Interpret { script, aux_inputs } => {
                args.push("-i".into());
                args.push(script.into());
                args.extend(aux_inputs.iter().map(OsString::from));
            }
        }

        args.push("-t".into());
        args.push(self.config.timeout_secs.to_string().into());
        args.extend(case.args().split_whitespace().map(OsString::from));
        args
    }

    /// Full helper command for a test case
    pub fn command(&self, case: &TestCase) -> Command {
        let mut cmd = Command::new(&self.config.shell);
        cmd.arg(&self.config.measure_script)
            .arg("--timeout")
            .arg(self.config.timeout_secs.to_string())
            .arg("--")
            .arg(&self.config.ebe)
            .args(self.ebe_args(case))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Execute one iteration of a test case
    pub async fn run(&self, case: &TestCase) -> BenchResult<Measurement> {
        debug!("Running {} with args {:?}", case, self.ebe_args(case));

        let output = tokio::time::timeout(self.config.hard_timeout(), self.command(case).output())
            .await
            .map_err(|_| BenchError::Timeout {
                case: case.name().to_string(),
                secs: self.config.hard_timeout().as_secs(),
            })?
            .map_err(|e| BenchError::Spawn {
                program: self.config.measure_script.display().to_string(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            warn!(
                "{} exited with {}, parsing its output anyway",
                case.name(),
                output.status
            );
        }

        parse_measurement(case, &stdout, &stderr)
    }
}

/// Build a measurement from the captured streams of one invocation
pub fn parse_measurement(case: &TestCase, stdout: &str, stderr: &str) -> BenchResult<Measurement> {
    let (elapsed, cpu) = parse_diagnostic(stderr).map_err(|reason| BenchError::Parse {
        case: case.name().to_string(),
        stream: "stderr",
        reason,
    })?;

    let measurement = Measurement::new(elapsed, cpu);

    match case.files() {
        CaseFiles::Compile { .. } => {
            let precision = parse_precision(stdout).map_err(|reason| BenchError::Parse {
                case: case.name().to_string(),
                stream: "stdout",
                reason,
            })?;
            Ok(measurement.with_precision(precision))
        }
        CaseFiles::Interpret { .. } => Ok(measurement),
    }
}

/// First line of `<ebe> --version`, or `unknown`
pub async fn ebe_version(ebe: &std::path::Path) -> String {
    let output = Command::new(ebe)
        .arg("--version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(Duration::from_secs(10), output).await {
        Ok(Ok(out)) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .lines()
            .next()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
        Ok(Ok(out)) => {
            debug!("{} --version exited with {}", ebe.display(), out.status);
            "unknown".to_string()
        }
        Ok(Err(e)) => {
            debug!("Failed to query ebe version: {}", e);
            "unknown".to_string()
        }
        Err(_) => {
            debug!("Timeout querying ebe version");
            "unknown".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn compile_case(dir: &Path) -> TestCase {
        TestCase::new(
            "caseA",
            dir,
            CaseFiles::Compile {
                input: dir.join("a.in"),
                expected_output: dir.join("a.out"),
            },
        )
    }

    fn interpret_case(dir: &Path) -> TestCase {
        TestCase::new(
            "sort",
            dir,
            CaseFiles::Interpret {
                script: dir.join("sort.ebel"),
                aux_inputs: vec![dir.join("a.txt"), dir.join("b.txt")],
            },
        )
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_compile_args() {
        let runner = CaseRunner::new(RunnerConfig::new("ebe").with_timeout(30));
        let case = compile_case(Path::new("fx/caseA")).with_args("fx/caseA/a.args", "-x-y 1");

        assert_eq!(
            strings(runner.ebe_args(&case)),
            vec![
                "-in",
                "fx/caseA/a.in",
                "-out",
                "fx/caseA/a.out",
                "-o",
                NULL_DEVICE,
                "-t",
                "30",
                "-x-y",
                "1"
            ]
        );
    }

    #[test]
    fn test_interpret_args() {
        let runner = CaseRunner::new(RunnerConfig::new("ebe").with_timeout(5));
        let case = interpret_case(Path::new("fx/sort"));

        assert_eq!(
            strings(runner.ebe_args(&case)),
            vec!["-i", "fx/sort/sort.ebel", "fx/sort/a.txt", "fx/sort/b.txt", "-t", "5"]
        );
    }

    #[test]
    fn test_parse_compile_measurement() {
        let case = compile_case(Path::new("fx/caseA"));
        let m = parse_measurement(&case, "Result: 100.00% match", "1.23,45%\n").unwrap();

        assert_eq!(m.elapsed_secs, 1.23);
        assert_eq!(m.cpu_percent, 45.0);
        assert_eq!(m.precision_percent, Some(100.0));
    }

    #[test]
    fn test_parse_interpret_ignores_stdout() {
        let case = interpret_case(Path::new("fx/sort"));
        let m = parse_measurement(&case, "no percentage here", "0.10,12%\n").unwrap();

        assert_eq!(m.precision_percent, None);
    }

    #[test]
    fn test_parse_missing_precision_is_fatal() {
        let case = compile_case(Path::new("fx/caseA"));
        let err = parse_measurement(&case, "done", "1.0,50%").unwrap_err();

        match err {
            BenchError::Parse { stream, .. } => assert_eq!(stream, "stdout"),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_hard_timeout() {
        let config = RunnerConfig::new("ebe").with_timeout(10).with_grace(2);
        assert_eq!(config.hard_timeout(), Duration::from_secs(12));
    }

    #[test]
    fn test_hard_timeout_saturates() {
        let config = RunnerConfig::new("ebe").with_timeout(u64::MAX).with_grace(5);
        assert_eq!(config.hard_timeout(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_quoted_args_are_not_grouped() {
        let runner = CaseRunner::new(RunnerConfig::new("ebe").with_timeout(5));
        let case = interpret_case(Path::new("fx/sort")).with_args("fx/sort/s.args", "-m \"a b\"");

        let args = strings(runner.ebe_args(&case));
        assert_eq!(&args[args.len() - 3..], &["-m", "\"a", "b\""]);
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::fs;
        use tempfile::TempDir;

        fn helper(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("measure.sh");
            fs::write(&path, body).unwrap();
            path
        }

        #[tokio::test]
        async fn test_run_through_helper() {
            let tmp = TempDir::new().unwrap();
            let argv_file = tmp.path().join("argv.txt");
            let script = helper(
                tmp.path(),
                &format!(
                    "printf '%s\\n' \"$@\" > '{}'\necho 'Result: 100.00% match'\necho '1.23,45%' >&2\n",
                    argv_file.display()
                ),
            );

            let runner = CaseRunner::new(
                RunnerConfig::new("ebe-under-test")
                    .with_measure_script(script)
                    .with_timeout(30),
            );
            let case = compile_case(Path::new("fx/caseA"));

            let m = runner.run(&case).await.unwrap();
            assert_eq!(m, Measurement::new(1.23, 45.0).with_precision(100.0));

            let argv = fs::read_to_string(&argv_file).unwrap();
            let argv: Vec<&str> = argv.lines().collect();
            assert_eq!(&argv[..4], &["--timeout", "30", "--", "ebe-under-test"]);
            assert_eq!(argv[4], "-in");
        }

        #[tokio::test]
        async fn test_malformed_diagnostic_is_fatal() {
            let tmp = TempDir::new().unwrap();
            let script = helper(tmp.path(), "echo 'Result: 100.00% match'\necho 'oops' >&2\n");
            let runner = CaseRunner::new(RunnerConfig::new("ebe").with_measure_script(script));

            let err = runner
                .run(&compile_case(Path::new("fx/caseA")))
                .await
                .unwrap_err();
            assert!(matches!(err, BenchError::Parse { stream: "stderr", .. }));
        }

        #[tokio::test]
        async fn test_runner_kills_hung_helper() {
            let tmp = TempDir::new().unwrap();
            let script = helper(tmp.path(), "sleep 5\n");
            let runner = CaseRunner::new(
                RunnerConfig::new("ebe")
                    .with_measure_script(script)
                    .with_timeout(1)
                    .with_grace(0),
            );

            let err = runner
                .run(&interpret_case(Path::new("fx/sort")))
                .await
                .unwrap_err();
            assert!(matches!(err, BenchError::Timeout { secs: 1, .. }));
        }

        #[tokio::test]
        async fn test_missing_ebe_version_is_unknown() {
            let version = ebe_version(Path::new("/nonexistent/ebe")).await;
            assert_eq!(version, "unknown");
        }
    }
}
