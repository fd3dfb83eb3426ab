//! Fixture directory scanner
//!
//! Every immediate subdirectory of a fixture root is one test case. Files are
//! classified purely by suffix:
//!
//! | kind      | suffix  | role               |
//! |-----------|---------|--------------------|
//! | compile   | `.in`   | input              |
//! | compile   | `.out`  | expected output    |
//! | interpret | `.ebel` | script             |
//! | interpret | `.txt`  | auxiliary input(s) |
//! | both      | `.args` | extra arguments    |

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{BenchError, BenchResult};
use crate::models::{CaseFiles, CaseKind, TestCase};

/// Scanner configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanConfig {
    /// Turn every structural warning into a fatal error
    pub warnings_as_errors: bool,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings_as_errors(mut self, enabled: bool) -> Self {
        self.warnings_as_errors = enabled;
        self
    }
}

/// A rejected case directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanWarning {
    pub dir: PathBuf,
    pub defect: String,
}

impl From<ScanWarning> for BenchError {
    fn from(w: ScanWarning) -> Self {
        BenchError::StructuralDefect {
            dir: w.dir,
            defect: w.defect,
        }
    }
}

/// Outcome of scanning one fixture root
#[derive(Clone, Debug, Default)]
pub struct ScanOutcome {
    pub cases: Vec<TestCase>,
    pub warnings: Vec<ScanWarning>,
}

/// Files of one case directory, bucketed by role
#[derive(Debug, Default)]
struct RoleFiles {
    primary: Vec<PathBuf>,
    secondary: Vec<PathBuf>,
    args: Vec<PathBuf>,
}

impl RoleFiles {
    fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty() && self.args.is_empty()
    }
}

/// Suffixes of the (primary, secondary) roles of a kind
fn role_suffixes(kind: CaseKind) -> (&'static str, &'static str) {
    match kind {
        CaseKind::Compile => ("in", "out"),
        CaseKind::Interpret => ("ebel", "txt"),
    }
}

const ARGS_SUFFIX: &str = "args";

/// Fixture scanner
pub struct FixtureScanner {
    config: ScanConfig,
}

impl FixtureScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan `root` for cases of the given kind
    pub fn scan(&self, root: impl AsRef<Path>, kind: CaseKind) -> BenchResult<ScanOutcome> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(BenchError::Config(format!(
                "fixture directory {} does not exist or is not a directory",
                root.display()
            )));
        }

        info!("Scanning {} for {} cases", root.display(), kind);

        let mut outcome = ScanOutcome::default();
        for dir in sorted_entries(root)?.into_iter().filter(|p| p.is_dir()) {
            match self.scan_case(&dir, kind)? {
                Some(Ok(case)) => {
                    debug!("Found {}", case);
                    outcome.cases.push(case);
                }
                Some(Err(warning)) => {
                    if self.config.warnings_as_errors {
                        return Err(warning.into());
                    }
                    warn!(
                        "Skipping {}: {}",
                        warning.dir.display(),
                        warning.defect
                    );
                    outcome.warnings.push(warning);
                }
                None => debug!("No {} files in {}, ignoring", kind, dir.display()),
            }
        }

        info!(
            "Found {} {} case(s), {} rejected",
            outcome.cases.len(),
            kind,
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    /// Classify one case directory.
    ///
    /// Returns `None` when the directory holds no role files at all.
    fn scan_case(
        &self,
        dir: &Path,
        kind: CaseKind,
    ) -> BenchResult<Option<Result<TestCase, ScanWarning>>> {
        let (primary_sfx, secondary_sfx) = role_suffixes(kind);

        let mut roles = RoleFiles::default();
        for path in sorted_entries(dir)?.into_iter().filter(|p| p.is_file()) {
            match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext == primary_sfx => roles.primary.push(path),
                Some(ext) if ext == secondary_sfx => roles.secondary.push(path),
                Some(ARGS_SUFFIX) => roles.args.push(path),
                _ => {}
            }
        }

        if roles.is_empty() {
            return Ok(None);
        }

        let mut defects = Vec::new();
        if roles.primary.len() != 1 {
            defects.push(multiplicity(primary_sfx, roles.primary.len()));
        }
        match kind {
            CaseKind::Compile if roles.secondary.len() != 1 => {
                defects.push(multiplicity(secondary_sfx, roles.secondary.len()));
            }
            CaseKind::Interpret if roles.secondary.is_empty() => {
                defects.push(format!("expected at least one .{secondary_sfx} file, found none"));
            }
            _ => {}
        }
        if roles.args.len() > 1 {
            defects.push(format!(
                "expected at most one .{ARGS_SUFFIX} file, found {}",
                roles.args.len()
            ));
        }

        if !defects.is_empty() {
            return Ok(Some(Err(ScanWarning {
                dir: dir.to_path_buf(),
                defect: defects.join("; "),
            })));
        }

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.display().to_string());

        let mut primary = roles.primary;
        let files = match kind {
            CaseKind::Compile => CaseFiles::Compile {
                input: primary.remove(0),
                expected_output: roles.secondary.remove(0),
            },
            CaseKind::Interpret => CaseFiles::Interpret {
                script: primary.remove(0),
                aux_inputs: roles.secondary,
            },
        };

        let mut case = TestCase::new(name, dir, files);
        if let Some(args_file) = roles.args.pop() {
            let args = read_args_file(&args_file)?;
            case = case.with_args(args_file, args);
        }

        Ok(Some(Ok(case)))
    }
}

fn multiplicity(suffix: &str, found: usize) -> String {
    if found == 0 {
        format!("missing .{suffix} file")
    } else {
        format!("expected exactly one .{suffix} file, found {found}")
    }
}

/// Directory entries sorted by file name
fn sorted_entries(dir: &Path) -> BenchResult<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| BenchError::io(dir, e))? {
        let entry = entry.map_err(|e| BenchError::io(dir, e))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Join the lines of an `.args` file, trailing whitespace stripped, no separator
pub fn concat_args(content: &str) -> String {
    content.lines().map(str::trim_end).collect()
}

fn read_args_file(path: &Path) -> BenchResult<String> {
    let content = fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    Ok(concat_args(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, case: &str, files: &[&str]) {
        let dir = root.join(case);
        fs::create_dir_all(&dir).unwrap();
        for f in files {
            fs::write(dir.join(f), "").unwrap();
        }
    }

    fn names(outcome: &ScanOutcome) -> Vec<&str> {
        outcome.cases.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn test_concat_args() {
        assert_eq!(concat_args("-x\n-y 1\n"), "-x-y 1");
        assert_eq!(concat_args("-a  \t\r\n-b"), "-a-b");
        assert_eq!(concat_args(""), "");
    }

    #[test]
    fn test_compile_cases() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "caseA", &["a.in", "a.out"]);
        fs::write(tmp.path().join("caseA/a.args"), "-x\n-y 1\n").unwrap();
        touch(tmp.path(), "caseC", &["c.in", "c.out", "notes.md"]);

        let outcome = FixtureScanner::new(ScanConfig::new())
            .scan(tmp.path(), CaseKind::Compile)
            .unwrap();

        assert_eq!(names(&outcome), vec!["caseA", "caseC"]);
        assert!(outcome.warnings.is_empty());

        let case_a = &outcome.cases[0];
        assert_eq!(case_a.kind(), CaseKind::Compile);
        assert_eq!(case_a.args(), "-x-y 1");
        match case_a.files() {
            CaseFiles::Compile {
                input,
                expected_output,
            } => {
                assert!(input.ends_with("caseA/a.in"));
                assert!(expected_output.ends_with("caseA/a.out"));
            }
            other => panic!("Expected compile files, got {other:?}"),
        }
        assert_eq!(outcome.cases[1].args(), "");
        assert!(outcome.cases[1].args_file().is_none());
    }

    #[test]
    fn test_duplicate_input_is_rejected() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "caseA", &["a.in", "a.out"]);
        touch(tmp.path(), "caseB", &["b.in", "b.out", "extra.in"]);

        let outcome = FixtureScanner::new(ScanConfig::new())
            .scan(tmp.path(), CaseKind::Compile)
            .unwrap();

        assert_eq!(names(&outcome), vec!["caseA"]);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].dir.ends_with("caseB"));
        assert!(outcome.warnings[0].defect.contains("found 2"));
    }

    #[test]
    fn test_missing_and_extra_roles() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "no_out", &["a.in"]);
        touch(tmp.path(), "two_args", &["a.in", "a.out", "x.args", "y.args"]);

        let outcome = FixtureScanner::new(ScanConfig::new())
            .scan(tmp.path(), CaseKind::Compile)
            .unwrap();

        assert!(outcome.cases.is_empty());
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(outcome.warnings[0].defect, "missing .out file");
        assert!(outcome.warnings[1].defect.contains(".args"));
    }

    #[test]
    fn test_directories_without_role_files_are_silent() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "docs", &["README.md"]);
        touch(tmp.path(), "empty", &[]);
        fs::write(tmp.path().join("stray.in"), "").unwrap();

        let outcome = FixtureScanner::new(ScanConfig::new().warnings_as_errors(true))
            .scan(tmp.path(), CaseKind::Compile)
            .unwrap();

        assert!(outcome.cases.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_interpret_cases() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "sort", &["sort.ebel", "b.txt", "a.txt"]);
        touch(tmp.path(), "no_script", &["a.txt"]);
        touch(tmp.path(), "two_scripts", &["a.ebel", "b.ebel", "a.txt"]);
        touch(tmp.path(), "no_inputs", &["a.ebel"]);

        let outcome = FixtureScanner::new(ScanConfig::new())
            .scan(tmp.path(), CaseKind::Interpret)
            .unwrap();

        assert_eq!(names(&outcome), vec!["sort"]);
        assert_eq!(outcome.warnings.len(), 3);

        match outcome.cases[0].files() {
            CaseFiles::Interpret { script, aux_inputs } => {
                assert!(script.ends_with("sort/sort.ebel"));
                assert_eq!(aux_inputs.len(), 2);
                assert!(aux_inputs[0].ends_with("a.txt"));
                assert!(aux_inputs[1].ends_with("b.txt"));
            }
            other => panic!("Expected interpret files, got {other:?}"),
        }
    }

    #[test]
    fn test_kinds_ignore_each_other() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "compile_only", &["a.in", "a.out"]);

        let outcome = FixtureScanner::new(ScanConfig::new())
            .scan(tmp.path(), CaseKind::Interpret)
            .unwrap();

        assert!(outcome.cases.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_warnings_as_errors_aborts_scan() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "caseA", &["a.in", "a.out"]);
        touch(tmp.path(), "caseB", &["b.in", "b.out", "extra.in"]);

        let err = FixtureScanner::new(ScanConfig::new().warnings_as_errors(true))
            .scan(tmp.path(), CaseKind::Compile)
            .unwrap_err();

        match err {
            BenchError::StructuralDefect { dir, .. } => assert!(dir.ends_with("caseB")),
            other => panic!("Expected structural defect, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let err = FixtureScanner::new(ScanConfig::new())
            .scan(tmp.path().join("nope"), CaseKind::Compile)
            .unwrap_err();
        assert!(matches!(err, BenchError::Config(_)));
    }
}
