//! Benchmark fixture models
//!
//! Defines the two kinds of Ebe test cases and their role-tagged files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of benchmark fixture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseKind {
    /// Exercises ebe's compilation mode (ebec)
    Compile,
    /// Exercises ebe's interpretation mode (ebei)
    Interpret,
}

impl CaseKind {
    /// Get kind name as used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            CaseKind::Compile => "compile",
            CaseKind::Interpret => "interpret",
        }
    }

    /// Key under which results of this kind are stored in a report
    pub fn report_key(&self) -> &'static str {
        match self {
            CaseKind::Compile => "ebec",
            CaseKind::Interpret => "ebei",
        }
    }

    /// Section title used in charts
    pub fn title(&self) -> &'static str {
        match self {
            CaseKind::Compile => "Compilation",
            CaseKind::Interpret => "Interpretation",
        }
    }

    /// Get all case kinds
    pub fn all() -> Vec<CaseKind> {
        vec![CaseKind::Compile, CaseKind::Interpret]
    }
}

impl fmt::Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Role-tagged files of a test case
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaseFiles {
    Compile {
        /// `.in` file
        input: PathBuf,
        /// `.out` file
        expected_output: PathBuf,
    },
    Interpret {
        /// `.ebel` file
        script: PathBuf,
        /// `.txt` files, ordered by file name
        aux_inputs: Vec<PathBuf>,
    },
}

/// A single benchmark fixture discovered on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    name: String,
    dir: PathBuf,
    files: CaseFiles,
    args_file: Option<PathBuf>,
    args: String,
}

impl TestCase {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>, files: CaseFiles) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            files,
            args_file: None,
            args: String::new(),
        }
    }

    /// Attach the `.args` file and its concatenated contents
    pub fn with_args(mut self, args_file: impl Into<PathBuf>, args: impl Into<String>) -> Self {
        self.args_file = Some(args_file.into());
        self.args = args.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn kind(&self) -> CaseKind {
        match self.files {
            CaseFiles::Compile { .. } => CaseKind::Compile,
            CaseFiles::Interpret { .. } => CaseKind::Interpret,
        }
    }

    pub fn files(&self) -> &CaseFiles {
        &self.files
    }

    pub fn args_file(&self) -> Option<&Path> {
        self.args_file.as_deref()
    }

    /// Extra arguments read from the `.args` file (empty when absent)
    pub fn args(&self) -> &str {
        &self.args
    }

    /// All role files of this case, `.args` last
    pub fn paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = match &self.files {
            CaseFiles::Compile {
                input,
                expected_output,
            } => vec![input.as_path(), expected_output.as_path()],
            CaseFiles::Interpret { script, aux_inputs } => {
                let mut p = vec![script.as_path()];
                p.extend(aux_inputs.iter().map(PathBuf::as_path));
                p
            }
        };
        paths.extend(self.args_file());
        paths
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind())
    }
}
