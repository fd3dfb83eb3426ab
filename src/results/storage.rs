//! Results storage and retrieval
//!
//! Persists benchmark reports as JSON and exports them as CSV.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::report::BenchmarkReport;

/// Results storage manager
pub struct ResultsStorage {
    /// Base directory for reports
    base_dir: PathBuf,
}

impl ResultsStorage {
    /// Create a new results storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Default file name of a report
    pub fn report_path(&self, report: &BenchmarkReport) -> PathBuf {
        self.base_dir
            .join(format!("benchmark_{}.json", report.benchmark.id))
    }

    /// Save a report under its default name
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf> {
        let path = self.report_path(report);
        Self::save_to(report, &path)?;
        Ok(path)
    }

    /// Save a report to an explicit path
    pub fn save_to(report: &BenchmarkReport, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create results file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report).context("Failed to write results")?;

        info!("Saved benchmark results to {}", path.display());
        Ok(())
    }

    /// Load a report from a path
    pub fn load(path: impl AsRef<Path>) -> Result<BenchmarkReport> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open results file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let report: BenchmarkReport = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse results: {}", path.display()))?;

        debug!("Loaded benchmark results from {}", path.display());
        Ok(report)
    }

    /// Export every measurement of a report as CSV rows
    pub fn export_csv(report: &BenchmarkReport, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

        writer.write_record(["kind", "case", "iteration", "time_s", "cpu_percent", "precision_percent"])?;

        for kind in report.kinds() {
            let Some(results) = report.results(kind) else {
                continue;
            };
            for (name, result) in results {
                for (i, time) in result.times.iter().enumerate() {
                    writer.write_record([
                        kind.report_key().to_string(),
                        name.clone(),
                        (i + 1).to_string(),
                        time.to_string(),
                        result
                            .cpu_usages
                            .get(i)
                            .map(|c| c.to_string())
                            .unwrap_or_default(),
                        result
                            .precisions
                            .get(i)
                            .map(|p| p.to_string())
                            .unwrap_or_default(),
                    ])?;
                }
            }
        }
        writer.flush()?;

        info!("Exported results to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseKind, CaseResult, Measurement};
    use crate::results::report::{BenchmarkInfo, EbeInfo, PlatformInfo};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn report() -> BenchmarkReport {
        let mut report = BenchmarkReport::new(
            EbeInfo {
                path: "ebe".to_string(),
                version: "1.0".to_string(),
            },
            BenchmarkInfo::new(2, 10),
            PlatformInfo::default(),
        );
        let mut sort = CaseResult::new();
        sort.push(&Measurement::new(0.5, 90.0));
        sort.push(&Measurement::new(0.7, 95.0));
        report.set_results(CaseKind::Interpret, BTreeMap::from([("sort".to_string(), sort)]));
        report
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("results");
        let storage = ResultsStorage::new(&base);
        let report = report();

        let path = storage.save(&report).unwrap();
        assert!(path.starts_with(&base));
        assert!(path.ends_with(format!("benchmark_{}.json", report.benchmark.id)));

        let loaded = ResultsStorage::load(&path).unwrap();
        assert_eq!(loaded.benchmark.id, report.benchmark.id);
        assert_eq!(loaded.kinds(), vec![CaseKind::Interpret]);
        assert_eq!(loaded.results(CaseKind::Interpret).unwrap()["sort"].times, vec![0.5, 0.7]);
    }

    #[test]
    fn test_load_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ResultsStorage::load(&path).is_err());
    }

    #[test]
    fn test_export_csv() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.csv");
        ResultsStorage::export_csv(&report(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "kind,case,iteration,time_s,cpu_percent,precision_percent");
        assert_eq!(lines[1], "ebei,sort,1,0.5,90,");
    }
}
