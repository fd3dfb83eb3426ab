//! Text charts for benchmark reports
//!
//! Renders median bar charts, box plots and multi-report comparisons.

use std::collections::BTreeSet;

use crate::models::{CaseKind, CaseResult};
use crate::results::{median, BenchmarkReport, KindResults, SampleStats};

/// Chart style for a single report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    /// Horizontal bars of median times
    Bar,
    /// Box plot of all times
    Box,
}

const BAR_FILL: char = '█';
const BAR_HATCH: char = '/';

/// Chart renderer
pub struct ChartRenderer {
    width: usize,
    platform_info: bool,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(50)
    }
}

impl ChartRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(10),
            platform_info: true,
        }
    }

    pub fn no_platform_info(mut self) -> Self {
        self.platform_info = false;
        self
    }

    /// Render one report
    pub fn render(&self, report: &BenchmarkReport, chart: ChartKind) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{:=^w$}\n", format!(" {} ", report.title()), w = self.width + 30));

        let kinds = report.kinds();
        if kinds.is_empty() {
            output.push_str("\n  (no results)\n");
        }

        for kind in kinds {
            let Some(results) = report.results(kind) else {
                continue;
            };
            output.push_str(&format!("\n{}\n", kind.title()));
            let section = match chart {
                ChartKind::Bar => self.bar_section(kind, results),
                ChartKind::Box => self.box_section(results),
            };
            output.push_str(&section);
            output.push_str(&format!("{:>w$}\n", "time [s]", w = self.width + 30));
        }

        if self.platform_info {
            output.push('\n');
            for line in report.platform.describe().lines() {
                output.push_str(&format!("  {line}\n"));
            }
        }

        output.push_str(&format!("{:=^w$}\n", "", w = self.width + 30));
        output
    }

    fn label_width(results: &KindResults) -> usize {
        results.keys().map(|k| k.chars().count()).max().unwrap_or(0).max(4)
    }

    /// Bars of median times. Compile cases that never reached 100% precision
    /// are hatched.
    fn bar_section(&self, kind: CaseKind, results: &KindResults) -> String {
        let label_w = Self::label_width(results);
        let medians: Vec<(&String, &CaseResult, f64)> = results
            .iter()
            .map(|(name, r)| (name, r, median(&r.times)))
            .collect();
        let max = medians.iter().map(|(_, _, m)| *m).fold(0.0_f64, f64::max);

        let mut output = String::new();
        for (name, result, med) in medians {
            let len = if max > 0.0 {
                ((med / max) * self.width as f64).round() as usize
            } else {
                0
            };
            let fill = if kind == CaseKind::Compile && !result.is_exact() {
                BAR_HATCH
            } else {
                BAR_FILL
            };
            let bar: String = std::iter::repeat(fill).take(len).collect();
            output.push_str(&format!("  {name:>label_w$} │{bar} {med:.2}\n"));
        }
        output
    }

    fn box_section(&self, results: &KindResults) -> String {
        let label_w = Self::label_width(results);
        let (lo, hi) = results
            .values()
            .flat_map(|r| r.times.iter().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        let mut output = String::new();
        for (name, result) in results {
            let line = if result.is_empty() {
                String::new()
            } else {
                self.box_line(&result.times, lo, hi)
            };
            output.push_str(&format!("  {name:>label_w$} │{line}\n"));
        }
        output.push_str(&format!(
            "  {:>label_w$} └{:<w$}\n",
            "",
            format!("{lo:.2}"),
            w = self.width
        ));
        output.push_str(&format!(
            "  {:>label_w$}  {:>w$}\n",
            "",
            format!("{hi:.2}"),
            w = self.width
        ));
        output
    }

    /// One box plot row on the shared `[lo, hi]` scale
    fn box_line(&self, samples: &[f64], lo: f64, hi: f64) -> String {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let stats = SampleStats::from_samples(&sorted);
        let (w_lo, w_hi) = stats.whiskers(&sorted);

        let span = hi - lo;
        let pos = |v: f64| -> usize {
            if span <= 0.0 {
                return self.width / 2;
            }
            (((v - lo) / span) * (self.width - 1) as f64).round() as usize
        };

        let mut cells = vec![' '; self.width];
        for c in &mut cells[pos(w_lo)..=pos(w_hi)] {
            *c = '-';
        }
        for c in &mut cells[pos(stats.q1)..=pos(stats.q3)] {
            *c = ' ';
        }
        cells[pos(w_lo)] = '|';
        cells[pos(w_hi)] = '|';
        cells[pos(stats.q1)] = '[';
        cells[pos(stats.q3)] = ']';
        cells[pos(stats.median)] = '┃';
        for v in sorted.iter().filter(|v| **v < w_lo || **v > w_hi) {
            cells[pos(*v)] = 'o';
        }

        cells.into_iter().collect::<String>().trim_end().to_string()
    }

    /// Median comparison of several reports against the first one
    pub fn comparison(&self, reports: &[(String, BenchmarkReport)]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{:=^w$}\n", " Ebe benchmark comparison ", w = self.width + 30));

        for (i, (label, report)) in reports.iter().enumerate() {
            output.push_str(&format!("  [{}] {} ({})\n", i + 1, label, report.title()));
        }

        for kind in CaseKind::all() {
            let present: Vec<Option<&KindResults>> =
                reports.iter().map(|(_, r)| r.results(kind)).collect();
            if present.iter().all(Option::is_none) {
                continue;
            }

            let names: BTreeSet<&String> = present.iter().flatten().flat_map(|r| r.keys()).collect();
            let label_w = names.iter().map(|n| n.chars().count()).max().unwrap_or(0).max(4);

            output.push_str(&format!("\n{} median time [s]\n", kind.title()));
            output.push_str(&format!("  {:<label_w$}", "case"));
            for i in 0..reports.len() {
                output.push_str(&format!(" │ {:>18}", format!("[{}]", i + 1)));
            }
            output.push('\n');

            for name in names {
                output.push_str(&format!("  {name:<label_w$}"));
                let base = present[0]
                    .and_then(|r| r.get(name))
                    .filter(|r| !r.is_empty())
                    .map(|r| median(&r.times));

                for (i, results) in present.iter().enumerate() {
                    let cell = match results.and_then(|r| r.get(name)).filter(|r| !r.is_empty()) {
                        None => "-".to_string(),
                        Some(r) => {
                            let m = median(&r.times);
                            match base {
                                Some(b) if i > 0 && b > 0.0 => {
                                    format!("{m:.2} ({:+.1}%)", (m - b) / b * 100.0)
                                }
                                _ => format!("{m:.2}"),
                            }
                        }
                    };
                    output.push_str(&format!(" │ {cell:>18}"));
                }
                output.push('\n');
            }
        }

        output.push_str(&format!("{:=^w$}\n", "", w = self.width + 30));
        output
    }
}
