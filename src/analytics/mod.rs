//! Analytics output plotting
//!
//! Ebe's analytics mode (`-a`) writes a headerless CSV of
//! `<iteration>,<fitness>` rows. Consecutive runs of the evolution are
//! appended to the same file, so a new series starts whenever an iteration
//! number repeats within the current one.

use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::Path;

/// Upper bound of the fitness axis
const Y_MAX: f64 = 1.05;
const MARKERS: [char; 6] = ['*', '+', 'o', 'x', '#', '@'];

/// One evolution run
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(i64, f64)>,
}

impl Series {
    fn new(index: usize) -> Self {
        Self {
            label: format!("Evolution {index}"),
            points: Vec::new(),
        }
    }

    fn contains_x(&self, x: i64) -> bool {
        self.points.iter().any(|(px, _)| *px == x)
    }
}

/// Split analytics rows into evolution series
pub fn parse_series<R: Read>(reader: R) -> Result<Vec<Series>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut series = Vec::new();
    let mut current = Series::new(1);

    for (idx, record) in csv_reader.records().enumerate() {
        let row = idx + 1;
        let record = record.with_context(|| format!("Failed to read row {row}"))?;

        let x: i64 = record
            .get(0)
            .ok_or_else(|| anyhow!("Row {row}: missing iteration column"))?
            .parse()
            .with_context(|| format!("Row {row}: iteration is not an integer"))?;
        let y: f64 = record
            .get(1)
            .ok_or_else(|| anyhow!("Row {row}: missing value column"))?
            .parse()
            .with_context(|| format!("Row {row}: value is not a number"))?;

        if current.contains_x(x) {
            let next = Series::new(series.len() + 2);
            series.push(std::mem::replace(&mut current, next));
        }
        current.points.push((x, y));
    }

    if !current.points.is_empty() {
        series.push(current);
    }
    Ok(series)
}

/// Load and split an analytics CSV file
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Series>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open analytics file: {}", path.display()))?;
    parse_series(file).with_context(|| format!("Invalid analytics file: {}", path.display()))
}

/// Text line chart of evolution series
#[derive(Clone, Debug)]
pub struct AnalyticsChart {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub width: usize,
    pub height: usize,
}

impl Default for AnalyticsChart {
    fn default() -> Self {
        Self {
            title: None,
            xlabel: None,
            ylabel: None,
            width: 60,
            height: 16,
        }
    }
}

impl AnalyticsChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn xlabel(mut self, label: Option<String>) -> Self {
        self.xlabel = label;
        self
    }

    pub fn ylabel(mut self, label: Option<String>) -> Self {
        self.ylabel = label;
        self
    }

    pub fn render(&self, series: &[Series]) -> String {
        let width = self.width.max(10);
        let height = self.height.max(4);
        let mut output = String::new();

        if let Some(title) = &self.title {
            output.push_str(&format!("{:^w$}\n", title, w = width + 8));
        }
        if let Some(ylabel) = &self.ylabel {
            output.push_str(&format!("{ylabel}\n"));
        }

        let xs = series.iter().flat_map(|s| s.points.iter().map(|(x, _)| *x));
        let (x_min, x_max) = xs.fold((i64::MAX, i64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));

        let col = |x: i64| -> usize {
            if x_max <= x_min {
                return 0;
            }
            (((x - x_min) as f64 / (x_max - x_min) as f64) * (width - 1) as f64).round() as usize
        };
        let row = |y: f64| -> usize {
            let y = y.clamp(0.0, Y_MAX);
            (((Y_MAX - y) / Y_MAX) * (height - 1) as f64).round() as usize
        };

        let mut grid = vec![vec![' '; width]; height];
        for (i, s) in series.iter().enumerate() {
            let marker = MARKERS[i % MARKERS.len()];
            for (x, y) in &s.points {
                grid[row(*y)][col(*x)] = marker;
            }
        }

        for (r, cells) in grid.iter().enumerate() {
            let y = Y_MAX * (height - 1 - r) as f64 / (height - 1) as f64;
            let line: String = cells.iter().collect();
            output.push_str(&format!("{y:>6.2} ┤{}\n", line.trim_end()));
        }
        output.push_str(&format!("{:>6} └{}\n", "", "─".repeat(width)));

        if x_min <= x_max {
            output.push_str(&format!(
                "{:>6}  {:<w$}{}\n",
                "",
                x_min,
                x_max,
                w = width.saturating_sub(x_max.to_string().len())
            ));
        }
        if let Some(xlabel) = &self.xlabel {
            output.push_str(&format!("{:^w$}\n", xlabel, w = width + 8));
        }

        output.push('\n');
        for (i, s) in series.iter().enumerate() {
            output.push_str(&format!(
                "  {} {} ({} points)\n",
                MARKERS[i % MARKERS.len()],
                s.label,
                s.points.len()
            ));
        }
        output
    }
}
