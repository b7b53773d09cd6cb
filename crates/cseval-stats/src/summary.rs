use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use cseval_core::{ErrorInfo, EvalError};
use serde::{Deserialize, Serialize};

/// Single value of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Float(f64),
    Int(i64),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell, when it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(value) => Some(*value),
            Cell::Int(value) => Some(*value as f64),
            Cell::Text(_) => None,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Float(value) => write!(f, "{value}"),
            Cell::Int(value) => write!(f, "{value}"),
            Cell::Text(value) => write!(f, "{value}"),
        }
    }
}

/// Time unit for the discoveries-per-time-unit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Second,
    Millisecond,
}

impl TimeUnit {
    fn column(&self) -> &'static str {
        match self {
            TimeUnit::Minute => "cs_per_min",
            TimeUnit::Second => "cs_per_sec",
            TimeUnit::Millisecond => "cs_per_ms",
        }
    }

    fn elapsed(&self, runtime_ms: f64) -> f64 {
        match self {
            TimeUnit::Minute => runtime_ms / 1000.0 / 60.0,
            TimeUnit::Second => runtime_ms / 1000.0,
            TimeUnit::Millisecond => runtime_ms,
        }
    }
}

/// Per-configuration summary table with ordered columns.
///
/// Column order is part of the output contract: derived columns append at the
/// end, improvement columns insert immediately after their target column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

const CONFIG_NAME: &str = "config_name";
const RUNTIME_MS: &str = "runtime[ms]";

#[derive(Debug, Deserialize)]
struct SummaryRecord {
    total_populations: f64,
    total_gens: f64,
    found_cs: f64,
    #[serde(rename = "runtime[ms]")]
    runtime_ms: f64,
}

/// Finds the summary files matching the requested configuration names. A
/// pattern that expands to nothing is skipped; the caller decides whether an
/// incomplete table is acceptable.
pub fn collect_summary_files(directory: &Path, names: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for name in names {
        let pattern = directory.join(format!("summary_{name}.csv"));
        let expanded = glob::glob(&pattern.to_string_lossy())
            .map(|paths| paths.filter_map(|entry| entry.ok()).collect::<Vec<_>>())
            .unwrap_or_default();
        files.extend(expanded);
    }
    files
}

/// Aggregates per-run summary rows into one table row per configuration.
///
/// Means are arithmetic; variance and standard deviation of `found_cs` use
/// population semantics and round to 3 decimals. When `known_total` is
/// supplied, the identification rate and the count of runs that found every
/// known conflict set are added.
pub fn aggregate(paths: &[PathBuf], known_total: Option<u64>) -> Result<SummaryTable, EvalError> {
    let mut columns = vec![
        CONFIG_NAME.to_string(),
        "total_populations".to_string(),
        "total_gens".to_string(),
        "found_cs".to_string(),
        RUNTIME_MS.to_string(),
        "variance".to_string(),
        "std_dev".to_string(),
    ];
    if known_total.is_some() {
        columns.push("identification_rate".to_string());
        columns.push("found_all_cs".to_string());
    }
    let mut rows = Vec::with_capacity(paths.len());
    for path in paths {
        let records = read_summary(path)?;
        let name = config_name_from_path(path)?;
        let count = records.len() as f64;
        let mean = |f: fn(&SummaryRecord) -> f64| records.iter().map(f).sum::<f64>() / count;
        let found_mean = mean(|r| r.found_cs);
        let found_variance = records
            .iter()
            .map(|r| {
                let diff = r.found_cs - found_mean;
                diff * diff
            })
            .sum::<f64>()
            / count;
        let mut row = vec![
            Cell::Text(name),
            Cell::Float(mean(|r| r.total_populations)),
            Cell::Float(mean(|r| r.total_gens)),
            Cell::Float(found_mean),
            Cell::Float(mean(|r| r.runtime_ms)),
            Cell::Float(round3(found_variance)),
            Cell::Float(round3(found_variance.sqrt())),
        ];
        if let Some(total) = known_total {
            row.push(Cell::Float(round3(found_mean / total as f64)));
            let found_all = records
                .iter()
                .filter(|r| (r.found_cs - total as f64).abs() < 1e-9)
                .count();
            row.push(Cell::Int(found_all as i64));
        }
        rows.push(row);
    }
    Ok(SummaryTable { columns, rows })
}

impl SummaryTable {
    /// Column names in output order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Table rows, parallel to [`SummaryTable::columns`].
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Looks up a cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Appends the human-readable `m:s:ms` rendering of the runtime mean.
    pub fn append_runtime_string(&mut self) -> Result<(), EvalError> {
        let runtime_idx = self.column_index(RUNTIME_MS)?;
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let runtime_ms = self.numeric(row, runtime_idx)?;
            let total = runtime_ms.floor() as u64;
            values.push(Cell::Text(format!(
                "{}:{}:{}",
                total / 60_000,
                (total % 60_000) / 1000,
                total % 1000
            )));
        }
        self.push_column("runtime[m:s:ms]", values);
        Ok(())
    }

    /// Appends consistency checks per identified conflict set:
    /// `total_gens × population_size ÷ found_cs`, rounded to 2 decimals.
    pub fn append_checks_per_cs(&mut self, population_size: u64) -> Result<(), EvalError> {
        let gens_idx = self.column_index("total_gens")?;
        let found_idx = self.column_index("found_cs")?;
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let gens = self.numeric(row, gens_idx)?;
            let found = self.numeric(row, found_idx)?;
            values.push(Cell::Float(round2(gens * population_size as f64 / found)));
        }
        self.push_column("checks_per_cs", values);
        Ok(())
    }

    /// Appends identified conflict sets per time unit, rounded to 2 decimals.
    pub fn append_cs_per_time(&mut self, unit: TimeUnit) -> Result<(), EvalError> {
        let found_idx = self.column_index("found_cs")?;
        let runtime_idx = self.column_index(RUNTIME_MS)?;
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let found = self.numeric(row, found_idx)?;
            let runtime_ms = self.numeric(row, runtime_idx)?;
            values.push(Cell::Float(round2(found / unit.elapsed(runtime_ms))));
        }
        self.push_column(unit.column(), values);
        Ok(())
    }

    /// Adds a column expressing the target metric relative to the baseline
    /// configuration's row, inserted immediately after the target column.
    ///
    /// Percentage mode computes `(base − value) / base × 100` when lower is
    /// better, else `(value − base) / base × 100`; absolute mode keeps the
    /// unscaled difference with the same polarity. Values round to 2
    /// decimals; the baseline row itself always yields zero.
    pub fn add_improvement_column(
        &mut self,
        name: &str,
        target_column: &str,
        base_config_name: &str,
        in_percent: bool,
        less_is_better: bool,
    ) -> Result<(), EvalError> {
        let target_idx = self.column_index(target_column)?;
        let name_idx = self.column_index(CONFIG_NAME)?;
        let base_row = self
            .rows
            .iter()
            .find(|row| matches!(&row[name_idx], Cell::Text(text) if text == base_config_name))
            .ok_or_else(|| {
                EvalError::Baseline(
                    ErrorInfo::new("stats.baseline", "baseline configuration not found")
                        .with_context("baseline", base_config_name)
                        .with_context("column", target_column),
                )
            })?;
        let base = self.numeric(base_row, target_idx)?;
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let value = self.numeric(row, target_idx)?;
            let delta = if less_is_better { base - value } else { value - base };
            let improvement = if in_percent { delta / base * 100.0 } else { delta };
            values.push(Cell::Float(round2(improvement)));
        }
        self.columns.insert(target_idx + 1, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(target_idx + 1, value);
        }
        Ok(())
    }

    /// Renames a column in place.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), EvalError> {
        let idx = self.column_index(from)?;
        self.columns[idx] = to.to_string();
        Ok(())
    }

    /// Replaces configuration names with presentation names, in row order.
    pub fn set_export_names(&mut self, names: &[String]) -> Result<(), EvalError> {
        if names.len() != self.rows.len() {
            return Err(EvalError::Stats(
                ErrorInfo::new("stats.export_names", "export name count does not match rows")
                    .with_context("names", names.len().to_string())
                    .with_context("rows", self.rows.len().to_string()),
            ));
        }
        let name_idx = self.column_index(CONFIG_NAME)?;
        for (row, name) in self.rows.iter_mut().zip(names) {
            row[name_idx] = Cell::Text(name.clone());
        }
        Ok(())
    }

    /// Writes the table as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<(), EvalError> {
        let mut writer = csv::WriterBuilder::new()
            .from_path(path)
            .map_err(|err| wrap_csv("summary-write", path, err))?;
        writer
            .write_record(&self.columns)
            .map_err(|err| wrap_csv("summary-write-header", path, err))?;
        for row in &self.rows {
            let record: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            writer
                .write_record(&record)
                .map_err(|err| wrap_csv("summary-write-row", path, err))?;
        }
        writer
            .flush()
            .map_err(|err| wrap_csv("summary-flush", path, err.into()))?;
        Ok(())
    }

    fn column_index(&self, name: &str) -> Result<usize, EvalError> {
        self.columns.iter().position(|c| c == name).ok_or_else(|| {
            EvalError::Stats(
                ErrorInfo::new("stats.column", "unknown summary column").with_context("column", name),
            )
        })
    }

    fn numeric(&self, row: &[Cell], idx: usize) -> Result<f64, EvalError> {
        row.get(idx).and_then(|cell| cell.as_f64()).ok_or_else(|| {
            EvalError::Stats(
                ErrorInfo::new("stats.numeric", "summary cell is not numeric")
                    .with_context("column", self.columns[idx].clone()),
            )
        })
    }

    fn push_column(&mut self, name: &str, values: Vec<Cell>) {
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }
}

fn read_summary(path: &Path) -> Result<Vec<SummaryRecord>, EvalError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("summary-read", path, err))?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result.map_err(|err| wrap_csv("summary-record", path, err))?);
    }
    if records.is_empty() {
        return Err(EvalError::Stats(
            ErrorInfo::new("summary-empty", "summary file contains no rows")
                .with_context("path", path.display().to_string()),
        ));
    }
    Ok(records)
}

fn config_name_from_path(path: &Path) -> Result<String, EvalError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.strip_prefix("summary_"))
        .map(|name| name.to_string())
        .ok_or_else(|| {
            EvalError::Stats(
                ErrorInfo::new("summary-name", "summary file name is not summary_<config>.csv")
                    .with_context("path", path.display().to_string()),
            )
        })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn wrap_csv(code: &str, path: &Path, err: csv::Error) -> EvalError {
    EvalError::Stats(
        ErrorInfo::new(code, "CSV summary failure")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}
