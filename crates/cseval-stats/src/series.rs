use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cseval_core::{ErrorInfo, EvalError};
use serde::{Deserialize, Serialize};

/// One observation of a run's statistics series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Generation index within the run.
    pub generation: u32,
    /// Cumulative conflict sets discovered up to this generation.
    pub total_cs: f64,
}

/// Ordered-by-generation series produced by a single run. Length varies per
/// run depending on early termination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeSeries {
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Deserialize)]
struct SeriesRecord {
    generation: u32,
    total_cs: f64,
}

/// Reads one statistics file. Columns beyond `generation` and `total_cs` are
/// ignored.
pub fn load_series(path: &Path) -> Result<TimeSeries, EvalError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("series-read", path, err))?;
    let mut points = Vec::new();
    for result in reader.deserialize() {
        let record: SeriesRecord = result.map_err(|err| wrap_csv("series-record", path, err))?;
        points.push(SeriesPoint {
            generation: record.generation,
            total_cs: record.total_cs,
        });
    }
    Ok(TimeSeries { points })
}

/// Collects every `stats_*.csv` series below a configuration's result
/// directory, sorted by file name for reproducible ordering.
pub fn collect_series(directory: &Path) -> Result<Vec<TimeSeries>, EvalError> {
    if !directory.is_dir() {
        return Err(EvalError::Stats(
            ErrorInfo::new("series-directory", "statistics directory does not exist")
                .with_context("path", directory.display().to_string()),
        ));
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(directory)
        .map_err(|err| {
            EvalError::Stats(
                ErrorInfo::new("series-scan", "failed to scan statistics directory")
                    .with_context("path", directory.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with("stats_") && name.ends_with(".csv"))
                .unwrap_or(false)
        })
        .collect();
    if paths.is_empty() {
        return Err(EvalError::Stats(
            ErrorInfo::new("series-empty", "no statistics files found")
                .with_context("path", directory.display().to_string()),
        ));
    }
    paths.sort();
    paths.iter().map(|path| load_series(path)).collect()
}

/// Collection of series normalized to a common working length so that
/// column-wise reductions are well-defined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeriesSet {
    series: Vec<TimeSeries>,
}

/// Normalizes a set of heterogeneous-length series.
///
/// The working length is the mean series length rounded down. A series whose
/// final generation index falls short of `expected_length` is resized to the
/// working length, holding its last observed `total_cs` constant for added
/// rows, and its generation column is renumbered contiguously from zero.
/// Series already reaching `expected_length` are left untouched.
pub fn align(mut series: Vec<TimeSeries>, expected_length: usize) -> AlignedSeriesSet {
    if series.is_empty() {
        return AlignedSeriesSet { series };
    }
    let total: usize = series.iter().map(|s| s.points.len()).sum();
    let working_length = total / series.len();
    for entry in &mut series {
        let Some(last) = entry.points.last().copied() else {
            continue;
        };
        if (last.generation as usize) < expected_length {
            entry.points.resize(
                working_length,
                SeriesPoint {
                    generation: 0,
                    total_cs: last.total_cs,
                },
            );
            for (idx, point) in entry.points.iter_mut().enumerate() {
                point.generation = idx as u32;
            }
        }
    }
    AlignedSeriesSet { series }
}

impl AlignedSeriesSet {
    /// Returns the aligned series.
    pub fn series(&self) -> &[TimeSeries] {
        &self.series
    }

    /// Per-generation arithmetic mean of `total_cs`, padded with missing rows
    /// up to `expected_length`.
    pub fn mean(&self, expected_length: usize) -> ReducedSeries {
        self.reduce(expected_length, mean)
    }

    /// Per-generation population standard deviation of `total_cs`, padded
    /// with missing rows up to `expected_length`.
    pub fn std_dev(&self, expected_length: usize) -> ReducedSeries {
        self.reduce(expected_length, std_dev)
    }

    fn reduce<F>(&self, expected_length: usize, f: F) -> ReducedSeries
    where
        F: Fn(&[f64]) -> f64,
    {
        let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for series in &self.series {
            for point in &series.points {
                groups.entry(point.generation).or_default().push(point.total_cs);
            }
        }
        let mut rows: Vec<Option<SeriesPoint>> = groups
            .into_iter()
            .map(|(generation, values)| {
                Some(SeriesPoint {
                    generation,
                    total_cs: f(&values),
                })
            })
            .collect();
        // Trailing missing rows mean "no data", not zero.
        while rows.len() < expected_length {
            rows.push(None);
        }
        ReducedSeries { rows }
    }
}

/// Column-wise reduction over an aligned series set. `None` rows are padding
/// beyond the observed generations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedSeries {
    pub rows: Vec<Option<SeriesPoint>>,
}

impl ReducedSeries {
    /// Writes the reduction as CSV; padding rows serialize as empty cells.
    pub fn write_csv(&self, path: &Path) -> Result<(), EvalError> {
        let mut writer = csv::WriterBuilder::new()
            .from_path(path)
            .map_err(|err| wrap_csv("series-write", path, err))?;
        writer
            .write_record(["generation", "total_cs"])
            .map_err(|err| wrap_csv("series-write-header", path, err))?;
        for row in &self.rows {
            let record = match row {
                Some(point) => [point.generation.to_string(), point.total_cs.to_string()],
                None => [String::new(), String::new()],
            };
            writer
                .write_record(&record)
                .map_err(|err| wrap_csv("series-write-row", path, err))?;
        }
        writer
            .flush()
            .map_err(|err| wrap_csv("series-flush", path, err.into()))?;
        Ok(())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|value| {
            let diff = value - center;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

fn wrap_csv(code: &str, path: &Path, err: csv::Error) -> EvalError {
    EvalError::Stats(
        ErrorInfo::new(code, "CSV statistics failure")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}
