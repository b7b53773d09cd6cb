use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cseval_core::{ErrorInfo, EvalError};
use serde::{Deserialize, Serialize};

use crate::resolve::read_table;

/// Glob patterns naming the configuration files of a run set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunSetSpec {
    #[serde(default)]
    pub include: Vec<String>,
}

/// TOML-configurable parameters governing an evaluation run.
///
/// All paths are resolved against an explicit root supplied by the caller;
/// the harness never mutates the process working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Path to the external seeker executable.
    pub gc_seeker: PathBuf,
    /// Directory holding one sub-tree per knowledge base.
    pub working_dir: PathBuf,
    /// Knowledge base whose configurations are executed.
    pub kb_name: String,
    /// Configuration directory name below the knowledge base tree.
    pub conf_dirname: String,
    /// Result directory name below the knowledge base tree.
    pub result_dirname: String,
    /// Number of independent iterations per configuration.
    #[serde(default = "default_runs_per_config")]
    pub runs_per_config: usize,
    /// Emit debug-level logging.
    #[serde(default)]
    pub verbose: bool,
    /// Run set to execute.
    #[serde(default)]
    pub confs: RunSetSpec,
}

fn default_runs_per_config() -> usize {
    1
}

/// TOML-configurable parameters governing summary aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Directory holding one sub-tree per knowledge base.
    pub working_dir: PathBuf,
    /// Knowledge base name mapped to its known conflict-set total.
    #[serde(default)]
    pub kbs: BTreeMap<String, u64>,
    /// Configuration names whose summaries are aggregated.
    #[serde(default)]
    pub eval_confs: Vec<String>,
    /// Presentation names substituted for configuration names, in row order.
    #[serde(default)]
    pub export_names: Vec<String>,
    /// Result directory name below the knowledge base tree.
    pub result_dirname: String,
    /// Directory receiving the aggregated tables.
    pub summary_dirname: String,
    /// Configuration used as the reference point for improvement deltas.
    #[serde(default = "default_baseline")]
    pub baseline: String,
    /// Population size used for the checks-per-discovery column.
    #[serde(default = "default_population_size")]
    pub population_size: u64,
    /// Generation count the aligner pads reductions up to.
    #[serde(default = "default_expected_generations")]
    pub expected_generations: usize,
}

fn default_baseline() -> String {
    "original".to_string()
}

fn default_population_size() -> u64 {
    100
}

fn default_expected_generations() -> usize {
    100
}

/// Reads the `[runner]` table of an evaluation runner document.
pub fn load_runner_config(path: &Path) -> Result<RunnerConfig, EvalError> {
    let mut raw = read_table(path)?;
    let runner = raw.remove("runner").ok_or_else(|| {
        EvalError::Validation(
            ErrorInfo::new("conf.runner", "missing [runner] table")
                .with_context("path", path.display().to_string()),
        )
    })?;
    runner.try_into().map_err(|err: toml::de::Error| {
        EvalError::Serde(
            ErrorInfo::new("conf.runner_decode", "failed to decode runner configuration")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}

/// Reads a summary configuration document.
pub fn load_summary_config(path: &Path) -> Result<SummaryConfig, EvalError> {
    let raw = read_table(path)?;
    toml::Value::Table(raw)
        .try_into()
        .map_err(|err: toml::de::Error| {
            EvalError::Serde(
                ErrorInfo::new(
                    "conf.summary_decode",
                    "failed to decode summary configuration",
                )
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
            )
        })
}
