use std::fs;
use std::path::{Path, PathBuf};

use cseval_conf::{resolve_config, ParamValue, ResolvedConfig};
use cseval_core::{stable_hash_string, ErrorInfo, EvalError};
use serde::Serialize;

use crate::artifacts::RunArtifacts;
use crate::executor::RunExecutor;

/// Final state of one configuration file after its iteration loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfigState {
    /// Every requested iteration succeeded.
    Succeeded,
    /// At least one iteration failed.
    PartiallyFailed,
}

/// Accounting for one configuration file across its iterations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationOutcome {
    /// Configuration file stem.
    pub name: String,
    /// Stable hash of the resolved parameter set, for provenance.
    pub config_hash: String,
    /// Iterations requested.
    pub requested: usize,
    /// Iterations that completed successfully.
    pub succeeded: usize,
    /// Recovered per-iteration errors, in iteration order.
    pub errors: Vec<EvalError>,
}

impl ConfigurationOutcome {
    /// Collapses the counts into the configuration's final state.
    pub fn state(&self) -> ConfigState {
        if self.succeeded == self.requested {
            ConfigState::Succeeded
        } else {
            ConfigState::PartiallyFailed
        }
    }
}

/// Aggregate report over a whole run set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// One outcome per configuration, in run-set order.
    pub outcomes: Vec<ConfigurationOutcome>,
}

impl RunReport {
    /// Process exit status: zero only when every configuration succeeded on
    /// every requested iteration.
    pub fn exit_code(&self) -> i32 {
        let complete = self
            .outcomes
            .iter()
            .all(|outcome| outcome.state() == ConfigState::Succeeded);
        if complete {
            0
        } else {
            1
        }
    }
}

/// Expands the run set's glob patterns against the configuration directory.
///
/// A pattern that expands to nothing keeps the literal path as a candidate,
/// so a missing file is diagnosed instead of silently skipped.
pub fn resolve_run_set(conf_dir: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let candidate = conf_dir.join(pattern);
        let expanded: Vec<PathBuf> = glob::glob(&candidate.to_string_lossy())
            .map(|entries| entries.filter_map(|entry| entry.ok()).collect())
            .unwrap_or_default();
        if expanded.is_empty() {
            paths.push(candidate);
        } else {
            paths.extend(expanded);
        }
    }
    paths
}

/// Drives every configuration of a run set through a fixed number of
/// isolated iterations.
///
/// Execution is sequential by design: iterations block on the external
/// seeker one at a time, keeping its resource usage predictable. Artifact
/// naming, not scheduling, is what guarantees isolation.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    executor: RunExecutor,
    conf_dir: PathBuf,
    result_dir: PathBuf,
    runs_per_config: usize,
    patterns: Vec<String>,
}

impl Orchestrator {
    /// Creates an orchestrator over a configuration directory and result
    /// directory, both resolved by the caller (no ambient state).
    pub fn new(
        tool: impl Into<PathBuf>,
        conf_dir: impl Into<PathBuf>,
        result_dir: impl Into<PathBuf>,
        runs_per_config: usize,
        patterns: Vec<String>,
    ) -> Self {
        Self {
            executor: RunExecutor::new(tool),
            conf_dir: conf_dir.into(),
            result_dir: result_dir.into(),
            runs_per_config,
            patterns,
        }
    }

    /// Runs the whole set.
    ///
    /// Missing configuration files and validation failures abort before any
    /// execution. Iteration failures are logged, counted, and never abort
    /// remaining iterations or other configurations.
    pub fn run(&self) -> Result<RunReport, EvalError> {
        tracing::info!("starting evaluation run");
        tracing::info!("configuration directory: {}", self.conf_dir.display());
        tracing::info!("result directory: {}", self.result_dir.display());
        tracing::info!("runs per configuration: {}", self.runs_per_config);

        let paths = resolve_run_set(&self.conf_dir, &self.patterns);
        self.validate_run_set(&paths)?;

        // Resolve everything up front so a broken configuration cannot abort
        // a half-executed run set.
        let mut resolved = Vec::with_capacity(paths.len());
        for path in &paths {
            let name = config_stem(path);
            let params = resolve_config(path)?;
            let config_hash = stable_hash_string(&params)?;
            resolved.push((name, params, config_hash));
        }

        fs::create_dir_all(&self.result_dir).map_err(|err| {
            EvalError::Artifact(
                ErrorInfo::new("run.result_dir", "failed to create result directory")
                    .with_context("path", self.result_dir.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;

        let mut outcomes = Vec::with_capacity(resolved.len());
        for (name, params, config_hash) in resolved {
            let outcome = self.run_configuration(name, params, config_hash);
            tracing::info!(
                "configuration '{}' completed: {}/{} iterations successful",
                outcome.name,
                outcome.succeeded,
                outcome.requested
            );
            outcomes.push(outcome);
        }
        let complete = outcomes
            .iter()
            .filter(|outcome| outcome.state() == ConfigState::Succeeded)
            .count();
        tracing::info!(
            "configurations completed: {}/{} successful",
            complete,
            outcomes.len()
        );
        Ok(RunReport { outcomes })
    }

    fn validate_run_set(&self, paths: &[PathBuf]) -> Result<(), EvalError> {
        let missing: Vec<&PathBuf> = paths.iter().filter(|path| !path.exists()).collect();
        if !missing.is_empty() {
            let mut info = ErrorInfo::new(
                "run.missing_configs",
                format!("{} configuration file(s) not found", missing.len()),
            );
            for (idx, path) in missing.iter().enumerate() {
                info = info.with_context(format!("missing[{idx}]"), path.display().to_string());
            }
            return Err(EvalError::MissingFile(info));
        }
        tracing::info!("config files found:");
        for path in paths {
            tracing::info!("  {}", path.display());
        }
        Ok(())
    }

    fn run_configuration(
        &self,
        name: String,
        mut params: ResolvedConfig,
        config_hash: String,
    ) -> ConfigurationOutcome {
        tracing::info!("running configuration: {}", name);
        let mut outcome = ConfigurationOutcome {
            name: name.clone(),
            config_hash,
            requested: self.runs_per_config,
            succeeded: 0,
            errors: Vec::new(),
        };

        let conf_dir = self.result_dir.join(&name);
        if let Err(err) = fs::create_dir_all(&conf_dir) {
            let error = EvalError::Artifact(
                ErrorInfo::new("run.conf_dir", "failed to create configuration directory")
                    .with_context("path", conf_dir.display().to_string())
                    .with_hint(err.to_string()),
            );
            tracing::error!("configuration '{}' failed: {}", name, error);
            outcome.errors.push(error);
            return outcome;
        }

        let summary_path = self.result_dir.join(format!("summary_{name}.csv"));
        params.insert("summaryPath", summary_path.display().to_string());
        let include_cf = !matches!(
            params.get("base.cs.cfInConflicts"),
            Some(ParamValue::Text(token)) if token == "no"
        );

        for iteration in 0..self.runs_per_config {
            let artifacts = RunArtifacts::generate(&conf_dir, include_cf);
            tracing::info!(
                "running configuration '{}' iteration {} (run id {})",
                name,
                iteration,
                artifacts.run_id
            );
            match self.executor.execute(&params, &artifacts.extra_keys()) {
                Ok(()) => outcome.succeeded += 1,
                Err(err) => {
                    tracing::error!("iteration {} of '{}' failed: {}", iteration, name, err);
                    outcome.errors.push(err);
                }
            }
        }
        outcome
    }
}

fn config_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("config")
        .to_string()
}
