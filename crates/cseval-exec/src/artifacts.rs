use std::path::{Path, PathBuf};

use cseval_conf::ParamValue;
use serde::Serialize;

/// Output paths owned by one seeker execution.
///
/// Every iteration gets a fresh record with a new random identifier, so
/// repeated or partially repeated runs never clobber prior artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunArtifacts {
    /// Unique identifier embedded in every file name.
    pub run_id: String,
    /// Per-generation statistics series written by the seeker.
    pub stats_file: PathBuf,
    /// Textual result report.
    pub result_file: PathBuf,
    /// Conflict sets without candidate features.
    pub cs_file: PathBuf,
    /// Conflict sets including candidate features; omitted when the
    /// configuration disables them.
    pub cs_with_cf_file: Option<PathBuf>,
}

impl RunArtifacts {
    /// Creates a fresh artifact set below the configuration's result
    /// directory.
    pub fn generate(conf_dir: &Path, include_cf: bool) -> Self {
        let run_id = format!("{:032x}", rand::random::<u128>());
        let cs_with_cf_file = include_cf
            .then(|| conf_dir.join(format!("result_with_cf_{run_id}.da")));
        Self {
            stats_file: conf_dir.join(format!("stats_{run_id}.csv")),
            result_file: conf_dir.join(format!("result_{run_id}.txt")),
            cs_file: conf_dir.join(format!("result_{run_id}.da")),
            cs_with_cf_file,
            run_id,
        }
    }

    /// Per-iteration parameter overrides pointing the seeker at this
    /// artifact set.
    pub fn extra_keys(&self) -> Vec<(String, ParamValue)> {
        let mut keys = vec![
            (
                "statisticsPath".to_string(),
                ParamValue::from(self.stats_file.display().to_string()),
            ),
            (
                "resultPath".to_string(),
                ParamValue::from(self.result_file.display().to_string()),
            ),
            (
                "allCSWithoutCFPath".to_string(),
                ParamValue::from(self.cs_file.display().to_string()),
            ),
        ];
        if let Some(path) = &self.cs_with_cf_file {
            keys.push((
                "allCSPath".to_string(),
                ParamValue::from(path.display().to_string()),
            ));
        }
        keys
    }
}
