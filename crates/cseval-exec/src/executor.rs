use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use cseval_conf::{ParamValue, ResolvedConfig};
use cseval_core::{ErrorInfo, EvalError};

/// Runs the external seeker once per call.
///
/// The executor owns the parameter file handoff only; the artifacts the
/// seeker writes belong to the orchestrator's accounting.
#[derive(Debug, Clone)]
pub struct RunExecutor {
    tool: PathBuf,
}

impl RunExecutor {
    /// Creates an executor invoking the given seeker executable.
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    /// Executes one run: merges the per-iteration keys over the resolved
    /// parameters, writes them to a uniquely named temporary `.cfg` file,
    /// and blocks on `<tool> -cfg <file>` until the seeker terminates.
    ///
    /// A non-zero exit status returns [`EvalError::Process`] with the
    /// captured streams attached; a parameter-file write failure returns
    /// [`EvalError::Artifact`]. The temporary file is removed on every exit
    /// path. The caller decides whether a failure aborts anything.
    pub fn execute(
        &self,
        params: &ResolvedConfig,
        extra: &[(String, ParamValue)],
    ) -> Result<(), EvalError> {
        let mut merged = params.clone();
        for (key, value) in extra {
            merged.insert(key.clone(), value.clone());
        }
        // Drop guard deletes the file on success, failure, and panic alike.
        let mut file = tempfile::Builder::new()
            .prefix("cseval_")
            .suffix(".cfg")
            .tempfile()
            .map_err(|err| artifact_error("exec.tempfile", "failed to create parameter file", err))?;
        file.write_all(merged.render().as_bytes())
            .and_then(|_| file.flush())
            .map_err(|err| artifact_error("exec.write", "failed to write parameter file", err))?;

        let output = Command::new(&self.tool)
            .arg("-cfg")
            .arg(file.path())
            .output()
            .map_err(|err| {
                EvalError::Process(
                    ErrorInfo::new("exec.spawn", "failed to launch the seeker process")
                        .with_context("tool", self.tool.display().to_string())
                        .with_hint(err.to_string()),
                )
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            tracing::debug!("seeker stdout: {}", stdout);
            tracing::debug!("seeker stderr: {}", stderr);
            return Ok(());
        }
        Err(EvalError::Process(
            ErrorInfo::new("exec.status", "seeker exited with a non-zero status")
                .with_context("tool", self.tool.display().to_string())
                .with_context(
                    "status",
                    output
                        .status
                        .code()
                        .map(|code| code.to_string())
                        .unwrap_or_else(|| "terminated by signal".to_string()),
                )
                .with_context("stdout", stdout.into_owned())
                .with_context("stderr", stderr.into_owned()),
        ))
    }
}

fn artifact_error(code: &str, message: &str, err: std::io::Error) -> EvalError {
    EvalError::Artifact(ErrorInfo::new(code, message).with_hint(err.to_string()))
}
