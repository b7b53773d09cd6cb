//! Structured error types shared across the cseval crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`EvalError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, field names, captured output).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the evaluation harness.
///
/// Validation and missing-file errors are fatal for a whole run; process and
/// artifact errors are recovered at the iteration level and folded into the
/// per-configuration success counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum EvalError {
    /// Malformed or out-of-range configuration document.
    #[error("validation error: {0}")]
    Validation(ErrorInfo),
    /// A required configuration or input path does not exist.
    #[error("missing file: {0}")]
    MissingFile(ErrorInfo),
    /// The external seeker process exited with a non-zero status.
    #[error("process error: {0}")]
    Process(ErrorInfo),
    /// Failure to write a per-run parameter file or result directory.
    #[error("artifact error: {0}")]
    Artifact(ErrorInfo),
    /// Improvement computation requested against an unknown baseline name.
    #[error("baseline error: {0}")]
    Baseline(ErrorInfo),
    /// Statistics aggregation failures (unreadable or empty inputs).
    #[error("stats error: {0}")]
    Stats(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl EvalError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            EvalError::Validation(info)
            | EvalError::MissingFile(info)
            | EvalError::Process(info)
            | EvalError::Artifact(info)
            | EvalError::Baseline(info)
            | EvalError::Stats(info)
            | EvalError::Serde(info) => info,
        }
    }
}
