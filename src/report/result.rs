// src/report/result.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::registry::ModelId;

/// Why a model did not succeed.
///
/// The first two mean the model could not run at all (setup gap, counted as
/// skipped); the rest are runtime failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingEnvironment,
    MissingPrerequisite,
    ProcessFailure,
    ProcessTimeout,
    ExecutorException,
}

impl FailureKind {
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            FailureKind::MissingEnvironment | FailureKind::MissingPrerequisite
        )
    }
}

/// Terminal classification of one model run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// Outcome of one model.
///
/// `stdout` / `stderr` are kept for console display only and never written
/// to the report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub model: ModelId,
    pub success: bool,
    pub output: Option<PathBuf>,
    /// Elapsed seconds; zero when no process was launched.
    pub duration: f64,
    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(skip)]
    pub stdout: Option<String>,

    #[serde(skip)]
    pub stderr: Option<String>,
}

impl RunResult {
    pub fn succeeded(
        model: impl Into<ModelId>,
        format: impl Into<String>,
        output: Option<PathBuf>,
        duration: Duration,
    ) -> Self {
        Self {
            model: model.into(),
            success: true,
            output,
            duration: duration.as_secs_f64(),
            format: format.into(),
            error: None,
            failure: None,
            skipped: false,
            exit_code: Some(0),
            stdout: None,
            stderr: None,
        }
    }

    pub fn failed(
        model: impl Into<ModelId>,
        format: impl Into<String>,
        kind: FailureKind,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            model: model.into(),
            success: false,
            output: None,
            duration: duration.as_secs_f64(),
            format: format.into(),
            error: Some(error.into()),
            failure: Some(kind),
            skipped: kind.is_skip(),
            exit_code: None,
            stdout: None,
            stderr: None,
        }
    }

    /// Model could not run because of a setup gap; no process was launched.
    pub fn skipped(
        model: impl Into<ModelId>,
        format: impl Into<String>,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self::failed(model, format, kind, reason, Duration::ZERO)
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn with_streams(mut self, stdout: String, stderr: String) -> Self {
        self.stdout = Some(stdout);
        self.stderr = Some(stderr);
        self
    }

    /// Skipped takes precedence over failed.
    pub fn status(&self) -> RunStatus {
        if self.skipped {
            RunStatus::Skipped
        } else if self.success {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        }
    }
}
