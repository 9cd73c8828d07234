// src/scenario/report.rs

use std::fmt;
use std::path::PathBuf;

use crate::errors::{HarnessError, Result};
use crate::matchers::MatchFailure;

/// Final status of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Passed,
    /// Launched, and the matcher rejected the session.
    Failed(MatchFailure),
    /// Could not be rendered into a command; nothing was launched.
    Aborted(String),
    /// Never launched because an earlier step did not pass.
    Skipped,
}

impl StepStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, StepStatus::Passed)
    }

    fn label(&self) -> &'static str {
        match self {
            StepStatus::Passed => "passed",
            StepStatus::Failed(_) => "FAILED",
            StepStatus::Aborted(_) => "ABORTED",
            StepStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
}

/// What happened to the scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Removed(PathBuf),
    Failed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub scenario: String,
    pub steps: Vec<StepRecord>,
    pub cleanup: CleanupOutcome,
}

impl ScenarioReport {
    /// True when every step passed and cleanup succeeded.
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_passed())
            && matches!(self.cleanup, CleanupOutcome::Removed(_))
    }

    /// The first step that did not pass, if any.
    pub fn first_failure(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| !s.status.is_passed())
    }

    /// Names of steps that were actually launched (or attempted).
    pub fn attempted(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(|s| s.status != StepStatus::Skipped)
            .map(|s| s.name.as_str())
    }

    /// Convert into an error naming the failing step.
    ///
    /// A step failure takes precedence over a cleanup failure.
    pub fn into_result(self) -> Result<()> {
        if let Some(record) = self.steps.into_iter().find(|s| !s.status.is_passed()) {
            return Err(match record.status {
                StepStatus::Failed(failure) => HarnessError::StepFailed {
                    step: record.name,
                    failure: Box::new(failure),
                },
                StepStatus::Aborted(reason) => {
                    HarnessError::Template(format!("step '{}': {reason}", record.name))
                }
                StepStatus::Passed | StepStatus::Skipped => HarnessError::ConfigError(format!(
                    "step '{}' was skipped without an earlier failure",
                    record.name
                )),
            });
        }

        match self.cleanup {
            CleanupOutcome::Removed(_) => Ok(()),
            CleanupOutcome::Failed { path, reason } => Err(HarnessError::Cleanup {
                path: path.display().to_string(),
                reason,
            }),
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario: {}", self.scenario)?;
        for (idx, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {:>2}. [{}] {}", idx + 1, step.status.label(), step.name)?;
        }
        match &self.cleanup {
            CleanupOutcome::Removed(path) => write!(f, "  cleanup: removed {}", path.display()),
            CleanupOutcome::Failed { path, reason } => {
                write!(f, "  cleanup: FAILED for {}: {reason}", path.display())
            }
        }
    }
}
