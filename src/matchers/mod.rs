// src/matchers/mod.rs

//! Success and content assertions over finished sessions.
//!
//! A [`Matcher`] is a pure function from a terminal [`SessionReport`] to
//! pass/fail. It never touches the process; [`ProcessSession::expect`]
//! does the waiting and hands the matcher a frozen snapshot.
//!
//! [`ProcessSession::expect`]: crate::exec::ProcessSession::expect

pub mod predicate;

use std::time::Duration;

use thiserror::Error;

use crate::exec::{SessionReport, SessionState};

pub use predicate::{
    ContainSubstring, Equal, MatchRegex, OutputPredicate, Satisfy, contain_substring, equal,
    match_regex, satisfy,
};

/// Why a session did not satisfy a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("launch failed: {reason}")]
    LaunchFailed { reason: String },

    #[error("timed out after {after:?}")]
    TimedOut { after: Duration },

    #[error("exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("exited 0 but stdout did not {predicate}")]
    OutputMismatch { predicate: String },

    /// Only reachable if a matcher is handed a non-terminal report.
    #[error("process still running")]
    StillRunning,
}

/// Failure diagnostic: the reason plus the full captured output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}\ncommand: {command}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
pub struct MatchFailure {
    pub command: String,
    pub kind: FailureKind,
    pub stdout: String,
    pub stderr: String,
}

impl MatchFailure {
    pub fn new(report: &SessionReport, kind: FailureKind) -> Self {
        Self {
            command: report.spec.to_string(),
            kind,
            stdout: report.stdout_lossy(),
            stderr: report.stderr_lossy(),
        }
    }
}

/// Typed predicate over a terminal session.
pub trait Matcher: Send + Sync {
    fn describe(&self) -> String;

    fn check(&self, report: &SessionReport) -> Result<(), MatchFailure>;
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn check(&self, report: &SessionReport) -> Result<(), MatchFailure> {
        (**self).check(report)
    }
}

impl Matcher for Box<dyn Matcher> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn check(&self, report: &SessionReport) -> Result<(), MatchFailure> {
        (**self).check(report)
    }
}

/// Passes iff the session completed with exit code 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSuccessfully;

impl Matcher for RunSuccessfully {
    fn describe(&self) -> String {
        "run successfully".to_string()
    }

    fn check(&self, report: &SessionReport) -> Result<(), MatchFailure> {
        let kind = match &report.state {
            SessionState::Completed { exit_code: 0 } => return Ok(()),
            SessionState::Completed { exit_code } => FailureKind::NonZeroExit { code: *exit_code },
            SessionState::TimedOut { after } => FailureKind::TimedOut { after: *after },
            SessionState::LaunchFailed { reason } => FailureKind::LaunchFailed {
                reason: reason.clone(),
            },
            SessionState::Running => FailureKind::StillRunning,
        };
        Err(MatchFailure::new(report, kind))
    }
}

/// [`RunSuccessfully`] plus a predicate on the final stdout.
#[derive(Debug, Clone)]
pub struct RunSuccessfullyWithOutput<P> {
    predicate: P,
}

impl<P: OutputPredicate> Matcher for RunSuccessfullyWithOutput<P> {
    fn describe(&self) -> String {
        format!(
            "run successfully with stdout that should {}",
            self.predicate.describe()
        )
    }

    fn check(&self, report: &SessionReport) -> Result<(), MatchFailure> {
        RunSuccessfully.check(report)?;

        if self.predicate.holds(&report.stdout_lossy()) {
            Ok(())
        } else {
            Err(MatchFailure::new(
                report,
                FailureKind::OutputMismatch {
                    predicate: self.predicate.describe(),
                },
            ))
        }
    }
}

pub fn run_successfully() -> RunSuccessfully {
    RunSuccessfully
}

pub fn run_successfully_with_output<P: OutputPredicate>(
    predicate: P,
) -> RunSuccessfullyWithOutput<P> {
    RunSuccessfullyWithOutput { predicate }
}
