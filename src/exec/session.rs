// src/exec/session.rs

//! Handle to one launched (or failed-to-launch) process.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::matchers::{MatchFailure, Matcher};

use super::capture::{OutputBuffer, Stream, spawn_pump};
use super::spec::CommandSpec;
use super::watcher::spawn_watcher;

/// Lifecycle of a session.
///
/// `Running` is the only non-terminal state. The exit code exists only
/// inside `Completed`; a timed-out or failed launch has none to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Running,
    /// The process exited on its own. Exits caused by an outside signal are
    /// recorded as `-1`.
    Completed { exit_code: i32 },
    /// The timer won the race and the process was killed.
    TimedOut { after: Duration },
    /// The binary could not be executed at all.
    LaunchFailed { reason: String },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Running)
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            SessionState::Completed { exit_code } => Some(*exit_code),
            _ => None,
        }
    }

    /// `Completed` with exit code 0.
    pub fn is_success(&self) -> bool {
        self.exit_code() == Some(0)
    }
}

/// Live or finished handle to one invocation.
///
/// Cloning is cheap and every clone observes the same process.
#[derive(Debug, Clone)]
pub struct ProcessSession {
    spec: Arc<CommandSpec>,
    stdout: OutputBuffer,
    stderr: OutputBuffer,
    state_rx: watch::Receiver<SessionState>,
}

impl ProcessSession {
    pub(crate) fn launch(spec: Arc<CommandSpec>) -> Self {
        let stdout = OutputBuffer::new();
        let stderr = OutputBuffer::new();

        info!(
            binary = %spec.binary,
            args = ?spec.args,
            timeout_ms = spec
                .timeout
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            "launching process"
        );

        let mut cmd = spec.to_command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so a timeout can take descendants down too.
        #[cfg(unix)]
        {
            cmd.process_group(0);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                let reason = format!("failed to launch '{}': {e}", spec.binary);
                warn!(binary = %spec.binary, error = %e, "process launch failed");
                let (_tx, state_rx) = watch::channel(SessionState::LaunchFailed { reason });
                return Self {
                    spec,
                    stdout,
                    stderr,
                    state_rx,
                };
            }
        };

        let mut pumps = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            pumps.push(spawn_pump(out, stdout.clone(), Stream::Stdout, spec.binary.clone()));
        }
        if let Some(err) = child.stderr.take() {
            pumps.push(spawn_pump(err, stderr.clone(), Stream::Stderr, spec.binary.clone()));
        }

        let (state_tx, state_rx) = watch::channel(SessionState::Running);
        spawn_watcher(child, Arc::clone(&spec), pumps, state_tx);

        Self {
            spec,
            stdout,
            stderr,
            state_rx,
        }
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Current state without waiting.
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.state_rx.borrow().is_terminal()
    }

    /// Block until the session is terminal and return that state.
    pub async fn wait(&self) -> SessionState {
        let mut rx = self.state_rx.clone();
        let waited = rx
            .wait_for(SessionState::is_terminal)
            .await
            .map(|state| state.clone());
        match waited {
            Ok(state) => state,
            // Watcher gone without a terminal transition; report what we have.
            Err(_) => rx.borrow().clone(),
        }
    }

    /// Exit code once terminal; `None` unless the state is `Completed`.
    pub async fn exit_code(&self) -> Option<i32> {
        self.wait().await.exit_code()
    }

    /// Stdout captured so far (complete once terminal).
    pub fn stdout(&self) -> Vec<u8> {
        self.stdout.contents()
    }

    /// Stderr captured so far (complete once terminal).
    pub fn stderr(&self) -> Vec<u8> {
        self.stderr.contents()
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout()).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr()).into_owned()
    }

    /// Wait for termination, then snapshot everything a matcher needs.
    pub async fn report(&self) -> SessionReport {
        let state = self.wait().await;
        SessionReport {
            spec: Arc::clone(&self.spec),
            state,
            stdout: self.stdout(),
            stderr: self.stderr(),
        }
    }

    /// Wait for termination and evaluate `matcher` against the result.
    pub async fn expect(&self, matcher: &dyn Matcher) -> Result<(), MatchFailure> {
        matcher.check(&self.report().await)
    }
}

/// Frozen view of a terminal session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub spec: Arc<CommandSpec>,
    pub state: SessionState,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl SessionReport {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
