// src/exec/watcher.rs

//! Per-session monitor: process exit vs. timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, error, info, warn};

use super::session::SessionState;
use super::spec::CommandSpec;

/// How long output pumps may keep draining once the race is decided.
///
/// A descendant that inherited the pipes can hold them open after the
/// direct child exits; past this point we stop waiting and keep what was
/// captured.
pub const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Spawn the single task that decides how `child` ends.
///
/// Exactly one terminal state is published on `state_tx`, and only after
/// the output pumps have drained, so readers that saw a terminal state
/// always see final buffers.
pub(crate) fn spawn_watcher(
    child: Child,
    spec: Arc<CommandSpec>,
    pumps: Vec<JoinHandle<()>>,
    state_tx: watch::Sender<SessionState>,
) {
    tokio::spawn(async move {
        let started = Instant::now();
        let terminal = race(child, &spec).await;
        drain(pumps, &spec.binary).await;

        info!(
            binary = %spec.binary,
            state = ?terminal,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "process session finished"
        );

        state_tx.send_replace(terminal);
    });
}

async fn race(mut child: Child, spec: &CommandSpec) -> SessionState {
    let pid = child.id();
    let limit = spec.timeout;

    let timer = async move {
        match limit {
            Some(after) => {
                sleep(after).await;
                after
            }
            None => std::future::pending::<Duration>().await,
        }
    };

    tokio::select! {
        status_res = child.wait() => {
            match status_res {
                Ok(status) => {
                    let exit_code = status.code().unwrap_or(-1);
                    debug!(
                        binary = %spec.binary,
                        exit_code,
                        success = status.success(),
                        "process exited"
                    );
                    SessionState::Completed { exit_code }
                }
                Err(e) => {
                    error!(binary = %spec.binary, error = %e, "waiting for process failed");
                    SessionState::Completed { exit_code: -1 }
                }
            }
        }

        after = timer => {
            warn!(
                binary = %spec.binary,
                timeout_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
                "timeout elapsed; killing process"
            );
            terminate(&mut child, pid, &spec.binary).await;
            SessionState::TimedOut { after }
        }
    }
}

/// Forced termination: SIGKILL to the process group (Unix), then kill and
/// reap the direct child.
async fn terminate(child: &mut Child, pid: Option<u32>, binary: &str) {
    #[cfg(unix)]
    {
        if let Some(pid) = pid {
            kill_process_group(pid, binary);
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(e) = child.kill().await {
        warn!(binary = %binary, error = %e, "failed to kill child process on timeout");
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32, binary: &str) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!(binary = %binary, pgid = raw, error = %e, "killpg failed");
    }
}

async fn drain(pumps: Vec<JoinHandle<()>>, binary: &str) {
    let deadline = Instant::now() + DRAIN_GRACE;
    for mut pump in pumps {
        if timeout_at(deadline, &mut pump).await.is_err() {
            warn!(
                binary = %binary,
                "output still open after process ended; abandoning remaining output"
            );
            pump.abort();
        }
    }
}
