// src/exec/spec.rs

//! Immutable description of one external invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Everything needed to launch one process.
///
/// A `CommandSpec` is a plain value. Once a launch begins the session holds
/// its own `Arc<CommandSpec>`, so later builder updates never reach an
/// in-flight process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Filesystem path or executable name resolved through `PATH`.
    pub binary: String,
    /// Arguments, passed as discrete argv elements (no shell).
    pub args: Vec<String>,
    /// Overrides merged onto the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Wall-clock limit; `None` waits forever.
    pub timeout: Option<Duration>,
    /// Working directory; `None` inherits ours.
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            timeout: None,
            current_dir: None,
        }
    }

    /// Build the Tokio command for this spec.
    ///
    /// Stdio piping and process-group setup are left to the launcher.
    pub(crate) fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.args(&self.args).envs(&self.env);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-ish rendering used in logs and diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={} ", quote(value))?;
        }
        write!(f, "{}", quote(&self.binary))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
