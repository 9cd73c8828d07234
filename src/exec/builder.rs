// src/exec/builder.rs

//! Fluent construction of a [`CommandSpec`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::session::ProcessSession;
use super::spec::CommandSpec;

/// Accumulates a [`CommandSpec`] and launches it.
///
/// Every `with_*` call consumes the builder and returns an updated one, so a
/// builder bound to a name can be cloned and specialised without aliasing:
///
/// ```no_run
/// # use compatrun::exec::CommandBuilder;
/// # use std::time::Duration;
/// let get = CommandBuilder::new("eksctl").with_args(["get"]);
/// let get_cluster = get.clone().with_args(["cluster", "--output", "json"]);
/// let slow = get_cluster.clone().with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    spec: CommandSpec,
}

impl CommandBuilder {
    /// Empty args, empty env, no timeout.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            spec: CommandSpec::new(binary),
        }
    }

    /// Append arguments after any already present.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_arg(self, arg: impl Into<String>) -> Self {
        self.with_args([arg])
    }

    /// Add one environment override; a repeated key replaces the old value.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.env.insert(key.into(), value.into());
        self
    }

    pub fn with_envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        vars.into_iter()
            .fold(self, |builder, (k, v)| builder.with_env(k, v))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.spec.timeout = Some(timeout);
        self
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spec.current_dir = Some(dir.into());
        self
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub fn into_spec(self) -> CommandSpec {
        self.spec
    }

    /// Launch the process and return immediately.
    ///
    /// Never fails: if the binary cannot be executed the returned session is
    /// already in `LaunchFailed`. Must be called from within a Tokio runtime.
    pub fn run(&self) -> ProcessSession {
        ProcessSession::launch(Arc::new(self.spec.clone()))
    }
}

impl From<CommandSpec> for CommandBuilder {
    fn from(spec: CommandSpec) -> Self {
        Self { spec }
    }
}
