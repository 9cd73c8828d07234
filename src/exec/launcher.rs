// src/exec/launcher.rs

//! Pluggable launch abstraction.
//!
//! The orchestrator talks to a `Launcher` instead of calling
//! [`CommandBuilder::run`] directly, so tests can observe (or intercept)
//! exactly which invocations a scenario made.

use super::builder::CommandBuilder;
use super::session::ProcessSession;

/// Trait abstracting how a built command becomes a running session.
pub trait Launcher: Send + Sync {
    /// Start `command` without waiting for it.
    fn launch(&self, command: &CommandBuilder) -> ProcessSession;
}

/// Spawns real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealLauncher;

impl Launcher for RealLauncher {
    fn launch(&self, command: &CommandBuilder) -> ProcessSession {
        command.run()
    }
}

impl<L: Launcher + ?Sized> Launcher for &L {
    fn launch(&self, command: &CommandBuilder) -> ProcessSession {
        (**self).launch(command)
    }
}
