use std::sync::{Arc, Mutex};

use compatrun::exec::{CommandBuilder, CommandSpec, Launcher, ProcessSession, RealLauncher};

/// A launcher that:
/// - records every spec it was asked to launch
/// - then launches it for real.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    launched: Arc<Mutex<Vec<CommandSpec>>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Specs launched so far, in order.
    pub fn launched(&self) -> Vec<CommandSpec> {
        self.launched.lock().unwrap().clone()
    }

    /// Binaries launched so far, in order.
    pub fn binaries(&self) -> Vec<String> {
        self.launched().into_iter().map(|s| s.binary).collect()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, command: &CommandBuilder) -> ProcessSession {
        {
            let mut guard = self.launched.lock().unwrap();
            guard.push(command.spec().clone());
        }
        RealLauncher.launch(command)
    }
}
