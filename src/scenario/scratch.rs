// src/scenario/scratch.rs

//! Scenario-owned scratch directory with guaranteed removal.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

/// Temporary directory owned by one scenario run.
///
/// Removed exactly once: by [`ScratchDir::close`] on the normal path, or by
/// `Drop` if the run unwinds before reaching it.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchDir {
    /// Create `<tmp>/<prefix>XXXXXX`.
    pub fn create(prefix: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        let path = dir.path().to_path_buf();
        info!(path = %path.display(), "created scratch directory");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and report whether that worked.
    pub fn close(mut self) -> io::Result<()> {
        match self.dir.take() {
            Some(dir) => {
                let res = dir.close();
                match &res {
                    Ok(()) => info!(path = %self.path.display(), "removed scratch directory"),
                    Err(e) => warn!(
                        path = %self.path.display(),
                        error = %e,
                        "failed to remove scratch directory"
                    ),
                }
                res
            }
            None => Ok(()),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove scratch directory during unwind"
                );
            } else {
                info!(path = %self.path.display(), "removed scratch directory during unwind");
            }
        }
    }
}
