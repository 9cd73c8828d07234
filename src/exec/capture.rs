// src/exec/capture.rs

//! Streaming capture of a child's stdout/stderr.
//!
//! Each stream is read by its own Tokio task while the process runs, so a
//! session that is killed on timeout still holds everything written up to
//! that point.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const CHUNK_SIZE: usize = 8 * 1024;

/// Append-only byte buffer shared between a pump task and its session.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything captured so far.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, bytes: &[u8]) {
        self.lock().extend_from_slice(bytes);
    }

    // A pump that panicked mid-append leaves a valid Vec; keep using it.
    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Which stream a pump is reading, for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Spawn a task copying `reader` into `buffer` until EOF or a read error.
pub fn spawn_pump<R>(
    reader: R,
    buffer: OutputBuffer,
    stream: Stream,
    binary: String,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = reader;
        let mut chunk = vec![0u8; CHUNK_SIZE];

        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    buffer.append(&chunk[..n]);
                    for line in String::from_utf8_lossy(&chunk[..n]).lines() {
                        debug!(binary = %binary, stream = stream.as_str(), "{}", line);
                    }
                }
                Err(e) => {
                    warn!(
                        binary = %binary,
                        stream = stream.as_str(),
                        error = %e,
                        "reading child output failed; keeping what was captured"
                    );
                    break;
                }
            }
        }

        debug!(binary = %binary, stream = stream.as_str(), "output pump ended");
    })
}
