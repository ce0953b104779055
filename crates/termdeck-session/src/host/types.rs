//! PTY host types: per-session handle and host errors.

use std::io::Write;

use portable_pty::{ChildKiller, MasterPty, PtySize};
use termdeck_common::TermError;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Bytes read from a PTY per read call.
pub const PTY_READ_CHUNK: usize = 8_192;

/// Size a PTY is opened with, before the first resize arrives.
pub const DEFAULT_COLS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 24;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to open PTY: {0}")]
    Open(String),

    #[error("failed to spawn shell '{shell}': {reason}")]
    Spawn { shell: String, reason: String },

    #[error("working directory does not exist: {0}")]
    MissingCwd(String),

    #[error("PTY I/O failed: {0}")]
    Io(String),

    #[error("session already has a process")]
    AlreadyRunning,
}

impl From<PtyError> for TermError {
    fn from(e: PtyError) -> Self {
        TermError::Pty(e.to_string())
    }
}

// =============================================================================
// PTY HANDLE
// =============================================================================

/// The host's side of one session's process.
///
/// The child itself lives on the reader thread, which waits for it after
/// output ends; the handle keeps a killer to terminate it early.
pub struct PtyHandle {
    pub(super) writer: Box<dyn Write + Send>,
    pub(super) master: Box<dyn MasterPty + Send>,
    pub(super) killer: Box<dyn ChildKiller + Send + Sync>,
    pub(super) size: PtySize,
    pub(super) pid: Option<u32>,
}

impl PtyHandle {
    pub fn write_input(&mut self, data: &[u8]) -> Result<(), PtyError> {
        self.writer
            .write_all(data)
            .and_then(|()| self.writer.flush())
            .map_err(|e| PtyError::Io(format!("write failed: {e}")))
    }

    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<(), PtyError> {
        let new_size = PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        };
        self.master
            .resize(new_size)
            .map_err(|e| PtyError::Io(format!("resize failed: {e}")))?;
        self.size = new_size;
        Ok(())
    }

    pub fn kill(&mut self) {
        if let Err(e) = self.killer.kill() {
            tracing::debug!("PTY kill error (may already be dead): {e}");
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.size.cols, self.size.rows)
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}
