// SPDX-License-Identifier: MIT
//
// Render errors.
//
// Only the terminal write can fail at render time. Short writes and EINTR are
// resumed inside `output::write_frame` and never surface here; what does
// surface is a writer that stops accepting bytes, a non-blocking descriptor
// that stays full, or a hard I/O error.

use std::io;

use thiserror::Error;

/// Errors that can occur while writing a frame to the terminal.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Hard I/O error from the terminal device.
    #[error("terminal write failed: {0}")]
    Io(#[from] io::Error),

    /// The writer accepted zero bytes with output still pending.
    #[error("terminal accepted no bytes after {written} of {total}")]
    WriteZero { written: usize, total: usize },

    /// The descriptor kept reporting `WouldBlock`.
    #[error("terminal stayed busy for {retries} retries after {written} of {total} bytes")]
    RetriesExhausted {
        written: usize,
        total: usize,
        retries: u32,
    },
}

impl RenderError {
    /// Bytes of the frame that reached the terminal before the failure.
    #[must_use]
    pub const fn bytes_written(&self) -> Option<usize> {
        match self {
            Self::Io(_) => None,
            Self::WriteZero { written, .. } | Self::RetriesExhausted { written, .. } => {
                Some(*written)
            }
        }
    }
}

/// Result alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
