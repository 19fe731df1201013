// SPDX-License-Identifier: MIT
//
// Output buffering and the frame write.
//
//   OutputBuffer: accumulates a whole frame of ANSI bytes so it can reach
//   the terminal in one write() call. It is sized once, up front, for the
//   worst case at the MAXIMUM canvas size, so no frame ever reallocates it
//   mid-render.
//
//   write_frame: pushes a frame to the terminal, resuming short writes at
//   the remaining byte range and retrying EINTR. A descriptor that stays in
//   WouldBlock is retried a bounded number of times before giving up.

use std::io::{self, Write};

use tracing::warn;

use crate::ansi;
use crate::error::{RenderError, Result};

/// How many consecutive `WouldBlock` results `write_frame` tolerates.
pub const MAX_WRITE_RETRIES: u32 = 64;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates one frame for a single write.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Allocated capacity in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append one byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Append a glyph in its full UTF-8 encoding.
    #[inline]
    pub fn push_glyph(&mut self, glyph: char) {
        let mut scratch = [0u8; 4];
        self.buf
            .extend_from_slice(ansi::encode_glyph(glyph, &mut scratch));
    }

    /// Remove the last byte if it equals `byte`. Returns whether it did.
    pub fn pop_if(&mut self, byte: u8) -> bool {
        if self.buf.last() == Some(&byte) {
            self.buf.pop();
            true
        } else {
            false
        }
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real output goes through write_frame().
        Ok(())
    }
}

// ─── write_frame ─────────────────────────────────────────────────────────────

/// Write all of `bytes` to `out`, then flush. Returns the bytes written.
///
/// A short write resumes with the remaining range. `Interrupted` is retried
/// without limit; `WouldBlock` up to [`MAX_WRITE_RETRIES`] times in a row.
///
/// # Errors
///
/// [`RenderError::WriteZero`] if the writer accepts nothing,
/// [`RenderError::RetriesExhausted`] if it stays busy, and
/// [`RenderError::Io`] for any other I/O error.
pub fn write_frame(out: &mut impl Write, bytes: &[u8]) -> Result<usize> {
    let total = bytes.len();
    let mut written = 0;
    let mut retries = 0;

    while written < total {
        match out.write(&bytes[written..]) {
            Ok(0) => return Err(RenderError::WriteZero { written, total }),
            Ok(n) => {
                written += n;
                retries = 0;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                retries += 1;
                if retries > MAX_WRITE_RETRIES {
                    return Err(RenderError::RetriesExhausted {
                        written,
                        total,
                        retries: MAX_WRITE_RETRIES,
                    });
                }
                warn!(written, total, retries, "terminal busy, retrying write");
                std::thread::yield_now();
            }
            Err(e) => return Err(e.into()),
        }
    }

    out.flush()?;
    Ok(written)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
