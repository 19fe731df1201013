// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; the renderer makes those. This module
// just knows the byte-level encoding of every terminal command we need.
//
// Cursor columns are 0-indexed in our API and converted to 1-indexed for
// the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).

use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Move the cursor to column `x` of the current row (CHA).
///
/// Our column is 0-indexed; ANSI CHA is 1-indexed.
#[inline]
pub fn cursor_column(w: &mut impl Write, x: u16) -> io::Result<()> {
    write!(w, "\x1b[{}G", u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes, short form (`ESC [ m`).
///
/// Emitted at the start of every row. Three bytes instead of four.
#[inline]
pub fn reset_attrs(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[m")
}

/// Reset all SGR attributes, explicit form (`ESC [ 0 m`).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set foreground and background together: `ESC [ fg ; bg m`.
///
/// One sequence instead of two whenever both channels change.
#[inline]
pub fn sgr_pair(w: &mut impl Write, fg: u8, bg: u8) -> io::Result<()> {
    write!(w, "\x1b[{fg};{bg}m")
}

/// Set one channel: `ESC [ code m`. Works for foreground or background codes.
#[inline]
pub fn sgr(w: &mut impl Write, code: u8) -> io::Result<()> {
    write!(w, "\x1b[{code}m")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
///
/// The alternate screen is a separate buffer that preserves the original
/// terminal content. On exit, the original content is restored.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Glyphs ─────────────────────────────────────────────────────────────────

/// Encode a glyph as UTF-8 into `scratch` and return the encoded bytes.
///
/// The single place where glyph bytes are produced. Shade and block glyphs
/// are three bytes (`E2 96 xx`); ASCII is one. Never truncates.
///
/// ```
/// use shade_term::ansi::encode_glyph;
///
/// let mut scratch = [0u8; 4];
/// assert_eq!(encode_glyph('A', &mut scratch), b"A");
/// assert_eq!(encode_glyph('\u{2592}', &mut scratch), &[0xE2, 0x96, 0x92]);
/// ```
#[inline]
#[must_use]
pub fn encode_glyph(glyph: char, scratch: &mut [u8; 4]) -> &[u8] {
    glyph.encode_utf8(scratch).as_bytes()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
