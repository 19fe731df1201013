// SPDX-License-Identifier: MIT
//
// RendererContext: everything a render call needs to know besides the two
// canvases.
//
// The caller owns one of these for the whole session and passes it into
// every operation: the maximum (allocated) canvas size, the live terminal
// size, the view (terminal size clamped to the maximum), the run-length
// threshold, the palette producers paint from, and running statistics of
// frame sizes. Nothing here is process-global.

use tracing::debug;

use crate::palette::Palette;
use crate::terminal::Size;

/// Unchanged runs shorter than this are re-emitted as literal glyphs;
/// longer runs become a cursor-column jump.
///
/// `ESC [ n G` costs 4–6 bytes. Below six cells, repeating the glyphs
/// (often one byte each after the style is already active) is cheaper.
pub const DEFAULT_SKIP_THRESHOLD: u16 = 6;

// ─── BufferStats ────────────────────────────────────────────────────────────

/// Running statistics of frame output sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStats {
    frames: u64,
    last: usize,
    smallest: Option<usize>,
    largest: usize,
}

impl BufferStats {
    /// Record one written frame.
    pub fn record(&mut self, bytes: usize) {
        self.frames += 1;
        self.last = bytes;
        self.largest = self.largest.max(bytes);
        self.smallest = Some(self.smallest.map_or(bytes, |s| s.min(bytes)));
    }

    /// Frames recorded.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Size of the most recent frame.
    #[must_use]
    pub const fn last(&self) -> usize {
        self.last
    }

    /// Smallest frame so far, `None` before the first frame.
    #[must_use]
    pub const fn smallest(&self) -> Option<usize> {
        self.smallest
    }

    /// Largest frame so far.
    #[must_use]
    pub const fn largest(&self) -> usize {
        self.largest
    }
}

// ─── RendererContext ────────────────────────────────────────────────────────

/// Session-wide rendering state, owned by the caller.
///
/// ```
/// use shade_term::context::RendererContext;
/// use shade_term::terminal::Size;
///
/// let mut ctx = RendererContext::new(Size { cols: 200, rows: 60 });
/// let view = ctx.resize(Size { cols: 300, rows: 40 });
/// assert_eq!(view, Size { cols: 200, rows: 40 });
/// assert_eq!(ctx.terminal(), Size { cols: 300, rows: 40 });
/// ```
#[derive(Debug, Clone)]
pub struct RendererContext {
    max: Size,
    terminal: Size,
    view: Size,
    skip_threshold: u16,
    home_cursor: bool,
    palette: Palette,
    stats: BufferStats,
}

impl RendererContext {
    /// Create a context for canvases of size `max`.
    ///
    /// The terminal is assumed to be exactly `max` until the first
    /// [`resize`](Self::resize).
    #[must_use]
    pub fn new(max: Size) -> Self {
        Self {
            max,
            terminal: max,
            view: max,
            skip_threshold: DEFAULT_SKIP_THRESHOLD,
            home_cursor: true,
            palette: Palette::new(),
            stats: BufferStats::default(),
        }
    }

    /// Set the run-length threshold (see [`DEFAULT_SKIP_THRESHOLD`]).
    #[must_use]
    pub const fn with_skip_threshold(mut self, threshold: u16) -> Self {
        self.skip_threshold = threshold;
        self
    }

    /// Whether each frame starts with a cursor-home sequence (default on).
    #[must_use]
    pub const fn with_home_cursor(mut self, home: bool) -> Self {
        self.home_cursor = home;
        self
    }

    /// Record a new terminal size and clamp the view to the maximum.
    ///
    /// Returns the new view size.
    pub fn resize(&mut self, terminal: Size) -> Size {
        self.terminal = terminal;
        self.view = Size {
            cols: terminal.cols.min(self.max.cols),
            rows: terminal.rows.min(self.max.rows),
        };
        debug!(
            term_cols = terminal.cols,
            term_rows = terminal.rows,
            view_cols = self.view.cols,
            view_rows = self.view.rows,
            "terminal resized"
        );
        self.view
    }

    /// Allocated canvas size.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> Size {
        self.max
    }

    /// Live terminal size, unclamped.
    #[inline]
    #[must_use]
    pub const fn terminal(&self) -> Size {
        self.terminal
    }

    /// The rendered region: terminal size clamped to the maximum.
    #[inline]
    #[must_use]
    pub const fn view(&self) -> Size {
        self.view
    }

    /// Whether writing the last view column wraps the cursor onto the next
    /// row. False when the terminal is wider than the view.
    #[inline]
    #[must_use]
    pub const fn view_wraps(&self) -> bool {
        self.view.cols == self.terminal.cols
    }

    #[inline]
    #[must_use]
    pub const fn skip_threshold(&self) -> u16 {
        self.skip_threshold
    }

    #[inline]
    #[must_use]
    pub const fn home_cursor(&self) -> bool {
        self.home_cursor
    }

    /// The palette producers paint from.
    #[inline]
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Frame size statistics.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &BufferStats {
        &self.stats
    }

    /// Record the size of a frame that reached the terminal.
    pub fn record_frame(&mut self, bytes: usize) {
        self.stats.record(bytes);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
