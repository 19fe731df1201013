// SPDX-License-Identifier: MIT
//
// Canvas: one frame's worth of cells at a fixed maximum stride.
//
// Design:
//
//   - Flat `Vec<Cell>` sized to the MAXIMUM supported viewport, row-major
//     with `offset = x + y * max_width`. The stride never follows the live
//     terminal width, so a resize never reallocates: a smaller terminal
//     just touches a sub-rectangle at the top-left.
//
//   - Two canvases live for the whole session (current and previous). After
//     each render they exchange storage with `swap`, a pointer exchange of
//     the owning `Vec`s. No cell is copied.
//
//   - Access is bounds-checked against the maximum dimensions. Out-of-range
//     reads return `None` and out-of-range writes are ignored; the renderer's
//     row slices are the one place that trusts its (pre-clamped) inputs.
//
// Memory:
//
//   512×256 maximum = 131,072 cells × 8 bytes = 1 MB per canvas, 2 MB for
//   the pair.

use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;
use crate::palette::PaletteEntry;

/// Replacement for characters that do not occupy exactly one column.
const NARROW_FALLBACK: char = '?';

// ─── Canvas ─────────────────────────────────────────────────────────────────

/// A fixed-capacity 2D grid of cells.
///
/// # Examples
///
/// ```
/// use shade_term::canvas::Canvas;
/// use shade_term::cell::Cell;
///
/// let mut canvas = Canvas::new(80, 24);
/// canvas.set(5, 3, Cell::new(31, 40, 'X'));
/// assert_eq!(canvas.get(5, 3).unwrap().glyph, 'X');
/// assert!(canvas.get(80, 0).is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    // ─── Construction ────────────────────────────────────────────────────

    /// Allocate a canvas of `width × height` blank cells.
    ///
    /// Pass the maximum supported dimensions, not the live terminal size.
    /// Allocation failure aborts the process.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Allocated width (the row stride).
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Allocated height.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is within the allocated dimensions.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        x as usize + y as usize * self.width as usize
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Get a mutable cell, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// The raw cell slice, stride = [`width`](Self::width).
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The first `len` cells of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height` or `len > width`. The renderer only calls
    /// this with a view size already clamped to the canvas dimensions.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16, len: u16) -> &[Cell] {
        assert!(y < self.height && len <= self.width, "row outside canvas");
        let start = self.index(0, y);
        &self.cells[start..start + usize::from(len)]
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Write a cell. Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        self.get_mut(x, y).map(|slot| *slot = cell).is_some()
    }

    /// Copy a palette entry into the cell at `(x, y)`.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn paint(&mut self, x: u16, y: u16, entry: PaletteEntry) -> bool {
        self.set(x, y, entry)
    }

    /// Fill every cell with `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Write a line of text starting at `(x, y)`, one character per cell.
    ///
    /// Cells are single-column, so characters whose display width is not 1
    /// (wide CJK, zero-width marks, control characters) are drawn as `?`.
    /// Clipped at the right edge. Returns the number of cells written.
    pub fn print(&mut self, x: u16, y: u16, text: &str, fg: u8, bg: u8) -> u16 {
        if y >= self.height {
            return 0;
        }

        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let glyph = if ch.width() == Some(1) {
                ch
            } else {
                NARROW_FALLBACK
            };
            self.set(col, y, Cell::new(fg, bg, glyph));
            col += 1;
        }

        col.saturating_sub(x)
    }

    // ─── Double Buffering ────────────────────────────────────────────────

    /// Exchange storage with `other` in O(1).
    ///
    /// This is how "current" becomes "previous": the vectors trade owners,
    /// nothing is copied, and the two canvases never share storage.
    pub fn swap(&mut self, other: &mut Self) {
        debug_assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "swapped canvases must share dimensions"
        );
        std::mem::swap(&mut self.cells, &mut other.cells);
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Canvas({}x{})", self.width, self.height)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
