// SPDX-License-Identifier: MIT
//
// Cell: the atomic unit of rendering.
//
// Every character position on screen is a Cell: an SGR foreground code, an
// SGR background code, and one single-column glyph. Colors are stored as the
// raw terminal codes (30–37, 39, 90–97 for foreground; 40–47, 49 for
// background) because that is exactly what the renderer emits. There is no
// color model to resolve at output time.
//
// Size: 8 bytes per cell (4-byte char + two u8 codes + padding), Copy.
// A 512×256 canvas = 131,072 cells = 1 MB per canvas.
//
// Equality is by resolved appearance. Two cells painted from different
// palette indices that happen to share (fg, bg, glyph) compare equal, which
// is what lets the diff skip them.

// ─── SGR Codes ──────────────────────────────────────────────────────────────

/// SGR 39, the default foreground color.
pub const DEFAULT_FG: u8 = 39;

/// SGR 49, the default background color.
pub const DEFAULT_BG: u8 = 49;

/// First of the eight dim foreground codes (30–37).
pub const FG_BASE: u8 = 30;

/// First of the eight bright foreground codes (90–97).
pub const FG_BRIGHT_BASE: u8 = 90;

/// First of the eight background codes (40–47).
pub const BG_BASE: u8 = 40;

// ─── Cell ───────────────────────────────────────────────────────────────────

/// One character position: foreground code, background code, glyph.
///
/// The default cell is a blank on default colors, which is what a freshly
/// cleared terminal shows. A canvas full of default cells therefore
/// describes the screen right after the terminal session starts.
///
/// ```
/// use shade_term::cell::Cell;
///
/// let cell = Cell::new(31, 40, 'A');
/// assert_eq!(cell.fg, 31);
/// assert_eq!(cell.bg, 40);
/// assert_ne!(cell, Cell::default());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Foreground SGR code.
    pub fg: u8,
    /// Background SGR code.
    pub bg: u8,
    /// The glyph drawn in this position. Must occupy one terminal column.
    pub glyph: char,
}

impl Cell {
    /// A blank cell on default colors.
    pub const BLANK: Self = Self {
        fg: DEFAULT_FG,
        bg: DEFAULT_BG,
        glyph: ' ',
    };

    /// Create a cell from its codes and glyph.
    #[inline]
    #[must_use]
    pub const fn new(fg: u8, bg: u8, glyph: char) -> Self {
        Self { fg, bg, glyph }
    }

    /// Whether this cell is a blank on default colors.
    #[inline]
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        self.fg == DEFAULT_FG && self.bg == DEFAULT_BG && self.glyph == ' '
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::BLANK
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell({:?}, fg={}, bg={})", self.glyph, self.fg, self.bg)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
