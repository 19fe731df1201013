// SPDX-License-Identifier: MIT
//
// Palette: 264 color-pair entries for smooth gradients with 4-bit color.
//
// A terminal with only the 16 classic colors can still render gradients if
// you mix a foreground and a background through a shade glyph. A light shade
// (░) shows ~25% foreground, a medium shade (▒) ~50%, a dark shade (▓) ~75%,
// a full block (█) 100%. Every ordered pair of the eight base colors, in dim
// and bright foreground variants, through each density, gives a table that
// an animation can walk index by index.
//
// The order of construction IS the index → appearance mapping:
//
//   tier                        iteration                       count  indices
//   ──────────────────────────  ──────────────────────────────  ─────  ───────
//   dim quarter-shade     ░     bg × fg, fg ≠ bg                   56    0–55
//   dim half-shade        ▒     bg × fg, fg from 1 + bg             28   56–83
//   dim solid             ' '   bg, default fg                       8   84–91
//   bright quarter-shade  ░     bg × fg                             64  92–155
//   bright half-shade     ▒     bg × fg, fg from bg                 36 156–191
//   bright 3/4-shade      ▓     bg × fg                             64 192–255
//   full block            █     c, fg = bright c, bg = c             8 256–263
//
// Producers index this table with arithmetic on animation state (e.g.
// `(noise + tick) / 12 % 264`), so the count is load-bearing: a table of any
// other size would break the modulo. The count is checked at compile time.

use crate::cell::{BG_BASE, Cell, DEFAULT_FG, FG_BASE, FG_BRIGHT_BASE};

// ─── Glyphs ─────────────────────────────────────────────────────────────────

/// U+2591 LIGHT SHADE.
pub const LIGHT_SHADE: char = '\u{2591}';
/// U+2592 MEDIUM SHADE.
pub const MEDIUM_SHADE: char = '\u{2592}';
/// U+2593 DARK SHADE.
pub const DARK_SHADE: char = '\u{2593}';
/// U+2588 FULL BLOCK.
pub const FULL_BLOCK: char = '\u{2588}';

/// Number of base colors (black, red, green, yellow, blue, magenta, cyan, white).
const BASE_COLORS: u8 = 8;

/// Number of palette entries.
pub const PALETTE_LEN: usize = 264;

// ─── Tier ───────────────────────────────────────────────────────────────────

/// The density tier a palette entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    DimQuarter,
    DimHalf,
    DimSolid,
    BrightQuarter,
    BrightHalf,
    BrightThreeQuarter,
    Full,
}

impl Tier {
    /// All tiers in construction order.
    pub const ALL: [Self; 7] = [
        Self::DimQuarter,
        Self::DimHalf,
        Self::DimSolid,
        Self::BrightQuarter,
        Self::BrightHalf,
        Self::BrightThreeQuarter,
        Self::Full,
    ];

    /// Number of entries in this tier.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::DimQuarter => 56,
            Self::DimHalf => 28,
            Self::DimSolid | Self::Full => 8,
            Self::BrightQuarter | Self::BrightThreeQuarter => 64,
            Self::BrightHalf => 36,
        }
    }

    /// Index of the first entry of this tier.
    #[must_use]
    pub const fn start(self) -> usize {
        let mut start = 0;
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i] as u8 == self as u8 {
                return start;
            }
            start += Self::ALL[i].len();
            i += 1;
        }
        start
    }
}

const _: () = {
    let mut total = 0;
    let mut i = 0;
    while i < Tier::ALL.len() {
        total += Tier::ALL[i].len();
        i += 1;
    }
    assert!(total == PALETTE_LEN);
};

// ─── PaletteEntry ───────────────────────────────────────────────────────────

/// One resolved appearance: foreground code, background code, glyph.
pub type PaletteEntry = Cell;

// ─── Palette ────────────────────────────────────────────────────────────────

/// The fixed 264-entry color-pair table.
///
/// ```
/// use shade_term::palette::{Palette, LIGHT_SHADE, FULL_BLOCK};
///
/// let palette = Palette::new();
/// assert_eq!(palette.len(), 264);
///
/// let first = palette.get(0).unwrap();
/// assert_eq!((first.fg, first.bg, first.glyph), (31, 40, LIGHT_SHADE));
///
/// // Animation code wraps instead of checking.
/// assert_eq!(palette.wrapping(264 + 263).glyph, FULL_BLOCK);
/// assert!(palette.get(264).is_none());
/// ```
#[derive(Clone)]
pub struct Palette {
    entries: [PaletteEntry; PALETTE_LEN],
}

impl Palette {
    /// Build the table. Total, deterministic, no side effects.
    #[must_use]
    pub fn new() -> Self {
        let mut entries = [Cell::BLANK; PALETTE_LEN];
        let mut offset = 0;
        let mut push = |fg: u8, bg: u8, glyph: char| {
            entries[offset] = Cell::new(fg, bg, glyph);
            offset += 1;
        };

        for bg in 0..BASE_COLORS {
            for fg in (0..BASE_COLORS).filter(|&fg| fg != bg) {
                push(FG_BASE + fg, BG_BASE + bg, LIGHT_SHADE);
            }
        }

        // Triangular: the first foreground moves one step right per background.
        for bg in 0..BASE_COLORS {
            for fg in bg + 1..BASE_COLORS {
                push(FG_BASE + fg, BG_BASE + bg, MEDIUM_SHADE);
            }
        }

        for bg in 0..BASE_COLORS {
            push(DEFAULT_FG, BG_BASE + bg, ' ');
        }

        for bg in 0..BASE_COLORS {
            for fg in 0..BASE_COLORS {
                push(FG_BRIGHT_BASE + fg, BG_BASE + bg, LIGHT_SHADE);
            }
        }

        for bg in 0..BASE_COLORS {
            for fg in bg..BASE_COLORS {
                push(FG_BRIGHT_BASE + fg, BG_BASE + bg, MEDIUM_SHADE);
            }
        }

        for bg in 0..BASE_COLORS {
            for fg in 0..BASE_COLORS {
                push(FG_BRIGHT_BASE + fg, BG_BASE + bg, DARK_SHADE);
            }
        }

        for c in 0..BASE_COLORS {
            push(FG_BRIGHT_BASE + c, BG_BASE + c, FULL_BLOCK);
        }

        debug_assert_eq!(offset, PALETTE_LEN);
        Self { entries }
    }

    /// Number of entries (always [`PALETTE_LEN`]).
    #[inline]
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn len(&self) -> usize {
        PALETTE_LEN
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Checked lookup. `None` for `index >= 264`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<PaletteEntry> {
        self.entries.get(index).copied()
    }

    /// Lookup with the index taken modulo the table size.
    #[inline]
    #[must_use]
    pub const fn wrapping(&self, index: usize) -> PaletteEntry {
        self.entries[index % PALETTE_LEN]
    }

    /// Iterate entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Palette({} entries)", PALETTE_LEN)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
