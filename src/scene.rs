// SPDX-License-Identifier: MIT
//
// The demo scene: a precomputed noise field scrolled through the palette.
//
// Every cell of the view gets palette index `(noise + tick) / 12 mod 264`,
// so each cell walks the palette one step every 12 frames, phase-shifted by
// the noise under it. Neighbouring cells share most of their noise value and
// therefore most of their colors, which keeps the per-frame diff small.
//
// On top, optionally: the whole palette laid out row-major across the top
// rows, and a one-line status readout at the bottom.

use shade_term::canvas::Canvas;
use shade_term::context::RendererContext;
use shade_term::frame_loop::{Action, Scene};
use shade_term::palette::PALETTE_LEN;
use shade_term::terminal::Size;

use crate::noise::FractalNoise;

/// Frames spent on each palette step.
pub const FRAMES_PER_STEP: u64 = 12;

/// Noise values span the palette exactly once across the field.
#[allow(clippy::cast_possible_truncation)]
pub const NOISE_RANGE: u32 = (PALETTE_LEN as u64 * FRAMES_PER_STEP) as u32;

const QUIT_KEY: u8 = b'q';
const STATUS_FG: u8 = 97;
const STATUS_BG: u8 = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlays {
    pub color_bars: bool,
    pub status: bool,
}

pub struct NoiseScene {
    field: Vec<u32>,
    stride: u16,
    overlays: Overlays,
}

impl NoiseScene {
    /// Sample `noise` once over the whole `max` canvas.
    #[must_use]
    pub fn new(noise: &FractalNoise, max: Size, overlays: Overlays) -> Self {
        Self {
            field: noise.field(max.cols, max.rows, NOISE_RANGE),
            stride: max.cols,
            overlays,
        }
    }

    // Result is < PALETTE_LEN.
    #[allow(clippy::cast_possible_truncation)]
    fn palette_index(&self, x: u16, y: u16, tick: u64) -> usize {
        let offset = usize::from(x) + usize::from(y) * usize::from(self.stride);
        let value = u64::from(self.field[offset]);
        ((value + tick) / FRAMES_PER_STEP % PALETTE_LEN as u64) as usize
    }

    fn paint_noise(&self, ctx: &RendererContext, canvas: &mut Canvas, tick: u64) {
        let view = ctx.view();
        let palette = ctx.palette();
        for y in 0..view.rows {
            for x in 0..view.cols {
                canvas.paint(x, y, palette.wrapping(self.palette_index(x, y, tick)));
            }
        }
    }

    fn paint_color_bars(ctx: &RendererContext, canvas: &mut Canvas) {
        let view = ctx.view();
        if view.cols == 0 {
            return;
        }
        let cols = usize::from(view.cols);
        for (i, entry) in ctx.palette().iter().enumerate() {
            let (x, y) = (i % cols, i / cols);
            if y >= usize::from(view.rows) {
                break;
            }
            // Both < view dimensions.
            #[allow(clippy::cast_possible_truncation)]
            canvas.paint(x as u16, y as u16, *entry);
        }
    }

    fn paint_status(ctx: &RendererContext, canvas: &mut Canvas, tick: u64) {
        let view = ctx.view();
        let Some(y) = view.rows.checked_sub(1) else {
            return;
        };
        let line = format!(
            " frame {tick}  view {view}  last {} B  q quits ",
            ctx.stats().last()
        );
        canvas.print(0, y, &line, STATUS_FG, STATUS_BG);
    }
}

impl Scene for NoiseScene {
    fn on_key(&mut self, key: u8) -> Action {
        if key == QUIT_KEY {
            Action::Quit
        } else {
            Action::Continue
        }
    }

    fn paint(&mut self, ctx: &RendererContext, canvas: &mut Canvas, tick: u64) {
        self.paint_noise(ctx, canvas, tick);
        if self.overlays.color_bars {
            Self::paint_color_bars(ctx, canvas);
        }
        if self.overlays.status {
            Self::paint_status(ctx, canvas, tick);
        }
    }
}
