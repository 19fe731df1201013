// SPDX-License-Identifier: MIT
//
// Command-line options.

use std::path::PathBuf;

use clap::Parser;
use shade_term::context::DEFAULT_SKIP_THRESHOLD;
use shade_term::frame_loop::LoopConfig;
use shade_term::terminal::Size;

/// Animated fractal-noise demo for the shade terminal renderer.
///
/// Press `q` to quit.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Frames per second.
    #[arg(long, default_value_t = LoopConfig::DEFAULT_FPS)]
    pub fps: u32,

    /// Noise seed. Derived from the clock when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of noise octaves.
    #[arg(long, default_value_t = 8)]
    pub octaves: u32,

    /// Amplitude factor from one octave to the next.
    #[arg(long, default_value_t = 1.0)]
    pub persistence: f32,

    /// Unchanged runs at least this long become a cursor jump.
    #[arg(long, default_value_t = DEFAULT_SKIP_THRESHOLD)]
    pub skip_threshold: u16,

    /// Widest terminal rendered; wider terminals are clipped.
    #[arg(long, default_value_t = 512)]
    pub max_width: u16,

    /// Tallest terminal rendered; taller terminals are clipped.
    #[arg(long, default_value_t = 256)]
    pub max_height: u16,

    /// Hide the palette bars along the top.
    #[arg(long)]
    pub no_color_bars: bool,

    /// Show a status line with the frame number and frame size.
    #[arg(long)]
    pub status: bool,

    /// Write logs to this file (filtered by `RUST_LOG`, default `info`).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Canvas allocation size.
    #[must_use]
    pub const fn max_size(&self) -> Size {
        Size {
            cols: self.max_width,
            rows: self.max_height,
        }
    }

    #[must_use]
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig::from_fps(self.fps)
    }
}
