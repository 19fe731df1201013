// SPDX-License-Identifier: MIT
//
// shade-term: differential ANSI renderer for full-screen terminal animation.
//
// Producers paint palette entries into a fixed-capacity canvas. The renderer
// diffs it against the previous frame and emits only what changed: one reset
// per row, the shortest color sequence per cell, literal replay or a column
// jump across unchanged runs, one write per frame. The canvases then trade
// storage and the next frame begins.
//
// No TUI framework underneath. Escape sequences, termios and signal handling
// are written directly against the terminal, the way the renderer needs them.

pub mod ansi;
pub mod canvas;
pub mod cell;
pub mod context;
pub mod error;
pub mod frame_loop;
pub mod output;
pub mod palette;
pub mod render;
pub mod signal;
pub mod terminal;

pub use canvas::Canvas;
pub use cell::Cell;
pub use context::{BufferStats, RendererContext};
pub use error::RenderError;
pub use frame_loop::{Action, FrameLoop, LoopConfig, Scene};
pub use palette::{Palette, PaletteEntry};
pub use render::Renderer;
pub use terminal::{Size, Terminal, Tty};
