// SPDX-License-Identifier: MIT
//
// Frame loop: the fixed-rate heartbeat of an animation.
//
// Each tick:
//
//   1. Read at most one pending key byte and hand it to the scene.
//   2. Check the quit flag (SIGINT/SIGTERM) and the resize flag (SIGWINCH).
//   3. Let the scene paint the whole view into the current canvas.
//   4. Render the diff against the previous frame and swap.
//   5. Sleep until the tick's deadline.
//
// Steps 1 to 4 are `Stage::step`, which sees the terminal only through the
// `Device` trait. The resize flag is raised once before the first tick, so
// the initial layout takes the same path as a SIGWINCH.
//
// Unlike an editor loop there is no dirty flag: an animation changes every
// frame, and an unchanged frame costs only the per-row resets anyway.
//
// A resize clears the screen and blanks the previous canvas, so the next
// frame is a full repaint of whatever the new view covers. The canvases
// themselves never reallocate; they are sized for the context's maximum.

use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::ansi;
use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::context::RendererContext;
use crate::error::Result;
use crate::render::Renderer;
use crate::signal;
use crate::terminal::{Size, Terminal, Tty};

// ─── Scene Trait ─────────────────────────────────────────────────────────────

/// What the scene tells the loop after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running.
    Continue,
    /// Leave the loop and restore the terminal.
    Quit,
}

/// A producer of frames.
///
/// Only [`paint`](Scene::paint) is required.
pub trait Scene {
    /// Handle one raw input byte.
    fn on_key(&mut self, _key: u8) -> Action {
        Action::Continue
    }

    /// Called after the view changes size, before the next paint.
    fn on_resize(&mut self, _view: Size) {}

    /// Paint frame number `tick` into `canvas`.
    ///
    /// The canvas holds an older frame, not a blank one: paint every cell of
    /// `ctx.view()` that should be visible.
    fn paint(&mut self, ctx: &RendererContext, canvas: &mut Canvas, tick: u64);
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Frame timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Target time between frame starts.
    pub frame_interval: Duration,
}

impl LoopConfig {
    /// Default frame rate.
    pub const DEFAULT_FPS: u32 = 60;

    /// Interval for `fps` frames per second. Zero is treated as one.
    #[must_use]
    pub fn from_fps(fps: u32) -> Self {
        Self {
            frame_interval: Duration::from_secs(1) / fps.max(1),
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::from_fps(Self::DEFAULT_FPS)
    }
}

// ─── Device ──────────────────────────────────────────────────────────────────

/// What a tick needs from the terminal.
trait Device {
    type Out: Write;

    /// One pending input byte, if any. Never blocks.
    fn read_key(&mut self) -> Option<u8>;

    /// Re-query the terminal size.
    fn refresh_size(&mut self) -> Size;

    /// Where frames are written.
    fn out(&mut self) -> &mut Self::Out;
}

impl Device for Terminal {
    type Out = Tty;

    fn read_key(&mut self) -> Option<u8> {
        self.tty().read_byte()
    }

    fn refresh_size(&mut self) -> Size {
        Self::refresh_size(self)
    }

    fn out(&mut self) -> &mut Tty {
        self.tty()
    }
}

// ─── Stage ───────────────────────────────────────────────────────────────────

/// Everything one tick touches except the terminal device.
struct Stage {
    ctx: RendererContext,
    renderer: Renderer,
    current: Canvas,
    previous: Canvas,
    tick: u64,
}

impl Stage {
    fn new(ctx: RendererContext) -> Self {
        let max = ctx.max();
        Self {
            renderer: Renderer::new(&ctx),
            current: Canvas::new(max.cols, max.rows),
            previous: Canvas::new(max.cols, max.rows),
            ctx,
            tick: 0,
        }
    }

    /// Adopt a new terminal size: clamp the view, clear the screen, and
    /// forget what was on it.
    fn resize(
        &mut self,
        terminal: Size,
        scene: &mut impl Scene,
        out: &mut impl Write,
    ) -> Result<()> {
        let view = self.ctx.resize(terminal);
        ansi::clear_screen(out)?;
        out.flush()?;
        self.previous.fill(Cell::BLANK);
        scene.on_resize(view);
        Ok(())
    }

    /// Paint and render one frame. Returns the bytes written.
    fn draw(&mut self, scene: &mut impl Scene, out: &mut impl Write) -> Result<usize> {
        scene.paint(&self.ctx, &mut self.current, self.tick);
        let written = self
            .renderer
            .render(&mut self.ctx, &mut self.current, &mut self.previous, out)?;
        self.tick += 1;
        Ok(written)
    }

    /// One tick without the sleep: key, quit flag, resize flag, frame.
    ///
    /// Returns [`Action::Quit`] when the loop should end. Nothing is drawn
    /// on that tick.
    fn step(&mut self, scene: &mut impl Scene, device: &mut impl Device) -> Result<Action> {
        if let Some(key) = device.read_key() {
            if scene.on_key(key) == Action::Quit {
                return Ok(Action::Quit);
            }
        }

        if signal::quit_requested() {
            info!("quit signal received");
            return Ok(Action::Quit);
        }

        if signal::take_resize() {
            let size = device.refresh_size();
            self.resize(size, scene, device.out())?;
        }

        self.draw(scene, device.out())?;
        Ok(Action::Continue)
    }
}

// ─── FrameLoop ───────────────────────────────────────────────────────────────

/// Fixed-rate render loop over a [`Terminal`].
///
/// ```no_run
/// use shade_term::canvas::Canvas;
/// use shade_term::context::RendererContext;
/// use shade_term::frame_loop::{Action, FrameLoop, LoopConfig, Scene};
/// use shade_term::terminal::{Size, Terminal};
///
/// struct Fill;
///
/// impl Scene for Fill {
///     fn on_key(&mut self, key: u8) -> Action {
///         if key == b'q' { Action::Quit } else { Action::Continue }
///     }
///
///     fn paint(&mut self, ctx: &RendererContext, canvas: &mut Canvas, tick: u64) {
///         canvas.fill(ctx.palette().wrapping(tick as usize));
///     }
/// }
///
/// let ctx = RendererContext::new(Size { cols: 512, rows: 256 });
/// let mut frames = FrameLoop::new(Terminal::open()?, ctx, LoopConfig::default());
/// frames.run(&mut Fill)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FrameLoop {
    terminal: Terminal,
    stage: Stage,
    config: LoopConfig,
}

impl FrameLoop {
    /// Create a loop. Canvases are allocated at `ctx.max()` here, once.
    #[must_use]
    pub fn new(terminal: Terminal, ctx: RendererContext, config: LoopConfig) -> Self {
        Self {
            terminal,
            stage: Stage::new(ctx),
            config,
        }
    }

    /// The rendering context, including frame statistics.
    #[inline]
    #[must_use]
    pub const fn context(&self) -> &RendererContext {
        &self.stage.ctx
    }

    /// Last known terminal size.
    #[inline]
    #[must_use]
    pub const fn terminal_size(&self) -> Size {
        self.terminal.size()
    }

    /// Frames rendered so far.
    #[inline]
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.stage.tick
    }

    /// Run until the scene quits or a quit signal arrives.
    ///
    /// The terminal is restored before returning, on error as well.
    ///
    /// # Errors
    ///
    /// Terminal setup, resize, or frame write failures.
    pub fn run(&mut self, scene: &mut impl Scene) -> Result<()> {
        self.terminal.enter()?;
        signal::install();
        signal::reset();

        let result = self.run_inner(scene);
        let restored = self.terminal.leave();

        if let Err(err) = &result {
            warn!(%err, written = ?err.bytes_written(), "frame loop stopped");
        }

        info!(
            frames = self.stage.tick,
            largest = self.stage.ctx.stats().largest(),
            "frame loop finished"
        );
        result?;
        restored?;
        Ok(())
    }

    fn run_inner(&mut self, scene: &mut impl Scene) -> Result<()> {
        signal::request_resize();

        loop {
            let deadline = Instant::now() + self.config.frame_interval;

            if self.stage.step(scene, &mut self.terminal)? == Action::Quit {
                return Ok(());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if !remaining.is_zero() {
                std::thread::sleep(remaining);
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
