// SPDX-License-Identifier: MIT
//
// Differential renderer: turns (current, previous) into the fewest bytes.
//
// Per frame:
//
//   1. Optional cursor home (ESC [ H).
//   2. Every row starts with ESC [ m. Color state is tracked only within a
//      row, so nothing can leak from one row into the next regardless of
//      what the diff decided.
//   3. Left to right, a cell identical to the previous frame (same fg, bg,
//      glyph) extends the current unchanged run and emits nothing. A changed
//      cell first flushes the run:
//
//        run <  threshold   re-emit the skipped cells as literal glyphs
//        run >= threshold   jump with ESC [ <col> G
//
//      then emits the minimal SGR for its colors (both channels in one
//      sequence, or just the one that changed, or nothing) and its glyph.
//   4. A row that ends inside a run gets a newline. A row whose last glyph
//      landed in the terminal's last column doesn't: the terminal's deferred
//      wrap already moves the next glyph to the next row, and a newline
//      there would scroll on the bottom row. Trailing newlines on the whole
//      frame are dropped for the same reason.
//   5. One write, then the canvases swap storage.
//
// Deferred wrap has one trap. After the last column is written the cursor
// is still on that row, in a "wrap pending" state. Only a printed glyph
// triggers the wrap; a column jump or newline would act on the old row. So
// when the next row's first action is a jump or a newline, a newline is
// emitted first to complete the wrap.

use std::io::Write;

use tracing::trace;

use crate::ansi;
use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::context::RendererContext;
use crate::error::Result;
use crate::output::{OutputBuffer, write_frame};
use crate::terminal::Size;

/// Worst case for one cell: `ESC [ ff ; bb m` (8) + a 4-byte UTF-8 glyph.
///
/// Palette glyphs are at most 3 bytes; the extra byte covers any `char`.
/// A column jump replaces at least one skipped cell and is at most
/// `ESC [ 65536 G` (9 bytes), so it fits the same per-cell budget.
pub const MAX_BYTES_PER_CELL: usize = 8 + 4;

/// Per row: `ESC [ m` plus one newline, plus one wrap-completing newline.
pub const ROW_OVERHEAD: usize = 3 + 1 + 1;

/// Per frame: `ESC [ H`.
pub const FRAME_OVERHEAD: usize = 3;

/// Output capacity that no frame on a `max`-sized canvas can exceed.
#[must_use]
pub const fn frame_capacity(max: Size) -> usize {
    let cols = max.cols as usize;
    let rows = max.rows as usize;
    rows * cols * MAX_BYTES_PER_CELL + rows * ROW_OVERHEAD + FRAME_OVERHEAD
}

// ─── RowWriter ──────────────────────────────────────────────────────────────

/// Per-row state machine: active colors, pending run, pending wrap.
struct RowWriter<'a> {
    out: &'a mut OutputBuffer,
    fg: Option<u8>,
    bg: Option<u8>,
    run: u16,
    wrap_pending: bool,
}

impl<'a> RowWriter<'a> {
    fn new(out: &'a mut OutputBuffer, wrap_pending: bool) -> Self {
        ansi::reset_attrs(out).ok();
        Self {
            out,
            fg: None,
            bg: None,
            run: 0,
            wrap_pending,
        }
    }

    /// Emit the smallest SGR that moves the active colors to `cell`'s.
    fn apply_colors(&mut self, cell: &Cell) {
        let fg_changed = self.fg != Some(cell.fg);
        let bg_changed = self.bg != Some(cell.bg);
        if fg_changed && bg_changed {
            ansi::sgr_pair(self.out, cell.fg, cell.bg).ok();
        } else if fg_changed {
            ansi::sgr(self.out, cell.fg).ok();
        } else if bg_changed {
            ansi::sgr(self.out, cell.bg).ok();
        }
        self.fg = Some(cell.fg);
        self.bg = Some(cell.bg);
    }

    fn draw(&mut self, cell: &Cell) {
        self.apply_colors(cell);
        self.out.push_glyph(cell.glyph);
        self.wrap_pending = false;
    }

    /// Finish a pending wrap from the previous row before a non-printing move.
    fn complete_wrap(&mut self) {
        if self.wrap_pending {
            self.out.push(b'\n');
            self.wrap_pending = false;
        }
    }

    /// Flush the run that ends just before column `x` of `row`.
    fn flush_run(&mut self, row: &[Cell], x: usize, threshold: u16) {
        if self.run == 0 {
            return;
        }
        if self.run < threshold {
            let start = x - usize::from(self.run);
            for cell in &row[start..x] {
                self.draw(cell);
            }
        } else {
            self.complete_wrap();
            // x < view width <= u16::MAX
            #[allow(clippy::cast_possible_truncation)]
            ansi::cursor_column(self.out, x as u16).ok();
        }
        self.run = 0;
    }

    /// End the row. Returns whether the cursor is left wrap-pending.
    fn finish(mut self, view_wraps: bool) -> bool {
        if self.run > 0 || !view_wraps {
            self.complete_wrap();
            self.out.push(b'\n');
            false
        } else {
            true
        }
    }
}

// ─── Renderer ───────────────────────────────────────────────────────────────

/// Differential renderer over a pair of canvases.
///
/// Owns the output buffer, sized once for the context's maximum canvas.
///
/// ```no_run
/// use shade_term::canvas::Canvas;
/// use shade_term::context::RendererContext;
/// use shade_term::render::Renderer;
/// use shade_term::terminal::Size;
///
/// let max = Size { cols: 200, rows: 60 };
/// let mut ctx = RendererContext::new(max);
/// ctx.resize(Size { cols: 80, rows: 24 });
///
/// let mut current = Canvas::new(max.cols, max.rows);
/// let mut previous = Canvas::new(max.cols, max.rows);
/// let mut renderer = Renderer::new(&ctx);
///
/// current.paint(0, 0, ctx.palette().wrapping(42));
/// let written = renderer.render(&mut ctx, &mut current, &mut previous, &mut std::io::stdout())?;
/// # Ok::<(), shade_term::error::RenderError>(())
/// ```
pub struct Renderer {
    output: OutputBuffer,
}

impl Renderer {
    /// Create a renderer with an output buffer for the worst-case frame.
    #[must_use]
    pub fn new(ctx: &RendererContext) -> Self {
        let capacity = frame_capacity(ctx.max());
        tracing::debug!(capacity, "renderer output buffer allocated");
        Self {
            output: OutputBuffer::with_capacity(capacity),
        }
    }

    /// Diff `current` against `previous` over the context's view and return
    /// the frame bytes. Pure: no I/O, no swap.
    ///
    /// # Panics
    ///
    /// Panics if the view is larger than either canvas. The view is clamped
    /// to the maximum by [`RendererContext::resize`].
    pub fn encode(&mut self, ctx: &RendererContext, current: &Canvas, previous: &Canvas) -> &[u8] {
        self.output.clear();
        let view = ctx.view();
        let threshold = ctx.skip_threshold();
        let view_wraps = ctx.view_wraps();

        if ctx.home_cursor() {
            ansi::cursor_home(&mut self.output).ok();
        }

        let mut wrap_pending = false;
        for y in 0..view.rows {
            let now = current.row(y, view.cols);
            let before = previous.row(y, view.cols);
            let mut row = RowWriter::new(&mut self.output, wrap_pending);

            for (x, (cell, old)) in now.iter().zip(before).enumerate() {
                if cell == old {
                    row.run += 1;
                    continue;
                }
                row.flush_run(now, x, threshold);
                row.draw(cell);
            }

            wrap_pending = row.finish(view_wraps);
        }

        while self.output.pop_if(b'\n') {}
        self.output.as_bytes()
    }

    /// Render one frame: encode, write to `out` in one pass, swap canvases.
    ///
    /// Returns the number of bytes written. After a successful call,
    /// `previous` holds this frame and `current` holds the older one, ready
    /// to be overwritten by the producer.
    ///
    /// # Errors
    ///
    /// Returns the write error. The canvases are not swapped in that case,
    /// so the next frame diffs against what was last known to be on screen.
    /// That includes a flush that fails after every byte was accepted: the
    /// frame may well be visible, and the next frame then repaints cells
    /// that were already correct.
    pub fn render(
        &mut self,
        ctx: &mut RendererContext,
        current: &mut Canvas,
        previous: &mut Canvas,
        out: &mut impl Write,
    ) -> Result<usize> {
        self.encode(ctx, current, previous);
        let written = write_frame(out, self.output.as_bytes())?;
        current.swap(previous);
        ctx.record_frame(written);
        trace!(
            bytes = written,
            capacity = self.output.capacity(),
            "frame rendered"
        );
        Ok(written)
    }

    /// The bytes of the last encoded frame.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Allocated output capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.output.capacity()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::palette::{DARK_SHADE, FULL_BLOCK, LIGHT_SHADE, Palette};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::io;

    // ── Test terminal ───────────────────────────────────────────────────

    /// A minimal VT model: SGR colors, CUP home, CHA, LF with ONLCR, and
    /// deferred autowrap. Panics on anything the renderer must never do
    /// (scroll, unknown sequences).
    struct Screen {
        cols: u16,
        rows: u16,
        cells: Vec<Cell>,
        x: u16,
        y: u16,
        wrap_pending: bool,
        fg: u8,
        bg: u8,
    }

    impl Screen {
        fn new(cols: u16, rows: u16) -> Self {
            Self {
                cols,
                rows,
                cells: vec![Cell::BLANK; usize::from(cols) * usize::from(rows)],
                x: 0,
                y: 0,
                wrap_pending: false,
                fg: 39,
                bg: 49,
            }
        }

        fn at(&self, x: u16, y: u16) -> Cell {
            self.cells[usize::from(y) * usize::from(self.cols) + usize::from(x)]
        }

        fn feed(&mut self, bytes: &[u8]) {
            let text = std::str::from_utf8(bytes).expect("frame is valid UTF-8");
            let mut chars = text.chars();
            while let Some(ch) = chars.next() {
                match ch {
                    '\x1b' => {
                        assert_eq!(chars.next(), Some('['), "only CSI sequences");
                        let mut params = String::new();
                        let finalc = loop {
                            let c = chars.next().expect("unterminated CSI");
                            if c.is_ascii_digit() || c == ';' {
                                params.push(c);
                            } else {
                                break c;
                            }
                        };
                        self.csi(&params, finalc);
                    }
                    '\n' => {
                        self.wrap_pending = false;
                        self.x = 0;
                        self.y += 1;
                        assert!(self.y < self.rows, "newline scrolled the screen");
                    }
                    c => self.print(c),
                }
            }
        }

        fn csi(&mut self, params: &str, finalc: char) {
            match finalc {
                'H' => {
                    assert!(params.is_empty());
                    self.x = 0;
                    self.y = 0;
                    self.wrap_pending = false;
                }
                'G' => {
                    let col: u16 = params.parse().expect("CHA column");
                    self.x = (col - 1).min(self.cols - 1);
                    self.wrap_pending = false;
                }
                'm' => {
                    if params.is_empty() {
                        self.fg = 39;
                        self.bg = 49;
                    }
                    for code in params.split(';').filter(|p| !p.is_empty()) {
                        let code: u8 = code.parse().expect("SGR code");
                        match code {
                            0 => {
                                self.fg = 39;
                                self.bg = 49;
                            }
                            30..=39 | 90..=97 => self.fg = code,
                            40..=49 => self.bg = code,
                            other => panic!("unexpected SGR {other}"),
                        }
                    }
                }
                other => panic!("unexpected CSI final {other:?}"),
            }
        }

        fn print(&mut self, c: char) {
            if self.wrap_pending {
                self.wrap_pending = false;
                self.x = 0;
                self.y += 1;
            }
            assert!(self.y < self.rows, "print scrolled the screen");
            let idx = usize::from(self.y) * usize::from(self.cols) + usize::from(self.x);
            self.cells[idx] = Cell::new(self.fg, self.bg, c);
            if self.x + 1 == self.cols {
                self.wrap_pending = true;
            } else {
                self.x += 1;
            }
        }

        /// Assert that the view region of the screen shows `canvas`.
        fn assert_shows(&self, canvas: &Canvas, view: Size) {
            for y in 0..view.rows {
                for x in 0..view.cols {
                    assert_eq!(
                        self.at(x, y),
                        *canvas.get(x, y).unwrap(),
                        "mismatch at ({x}, {y})"
                    );
                }
            }
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn ctx(cols: u16, rows: u16) -> RendererContext {
        let mut ctx = RendererContext::new(Size { cols, rows }).with_home_cursor(false);
        ctx.resize(Size { cols, rows });
        ctx
    }

    fn encode(ctx: &RendererContext, current: &Canvas, previous: &Canvas) -> String {
        let mut renderer = Renderer::new(ctx);
        let bytes = renderer.encode(ctx, current, previous);
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const A: Cell = Cell::new(31, 40, 'A');
    const B: Cell = Cell::new(32, 40, 'B');

    // ── Scenario ────────────────────────────────────────────────────────

    #[test]
    fn three_by_two_first_frame() {
        let ctx = ctx(3, 2);
        let previous = Canvas::new(3, 2);
        let mut current = Canvas::new(3, 2);
        for (x, cell) in [A, A, B].into_iter().enumerate() {
            current.set(x as u16, 0, cell);
        }
        for x in 0..3 {
            current.set(x, 1, A);
        }

        let output = encode(&ctx, &current, &previous);

        assert_eq!(
            output,
            "\x1b[m\x1b[31;40mAA\x1b[32mB\x1b[m\x1b[31;40mAAA"
        );
    }

    #[test]
    fn home_cursor_prefixes_the_frame() {
        let ctx = ctx(3, 1).with_home_cursor(true);
        let previous = Canvas::new(3, 1);
        let mut current = Canvas::new(3, 1);
        current.set(0, 0, A);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[H\x1b[m\x1b[31;40mA");
    }

    // ── Unchanged frames ────────────────────────────────────────────────

    #[test]
    fn unchanged_frame_emits_only_row_resets() {
        let ctx = ctx(10, 4);
        let mut canvas = Canvas::new(10, 4);
        canvas.fill(A);

        let output = encode(&ctx, &canvas, &canvas.clone());

        assert_eq!(output, "\x1b[m\n\x1b[m\n\x1b[m\n\x1b[m");
    }

    #[test]
    fn second_render_of_same_frame_repaints_nothing() {
        let mut ctx = ctx(6, 3);
        let palette = Palette::new();
        let mut current = Canvas::new(6, 3);
        let mut previous = Canvas::new(6, 3);
        let mut renderer = Renderer::new(&ctx);

        for y in 0..3 {
            for x in 0..6 {
                current.paint(x, y, palette.wrapping(usize::from(x * 7 + y * 31)));
            }
        }
        let frame = current.clone();
        renderer
            .render(&mut ctx, &mut current, &mut previous, &mut io::sink())
            .unwrap();

        // Producer repaints the same content into the recycled canvas.
        current = frame;
        renderer
            .render(&mut ctx, &mut current, &mut previous, &mut io::sink())
            .unwrap();

        let output = String::from_utf8(renderer.output_bytes().to_vec()).unwrap();
        assert_eq!(output, "\x1b[m\n\x1b[m\n\x1b[m");
    }

    #[test]
    fn short_run_is_replayed_before_a_change() {
        let ctx = ctx(2, 1);
        let mut current = Canvas::new(2, 1);
        let mut previous = Canvas::new(2, 1);
        current.set(0, 0, Cell::new(90, 40, LIGHT_SHADE));
        previous.set(0, 0, Cell::new(90, 40, LIGHT_SHADE));
        current.set(1, 0, Cell::new(90, 40, LIGHT_SHADE));

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[m\x1b[90;40m\u{2591}\u{2591}");
    }

    // ── Full repaint ────────────────────────────────────────────────────

    #[test]
    fn full_repaint_emits_every_cell_with_row_resets() {
        let ctx = ctx(4, 3);
        let previous = Canvas::new(4, 3);
        let mut current = Canvas::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                current.set(x, y, Cell::new(31 + (x % 2) as u8, 40 + y as u8, 'x'));
            }
        }

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output.matches("\x1b[m").count(), 3);
        assert_eq!(output.matches('x').count(), 12);
        assert!(!output.contains('\n'));
        assert!(!output.contains('G'));
    }

    // ── Color state machine ─────────────────────────────────────────────

    #[test]
    fn only_the_changed_channel_is_emitted() {
        let ctx = ctx(4, 1);
        let previous = Canvas::new(4, 1);
        let mut current = Canvas::new(4, 1);
        current.set(0, 0, Cell::new(31, 40, 'a'));
        current.set(1, 0, Cell::new(32, 40, 'b'));
        current.set(2, 0, Cell::new(32, 41, 'c'));
        current.set(3, 0, Cell::new(33, 42, 'd'));

        let output = encode(&ctx, &current, &previous);

        assert_eq!(
            output,
            "\x1b[m\x1b[31;40ma\x1b[32mb\x1b[41mc\x1b[33;42md"
        );
    }

    #[test]
    fn colors_do_not_carry_across_rows() {
        let ctx = ctx(1, 2);
        let previous = Canvas::new(1, 2);
        let mut current = Canvas::new(1, 2);
        current.set(0, 0, A);
        current.set(0, 1, A);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[m\x1b[31;40mA\x1b[m\x1b[31;40mA");
    }

    // ── Run-length threshold ────────────────────────────────────────────

    /// A 10-wide row whose previous frame is all `A`, with changes at
    /// column 0 and column `run + 1`.
    fn run_frames(run: u16) -> (Canvas, Canvas) {
        let mut previous = Canvas::new(10, 1);
        previous.fill(A);
        let mut current = previous.clone();
        current.set(0, 0, B);
        current.set(run + 1, 0, B);
        (current, previous)
    }

    #[test]
    fn run_of_five_is_replayed_literally() {
        let ctx = ctx(10, 1);
        let (current, previous) = run_frames(5);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[m\x1b[32;40mB\x1b[31mAAAAA\x1b[32mB");
    }

    #[test]
    fn run_of_six_becomes_a_column_jump() {
        let ctx = ctx(10, 1);
        let (current, previous) = run_frames(6);

        let output = encode(&ctx, &current, &previous);

        // Trailing run of two cells ends the row; the newline is dropped.
        assert_eq!(output, "\x1b[m\x1b[32;40mB\x1b[8GB");
    }

    #[test]
    fn both_run_encodings_show_the_same_screen() {
        for run in [5, 6] {
            let ctx = ctx(10, 1);
            let (current, previous) = run_frames(run);
            let mut screen = Screen::new(10, 1);

            screen.feed(encode(&ctx, &previous, &Canvas::new(10, 1)).as_bytes());
            screen.feed(b"\x1b[H");
            screen.feed(encode(&ctx, &current, &previous).as_bytes());

            screen.assert_shows(&current, ctx.view());
        }
    }

    #[test]
    fn threshold_is_tunable() {
        let ctx = ctx(10, 1).with_skip_threshold(3);
        let (current, previous) = run_frames(3);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[m\x1b[32;40mB\x1b[5GB");
    }

    // ── Newlines & wrap ─────────────────────────────────────────────────

    #[test]
    fn trailing_run_ends_row_with_newline() {
        let ctx = ctx(3, 2);
        let mut previous = Canvas::new(3, 2);
        previous.fill(A);
        let mut current = previous.clone();
        current.set(0, 0, B);
        current.set(0, 1, B);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[m\x1b[32;40mB\n\x1b[m\x1b[32;40mB");
    }

    #[test]
    fn frame_never_ends_with_newline() {
        let ctx = ctx(3, 3);
        let mut previous = Canvas::new(3, 3);
        previous.fill(A);
        let mut current = previous.clone();
        current.set(2, 2, B);
        assert!(!encode(&ctx, &current, &previous).ends_with('\n'));
        assert!(!encode(&ctx, &previous, &previous).ends_with('\n'));
    }

    #[test]
    fn unchanged_last_row_after_a_wrap_leaves_no_newline() {
        let ctx = ctx(3, 2);
        let mut previous = Canvas::new(3, 2);
        previous.fill(A);
        let mut current = previous.clone();
        current.set(2, 0, B);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[m\x1b[31;40mAA\x1b[32mB\x1b[m");
    }

    #[test]
    fn pending_wrap_is_completed_before_a_jump() {
        let ctx = ctx(8, 2);
        let mut previous = Canvas::new(8, 2);
        previous.fill(A);
        let mut current = previous.clone();
        // Row 0 changes in its last column: cursor is left wrap-pending.
        current.set(7, 0, B);
        // Row 1 starts with a long run, then changes.
        current.set(7, 1, B);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(
            output,
            "\x1b[m\x1b[8G\x1b[32;40mB\x1b[m\n\x1b[8G\x1b[32;40mB"
        );

        let mut screen = Screen::new(8, 2);
        screen.feed(encode(&ctx, &previous, &Canvas::new(8, 2)).as_bytes());
        screen.feed(b"\x1b[H");
        screen.feed(output.as_bytes());
        screen.assert_shows(&current, ctx.view());
    }

    #[test]
    fn narrow_view_on_wide_terminal_ends_every_row() {
        let mut ctx = RendererContext::new(Size { cols: 3, rows: 2 }).with_home_cursor(false);
        ctx.resize(Size { cols: 10, rows: 2 });
        let previous = Canvas::new(3, 2);
        let mut current = Canvas::new(3, 2);
        current.fill(A);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[m\x1b[31;40mAAA\n\x1b[m\x1b[31;40mAAA");
    }

    // ── View vs. allocation ─────────────────────────────────────────────

    #[test]
    fn only_the_view_is_rendered() {
        let mut ctx = RendererContext::new(Size { cols: 20, rows: 10 }).with_home_cursor(false);
        ctx.resize(Size { cols: 2, rows: 1 });
        let previous = Canvas::new(20, 10);
        let mut current = Canvas::new(20, 10);
        current.fill(A);

        let output = encode(&ctx, &current, &previous);

        assert_eq!(output, "\x1b[m\x1b[31;40mAA");
    }

    #[test]
    fn zero_area_view_emits_nothing() {
        let mut ctx = RendererContext::new(Size { cols: 4, rows: 4 }).with_home_cursor(false);
        ctx.resize(Size { cols: 0, rows: 0 });
        let canvas = Canvas::new(4, 4);
        assert_eq!(encode(&ctx, &canvas, &canvas), "");
    }

    // ── render() ────────────────────────────────────────────────────────

    #[test]
    fn render_writes_swaps_and_records() {
        let mut ctx = ctx(2, 1);
        let mut current = Canvas::new(2, 1);
        let mut previous = Canvas::new(2, 1);
        let mut renderer = Renderer::new(&ctx);
        current.set(0, 0, Cell::new(97, 47, FULL_BLOCK));

        let mut out = Vec::new();
        let written = renderer
            .render(&mut ctx, &mut current, &mut previous, &mut out)
            .unwrap();

        assert_eq!(written, out.len());
        assert_eq!(out, "\x1b[m\x1b[97;47m█".as_bytes());
        assert_eq!(previous.get(0, 0).unwrap().glyph, FULL_BLOCK);
        assert!(current.get(0, 0).unwrap().is_blank());
        assert_eq!(ctx.stats().frames(), 1);
        assert_eq!(ctx.stats().last(), written);
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_does_not_swap() {
        let mut ctx = ctx(2, 1);
        let mut current = Canvas::new(2, 1);
        let mut previous = Canvas::new(2, 1);
        let mut renderer = Renderer::new(&ctx);
        current.set(0, 0, Cell::new(93, 44, DARK_SHADE));

        let err = renderer
            .render(&mut ctx, &mut current, &mut previous, &mut Broken)
            .unwrap_err();

        assert!(matches!(err, RenderError::Io(_)));
        assert_eq!(current.get(0, 0).unwrap().glyph, DARK_SHADE);
        assert!(previous.get(0, 0).unwrap().is_blank());
        assert_eq!(ctx.stats().frames(), 0);
    }

    /// Accepts every byte, then fails to flush.
    struct FlushFails(Vec<u8>);

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn failed_flush_after_full_write_repaints_next_frame() {
        let mut ctx = ctx(2, 1);
        let mut current = Canvas::new(2, 1);
        let mut previous = Canvas::new(2, 1);
        let mut renderer = Renderer::new(&ctx);
        current.set(0, 0, Cell::new(93, 44, DARK_SHADE));

        let mut out = FlushFails(Vec::new());
        let err = renderer
            .render(&mut ctx, &mut current, &mut previous, &mut out)
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
        assert!(!out.0.is_empty());
        assert!(previous.get(0, 0).unwrap().is_blank());

        // Same frame again: still diffed against the blank canvas.
        let frame = renderer.encode(&ctx, &current, &previous).to_vec();
        assert_eq!(frame, out.0);
    }

    #[test]
    fn capacity_covers_the_maximum_canvas() {
        let ctx = RendererContext::new(Size { cols: 100, rows: 50 });
        let renderer = Renderer::new(&ctx);
        assert!(renderer.capacity() >= frame_capacity(ctx.max()));
        assert_eq!(frame_capacity(Size { cols: 100, rows: 50 }), 100 * 50 * 12 + 50 * 5 + 3);
    }

    // ── Properties ──────────────────────────────────────────────────────

    fn arb_canvas(cols: u16, rows: u16) -> impl Strategy<Value = Canvas> {
        let palette = Palette::new();
        // Small index range keeps plenty of cells equal between frames.
        let pick = prop_oneof![Just(None), (0usize..6).prop_map(Some)];
        let width = usize::from(cols);
        prop::collection::vec(pick, width * usize::from(rows)).prop_map(move |picks| {
            let mut canvas = Canvas::new(cols, rows);
            for (i, pick) in picks.into_iter().enumerate() {
                if let Some(index) = pick {
                    #[allow(clippy::cast_possible_truncation)]
                    let (x, y) = ((i % width) as u16, (i / width) as u16);
                    canvas.paint(x, y, palette.wrapping(index * 53));
                }
            }
            canvas
        })
    }

    proptest! {
        #[test]
        fn frames_reproduce_current_on_screen(
            first in arb_canvas(12, 5),
            second in arb_canvas(12, 5),
            threshold in 1u16..8,
        ) {
            let mut ctx = RendererContext::new(Size { cols: 12, rows: 5 })
                .with_skip_threshold(threshold);
            ctx.resize(Size { cols: 12, rows: 5 });
            let mut renderer = Renderer::new(&ctx);
            let mut screen = Screen::new(12, 5);
            let mut current = first.clone();
            let mut previous = Canvas::new(12, 5);

            let mut out = Vec::new();
            renderer.render(&mut ctx, &mut current, &mut previous, &mut out).unwrap();
            screen.feed(&out);
            screen.assert_shows(&first, ctx.view());

            current = second.clone();
            out.clear();
            renderer.render(&mut ctx, &mut current, &mut previous, &mut out).unwrap();
            screen.feed(&out);
            screen.assert_shows(&second, ctx.view());
        }

        #[test]
        fn output_never_exceeds_capacity(
            current in arb_canvas(9, 4),
            previous in arb_canvas(9, 4),
            threshold in 0u16..8,
        ) {
            let ctx = RendererContext::new(Size { cols: 9, rows: 4 })
                .with_skip_threshold(threshold);
            let mut renderer = Renderer::new(&ctx);
            let len = renderer.encode(&ctx, &current, &previous).len();
            prop_assert!(len <= frame_capacity(ctx.max()));
            prop_assert!(!renderer.output_bytes().ends_with(b"\n"));
        }
    }
}
