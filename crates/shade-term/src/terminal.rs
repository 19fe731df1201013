// SPDX-License-Identifier: MIT
//
// Terminal control: the /dev/tty handle, line discipline, alternate screen,
// and RAII cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty and the
// raw write in the panic hook are plain POSIX calls with no safe wrapper in
// std. Each unsafe block is one call.
#![allow(unsafe_code)]
//
// Frames go to /dev/tty rather than stdout so the process can be piped or
// redirected without the animation landing in a file. The tty is opened with
// O_SYNC: a frame is on the device when write() returns.
//
// Only ECHO and ICANON are cleared in the line discipline, so keys arrive
// one byte at a time without being echoed over the frame. Output processing
// (OPOST/ONLCR) stays on, which is what lets the renderer end a row with a
// bare '\n'. ISIG stays on too; Ctrl-C arrives as SIGINT and is handled by
// the `signal` module. VMIN = 0 and VTIME = 0 make every read return
// immediately.
//
// The panic hook writes a pre-built restore sequence straight to the tty
// descriptor. No lock, no allocation, then the original hook prints its
// message to a usable terminal.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, Once};

use tracing::debug;

use crate::ansi;

/// Size assumed when the terminal cannot be queried.
pub const FALLBACK_SIZE: Size = Size { cols: 80, rows: 24 };

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Total number of cells (`cols × rows`).
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the size of the terminal behind `fd` via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if `fd` is not a terminal or reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn query_size(fd: std::os::unix::io::RawFd) -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

// ─── Tty ────────────────────────────────────────────────────────────────────

/// The controlling terminal, opened read/write.
///
/// Implements [`Write`] so it can be handed straight to
/// [`Renderer::render`](crate::render::Renderer::render).
#[derive(Debug)]
pub struct Tty {
    file: File,
}

impl Tty {
    /// Path of the controlling terminal.
    pub const PATH: &'static str = "/dev/tty";

    /// Open `/dev/tty` for synchronous reads and writes.
    ///
    /// # Errors
    ///
    /// Fails when the process has no controlling terminal.
    #[cfg(unix)]
    pub fn open() -> io::Result<Self> {
        use std::os::unix::fs::OpenOptionsExt;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(Self::PATH)?;
        Ok(Self { file })
    }

    #[cfg(not(unix))]
    pub fn open() -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(Self::PATH)?;
        Ok(Self { file })
    }

    /// Read one pending input byte, if any.
    ///
    /// Never blocks once the terminal is in the mode set by
    /// [`Terminal::enter`]. Read errors count as "no input".
    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.file.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    /// Size of this terminal, if it can be queried.
    #[cfg(unix)]
    #[must_use]
    pub fn size(&self) -> Option<Size> {
        use std::os::unix::io::AsRawFd;
        query_size(self.file.as_raw_fd())
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn size(&self) -> Option<Size> {
        None
    }
}

impl Write for Tty {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

// ─── Mode Sequences ─────────────────────────────────────────────────────────

/// Alternate screen, clear, hide the cursor.
fn write_enter_sequence(w: &mut impl Write) -> io::Result<()> {
    ansi::enter_alt_screen(w)?;
    ansi::clear_screen(w)?;
    ansi::cursor_hide(w)?;
    w.flush()
}

/// Reset colors, clear, leave the alternate screen, show the cursor.
fn write_leave_sequence(w: &mut impl Write) -> io::Result<()> {
    ansi::reset(w)?;
    ansi::clear_screen(w)?;
    ansi::exit_alt_screen(w)?;
    ansi::cursor_show(w)?;
    w.flush()
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Original termios for the panic hook, which can't reach the [`Terminal`].
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<(i32, libc::termios)>> = Mutex::new(None);

/// Descriptor the panic hook writes to; -1 means stdout.
static RESTORE_FD: AtomicI32 = AtomicI32::new(-1);

/// Same bytes as [`write_leave_sequence`], pre-built for the panic hook.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[2J\x1b[?1049l\x1b[?25h";

static PANIC_HOOK_INSTALLED: Once = Once::new();

#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some((fd, ref original)) = *guard {
            unsafe {
                let _ = libc::tcsetattr(fd, libc::TCSANOW, original);
            }
        }
    }
}

/// Install (once per process) a panic hook that restores the terminal
/// before the original hook prints the panic message.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    {
        let fd = RESTORE_FD.load(Ordering::Relaxed);
        let fd = if fd < 0 { libc::STDOUT_FILENO } else { fd };
        unsafe {
            let _ = libc::write(
                fd,
                EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
                EMERGENCY_RESTORE.len(),
            );
        }
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal session with RAII cleanup.
///
/// [`enter`](Self::enter) switches to the animation mode; the terminal is
/// restored by [`leave`](Self::leave), on drop, or from the panic hook.
///
/// ```no_run
/// use shade_term::terminal::Terminal;
///
/// let mut term = Terminal::open()?;
/// term.enter()?;
/// // ... render frames to term.tty() ...
/// // Restored automatically on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    tty: Tty,

    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    size: Size,
    active: bool,
}

impl Terminal {
    /// Open the controlling terminal and query its size (80×24 fallback).
    ///
    /// Does **not** change any terminal state.
    ///
    /// # Errors
    ///
    /// Fails when `/dev/tty` cannot be opened.
    pub fn open() -> io::Result<Self> {
        let tty = Tty::open()?;
        let size = tty.size().unwrap_or(FALLBACK_SIZE);
        Ok(Self {
            tty,
            #[cfg(unix)]
            original_termios: None,
            size,
            active: false,
        })
    }

    /// Cached terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the terminal size. Call after SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = self.tty.size() {
            self.size = size;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The terminal device, for frame output and key reads.
    #[inline]
    pub fn tty(&mut self) -> &mut Tty {
        &mut self.tty
    }

    /// Enter animation mode: input mode, alternate screen, clear, hide cursor.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or terminal output fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_input_mode()?;
        write_enter_sequence(&mut self.tty)?;

        self.active = true;
        debug!(size = %self.size, "terminal entered");
        Ok(())
    }

    /// Restore the terminal. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or the termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let written = write_leave_sequence(&mut self.tty);
        let restored = self.disable_input_mode();
        self.active = false;
        RESTORE_FD.store(-1, Ordering::Relaxed);
        debug!("terminal restored");

        written.and(restored)
    }

    // ── Input Mode (termios) ────────────────────────────────────────

    #[cfg(unix)]
    fn enable_input_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        let fd = self.tty.file.as_raw_fd();
        RESTORE_FD.store(fd, Ordering::Relaxed);

        unsafe {
            if libc::isatty(fd) == 0 {
                return Ok(());
            }

            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some((fd, termios));
            }

            termios.c_lflag &= !(libc::ECHO | libc::ICANON);
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_input_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_input_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if let Some(ref original) = self.original_termios {
            let fd = self.tty.file.as_raw_fd();
            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_input_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
