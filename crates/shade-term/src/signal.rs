// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Signal flags.
//
// Handlers only store to an atomic, which is async-signal-safe. The frame
// loop polls the flags once per tick:
//
//   SIGWINCH          → RESIZED: re-query the size, clamp the view, repaint.
//   SIGINT / SIGTERM  → QUIT: leave the loop so `Terminal`'s drop restores
//                       the screen and termios on the normal path.

use std::sync::atomic::{AtomicBool, Ordering};

static RESIZED: AtomicBool = AtomicBool::new(false);
static QUIT: AtomicBool = AtomicBool::new(false);

/// Install the SIGWINCH, SIGINT and SIGTERM handlers.
#[cfg(unix)]
pub fn install() {
    install_handler(libc::SIGWINCH, on_resize);
    install_handler(libc::SIGINT, on_quit);
    install_handler(libc::SIGTERM, on_quit);
    tracing::debug!("signal handlers installed");
}

#[cfg(not(unix))]
pub fn install() {}

#[cfg(unix)]
fn install_handler(signal: libc::c_int, handler: extern "C" fn(libc::c_int)) {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(signal, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn on_resize(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
extern "C" fn on_quit(_sig: libc::c_int) {
    QUIT.store(true, Ordering::Relaxed);
}

/// Consume a pending resize notification.
#[inline]
pub fn take_resize() -> bool {
    RESIZED.swap(false, Ordering::Relaxed)
}

/// Whether a quit signal has arrived. Sticky until [`reset`].
#[inline]
#[must_use]
pub fn quit_requested() -> bool {
    QUIT.load(Ordering::Relaxed)
}

/// Raise the resize flag without a signal. The frame loop does this once so
/// that the first tick lays out the view.
#[inline]
pub fn request_resize() {
    RESIZED.store(true, Ordering::Relaxed);
}

/// Clear both flags.
pub fn reset() {
    RESIZED.store(false, Ordering::Relaxed);
    QUIT.store(false, Ordering::Relaxed);
}

/// Serializes tests that touch the process-global flags, which start cleared.
#[cfg(test)]
pub(crate) fn test_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let guard = LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    reset();
    guard
}

#[cfg(test)]
pub(crate) fn request_quit() {
    QUIT.store(true, Ordering::Relaxed);
}
