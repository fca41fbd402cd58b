//! Alternate screen management with panic-safe cleanup.

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Static flag to track if the alternate screen is active (for panic handler)
static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Guard that restores the normal screen and cursor on drop.
/// This handles both normal exits and panics.
pub struct AlternateScreenGuard {
    _private: (),
}

impl AlternateScreenGuard {
    /// Switch to the alternate screen and hide the cursor.
    ///
    /// # Errors
    /// Returns an error if the terminal rejects the escape sequences
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);

        Ok(Self { _private: () })
    }
}

impl Drop for AlternateScreenGuard {
    fn drop(&mut self) {
        // The panic hook may already have restored the screen
        if SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
            // Best-effort cleanup - ignore errors during drop
            let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        }
    }
}

/// Install a panic hook that restores the terminal before the panic message
/// is printed, so the message is not lost on the alternate screen.
fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
            let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        }
        original_hook(panic_info);
    }));
}

/// Level to log per-tick events at, given how loud they would be normally.
///
/// Lines written to stderr scroll across the alternate screen, so anything
/// below warn drops to debug while the preview owns the terminal.
pub fn terminal_log_level(level: log::Level) -> log::Level {
    demote_on_screen(level, SCREEN_ACTIVE.load(Ordering::SeqCst))
}

fn demote_on_screen(level: log::Level, on_screen: bool) -> log::Level {
    if on_screen && level > log::Level::Warn {
        log::Level::Debug.max(level)
    } else {
        level
    }
}
