//! Stop signalling for the control loop.
//!
//! The loop polls a [`StopSignal`] once per tick. The signal is raised by
//! Ctrl+C or by a global quit key (`q` / `Esc`) captured with rdev, so the
//! bot can be stopped while the game window holds focus.

use rdev::{listen, Event, EventType, Key};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Shared "please stop" flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after the current tick.
    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Errors from setting up stop sources.
#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("Quit-key listener already running")]
    AlreadyRunning,
    #[error("Failed to spawn quit-key listener: {0}")]
    Spawn(#[source] io::Error),
    #[error("Failed to install Ctrl+C handler: {0}")]
    CtrlC(#[from] ctrlc::Error),
}

/// Raise `stop` on Ctrl+C.
///
/// This should be called once at program startup.
pub fn install_ctrlc_handler(stop: &StopSignal) -> Result<(), HotkeyError> {
    let stop = stop.clone();
    ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C, shutting down...");
        stop.request();
    })?;
    Ok(())
}

/// Whether a key stops the bot.
pub fn is_quit_key(key: Key) -> bool {
    matches!(key, Key::KeyQ | Key::Escape)
}

/// Global quit-key listener.
pub struct QuitListener {
    /// Flag to stop reacting to events
    disabled: Arc<AtomicBool>,
    /// Handle to the listener thread
    listener_thread: Option<JoinHandle<()>>,
}

impl Default for QuitListener {
    fn default() -> Self {
        Self::new()
    }
}

impl QuitListener {
    pub fn new() -> Self {
        Self {
            disabled: Arc::new(AtomicBool::new(false)),
            listener_thread: None,
        }
    }

    /// Start listening for the quit key; a press raises `stop`.
    ///
    /// This spawns a background thread that captures global keyboard events.
    /// Note: On macOS, this requires Accessibility permissions.
    pub fn start(&mut self, stop: StopSignal) -> Result<(), HotkeyError> {
        if self.listener_thread.is_some() {
            return Err(HotkeyError::AlreadyRunning);
        }

        let disabled = self.disabled.clone();
        disabled.store(false, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name("quit-listener".to_string())
            .spawn(move || {
                let callback = move |event: Event| {
                    if disabled.load(Ordering::SeqCst) {
                        return;
                    }
                    if let EventType::KeyPress(key) = event.event_type {
                        if is_quit_key(key) {
                            log::info!("Quit key {:?} pressed, shutting down...", key);
                            stop.request();
                        }
                    }
                };

                // Blocks until error; rdev offers no way to stop it
                if let Err(e) = listen(callback) {
                    log::warn!("Quit-key listener error: {:?}", e);
                }
            })
            .map_err(HotkeyError::Spawn)?;

        self.listener_thread = Some(handle);
        Ok(())
    }

    /// Stop reacting to key events.
    ///
    /// rdev's `listen()` cannot be cancelled, so the thread lives until the
    /// process exits; it just ignores further events.
    pub fn stop(&mut self) {
        self.disabled.store(true, Ordering::SeqCst);
        self.listener_thread = None;
    }

    pub fn is_running(&self) -> bool {
        self.listener_thread.is_some()
    }
}

impl Drop for QuitListener {
    fn drop(&mut self) {
        self.stop();
    }
}
