//! Emitter that only logs.

use super::{ActionEmitter, ActionError};
use crate::render::terminal_log_level;

/// Logs each jump instead of pressing a key.
#[derive(Debug, Default)]
pub struct DryRunEmitter {
    jumps: u64,
}

impl DryRunEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jumps requested so far.
    pub fn jumps(&self) -> u64 {
        self.jumps
    }
}

impl ActionEmitter for DryRunEmitter {
    fn jump(&mut self) -> Result<(), ActionError> {
        self.jumps += 1;
        log::log!(
            terminal_log_level(log::Level::Info),
            "[dry-run] Jump #{}",
            self.jumps
        );
        Ok(())
    }
}
