//! Key press injection via rdev.

use rdev::{simulate, EventType, Key};
use std::thread;
use std::time::Duration;

use super::{ActionEmitter, ActionError, JumpKey};
use crate::render::terminal_log_level;

/// Sends a press + release of the jump key to the OS input stream.
///
/// Note: On macOS, this requires Accessibility permissions.
#[derive(Debug, Clone)]
pub struct KeyboardEmitter {
    key: JumpKey,
    /// Delay between press and release
    hold: Duration,
}

impl KeyboardEmitter {
    pub fn new(key: JumpKey, hold: Duration) -> Self {
        Self { key, hold }
    }

    pub fn key(&self) -> JumpKey {
        self.key
    }

    fn send(&self, event: EventType) -> Result<(), ActionError> {
        simulate(&event).map_err(|e| ActionError::Simulate {
            key: self.key,
            message: format!("{:?}", e),
        })
    }
}

impl ActionEmitter for KeyboardEmitter {
    fn jump(&mut self) -> Result<(), ActionError> {
        let key = rdev_key(self.key);
        self.send(EventType::KeyPress(key))?;
        if !self.hold.is_zero() {
            thread::sleep(self.hold);
        }
        self.send(EventType::KeyRelease(key))?;
        log::log!(terminal_log_level(log::Level::Info), "Jump ({})", self.key);
        Ok(())
    }
}

fn rdev_key(key: JumpKey) -> Key {
    match key {
        JumpKey::Space => Key::Space,
        JumpKey::Up => Key::UpArrow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdev_key_mapping() {
        assert_eq!(rdev_key(JumpKey::Space), Key::Space);
        assert_eq!(rdev_key(JumpKey::Up), Key::UpArrow);
    }

    #[test]
    fn test_keyboard_emitter_new() {
        let emitter = KeyboardEmitter::new(JumpKey::Up, Duration::from_millis(20));
        assert_eq!(emitter.key(), JumpKey::Up);
        assert_eq!(emitter.hold, Duration::from_millis(20));
    }
}
