//! Jump action emitters.
//!
//! - [`KeyboardEmitter`] injects a key press into the OS input stream
//! - [`DryRunEmitter`] only logs, for tuning without touching the game
//! - [`Cooldown`] wraps any emitter and drops jumps issued too close together

mod cooldown;
mod dry_run;
mod keyboard;

pub use cooldown::Cooldown;
pub use dry_run::DryRunEmitter;
pub use keyboard::KeyboardEmitter;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while emitting a jump.
///
/// These are never fatal: the loop reports them and moves on to the next tick.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The input backend rejected the simulated key event
    #[error(
        "Failed to send {key} key event: {message}\n\nOn macOS, grant access in System Settings > Privacy & Security > Accessibility"
    )]
    Simulate { key: JumpKey, message: String },
}

/// Key pressed to make the runner jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JumpKey {
    #[default]
    Space,
    Up,
}

impl JumpKey {
    pub fn name(&self) -> &'static str {
        match self {
            JumpKey::Space => "space",
            JumpKey::Up => "up",
        }
    }
}

impl fmt::Display for JumpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Issues the external jump command.
///
/// Fire-and-forget: a successful return only means the event was handed to
/// the backend, not that the game reacted. The game window must hold input
/// focus; that is the operator's job.
pub trait ActionEmitter {
    fn jump(&mut self) -> Result<(), ActionError>;
}

impl<E: ActionEmitter + ?Sized> ActionEmitter for Box<E> {
    fn jump(&mut self) -> Result<(), ActionError> {
        (**self).jump()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_key_names() {
        assert_eq!(JumpKey::Space.to_string(), "space");
        assert_eq!(JumpKey::Up.to_string(), "up");
        assert_eq!(JumpKey::default(), JumpKey::Space);
    }

    #[test]
    fn test_action_error_display() {
        let err = ActionError::Simulate {
            key: JumpKey::Up,
            message: "denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("up key"));
        assert!(msg.contains("denied"));
    }
}
