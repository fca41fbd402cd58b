//! Rate limiting for repeated jump signals.
//!
//! The decision policy signals a jump on every tick the nearest obstacle is
//! under the threshold. `Cooldown` turns that stream into at most one key
//! press per cooldown period.

use std::time::{Duration, Instant};

use super::{ActionEmitter, ActionError};

/// Wraps an emitter and suppresses jumps within `period` of the last one.
#[derive(Debug)]
pub struct Cooldown<E> {
    inner: E,
    period: Duration,
    last_jump: Option<Instant>,
    suppressed: u64,
}

impl<E: ActionEmitter> Cooldown<E> {
    /// Wrap `inner`. A zero `period` forwards every jump.
    pub fn new(inner: E, period: Duration) -> Self {
        Self {
            inner,
            period,
            last_jump: None,
            suppressed: 0,
        }
    }

    /// Number of jumps dropped by the cooldown.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn jump_at(&mut self, now: Instant) -> Result<(), ActionError> {
        if let Some(last) = self.last_jump {
            if now.saturating_duration_since(last) < self.period {
                self.suppressed += 1;
                log::debug!(
                    "Jump suppressed by cooldown ({:?} since last)",
                    now.saturating_duration_since(last)
                );
                return Ok(());
            }
        }
        // Only a delivered jump starts a new cooldown period
        self.inner.jump()?;
        self.last_jump = Some(now);
        Ok(())
    }
}

impl<E: ActionEmitter> ActionEmitter for Cooldown<E> {
    fn jump(&mut self) -> Result<(), ActionError> {
        self.jump_at(Instant::now())
    }
}
