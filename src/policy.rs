//! Jump decision policy.
//!
//! Obstacles scroll right-to-left toward the runner at the left edge of the
//! look-ahead band, so the leftmost obstacle is the nearest one. The policy
//! is memoryless: the same obstacles always give the same decision.

use crate::vision::Obstacle;

/// Outcome of one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether to press jump this tick
    pub should_jump: bool,
    /// The nearest (minimum-x) obstacle, if any
    pub nearest: Option<Obstacle>,
    /// All obstacles, sorted by ascending x
    pub obstacles: Vec<Obstacle>,
}

impl Decision {
    /// X coordinate of the nearest obstacle.
    pub fn nearest_x(&self) -> Option<u32> {
        self.nearest.map(|o| o.x)
    }
}

/// Triggers a jump when the nearest obstacle is closer than `jump_distance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpPolicy {
    jump_distance: u32,
}

impl JumpPolicy {
    /// Create a policy with the given threshold, in crop-local pixels.
    pub fn new(jump_distance: u32) -> Self {
        Self { jump_distance }
    }

    pub fn jump_distance(&self) -> u32 {
        self.jump_distance
    }

    /// Decide whether to jump.
    ///
    /// Obstacles are stable-sorted by x, so among several at the same x the
    /// first one in detection order is reported as nearest.
    pub fn decide(&self, mut obstacles: Vec<Obstacle>) -> Decision {
        obstacles.sort_by_key(|o| o.x);
        let nearest = obstacles.first().copied();
        let should_jump = nearest.is_some_and(|o| o.x < self.jump_distance);

        Decision {
            should_jump,
            nearest,
            obstacles,
        }
    }
}

impl Default for JumpPolicy {
    fn default() -> Self {
        Self::new(65)
    }
}
