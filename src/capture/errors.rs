//! Error types for capture operations.

use std::path::PathBuf;
use thiserror::Error;

use super::types::CaptureRegion;

/// Errors that can occur while acquiring frames.
///
/// Every variant except `Exhausted` is fatal to a run: capture happens on
/// every tick and there is no degraded mode without it.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No monitor contains the region's top-left corner
    #[error(
        "No monitor contains the capture origin ({x}, {y}).\n\nCheck --x/--y or run `dino-bot calibrate` to verify the region."
    )]
    NoMonitor { x: i32, y: i32 },

    /// Region extends past the edge of its monitor
    #[error(
        "Capture region {region} does not fit on monitor '{monitor}' ({monitor_width}x{monitor_height} at ({monitor_x}, {monitor_y}))"
    )]
    RegionOutOfBounds {
        region: CaptureRegion,
        monitor: String,
        monitor_x: i32,
        monitor_y: i32,
        monitor_width: u32,
        monitor_height: u32,
    },

    /// The capture backend failed to read pixels
    #[error(
        "Screen capture failed: {0}\n\nOn macOS, grant access in System Settings > Privacy & Security > Screen Recording"
    )]
    Backend(String),

    /// Backend returned a buffer that could not be turned into a frame
    #[error("Captured buffer is malformed ({width}x{height})")]
    MalformedBuffer { width: u32, height: u32 },

    /// Failed to load a replay image
    #[error("Failed to load replay frame '{}': {source}", .path.display())]
    ReplayLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Replay source was created without frames
    #[error("Replay source has no frames")]
    NoReplayFrames,

    /// A non-looping replay source has returned all of its frames
    #[error("Replay source exhausted")]
    Exhausted,
}

impl CaptureError {
    /// Whether this error only marks the end of recorded input.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, CaptureError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_monitor_display() {
        let msg = CaptureError::NoMonitor { x: -5000, y: 20 }.to_string();
        assert!(msg.contains("(-5000, 20)"));
        assert!(msg.contains("calibrate"));
    }

    #[test]
    fn test_region_out_of_bounds_display() {
        let err = CaptureError::RegionOutOfBounds {
            region: CaptureRegion::new(1800, 300, 650, 200).unwrap(),
            monitor: "Built-in".to_string(),
            monitor_x: 0,
            monitor_y: 0,
            monitor_width: 1920,
            monitor_height: 1080,
        };
        let msg = err.to_string();
        assert!(msg.contains("650x200 at (1800, 300)"));
        assert!(msg.contains("Built-in"));
        assert!(msg.contains("1920x1080"));
    }

    #[test]
    fn test_is_exhausted() {
        assert!(CaptureError::Exhausted.is_exhausted());
        assert!(!CaptureError::Backend("denied".to_string()).is_exhausted());
    }
}
