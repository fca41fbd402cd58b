//! Frame acquisition.
//!
//! - [`FrameSource`] is the per-tick capture seam used by the control loop
//! - [`ScreenCapture`] reads a fixed region of the live display
//! - [`ReplaySource`] replays saved images for offline tuning and tests

mod errors;
mod replay;
mod screen;
mod types;

pub use errors::CaptureError;
pub use replay::ReplaySource;
pub use screen::{crop_rgba_to_rgb, ScreenCapture};
pub use types::{CaptureRegion, Frame};

/// Source of one frame per control tick.
pub trait FrameSource {
    /// The region this source captures. Every frame has its dimensions.
    fn region(&self) -> CaptureRegion;

    /// Capture the next frame.
    ///
    /// Errors are fatal to the run, except [`CaptureError::Exhausted`] which
    /// marks the end of recorded input.
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn region(&self) -> CaptureRegion {
        (**self).region()
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        (**self).capture()
    }
}
