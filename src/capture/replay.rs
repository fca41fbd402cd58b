//! Frame source that replays recorded images instead of the live display.

use std::path::Path;

use super::errors::CaptureError;
use super::types::{CaptureRegion, Frame};
use super::FrameSource;

/// Replays a fixed list of frames, one per `capture()` call.
///
/// Useful for tuning thresholds against saved screenshots and for driving
/// the control loop in tests.
#[derive(Debug)]
pub struct ReplaySource {
    region: CaptureRegion,
    frames: Vec<Frame>,
    next: usize,
    looping: bool,
}

impl ReplaySource {
    /// Create a replay source from in-memory frames.
    ///
    /// Frames that do not match the region size are resized to it.
    pub fn from_frames(
        region: CaptureRegion,
        frames: Vec<Frame>,
        looping: bool,
    ) -> Result<Self, CaptureError> {
        if frames.is_empty() {
            return Err(CaptureError::NoReplayFrames);
        }
        let frames = frames
            .into_iter()
            .map(|f| f.fit_to(region.width(), region.height()))
            .collect();
        Ok(Self {
            region,
            frames,
            next: 0,
            looping,
        })
    }

    /// Load replay frames from image files (any format the `image` crate reads).
    pub fn open<P: AsRef<Path>>(
        region: CaptureRegion,
        paths: &[P],
        looping: bool,
    ) -> Result<Self, CaptureError> {
        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let image = image::open(path)
                .map_err(|source| CaptureError::ReplayLoad {
                    path: path.to_path_buf(),
                    source,
                })?
                .to_rgb8();
            log::debug!("Loaded replay frame {} ({}x{})", path.display(), image.width(), image.height());
            frames.push(Frame::new(image));
        }
        Self::from_frames(region, frames, looping)
    }
}

impl FrameSource for ReplaySource {
    fn region(&self) -> CaptureRegion {
        self.region
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        if self.next >= self.frames.len() {
            if !self.looping {
                return Err(CaptureError::Exhausted);
            }
            self.next = 0;
        }
        let mut frame = self.frames[self.next].clone();
        frame.timestamp = std::time::Instant::now();
        self.next += 1;
        Ok(frame)
    }
}
