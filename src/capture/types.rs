//! Capture types and data structures.

use image::{imageops, RgbImage};
use std::fmt;
use std::time::Instant;

use crate::config::ConfigError;

/// Rectangle of the display to capture, in screen coordinates.
///
/// Validated on construction and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl CaptureRegion {
    /// Create a capture region.
    ///
    /// # Errors
    /// * `ConfigError::EmptyRegion` - If width or height is zero
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyRegion { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Right edge (exclusive) in screen coordinates.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bottom edge (exclusive) in screen coordinates.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// A captured frame: an RGB raster of the capture region.
///
/// Frames are produced fresh every tick and dropped when the tick ends.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Pixel data, 3 channels
    pub image: RgbImage,
    /// Timestamp when the frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Wrap an RGB image captured now.
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            timestamp: Instant::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Return this frame resized to exactly `width` x `height`.
    ///
    /// Frames that already match are returned unchanged.
    pub fn fit_to(self, width: u32, height: u32) -> Self {
        if self.width() == width && self.height() == height {
            return self;
        }
        let image = imageops::resize(&self.image, width, height, imageops::FilterType::Nearest);
        Self {
            image,
            timestamp: self.timestamp,
        }
    }
}
