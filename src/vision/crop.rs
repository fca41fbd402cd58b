//! Look-ahead band cropping.

use image::{imageops, RgbImage};
use std::fmt;
use std::ops::Range;

use crate::capture::CaptureRegion;
use crate::config::ConfigError;

/// Sub-rectangle of each captured frame that is analysed for obstacles.
///
/// Rows and columns are half-open ranges in frame coordinates. The window is
/// validated against the capture region when built and is immutable after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    row_start: u32,
    row_end: u32,
    col_start: u32,
    col_end: u32,
}

impl CropWindow {
    /// Build a crop window inside `region`.
    ///
    /// `col_end = None` extends the window to the right edge of the region.
    ///
    /// # Errors
    /// * `ConfigError::CropRows` - If `row_end <= row_start`
    /// * `ConfigError::CropColumns` - If `col_end <= col_start`
    /// * `ConfigError::CropOutOfBounds` - If the window exceeds the region
    pub fn new(
        row_start: u32,
        row_end: u32,
        col_start: u32,
        col_end: Option<u32>,
        region: &CaptureRegion,
    ) -> Result<Self, ConfigError> {
        let col_end = col_end.unwrap_or(region.width());

        if row_end <= row_start {
            return Err(ConfigError::CropRows {
                start: row_start,
                end: row_end,
            });
        }
        if col_end <= col_start {
            return Err(ConfigError::CropColumns {
                start: col_start,
                end: col_end,
            });
        }
        if row_end > region.height() || col_end > region.width() {
            return Err(ConfigError::CropOutOfBounds {
                rows: row_start..row_end,
                cols: col_start..col_end,
                width: region.width(),
                height: region.height(),
            });
        }

        Ok(Self {
            row_start,
            row_end,
            col_start,
            col_end,
        })
    }

    pub fn rows(&self) -> Range<u32> {
        self.row_start..self.row_end
    }

    pub fn cols(&self) -> Range<u32> {
        self.col_start..self.col_end
    }

    pub fn width(&self) -> u32 {
        self.col_end - self.col_start
    }

    pub fn height(&self) -> u32 {
        self.row_end - self.row_start
    }

    /// Cut the window out of a frame image.
    ///
    /// The image is expected to have the capture region's dimensions; a
    /// smaller image yields a correspondingly clipped crop.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        imageops::crop_imm(
            image,
            self.col_start,
            self.row_start,
            self.width(),
            self.height(),
        )
        .to_image()
    }
}

impl fmt::Display for CropWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows {}..{}, cols {}..{}",
            self.row_start, self.row_end, self.col_start, self.col_end
        )
    }
}
