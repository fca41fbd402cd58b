//! Frame → obstacle-edge mask.

use image::GrayImage;

use super::canny::canny;
use super::crop::CropWindow;
use super::grayscale::to_luminance;
use super::morphology::dilate;
use super::threshold::threshold_inverse;
use crate::capture::Frame;
use crate::config::ConfigError;

/// Binary mask: 255 = obstacle outline, 0 = background.
pub type Mask = GrayImage;

/// Tunable preprocessing thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessSettings {
    /// Luminance cutoff; pixels at or below it become foreground
    pub threshold: u8,
    /// Canny hysteresis low threshold (L1 Sobel magnitude)
    pub canny_low: u16,
    /// Canny hysteresis high threshold (L1 Sobel magnitude)
    pub canny_high: u16,
    /// Side of the square dilation kernel, odd
    pub dilate_kernel: u32,
    /// Number of dilation passes
    pub dilate_iterations: u32,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            threshold: 127,
            canny_low: 50,
            canny_high: 50,
            dilate_kernel: 5,
            dilate_iterations: 2,
        }
    }
}

impl PreprocessSettings {
    /// Check the settings for values the pipeline cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canny_low > self.canny_high {
            return Err(ConfigError::CannyThresholds {
                low: self.canny_low,
                high: self.canny_high,
            });
        }
        if self.dilate_kernel == 0 || self.dilate_kernel % 2 == 0 {
            return Err(ConfigError::DilateKernel(self.dilate_kernel));
        }
        Ok(())
    }
}

/// Turns captured frames into binary obstacle-edge masks.
///
/// Steps, in order: crop to the look-ahead band, luminance, inverse
/// threshold, Canny, dilation. Every step is a pure function of its input,
/// so identical frames always produce identical masks.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    crop: CropWindow,
    settings: PreprocessSettings,
}

impl Preprocessor {
    /// Create a preprocessor.
    ///
    /// # Errors
    /// Returns a `ConfigError` if the settings fail validation.
    pub fn new(crop: CropWindow, settings: PreprocessSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { crop, settings })
    }

    pub fn crop(&self) -> &CropWindow {
        &self.crop
    }

    pub fn settings(&self) -> &PreprocessSettings {
        &self.settings
    }

    /// Run the full pipeline on a frame.
    ///
    /// The returned mask has exactly the crop window's dimensions.
    pub fn preprocess(&self, frame: &Frame) -> Mask {
        let cropped = self.crop.apply(&frame.image);
        let gray = to_luminance(&cropped);
        let binary = threshold_inverse(&gray, self.settings.threshold);
        let edges = canny(&binary, self.settings.canny_low, self.settings.canny_high);
        dilate(
            &edges,
            self.settings.dilate_kernel,
            self.settings.dilate_iterations,
        )
    }
}
