//! Inverse binary thresholding.

use image::GrayImage;

/// Foreground value written into binary images.
pub const FOREGROUND: u8 = 255;

/// Threshold a luminance image so that dark pixels become foreground.
///
/// Pixels brighter than `cutoff` become 0, everything else becomes 255.
/// Obstacles render darker than the game background, so they end up "on".
pub fn threshold_inverse(gray: &GrayImage, cutoff: u8) -> GrayImage {
    let mut out = gray.clone();
    for px in out.pixels_mut() {
        px[0] = if px[0] > cutoff { 0 } else { FOREGROUND };
    }
    out
}
