//! RGB to luminance conversion using the ITU-R BT.601 formula.

use image::{GrayImage, RgbImage};

/// Convert an RGB image to single-channel luminance.
///
/// The luminance formula is: Y = 0.299*R + 0.587*G + 0.114*B
///
/// Integer math with coefficients scaled by 1000 (299 + 587 + 114 = 1000)
/// keeps floating point out of the per-tick path.
pub fn to_luminance(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = Vec::with_capacity(width as usize * height as usize);

    for rgb in image.as_raw().chunks_exact(3) {
        gray.push(luminance(rgb[0], rgb[1], rgb[2]));
    }

    // Length is width * height by construction
    GrayImage::from_raw(width, height, gray).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Luminance of a single pixel.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_luminance_primaries() {
        assert_eq!(luminance(255, 0, 0), 76);
        assert_eq!(luminance(0, 255, 0), 149);
        assert_eq!(luminance(0, 0, 255), 29);
    }

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);
    }

    #[test]
    fn test_to_luminance_dimensions() {
        let image = RgbImage::from_pixel(5, 3, Rgb([128, 128, 128]));
        let gray = to_luminance(&image);
        assert_eq!(gray.dimensions(), (5, 3));
        assert!(gray.pixels().all(|p| p[0] == 128));
    }
}
