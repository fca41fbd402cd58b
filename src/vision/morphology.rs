//! Binary dilation with a square structuring element.

use image::GrayImage;
use imageproc::distance_transform::Norm;

/// Dilate an image with a `kernel x kernel` square of ones, `iterations` times.
///
/// Any nonzero pixel is foreground and dilated pixels are set to 255; pixels
/// outside the image are ignored. A square kernel of radius `k` is the L∞
/// ball of radius `k`, which is what `imageproc` dilates with.
///
/// `kernel` is expected to be odd (validated in configuration). An even value
/// behaves like the next smaller odd kernel.
pub fn dilate(image: &GrayImage, kernel: u32, iterations: u32) -> GrayImage {
    let radius = u8::try_from(kernel / 2).unwrap_or(u8::MAX);
    let mut current = image.clone();
    if radius == 0 {
        return current;
    }

    for _ in 0..iterations {
        current = imageproc::morphology::dilate(&current, Norm::LInf, radius);
    }
    current
}
