//! Canny edge detection.
//!
//! Sobel gradients, non-maximum suppression and hysteresis thresholding.
//! Gradient magnitude uses the L1 norm `|gx| + |gy|`, so thresholds are on
//! the same scale as a 3x3 Sobel response (a hard 0→255 step gives 1020).

use image::GrayImage;
use std::collections::VecDeque;

use super::threshold::FOREGROUND;

/// Sobel kernels.
/// Gx detects vertical edges (horizontal gradient),
/// Gy detects horizontal edges (vertical gradient).
const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// tan(22.5°) and tan(67.5°), scaled by 10_000.
const TAN_22_5: i64 = 4142;
const TAN_67_5: i64 = 24142;

const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Quantized gradient direction used for non-maximum suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Mostly horizontal gradient: compare left/right neighbours
    Horizontal,
    /// Mostly vertical gradient: compare up/down neighbours
    Vertical,
    /// Diagonal where gx and gy share a sign
    DiagonalDown,
    /// Diagonal where gx and gy differ in sign
    DiagonalUp,
}

fn quantize(gx: i32, gy: i32) -> Direction {
    let ax = gx.unsigned_abs() as i64;
    let ay = gy.unsigned_abs() as i64;

    if ay * 10_000 <= ax * TAN_22_5 {
        Direction::Horizontal
    } else if ay * 10_000 > ax * TAN_67_5 {
        Direction::Vertical
    } else if (gx < 0) == (gy < 0) {
        Direction::DiagonalDown
    } else {
        Direction::DiagonalUp
    }
}

/// Compute Sobel gradients with replicated borders.
///
/// Returns `(gx, gy)` in row-major order.
fn sobel(gray: &GrayImage) -> (Vec<i32>, Vec<i32>) {
    let (width, height) = gray.dimensions();
    let w = width as i32;
    let h = height as i32;
    let raw = gray.as_raw();
    let len = raw.len();
    let mut gx = vec![0i32; len];
    let mut gy = vec![0i32; len];

    for y in 0..h {
        for x in 0..w {
            let mut sx = 0;
            let mut sy = 0;

            // Apply 3x3 kernel
            for ky in 0..3 {
                for kx in 0..3 {
                    let px = (x + kx as i32 - 1).clamp(0, w - 1);
                    let py = (y + ky as i32 - 1).clamp(0, h - 1);
                    let val = raw[(py * w + px) as usize] as i32;
                    sx += val * SOBEL_X[ky][kx];
                    sy += val * SOBEL_Y[ky][kx];
                }
            }

            let idx = (y * w + x) as usize;
            gx[idx] = sx;
            gy[idx] = sy;
        }
    }

    (gx, gy)
}

/// Run Canny edge detection on a grayscale image.
///
/// Pixels whose gradient magnitude exceeds `high` seed edges; pixels above
/// `low` that survive non-maximum suppression are kept when 8-connected to a
/// seed. Edge pixels are 255, everything else 0. Output has the input's
/// dimensions.
pub fn canny(gray: &GrayImage, low: u16, high: u16) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut edges = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return edges;
    }

    let w = width as i32;
    let h = height as i32;
    let (gx, gy) = sobel(gray);
    let magnitude: Vec<i32> = gx.iter().zip(&gy).map(|(x, y)| x.abs() + y.abs()).collect();
    let low = low as i32;
    let high = high as i32;

    // Magnitude outside the image counts as zero
    let mag_at = |x: i32, y: i32| -> i32 {
        if x < 0 || y < 0 || x >= w || y >= h {
            0
        } else {
            magnitude[(y * w + x) as usize]
        }
    };

    // Non-maximum suppression: 0 = suppressed, 1 = weak candidate, 2 = strong
    let mut class = vec![0u8; magnitude.len()];
    let mut seeds = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            let m = magnitude[idx];
            if m <= low {
                continue;
            }

            let is_max = match quantize(gx[idx], gy[idx]) {
                Direction::Horizontal => m > mag_at(x - 1, y) && m >= mag_at(x + 1, y),
                Direction::Vertical => m > mag_at(x, y - 1) && m >= mag_at(x, y + 1),
                Direction::DiagonalDown => m > mag_at(x - 1, y - 1) && m > mag_at(x + 1, y + 1),
                Direction::DiagonalUp => m > mag_at(x + 1, y - 1) && m > mag_at(x - 1, y + 1),
            };
            if !is_max {
                continue;
            }

            if m > high {
                class[idx] = 2;
                seeds.push_back((x, y));
            } else {
                class[idx] = 1;
            }
        }
    }

    // Hysteresis: grow strong edges through connected weak candidates
    while let Some((x, y)) = seeds.pop_front() {
        edges.put_pixel(x as u32, y as u32, image::Luma([FOREGROUND]));

        for &(dx, dy) in &NEIGHBORS {
            let nx = x + dx;
            let ny = y + dy;
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            let nidx = (ny * w + nx) as usize;
            if class[nidx] == 1 {
                class[nidx] = 2;
                seeds.push_back((nx, ny));
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_quantize_directions() {
        assert_eq!(quantize(100, 0), Direction::Horizontal);
        assert_eq!(quantize(0, 100), Direction::Vertical);
        assert_eq!(quantize(100, 100), Direction::DiagonalDown);
        assert_eq!(quantize(-100, -100), Direction::DiagonalDown);
        assert_eq!(quantize(100, -100), Direction::DiagonalUp);
    }

    #[test]
    fn test_canny_flat_image_has_no_edges() {
        let gray = GrayImage::from_pixel(10, 10, Luma([255]));
        let edges = canny(&gray, 50, 50);
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_canny_vertical_step_is_one_pixel_wide() {
        // Left half black, right half white
        let gray = GrayImage::from_fn(10, 6, |x, _| if x < 5 { Luma([0]) } else { Luma([255]) });
        let edges = canny(&gray, 50, 50);

        for y in 0..6 {
            let row: Vec<u32> = (0..10).filter(|&x| edges.get_pixel(x, y)[0] == 255).collect();
            assert_eq!(row, vec![4], "row {} should have a single edge at x=4", y);
        }
    }

    #[test]
    fn test_canny_outlines_square() {
        let gray = GrayImage::from_fn(20, 20, |x, y| {
            if (5..15).contains(&x) && (5..15).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let edges = canny(&gray, 50, 50);

        // Interior and far background stay empty
        assert_eq!(edges.get_pixel(10, 10)[0], 0);
        assert_eq!(edges.get_pixel(0, 0)[0], 0);
        // Each side of the square produces edge pixels
        assert!((5..15).any(|y| edges.get_pixel(4, y)[0] == 255));
        assert!((5..15).any(|y| edges.get_pixel(14, y)[0] == 255));
        assert!((5..15).any(|x| edges.get_pixel(x, 4)[0] == 255));
        assert!((5..15).any(|x| edges.get_pixel(x, 14)[0] == 255));
    }

    #[test]
    fn test_canny_high_threshold_rejects_weak_step() {
        // Step of 10 gives an L1 magnitude of 40
        let gray = GrayImage::from_fn(10, 4, |x, _| if x < 5 { Luma([100]) } else { Luma([110]) });
        assert!(canny(&gray, 10, 50).pixels().all(|p| p[0] == 0));
        assert!(canny(&gray, 10, 30).pixels().any(|p| p[0] == 255));
    }

    #[test]
    fn test_canny_empty_image() {
        let gray = GrayImage::new(0, 0);
        assert_eq!(canny(&gray, 50, 50).dimensions(), (0, 0));
    }
}
