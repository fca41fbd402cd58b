//! Annotated overlay image: the captured region with the look-ahead band,
//! mask, obstacle boxes and jump line drawn on top.

use image::{Rgb, RgbImage};

use super::TickView;

/// Outline of the look-ahead band
pub const CROP_COLOR: Rgb<u8> = Rgb([255, 200, 0]);
/// Mask pixels
pub const MASK_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
/// Obstacle bounding boxes
pub const OBSTACLE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Jump-distance line
pub const LINE_COLOR: Rgb<u8> = Rgb([0, 200, 0]);

/// Thickness of the jump-distance line, in pixels.
const LINE_THICKNESS: u32 = 10;
/// The jump line is drawn this far below the nearest obstacle's top edge.
const LINE_OFFSET: u32 = 10;

/// Build the annotated overlay for one tick.
///
/// Coordinates from the decision are crop-local; they are shifted by the
/// crop window's origin and clipped to the window.
pub fn annotate(view: &TickView<'_>) -> RgbImage {
    let mut canvas = view.frame.image.clone();
    let (ox, oy) = (view.crop.cols().start, view.crop.rows().start);
    let (cw, ch) = (view.crop.width(), view.crop.height());

    for (x, y, px) in view.mask.enumerate_pixels() {
        if px[0] != 0 {
            put(&mut canvas, ox + x, oy + y, MASK_COLOR);
        }
    }

    for obstacle in &view.decision.obstacles {
        draw_rect(
            &mut canvas,
            ox + obstacle.x,
            oy + obstacle.y,
            obstacle.width,
            obstacle.height,
            OBSTACLE_COLOR,
        );
    }

    if let Some(nearest) = view.decision.nearest {
        let from = view.jump_distance.min(cw);
        let to = nearest.x.min(cw);
        let (left, right) = (from.min(to), from.max(to));
        let center = (nearest.y + LINE_OFFSET).min(ch.saturating_sub(1));
        let top = center.saturating_sub(LINE_THICKNESS / 2);
        let bottom = (center + LINE_THICKNESS / 2).min(ch);
        for y in top..bottom {
            for x in left..=right.min(cw.saturating_sub(1)) {
                put(&mut canvas, ox + x, oy + y, LINE_COLOR);
            }
        }
    }

    draw_rect(&mut canvas, ox, oy, cw, ch, CROP_COLOR);
    canvas
}

/// Draw a one-pixel rectangle outline, clipped to the canvas.
pub fn draw_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    if width == 0 || height == 0 {
        return;
    }
    let right = x + width - 1;
    let bottom = y + height - 1;
    for xx in x..=right {
        put(canvas, xx, y, color);
        put(canvas, xx, bottom, color);
    }
    for yy in y..=bottom {
        put(canvas, x, yy, color);
        put(canvas, right, yy, color);
    }
}

fn put(canvas: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>) {
    if x < canvas.width() && y < canvas.height() {
        canvas.put_pixel(x, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureRegion, Frame};
    use crate::policy::JumpPolicy;
    use crate::vision::{CropWindow, Mask, Obstacle};

    #[test]
    fn test_draw_rect_outline_only() {
        let mut canvas = RgbImage::new(10, 10);
        draw_rect(&mut canvas, 2, 2, 4, 3, OBSTACLE_COLOR);
        assert_eq!(*canvas.get_pixel(2, 2), OBSTACLE_COLOR);
        assert_eq!(*canvas.get_pixel(5, 4), OBSTACLE_COLOR);
        assert_eq!(*canvas.get_pixel(3, 3), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_rect_clips() {
        let mut canvas = RgbImage::new(4, 4);
        draw_rect(&mut canvas, 2, 2, 10, 10, OBSTACLE_COLOR);
        assert_eq!(*canvas.get_pixel(3, 2), OBSTACLE_COLOR);
    }

    #[test]
    fn test_annotate_draws_line_and_boxes() {
        let region = CaptureRegion::new(0, 0, 200, 60).unwrap();
        let crop = CropWindow::new(10, 50, 20, None, &region).unwrap();
        let frame = Frame::new(RgbImage::from_pixel(200, 60, Rgb([247, 247, 247])));
        let mask = Mask::new(crop.width(), crop.height());
        let obstacle = Obstacle {
            x: 100,
            y: 5,
            width: 10,
            height: 20,
            area: 200,
        };
        let decision = JumpPolicy::new(65).decide(vec![obstacle]);
        let view = TickView {
            frame: &frame,
            mask: &mask,
            crop: &crop,
            decision: &decision,
            jump_distance: 65,
            fps: None,
            jumped: false,
            tick: 1,
        };

        let out = annotate(&view);
        assert_eq!(out.dimensions(), (200, 60));
        // Crop outline at its top-left corner
        assert_eq!(*out.get_pixel(20, 10), CROP_COLOR);
        // Line between x=65 and x=100 at y = 5 + 10, shifted by the crop origin
        assert_eq!(*out.get_pixel(20 + 80, 10 + 15), LINE_COLOR);
        // Box corner
        assert_eq!(*out.get_pixel(20 + 100, 10 + 5), OBSTACLE_COLOR);
        // Outside the crop nothing changes
        assert_eq!(*out.get_pixel(5, 5), Rgb([247, 247, 247]));
    }
}
