//! Braille rendering of binary masks.
//!
//! Each braille character represents a 2x4 dot matrix, giving 8 subpixels
//! per terminal cell: enough to make obstacle outlines legible in a
//! terminal preview.

use crate::vision::Mask;

/// Braille base character (U+2800, empty braille pattern).
pub const BRAILLE_BASE: char = '\u{2800}';

/// Convert a 2x4 boolean grid to a braille character.
///
/// The bit positions are:
/// ```text
/// [0,0]=1   [1,0]=8
/// [0,1]=2   [1,1]=16
/// [0,2]=4   [1,2]=32
/// [0,3]=64  [1,3]=128
/// ```
///
/// `grid[x][y]` indicates whether the dot at (x, y) is on.
pub fn grid_to_braille(grid: [[bool; 4]; 2]) -> char {
    const BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

    let mut code = 0u8;
    for (x, column) in grid.iter().enumerate() {
        for (y, &on) in column.iter().enumerate() {
            if on {
                code |= BITS[x][y];
            }
        }
    }
    char::from_u32(BRAILLE_BASE as u32 + code as u32).unwrap_or(BRAILLE_BASE)
}

/// Mapping between a terminal character grid and mask pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGrid {
    pub char_width: u16,
    pub char_height: u16,
    scale_x: f32,
    scale_y: f32,
}

impl CellGrid {
    /// Fit a `img_width x img_height` image into `char_width` columns,
    /// choosing the row count that keeps braille dots roughly square.
    pub fn fit(img_width: u32, img_height: u32, char_width: u16) -> Self {
        let char_width = char_width.max(1);
        let dots_x = char_width as f32 * 2.0;
        let dots_y = if img_width == 0 {
            4.0
        } else {
            img_height as f32 * dots_x / img_width as f32
        };
        let char_height = ((dots_y / 4.0).ceil() as u16).max(1);
        Self::new(img_width, img_height, char_width, char_height)
    }

    pub fn new(img_width: u32, img_height: u32, char_width: u16, char_height: u16) -> Self {
        let dots_x = (char_width.max(1) as u32 * 2) as f32;
        let dots_y = (char_height.max(1) as u32 * 4) as f32;
        Self {
            char_width,
            char_height,
            scale_x: img_width as f32 / dots_x,
            scale_y: img_height as f32 / dots_y,
        }
    }

    /// Source pixel for braille dot `(bx, by)`.
    pub fn dot_to_pixel(&self, bx: u32, by: u32) -> (u32, u32) {
        (
            (bx as f32 * self.scale_x) as u32,
            (by as f32 * self.scale_y) as u32,
        )
    }

    /// Pixel x range `[start, end)` covered by character column `cx`.
    pub fn column_span(&self, cx: u16) -> (u32, u32) {
        let start = (cx as f32 * 2.0 * self.scale_x) as u32;
        let end = ((cx as f32 + 1.0) * 2.0 * self.scale_x).ceil() as u32;
        (start, end.max(start + 1))
    }

    /// Pixel y range `[start, end)` covered by character row `cy`.
    pub fn row_span(&self, cy: u16) -> (u32, u32) {
        let start = (cy as f32 * 4.0 * self.scale_y) as u32;
        let end = ((cy as f32 + 1.0) * 4.0 * self.scale_y).ceil() as u32;
        (start, end.max(start + 1))
    }
}

/// Render a mask as braille characters, row-major.
///
/// Foreground pixels become dots.
pub fn render_mask(mask: &Mask, grid: &CellGrid) -> Vec<char> {
    let mut buffer = Vec::new();
    render_mask_into(mask, grid, &mut buffer);
    buffer
}

/// Render a mask into an existing buffer, avoiding allocation per frame.
///
/// Returns the number of characters written.
pub fn render_mask_into(mask: &Mask, grid: &CellGrid, buffer: &mut Vec<char>) -> usize {
    buffer.clear();
    let (img_width, img_height) = mask.dimensions();
    if grid.char_width == 0 || grid.char_height == 0 || img_width == 0 || img_height == 0 {
        return 0;
    }

    let output_size = grid.char_width as usize * grid.char_height as usize;
    buffer.reserve(output_size);

    for cy in 0..grid.char_height {
        for cx in 0..grid.char_width {
            let mut dots = [[false; 4]; 2];

            // Sample 2x4 pixels for this braille character
            for dy in 0..4 {
                for dx in 0..2 {
                    let bx = cx as u32 * 2 + dx;
                    let by = cy as u32 * 4 + dy;
                    let (src_x, src_y) = grid.dot_to_pixel(bx, by);
                    if src_x < img_width && src_y < img_height {
                        dots[dx as usize][dy as usize] = mask.get_pixel(src_x, src_y)[0] != 0;
                    }
                }
            }

            buffer.push(grid_to_braille(dots));
        }
    }

    output_size
}
