//! Obstacle extraction from a binary mask.
//!
//! Foreground regions are 8-connected components of nonzero pixels; the
//! background is split into 4-connected components so each hole belongs to
//! exactly one region. Each region is summarised by its bounding box and
//! filled area: region pixels plus everything enclosed by it, the raster
//! equivalent of an external contour's area. Regions lying inside another
//! region's hole are not reported separately.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use super::preprocess::Mask;

const NO_LABEL: u32 = 0;

/// A candidate obstacle, in crop-local pixel coordinates.
///
/// Only valid for the tick that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    /// Left edge of the bounding box
    pub x: u32,
    /// Top edge of the bounding box
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Filled area in pixels
    pub area: u32,
}

impl Obstacle {
    /// Right edge of the bounding box (exclusive).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge of the bounding box (exclusive).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Extracts obstacles from masks, dropping regions smaller than `min_area`.
#[derive(Debug, Clone, Copy)]
pub struct ObstacleDetector {
    min_area: u32,
}

impl ObstacleDetector {
    pub fn new(min_area: u32) -> Self {
        Self { min_area }
    }

    pub fn min_area(&self) -> u32 {
        self.min_area
    }

    /// Find obstacles in a mask.
    ///
    /// Obstacles are returned in scan discovery order (top-to-bottom,
    /// left-to-right by first pixel). An empty result is normal.
    pub fn detect(&self, mask: &Mask) -> Vec<Obstacle> {
        find_regions(mask)
            .into_iter()
            .filter(|o| o.area >= self.min_area)
            .collect()
    }
}

impl Default for ObstacleDetector {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Per-component facts gathered in one raster pass.
#[derive(Debug, Clone, Copy)]
struct Component {
    /// Raster index of the first pixel
    first: usize,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    pixels: u32,
    touches_border: bool,
}

impl Component {
    fn new(first: usize, x: u32, y: u32) -> Self {
        Self {
            first,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            pixels: 0,
            touches_border: false,
        }
    }

    /// Placeholder for a label with no pixels; never treated as a hole.
    fn unused() -> Self {
        Self {
            touches_border: true,
            ..Self::new(0, 0, 0)
        }
    }

    fn add(&mut self, x: u32, y: u32, on_border: bool) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.pixels += 1;
        self.touches_border |= on_border;
    }
}

/// Components of a labelled image, indexed by `label - 1`, plus the labels
/// in the order their first pixel appears in a raster scan.
fn summarise(labels: &[u32], width: u32, height: u32) -> (Vec<Component>, Vec<u32>) {
    let mut components: Vec<Option<Component>> = Vec::new();
    let mut order = Vec::new();

    for (idx, &label) in labels.iter().enumerate() {
        if label == NO_LABEL {
            continue;
        }
        let x = idx as u32 % width;
        let y = idx as u32 / width;
        let slot = (label - 1) as usize;
        if components.len() <= slot {
            components.resize(slot + 1, None);
        }
        let component = components[slot].get_or_insert_with(|| {
            order.push(label);
            Component::new(idx, x, y)
        });
        let on_border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
        component.add(x, y, on_border);
    }

    let components = components
        .into_iter()
        .map(|c| c.unwrap_or_else(Component::unused))
        .collect();
    (components, order)
}

/// Label every external foreground region of the mask, unfiltered.
pub fn find_regions(mask: &Mask) -> Vec<Obstacle> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let binary = GrayImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y)[0] == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    });

    let fg_labels = connected_components(&binary, Connectivity::Eight, Luma([0])).into_raw();
    let bg_labels = connected_components(&binary, Connectivity::Four, Luma([255])).into_raw();
    let (regions, order) = summarise(&fg_labels, width, height);
    let (gaps, _) = summarise(&bg_labels, width, height);

    let w = width as usize;
    // The pixel above a component's first pixel lies just outside it.
    // Foreground above a hole is the region enclosing that hole.
    let hole_owner = |gap: u32| -> Option<u32> {
        let component = gaps.get(gap.checked_sub(1)? as usize)?;
        if component.touches_border || component.first < w {
            return None;
        }
        Some(fg_labels[component.first - w]).filter(|&label| label != NO_LABEL)
    };
    // Background above a region is the gap around it; a hole means nesting.
    let enclosing = |label: u32| -> Option<u32> {
        let first = regions[(label - 1) as usize].first;
        if first < w {
            return None;
        }
        hole_owner(bg_labels[first - w])
    };
    let outermost = |mut label: u32| -> u32 {
        while let Some(parent) = enclosing(label) {
            label = parent;
        }
        label
    };

    let mut area = vec![0u32; regions.len()];
    for &label in &order {
        area[(outermost(label) - 1) as usize] += regions[(label - 1) as usize].pixels;
    }
    for (i, gap) in gaps.iter().enumerate() {
        if let Some(owner) = hole_owner(i as u32 + 1) {
            area[(outermost(owner) - 1) as usize] += gap.pixels;
        }
    }

    order
        .into_iter()
        .filter(|&label| enclosing(label).is_none())
        .map(|label| {
            let r = &regions[(label - 1) as usize];
            Obstacle {
                x: r.min_x,
                y: r.min_y,
                width: r.max_x - r.min_x + 1,
                height: r.max_y - r.min_y + 1,
                area: area[(label - 1) as usize],
            }
        })
        .collect()
}
