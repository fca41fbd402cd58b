//! Vision pipeline: frame → mask → obstacles.
//!
//! - [`Preprocessor`] crops, thresholds, edge-detects and dilates a frame
//! - [`ObstacleDetector`] extracts bounding boxes from the resulting mask

mod canny;
mod contours;
mod crop;
mod grayscale;
mod morphology;
mod preprocess;
mod threshold;

pub use canny::canny;
pub use contours::{find_regions, Obstacle, ObstacleDetector};
pub use crop::CropWindow;
pub use grayscale::{luminance, to_luminance};
pub use morphology::dilate;
pub use preprocess::{Mask, PreprocessSettings, Preprocessor};
pub use threshold::{threshold_inverse, FOREGROUND};
