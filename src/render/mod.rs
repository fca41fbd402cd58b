//! Diagnostic rendering.
//!
//! Everything here consumes per-tick artifacts for display only; nothing
//! feeds back into the decision.
//!
//! - [`TerminalPreview`] draws the mask, boxes and status in the terminal
//! - [`annotate`] builds a full-color overlay image (used by `calibrate`)

mod braille;
mod overlay;
mod preview;
mod screen;
mod status_bar;

pub use braille::{grid_to_braille, render_mask, render_mask_into, CellGrid, BRAILLE_BASE};
pub use overlay::{annotate, draw_rect, CROP_COLOR, LINE_COLOR, MASK_COLOR, OBSTACLE_COLOR};
pub use preview::TerminalPreview;
pub use screen::{terminal_log_level, AlternateScreenGuard};
pub use status_bar::format_status;

use thiserror::Error;

use crate::capture::Frame;
use crate::policy::Decision;
use crate::vision::{CropWindow, Mask};

/// Errors raised by a preview. The control loop disables the preview on
/// the first one and keeps running.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Preview output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a preview may show about one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickView<'a> {
    pub frame: &'a Frame,
    pub mask: &'a Mask,
    pub crop: &'a CropWindow,
    pub decision: &'a Decision,
    pub jump_distance: u32,
    /// Windowed loop rate, once known
    pub fps: Option<f64>,
    /// Whether a jump was issued this tick
    pub jumped: bool,
    pub tick: u64,
}

/// Display sink for per-tick diagnostics.
pub trait Preview {
    fn show(&mut self, view: &TickView<'_>) -> Result<(), PreviewError>;
}

impl<P: Preview + ?Sized> Preview for Box<P> {
    fn show(&mut self, view: &TickView<'_>) -> Result<(), PreviewError> {
        (**self).show(view)
    }
}

/// Preview that shows nothing, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPreview;

impl Preview for NullPreview {
    fn show(&mut self, _view: &TickView<'_>) -> Result<(), PreviewError> {
        Ok(())
    }
}
