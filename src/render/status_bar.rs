//! One-line status summary shown under the preview.

use super::TickView;

/// Format the status line for a tick.
///
/// Format: " tick N | FPS | obstacles | nearest | threshold | JUMP "
pub fn format_status(view: &TickView<'_>) -> String {
    let fps = view
        .fps
        .map(|f| format!("{:5.1} fps", f))
        .unwrap_or_else(|| "  --- fps".to_string());
    let nearest = view
        .decision
        .nearest_x()
        .map(|x| x.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        " tick {} | {} | obstacles: {} | nearest x: {} | jump < {} | {} ",
        view.tick,
        fps,
        view.decision.obstacles.len(),
        nearest,
        view.jump_distance,
        if view.jumped { "JUMP" } else { "    " },
    )
}
