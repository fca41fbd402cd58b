//! Live display capture backed by xcap.

use image::RgbImage;
use xcap::Monitor;

use super::errors::CaptureError;
use super::types::{CaptureRegion, Frame};
use super::FrameSource;

/// Capture session for a fixed region of one monitor.
///
/// The monitor is resolved once in [`ScreenCapture::open`]; every call to
/// `capture()` grabs the monitor and cuts the region out of it.
pub struct ScreenCapture {
    region: CaptureRegion,
    monitor: Monitor,
    /// Region origin relative to the monitor, in logical pixels
    local_x: u32,
    local_y: u32,
    monitor_width: u32,
    monitor_height: u32,
}

impl std::fmt::Debug for ScreenCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenCapture")
            .field("region", &self.region)
            .field("monitor", &self.monitor.name())
            .finish_non_exhaustive()
    }
}

impl ScreenCapture {
    /// Open a capture session for `region`.
    ///
    /// # Errors
    /// * `CaptureError::NoMonitor` - If no monitor contains the region origin
    /// * `CaptureError::RegionOutOfBounds` - If the region spills off that monitor
    pub fn open(region: CaptureRegion) -> Result<Self, CaptureError> {
        let monitor = Monitor::from_point(region.x(), region.y()).map_err(|e| {
            log::debug!("Monitor lookup failed: {}", e);
            CaptureError::NoMonitor {
                x: region.x(),
                y: region.y(),
            }
        })?;

        let (mx, my) = (monitor.x(), monitor.y());
        let (mw, mh) = (monitor.width(), monitor.height());
        let fits = region.x() >= mx
            && region.y() >= my
            && region.right() <= mx as i64 + mw as i64
            && region.bottom() <= my as i64 + mh as i64;
        if !fits {
            return Err(CaptureError::RegionOutOfBounds {
                region,
                monitor: monitor.name().to_string(),
                monitor_x: mx,
                monitor_y: my,
                monitor_width: mw,
                monitor_height: mh,
            });
        }

        log::info!(
            "Capturing {} on monitor '{}' ({}x{})",
            region,
            monitor.name(),
            mw,
            mh
        );

        Ok(Self {
            region,
            local_x: (region.x() - mx) as u32,
            local_y: (region.y() - my) as u32,
            monitor_width: mw,
            monitor_height: mh,
            monitor,
        })
    }
}

impl FrameSource for ScreenCapture {
    fn region(&self) -> CaptureRegion {
        self.region
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let shot = self
            .monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        let (shot_width, shot_height) = (shot.width(), shot.height());

        let (x, width) = scale_span(self.local_x, self.region.width(), self.monitor_width, shot_width);
        let (y, height) =
            scale_span(self.local_y, self.region.height(), self.monitor_height, shot_height);
        if width == 0 || height == 0 {
            return Err(CaptureError::MalformedBuffer {
                width: shot_width,
                height: shot_height,
            });
        }

        let rgb = crop_rgba_to_rgb(shot.as_raw(), shot_width, x, y, width, height).ok_or(
            CaptureError::MalformedBuffer {
                width: shot_width,
                height: shot_height,
            },
        )?;
        let image = RgbImage::from_raw(width, height, rgb).ok_or(CaptureError::MalformedBuffer {
            width,
            height,
        })?;

        Ok(Frame::new(image).fit_to(self.region.width(), self.region.height()))
    }
}

/// Map a logical span `[start, start + len)` on a monitor `logical` pixels
/// wide onto a screenshot `physical` pixels wide.
///
/// Screenshots come back in physical pixels on HiDPI displays. The result is
/// rounded and clamped so it always lies inside the screenshot, and is
/// non-empty whenever the screenshot is.
pub fn scale_span(start: u32, len: u32, logical: u32, physical: u32) -> (u32, u32) {
    if physical == 0 {
        return (0, 0);
    }
    let scale = if logical == 0 {
        1.0
    } else {
        physical as f64 / logical as f64
    };
    let start = ((start as f64 * scale).round() as u32).min(physical - 1);
    let len = ((len as f64 * scale).round() as u32).clamp(1, physical - start);
    (start, len)
}

/// Cut a rectangle out of a packed RGBA buffer, dropping alpha.
///
/// Returns `None` if the rectangle is not fully inside the buffer.
pub fn crop_rgba_to_rgb(
    rgba: &[u8],
    stride_width: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Option<Vec<u8>> {
    if x + width > stride_width {
        return None;
    }
    let stride = stride_width as usize * 4;
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);

    for row in y..y + height {
        let start = row as usize * stride + x as usize * 4;
        let end = start + width as usize * 4;
        let line = rgba.get(start..end)?;
        for px in line.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
    }

    Some(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_span_identity() {
        assert_eq!(scale_span(450, 650, 1920, 1920), (450, 650));
        assert_eq!(scale_span(300, 200, 1080, 1080), (300, 200));
    }

    #[test]
    fn test_scale_span_retina() {
        assert_eq!(scale_span(450, 650, 1920, 3840), (900, 1300));
        assert_eq!(scale_span(300, 200, 1080, 2160), (600, 400));
    }

    #[test]
    fn test_scale_span_fractional() {
        assert_eq!(scale_span(450, 650, 1920, 2880), (675, 975));
        assert_eq!(scale_span(300, 200, 1080, 1620), (450, 300));
    }

    #[test]
    fn test_scale_span_clamped_at_monitor_edge() {
        // 1.25x: 630 + 650 ends at the right edge; rounding overshoots by one
        assert_eq!(scale_span(630, 650, 1280, 1600), (788, 812));
        // Bottom edge lands exactly
        assert_eq!(scale_span(520, 200, 720, 900), (650, 250));
        // Half-pixel scale rounds both ends up
        assert_eq!(scale_span(1, 1, 2, 3), (2, 1));
    }

    #[test]
    fn test_scale_span_degenerate() {
        assert_eq!(scale_span(10, 10, 100, 0), (0, 0));
        assert_eq!(scale_span(10, 10, 0, 100), (10, 10));
        // Start past the end is pulled back to a one-pixel span
        assert_eq!(scale_span(120, 5, 100, 100), (99, 1));
    }

    #[test]
    fn test_crop_rgba_to_rgb() {
        // 3x2 image, pixel value = index
        let rgba: Vec<u8> = (0..6u8).flat_map(|i| [i, i, i, 255]).collect();
        let rgb = crop_rgba_to_rgb(&rgba, 3, 1, 0, 2, 2).unwrap();
        assert_eq!(rgb, vec![1, 1, 1, 2, 2, 2, 4, 4, 4, 5, 5, 5]);
    }

    #[test]
    fn test_crop_rgba_out_of_bounds() {
        let rgba = vec![0u8; 3 * 2 * 4];
        assert!(crop_rgba_to_rgb(&rgba, 3, 2, 0, 2, 1).is_none());
        assert!(crop_rgba_to_rgb(&rgba, 3, 0, 1, 3, 2).is_none());
    }
}
