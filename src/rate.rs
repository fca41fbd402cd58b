//! Loop frequency measurement.
//!
//! The control loop runs as fast as capture allows; this only observes the
//! rate for diagnostics and never throttles.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of tick intervals averaged for the FPS readout.
pub const DEFAULT_WINDOW: usize = 30;

/// Measures ticks per second over a sliding window of recent intervals.
#[derive(Debug, Clone)]
pub struct RateMonitor {
    intervals: VecDeque<Duration>,
    window: usize,
    last: Option<Instant>,
    first: Option<Instant>,
    ticks: u64,
}

impl Default for RateMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl RateMonitor {
    /// Create a monitor averaging over `window` intervals (at least 1).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            intervals: VecDeque::with_capacity(window),
            window,
            last: None,
            first: None,
            ticks: 0,
        }
    }

    /// Record a tick now and return the current FPS estimate.
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    /// Record a tick at `now` and return the current FPS estimate.
    ///
    /// The first tick has no interval yet and returns `None`.
    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        self.ticks += 1;
        if self.first.is_none() {
            self.first = Some(now);
        }
        if let Some(last) = self.last {
            if self.intervals.len() == self.window {
                self.intervals.pop_front();
            }
            self.intervals.push_back(now.saturating_duration_since(last));
        }
        self.last = Some(now);
        self.fps()
    }

    /// Windowed FPS estimate.
    pub fn fps(&self) -> Option<f64> {
        if self.intervals.is_empty() {
            return None;
        }
        let total: Duration = self.intervals.iter().sum();
        if total.is_zero() {
            return None;
        }
        Some(self.intervals.len() as f64 / total.as_secs_f64())
    }

    /// Average FPS over every tick recorded so far.
    pub fn average_fps(&self) -> Option<f64> {
        let (first, last) = (self.first?, self.last?);
        let elapsed = last.saturating_duration_since(first);
        if self.ticks < 2 || elapsed.is_zero() {
            return None;
        }
        Some((self.ticks - 1) as f64 / elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_has_no_rate() {
        let mut monitor = RateMonitor::default();
        assert_eq!(monitor.tick_at(Instant::now()), None);
        assert_eq!(monitor.average_fps(), None);
        assert_eq!(monitor.fps(), None);
    }

    #[test]
    fn test_steady_rate() {
        let mut monitor = RateMonitor::new(10);
        let start = Instant::now();
        let mut fps = None;
        for i in 0..20 {
            fps = monitor.tick_at(start + Duration::from_millis(20 * i));
        }
        let fps = fps.unwrap();
        assert!((fps - 50.0).abs() < 0.01, "expected 50 fps, got {}", fps);
        assert!((monitor.average_fps().unwrap() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_window_forgets_old_intervals() {
        let mut monitor = RateMonitor::new(2);
        let start = Instant::now();
        monitor.tick_at(start);
        monitor.tick_at(start + Duration::from_millis(1000));
        monitor.tick_at(start + Duration::from_millis(1010));
        monitor.tick_at(start + Duration::from_millis(1020));
        // Only the two 10 ms intervals remain
        assert!((monitor.fps().unwrap() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let mut monitor = RateMonitor::new(0);
        let start = Instant::now();
        monitor.tick_at(start);
        assert!(monitor.tick_at(start + Duration::from_millis(100)).is_some());
    }
}
