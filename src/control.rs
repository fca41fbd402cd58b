//! The perceive → decide → act loop.
//!
//! One tick captures a frame, turns it into an obstacle mask, finds
//! obstacles, decides, maybe jumps, and updates the preview. Ticks run back
//! to back on the calling thread; the only cross-thread input is the
//! [`StopSignal`], polled once per tick.

use std::path::PathBuf;
use thiserror::Error;

use crate::action::ActionEmitter;
use crate::capture::{CaptureError, Frame, FrameSource};
use crate::config::{ConfigError, Settings};
use crate::hotkeys::{HotkeyError, StopSignal};
use crate::policy::{Decision, JumpPolicy};
use crate::rate::RateMonitor;
use crate::render::{Preview, PreviewError, TickView};
use crate::vision::{Mask, ObstacleDetector, Preprocessor};

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Hotkey(#[from] HotkeyError),
    #[error(transparent)]
    Preview(#[from] PreviewError),
    #[error("Failed to save image '{}': {source}", .path.display())]
    SaveImage {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Frame analysis: preprocessing, detection and decision.
///
/// Stateless between frames.
#[derive(Debug, Clone)]
pub struct Pipeline {
    preprocessor: Preprocessor,
    detector: ObstacleDetector,
    policy: JumpPolicy,
}

/// Result of analysing one frame.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub mask: Mask,
    pub decision: Decision,
}

impl Pipeline {
    pub fn new(preprocessor: Preprocessor, detector: ObstacleDetector, policy: JumpPolicy) -> Self {
        Self {
            preprocessor,
            detector,
            policy,
        }
    }

    /// Build the pipeline described by validated settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Preprocessor::new(settings.crop, settings.preprocess)?,
            ObstacleDetector::new(settings.min_area),
            JumpPolicy::new(settings.jump_distance),
        ))
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn policy(&self) -> &JumpPolicy {
        &self.policy
    }

    pub fn analyze(&self, frame: &Frame) -> Analysis {
        let mask = self.preprocessor.preprocess(frame);
        let obstacles = self.detector.detect(&mask);
        let decision = self.policy.decide(obstacles);
        Analysis { mask, decision }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1-based tick number
    pub tick: u64,
    pub obstacles: usize,
    pub nearest_x: Option<u32>,
    pub should_jump: bool,
    /// A jump was requested and the emitter accepted it
    pub jumped: bool,
    pub fps: Option<f64>,
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Ticks whose jump signal the emitter accepted (a cooldown may have
    /// absorbed some of them)
    pub jumps: u64,
    pub action_failures: u64,
    pub average_fps: Option<f64>,
}

/// Drives a [`FrameSource`] through the [`Pipeline`] into an
/// [`ActionEmitter`], showing each tick on a [`Preview`].
pub struct ControlLoop<S, E, P> {
    source: S,
    pipeline: Pipeline,
    emitter: E,
    /// `None` once the preview has failed
    preview: Option<P>,
    rate: RateMonitor,
    state: LoopState,
    max_ticks: Option<u64>,
    ticks: u64,
    jumps: u64,
    action_failures: u64,
}

impl<S: FrameSource, E: ActionEmitter, P: Preview> ControlLoop<S, E, P> {
    pub fn new(source: S, pipeline: Pipeline, emitter: E, preview: P) -> Self {
        Self {
            source,
            pipeline,
            emitter,
            preview: Some(preview),
            rate: RateMonitor::default(),
            state: LoopState::Running,
            max_ticks: None,
            ticks: 0,
            jumps: 0,
            action_failures: 0,
        }
    }

    /// Stop after `max_ticks` ticks.
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview.is_some()
    }

    /// Run one capture-through-decision cycle.
    ///
    /// # Errors
    /// Only capture failures are returned. Action and preview failures are
    /// logged and absorbed.
    pub fn tick(&mut self) -> Result<TickReport, BotError> {
        let frame = self.source.capture()?;
        let Analysis { mask, decision } = self.pipeline.analyze(&frame);

        let mut jumped = false;
        if decision.should_jump {
            match self.emitter.jump() {
                Ok(()) => {
                    jumped = true;
                    self.jumps += 1;
                }
                Err(e) => {
                    self.action_failures += 1;
                    log::warn!("Jump failed: {}", e);
                }
            }
        }

        self.ticks += 1;
        let fps = self.rate.tick();

        log::trace!(
            "tick {}: {} obstacles, nearest x {:?}, jump {}",
            self.ticks,
            decision.obstacles.len(),
            decision.nearest_x(),
            decision.should_jump
        );

        if let Some(preview) = self.preview.as_mut() {
            let view = TickView {
                frame: &frame,
                mask: &mask,
                crop: self.pipeline.preprocessor.crop(),
                decision: &decision,
                jump_distance: self.pipeline.policy.jump_distance(),
                fps,
                jumped,
                tick: self.ticks,
            };
            if let Err(e) = preview.show(&view) {
                // Leave the alternate screen first so the warning stays visible
                self.preview = None;
                log::warn!("{}; disabling preview", e);
            }
        }

        Ok(TickReport {
            tick: self.ticks,
            obstacles: decision.obstacles.len(),
            nearest_x: decision.nearest_x(),
            should_jump: decision.should_jump,
            jumped,
            fps,
        })
    }

    /// Tick until stopped, the tick limit is reached, or recorded input runs out.
    ///
    /// The preview is released when the run ends, whatever the outcome.
    pub fn run(&mut self, stop: &StopSignal) -> Result<RunSummary, BotError> {
        self.state = LoopState::Running;
        log::info!("Control loop started ({})", self.source.region());

        let result = self.run_until_stopped(stop);

        self.state = LoopState::Stopped;
        self.preview = None;

        let summary = self.summary();
        match &result {
            Ok(()) => log::info!(
                "Control loop stopped after {} ticks, {} jumps",
                summary.ticks,
                summary.jumps
            ),
            Err(e) => log::error!("Control loop aborted: {}", e),
        }
        result.map(|()| summary)
    }

    fn run_until_stopped(&mut self, stop: &StopSignal) -> Result<(), BotError> {
        loop {
            if stop.is_requested() {
                log::info!("Stop requested");
                return Ok(());
            }
            if self.max_ticks.is_some_and(|max| self.ticks >= max) {
                log::info!("Tick limit reached");
                return Ok(());
            }
            match self.tick() {
                Ok(_) => {}
                Err(BotError::Capture(e)) if e.is_exhausted() => {
                    log::info!("Replay finished");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.ticks,
            jumps: self.jumps,
            action_failures: self.action_failures,
            average_fps: self.rate.average_fps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionError;
    use crate::action::JumpKey;
    use crate::capture::{CaptureRegion, ReplaySource};
    use crate::render::NullPreview;
    use crate::vision::{CropWindow, PreprocessSettings};
    use image::{Rgb, RgbImage};

    const BACKGROUND: Rgb<u8> = Rgb([247, 247, 247]);
    const CACTUS: Rgb<u8> = Rgb([83, 83, 83]);

    fn region() -> CaptureRegion {
        CaptureRegion::new(0, 0, 200, 60).unwrap()
    }

    fn pipeline() -> Pipeline {
        let crop = CropWindow::new(10, 50, 0, None, &region()).unwrap();
        Pipeline::new(
            Preprocessor::new(crop, PreprocessSettings::default()).unwrap(),
            ObstacleDetector::new(100),
            JumpPolicy::new(65),
        )
    }

    /// Frame with a cactus whose left edge is at `x`, or none.
    fn frame(cactus_x: Option<u32>) -> Frame {
        Frame::new(RgbImage::from_fn(200, 60, |x, y| match cactus_x {
            Some(cx) if (cx..cx + 15).contains(&x) && (20..45).contains(&y) => CACTUS,
            _ => BACKGROUND,
        }))
    }

    #[derive(Default)]
    struct Recorder {
        jumps: u64,
        fail: bool,
    }

    impl ActionEmitter for Recorder {
        fn jump(&mut self) -> Result<(), ActionError> {
            self.jumps += 1;
            if self.fail {
                return Err(ActionError::Simulate {
                    key: JumpKey::Space,
                    message: "denied".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_analyze_near_cactus() {
        let analysis = pipeline().analyze(&frame(Some(40)));
        assert!(analysis.decision.should_jump);
        assert_eq!(analysis.decision.obstacles.len(), 1);
        assert_eq!(analysis.mask.dimensions(), (200, 40));
    }

    #[test]
    fn test_tick_reports_jump() {
        let source = ReplaySource::from_frames(region(), vec![frame(Some(40))], false).unwrap();
        let mut control = ControlLoop::new(source, pipeline(), Recorder::default(), NullPreview);
        let report = control.tick().unwrap();
        assert_eq!(report.tick, 1);
        assert!(report.should_jump);
        assert!(report.jumped);
        assert_eq!(control.emitter().jumps, 1);
    }

    #[test]
    fn test_run_stops_at_end_of_replay() {
        let frames = vec![frame(None), frame(Some(150)), frame(Some(40))];
        let source = ReplaySource::from_frames(region(), frames, false).unwrap();
        let mut control = ControlLoop::new(source, pipeline(), Recorder::default(), NullPreview);
        let summary = control.run(&StopSignal::new()).unwrap();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.jumps, 1);
        assert_eq!(control.state(), LoopState::Stopped);
    }

    #[test]
    fn test_run_respects_stop_signal() {
        let source = ReplaySource::from_frames(region(), vec![frame(None)], true).unwrap();
        let mut control = ControlLoop::new(source, pipeline(), Recorder::default(), NullPreview);
        let stop = StopSignal::new();
        stop.request();
        let summary = control.run(&stop).unwrap();
        assert_eq!(summary.ticks, 0);
    }

    #[test]
    fn test_run_respects_max_ticks() {
        let source = ReplaySource::from_frames(region(), vec![frame(None)], true).unwrap();
        let mut control = ControlLoop::new(source, pipeline(), Recorder::default(), NullPreview)
            .with_max_ticks(Some(5));
        let summary = control.run(&StopSignal::new()).unwrap();
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.jumps, 0);
    }

    #[test]
    fn test_action_failures_do_not_stop_loop() {
        let source = ReplaySource::from_frames(region(), vec![frame(Some(40))], true).unwrap();
        let emitter = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut control =
            ControlLoop::new(source, pipeline(), emitter, NullPreview).with_max_ticks(Some(4));
        let summary = control.run(&StopSignal::new()).unwrap();
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.jumps, 0);
        assert_eq!(summary.action_failures, 4);
    }

    struct BrokenSource;

    impl FrameSource for BrokenSource {
        fn region(&self) -> CaptureRegion {
            region()
        }

        fn capture(&mut self) -> Result<Frame, CaptureError> {
            Err(CaptureError::Backend("display lost".to_string()))
        }
    }

    #[test]
    fn test_capture_failure_aborts_run() {
        let mut control = ControlLoop::new(BrokenSource, pipeline(), Recorder::default(), NullPreview);
        let err = control.run(&StopSignal::new()).unwrap_err();
        assert!(matches!(err, BotError::Capture(CaptureError::Backend(_))));
        assert_eq!(control.state(), LoopState::Stopped);
        assert_eq!(control.summary().ticks, 0);
    }

    struct BrokenPreview;

    impl Preview for BrokenPreview {
        fn show(&mut self, _view: &TickView<'_>) -> Result<(), PreviewError> {
            Err(std::io::Error::other("terminal gone").into())
        }
    }

    #[test]
    fn test_preview_failure_disables_preview() {
        let source = ReplaySource::from_frames(region(), vec![frame(None)], true).unwrap();
        let mut control = ControlLoop::new(source, pipeline(), Recorder::default(), BrokenPreview);
        assert!(control.preview_enabled());
        control.tick().unwrap();
        assert!(!control.preview_enabled());
        control.tick().unwrap();
    }
}
