//! End-to-end tests for the control loop.
//!
//! Frames are replayed from PNG files, so the whole path from image files to
//! jump signals runs without a display or keyboard.

use dino_bot::action::{ActionEmitter, ActionError, Cooldown, DryRunEmitter, JumpKey};
use dino_bot::capture::{CaptureRegion, ReplaySource};
use dino_bot::config::{Config, Overrides, Settings};
use dino_bot::control::{ControlLoop, LoopState, Pipeline};
use dino_bot::hotkeys::StopSignal;
use dino_bot::render::{NullPreview, Preview, PreviewError, TickView};
use image::{Rgb, RgbImage};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

const WIDTH: u32 = 650;
const HEIGHT: u32 = 200;

/// Settings with the default calibration, small enough to replay quickly.
fn settings() -> Settings {
    Settings::resolve(Config::default(), &Overrides::default()).unwrap()
}

/// Game-like screenshot with cacti at the given region x positions.
///
/// Cacti stand on the ground inside the default look-ahead band
/// (rows 100..140).
fn screenshot(cacti: &[u32]) -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let cactus = cacti
            .iter()
            .any(|&cx| x >= cx && x < cx + 14 && (108..135).contains(&y));
        let ground = y == 150;
        if cactus || ground {
            Rgb([83, 83, 83])
        } else {
            Rgb([247, 247, 247])
        }
    })
}

fn write_frames(dir: &TempDir, frames: &[RgbImage]) -> Vec<PathBuf> {
    frames
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let path = dir.path().join(format!("frame_{:03}.png", i));
            image.save(&path).unwrap();
            path
        })
        .collect()
}

#[derive(Default)]
struct RecordingEmitter {
    jumps: u64,
}

impl ActionEmitter for RecordingEmitter {
    fn jump(&mut self) -> Result<(), ActionError> {
        self.jumps += 1;
        Ok(())
    }
}

struct FailingEmitter;

impl ActionEmitter for FailingEmitter {
    fn jump(&mut self) -> Result<(), ActionError> {
        Err(ActionError::Simulate {
            key: JumpKey::Space,
            message: "not permitted".to_string(),
        })
    }
}

/// Records `(tick, jumped)` for every view shown.
///
/// The log is shared because the loop drops its preview when a run ends.
#[derive(Default, Clone)]
struct RecordingPreview {
    shown: Rc<RefCell<Vec<(u64, bool)>>>,
}

impl Preview for RecordingPreview {
    fn show(&mut self, view: &TickView<'_>) -> Result<(), PreviewError> {
        self.shown.borrow_mut().push((view.tick, view.jumped));
        Ok(())
    }
}

#[test]
fn test_jumps_only_on_near_frames() {
    let dir = TempDir::new().unwrap();
    // Band starts at region column 110; jump below 65 means region x < 175
    let frames = [
        screenshot(&[]),
        screenshot(&[500]),
        screenshot(&[300]),
        screenshot(&[150]),
        screenshot(&[600]),
    ];
    let paths = write_frames(&dir, &frames);
    let settings = settings();

    let source = ReplaySource::open(settings.region, &paths, false).unwrap();
    let pipeline = Pipeline::from_settings(&settings).unwrap();
    let mut control = ControlLoop::new(source, pipeline, RecordingEmitter::default(), NullPreview);

    let mut reports = Vec::new();
    while let Ok(report) = control.tick() {
        reports.push(report);
    }

    assert_eq!(reports.len(), 5);
    let jumps: Vec<bool> = reports.iter().map(|r| r.should_jump).collect();
    assert_eq!(jumps, vec![false, false, false, true, false]);
    assert_eq!(reports[0].obstacles, 0);
    assert!(reports[1].nearest_x.is_some());
    assert_eq!(control.emitter().jumps, 1);
}

#[test]
fn test_run_ends_when_replay_is_exhausted() {
    let dir = TempDir::new().unwrap();
    let paths = write_frames(&dir, &[screenshot(&[]), screenshot(&[140]), screenshot(&[])]);
    let settings = settings();

    let source = ReplaySource::open(settings.region, &paths, false).unwrap();
    let pipeline = Pipeline::from_settings(&settings).unwrap();
    let preview = RecordingPreview::default();
    let mut control =
        ControlLoop::new(source, pipeline, RecordingEmitter::default(), preview.clone());

    let summary = control.run(&StopSignal::new()).unwrap();
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.jumps, 1);
    assert_eq!(summary.action_failures, 0);
    assert_eq!(control.state(), LoopState::Stopped);

    // Every tick reaches the preview, and only the jumping one is marked
    assert_eq!(
        *preview.shown.borrow(),
        vec![(1, false), (2, true), (3, false)]
    );
    assert!(!control.preview_enabled());
}

#[test]
fn test_cooldown_absorbs_repeated_signals() {
    let settings = settings();
    let frames = vec![dino_bot::capture::Frame::new(screenshot(&[140]))];
    let source = ReplaySource::from_frames(settings.region, frames, true).unwrap();
    let pipeline = Pipeline::from_settings(&settings).unwrap();
    let emitter = Cooldown::new(DryRunEmitter::new(), Duration::from_secs(3600));
    let mut control =
        ControlLoop::new(source, pipeline, emitter, NullPreview).with_max_ticks(Some(6));

    let summary = control.run(&StopSignal::new()).unwrap();
    assert_eq!(summary.ticks, 6);
    assert_eq!(control.emitter().inner().jumps(), 1);
    assert_eq!(control.emitter().suppressed(), 5);
}

#[test]
fn test_zero_cooldown_forwards_every_signal() {
    let settings = settings();
    let frames = vec![dino_bot::capture::Frame::new(screenshot(&[140]))];
    let source = ReplaySource::from_frames(settings.region, frames, true).unwrap();
    let pipeline = Pipeline::from_settings(&settings).unwrap();
    let emitter = Cooldown::new(DryRunEmitter::new(), Duration::ZERO);
    let mut control =
        ControlLoop::new(source, pipeline, emitter, NullPreview).with_max_ticks(Some(4));

    control.run(&StopSignal::new()).unwrap();
    assert_eq!(control.emitter().inner().jumps(), 4);
    assert_eq!(control.emitter().suppressed(), 0);
}

#[test]
fn test_action_failures_are_counted_not_fatal() {
    let settings = settings();
    let frames = vec![
        dino_bot::capture::Frame::new(screenshot(&[140])),
        dino_bot::capture::Frame::new(screenshot(&[])),
    ];
    let source = ReplaySource::from_frames(settings.region, frames, true).unwrap();
    let pipeline = Pipeline::from_settings(&settings).unwrap();
    let mut control =
        ControlLoop::new(source, pipeline, FailingEmitter, NullPreview).with_max_ticks(Some(10));

    let summary = control.run(&StopSignal::new()).unwrap();
    assert_eq!(summary.ticks, 10);
    assert_eq!(summary.jumps, 0);
    assert_eq!(summary.action_failures, 5);
}

#[test]
fn test_missing_replay_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let region = CaptureRegion::new(0, 0, WIDTH, HEIGHT).unwrap();
    let missing = [dir.path().join("missing.png")];
    assert!(ReplaySource::open(region, &missing, false).is_err());
}

#[test]
fn test_replay_frames_are_resized_to_region() {
    let dir = TempDir::new().unwrap();
    let small = image::imageops::resize(
        &screenshot(&[140]),
        WIDTH / 2,
        HEIGHT / 2,
        image::imageops::FilterType::Nearest,
    );
    let paths = write_frames(&dir, &[small]);
    let settings = settings();

    let source = ReplaySource::open(settings.region, &paths, false).unwrap();
    let pipeline = Pipeline::from_settings(&settings).unwrap();
    let mut control = ControlLoop::new(source, pipeline, RecordingEmitter::default(), NullPreview);
    let report = control.tick().unwrap();
    assert!(report.should_jump);
}
