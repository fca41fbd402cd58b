//! Subcommand handlers for run, calibrate and config actions.

use std::path::{Path, PathBuf};

use super::args::ConfigAction;
use crate::action::{ActionEmitter, Cooldown, DryRunEmitter, KeyboardEmitter};
use crate::capture::{FrameSource, ReplaySource, ScreenCapture};
use crate::config::{default_path, Config, ConfigError, Overrides, Settings};
use crate::control::{BotError, ControlLoop, Pipeline, RunSummary};
use crate::hotkeys::{install_ctrlc_handler, QuitListener, StopSignal};
use crate::render::{annotate, NullPreview, Preview, TerminalPreview, TickView};

/// Open the frame source: replay files when given, else the live screen.
fn open_source(settings: &Settings, replay: &[PathBuf]) -> Result<Box<dyn FrameSource>, BotError> {
    if replay.is_empty() {
        Ok(Box::new(ScreenCapture::open(settings.region)?))
    } else {
        log::info!("Replaying {} frame(s)", replay.len());
        Ok(Box::new(ReplaySource::open(settings.region, replay, false)?))
    }
}

fn build_emitter(settings: &Settings) -> Box<dyn ActionEmitter> {
    if settings.dry_run {
        log::info!("Dry run: jumps are logged, no keys are pressed");
        return Box::new(Cooldown::new(DryRunEmitter::new(), settings.cooldown));
    }
    Box::new(Cooldown::new(
        KeyboardEmitter::new(settings.key, settings.key_hold),
        settings.cooldown,
    ))
}

fn build_preview(settings: &Settings) -> Result<Box<dyn Preview>, BotError> {
    if settings.preview {
        Ok(Box::new(TerminalPreview::open(settings.preview_width)?))
    } else {
        Ok(Box::new(NullPreview))
    }
}

/// Run the control loop until a quit key, Ctrl+C, the tick limit or the end
/// of replayed input.
pub fn run(
    settings: &Settings,
    replay: &[PathBuf],
    max_ticks: Option<u64>,
) -> Result<RunSummary, BotError> {
    let stop = StopSignal::new();
    install_ctrlc_handler(&stop)?;

    let mut listener = QuitListener::new();
    if settings.hotkeys {
        listener.start(stop.clone())?;
        log::info!("Press q or Esc to quit");
    }

    let pipeline = Pipeline::from_settings(settings)?;
    let source = open_source(settings, replay)?;
    let emitter = build_emitter(settings);
    let preview = build_preview(settings)?;

    let mut control = ControlLoop::new(source, pipeline, emitter, preview).with_max_ticks(max_ticks);
    let summary = control.run(&stop);
    listener.stop();
    summary
}

/// Capture one frame, run the pipeline on it and save the annotated overlay.
pub fn calibrate(settings: &Settings, replay: &[PathBuf], output: &Path) -> Result<(), BotError> {
    let pipeline = Pipeline::from_settings(settings)?;
    let mut source = open_source(settings, replay)?;
    let frame = source.capture()?;
    let analysis = pipeline.analyze(&frame);

    let view = TickView {
        frame: &frame,
        mask: &analysis.mask,
        crop: pipeline.preprocessor().crop(),
        decision: &analysis.decision,
        jump_distance: pipeline.policy().jump_distance(),
        fps: None,
        jumped: false,
        tick: 1,
    };
    annotate(&view)
        .save(output)
        .map_err(|source| BotError::SaveImage {
            path: output.to_path_buf(),
            source,
        })?;

    println!("Capture region: {}", settings.region);
    println!("Crop window: {}", settings.crop);
    println!("Obstacles: {}", analysis.decision.obstacles.len());
    for obstacle in &analysis.decision.obstacles {
        println!(
            "  x={} y={} {}x{} area={}",
            obstacle.x, obstacle.y, obstacle.width, obstacle.height, obstacle.area
        );
    }
    match analysis.decision.nearest_x() {
        Some(x) => println!(
            "Nearest obstacle at x={} (jump below {}): {}",
            x,
            settings.jump_distance,
            if analysis.decision.should_jump { "JUMP" } else { "wait" }
        ),
        None => println!("No obstacles in the look-ahead band"),
    }
    println!("Saved overlay: {}", output.display());
    Ok(())
}

/// Handle config subcommand actions.
///
/// `show` prints the settings after layering the file and `overrides`.
pub fn handle_config_action(
    action: ConfigAction,
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> Result<(), ConfigError> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_path);
    match action {
        ConfigAction::Show => {
            let settings = Settings::resolve(Config::load(config_path)?, overrides)?;
            println!("Current configuration:");
            println!("{}", settings);
            println!();
            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
        }
        ConfigAction::Init => {
            Config::init(&path)?;
            println!("Created config file: {}", path.display());
        }
    }
    Ok(())
}
