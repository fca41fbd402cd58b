//! CLI argument parsing with clap.

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::action::JumpKey;
use crate::config::Overrides;

/// Plays the offline dinosaur runner game by watching a region of the screen
#[derive(Parser, Debug)]
#[command(name = "dino-bot")]
#[command(version, about = "Screen-watching bot for the offline dinosaur runner game", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Play with the default calibration
    dino-bot

    # Check the capture region and look-ahead band first
    dino-bot calibrate --output calibration.png

    # Tune against saved screenshots without pressing keys
    dino-bot run --dry-run --no-preview --replay shot1.png --replay shot2.png")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub tuning: TuningArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Values that override the config file.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Capture region left edge (screen px)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub x: Option<i32>,

    /// Capture region top edge (screen px)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub y: Option<i32>,

    /// Capture region width
    #[arg(long, global = true)]
    pub width: Option<u32>,

    /// Capture region height
    #[arg(long, global = true)]
    pub height: Option<u32>,

    /// First row of the look-ahead band (region px)
    #[arg(long, global = true)]
    pub row_start: Option<u32>,

    /// End row (exclusive) of the look-ahead band
    #[arg(long, global = true)]
    pub row_end: Option<u32>,

    /// First column of the look-ahead band
    #[arg(long, global = true)]
    pub col_start: Option<u32>,

    /// End column (exclusive) of the look-ahead band [default: region width]
    #[arg(long, global = true)]
    pub col_end: Option<u32>,

    /// Jump when the nearest obstacle is closer than this (band px)
    #[arg(long, global = true)]
    pub jump_distance: Option<u32>,

    /// Ignore obstacles smaller than this filled area (px)
    #[arg(long, global = true)]
    pub min_area: Option<u32>,

    /// Luminance cutoff; darker pixels are obstacle candidates
    #[arg(long, global = true)]
    pub threshold: Option<u8>,
}

/// Options for the run loop.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RunArgs {
    /// Key to press for a jump
    #[arg(long, global = true)]
    pub key: Option<JumpKey>,

    /// Minimum gap between jumps in milliseconds (0 = no cooldown)
    #[arg(long, global = true)]
    pub cooldown_ms: Option<u64>,

    /// Time between key press and release in milliseconds
    #[arg(long, global = true)]
    pub key_hold_ms: Option<u64>,

    /// Log jumps instead of pressing keys
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Disable the terminal preview
    #[arg(long, global = true)]
    pub no_preview: bool,

    /// Disable the global q / Esc quit keys
    #[arg(long, global = true)]
    pub no_hotkeys: bool,

    /// Stop after this many ticks
    #[arg(long, global = true)]
    pub max_ticks: Option<u64>,

    /// Replay image files instead of capturing the screen
    /// (repeat the flag for several files)
    #[arg(long, global = true, action = ArgAction::Append)]
    pub replay: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot (default)
    Run,
    /// Capture one frame and save an annotated overlay image
    Calibrate {
        /// Output PNG path
        #[arg(long, short, default_value = "dino-bot-calibration.png")]
        output: PathBuf,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// Command-line overrides for the config file.
    pub fn overrides(&self) -> Overrides {
        let t = &self.tuning;
        Overrides {
            x: t.x,
            y: t.y,
            width: t.width,
            height: t.height,
            row_start: t.row_start,
            row_end: t.row_end,
            col_start: t.col_start,
            col_end: t.col_end,
            jump_distance: t.jump_distance,
            min_area: t.min_area,
            threshold: t.threshold,
            key: self.run.key,
            cooldown_ms: self.run.cooldown_ms,
            key_hold_ms: self.run.key_hold_ms,
            dry_run: self.run.dry_run,
            no_preview: self.run.no_preview,
            no_hotkeys: self.run.no_hotkeys,
        }
    }
}
