//! Configuration file handling for dino-bot.
//!
//! Values are layered: built-in defaults, then `~/.config/dino-bot/config.toml`
//! (or a custom path via `--config`), then command-line overrides.
//! [`Settings::resolve`] validates the merged result once, before any frame is
//! processed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::action::JumpKey;
use crate::capture::CaptureRegion;
use crate::vision::{CropWindow, PreprocessSettings};

/// Configuration file structure for dino-bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub crop: CropConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub action: ActionConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub hotkeys: HotkeysConfig,
}

/// Screen rectangle holding the game's play area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            x: 450,
            y: 300,
            width: 650,
            height: 200,
        }
    }
}

/// Look-ahead band inside the capture region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub row_start: u32,
    pub row_end: u32,
    pub col_start: u32,
    /// Omitted means "to the right edge of the capture region"
    pub col_end: Option<u32>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            row_start: 100,
            row_end: 140,
            col_start: 110,
            col_end: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub threshold: u8,
    pub canny_low: u16,
    pub canny_high: u16,
    pub dilate_kernel: u32,
    pub dilate_iterations: u32,
    pub min_area: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let pre = PreprocessSettings::default();
        Self {
            threshold: pre.threshold,
            canny_low: pre.canny_low,
            canny_high: pre.canny_high,
            dilate_kernel: pre.dilate_kernel,
            dilate_iterations: pre.dilate_iterations,
            min_area: 100,
        }
    }
}

impl DetectionConfig {
    pub fn preprocess(&self) -> PreprocessSettings {
        PreprocessSettings {
            threshold: self.threshold,
            canny_low: self.canny_low,
            canny_high: self.canny_high,
            dilate_kernel: self.dilate_kernel,
            dilate_iterations: self.dilate_iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Jump when the nearest obstacle's left edge is closer than this (crop-local px)
    pub jump_distance: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self { jump_distance: 65 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    pub key: JumpKey,
    /// Minimum gap between emitted jumps; 0 disables the cooldown
    pub cooldown_ms: u64,
    /// Delay between key press and release; simulated events need a short
    /// gap or the OS may merge or drop them
    pub key_hold_ms: u64,
    pub dry_run: bool,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            key: JumpKey::Space,
            cooldown_ms: 100,
            key_hold_ms: 20,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub enabled: bool,
    /// Preview width in terminal columns
    pub width: u16,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeysConfig {
    pub enabled: bool,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Command-line values that take precedence over the config file.
///
/// `None` / `false` leaves the file value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub row_start: Option<u32>,
    pub row_end: Option<u32>,
    pub col_start: Option<u32>,
    pub col_end: Option<u32>,
    pub jump_distance: Option<u32>,
    pub min_area: Option<u32>,
    pub threshold: Option<u8>,
    pub key: Option<JumpKey>,
    pub cooldown_ms: Option<u64>,
    pub key_hold_ms: Option<u64>,
    pub dry_run: bool,
    pub no_preview: bool,
    pub no_hotkeys: bool,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// With `None`, the default path is used and a missing file yields the
    /// defaults. An explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some();
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            if explicit {
                return Err(ConfigError::NotFound(path));
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        let config = Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the default configuration to `path`, creating parent directories.
    ///
    /// Refuses to overwrite an existing file.
    pub fn init(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let content = Config::default().to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply command-line overrides on top of the file values.
    pub fn apply(&mut self, o: &Overrides) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        set(&mut self.capture.x, o.x);
        set(&mut self.capture.y, o.y);
        set(&mut self.capture.width, o.width);
        set(&mut self.capture.height, o.height);
        set(&mut self.crop.row_start, o.row_start);
        set(&mut self.crop.row_end, o.row_end);
        set(&mut self.crop.col_start, o.col_start);
        if o.col_end.is_some() {
            self.crop.col_end = o.col_end;
        }
        set(&mut self.policy.jump_distance, o.jump_distance);
        set(&mut self.detection.min_area, o.min_area);
        set(&mut self.detection.threshold, o.threshold);
        set(&mut self.action.key, o.key);
        set(&mut self.action.cooldown_ms, o.cooldown_ms);
        set(&mut self.action.key_hold_ms, o.key_hold_ms);
        self.action.dry_run |= o.dry_run;
        self.preview.enabled &= !o.no_preview;
        self.hotkeys.enabled &= !o.no_hotkeys;
    }
}

/// Validated, immutable runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub region: CaptureRegion,
    pub crop: CropWindow,
    pub preprocess: PreprocessSettings,
    pub min_area: u32,
    pub jump_distance: u32,
    pub key: JumpKey,
    pub cooldown: Duration,
    pub key_hold: Duration,
    pub dry_run: bool,
    pub preview: bool,
    pub preview_width: u16,
    pub hotkeys: bool,
}

impl Settings {
    /// Merge `overrides` into `config` and validate the result.
    ///
    /// # Errors
    /// Any geometry or detection value the pipeline cannot run with.
    pub fn resolve(mut config: Config, overrides: &Overrides) -> Result<Self, ConfigError> {
        config.apply(overrides);
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let c = &config.capture;
        let region = CaptureRegion::new(c.x, c.y, c.width, c.height)?;

        let k = &config.crop;
        let crop = CropWindow::new(k.row_start, k.row_end, k.col_start, k.col_end, &region)?;

        let preprocess = config.detection.preprocess();
        preprocess.validate()?;

        if config.preview.width < 2 {
            return Err(ConfigError::PreviewWidth(config.preview.width));
        }

        Ok(Self {
            region,
            crop,
            preprocess,
            min_area: config.detection.min_area,
            jump_distance: config.policy.jump_distance,
            key: config.action.key,
            cooldown: Duration::from_millis(config.action.cooldown_ms),
            key_hold: Duration::from_millis(config.action.key_hold_ms),
            dry_run: config.action.dry_run,
            preview: config.preview.enabled,
            preview_width: config.preview.width,
            hotkeys: config.hotkeys.enabled,
        })
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        writeln!(f, "  Capture region: {}", self.region)?;
        writeln!(f, "  Crop window: {}", self.crop)?;
        writeln!(
            f,
            "  Threshold: {}  Canny: {}/{}  Dilate: {}x{} x{}",
            self.preprocess.threshold,
            self.preprocess.canny_low,
            self.preprocess.canny_high,
            self.preprocess.dilate_kernel,
            self.preprocess.dilate_kernel,
            self.preprocess.dilate_iterations
        )?;
        writeln!(f, "  Min area: {} px", self.min_area)?;
        writeln!(f, "  Jump distance: {} px", self.jump_distance)?;
        writeln!(
            f,
            "  Key: {}  Cooldown: {} ms  Hold: {} ms",
            self.key,
            self.cooldown.as_millis(),
            self.key_hold.as_millis()
        )?;
        writeln!(f, "  Dry run: {}", yes_no(self.dry_run))?;
        writeln!(
            f,
            "  Preview: {} ({} cols)",
            yes_no(self.preview),
            self.preview_width
        )?;
        write!(f, "  Quit hotkeys: {}", yes_no(self.hotkeys))
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config file '{}' not found", .0.display())]
    NotFound(PathBuf),
    #[error("Config file '{}' already exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Capture region must be non-empty, got {width}x{height}")]
    EmptyRegion { width: u32, height: u32 },
    #[error("Crop rows must satisfy start < end, got {start}..{end}")]
    CropRows { start: u32, end: u32 },
    #[error("Crop columns must satisfy start < end, got {start}..{end}")]
    CropColumns { start: u32, end: u32 },
    #[error(
        "Crop window rows {rows:?} cols {cols:?} does not fit a {width}x{height} capture region"
    )]
    CropOutOfBounds {
        rows: Range<u32>,
        cols: Range<u32>,
        width: u32,
        height: u32,
    },
    #[error("Canny low threshold {low} exceeds high threshold {high}")]
    CannyThresholds { low: u16, high: u16 },
    #[error("Dilation kernel must be odd and positive, got {0}")]
    DilateKernel(u32),
    #[error("Preview width must be at least 2 columns, got {0}")]
    PreviewWidth(u16),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("dino-bot").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/dino-bot/config.toml")
        })
}
