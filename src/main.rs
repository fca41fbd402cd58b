use clap::Parser;
use std::path::Path;

use dino_bot::cli::{self, Args, Command};
use dino_bot::config::{Config, ConfigError, Overrides, Settings};
use dino_bot::control::BotError;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

/// Merge settings: CLI args > config file > built-in defaults
fn load_settings(config_path: Option<&Path>, overrides: &Overrides) -> Result<Settings, ConfigError> {
    Settings::resolve(Config::load(config_path)?, overrides)
}

fn main() {
    init_logging();

    let args = Args::parse();
    let overrides = args.overrides();
    let config_path = args.config.as_deref();

    let result: Result<(), BotError> = match args.command {
        Some(Command::Config { action }) => {
            cli::handle_config_action(action, config_path, &overrides).map_err(Into::into)
        }
        Some(Command::Calibrate { ref output }) => load_settings(config_path, &overrides)
            .map_err(Into::into)
            .and_then(|settings| cli::calibrate(&settings, &args.run.replay, output)),
        Some(Command::Run) | None => load_settings(config_path, &overrides)
            .map_err(Into::into)
            .and_then(|settings| cli::run(&settings, &args.run.replay, args.run.max_ticks))
            .map(|summary| {
                println!("Ticks: {}", summary.ticks);
                println!("Jump signals: {}", summary.jumps);
                if summary.action_failures > 0 {
                    println!("Failed jumps: {}", summary.action_failures);
                }
                if let Some(fps) = summary.average_fps {
                    println!("Average rate: {:.1} fps", fps);
                }
            }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
