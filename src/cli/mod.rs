//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing and subcommand handlers.

mod args;
mod commands;

pub use args::{Args, Command, ConfigAction, RunArgs, TuningArgs};
pub use commands::{calibrate, handle_config_action, run};
