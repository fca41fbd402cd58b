//! dino-bot library crate.
//!
//! A closed-loop screen-reading bot for the offline dinosaur runner game:
//! capture a screen region, extract obstacle outlines, decide whether the
//! nearest one is close enough, and press the jump key.
//!
//! This module exposes the internal components for integration testing.

pub mod action;
pub mod capture;
pub mod cli;
pub mod config;
pub mod control;
pub mod hotkeys;
pub mod policy;
pub mod rate;
pub mod render;
pub mod vision;
