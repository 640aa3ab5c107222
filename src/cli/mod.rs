//! CLI module for heraclis.
//!
//! Handles argument parsing, subcommand dispatch and terminal output.

pub mod args;
pub mod commands;
pub mod display;

pub use args::{Args, Commands, ExerciseCommand, GoalCommand, LogCommand, SettingsCommand};
