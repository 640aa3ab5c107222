//! Storage module for the database and settings.

pub mod config;
pub mod database;
pub mod schema;

pub use config::{load_settings, save_settings, Settings, SettingsError};
pub use database::{Database, DatabaseError, LogQuery};
