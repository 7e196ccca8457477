//! Configuration module
//!
//! Handles application settings persisted as TOML

mod settings;

pub use settings::AppConfig;

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "chatterm", "Chatterm").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default path of the configuration file
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
