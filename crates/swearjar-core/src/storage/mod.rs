mod config;
pub mod database;
pub mod migrations;

pub(crate) mod logs;
pub(crate) mod streaks;
pub(crate) mod summaries;
pub(crate) mod users;
pub(crate) mod words;

pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/swearjar[-dev]/` based on SWEARJAR_ENV.
///
/// Set SWEARJAR_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SWEARJAR_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("swearjar-dev")
    } else {
        base_dir.join("swearjar")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
