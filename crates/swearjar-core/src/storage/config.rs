//! TOML-based application configuration.
//!
//! Stores app-level preferences that are not per-user settings rows:
//! - Dashboard recent-log limit
//! - Currency symbol used when printing fines
//!
//! Configuration is stored at `~/.config/swearjar/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/swearjar/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How many recent logs the dashboard snapshot includes.
    #[serde(default = "default_recent_logs_limit")]
    pub recent_logs_limit: u32,
    /// Symbol prefixed to fine amounts in CLI output.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_recent_logs_limit() -> u32 {
    10
}
fn default_currency_symbol() -> String {
    "$".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recent_logs_limit: default_recent_logs_limit(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.recent_logs_limit, 10);
        assert_eq!(parsed.currency_symbol, "$");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let parsed: Config = toml::from_str("currency_symbol = \"€\"").unwrap();
        assert_eq!(parsed.currency_symbol, "€");
        assert_eq!(parsed.recent_logs_limit, 10);
    }
}
