use clap::Subcommand;
use swearjar_core::Config;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration as JSON
    Show,
    /// Set one configuration key.
    /// Keys: recent-logs-limit, currency-symbol
    Set { key: String, value: String },
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let cfg = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigAction::Set { key, value } => {
            let mut cfg = Config::load()?;
            match key.as_str() {
                "recent-logs-limit" => cfg.recent_logs_limit = value.parse()?,
                "currency-symbol" => cfg.currency_symbol = value,
                other => return Err(format!("unknown config key: {other}").into()),
            }
            cfg.save()?;
            println!("Configuration updated");
        }
    }
    Ok(())
}
