use clap::Subcommand;

use super::{open_tracker, resolve_user, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show a profile's settings as JSON
    Show { username: String },
    /// Set one settings key.
    /// Keys: notifications, dark-mode, reminder-time, share-stats, auto-location
    Set {
        username: String,
        key: String,
        /// "true"/"false" for toggles, "HH:MM" or "none" for reminder-time
        value: String,
    },
}

pub fn run(action: SettingsAction) -> CliResult {
    let tracker = open_tracker()?;

    match action {
        SettingsAction::Show { username } => {
            let user = resolve_user(&tracker, &username)?;
            let settings = tracker.settings(&user.id)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set {
            username,
            key,
            value,
        } => {
            let user = resolve_user(&tracker, &username)?;
            let mut settings = tracker.settings(&user.id)?;
            match key.as_str() {
                "notifications" => settings.notifications_enabled = value.parse()?,
                "dark-mode" => settings.dark_mode = value.parse()?,
                "share-stats" => settings.share_stats = value.parse()?,
                "auto-location" => settings.auto_location = value.parse()?,
                "reminder-time" => {
                    settings.reminder_time = if value == "none" { None } else { Some(value) };
                }
                other => return Err(format!("unknown settings key: {other}").into()),
            }
            tracker.update_settings(&settings)?;
            println!("Settings updated for {username}");
        }
    }
    Ok(())
}
