use clap::Subcommand;
use swearjar_core::{LogOptions, Mood};

use super::{open_tracker, resolve_user, resolve_word, CliResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Record a swear event
    Add {
        username: String,
        /// The word, as spelled in the dictionary
        word: String,
        /// Mood: angry, frustrated, surprised, amused, stressed, other
        #[arg(long)]
        mood: Option<String>,
        /// Free-text context for the slip
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Set the after-the-fact worth-it verdict on a log
    WorthIt { log_id: String, verdict: bool },
    /// Delete a log and roll its fine back out of the totals
    Remove { log_id: String },
    /// Show the most recent logs
    Recent {
        username: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

pub fn run(action: LogAction) -> CliResult {
    let tracker = open_tracker()?;

    match action {
        LogAction::Add {
            username,
            word,
            mood,
            context,
            location,
        } => {
            let user = resolve_user(&tracker, &username)?;
            let word = resolve_word(&tracker, &word)?;
            let entry = tracker.record_event(
                &user.id,
                &word.id,
                LogOptions {
                    mood: mood.as_deref().map(Mood::parse),
                    context,
                    location,
                },
            )?;
            let cfg = swearjar_core::Config::load_or_default();
            println!(
                "Logged '{}' for {} (fine {}{:.2})",
                word.word, username, cfg.currency_symbol, entry.fine_amount
            );
        }
        LogAction::WorthIt { log_id, verdict } => {
            tracker.update_worth_it(&log_id, verdict)?;
            println!("Log {log_id} marked worth_it={verdict}");
        }
        LogAction::Remove { log_id } => {
            tracker.delete_log(&log_id)?;
            println!("Log {log_id} deleted");
        }
        LogAction::Recent { username, limit } => {
            let user = resolve_user(&tracker, &username)?;
            let entries = tracker.recent_logs(&user.id, limit)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
