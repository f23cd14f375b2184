use clap::Subcommand;
use swearjar_core::Config;

use super::{open_tracker, resolve_user, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's summary
    Today { username: String },
    /// Daily summaries for a date range (YYYY-MM-DD, inclusive)
    Range {
        username: String,
        start: String,
        end: String,
    },
    /// Totals, current streak, today's summary and recent logs in one read
    Dashboard { username: String },
    /// Count of clean days on record
    CleanDays { username: String },
    /// Summed fines, optionally over a trailing window
    Fines {
        username: String,
        /// Trailing window in days (all time when omitted)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Most frequent word across daily summaries
    TopWord {
        username: String,
        #[arg(long)]
        days: Option<u32>,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let tracker = open_tracker()?;
    let cfg = Config::load_or_default();

    match action {
        StatsAction::Today { username } => {
            let user = resolve_user(&tracker, &username)?;
            let summary = tracker.ensure_today(&user.id)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Range {
            username,
            start,
            end,
        } => {
            let user = resolve_user(&tracker, &username)?;
            let summaries = tracker.stats_for_range(&user.id, &start, &end)?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        StatsAction::Dashboard { username } => {
            let user = resolve_user(&tracker, &username)?;
            let snapshot = tracker.dashboard(&user.id, cfg.recent_logs_limit)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        StatsAction::CleanDays { username } => {
            let user = resolve_user(&tracker, &username)?;
            println!("{}", tracker.clean_day_count(&user.id)?);
        }
        StatsAction::Fines { username, days } => {
            let user = resolve_user(&tracker, &username)?;
            let total = tracker.total_fine_in_window(&user.id, days)?;
            println!("{}{:.2}", cfg.currency_symbol, total);
        }
        StatsAction::TopWord { username, days } => {
            let user = resolve_user(&tracker, &username)?;
            match tracker.most_frequent_word(&user.id, days)? {
                Some(word) => println!("{}", word.word),
                None => println!("(no data)"),
            }
        }
    }
    Ok(())
}
