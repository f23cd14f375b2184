use clap::Subcommand;

use super::{open_tracker, resolve_user, CliResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current streak
    Show { username: String },
    /// Daily tick: credit today as a clean day if no events were logged.
    /// Safe to run more than once per day.
    Extend { username: String },
    /// Longest streak on record
    Longest { username: String },
    /// All streak intervals, newest first
    History { username: String },
}

pub fn run(action: StreakAction) -> CliResult {
    let tracker = open_tracker()?;

    match action {
        StreakAction::Show { username } => {
            let user = resolve_user(&tracker, &username)?;
            match tracker.streaks().current(&user.id)? {
                Some(streak) => println!("{}", serde_json::to_string_pretty(&streak)?),
                None => println!("No active streak"),
            }
        }
        StreakAction::Extend { username } => {
            let user = resolve_user(&tracker, &username)?;
            match tracker.streaks().extend(&user.id)? {
                Some(streak) => println!("Streak at {} days", streak.streak_length),
                None => println!("Today is not a clean day"),
            }
        }
        StreakAction::Longest { username } => {
            let user = resolve_user(&tracker, &username)?;
            println!("{}", tracker.streaks().longest(&user.id)?);
        }
        StreakAction::History { username } => {
            let user = resolve_user(&tracker, &username)?;
            let history = tracker.streaks().history(&user.id)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
    }
    Ok(())
}
