use clap::Subcommand;
use swearjar_core::Severity;

use super::{open_tracker, resolve_user, resolve_word, CliResult};

#[derive(Subcommand)]
pub enum WordsAction {
    /// Add a custom word to the dictionary
    Add {
        word: String,
        /// Severity: mild, moderate, severe
        #[arg(long, default_value = "mild")]
        severity: String,
        /// Default fine; derived from severity when omitted
        #[arg(long)]
        fine: Option<f64>,
    },
    /// List the whole dictionary
    List,
    /// Search the dictionary by substring
    Search { text: String },
    /// Change a word's severity (re-derives its default fine)
    SetSeverity { word: String, severity: String },
    /// Remove a word; its overrides and log rows go with it
    Remove { word: String },
    /// Set or clear a per-user fine override for a word
    Override {
        username: String,
        word: String,
        /// New override amount; omit together with --clear to inspect
        #[arg(long, conflicts_with = "clear")]
        fine: Option<f64>,
        /// Clear the override back to the word's default
        #[arg(long)]
        clear: bool,
    },
    /// Exclude a word from fine resolution for one user
    Mute { username: String, word: String },
    /// Re-include a muted word
    Unmute { username: String, word: String },
}

pub fn run(action: WordsAction) -> CliResult {
    let tracker = open_tracker()?;

    match action {
        WordsAction::Add {
            word,
            severity,
            fine,
        } => {
            let added = tracker.add_word(&word, Severity::parse(&severity), fine)?;
            println!(
                "Added '{}' ({}, default fine {:.2})",
                added.word,
                added.severity.as_str(),
                added.default_fine
            );
        }
        WordsAction::List => {
            let words = tracker.list_words()?;
            println!("{}", serde_json::to_string_pretty(&words)?);
        }
        WordsAction::Search { text } => {
            let hits = tracker.search_words(&text)?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        WordsAction::SetSeverity { word, severity } => {
            let word = resolve_word(&tracker, &word)?;
            tracker.update_word_severity(&word.id, Severity::parse(&severity))?;
            println!("Updated severity for '{}'", word.word);
        }
        WordsAction::Remove { word } => {
            let word = resolve_word(&tracker, &word)?;
            tracker.remove_word(&word.id)?;
            println!("Removed '{}'", word.word);
        }
        WordsAction::Override {
            username,
            word,
            fine,
            clear,
        } => {
            let user = resolve_user(&tracker, &username)?;
            let word = resolve_word(&tracker, &word)?;
            if clear {
                tracker.set_custom_fine(&user.id, &word.id, None)?;
                println!("Override cleared for '{}'", word.word);
            } else if let Some(fine) = fine {
                tracker.set_custom_fine(&user.id, &word.id, Some(fine))?;
                println!("Override for '{}' set to {:.2}", word.word, fine);
            } else {
                return Err("pass --fine <amount> or --clear".into());
            }
        }
        WordsAction::Mute { username, word } => {
            let user = resolve_user(&tracker, &username)?;
            let word = resolve_word(&tracker, &word)?;
            tracker.set_word_active(&user.id, &word.id, false)?;
            println!("'{}' muted for {username}", word.word);
        }
        WordsAction::Unmute { username, word } => {
            let user = resolve_user(&tracker, &username)?;
            let word = resolve_word(&tracker, &word)?;
            tracker.set_word_active(&user.id, &word.id, true)?;
            println!("'{}' unmuted for {username}", word.word);
        }
    }
    Ok(())
}
