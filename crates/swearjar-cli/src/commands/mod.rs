pub mod config;
pub mod log;
pub mod profile;
pub mod settings;
pub mod stats;
pub mod streak;
pub mod words;

use swearjar_core::{SwearWord, Tracker, User};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the on-disk tracker (creates the database and starter dictionary
/// on first run).
fn open_tracker() -> Result<Tracker, Box<dyn std::error::Error>> {
    Tracker::open()
}

/// Resolve a profile by username.
fn resolve_user(tracker: &Tracker, username: &str) -> Result<User, Box<dyn std::error::Error>> {
    tracker
        .get_user_by_username(username)?
        .ok_or_else(|| format!("no profile named '{username}'").into())
}

/// Resolve a dictionary entry by its text.
fn resolve_word(tracker: &Tracker, text: &str) -> Result<SwearWord, Box<dyn std::error::Error>> {
    tracker
        .get_word_by_text(text)?
        .ok_or_else(|| format!("'{text}' is not in the dictionary").into())
}
