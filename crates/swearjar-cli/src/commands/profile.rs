use clap::Subcommand;

use super::{open_tracker, resolve_user, CliResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create a new profile
    Create {
        username: String,
        /// Display name shown on the dashboard
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Show a profile as JSON
    Show { username: String },
    /// List all profiles
    List,
    /// Zero the cached totals (logs and streak history are kept)
    Reset { username: String },
    /// Delete a profile and everything it owns
    Delete { username: String },
}

pub fn run(action: ProfileAction) -> CliResult {
    let tracker = open_tracker()?;

    match action {
        ProfileAction::Create {
            username,
            display_name,
        } => {
            let user = tracker.create_user(&username, display_name.as_deref())?;
            println!("Profile created: {} ({})", user.username, user.id);
        }
        ProfileAction::Show { username } => {
            let user = resolve_user(&tracker, &username)?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        ProfileAction::List => {
            let users = tracker.list_users()?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
        ProfileAction::Reset { username } => {
            let user = resolve_user(&tracker, &username)?;
            tracker.reset_statistics(&user.id)?;
            println!("Statistics reset for {username}");
        }
        ProfileAction::Delete { username } => {
            let user = resolve_user(&tracker, &username)?;
            tracker.delete_user(&user.id)?;
            println!("Profile {username} deleted");
        }
    }
    Ok(())
}
