use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "swearjar-cli", version, about = "SwearJar CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile management
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Event logging
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Dictionary management
    Words {
        #[command(subcommand)]
        action: commands::words::WordsAction,
    },
    /// Statistics and summaries
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Clean-streak queries and the daily tick
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Per-user settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Application configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Log { action } => commands::log::run(action),
        Commands::Words { action } => commands::words::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
