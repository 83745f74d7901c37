//! justbe: guided breathing sessions in the terminal.
//!
//! ## Subcommands
//!
//! - `list`: Show the exercise catalog, favorites first
//! - `run`: Run a session in real time and save it to history
//! - `history`: Show streaks and totals
//! - `settings`: Show or change preferences
//! - `remind`: Run the daily reminder batch against a recipients file

mod commands;
mod logging;
mod run;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use breath_core::StorageConfig;

#[derive(Parser)]
#[command(name = "justbe")]
#[command(about = "Guided breathing sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available exercises
    List,

    /// Run a breathing session
    Run {
        /// Exercise id (see `justbe list`)
        #[arg(value_name = "ID")]
        exercise_id: String,

        /// Start immediately instead of after the 3 second lead-in
        #[arg(long)]
        no_lead_in: bool,

        /// Silence the terminal bell for this session
        #[arg(long)]
        no_haptics: bool,

        /// Save the session without prompting
        #[arg(short, long)]
        yes: bool,
    },

    /// Show session history
    History,

    /// Show or change settings
    Settings {
        /// Enable or disable haptic cues
        #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
        haptics: Option<bool>,

        /// Enable or disable the daily reminder
        #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
        reminders: Option<bool>,

        /// Add or remove an exercise from favorites
        #[arg(long, value_name = "ID")]
        favorite: Option<String>,
    },

    /// Send the daily reminder to opted-in recipients
    Remind {
        /// JSON array of recipients
        #[arg(long, value_name = "FILE")]
        recipients: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let storage = StorageConfig::from_env();
    let _logging_guard = logging::init(storage.as_ref().ok());

    let storage = match storage {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(error = %e, "justbe failed to locate storage");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::List => commands::list(&storage),
        Commands::Run {
            exercise_id,
            no_lead_in,
            no_haptics,
            yes,
        } => run::run(
            &storage,
            run::RunArgs {
                exercise_id,
                no_lead_in,
                no_haptics,
                yes,
            },
        ),
        Commands::History => commands::history(&storage),
        Commands::Settings {
            haptics,
            reminders,
            favorite,
        } => commands::settings(
            &storage,
            commands::SettingsArgs {
                haptics,
                reminders,
                toggle_favorite: favorite,
            },
        ),
        Commands::Remind { recipients } => commands::remind(&recipients),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "justbe command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
