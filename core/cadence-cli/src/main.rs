//! cadence: terminal workout timer.
//!
//! Paces every repetition through its tempo, runs rests between sets and
//! exercises, and keeps a history of what was lifted.
//!
//! ## Subcommands
//!
//! - `list`: Saved workouts, with weight advice from history
//! - `run`: Start a workout (or resume an interrupted one)
//! - `history`: Past sessions, newest first
//! - `snapshot`: Inspect or discard the crash-recovery snapshot
//! - `export` / `import`: Backup of workouts and history

mod awake;
mod display;
mod intent;
mod logging;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cadence_core::{
    export_backup, import_backup, load_settings, CatalogStore, JsonHistoryStore, Result,
    Settings, SnapshotStore, StorageConfig,
};
use runner::ResumeChoice;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Tempo-paced workout timer")]
#[command(version)]
struct Cli {
    /// Data directory (defaults to ~/.cadence)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Settings file (defaults to <data dir>/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved workouts
    List,

    /// Run a workout
    Run {
        /// Workout to start when there is nothing to resume
        #[arg(value_name = "WORKOUT_ID")]
        workout_id: Option<String>,

        /// Resume an interrupted session without asking
        #[arg(long, conflicts_with = "discard")]
        resume: bool,

        /// Discard an interrupted session without asking
        #[arg(long)]
        discard: bool,
    },

    /// Show past sessions
    History {
        /// Delete all history
        #[arg(long)]
        clear: bool,
    },

    /// Crash-recovery snapshot
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Write workouts and history to a backup file
    Export {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Restore workouts and/or history from a backup file
    Import {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Print the saved session state
    Show,
    /// Delete the saved session state
    Clear,
}

fn main() {
    let cli = Cli::parse();

    let storage = match cli.data_dir.clone() {
        Some(root) => StorageConfig::with_root(root),
        None => match StorageConfig::resolve() {
            Ok(storage) => storage,
            Err(err) => {
                eprintln!("cadence: {err}");
                std::process::exit(1);
            }
        },
    };
    let _logging_guard = logging::init(&storage.logs_dir());

    let config_path = cli.config.clone().unwrap_or_else(|| storage.config_file());
    let settings = match load_settings(Some(config_path)) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(error = %err, "Falling back to default settings");
            eprintln!("cadence: {err}; using defaults");
            Settings::default()
        }
    };

    if let Err(err) = dispatch(cli.command, &storage, &settings) {
        tracing::error!(error = %err, "cadence failed");
        eprintln!("cadence: {err}");
        std::process::exit(1);
    }
}

fn dispatch(command: Commands, storage: &StorageConfig, settings: &Settings) -> Result<()> {
    match command {
        Commands::List => {
            let workouts = CatalogStore::new(&storage.workouts_file()).load()?;
            let history = JsonHistoryStore::new(&storage.history_file()).load()?;
            print!("{}", display::workouts(&workouts, &history));
        }
        Commands::Run {
            workout_id,
            resume,
            discard,
        } => {
            storage.ensure_root()?;
            let choice = match (resume, discard) {
                (true, _) => Some(ResumeChoice::Resume),
                (_, true) => Some(ResumeChoice::Discard),
                _ => None,
            };
            runner::run(storage, settings, workout_id.as_deref(), choice)?;
        }
        Commands::History { clear } => {
            let store = JsonHistoryStore::new(&storage.history_file());
            if clear {
                store.clear()?;
                println!("History cleared.");
            } else {
                print!("{}", display::history(&store.load()?));
            }
        }
        Commands::Snapshot { action } => {
            let snapshots = SnapshotStore::new(&storage.snapshot_file());
            match action {
                SnapshotAction::Show => match snapshots.load()? {
                    Some(state) => println!("{}", display::status_line(&state)),
                    None => println!("No snapshot."),
                },
                SnapshotAction::Clear => {
                    snapshots.clear()?;
                    println!("Snapshot cleared.");
                }
            }
        }
        Commands::Export { path } => {
            let backup = export_backup(storage, &path)?;
            println!(
                "Exported {} workouts and {} history entries to {}",
                backup.workouts.map(|w| w.len()).unwrap_or(0),
                backup.history.map(|h| h.len()).unwrap_or(0),
                path.display()
            );
        }
        Commands::Import { path } => {
            let backup = import_backup(storage, &path)?;
            if let Some(workouts) = backup.workouts {
                println!("Imported {} workouts", workouts.len());
            }
            if let Some(history) = backup.history {
                println!("Imported {} history entries", history.len());
            }
        }
    }
    Ok(())
}
