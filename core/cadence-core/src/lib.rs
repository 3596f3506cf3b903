//! # cadence-core
//!
//! Core library for the cadence workout timer: paces each repetition through
//! its eccentric, hold and concentric steps, runs sets, rests and bi-sets in
//! order, and records what was lifted.
//!
//! ## Design Principles
//!
//! - **Single writer**: one [`Session`] owns the live state; intents and clock
//!   ticks reach it as [`Command`]s applied by the pure [`reduce`] function.
//! - **Synchronous**: No async runtime dependency. Hosts drive the clock.
//! - **Not thread-safe**: Hosts provide their own synchronization.
//! - **Graceful degradation**: Missing files return empty/default values, not errors.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadence_core::{CatalogStore, ClockDriver, Session, StorageConfig};
//!
//! let storage = StorageConfig::resolve()?;
//! let workout = CatalogStore::new(&storage.workouts_file()).find("push-day")?;
//! let mut session = Session::default();
//! session.start(workout, Default::default())?;
//!
//! let mut clock = ClockDriver::default();
//! loop {
//!     clock.drive(&mut session, std::time::Instant::now());
//!     std::thread::sleep(clock.interval());
//! }
//! ```

pub mod catalog;
pub mod clock;
pub mod config;
pub mod cues;
pub mod error;
pub mod history;
pub mod preview;
pub mod sequencer;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod summary;
pub mod types;

// Re-export commonly used items at crate root
pub use catalog::{export_backup, import_backup, Backup, CatalogStore};
pub use clock::ClockDriver;
pub use config::{load_settings, Settings};
pub use cues::Cue;
pub use error::{CadenceError, Result};
pub use history::{HistoryEntry, HistorySink, JsonHistoryStore, WorkoutReport};
pub use preview::WeightAdvice;
pub use session::{
    parse_numeric_input, reduce, Command, Session, SessionState, SetData, SetLogEntry,
};
pub use snapshot::SnapshotStore;
pub use storage::StorageConfig;
pub use types::*;
