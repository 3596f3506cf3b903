//! Workout catalog and backups.
//!
//! The catalog is the list of saved workouts in `workouts.json`. Catalogs from
//! older versions are accepted as-is: missing `biSetId`, `prepTime` and the
//! other newer exercise fields are filled by serde defaults on load, so a
//! load/save round trip upgrades the file.
//!
//! A backup bundles the catalog and the history into one JSON document
//! (`{"workouts": [...], "history": [...]}`). Either half may be absent.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CadenceError, Result};
use crate::history::{HistoryEntry, JsonHistoryStore};
use crate::storage::{read_json, write_json_atomic, StorageConfig};
use crate::types::Workout;

pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: &Path) -> Self {
        CatalogStore {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All saved workouts. A missing catalog is empty.
    pub fn load(&self) -> Result<Vec<Workout>> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    pub fn find(&self, workout_id: &str) -> Result<Workout> {
        self.load()?
            .into_iter()
            .find(|workout| workout.id == workout_id)
            .ok_or_else(|| CadenceError::WorkoutNotFound(workout_id.to_string()))
    }

    pub fn save(&self, workouts: &[Workout]) -> Result<()> {
        write_json_atomic(&self.path, workouts)?;
        info!(path = %self.path.display(), count = workouts.len(), "Catalog saved");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub workouts: Option<Vec<Workout>>,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

/// Collects the catalog and history under `storage` into one document.
pub fn export_backup(storage: &StorageConfig, dest: &Path) -> Result<Backup> {
    let backup = Backup {
        workouts: Some(CatalogStore::new(&storage.workouts_file()).load()?),
        history: Some(JsonHistoryStore::new(&storage.history_file()).load()?),
    };
    write_json_atomic(dest, &backup)?;
    info!(path = %dest.display(), "Backup exported");
    Ok(backup)
}

/// Replaces whichever halves `source` carries. The other half is left alone.
pub fn import_backup(storage: &StorageConfig, source: &Path) -> Result<Backup> {
    let backup: Backup = read_json(source)?.unwrap_or_default();
    if backup.workouts.is_none() && backup.history.is_none() {
        return Err(CadenceError::InvalidBackup(source.to_path_buf()));
    }

    if let Some(workouts) = &backup.workouts {
        CatalogStore::new(&storage.workouts_file()).save(workouts)?;
    }
    if let Some(history) = &backup.history {
        write_json_atomic(&storage.history_file(), history)?;
    }
    info!(
        path = %source.display(),
        workouts = backup.workouts.as_ref().map(Vec::len),
        history = backup.history.as_ref().map(Vec::len),
        "Backup imported"
    );
    Ok(backup)
}
