//! Storage paths and JSON file helpers for cadence data.
//!
//! Production code resolves `~/.cadence/`; tests inject a temp directory with
//! [`StorageConfig::with_root`]. Writes go through a temp file + rename so a
//! crash mid-write never leaves a truncated catalog or snapshot behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{CadenceError, Result};

/// Central configuration for all cadence storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    /// Resolves the default root (`~/.cadence`).
    pub fn resolve() -> Result<Self> {
        let home = dirs::home_dir().ok_or(CadenceError::DataDirNotFound)?;
        Ok(Self {
            root: home.join(".cadence"),
        })
    }

    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to workouts.json (the workout catalog).
    pub fn workouts_file(&self) -> PathBuf {
        self.root.join("workouts.json")
    }

    /// Path to history.json (append-only set log of finished workouts).
    pub fn history_file(&self) -> PathBuf {
        self.root.join("history.json")
    }

    /// Path to snapshot.json (crash-recovery copy of the live session).
    pub fn snapshot_file(&self) -> PathBuf {
        self.root.join("snapshot.json")
    }

    /// Path to config.toml (user settings).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| CadenceError::io(format!("create {}", self.root.display()), e))
    }
}

/// Reads and parses a JSON file. Missing or blank files yield `None`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(CadenceError::io(format!("read {}", path.display()), err)),
    };

    if content.trim().is_empty() {
        tracing::warn!(path = %path.display(), "Empty data file, treating as absent");
        return Ok(None);
    }

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| CadenceError::json(format!("parse {}", path.display()), e))
}

/// Serializes `value` and atomically replaces `path` with it.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| CadenceError::json(format!("serialize {}", path.display()), e))?;

    let parent_dir = path.parent().ok_or_else(|| {
        CadenceError::io(
            format!("{} has no parent directory", path.display()),
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        )
    })?;
    fs::create_dir_all(parent_dir)
        .map_err(|e| CadenceError::io(format!("create {}", parent_dir.display()), e))?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .map_err(|e| CadenceError::io("create temp file", e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| CadenceError::io("write temp file", e))?;
    temp_file
        .flush()
        .map_err(|e| CadenceError::io("flush temp file", e))?;
    temp_file
        .persist(path)
        .map_err(|e| CadenceError::io(format!("persist {}", path.display()), e.error))?;

    Ok(())
}

pub(crate) fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(CadenceError::io(format!("remove {}", path.display()), err)),
    }
}
