//! User settings read from `~/.cadence/config.toml`.
//!
//! ```toml
//! keep_awake = true
//! tick_interval_ms = 100
//! cues = true
//! ```
//!
//! Every key is optional. A missing file means defaults; a file that does not
//! parse is reported so the host can warn and fall back.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_TICK_INTERVAL;
use crate::error::{CadenceError, Result};
use crate::storage::StorageConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ask the OS to stay awake while a session runs.
    pub keep_awake: bool,
    pub tick_interval_ms: u64,
    /// Announce phases and count down the last seconds.
    pub cues: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            keep_awake: true,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            cues: true,
        }
    }
}

impl Settings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(StorageConfig::resolve()?.config_file())
}

pub fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let config_path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };

    if !config_path.exists() {
        return Ok(Settings::default());
    }

    let content = fs_err::read_to_string(&config_path)
        .map_err(|err| CadenceError::io(format!("read {}", config_path.display()), err))?;
    toml::from_str::<Settings>(&content).map_err(|err| CadenceError::ConfigMalformed {
        path: config_path,
        details: err.to_string(),
    })
}
