//! Configuration management.
//!
//! Settings come from a JSON config file, overridden by command-line flags
//! and their environment variables, and are resolved once into a
//! [`Settings`] value that is passed to every component.
//!
//! ```json
//! {
//!   "invoke_ai_dir": "/home/me/invokeai",
//!   "max_snapshots": 10,
//!   "snapshots_dir": "/home/me/.invoke-presets/snapshots"
//! }
//! ```

mod setup;

pub use setup::first_run_setup;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::transfer::file::atomic_write;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "INVOKE_PRESETS_CONFIG";

/// Snapshots kept when the config does not say otherwise.
pub const DEFAULT_MAX_SNAPSHOTS: usize = 10;

/// On-disk configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub invoke_ai_dir: PathBuf,
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshots_dir: Option<PathBuf>,
}

const fn default_max_snapshots() -> usize {
    DEFAULT_MAX_SNAPSHOTS
}

impl ConfigFile {
    /// Read a config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {e}", path.display())))
    }

    /// Write the config file, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        atomic_write(path, &json)
    }
}

/// Values supplied on the command line (or through their env variables).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub invoke_dir: Option<PathBuf>,
    pub max_snapshots: Option<usize>,
    pub snapshots_dir: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// InvokeAI install directory.
    pub invoke_ai_dir: PathBuf,
    /// Retention limit, at least 1.
    pub max_snapshots: usize,
    /// Where snapshot files and `snapshots.json` live.
    pub snapshots_dir: PathBuf,
}

impl Settings {
    /// Merge a config file (if any) with the overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no install directory is known, the
    /// snapshots directory cannot be determined, or a value is invalid.
    pub fn resolve(file: Option<ConfigFile>, overrides: &Overrides) -> Result<Self> {
        let (file_dir, file_max, file_snaps) = match file {
            Some(f) => (Some(f.invoke_ai_dir), Some(f.max_snapshots), f.snapshots_dir),
            None => (None, None, None),
        };

        let invoke_ai_dir = overrides
            .invoke_dir
            .clone()
            .or(file_dir)
            .ok_or_else(|| Error::Config("InvokeAI directory is not configured".to_string()))?;

        let max_snapshots = overrides
            .max_snapshots
            .or(file_max)
            .unwrap_or(DEFAULT_MAX_SNAPSHOTS);

        let snapshots_dir = match overrides.snapshots_dir.clone().or(file_snaps) {
            Some(dir) => dir,
            None => default_snapshots_dir().ok_or_else(|| {
                Error::Config("Cannot determine the home directory for snapshots".to_string())
            })?,
        };

        let settings = Self {
            invoke_ai_dir,
            max_snapshots,
            snapshots_dir,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the values make sense.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.max_snapshots < 1 {
            return Err(Error::Config(
                "max_snapshots must be at least 1".to_string(),
            ));
        }
        if !self.invoke_ai_dir.is_dir() {
            return Err(Error::Config(format!(
                "InvokeAI directory not found: {}",
                self.invoke_ai_dir.display()
            )));
        }
        Ok(())
    }

    /// Path of InvokeAI's database.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.invoke_ai_dir.join("databases").join("invokeai.db")
    }
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf())
}

/// Where a new config file is written: `~/.config/invoke-presets/config.json`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".config").join("invoke-presets").join("config.json"))
}

/// Default snapshots directory: `~/.invoke-presets/snapshots`.
#[must_use]
pub fn default_snapshots_dir() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".invoke-presets").join("snapshots"))
}

/// Find the config file to use.
///
/// Priority:
/// 1. `explicit` (`--config` or `INVOKE_PRESETS_CONFIG`), returned even if
///    it does not exist so the caller can report it
/// 2. `~/.config/invoke-presets/config.json`
/// 3. `~/.invoke-presets/config.json`
/// 4. `./.invoke-presets.json`
#[must_use]
pub fn discover_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let mut candidates = Vec::new();
    if let Some(home) = home_dir() {
        candidates.push(home.join(".config").join("invoke-presets").join("config.json"));
        candidates.push(home.join(".invoke-presets").join("config.json"));
    }
    candidates.push(PathBuf::from(".invoke-presets.json"));

    let found = candidates.into_iter().find(|p| p.is_file());
    debug!(config = ?found, "Config discovery");
    found
}

/// Resolve settings for a command run.
///
/// Uses the discovered config file if there is one. Without a file, an
/// install directory given by flag or env is enough; otherwise the user is
/// offered to create a config interactively.
///
/// # Errors
///
/// Returns [`Error::Config`] if the config file is unreadable, setup is
/// declined, or the resolved values are invalid.
pub fn load_settings(overrides: &Overrides, prompter: &mut dyn Prompter) -> Result<Settings> {
    let file = match discover_config_file(overrides.config.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "Loading config");
            Some(ConfigFile::load(&path)?)
        }
        None if overrides.invoke_dir.is_some() => None,
        None => {
            let path = default_config_path().ok_or_else(|| {
                Error::Config("Cannot determine the home directory for the config file".to_string())
            })?;
            Some(first_run_setup(prompter, &path)?)
        }
    };
    Settings::resolve(file, overrides)
}
