//! Interactive first-run configuration.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{home_dir, ConfigFile, DEFAULT_MAX_SNAPSHOTS};
use crate::error::{Error, Result};
use crate::prompt::Prompter;

fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Ask for the install directory and retention limit, then write the
/// config file to `path`.
///
/// # Errors
///
/// Returns [`Error::Config`] if the user declines or gives an invalid
/// answer, or the write error.
pub fn first_run_setup(prompter: &mut dyn Prompter, path: &Path) -> Result<ConfigFile> {
    let question = format!("No configuration found. Create one at {}?", path.display());
    if prompter.confirm(&question, true)? != Some(true) {
        return Err(Error::Config("No configuration file found".to_string()));
    }

    let cancelled = || Error::Config("Configuration setup cancelled".to_string());

    let dir = prompter
        .text("InvokeAI install directory", None)?
        .ok_or_else(cancelled)?;
    let invoke_ai_dir = expand_home(dir.trim());
    if !invoke_ai_dir.is_dir() {
        return Err(Error::Config(format!(
            "Not a directory: {}",
            invoke_ai_dir.display()
        )));
    }

    let default_max = DEFAULT_MAX_SNAPSHOTS.to_string();
    let max = prompter
        .text("Maximum number of snapshots to keep", Some(&default_max))?
        .ok_or_else(cancelled)?;
    let max_snapshots = match max.trim().parse::<usize>() {
        Ok(n) if n >= 1 => n,
        _ => {
            return Err(Error::Config(format!(
                "Invalid snapshot limit '{max}', expected a number of at least 1"
            )))
        }
    };

    let file = ConfigFile {
        invoke_ai_dir,
        max_snapshots,
        snapshots_dir: None,
    };
    file.save(path)?;
    info!(path = %path.display(), "Wrote configuration");
    Ok(file)
}
