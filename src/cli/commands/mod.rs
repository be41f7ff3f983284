//! Command implementations.

pub mod about;
pub mod completions;
pub mod database;
pub mod delete;
pub mod export;
pub mod import;
pub mod list;

use crate::config::Settings;
use crate::error::Result;
use crate::prompt::Prompter;
use crate::snapshot::{CreatedSnapshot, SnapshotManager};
use crate::transfer::Source;

/// Everything a command needs besides its own arguments.
pub struct Context<'a> {
    pub settings: &'a Settings,
    pub prompter: &'a mut dyn Prompter,
    pub json: bool,
    /// Skip confirmations (`--yes`).
    pub yes: bool,
    pub dry_run: bool,
}

impl Context<'_> {
    /// Ask for confirmation unless `--yes` was given. EOF counts as "no".
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    pub fn confirm(&mut self, message: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }
        Ok(self.prompter.confirm(message, false)?.unwrap_or(false))
    }

    #[must_use]
    pub fn snapshots(&self) -> SnapshotManager {
        SnapshotManager::from_settings(self.settings)
    }

    /// Ask for a file path or URL, depending on `url`. An empty answer or
    /// EOF cancels.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    pub fn ask_location(&mut self, url: bool) -> Result<Option<Source>> {
        let message = if url {
            "Enter the URL of the JSON file"
        } else {
            "Enter the path to the JSON file"
        };
        let answer = self.prompter.text(message, None)?;
        Ok(answer
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .map(|a| if url { Source::Url(a) } else { Source::File(a.into()) }))
    }

    /// Snapshot taken before import and delete write to the database.
    ///
    /// # Errors
    ///
    /// Returns the snapshot error; the caller must not write in that case.
    pub fn safety_snapshot(&self) -> Result<CreatedSnapshot> {
        let created = self.snapshots().create_snapshot()?;
        if !self.json {
            println!("Snapshot created: {}", created.record.name);
        }
        Ok(created)
    }
}
