//! Database snapshots.
//!
//! - [`registry`] - `snapshots.json`, the ordered list of known snapshots
//! - [`store`] - snapshot files, written with SQLite's online backup
//! - [`retention`] - oldest-first eviction past the configured limit
//! - [`restore`] - backup, copy, verify and roll back
//!
//! [`SnapshotManager`] ties these together for the commands.

pub mod naming;
pub mod registry;
pub mod restore;
pub mod retention;
pub mod store;

pub use registry::Registry;
pub use restore::{FileOps, RestoreOutcome, StdFileOps};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::SnapshotRecord;

/// Attempts at finding an unused snapshot name before giving up.
const NAME_ATTEMPTS: usize = 64;

/// A snapshot that was just taken.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedSnapshot {
    pub record: SnapshotRecord,
    /// Records dropped by retention, oldest first.
    pub evicted: Vec<SnapshotRecord>,
}

/// Result of deleting snapshots by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletedSnapshots {
    pub deleted: Vec<SnapshotRecord>,
    pub not_found: Vec<String>,
}

/// Snapshot operations against one database and snapshots directory.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    db_path: PathBuf,
    dir: PathBuf,
    max_snapshots: usize,
    registry: Registry,
}

impl SnapshotManager {
    #[must_use]
    pub fn new(db_path: PathBuf, dir: PathBuf, max_snapshots: usize) -> Self {
        let registry = Registry::in_dir(&dir);
        Self {
            db_path,
            dir,
            max_snapshots: max_snapshots.max(1),
            registry,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.database_path(),
            settings.snapshots_dir.clone(),
            settings.max_snapshots,
        )
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    #[must_use]
    pub const fn max_snapshots(&self) -> usize {
        self.max_snapshots
    }

    /// Registered snapshots, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be read.
    pub fn list(&self) -> Result<Vec<SnapshotRecord>> {
        self.registry.load()
    }

    /// Where a record's file lives.
    #[must_use]
    pub fn path_of(&self, record: &SnapshotRecord) -> PathBuf {
        record.resolve_path(&self.dir)
    }

    /// Take a snapshot of the live database.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshots directory is not writable, the
    /// database is missing, the backup fails, or the registry cannot be
    /// saved. The registry is unchanged in every error case.
    pub fn create_snapshot(&self) -> Result<CreatedSnapshot> {
        self.create_snapshot_at(&mut rand::thread_rng(), Local::now())
    }

    /// [`Self::create_snapshot`] with an explicit random source and clock.
    ///
    /// # Errors
    ///
    /// See [`Self::create_snapshot`].
    pub fn create_snapshot_at<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Local>,
    ) -> Result<CreatedSnapshot> {
        store::ensure_writable(&self.dir)?;
        if !self.db_path.is_file() {
            return Err(Error::DatabaseNotFound {
                path: self.db_path.clone(),
            });
        }

        let mut records = self.registry.load()?;
        let name = self.unused_name(&records, rng, &now)?;
        let path = self.dir.join(&name);

        store::backup_database(&self.db_path, &path)?;

        let record = SnapshotRecord::new(name, naming::display_timestamp(&now), path.clone());
        records.push(record.clone());
        let evicted = retention::apply_retention(&mut records, self.max_snapshots);

        if let Err(e) = self.registry.save(&records) {
            // Keep disk and registry in step: the new file was never registered.
            store::delete_snapshot_file(&path);
            return Err(e);
        }

        for old in &evicted {
            info!(name = %old.name, "Evicting old snapshot");
            store::delete_snapshot_file(&self.path_of(old));
        }

        info!(name = %record.name, "Snapshot created");
        Ok(CreatedSnapshot { record, evicted })
    }

    fn unused_name<R: Rng + ?Sized>(
        &self,
        records: &[SnapshotRecord],
        rng: &mut R,
        now: &DateTime<Local>,
    ) -> Result<String> {
        for _ in 0..NAME_ATTEMPTS {
            let name = naming::snapshot_file_name(&naming::random_label(rng), now);
            if registry::find(records, &name).is_none() && !self.dir.join(&name).exists() {
                return Ok(name);
            }
        }
        Err(Error::Other(
            "Could not find an unused snapshot name".to_string(),
        ))
    }

    /// Delete snapshots by name.
    ///
    /// Unknown names are reported in `not_found`. The registry is saved
    /// before any file is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be read or saved.
    pub fn delete_snapshots(&self, names: &[String]) -> Result<DeletedSnapshots> {
        let mut records = self.registry.load()?;
        let mut outcome = DeletedSnapshots::default();

        for name in names {
            match registry::remove(&mut records, name) {
                Some(record) => outcome.deleted.push(record),
                None => {
                    warn!(name = %name, "Snapshot not found");
                    outcome.not_found.push(name.clone());
                }
            }
        }

        if outcome.deleted.is_empty() {
            return Ok(outcome);
        }

        self.registry.save(&records)?;
        for record in &outcome.deleted {
            store::delete_snapshot_file(&self.path_of(record));
            info!(name = %record.name, "Snapshot deleted");
        }
        Ok(outcome)
    }

    /// Restore the live database from a registered snapshot.
    ///
    /// # Errors
    ///
    /// See [`Self::restore_snapshot_with`].
    pub fn restore_snapshot(&self, name: &str) -> Result<RestoreOutcome> {
        self.restore_snapshot_with(name, &StdFileOps)
    }

    /// Restore using the given file operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not registered, its file is
    /// missing, or the safety backup cannot be made.
    pub fn restore_snapshot_with<F: FileOps + ?Sized>(
        &self,
        name: &str,
        ops: &F,
    ) -> Result<RestoreOutcome> {
        let records = self.registry.load()?;
        let record = registry::find(&records, name).ok_or_else(|| Error::SnapshotNotFound {
            name: name.to_string(),
        })?;

        let path = self.path_of(record);
        if !path.is_file() {
            return Err(Error::SnapshotFileMissing {
                name: name.to_string(),
                path,
            });
        }
        if !self.db_path.is_file() {
            return Err(Error::DatabaseNotFound {
                path: self.db_path.clone(),
            });
        }

        info!(name, "Restoring snapshot");
        restore::restore_database(&path, &self.db_path, ops)
    }
}
