//! Snapshot files on disk.
//!
//! Snapshots are taken with SQLite's online backup API, so a database that
//! InvokeAI has open is copied in a consistent state.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Pages copied per backup step before yielding to other connections.
const PAGES_PER_STEP: std::os::raw::c_int = 256;

/// Pause between backup steps.
const STEP_PAUSE: Duration = Duration::from_millis(50);

/// Make sure the snapshots directory exists and accepts new files.
///
/// # Errors
///
/// Returns [`Error::SnapshotDirNotWritable`] if the directory cannot be
/// created or written to.
pub fn ensure_writable(dir: &Path) -> Result<()> {
    let not_writable = |e: std::io::Error| {
        warn!(dir = %dir.display(), error = %e, "Snapshots directory is not writable");
        Error::SnapshotDirNotWritable {
            path: dir.to_path_buf(),
        }
    };

    fs::create_dir_all(dir).map_err(not_writable)?;

    let probe = dir.join(format!(".write-test-{}", std::process::id()));
    match OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(_) => {}
        // Left over from an earlier run; creating it proved the directory writable.
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => return Err(not_writable(e)),
    }
    if let Err(e) = fs::remove_file(&probe) {
        warn!(path = %probe.display(), error = %e, "Failed to remove write test file");
    }
    Ok(())
}

/// Copy the live database into a new file at `dest`.
///
/// A partially written destination is removed on failure.
///
/// # Errors
///
/// Returns [`Error::DatabaseNotFound`] if `source` is missing, or the
/// SQLite error that stopped the backup.
pub fn backup_database(source: &Path, dest: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(Error::DatabaseNotFound {
            path: source.to_path_buf(),
        });
    }
    if dest.exists() {
        return Err(Error::Other(format!(
            "Snapshot file already exists: {}",
            dest.display()
        )));
    }

    debug!(source = %source.display(), dest = %dest.display(), "Starting online backup");
    match run_backup(source, dest) {
        Ok(()) => {
            info!(dest = %dest.display(), "Database backed up");
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(dest) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(dest = %dest.display(), error = %cleanup, "Failed to remove partial snapshot");
                }
            }
            Err(e)
        }
    }
}

fn run_backup(source: &Path, dest: &Path) -> Result<()> {
    let src = Connection::open_with_flags(
        source,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    src.busy_timeout(Duration::from_secs(5))?;

    let mut dst = Connection::open_with_flags(
        dest,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let backup = Backup::new(&src, &mut dst)?;
    backup.run_to_completion(PAGES_PER_STEP, STEP_PAUSE, None)?;
    Ok(())
}

/// Remove a snapshot file, best effort.
///
/// Returns whether a file was removed. Failures are logged, never raised.
pub fn delete_snapshot_file(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Deleted snapshot file");
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Snapshot file not found on disk");
            false
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to delete snapshot file");
            false
        }
    }
}
