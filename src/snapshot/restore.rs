//! Restoring the live database from a snapshot.
//!
//! ```text
//! SELECTED -> BACKED_UP -> RESTORED
//!                       -> ROLLED_BACK
//!                       -> MANUAL_RECOVERY_NEEDED
//! ```
//!
//! The live file is copied to `<db>.backup` before anything destructive
//! happens. If the snapshot cannot be copied over the live file (or the
//! copy does not hash the same as the snapshot) the backup is copied back.
//! The backup file is only left behind when that rollback fails too.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

/// File copy primitives used by a restore.
pub trait FileOps {
    /// Copy `from` over `to`, keeping permissions and modification time.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// [`FileOps`] on the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        // fs::copy carries permissions; the mtime is set separately.
        fs::copy(from, to)?;
        let modified = fs::metadata(from)?.modified()?;
        File::options().write(true).open(to)?.set_modified(modified)?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// How a restore ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The live database now holds the snapshot.
    Restored,
    /// Copying the snapshot failed and the original database was put back.
    RolledBack { reason: String },
    /// Copying failed and so did the rollback. The backup file is kept.
    ManualRecoveryNeeded {
        backup_path: PathBuf,
        restore_error: String,
        rollback_error: String,
    },
}

/// Safety copy location: `<db>.backup` next to the live file.
#[must_use]
pub fn backup_path_for(db_path: &Path) -> PathBuf {
    let mut raw = db_path.as_os_str().to_os_string();
    raw.push(".backup");
    PathBuf::from(raw)
}

/// SHA-256 of a file's content, lowercase hex.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn verify_copy(snapshot: &Path, db_path: &Path) -> std::result::Result<(), String> {
    let expected = file_digest(snapshot).map_err(|e| format!("cannot hash snapshot: {e}"))?;
    let actual = file_digest(db_path).map_err(|e| format!("cannot hash restored database: {e}"))?;
    if expected == actual {
        Ok(())
    } else {
        Err("restored database does not match the snapshot".to_string())
    }
}

fn remove_backup<F: FileOps + ?Sized>(ops: &F, backup: &Path) {
    if let Err(e) = ops.remove(backup) {
        warn!(path = %backup.display(), error = %e, "Failed to remove temporary backup");
    }
}

/// Replace the database at `db_path` with the snapshot at `snapshot`.
///
/// The caller has already checked that the snapshot file exists.
///
/// # Errors
///
/// Returns [`Error::BackupInTheWay`] if a backup left by an earlier failed
/// restore still exists, and [`Error::RestoreAborted`] if the safety backup
/// cannot be made. Nothing has been changed in either case. Every later failure is reported
/// through the returned [`RestoreOutcome`].
pub fn restore_database<F: FileOps + ?Sized>(
    snapshot: &Path,
    db_path: &Path,
    ops: &F,
) -> Result<RestoreOutcome> {
    let backup = backup_path_for(db_path);

    // A leftover backup may be the only good copy; never overwrite it.
    if backup.exists() {
        return Err(Error::BackupInTheWay {
            backup_path: backup,
        });
    }

    ops.copy(db_path, &backup).map_err(|e| Error::RestoreAborted {
        backup_path: backup.clone(),
        reason: e.to_string(),
    })?;
    debug!(backup = %backup.display(), "Backed up live database");

    let copied = ops
        .copy(snapshot, db_path)
        .map_err(|e| e.to_string())
        .and_then(|()| verify_copy(snapshot, db_path));

    let Err(restore_error) = copied else {
        info!(snapshot = %snapshot.display(), "Database restored");
        remove_backup(ops, &backup);
        return Ok(RestoreOutcome::Restored);
    };

    warn!(error = %restore_error, "Restore failed, rolling back");
    match ops.copy(&backup, db_path) {
        Ok(()) => {
            info!("Rolled back to the original database");
            remove_backup(ops, &backup);
            Ok(RestoreOutcome::RolledBack {
                reason: restore_error,
            })
        }
        Err(e) => {
            error!(backup = %backup.display(), error = %e, "Rollback failed");
            Ok(RestoreOutcome::ManualRecoveryNeeded {
                backup_path: backup,
                restore_error,
                rollback_error: e.to_string(),
            })
        }
    }
}
