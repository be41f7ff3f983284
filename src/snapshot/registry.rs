//! Snapshot registry (`snapshots.json`).
//!
//! The registry is an ordered JSON array, oldest first. It may drift from
//! the files on disk; readers tolerate that. A registry that is not valid
//! JSON is treated as empty rather than repaired.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::SnapshotRecord;
use crate::transfer::file::atomic_write;

/// File name of the registry inside the snapshots directory.
pub const REGISTRY_FILE: &str = "snapshots.json";

/// Handle on a registry file.
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Registry stored in `snapshots_dir/snapshots.json`.
    #[must_use]
    pub fn in_dir(snapshots_dir: &Path) -> Self {
        Self::new(snapshots_dir.join(REGISTRY_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures other than "not found".
    pub fn load(&self) -> Result<Vec<SnapshotRecord>> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot registry yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Vec<SnapshotRecord>>(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Snapshots file is corrupted. Starting with an empty list.");
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the registry with the full record list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, records: &[SnapshotRecord]) -> Result<()> {
        let mut json = serde_json::to_string_pretty(records)?;
        json.push('\n');
        atomic_write(&self.path, &json)?;
        debug!(path = %self.path.display(), count = records.len(), "Saved snapshot registry");
        Ok(())
    }
}

/// Find a record by name.
#[must_use]
pub fn find<'a>(records: &'a [SnapshotRecord], name: &str) -> Option<&'a SnapshotRecord> {
    records.iter().find(|r| r.name == name)
}

/// Remove a record by name, returning it if it was registered.
pub fn remove(records: &mut Vec<SnapshotRecord>, name: &str) -> Option<SnapshotRecord> {
    let index = records.iter().position(|r| r.name == name)?;
    Some(records.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str) -> SnapshotRecord {
        SnapshotRecord::new(
            name.to_string(),
            "2024-09-01 10:00:00".to_string(),
            PathBuf::from(format!("/snaps/{name}")),
        )
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::in_dir(dir.path());
        let records = vec![record("c.db"), record("a.db"), record("b.db")];

        registry.save(&records).unwrap();
        assert_eq!(registry.load().unwrap(), records);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::in_dir(dir.path());
        assert!(registry.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::in_dir(dir.path());
        std::fs::write(registry.path(), "[{\"name\": ").unwrap();

        assert!(registry.load().unwrap().is_empty());
        // No repair: the corrupted file stays as it was.
        assert_eq!(std::fs::read_to_string(registry.path()).unwrap(), "[{\"name\": ");
    }

    #[test]
    fn test_non_utf8_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::in_dir(dir.path());
        std::fs::write(registry.path(), [0xff, 0xfe, 0x00, 0x5b]).unwrap();

        assert!(registry.load().unwrap().is_empty());
    }

    #[test]
    fn test_find_and_remove() {
        let mut records = vec![record("a.db"), record("b.db")];
        assert!(find(&records, "b.db").is_some());
        assert!(find(&records, "z.db").is_none());

        assert!(remove(&mut records, "z.db").is_none());
        assert_eq!(records.len(), 2);

        let removed = remove(&mut records, "a.db").unwrap();
        assert_eq!(removed.name, "a.db");
        assert_eq!(records, [record("b.db")]);
    }
}
