//! Snapshot registry record.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One entry of `snapshots.json`.
///
/// Older registries only stored `name` and `timestamp`; the file path is
/// then derived from the snapshots directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// File name, `<label>_<YYYY-MM-DD HH-MM-SS>.db`.
    pub name: String,
    /// Creation time, `YYYY-MM-DD HH:MM:SS` (local).
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl SnapshotRecord {
    #[must_use]
    pub fn new(name: String, timestamp: String, path: PathBuf) -> Self {
        Self {
            name,
            timestamp,
            path: Some(path),
        }
    }

    /// Where the snapshot file lives.
    #[must_use]
    pub fn resolve_path(&self, snapshots_dir: &Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| snapshots_dir.join(&self.name))
    }

    /// Label used in selection menus: `name (timestamp)`.
    #[must_use]
    pub fn choice_label(&self) -> String {
        format!("{} ({})", self.name, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_without_path() {
        let record: SnapshotRecord = serde_json::from_str(
            r#"{"name":"brave-otter_2024-09-01 10-00-00.db","timestamp":"2024-09-01 10:00:00"}"#,
        )
        .unwrap();
        assert!(record.path.is_none());
        assert_eq!(
            record.resolve_path(Path::new("/snaps")),
            PathBuf::from("/snaps/brave-otter_2024-09-01 10-00-00.db")
        );
    }

    #[test]
    fn test_explicit_path_wins() {
        let record = SnapshotRecord::new(
            "a.db".to_string(),
            "2024-09-01 10:00:00".to_string(),
            PathBuf::from("/elsewhere/a.db"),
        );
        assert_eq!(
            record.resolve_path(Path::new("/snaps")),
            PathBuf::from("/elsewhere/a.db")
        );
        assert_eq!(record.choice_label(), "a.db (2024-09-01 10:00:00)");
    }
}
