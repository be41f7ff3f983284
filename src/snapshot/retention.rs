//! Snapshot retention.

use crate::model::SnapshotRecord;

/// Evict the oldest records until at most `max_snapshots` remain.
///
/// Returns the evicted records, oldest first. Their files are the
/// caller's to delete, after the shortened registry is persisted.
pub fn apply_retention(
    records: &mut Vec<SnapshotRecord>,
    max_snapshots: usize,
) -> Vec<SnapshotRecord> {
    let max = max_snapshots.max(1);
    let excess = records.len().saturating_sub(max);
    records.drain(..excess).collect()
}
