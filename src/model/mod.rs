//! Data models.
//!
//! - StylePreset (rows of InvokeAI's `style_presets` table)
//! - SnapshotRecord (entries of the snapshot registry)

pub mod preset;
pub mod snapshot;

pub use preset::{db_timestamp, PresetData, PresetDraft, PresetType, StylePreset};
pub use snapshot::SnapshotRecord;
