//! Export document shaping.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::model::{PresetData, PresetType, StylePreset};
use crate::transfer::file::atomic_write;

/// One element of an export document.
///
/// Ids and timestamps are left out so the document can be imported into
/// another install.
#[derive(Debug, Serialize)]
pub struct ExportEntry<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub preset_type: PresetType,
    pub preset_data: &'a PresetData,
}

impl<'a> From<&'a StylePreset> for ExportEntry<'a> {
    fn from(preset: &'a StylePreset) -> Self {
        Self {
            name: &preset.name,
            preset_type: preset.preset_type,
            preset_data: &preset.preset_data,
        }
    }
}

/// Render presets as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_document<'a, I>(presets: I) -> Result<String>
where
    I: IntoIterator<Item = &'a StylePreset>,
{
    let entries: Vec<ExportEntry<'_>> = presets.into_iter().map(ExportEntry::from).collect();
    let mut out = serde_json::to_string_pretty(&entries)?;
    out.push('\n');
    Ok(out)
}

/// Resolve the export destination, adding `.json` when the name has no
/// such extension.
#[must_use]
pub fn export_path(name: &str) -> PathBuf {
    let path = PathBuf::from(name.trim());
    let has_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if has_json {
        path
    } else {
        let mut raw = path.into_os_string();
        raw.push(".json");
        PathBuf::from(raw)
    }
}

/// Write the export document and return how many presets it holds.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_export(path: &Path, presets: &[&StylePreset]) -> Result<usize> {
    let document = export_document(presets.iter().copied())?;
    atomic_write(path, &document)?;
    Ok(presets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::import::normalize_document;
    use tempfile::TempDir;

    fn preset(name: &str, preset_type: PresetType) -> StylePreset {
        StylePreset {
            id: format!("id-{name}"),
            name: name.to_string(),
            preset_data: PresetData::new(format!("{name} style, {{prompt}}"), "lowres"),
            preset_type,
            created_at: "2024-01-01 00:00:00.000".to_string(),
            updated_at: "2024-01-01 00:00:00.000".to_string(),
        }
    }

    #[test]
    fn test_export_shape() {
        let anime = preset("Anime", PresetType::User);
        let document = export_document([&anime]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();

        let entry = &value[0];
        assert_eq!(entry["name"], "Anime");
        assert_eq!(entry["type"], "user");
        assert_eq!(entry["preset_data"]["negative_prompt"], "lowres");
        assert!(entry.get("id").is_none());
        assert!(document.contains("\n  {"));
    }

    #[test]
    fn test_export_is_importable() {
        let presets = [preset("Anime", PresetType::User), preset("Blueprint", PresetType::Project)];
        let document = export_document(&presets).unwrap();
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();

        let normalized = normalize_document(&value, None).unwrap();
        assert!(normalized.skipped.is_empty());
        assert_eq!(normalized.drafts[1].preset_type, PresetType::Project);
        assert_eq!(normalized.drafts[0].data, presets[0].preset_data);
    }

    #[test]
    fn test_export_path_extension() {
        assert_eq!(export_path("my_presets"), PathBuf::from("my_presets.json"));
        assert_eq!(export_path("my_presets.json"), PathBuf::from("my_presets.json"));
        assert_eq!(export_path("backup.v2"), PathBuf::from("backup.v2.json"));
    }

    #[test]
    fn test_write_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let anime = preset("Anime", PresetType::User);

        let count = write_export(&path, &[&anime]).unwrap();
        assert_eq!(count, 1);
        assert!(std::fs::read_to_string(&path).unwrap().contains("Anime"));
    }
}
