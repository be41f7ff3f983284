//! Style preset model.
//!
//! A preset is a named positive/negative prompt pair tagged with the
//! kind of preset it is. InvokeAI stores the prompts as a JSON document
//! in the `preset_data` column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Who a preset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetType {
    /// Created by the user (the default for imports).
    User,
    /// Shipped by the InvokeAI team.
    Default,
    /// Shared presets bundled with a project.
    Project,
}

impl PresetType {
    /// Column value stored in `style_presets.type`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Default => "default",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for PresetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "default" => Ok(Self::Default),
            "project" => Ok(Self::Project),
            _ => Err(format!("Unknown preset type: {s}")),
        }
    }
}

/// The prompt pair stored in `preset_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetData {
    #[serde(default)]
    pub positive_prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
}

impl PresetData {
    #[must_use]
    pub fn new(positive_prompt: impl Into<String>, negative_prompt: impl Into<String>) -> Self {
        Self {
            positive_prompt: positive_prompt.into(),
            negative_prompt: negative_prompt.into(),
        }
    }

    /// Decode the `preset_data` column.
    ///
    /// Rows written by other tools are not always well formed. A column
    /// that is not a JSON object is surfaced verbatim as the positive
    /// prompt so listings never fail on one bad row.
    #[must_use]
    pub fn from_column(raw: &str) -> Self {
        match serde_json::from_str::<Self>(raw) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Unreadable preset_data column, showing raw text");
                Self::new(raw, "")
            }
        }
    }

    /// Encode for the `preset_data` column.
    #[must_use]
    pub fn to_column(&self) -> String {
        serde_json::json!({
            "positive_prompt": self.positive_prompt,
            "negative_prompt": self.negative_prompt,
        })
        .to_string()
    }
}

/// One row of the `style_presets` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreset {
    pub id: String,
    pub name: String,
    pub preset_data: PresetData,
    #[serde(rename = "type")]
    pub preset_type: PresetType,
    pub created_at: String,
    pub updated_at: String,
}

impl StylePreset {
    /// Label used in selection menus: `Name (ID: id)`.
    #[must_use]
    pub fn choice_label(&self) -> String {
        format!("{} (ID: {})", self.name, self.id)
    }
}

/// A preset that is about to be written: everything but the id and
/// timestamps, which the store assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetDraft {
    pub name: String,
    pub preset_type: PresetType,
    pub data: PresetData,
}

/// Current time in the format InvokeAI writes to `created_at`/`updated_at`.
#[must_use]
pub fn db_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_type_parsing() {
        assert_eq!("user".parse::<PresetType>(), Ok(PresetType::User));
        assert_eq!(" Project ".parse::<PresetType>(), Ok(PresetType::Project));
        assert!("admin".parse::<PresetType>().is_err());
        assert_eq!(PresetType::Default.to_string(), "default");
    }

    #[test]
    fn test_preset_data_column_roundtrip() {
        let data = PresetData::new("a castle, {prompt}", "blurry");
        let column = data.to_column();
        assert!(column.contains("\"positive_prompt\""));
        assert_eq!(PresetData::from_column(&column), data);
    }

    #[test]
    fn test_preset_data_from_malformed_column() {
        let data = PresetData::from_column("not json");
        assert_eq!(data.positive_prompt, "not json");
        assert_eq!(data.negative_prompt, "");
    }

    #[test]
    fn test_preset_data_missing_negative() {
        let data = PresetData::from_column(r#"{"positive_prompt":"sunset"}"#);
        assert_eq!(data.positive_prompt, "sunset");
        assert_eq!(data.negative_prompt, "");
    }

    #[test]
    fn test_serialized_type_field_name() {
        let preset = StylePreset {
            id: "1".to_string(),
            name: "Noir".to_string(),
            preset_data: PresetData::default(),
            preset_type: PresetType::Project,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let json = serde_json::to_value(&preset).unwrap();
        assert_eq!(json["type"], "project");
        assert_eq!(preset.choice_label(), "Noir (ID: 1)");
    }
}
