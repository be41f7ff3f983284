//! Import normalization and planning.
//!
//! Preset documents come in two shapes:
//!
//! ```json
//! [{"name": "Anime", "type": "user", "preset_data": {"positive_prompt": "...", "negative_prompt": "..."}}]
//! [{"name": "Anime", "prompt": "...", "negative_prompt": "..."}]
//! ```
//!
//! Both are normalized once into [`PresetDraft`]s here (`prompt` is an
//! alias of `positive_prompt`). Planning is pure: it only needs the set of
//! names already in the database, so it can be tested without a terminal
//! or a database.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{PresetData, PresetDraft, PresetType};

/// An entry that was not imported, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub name: String,
    pub reason: String,
}

impl Skipped {
    fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result of normalizing a whole document.
#[derive(Debug, Default)]
pub struct NormalizedImport {
    pub drafts: Vec<PresetDraft>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Deserialize)]
struct NestedData {
    #[serde(default, alias = "prompt")]
    positive_prompt: Option<String>,
    #[serde(default)]
    negative_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: Option<String>,
    #[serde(rename = "type")]
    preset_type: Option<String>,
    preset_data: Option<Value>,
    #[serde(alias = "prompt")]
    positive_prompt: Option<String>,
    negative_prompt: Option<String>,
}

/// Best-effort name for messages about an entry that failed to parse.
fn entry_name(entry: &Value) -> String {
    entry
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

/// Normalize one document entry.
///
/// `force_type` (set by `import --project`) overrides the entry's own type.
///
/// # Errors
///
/// Returns the [`Skipped`] reason when the entry is not a usable preset.
pub fn normalize_entry(
    entry: &Value,
    force_type: Option<PresetType>,
) -> std::result::Result<PresetDraft, Skipped> {
    let display = entry_name(entry);
    let raw: RawEntry = serde_json::from_value(entry.clone())
        .map_err(|e| Skipped::new(&display, format!("malformed entry: {e}")))?;

    let name = raw
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Skipped::new(&display, "missing name"))?;

    let data = match raw.preset_data {
        Some(nested @ Value::Object(_)) => {
            let nested: NestedData = serde_json::from_value(nested)
                .map_err(|e| Skipped::new(&name, format!("malformed preset_data: {e}")))?;
            PresetData::new(
                nested.positive_prompt.unwrap_or_default(),
                nested.negative_prompt.unwrap_or_default(),
            )
        }
        Some(_) => return Err(Skipped::new(&name, "preset_data is not an object")),
        None => {
            let positive = raw
                .positive_prompt
                .ok_or_else(|| Skipped::new(&name, "missing prompt"))?;
            PresetData::new(positive, raw.negative_prompt.unwrap_or_default())
        }
    };

    let preset_type = match (force_type, raw.preset_type) {
        (Some(forced), _) => forced,
        (None, Some(t)) => t
            .parse::<PresetType>()
            .map_err(|e| Skipped::new(&name, e))?,
        (None, None) => PresetType::User,
    };

    Ok(PresetDraft {
        name,
        preset_type,
        data,
    })
}

/// Normalize an import document.
///
/// Invalid entries are skipped (and logged), as are later entries that
/// repeat a name already seen in the same document.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] if the document is not a JSON array.
pub fn normalize_document(doc: &Value, force_type: Option<PresetType>) -> Result<NormalizedImport> {
    let entries = doc.as_array().ok_or_else(|| {
        Error::InvalidDocument("Invalid JSON format. Expected a list of presets.".to_string())
    })?;

    let mut out = NormalizedImport::default();
    let mut seen = HashSet::new();

    for entry in entries {
        match normalize_entry(entry, force_type) {
            Ok(draft) => {
                if seen.insert(draft.name.clone()) {
                    out.drafts.push(draft);
                } else {
                    warn!(name = %draft.name, "Duplicate preset in document, keeping the first");
                    out.skipped
                        .push(Skipped::new(draft.name, "duplicate name in document"));
                }
            }
            Err(skipped) => {
                warn!(name = %skipped.name, reason = %skipped.reason, "Skipping invalid preset");
                out.skipped.push(skipped);
            }
        }
    }

    debug!(valid = out.drafts.len(), skipped = out.skipped.len(), "Normalized import document");
    Ok(out)
}

/// How to treat presets whose name already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Overwrite every existing preset.
    All,
    /// Overwrite only the named presets.
    Selected(Vec<String>),
    /// Leave existing presets alone.
    Skip,
}

/// Import split by whether each preset already exists.
#[derive(Debug, Default)]
pub struct ImportPlan {
    pub to_create: Vec<PresetDraft>,
    pub to_update: Vec<PresetDraft>,
    pub skipped: Vec<Skipped>,
}

/// Final set of writes after the update policy is applied.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResolvedImport {
    pub create: Vec<PresetDraft>,
    pub update: Vec<PresetDraft>,
    /// Existing presets the policy chose not to overwrite.
    pub declined: Vec<String>,
}

impl ResolvedImport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty()
    }
}

impl ImportPlan {
    /// Partition normalized presets against the names already stored.
    #[must_use]
    pub fn build(normalized: NormalizedImport, existing: &HashSet<String>) -> Self {
        let (to_update, to_create) = normalized
            .drafts
            .into_iter()
            .partition(|d| existing.contains(&d.name));

        Self {
            to_create,
            to_update,
            skipped: normalized.skipped,
        }
    }

    /// Names of presets that would overwrite an existing one.
    #[must_use]
    pub fn update_names(&self) -> Vec<String> {
        self.to_update.iter().map(|d| d.name.clone()).collect()
    }

    /// Apply the update policy.
    #[must_use]
    pub fn resolve(self, policy: &UpdatePolicy) -> ResolvedImport {
        let (update, declined): (Vec<_>, Vec<_>) = match policy {
            UpdatePolicy::All => (self.to_update, Vec::new()),
            UpdatePolicy::Skip => (Vec::new(), self.to_update),
            UpdatePolicy::Selected(names) => self
                .to_update
                .into_iter()
                .partition(|d| names.contains(&d.name)),
        };

        ResolvedImport {
            create: self.to_create,
            update,
            declined: declined.into_iter().map(|d| d.name).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_shape_with_prompt_alias() {
        let draft = normalize_entry(&json!({"name": "Anime", "prompt": "anime {prompt}"}), None).unwrap();
        assert_eq!(draft.name, "Anime");
        assert_eq!(draft.preset_type, PresetType::User);
        assert_eq!(draft.data, PresetData::new("anime {prompt}", ""));
    }

    #[test]
    fn test_nested_shape_with_prompt_alias() {
        let draft = normalize_entry(
            &json!({"name": "Noir", "type": "default", "preset_data": {"prompt": "noir", "negative_prompt": "color"}}),
            None,
        )
        .unwrap();
        assert_eq!(draft.preset_type, PresetType::Default);
        assert_eq!(draft.data, PresetData::new("noir", "color"));
    }

    #[test]
    fn test_nested_shape_defaults_missing_prompts() {
        let draft = normalize_entry(&json!({"name": "Empty", "preset_data": {}}), None).unwrap();
        assert_eq!(draft.data, PresetData::default());
    }

    #[test]
    fn test_force_project_type() {
        let draft = normalize_entry(
            &json!({"name": "Blueprint", "type": "user", "positive_prompt": "blueprint"}),
            Some(PresetType::Project),
        )
        .unwrap();
        assert_eq!(draft.preset_type, PresetType::Project);
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let missing_name = normalize_entry(&json!({"prompt": "x"}), None).unwrap_err();
        assert_eq!(missing_name.name, "Unknown");

        let missing_prompt = normalize_entry(&json!({"name": "Bare"}), None).unwrap_err();
        assert_eq!(missing_prompt.name, "Bare");
        assert_eq!(missing_prompt.reason, "missing prompt");

        let bad_data = normalize_entry(&json!({"name": "Str", "preset_data": "x"}), None).unwrap_err();
        assert_eq!(bad_data.reason, "preset_data is not an object");

        let bad_type = normalize_entry(&json!({"name": "T", "type": "admin", "prompt": "x"}), None).unwrap_err();
        assert!(bad_type.reason.contains("admin"));

        assert!(normalize_entry(&json!("just a string"), None).is_err());
    }

    #[test]
    fn test_document_must_be_list() {
        let result = normalize_document(&json!({"name": "Anime"}), None);
        assert!(matches!(result, Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_document_duplicates_keep_first() {
        let doc = json!([
            {"name": "Anime", "prompt": "first"},
            {"name": "Anime", "prompt": "second"},
            {"bogus": true}
        ]);
        let normalized = normalize_document(&doc, None).unwrap();
        assert_eq!(normalized.drafts.len(), 1);
        assert_eq!(normalized.drafts[0].data.positive_prompt, "first");
        assert_eq!(normalized.skipped.len(), 2);
    }

    fn plan() -> ImportPlan {
        let doc = json!([
            {"name": "Anime", "prompt": "a"},
            {"name": "Noir", "prompt": "b"},
            {"name": "Pixel", "prompt": "c"}
        ]);
        let existing: HashSet<String> = ["Anime".to_string(), "Noir".to_string()].into();
        ImportPlan::build(normalize_document(&doc, None).unwrap(), &existing)
    }

    #[test]
    fn test_plan_partitions_by_existing_names() {
        let plan = plan();
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].name, "Pixel");
        assert_eq!(plan.update_names(), ["Anime", "Noir"]);
    }

    #[test]
    fn test_resolve_policies() {
        let all = plan().resolve(&UpdatePolicy::All);
        assert_eq!(all.update.len(), 2);
        assert!(all.declined.is_empty());

        let skip = plan().resolve(&UpdatePolicy::Skip);
        assert!(skip.update.is_empty());
        assert_eq!(skip.declined, ["Anime", "Noir"]);
        assert_eq!(skip.create.len(), 1);

        let selected = plan().resolve(&UpdatePolicy::Selected(vec!["Noir".to_string()]));
        assert_eq!(selected.update.len(), 1);
        assert_eq!(selected.update[0].name, "Noir");
        assert_eq!(selected.declined, ["Anime"]);
    }

    #[test]
    fn test_resolved_empty() {
        let doc = json!([{"name": "Anime", "prompt": "a"}]);
        let existing: HashSet<String> = ["Anime".to_string()].into();
        let resolved = ImportPlan::build(normalize_document(&doc, None).unwrap(), &existing)
            .resolve(&UpdatePolicy::Skip);
        assert!(resolved.is_empty());
    }
}
