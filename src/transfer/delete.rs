//! Bulk delete planning from a list of preset names.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::StylePreset;

/// Presets matched by name, plus the names that matched nothing.
#[derive(Debug, Default, Serialize)]
pub struct DeletePlan {
    pub matched: Vec<StylePreset>,
    pub unmatched: Vec<String>,
}

/// Read a names document: a JSON array of strings.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] for any other shape.
pub fn parse_name_list(doc: &Value) -> Result<Vec<String>> {
    let invalid = || Error::InvalidDocument("Expected a list of preset names".to_string());
    doc.as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// Match requested names against the stored presets.
///
/// Every preset carrying a requested name is matched. Names are compared
/// exactly.
#[must_use]
pub fn plan_deletion(presets: &[StylePreset], names: &[String]) -> DeletePlan {
    let matched = presets
        .iter()
        .filter(|p| names.contains(&p.name))
        .cloned()
        .collect::<Vec<_>>();

    let mut unmatched = Vec::new();
    for name in names {
        if !matched.iter().any(|p| &p.name == name) && !unmatched.contains(name) {
            unmatched.push(name.clone());
        }
    }

    DeletePlan { matched, unmatched }
}
