//! Preset export.

use serde::Serialize;

use crate::cli::commands::Context;
use crate::cli::output;
use crate::cli::ExportArgs;
use crate::error::Result;
use crate::model::StylePreset;
use crate::storage::{PresetFilter, PresetStore};
use crate::transfer::{export_path, write_export};

#[derive(Serialize)]
struct ExportOutput {
    path: String,
    count: usize,
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the database cannot be read or the file cannot be
/// written.
pub fn execute(args: &ExportArgs, ctx: &mut Context<'_>) -> Result<()> {
    let store = PresetStore::open(&ctx.settings.database_path())?;
    let presets = store.list_presets(PresetFilter::All, None)?;

    if presets.is_empty() {
        output::warning("No presets found to export.");
        return Ok(());
    }

    let selected: Vec<&StylePreset> = if args.all {
        presets.iter().collect()
    } else {
        let labels: Vec<String> = presets.iter().map(StylePreset::choice_label).collect();
        match ctx.prompter.multi_select("Select presets to export", &labels)? {
            Some(indices) if !indices.is_empty() => indices.into_iter().map(|i| &presets[i]).collect(),
            _ => {
                output::cancelled("Export");
                return Ok(());
            }
        }
    };

    let name = match &args.output {
        Some(name) => name.clone(),
        None => match ctx
            .prompter
            .text("Enter the export filename (without extension)", None)?
            .filter(|n| !n.trim().is_empty())
        {
            Some(name) => name,
            None => {
                output::cancelled("Export");
                return Ok(());
            }
        },
    };
    let path = export_path(&name);

    let count = write_export(&path, &selected)?;

    if ctx.json {
        return output::print_json(&ExportOutput {
            path: path.display().to_string(),
            count,
        });
    }

    output::success(&format!(
        "Presets exported successfully to {} ({count} presets)",
        path.display()
    ));
    Ok(())
}
