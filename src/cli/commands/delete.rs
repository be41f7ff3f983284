//! Preset deletion.

use serde::Serialize;

use crate::cli::commands::Context;
use crate::cli::output;
use crate::cli::DeleteArgs;
use crate::error::Result;
use crate::model::StylePreset;
use crate::storage::{PresetFilter, PresetStore};
use crate::transfer::{parse_name_list, plan_deletion, Source};

const SOURCE_CHOICES: [&str; 3] = ["Select from list", "Import from file", "Import from URL"];

#[derive(Serialize)]
struct DeleteOutput<'a> {
    dry_run: bool,
    deleted: Vec<&'a str>,
    not_found: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<String>,
}

/// Where the presets to delete come from.
enum Origin {
    List,
    Document(Source),
}

fn choose_origin(args: &DeleteArgs, ctx: &mut Context<'_>) -> Result<Option<Origin>> {
    if let Some(path) = &args.from_file {
        return Ok(Some(Origin::Document(Source::File(path.clone()))));
    }
    if let Some(url) = &args.from_url {
        return Ok(Some(Origin::Document(Source::Url(url.clone()))));
    }

    let labels: Vec<String> = SOURCE_CHOICES.iter().map(ToString::to_string).collect();
    Ok(match ctx.prompter.select("Select delete source", &labels)? {
        None => None,
        Some(0) => Some(Origin::List),
        Some(index) => ctx.ask_location(index == 2)?.map(Origin::Document),
    })
}

/// Execute the delete command.
///
/// # Errors
///
/// Returns an error if the names document cannot be loaded or is not a
/// list of names, the safety snapshot fails, or the deletion fails.
pub fn execute(args: &DeleteArgs, ctx: &mut Context<'_>) -> Result<()> {
    let mut store = PresetStore::open(&ctx.settings.database_path())?;
    let presets = store.list_presets(PresetFilter::All, None)?;

    let Some(origin) = choose_origin(args, ctx)? else {
        output::cancelled("Deletion");
        return Ok(());
    };

    let (targets, not_found): (Vec<StylePreset>, Vec<String>) = match origin {
        Origin::List => {
            let labels: Vec<String> = presets.iter().map(StylePreset::choice_label).collect();
            match ctx.prompter.multi_select("Select presets to delete", &labels)? {
                Some(indices) if !indices.is_empty() => (
                    indices.into_iter().map(|i| presets[i].clone()).collect(),
                    Vec::new(),
                ),
                Some(_) => {
                    println!("No presets selected for deletion.");
                    return Ok(());
                }
                None => {
                    output::cancelled("Deletion");
                    return Ok(());
                }
            }
        }
        Origin::Document(source) => {
            let names = parse_name_list(&source.load()?)?;
            let plan = plan_deletion(&presets, &names);
            (plan.matched, plan.unmatched)
        }
    };

    if !ctx.json {
        for name in &not_found {
            output::warning(&format!("Preset not found: {name}"));
        }
    }

    if targets.is_empty() {
        output::warning("No presets found to delete.");
        return Ok(());
    }

    let names: Vec<&str> = targets.iter().map(|p| p.name.as_str()).collect();
    let mut report = DeleteOutput {
        dry_run: ctx.dry_run,
        deleted: names.clone(),
        not_found: &not_found,
        snapshot: None,
    };

    if ctx.dry_run {
        if ctx.json {
            return output::print_json(&report);
        }
        println!("Would delete {} presets:", names.len());
        for name in &names {
            println!("  - {name}");
        }
        return Ok(());
    }

    let question = format!(
        "Are you sure you want to delete the following presets: {}? This action is irreversible.",
        names.join(", ")
    );
    if !ctx.confirm(&question)? {
        output::cancelled("Deletion");
        return Ok(());
    }

    let snapshot = ctx.safety_snapshot()?;
    let ids: Vec<String> = targets.iter().map(|p| p.id.clone()).collect();
    let deleted = store.delete_presets(&ids)?;

    if ctx.json {
        report.snapshot = Some(snapshot.record.name);
        return output::print_json(&report);
    }

    output::success(&format!("Successfully deleted {deleted} presets."));
    Ok(())
}
