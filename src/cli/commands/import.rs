//! Preset import.

use serde::Serialize;

use crate::cli::commands::Context;
use crate::cli::output;
use crate::cli::{ImportArgs, UpdateMode};
use crate::error::Result;
use crate::model::PresetType;
use crate::storage::{ImportCounts, PresetStore};
use crate::transfer::{normalize_document, ImportPlan, Skipped, Source, UpdatePolicy};

const SOURCE_CHOICES: [&str; 2] = ["Local File", "URL"];
const UPDATE_CHOICES: [&str; 3] = ["Update All", "Select Individually", "Skip Updates"];

#[derive(Serialize)]
struct ImportOutput<'a> {
    source: String,
    dry_run: bool,
    created: Vec<&'a str>,
    updated: Vec<&'a str>,
    declined: &'a [String],
    skipped: &'a [Skipped],
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    counts: Option<ImportCounts>,
}

fn choices(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn choose_source(args: &ImportArgs, ctx: &mut Context<'_>) -> Result<Option<Source>> {
    if let Some(path) = &args.file {
        return Ok(Some(Source::File(path.clone())));
    }
    if let Some(url) = &args.url {
        return Ok(Some(Source::Url(url.clone())));
    }
    match ctx.prompter.select("Select import source", &choices(&SOURCE_CHOICES))? {
        Some(index) => ctx.ask_location(index == 1),
        None => Ok(None),
    }
}

fn choose_policy(
    mode: Option<UpdateMode>,
    plan: &ImportPlan,
    ctx: &mut Context<'_>,
) -> Result<Option<UpdatePolicy>> {
    let mode = match mode {
        Some(mode) => mode,
        None => {
            let picked = ctx.prompter.select(
                "Some presets already exist. How would you like to proceed?",
                &choices(&UPDATE_CHOICES),
            )?;
            match picked {
                Some(0) => UpdateMode::All,
                Some(1) => UpdateMode::Select,
                Some(_) => UpdateMode::Skip,
                None => return Ok(None),
            }
        }
    };

    Ok(Some(match mode {
        UpdateMode::All => UpdatePolicy::All,
        UpdateMode::Skip => UpdatePolicy::Skip,
        UpdateMode::Select => {
            let names = plan.update_names();
            let Some(indices) = ctx.prompter.multi_select("Select presets to update", &names)? else {
                return Ok(None);
            };
            UpdatePolicy::Selected(indices.into_iter().map(|i| names[i].clone()).collect())
        }
    }))
}

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the document cannot be loaded or is not a list,
/// the safety snapshot fails, or the database write fails.
pub fn execute(args: &ImportArgs, ctx: &mut Context<'_>) -> Result<()> {
    let Some(source) = choose_source(args, ctx)? else {
        output::cancelled("Import");
        return Ok(());
    };

    let document = source.load()?;
    let force_type = args.project.then_some(PresetType::Project);
    let normalized = normalize_document(&document, force_type)?;

    if !ctx.json {
        for skipped in &normalized.skipped {
            output::warning(&format!(
                "Skipping invalid preset: {} ({})",
                skipped.name, skipped.reason
            ));
        }
    }

    let mut store = PresetStore::open(&ctx.settings.database_path())?;
    let plan = ImportPlan::build(normalized, &store.existing_names()?);
    let skipped = plan.skipped.clone();

    let policy = if plan.to_update.is_empty() {
        UpdatePolicy::Skip
    } else {
        match choose_policy(args.update, &plan, ctx)? {
            Some(policy) => policy,
            None => {
                output::cancelled("Import");
                return Ok(());
            }
        }
    };
    let resolved = plan.resolve(&policy);

    if resolved.is_empty() {
        output::warning("No valid presets to import or update.");
        return Ok(());
    }

    let mut report = ImportOutput {
        source: source.to_string(),
        dry_run: ctx.dry_run,
        created: resolved.create.iter().map(|d| d.name.as_str()).collect(),
        updated: resolved.update.iter().map(|d| d.name.as_str()).collect(),
        declined: &resolved.declined,
        skipped: &skipped,
        snapshot: None,
        counts: None,
    };

    if ctx.dry_run {
        if ctx.json {
            return output::print_json(&report);
        }
        println!(
            "Would create {} and update {} presets:",
            report.created.len(),
            report.updated.len()
        );
        for name in &report.created {
            println!("  + {name}");
        }
        for name in &report.updated {
            println!("  ~ {name}");
        }
        return Ok(());
    }

    let snapshot = ctx.safety_snapshot()?;
    let counts = store.apply_import(&resolved.create, &resolved.update)?;

    if ctx.json {
        report.snapshot = Some(snapshot.record.name);
        report.counts = Some(counts);
        return output::print_json(&report);
    }

    output::success(&format!(
        "Import complete. Created {} new presets and updated {} existing presets.",
        counts.created, counts.updated
    ));
    Ok(())
}
