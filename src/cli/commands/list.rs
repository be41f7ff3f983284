//! Preset listing.

use colored::Colorize;
use serde::Serialize;

use crate::cli::commands::Context;
use crate::cli::output;
use crate::cli::ListArgs;
use crate::error::Result;
use crate::model::StylePreset;
use crate::storage::{Page, PresetFilter, PresetStore};

#[derive(Serialize)]
struct ListOutput<'a> {
    filter: &'a str,
    page: usize,
    pages: usize,
    total: usize,
    presets: &'a [StylePreset],
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub fn execute(args: &ListArgs, ctx: &Context<'_>) -> Result<()> {
    let filter = PresetFilter::from_flags(args.all, args.only_defaults, args.projects);
    let page = Page::new(args.page as usize, args.items_per_page as usize);

    let store = PresetStore::open(&ctx.settings.database_path())?;
    let total = store.count_presets(filter)?;
    let presets = store.list_presets(filter, Some(page))?;
    let pages = page.page_count(total);

    if ctx.json {
        return output::print_json(&ListOutput {
            filter: filter.label(),
            page: page.number,
            pages,
            total,
            presets: &presets,
        });
    }

    if total == 0 {
        match filter {
            PresetFilter::All => output::warning("No presets found"),
            _ => output::warning(&format!("No presets found for {}", filter.label())),
        }
        return Ok(());
    }

    if presets.is_empty() {
        output::warning(&format!(
            "Page {} is past the end, there are {pages} page(s).",
            page.number
        ));
        return Ok(());
    }

    output::title("Available presets");
    for preset in &presets {
        print_preset(preset, filter == PresetFilter::All);
    }
    println!(
        "{}",
        format!("Page {} of {pages} ({total} presets)", page.number).dimmed()
    );
    Ok(())
}

fn print_preset(preset: &StylePreset, show_type: bool) {
    let kind = if show_type {
        format!(" [{}]", preset.preset_type)
    } else {
        String::new()
    };
    println!("{}{}  {}", preset.name.bold(), kind.dimmed(), preset.id.yellow());
    println!(
        "  {} {}",
        "Positive Prompt:".blue(),
        output::truncate(&preset.preset_data.positive_prompt, 100)
    );
    println!(
        "  {} {}",
        "Negative Prompt:".yellow(),
        output::truncate(&preset.preset_data.negative_prompt, 100)
    );
    println!();
}
