//! Database snapshot command implementations.

use colored::Colorize;
use serde::Serialize;

use crate::cli::commands::Context;
use crate::cli::output;
use crate::cli::DatabaseCommands;
use crate::error::{Error, Result};
use crate::model::SnapshotRecord;
use crate::snapshot::RestoreOutcome;

/// One row of `list-snapshots --json`.
#[derive(Serialize)]
struct SnapshotEntry {
    name: String,
    timestamp: String,
    path: String,
    exists: bool,
}

#[derive(Serialize)]
struct SnapshotListOutput {
    snapshots: Vec<SnapshotEntry>,
    count: usize,
    max_snapshots: usize,
}

#[derive(Serialize)]
struct RestoreOutput<'a> {
    restored: &'a str,
}

/// Execute database commands.
///
/// # Errors
///
/// Returns an error if the snapshot operation fails.
pub fn execute(command: &DatabaseCommands, ctx: &mut Context<'_>) -> Result<()> {
    match command {
        DatabaseCommands::CreateSnapshot => create(ctx),
        DatabaseCommands::ListSnapshots => list(ctx),
        DatabaseCommands::DeleteSnapshot { names } => delete(names, ctx),
        DatabaseCommands::RestoreSnapshot { name } => restore(name.as_deref(), ctx),
    }
}

fn create(ctx: &Context<'_>) -> Result<()> {
    let created = ctx.snapshots().create_snapshot()?;

    if ctx.json {
        return output::print_json(&created);
    }

    output::success(&format!("Snapshot created: {}", created.record.name));
    for old in &created.evicted {
        println!("{}", format!("Removed old snapshot: {}", old.name).dimmed());
    }
    Ok(())
}

fn list(ctx: &Context<'_>) -> Result<()> {
    let manager = ctx.snapshots();
    let records = manager.list()?;

    if ctx.json {
        let snapshots: Vec<SnapshotEntry> = records
            .iter()
            .map(|r| {
                let path = manager.path_of(r);
                SnapshotEntry {
                    name: r.name.clone(),
                    timestamp: r.timestamp.clone(),
                    exists: path.is_file(),
                    path: path.display().to_string(),
                }
            })
            .collect();
        return output::print_json(&SnapshotListOutput {
            count: snapshots.len(),
            snapshots,
            max_snapshots: manager.max_snapshots(),
        });
    }

    if records.is_empty() {
        output::warning("No snapshots found.");
        return Ok(());
    }

    output::title("Database Snapshots");
    let width = records.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4);
    println!("  {:<width$}  {}", "Name".bold(), "Timestamp".bold());
    for record in &records {
        let missing = if manager.path_of(record).is_file() {
            String::new()
        } else {
            format!("  {}", "[file missing]".red())
        };
        println!(
            "  {:<width$}  {}{missing}",
            record.name.yellow(),
            record.timestamp
        );
    }
    println!();
    println!(
        "{}",
        format!("{} of {} snapshots kept", records.len(), manager.max_snapshots()).dimmed()
    );
    Ok(())
}

fn choose_snapshots(ctx: &mut Context<'_>, records: &[SnapshotRecord]) -> Result<Option<Vec<String>>> {
    let labels: Vec<String> = records.iter().map(SnapshotRecord::choice_label).collect();
    let picked = ctx
        .prompter
        .multi_select("Select snapshots to delete", &labels)?;
    Ok(picked.map(|indices| {
        indices
            .into_iter()
            .map(|i| records[i].name.clone())
            .collect()
    }))
}

fn delete(names: &[String], ctx: &mut Context<'_>) -> Result<()> {
    let manager = ctx.snapshots();

    let names = if names.is_empty() {
        let records = manager.list()?;
        if records.is_empty() {
            output::warning("No snapshots found.");
            return Ok(());
        }
        let Some(chosen) = choose_snapshots(ctx, &records)? else {
            output::cancelled("Deletion");
            return Ok(());
        };
        if chosen.is_empty() {
            println!("No snapshots selected.");
            return Ok(());
        }
        chosen
    } else {
        names.to_vec()
    };

    let question = format!(
        "Delete {} snapshot(s): {}?",
        names.len(),
        names.join(", ")
    );
    if !ctx.confirm(&question)? {
        output::cancelled("Deletion");
        return Ok(());
    }

    let outcome = manager.delete_snapshots(&names)?;

    if ctx.json {
        return output::print_json(&outcome);
    }

    for record in &outcome.deleted {
        output::success(&format!("Deleted snapshot: {}", record.name));
    }
    for name in &outcome.not_found {
        output::warning(&format!("Snapshot not found: {name}"));
    }
    Ok(())
}

fn restore(name: Option<&str>, ctx: &mut Context<'_>) -> Result<()> {
    let manager = ctx.snapshots();

    let name = match name {
        Some(name) => name.to_string(),
        None => {
            let records = manager.list()?;
            if records.is_empty() {
                output::warning("No snapshots found.");
                return Ok(());
            }
            let labels: Vec<String> = records.iter().map(SnapshotRecord::choice_label).collect();
            let Some(index) = ctx.prompter.select("Select a snapshot to restore", &labels)? else {
                output::cancelled("Restore");
                return Ok(());
            };
            records[index].name.clone()
        }
    };

    let question = format!(
        "Restore the database from '{name}'? The current database will be replaced."
    );
    if !ctx.confirm(&question)? {
        output::cancelled("Restore");
        return Ok(());
    }

    match manager.restore_snapshot(&name)? {
        RestoreOutcome::Restored => {
            if ctx.json {
                output::print_json(&RestoreOutput { restored: &name })
            } else {
                output::success(&format!("Database restored from snapshot: {name}"));
                Ok(())
            }
        }
        RestoreOutcome::RolledBack { reason } => Err(Error::RestoreRolledBack { name, reason }),
        RestoreOutcome::ManualRecoveryNeeded {
            backup_path,
            restore_error,
            rollback_error,
        } => Err(Error::ManualRecoveryRequired {
            backup_path,
            restore_error,
            rollback_error,
        }),
    }
}
