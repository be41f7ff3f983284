//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Overrides;

pub mod commands;
pub mod output;

/// Manage InvokeAI style presets and snapshots of the InvokeAI database
#[derive(Parser, Debug)]
#[command(name = "invoke-presets", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/invoke-presets/config.json)
    #[arg(long, global = true, env = "INVOKE_PRESETS_CONFIG")]
    pub config: Option<PathBuf>,

    /// InvokeAI install directory
    #[arg(long, global = true, env = "INVOKE_AI_DIR")]
    pub invoke_dir: Option<PathBuf>,

    /// Maximum number of snapshots to keep
    #[arg(long, global = true, env = "SNAPSHOTS", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_snapshots: Option<u32>,

    /// Snapshots directory (default: ~/.invoke-presets/snapshots)
    #[arg(long, global = true, env = "INVOKE_PRESETS_SNAPSHOTS_DIR")]
    pub snapshots_dir: Option<PathBuf>,

    /// Answer yes to confirmations
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Show what import/delete would do without writing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Configuration values given on the command line or through env.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            invoke_dir: self.invoke_dir.clone(),
            max_snapshots: self.max_snapshots.map(|n| n as usize),
            snapshots_dir: self.snapshots_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Database snapshot management
    Database {
        #[command(subcommand)]
        command: DatabaseCommands,
    },

    /// List style presets
    List(ListArgs),

    /// Import presets from a JSON file or URL
    Import(ImportArgs),

    /// Export presets to a JSON file
    Export(ExportArgs),

    /// Delete presets
    Delete(DeleteArgs),

    /// Show the README, changelog or version
    About(AboutArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Database Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum DatabaseCommands {
    /// Snapshot the InvokeAI database
    CreateSnapshot,

    /// List snapshots
    ListSnapshots,

    /// Delete snapshots
    DeleteSnapshot {
        /// Snapshot names (interactive selection if omitted)
        names: Vec<String>,
    },

    /// Restore the database from a snapshot
    RestoreSnapshot {
        /// Snapshot name (interactive selection if omitted)
        name: Option<String>,
    },
}

// ============================================================================
// Preset Commands
// ============================================================================

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show presets of every type
    #[arg(long, conflicts_with_all = ["only_defaults", "projects"])]
    pub all: bool,

    /// Show only InvokeAI's default presets
    #[arg(long, conflicts_with = "projects")]
    pub only_defaults: bool,

    /// Show only project presets
    #[arg(long)]
    pub projects: bool,

    /// Page to show
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Presets per page
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub items_per_page: u32,
}

/// What to do with presets that already exist.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// Update every existing preset
    All,
    /// Choose which existing presets to update
    Select,
    /// Leave existing presets alone
    Skip,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Import as project presets
    #[arg(short, long)]
    pub project: bool,

    /// Read presets from a local JSON file
    #[arg(long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Fetch presets from a URL
    #[arg(long)]
    pub url: Option<String>,

    /// How to handle presets that already exist (asks if omitted)
    #[arg(long, value_enum)]
    pub update: Option<UpdateMode>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (`.json` is added if missing)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Export every preset without asking
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Delete the presets named in a local JSON file
    #[arg(long, conflicts_with = "from_url")]
    pub from_file: Option<PathBuf>,

    /// Delete the presets named in a JSON document at a URL
    #[arg(long)]
    pub from_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct AboutArgs {
    /// Show the README
    #[arg(short, long)]
    pub readme: bool,

    /// Show the changelog
    #[arg(short, long)]
    pub changelog: bool,

    /// Show the version
    #[arg(long)]
    pub version: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_flags_conflict() {
        let result = Cli::try_parse_from(["invoke-presets", "list", "--all", "--projects"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_page_must_be_positive() {
        assert!(Cli::try_parse_from(["invoke-presets", "list", "--page", "0"]).is_err());
        let cli = Cli::try_parse_from(["invoke-presets", "list", "--page", "2"]).unwrap();
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.page, 2);
        assert_eq!(args.items_per_page, 10);
    }

    #[test]
    fn test_import_update_mode() {
        let cli = Cli::try_parse_from([
            "invoke-presets",
            "import",
            "--file",
            "presets.json",
            "--update",
            "skip",
        ])
        .unwrap();
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.update, Some(UpdateMode::Skip));
        assert!(!args.project);
    }

    #[test]
    fn test_delete_snapshot_names() {
        let cli = Cli::try_parse_from([
            "invoke-presets",
            "database",
            "delete-snapshot",
            "a.db",
            "b.db",
        ])
        .unwrap();
        let Commands::Database {
            command: DatabaseCommands::DeleteSnapshot { names },
        } = cli.command
        else {
            panic!("expected delete-snapshot");
        };
        assert_eq!(names, ["a.db", "b.db"]);
    }
}
