//! Invoke Presets CLI entry point.

use clap::Parser;
use presets::cli::commands::{self, Context};
use presets::cli::{Cli, Commands};
use presets::config::load_settings;
use presets::error::Error;
use presets::prompt::TerminalPrompter;
use std::io::IsTerminal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Run the command and handle errors
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info,reqwest=info,hyper=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    // Commands that need no configuration
    match &cli.command {
        Commands::About(args) => return commands::about::execute(args, cli.json),
        Commands::Completions { shell } => return commands::completions::execute(shell),
        _ => {}
    }

    let mut prompter = TerminalPrompter::stdio();
    let settings = load_settings(&cli.overrides(), &mut prompter)?;
    let mut ctx = Context {
        settings: &settings,
        prompter: &mut prompter,
        json: cli.json,
        yes: cli.yes,
        dry_run: cli.dry_run,
    };

    match &cli.command {
        Commands::Database { command } => commands::database::execute(command, &mut ctx),
        Commands::List(args) => commands::list::execute(args, &ctx),
        Commands::Import(args) => commands::import::execute(args, &mut ctx),
        Commands::Export(args) => commands::export::execute(args, &mut ctx),
        Commands::Delete(args) => commands::delete::execute(args, &mut ctx),
        Commands::About(_) | Commands::Completions { .. } => Ok(()),
    }
}
