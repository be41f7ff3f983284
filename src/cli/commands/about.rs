//! About command implementation.

use serde::Serialize;

use crate::cli::output;
use crate::cli::AboutArgs;
use crate::error::Result;

const README: &str = include_str!("../../../README.md");
const CHANGELOG: &str = include_str!("../../../CHANGELOG.md");

#[derive(Serialize)]
struct AboutOutput<'a> {
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    readme: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changelog: Option<&'a str>,
}

/// Execute the about command.
///
/// With no flag the README is shown.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &AboutArgs, json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let readme = args.readme || !(args.changelog || args.version);

    if json {
        return output::print_json(&AboutOutput {
            version,
            readme: readme.then_some(README),
            changelog: args.changelog.then_some(CHANGELOG),
        });
    }

    if args.version {
        println!("Invoke Presets CLI version: {version}");
    }
    if readme {
        println!("{README}");
    }
    if args.changelog {
        println!("{CHANGELOG}");
    }
    Ok(())
}
