//! Terminal output helpers shared by the commands.

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;

/// Print a value as a single JSON line on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Section title.
pub fn title(text: &str) {
    println!("{}", text.cyan().bold());
    println!();
}

pub fn success(text: &str) {
    println!("{}", text.green());
}

pub fn warning(text: &str) {
    println!("{}", text.yellow());
}

/// Notice printed when the user backs out of a flow.
pub fn cancelled(what: &str) {
    println!("{what} cancelled.");
}

/// Shorten `text` to `max` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long prompt text", 10), "a very ...");
        assert_eq!(truncate("żółć żółć żółć", 8), "żółć ...");
    }
}
