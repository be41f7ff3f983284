//! Line-oriented interactive prompts.
//!
//! Commands ask questions through the [`Prompter`] trait so their flows can
//! be driven from tests with scripted input. [`TerminalPrompter`] reads
//! answers line by line and writes questions to any writer (stderr in the
//! binary, keeping stdout clean for `--json`).
//!
//! Every method returns `Ok(None)` when input ends (Ctrl-D), which callers
//! treat as cancellation.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Interactive questions used by the commands.
pub trait Prompter {
    /// Pick one of `choices`. Returns the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    fn select(&mut self, message: &str, choices: &[String]) -> Result<Option<usize>>;

    /// Pick any number of `choices`. Returns sorted indices; empty means none.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Option<Vec<usize>>>;

    /// Yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    fn confirm(&mut self, message: &str, default: bool) -> Result<Option<bool>>;

    /// Free text, falling back to `default` on an empty answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>>;
}

/// [`Prompter`] over a reader/writer pair.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompter reading stdin and writing to stderr.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning the writer (used by tests).
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_choices(&mut self, message: &str, choices: &[String]) -> Result<()> {
        writeln!(self.output, "{message}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {choice}", i + 1)?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn select(&mut self, message: &str, choices: &[String]) -> Result<Option<usize>> {
        if choices.is_empty() {
            return Ok(None);
        }
        self.print_choices(message, choices)?;
        let prompt = format!("Enter a number [1-{}] (empty to cancel): ", choices.len());

        loop {
            let Some(answer) = self.ask(&prompt)? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Please enter a number between 1 and {}.", choices.len())?,
            }
        }
    }

    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Option<Vec<usize>>> {
        if choices.is_empty() {
            return Ok(Some(Vec::new()));
        }
        self.print_choices(message, choices)?;
        let prompt = "Select entries (e.g. 1,3,5-7 or 'all', empty for none): ";

        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            match parse_selection(&answer, choices.len()) {
                Ok(indices) => return Ok(Some(indices)),
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<Option<bool>> {
        let prompt = format!("{message} {} ", if default { "[Y/n]" } else { "[y/N]" });
        loop {
            let Some(answer) = self.ask(&prompt)? else {
                return Ok(None);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(Some(default)),
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => writeln!(self.output, "Please answer yes or no.")?,
            }
        }
    }

    fn text(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>> {
        let prompt = match default {
            Some(d) => format!("{message} [{d}]: "),
            None => format!("{message}: "),
        };
        let answer = self.ask(&prompt)?;
        Ok(answer.map(|a| {
            if a.is_empty() {
                default.unwrap_or_default().to_string()
            } else {
                a
            }
        }))
    }
}

/// Parse a multi-select answer into sorted, zero-based indices.
///
/// Accepts comma or space separated numbers and ranges (`1,3,5-7`), or
/// `all`. An empty answer selects nothing.
///
/// # Errors
///
/// Returns a message describing the first invalid token.
pub fn parse_selection(input: &str, count: usize) -> std::result::Result<Vec<usize>, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok((0..count).collect());
    }

    let parse_one = |s: &str| -> std::result::Result<usize, String> {
        match s.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
            _ => Err(format!("'{s}' is not a number between 1 and {count}.")),
        }
    };

    let mut picked = BTreeSet::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        if let Some((start, end)) = token.split_once('-') {
            let (start, end) = (parse_one(start)?, parse_one(end)?);
            if start > end {
                return Err(format!("Range '{token}' is reversed."));
            }
            picked.extend(start..=end);
        } else {
            picked.insert(parse_one(token)?);
        }
    }
    Ok(picked.into_iter().collect())
}
