//! Atomic file operations.
//!
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - JSON document reading with positioned parse errors

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file next to the target (`<name>.tmp`)
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Parse a JSON document, reporting where parsing stopped.
///
/// The error message carries the line/column and a short excerpt of the
/// text around the failure.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] if the text is not valid JSON.
pub fn parse_json_document(content: &str) -> Result<serde_json::Value> {
    serde_json::from_str(content).map_err(|e| {
        let excerpt = excerpt_at(content, e.line(), e.column());
        Error::InvalidDocument(format!(
            "Error parsing JSON at line {}, column {}: {e}. Error occurred near: {excerpt}",
            e.line(),
            e.column()
        ))
    })
}

/// About 20 characters either side of a 1-based line/column position.
fn excerpt_at(content: &str, line: usize, column: usize) -> String {
    let Some(text) = content.lines().nth(line.saturating_sub(1)) else {
        return String::new();
    };
    let chars: Vec<char> = text.chars().collect();
    let pos = column.saturating_sub(1).min(chars.len());
    let start = pos.saturating_sub(20);
    let end = (pos + 20).min(chars.len());
    chars[start..end].iter().collect::<String>().trim().to_string()
}
