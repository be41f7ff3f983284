//! Where import and delete documents come from.
//!
//! Documents are read from a local file or fetched over HTTP(S). The
//! fetch runs on a short-lived current-thread runtime so the rest of the
//! CLI stays synchronous.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::transfer::file::parse_json_document;

/// Upper bound on a single URL fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A JSON document location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

impl Source {
    /// Read and parse the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the request fails or
    /// returns a non-success status, or the body is not valid JSON.
    pub fn load(&self) -> Result<serde_json::Value> {
        let content = match self {
            Self::File(path) => {
                debug!(path = %path.display(), "Reading document");
                std::fs::read_to_string(path).map_err(|e| {
                    Error::InvalidArgument(format!("Error reading file {}: {e}", path.display()))
                })?
            }
            Self::Url(url) => fetch_text(url)?,
        };
        parse_json_document(&content)
    }
}

fn fetch_text(url: &str) -> Result<String> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::InvalidArgument(format!(
            "Not an http(s) URL: {url}"
        )));
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Other(format!("Failed to create tokio runtime: {e}")))?;

    info!(url, "Fetching document");
    rt.block_on(async {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        let response = client.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;
        debug!(url, bytes = text.len(), "Fetched document");
        Ok::<_, Error>(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_local_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presets.json");
        std::fs::write(&path, r#"[{"name": "Anime", "prompt": "anime"}]"#).unwrap();

        let value = Source::File(path).load().unwrap();
        assert_eq!(value[0]["name"], "Anime");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Source::File(PathBuf::from("/nonexistent/presets.json")).load();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = Source::Url("ftp://example.com/presets.json".to_string()).load();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Source::Url("https://example.com/p.json".to_string()).to_string(),
            "https://example.com/p.json"
        );
    }
}
