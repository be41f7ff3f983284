//! Error types for the Invoke Presets CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for preset and snapshot operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseNotFound,
    MissingPresetTable,
    DatabaseError,

    // Not Found (exit 3)
    SnapshotNotFound,
    SnapshotFileMissing,

    // Validation (exit 4)
    InvalidArgument,
    InvalidDocument,

    // Snapshot / restore (exit 5)
    SnapshotDirNotWritable,
    RestoreAborted,
    RestoreRolledBack,
    ManualRecoveryRequired,

    // Fetch (exit 6)
    FetchError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::MissingPresetTable => "MISSING_PRESET_TABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::SnapshotNotFound => "SNAPSHOT_NOT_FOUND",
            Self::SnapshotFileMissing => "SNAPSHOT_FILE_MISSING",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidDocument => "INVALID_DOCUMENT",
            Self::SnapshotDirNotWritable => "SNAPSHOT_DIR_NOT_WRITABLE",
            Self::RestoreAborted => "RESTORE_ABORTED",
            Self::RestoreRolledBack => "RESTORE_ROLLED_BACK",
            Self::ManualRecoveryRequired => "MANUAL_RECOVERY_REQUIRED",
            Self::FetchError => "FETCH_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseNotFound | Self::MissingPresetTable | Self::DatabaseError => 2,
            Self::SnapshotNotFound | Self::SnapshotFileMissing => 3,
            Self::InvalidArgument | Self::InvalidDocument => 4,
            Self::SnapshotDirNotWritable
            | Self::RestoreAborted
            | Self::RestoreRolledBack
            | Self::ManualRecoveryRequired => 5,
            Self::FetchError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying with corrected input can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::InvalidDocument | Self::FetchError | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in preset and snapshot operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database not found at {path}")]
    DatabaseNotFound { path: PathBuf },

    #[error("No style_presets table in {path}")]
    MissingPresetTable { path: PathBuf },

    #[error("Snapshot not found: {name}")]
    SnapshotNotFound { name: String },

    #[error("Snapshot file '{name}' not found on disk at {path}")]
    SnapshotFileMissing { name: String, path: PathBuf },

    #[error("No write permission for the snapshots directory: {path}")]
    SnapshotDirNotWritable { path: PathBuf },

    #[error("Could not back up the current database to {backup_path}: {reason}")]
    RestoreAborted { backup_path: PathBuf, reason: String },

    #[error("A backup from an earlier failed restore is still at {backup_path}")]
    BackupInTheWay { backup_path: PathBuf },

    #[error("Restoring snapshot '{name}' failed ({reason}); the original database was restored")]
    RestoreRolledBack { name: String, reason: String },

    #[error("Restoring snapshot failed ({restore_error}) and rollback failed ({rollback_error})")]
    ManualRecoveryRequired {
        backup_path: PathBuf,
        restore_error: String,
        rollback_error: String,
    },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::DatabaseNotFound { .. } => ErrorCode::DatabaseNotFound,
            Self::MissingPresetTable { .. } => ErrorCode::MissingPresetTable,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::SnapshotNotFound { .. } => ErrorCode::SnapshotNotFound,
            Self::SnapshotFileMissing { .. } => ErrorCode::SnapshotFileMissing,
            Self::SnapshotDirNotWritable { .. } => ErrorCode::SnapshotDirNotWritable,
            Self::RestoreAborted { .. } | Self::BackupInTheWay { .. } => ErrorCode::RestoreAborted,
            Self::RestoreRolledBack { .. } => ErrorCode::RestoreRolledBack,
            Self::ManualRecoveryRequired { .. } => ErrorCode::ManualRecoveryRequired,
            Self::InvalidDocument(_) => ErrorCode::InvalidDocument,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Fetch(_) => ErrorCode::FetchError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::DatabaseNotFound { .. } => Some(
                "Check the InvokeAI install directory (`--invoke-dir` or `invoke_ai_dir` in config.json). \
                 The database is expected at <install dir>/databases/invokeai.db"
                    .to_string(),
            ),

            Self::MissingPresetTable { .. } => Some(
                "Style presets require a newer InvokeAI version. Start InvokeAI once to upgrade the database."
                    .to_string(),
            ),

            Self::SnapshotNotFound { name } => Some(format!(
                "No snapshot named '{name}'. Use `invoke-presets database list-snapshots` to see available snapshots."
            )),

            Self::SnapshotFileMissing { .. } => Some(
                "The registry entry has no backing file. Delete it with `invoke-presets database delete-snapshot`."
                    .to_string(),
            ),

            Self::SnapshotDirNotWritable { path } => Some(format!(
                "Fix the permissions of {} or choose another location with `--snapshots-dir`.",
                path.display()
            )),

            Self::RestoreAborted { .. } => Some(
                "Nothing was changed. Free some disk space or check the permissions of the databases directory."
                    .to_string(),
            ),

            Self::BackupInTheWay { backup_path } => Some(format!(
                "Nothing was changed. Restore your database from {} by hand, then delete or move that file and try again.",
                backup_path.display()
            )),

            Self::ManualRecoveryRequired { backup_path, .. } => Some(format!(
                "Please manually restore your database from the backup file: {}",
                backup_path.display()
            )),

            Self::Config(_) => Some(
                "Create a config file at ~/.config/invoke-presets/config.json or pass `--invoke-dir`."
                    .to_string(),
            ),

            Self::InvalidDocument(msg) => {
                if msg.contains("names") {
                    Some("Expected a JSON array of preset names, e.g. [\"Cinematic\", \"Anime\"]".to_string())
                } else if msg.contains("presets") {
                    Some(
                        "Expected a JSON array of presets: [{\"name\": ..., \"positive_prompt\": ..., \"negative_prompt\": ...}]"
                            .to_string(),
                    )
                } else {
                    None
                }
            }

            Self::RestoreRolledBack { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Fetch(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
