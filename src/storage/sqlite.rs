//! SQLite preset store.
//!
//! Reads and writes InvokeAI's `style_presets` table. Every write goes
//! through [`PresetStore::mutate`] so multi-row imports and deletions are
//! all-or-nothing.

use crate::error::{Error, Result};
use crate::model::{db_timestamp, PresetData, PresetDraft, PresetType, StylePreset};
use crate::storage::schema::{apply_schema, has_preset_table};
use rusqlite::{params, Connection, OpenFlags, Row, Transaction};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Which presets a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetFilter {
    /// `type = 'user'` (the default listing).
    User,
    /// `type = 'default'`, presets shipped by the InvokeAI team.
    Default,
    /// `type = 'project'`.
    Project,
    /// No type restriction.
    All,
}

impl PresetFilter {
    /// Resolve the `list` flags into a filter.
    ///
    /// The flags are mutually exclusive on the command line; if more than
    /// one is set anyway, `all` wins over `only_defaults` over `projects`.
    #[must_use]
    pub const fn from_flags(all: bool, only_defaults: bool, projects: bool) -> Self {
        match (all, only_defaults, projects) {
            (true, _, _) => Self::All,
            (false, true, _) => Self::Default,
            (false, false, true) => Self::Project,
            (false, false, false) => Self::User,
        }
    }

    /// The preset type this filter restricts to, if any.
    #[must_use]
    pub const fn preset_type(&self) -> Option<PresetType> {
        match self {
            Self::User => Some(PresetType::User),
            Self::Default => Some(PresetType::Default),
            Self::Project => Some(PresetType::Project),
            Self::All => None,
        }
    }

    /// Human label used in messages ("No presets found for user").
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Default => "default",
            Self::Project => "project",
            Self::All => "all",
        }
    }
}

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    #[must_use]
    pub fn new(number: usize, size: usize) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.number - 1).saturating_mul(self.size)
    }

    /// Number of pages needed for `total` rows (at least 1).
    #[must_use]
    pub const fn page_count(&self, total: usize) -> usize {
        if total == 0 {
            1
        } else {
            total.div_ceil(self.size)
        }
    }
}

/// Rows touched by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportCounts {
    pub created: usize,
    pub updated: usize,
}

/// Access to the `style_presets` table of a live InvokeAI database.
#[derive(Debug)]
pub struct PresetStore {
    conn: Connection,
}

const SELECT_COLUMNS: &str = "SELECT id, name, preset_data, type, created_at, updated_at FROM style_presets";

impl PresetStore {
    /// Open an existing InvokeAI database.
    ///
    /// The database file is never created: it belongs to InvokeAI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatabaseNotFound`] if the file is missing and
    /// [`Error::MissingPresetTable`] if it has no `style_presets` table.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        if !has_preset_table(&conn)? {
            return Err(Error::MissingPresetTable {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), "Opened preset database");
        Ok(Self { conn })
    }

    /// Open an in-memory database with the preset schema (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside an IMMEDIATE transaction.
    ///
    /// Commits when `f` succeeds; any error rolls the whole operation back.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a database error from begin/commit.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        debug!(op, "Begin transaction");
        let result = f(&tx)?;
        tx.commit()?;
        debug!(op, "Committed");

        Ok(result)
    }

    // ==================
    // Reads
    // ==================

    /// List presets matching `filter`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_presets(&self, filter: PresetFilter, page: Option<Page>) -> Result<Vec<StylePreset>> {
        let mut sql = SELECT_COLUMNS.to_string();
        if filter.preset_type().is_some() {
            sql.push_str(" WHERE type = ?1");
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE, id");
        if let Some(page) = page {
            // SQLite integers are i64; anything further is past the last row.
            let (Ok(limit), Ok(offset)) = (i64::try_from(page.size), i64::try_from(page.offset())) else {
                return Ok(Vec::new());
            };
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match filter.preset_type() {
            Some(t) => stmt.query_map([t.as_str()], map_preset)?,
            None => stmt.query_map([], map_preset)?,
        };

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Count presets matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_presets(&self, filter: PresetFilter) -> Result<usize> {
        let count: i64 = match filter.preset_type() {
            Some(t) => self.conn.query_row(
                "SELECT COUNT(*) FROM style_presets WHERE type = ?1",
                [t.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM style_presets", [], |row| row.get(0))?,
        };
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Names of every preset, whatever its type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn existing_names(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM style_presets")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    // ==================
    // Writes
    // ==================

    /// Create and update presets in one transaction.
    ///
    /// Creates get a fresh UUID and timestamps; updates overwrite the
    /// prompts and type of the preset with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error (and writes nothing) if any statement fails.
    pub fn apply_import(&mut self, create: &[PresetDraft], update: &[PresetDraft]) -> Result<ImportCounts> {
        self.mutate("import_presets", |tx| {
            let mut counts = ImportCounts::default();

            for draft in update {
                let changed = tx.execute(
                    "UPDATE style_presets SET preset_data = ?1, type = ?2, updated_at = ?3 WHERE name = ?4",
                    params![
                        draft.data.to_column(),
                        draft.preset_type.as_str(),
                        db_timestamp(),
                        draft.name
                    ],
                )?;
                counts.updated += changed;
            }

            for draft in create {
                let now = db_timestamp();
                tx.execute(
                    "INSERT INTO style_presets (id, name, preset_data, type, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        uuid::Uuid::new_v4().to_string(),
                        draft.name,
                        draft.data.to_column(),
                        draft.preset_type.as_str(),
                        now,
                        now
                    ],
                )?;
                counts.created += 1;
            }

            Ok(counts)
        })
    }

    /// Delete presets by id in one transaction.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns an error (and deletes nothing) if any statement fails.
    pub fn delete_presets(&mut self, ids: &[String]) -> Result<usize> {
        self.mutate("delete_presets", |tx| {
            let mut stmt = tx.prepare("DELETE FROM style_presets WHERE id = ?1")?;
            let mut removed = 0;
            for id in ids {
                removed += stmt.execute([id])?;
            }
            Ok(removed)
        })
    }
}

fn map_preset(row: &Row<'_>) -> rusqlite::Result<StylePreset> {
    let raw_type: String = row.get(3)?;
    let preset_type = raw_type.parse::<PresetType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    let raw_data: String = row.get(2)?;

    Ok(StylePreset {
        id: row.get(0)?,
        name: row.get(1)?,
        preset_data: PresetData::from_column(&raw_data),
        preset_type,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
