//! Schema of the `style_presets` table.
//!
//! The live database belongs to InvokeAI and is never created or migrated
//! by this tool. The DDL mirrors InvokeAI's so in-memory and fixture
//! databases behave like the real thing.

use rusqlite::{Connection, Result};

/// Name of the table holding style presets.
pub const PRESET_TABLE: &str = "style_presets";

/// DDL for `style_presets`, including InvokeAI's `updated_at` trigger.
pub const STYLE_PRESETS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS style_presets (
    id TEXT NOT NULL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    preset_data TEXT NOT NULL,
    type TEXT NOT NULL DEFAULT 'user',
    created_at DATETIME NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'NOW')),
    updated_at DATETIME NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'NOW'))
);

CREATE TRIGGER IF NOT EXISTS tg_style_presets_updated_at
AFTER UPDATE ON style_presets FOR EACH ROW
BEGIN
    UPDATE style_presets SET updated_at = STRFTIME('%Y-%m-%d %H:%M:%f', 'NOW')
    WHERE id = old.id;
END;
"#;

/// Create the preset table on a fresh connection.
///
/// # Errors
///
/// Returns an error if the DDL fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(STYLE_PRESETS_SQL)
}

/// Whether the connection has a `style_presets` table.
///
/// # Errors
///
/// Returns an error if `sqlite_master` cannot be queried.
pub fn has_preset_table(conn: &Connection) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [PRESET_TABLE],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count > 0)
}
