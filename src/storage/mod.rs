//! SQLite access to InvokeAI's preset table.
//!
//! - Read-write connection that never creates the database file
//! - Transaction discipline for atomic imports and deletions
//!
//! # Submodules
//!
//! - [`schema`] - `style_presets` DDL (fixtures and in-memory databases)
//! - [`sqlite`] - Preset store implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{ImportCounts, Page, PresetFilter, PresetStore};
