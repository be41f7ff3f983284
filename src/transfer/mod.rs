//! Moving presets in and out of the database.
//!
//! Everything here is free of terminal I/O: documents are loaded from a
//! [`Source`], normalized and planned, and the command layer decides what
//! to ask the user.

pub mod delete;
pub mod export;
pub mod file;
pub mod import;
pub mod source;

pub use delete::{parse_name_list, plan_deletion, DeletePlan};
pub use export::{export_document, export_path, write_export};
pub use import::{normalize_document, ImportPlan, ResolvedImport, Skipped, UpdatePolicy};
pub use source::Source;
