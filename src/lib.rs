//! Invoke Presets CLI - style presets and database snapshots for InvokeAI
//!
//! This crate provides the core functionality for the `invoke-presets` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (`StylePreset`, `PresetDraft`, `SnapshotRecord`)
//! - [`storage`] - SQLite access to InvokeAI's `style_presets` table
//! - [`snapshot`] - Snapshot registry, online backups, retention and restore
//! - [`transfer`] - Import/export documents, delete lists and their sources
//! - [`config`] - Configuration discovery and resolved settings
//! - [`prompt`] - Interactive prompts
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod prompt;
pub mod snapshot;
pub mod storage;
pub mod transfer;

pub use error::{Error, Result};
