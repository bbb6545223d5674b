//! Projkit core library.
//!
//! This crate exposes programmatic APIs for scanning JaCoCo coverage reports
//! for under-covered files and for exporting standalone project trees.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `report`: Streaming XML reader yielding report packages.
//! - `coverage`: Prefix/threshold filtering and percentage math.
//! - `export`: Staged, filtered, symlink-dereferencing tree copy.
//! - `models`: Report entities and result structs.
//! - `output`: Human/JSON printers for coverage and export.
//! - `error`: Crate error type.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod coverage;
pub mod error;
pub mod export;
pub mod models;
pub mod output;
pub mod report;
pub mod utils;
