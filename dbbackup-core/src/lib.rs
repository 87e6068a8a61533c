//! Core library for dbbackup.
//!
//! Dumps every table of a MySQL or PostgreSQL database, or every collection
//! of a MongoDB database, into one file per unit: `<table>.sql` holding the
//! structure statement followed by one `INSERT` per row, or
//! `<collection>.json` holding a JSON array of the documents.
//!
//! # Security Guarantees
//! - All database operations are read-only
//! - Passwords are zeroed on drop and never logged or shown in `Debug`
//! - Unit names that would leave the destination directory are rejected
//!
//! # Architecture
//! - `adapters`: one `DatabaseAdapter` per engine, chosen by `connect()`
//! - `export`: the per-unit pipeline and SQL text generation
//! - `output`: file writing
//! - `logging`: console setup and the error journal

pub mod adapters;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod output;
pub mod security;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, DatabaseAdapter, connect};
pub use error::{BackupError, Result};
pub use export::{ExportOptions, ExportSummary, Exporter, UnitOutcome, UnitReport};
pub use logging::{ErrorLog, FileErrorLog, MemoryErrorLog};
pub use models::DatabaseKind;
pub use output::OutputWriter;
pub use security::Credentials;
