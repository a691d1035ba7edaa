//! Storage layer for sb
//!
//! Live mode reads the catalog from a SQLite `skills` table.

pub mod sqlite;

pub use sqlite::{Database, SCHEMA_VERSION, data_version};
