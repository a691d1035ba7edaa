//! sb - skill catalog engine
//!
//! Raw records from a live SQLite table or an offline feed are normalized,
//! grouped by archetype and turned into per-archetype prerequisite graphs.
//! A reconciliation controller keeps the grouped catalog in step with the
//! source, and a small state machine tracks the selected archetype.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod feed;
pub mod live;
pub mod prefs;
pub mod source;
pub mod storage;
pub mod test_utils;

pub use error::{Result, SbError};
