//! Error types for sb.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SbError>;

#[derive(Debug, Error)]
pub enum SbError {
    #[error("ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("subscription error: {0}")]
    Subscription(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a pipeline run rejects its input.
///
/// Any of these aborts the run; the live controller keeps the previous
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestionError {
    #[error("record set is empty")]
    Empty,

    #[error("row {row} has no name")]
    MissingName { row: usize },

    #[error("duplicate skill {name:?} in archetype {archetype:?} (rows {first} and {second})")]
    DuplicateSkill {
        archetype: String,
        name: String,
        first: usize,
        second: usize,
    },

    #[error("malformed feed: {0}")]
    Malformed(String),
}

impl SbError {
    /// Short machine-readable code used in robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Ingestion(_) => "ingestion_error",
            Self::Subscription(_) => "subscription_error",
            Self::Config(_) | Self::MissingConfig(_) => "config_error",
            Self::NotFound(_) => "not_found",
            Self::Serialization(_) => "serialization_error",
            Self::Database(_) => "database_error",
            Self::Io(_) => "io_error",
        }
    }
}

impl From<csv::Error> for SbError {
    fn from(err: csv::Error) -> Self {
        Self::Ingestion(IngestionError::Malformed(err.to_string()))
    }
}

impl From<serde_json::Error> for SbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SbError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
