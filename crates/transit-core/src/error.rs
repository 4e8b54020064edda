//! Error types for catalogue operations.

use thiserror::Error;

/// Errors raised while filling or restoring the catalogue.
///
/// None of these are fatal during ingestion: callers log them and
/// move on to the next record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("unknown stop: {0}")]
    UnknownStop(String),

    #[error("bus {bus} has {count} stop(s), at least 2 are required")]
    TooFewStops { bus: String, count: usize },

    #[error("corrupt catalogue snapshot: {0}")]
    CorruptSnapshot(String),
}

/// Result type for catalogue operations.
pub type Result<T> = std::result::Result<T, CatalogueError>;
