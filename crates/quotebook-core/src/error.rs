//! Error types for quotebook-core

use thiserror::Error;

/// Result type alias using quotebook-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quotebook-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Quote text (or another required field) failed validation
    #[error("Invalid quote: {0}")]
    Validation(String),

    /// Import payload was not an array of valid quote objects
    #[error("Invalid import file: {0}")]
    ImportFormat(String),

    /// Persisted snapshot could not be decoded
    #[error("Stored data is corrupted: {0}")]
    StorageCorruption(String),

    /// Remote fetch failed or returned a non-success status
    #[error("Sync failed: {0}")]
    SyncTransport(String),

    /// A previous sync pass is waiting for conflict resolution
    #[error("{0} sync conflict(s) must be resolved before syncing again")]
    ConflictPending(usize),

    /// Another sync pass is currently running
    #[error("A sync is already in progress")]
    SyncInProgress,

    /// Resolution was requested but no sync pass is waiting on conflicts
    #[error("No sync conflicts are pending")]
    NoPendingMerge,

    /// Resolution was requested for an id that is not in conflict
    #[error("No pending conflict for quote id: {0}")]
    ConflictNotFound(String),

    /// Operation requires at least one quote
    #[error("No quotes to export")]
    EmptyStore,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::SyncTransport(error.to_string())
    }
}
