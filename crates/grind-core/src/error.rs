//! Error types for grind-core.
//!
//! A thiserror-based hierarchy: one top-level [`CoreError`] with
//! per-subsystem error enums underneath.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for grind-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local storage (SQLite) errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote task store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Timer action errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Task validation/lookup errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}

/// Local SQLite storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Failed to resolve data directory: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Remote task store errors.
///
/// These are best-effort: the tracker logs and ignores them on the
/// fire-and-forget write path.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Store did not return an id for the created task")]
    MissingId,

    #[error("Failed to start store runtime: {0}")]
    Runtime(std::io::Error),
}

/// Timer action errors, surfaced to the user as a blocking prompt.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimerError {
    #[error("No mission selected -- select a mission before starting the timer")]
    NoTaskSelected,
}

/// Task validation and lookup errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TaskError {
    #[error("Mission title must not be empty")]
    EmptyTitle,

    #[error("No mission with id '{0}'")]
    UnknownTask(String),
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
