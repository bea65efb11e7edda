//! Core error types for multitimer-core.
//!
//! Soft-validation outcomes (a non-digit keystroke, an out-of-range minutes
//! group, removing the only timer) are deliberately not represented here:
//! those are silent no-ops or flags on the editor state.

use std::path::PathBuf;
use thiserror::Error;

use crate::keyboard::{Key, KeyOwner};

/// Core error type for multitimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Clock source errors
    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    /// Keyboard capture errors
    #[error("Keyboard error: {0}")]
    Key(#[from] KeyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`SequenceStore`](crate::storage::SequenceStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored snapshot could not be decoded
    #[error("Corrupt snapshot under '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Backing store is unavailable (used by test doubles)
    #[error("Store unavailable")]
    Unavailable,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Could not resolve a data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Clock source errors. Fatal to the countdown that observed them only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("system clock is before the Unix epoch")]
    BeforeEpoch,

    #[error("clock source unavailable")]
    Unavailable,
}

/// Keyboard capture registry errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key is already captured by another owner; it must release first.
    #[error("{key:?} is already bound to {owner:?}")]
    AlreadyBound { key: Key, owner: KeyOwner },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
