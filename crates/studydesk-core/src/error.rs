//! Core error types for studydesk-core.
//!
//! Every failure in the timer subsystem is one of these. None of them is
//! meant to take the process down: validation errors go back to the user,
//! persistence and notification errors are logged and degraded.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::TimerId;

/// Core error type for studydesk-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected user input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No timer carries the requested id
    #[error("Timer not found: {0}")]
    NotFound(TimerId),

    /// Storage errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notification side-channel errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}

/// Validation errors raised when creating timers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty or whitespace only
    #[error("Timer name must not be empty")]
    EmptyName,

    /// hours/minutes/seconds add up to zero
    #[error("Timer duration must be greater than zero")]
    NonPositiveDuration,
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored record could not be (de)serialized
    #[error("Corrupt record '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Insert would break id uniqueness
    #[error("Duplicate timer id: {0}")]
    DuplicateId(TimerId),

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the audible cue side channel.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The cue device or writer rejected the cue
    #[error("Cue playback failed: {0}")]
    Playback(#[from] std::io::Error),

    /// External player exited unsuccessfully
    #[error("Cue command '{program}' exited with {status}")]
    CommandFailed { program: String, status: String },

    /// Cue command is configured but empty
    #[error("Cue command is empty")]
    EmptyCommand,
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    PersistenceError::Locked
                } else {
                    PersistenceError::QueryFailed(err.to_string())
                }
            }
            _ => PersistenceError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
