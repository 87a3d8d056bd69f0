//! Core error types for hearth-core.
//!
//! This module defines the error hierarchy using thiserror. Pantry
//! operations themselves never fail (unparseable amounts, missing
//! ingredients and empty rotations all degrade gracefully); errors here
//! cover persistence, configuration, input validation and collaborator
//! delivery.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for hearth-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be created
    #[error("Cannot prepare data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A schedule time was not `HH:MM`
    #[error("Invalid time format: '{0}' (expected HH:MM)")]
    InvalidTime(String),

    /// Unknown meal category name
    #[error("Unknown meal type: '{0}'")]
    UnknownMealType(String),

    /// Dish not present in the given meal category
    #[error("No dish named '{dish}' in {meal}")]
    UnknownDish { meal: String, dish: String },

    /// The same ingredient name lives in both stock partitions
    #[error("Ingredient '{0}' appears in both groceries and vegetables")]
    PartitionCollision(String),

    /// A stock quantity or threshold is negative or not a number
    #[error("Invalid quantity for '{name}': {value} (must be a non-negative number)")]
    InvalidQuantity { name: String, value: f64 },

    /// A dish cannot be cooked with the current stock
    #[error("Insufficient ingredients to cook '{dish}': {}", missing.join(", "))]
    InsufficientIngredients { dish: String, missing: Vec<String> },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised by notification collaborators (voice, Telegram, desktop).
///
/// Callers log these and move on; they never reach pantry or timer state.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Sink is disabled or missing credentials
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint answered with an error status
    #[error("{service} answered HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Invalid endpoint URL
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Writing to the output sink failed
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// External command could not be started
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
