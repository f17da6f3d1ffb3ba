//! Error types for hwtrack
//!
//! Centralized error handling using thiserror.

use crate::models::ElementId;
use thiserror::Error;

/// All error types that can occur in the tracker core
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No user matches the supplied username and password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token absent or not issued to any existing user
    #[error("Invalid or missing token")]
    InvalidToken,

    /// Username already registered
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    /// Element date does not match the calendar-date format
    #[error("Malformed date: {date:?}")]
    MalformedDate {
        date: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Element does not exist or belongs to another user
    #[error("Element not found: {element_id}")]
    NotFound { element_id: ElementId },

    /// Stored value outside the closed set of a tagged field
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// SQLite error
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Errors a caller should surface as "unauthorized"
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TrackerError::InvalidCredentials | TrackerError::InvalidToken)
    }

    /// Errors caused by bad caller input rather than the store
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            TrackerError::MalformedDate { .. } | TrackerError::InvalidValue { .. } | TrackerError::DuplicateUser(_)
        )
    }
}

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
