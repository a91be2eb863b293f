//! Error types for the tracker engine

use crate::config::ConfigError;
use thiserror::Error;

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur in tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// Epic not found
    #[error("epic not found: {id}")]
    EpicNotFound { id: String },

    /// Project not found
    #[error("project not found: {id}")]
    ProjectNotFound { id: String },

    /// User not found
    #[error("user not found: {id}")]
    UserNotFound { id: String },

    /// Invitation not found
    #[error("invitation not found: {id}")]
    InvitationNotFound { id: String },

    /// Generic resource not found (members, attachments, ...)
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Resource already exists
    #[error("{resource} already exists: {id}")]
    AlreadyExists { resource: String, id: String },

    /// Actor lacks the role required for the operation
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// A multi-row position rewrite failed part way; nothing was committed
    #[error("reorder of task {id} failed: {message}")]
    ReorderFailed { id: String, message: String },

    /// Invalid operation
    #[error("invalid operation: {verb} {noun}")]
    InvalidOperation { verb: String, noun: String },

    /// Parse error
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Database is locked by another writer
    #[error("database busy - another write in progress")]
    LockBusy,

    /// A thread panicked while holding the connection
    #[error("database connection poisoned")]
    Poisoned,

    /// SQLite error
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for TrackerError {
    fn from(error: rusqlite::Error) -> Self {
        match error.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
                Self::LockBusy
            }
            _ => Self::Database(error),
        }
    }
}

impl TrackerError {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a generic not-found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an already-exists error
    pub fn already_exists(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Wrap a failure that interrupted a position rewrite
    pub fn reorder_failed(id: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::ReorderFailed {
            id: id.into(),
            message: cause.to_string(),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockBusy)
    }

    /// True for every "does not exist" variant
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TaskNotFound { .. }
                | Self::EpicNotFound { .. }
                | Self::ProjectNotFound { .. }
                | Self::UserNotFound { .. }
                | Self::InvitationNotFound { .. }
                | Self::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::TaskNotFound {
            id: "abc123".into(),
        };
        assert_eq!(err.to_string(), "task not found: abc123");
    }

    #[test]
    fn test_reorder_failed_display() {
        let err = TrackerError::reorder_failed("t1", "disk I/O error");
        assert_eq!(err.to_string(), "reorder of task t1 failed: disk I/O error");
    }

    #[test]
    fn test_retryable() {
        assert!(TrackerError::LockBusy.is_retryable());
        assert!(!TrackerError::TaskNotFound { id: "x".into() }.is_retryable());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(TrackerError::not_found("attachment", "a1").is_not_found());
        assert!(TrackerError::EpicNotFound { id: "e".into() }.is_not_found());
        assert!(!TrackerError::forbidden("owners only").is_not_found());
    }
}
