//! Error types for the ledger tracker

use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {

    // =============================
    // Recoverable Conversation Errors
    // =============================

    #[error("Invalid input: {0:?} is not an accepted number")]
    InvalidInput(String),

    #[error("Insufficient balance: expense of {requested} exceeds balance of {balance}")]
    InsufficientBalance { requested: u64, balance: i64 },

    #[error("Index out of range: record {position} requested, ledger holds {len}")]
    IndexOutOfRange { position: i64, len: usize },

    #[error("No action pending")]
    NothingPending,

    // =============================
    // Precondition Violations
    // =============================

    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    // =============================
    // Infrastructure
    // =============================

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TrackerError {
    /// Errors the user can fix by sending another message
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidInput(_)
                | TrackerError::InsufficientBalance { .. }
                | TrackerError::IndexOutOfRange { .. }
                | TrackerError::NothingPending
        )
    }
}
