//! Error types for storage operations

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Conditional put lost an optimistic-concurrency race
    #[error("Version conflict: expected {expected}, found {found}")]
    Conflict {
        /// Version the caller based its write on
        expected: u64,
        /// Version actually present in the store
        found: u64,
    },

    /// The persistence layer cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Record body could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    /// Whether this error is a concurrency race the caller should retry
    /// after re-reading
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}
