//! Error types for node store operations

use crossweave_store::StoreError;
use thiserror::Error;

/// Errors that can occur while integrating or decaying knowledge nodes
#[derive(Error, Debug)]
pub enum NodeStoreError {
    /// Caller bug: unknown domain or unusable payload; never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage layer error, propagated to the caller
    ///
    /// Conflicts are retried internally up to the configured attempt count
    /// before surfacing here.
    #[error(transparent)]
    Store(#[from] StoreError),
}
