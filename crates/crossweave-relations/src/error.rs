//! Error types for relation graph operations

use crossweave_store::StoreError;
use thiserror::Error;

/// Errors that can occur while linking or pruning cross-domain relations
#[derive(Error, Debug)]
pub enum RelationError {
    /// Caller bug: relations are cross-domain only
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage layer error, propagated to the caller
    #[error(transparent)]
    Store(#[from] StoreError),
}
