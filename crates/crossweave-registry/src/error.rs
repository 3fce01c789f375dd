//! Error types for registry operations

use crossweave_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the domain registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Invalid domain or prior configuration
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage layer error while loading or saving registry state
    #[error(transparent)]
    Store(#[from] StoreError),
}
