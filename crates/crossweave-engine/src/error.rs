//! Error types for engine operations

use crossweave_evolution::EvolutionError;
use crossweave_nodes::NodeStoreError;
use crossweave_registry::RegistryError;
use crossweave_relations::RelationError;
use crossweave_store::StoreError;
use thiserror::Error;

/// Errors that abort an integration cycle
///
/// Per-item failures (a bad payload, an exhausted collector) are logged to
/// the error log collection and never surface here; only store-level and
/// cancellation conditions do.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Persistence layer failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Registry state could not be read or written
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Node store failure that was not a per-item validation problem
    #[error(transparent)]
    Node(#[from] NodeStoreError),

    /// Relation graph failure
    #[error(transparent)]
    Relation(#[from] RelationError),

    /// Evolution feedback failure
    #[error(transparent)]
    Evolution(#[from] EvolutionError),

    /// Cooperative cancellation between cycle steps
    #[error("cycle cancelled")]
    Cancelled,
}

impl EngineError {
    /// Whether the error is the cooperative cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }
}
