//! Crossweave Storage Layer
//!
//! A key-value/document store abstraction over typed, versioned records.
//! Every mutation is a conditional put on a version counter, so read-modify-
//! write cycles detect lost races as [`StoreError::Conflict`] instead of
//! silently dropping a merge.
//!
//! Two backends are provided:
//!
//! - [`MemoryStore`]: BTreeMap-backed, for tests and ephemeral runs
//! - [`SqliteStore`]: persistent single-file backend
//!
//! # Examples
//!
//! ```
//! use crossweave_store::{Collection, MemoryStore, RecordStore};
//!
//! let mut store = MemoryStore::new();
//! let v = store
//!     .put_record(Collection::KnowledgeNodes, "k", &42u32, Some(0))
//!     .unwrap();
//! assert_eq!(v, 1);
//! let n: Option<u32> = store.get_record(Collection::KnowledgeNodes, "k").unwrap();
//! assert_eq!(n, Some(42));
//! ```

#![warn(missing_docs)]

mod error;
mod memory;
mod sqlite;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// The fixed set of record collections
///
/// Names match the original deployment's Firestore collections one to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Deduplicated knowledge facts
    KnowledgeNodes,
    /// Domain registry state: active domains, priors, processing order
    DomainSources,
    /// Scored edges between nodes of different domains
    CrossDomainRelations,
    /// Append-only integration cycle records
    IntegrationHistory,
    /// Per-item and per-domain failure entries
    ErrorLogs,
    /// Evolution feedback snapshots
    EvolutionMetrics,
}

impl Collection {
    /// Storage name of the collection
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::KnowledgeNodes => "knowledge_nodes",
            Collection::DomainSources => "domain_sources",
            Collection::CrossDomainRelations => "cross_domain_relations",
            Collection::IntegrationHistory => "integration_history",
            Collection::ErrorLogs => "error_logs",
            Collection::EvolutionMetrics => "evolution_metrics",
        }
    }

    /// All collections, in a stable order
    pub fn all() -> [Collection; 6] {
        [
            Collection::KnowledgeNodes,
            Collection::DomainSources,
            Collection::CrossDomainRelations,
            Collection::IntegrationHistory,
            Collection::ErrorLogs,
            Collection::EvolutionMetrics,
        ]
    }
}

/// A stored document with its concurrency version
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedRecord {
    /// Record key within its collection
    pub id: String,
    /// Monotonic version counter, starting at 1 on first put
    pub version: u64,
    /// JSON document body
    pub body: serde_json::Value,
}

/// Key-value/document store over versioned records
///
/// # Versioning
///
/// `expected_version` on [`put`](RecordStore::put) selects the write mode:
///
/// - `None`: unconditional upsert
/// - `Some(0)`: create-only; conflicts if the record exists
/// - `Some(v)`: conditional update; conflicts unless the stored version is `v`
///
/// A missing record has version 0. Every successful put returns the new
/// version (previous + 1).
pub trait RecordStore {
    /// Get a record by id, or `None` if absent
    fn get(&self, collection: Collection, id: &str) -> Result<Option<VersionedRecord>, StoreError>;

    /// Write a record, optionally conditioned on the current version
    fn put(
        &mut self,
        collection: Collection,
        id: &str,
        body: serde_json::Value,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;

    /// All records in a collection, ordered by id
    fn query(&self, collection: Collection) -> Result<Vec<VersionedRecord>, StoreError>;

    /// Delete a record; returns false if it was absent
    fn delete(&mut self, collection: Collection, id: &str) -> Result<bool, StoreError>;

    /// Typed read of a record body
    fn get_record<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.get(collection, id)? {
            Some(record) => Ok(Some(serde_json::from_value(record.body)?)),
            None => Ok(None),
        }
    }

    /// Typed read of a record body together with its version
    fn get_versioned<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<(T, u64)>, StoreError> {
        match self.get(collection, id)? {
            Some(record) => Ok(Some((serde_json::from_value(record.body)?, record.version))),
            None => Ok(None),
        }
    }

    /// Typed write of a record body
    fn put_record<T: Serialize>(
        &mut self,
        collection: Collection,
        id: &str,
        value: &T,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let body = serde_json::to_value(value)?;
        self.put(collection, id, body, expected_version)
    }

    /// Typed scan of a whole collection
    fn query_records<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, StoreError> {
        self.query(collection)?
            .into_iter()
            .map(|record| serde_json::from_value(record.body).map_err(StoreError::from))
            .collect()
    }
}
