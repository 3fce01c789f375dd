//! In-memory store backend

use crate::{Collection, RecordStore, StoreError, VersionedRecord};
use std::collections::BTreeMap;

/// BTreeMap-backed [`RecordStore`]
///
/// Used in tests and for ephemeral runs. Iteration order is the key order,
/// which keeps query results deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: BTreeMap<Collection, BTreeMap<String, (u64, serde_json::Value)>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in a collection
    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .get(&collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Whether a collection holds no records
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<VersionedRecord>, StoreError> {
        Ok(self
            .collections
            .get(&collection)
            .and_then(|records| records.get(id))
            .map(|(version, body)| VersionedRecord {
                id: id.to_string(),
                version: *version,
                body: body.clone(),
            }))
    }

    fn put(
        &mut self,
        collection: Collection,
        id: &str,
        body: serde_json::Value,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let records = self.collections.entry(collection).or_default();
        let current = records.get(id).map(|(v, _)| *v).unwrap_or(0);

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(StoreError::Conflict {
                    expected,
                    found: current,
                });
            }
        }

        let next = current + 1;
        records.insert(id.to_string(), (next, body));
        Ok(next)
    }

    fn query(&self, collection: Collection) -> Result<Vec<VersionedRecord>, StoreError> {
        Ok(self
            .collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, (version, body))| VersionedRecord {
                        id: id.clone(),
                        version: *version,
                        body: body.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .collections
            .get_mut(&collection)
            .map(|records| records.remove(id).is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_roundtrip() {
        let mut store = MemoryStore::new();
        let v = store
            .put(Collection::KnowledgeNodes, "a", json!({"x": 1}), None)
            .unwrap();
        assert_eq!(v, 1);

        let record = store.get(Collection::KnowledgeNodes, "a").unwrap().unwrap();
        assert_eq!(record.version, 1);
        assert_eq!(record.body, json!({"x": 1}));
    }

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::new();
        assert!(store.get(Collection::ErrorLogs, "nope").unwrap().is_none());
    }

    #[test]
    fn test_create_only_conflicts_on_existing() {
        let mut store = MemoryStore::new();
        store
            .put(Collection::KnowledgeNodes, "a", json!(1), Some(0))
            .unwrap();

        let err = store
            .put(Collection::KnowledgeNodes, "a", json!(2), Some(0))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_conditional_update_detects_race() {
        let mut store = MemoryStore::new();
        store
            .put(Collection::KnowledgeNodes, "a", json!(1), Some(0))
            .unwrap();
        // Concurrent writer bumps the version
        store
            .put(Collection::KnowledgeNodes, "a", json!(2), Some(1))
            .unwrap();

        // Stale writer still expects version 1
        let err = store
            .put(Collection::KnowledgeNodes, "a", json!(3), Some(1))
            .unwrap_err();
        match err {
            StoreError::Conflict { expected, found } => {
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_unconditional_upsert() {
        let mut store = MemoryStore::new();
        store.put(Collection::ErrorLogs, "e", json!(1), None).unwrap();
        let v = store.put(Collection::ErrorLogs, "e", json!(2), None).unwrap();
        assert_eq!(v, 2);
    }

    #[test]
    fn test_query_ordered_by_id() {
        let mut store = MemoryStore::new();
        store.put(Collection::ErrorLogs, "b", json!(2), None).unwrap();
        store.put(Collection::ErrorLogs, "a", json!(1), None).unwrap();

        let ids: Vec<String> = store
            .query(Collection::ErrorLogs)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_delete() {
        let mut store = MemoryStore::new();
        store.put(Collection::ErrorLogs, "a", json!(1), None).unwrap();
        assert!(store.delete(Collection::ErrorLogs, "a").unwrap());
        assert!(!store.delete(Collection::ErrorLogs, "a").unwrap());
    }

    #[test]
    fn test_collections_are_isolated() {
        let mut store = MemoryStore::new();
        store
            .put(Collection::KnowledgeNodes, "a", json!(1), None)
            .unwrap();
        assert!(store.get(Collection::ErrorLogs, "a").unwrap().is_none());
    }
}
