//! SQLite store backend

use crate::{Collection, RecordStore, StoreError, VersionedRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed [`RecordStore`]
///
/// Records are kept as JSON text in a single `records` table keyed by
/// (collection, id), with a version column driving conditional puts.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// `SqliteStore` instance.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crossweave_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("crossweave.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(&path).map_err(|e| {
            StoreError::Unavailable(format!(
                "cannot open database {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<VersionedRecord>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT version, body FROM records WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((version, body)) => Ok(Some(VersionedRecord {
                id: id.to_string(),
                version: version as u64,
                body: serde_json::from_str(&body)?,
            })),
            None => Ok(None),
        }
    }

    fn put(
        &mut self,
        collection: Collection,
        id: &str,
        body: serde_json::Value,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let tx = self.conn.transaction()?;

        let current: u64 = tx
            .query_row(
                "SELECT version FROM records WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|v| v as u64)
            .unwrap_or(0);

        if let Some(expected) = expected_version {
            if expected != current {
                return Err(StoreError::Conflict {
                    expected,
                    found: current,
                });
            }
        }

        let next = current + 1;
        tx.execute(
            "INSERT INTO records (collection, id, version, body) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, id) DO UPDATE SET version = ?3, body = ?4",
            params![collection.as_str(), id, next as i64, body.to_string()],
        )?;
        tx.commit()?;

        Ok(next)
    }

    fn query(&self, collection: Collection) -> Result<Vec<VersionedRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, version, body FROM records WHERE collection = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![collection.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, version, body) = row?;
            records.push(VersionedRecord {
                id,
                version: version as u64,
                body: serde_json::from_str(&body)?,
            });
        }
        Ok(records)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let affected = self.conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open_temp() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_put_get_roundtrip() {
        let (_dir, mut store) = open_temp();
        let v = store
            .put(Collection::KnowledgeNodes, "a", json!({"x": 1}), Some(0))
            .unwrap();
        assert_eq!(v, 1);

        let record = store.get(Collection::KnowledgeNodes, "a").unwrap().unwrap();
        assert_eq!(record.version, 1);
        assert_eq!(record.body, json!({"x": 1}));
    }

    #[test]
    fn test_conflict_on_stale_version() {
        let (_dir, mut store) = open_temp();
        store
            .put(Collection::KnowledgeNodes, "a", json!(1), Some(0))
            .unwrap();
        store
            .put(Collection::KnowledgeNodes, "a", json!(2), Some(1))
            .unwrap();

        let err = store
            .put(Collection::KnowledgeNodes, "a", json!(3), Some(1))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.db");

        {
            let mut store = SqliteStore::new(&path).unwrap();
            store
                .put(Collection::IntegrationHistory, "c1", json!({"n": 5}), None)
                .unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        let record = store
            .get(Collection::IntegrationHistory, "c1")
            .unwrap()
            .unwrap();
        assert_eq!(record.body, json!({"n": 5}));
    }

    #[test]
    fn test_query_and_delete() {
        let (_dir, mut store) = open_temp();
        store.put(Collection::ErrorLogs, "b", json!(2), None).unwrap();
        store.put(Collection::ErrorLogs, "a", json!(1), None).unwrap();

        let ids: Vec<String> = store
            .query(Collection::ErrorLogs)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(store.delete(Collection::ErrorLogs, "a").unwrap());
        assert!(!store.delete(Collection::ErrorLogs, "a").unwrap());
        assert_eq!(store.query(Collection::ErrorLogs).unwrap().len(), 1);
    }

    #[test]
    fn test_unreachable_path_is_unavailable() {
        let err = SqliteStore::new("/nonexistent-dir/deeper/test.db").unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
