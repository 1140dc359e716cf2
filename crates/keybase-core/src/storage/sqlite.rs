//! SQLite storage backend.
//!
//! Each store is a single database file `<dir>/<name>.db` holding a `kv`
//! table and a small `meta` table. The connection runs in exclusive locking
//! mode with a zero busy timeout and writes during `open`, so it holds the
//! file lock for its whole lifetime and a second opener fails immediately.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::debug;

use crate::error::{KeybaseError, Result};
use crate::storage::traits::StorageEngine;
use crate::storage::types::{BatchOp, StoreMetadata, WriteBatch};

/// On-disk format version written to the `meta` table.
pub const FORMAT_VERSION: &str = "1";

/// File extension of store databases.
pub const FILE_EXTENSION: &str = "db";

/// SQLite-backed key-value store.
pub struct SqliteStorage {
    path: PathBuf,
    conn: Connection,
}

impl SqliteStorage {
    /// Path of the database file for store `name` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `KeybaseError::Validation` if the name is empty or would
    /// escape the directory.
    pub fn db_path(name: &str, dir: &Path) -> Result<PathBuf> {
        if name.trim().is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
        {
            return Err(KeybaseError::Validation(format!(
                "Invalid store name: '{}'",
                name
            )));
        }
        Ok(dir.join(format!("{}.{}", name, FILE_EXTENSION)))
    }

    /// Path of the open database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init(conn: &mut Connection) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key BLOB PRIMARY KEY,
                value BLOB NOT NULL
            ) WITHOUT ROWID;
            "#,
        )?;

        tx.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?1)",
            params![FORMAT_VERSION],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('created_at', ?1)",
            params![now],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('last_opened', ?1)",
            params![now],
        )?;

        let version: String = tx.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        if version != FORMAT_VERSION {
            return Err(KeybaseError::Storage(format!(
                "Unsupported store format version: {}",
                version
            )));
        }

        tx.commit()?;
        Ok(())
    }

    fn meta_timestamp(&self, key: &str) -> Result<DateTime<Utc>> {
        let value: String = self.conn.query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        DateTime::parse_from_rfc3339(&value)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| KeybaseError::Storage(format!("Invalid {} timestamp: {}", key, e)))
    }
}

impl StorageEngine for SqliteStorage {
    fn open(name: &str, dir: &Path) -> Result<Self> {
        let path = Self::db_path(name, dir)?;
        let mut conn = Connection::open(&path)?;

        conn.busy_timeout(Duration::ZERO)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "locking_mode", "EXCLUSIVE", |row| row.get(0))?;

        Self::init(&mut conn).map_err(|e| match e {
            KeybaseError::StorageBusy(_) => KeybaseError::StorageBusy(format!(
                "store '{}' is held by another handle",
                name
            )),
            other => other,
        })?;

        debug!(path = %path.display(), "opened sqlite store");
        Ok(Self { path, conn })
    }

    fn close(self) -> Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| KeybaseError::from(e))?;
        debug!(path = %path.display(), "closed sqlite store");
        Ok(())
    }

    fn metadata(&self) -> Result<StoreMetadata> {
        let format_version: String = self.conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreMetadata {
            format_version,
            created_at: self.meta_timestamp("created_at")?,
            last_opened: self.meta_timestamp("last_opened")?,
        })
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn iterate(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value FROM kv WHERE substr(key, 1, ?2) = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![prefix, prefix.len() as i64], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn write_batch(&mut self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for op in batch {
            match op {
                BatchOp::Put { key, value } => {
                    tx.execute(
                        "INSERT INTO kv (key, value) VALUES (?1, ?2)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        params![key, value],
                    )?;
                }
                BatchOp::Delete { key } => {
                    tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp(name: &str) -> (tempfile::TempDir, SqliteStorage) {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = SqliteStorage::open(name, dir.path()).expect("open should succeed");
        (dir, store)
    }

    #[test]
    fn test_open_creates_file_and_metadata() {
        let (dir, store) = open_temp("keys");
        assert!(dir.path().join("keys.db").exists());

        let meta = store.metadata().expect("metadata should load");
        assert_eq!(meta.format_version, FORMAT_VERSION);
        assert!(meta.last_opened >= meta.created_at);
        store.close().expect("close should succeed");
    }

    #[test]
    fn test_put_get_delete() {
        let (_dir, mut store) = open_temp("keys");

        assert_eq!(store.get(b"missing").unwrap(), None);
        store.put(b"alpha", b"1").unwrap();
        store.put(b"alpha", b"2").unwrap();
        assert_eq!(store.get(b"alpha").unwrap(), Some(b"2".to_vec()));

        store.delete(b"alpha").unwrap();
        store.delete(b"alpha").unwrap();
        assert_eq!(store.get(b"alpha").unwrap(), None);
    }

    #[test]
    fn test_iterate_filters_prefix_in_key_order() {
        let (_dir, mut store) = open_temp("keys");
        store.put(b"info/carol", b"c").unwrap();
        store.put(b"addr/00", b"x").unwrap();
        store.put(b"info/alice", b"a").unwrap();
        store.put(b"info/bob", b"b").unwrap();

        let keys: Vec<Vec<u8>> = store
            .iterate(b"info/")
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(
            keys,
            vec![
                b"info/alice".to_vec(),
                b"info/bob".to_vec(),
                b"info/carol".to_vec()
            ]
        );
        assert_eq!(store.iterate(b"").unwrap().len(), 4);
    }

    #[test]
    fn test_write_batch_applies_all_ops() {
        let (_dir, mut store) = open_temp("keys");
        store.put(b"old", b"gone").unwrap();

        let mut batch = WriteBatch::new();
        batch.put("a", "1").put("b", "2").delete("old");
        store.write_batch(batch).unwrap();

        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.get(b"old").unwrap(), None);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteStorage::open("keys", dir.path()).unwrap();
        store.put(b"k", b"v").unwrap();
        let created_at = store.metadata().unwrap().created_at;
        store.close().unwrap();

        let store = SqliteStorage::open("keys", dir.path()).unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.metadata().unwrap().created_at, created_at);
    }

    #[test]
    fn test_second_open_fails_fast_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let first = SqliteStorage::open("keys", dir.path()).unwrap();

        let err = SqliteStorage::open("keys", dir.path())
            .err()
            .expect("second open should fail");
        assert!(matches!(err, KeybaseError::StorageBusy(_)), "got {:?}", err);
        assert!(err.is_retryable());

        first.close().unwrap();
        SqliteStorage::open("keys", dir.path())
            .expect("open after close should succeed")
            .close()
            .unwrap();
    }

    #[test]
    fn test_invalid_store_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["", "  ", "..", "a/b", "a\\b"] {
            assert!(matches!(
                SqliteStorage::open(name, dir.path()),
                Err(KeybaseError::Validation(_))
            ));
        }
    }
}
