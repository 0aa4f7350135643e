//! SQLite-backed key-value medium.
//!
//! # Responsibility
//! - Persist opaque text values under fixed keys in `kv_entries`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Only connections bootstrapped by `db::open_db*` are accepted.
//! - `write` is an upsert; one row per key.

use super::kv_store::{KeyValueStore, StorageError, StorageResult};
use crate::db::migrations::{stored_version, supported_version};
use log::error;
use rusqlite::{params, Connection, OptionalExtension};

const KV_TABLE: &str = "kv_entries";

/// Key-value store over a borrowed SQLite connection.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a bootstrapped connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when `kv_entries` does not exist.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        let expected_version = supported_version();
        let actual_version = stored_version(conn)?;
        if actual_version < expected_version {
            return Err(StorageError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [KV_TABLE],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Err(StorageError::MissingRequiredTable(KV_TABLE));
        }

        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        let result = self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                error!(
                    "event=kv_write module=repo status=error key={} bytes={} error={}",
                    key,
                    value.len(),
                    err
                );
                Err(err.into())
            }
        }
    }
}
