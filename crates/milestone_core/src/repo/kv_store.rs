//! Durable key-value capability and in-memory implementation.
//!
//! # Responsibility
//! - Define the `read`/`write` contract the milestone store persists through.
//! - Provide an in-process medium for tests and embedders without a disk.
//!
//! # Invariants
//! - `read` distinguishes "absent" (`Ok(None)`) from medium failure (`Err`).
//! - A failed `write` leaves the previously stored value in place.

use crate::db::DbError;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of the durable medium.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// The medium refused the write (quota exceeded, read-only, ...).
    WriteRejected(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// The current value was never read back, so overwriting it could
    /// drop records.
    ContentsUnread,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WriteRejected(reason) => write!(f, "storage write rejected: {reason}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not bootstrapped: expected schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::ContentsUnread => write!(
                f,
                "stored value was never read successfully; refusing to overwrite it"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key-value medium the milestone store persists through.
pub trait KeyValueStore {
    /// Returns the stored text, or `None` when the key was never written.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the stored text for `key`.
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}

/// In-memory key-value medium.
///
/// Writes can be switched to fail, which models a full or unavailable
/// medium without touching the file system.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RefCell<HashMap<String, String>>,
    reject_writes: Cell<bool>,
    write_count: Cell<usize>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium pre-seeded with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::default();
        store.entries.borrow_mut().insert(key.into(), value.into());
        store
    }

    /// Makes every following `write` fail until switched back.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.write_count.get()
    }

    /// Returns a copy of the stored text without going through the trait.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.reject_writes.get() {
            return Err(StorageError::WriteRejected(
                "memory store is rejecting writes".to_string(),
            ));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.write_count.set(self.write_count.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKvStore, StorageError};

    #[test]
    fn read_of_unknown_key_is_absent() {
        let store = MemoryKvStore::new();
        assert_eq!(store.read("missing").unwrap(), None);
    }

    #[test]
    fn rejected_write_keeps_previous_value() {
        let store = MemoryKvStore::with_entry("k", "v1");
        store.set_reject_writes(true);

        let err = store.write("k", "v2").unwrap_err();
        assert!(matches!(err, StorageError::WriteRejected(_)));
        assert_eq!(store.get("k").as_deref(), Some("v1"));
        assert_eq!(store.write_count(), 0);

        store.set_reject_writes(false);
        store.write("k", "v2").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v2"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn shared_reference_forwards_to_inner_store() {
        let store = MemoryKvStore::new();
        let by_ref = &store;
        by_ref.write("k", "v").unwrap();
        assert_eq!(by_ref.read("k").unwrap().as_deref(), Some("v"));
    }
}
