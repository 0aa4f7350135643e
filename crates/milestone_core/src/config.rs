//! Store configuration and environment lookups.

use crate::model::milestone::TitlePolicy;
use std::path::PathBuf;

/// Storage key the milestone collection lives under.
pub const DEFAULT_STORAGE_KEY: &str = "baby-milestones";

/// Environment variable overriding the SQLite database location.
pub const DB_PATH_ENV: &str = "MILESTONES_DB_PATH";

/// Default database file name used when no path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "milestones.sqlite3";

/// Milestone store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key the serialized collection is read from and written to.
    pub storage_key: String,
    /// Title rule applied by `create` and `update`.
    pub title_policy: TitlePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            title_policy: TitlePolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_title_policy(mut self, title_policy: TitlePolicy) -> Self {
        self.title_policy = title_policy;
        self
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }
}

/// Returns the database path from `MILESTONES_DB_PATH`, if set and non-blank.
pub fn db_path_from_env() -> Option<PathBuf> {
    let raw = std::env::var(DB_PATH_ENV).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

/// Resolves the database path: environment override, else the temp dir.
pub fn resolve_db_path() -> PathBuf {
    db_path_from_env().unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
}
