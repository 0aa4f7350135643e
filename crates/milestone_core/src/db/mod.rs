//! SQLite file that backs the durable key-value medium.
//!
//! The medium is one table, `kv_entries`, holding an opaque text value per
//! key. Its layout version lives in `PRAGMA user_version`, independent of
//! the milestone payload stored inside it.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// The medium file could not be opened or brought to the supported layout.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A layout step failed; every step of that run was rolled back.
    StepFailed {
        version: u32,
        step: &'static str,
        source: rusqlite::Error,
    },
    /// `kv_entries` exists but lacks a column the medium relies on.
    ForeignTable { missing_column: &'static str },
    /// The file was written by a newer build of the medium.
    NewerMedium { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::StepFailed {
                version,
                step,
                source,
            } => write!(f, "kv medium step {version} ({step}) failed: {source}"),
            Self::ForeignTable { missing_column } => write!(
                f,
                "table `kv_entries` was not created by this medium: missing column `{missing_column}`"
            ),
            Self::NewerMedium { found, supported } => write!(
                f,
                "kv medium layout {found} is newer than the supported layout {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::StepFailed { source: err, .. } => Some(err),
            Self::ForeignTable { .. } | Self::NewerMedium { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
