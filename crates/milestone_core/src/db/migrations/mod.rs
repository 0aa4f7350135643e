//! Layout steps for the `kv_entries` medium.
//!
//! # Invariants
//! - Step versions are strictly increasing.
//! - A run applies all pending steps in one transaction or none of them.
//! - After a run the table carries every column in `REQUIRED_COLUMNS`.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step {
    version: 1,
    name: "create_kv_entries",
    sql: include_str!("0001_kv_entries.sql"),
}];

const REQUIRED_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

/// Layout version this build reads and writes.
pub fn supported_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Layout version recorded in the file.
pub fn stored_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings the medium to `supported_version`, then checks the table layout.
///
/// # Errors
/// - `NewerMedium` when the file is ahead of this build.
/// - `StepFailed` when a step's SQL fails; nothing is applied.
/// - `ForeignTable` when `kv_entries` is missing a required column.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = stored_version(conn)?;
    let supported = supported_version();
    if found > supported {
        return Err(DbError::NewerMedium { found, supported });
    }

    if found < supported {
        let tx = conn.transaction()?;
        for step in STEPS.iter().filter(|step| step.version > found) {
            tx.execute_batch(step.sql)
                .and_then(|()| {
                    tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))
                })
                .map_err(|source| DbError::StepFailed {
                    version: step.version,
                    step: step.name,
                    source,
                })?;
        }
        tx.commit()?;
        info!(
            "event=db_migrate module=db status=ok from_version={} to_version={}",
            found, supported
        );
    }

    verify_columns(conn)
}

fn verify_columns(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('kv_entries');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    match REQUIRED_COLUMNS
        .into_iter()
        .find(|required| !columns.iter().any(|column| column == required))
    {
        Some(missing_column) => {
            warn!(
                "event=db_migrate module=db status=error reason=foreign_table missing_column={missing_column}"
            );
            Err(DbError::ForeignTable { missing_column })
        }
        None => Ok(()),
    }
}
