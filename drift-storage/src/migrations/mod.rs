//! Schema migrations via `PRAGMA user_version`.
//!
//! Each store file has its own migration set; versions are sequential and
//! applied inside the opening connection before any query runs.

pub mod constraints;
pub mod contracts;
pub mod patterns;

use drift_core::errors::StoreError;
use rusqlite::Connection;

/// Apply migrations that are newer than the file's current version.
pub(crate) fn run(
    conn: &Connection,
    migrations: &[(&str, u32)],
) -> Result<(), StoreError> {
    let current: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StoreError::MigrationFailed {
            version: 0,
            message: e.to_string(),
        })?;

    for (sql, version) in migrations {
        if current < *version {
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
            conn.pragma_update(None, "user_version", version).map_err(|e| {
                StoreError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                }
            })?;
            tracing::info!(version, "applied store migration");
        }
    }
    Ok(())
}
