//! Connection pragmas applied to every store database.

use drift_core::errors::StoreError;
use rusqlite::Connection;

/// WAL for concurrent readers, NORMAL sync (WAL makes it durable enough),
/// busy timeout so short writer overlaps back off instead of failing.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(|e| StoreError::Sqlite {
        message: e.to_string(),
    })
}
