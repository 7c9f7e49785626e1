//! contracts.db schema.
//!
//! The backend endpoint, frontend calls and mismatches are stored as JSON
//! columns; the joinable keys (method, path) are first-class columns.

use drift_core::errors::StoreError;
use rusqlite::Connection;

const V001_CONTRACTS: &str = r#"
CREATE TABLE IF NOT EXISTS contracts (
    id TEXT PRIMARY KEY,
    method TEXT NOT NULL,
    normalized_path TEXT NOT NULL,
    backend TEXT NOT NULL,
    frontend_calls TEXT NOT NULL,
    mismatches TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'discovered',
    confidence REAL NOT NULL
) STRICT;

CREATE UNIQUE INDEX IF NOT EXISTS idx_contracts_route
    ON contracts(method, normalized_path);
"#;

/// Run the contracts.db migration set.
pub fn migrate(conn: &Connection) -> Result<(), StoreError> {
    super::run(conn, &[(V001_CONTRACTS, 1)])
}
