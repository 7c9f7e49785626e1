//! constraints.db schema.

use drift_core::errors::StoreError;
use rusqlite::Connection;

const V001_CONSTRAINTS: &str = r#"
CREATE TABLE IF NOT EXISTS constraints (
    id TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    subcategory TEXT NOT NULL,
    rule TEXT NOT NULL,
    description TEXT NOT NULL,
    min_confidence REAL NOT NULL,
    source_patterns TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_constraints_category ON constraints(category);
CREATE INDEX IF NOT EXISTS idx_constraints_status ON constraints(status);
"#;

/// Run the constraints.db migration set.
pub fn migrate(conn: &Connection) -> Result<(), StoreError> {
    super::run(conn, &[(V001_CONSTRAINTS, 1)])
}
