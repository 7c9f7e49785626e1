//! patterns.db schema.

use drift_core::errors::StoreError;
use rusqlite::Connection;

const V001_PATTERNS: &str = r#"
CREATE TABLE IF NOT EXISTS patterns (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'discovered',
    confidence_score REAL NOT NULL,
    confidence_level TEXT NOT NULL,
    severity TEXT NOT NULL,
    first_seen INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    stale INTEGER NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT ''
) STRICT;

CREATE INDEX IF NOT EXISTS idx_patterns_category ON patterns(category);
CREATE INDEX IF NOT EXISTS idx_patterns_status ON patterns(status);

CREATE TABLE IF NOT EXISTS pattern_locations (
    pattern_id TEXT NOT NULL REFERENCES patterns(id) ON DELETE CASCADE,
    file TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    start_column INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    file_hash TEXT NOT NULL,
    signature TEXT NOT NULL,
    is_outlier INTEGER NOT NULL DEFAULT 0,
    reason TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_locations_pattern ON pattern_locations(pattern_id);
CREATE INDEX IF NOT EXISTS idx_locations_file ON pattern_locations(file);
"#;

/// Run the patterns.db migration set.
pub fn migrate(conn: &Connection) -> Result<(), StoreError> {
    super::run(conn, &[(V001_PATTERNS, 1)])
}
