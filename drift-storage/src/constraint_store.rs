//! The constraint store.
//!
//! Constraints are synthesized from approved patterns; rows are upserted by
//! id and invalidated (never deleted) when their evidence erodes, keeping an
//! audit trail.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use drift_core::errors::StoreError;
use drift_core::types::constraint::{Constraint, ConstraintStatus};
use drift_core::types::identifiers::PatternId;
use drift_core::types::pattern::PatternCategory;
use rusqlite::params;

use crate::connection::{sqlite_err, Database};
use crate::migrations;

pub struct ConstraintStore {
    db: Database,
    cache: RwLock<BTreeMap<String, Constraint>>,
}

impl ConstraintStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::open(path, migrations::constraints::migrate)?;
        let store = Self {
            db,
            cache: RwLock::new(BTreeMap::new()),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database::open_in_memory(migrations::constraints::migrate)?;
        let store = Self {
            db,
            cache: RwLock::new(BTreeMap::new()),
        };
        store.reload()?;
        Ok(store)
    }

    /// Persist a full set of constraints in one transaction (upsert by id),
    /// then refresh the read cache.
    pub fn save_all(&self, constraints: &[Constraint]) -> Result<(), StoreError> {
        self.db.with_tx(|tx| {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO constraints
                     (id, category, subcategory, rule, description, min_confidence,
                      source_patterns, status, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                     ON CONFLICT(id) DO UPDATE SET
                       rule = excluded.rule,
                       description = excluded.description,
                       min_confidence = excluded.min_confidence,
                       source_patterns = excluded.source_patterns,
                       status = excluded.status,
                       updated_at = excluded.updated_at",
                )
                .map_err(sqlite_err)?;
            for c in constraints {
                let sources = serde_json::to_string(
                    &c.source_patterns.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                )
                .unwrap_or_else(|_| "[]".to_string());
                stmt.execute(params![
                    c.id,
                    c.category.name(),
                    c.subcategory,
                    c.rule,
                    c.description,
                    c.min_confidence,
                    sources,
                    c.status.name(),
                    c.created_at,
                    c.updated_at,
                ])
                .map_err(sqlite_err)?;
            }
            Ok(())
        })?;
        self.reload()
    }

    pub fn get(&self, id: &str) -> Option<Constraint> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn get_all(&self) -> Vec<Constraint> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// Constraints that are still active (evidence intact).
    pub fn get_active(&self) -> Vec<Constraint> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|c| c.status == ConstraintStatus::Active)
            .cloned()
            .collect()
    }

    fn reload(&self) -> Result<(), StoreError> {
        let loaded = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, category, subcategory, rule, description, min_confidence,
                            source_patterns, status, created_at, updated_at
                     FROM constraints ORDER BY id",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, f64>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                        row.get::<_, i64>(8)?,
                        row.get::<_, i64>(9)?,
                    ))
                })
                .map_err(sqlite_err)?;

            let mut out = BTreeMap::new();
            for row in rows {
                let (id, category, subcategory, rule, description, min_confidence, sources, status, created_at, updated_at) =
                    row.map_err(sqlite_err)?;
                let category =
                    PatternCategory::parse(&category).unwrap_or(PatternCategory::Structural);
                let status =
                    ConstraintStatus::parse(&status).unwrap_or(ConstraintStatus::Invalidated);
                let source_patterns: Vec<PatternId> = serde_json::from_str::<Vec<String>>(&sources)
                    .unwrap_or_default()
                    .into_iter()
                    .map(PatternId)
                    .collect();
                out.insert(
                    id.clone(),
                    Constraint {
                        id,
                        category,
                        subcategory,
                        rule,
                        description,
                        min_confidence,
                        source_patterns,
                        status,
                        created_at,
                        updated_at,
                    },
                );
            }
            Ok(out)
        })?;
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = loaded;
        Ok(())
    }
}
