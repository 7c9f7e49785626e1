//! The pattern store.
//!
//! Mutations accumulate in a pending working set; `save_all` commits them
//! to `patterns.db` in a single transaction and publishes the new snapshot
//! to readers. Readers always observe the last committed state.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use drift_core::errors::StoreError;
use drift_core::types::identifiers::PatternId;
use drift_core::types::pattern::{
    Confidence, ConfidenceLevel, Pattern, PatternCategory, PatternLocation, PatternOutlier,
    PatternStatus, Severity,
};
use rusqlite::params;

use crate::connection::{sqlite_err, Database};
use crate::migrations;

/// Evidence cap per pattern. A detector returning tens of thousands of
/// matches on one file must not blow the store; excess locations are
/// dropped with a diagnostic.
pub const MAX_LOCATIONS_PER_PATTERN: usize = 2_000;

/// Days without a match before an approved pattern is flagged stale.
pub const STALE_AFTER_SECS: i64 = 30 * 24 * 60 * 60;

/// Confidence floor below which an approved pattern demotes to discovered.
pub const APPROVAL_CONFIDENCE_FLOOR: f64 = 0.5;

/// Partial update applied by [`PatternStore::update`].
#[derive(Debug, Default, Clone)]
pub struct PatternPatch {
    pub name: Option<String>,
    pub severity: Option<Severity>,
    pub description: Option<String>,
}

/// Aggregate statistics over the committed snapshot.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PatternStats {
    pub total_patterns: usize,
    pub discovered: usize,
    pub approved: usize,
    pub ignored: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_confidence_level: BTreeMap<String, usize>,
    pub total_locations: usize,
    pub total_outliers: usize,
    pub last_updated: i64,
}

pub struct PatternStore {
    db: Database,
    committed: RwLock<BTreeMap<PatternId, Pattern>>,
    pending: Mutex<BTreeMap<PatternId, Pattern>>,
}

impl PatternStore {
    /// Open `patterns.db` at the given path and load the committed state.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::open(path, migrations::patterns::migrate)?;
        let store = Self {
            db,
            committed: RwLock::new(BTreeMap::new()),
            pending: Mutex::new(BTreeMap::new()),
        };
        store.initialize()?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database::open_in_memory(migrations::patterns::migrate)?;
        let store = Self {
            db,
            committed: RwLock::new(BTreeMap::new()),
            pending: Mutex::new(BTreeMap::new()),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Load the committed rows into memory. The pending set starts as a
    /// copy so partial edits compose with existing state.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let loaded = self.load_all()?;
        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) = loaded.clone();
        *self.committed.write().unwrap_or_else(|e| e.into_inner()) = loaded;
        Ok(())
    }

    // ---- mutations (pending set) ----

    /// Insert or replace a pattern in the working set.
    pub fn add(&self, mut pattern: Pattern) {
        Self::enforce_caps(&mut pattern);
        pattern.normalize();
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pattern.id.clone(), pattern);
    }

    /// Apply a partial update to a pattern in the working set.
    pub fn update(&self, id: &PatternId, patch: PatternPatch) -> Result<(), StoreError> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let pattern = pending
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownPattern { id: id.to_string() })?;
        if let Some(name) = patch.name {
            pattern.name = name;
        }
        if let Some(severity) = patch.severity {
            pattern.severity = severity;
        }
        if let Some(description) = patch.description {
            pattern.description = description;
        }
        Ok(())
    }

    /// Remove a pattern from the working set (user deletion, terminal).
    pub fn remove(&self, id: &PatternId) -> Result<(), StoreError> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownPattern { id: id.to_string() })
    }

    // ---- lifecycle transitions ----

    /// `discovered → approved`. Requires at least one location. Approval
    /// never changes the confidence bucket.
    pub fn approve(&self, id: &PatternId) -> Result<(), StoreError> {
        self.transition(id, |p| match p.status {
            PatternStatus::Discovered | PatternStatus::Approved => {
                if p.locations.is_empty() {
                    Err("cannot approve a pattern with no locations".to_string())
                } else {
                    p.status = PatternStatus::Approved;
                    Ok(())
                }
            }
            PatternStatus::Ignored => {
                Err("ignored patterns must be un-ignored before approval".to_string())
            }
        })
    }

    /// `discovered → ignored`. Leaves locations and outliers untouched.
    pub fn ignore(&self, id: &PatternId) -> Result<(), StoreError> {
        self.transition(id, |p| match p.status {
            PatternStatus::Discovered | PatternStatus::Ignored => {
                p.status = PatternStatus::Ignored;
                Ok(())
            }
            PatternStatus::Approved => {
                Err("approved patterns cannot be ignored directly".to_string())
            }
        })
    }

    /// `ignored → discovered`.
    pub fn unignore(&self, id: &PatternId) -> Result<(), StoreError> {
        self.transition(id, |p| match p.status {
            PatternStatus::Ignored => {
                p.status = PatternStatus::Discovered;
                Ok(())
            }
            _ => Err("pattern is not ignored".to_string()),
        })
    }

    fn transition(
        &self,
        id: &PatternId,
        f: impl FnOnce(&mut Pattern) -> Result<(), String>,
    ) -> Result<(), StoreError> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let pattern = pending
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownPattern { id: id.to_string() })?;
        f(pattern).map_err(|message| StoreError::InvalidTransition {
            id: id.to_string(),
            message,
        })
    }

    /// Fold fresh scan evidence into the working set.
    ///
    /// For patterns seen this scan: evidence and confidence are replaced,
    /// `last_seen` advances, and an approved pattern whose confidence fell
    /// below the floor demotes to `discovered`. Approved patterns absent
    /// from the scan are flagged stale once past the staleness window;
    /// status and the user's intent are preserved.
    pub fn absorb_scan(&self, observed: Vec<Pattern>, now: i64) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let mut seen: std::collections::BTreeSet<PatternId> = std::collections::BTreeSet::new();

        for mut fresh in observed {
            Self::enforce_caps(&mut fresh);
            fresh.normalize();
            seen.insert(fresh.id.clone());
            match pending.get_mut(&fresh.id) {
                Some(existing) => {
                    existing.locations = fresh.locations;
                    existing.outliers = fresh.outliers;
                    existing.confidence = fresh.confidence;
                    existing.last_seen = now;
                    existing.stale = false;
                    if existing.status == PatternStatus::Approved
                        && existing.confidence.score < APPROVAL_CONFIDENCE_FLOOR
                    {
                        tracing::info!(
                            pattern = %existing.id,
                            score = existing.confidence.score,
                            "approved pattern demoted: confidence below floor"
                        );
                        existing.status = PatternStatus::Discovered;
                    }
                }
                None => {
                    fresh.first_seen = now;
                    fresh.last_seen = now;
                    fresh.status = PatternStatus::Discovered;
                    pending.insert(fresh.id.clone(), fresh);
                }
            }
        }

        for pattern in pending.values_mut() {
            if !seen.contains(&pattern.id)
                && pattern.status == PatternStatus::Approved
                && now - pattern.last_seen > STALE_AFTER_SECS
            {
                pattern.stale = true;
            }
        }
    }

    fn enforce_caps(pattern: &mut Pattern) {
        if pattern.locations.len() > MAX_LOCATIONS_PER_PATTERN {
            tracing::warn!(
                pattern = %pattern.id,
                dropped = pattern.locations.len() - MAX_LOCATIONS_PER_PATTERN,
                "pattern evidence truncated to cap"
            );
            pattern.locations.truncate(MAX_LOCATIONS_PER_PATTERN);
        }
        if pattern.outliers.len() > MAX_LOCATIONS_PER_PATTERN {
            tracing::warn!(
                pattern = %pattern.id,
                dropped = pattern.outliers.len() - MAX_LOCATIONS_PER_PATTERN,
                "pattern outliers truncated to cap"
            );
            pattern.outliers.truncate(MAX_LOCATIONS_PER_PATTERN);
        }
    }

    // ---- reads (committed snapshot) ----

    pub fn get(&self, id: &PatternId) -> Option<Pattern> {
        self.committed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn get_all(&self) -> Vec<Pattern> {
        self.committed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    pub fn get_by_category(&self, category: PatternCategory) -> Vec<Pattern> {
        self.committed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect()
    }

    pub fn get_by_status(&self, status: PatternStatus) -> Vec<Pattern> {
        self.committed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect()
    }

    /// Aggregate statistics over the committed snapshot.
    pub fn get_stats(&self) -> PatternStats {
        let committed = self.committed.read().unwrap_or_else(|e| e.into_inner());
        let mut stats = PatternStats::default();
        for p in committed.values() {
            stats.total_patterns += 1;
            match p.status {
                PatternStatus::Discovered => stats.discovered += 1,
                PatternStatus::Approved => stats.approved += 1,
                PatternStatus::Ignored => stats.ignored += 1,
            }
            *stats
                .by_category
                .entry(p.category.name().to_string())
                .or_default() += 1;
            *stats
                .by_confidence_level
                .entry(p.confidence.level.name().to_string())
                .or_default() += 1;
            stats.total_locations += p.locations.len();
            stats.total_outliers += p.outliers.len();
            stats.last_updated = stats.last_updated.max(p.last_seen);
        }
        stats
    }

    // ---- persistence ----

    /// Commit the working set: all-or-nothing transaction, then publish the
    /// new snapshot to readers.
    pub fn save_all(&self) -> Result<(), StoreError> {
        let snapshot = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        self.db.with_tx(|tx| {
            tx.execute("DELETE FROM pattern_locations", [])
                .map_err(sqlite_err)?;
            tx.execute("DELETE FROM patterns", []).map_err(sqlite_err)?;

            let mut insert_pattern = tx
                .prepare(
                    "INSERT INTO patterns
                     (id, name, category, subcategory, status, confidence_score,
                      confidence_level, severity, first_seen, last_seen, stale, description)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                )
                .map_err(sqlite_err)?;
            let mut insert_location = tx
                .prepare(
                    "INSERT INTO pattern_locations
                     (pattern_id, file, start_line, start_column, end_line,
                      file_hash, signature, is_outlier, reason)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )
                .map_err(sqlite_err)?;

            for pattern in snapshot.values() {
                insert_pattern
                    .execute(params![
                        pattern.id.as_str(),
                        pattern.name,
                        pattern.category.name(),
                        pattern.subcategory,
                        pattern.status.name(),
                        pattern.confidence.score,
                        pattern.confidence.level.name(),
                        pattern.severity.name(),
                        pattern.first_seen,
                        pattern.last_seen,
                        pattern.stale as i64,
                        pattern.description,
                    ])
                    .map_err(sqlite_err)?;
                for loc in &pattern.locations {
                    insert_location
                        .execute(params![
                            pattern.id.as_str(),
                            loc.file,
                            loc.start_line,
                            loc.start_column,
                            loc.end_line,
                            loc.file_hash,
                            loc.signature,
                            0i64,
                            Option::<String>::None,
                        ])
                        .map_err(sqlite_err)?;
                }
                for outlier in &pattern.outliers {
                    insert_location
                        .execute(params![
                            pattern.id.as_str(),
                            outlier.location.file,
                            outlier.location.start_line,
                            outlier.location.start_column,
                            outlier.location.end_line,
                            outlier.location.file_hash,
                            outlier.location.signature,
                            1i64,
                            Some(outlier.reason.clone()),
                        ])
                        .map_err(sqlite_err)?;
                }
            }
            Ok(())
        })?;

        *self.committed.write().unwrap_or_else(|e| e.into_inner()) = snapshot;
        Ok(())
    }

    fn load_all(&self) -> Result<BTreeMap<PatternId, Pattern>, StoreError> {
        self.db.with_conn(|conn| {
            let mut patterns: BTreeMap<PatternId, Pattern> = BTreeMap::new();

            let mut stmt = conn
                .prepare(
                    "SELECT id, name, category, subcategory, status, confidence_score,
                            severity, first_seen, last_seen, stale, description
                     FROM patterns ORDER BY id",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map([], |row| {
                    let id: String = row.get(0)?;
                    let category: String = row.get(2)?;
                    let status: String = row.get(4)?;
                    let severity: String = row.get(6)?;
                    Ok((
                        id,
                        row.get::<_, String>(1)?,
                        category,
                        row.get::<_, String>(3)?,
                        status,
                        row.get::<_, f64>(5)?,
                        severity,
                        row.get::<_, i64>(7)?,
                        row.get::<_, i64>(8)?,
                        row.get::<_, i64>(9)?,
                        row.get::<_, String>(10)?,
                    ))
                })
                .map_err(sqlite_err)?;

            for row in rows {
                let (
                    id,
                    name,
                    category,
                    subcategory,
                    status,
                    score,
                    severity,
                    first_seen,
                    last_seen,
                    stale,
                    description,
                ) = row.map_err(sqlite_err)?;

                let category = PatternCategory::parse(&category).ok_or_else(|| {
                    StoreError::Corrupt {
                        path: self.db.path().unwrap_or(Path::new(":memory:")).to_path_buf(),
                        message: format!("unknown pattern category: {category}"),
                    }
                })?;
                let status = PatternStatus::parse(&status).ok_or_else(|| {
                    StoreError::Corrupt {
                        path: self.db.path().unwrap_or(Path::new(":memory:")).to_path_buf(),
                        message: format!("unknown pattern status: {status}"),
                    }
                })?;
                let severity = match severity.as_str() {
                    "error" => Severity::Error,
                    "warning" => Severity::Warning,
                    "info" => Severity::Info,
                    "hint" => Severity::Hint,
                    other => {
                        return Err(StoreError::Corrupt {
                            path: self
                                .db
                                .path()
                                .unwrap_or(Path::new(":memory:"))
                                .to_path_buf(),
                            message: format!("unknown severity: {other}"),
                        })
                    }
                };

                patterns.insert(
                    PatternId(id.clone()),
                    Pattern {
                        id: PatternId(id),
                        name,
                        category,
                        subcategory,
                        status,
                        confidence: Confidence {
                            score,
                            level: ConfidenceLevel::from_score(score),
                        },
                        locations: Vec::new(),
                        outliers: Vec::new(),
                        severity,
                        first_seen,
                        last_seen,
                        stale: stale != 0,
                        description,
                    },
                );
            }

            drop(stmt);
            let mut loc_stmt = conn
                .prepare(
                    "SELECT pattern_id, file, start_line, start_column, end_line,
                            file_hash, signature, is_outlier, reason
                     FROM pattern_locations
                     ORDER BY pattern_id, file, start_line, start_column",
                )
                .map_err(sqlite_err)?;
            let rows = loc_stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        PatternLocation {
                            file: row.get(1)?,
                            start_line: row.get(2)?,
                            start_column: row.get(3)?,
                            end_line: row.get(4)?,
                            file_hash: row.get(5)?,
                            signature: row.get(6)?,
                        },
                        row.get::<_, i64>(7)?,
                        row.get::<_, Option<String>>(8)?,
                    ))
                })
                .map_err(sqlite_err)?;

            for row in rows {
                let (pattern_id, location, is_outlier, reason) = row.map_err(sqlite_err)?;
                if let Some(pattern) = patterns.get_mut(&PatternId(pattern_id)) {
                    if is_outlier != 0 {
                        pattern.outliers.push(PatternOutlier {
                            location,
                            reason: reason.unwrap_or_default(),
                        });
                    } else {
                        pattern.locations.push(location);
                    }
                }
            }

            Ok(patterns)
        })
    }
}

/// Current unix timestamp in seconds.
pub fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
