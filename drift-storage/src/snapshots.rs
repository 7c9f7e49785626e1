//! Health snapshots — durable captures of pattern state used as regression
//! baselines.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use drift_core::errors::StoreError;
use drift_core::types::pattern::Pattern;
use serde::{Deserialize, Serialize};

/// Per-pattern state captured at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotPattern {
    pub confidence: f64,
    /// locations / (locations + outliers), in [0,1].
    pub compliance: f64,
    pub status: String,
}

/// A point-in-time capture of the pattern store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthSnapshot {
    pub id: String,
    pub created_at: i64,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub commit_sha: Option<String>,
    pub patterns: BTreeMap<String, SnapshotPattern>,
}

impl HealthSnapshot {
    /// Capture the current pattern set.
    pub fn capture(
        id: &str,
        patterns: &[Pattern],
        branch: Option<&str>,
        commit_sha: Option<&str>,
        now: i64,
    ) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| {
                (
                    p.id.to_string(),
                    SnapshotPattern {
                        confidence: p.confidence.score,
                        compliance: p.compliance(),
                        status: p.status.name().to_string(),
                    },
                )
            })
            .collect();
        Self {
            id: id.to_string(),
            created_at: now,
            branch: branch.map(str::to_string),
            commit_sha: commit_sha.map(str::to_string),
            patterns,
        }
    }
}

/// Directory-backed snapshot storage (`.drift/snapshots/<id>.json`).
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn save(&self, snapshot: &HealthSnapshot) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        let path = self.path_for(&snapshot.id);
        let tmp = path.with_extension("json.tmp");
        let map_io = |e: std::io::Error| StoreError::Io {
            path: path.clone(),
            source: e,
        };
        let raw = serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Sqlite {
            message: format!("snapshot encode: {e}"),
        })?;
        let mut file = std::fs::File::create(&tmp).map_err(map_io)?;
        file.write_all(raw.as_bytes()).map_err(map_io)?;
        file.sync_all().map_err(map_io)?;
        drop(file);
        std::fs::rename(&tmp, &path).map_err(map_io)?;
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<HealthSnapshot, StoreError> {
        let path = self.path_for(id);
        let raw = std::fs::read_to_string(&path).map_err(|e| StoreError::Io {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path,
            message: format!("snapshot decode: {e}"),
        })
    }

    /// All snapshot ids present on disk, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = std::fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect();
        ids.sort();
        ids
    }

    /// The most recently created snapshot, if any.
    pub fn latest(&self) -> Option<HealthSnapshot> {
        self.list()
            .iter()
            .filter_map(|id| self.load(id).ok())
            .max_by_key(|s| s.created_at)
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

/// Ensure an id is safe as a file name.
pub fn sanitize_snapshot_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
