//! The manifest — a derived two-way index over one codebase snapshot.
//!
//! Forward: pattern id → locations. Reverse: file path → { file hash,
//! pattern ids present, last-scanned timestamp }. Rebuilt after every
//! completed scan and swapped in atomically by renaming a temp file.
//! `BTreeMap` keys give the JSON stable key order.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use drift_core::errors::StoreError;
use drift_core::types::pattern::Pattern;
use serde::{Deserialize, Serialize};

/// Reverse-index entry for a single file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestFileEntry {
    pub hash: String,
    pub patterns: Vec<String>,
    pub last_scanned: i64,
}

/// Roll-up counts so a truncated export still tells the whole story.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestSummary {
    pub total_patterns: usize,
    pub total_files: usize,
    pub total_locations: usize,
    pub total_outliers: usize,
    /// Files dropped from a budgeted export; 0 in the full manifest.
    pub truncated_files: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// pattern id → files carrying at least one location of it.
    pub patterns: BTreeMap<String, Vec<String>>,
    /// file path → reverse entry.
    pub files: BTreeMap<String, ManifestFileEntry>,
    pub summary: ManifestSummary,
    pub generated_at: i64,
}

impl Manifest {
    /// Build the manifest from the committed pattern set plus the scanned
    /// file table (path → short hash). Files without patterns still appear
    /// in the reverse index with an empty pattern list.
    pub fn build(
        patterns: &[Pattern],
        file_hashes: &BTreeMap<String, String>,
        scanned_at: i64,
    ) -> Self {
        let mut forward: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut reverse: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut total_locations = 0usize;
        let mut total_outliers = 0usize;

        for pattern in patterns {
            total_locations += pattern.locations.len();
            total_outliers += pattern.outliers.len();
            for loc in &pattern.locations {
                forward
                    .entry(pattern.id.to_string())
                    .or_default()
                    .insert(loc.file.clone());
                reverse
                    .entry(loc.file.clone())
                    .or_default()
                    .insert(pattern.id.to_string());
            }
            // A pattern with only outliers still appears in the forward index.
            forward.entry(pattern.id.to_string()).or_default();
        }

        let files = file_hashes
            .iter()
            .map(|(path, hash)| {
                let ids = reverse.remove(path).unwrap_or_default();
                (
                    path.clone(),
                    ManifestFileEntry {
                        hash: hash.clone(),
                        patterns: ids.into_iter().collect(),
                        last_scanned: scanned_at,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        let summary = ManifestSummary {
            total_patterns: patterns.len(),
            total_files: files.len(),
            total_locations,
            total_outliers,
            truncated_files: 0,
        };

        Self {
            patterns: forward
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().collect()))
                .collect(),
            files,
            summary,
            generated_at: scanned_at,
        }
    }

    /// Serialize with two-space indent and stable key order.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Export under a byte budget: file entries are dropped from the
    /// largest manifest first until the serialization fits; the summary
    /// records how many were cut.
    pub fn to_budgeted_json(&self, max_bytes: usize) -> String {
        let full = self.to_json();
        if full.len() <= max_bytes {
            return full;
        }

        let mut trimmed = self.clone();
        while trimmed.to_json().len() > max_bytes && !trimmed.files.is_empty() {
            // Drop the lexicographically last file to keep output stable.
            let last = trimmed.files.keys().next_back().cloned();
            if let Some(key) = last {
                trimmed.files.remove(&key);
                trimmed.summary.truncated_files += 1;
            }
        }
        trimmed.to_json()
    }

    /// Write the manifest next to the other store files, atomically.
    pub fn write_atomic(&self, manifest_path: &Path) -> Result<(), StoreError> {
        let tmp_path = manifest_path.with_extension("json.tmp");
        let map_io = |e: std::io::Error| StoreError::Io {
            path: manifest_path.to_path_buf(),
            source: e,
        };

        let mut tmp = std::fs::File::create(&tmp_path).map_err(map_io)?;
        tmp.write_all(self.to_json().as_bytes()).map_err(map_io)?;
        tmp.sync_all().map_err(map_io)?;
        drop(tmp);
        std::fs::rename(&tmp_path, manifest_path).map_err(map_io)?;
        Ok(())
    }

    /// Load a previously written manifest.
    pub fn load(manifest_path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(manifest_path).map_err(|e| StoreError::Io {
            path: manifest_path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: manifest_path.to_path_buf(),
            message: format!("manifest decode: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::types::identifiers::PatternId;
    use drift_core::types::pattern::*;

    fn sample_pattern(id: &str, file: &str) -> Pattern {
        Pattern {
            id: PatternId(id.to_string()),
            name: id.to_string(),
            category: PatternCategory::Api,
            subcategory: "rest-route".to_string(),
            status: PatternStatus::Discovered,
            confidence: Confidence::from_score(0.9),
            locations: vec![PatternLocation {
                file: file.to_string(),
                start_line: 10,
                start_column: 0,
                end_line: 14,
                file_hash: "abc123def456".to_string(),
                signature: "envelope:{data}".to_string(),
            }],
            outliers: Vec::new(),
            severity: Severity::Warning,
            first_seen: 1,
            last_seen: 1,
            stale: false,
            description: String::new(),
        }
    }

    #[test]
    fn forward_and_reverse_agree() {
        let patterns = vec![sample_pattern("api/rest-route/x", "src/a.ts")];
        let mut hashes = BTreeMap::new();
        hashes.insert("src/a.ts".to_string(), "abc123def456".to_string());
        hashes.insert("src/b.ts".to_string(), "0011aabbccdd".to_string());

        let manifest = Manifest::build(&patterns, &hashes, 42);

        // Bijection: every (pattern, file) edge exists in both indices.
        for (pattern_id, files) in &manifest.patterns {
            for file in files {
                assert!(manifest.files[file].patterns.contains(pattern_id));
            }
        }
        for (file, entry) in &manifest.files {
            for pattern_id in &entry.patterns {
                assert!(manifest.patterns[pattern_id].contains(file));
            }
        }

        assert_eq!(manifest.files["src/b.ts"].patterns, Vec::<String>::new());
        assert_eq!(manifest.summary.total_files, 2);
        assert_eq!(manifest.summary.total_locations, 1);
    }

    #[test]
    fn empty_codebase_yields_empty_manifest() {
        let manifest = Manifest::build(&[], &BTreeMap::new(), 0);
        assert!(manifest.patterns.is_empty());
        assert!(manifest.files.is_empty());
        assert_eq!(manifest.summary.total_files, 0);
    }

    #[test]
    fn budgeted_export_records_truncation() {
        let patterns = vec![sample_pattern("api/rest-route/x", "src/a.ts")];
        let mut hashes = BTreeMap::new();
        for i in 0..50 {
            hashes.insert(format!("src/file{i:03}.ts"), "0011aabbccdd".to_string());
        }
        hashes.insert("src/a.ts".to_string(), "abc123def456".to_string());

        let manifest = Manifest::build(&patterns, &hashes, 42);
        let budgeted = manifest.to_budgeted_json(800);
        assert!(budgeted.len() <= 800);
        let parsed: Manifest = serde_json::from_str(&budgeted).unwrap();
        assert!(parsed.summary.truncated_files > 0);
    }
}
