//! # drift-storage
//!
//! Durable storage for Drift, rooted at `<project>/.drift/`:
//!
//! ```text
//! .drift/
//!   patterns.db       pattern store
//!   constraints.db    constraint store
//!   contracts.db      BE↔FE contracts
//!   manifest.json     derived forward+reverse index
//!   snapshots/        health snapshots for regression baselines
//! ```
//!
//! Store files are a private format; callers go through the store APIs.
//! Writes are transactional per `save_all`; readers observe the last
//! committed state.

pub mod connection;
pub mod constraint_store;
pub mod contract_store;
pub mod manifest;
pub mod migrations;
pub mod pattern_store;
pub mod snapshots;

use std::path::{Path, PathBuf};

pub use constraint_store::ConstraintStore;
pub use contract_store::ContractStore;
pub use manifest::{Manifest, ManifestFileEntry, ManifestSummary};
pub use pattern_store::{now_secs, PatternPatch, PatternStats, PatternStore};
pub use snapshots::{HealthSnapshot, SnapshotStore};

/// Resolved layout of the `.drift/` directory.
#[derive(Debug, Clone)]
pub struct DriftHome {
    root: PathBuf,
}

impl DriftHome {
    /// Resolve (and create) `.drift/` under the given project root.
    pub fn create(project_root: &Path) -> std::io::Result<Self> {
        let root = project_root.join(".drift");
        std::fs::create_dir_all(root.join("snapshots"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patterns_db(&self) -> PathBuf {
        self.root.join("patterns.db")
    }

    pub fn constraints_db(&self) -> PathBuf {
        self.root.join("constraints.db")
    }

    pub fn contracts_db(&self) -> PathBuf {
        self.root.join("contracts.db")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.root.join("snapshots")
    }

    pub fn policies_dir(&self) -> PathBuf {
        self.root.join("policies")
    }

    pub fn rules_dir(&self) -> PathBuf {
        self.root.join("rules")
    }
}
