//! The scan session — owner of all per-scan intermediate state.
//!
//! Wires walker → parsers → provider → detectors → stores → manifest, and
//! exposes the quality-gate entry point. Stores are the only shared
//! mutable state; detectors read an immutable snapshot taken at scan
//! start, and the manifest is swapped in atomically at scan end.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use drift_core::config::DriftConfig;
use drift_core::errors::PipelineError;
use drift_core::events::ScanEventHandler;
use drift_core::types::collections::FxHashMap;
use drift_core::CancellationToken;
use rayon::prelude::*;

use drift_storage::{
    now_secs, ConstraintStore, ContractStore, DriftHome, HealthSnapshot, Manifest, PatternStore,
    SnapshotStore,
};

use crate::constraints;
use crate::contracts;
use crate::detectors::engine::{DetectorEngine, EngineOutput, FileInput};
use crate::enforcement::context::GateContext;
use crate::enforcement::orchestrator::{GateRequest, Orchestrator};
use crate::enforcement::policy::{self, BaselineRef};
use crate::enforcement::rules;
use crate::enforcement::types::{GateId, QualityGateResult};
use crate::graph::call_graph::CallGraph;
use crate::parsers::ParserRegistry;
use crate::provider::{chains, MatcherEngine};
use crate::scanner::types::{CachedFile, ScanDiff};
use crate::scanner::Scanner;

/// Snapshot id used for the rolling last-scan baseline.
const LAST_SCAN_SNAPSHOT: &str = "last-scan";

/// Summary of one completed scan.
#[derive(Debug)]
pub struct ScanReport {
    pub diff: ScanDiff,
    pub patterns_discovered: usize,
    pub constraints: constraints::SynthesisOutcome,
    pub contracts: usize,
    pub detector_failures: Vec<String>,
}

/// Owns the stores and per-scan machinery for one project.
pub struct ScanSession {
    project_root: PathBuf,
    config: DriftConfig,
    home: DriftHome,
    patterns: PatternStore,
    constraints: ConstraintStore,
    contracts: ContractStore,
    snapshots: SnapshotStore,
    parsers: ParserRegistry,
    matchers: MatcherEngine,
    detectors: DetectorEngine,
    scanner: Scanner,
}

impl ScanSession {
    /// Open (creating if needed) the `.drift/` stores for a project.
    pub fn open(project_root: &Path, config: DriftConfig) -> Result<Self, PipelineError> {
        let home = DriftHome::create(project_root).map_err(|e| {
            drift_core::errors::StoreError::Io {
                path: project_root.join(".drift"),
                source: e,
            }
        })?;
        let patterns = PatternStore::open(&home.patterns_db())?;
        let constraints = ConstraintStore::open(&home.constraints_db())?;
        let contracts = ContractStore::open(&home.contracts_db())?;
        let snapshots = SnapshotStore::new(home.snapshots_dir());
        let scanner = Scanner::new(config.scan.clone());

        Ok(Self {
            project_root: project_root.to_path_buf(),
            config,
            home,
            patterns,
            constraints,
            contracts,
            snapshots,
            parsers: ParserRegistry::with_defaults(),
            matchers: MatcherEngine::with_defaults(),
            detectors: DetectorEngine::with_defaults(),
            scanner,
        })
    }

    pub fn cancellation(&self) -> &CancellationToken {
        self.scanner.cancellation()
    }

    pub fn pattern_store(&self) -> &PatternStore {
        &self.patterns
    }

    pub fn constraint_store(&self) -> &ConstraintStore {
        &self.constraints
    }

    pub fn contract_store(&self) -> &ContractStore {
        &self.contracts
    }

    /// Run a full scan: discover, parse, detect, persist, re-index.
    pub fn scan(&self, events: &dyn ScanEventHandler) -> Result<ScanReport, PipelineError> {
        let now = now_secs();

        // Previous snapshot from the manifest, if any.
        let cached = self.load_cached_files();
        let diff = self.scanner.scan(&self.project_root, &cached, events)?;

        // Parse + chain + match every parseable file.
        let inputs = self.build_file_inputs(&diff);

        // Detect and fold into the store.
        let output: EngineOutput = self.detectors.run(&inputs, now);
        let patterns_discovered = output.patterns.len();
        self.patterns.absorb_scan(output.patterns, now);
        self.patterns.save_all()?;

        // Constraints from the committed pattern set.
        let committed = self.patterns.get_all();
        let (constraint_set, constraint_outcome) = constraints::synthesize(
            &committed,
            &self.constraints.get_all(),
            constraints::synthesizer::DEFAULT_MIN_CONFIDENCE,
            now,
        );
        self.constraints.save_all(&constraint_set)?;

        // Contracts.
        let mut endpoints = Vec::new();
        let mut calls = Vec::new();
        for input in &inputs {
            endpoints.extend(contracts::extract_backend_endpoints(
                &input.content,
                &input.file,
                input.language,
            ));
            calls.extend(contracts::extract_frontend_calls(
                &input.content,
                &input.file,
                input.language,
            ));
        }
        let matched = contracts::match_contracts(endpoints, calls);
        let contract_count = matched.contracts.len();
        self.contracts.save_all(&matched.contracts)?;

        // Manifest: derived view, swapped in atomically.
        let file_hashes: BTreeMap<String, String> = diff
            .files
            .iter()
            .map(|(path, record)| (path.clone(), record.short_hash.clone()))
            .collect();
        let manifest = Manifest::build(&committed, &file_hashes, now);
        manifest.write_atomic(&self.home.manifest_path())?;

        // Rolling baseline for the regression gate.
        let snapshot = HealthSnapshot::capture(LAST_SCAN_SNAPSHOT, &committed, None, None, now);
        self.snapshots.save(&snapshot)?;

        Ok(ScanReport {
            diff,
            patterns_discovered,
            constraints: constraint_outcome,
            contracts: contract_count,
            detector_failures: output.failures,
        })
    }

    /// Run the quality gates for a change set.
    pub fn check(&self, request: &GateRequest) -> Result<QualityGateResult, PipelineError> {
        let policy = policy::resolve_policy(
            request.policy.as_deref(),
            request.branch.as_deref(),
            Some(&self.home.policies_dir()),
        )?;

        let ctx =
            self.build_gate_context(&policy, &request.files, request.base_branch.as_deref())?;
        let orchestrator = Orchestrator::new().with_timeout(std::time::Duration::from_secs(
            self.config.gates.gate_timeout_secs,
        ));
        let mut request = request.clone();
        request.fail_on_warning =
            request.fail_on_warning || self.config.gates.fail_on_warning;
        Ok(orchestrator.run(&ctx, &policy, &request))
    }

    /// Build the shared gate context, loading expensive inputs only when
    /// an enabled gate needs them.
    fn build_gate_context(
        &self,
        policy: &policy::Policy,
        files: &[String],
        base_branch: Option<&str>,
    ) -> Result<GateContext, PipelineError> {
        let mut ctx = GateContext {
            changed_files: files.to_vec(),
            patterns: self.patterns.get_all(),
            ..Default::default()
        };

        let enabled = policy.enabled_gates();

        if enabled.contains(&GateId::ConstraintVerification) {
            ctx.constraints = self.constraints.get_all();
        }

        if enabled.contains(&GateId::RegressionDetection) {
            ctx.baseline = match &policy.regression_config.baseline {
                BaselineRef::LastScan => self.snapshots.load(LAST_SCAN_SNAPSHOT).ok(),
                BaselineRef::Snapshot(id) => self.snapshots.load(id).ok(),
                // A snapshot named after the merge-base branch, if one was
                // captured; otherwise fall back to the newest snapshot.
                BaselineRef::BranchBase => base_branch
                    .and_then(|branch| {
                        self.snapshots
                            .load(&drift_storage::snapshots::sanitize_snapshot_id(branch))
                            .ok()
                    })
                    .or_else(|| self.snapshots.latest()),
            };
        }

        if enabled.contains(&GateId::CustomRules) {
            if policy.custom_rules_config.load_rule_files
                || policy.custom_rules_config.rules.is_empty()
            {
                ctx.custom_rules = rules::load_rule_files(&self.home.rules_dir())?;
            }
            for file in files {
                let path = self.project_root.join(file);
                if let Ok(content) = std::fs::read_to_string(&path) {
                    ctx.file_contents.insert(file.clone(), content);
                }
            }
        }

        let needs_graph = enabled.contains(&GateId::ImpactSimulation);
        let needs_access = enabled.contains(&GateId::SecurityBoundary);
        if needs_graph || needs_access {
            let manifest = Manifest::load(&self.home.manifest_path()).ok();
            let all_files: Vec<String> = manifest
                .map(|m| m.files.keys().cloned().collect())
                .unwrap_or_else(|| files.to_vec());
            let inputs = self.parse_files(&all_files);

            if needs_access {
                ctx.data_access = inputs
                    .iter()
                    .filter(|i| files.contains(&i.file))
                    .flat_map(|i| i.data_access.iter().cloned())
                    .collect();
            }
            if needs_graph {
                let parses: Vec<_> = inputs.into_iter().map(|i| i.parse).collect();
                ctx.call_graph = Some(CallGraph::build(&parses));
            }
        }

        Ok(ctx)
    }

    fn load_cached_files(&self) -> FxHashMap<String, CachedFile> {
        let Ok(manifest) = Manifest::load(&self.home.manifest_path()) else {
            return FxHashMap::default();
        };
        manifest
            .files
            .into_iter()
            .map(|(path, entry)| {
                (
                    path.clone(),
                    CachedFile {
                        relative_path: path,
                        content_hash: entry.hash,
                        // The manifest keeps short hashes; mtime is not
                        // tracked there, so rescans fall back to hashing.
                        mtime_secs: 0,
                    },
                )
            })
            .collect()
    }

    /// Parse, chain-extract and matcher-run one batch of files.
    fn build_file_inputs(&self, diff: &ScanDiff) -> Vec<FileInput> {
        let files: Vec<_> = diff.files.values().collect();
        files
            .par_iter()
            .filter_map(|record| {
                let language = record.language?;
                let content = std::fs::read_to_string(&record.path).ok()?;
                let parse = self
                    .parsers
                    .parse(language, content.as_bytes(), Path::new(&record.relative_path))
                    .ok()?;
                let file_chains = chains::extract_chains(&content, &record.relative_path, language);
                let data_access = file_chains
                    .iter()
                    .filter_map(|chain| self.matchers.match_chain(chain))
                    .collect();
                Some(FileInput {
                    file: record.relative_path.clone(),
                    content,
                    language,
                    parse,
                    chains: file_chains,
                    data_access,
                    file_hash: record.short_hash.clone(),
                })
            })
            .collect()
    }

    fn parse_files(&self, files: &[String]) -> Vec<FileInput> {
        files
            .par_iter()
            .filter_map(|file| {
                let path = self.project_root.join(file);
                let content = std::fs::read_to_string(&path).ok()?;
                let ext = path.extension().and_then(|e| e.to_str());
                let language =
                    crate::scanner::Language::classify(ext, content.as_bytes())?;
                let parse = self
                    .parsers
                    .parse(language, content.as_bytes(), Path::new(file))
                    .ok()?;
                let file_chains = chains::extract_chains(&content, file, language);
                let data_access = file_chains
                    .iter()
                    .filter_map(|chain| self.matchers.match_chain(chain))
                    .collect();
                Some(FileInput {
                    file: file.clone(),
                    content,
                    language,
                    parse,
                    chains: file_chains,
                    data_access,
                    file_hash: String::new(),
                })
            })
            .collect()
    }
}
