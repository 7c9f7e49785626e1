//! Detector execution engine.
//!
//! Fans detectors out across files on the rayon pool, isolates panics per
//! `(detector, file)`, merges observations into patterns with a
//! deterministic reduction, and classifies outliers. Repeated scans of an
//! unchanged codebase produce byte-identical pattern state.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use drift_core::types::collections::FxHashMap;
use drift_core::types::identifiers::PatternId;
use drift_core::types::pattern::{Pattern, PatternCategory, PatternStatus, Severity};
use rayon::prelude::*;

use super::context::{is_excluded_path, is_test_path, is_type_definition_path, DetectionContext};
use super::registry::DetectorRegistry;
use super::traits::{Observation, Violation};
use super::{confidence, outliers};
use crate::parsers::types::ParseResult;
use crate::provider::types::{DataAccessMatch, UnifiedCallChain};
use crate::scanner::Language;

/// Failures on this many files mark a detector unhealthy.
const UNHEALTHY_THRESHOLD: usize = 5;

/// Everything the engine needs about one file.
#[derive(Debug)]
pub struct FileInput {
    pub file: String,
    pub content: String,
    pub language: Language,
    pub parse: ParseResult,
    pub chains: Vec<UnifiedCallChain>,
    pub data_access: Vec<DataAccessMatch>,
    /// Short content hash.
    pub file_hash: String,
}

/// Per-detector failure accounting.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DetectorHealth {
    pub detector_id: String,
    pub failures: usize,
    pub unhealthy: bool,
}

/// The merged output of one detection run.
#[derive(Debug, Default)]
pub struct EngineOutput {
    pub patterns: Vec<Pattern>,
    pub violations: Vec<Violation>,
    /// Per-(detector, file) failure diagnostics.
    pub failures: Vec<String>,
    pub health: Vec<DetectorHealth>,
}

pub struct DetectorEngine {
    registry: DetectorRegistry,
}

impl DetectorEngine {
    pub fn new(registry: DetectorRegistry) -> Self {
        Self { registry }
    }

    pub fn with_defaults() -> Self {
        Self::new(DetectorRegistry::with_defaults())
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    /// Run every applicable detector over every file and merge the results.
    pub fn run(&self, files: &[FileInput], now: i64) -> EngineOutput {
        type Keyed = (PatternCategory, String, String, Observation);

        let per_file: Vec<(Vec<Keyed>, Vec<Violation>, Vec<(String, String)>)> = files
            .par_iter()
            .filter(|input| !is_excluded_path(&input.file))
            .map(|input| {
                let ctx = DetectionContext {
                    file: &input.file,
                    content: &input.content,
                    language: input.language,
                    parse: &input.parse,
                    chains: &input.chains,
                    data_access: &input.data_access,
                    is_test_file: is_test_path(&input.file),
                    is_type_definition: is_type_definition_path(&input.file),
                    file_hash: &input.file_hash,
                };

                let mut observations: Vec<Keyed> = Vec::new();
                let mut violations = Vec::new();
                let mut failures = Vec::new();

                for detector in self.registry.for_language(input.language) {
                    let outcome =
                        catch_unwind(AssertUnwindSafe(|| detector.detect(&ctx)));
                    match outcome {
                        Ok(result) => {
                            for obs in result.observations {
                                observations.push((
                                    detector.category(),
                                    detector.subcategory().to_string(),
                                    detector.name().to_string(),
                                    obs,
                                ));
                            }
                            violations.extend(result.violations);
                        }
                        Err(_) => {
                            tracing::error!(
                                detector = detector.id(),
                                file = %input.file,
                                "detector panicked; skipped for this file"
                            );
                            failures.push((
                                detector.id().to_string(),
                                format!("{} panicked on {}", detector.id(), input.file),
                            ));
                        }
                    }
                }

                (observations, violations, failures)
            })
            .collect();

        // File hash lookup for outlier bookkeeping.
        let hashes: FxHashMap<&str, &str> = files
            .iter()
            .map(|f| (f.file.as_str(), f.file_hash.as_str()))
            .collect();
        let hash_of = |file: &str| -> String {
            hashes.get(file).map(|h| h.to_string()).unwrap_or_default()
        };

        // Deterministic merge: BTreeMap on the stable pattern id.
        let mut grouped: BTreeMap<String, (PatternCategory, String, String, Vec<Observation>)> =
            BTreeMap::new();
        let mut violations = Vec::new();
        let mut failure_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut failures = Vec::new();

        for (observations, file_violations, file_failures) in per_file {
            for (category, subcategory, detector_name, obs) in observations {
                let id = PatternId::new(category.name(), &subcategory, &obs.pattern_key);
                grouped
                    .entry(id.to_string())
                    .or_insert_with(|| (category, subcategory, detector_name, Vec::new()))
                    .3
                    .push(obs);
            }
            violations.extend(file_violations);
            for (detector_id, message) in file_failures {
                *failure_counts.entry(detector_id).or_default() += 1;
                failures.push(message);
            }
        }

        let mut patterns = Vec::new();
        for (id, (category, subcategory, detector_name, mut observations)) in grouped {
            observations.sort_by(|a, b| {
                (&a.file, a.start_line, a.start_column).cmp(&(
                    &b.file,
                    b.start_line,
                    b.start_column,
                ))
            });

            let conf = confidence::score(&observations);
            let classified = outliers::classify(&observations, &hash_of);

            let mut pattern = Pattern {
                id: PatternId(id),
                name: detector_name,
                category,
                subcategory,
                status: PatternStatus::Discovered,
                confidence: conf,
                locations: classified.locations,
                outliers: classified.outliers,
                severity: default_severity(category),
                first_seen: now,
                last_seen: now,
                stale: false,
                description: classified
                    .majority_signature
                    .map(|s| format!("majority signature: {s}"))
                    .unwrap_or_default(),
            };
            pattern.normalize();
            patterns.push(pattern);
        }

        violations.sort_by(|a, b| {
            (a.severity, &a.file, a.start_line).cmp(&(b.severity, &b.file, b.start_line))
        });

        let health = failure_counts
            .into_iter()
            .map(|(detector_id, count)| DetectorHealth {
                unhealthy: count >= UNHEALTHY_THRESHOLD,
                detector_id,
                failures: count,
            })
            .collect();

        EngineOutput {
            patterns,
            violations,
            failures,
            health,
        }
    }
}

/// Default severity when a pattern in this category is violated.
fn default_severity(category: PatternCategory) -> Severity {
    match category {
        PatternCategory::Security | PatternCategory::Auth => Severity::Error,
        PatternCategory::Api
        | PatternCategory::DataAccess
        | PatternCategory::ErrorHandling => Severity::Warning,
        PatternCategory::Performance | PatternCategory::Testing => Severity::Warning,
        PatternCategory::Logging
        | PatternCategory::Documentation
        | PatternCategory::Accessibility
        | PatternCategory::Structural
        | PatternCategory::Observability => Severity::Info,
    }
}
