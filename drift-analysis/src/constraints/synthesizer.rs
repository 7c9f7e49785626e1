//! Constraint synthesis from approved patterns.
//!
//! One constraint per `(category, subcategory)` whose approved evidence
//! clears the confidence floor. Ignored patterns contribute nothing.
//! Constraints whose evidence erodes are invalidated, never deleted.

use std::collections::BTreeMap;

use drift_core::types::constraint::{Constraint, ConstraintStatus};
use drift_core::types::pattern::{Pattern, PatternStatus};

/// Default evidence floor.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.85;

/// Counts of what one synthesis pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisOutcome {
    pub discovered: usize,
    pub updated: usize,
    pub invalidated: usize,
}

/// Synthesize the constraint set from the current pattern population.
///
/// `existing` is the previously persisted set; the returned vector is the
/// complete new set to persist (surviving, updated, and invalidated rows).
pub fn synthesize(
    patterns: &[Pattern],
    existing: &[Constraint],
    min_confidence: f64,
    now: i64,
) -> (Vec<Constraint>, SynthesisOutcome) {
    // Evidence: approved patterns above the floor, grouped by
    // (category, subcategory).
    let mut groups: BTreeMap<(String, String), Vec<&Pattern>> = BTreeMap::new();
    for pattern in patterns {
        if pattern.status != PatternStatus::Approved {
            continue;
        }
        if pattern.confidence.score < min_confidence {
            continue;
        }
        groups
            .entry((
                pattern.category.name().to_string(),
                pattern.subcategory.clone(),
            ))
            .or_default()
            .push(pattern);
    }

    let mut outcome = SynthesisOutcome::default();
    let mut result: Vec<Constraint> = Vec::new();
    let mut seen_ids: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();

    for ((category_name, subcategory), evidence) in &groups {
        let id = format!("constraint/{category_name}/{subcategory}");
        seen_ids.insert(id.clone());

        let category = evidence[0].category;
        let majority = majority_signature(evidence);
        let rule = format!("signature == \"{majority}\"");
        let description = format!(
            "{} occurrences in `{category_name}/{subcategory}` must match the approved shape `{majority}`",
            evidence.iter().map(|p| p.locations.len()).sum::<usize>(),
        );
        let source_patterns = evidence.iter().map(|p| p.id.clone()).collect();

        match existing.iter().find(|c| c.id == id) {
            Some(previous) => {
                outcome.updated += 1;
                result.push(Constraint {
                    id,
                    category,
                    subcategory: subcategory.clone(),
                    rule,
                    description,
                    min_confidence,
                    source_patterns,
                    status: ConstraintStatus::Active,
                    created_at: previous.created_at,
                    updated_at: now,
                });
            }
            None => {
                outcome.discovered += 1;
                result.push(Constraint {
                    id,
                    category,
                    subcategory: subcategory.clone(),
                    rule,
                    description,
                    min_confidence,
                    source_patterns,
                    status: ConstraintStatus::Active,
                    created_at: now,
                    updated_at: now,
                });
            }
        }
    }

    // Constraints with no surviving evidence are invalidated in place.
    for previous in existing {
        if seen_ids.contains(&previous.id) {
            continue;
        }
        let mut retired = previous.clone();
        if retired.status == ConstraintStatus::Active {
            outcome.invalidated += 1;
            retired.status = ConstraintStatus::Invalidated;
            retired.updated_at = now;
        }
        result.push(retired);
    }

    result.sort_by(|a, b| a.id.cmp(&b.id));
    (result, outcome)
}

/// The dominant location signature across a group's evidence.
fn majority_signature(evidence: &[&Pattern]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for pattern in evidence {
        for location in &pattern.locations {
            *counts.entry(location.signature.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(sig, _)| sig.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::types::identifiers::PatternId;
    use drift_core::types::pattern::*;

    fn pattern(id: &str, status: PatternStatus, score: f64, signature: &str) -> Pattern {
        Pattern {
            id: PatternId(id.to_string()),
            name: "p".to_string(),
            category: PatternCategory::Api,
            subcategory: "rest-route".to_string(),
            status,
            confidence: Confidence::from_score(score),
            locations: vec![PatternLocation {
                file: "src/a.ts".to_string(),
                start_line: 1,
                start_column: 0,
                end_line: 1,
                file_hash: "aaa".to_string(),
                signature: signature.to_string(),
            }],
            outliers: Vec::new(),
            severity: Severity::Warning,
            first_seen: 0,
            last_seen: 0,
            stale: false,
            description: String::new(),
        }
    }

    #[test]
    fn approved_evidence_creates_constraint() {
        let patterns = vec![pattern("api/rest-route/envelope", PatternStatus::Approved, 0.9, "envelope:{data}")];
        let (constraints, outcome) = synthesize(&patterns, &[], DEFAULT_MIN_CONFIDENCE, 100);
        assert_eq!(outcome.discovered, 1);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].id, "constraint/api/rest-route");
        assert_eq!(constraints[0].rule, "signature == \"envelope:{data}\"");
        assert_eq!(constraints[0].source_patterns[0].as_str(), "api/rest-route/envelope");
    }

    #[test]
    fn ignored_and_discovered_patterns_contribute_nothing() {
        let patterns = vec![
            pattern("api/rest-route/a", PatternStatus::Ignored, 0.95, "x"),
            pattern("api/rest-route/b", PatternStatus::Discovered, 0.95, "x"),
        ];
        let (constraints, outcome) = synthesize(&patterns, &[], DEFAULT_MIN_CONFIDENCE, 100);
        assert!(constraints.is_empty());
        assert_eq!(outcome, SynthesisOutcome::default());
    }

    #[test]
    fn eroded_evidence_invalidates_existing() {
        let patterns = vec![pattern("api/rest-route/a", PatternStatus::Approved, 0.9, "x")];
        let (first, _) = synthesize(&patterns, &[], DEFAULT_MIN_CONFIDENCE, 100);

        // Confidence drops below the floor on re-scan.
        let weakened = vec![pattern("api/rest-route/a", PatternStatus::Approved, 0.6, "x")];
        let (second, outcome) = synthesize(&weakened, &first, DEFAULT_MIN_CONFIDENCE, 200);
        assert_eq!(outcome.invalidated, 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].status, ConstraintStatus::Invalidated);
        // Retained for audit, not deleted.
        assert_eq!(second[0].created_at, 100);
    }

    #[test]
    fn resynthesis_updates_in_place() {
        let patterns = vec![pattern("api/rest-route/a", PatternStatus::Approved, 0.9, "x")];
        let (first, _) = synthesize(&patterns, &[], DEFAULT_MIN_CONFIDENCE, 100);
        let (second, outcome) = synthesize(&patterns, &first, DEFAULT_MIN_CONFIDENCE, 200);
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.discovered, 0);
        assert_eq!(second[0].created_at, 100);
        assert_eq!(second[0].updated_at, 200);
    }
}
