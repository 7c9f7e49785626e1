//! Gate: pattern compliance on changed files.
//!
//! Fails when the compliance rate over the change set drops below the
//! configured floor, or when the change introduces more new outliers than
//! allowed. Only approved patterns gate; discovered patterns are still
//! learning and ignored ones carry no user intent.

use drift_core::types::pattern::{ConfidenceLevel, PatternStatus, Severity};

use crate::detectors::traits::Violation;
use crate::enforcement::context::GateContext;
use crate::enforcement::policy::Policy;
use crate::enforcement::types::{GateDetails, GateId, GateResult};

pub struct PatternComplianceGate;

impl super::QualityGate for PatternComplianceGate {
    fn id(&self) -> GateId {
        GateId::PatternCompliance
    }

    fn name(&self) -> &'static str {
        "Pattern Compliance"
    }

    fn evaluate(&self, ctx: &GateContext, policy: &Policy) -> GateResult {
        let config = &policy.pattern_compliance_config;
        let mut violations = Vec::new();
        let mut conforming = 0usize;
        let mut new_outliers = 0usize;
        let mut patterns_checked = 0usize;

        for pattern in &ctx.patterns {
            if pattern.status != PatternStatus::Approved {
                continue;
            }
            patterns_checked += 1;

            conforming += pattern
                .locations
                .iter()
                .filter(|l| ctx.is_changed(&l.file))
                .count();

            for outlier in &pattern.outliers {
                if !ctx.is_changed(&outlier.location.file) {
                    continue;
                }
                new_outliers += 1;
                let severity = match pattern.confidence.level {
                    ConfidenceLevel::High => Severity::Error,
                    ConfidenceLevel::Medium => Severity::Warning,
                    _ => Severity::Info,
                };
                violations.push(Violation {
                    id: format!(
                        "pattern-compliance:{}:{}",
                        outlier.location.file, outlier.location.start_line
                    ),
                    pattern_id: pattern.id.to_string(),
                    severity,
                    file: outlier.location.file.clone(),
                    start_line: outlier.location.start_line,
                    end_line: outlier.location.end_line,
                    message: format!(
                        "deviates from approved pattern `{}`: {}",
                        pattern.name, outlier.reason
                    ),
                    expected: pattern
                        .description
                        .strip_prefix("majority signature: ")
                        .unwrap_or(&pattern.description)
                        .to_string(),
                    actual: outlier.location.signature.clone(),
                    explanation: format!(
                        "Pattern `{}` is approved at {:.0}% confidence; divergence here breaks the established convention.",
                        pattern.id,
                        pattern.confidence.score * 100.0
                    ),
                    suggested_fix: None,
                    first_seen: pattern.first_seen,
                    occurrences: 1,
                });
            }
        }

        let checked = conforming + new_outliers;
        let compliance_rate = if checked == 0 {
            1.0
        } else {
            conforming as f64 / checked as f64
        };
        let score = compliance_rate * 100.0;
        let details = GateDetails::PatternCompliance {
            compliance_rate,
            new_outliers,
            patterns_checked,
        };

        let over_outlier_budget = new_outliers > config.max_new_outliers;
        let under_rate = compliance_rate < config.min_compliance_rate;

        if over_outlier_budget || under_rate {
            GateResult::fail(
                GateId::PatternCompliance,
                score,
                format!(
                    "compliance {:.1}% on changed files, {new_outliers} new outlier(s)",
                    score
                ),
                violations,
            )
            .with_details(details)
        } else if !violations.is_empty() {
            let warnings = violations.iter().map(|v| v.message.clone()).collect();
            GateResult::warn(
                GateId::PatternCompliance,
                score,
                format!("compliance {score:.1}% with tolerated outliers"),
                warnings,
            )
            .with_details(details)
        } else {
            GateResult::pass(
                GateId::PatternCompliance,
                score,
                format!("compliance {score:.1}% across {patterns_checked} approved pattern(s)"),
            )
            .with_details(details)
        }
    }
}
