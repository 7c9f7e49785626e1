//! Gate: regression detection against a baseline snapshot.
//!
//! Compares per-pattern confidence and compliance to the baseline. With no
//! baseline available the gate is skipped with a warning, never failed.

use crate::enforcement::context::GateContext;
use crate::enforcement::policy::Policy;
use crate::enforcement::types::{GateDetails, GateId, GateResult};

pub struct RegressionGate;

impl super::QualityGate for RegressionGate {
    fn id(&self) -> GateId {
        GateId::RegressionDetection
    }

    fn name(&self) -> &'static str {
        "Regression Detection"
    }

    fn evaluate(&self, ctx: &GateContext, policy: &Policy) -> GateResult {
        let config = &policy.regression_config;

        let Some(baseline) = &ctx.baseline else {
            return GateResult::skipped(
                GateId::RegressionDetection,
                "no baseline snapshot available; gate skipped".to_string(),
            );
        };

        let mut worst_confidence_drop = 0.0f64;
        let mut worst_compliance_drop = 0.0f64;
        let mut regressed = Vec::new();

        for pattern in &ctx.patterns {
            let Some(base) = baseline.patterns.get(pattern.id.as_str()) else {
                continue;
            };
            // Drops in percentage points.
            let confidence_drop = (base.confidence - pattern.confidence.score) * 100.0;
            let compliance_drop = (base.compliance - pattern.compliance()) * 100.0;
            worst_confidence_drop = worst_confidence_drop.max(confidence_drop);
            worst_compliance_drop = worst_compliance_drop.max(compliance_drop);

            if confidence_drop > config.max_confidence_drop
                || compliance_drop > config.max_compliance_drop
            {
                regressed.push(format!(
                    "`{}`: confidence {:.2} → {:.2}, compliance {:.0}% → {:.0}%",
                    pattern.id,
                    base.confidence,
                    pattern.confidence.score,
                    base.compliance * 100.0,
                    pattern.compliance() * 100.0,
                ));
            }
        }

        let details = GateDetails::RegressionDetection {
            baseline_id: Some(baseline.id.clone()),
            worst_confidence_drop,
            worst_compliance_drop,
            regressed_patterns: regressed.len(),
        };

        let score = (100.0
            - worst_confidence_drop.max(worst_compliance_drop).max(0.0))
        .clamp(0.0, 100.0);

        if regressed.is_empty() {
            GateResult::pass(
                GateId::RegressionDetection,
                score,
                format!("no regression vs. baseline `{}`", baseline.id),
            )
            .with_details(details)
        } else {
            GateResult::fail(
                GateId::RegressionDetection,
                score,
                format!(
                    "{} pattern(s) regressed vs. baseline `{}`",
                    regressed.len(),
                    baseline.id
                ),
                Vec::new(),
            )
            .with_details(details)
        }
    }
}
