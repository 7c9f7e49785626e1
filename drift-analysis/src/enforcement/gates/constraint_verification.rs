//! Gate: constraint verification on changed files.

use drift_core::types::pattern::Severity;

use crate::constraints::verifier;
use crate::detectors::traits::Violation;
use crate::enforcement::context::GateContext;
use crate::enforcement::policy::Policy;
use crate::enforcement::types::{GateDetails, GateId, GateResult};

pub struct ConstraintVerificationGate;

impl super::QualityGate for ConstraintVerificationGate {
    fn id(&self) -> GateId {
        GateId::ConstraintVerification
    }

    fn name(&self) -> &'static str {
        "Constraint Verification"
    }

    fn evaluate(&self, ctx: &GateContext, policy: &Policy) -> GateResult {
        let config = &policy.constraint_verification_config;

        let broken = verifier::verify(
            &ctx.constraints,
            &ctx.patterns,
            &ctx.changed_files,
            config.min_confidence,
        );

        let constraints_checked = ctx
            .constraints
            .iter()
            .filter(|c| c.status == drift_core::types::constraint::ConstraintStatus::Active)
            .count();

        let violated: std::collections::BTreeSet<&str> =
            broken.iter().map(|v| v.constraint_id.as_str()).collect();
        let details = GateDetails::ConstraintVerification {
            constraints_checked,
            violated: violated.len(),
        };

        if broken.is_empty() {
            return GateResult::pass(
                GateId::ConstraintVerification,
                100.0,
                format!("{constraints_checked} active constraint(s) hold on the change set"),
            )
            .with_details(details);
        }

        let violations: Vec<Violation> = broken
            .iter()
            .map(|v| Violation {
                id: format!("{}:{}:{}", v.constraint_id, v.file, v.line),
                pattern_id: v.constraint_id.clone(),
                severity: Severity::Error,
                file: v.file.clone(),
                start_line: v.line,
                end_line: v.line,
                message: v.message.clone(),
                expected: v.expected.clone(),
                actual: v.actual.clone(),
                explanation:
                    "This assertion was synthesized from approved patterns; violating it breaks a verified convention."
                        .to_string(),
                suggested_fix: None,
                first_seen: 0,
                occurrences: 1,
            })
            .collect();

        let score = if constraints_checked == 0 {
            0.0
        } else {
            ((constraints_checked - violated.len()) as f64 / constraints_checked as f64) * 100.0
        };

        GateResult::fail(
            GateId::ConstraintVerification,
            score,
            format!(
                "{} of {constraints_checked} active constraint(s) violated",
                violated.len()
            ),
            violations,
        )
        .with_details(details)
    }
}
