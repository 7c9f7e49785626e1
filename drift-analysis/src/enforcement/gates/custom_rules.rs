//! Gate: user-authored custom rules.

use drift_core::types::pattern::Severity;

use crate::enforcement::context::GateContext;
use crate::enforcement::policy::Policy;
use crate::enforcement::rules::evaluate_rules;
use crate::enforcement::types::{GateDetails, GateId, GateResult};

pub struct CustomRulesGate;

impl super::QualityGate for CustomRulesGate {
    fn id(&self) -> GateId {
        GateId::CustomRules
    }

    fn name(&self) -> &'static str {
        "Custom Rules"
    }

    fn evaluate(&self, ctx: &GateContext, policy: &Policy) -> GateResult {
        let mut rules = policy.custom_rules_config.rules.clone();
        rules.extend(ctx.custom_rules.iter().cloned());

        if rules.is_empty() {
            return GateResult::skipped(
                GateId::CustomRules,
                "no custom rules configured".to_string(),
            );
        }

        let (violations, mut warnings) = evaluate_rules(&rules, &ctx.file_contents);
        let details = GateDetails::CustomRules {
            rules_run: rules.len(),
            matches: violations.len(),
        };

        let has_errors = violations.iter().any(|v| v.severity == Severity::Error);
        let score = if violations.is_empty() {
            100.0
        } else {
            (100.0 - violations.len() as f64 * 10.0).max(0.0)
        };

        if has_errors {
            GateResult::fail(
                GateId::CustomRules,
                score,
                format!("{} custom-rule violation(s)", violations.len()),
                violations,
            )
            .with_details(details)
        } else if !violations.is_empty() {
            warnings.extend(violations.iter().map(|v| v.message.clone()));
            let mut result = GateResult::warn(
                GateId::CustomRules,
                score,
                format!("{} advisory custom-rule match(es)", violations.len()),
                warnings,
            );
            result.violations = violations;
            result.with_details(details)
        } else {
            let mut result = GateResult::pass(
                GateId::CustomRules,
                score,
                format!("{} rule(s) clean", rules.len()),
            );
            result.warnings = warnings;
            result.with_details(details)
        }
    }
}
