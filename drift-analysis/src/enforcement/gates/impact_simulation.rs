//! Gate: impact simulation over the call graph.

use crate::enforcement::context::GateContext;
use crate::enforcement::policy::Policy;
use crate::enforcement::types::{GateDetails, GateId, GateResult};
use crate::graph::impact;

pub struct ImpactSimulationGate;

impl super::QualityGate for ImpactSimulationGate {
    fn id(&self) -> GateId {
        GateId::ImpactSimulation
    }

    fn name(&self) -> &'static str {
        "Impact Simulation"
    }

    fn evaluate(&self, ctx: &GateContext, policy: &Policy) -> GateResult {
        let config = &policy.impact_config;

        let Some(graph) = &ctx.call_graph else {
            return GateResult::skipped(
                GateId::ImpactSimulation,
                "call graph unavailable; gate skipped".to_string(),
            );
        };
        if ctx.changed_files.is_empty() {
            return GateResult::skipped(
                GateId::ImpactSimulation,
                "no change set; nothing to simulate".to_string(),
            );
        }

        let report = impact::simulate_impact(graph, &ctx.changed_files);
        let mut over_budget = Vec::new();
        if report.impacted_files > config.max_impacted_files {
            over_budget.push(format!(
                "impacted files {} > budget {}",
                report.impacted_files, config.max_impacted_files
            ));
        }
        if report.impacted_functions > config.max_impacted_functions {
            over_budget.push(format!(
                "impacted functions {} > budget {}",
                report.impacted_functions, config.max_impacted_functions
            ));
        }
        if report.impacted_entry_points > config.max_entry_points {
            over_budget.push(format!(
                "impacted entry points {} > budget {}",
                report.impacted_entry_points, config.max_entry_points
            ));
        }
        if report.friction_score > config.max_friction {
            over_budget.push(format!(
                "friction {:.1} > budget {:.1}",
                report.friction_score, config.max_friction
            ));
        }

        let score = (100.0 - report.friction_score).clamp(0.0, 100.0);
        let summary = format!(
            "{} function(s) in {} file(s) impacted, friction {:.1}",
            report.impacted_functions, report.impacted_files, report.friction_score
        );
        let details = GateDetails::ImpactSimulation(report);

        if over_budget.is_empty() {
            GateResult::pass(GateId::ImpactSimulation, score, summary).with_details(details)
        } else {
            let mut result = GateResult::fail(
                GateId::ImpactSimulation,
                score,
                format!("{summary}; {}", over_budget.join(", ")),
                Vec::new(),
            );
            result.warnings = over_budget;
            result.with_details(details)
        }
    }
}
