//! SARIF 2.1.0 report.

use drift_core::types::pattern::Severity;
use serde_json::{json, Value};

use crate::enforcement::types::QualityGateResult;

use super::Reporter;

pub struct SarifReporter;

fn level_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Hint => "note",
    }
}

impl Reporter for SarifReporter {
    fn name(&self) -> &'static str {
        "sarif"
    }

    fn generate(&self, result: &QualityGateResult) -> Result<String, String> {
        // One rule per unique rule id, in first-seen order.
        let mut rules: Vec<Value> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for violation in &result.violations {
            if seen.insert(violation.pattern_id.clone()) {
                rules.push(json!({
                    "id": violation.pattern_id,
                    "shortDescription": {
                        "text": violation.expected.chars().take(120).collect::<String>()
                    },
                    "defaultConfiguration": {
                        "level": level_for(violation.severity)
                    }
                }));
            }
        }

        let results: Vec<Value> = result
            .violations
            .iter()
            .map(|v| {
                json!({
                    "ruleId": v.pattern_id,
                    "level": level_for(v.severity),
                    "message": { "text": v.message },
                    "locations": [{
                        "physicalLocation": {
                            "artifactLocation": {
                                "uri": v.file,
                                "uriBaseId": "%SRCROOT%"
                            },
                            "region": {
                                "startLine": v.start_line.max(1),
                                "endLine": v.end_line.max(v.start_line).max(1)
                            }
                        }
                    }]
                })
            })
            .collect();

        let sarif = json!({
            "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json",
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "Drift Quality Gates",
                        "informationUri": "https://github.com/driftscan/drift",
                        "rules": rules
                    }
                },
                "results": results
            }]
        });

        serde_json::to_string_pretty(&sarif).map_err(|e| e.to_string())
    }
}
