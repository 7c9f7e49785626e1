//! Human-readable text report.

use std::collections::BTreeMap;

use drift_core::types::pattern::Severity;

use crate::detectors::traits::Violation;
use crate::enforcement::types::{GateStatus, QualityGateResult, RunStatus};

use super::Reporter;

pub struct TextReporter;

fn status_glyph(status: GateStatus) -> &'static str {
    match status {
        GateStatus::Passed => "✓",
        GateStatus::Warned => "⚠",
        GateStatus::Failed => "✗",
        GateStatus::Skipped => "⊘",
        GateStatus::Errored => "⚡",
    }
}

fn severity_glyph(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
        Severity::Hint => "·",
    }
}

impl Reporter for TextReporter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn generate(&self, result: &QualityGateResult) -> Result<String, String> {
        let mut out = String::new();

        out.push_str("Drift Quality Gates\n");
        out.push_str("===================\n");
        out.push_str(&format!(
            "policy: {} ({})    score: {:.1}\n\n",
            result.policy.name, result.policy.id, result.score
        ));

        for gate in result.gates.values() {
            out.push_str(&format!(
                "{} {:<24} {:>6.1}  {}\n",
                status_glyph(gate.status),
                gate.gate_id.as_str(),
                gate.score,
                gate.summary
            ));
        }

        // Violations grouped by file.
        let mut by_file: BTreeMap<&str, Vec<&Violation>> = BTreeMap::new();
        for violation in &result.violations {
            by_file.entry(&violation.file).or_default().push(violation);
        }
        if !by_file.is_empty() {
            out.push('\n');
            for (file, violations) in by_file {
                out.push_str(&format!("{file}\n"));
                for v in violations {
                    out.push_str(&format!(
                        "  {} {}:{} [{}] {}\n",
                        severity_glyph(v.severity),
                        v.start_line,
                        v.severity,
                        v.pattern_id,
                        v.message
                    ));
                }
            }
        }

        if !result.warnings.is_empty() {
            out.push('\n');
            for warning in &result.warnings {
                out.push_str(&format!("⚠ {warning}\n"));
            }
        }

        let (errors, warnings, infos) = result.totals();
        let total = errors + warnings + infos;
        out.push_str(&format!(
            "\n{errors} errors, {warnings} warnings, {infos} info ({total} total)\n"
        ));
        out.push_str(match result.status {
            RunStatus::Passed => "Result: PASSED\n",
            RunStatus::Warned => "Result: PASSED (with warnings)\n",
            RunStatus::Failed => "Result: FAILED\n",
        });

        Ok(out)
    }
}
