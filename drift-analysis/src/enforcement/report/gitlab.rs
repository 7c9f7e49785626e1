//! GitLab Code Quality report.

use drift_core::types::pattern::Severity;
use md5::{Digest, Md5};
use serde_json::json;

use crate::enforcement::types::QualityGateResult;

use super::Reporter;

pub struct GitLabReporter;

fn severity_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "critical",
        Severity::Warning => "major",
        Severity::Info | Severity::Hint => "info",
    }
}

/// Stable fingerprint: md5 of `rule|file|line|message`.
fn fingerprint(rule: &str, file: &str, line: u32, message: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(format!("{rule}|{file}|{line}|{message}").as_bytes());
    hex::encode(hasher.finalize())
}

impl Reporter for GitLabReporter {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    fn generate(&self, result: &QualityGateResult) -> Result<String, String> {
        let issues: Vec<serde_json::Value> = result
            .violations
            .iter()
            .map(|v| {
                json!({
                    "type": "issue",
                    "check_name": v.pattern_id,
                    "description": v.message,
                    "categories": ["Style"],
                    "location": {
                        "path": v.file,
                        "lines": {
                            "begin": v.start_line.max(1),
                            "end": v.end_line.max(v.start_line).max(1)
                        }
                    },
                    "severity": severity_for(v.severity),
                    "fingerprint": fingerprint(&v.pattern_id, &v.file, v.start_line, &v.message),
                })
            })
            .collect();

        serde_json::to_string_pretty(&issues).map_err(|e| e.to_string())
    }
}
