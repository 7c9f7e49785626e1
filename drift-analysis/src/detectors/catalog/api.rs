//! API detectors: route registration style and versioning discipline.

use drift_core::types::pattern::PatternCategory;
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation};
use crate::scanner::Language;

const ROUTER_RECEIVERS: &[&str] = &[
    "app", "router", "server", "api", "route", "express", "fastify", "koa",
];
const HTTP_METHODS: &[&str] = &["get", "post", "put", "delete", "patch", "options", "head"];

/// Detects HTTP route registrations and fingerprints the response
/// envelope each handler file uses. The majority envelope becomes the
/// convention; divergent handlers surface as outliers.
pub struct RestRouteDetector {
    envelope: Regex,
}

impl RestRouteDetector {
    pub fn new() -> Self {
        Self {
            // res.json({ data: …, error: … }) — capture the object body.
            envelope: Regex::new(r"res\.(?:json|send)\(\s*\{([^}]*)\}").expect("static regex"),
        }
    }

    /// Canonical envelope signature for a file: the sorted top-level keys
    /// of the first `res.json({...})` object, or `bare` when handlers
    /// respond without an envelope object.
    fn envelope_signature(&self, content: &str) -> String {
        match self.envelope.captures(content) {
            Some(caps) => {
                let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let mut keys: Vec<&str> = body
                    .split(',')
                    .filter_map(|pair| pair.split(':').next())
                    .map(str::trim)
                    .filter(|k| !k.is_empty() && k.chars().all(|c| c.is_alphanumeric() || c == '_'))
                    .collect();
                keys.sort_unstable();
                keys.dedup();
                if keys.is_empty() {
                    "bare".to_string()
                } else {
                    format!("envelope:{{{}}}", keys.join(","))
                }
            }
            None => "bare".to_string(),
        }
    }
}

impl Default for RestRouteDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for RestRouteDetector {
    fn id(&self) -> &'static str {
        "api.rest-route"
    }
    fn name(&self) -> &'static str {
        "REST route registration"
    }
    fn description(&self) -> &'static str {
        "HTTP route handlers and the response envelope shape they share"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Api
    }
    fn subcategory(&self) -> &'static str {
        "rest-route"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file || ctx.is_type_definition {
            return DetectionResult::empty();
        }

        let mut result = DetectionResult::empty();
        let signature = self.envelope_signature(ctx.content);

        for call in &ctx.parse.calls {
            let callee = call.callee_name.to_lowercase();
            if !HTTP_METHODS.contains(&callee.as_str()) {
                continue;
            }
            let receiver = call
                .receiver
                .as_deref()
                .unwrap_or("")
                .to_lowercase();
            if !ROUTER_RECEIVERS.contains(&receiver.as_str()) {
                continue;
            }
            // First argument must look like a path.
            let is_route = call
                .args
                .first()
                .is_some_and(|a| a.starts_with('"') || a.starts_with('\'') || a.starts_with('`'));
            if !is_route {
                continue;
            }

            result.observations.push(Observation {
                pattern_key: "envelope".to_string(),
                file: ctx.file.to_string(),
                start_line: call.line,
                start_column: call.column,
                end_line: call.line,
                signature: signature.clone(),
                confidence: 0.9,
            });
        }

        result
    }
}

/// Detects versioned API paths; the majority version prefix is the
/// convention.
pub struct ApiVersioningDetector {
    version: Regex,
}

impl ApiVersioningDetector {
    pub fn new() -> Self {
        Self {
            version: Regex::new(r"/(v\d+)/").expect("static regex"),
        }
    }
}

impl Default for ApiVersioningDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ApiVersioningDetector {
    fn id(&self) -> &'static str {
        "api.versioning"
    }
    fn name(&self) -> &'static str {
        "API version prefix"
    }
    fn description(&self) -> &'static str {
        "Version segments in API route paths"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Api
    }
    fn subcategory(&self) -> &'static str {
        "versioning"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }

        let mut result = DetectionResult::empty();
        for literal in &ctx.parse.string_literals {
            if !literal.value.starts_with('/') {
                continue;
            }
            if let Some(caps) = self.version.captures(&literal.value) {
                result.observations.push(Observation {
                    pattern_key: "path-version".to_string(),
                    file: ctx.file.to_string(),
                    start_line: literal.line,
                    start_column: literal.column,
                    end_line: literal.line,
                    signature: caps[1].to_string(),
                    confidence: 0.8,
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_signature_sorts_keys() {
        let detector = RestRouteDetector::new();
        let sig = detector.envelope_signature("res.json({ error: null, data: users })");
        assert_eq!(sig, "envelope:{data,error}");
        assert_eq!(detector.envelope_signature("res.send(users)"), "bare");
    }
}
