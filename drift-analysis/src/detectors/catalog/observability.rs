//! Observability detectors: metrics and trace spans.

use drift_core::types::pattern::PatternCategory;
use regex::Regex;

use crate::detectors::context::DetectionContext;
use crate::detectors::traits::{DetectionResult, Detector, Observation};
use crate::scanner::Language;

/// Tracks which metrics surface the codebase emits through.
pub struct MetricsDetector {
    emission: Regex,
}

impl MetricsDetector {
    pub fn new() -> Self {
        Self {
            emission: Regex::new(
                r"\b(?:metrics|statsd|prometheus)\.(?:increment|incr|gauge|histogram|timing|observe|counter)\(",
            )
            .expect("static regex"),
        }
    }
}

impl Default for MetricsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MetricsDetector {
    fn id(&self) -> &'static str {
        "obs.metrics"
    }
    fn name(&self) -> &'static str {
        "Metrics emission"
    }
    fn description(&self) -> &'static str {
        "Counter/gauge/histogram emission sites"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Observability
    }
    fn subcategory(&self) -> &'static str {
        "metrics"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        for (line_no, line) in ctx.code_lines() {
            for m in self.emission.find_iter(line) {
                let library = m.as_str().split('.').next().unwrap_or("metrics");
                result.observations.push(Observation {
                    pattern_key: "emission".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: m.start() as u32,
                    end_line: line_no,
                    signature: library.to_string(),
                    confidence: 0.9,
                });
            }
        }
        result
    }
}

/// Tracks distributed-tracing span creation.
pub struct TraceSpanDetector {
    span: Regex,
}

impl TraceSpanDetector {
    pub fn new() -> Self {
        Self {
            span: Regex::new(
                r"\b(?:tracer\.startSpan|startActiveSpan|tracing::(?:info_span|debug_span|span)|trace\.start_span)\b",
            )
            .expect("static regex"),
        }
    }
}

impl Default for TraceSpanDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for TraceSpanDetector {
    fn id(&self) -> &'static str {
        "obs.spans"
    }
    fn name(&self) -> &'static str {
        "Trace span creation"
    }
    fn description(&self) -> &'static str {
        "Distributed-tracing span creation sites"
    }
    fn category(&self) -> PatternCategory {
        PatternCategory::Observability
    }
    fn subcategory(&self) -> &'static str {
        "spans"
    }
    fn supported_languages(&self) -> &'static [Language] {
        &[]
    }

    fn detect(&self, ctx: &DetectionContext) -> DetectionResult {
        if ctx.is_test_file {
            return DetectionResult::empty();
        }
        let mut result = DetectionResult::empty();
        for (line_no, line) in ctx.code_lines() {
            if let Some(m) = self.span.find(line) {
                let signature = if m.as_str().starts_with("tracing::") {
                    "tracing-macro"
                } else {
                    "tracer-api"
                };
                result.observations.push(Observation {
                    pattern_key: "span".to_string(),
                    file: ctx.file.to_string(),
                    start_line: line_no,
                    start_column: m.start() as u32,
                    end_line: line_no,
                    signature: signature.to_string(),
                    confidence: 0.9,
                });
            }
        }
        result
    }
}
