//! Semantic location construction.
//!
//! Builds the location tree from extracted declarations: one file-level
//! root is implicit; classes nest their methods as children. Span hashes
//! change iff the span text changes.

use drift_core::types::location::{LocationKind, SemanticLocation};

use super::types::{ClassInfo, DeclKind, FunctionInfo, ParseResult};
use crate::scanner::hasher::span_hash;
use crate::scanner::Language;

/// Build the semantic location list for a parse result.
pub fn build(result: &ParseResult, source: &[u8], language: Language) -> Vec<SemanticLocation> {
    let lines: Vec<&str> = std::str::from_utf8(source)
        .unwrap_or("")
        .lines()
        .collect();

    let mut locations = Vec::new();
    let class_ranges: Vec<(u32, u32)> = result
        .classes
        .iter()
        .map(|c| (c.start_line, c.end_line))
        .collect();

    for class in &result.classes {
        locations.push(class_location(class, result, &lines, language));
    }

    // Free functions only — methods already nest under their class.
    for func in &result.functions {
        let inside_class = class_ranges
            .iter()
            .any(|(start, end)| *start <= func.start_line && func.end_line <= *end);
        if !inside_class {
            locations.push(function_location(func, result, &lines, language, LocationKind::Function));
        }
    }

    locations.sort_by_key(|l| (l.start_line, l.end_line));
    locations
}

fn class_location(
    class: &ClassInfo,
    result: &ParseResult,
    lines: &[&str],
    language: Language,
) -> SemanticLocation {
    let kind = match class.kind {
        DeclKind::Interface => LocationKind::Interface,
        DeclKind::Enum => LocationKind::Enum,
        DeclKind::TypeAlias => LocationKind::Type,
        _ => LocationKind::Class,
    };

    let children = class
        .methods
        .iter()
        .map(|m| function_location(m, result, lines, language, LocationKind::Method))
        .collect();

    let snippet = span_text(lines, class.start_line, class.end_line);
    SemanticLocation {
        file: result.file.clone(),
        start_line: class.start_line,
        end_line: class.end_line,
        kind,
        name: class.name.clone(),
        signature: None,
        language: Some(language.name().to_string()),
        confidence: 1.0,
        children,
        snippet: snippet_preview(&snippet),
        span_hash: span_hash(snippet.as_bytes()),
    }
}

fn function_location(
    func: &FunctionInfo,
    result: &ParseResult,
    lines: &[&str],
    language: Language,
    kind: LocationKind,
) -> SemanticLocation {
    let snippet = span_text(lines, func.start_line, func.end_line);
    let signature = {
        let params: Vec<&str> = func.parameters.iter().map(|p| p.name.as_str()).collect();
        let ret = func.return_type.as_deref().unwrap_or("");
        Some(format!("{}({}){}", func.name, params.join(", "), if ret.is_empty() { String::new() } else { format!(" -> {ret}") }))
    };

    SemanticLocation {
        file: result.file.clone(),
        start_line: func.start_line,
        end_line: func.end_line,
        kind,
        name: func.qualified_name.clone(),
        signature,
        language: Some(language.name().to_string()),
        confidence: 1.0,
        children: Vec::new(),
        snippet: snippet_preview(&snippet),
        span_hash: span_hash(snippet.as_bytes()),
    }
}

/// The text of lines `[start, end]`, 1-based inclusive.
fn span_text(lines: &[&str], start_line: u32, end_line: u32) -> String {
    let start = (start_line.max(1) - 1) as usize;
    let end = (end_line as usize).min(lines.len());
    if start >= end {
        return String::new();
    }
    lines[start..end].join("\n")
}

/// Snippets are capped; long spans keep only their head.
fn snippet_preview(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    const MAX: usize = 400;
    if text.len() <= MAX {
        Some(text.to_string())
    } else {
        let mut end = MAX;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        Some(text[..end].to_string())
    }
}
