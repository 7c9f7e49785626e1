//! Heuristic parsers for languages without a tree-sitter grammar.
//!
//! Markdown, CSS and JSON only need enough structure for the documentation,
//! styling and config detectors; line-oriented extraction is sufficient.

use std::path::Path;

use drift_core::errors::ParseError;
use drift_core::types::location::{LocationKind, SemanticLocation};

use super::traits::LanguageParser;
use super::types::{Diagnostic, ParseResult, StringLiteral};
use crate::scanner::hasher::span_hash;
use crate::scanner::Language;

/// Markdown: headings become module-level semantic locations, link targets
/// become string literals.
pub struct MarkdownParser;

impl LanguageParser for MarkdownParser {
    fn language(&self) -> Language {
        Language::Markdown
    }

    fn parse(&self, source: &[u8], path: &Path) -> Result<ParseResult, ParseError> {
        let text = std::str::from_utf8(source).map_err(|_| ParseError::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;
        let file = path.to_string_lossy().replace('\\', "/");
        let mut result = ParseResult::empty(&file, Language::Markdown);

        let mut in_fence = false;
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx as u32 + 1;
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                continue;
            }
            if let Some(heading) = line.strip_prefix('#') {
                let title = heading.trim_start_matches('#').trim();
                if !title.is_empty() {
                    result.semantic_locations.push(SemanticLocation {
                        file: file.clone(),
                        start_line: line_no,
                        end_line: line_no,
                        kind: LocationKind::Module,
                        name: title.to_string(),
                        signature: None,
                        language: Some("markdown".to_string()),
                        confidence: 1.0,
                        children: Vec::new(),
                        snippet: None,
                        span_hash: span_hash(line.as_bytes()),
                    });
                }
            }
            // Link targets: [text](target)
            let mut rest = line;
            while let Some(open) = rest.find("](") {
                let after = &rest[open + 2..];
                if let Some(close) = after.find(')') {
                    let target = &after[..close];
                    if !target.is_empty() {
                        result.string_literals.push(StringLiteral {
                            value: target.to_string(),
                            line: line_no,
                            column: 0,
                        });
                    }
                    rest = &after[close..];
                } else {
                    break;
                }
            }
        }

        if in_fence {
            result.diagnostics.push(Diagnostic {
                message: "unterminated code fence".to_string(),
                line: text.lines().count() as u32,
            });
        }
        Ok(result)
    }
}

/// CSS: selectors become block-level semantic locations, custom property
/// names become string literals.
pub struct CssParser;

impl LanguageParser for CssParser {
    fn language(&self) -> Language {
        Language::Css
    }

    fn parse(&self, source: &[u8], path: &Path) -> Result<ParseResult, ParseError> {
        let text = std::str::from_utf8(source).map_err(|_| ParseError::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;
        let file = path.to_string_lossy().replace('\\', "/");
        let mut result = ParseResult::empty(&file, Language::Css);

        let mut depth = 0usize;
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx as u32 + 1;
            let trimmed = line.trim();

            if depth == 0 && trimmed.ends_with('{') && !trimmed.starts_with('@') {
                let selector = trimmed.trim_end_matches('{').trim();
                if !selector.is_empty() {
                    result.semantic_locations.push(SemanticLocation {
                        file: file.clone(),
                        start_line: line_no,
                        end_line: line_no,
                        kind: LocationKind::Block,
                        name: selector.to_string(),
                        signature: None,
                        language: Some("css".to_string()),
                        confidence: 0.9,
                        children: Vec::new(),
                        snippet: None,
                        span_hash: span_hash(trimmed.as_bytes()),
                    });
                }
            }
            if let Some(var) = trimmed.strip_prefix("--") {
                if let Some((name, _)) = var.split_once(':') {
                    result.string_literals.push(StringLiteral {
                        value: format!("--{}", name.trim()),
                        line: line_no,
                        column: 0,
                    });
                }
            }
            depth = depth
                .saturating_add(line.matches('{').count())
                .saturating_sub(line.matches('}').count());
        }

        if depth != 0 {
            result.diagnostics.push(Diagnostic {
                message: "unbalanced braces".to_string(),
                line: text.lines().count() as u32,
            });
        }
        Ok(result)
    }
}

/// JSON: top-level keys become string literals; invalid JSON is a
/// diagnostic, not an error.
pub struct JsonParser;

impl LanguageParser for JsonParser {
    fn language(&self) -> Language {
        Language::Json
    }

    fn parse(&self, source: &[u8], path: &Path) -> Result<ParseResult, ParseError> {
        let text = std::str::from_utf8(source).map_err(|_| ParseError::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;
        let file = path.to_string_lossy().replace('\\', "/");
        let mut result = ParseResult::empty(&file, Language::Json);

        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Object(map)) => {
                for key in map.keys() {
                    result.string_literals.push(StringLiteral {
                        value: key.clone(),
                        line: 1,
                        column: 0,
                    });
                }
            }
            Ok(_) => {}
            Err(e) => {
                result.diagnostics.push(Diagnostic {
                    message: format!("invalid json: {e}"),
                    line: e.line() as u32,
                });
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_headings_and_links() {
        let src = b"# Title\n\nSome [link](https://example.com) text.\n\n## Section\n";
        let result = MarkdownParser
            .parse(src, Path::new("README.md"))
            .unwrap();
        assert_eq!(result.semantic_locations.len(), 2);
        assert_eq!(result.semantic_locations[0].name, "Title");
        assert_eq!(result.string_literals[0].value, "https://example.com");
    }

    #[test]
    fn css_selectors_and_variables() {
        let src = b":root {\n  --brand-color: #fff;\n}\n.button {\n  color: red;\n}\n";
        let result = CssParser.parse(src, Path::new("style.css")).unwrap();
        let names: Vec<&str> = result
            .semantic_locations
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec![":root", ".button"]);
        assert_eq!(result.string_literals[0].value, "--brand-color");
    }

    #[test]
    fn invalid_json_is_diagnostic_not_error() {
        let result = JsonParser
            .parse(b"{ not json", Path::new("broken.json"))
            .unwrap();
        assert!(result.success);
        assert_eq!(result.diagnostics.len(), 1);
    }
}
