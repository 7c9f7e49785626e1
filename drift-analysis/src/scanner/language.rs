//! Language classification: extension first, then shebang, then content
//! heuristics. Unknown files are skipped with a diagnostic.

use serde::{Deserialize, Serialize};

/// Languages Drift understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    CSharp,
    Php,
    Go,
    Rust,
    Markdown,
    Css,
    Json,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[
            Self::TypeScript,
            Self::JavaScript,
            Self::Python,
            Self::Java,
            Self::CSharp,
            Self::Php,
            Self::Go,
            Self::Rust,
            Self::Markdown,
            Self::Css,
            Self::Json,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Java => "java",
            Self::CSharp => "csharp",
            Self::Php => "php",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Markdown => "markdown",
            Self::Css => "css",
            Self::Json => "json",
        }
    }

    /// Classify by extension alone.
    pub fn from_extension(ext: Option<&str>) -> Option<Language> {
        match ext? {
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "py" | "pyi" => Some(Self::Python),
            "java" => Some(Self::Java),
            "cs" => Some(Self::CSharp),
            "php" => Some(Self::Php),
            "go" => Some(Self::Go),
            "rs" => Some(Self::Rust),
            "md" | "markdown" => Some(Self::Markdown),
            "css" | "scss" | "less" => Some(Self::Css),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Classify a file: extension, then shebang, then content heuristics.
    pub fn classify(ext: Option<&str>, content: &[u8]) -> Option<Language> {
        if let Some(lang) = Self::from_extension(ext) {
            return Some(lang);
        }

        let head = &content[..content.len().min(512)];
        let head = std::str::from_utf8(head).ok()?;

        if let Some(first_line) = head.lines().next() {
            if first_line.starts_with("#!") {
                if first_line.contains("python") {
                    return Some(Self::Python);
                }
                if first_line.contains("node") {
                    return Some(Self::JavaScript);
                }
                if first_line.contains("php") {
                    return Some(Self::Php);
                }
            }
        }

        if head.contains("<?php") {
            return Some(Self::Php);
        }
        if head.lines().any(|l| l.trim_start().starts_with("package main")) {
            return Some(Self::Go);
        }

        None
    }

    /// Whether this language parses through tree-sitter (vs. heuristics).
    pub fn has_grammar(&self) -> bool {
        !matches!(self, Self::Markdown | Self::Css | Self::Json)
    }

    /// The tree-sitter grammar for this language.
    pub fn grammar(&self, ext: Option<&str>) -> Option<tree_sitter::Language> {
        match self {
            Self::TypeScript => Some(if ext == Some("tsx") {
                tree_sitter_typescript::LANGUAGE_TSX.into()
            } else {
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
            }),
            Self::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            Self::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Self::Java => Some(tree_sitter_java::LANGUAGE.into()),
            Self::CSharp => Some(tree_sitter_c_sharp::LANGUAGE.into()),
            Self::Php => Some(tree_sitter_php::LANGUAGE_PHP.into()),
            Self::Go => Some(tree_sitter_go::LANGUAGE.into()),
            Self::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            Self::Markdown | Self::Css | Self::Json => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_classification() {
        assert_eq!(Language::from_extension(Some("tsx")), Some(Language::TypeScript));
        assert_eq!(Language::from_extension(Some("py")), Some(Language::Python));
        assert_eq!(Language::from_extension(Some("exe")), None);
        assert_eq!(Language::from_extension(None), None);
    }

    #[test]
    fn shebang_classification() {
        assert_eq!(
            Language::classify(None, b"#!/usr/bin/env python3\nprint('hi')\n"),
            Some(Language::Python)
        );
        assert_eq!(
            Language::classify(None, b"#!/usr/bin/env node\nconsole.log('hi')\n"),
            Some(Language::JavaScript)
        );
    }

    #[test]
    fn content_heuristics() {
        assert_eq!(
            Language::classify(None, b"<?php echo 'hi'; ?>"),
            Some(Language::Php)
        );
        assert_eq!(
            Language::classify(None, b"package main\n\nfunc main() {}\n"),
            Some(Language::Go)
        );
        assert_eq!(Language::classify(None, b"plain text"), None);
    }
}
