//! Per-language parser implementations and the parser registry.
//!
//! Grammar-backed parsers are thin wrappers over the shared extraction
//! engine; the `define_grammar_parser!` macro removes the boilerplate.

use std::path::Path;

use drift_core::errors::ParseError;
use drift_core::types::collections::FxHashMap;

use super::engine::parse_source;
use super::heuristic;
use super::traits::LanguageParser;
use super::types::ParseResult;
use crate::scanner::Language;

macro_rules! define_grammar_parser {
    ($name:ident, $language:expr) => {
        pub struct $name;

        impl LanguageParser for $name {
            fn language(&self) -> Language {
                $language
            }

            fn parse(&self, source: &[u8], path: &Path) -> Result<ParseResult, ParseError> {
                let ext = path.extension().and_then(|e| e.to_str());
                let grammar = $language.grammar(ext).ok_or_else(|| {
                    ParseError::GrammarUnavailable {
                        language: $language.name().to_string(),
                    }
                })?;
                parse_source(source, path, $language, grammar)
            }
        }
    };
}

define_grammar_parser!(TypeScriptParser, Language::TypeScript);
define_grammar_parser!(JavaScriptParser, Language::JavaScript);
define_grammar_parser!(PythonParser, Language::Python);
define_grammar_parser!(JavaParser, Language::Java);
define_grammar_parser!(CSharpParser, Language::CSharp);
define_grammar_parser!(PhpParser, Language::Php);
define_grammar_parser!(GoParser, Language::Go);
define_grammar_parser!(RustParser, Language::Rust);

/// Registry mapping a language to its parser.
pub struct ParserRegistry {
    parsers: FxHashMap<Language, Box<dyn LanguageParser>>,
}

impl ParserRegistry {
    /// Registry with every supported language registered.
    pub fn with_defaults() -> Self {
        let mut parsers: FxHashMap<Language, Box<dyn LanguageParser>> = FxHashMap::default();
        parsers.insert(Language::TypeScript, Box::new(TypeScriptParser));
        parsers.insert(Language::JavaScript, Box::new(JavaScriptParser));
        parsers.insert(Language::Python, Box::new(PythonParser));
        parsers.insert(Language::Java, Box::new(JavaParser));
        parsers.insert(Language::CSharp, Box::new(CSharpParser));
        parsers.insert(Language::Php, Box::new(PhpParser));
        parsers.insert(Language::Go, Box::new(GoParser));
        parsers.insert(Language::Rust, Box::new(RustParser));
        parsers.insert(Language::Markdown, Box::new(heuristic::MarkdownParser));
        parsers.insert(Language::Css, Box::new(heuristic::CssParser));
        parsers.insert(Language::Json, Box::new(heuristic::JsonParser));
        Self { parsers }
    }

    pub fn get(&self, language: Language) -> Option<&dyn LanguageParser> {
        self.parsers.get(&language).map(|p| p.as_ref())
    }

    /// Parse a file, dispatching on its classified language.
    pub fn parse(
        &self,
        language: Language,
        source: &[u8],
        path: &Path,
    ) -> Result<ParseResult, ParseError> {
        let parser = self.get(language).ok_or_else(|| ParseError::UnknownLanguage {
            path: path.to_path_buf(),
        })?;
        parser.parse(source, path)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
