//! Chain extraction from source text.
//!
//! A small hand-rolled scanner recognizes `receiver.seg(args).seg(args)`
//! shapes across languages (`.`, `::` and `->` separators), balancing
//! parentheses and string quotes. Statements may span lines; the scanner
//! joins continuation lines that begin with a separator.

use crate::scanner::Language;

use super::types::{ArgKind, ChainSegment, NormalizedArg, UnifiedCallChain};

const MAX_ARG_LEN: usize = 200;

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "return", "match", "switch", "catch", "fn", "function",
    "new", "let", "const", "var", "await", "async", "use", "import", "pub", "impl",
];

/// Extract every call chain from a file's text.
pub fn extract_chains(content: &str, file: &str, language: Language) -> Vec<UnifiedCallChain> {
    let mut chains = Vec::new();
    let logical_lines = join_continuations(content);

    for (line_no, line) in logical_lines {
        let mut prev: Option<char> = None;
        let mut skip_until = 0usize;
        for (idx, ch) in line.char_indices() {
            if idx < skip_until {
                prev = Some(ch);
                continue;
            }
            let at_word_start = (ch.is_ascii_alphabetic() || ch == '_')
                && !prev.is_some_and(|p| {
                    p.is_alphanumeric() || p == '_' || p == '$' || p == '.' || p == ':'
                });
            if at_word_start {
                if let Some((chain, consumed)) = scan_chain(&line[idx..], file, line_no, language)
                {
                    chains.push(chain);
                    skip_until = idx + consumed;
                }
            }
            prev = Some(ch);
        }
    }
    chains
}

/// Join lines so that `.method(...)` continuations merge with their
/// statement head. The reported line is the head line.
fn join_continuations(content: &str) -> Vec<(u32, String)> {
    let mut out: Vec<(u32, String)> = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = raw.trim_start();
        let is_continuation = trimmed.starts_with('.')
            || trimmed.starts_with("->")
            || trimmed.starts_with("::")
            || trimmed.starts_with("?.");
        if is_continuation {
            if let Some((_, prev)) = out.last_mut() {
                prev.push_str(trimmed);
                continue;
            }
        }
        out.push((line_no, raw.to_string()));
    }
    out
}

/// Try to scan one chain starting at the beginning of `text` (or after a
/// non-identifier prefix). Returns the chain and bytes consumed.
fn scan_chain(
    text: &str,
    file: &str,
    line: u32,
    language: Language,
) -> Option<(UnifiedCallChain, usize)> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || (!bytes[0].is_ascii_alphabetic() && bytes[0] != b'_') {
        return None;
    }

    let mut pos = 0usize;
    while pos < bytes.len()
        && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'$')
    {
        pos += 1;
    }
    let receiver = &text[..pos];
    if KEYWORDS.contains(&receiver) {
        return None;
    }

    let mut segments: Vec<ChainSegment> = Vec::new();
    let mut cursor = pos;

    // Receiver itself may be called: `knex('users')...`.
    if cursor < bytes.len() && bytes[cursor] == b'(' {
        let (args, consumed) = scan_args(&text[cursor..])?;
        segments.push(ChainSegment {
            name: receiver.to_string(),
            is_call: true,
            args,
        });
        cursor += consumed;
    }

    loop {
        let sep_len = if text[cursor..].starts_with("?.") {
            2
        } else if text[cursor..].starts_with("->") {
            2
        } else if text[cursor..].starts_with("::") {
            2
        } else if text[cursor..].starts_with('.') {
            1
        } else {
            break;
        };
        let after_sep = cursor + sep_len;
        let mut end = after_sep;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b'$')
        {
            end += 1;
        }
        if end == after_sep {
            break;
        }
        let name = &text[after_sep..end];

        // `.await` is Rust suspension noise, not a segment.
        if name == "await" && language == Language::Rust {
            cursor = end;
            continue;
        }

        // Skip turbofish / generics between name and call parens.
        let mut call_pos = end;
        if text[call_pos..].starts_with("::<") {
            if let Some(close) = text[call_pos..].find('>') {
                call_pos += close + 1;
            }
        }

        if call_pos < bytes.len() && bytes[call_pos] == b'(' {
            let (args, consumed) = scan_args(&text[call_pos..])?;
            segments.push(ChainSegment {
                name: name.to_string(),
                is_call: true,
                args,
            });
            cursor = call_pos + consumed;
        } else {
            segments.push(ChainSegment {
                name: name.to_string(),
                is_call: false,
                args: Vec::new(),
            });
            cursor = end;
        }
    }

    let call_count = segments.iter().filter(|s| s.is_call).count();
    if call_count == 0 {
        return None;
    }
    // A chain needs at least one separator-joined segment; a plain
    // `foo(x)` invocation is not a chain.
    let dotted = segments.len() > 1 || segments[0].name != receiver;
    if !dotted {
        return None;
    }

    Some((
        UnifiedCallChain {
            language,
            file: file.to_string(),
            line,
            receiver: receiver.to_string(),
            segments,
        },
        cursor,
    ))
}

/// Scan a balanced `(...)` group, returning normalized top-level args and
/// bytes consumed (including both parens).
fn scan_args(text: &str) -> Option<(Vec<NormalizedArg>, usize)> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut arg_start = 1usize;
    let mut raw_args: Vec<&str> = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        match in_string {
            Some(quote) => {
                if b == b'\\' {
                    i += 1;
                } else if b == quote {
                    in_string = None;
                }
            }
            None => match b {
                b'"' | b'\'' | b'`' => in_string = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                    if depth == 0 {
                        let arg = text[arg_start..i].trim();
                        if !arg.is_empty() {
                            raw_args.push(arg);
                        }
                        return Some((
                            raw_args.into_iter().map(normalize_arg).collect(),
                            i + 1,
                        ));
                    }
                }
                b',' if depth == 1 => {
                    let arg = text[arg_start..i].trim();
                    if !arg.is_empty() {
                        raw_args.push(arg);
                    }
                    arg_start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

fn normalize_arg(raw: &str) -> NormalizedArg {
    let value = if raw.len() > MAX_ARG_LEN {
        let mut end = MAX_ARG_LEN;
        while end > 0 && !raw.is_char_boundary(end) {
            end -= 1;
        }
        raw[..end].to_string()
    } else {
        raw.to_string()
    };

    let first = raw.chars().next().unwrap_or(' ');
    let kind = if first == '"' || first == '\'' || first == '`' {
        ArgKind::String
    } else if first.is_ascii_digit() || (first == '-' && raw.len() > 1) {
        ArgKind::Number
    } else if raw.starts_with('{') {
        ArgKind::Object
    } else if raw.starts_with('[') {
        ArgKind::Array
    } else if raw.contains("=>")
        || raw.starts_with('|')
        || raw.starts_with("lambda")
        || raw.starts_with("function")
        || raw.starts_with("fn ")
    {
        ArgKind::Closure
    } else if raw
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.' || c == ':' || c == '&')
    {
        ArgKind::Identifier
    } else {
        ArgKind::Other
    };

    let string_value = if kind == ArgKind::String && raw.len() >= 2 {
        Some(raw[1..raw.len() - 1].to_string())
    } else {
        None
    };

    NormalizedArg {
        kind,
        value,
        string_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlx_chain_normalizes() {
        let src = r#"let rows = sqlx::query("SELECT id, email FROM users WHERE id = $1").fetch_one(&pool).await?;"#;
        let chains = extract_chains(src, "src/db.rs", Language::Rust);
        let chain = chains
            .iter()
            .find(|c| c.receiver == "sqlx")
            .expect("sqlx chain");
        let names: Vec<&str> = chain.segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["query", "fetch_one"]);
        assert_eq!(
            chain.segments[0].first_string_arg(),
            Some("SELECT id, email FROM users WHERE id = $1")
        );
    }

    #[test]
    fn fluent_js_chain() {
        let src = "const users = await knex('users').where({ active: true }).select('id', 'email');";
        let chains = extract_chains(src, "src/db.ts", Language::TypeScript);
        let chain = chains
            .iter()
            .find(|c| c.receiver == "knex")
            .expect("knex chain");
        let names: Vec<&str> = chain.segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["knex", "where", "select"]);
        assert_eq!(chain.segments[0].first_string_arg(), Some("users"));
        assert_eq!(chain.segments[2].args.len(), 2);
    }

    #[test]
    fn python_orm_chain() {
        let src = "active = User.objects.filter(active=True).count()";
        let chains = extract_chains(src, "app/models.py", Language::Python);
        let chain = chains.iter().find(|c| c.receiver == "User").expect("chain");
        assert!(chain.has_segment("filter"));
        assert!(chain.has_segment("count"));
        assert!(chain.segment("objects").is_some_and(|s| !s.is_call));
    }

    #[test]
    fn multiline_chain_joins() {
        let src = "db.select()\n    .from(users)\n    .where(eq(users.id, id));";
        let chains = extract_chains(src, "src/q.ts", Language::TypeScript);
        let chain = chains.iter().find(|c| c.receiver == "db").expect("chain");
        assert_eq!(chain.line, 1);
        assert!(chain.has_segment("from"));
        assert!(chain.has_segment("where"));
    }

    #[test]
    fn keywords_are_not_receivers() {
        let src = "if (ready) { go(); }";
        let chains = extract_chains(src, "a.ts", Language::TypeScript);
        assert!(chains.iter().all(|c| c.receiver != "if"));
    }
}
