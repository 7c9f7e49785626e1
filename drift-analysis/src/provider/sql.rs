//! Raw-SQL string analysis.
//!
//! Recovers table, fields and operation class from SELECT / INSERT /
//! UPDATE / DELETE statements. Deliberately shallow: no joins beyond the
//! first table, no subquery descent.

use super::types::DataOperation;

/// Facts recovered from one SQL string.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFacts {
    pub table: Option<String>,
    pub fields: Vec<String>,
    pub operation: DataOperation,
}

/// Whether a string plausibly is SQL.
pub fn looks_like_sql(text: &str) -> bool {
    let upper = text.trim_start().to_uppercase();
    upper.starts_with("SELECT ")
        || upper.starts_with("INSERT ")
        || upper.starts_with("UPDATE ")
        || upper.starts_with("DELETE ")
        || upper.starts_with("WITH ")
}

/// Parse a SQL string into its coarse facts.
pub fn parse_sql(text: &str) -> Option<SqlFacts> {
    let tokens: Vec<String> = tokenize(text);
    if tokens.is_empty() {
        return None;
    }

    match tokens[0].to_uppercase().as_str() {
        "SELECT" => parse_select(&tokens),
        "INSERT" => parse_insert(&tokens, text),
        "UPDATE" => parse_update(&tokens),
        "DELETE" => parse_delete(&tokens),
        "WITH" => {
            // Skip the CTE prologue and retry from the main statement.
            let main = tokens
                .iter()
                .position(|t| {
                    matches!(t.to_uppercase().as_str(), "SELECT" | "INSERT" | "UPDATE" | "DELETE")
                })?;
            let rest = tokens[main..].join(" ");
            parse_sql(&rest)
        }
        _ => None,
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_select(tokens: &[String]) -> Option<SqlFacts> {
    let from_pos = position(tokens, "FROM");
    let fields = match from_pos {
        Some(pos) => field_list(&tokens[1..pos]),
        None => Vec::new(),
    };
    let table = from_pos.and_then(|pos| tokens.get(pos + 1)).map(|t| clean_ident(t));
    Some(SqlFacts {
        table,
        fields,
        operation: DataOperation::Read,
    })
}

fn parse_insert(tokens: &[String], raw: &str) -> Option<SqlFacts> {
    let into_pos = position(tokens, "INTO")?;
    let target = tokens.get(into_pos + 1)?;
    // `INSERT INTO users (id, email) VALUES …` — the column list may be
    // glued to the table token or follow it.
    let (table, _) = match target.split_once('(') {
        Some((t, _)) => (t, true),
        None => (target.as_str(), false),
    };
    let fields = raw
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(cols, _)| {
            cols.split(',')
                .map(|c| clean_ident(c))
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default();
    Some(SqlFacts {
        table: Some(clean_ident(table)),
        fields,
        operation: DataOperation::Write,
    })
}

fn parse_update(tokens: &[String]) -> Option<SqlFacts> {
    let table = tokens.get(1).map(|t| clean_ident(t))?;
    let set_pos = position(tokens, "SET");
    let fields = match set_pos {
        Some(pos) => {
            let end = position(tokens, "WHERE").unwrap_or(tokens.len());
            tokens[pos + 1..end]
                .join(" ")
                .split(',')
                .filter_map(|assign| assign.split('=').next())
                .map(clean_ident)
                .filter(|f| !f.is_empty())
                .collect()
        }
        None => Vec::new(),
    };
    Some(SqlFacts {
        table: Some(table),
        fields,
        operation: DataOperation::Write,
    })
}

fn parse_delete(tokens: &[String]) -> Option<SqlFacts> {
    let from_pos = position(tokens, "FROM")?;
    let table = tokens.get(from_pos + 1).map(|t| clean_ident(t))?;
    Some(SqlFacts {
        table: Some(table),
        fields: Vec::new(),
        operation: DataOperation::Delete,
    })
}

fn position(tokens: &[String], keyword: &str) -> Option<usize> {
    tokens.iter().position(|t| t.eq_ignore_ascii_case(keyword))
}

fn field_list(tokens: &[String]) -> Vec<String> {
    tokens
        .join(" ")
        .split(',')
        .map(clean_ident)
        .filter(|f| !f.is_empty() && *f != "*")
        .collect()
}

fn clean_ident<S: AsRef<str>>(token: S) -> String {
    token
        .as_ref()
        .trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'' || c == ';' || c == '(' || c == ')')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_with_fields() {
        let facts = parse_sql("SELECT id, email FROM users WHERE id = $1").unwrap();
        assert_eq!(facts.table.as_deref(), Some("users"));
        assert_eq!(facts.fields, vec!["id", "email"]);
        assert_eq!(facts.operation, DataOperation::Read);
    }

    #[test]
    fn select_star_has_no_fields() {
        let facts = parse_sql("SELECT * FROM orders").unwrap();
        assert_eq!(facts.table.as_deref(), Some("orders"));
        assert!(facts.fields.is_empty());
    }

    #[test]
    fn insert_with_columns() {
        let facts = parse_sql("INSERT INTO users (id, email) VALUES ($1, $2)").unwrap();
        assert_eq!(facts.table.as_deref(), Some("users"));
        assert_eq!(facts.fields, vec!["id", "email"]);
        assert_eq!(facts.operation, DataOperation::Write);
    }

    #[test]
    fn update_set_fields() {
        let facts =
            parse_sql("UPDATE accounts SET balance = $1, updated_at = now() WHERE id = $2")
                .unwrap();
        assert_eq!(facts.table.as_deref(), Some("accounts"));
        assert_eq!(facts.fields, vec!["balance", "updated_at"]);
        assert_eq!(facts.operation, DataOperation::Write);
    }

    #[test]
    fn delete_from() {
        let facts = parse_sql("DELETE FROM sessions WHERE expires_at < now()").unwrap();
        assert_eq!(facts.table.as_deref(), Some("sessions"));
        assert_eq!(facts.operation, DataOperation::Delete);
    }

    #[test]
    fn cte_resolves_to_main_statement() {
        let facts =
            parse_sql("WITH recent AS (SELECT id FROM logs) DELETE FROM sessions WHERE id IN (SELECT id FROM recent)");
        // The CTE skip lands on the first main keyword after WITH.
        assert!(facts.is_some());
    }

    #[test]
    fn non_sql_is_none() {
        assert!(parse_sql("hello world").is_none());
        assert!(!looks_like_sql("just a sentence"));
        assert!(looks_like_sql("SELECT 1"));
    }
}
