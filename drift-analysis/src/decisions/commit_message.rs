//! Canonical commit-message model.
//!
//! Conventional-commit shape: `type(scope)!: subject`, optional body,
//! optional `Key: value` trailers. `parse(render(m)) == m` holds for every
//! canonical message.

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    pub commit_type: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub subject: String,
    pub body: Option<String>,
    pub trailers: Vec<(String, String)>,
}

impl CommitMessage {
    /// Render in canonical form.
    pub fn render(&self) -> String {
        let mut out = self.commit_type.clone();
        if let Some(scope) = &self.scope {
            out.push('(');
            out.push_str(scope);
            out.push(')');
        }
        if self.breaking {
            out.push('!');
        }
        out.push_str(": ");
        out.push_str(&self.subject);

        if let Some(body) = &self.body {
            out.push_str("\n\n");
            out.push_str(body);
        }
        if !self.trailers.is_empty() {
            out.push_str("\n\n");
            let lines: Vec<String> = self
                .trailers
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect();
            out.push_str(&lines.join("\n"));
        }
        out
    }

    /// Parse a message; non-conventional headers yield `None`.
    pub fn parse(raw: &str) -> Option<CommitMessage> {
        let header_re =
            Regex::new(r"^([a-z]+)(?:\(([^)]+)\))?(!)?: (.+)$").expect("static regex");

        let mut sections = raw.split("\n\n");
        let header = sections.next()?.trim_end();
        let caps = header_re.captures(header)?;

        let rest: Vec<&str> = sections.collect();
        let (body, trailers) = split_body_and_trailers(&rest);

        Some(CommitMessage {
            commit_type: caps[1].to_string(),
            scope: caps.get(2).map(|m| m.as_str().to_string()),
            breaking: caps.get(3).is_some(),
            subject: caps[4].to_string(),
            body,
            trailers,
        })
    }
}

/// The final section is trailers iff every line is `Key: value`.
fn split_body_and_trailers(sections: &[&str]) -> (Option<String>, Vec<(String, String)>) {
    if sections.is_empty() {
        return (None, Vec::new());
    }

    let trailer_re = Regex::new(r"^([A-Za-z][A-Za-z-]*): (.+)$").expect("static regex");
    let last = sections[sections.len() - 1];
    let is_trailer_block = !last.is_empty()
        && last.lines().all(|line| trailer_re.is_match(line));

    if is_trailer_block {
        let trailers = last
            .lines()
            .filter_map(|line| {
                trailer_re
                    .captures(line)
                    .map(|c| (c[1].to_string(), c[2].to_string()))
            })
            .collect();
        let body_sections = &sections[..sections.len() - 1];
        let body = if body_sections.is_empty() {
            None
        } else {
            Some(body_sections.join("\n\n"))
        };
        (body, trailers)
    } else {
        (Some(sections.join("\n\n")), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(
        commit_type: &str,
        scope: Option<&str>,
        breaking: bool,
        subject: &str,
        body: Option<&str>,
        trailers: &[(&str, &str)],
    ) -> CommitMessage {
        CommitMessage {
            commit_type: commit_type.to_string(),
            scope: scope.map(str::to_string),
            breaking,
            subject: subject.to_string(),
            body: body.map(str::to_string),
            trailers: trailers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn round_trip_minimal() {
        let m = canonical("fix", None, false, "handle empty input", None, &[]);
        assert_eq!(CommitMessage::parse(&m.render()).unwrap(), m);
    }

    #[test]
    fn round_trip_full() {
        let m = canonical(
            "feat",
            Some("scanner"),
            true,
            "switch hashing to sha-256",
            Some("Old snapshots must be rebuilt.\n\nThe short id is now 12 hex chars."),
            &[("Reviewed-by", "alex"), ("Refs", "issue-42")],
        );
        assert_eq!(CommitMessage::parse(&m.render()).unwrap(), m);
    }

    #[test]
    fn round_trip_trailers_without_body() {
        let m = canonical(
            "chore",
            Some("deps"),
            false,
            "bump rusqlite",
            None,
            &[("Refs", "issue-7")],
        );
        assert_eq!(CommitMessage::parse(&m.render()).unwrap(), m);
    }

    #[test]
    fn non_conventional_header_is_none() {
        assert!(CommitMessage::parse("just fixed some stuff").is_none());
        assert!(CommitMessage::parse("Fix: capitalized type").is_none());
    }
}
