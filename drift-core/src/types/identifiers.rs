//! Stable identifier newtypes.
//!
//! Cross-component references inside a result are always by stable id,
//! never by pointer.

use serde::{Deserialize, Serialize};

/// Stable identifier of a pattern: `<category>/<subcategory>/<fingerprint>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(pub String);

impl PatternId {
    pub fn new(category: &str, subcategory: &str, fingerprint: &str) -> Self {
        Self(format!("{category}/{subcategory}/{fingerprint}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PatternId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PatternId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Short file identity: the first 12 hex chars of the SHA-256 content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortHash(pub String);

impl ShortHash {
    /// Derive the short id from a full 64-char hex digest.
    pub fn from_full(full_hex: &str) -> Self {
        Self(full_hex.chars().take(12).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShortHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_id_format() {
        let id = PatternId::new("api", "rest-route", "a1b2c3");
        assert_eq!(id.as_str(), "api/rest-route/a1b2c3");
    }

    #[test]
    fn short_hash_is_twelve_chars() {
        let full = "d2a84f4b8b650937ec8f73cd8be2c74add5a911ba64df27458ed8229da804a26";
        assert_eq!(ShortHash::from_full(full).as_str(), "d2a84f4b8b65");
    }
}
