//! Content hashing.
//!
//! File identity is SHA-256 (hex); the 12-char prefix serves as the short
//! id everywhere a compact handle is needed. Internal span/body hashes use
//! xxh3, which is not part of any on-disk identity.

use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::xxh3_64;

/// SHA-256 of file content as lowercase hex.
pub fn hash_content(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    hex::encode(digest)
}

/// Short id: first 12 hex chars of the full digest.
pub fn short_hash(full_hex: &str) -> String {
    full_hex.chars().take(12).collect()
}

/// xxh3 for cheap intra-scan span hashes.
#[inline]
pub fn span_hash(text: &[u8]) -> u64 {
    xxh3_64(text)
}

/// Binary sniff: NUL byte or known magic in the first 8 KiB.
pub fn is_binary(content: &[u8]) -> bool {
    const MAGICS: &[&[u8]] = &[
        b"\x7fELF",
        b"MZ",
        b"\x89PNG",
        b"\xff\xd8\xff",
        b"GIF8",
        b"PK\x03\x04",
        b"%PDF",
    ];
    let head = &content[..content.len().min(8192)];
    if MAGICS.iter().any(|m| head.starts_with(m)) {
        return true;
    }
    head.contains(&0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_stable() {
        let a = hash_content(b"hello world");
        let b = hash_content(b"hello world");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        // Known digest of "hello world".
        assert_eq!(
            a,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn short_hash_is_prefix() {
        let full = hash_content(b"hello world");
        assert_eq!(short_hash(&full), "b94d27b9934d");
    }

    #[test]
    fn different_content_different_hash() {
        assert_ne!(hash_content(b"a"), hash_content(b"b"));
    }

    #[test]
    fn binary_detection() {
        assert!(is_binary(b"\x7fELF\x02\x01\x01"));
        assert!(is_binary(b"text with a \0 null"));
        assert!(!is_binary(b"plain utf-8 text\n"));
    }
}
