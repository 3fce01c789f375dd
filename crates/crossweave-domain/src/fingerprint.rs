//! Content fingerprinting for within-domain deduplication
//!
//! Two observations of the same claim rarely arrive byte-identical, so the
//! fingerprint is computed over a normalized form: lowercased, punctuation
//! stripped, whitespace collapsed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex SHA-256 digest of normalized content
///
/// Fingerprints are unique per domain: two payloads with the same fingerprint
/// in the same domain merge into one node rather than duplicating.
///
/// # Examples
///
/// ```
/// use crossweave_domain::Fingerprint;
///
/// let a = Fingerprint::of("Quantum batteries charge faster.");
/// let b = Fingerprint::of("  quantum batteries CHARGE faster!! ");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of raw content
    pub fn of(content: &str) -> Self {
        let normalized = normalize(content);
        let digest = Sha256::digest(normalized.as_bytes());
        let mut hex = String::with_capacity(64);
        for byte in digest {
            hex.push_str(&format!("{:02x}", byte));
        }
        Self(hex)
    }

    /// Reconstruct a fingerprint from its stored hex form
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Full 64-character hex digest
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Leading 16 hex characters, used in deterministic node identifiers
    pub fn short(&self) -> &str {
        &self.0[..16.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize content for fingerprinting and similarity comparison
///
/// Lowercases, replaces every non-alphanumeric run with a single space, and
/// trims. The result is stable across whitespace and punctuation variants.
pub fn normalize(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last_was_space = true;
    for ch in content.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Normalized token set of content, the input to token-overlap similarity
pub fn normalized_tokens(content: &str) -> Vec<String> {
    normalize(content)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
