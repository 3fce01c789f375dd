//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the integration logic and
//! infrastructure. Implementations live in other crates (and in test code).

use crate::node::RawPayload;
use std::fmt;

/// Failure modes of a domain collector
///
/// Both variants are transient from the engine's point of view: collection is
/// retried up to the configured attempt count, after which the domain is
/// skipped for the cycle (a partial failure, not a cycle failure).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    /// The source did not respond within the request timeout
    Timeout,
    /// The source is unreachable or returned an unusable response
    Unavailable(String),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Timeout => write!(f, "collector timed out"),
            CollectError::Unavailable(reason) => {
                write!(f, "collector unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for CollectError {}

/// Trait for pulling candidate payloads out of a knowledge domain
///
/// Implemented by ingestion infrastructure; the engine only sees this seam.
pub trait DomainCollector {
    /// Fetch up to `limit` candidate payloads for `domain`
    fn fetch_candidates(
        &mut self,
        domain: &str,
        limit: usize,
    ) -> Result<Vec<RawPayload>, CollectError>;
}

/// Pluggable content comparator for cross-domain linking
///
/// Scores are in [0, 1]; pairs at or above the similarity floor become
/// relation candidates. The default implementation lives in the relation
/// graph crate.
pub trait Similarity {
    /// Similarity of two content strings, in [0, 1]
    fn score(&self, a: &str, b: &str) -> f64;
}
