//! Default content comparator
//!
//! Token-overlap (Jaccard) similarity over normalized token sets. It is cheap,
//! deterministic, and good enough to exercise the linking pipeline; richer
//! comparators (embedding cosine similarity, for instance) plug in through the
//! [`Similarity`] trait without touching the graph.

use crossweave_domain::fingerprint::normalized_tokens;
use crossweave_domain::Similarity;
use std::collections::BTreeSet;

/// Jaccard similarity over normalized token sets
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlap;

impl Similarity for TokenOverlap {
    fn score(&self, a: &str, b: &str) -> f64 {
        let set_a: BTreeSet<String> = normalized_tokens(a).into_iter().collect();
        let set_b: BTreeSet<String> = normalized_tokens(b).into_iter().collect();
        if set_a.is_empty() || set_b.is_empty() {
            return 0.0;
        }
        let intersection = set_a.intersection(&set_b).count();
        let union = set_a.union(&set_b).count();
        intersection as f64 / union as f64
    }
}
