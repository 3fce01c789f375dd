//! Knowledge node - the deduplicated unit of knowledge within one domain

use crate::confidence;
use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic node identifier: `{domain}:{fingerprint[..16]}`
///
/// Because the identifier is derived from the domain and the content
/// fingerprint, re-integrating a payload after a partially completed cycle
/// resolves to the same node instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Build the identifier for a (domain, fingerprint) pair
    pub fn for_fact(domain: &str, fingerprint: &Fingerprint) -> Self {
        Self(format!("{}:{}", domain, fingerprint.short()))
    }

    /// Reconstruct an identifier from its stored form
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The identifier as a storage key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate fact as delivered by a domain collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    /// The claim text
    pub content: String,

    /// Where the observation came from, if known
    #[serde(default)]
    pub source: Option<String>,

    /// Collector's own confidence in the observation, clamped to [0, 1]
    #[serde(default)]
    pub confidence_hint: Option<f64>,
}

impl RawPayload {
    /// Payload with content only
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
            confidence_hint: None,
        }
    }
}

/// A knowledge fact: one per (domain, fingerprint), merged across observations
///
/// Nodes are never hard-deleted. When confidence decays below the configured
/// floor the node is marked inactive and excluded from future comparisons; a
/// fresh observation reactivates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    /// Deterministic identifier
    pub id: NodeId,

    /// Domain this fact belongs to
    pub domain: String,

    /// Normalized content hash, unique within the domain
    pub fingerprint: Fingerprint,

    /// Raw content of the first observation
    pub content: String,

    /// Source of the first observation, if known
    pub source: Option<String>,

    /// Corroboration-driven confidence in [0, 1]
    pub confidence: f64,

    /// Seconds since Unix epoch at first observation
    pub created_at: u64,

    /// Seconds since Unix epoch at the most recent observation
    pub last_updated_at: u64,

    /// Number of independent observations merged into this node
    pub source_count: u32,

    /// False once confidence has decayed below the floor
    pub active: bool,
}

impl KnowledgeNode {
    /// Create a node from its first observation
    pub fn first_observation(domain: &str, payload: &RawPayload, now: u64) -> Self {
        let fingerprint = Fingerprint::of(&payload.content);
        Self {
            id: NodeId::for_fact(domain, &fingerprint),
            domain: domain.to_string(),
            fingerprint,
            content: payload.content.clone(),
            source: payload.source.clone(),
            confidence: confidence::base_confidence(payload.confidence_hint),
            created_at: now,
            last_updated_at: now,
            source_count: 1,
            active: true,
        }
    }

    /// Merge a corroborating observation into this node
    ///
    /// Bumps the source count and timestamp, reinforces confidence, and
    /// reactivates the node if it had decayed out.
    pub fn corroborate(&mut self, payload: &RawPayload, now: u64) {
        self.source_count = self.source_count.saturating_add(1);
        self.confidence = confidence::combine(
            self.confidence,
            confidence::base_confidence(payload.confidence_hint),
        );
        self.last_updated_at = now;
        self.active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_deterministic() {
        let fp = Fingerprint::of("fusion startup raises series B");
        let a = NodeId::for_fact("technology_news", &fp);
        let b = NodeId::for_fact("technology_news", &fp);
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("technology_news:"));
    }

    #[test]
    fn test_node_id_differs_per_domain() {
        let fp = Fingerprint::of("same content");
        assert_ne!(
            NodeId::for_fact("scientific_research", &fp),
            NodeId::for_fact("technology_news", &fp)
        );
    }

    #[test]
    fn test_first_observation() {
        let payload = RawPayload {
            content: "Perovskite cells hit 31% efficiency".into(),
            source: Some("journal:nature".into()),
            confidence_hint: Some(0.8),
        };
        let node = KnowledgeNode::first_observation("scientific_research", &payload, 1000);

        assert_eq!(node.domain, "scientific_research");
        assert_eq!(node.source_count, 1);
        assert_eq!(node.confidence, 0.8);
        assert_eq!(node.created_at, 1000);
        assert!(node.active);
    }

    #[test]
    fn test_corroborate_monotone_and_reactivating() {
        let payload = RawPayload::new("claim");
        let mut node = KnowledgeNode::first_observation("d", &payload, 1000);
        node.active = false;
        node.confidence = 0.2;

        let before = node.confidence;
        node.corroborate(&payload, 2000);

        assert!(node.active);
        assert_eq!(node.source_count, 2);
        assert!(node.confidence >= before && node.confidence < 1.0);
        assert_eq!(node.last_updated_at, 2000);
    }
}
