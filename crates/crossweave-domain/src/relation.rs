//! Cross-domain relations - scored edges between nodes of different domains

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic relation identifier: `{source_node_id}->{target_node_id}`
///
/// The key scheme guarantees at most one stored relation per ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationId(String);

impl RelationId {
    /// Build the identifier for an ordered node pair
    pub fn for_pair(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("{}->{}", source.as_str(), target.as_str()))
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

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scored edge between two nodes in different domains
///
/// Weight is the product of the configured domain-pair prior and the observed
/// similarity, so either factor can veto a weak link. Confidence carries the
/// per-instance evidence (the observed similarity) on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossDomainRelation {
    /// Deterministic identifier for the ordered pair
    pub id: RelationId,

    /// Node the relation points from
    pub source_node_id: NodeId,

    /// Node the relation points to (different domain)
    pub target_node_id: NodeId,

    /// Domain of the source node
    pub source_domain: String,

    /// Domain of the target node
    pub target_domain: String,

    /// prior(source_domain, target_domain) x similarity, clamped to [0, 1]
    pub relation_weight: f64,

    /// Observed similarity backing this relation, in [0, 1]
    pub confidence: f64,

    /// Seconds since Unix epoch at creation
    pub created_at: u64,

    /// Seconds since Unix epoch at the most recent reinforcement
    pub last_reinforced_at: u64,
}

impl CrossDomainRelation {
    /// Create a relation between two nodes
    ///
    /// The caller is responsible for ensuring the domains differ; the graph
    /// layer rejects same-domain pairs with a validation error.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_node_id: NodeId,
        target_node_id: NodeId,
        source_domain: impl Into<String>,
        target_domain: impl Into<String>,
        relation_weight: f64,
        similarity: f64,
        now: u64,
    ) -> Self {
        Self {
            id: RelationId::for_pair(&source_node_id, &target_node_id),
            source_node_id,
            target_node_id,
            source_domain: source_domain.into(),
            target_domain: target_domain.into(),
            relation_weight: relation_weight.clamp(0.0, 1.0),
            confidence: similarity.clamp(0.0, 1.0),
            created_at: now,
            last_reinforced_at: now,
        }
    }
}
