//! Crossweave Knowledge Node Store
//!
//! Integrates candidate payloads into the persistent node collection with
//! within-domain deduplication, and applies confidence decay to nodes that go
//! unreinforced.
//!
//! Every mutation is a read-modify-write conditioned on the record version,
//! so a merge lost to a concurrent writer is detected and retried rather than
//! silently dropped. All state lives in the persistence layer; nothing
//! survives only in memory.

#![warn(missing_docs)]

mod error;

pub use error::NodeStoreError;

use crossweave_domain::{KnowledgeNode, NodeId, RawPayload};
use crossweave_registry::DomainRegistry;
use crossweave_store::{Collection, RecordStore, StoreError};

/// Outcome of a decay pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecayOutcome {
    /// Nodes whose confidence was reduced
    pub decayed: usize,
    /// Nodes that fell below the floor and were marked inactive
    pub deactivated: usize,
}

/// Sole writer of the `knowledge_nodes` collection
#[derive(Debug, Clone)]
pub struct NodeStore {
    conflict_retries: usize,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self {
            conflict_retries: 3,
        }
    }
}

impl NodeStore {
    /// Create a node store with a custom conflict retry budget
    pub fn new(conflict_retries: usize) -> Self {
        Self { conflict_retries }
    }

    /// Integrate one candidate payload into a domain
    ///
    /// Computes the payload's fingerprint and merges into the existing node
    /// for (domain, fingerprint) when present, otherwise creates one. Returns
    /// the stored node and whether it was newly created.
    ///
    /// # Errors
    ///
    /// [`NodeStoreError::Validation`] when the domain is not active or the
    /// payload is empty; [`NodeStoreError::Store`] when the persistence layer
    /// fails (version conflicts are retried internally first).
    pub fn integrate<S: RecordStore>(
        &self,
        store: &mut S,
        registry: &DomainRegistry,
        domain: &str,
        payload: &RawPayload,
        now: u64,
    ) -> Result<(KnowledgeNode, bool), NodeStoreError> {
        if !registry.is_active(domain) {
            return Err(NodeStoreError::Validation(format!(
                "domain {:?} is not in the active domain set",
                domain
            )));
        }
        if payload.content.trim().is_empty() {
            return Err(NodeStoreError::Validation("payload content is empty".into()));
        }

        let candidate = KnowledgeNode::first_observation(domain, payload, now);
        let id = candidate.id.clone();

        let mut attempt = 0;
        loop {
            let written = match store
                .get_versioned::<KnowledgeNode>(Collection::KnowledgeNodes, id.as_str())?
            {
                None => store
                    .put_record(Collection::KnowledgeNodes, id.as_str(), &candidate, Some(0))
                    .map(|_| (candidate.clone(), true)),
                Some((mut node, version)) => {
                    node.corroborate(payload, now);
                    store
                        .put_record(Collection::KnowledgeNodes, id.as_str(), &node, Some(version))
                        .map(|_| (node, false))
                }
            };

            match written {
                Ok((node, created)) => {
                    tracing::debug!(
                        node = %node.id,
                        created,
                        confidence = node.confidence,
                        sources = node.source_count,
                        "integrated payload"
                    );
                    return Ok((node, created));
                }
                Err(err) if err.is_conflict() && attempt < self.conflict_retries => {
                    attempt += 1;
                    tracing::debug!(node = %id, attempt, "integration raced, re-reading");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Look up a node by id
    pub fn get<S: RecordStore>(
        &self,
        store: &S,
        id: &NodeId,
    ) -> Result<Option<KnowledgeNode>, NodeStoreError> {
        Ok(store.get_record(Collection::KnowledgeNodes, id.as_str())?)
    }

    /// Apply one decay step to nodes not updated since `older_than`
    ///
    /// Each qualifying active node loses a multiplicative `decay_factor` of
    /// its confidence; nodes falling below `min_confidence` are marked
    /// inactive (never deleted). A node whose write races a concurrent
    /// reinforcement is skipped, since the reinforcement supersedes the decay.
    pub fn decay<S: RecordStore>(
        &self,
        store: &mut S,
        older_than: u64,
        decay_factor: f64,
        min_confidence: f64,
    ) -> Result<DecayOutcome, NodeStoreError> {
        let mut outcome = DecayOutcome::default();

        for record in store.query(Collection::KnowledgeNodes)? {
            let mut node: KnowledgeNode = serde_json::from_value(record.body)
                .map_err(StoreError::from)?;
            if !node.active || node.last_updated_at >= older_than {
                continue;
            }

            node.confidence =
                crossweave_domain::confidence::decay_step(node.confidence, decay_factor);
            if node.confidence < min_confidence {
                node.active = false;
                outcome.deactivated += 1;
                tracing::info!(node = %node.id, confidence = node.confidence, "node deactivated");
            }
            outcome.decayed += 1;

            match store.put_record(
                Collection::KnowledgeNodes,
                record.id.as_str(),
                &node,
                Some(record.version),
            ) {
                Ok(_) => {}
                Err(err) if err.is_conflict() => {
                    // Refreshed underneath us; it no longer qualifies for decay
                    outcome.decayed -= 1;
                    if !node.active {
                        outcome.deactivated -= 1;
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(outcome)
    }

    /// Active nodes at or above the confidence floor
    ///
    /// This is the comparison set for cross-domain linking: deactivated nodes
    /// and nodes scored below the floor are excluded without being deleted.
    pub fn active_nodes<S: RecordStore>(
        &self,
        store: &S,
        min_confidence: f64,
    ) -> Result<Vec<KnowledgeNode>, NodeStoreError> {
        let nodes: Vec<KnowledgeNode> = store.query_records(Collection::KnowledgeNodes)?;
        Ok(nodes
            .into_iter()
            .filter(|node| node.active && node.confidence >= min_confidence)
            .collect())
    }

    /// Mean confidence over all active nodes, or 0.0 when there are none
    pub fn average_confidence<S: RecordStore>(&self, store: &S) -> Result<f64, NodeStoreError> {
        let nodes: Vec<KnowledgeNode> = store.query_records(Collection::KnowledgeNodes)?;
        let active: Vec<f64> = nodes
            .iter()
            .filter(|node| node.active)
            .map(|node| node.confidence)
            .collect();
        if active.is_empty() {
            return Ok(0.0);
        }
        Ok(active.iter().sum::<f64>() / active.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossweave_store::{MemoryStore, VersionedRecord};
    use std::collections::BTreeMap;

    /// Store whose first `races_left` node writes are beaten by a concurrent
    /// writer landing the same body, surfacing a version conflict
    struct RacingStore {
        inner: MemoryStore,
        races_left: usize,
        node_puts: usize,
    }

    impl RacingStore {
        fn new(races_left: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                races_left,
                node_puts: 0,
            }
        }
    }

    impl RecordStore for RacingStore {
        fn get(
            &self,
            collection: Collection,
            id: &str,
        ) -> Result<Option<VersionedRecord>, StoreError> {
            self.inner.get(collection, id)
        }

        fn put(
            &mut self,
            collection: Collection,
            id: &str,
            body: serde_json::Value,
            expected_version: Option<u64>,
        ) -> Result<u64, StoreError> {
            if collection == Collection::KnowledgeNodes {
                self.node_puts += 1;
                if self.races_left > 0 {
                    self.races_left -= 1;
                    let found = self.inner.put(collection, id, body, None)?;
                    return Err(StoreError::Conflict {
                        expected: expected_version.unwrap_or(0),
                        found,
                    });
                }
            }
            self.inner.put(collection, id, body, expected_version)
        }

        fn query(&self, collection: Collection) -> Result<Vec<VersionedRecord>, StoreError> {
            self.inner.query(collection)
        }

        fn delete(&mut self, collection: Collection, id: &str) -> Result<bool, StoreError> {
            self.inner.delete(collection, id)
        }
    }

    fn registry() -> DomainRegistry {
        DomainRegistry::new(
            vec!["scientific_research".into(), "technology_news".into()],
            BTreeMap::new(),
        )
        .unwrap()
    }

    fn payload(content: &str) -> RawPayload {
        RawPayload::new(content)
    }

    #[test]
    fn test_integrate_creates_then_merges() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        let (first, created) = nodes
            .integrate(
                &mut store,
                &registry,
                "scientific_research",
                &payload("Room-temperature superconductivity replicated"),
                1000,
            )
            .unwrap();
        assert!(created);
        assert_eq!(first.source_count, 1);

        let (second, created) = nodes
            .integrate(
                &mut store,
                &registry,
                "scientific_research",
                &payload("room temperature superconductivity REPLICATED!"),
                2000,
            )
            .unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.source_count, 2);
        assert!(second.confidence >= first.confidence);
        assert!(second.confidence < 1.0);
        assert_eq!(second.last_updated_at, 2000);

        // Exactly one stored node
        assert_eq!(store.len(Collection::KnowledgeNodes), 1);
    }

    #[test]
    fn test_integrate_same_content_different_domains() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        nodes
            .integrate(&mut store, &registry, "scientific_research", &payload("x"), 1000)
            .unwrap();
        nodes
            .integrate(&mut store, &registry, "technology_news", &payload("x"), 1000)
            .unwrap();

        assert_eq!(store.len(Collection::KnowledgeNodes), 2);
    }

    #[test]
    fn test_integrate_rejects_unknown_domain() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        let err = nodes
            .integrate(&mut store, &registry, "astrology", &payload("x"), 1000)
            .unwrap_err();
        assert!(matches!(err, NodeStoreError::Validation(_)));
        assert!(store.is_empty(Collection::KnowledgeNodes));
    }

    #[test]
    fn test_integrate_rejects_empty_payload() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        let err = nodes
            .integrate(&mut store, &registry, "technology_news", &payload("   "), 1000)
            .unwrap_err();
        assert!(matches!(err, NodeStoreError::Validation(_)));
    }

    #[test]
    fn test_confidence_monotone_over_many_corroborations() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        let mut previous = 0.0;
        for i in 0..20 {
            let (node, _) = nodes
                .integrate(
                    &mut store,
                    &registry,
                    "technology_news",
                    &payload("battery density doubles"),
                    1000 + i,
                )
                .unwrap();
            assert!(node.confidence >= previous);
            assert!(node.confidence < 1.0);
            previous = node.confidence;
        }
    }

    #[test]
    fn test_corroborating_certain_hint_never_lowers_confidence() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        let mut certain = RawPayload::new("fully trusted claim");
        certain.confidence_hint = Some(1.0);

        let (first, _) = nodes
            .integrate(&mut store, &registry, "technology_news", &certain, 1000)
            .unwrap();
        let (second, _) = nodes
            .integrate(&mut store, &registry, "technology_news", &certain, 2000)
            .unwrap();

        assert!(second.confidence >= first.confidence);
        assert!(second.confidence < 1.0);
    }

    #[test]
    fn test_integrate_retries_after_lost_race() {
        let mut store = RacingStore::new(1);
        let nodes = NodeStore::default();
        let registry = registry();

        let (node, created) = nodes
            .integrate(&mut store, &registry, "technology_news", &payload("raced fact"), 1000)
            .unwrap();

        // The concurrent writer created the node first; the re-read merges
        // into it instead of overwriting
        assert!(!created);
        assert_eq!(node.source_count, 2);
        assert_eq!(store.node_puts, 2);
        assert_eq!(store.inner.len(Collection::KnowledgeNodes), 1);
    }

    #[test]
    fn test_integrate_conflict_retries_are_bounded() {
        let mut store = RacingStore::new(usize::MAX);
        let nodes = NodeStore::default();
        let registry = registry();

        let err = nodes
            .integrate(&mut store, &registry, "technology_news", &payload("contested"), 1000)
            .unwrap_err();

        assert!(matches!(err, NodeStoreError::Store(e) if e.is_conflict()));
        // Initial attempt plus the default retry budget of three
        assert_eq!(store.node_puts, 4);
    }

    #[test]
    fn test_decay_deactivates_below_floor() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        nodes
            .integrate(&mut store, &registry, "technology_news", &payload("stale fact"), 1000)
            .unwrap();

        // Repeated decay steps with a cutoff past the node's last update
        let mut deactivated_at = None;
        for step in 0..20 {
            let outcome = nodes.decay(&mut store, 5000, 0.9, 0.3).unwrap();
            if outcome.deactivated > 0 {
                deactivated_at = Some(step);
                break;
            }
        }
        // 0.5 * 0.9^n < 0.3 at n = 5
        assert_eq!(deactivated_at, Some(4));

        let remaining = nodes.active_nodes(&store, 0.0).unwrap();
        assert!(remaining.is_empty(), "deactivated node leaves the active set");
        // Soft delete only
        assert_eq!(store.len(Collection::KnowledgeNodes), 1);
    }

    #[test]
    fn test_decay_skips_recently_updated() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        nodes
            .integrate(&mut store, &registry, "technology_news", &payload("fresh fact"), 9000)
            .unwrap();

        let outcome = nodes.decay(&mut store, 5000, 0.9, 0.3).unwrap();
        assert_eq!(outcome, DecayOutcome::default());
    }

    #[test]
    fn test_reintegration_reactivates_decayed_node() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        nodes
            .integrate(&mut store, &registry, "technology_news", &payload("fact"), 1000)
            .unwrap();
        for _ in 0..10 {
            nodes.decay(&mut store, 5000, 0.9, 0.3).unwrap();
        }
        assert!(nodes.active_nodes(&store, 0.0).unwrap().is_empty());

        let (node, created) = nodes
            .integrate(&mut store, &registry, "technology_news", &payload("fact"), 9000)
            .unwrap();
        assert!(!created, "same fingerprint merges into the dormant node");
        assert!(node.active);
        assert_eq!(nodes.active_nodes(&store, 0.0).unwrap().len(), 1);
    }

    #[test]
    fn test_active_nodes_applies_confidence_floor() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        let mut low = RawPayload::new("weak claim");
        low.confidence_hint = Some(0.2);
        let mut high = RawPayload::new("strong claim");
        high.confidence_hint = Some(0.9);

        nodes
            .integrate(&mut store, &registry, "technology_news", &low, 1000)
            .unwrap();
        nodes
            .integrate(&mut store, &registry, "technology_news", &high, 1000)
            .unwrap();

        let active = nodes.active_nodes(&store, 0.7).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].content, "strong claim");
    }

    #[test]
    fn test_average_confidence() {
        let mut store = MemoryStore::new();
        let nodes = NodeStore::default();
        let registry = registry();

        assert_eq!(nodes.average_confidence(&store).unwrap(), 0.0);

        let mut a = RawPayload::new("a");
        a.confidence_hint = Some(0.4);
        let mut b = RawPayload::new("b");
        b.confidence_hint = Some(0.8);
        nodes.integrate(&mut store, &registry, "technology_news", &a, 1000).unwrap();
        nodes.integrate(&mut store, &registry, "technology_news", &b, 1000).unwrap();

        let avg = nodes.average_confidence(&store).unwrap();
        assert!((avg - 0.6).abs() < 1e-9);
    }
}
