//! Cross-domain relation graph

use crate::RelationError;
use crossweave_domain::confidence::nudge;
use crossweave_domain::{CrossDomainRelation, KnowledgeNode, NodeId, RelationId, Similarity};
use crossweave_registry::DomainRegistry;
use crossweave_store::{Collection, RecordStore};

/// Outcome of a linking pass over a changed-node set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Relations created for new pairs
    pub created: usize,
    /// Existing relations reinforced
    pub reinforced: usize,
    /// Relations removed to keep per-node fan-out within the top-K bound
    pub trimmed: usize,
}

/// Sole writer of the `cross_domain_relations` collection
///
/// Relations connect nodes of *different* domains only. Weight is
/// `prior(source_domain, target_domain) * similarity`: the configured prior
/// encodes which domain pairs are generally meaningful, the similarity the
/// per-instance evidence, and multiplying lets either factor veto a weak link.
#[derive(Debug, Clone)]
pub struct RelationGraph {
    top_k: usize,
    reinforce_step: f64,
    conflict_retries: usize,
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self {
            top_k: 4,
            reinforce_step: 0.3,
            conflict_retries: 3,
        }
    }
}

impl RelationGraph {
    /// Create a graph with explicit fan-out bound and reinforcement step
    pub fn new(top_k: usize, reinforce_step: f64) -> Self {
        Self {
            top_k: top_k.max(1),
            reinforce_step: reinforce_step.clamp(0.0, 1.0),
            conflict_retries: 3,
        }
    }

    /// Link each changed node against the active nodes of other domains
    ///
    /// Pairs scoring at or above `similarity_floor` become relations; per
    /// changed node only the top-K pairs by similarity are linked, and any
    /// surviving relations beyond the top-K by weight are trimmed afterwards
    /// to bound graph fan-out.
    pub fn link_candidates<S, M>(
        &self,
        store: &mut S,
        registry: &DomainRegistry,
        similarity: &M,
        changed: &[KnowledgeNode],
        comparison_set: &[KnowledgeNode],
        similarity_floor: f64,
        now: u64,
    ) -> Result<LinkOutcome, RelationError>
    where
        S: RecordStore,
        M: Similarity,
    {
        let mut outcome = LinkOutcome::default();

        for node in changed {
            let mut scored: Vec<(f64, &KnowledgeNode)> = comparison_set
                .iter()
                .filter(|other| other.domain != node.domain && other.id != node.id)
                .map(|other| (similarity.score(&node.content, &other.content), other))
                .filter(|(score, _)| *score >= similarity_floor)
                .collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(self.top_k);

            for (score, other) in scored {
                match self.link_pair(store, registry, node, other, score, now)? {
                    Linked::Created => outcome.created += 1,
                    Linked::Reinforced => outcome.reinforced += 1,
                }
            }

            outcome.trimmed += self.enforce_fanout(store, &node.id)?;
        }

        tracing::debug!(
            created = outcome.created,
            reinforced = outcome.reinforced,
            trimmed = outcome.trimmed,
            "linking pass finished"
        );
        Ok(outcome)
    }

    /// Create or reinforce the relation for one ordered node pair
    ///
    /// New pairs get `weight = prior * similarity`. Existing relations are
    /// nudged toward the newly computed weight by the bounded reinforcement
    /// step and have `last_reinforced_at` bumped.
    ///
    /// # Errors
    ///
    /// [`RelationError::Validation`] when both nodes share a domain.
    pub fn link_pair<S: RecordStore>(
        &self,
        store: &mut S,
        registry: &DomainRegistry,
        source: &KnowledgeNode,
        target: &KnowledgeNode,
        similarity_score: f64,
        now: u64,
    ) -> Result<Linked, RelationError> {
        if source.domain == target.domain {
            return Err(RelationError::Validation(format!(
                "relations are cross-domain only; both nodes are in {:?}",
                source.domain
            )));
        }

        let prior = registry.prior(&source.domain, &target.domain);
        let weight = (prior * similarity_score).clamp(0.0, 1.0);
        let id = RelationId::for_pair(&source.id, &target.id);

        let mut attempt = 0;
        loop {
            let written = match store
                .get_versioned::<CrossDomainRelation>(Collection::CrossDomainRelations, id.as_str())?
            {
                None => {
                    let relation = CrossDomainRelation::new(
                        source.id.clone(),
                        target.id.clone(),
                        source.domain.clone(),
                        target.domain.clone(),
                        weight,
                        similarity_score,
                        now,
                    );
                    store
                        .put_record(
                            Collection::CrossDomainRelations,
                            id.as_str(),
                            &relation,
                            Some(0),
                        )
                        .map(|_| Linked::Created)
                }
                Some((mut relation, version)) => {
                    relation.relation_weight =
                        nudge(relation.relation_weight, weight, self.reinforce_step);
                    relation.confidence =
                        nudge(relation.confidence, similarity_score, self.reinforce_step);
                    relation.last_reinforced_at = now;
                    store
                        .put_record(
                            Collection::CrossDomainRelations,
                            id.as_str(),
                            &relation,
                            Some(version),
                        )
                        .map(|_| Linked::Reinforced)
                }
            };

            match written {
                Ok(linked) => return Ok(linked),
                Err(err) if err.is_conflict() && attempt < self.conflict_retries => {
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Remove relations not reinforced since `now - staleness_window`
    pub fn prune<S: RecordStore>(
        &self,
        store: &mut S,
        staleness_window: u64,
        now: u64,
    ) -> Result<usize, RelationError> {
        let cutoff = now.saturating_sub(staleness_window);
        let mut pruned = 0;

        for relation in
            store.query_records::<CrossDomainRelation>(Collection::CrossDomainRelations)?
        {
            if relation.last_reinforced_at < cutoff
                && store.delete(Collection::CrossDomainRelations, relation.id.as_str())?
            {
                pruned += 1;
            }
        }

        if pruned > 0 {
            tracing::info!(pruned, "stale relations pruned");
        }
        Ok(pruned)
    }

    /// Relations whose source is the given node
    pub fn relations_from<S: RecordStore>(
        &self,
        store: &S,
        node: &NodeId,
    ) -> Result<Vec<CrossDomainRelation>, RelationError> {
        let relations: Vec<CrossDomainRelation> =
            store.query_records(Collection::CrossDomainRelations)?;
        Ok(relations
            .into_iter()
            .filter(|relation| &relation.source_node_id == node)
            .collect())
    }

    /// Keep only the node's top-K relations by weight, deleting the rest
    fn enforce_fanout<S: RecordStore>(
        &self,
        store: &mut S,
        node: &NodeId,
    ) -> Result<usize, RelationError> {
        let mut relations = self.relations_from(store, node)?;
        if relations.len() <= self.top_k {
            return Ok(0);
        }

        relations.sort_by(|a, b| {
            b.relation_weight
                .partial_cmp(&a.relation_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut trimmed = 0;
        for relation in relations.split_off(self.top_k) {
            if store.delete(Collection::CrossDomainRelations, relation.id.as_str())? {
                trimmed += 1;
            }
        }
        Ok(trimmed)
    }
}

/// Result of linking one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linked {
    /// A relation was created for a new pair
    Created,
    /// The pair's existing relation was reinforced
    Reinforced,
}
