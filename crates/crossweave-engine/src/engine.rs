//! The integration cycle engine

use crate::{CycleState, EngineConfig, EngineError};
use crossweave_domain::time::now_secs;
use crossweave_domain::{
    CycleId, CycleOutcome, DomainCollector, ErrorLogRecord, IntegrationCycleRecord, KnowledgeNode,
    NodeId, RawPayload, Similarity,
};
use crossweave_evolution::EvolutionTracker;
use crossweave_nodes::{NodeStore, NodeStoreError};
use crossweave_registry::DomainRegistry;
use crossweave_relations::{RelationGraph, TokenOverlap};
use crossweave_store::{Collection, RecordStore};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal, checked between cycle steps
///
/// Cancellation is honored at state transitions only, never mid-merge, so a
/// cancelled cycle leaves no half-written node or relation behind.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the current cycle at its next checkpoint
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Orchestrates one full integration pass per trigger
///
/// Owns cycle orchestration and is the only writer of the
/// `integration_history` collection. Node and relation writes go through the
/// respective sole-writer components. `run_cycle` takes `&mut self`, so
/// overlapping cycles are impossible by construction; the external scheduler
/// only needs to skip triggers while a cycle is in flight.
pub struct CycleEngine<M: Similarity = TokenOverlap> {
    config: EngineConfig,
    registry: DomainRegistry,
    nodes: NodeStore,
    relations: RelationGraph,
    tracker: EvolutionTracker,
    similarity: M,
    state: CycleState,
}

impl CycleEngine<TokenOverlap> {
    /// Create an engine with the default token-overlap comparator
    pub fn new(config: EngineConfig, registry: DomainRegistry) -> Self {
        Self::with_similarity(config, registry, TokenOverlap)
    }
}

impl<M: Similarity> CycleEngine<M> {
    /// Create an engine with a custom similarity comparator
    pub fn with_similarity(config: EngineConfig, registry: DomainRegistry, similarity: M) -> Self {
        let relations = RelationGraph::new(config.top_k_relations, config.reinforce_step);
        let tracker = EvolutionTracker::new(config.evolution_window, config.max_prior_step);
        Self {
            config,
            registry,
            nodes: NodeStore::default(),
            relations,
            tracker,
            similarity,
            state: CycleState::Idle,
        }
    }

    /// Current state of the cycle state machine
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// The engine's view of the domain registry
    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    /// Run one full integration cycle
    ///
    /// Collector timeouts and per-item validation problems are recorded in
    /// the error log and do not abort the cycle. Store-level errors do: the
    /// engine moves to `Failed`, keeps committed partial writes, and returns
    /// the error. Integration is idempotent over unchanged fingerprints, so
    /// a failed cycle self-heals on the next trigger.
    pub fn run_cycle<S, C>(
        &mut self,
        store: &mut S,
        collector: &mut C,
        cancel: &CancelToken,
    ) -> Result<IntegrationCycleRecord, EngineError>
    where
        S: RecordStore,
        C: DomainCollector,
    {
        let cycle_id = CycleId::new();
        let started_at = now_secs();
        tracing::info!(cycle = %cycle_id, "cycle started");

        match self.run_steps(store, collector, cancel, cycle_id, started_at) {
            Ok(record) => {
                self.state = CycleState::Idle;
                tracing::info!(
                    cycle = %cycle_id,
                    nodes_created = record.nodes_created,
                    nodes_merged = record.nodes_merged,
                    relations_created = record.relations_created,
                    relations_pruned = record.relations_pruned,
                    average_confidence = record.average_confidence,
                    "cycle completed"
                );
                Ok(record)
            }
            Err(err) if err.is_cancelled() => {
                tracing::info!(cycle = %cycle_id, stage = %self.state, "cycle cancelled");
                self.state = CycleState::Idle;
                Err(err)
            }
            Err(err) => {
                let stage = self.state;
                tracing::error!(cycle = %cycle_id, stage = %stage, error = %err, "cycle failed");
                self.state = CycleState::Failed;
                // Best-effort audit trail; the store may be the thing that broke
                let _ = self.log_error(store, cycle_id, None, stage, &err.to_string());
                let _ = self.write_failed_record(store, cycle_id, started_at);
                Err(err)
            }
        }
    }

    fn run_steps<S, C>(
        &mut self,
        store: &mut S,
        collector: &mut C,
        cancel: &CancelToken,
        cycle_id: CycleId,
        started_at: u64,
    ) -> Result<IntegrationCycleRecord, EngineError>
    where
        S: RecordStore,
        C: DomainCollector,
    {
        self.checkpoint(cancel)?;
        self.state = CycleState::Collecting;
        let (collected, domains_processed, domains_skipped) =
            self.collect(store, collector, cycle_id, started_at)?;

        self.checkpoint(cancel)?;
        self.state = CycleState::Integrating;
        let (changed, nodes_created, nodes_merged) = self.integrate(store, cycle_id, collected)?;

        self.checkpoint(cancel)?;
        self.state = CycleState::Relating;
        let floor = self.config.similarity_floor();
        let comparison = self.nodes.active_nodes(store, floor)?;
        let changed_nodes: Vec<KnowledgeNode> = changed.into_values().collect();
        let link_outcome = self.relations.link_candidates(
            store,
            &self.registry,
            &self.similarity,
            &changed_nodes,
            &comparison,
            floor,
            started_at,
        )?;
        let pruned = self
            .relations
            .prune(store, self.config.relation_staleness_secs(), now_secs())?;

        self.checkpoint(cancel)?;
        self.state = CycleState::Scoring;
        let decay_cutoff = now_secs().saturating_sub(self.config.node_staleness_secs());
        let decay = self.nodes.decay(
            store,
            decay_cutoff,
            self.config.decay_factor,
            self.config.min_confidence_threshold,
        )?;
        let average_confidence = self.nodes.average_confidence(store)?;

        self.checkpoint(cancel)?;
        self.state = CycleState::Recording;
        let record = IntegrationCycleRecord {
            cycle_id,
            started_at,
            finished_at: now_secs(),
            domains_processed,
            domains_skipped,
            nodes_created,
            nodes_merged,
            nodes_deactivated: decay.deactivated,
            relations_created: link_outcome.created,
            relations_reinforced: link_outcome.reinforced,
            relations_pruned: pruned + link_outcome.trimmed,
            average_confidence,
            outcome: CycleOutcome::Completed,
        };
        // Evolution feedback runs before the history append: if it fails,
        // no Completed record exists and the Failed audit record can land
        // under the same cycle id
        self.tracker
            .observe(store, &mut self.registry, &record, record.finished_at)?;
        store.put_record(
            Collection::IntegrationHistory,
            &cycle_id.to_string(),
            &record,
            Some(0),
        )?;

        Ok(record)
    }

    /// COLLECTING: pull candidates from the least-recently-processed domains
    ///
    /// Each domain gets up to `max_retries` attempts; an exhausted domain is
    /// skipped for the cycle and logged, not fatal. Request timeouts are the
    /// collector's responsibility (`request_timeout_secs` in the config).
    #[allow(clippy::type_complexity)]
    fn collect<S, C>(
        &mut self,
        store: &mut S,
        collector: &mut C,
        cycle_id: CycleId,
        started_at: u64,
    ) -> Result<(Vec<(String, Vec<RawPayload>)>, Vec<String>, Vec<String>), EngineError>
    where
        S: RecordStore,
        C: DomainCollector,
    {
        let selected = self
            .registry
            .select_for_cycle(self.config.max_domains_per_cycle, started_at);
        // Persist the rotation stamp so fairness survives restarts
        self.registry.save(store)?;

        let mut collected = Vec::new();
        let mut processed = Vec::new();
        let mut skipped = Vec::new();

        for domain in selected {
            let mut last_error = None;
            for attempt in 1..=self.config.max_retries.max(1) {
                match collector.fetch_candidates(&domain, self.config.candidates_per_domain) {
                    Ok(payloads) => {
                        tracing::debug!(%domain, count = payloads.len(), "candidates collected");
                        collected.push((domain.clone(), payloads));
                        last_error = None;
                        break;
                    }
                    Err(err) => {
                        tracing::warn!(%domain, attempt, error = %err, "collection attempt failed");
                        last_error = Some(err);
                    }
                }
            }

            match last_error {
                None => processed.push(domain),
                Some(err) => {
                    self.log_error(
                        store,
                        cycle_id,
                        Some(&domain),
                        CycleState::Collecting,
                        &err.to_string(),
                    )?;
                    skipped.push(domain);
                }
            }
        }

        Ok((collected, processed, skipped))
    }

    /// INTEGRATING: dedup candidates into the node store
    ///
    /// A payload that fails validation is logged and skipped so one bad
    /// candidate cannot abort the cycle; store errors propagate.
    #[allow(clippy::type_complexity)]
    fn integrate<S: RecordStore>(
        &mut self,
        store: &mut S,
        cycle_id: CycleId,
        collected: Vec<(String, Vec<RawPayload>)>,
    ) -> Result<(BTreeMap<NodeId, KnowledgeNode>, usize, usize), EngineError> {
        let mut changed: BTreeMap<NodeId, KnowledgeNode> = BTreeMap::new();
        let mut created_count = 0;
        let mut merged_count = 0;

        for (domain, payloads) in collected {
            for payload in payloads {
                match self
                    .nodes
                    .integrate(store, &self.registry, &domain, &payload, now_secs())
                {
                    Ok((node, created)) => {
                        if created {
                            created_count += 1;
                        } else {
                            merged_count += 1;
                        }
                        changed.insert(node.id.clone(), node);
                    }
                    Err(NodeStoreError::Validation(reason)) => {
                        self.log_error(
                            store,
                            cycle_id,
                            Some(&domain),
                            CycleState::Integrating,
                            &reason,
                        )?;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        Ok((changed, created_count, merged_count))
    }

    fn checkpoint(&self, cancel: &CancelToken) -> Result<(), EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }

    fn log_error<S: RecordStore>(
        &self,
        store: &mut S,
        cycle_id: CycleId,
        domain: Option<&str>,
        stage: CycleState,
        message: &str,
    ) -> Result<(), EngineError> {
        let entry = ErrorLogRecord {
            cycle_id,
            domain: domain.map(str::to_string),
            stage: stage.as_str().to_string(),
            message: message.to_string(),
            at: now_secs(),
        };
        store.put_record(
            Collection::ErrorLogs,
            &uuid::Uuid::now_v7().to_string(),
            &entry,
            None,
        )?;
        Ok(())
    }

    /// Append a Failed audit record for an aborted cycle, best effort
    fn write_failed_record<S: RecordStore>(
        &self,
        store: &mut S,
        cycle_id: CycleId,
        started_at: u64,
    ) -> Result<(), EngineError> {
        let record = IntegrationCycleRecord {
            cycle_id,
            started_at,
            finished_at: now_secs(),
            domains_processed: vec![],
            domains_skipped: vec![],
            nodes_created: 0,
            nodes_merged: 0,
            nodes_deactivated: 0,
            relations_created: 0,
            relations_reinforced: 0,
            relations_pruned: 0,
            average_confidence: 0.0,
            outcome: CycleOutcome::Failed,
        };
        store.put_record(
            Collection::IntegrationHistory,
            &cycle_id.to_string(),
            &record,
            Some(0),
        )?;
        Ok(())
    }
}
