//! Crossweave Evolution Metrics Tracker
//!
//! The feedback half of the integration loop. After each cycle the tracker
//! compares the cycle's average confidence against the trailing window of
//! earlier cycles and nudges the priors of the domain pairs that were
//! processed, in the direction the trend points. Steps are bounded per cycle
//! and the result is clamped to [0, 1], which keeps the feedback loop stable.
//!
//! The tracker is the sole mutator of domain-pair priors and owns the
//! `evolution_metrics` collection.

#![warn(missing_docs)]

use crossweave_domain::{EvolutionRecord, IntegrationCycleRecord};
use crossweave_registry::{pair_key, DomainRegistry, RegistryError};
use crossweave_store::{Collection, RecordStore, StoreError};
use thiserror::Error;

/// Errors that can occur during the evolution feedback step
#[derive(Error, Debug)]
pub enum EvolutionError {
    /// Storage layer error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Registry state could not be persisted
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Outcome of one feedback step
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOutcome {
    /// Confidence trend versus the trailing window (already step-bounded)
    pub confidence_delta: f64,
    /// Ordered domain-pair keys whose priors moved
    pub priors_adjusted: Vec<String>,
}

/// Computes trend deltas over recent cycles and applies bounded prior steps
#[derive(Debug, Clone)]
pub struct EvolutionTracker {
    window: usize,
    max_prior_step: f64,
}

impl Default for EvolutionTracker {
    fn default() -> Self {
        Self {
            window: 5,
            max_prior_step: 0.05,
        }
    }
}

impl EvolutionTracker {
    /// Create a tracker with an explicit trend window and step bound
    pub fn new(window: usize, max_prior_step: f64) -> Self {
        Self {
            window: window.max(1),
            max_prior_step: max_prior_step.abs(),
        }
    }

    /// Consume a finished cycle record: adjust priors and persist a snapshot
    ///
    /// The trend is the cycle's average confidence minus the mean over the
    /// last `window` earlier cycles, clamped to the per-cycle step bound. The
    /// priors of every ordered pair among the cycle's processed domains move
    /// by that bounded delta. With no history there is nothing to compare and
    /// priors stay put.
    pub fn observe<S: RecordStore>(
        &self,
        store: &mut S,
        registry: &mut DomainRegistry,
        record: &IntegrationCycleRecord,
        now: u64,
    ) -> Result<EvolutionOutcome, EvolutionError> {
        let delta = self.trend_delta(store, record)?;

        let mut priors_adjusted = Vec::new();
        if delta != 0.0 {
            for source in &record.domains_processed {
                for target in &record.domains_processed {
                    if source == target {
                        continue;
                    }
                    registry.adjust_prior(source, target, delta, self.max_prior_step);
                    priors_adjusted.push(pair_key(source, target));
                }
            }
        }

        if !priors_adjusted.is_empty() {
            registry.save(store)?;
        }

        let snapshot = EvolutionRecord {
            cycle_id: record.cycle_id,
            confidence_delta: delta,
            relation_churn: record.relations_created + record.relations_pruned,
            priors_adjusted: priors_adjusted.clone(),
            at: now,
        };
        store.put_record(
            Collection::EvolutionMetrics,
            &record.cycle_id.to_string(),
            &snapshot,
            Some(0),
        )?;

        tracing::info!(
            cycle = %record.cycle_id,
            delta,
            adjusted = priors_adjusted.len(),
            "evolution feedback applied"
        );

        Ok(EvolutionOutcome {
            confidence_delta: delta,
            priors_adjusted,
        })
    }

    /// Step-bounded confidence trend for a cycle against the trailing window
    ///
    /// Cycle ids are UUIDv7, so the id-ordered history scan is chronological;
    /// the window is the last `window` earlier completed cycles.
    fn trend_delta<S: RecordStore>(
        &self,
        store: &S,
        record: &IntegrationCycleRecord,
    ) -> Result<f64, EvolutionError> {
        let history: Vec<IntegrationCycleRecord> =
            store.query_records(Collection::IntegrationHistory)?;

        let previous: Vec<f64> = history
            .iter()
            .filter(|earlier| earlier.cycle_id < record.cycle_id)
            .rev()
            .take(self.window)
            .map(|earlier| earlier.average_confidence)
            .collect();

        if previous.is_empty() {
            return Ok(0.0);
        }

        let baseline = previous.iter().sum::<f64>() / previous.len() as f64;
        let raw = record.average_confidence - baseline;
        Ok(raw.clamp(-self.max_prior_step, self.max_prior_step))
    }
}
