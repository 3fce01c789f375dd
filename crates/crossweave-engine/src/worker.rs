//! Background worker for continuous integration operation

use crate::{CancelToken, CycleEngine, EngineConfig, EngineError};
use crossweave_domain::{DomainCollector, Similarity};
use crossweave_registry::DomainRegistry;
use crossweave_relations::TokenOverlap;
use crossweave_store::RecordStore;
use tokio::time::{interval, Duration};

/// Background worker that runs integration cycles on a schedule
///
/// Runs the cycle engine at the interval defined by the configuration until
/// a shutdown signal (Ctrl+C) arrives. A failed cycle is logged and the
/// scheduler keeps running; the next tick retries from scratch. A trigger
/// that fires while the engine is still mid-cycle cannot happen here because
/// cycles run inline on the scheduler task, but `CycleState::is_ready` is
/// still checked so external callers sharing an engine get the same
/// guarantee.
///
/// # Examples
///
/// ```no_run
/// use crossweave_engine::{EngineConfig, EngineWorker};
/// use crossweave_domain::{CollectError, DomainCollector, RawPayload};
/// use crossweave_store::SqliteStore;
///
/// struct NullCollector;
///
/// impl DomainCollector for NullCollector {
///     fn fetch_candidates(
///         &mut self,
///         _domain: &str,
///         _limit: usize,
///     ) -> Result<Vec<RawPayload>, CollectError> {
///         Ok(Vec::new())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = EngineConfig::default();
///     let mut store = SqliteStore::new("crossweave.db")?;
///     let registry = config.registry()?;
///     let mut worker = EngineWorker::new(config, registry);
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run(&mut store, &mut NullCollector).await?;
///     Ok(())
/// }
/// ```
pub struct EngineWorker<M: Similarity = TokenOverlap> {
    engine: CycleEngine<M>,
    interval: Duration,
    cancel: CancelToken,
}

impl EngineWorker<TokenOverlap> {
    /// Create a worker with the default token-overlap comparator
    pub fn new(config: EngineConfig, registry: DomainRegistry) -> Self {
        let interval = config.update_interval();
        Self {
            engine: CycleEngine::new(config, registry),
            interval,
            cancel: CancelToken::new(),
        }
    }
}

impl<M: Similarity> EngineWorker<M> {
    /// Create a worker around an existing engine
    pub fn with_engine(engine: CycleEngine<M>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            cancel: CancelToken::new(),
        }
    }

    /// Token used to cancel the in-flight cycle cooperatively
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The engine driven by this worker
    pub fn engine(&self) -> &CycleEngine<M> {
        &self.engine
    }

    /// Run the worker indefinitely
    ///
    /// Runs an integration cycle at the configured interval until a shutdown
    /// signal (Ctrl+C) is received. Cycle failures are logged and do not stop
    /// the scheduler.
    pub async fn run<S, C>(&mut self, store: &mut S, collector: &mut C) -> Result<(), EngineError>
    where
        S: RecordStore,
        C: DomainCollector,
    {
        let mut ticker = interval(self.interval);

        tracing::info!("integration worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.engine.state().is_ready() {
                        tracing::warn!(state = %self.engine.state(), "skipping trigger, cycle in flight");
                        continue;
                    }
                    match self.engine.run_cycle(store, collector, &self.cancel) {
                        Ok(record) => {
                            tracing::info!(
                                "cycle completed: {} created, {} merged, {} relations",
                                record.nodes_created,
                                record.nodes_merged,
                                record.relations_created
                            );
                        }
                        Err(err) if err.is_cancelled() => {
                            tracing::info!("cycle cancelled, stopping worker");
                            break;
                        }
                        Err(err) => {
                            tracing::error!("cycle failed: {}", err);
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received, stopping worker");
                    self.cancel.cancel();
                    break;
                }
            }
        }

        tracing::info!("integration worker stopped");
        Ok(())
    }

    /// Run for a specific number of cycles (useful for testing)
    ///
    /// Unlike [`run`](Self::run), a failed cycle stops the loop and returns
    /// the error.
    pub async fn run_cycles<S, C>(
        &mut self,
        store: &mut S,
        collector: &mut C,
        cycles: usize,
    ) -> Result<(), EngineError>
    where
        S: RecordStore,
        C: DomainCollector,
    {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "integration worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;

            tracing::debug!("starting cycle {}/{}", cycle + 1, cycles);
            let record = self.engine.run_cycle(store, collector, &self.cancel)?;
            tracing::info!(
                "cycle {}/{} completed: {} created, {} merged",
                cycle + 1,
                cycles,
                record.nodes_created,
                record.nodes_merged
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossweave_domain::{CollectError, RawPayload};
    use crossweave_store::{Collection, MemoryStore};

    struct StaticCollector {
        payloads: Vec<(String, RawPayload)>,
    }

    impl DomainCollector for StaticCollector {
        fn fetch_candidates(
            &mut self,
            domain: &str,
            limit: usize,
        ) -> Result<Vec<RawPayload>, CollectError> {
            Ok(self
                .payloads
                .iter()
                .filter(|(d, _)| d == domain)
                .map(|(_, p)| p.clone())
                .take(limit)
                .collect())
        }
    }

    fn payload(content: &str) -> RawPayload {
        RawPayload {
            content: content.to_string(),
            source: Some("test-feed".to_string()),
            confidence_hint: Some(0.9),
        }
    }

    fn fast_worker() -> EngineWorker {
        let config = EngineConfig::default();
        let registry = config.registry().unwrap();
        let engine = CycleEngine::new(config, registry);
        EngineWorker::with_engine(engine, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_run_cycles_records_history() {
        let mut store = MemoryStore::new();
        let mut worker = fast_worker();

        let mut collector = StaticCollector {
            payloads: vec![
                ("scientific_research".to_string(), payload("quantum sensor advances")),
                ("technology_news".to_string(), payload("quantum sensor startup funding")),
            ],
        };

        worker.run_cycles(&mut store, &mut collector, 2).await.unwrap();

        let history = store.query(Collection::IntegrationHistory).unwrap();
        assert_eq!(history.len(), 2);
        assert!(worker.engine().state().is_ready());
    }

    #[tokio::test]
    async fn test_cancelled_worker_stops_before_writing() {
        let mut store = MemoryStore::new();
        let mut worker = fast_worker();
        worker.cancel_token().cancel();

        let mut collector = StaticCollector { payloads: vec![] };
        let err = worker
            .run_cycles(&mut store, &mut collector, 1)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(store.query(Collection::IntegrationHistory).unwrap().is_empty());
    }
}
