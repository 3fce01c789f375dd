//! Crossweave Integration Engine
//!
//! Orchestrates the periodic integration cycle that pulls candidate facts
//! from domain collectors and folds them into the shared knowledge graph.
//!
//! # Overview
//!
//! Each cycle walks a fixed sequence of stages:
//!
//! - **Collecting**: pull candidate payloads from the least-recently-processed
//!   domains, with per-domain retries
//! - **Integrating**: deduplicate candidates into knowledge nodes, merging
//!   repeat observations
//! - **Relating**: link changed nodes across domains by prior-weighted
//!   similarity, then prune stale relations
//! - **Scoring**: decay unreinforced nodes and recompute average confidence
//! - **Recording**: append the cycle record and run evolution feedback on the
//!   domain-pair priors
//!
//! Per-item failures (a bad payload, an unreachable feed) are written to the
//! error log and never abort the cycle; store-level failures do, leaving the
//! engine in `Failed` with committed partial writes intact. Node and relation
//! identifiers are deterministic, so the next cycle absorbs the partial state
//! instead of duplicating it.
//!
//! # Usage
//!
//! ## One Cycle
//!
//! ```no_run
//! use crossweave_engine::{CancelToken, CycleEngine, EngineConfig};
//! use crossweave_domain::{CollectError, DomainCollector, RawPayload};
//! use crossweave_store::SqliteStore;
//!
//! struct NullCollector;
//!
//! impl DomainCollector for NullCollector {
//!     fn fetch_candidates(
//!         &mut self,
//!         _domain: &str,
//!         _limit: usize,
//!     ) -> Result<Vec<RawPayload>, CollectError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("crossweave.db")?;
//! let config = EngineConfig::default();
//! let registry = config.registry()?;
//! let mut engine = CycleEngine::new(config, registry);
//!
//! let record = engine.run_cycle(&mut store, &mut NullCollector, &CancelToken::new())?;
//! println!("created {} nodes", record.nodes_created);
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! See [`EngineWorker`] for scheduled operation with Ctrl+C shutdown.
//!
//! ## Configuration Presets
//!
//! ```
//! use crossweave_engine::EngineConfig;
//!
//! // Default: 6-hour cycles, original deployment settings
//! let config = EngineConfig::default();
//!
//! // Aggressive: hourly cycles, faster decay and prior movement
//! let config = EngineConfig::aggressive();
//!
//! // Lenient: daily cycles, gentle decay
//! let config = EngineConfig::lenient();
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod state;
mod worker;

pub use config::EngineConfig;
pub use engine::{CancelToken, CycleEngine};
pub use error::EngineError;
pub use state::CycleState;
pub use worker::EngineWorker;
