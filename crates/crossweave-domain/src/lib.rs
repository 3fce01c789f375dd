//! Crossweave Domain Layer
//!
//! This crate contains the core data model for the cross-domain knowledge
//! integration engine. It carries only primitive dependencies (uuid, serde,
//! sha2) and defines the fundamental value objects and trait seams that all
//! other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **KnowledgeNode**: a deduplicated fact within one domain, with a
//!   corroboration-driven confidence score
//! - **Fingerprint**: normalized content hash used for within-domain dedup
//! - **CrossDomainRelation**: a scored edge between nodes of different domains
//! - **IntegrationCycleRecord**: the append-only audit entry for one cycle
//! - **Confidence**: scalar in [0, 1], monotonically reinforced and decayed
//!
//! ## Architecture
//!
//! - Pure value objects and numeric rules only
//! - Infrastructure implementations (persistence, collection) live in other
//!   crates behind the traits defined here

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod cycle;
pub mod fingerprint;
pub mod node;
pub mod relation;
pub mod time;
pub mod traits;

// Re-exports for convenience
pub use cycle::{CycleId, CycleOutcome, ErrorLogRecord, EvolutionRecord, IntegrationCycleRecord};
pub use fingerprint::Fingerprint;
pub use node::{KnowledgeNode, NodeId, RawPayload};
pub use relation::{CrossDomainRelation, RelationId};
pub use traits::{CollectError, DomainCollector, Similarity};
