//! Crossweave Cross-Domain Relation Graph
//!
//! Creates, reinforces, and prunes scored edges between knowledge nodes of
//! different domains.
//!
//! # Overview
//!
//! - Candidate pairs come from comparing changed nodes against the active
//!   nodes of *other* domains through a pluggable [`Similarity`] comparator
//!   (default: token-overlap Jaccard)
//! - Relation weight is `domain prior x similarity`, so either a weak prior
//!   or weak evidence vetoes a link
//! - Recurring pairs are reinforced by a bounded nudge toward the newly
//!   computed weight, which damps oscillation from single noisy observations
//! - Per-node fan-out is capped at top-K relations by weight
//! - Relations unreinforced beyond the staleness window are pruned
//!
//! [`Similarity`]: crossweave_domain::Similarity

#![warn(missing_docs)]

mod error;
mod graph;
mod similarity;

pub use error::RelationError;
pub use graph::{LinkOutcome, Linked, RelationGraph};
pub use similarity::TokenOverlap;
