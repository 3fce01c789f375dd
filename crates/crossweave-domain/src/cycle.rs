//! Integration cycle records - the append-only evolution log

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an integration cycle, based on UUIDv7
///
/// UUIDv7 keys sort chronologically, so the integration history collection is
/// naturally ordered by cycle start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CycleId(uuid::Uuid);

impl CycleId {
    /// Generate a new UUIDv7-based cycle id
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse a cycle id from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid cycle id: {}", e))
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// All steps ran; skipped domains, if any, are listed on the record
    Completed,
    /// A store-level error aborted the cycle; committed partial writes remain
    Failed,
}

/// Audit entry for one integration cycle, immutable once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationCycleRecord {
    /// Cycle identifier
    pub cycle_id: CycleId,

    /// Seconds since Unix epoch at cycle start
    pub started_at: u64,

    /// Seconds since Unix epoch at cycle end
    pub finished_at: u64,

    /// Domains whose candidates were integrated this cycle
    pub domains_processed: Vec<String>,

    /// Domains skipped after exhausting collector retries
    pub domains_skipped: Vec<String>,

    /// Nodes created from first observations
    pub nodes_created: usize,

    /// Observations merged into existing nodes
    pub nodes_merged: usize,

    /// Nodes deactivated by confidence decay
    pub nodes_deactivated: usize,

    /// Cross-domain relations created
    pub relations_created: usize,

    /// Existing relations reinforced
    pub relations_reinforced: usize,

    /// Stale relations pruned
    pub relations_pruned: usize,

    /// Mean confidence over the active node set after scoring
    pub average_confidence: f64,

    /// Whether the cycle completed or failed partway
    pub outcome: CycleOutcome,
}

/// Entry in the error log collection for per-item and per-domain failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogRecord {
    /// Cycle during which the failure happened
    pub cycle_id: CycleId,

    /// Domain involved, when the failure is domain-scoped
    pub domain: Option<String>,

    /// Cycle stage that produced the failure
    pub stage: String,

    /// Human-readable failure description
    pub message: String,

    /// Seconds since Unix epoch
    pub at: u64,
}

/// Snapshot of one evolution feedback step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionRecord {
    /// Cycle the adjustment was computed from
    pub cycle_id: CycleId,

    /// Average-confidence trend versus the preceding window
    pub confidence_delta: f64,

    /// Relations created plus pruned this cycle
    pub relation_churn: usize,

    /// Ordered domain pairs whose priors moved
    pub priors_adjusted: Vec<String>,

    /// Seconds since Unix epoch
    pub at: u64,
}
