//! Cycle state machine states

use std::fmt;

/// State of the integration cycle engine
///
/// A cycle walks `Idle -> Collecting -> Integrating -> Relating -> Scoring ->
/// Recording -> Idle`. A store-level error leaves the engine in `Failed`;
/// partial writes already committed are kept and the next scheduled trigger
/// retries from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Waiting for the next scheduled trigger
    Idle,
    /// Pulling candidate payloads from domain collectors
    Collecting,
    /// Deduplicating candidates into the node store
    Integrating,
    /// Recomputing relations touching changed nodes, then pruning
    Relating,
    /// Applying decay and the confidence threshold
    Scoring,
    /// Writing the cycle record and running evolution feedback
    Recording,
    /// Aborted by an unrecoverable error; ready for the next trigger
    Failed,
}

impl CycleState {
    /// Stage name used in logs and error records
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleState::Idle => "idle",
            CycleState::Collecting => "collecting",
            CycleState::Integrating => "integrating",
            CycleState::Relating => "relating",
            CycleState::Scoring => "scoring",
            CycleState::Recording => "recording",
            CycleState::Failed => "failed",
        }
    }

    /// Whether a new cycle may start from this state
    pub fn is_ready(&self) -> bool {
        matches!(self, CycleState::Idle | CycleState::Failed)
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_states() {
        assert!(CycleState::Idle.is_ready());
        assert!(CycleState::Failed.is_ready());
        assert!(!CycleState::Collecting.is_ready());
        assert!(!CycleState::Recording.is_ready());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(CycleState::Relating.as_str(), "relating");
        assert_eq!(CycleState::Failed.to_string(), "failed");
    }
}
