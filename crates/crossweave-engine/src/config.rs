//! Configuration for the integration cycle engine
//!
//! One explicit struct, built at startup and passed into the engine; there is
//! no ambient global configuration. Defaults mirror the original deployment's
//! settings (6-hour cycles, 5 domains per cycle, 0.7 confidence threshold,
//! and the four stock domains with their relationship priors).

use crossweave_registry::{DomainRegistry, RegistryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration for the integration cycle engine
///
/// # Examples
///
/// ```
/// use crossweave_engine::EngineConfig;
///
/// // Default configuration (original deployment settings)
/// let config = EngineConfig::default();
/// assert_eq!(config.update_interval_minutes, 360);
///
/// // Aggressive evolution
/// let config = EngineConfig::aggressive();
/// assert_eq!(config.update_interval_minutes, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minutes between scheduled integration cycles
    /// Default: 360 (6 hours)
    pub update_interval_minutes: u64,

    /// Maximum number of domains processed per cycle
    /// Default: 5
    pub max_domains_per_cycle: usize,

    /// Minimum confidence for a node or relation to count as active
    /// Also the similarity floor for relation candidates
    /// Default: 0.7
    pub min_confidence_threshold: f64,

    /// Request timeout collectors should apply to external calls (seconds)
    /// Default: 30
    pub request_timeout_secs: u64,

    /// Collection attempts per domain before it is skipped for the cycle
    /// Default: 3
    pub max_retries: usize,

    /// Candidate payloads requested per domain per cycle
    /// Default: 25
    pub candidates_per_domain: usize,

    /// Hours without reinforcement before a node starts decaying
    /// Default: 72
    pub node_staleness_hours: u64,

    /// Hours without reinforcement before a relation is pruned
    /// Default: 168 (one week)
    pub relation_staleness_hours: u64,

    /// Multiplicative confidence factor per decay step
    /// Default: 0.9
    pub decay_factor: f64,

    /// Maximum active relations kept per node
    /// Default: 4
    pub top_k_relations: usize,

    /// Fraction of the weight difference applied per reinforcement
    /// Default: 0.3
    pub reinforce_step: f64,

    /// Trailing cycles considered by the evolution trend
    /// Default: 5
    pub evolution_window: usize,

    /// Maximum prior movement per cycle
    /// Default: 0.05
    pub max_prior_step: f64,

    /// Domains to actively monitor and integrate
    pub active_domains: Vec<String>,

    /// Configured relationship-weight priors per ordered domain pair
    /// Keys use the `source->target` form
    pub relationship_priors: BTreeMap<String, f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut relationship_priors = BTreeMap::new();
        relationship_priors.insert("scientific_research->technology_news".to_string(), 0.8);
        relationship_priors.insert("academic_papers->industry_reports".to_string(), 0.9);
        relationship_priors.insert("technology_news->scientific_research".to_string(), 0.7);

        Self {
            update_interval_minutes: 360,
            max_domains_per_cycle: 5,
            min_confidence_threshold: 0.7,
            request_timeout_secs: 30,
            max_retries: 3,
            candidates_per_domain: 25,
            node_staleness_hours: 72,
            relation_staleness_hours: 168,
            decay_factor: 0.9,
            top_k_relations: 4,
            reinforce_step: 0.3,
            evolution_window: 5,
            max_prior_step: 0.05,
            active_domains: vec![
                "scientific_research".to_string(),
                "technology_news".to_string(),
                "academic_papers".to_string(),
                "industry_reports".to_string(),
            ],
            relationship_priors,
        }
    }
}

impl EngineConfig {
    /// Fast-evolving configuration: hourly cycles, quicker decay, larger
    /// feedback steps
    pub fn aggressive() -> Self {
        Self {
            update_interval_minutes: 60,
            node_staleness_hours: 24,
            relation_staleness_hours: 72,
            decay_factor: 0.8,
            max_prior_step: 0.1,
            ..Self::default()
        }
    }

    /// Slow-evolving configuration: daily cycles, gentle decay, small
    /// feedback steps
    pub fn lenient() -> Self {
        Self {
            update_interval_minutes: 1440,
            node_staleness_hours: 168,
            relation_staleness_hours: 720,
            decay_factor: 0.95,
            max_prior_step: 0.02,
            ..Self::default()
        }
    }

    /// Interval between scheduled cycles
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_minutes * 60)
    }

    /// Node staleness window in seconds
    pub fn node_staleness_secs(&self) -> u64 {
        self.node_staleness_hours * 3600
    }

    /// Relation staleness window in seconds
    pub fn relation_staleness_secs(&self) -> u64 {
        self.relation_staleness_hours * 3600
    }

    /// Similarity floor for relation candidates, derived from the confidence
    /// threshold
    pub fn similarity_floor(&self) -> f64 {
        self.min_confidence_threshold
    }

    /// Build the domain registry described by this configuration
    pub fn registry(&self) -> Result<DomainRegistry, RegistryError> {
        DomainRegistry::new(
            self.active_domains.clone(),
            self.relationship_priors.clone(),
        )
    }
}
