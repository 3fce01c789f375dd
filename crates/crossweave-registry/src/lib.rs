//! Crossweave Domain Source Registry
//!
//! Holds the configured set of active knowledge domains, the per-pair
//! relationship-weight priors, and the least-recently-processed bookkeeping
//! that keeps domain selection fair when more domains are configured than fit
//! in one cycle.
//!
//! Priors are read by the relation graph and mutated only by the evolution
//! feedback step, in bounded increments. Registry state is persisted as a
//! single versioned record in the `domain_sources` collection.

#![warn(missing_docs)]

mod error;

pub use error::RegistryError;

use crossweave_store::{Collection, RecordStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prior weight assumed for a domain pair with no configured entry
pub const DEFAULT_PRIOR: f64 = 0.5;

/// Storage key of the singleton registry record
const REGISTRY_RECORD_ID: &str = "registry";

/// Key form for an ordered domain pair, matching the original configuration
/// syntax (`"scientific_research->technology_news"`)
pub fn pair_key(source: &str, target: &str) -> String {
    format!("{}->{}", source, target)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RegistryState {
    domains: Vec<String>,
    priors: BTreeMap<String, f64>,
    /// Cycle-start timestamp at which each domain was last selected
    last_processed: BTreeMap<String, u64>,
}

/// Active domain set, domain-pair priors, and fair selection order
#[derive(Debug, Clone, PartialEq)]
pub struct DomainRegistry {
    state: RegistryState,
    version: u64,
}

impl DomainRegistry {
    /// Build a registry from configuration
    ///
    /// Fails when the domain list is empty or duplicated, when a prior falls
    /// outside [0, 1], or when a prior key is not of the `a->b` form.
    pub fn new(
        domains: Vec<String>,
        priors: BTreeMap<String, f64>,
    ) -> Result<Self, RegistryError> {
        if domains.is_empty() {
            return Err(RegistryError::Validation(
                "active domain list is empty".into(),
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for domain in &domains {
            if domain.is_empty() {
                return Err(RegistryError::Validation("empty domain name".into()));
            }
            if !seen.insert(domain) {
                return Err(RegistryError::Validation(format!(
                    "duplicate domain: {}",
                    domain
                )));
            }
        }
        for (key, weight) in &priors {
            if !key.contains("->") {
                return Err(RegistryError::Validation(format!(
                    "prior key {:?} is not of the form source->target",
                    key
                )));
            }
            if !(0.0..=1.0).contains(weight) {
                return Err(RegistryError::Validation(format!(
                    "prior {:?} = {} is outside [0, 1]",
                    key, weight
                )));
            }
        }

        Ok(Self {
            state: RegistryState {
                domains,
                priors,
                last_processed: BTreeMap::new(),
            },
            version: 0,
        })
    }

    /// Whether a domain is in the active set
    pub fn is_active(&self, domain: &str) -> bool {
        self.state.domains.iter().any(|d| d == domain)
    }

    /// The configured active domains
    pub fn domains(&self) -> &[String] {
        &self.state.domains
    }

    /// Prior weight for an ordered domain pair
    ///
    /// Unconfigured pairs fall back to [`DEFAULT_PRIOR`].
    pub fn prior(&self, source: &str, target: &str) -> f64 {
        self.state
            .priors
            .get(&pair_key(source, target))
            .copied()
            .unwrap_or(DEFAULT_PRIOR)
    }

    /// All configured priors
    pub fn priors(&self) -> &BTreeMap<String, f64> {
        &self.state.priors
    }

    /// Select up to `max` domains for the next cycle
    ///
    /// Domains are taken least-recently-processed first (name order breaks
    /// ties). Selected domains are stamped with `cycle_started_at` offset by
    /// their selection position, so domains picked in one cycle never tie
    /// with each other and the rotation stays strict. Over consecutive
    /// cycles every configured domain is therefore selected at least once
    /// per ceil(domains / max) cycles.
    pub fn select_for_cycle(&mut self, max: usize, cycle_started_at: u64) -> Vec<String> {
        let mut ordered: Vec<&String> = self.state.domains.iter().collect();
        ordered.sort_by_key(|domain| {
            (
                self.state.last_processed.get(*domain).copied().unwrap_or(0),
                (*domain).clone(),
            )
        });

        let selected: Vec<String> = ordered.into_iter().take(max).cloned().collect();
        for (position, domain) in selected.iter().enumerate() {
            self.state
                .last_processed
                .insert(domain.clone(), cycle_started_at + position as u64);
        }
        selected
    }

    /// Move a pair's prior by `delta`, bounded by `max_step` per call and
    /// clamped to [0, 1]
    ///
    /// Returns the new prior. Only the evolution feedback step calls this.
    pub fn adjust_prior(&mut self, source: &str, target: &str, delta: f64, max_step: f64) -> f64 {
        let key = pair_key(source, target);
        let current = self
            .state
            .priors
            .get(&key)
            .copied()
            .unwrap_or(DEFAULT_PRIOR);
        let bounded = delta.clamp(-max_step.abs(), max_step.abs());
        let updated = (current + bounded).clamp(0.0, 1.0);
        tracing::debug!(pair = %key, current, updated, "prior adjusted");
        self.state.priors.insert(key, updated);
        updated
    }

    /// Load persisted registry state, if any
    pub fn load<S: RecordStore>(store: &S) -> Result<Option<Self>, RegistryError> {
        let loaded = store
            .get_versioned::<RegistryState>(Collection::DomainSources, REGISTRY_RECORD_ID)?;
        Ok(loaded.map(|(state, version)| Self { state, version }))
    }

    /// Load persisted state or fall back to the given configured registry
    ///
    /// The configured domain list and priors win over persisted ones for
    /// domains the operator has edited; persisted `last_processed` order and
    /// evolved priors are kept for domains still present.
    pub fn load_or_init<S: RecordStore>(
        store: &S,
        configured: DomainRegistry,
    ) -> Result<Self, RegistryError> {
        match Self::load(store)? {
            Some(mut persisted) => {
                let domains = configured.state.domains;
                persisted
                    .state
                    .last_processed
                    .retain(|domain, _| domains.iter().any(|d| d == domain));
                persisted.state.domains = domains;
                // Configured priors seed pairs the evolved state has not seen
                for (key, weight) in configured.state.priors {
                    persisted.state.priors.entry(key).or_insert(weight);
                }
                Ok(persisted)
            }
            None => Ok(configured),
        }
    }

    /// Persist registry state with a conditional write
    ///
    /// A version conflict means another writer touched the registry record;
    /// the caller treats that as a store-level cycle failure.
    pub fn save<S: RecordStore>(&mut self, store: &mut S) -> Result<(), RegistryError> {
        let next = store.put_record(
            Collection::DomainSources,
            REGISTRY_RECORD_ID,
            &self.state,
            Some(self.version),
        )?;
        self.version = next;
        Ok(())
    }
}
