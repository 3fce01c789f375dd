//! Inspection command implementations.

use crate::cli::{ErrorsArgs, HistoryArgs, NodesArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crossweave_domain::{ErrorLogRecord, IntegrationCycleRecord, KnowledgeNode};
use crossweave_registry::DomainRegistry;
use crossweave_store::{Collection, RecordStore};

/// Execute the history command.
pub fn execute_history<S: RecordStore>(
    args: HistoryArgs,
    store: &S,
    formatter: &Formatter,
) -> Result<()> {
    // Cycle ids are UUIDv7, so id order is chronological; newest first
    let mut records: Vec<IntegrationCycleRecord> =
        store.query_records(Collection::IntegrationHistory)?;
    records.reverse();
    records.truncate(args.limit);

    println!("{}", formatter.format_history(&records)?);
    Ok(())
}

/// Execute the nodes command.
pub fn execute_nodes<S: RecordStore>(
    args: NodesArgs,
    store: &S,
    formatter: &Formatter,
) -> Result<()> {
    if !(0.0..=1.0).contains(&args.min_confidence) {
        return Err(CliError::InvalidInput(
            "Confidence must be between 0.0 and 1.0".to_string(),
        ));
    }

    let mut nodes: Vec<KnowledgeNode> = store.query_records(Collection::KnowledgeNodes)?;
    nodes.retain(|node| {
        (args.all || node.active)
            && node.confidence >= args.min_confidence
            && args.domain.as_ref().is_none_or(|d| &node.domain == d)
    });
    // Strongest first
    nodes.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    nodes.truncate(args.limit);

    println!("{}", formatter.format_nodes(&nodes)?);
    Ok(())
}

/// Execute the domains command.
pub fn execute_domains<S: RecordStore>(
    config: &Config,
    store: &S,
    formatter: &Formatter,
) -> Result<()> {
    let configured = config.engine.registry()?;
    let registry = DomainRegistry::load_or_init(store, configured)?;

    println!(
        "{}",
        formatter.format_domains(registry.domains(), registry.priors())?
    );
    Ok(())
}

/// Execute the errors command.
pub fn execute_errors<S: RecordStore>(
    args: ErrorsArgs,
    store: &S,
    formatter: &Formatter,
) -> Result<()> {
    // Error log keys are UUIDv7, newest last in id order
    let mut errors: Vec<ErrorLogRecord> = store.query_records(Collection::ErrorLogs)?;
    errors.reverse();
    errors.truncate(args.limit);

    println!("{}", formatter.format_errors(&errors)?);
    Ok(())
}
