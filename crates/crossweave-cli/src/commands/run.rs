//! Run and cycle command implementations.

use crate::cli::RunArgs;
use crate::collector::SpoolCollector;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crossweave_engine::{CancelToken, CycleEngine, EngineWorker};
use crossweave_registry::DomainRegistry;
use crossweave_store::RecordStore;

/// Execute the run command: scheduled cycles until Ctrl+C or a cycle count.
pub async fn execute_run<S: RecordStore>(
    args: RunArgs,
    config: &Config,
    store: &mut S,
    formatter: &Formatter,
) -> Result<()> {
    let registry = load_registry(config, store)?;
    let mut collector = SpoolCollector::new(&config.spool_dir);
    let mut worker = EngineWorker::new(config.engine.clone(), registry);

    match args.cycles {
        Some(cycles) => worker.run_cycles(store, &mut collector, cycles).await?,
        None => worker.run(store, &mut collector).await?,
    }

    println!("{}", formatter.success("worker stopped"));
    Ok(())
}

/// Execute the cycle command: one integration cycle, then exit.
pub async fn execute_cycle<S: RecordStore>(
    config: &Config,
    store: &mut S,
    formatter: &Formatter,
) -> Result<()> {
    let registry = load_registry(config, store)?;
    let mut collector = SpoolCollector::new(&config.spool_dir);
    let mut engine = CycleEngine::new(config.engine.clone(), registry);

    let record = engine.run_cycle(store, &mut collector, &CancelToken::new())?;
    println!("{}", formatter.format_history(&[record])?);
    Ok(())
}

/// Registry from persisted state, seeded with the configured domains.
fn load_registry<S: RecordStore>(config: &Config, store: &S) -> Result<DomainRegistry> {
    let configured = config.engine.registry()?;
    Ok(DomainRegistry::load_or_init(store, configured)?)
}
