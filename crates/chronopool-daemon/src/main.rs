#![doc = include_str!("../README.md")]

mod daemon;

use std::sync::Arc;

use anyhow::Context;
use chronopool::{Allocator, FileStore, Initialized, PoolStore, ThreadRandom};
use clap::Parser;
use daemon::config::{CliArgs, Command, DaemonConfig, RunConfig};
use daemon::rollover::{final_rollover, run_rollover};
use daemon::telemetry::init_telemetry;
use daemon::workers::run_worker;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::{JoinError, spawn_blocking};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

type PoolAllocator = Allocator<FileStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = DaemonConfig::try_from(&args)?;

    init_telemetry()?;

    let allocator = Allocator::new(config.pool.clone(), FileStore::new(&config.pool_file))
        .context("invalid pool configuration")?;

    match &args.command {
        Command::Generate => generate(&allocator, &config),
        Command::Inspect => inspect(&allocator, &config),
        Command::Run(run_args) => {
            let run_config = RunConfig::try_from(run_args)?;
            run(Arc::new(allocator), run_config).await
        }
    }
}

fn generate(allocator: &PoolAllocator, config: &DaemonConfig) -> anyhow::Result<()> {
    allocator
        .regenerate(&ThreadRandom)
        .with_context(|| format!("failed to generate {}", config.pool_file.display()))?;

    tracing::info!(
        count = allocator.pool_len(),
        min_id = config.pool.min_id(),
        max_id = config.pool.max_id(),
        path = %config.pool_file.display(),
        "pool generated"
    );
    Ok(())
}

fn inspect(allocator: &PoolAllocator, config: &DaemonConfig) -> anyhow::Result<()> {
    let clock = allocator.clock();
    let start = clock.cycle_start(0)?;
    let next = clock.cycle_start(1)?;

    println!("pool file:       {}", config.pool_file.display());
    if allocator.store().is_blank()? {
        println!("pool size:       (none, run `generate` first)");
    } else {
        let pool = allocator.store().load_pool()?;
        println!("pool size:       {}", pool.len());
        println!("full cycles:     {}", pool.len() / config.units_per_cycle);
    }
    println!("units per cycle: {}", config.units_per_cycle);
    println!("current key:     {}", clock.current_key());
    println!("cycle start:     {}", start.as_secs());
    println!("next cycle:      {}", next.as_secs());
    Ok(())
}

async fn run(allocator: Arc<PoolAllocator>, config: RunConfig) -> anyhow::Result<()> {
    let setup = Arc::clone(&allocator);
    let outcome = joined(spawn_blocking(move || setup.initialize(&ThreadRandom)).await)?
        .context("failed to initialize the pool")?;

    match outcome {
        Initialized::Generated { count } => tracing::info!(count, "generated a fresh pool"),
        Initialized::Loaded { count } => tracing::info!(count, "resumed the persisted pool"),
    }
    if cfg!(debug_assertions) {
        tracing::info!("Starting allocator with full config: {:#?}", config);
    } else {
        tracing::info!("Starting allocator with {} workers", config.num_workers);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let workers: Vec<_> = (0..config.num_workers)
        .map(|worker| {
            tokio::spawn(run_worker(
                worker,
                Arc::clone(&allocator),
                config.claim_interval,
                shutdown_rx.clone(),
            ))
        })
        .collect();

    let mut scheduler = tokio::spawn(run_rollover(
        Arc::clone(&allocator),
        config.auto_regenerate,
        shutdown_rx,
    ));

    let mut scheduler_done = false;
    let outcome = tokio::select! {
        res = shutdown_signal() => res,
        res = &mut scheduler => {
            scheduler_done = true;
            joined(res).and_then(|r| r).context("rollover scheduler stopped")
        }
    };

    tracing::info!("Stopping workers...");
    let _ = shutdown_tx.send(true);

    let mut claimed = 0;
    for worker in workers {
        claimed += joined(worker.await)??;
    }
    if !scheduler_done {
        joined(scheduler.await)??;
    }

    match final_rollover(allocator).await {
        Ok(summary) => tracing::info!(
            claimed,
            retained = summary.retained,
            discarded = summary.discarded,
            "final rollover complete"
        ),
        Err(err) => tracing::error!("Final rollover failed: {:?}", err),
    }

    outcome
}

fn joined<T>(res: Result<T, JoinError>) -> anyhow::Result<T> {
    res.context("task panicked")
}

async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install signal handler")?
            .recv()
            .await;
        anyhow::Ok(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<anyhow::Result<()>>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .context("failed to install Ctrl+C handler")
    };

    tokio::select! {
        res = ctrl_c => {
            res?;
            tracing::info!("Received Ctrl+C signal");
        },
        res = terminate => {
            res?;
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
    Ok(())
}
