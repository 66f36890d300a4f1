use std::sync::Arc;

use anyhow::Context;
use chronopool::{Allocator, Error, PoolStore, RolloverSummary, ThreadRandom, TimeSource};
use tokio::sync::watch;
use tokio::task::spawn_blocking;

/// Rolls the allocator over at every cycle boundary until `shutdown` flips.
///
/// Sleeps until the start of the next cycle, then (on a blocking thread,
/// since both steps rewrite the pool file) persists the unconsumed
/// identifiers and binds the cycle that just began. The cycle to bind is
/// computed before sleeping so an early wake-up cannot reload the old one.
pub async fn run_rollover<S, T>(
    allocator: Arc<Allocator<S, T>>,
    auto_regenerate: bool,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()>
where
    S: PoolStore + Send + Sync + 'static,
    T: TimeSource + Send + Sync + 'static,
{
    loop {
        let clock = allocator.clock();
        let next = clock.cycle_start(1)?;
        let wait = next.saturating_sub(clock.now());
        tracing::debug!(?wait, "sleeping until the next cycle");

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => return Ok(()),
        }

        let allocator = Arc::clone(&allocator);
        let summary = spawn_blocking(move || advance(&allocator, next, auto_regenerate))
            .await
            .context("rollover task panicked")??;

        tracing::info!(
            retained = summary.retained,
            discarded = summary.discarded,
            start_secs = next.as_secs(),
            "cycle advanced"
        );
    }
}

/// Final rollover on shutdown, so identifiers consumed in the interrupted
/// cycle are not served again after a restart.
pub async fn final_rollover<S, T>(
    allocator: Arc<Allocator<S, T>>,
) -> anyhow::Result<RolloverSummary>
where
    S: PoolStore + Send + Sync + 'static,
    T: TimeSource + Send + Sync + 'static,
{
    let summary = spawn_blocking(move || allocator.rollover())
        .await
        .context("rollover task panicked")??;
    Ok(summary)
}

fn advance<S, T>(
    allocator: &Allocator<S, T>,
    next: core::time::Duration,
    auto_regenerate: bool,
) -> anyhow::Result<RolloverSummary>
where
    S: PoolStore,
    T: TimeSource,
{
    let summary = allocator.rollover()?;

    match allocator.load(next) {
        Ok(()) => Ok(summary),
        Err(Error::PoolUnderrun { needed, available }) if auto_regenerate => {
            tracing::warn!(needed, available, "pool exhausted, generating a fresh one");
            allocator.regenerate(&ThreadRandom)?;
            allocator.load(next)?;
            Ok(summary)
        }
        Err(e) => Err(e).context("failed to load the next cycle"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronopool::{MemoryStore, PoolConfig};
    use core::time::Duration;

    /// Sits one millisecond before the 10 s boundary of a 5 s cycle.
    struct EdgeTime;
    impl TimeSource for EdgeTime {
        fn now(&self) -> Duration {
            Duration::from_millis(9_999)
        }
    }

    fn allocator(count: usize) -> Arc<Allocator<MemoryStore, EdgeTime>> {
        let config = PoolConfig::default()
            .with_cycle(Duration::from_secs(5))
            .with_count(count);
        let allocator = Allocator::with_time(config, MemoryStore::default(), EdgeTime).unwrap();
        allocator.initialize(&ThreadRandom).unwrap();
        Arc::new(allocator)
    }

    #[tokio::test]
    async fn advances_into_the_next_cycle() {
        let allocator = allocator(10);
        assert_eq!(allocator.active_start_key(), Some(5));
        assert!(allocator.claim(7).is_some());

        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(run_rollover(Arc::clone(&allocator), false, rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(allocator.active_start_key(), Some(10));
        assert_eq!(allocator.pool_len(), 9);
        assert_eq!(allocator.consumed_len(), 0);
    }

    #[test]
    fn underrun_stops_without_auto_regenerate() {
        let allocator = allocator(5);
        allocator.claim(5).unwrap();

        let err = advance(&allocator, Duration::from_secs(10), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::PoolUnderrun {
                needed: 5,
                available: 4
            })
        ));
        assert_eq!(allocator.active_start_key(), None);
    }

    #[test]
    fn underrun_regenerates_when_allowed() {
        let allocator = allocator(5);
        allocator.claim(5).unwrap();

        let summary = advance(&allocator, Duration::from_secs(10), true).unwrap();
        assert_eq!(summary.discarded, 1);
        assert_eq!(allocator.pool_len(), 5);
        assert_eq!(allocator.active_start_key(), Some(10));
    }

    #[tokio::test]
    async fn final_rollover_discards_consumed() {
        let allocator = allocator(10);
        allocator.claim(6).unwrap();

        let summary = final_rollover(Arc::clone(&allocator)).await.unwrap();
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.retained, 9);
    }
}
