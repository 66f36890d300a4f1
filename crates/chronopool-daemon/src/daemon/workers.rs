use core::time::Duration;
use std::sync::Arc;

use chronopool::{Allocator, PoolStore, SlotStatus, TimeSource};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

/// Claims the identifier of the current unit every `every`, until `shutdown`
/// flips.
///
/// Stands in for a real consumer: each tick asks for the key of "now" and
/// marks whatever it gets as used. With several workers on one allocator
/// only the first claim of a unit wins; the others see the unit as consumed.
///
/// Returns how many identifiers this worker received.
pub async fn run_worker<S, T>(
    worker: usize,
    allocator: Arc<Allocator<S, T>>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<u64>
where
    S: PoolStore + Send + Sync + 'static,
    T: TimeSource + Send + Sync + 'static,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut claimed = 0_u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let key = allocator.clock().current_key();
                match allocator.claim(key) {
                    Some(id) => {
                        claimed += 1;
                        tracing::debug!(worker, key, id, "claimed identifier");
                    }
                    None => match allocator.lookup(key) {
                        SlotStatus::Unmapped => {
                            tracing::debug!(worker, key, "no cycle loaded for key");
                        }
                        status => tracing::trace!(worker, key, ?status, "unit already taken"),
                    },
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    tracing::info!(worker, claimed, "worker stopped");
    Ok(claimed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronopool::{MemoryStore, PoolConfig, ThreadRandom};

    struct FixedTime;
    impl TimeSource for FixedTime {
        fn now(&self) -> Duration {
            Duration::from_secs(1_002)
        }
    }

    #[tokio::test]
    async fn workers_share_one_identifier_per_unit() {
        let config = PoolConfig::default()
            .with_cycle(Duration::from_secs(5))
            .with_count(5);
        let allocator =
            Arc::new(Allocator::with_time(config, MemoryStore::default(), FixedTime).unwrap());
        allocator.initialize(&ThreadRandom).unwrap();

        let (tx, rx) = watch::channel(false);
        let workers: Vec<_> = (0..3)
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    Arc::clone(&allocator),
                    Duration::from_millis(1),
                    rx.clone(),
                ))
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        let mut total = 0;
        for worker in workers {
            total += worker.await.unwrap().unwrap();
        }

        // The clock never moves, so only key 1_002 is ever requested.
        assert_eq!(total, 1);
        assert_eq!(allocator.consumed_len(), 1);
    }
}
