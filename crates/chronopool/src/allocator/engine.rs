use core::time::Duration;
use std::collections::HashSet;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BucketMap, CycleClock, NO_ID, Pool, PoolConfig, PoolStore, RandSource, Result, SlotStatus,
    SystemClock, TimeSource,
    mutex::{Mutex, lock},
};

/// What [`Allocator::initialize`] found in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialized {
    /// The store was missing or empty; a fresh pool was generated and saved.
    Generated {
        /// Size of the new pool.
        count: usize,
    },
    /// An existing pool was loaded.
    Loaded {
        /// Size of the loaded pool.
        count: usize,
    },
}

/// Result of a successful [`Allocator::rollover`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolloverSummary {
    /// Identifiers carried into the next cycle (and persisted).
    pub retained: usize,
    /// Consumed identifiers dropped from the pool for good.
    pub discarded: usize,
}

#[derive(Debug, Default)]
struct AllocState {
    pool: Pool,
    map: Option<BucketMap>,
    consumed: HashSet<u64>,
}

/// A lock-guarded, time-bucketed identifier allocator.
///
/// Owns the pool, the [`BucketMap`] of the active cycle and the set of
/// identifiers consumed during that cycle. Every operation that reads or
/// writes them, setup included, runs under one mutex, so the allocator can be
/// shared across threads behind an [`Arc`](std::sync::Arc) at any point of
/// its life.
///
/// ## Lifecycle
///
/// 1. [`initialize`](Self::initialize) (or [`load`](Self::load)) binds the
///    current cycle's keys to the head of the pool.
/// 2. Callers use [`get_id`](Self::get_id) / [`lookup`](Self::lookup) and
///    [`mark_used`](Self::mark_used), or [`claim`](Self::claim) to do both at
///    once.
/// 3. At the cycle boundary an external scheduler calls
///    [`rollover`](Self::rollover), which persists the unconsumed identifiers
///    and unloads the map, then [`load`](Self::load) for the new cycle.
///
/// ## Example
///
/// ```
/// use chronopool::{Allocator, MemoryStore, NO_ID, PoolConfig};
/// use core::time::Duration;
///
/// let config = PoolConfig::default()
///     .with_cycle(Duration::from_secs(5))
///     .with_count(5);
/// let store = MemoryStore::with_contents("100003\n100000\n100002\n100004\n100001");
/// let allocator = Allocator::new(config, store).unwrap();
///
/// allocator.load_from_key(1_000).unwrap();
/// assert_eq!(allocator.get_id(1_001), 100_000);
///
/// allocator.mark_used(100_000);
/// assert_eq!(allocator.get_id(1_001), NO_ID);
///
/// allocator.rollover().unwrap();
/// assert_eq!(
///     allocator.store().contents().as_deref(),
///     Some("100003\n100002\n100004\n100001")
/// );
/// ```
#[derive(Debug)]
pub struct Allocator<S, T = SystemClock>
where
    S: PoolStore,
    T: TimeSource,
{
    config: PoolConfig,
    clock: CycleClock<T>,
    store: S,
    state: Mutex<AllocState>,
}

impl<S> Allocator<S, SystemClock>
where
    S: PoolStore,
{
    /// Creates an allocator reading the system clock.
    ///
    /// No cycle is loaded yet; call [`initialize`](Self::initialize) or
    /// [`load`](Self::load) before serving lookups.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if
    /// `config` fails [`PoolConfig::validate`].
    pub fn new(config: PoolConfig, store: S) -> Result<Self> {
        Self::with_time(config, store, SystemClock)
    }
}

impl<S, T> Allocator<S, T>
where
    S: PoolStore,
    T: TimeSource,
{
    /// Creates an allocator reading `time` for cycle computations.
    ///
    /// # Errors
    ///
    /// See [`Allocator::new`].
    pub fn with_time(config: PoolConfig, store: S, time: T) -> Result<Self> {
        config.validate()?;
        let clock = CycleClock::new(config.cycle(), config.unit(), time)?;
        Ok(Self {
            config,
            clock,
            store,
            state: Mutex::new(AllocState::default()),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn clock(&self) -> &CycleClock<T> {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the persisted pool, or generates and saves a fresh one when the
    /// store is missing or empty, then binds the current cycle.
    ///
    /// # Errors
    ///
    /// Store I/O and decode failures, [`Error::RangeTooSmall`] when
    /// generating, [`Error::PoolUnderrun`] if the pool cannot fill a cycle and
    /// [`Error::ClockOutOfRange`] for a clock set before the epoch.
    ///
    /// [`Error::RangeTooSmall`]: crate::Error::RangeTooSmall
    /// [`Error::PoolUnderrun`]: crate::Error::PoolUnderrun
    /// [`Error::ClockOutOfRange`]: crate::Error::ClockOutOfRange
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
    pub fn initialize<R>(&self, rng: &R) -> Result<Initialized>
    where
        R: RandSource + ?Sized,
    {
        let start_key = self.clock.unit_key(self.clock.cycle_start(0)?);
        let mut state = lock(&self.state);

        let (pool, outcome) = if self.store.is_blank()? {
            let pool = self.generate(rng)?;
            self.store.save_pool(&pool)?;
            let count = pool.len();
            (pool, Initialized::Generated { count })
        } else {
            let pool = self.store.load_pool()?;
            let count = pool.len();
            (pool, Initialized::Loaded { count })
        };

        let map = BucketMap::build(start_key, &pool, self.clock.units_per_cycle())?;
        state.pool = pool;
        state.map = Some(map);

        #[cfg(feature = "tracing")]
        tracing::info!(?outcome, start_key, "pool initialized");

        Ok(outcome)
    }

    /// Replaces the pool with a freshly generated one and saves it.
    ///
    /// Consumption tracking is reset and the active map is unloaded; call
    /// [`load`](Self::load) before serving lookups again.
    ///
    /// # Errors
    ///
    /// [`Error::RangeTooSmall`](crate::Error::RangeTooSmall) or a store write
    /// failure. On error the allocator is left unchanged.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
    pub fn regenerate<R>(&self, rng: &R) -> Result<()>
    where
        R: RandSource + ?Sized,
    {
        let mut state = lock(&self.state);

        let pool = self.generate(rng)?;
        self.store.save_pool(&pool)?;

        state.pool = pool;
        state.map = None;
        state.consumed.clear();
        Ok(())
    }

    /// Writes the full in-memory pool to the store, consumed identifiers
    /// included.
    ///
    /// # Errors
    ///
    /// Store write failures.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn save(&self) -> Result<()> {
        let state = lock(&self.state);
        self.store.save_pool(&state.pool)
    }

    /// Reads the store and binds the cycle starting at `cycle_start` (a
    /// duration since the UNIX epoch, usually from
    /// [`CycleClock::cycle_start`]).
    ///
    /// # Errors
    ///
    /// See [`load_from_key`](Self::load_from_key).
    pub fn load(&self, cycle_start: Duration) -> Result<()> {
        self.load_from_key(self.clock.unit_key(cycle_start))
    }

    /// Reads the store and binds keys `start_key..start_key + units` to the
    /// head of the pool.
    ///
    /// The whole stored pool becomes the in-memory pool. Identifiers already
    /// marked used stay marked until the next [`rollover`](Self::rollover).
    ///
    /// # Errors
    ///
    /// Store I/O (including a store that was never written),
    /// [`Error::Parse`](crate::Error::Parse) for a corrupt line, and
    /// [`Error::PoolUnderrun`](crate::Error::PoolUnderrun) when the pool is
    /// shorter than one cycle. On error the allocator is left unchanged.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn load_from_key(&self, start_key: i64) -> Result<()> {
        let mut state = lock(&self.state);

        let pool = self.store.load_pool()?;
        let map = BucketMap::build(start_key, &pool, self.clock.units_per_cycle())?;

        #[cfg(feature = "tracing")]
        tracing::info!(pool = pool.len(), units = map.len(), "cycle loaded");

        state.pool = pool;
        state.map = Some(map);
        Ok(())
    }

    /// The identifier for `key`, or [`NO_ID`] if the key is outside the
    /// loaded cycle or its identifier was already consumed.
    ///
    /// Does not consume the identifier; pair with
    /// [`mark_used`](Self::mark_used), or use [`claim`](Self::claim).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn get_id(&self, key: i64) -> u64 {
        self.lookup(key).into_raw()
    }

    /// Like [`get_id`](Self::get_id), but tells apart unmapped and consumed
    /// keys.
    pub fn lookup(&self, key: i64) -> SlotStatus {
        let state = lock(&self.state);
        Self::status_of(&state, key)
    }

    /// Marks `id` as consumed for the rest of the cycle. [`NO_ID`] is ignored
    /// and marking twice is harmless.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn mark_used(&self, id: u64) {
        if id == NO_ID {
            return;
        }
        lock(&self.state).consumed.insert(id);
    }

    /// Looks up `key` and marks its identifier used under a single lock
    /// acquisition.
    ///
    /// Unlike `get_id` followed by `mark_used`, two callers claiming the same
    /// key can never both receive its identifier.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn claim(&self, key: i64) -> Option<u64> {
        let mut state = lock(&self.state);
        let id = Self::status_of(&state, key).available()?;
        state.consumed.insert(id);
        Some(id)
    }

    /// Ends the current cycle.
    ///
    /// Persists the pool minus every consumed identifier, makes that subset
    /// the in-memory pool, clears consumption tracking and unloads the map.
    /// Lookups return [`NO_ID`] until the caller loads the next cycle.
    ///
    /// # Errors
    ///
    /// Store write failures. On error nothing is discarded and the current
    /// cycle stays loaded.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn rollover(&self) -> Result<RolloverSummary> {
        let mut state = lock(&self.state);

        let mut retained = state.pool.clone();
        let discarded = retained.discard(&state.consumed);
        self.store.save_pool(&retained)?;

        let summary = RolloverSummary {
            retained: retained.len(),
            discarded,
        };

        state.pool = retained;
        state.map = None;
        state.consumed.clear();

        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                retained = summary.retained,
                discarded = summary.discarded,
                "rolled over"
            );
            if summary.retained < self.clock.units_per_cycle() {
                tracing::warn!(
                    retained = summary.retained,
                    needed = self.clock.units_per_cycle(),
                    "pool can no longer fill a cycle, regenerate before the next load"
                );
            }
        }

        Ok(summary)
    }

    /// Number of identifiers in the in-memory pool.
    pub fn pool_len(&self) -> usize {
        lock(&self.state).pool.len()
    }

    /// Number of identifiers marked used since the last rollover.
    pub fn consumed_len(&self) -> usize {
        lock(&self.state).consumed.len()
    }

    /// Start key of the loaded cycle, or `None` when no cycle is loaded.
    pub fn active_start_key(&self) -> Option<i64> {
        lock(&self.state).map.as_ref().map(BucketMap::start_key)
    }

    fn generate<R>(&self, rng: &R) -> Result<Pool>
    where
        R: RandSource + ?Sized,
    {
        Pool::generate(
            self.config.count(),
            self.config.min_id(),
            self.config.max_id(),
            rng,
        )
    }

    fn status_of(state: &AllocState, key: i64) -> SlotStatus {
        match state.map.as_ref().and_then(|map| map.get(key)) {
            Some(id) if state.consumed.contains(&id) => SlotStatus::Consumed { id },
            Some(id) => SlotStatus::Available { id },
            None => SlotStatus::Unmapped,
        }
    }
}
