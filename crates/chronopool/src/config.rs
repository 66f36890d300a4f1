use core::time::Duration;

use crate::{Error, NO_ID, Result, units_per_cycle};

/// Default span of one allocation cycle.
pub const DEFAULT_CYCLE: Duration = Duration::from_secs(60 * 60);

/// Default granularity of one time bucket.
pub const DEFAULT_UNIT: Duration = Duration::from_secs(1);

/// Default number of identifiers in a freshly generated pool: the whole
/// default range.
pub const DEFAULT_POOL_SIZE: usize = 900_000;

/// Default inclusive lower identifier bound.
pub const DEFAULT_MIN_ID: u64 = 100_000;

/// Default exclusive upper identifier bound.
pub const DEFAULT_MAX_ID: u64 = 1_000_000;

/// Shape of a pool and of the cycles it is carved into.
///
/// Built with [`Default`] and the `with_*` methods; checked by
/// [`PoolConfig::validate`] when handed to an
/// [`Allocator`](crate::Allocator).
///
/// ```
/// use chronopool::PoolConfig;
/// use core::time::Duration;
///
/// let config = PoolConfig::default()
///     .with_cycle(Duration::from_secs(600))
///     .with_unit(Duration::from_millis(500));
/// assert_eq!(config.validate().unwrap(), 1_200);
///
/// let broken = PoolConfig::default().with_unit(Duration::from_secs(7));
/// assert!(broken.validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    cycle: Duration,
    unit: Duration,
    count: usize,
    min_id: u64,
    max_id: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            cycle: DEFAULT_CYCLE,
            unit: DEFAULT_UNIT,
            count: DEFAULT_POOL_SIZE,
            min_id: DEFAULT_MIN_ID,
            max_id: DEFAULT_MAX_ID,
        }
    }
}

impl PoolConfig {
    /// Sets the span of one allocation cycle.
    #[must_use]
    pub fn with_cycle(mut self, cycle: Duration) -> Self {
        self.cycle = cycle;
        self
    }

    /// Sets the granularity of one time bucket.
    #[must_use]
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Sets how many identifiers a generated pool holds.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Sets the identifier range `[min_id, max_id)`. Reversed bounds are
    /// swapped.
    #[must_use]
    pub fn with_id_range(mut self, min_id: u64, max_id: u64) -> Self {
        if min_id > max_id {
            self.min_id = max_id;
            self.max_id = min_id;
        } else {
            self.min_id = min_id;
            self.max_id = max_id;
        }
        self
    }

    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min_id(&self) -> u64 {
        self.min_id
    }

    pub fn max_id(&self) -> u64 {
        self.max_id
    }

    /// Checks the configuration invariants and returns the number of units
    /// per cycle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when either duration is zero, the
    /// cycle is not an exact multiple of the unit, or `min_id` is the
    /// [`NO_ID`] sentinel.
    pub fn validate(&self) -> Result<usize> {
        let units = units_per_cycle(self.cycle, self.unit)?;

        if self.min_id == NO_ID {
            return Err(Error::invalid_config(
                "min_id must be greater than the reserved sentinel 0",
            ));
        }

        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_give_an_hour_of_seconds() {
        assert_eq!(PoolConfig::default().validate().unwrap(), 3_600);
    }

    #[test]
    fn rejects_uneven_cycle() {
        let config = PoolConfig::default()
            .with_cycle(Duration::from_secs(10))
            .with_unit(Duration::from_secs(3));
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_zero_durations() {
        let zero_unit = PoolConfig::default().with_unit(Duration::ZERO);
        assert!(zero_unit.validate().is_err());

        let zero_cycle = PoolConfig::default().with_cycle(Duration::ZERO);
        assert!(zero_cycle.validate().is_err());
    }

    #[test]
    fn rejects_sentinel_lower_bound() {
        let config = PoolConfig::default().with_id_range(0, 10);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn swaps_reversed_range() {
        let config = PoolConfig::default().with_id_range(500, 100);
        assert_eq!(config.min_id(), 100);
        assert_eq!(config.max_id(), 500);
    }
}
