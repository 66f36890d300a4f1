use core::time::Duration;

use crate::{Error, Result, SystemClock, TimeSource};

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Returns how many `unit`s fit in one `cycle`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] when either duration is zero or the
/// division is not exact.
pub fn units_per_cycle(cycle: Duration, unit: Duration) -> Result<usize> {
    if unit.is_zero() {
        return Err(Error::invalid_config("unit duration must be non-zero"));
    }
    if cycle.is_zero() {
        return Err(Error::invalid_config("cycle duration must be non-zero"));
    }

    let cycle_nanos = cycle.as_nanos();
    let unit_nanos = unit.as_nanos();
    if cycle_nanos % unit_nanos != 0 {
        return Err(Error::invalid_config(format!(
            "cycle duration {cycle:?} is not a multiple of unit duration {unit:?}"
        )));
    }

    usize::try_from(cycle_nanos / unit_nanos)
        .map_err(|_| Error::invalid_config("too many units per cycle"))
}

/// Converts wall-clock time into cycle boundaries and unit keys.
///
/// Cycles are aligned to the UNIX epoch: a one hour cycle always starts on the
/// hour (UTC). A unit key is `floor(instant / unit)`, so keys are globally
/// unique across cycles and only meaningful relative to a cycle's start key.
///
/// ```
/// use chronopool::{CycleClock, TimeSource};
/// use core::time::Duration;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now(&self) -> Duration {
///         Duration::from_secs(7_290) // 02:01:30
///     }
/// }
///
/// let clock = CycleClock::new(Duration::from_secs(3_600), Duration::from_secs(1), FixedTime).unwrap();
/// assert_eq!(clock.cycle_start(0).unwrap(), Duration::from_secs(7_200));
/// assert_eq!(clock.cycle_start(1).unwrap(), Duration::from_secs(10_800));
/// assert_eq!(clock.cycle_start(-1).unwrap(), Duration::from_secs(3_600));
/// assert_eq!(clock.current_key(), 7_290);
/// ```
#[derive(Clone, Debug)]
pub struct CycleClock<T = SystemClock>
where
    T: TimeSource,
{
    cycle: Duration,
    unit: Duration,
    units: usize,
    time: T,
}

impl CycleClock<SystemClock> {
    /// Creates a clock reading [`SystemClock`].
    ///
    /// # Errors
    ///
    /// See [`units_per_cycle`].
    pub fn system(cycle: Duration, unit: Duration) -> Result<Self> {
        Self::new(cycle, unit, SystemClock)
    }
}

impl<T> CycleClock<T>
where
    T: TimeSource,
{
    /// Creates a clock with the given cycle and unit, reading `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `cycle` is not a non-zero multiple
    /// of a non-zero `unit`.
    pub fn new(cycle: Duration, unit: Duration, time: T) -> Result<Self> {
        let units = units_per_cycle(cycle, unit)?;
        Ok(Self {
            cycle,
            unit,
            units,
            time,
        })
    }

    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    /// Number of unit keys (and therefore identifiers) in one cycle.
    pub fn units_per_cycle(&self) -> usize {
        self.units
    }

    /// Current time as reported by the underlying [`TimeSource`].
    pub fn now(&self) -> Duration {
        self.time.now()
    }

    /// Start of the cycle `offset` cycles away from the current one.
    ///
    /// `0` is the current cycle, `1` the next, `-1` the previous.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockOutOfRange`] if the start would fall before the
    /// UNIX epoch or beyond what a [`Duration`] can hold.
    pub fn cycle_start(&self, offset: i64) -> Result<Duration> {
        self.cycle_start_at(self.time.now(), offset)
    }

    /// Same as [`cycle_start`](Self::cycle_start), measured from `now`
    /// instead of the time source.
    ///
    /// # Errors
    ///
    /// See [`cycle_start`](Self::cycle_start).
    pub fn cycle_start_at(&self, now: Duration, offset: i64) -> Result<Duration> {
        let out_of_range = || Error::ClockOutOfRange {
            offset,
            cycle: self.cycle,
        };

        // Both fit comfortably: a `Duration` holds at most ~1.8e28 ns.
        let now = now.as_nanos() as i128;
        let cycle = self.cycle.as_nanos() as i128;

        let start = cycle
            .checked_mul(i128::from(offset))
            .and_then(|shift| (now - now % cycle).checked_add(shift))
            .filter(|start| *start >= 0)
            .ok_or_else(out_of_range)?;

        let secs = u64::try_from(start / NANOS_PER_SEC).map_err(|_| out_of_range())?;
        let nanos = (start % NANOS_PER_SEC) as u32;
        Ok(Duration::new(secs, nanos))
    }

    /// Unit key of `instant`: `floor(instant / unit)`.
    ///
    /// Saturates at [`i64::MAX`] for instants too far in the future to key.
    pub fn unit_key(&self, instant: Duration) -> i64 {
        let key = instant.as_nanos() / self.unit.as_nanos();
        i64::try_from(key).unwrap_or(i64::MAX)
    }

    /// Unit key of the current time.
    pub fn current_key(&self) -> i64 {
        self.unit_key(self.time.now())
    }
}
