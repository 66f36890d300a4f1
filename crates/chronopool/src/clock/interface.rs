use core::time::Duration;

/// A trait for time sources that report wall-clock time.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// The returned value is the time elapsed since the UNIX epoch
/// (1970-01-01 00:00:00 UTC).
///
/// # Example
///
/// ```
/// use chronopool::TimeSource;
/// use core::time::Duration;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now(&self) -> Duration {
///         Duration::from_secs(1_700_000_000)
///     }
/// }
///
/// assert_eq!(FixedTime.now().as_secs(), 1_700_000_000);
/// ```
pub trait TimeSource {
    /// Returns the current time as a duration since the UNIX epoch.
    fn now(&self) -> Duration;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
