use crate::TimeSource;
use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// A [`TimeSource`] backed by [`SystemTime::now`].
///
/// Wall-clock adjustments (NTP steps, manual changes) are visible to callers.
/// A restarted process maps the same instant to the same bucket.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Duration {
        // A clock set before 1970 collapses to the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}
