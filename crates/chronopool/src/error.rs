//! Error types for pool generation, persistence and allocation.
//!
//! Lookups never fail: an unknown or consumed key is reported through
//! [`NO_ID`](crate::NO_ID) or [`SlotStatus`](crate::SlotStatus). Everything
//! that touches the store, the configuration or the clock returns
//! [`Result`].

use core::time::Duration;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `chronopool` can emit.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Reading or writing the backing store failed.
    #[error("pool store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored line is not a positive decimal identifier.
    ///
    /// `line` is 1-based.
    #[error("malformed identifier on line {line}: {content:?}")]
    Parse { line: usize, content: String },

    /// The pool holds fewer identifiers than one cycle needs.
    #[error("pool underrun: a cycle needs {needed} identifiers but the pool holds {available}")]
    PoolUnderrun { needed: usize, available: usize },

    /// The configuration breaks an invariant (durations, sentinel, ...).
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// More identifiers were requested than the range can hold.
    #[error("cannot draw {count} unique identifiers from a range of {span}")]
    RangeTooSmall { count: usize, span: u64 },

    /// The requested cycle start cannot be represented.
    #[error("cycle start at offset {offset} (cycle {cycle:?}) is out of range")]
    ClockOutOfRange { offset: i64, cycle: Duration },
}

impl Error {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
