/// Sentinel returned by [`Allocator::get_id`](crate::Allocator::get_id) when
/// no identifier is available for a key.
///
/// Valid identifiers are always greater than zero; configurations with
/// `min_id == 0` are rejected.
pub const NO_ID: u64 = 0;

/// Outcome of looking up a unit key in the active cycle.
///
/// This is the explicit form of the [`NO_ID`] sentinel contract: it tells
/// apart a key outside the loaded cycle from one whose identifier was already
/// handed out.
///
/// # Example
///
/// ```
/// use chronopool::SlotStatus;
///
/// let status = SlotStatus::Available { id: 100_042 };
/// match status {
///     SlotStatus::Available { id } => println!("use {id}"),
///     SlotStatus::Consumed { id } => println!("{id} already taken, try another key"),
///     SlotStatus::Unmapped => println!("key not in the loaded cycle"),
/// }
/// assert_eq!(status.available(), Some(100_042));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    /// The key maps to an identifier nobody has consumed yet.
    Available {
        /// The identifier bound to the key.
        id: u64,
    },
    /// The key maps to an identifier that was marked used this cycle.
    Consumed {
        /// The identifier bound to the key.
        id: u64,
    },
    /// No cycle is loaded, or the key falls outside the loaded cycle.
    Unmapped,
}

impl SlotStatus {
    /// The identifier if it can still be handed out.
    pub fn available(self) -> Option<u64> {
        match self {
            Self::Available { id } => Some(id),
            Self::Consumed { .. } | Self::Unmapped => None,
        }
    }

    /// Collapses the status into the [`NO_ID`] sentinel form.
    pub fn into_raw(self) -> u64 {
        self.available().unwrap_or(NO_ID)
    }
}
