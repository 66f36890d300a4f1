//! # chronopool
//!
//! Hands out pre-generated, shuffled numeric identifiers keyed by time.
//!
//! A pool of unique identifiers is generated once (an unbiased Fisher-Yates
//! shuffle over `[min_id, min_id + count)`) and persisted to a flat text
//! store. Each cycle (one hour by default) the first `cycle / unit` entries
//! of the pool are bound to consecutive unit keys (one per second by
//! default), so every instant in the cycle maps to exactly one candidate
//! identifier. Callers look identifiers up by key and mark them consumed; at
//! the cycle boundary a rollover persists only the unconsumed identifiers and
//! the map is rebuilt for the next cycle.
//!
//! ```
//! use chronopool::{Allocator, MemoryStore, NO_ID, PoolConfig, Result, ThreadRandom};
//! use core::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let config = PoolConfig::default()
//!     .with_cycle(Duration::from_secs(60))
//!     .with_count(120)
//!     .with_id_range(1_000, 2_000);
//! let allocator = Allocator::new(config, MemoryStore::default())?;
//!
//! // Generates and saves a fresh pool, then loads the current cycle.
//! allocator.initialize(&ThreadRandom)?;
//!
//! let key = allocator.clock().current_key();
//! # let key = allocator.active_start_key().unwrap_or(key);
//! let id = allocator.get_id(key);
//! assert_ne!(id, NO_ID);
//! allocator.mark_used(id);
//! assert_eq!(allocator.get_id(key), NO_ID);
//!
//! // At the cycle boundary: drop consumed ids, then load the next cycle.
//! let summary = allocator.rollover()?;
//! assert_eq!(summary.discarded, 1);
//! allocator.load(allocator.clock().cycle_start(0)?)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `parking-lot`: guard allocator state with [`parking_lot::Mutex`] instead
//!   of [`std::sync::Mutex`].
//! - `tracing`: instrument allocator operations and emit lifecycle events.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod allocator;
mod bucket;
mod clock;
mod config;
mod error;
mod mutex;
mod pool;
mod random;
mod status;
mod store;

pub use crate::allocator::*;
pub use crate::bucket::*;
pub use crate::clock::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::pool::*;
pub use crate::random::*;
pub use crate::status::*;
pub use crate::store::*;
