use crate::RandSource;
use rand::{Rng, rng};

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// The underlying generator is ChaCha-based and reseeded periodically, but
/// pool shuffling only relies on it being uniform: identifiers handed out by
/// this crate are not meant to be unpredictable.
///
/// This type does **not** store the RNG; it accesses the thread-local
/// generator on each call, so it is a zero-sized value that may be freely
/// shared across threads.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn index_up_to(&self, upper: usize) -> usize {
        rng().random_range(0..=upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_inclusive_bound() {
        for upper in [0, 1, 7, 1_000] {
            for _ in 0..256 {
                assert!(ThreadRandom.index_up_to(upper) <= upper);
            }
        }
    }
}
