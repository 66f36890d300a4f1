use std::collections::HashSet;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, RandSource, Result, fisher_yates};

/// An ordered sequence of distinct identifiers.
///
/// Order matters: the i-th identifier is bound to the i-th unit key of a
/// cycle when the pool is loaded into a [`BucketMap`](crate::BucketMap).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pool {
    ids: Vec<u64>,
}

impl Pool {
    /// Generates `count` distinct identifiers from `[min_id, max_id)` in a
    /// uniformly random order.
    ///
    /// The values `min_id..min_id + count` are shuffled with
    /// [`fisher_yates`]. Reversed bounds are swapped before use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RangeTooSmall`] if the range holds fewer than `count`
    /// values.
    ///
    /// # Example
    ///
    /// ```
    /// use chronopool::{Pool, ThreadRandom};
    ///
    /// let pool = Pool::generate(10, 500, 600, &ThreadRandom).unwrap();
    /// assert_eq!(pool.len(), 10);
    /// assert!(pool.iter().all(|id| (500..510).contains(&id)));
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(rng)))]
    pub fn generate<R>(count: usize, min_id: u64, max_id: u64, rng: &R) -> Result<Self>
    where
        R: RandSource + ?Sized,
    {
        let (min_id, max_id) = if min_id > max_id {
            (max_id, min_id)
        } else {
            (min_id, max_id)
        };

        let span = max_id - min_id;
        let wanted = u64::try_from(count).unwrap_or(u64::MAX);
        if wanted > span {
            return Err(Error::RangeTooSmall { count, span });
        }

        let mut ids: Vec<u64> = (min_id..min_id + wanted).collect();
        fisher_yates(&mut ids, rng);

        #[cfg(feature = "tracing")]
        tracing::debug!(count, min_id, max_id, "generated shuffled pool");

        Ok(Self { ids })
    }

    /// Wraps identifiers in their given order.
    pub fn from_ids(ids: Vec<u64>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.ids
    }

    /// Drops every identifier in `consumed`, keeping the order of the rest.
    ///
    /// Returns how many identifiers were dropped.
    pub fn discard(&mut self, consumed: &HashSet<u64>) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| !consumed.contains(id));
        before - self.ids.len()
    }
}

impl From<Vec<u64>> for Pool {
    fn from(ids: Vec<u64>) -> Self {
        Self::from_ids(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ThreadRandom;
    use core::cell::Cell;

    /// Replays a fixed list of swap targets.
    struct ScriptedRand {
        picks: Vec<usize>,
        next: Cell<usize>,
    }

    impl ScriptedRand {
        fn new(picks: &[usize]) -> Self {
            Self {
                picks: picks.to_vec(),
                next: Cell::new(0),
            }
        }
    }

    impl RandSource for ScriptedRand {
        fn index_up_to(&self, upper: usize) -> usize {
            let pick = self.picks[self.next.get()];
            self.next.set(self.next.get() + 1);
            assert!(pick <= upper);
            pick
        }
    }

    #[test]
    fn generated_ids_are_distinct_and_in_range() {
        let pool = Pool::generate(5_000, 100_000, 1_000_000, &ThreadRandom).unwrap();
        assert_eq!(pool.len(), 5_000);

        let unique: HashSet<u64> = pool.iter().collect();
        assert_eq!(unique.len(), 5_000);
        assert!(pool.iter().all(|id| (100_000..1_000_000).contains(&id)));
    }

    #[test]
    fn full_range_is_a_permutation() {
        let pool = Pool::generate(64, 1, 65, &ThreadRandom).unwrap();
        let mut sorted = pool.into_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..65).collect::<Vec<_>>());
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let pool = Pool::generate(10, 200, 100, &ThreadRandom).unwrap();
        assert!(pool.iter().all(|id| (100..110).contains(&id)));
    }

    #[test]
    fn zero_count_is_empty() {
        let pool = Pool::generate(0, 10, 10, &ThreadRandom).unwrap();
        assert!(pool.is_empty());
    }

    #[test]
    fn oversized_request_is_rejected() {
        let err = Pool::generate(11, 100, 110, &ThreadRandom).unwrap_err();
        assert!(matches!(err, Error::RangeTooSmall { count: 11, span: 10 }));
    }

    #[test]
    fn follows_the_scripted_shuffle() {
        let rng = ScriptedRand::new(&[1, 1, 2, 0]);
        let pool = Pool::generate(5, 100_000, 1_000_000, &rng).unwrap();
        assert_eq!(
            pool.as_slice(),
            [100_003, 100_000, 100_002, 100_004, 100_001]
        );
    }

    #[test]
    fn discard_keeps_order_of_survivors() {
        let mut pool = Pool::from(vec![5, 3, 9, 1, 7]);
        let consumed: HashSet<u64> = [3, 7, 42].into_iter().collect();
        assert_eq!(pool.discard(&consumed), 2);
        assert_eq!(pool.as_slice(), [5, 9, 1]);
    }
}
