use crate::{Error, Pool, Result};

/// Binds each unit key of one cycle to one identifier.
///
/// Keys within a cycle are dense and contiguous, so the map is a boxed slice
/// addressed by `key - start_key`: lookups are O(1) and the map holds exactly
/// one entry per unit by construction.
///
/// ```
/// use chronopool::{BucketMap, Pool};
///
/// let pool = Pool::from(vec![100_003, 100_000, 100_002, 100_004, 100_001]);
/// let map = BucketMap::build(1_000, &pool, 5).unwrap();
/// assert_eq!(map.get(1_001), Some(100_000));
/// assert_eq!(map.get(1_005), None);
/// assert_eq!(map.get(999), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketMap {
    start_key: i64,
    ids: Box<[u64]>,
}

impl BucketMap {
    /// Binds the first `len` identifiers of `pool` to keys
    /// `start_key..start_key + len`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolUnderrun`] if `pool` holds fewer than `len`
    /// identifiers.
    pub fn build(start_key: i64, pool: &Pool, len: usize) -> Result<Self> {
        let ids = pool.as_slice().get(..len).ok_or(Error::PoolUnderrun {
            needed: len,
            available: pool.len(),
        })?;

        Ok(Self {
            start_key,
            ids: ids.into(),
        })
    }

    /// Key bound to the first identifier of the cycle.
    pub fn start_key(&self) -> i64 {
        self.start_key
    }

    /// One past the last key of the cycle.
    pub fn end_key(&self) -> i64 {
        self.start_key.saturating_add(self.ids.len() as i64)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.get(key).is_some()
    }

    /// The identifier bound to `key`, or `None` outside the cycle.
    pub fn get(&self, key: i64) -> Option<u64> {
        let offset = key.checked_sub(self.start_key)?;
        let index = usize::try_from(offset).ok()?;
        self.ids.get(index).copied()
    }

    /// `(key, id)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .map(|(offset, id)| (self.start_key.wrapping_add(offset as i64), *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Pool {
        Pool::from(vec![100_003, 100_000, 100_002, 100_004, 100_001])
    }

    #[test]
    fn binds_pool_prefix_to_consecutive_keys() {
        let map = BucketMap::build(1_000, &pool(), 5).unwrap();
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(
            entries,
            [
                (1_000, 100_003),
                (1_001, 100_000),
                (1_002, 100_002),
                (1_003, 100_004),
                (1_004, 100_001),
            ]
        );
        assert_eq!(map.end_key(), 1_005);
    }

    #[test]
    fn uses_only_the_first_len_entries() {
        let map = BucketMap::build(-3, &pool(), 2).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(-3), Some(100_003));
        assert_eq!(map.get(-2), Some(100_000));
        assert_eq!(map.get(-1), None);
    }

    #[test]
    fn short_pool_underruns() {
        let err = BucketMap::build(0, &pool(), 6).unwrap_err();
        assert!(matches!(
            err,
            Error::PoolUnderrun {
                needed: 6,
                available: 5
            }
        ));
    }

    #[test]
    fn extreme_keys_do_not_overflow() {
        let map = BucketMap::build(i64::MAX - 1, &pool(), 1).unwrap();
        assert_eq!(map.get(i64::MIN), None);
        assert_eq!(map.get(i64::MAX - 1), Some(100_003));
        assert_eq!(map.get(i64::MAX), None);

        let low = BucketMap::build(i64::MIN, &pool(), 1).unwrap();
        assert_eq!(low.get(i64::MAX), None);
    }
}
