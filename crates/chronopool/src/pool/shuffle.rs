use crate::RandSource;

/// Shuffles `ids` in place with the Fisher-Yates algorithm.
///
/// Walks from the last index down to 1 and swaps each element with one drawn
/// uniformly from `0..=i`, which yields every permutation with equal
/// probability given a uniform `rng`. Runs in `O(n)`.
pub fn fisher_yates<R>(ids: &mut [u64], rng: &R)
where
    R: RandSource + ?Sized,
{
    for i in (1..ids.len()).rev() {
        let j = rng.index_up_to(i);
        debug_assert!(j <= i, "RandSource returned {j} for bound {i}");
        ids.swap(i, j.min(i));
    }
}
