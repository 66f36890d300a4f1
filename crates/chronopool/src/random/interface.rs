/// A source of uniformly distributed indices for shuffling.
///
/// This abstraction allows you to plug in the thread-local RNG or a scripted
/// source in tests.
///
/// # Example
/// ```
/// use chronopool::RandSource;
///
/// struct AlwaysFirst;
/// impl RandSource for AlwaysFirst {
///     fn index_up_to(&self, _upper: usize) -> usize {
///         0
///     }
/// }
///
/// assert_eq!(AlwaysFirst.index_up_to(9), 0);
/// ```
pub trait RandSource {
    /// Returns an index drawn uniformly from `0..=upper`.
    ///
    /// Implementations must never return a value greater than `upper`.
    fn index_up_to(&self, upper: usize) -> usize;
}

impl<R: RandSource + ?Sized> RandSource for &R {
    fn index_up_to(&self, upper: usize) -> usize {
        (**self).index_up_to(upper)
    }
}
