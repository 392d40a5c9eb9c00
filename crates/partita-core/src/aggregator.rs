#![forbid(unsafe_code)]

//! Reduction policies for rollup aggregation.
//!
//! An [`Aggregator`] is an identity value plus a combining function. The
//! rollup applies it fact by fact, so the reducer must not depend on the
//! order facts arrive in: sum, count, min and max all qualify.

/// Identity + reducer pair.
pub trait Aggregator {
    /// Starting value for a fresh node.
    fn identity(&self) -> f64;

    /// Fold an incoming fact value into the accumulated aggregate.
    fn reduce(&self, accumulated: f64, incoming: f64) -> f64;

    /// Fold a whole sequence starting from the identity.
    fn fold<I>(&self, values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
        Self: Sized,
    {
        values
            .into_iter()
            .fold(self.identity(), |acc, v| self.reduce(acc, v))
    }
}

/// Adds values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sum;

impl Aggregator for Sum {
    fn identity(&self) -> f64 {
        0.0
    }

    fn reduce(&self, accumulated: f64, incoming: f64) -> f64 {
        accumulated + incoming
    }
}

/// Counts facts, ignoring their values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count;

impl Aggregator for Count {
    fn identity(&self) -> f64 {
        0.0
    }

    fn reduce(&self, accumulated: f64, _incoming: f64) -> f64 {
        accumulated + 1.0
    }
}

/// Smallest value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Min;

impl Aggregator for Min {
    fn identity(&self) -> f64 {
        f64::INFINITY
    }

    fn reduce(&self, accumulated: f64, incoming: f64) -> f64 {
        accumulated.min(incoming)
    }
}

/// Largest value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Max;

impl Aggregator for Max {
    fn identity(&self) -> f64 {
        f64::NEG_INFINITY
    }

    fn reduce(&self, accumulated: f64, incoming: f64) -> f64 {
        accumulated.max(incoming)
    }
}

/// Aggregator assembled from two closures.
#[derive(Clone, Copy)]
pub struct FnAggregator<I, R> {
    identity: I,
    reducer: R,
}

impl<I, R> std::fmt::Debug for FnAggregator<I, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAggregator").finish_non_exhaustive()
    }
}

impl<I, R> Aggregator for FnAggregator<I, R>
where
    I: Fn() -> f64,
    R: Fn(f64, f64) -> f64,
{
    fn identity(&self) -> f64 {
        (self.identity)()
    }

    fn reduce(&self, accumulated: f64, incoming: f64) -> f64 {
        (self.reducer)(accumulated, incoming)
    }
}

/// Build an aggregator from an identity function and a reducer.
///
/// ```
/// use partita_core::aggregator::{custom, Aggregator};
///
/// let product = custom(|| 1.0, |a, b| a * b);
/// assert_eq!(product.fold([2.0, 3.0, 4.0]), 24.0);
/// ```
pub fn custom<I, R>(identity: I, reducer: R) -> FnAggregator<I, R>
where
    I: Fn() -> f64,
    R: Fn(f64, f64) -> f64,
{
    FnAggregator { identity, reducer }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_folds_values() {
        assert_eq!(Sum.fold([1.0, 2.0, 3.5]), 6.5);
        assert_eq!(Sum.fold(std::iter::empty()), 0.0);
    }

    #[test]
    fn count_ignores_values() {
        assert_eq!(Count.fold([10.0, -4.0, 0.5]), 3.0);
    }

    #[test]
    fn min_and_max_start_from_infinities() {
        assert_eq!(Min.identity(), f64::INFINITY);
        assert_eq!(Max.identity(), f64::NEG_INFINITY);
        assert_eq!(Min.fold([3.0, 1.0, 2.0]), 1.0);
        assert_eq!(Max.fold([3.0, 1.0, 2.0]), 3.0);
    }

    #[test]
    fn reducers_are_order_independent() {
        let forward = [4.0, 8.0, 1.0, 6.0];
        let mut backward = forward;
        backward.reverse();
        assert_eq!(Sum.fold(forward), Sum.fold(backward));
        assert_eq!(Min.fold(forward), Min.fold(backward));
        assert_eq!(Max.fold(forward), Max.fold(backward));
        assert_eq!(Count.fold(forward), Count.fold(backward));
    }

    #[test]
    fn custom_aggregator_uses_closures() {
        let agg = custom(|| 0.0, |acc: f64, v: f64| acc.max(v.abs()));
        assert_eq!(agg.fold([-7.0, 3.0]), 7.0);
    }
}
