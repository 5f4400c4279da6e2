//! The loading engine: materialises any [`Source`] array's elements into
//! caller-supplied storage, sequentially or in parallel.
//!
//! The engine never allocates the output itself and never inspects the
//! representation beyond its [`Source`] capability; it only orchestrates
//! range partitioning and accessor invocation. The caller owns the target
//! buffer and its visibility across workers.

use std::ops::{Range};

use log::{trace};
use rayon::prelude::*;

use super::{Construct, Dense, Size, Source, Strategy, WorkerSet};

/// Caller-supplied target storage for a load.
///
/// `read` returns the current value at a position (ragged loads
/// accumulate through it); `write` replaces it. Positions are linear and
/// unchecked.
pub trait Target<T> {
    /// The current value at `pos`.
    fn read(&self, pos: usize) -> T;

    /// Replaces the value at `pos`.
    fn write(&mut self, pos: usize, value: T);
}

impl<T: Clone> Target<T> for [T] {
    fn read(&self, pos: usize) -> T { self[pos].clone() }
    fn write(&mut self, pos: usize, value: T) { self[pos] = value; }
}

// ----------------------------------------------------------------------------

/// Splits `[0, count)` into `workers` disjoint contiguous ranges covering
/// it exactly once.
///
/// Every range holds `count / workers` positions, and the first
/// `count % workers` ranges hold one more. The remainder policy is not
/// observable through load results (content equality is the contract);
/// it is fixed here so chunk boundaries are reproducible.
///
/// ```
/// use multirep::partition;
/// assert_eq!(partition(100, 2), vec![0..50, 50..100]);
/// assert_eq!(partition(7, 3), vec![0..3, 3..5, 5..7]);
/// ```
///
/// # Panics
///
/// Panics if `workers` is zero.
pub fn partition(count: usize, workers: usize) -> Vec<Range<usize>> {
    assert!(workers > 0, "cannot partition across zero workers");
    let chunk = count / workers;
    let remainder = count % workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for worker in 0..workers {
        let len = chunk + usize::from(worker < remainder);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

// ----------------------------------------------------------------------------

/// Loads every element of `array` into `target`, in strictly increasing
/// linear order.
///
/// Each element is written before the next position is visited. The
/// ordering is a hard guarantee: order-sensitive targets (such as
/// accumulation during ragged loads) rely on it.
///
/// ```
/// use multirep::{load_sequential, make_array, Delayed, Strategy};
/// let a: Delayed<usize, usize> = make_array(Strategy::Sequential, 5, |x| x * x);
/// let mut out = vec![0; 5];
/// load_sequential(&a, &mut out[..]);
/// assert_eq!(out, [0, 1, 4, 9, 16]);
/// ```
pub fn load_sequential<A, Tgt>(array: &A, target: &mut Tgt)
where
    A: Source,
    Tgt: Target<A::Elem> + ?Sized,
{
    for pos in 0..array.len() {
        target.write(pos, array.unsafe_linear_index(pos));
    }
}

/// Loads every element of `array` into `target`, one task per worker.
///
/// `[0, count)` is split by [`partition()`] into one contiguous range per
/// worker in `workers` (empty set: all available). Each task performs a
/// sequential load over its own range, so ordering within a range matches
/// [`load_sequential()`]; there is no ordering guarantee between workers.
/// All tasks complete before this returns.
///
/// Range disjointness is what makes the concurrent writes safe: the
/// target is split with `split_at_mut`, so no locking is involved.
///
/// If any worker's element computation panics, the panic propagates after
/// the join; writes already committed by other workers are not rolled
/// back, so the target must then be discarded, not frozen.
///
/// # Panics
///
/// Panics if `target` does not hold exactly `array.len()` elements.
pub fn load_parallel<A>(array: &A, workers: &WorkerSet, target: &mut [A::Elem])
where
    A: Source + Sync,
    A::Elem: Send,
{
    let count = array.len();
    assert_eq!(
        target.len(),
        count,
        "target holds {} elements but the array has {}",
        target.len(),
        count,
    );
    let ranges = partition(count, workers.worker_count());
    trace!("parallel load: {} positions across {} ranges", count, ranges.len());
    rayon::scope(|scope| {
        let mut rest = target;
        for range in ranges {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
            rest = tail;
            scope.spawn(move |_| {
                for (offset, slot) in chunk.iter_mut().enumerate() {
                    *slot = array.unsafe_linear_index(range.start + offset);
                }
            });
        }
    });
}

// ----------------------------------------------------------------------------

/// Materialises `array` into a [`Dense`], dispatching on its strategy.
///
/// Sequential arrays are filled on the calling thread in linear order;
/// parallel ones through the same partitioning as [`load_parallel()`].
/// Either way the result's contents equal a sequential load.
///
/// ```
/// use multirep::{compute, make_array, Delayed, Strategy};
/// let a: Delayed<(usize, usize), usize> =
///     make_array(Strategy::parallel(), (3, 2), |(i, j)| i * 10 + j);
/// let d = compute(&a);
/// assert_eq!(d.as_ref(), [0, 1, 10, 11, 20, 21]);
/// ```
pub fn compute<A>(array: &A) -> Dense<A::Ix, A::Elem>
where
    A: Source + Sync,
    A::Elem: Send,
{
    let items: Vec<A::Elem> = match array.strategy() {
        Strategy::Sequential => {
            let mut items = Vec::with_capacity(array.len());
            for pos in 0..array.len() {
                items.push(array.unsafe_linear_index(pos));
            }
            items
        }
        Strategy::Parallel(workers) => {
            fill_positions(array.len(), workers.worker_count(), |pos| {
                array.unsafe_linear_index(pos)
            })
        }
    };
    Dense::from_elements(array.strategy().clone(), array.size(), items)
}

/// Computes `f` at every position in `[0, count)` across `workers` tasks,
/// returning the results in position order.
pub(crate) fn fill_positions<T, F>(count: usize, workers: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    trace!("parallel fill: {} positions across {} workers", count, workers);
    let chunks: Vec<Vec<T>> = partition(count, workers)
        .into_par_iter()
        .map(|range| range.map(&f).collect())
        .collect();
    let mut items = Vec::with_capacity(count);
    for chunk in chunks {
        items.extend(chunk);
    }
    items
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_array, Delayed};

    #[test]
    fn partition_covers_exactly_once() {
        for (count, workers) in [(100, 2), (101, 2), (7, 3), (3, 5), (0, 4)] {
            let ranges = partition(count, workers);
            assert_eq!(ranges.len(), workers);
            let mut next = 0;
            for range in &ranges {
                assert_eq!(range.start, next, "ranges must be contiguous");
                next = range.end;
            }
            assert_eq!(next, count, "ranges must cover [0, count)");
        }
    }

    #[test]
    fn partition_spreads_the_remainder() {
        let ranges = partition(101, 2);
        assert_eq!(ranges, vec![0..51, 51..101]);
        let longer: Vec<_> = ranges.iter().filter(|r| r.len() == 51).collect();
        assert_eq!(longer.len(), 1, "an odd total gives exactly one worker one extra");
    }

    #[test]
    fn sequential_load_is_in_order() {
        let a: Delayed<usize, usize> = make_array(Strategy::Sequential, 6, |x| x + 100);
        let mut out = vec![0; 6];
        load_sequential(&a, &mut out[..]);
        assert_eq!(out, [100, 101, 102, 103, 104, 105]);
    }

    #[test]
    fn parallel_load_matches_sequential() {
        let a: Delayed<(usize, usize), usize> =
            make_array(Strategy::Sequential, (10, 10), |(i, j)| i * 100 + j);
        let mut sequential = vec![0; 100];
        load_sequential(&a, &mut sequential[..]);
        for workers in [
            WorkerSet::all(),
            [0].into_iter().collect(),
            [0, 1].into_iter().collect(),
            [0, 1, 2, 5, 9].into_iter().collect::<WorkerSet>(),
        ] {
            let mut parallel = vec![0; 100];
            load_parallel(&a, &workers, &mut parallel[..]);
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn parallel_load_of_odd_counts() {
        let a: Delayed<usize, usize> = make_array(Strategy::Sequential, 101, |x| x * 3);
        let mut out = vec![0; 101];
        load_parallel(&a, &[0, 1].into_iter().collect(), &mut out[..]);
        let expected: Vec<usize> = (0..101).map(|x| x * 3).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn compute_respects_either_strategy() {
        let sequential: Delayed<(usize, usize), usize> =
            make_array(Strategy::Sequential, (4, 3), |(i, j)| i * 10 + j);
        let parallel: Delayed<(usize, usize), usize> =
            make_array(Strategy::parallel_over([0, 1, 2]), (4, 3), |(i, j)| i * 10 + j);
        assert_eq!(compute(&sequential), compute(&parallel));
        assert!(compute(&parallel).strategy().is_parallel());
    }
}
