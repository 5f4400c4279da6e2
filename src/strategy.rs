use std::collections::{BTreeSet};

/// A set of worker identifiers used by [`Strategy::Parallel`].
///
/// The empty set means "all available workers": the loading engine then
/// sizes its partition by `rayon::current_num_threads()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkerSet {
    ids: BTreeSet<usize>,
}

impl WorkerSet {
    /// The empty set, meaning all available workers.
    pub fn all() -> Self { Self::default() }

    /// Returns true if no explicit workers are named.
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// The number of explicitly named workers.
    pub fn len(&self) -> usize { self.ids.len() }

    /// Returns true if `id` is in the set.
    pub fn contains(&self, id: usize) -> bool { self.ids.contains(&id) }

    /// Iterates over the worker identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.ids.iter().copied()
    }

    /// The number of partitions a load over this set should use.
    ///
    /// An empty set resolves to the ambient thread pool's width, never
    /// less than one.
    pub fn worker_count(&self) -> usize {
        if self.ids.is_empty() {
            rayon::current_num_threads().max(1)
        } else {
            self.ids.len()
        }
    }
}

impl FromIterator<usize> for WorkerSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        WorkerSet { ids: iter.into_iter().collect() }
    }
}

// ----------------------------------------------------------------------------

/// How an array's elements are materialised: on the calling thread, or
/// split across a set of workers.
///
/// Every array carries a `Strategy`, queryable and replaceable through
/// [`Construct`], but the core only ever dispatches on it; it is otherwise
/// opaque.
///
/// [`Construct`]: super::Construct
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Materialise on the invoking thread, in linear order.
    #[default]
    Sequential,
    /// Materialise with one task per worker in the set.
    Parallel(WorkerSet),
}

impl Strategy {
    /// Parallel over all available workers.
    pub fn parallel() -> Self { Strategy::Parallel(WorkerSet::all()) }

    /// Parallel over an explicit set of worker identifiers.
    pub fn parallel_over(ids: impl IntoIterator<Item = usize>) -> Self {
        Strategy::Parallel(ids.into_iter().collect())
    }

    /// Returns true for [`Strategy::Parallel`].
    pub fn is_parallel(&self) -> bool {
        matches!(self, Strategy::Parallel(_))
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_means_all() {
        let set = WorkerSet::all();
        assert!(set.is_empty());
        assert!(set.worker_count() >= 1);
    }

    #[test]
    fn explicit_set_sizes_partition() {
        let set: WorkerSet = [0, 1].into_iter().collect();
        assert_eq!(set.worker_count(), 2);
        assert!(set.contains(1));
        assert!(!set.contains(2));
        assert_eq!(set.ids().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn strategies() {
        assert!(!Strategy::Sequential.is_parallel());
        assert!(Strategy::parallel().is_parallel());
        assert_eq!(Strategy::parallel_over([3, 1]), Strategy::parallel_over([1, 3]));
    }
}
