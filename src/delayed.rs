use std::fmt::{self, Debug};
use std::sync::{Arc};

use super::{ArrayIndex, Construct, InnerSlice, OuterSlice, Size, Source, Strategy};

/// A computed-on-demand array of `T`s indexed by `I`.
///
/// A `Delayed` stores no elements; every lookup runs its generator. Shape
/// manipulation ([`unsafe_resize()`], [`unsafe_extract()`], slicing)
/// composes a new generator through the index algebra instead of touching
/// memory, so those operations are O(1) regardless of element count.
///
/// `Delayed` implements [`Construct`], [`Size`], [`Source`],
/// [`OuterSlice`] and [`InnerSlice`] — deliberately not `Manifest`, which
/// keeps it out of the safe indexing facade; use [`evaluate_at`] and
/// friends, or materialise it with [`compute`].
///
/// [`unsafe_resize()`]: Size::unsafe_resize
/// [`unsafe_extract()`]: Size::unsafe_extract
/// [`evaluate_at`]: super::evaluate_at
/// [`compute`]: super::compute
pub struct Delayed<I: ArrayIndex, T> {
    strategy: Strategy,
    size: I::Size,
    generator: Arc<dyn Fn(I) -> T + Send + Sync>,
}

impl<I: ArrayIndex, T> Clone for Delayed<I, T> {
    fn clone(&self) -> Self {
        Delayed {
            strategy: self.strategy.clone(),
            size: self.size,
            generator: self.generator.clone(),
        }
    }
}

impl<I: ArrayIndex, T> Debug for Delayed<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delayed")
            .field("strategy", &self.strategy)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------

impl<I: ArrayIndex, T: Clone + 'static> Construct for Delayed<I, T> {
    type Ix = I;
    type Elem = T;

    fn strategy(&self) -> &Strategy { &self.strategy }

    fn set_strategy(&mut self, strategy: Strategy) { self.strategy = strategy; }

    fn unsafe_make<F>(strategy: Strategy, size: I::Size, generator: F) -> Self
    where
        F: Fn(I) -> T + Send + Sync + 'static,
    {
        Delayed { strategy, size, generator: Arc::new(generator) }
    }
}

impl<I: ArrayIndex, T: Clone + 'static> Size for Delayed<I, T> {
    #[inline(always)]
    fn size(&self) -> I::Size { self.size }

    fn unsafe_resize(&self, new_size: I::Size) -> Self {
        debug_assert_eq!(I::length(new_size), I::length(self.size));
        let generator = self.generator.clone();
        let old_size = self.size;
        Delayed {
            strategy: self.strategy.clone(),
            size: new_size,
            generator: Arc::new(move |ix: I| {
                generator(I::from_linear(old_size, ix.to_linear(new_size)).1)
            }),
        }
    }

    fn unsafe_extract(&self, start: I, extent: I::Size) -> Self {
        let generator = self.generator.clone();
        Delayed {
            strategy: self.strategy.clone(),
            size: extent,
            generator: Arc::new(move |ix: I| generator(start.offset(ix))),
        }
    }
}

impl<I: ArrayIndex, T: Clone + 'static> Source for Delayed<I, T> {
    #[inline(always)]
    fn unsafe_index(&self, index: I) -> T {
        (self.generator)(index)
    }
}

// ----------------------------------------------------------------------------

impl<I: ArrayIndex, T: Clone + 'static> OuterSlice for Delayed<I, T> {
    type Sliced = Delayed<I::Lower, T>;

    fn unsafe_outer_slice(&self, outer: usize) -> Delayed<I::Lower, T> {
        let generator = self.generator.clone();
        let (_, lower) = I::remove_size_dim(self.size, 0);
        Delayed {
            strategy: self.strategy.clone(),
            size: lower,
            generator: Arc::new(move |lx| generator(I::insert_dim(lx, 0, outer))),
        }
    }
}

impl<I: ArrayIndex, T: Clone + 'static> InnerSlice for Delayed<I, T> {
    type Sliced = Delayed<I::Lower, T>;

    fn unsafe_inner_slice(&self, inner: usize) -> Delayed<I::Lower, T> {
        let generator = self.generator.clone();
        let (_, lower) = I::remove_size_dim(self.size, I::RANK - 1);
        Delayed {
            strategy: self.strategy.clone(),
            size: lower,
            generator: Arc::new(move |lx| generator(I::insert_dim(lx, I::RANK - 1, inner))),
        }
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_array};

    fn counting() -> Delayed<(usize, usize), usize> {
        make_array(Strategy::Sequential, (3, 4), |(i, j)| i * 10 + j)
    }

    #[test]
    fn lookups_run_the_generator() {
        let a = counting();
        assert_eq!(a.unsafe_index((2, 3)), 23);
        assert_eq!(a.unsafe_linear_index(7), 13);
    }

    #[test]
    fn resize_follows_linear_order() {
        let a = counting();
        let b = a.unsafe_resize((4, 3));
        assert_eq!(b.size(), (4, 3));
        // Position 7 is (1, 3) in the old shape and (2, 1) in the new one.
        assert_eq!(b.unsafe_index((2, 1)), 13);
    }

    #[test]
    fn extract_offsets_the_generator() {
        let a = counting();
        let w = a.unsafe_extract((1, 1), (2, 2));
        assert_eq!(w.size(), (2, 2));
        assert_eq!(w.unsafe_index((0, 0)), 11);
        assert_eq!(w.unsafe_index((1, 1)), 22);
    }

    #[test]
    fn slices_fix_coordinates() {
        let a = counting();
        let row = a.unsafe_outer_slice(1);
        assert_eq!(row.size(), 4);
        assert_eq!(row.unsafe_index(2), 12);
        let column = a.unsafe_inner_slice(3);
        assert_eq!(column.size(), 3);
        assert_eq!(column.unsafe_index(0), 3);
    }
}
