use std::sync::{Arc};

use super::{
    ArrayIndex, Construct, InnerSlice, Manifest, Mutable, OuterSlice, Size, Source, Strategy,
};
use super::load::{fill_positions, Target};

/// A memory-backed array of `T`s indexed by `I`.
///
/// Elements are stored densely in row-major order behind an [`Arc`], so
/// cloning, outer slicing and shape reinterpretation share storage rather
/// than copying. A `Dense` value views a contiguous window of its storage
/// (the window is the whole allocation except after [`unsafe_outer_slice()`]).
///
/// `Dense` implements every capability: [`Construct`], [`Size`],
/// [`Source`], [`Manifest`], [`Mutable`], [`OuterSlice`] and
/// [`InnerSlice`].
///
/// [`unsafe_outer_slice()`]: OuterSlice::unsafe_outer_slice
#[derive(Debug, Clone)]
pub struct Dense<I: ArrayIndex, T> {
    strategy: Strategy,
    size: I::Size,
    offset: usize,
    items: Arc<[T]>,
}

impl<I: ArrayIndex, T: Clone> Dense<I, T> {
    fn new_inner(strategy: Strategy, size: I::Size, items: Arc<[T]>) -> Self {
        assert_eq!(
            I::length(size),
            items.len(),
            "size {} does not describe {} elements",
            I::describe_size(size),
            items.len(),
        );
        Dense { strategy, size, offset: 0, items }
    }

    /// Constructs a `Dense` of `size` given its elements in linear order.
    ///
    /// ```
    /// use multirep::{Dense, Strategy};
    /// let a: Dense<(usize, usize), f32> =
    ///     Dense::from_elements(Strategy::Sequential, (2, 3), vec![0.0, 1.0, -1.0, 2.0, 3.0, -2.0]);
    /// assert_eq!(a.as_ref(), [0.0, 1.0, -1.0, 2.0, 3.0, -2.0]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the element count does not match `size`.
    pub fn from_elements(
        strategy: Strategy,
        size: I::Size,
        items: impl Into<Arc<[T]>>,
    ) -> Self {
        Self::new_inner(strategy, size, items.into())
    }

    /// Constructs a `Dense` of `size` from a function, filling on the
    /// calling thread.
    ///
    /// Unlike [`make_array()`], the function may be `FnMut` and need not
    /// be `Send`.
    ///
    /// [`make_array()`]: super::make_array
    ///
    /// ```
    /// use multirep::{Dense, Strategy};
    /// let a: Dense<usize, bool> = Dense::from_fn(Strategy::Sequential, 10, |x| x % 3 == 0);
    /// assert_eq!(a.as_ref(), [true, false, false, true, false, false, true, false, false, true]);
    /// ```
    pub fn from_fn(strategy: Strategy, size: I::Size, mut f: impl FnMut(I) -> T) -> Self {
        let mut items = Vec::with_capacity(I::length(size));
        I::each(size, |i| items.push(f(i)));
        Self::new_inner(strategy, size, items.into())
    }

    /// The visible elements, in linear order.
    pub fn as_slice(&self) -> &[T] {
        &self.items[self.offset..self.offset + I::length(self.size)]
    }
}

impl<I: ArrayIndex, T: Clone> AsRef<[T]> for Dense<I, T> {
    fn as_ref(&self) -> &[T] { self.as_slice() }
}

/// Structural equality: same size, same elements. The strategy is a
/// materialisation hint, not part of the value, so it is ignored.
impl<I: ArrayIndex, T: Clone + PartialEq> PartialEq for Dense<I, T> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.as_slice() == other.as_slice()
    }
}

// ----------------------------------------------------------------------------

impl<I: ArrayIndex, T: Clone + Send> Construct for Dense<I, T> {
    type Ix = I;
    type Elem = T;

    fn strategy(&self) -> &Strategy { &self.strategy }

    fn set_strategy(&mut self, strategy: Strategy) { self.strategy = strategy; }

    fn unsafe_make<F>(strategy: Strategy, size: I::Size, generator: F) -> Self
    where
        F: Fn(I) -> T + Send + Sync + 'static,
    {
        let items: Vec<T> = match &strategy {
            Strategy::Sequential => {
                let mut items = Vec::with_capacity(I::length(size));
                I::each(size, |i| items.push(generator(i)));
                items
            }
            Strategy::Parallel(workers) => {
                fill_positions(I::length(size), workers.worker_count(), |pos| {
                    generator(I::from_linear(size, pos).1)
                })
            }
        };
        Self::new_inner(strategy, size, items.into())
    }
}

impl<I: ArrayIndex, T: Clone + Send> Size for Dense<I, T> {
    #[inline(always)]
    fn size(&self) -> I::Size { self.size }

    fn unsafe_resize(&self, new_size: I::Size) -> Self {
        debug_assert_eq!(I::length(new_size), I::length(self.size));
        Dense { size: new_size, ..self.clone() }
    }

    fn unsafe_extract(&self, start: I, extent: I::Size) -> Self {
        let mut items = Vec::with_capacity(I::length(extent));
        I::each(extent, |i| items.push(self.unsafe_index(start.offset(i))));
        Dense {
            strategy: self.strategy.clone(),
            size: extent,
            offset: 0,
            items: items.into(),
        }
    }
}

impl<I: ArrayIndex, T: Clone + Send> Source for Dense<I, T> {
    #[inline(always)]
    fn unsafe_linear_index(&self, pos: usize) -> T {
        self.items[self.offset + pos].clone()
    }
}

impl<I: ArrayIndex, T: Clone + Send> Manifest for Dense<I, T> {
    #[inline(always)]
    fn unsafe_manifest_index(&self, pos: usize) -> T {
        self.items[self.offset + pos].clone()
    }
}

// ----------------------------------------------------------------------------

impl<I: ArrayIndex, T: Clone + Send> OuterSlice for Dense<I, T> {
    type Sliced = Dense<I::Lower, T>;

    /// Shares storage: the sub-array is a window at `outer * stride`.
    fn unsafe_outer_slice(&self, outer: usize) -> Dense<I::Lower, T> {
        let (_, lower) = I::remove_size_dim(self.size, 0);
        let stride = <I::Lower as ArrayIndex>::length(lower);
        Dense {
            strategy: self.strategy.clone(),
            size: lower,
            offset: self.offset + outer * stride,
            items: self.items.clone(),
        }
    }
}

impl<I: ArrayIndex, T: Clone + Send> InnerSlice for Dense<I, T> {
    type Sliced = Dense<I::Lower, T>;

    /// Gathers: fixing the innermost coordinate is strided, so the
    /// elements are copied into fresh contiguous storage.
    fn unsafe_inner_slice(&self, inner: usize) -> Dense<I::Lower, T> {
        let (_, lower) = I::remove_size_dim(self.size, I::RANK - 1);
        let mut items = Vec::with_capacity(<I::Lower as ArrayIndex>::length(lower));
        <I::Lower as ArrayIndex>::each(lower, |lx| {
            items.push(self.unsafe_index(I::insert_dim(lx, I::RANK - 1, inner)));
        });
        Dense {
            strategy: self.strategy.clone(),
            size: lower,
            offset: 0,
            items: items.into(),
        }
    }
}

// ----------------------------------------------------------------------------

/// The [`Mutable`] handle of [`Dense`]: an exclusively-owned buffer.
///
/// There is no shared owner to race with, so reads and writes need no
/// synchronisation; freezing moves the buffer into an immutable `Dense`.
#[derive(Debug, Clone)]
pub struct DenseBuffer<I: ArrayIndex, T> {
    size: I::Size,
    items: Vec<T>,
}

impl<I: ArrayIndex, T: Clone + Send> Mutable for Dense<I, T> {
    type Handle = DenseBuffer<I, T>;

    fn msize(handle: &Self::Handle) -> I::Size { handle.size }

    fn unsafe_new(size: I::Size) -> Self::Handle
    where
        T: Default,
    {
        DenseBuffer { size, items: vec![T::default(); I::length(size)] }
    }

    fn unsafe_thaw(self) -> Self::Handle {
        // The handle must be exclusively owned, so the visible window is
        // copied out of the shared allocation.
        DenseBuffer { size: self.size, items: self.as_slice().to_vec() }
    }

    fn unsafe_freeze(strategy: Strategy, handle: Self::Handle) -> Self {
        Self::new_inner(strategy, handle.size, handle.items.into())
    }

    fn unsafe_linear_read(handle: &Self::Handle, pos: usize) -> T {
        handle.items[pos].clone()
    }

    fn unsafe_linear_write(handle: &mut Self::Handle, pos: usize, value: T) {
        handle.items[pos] = value;
    }
}

impl<I: ArrayIndex, T: Clone> Target<T> for DenseBuffer<I, T> {
    fn read(&self, pos: usize) -> T { self.items[pos].clone() }
    fn write(&mut self, pos: usize, value: T) { self.items[pos] = value; }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Dense<(usize, usize), usize> {
        Dense::from_fn(Strategy::Sequential, (3, 2), |(i, j)| i * 10 + j)
    }

    #[test]
    fn linear_and_multi_agree() {
        let a = grid();
        let size = a.size();
        <(usize, usize)>::each(size, |ix| {
            assert_eq!(a.unsafe_index(ix), a.unsafe_linear_index(ix.to_linear(size)));
        });
    }

    #[test]
    fn resize_reinterprets() {
        let a = grid();
        let b = a.unsafe_resize((2, 3));
        assert_eq!(b.size(), (2, 3));
        assert_eq!(b.as_ref(), a.as_ref());
        assert_eq!(b.unsafe_index((1, 0)), a.unsafe_index((1, 1)));
    }

    #[test]
    fn extract_copies_a_window() {
        let a = grid();
        let w = a.unsafe_extract((1, 0), (2, 2));
        assert_eq!(w.size(), (2, 2));
        assert_eq!(w.as_ref(), [10, 11, 20, 21]);
    }

    #[test]
    fn outer_slice_shares_storage() {
        let a = grid();
        let row = a.unsafe_outer_slice(2);
        assert_eq!(row.size(), 2);
        assert_eq!(row.as_ref(), [20, 21]);
    }

    #[test]
    fn inner_slice_gathers() {
        let a = grid();
        let column = a.unsafe_inner_slice(1);
        assert_eq!(column.size(), 3);
        assert_eq!(column.as_ref(), [1, 11, 21]);
    }

    #[test]
    fn freeze_thaw_round_trip() {
        let a = grid();
        let handle = a.clone().unsafe_thaw();
        assert_eq!(Dense::msize(&handle), (3, 2));
        let b = Dense::unsafe_freeze(Strategy::Sequential, handle);
        assert_eq!(a, b);
    }

    #[test]
    fn handle_reads_back_writes() {
        let mut handle = <Dense<usize, i32>>::unsafe_new(4);
        for pos in 0..4 {
            Dense::unsafe_linear_write(&mut handle, pos, pos as i32 * 2);
        }
        for pos in 0..4 {
            assert_eq!(Dense::<usize, i32>::unsafe_linear_read(&handle, pos), pos as i32 * 2);
        }
        let a = Dense::unsafe_freeze(Strategy::Sequential, handle);
        assert_eq!(a.as_ref(), [0, 2, 4, 6]);
    }

    #[test]
    fn strategy_is_replaceable() {
        let mut a = grid();
        assert_eq!(*a.strategy(), Strategy::Sequential);
        a.set_strategy(Strategy::parallel());
        assert!(a.strategy().is_parallel());
    }
}
