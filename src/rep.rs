//! The capability contracts a representation implements to join the array
//! family.
//!
//! An array representation is any type whose values behave as a total
//! mapping from a bounded multi-dimensional index to an element. Which of
//! the traits here it implements determines what the rest of the crate can
//! do with it: computed-on-demand representations stop at [`Source`],
//! memory-backed ones continue through [`Manifest`] and [`Mutable`].
//! Generic functions are constrained by exactly the capabilities they
//! need, never more.
//!
//! The `unsafe_`-prefixed operations form the unchecked layer: their
//! arguments must already satisfy the documented contract, and no bounds
//! validation is performed. Violations are caught (as panics) only where
//! the underlying storage happens to check, never by this layer itself.
//! Checking is the responsibility of the safe facade in [`border`] and of
//! the validating wrappers here ([`slice()`], [`make_array()`]).
//!
//! [`border`]: crate::border

use super::{ArrayIndex, Delayed, Strategy};

/// Construction and strategy access, the root capability.
pub trait Construct: Sized {
    /// The index type, fixing the dimensionality.
    type Ix: ArrayIndex;

    /// The element type.
    type Elem: Clone;

    /// The computation strategy this array carries.
    fn strategy(&self) -> &Strategy;

    /// Replaces the computation strategy.
    fn set_strategy(&mut self, strategy: Strategy);

    /// Constructs an array of `size` from a generator.
    ///
    /// The generator must produce an element for every index in
    /// `[0, size)`; totality is given by the `Fn` type, and no bounds
    /// checking is performed here. Prefer [`make_array()`].
    fn unsafe_make<F>(strategy: Strategy, size: <Self::Ix as ArrayIndex>::Size, generator: F) -> Self
    where
        F: Fn(Self::Ix) -> Self::Elem + Send + Sync + 'static;
}

/// Constructs an array of `size` whose element at `ix` is `generator(ix)`.
///
/// ```
/// use multirep::{make_array, index, Strategy, Dense};
/// let a: Dense<(usize, usize), usize> =
///     make_array(Strategy::Sequential, (3, 2), |(i, j)| i * 10 + j);
/// assert_eq!(index(&a, (1, 1)), 11);
/// ```
pub fn make_array<A, F>(strategy: Strategy, size: <A::Ix as ArrayIndex>::Size, generator: F) -> A
where
    A: Construct,
    F: Fn(A::Ix) -> A::Elem + Send + Sync + 'static,
{
    A::unsafe_make(strategy, size, generator)
}

/// Constructs a single-element array holding `value`.
///
/// ```
/// use multirep::{singleton, evaluate_at, Strategy, Delayed};
/// let a: Delayed<usize, &str> = singleton(Strategy::Sequential, "lonely");
/// assert_eq!(evaluate_at(&a, 0), "lonely");
/// ```
pub fn singleton<A>(strategy: Strategy, value: A::Elem) -> A
where
    A: Construct,
    A::Elem: Send + Sync + 'static,
{
    A::unsafe_make(strategy, <A::Ix as ArrayIndex>::unit_size(), move |_| value.clone())
}

// ----------------------------------------------------------------------------

/// Shape access and unchecked shape manipulation.
pub trait Size: Construct {
    /// The per-dimension extents, O(1).
    fn size(&self) -> <Self::Ix as ArrayIndex>::Size;

    /// The number of elements.
    fn len(&self) -> usize {
        <Self::Ix as ArrayIndex>::length(self.size())
    }

    /// Returns true if the array holds no elements.
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Reinterprets the shape without copying elements.
    ///
    /// The caller guarantees `new_size` implies the same element count as
    /// the current size; the result is unspecified otherwise.
    fn unsafe_resize(&self, new_size: <Self::Ix as ArrayIndex>::Size) -> Self;

    /// Returns the sub-array window starting at `start` with extents
    /// `extent`. No bounds validation is performed; the caller guarantees
    /// the window lies within the array.
    fn unsafe_extract(&self, start: Self::Ix, extent: <Self::Ix as ArrayIndex>::Size) -> Self;
}

// ----------------------------------------------------------------------------

/// Element lookup, the unchecked reading capability.
///
/// The two accessors are inter-definable through the index algebra's
/// linear conversion, so each has a default in terms of the other;
/// implementors must override at least one (whichever is cheaper for the
/// representation).
///
/// Inputs must already be in `[0, size)`. This layer performs no checks.
pub trait Source: Size {
    /// The element at a multi-dimensional index.
    fn unsafe_index(&self, index: Self::Ix) -> Self::Elem {
        self.unsafe_linear_index(index.to_linear(self.size()))
    }

    /// The element at a linear position.
    fn unsafe_linear_index(&self, pos: usize) -> Self::Elem {
        self.unsafe_index(<Self::Ix as ArrayIndex>::from_linear(self.size(), pos).1)
    }
}

// ----------------------------------------------------------------------------

/// Asserts that backing storage exists.
///
/// Only `Manifest` arrays are admitted to the safe indexing facade
/// ([`index`], [`maybe_index`] and friends); computed representations are
/// deliberately excluded and served by [`evaluate_at`] instead, so that an
/// innocent-looking lookup never hides an arbitrarily expensive
/// computation.
///
/// [`index`]: crate::index()
/// [`maybe_index`]: crate::maybe_index
/// [`evaluate_at`]: crate::evaluate_at
pub trait Manifest: Source {
    /// Reads the stored element at a linear position. Unchecked.
    ///
    /// All other lookups are derivable from this one.
    fn unsafe_manifest_index(&self, pos: usize) -> Self::Elem;
}

// ----------------------------------------------------------------------------

/// An in-progress, exclusively-owned buffer paired with its representation.
///
/// The handle is produced by [`unsafe_new()`] (contents unspecified, write
/// every position before reading) or [`unsafe_thaw()`], and consumed by
/// [`unsafe_freeze()`]. Consumption is by move, so reuse of a frozen
/// handle is rejected at compile time rather than being a run-time
/// contract violation.
///
/// [`unsafe_new()`]: Mutable::unsafe_new
/// [`unsafe_thaw()`]: Mutable::unsafe_thaw
/// [`unsafe_freeze()`]: Mutable::unsafe_freeze
pub trait Mutable: Manifest {
    /// The mutable-handle type scoped to this representation.
    type Handle;

    /// The size the handle was created with.
    fn msize(handle: &Self::Handle) -> <Self::Ix as ArrayIndex>::Size;

    /// Allocates a handle for `size` elements.
    ///
    /// The contents are unspecified (filled with `Default` rather than
    /// left uninitialised, keeping this memory-safe); the caller must
    /// still write every position before treating a read as meaningful.
    fn unsafe_new(size: <Self::Ix as ArrayIndex>::Size) -> Self::Handle
    where
        Self::Elem: Default;

    /// Converts this array into a mutable handle over its elements.
    fn unsafe_thaw(self) -> Self::Handle;

    /// Consumes a handle, yielding an immutable array.
    fn unsafe_freeze(strategy: Strategy, handle: Self::Handle) -> Self;

    /// Reads the element at a linear position. Unchecked.
    fn unsafe_linear_read(handle: &Self::Handle, pos: usize) -> Self::Elem;

    /// Writes the element at a linear position. Unchecked.
    fn unsafe_linear_write(handle: &mut Self::Handle, pos: usize, value: Self::Elem);
}

// ----------------------------------------------------------------------------

/// Extraction of a lower-rank array by fixing the outermost coordinate.
pub trait OuterSlice: Size {
    /// The rank-lowered array type.
    type Sliced;

    /// The sub-array at outer coordinate `outer`. Unchecked.
    fn unsafe_outer_slice(&self, outer: usize) -> Self::Sliced;
}

/// Extraction of a lower-rank array by fixing the innermost coordinate.
pub trait InnerSlice: Size {
    /// The rank-lowered array type.
    type Sliced;

    /// The sub-array at inner coordinate `inner`. Unchecked.
    fn unsafe_inner_slice(&self, inner: usize) -> Self::Sliced;
}

/// Extracts a lower-rank array by cutting a one-extent window at `dim`.
///
/// `start` is the window's corner and `cut` its extents; the extent at
/// `dim` must be 1. Returns `None` if `dim` is not a valid dimension, the
/// window does not fit inside the array, or the cut keeps more than one
/// coordinate at `dim`. Unlike the raw [`OuterSlice`]/[`InnerSlice`]
/// operations, this entry point is fully validated.
///
/// ```
/// use multirep::{make_array, slice, evaluate_at, Strategy, Delayed};
/// let a: Delayed<(usize, usize), usize> =
///     make_array(Strategy::Sequential, (3, 4), |(i, j)| i * 10 + j);
/// // Column 2, i.e. fix dimension 1 at coordinate 2.
/// let column = slice(&a, (0, 2), (3, 1), 1).unwrap();
/// assert_eq!(evaluate_at(&column, 1), 12);
/// assert!(slice(&a, (0, 4), (3, 1), 1).is_none());
/// ```
pub fn slice<A>(
    array: &A,
    start: A::Ix,
    cut: <A::Ix as ArrayIndex>::Size,
    dim: usize,
) -> Option<Delayed<<A::Ix as ArrayIndex>::Lower, A::Elem>>
where
    A: Source + Clone + Send + Sync + 'static,
    A::Elem: 'static,
{
    if dim >= A::Ix::RANK {
        return None;
    }
    if !A::Ix::fits_within(start, cut, array.size()) {
        return None;
    }
    let (extent, lower_cut) = A::Ix::remove_size_dim(cut, dim);
    if extent != 1 {
        return None;
    }
    let inner = array.clone();
    let generator = move |lx: <A::Ix as ArrayIndex>::Lower| {
        inner.unsafe_index(A::Ix::insert_dim(lx, dim, 0).offset(start))
    };
    Some(Delayed::unsafe_make(array.strategy().clone(), lower_cut, generator))
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{evaluate_at, Dense};

    fn grid(size: (usize, usize)) -> Dense<(usize, usize), usize> {
        make_array(Strategy::Sequential, size, |(i, j)| i * 10 + j)
    }

    #[test]
    fn slice_fixes_a_dimension() {
        let a = grid((3, 4));
        let row = slice(&a, (1, 0), (1, 4), 0).unwrap();
        assert_eq!(row.size(), 4);
        assert_eq!(evaluate_at(&row, 3), 13);
        let column = slice(&a, (0, 1), (3, 1), 1).unwrap();
        assert_eq!(column.size(), 3);
        assert_eq!(evaluate_at(&column, 2), 21);
    }

    #[test]
    fn slice_rejects_bad_requests() {
        let a = grid((3, 4));
        assert!(slice(&a, (0, 0), (1, 4), 2).is_none(), "dimension out of range");
        assert!(slice(&a, (3, 0), (1, 4), 0).is_none(), "start out of bounds");
        assert!(slice(&a, (0, 0), (2, 4), 0).is_none(), "cut wider than one");
        assert!(slice(&a, (1, 0), (1, 5), 0).is_none(), "window overruns");
    }

    #[test]
    fn singleton_holds_one_element() {
        let a: Dense<(usize, usize), &str> = singleton(Strategy::Sequential, "only");
        assert_eq!(a.size(), (1, 1));
        assert_eq!(a.unsafe_index((0, 0)), "only");
    }
}
