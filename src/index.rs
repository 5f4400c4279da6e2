use std::fmt::{Debug};

use super::{div_mod};

/// The index algebra consumed by every array representation.
///
/// An `ArrayIndex` is a multi-dimensional coordinate; its associated
/// [`Size`] type holds the per-dimension extents bounding valid values.
/// The trait is implemented for `()`, `usize`, `(usize, usize)` and
/// `(usize, usize, usize)` (ranks 0 to 3). This is a closed set: the rest
/// of the crate treats the algebra as an opaque capability and never
/// inspects coordinates directly.
///
/// Linear order is row-major: [`to_linear()`] and [`from_linear()`] form a
/// bijection between valid indices and `0..length(size)`, and [`each()`]
/// visits indices in exactly that order.
///
/// Dimension numbering starts at `0` for the outermost (slowest-varying)
/// axis.
///
/// [`Size`]: ArrayIndex::Size
/// [`to_linear()`]: ArrayIndex::to_linear
/// [`from_linear()`]: ArrayIndex::from_linear
/// [`each()`]: ArrayIndex::each
pub trait ArrayIndex: 'static + Copy + PartialEq + Debug + Send + Sync {
    /// The run-time representation of the per-dimension extents.
    type Size: 'static + Copy + PartialEq + Debug + Send + Sync;

    /// The index type with the outermost dimension removed.
    ///
    /// For rank 0 this is `Self`.
    type Lower: ArrayIndex;

    /// The index type with one extra outer dimension.
    ///
    /// Rank 3 saturates: its `Higher` is itself, and [`raise_size()`]
    /// panics. Ranks above 3 are not supported.
    ///
    /// [`raise_size()`]: ArrayIndex::raise_size
    type Higher: ArrayIndex;

    /// The number of dimensions.
    const RANK: usize;

    /// The all-zeros index.
    fn zero() -> Self;

    /// The size with every extent zero.
    fn zero_size() -> Self::Size;

    /// The size with every extent one, describing a single-element array.
    fn unit_size() -> Self::Size;

    /// Returns the number of valid indices bounded by `size`.
    fn length(size: Self::Size) -> usize;

    /// Returns the linear position (in `0..length(size)`) of `self`.
    ///
    /// `self` must be in bounds; this is checked only in debug builds.
    fn to_linear(self, size: Self::Size) -> usize;

    /// Returns `pos / length(size)` and the index whose `to_linear()` is
    /// `pos % length(size)`.
    fn from_linear(size: Self::Size, pos: usize) -> (usize, Self);

    /// Equivalent to, but often more efficient than,
    /// ```text
    /// for pos in 0..Self::length(size) { f(Self::from_linear(size, pos).1); }
    /// ```
    fn each(size: Self::Size, mut f: impl FnMut(Self)) {
        for pos in 0..Self::length(size) { f(Self::from_linear(size, pos).1); }
    }

    /// Tests every coordinate of `self` against `[0, size)`.
    fn in_bounds(self, size: Self::Size) -> bool;

    /// Componentwise addition.
    fn offset(self, by: Self) -> Self;

    /// Applies `f` to each coordinate paired with its extent, outermost
    /// first. Border policies use this to compute in-bounds substitutes.
    fn map_dims(self, size: Self::Size, f: impl FnMut(usize, usize) -> usize) -> Self;

    /// The componentwise maximum of two sizes.
    fn size_union(a: Self::Size, b: Self::Size) -> Self::Size;

    /// Returns true if the window starting at `start` with per-dimension
    /// extents `extent` lies entirely within `size`.
    fn fits_within(start: Self, extent: Self::Size, size: Self::Size) -> bool;

    /// Splits off the coordinate at dimension `dim`, returning it and the
    /// remaining lower-rank index.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= Self::RANK`.
    fn remove_dim(self, dim: usize) -> (usize, Self::Lower);

    /// Inverse of [`remove_dim()`]: rebuilds a full-rank index by placing
    /// `coord` at dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= Self::RANK`.
    ///
    /// [`remove_dim()`]: ArrayIndex::remove_dim
    fn insert_dim(lower: Self::Lower, dim: usize, coord: usize) -> Self;

    /// [`remove_dim()`] for sizes.
    ///
    /// [`remove_dim()`]: ArrayIndex::remove_dim
    fn remove_size_dim(size: Self::Size, dim: usize) -> (usize, <Self::Lower as ArrayIndex>::Size);

    /// [`insert_dim()`] for sizes.
    ///
    /// [`insert_dim()`]: ArrayIndex::insert_dim
    fn insert_size_dim(lower: <Self::Lower as ArrayIndex>::Size, dim: usize, extent: usize) -> Self::Size;

    /// Builds a size one rank higher by prepending an outer extent.
    fn raise_size(outer: usize, size: Self::Size) -> <Self::Higher as ArrayIndex>::Size;

    /// Renders `self` compactly, e.g. `(3,0)`.
    fn describe(self) -> String;

    /// Renders a size compactly, e.g. `(3,2)`.
    fn describe_size(size: Self::Size) -> String;
}

// ----------------------------------------------------------------------------

impl ArrayIndex for () {
    type Size = ();
    type Lower = ();
    type Higher = usize;
    const RANK: usize = 0;

    fn zero() -> Self {}
    fn zero_size() -> Self::Size {}
    fn unit_size() -> Self::Size {}

    fn length(_: Self::Size) -> usize { 1 }
    fn to_linear(self, _: Self::Size) -> usize { 0 }
    fn from_linear(_: Self::Size, pos: usize) -> (usize, Self) { (pos, ()) }
    fn each(_: Self::Size, mut f: impl FnMut(Self)) { f(()); }

    fn in_bounds(self, _: Self::Size) -> bool { true }
    fn offset(self, _: Self) -> Self {}
    fn map_dims(self, _: Self::Size, _: impl FnMut(usize, usize) -> usize) -> Self {}
    fn size_union(_: Self::Size, _: Self::Size) -> Self::Size {}
    fn fits_within(_: Self, _: Self::Size, _: Self::Size) -> bool { true }

    fn remove_dim(self, dim: usize) -> (usize, Self::Lower) {
        panic!("cannot remove dimension {} from a rank-0 index", dim);
    }

    fn insert_dim(_: Self::Lower, dim: usize, _: usize) -> Self {
        panic!("cannot insert dimension {} into a rank-0 index", dim);
    }

    fn remove_size_dim(_: Self::Size, dim: usize) -> (usize, ()) {
        panic!("cannot remove dimension {} from a rank-0 size", dim);
    }

    fn insert_size_dim(_: (), dim: usize, _: usize) -> Self::Size {
        panic!("cannot insert dimension {} into a rank-0 size", dim);
    }

    fn raise_size(outer: usize, _: Self::Size) -> usize { outer }

    fn describe(self) -> String { "()".to_string() }
    fn describe_size(_: Self::Size) -> String { "()".to_string() }
}

// ----------------------------------------------------------------------------

impl ArrayIndex for usize {
    type Size = usize;
    type Lower = ();
    type Higher = (usize, usize);
    const RANK: usize = 1;

    fn zero() -> Self { 0 }
    fn zero_size() -> Self::Size { 0 }
    fn unit_size() -> Self::Size { 1 }

    fn length(size: Self::Size) -> usize { size }

    fn to_linear(self, size: Self::Size) -> usize {
        debug_assert!(self < size, "index {} is out of bounds for size {}", self, size);
        self
    }

    fn from_linear(size: Self::Size, pos: usize) -> (usize, Self) {
        div_mod(pos, size)
    }

    fn each(size: Self::Size, mut f: impl FnMut(Self)) {
        for i in 0..size { f(i); }
    }

    fn in_bounds(self, size: Self::Size) -> bool { self < size }
    fn offset(self, by: Self) -> Self { self + by }

    fn map_dims(self, size: Self::Size, mut f: impl FnMut(usize, usize) -> usize) -> Self {
        f(self, size)
    }

    fn size_union(a: Self::Size, b: Self::Size) -> Self::Size { a.max(b) }

    fn fits_within(start: Self, extent: Self::Size, size: Self::Size) -> bool {
        start + extent <= size
    }

    fn remove_dim(self, dim: usize) -> (usize, ()) {
        assert!(dim == 0, "dimension {} is out of range for rank 1", dim);
        (self, ())
    }

    fn insert_dim(_: (), dim: usize, coord: usize) -> Self {
        assert!(dim == 0, "dimension {} is out of range for rank 1", dim);
        coord
    }

    fn remove_size_dim(size: Self::Size, dim: usize) -> (usize, ()) {
        assert!(dim == 0, "dimension {} is out of range for rank 1", dim);
        (size, ())
    }

    fn insert_size_dim(_: (), dim: usize, extent: usize) -> Self::Size {
        assert!(dim == 0, "dimension {} is out of range for rank 1", dim);
        extent
    }

    fn raise_size(outer: usize, size: Self::Size) -> (usize, usize) { (outer, size) }

    fn describe(self) -> String { format!("{}", self) }
    fn describe_size(size: Self::Size) -> String { format!("{}", size) }
}

// ----------------------------------------------------------------------------

impl ArrayIndex for (usize, usize) {
    type Size = (usize, usize);
    type Lower = usize;
    type Higher = (usize, usize, usize);
    const RANK: usize = 2;

    fn zero() -> Self { (0, 0) }
    fn zero_size() -> Self::Size { (0, 0) }
    fn unit_size() -> Self::Size { (1, 1) }

    fn length(size: Self::Size) -> usize { size.0 * size.1 }

    fn to_linear(self, size: Self::Size) -> usize {
        debug_assert!(
            self.in_bounds(size),
            "index {} is out of bounds for size {}", self.describe(), Self::describe_size(size),
        );
        self.0 * size.1 + self.1
    }

    fn from_linear(size: Self::Size, pos: usize) -> (usize, Self) {
        let (pos, j) = div_mod(pos, size.1);
        let (pos, i) = div_mod(pos, size.0);
        (pos, (i, j))
    }

    fn each(size: Self::Size, mut f: impl FnMut(Self)) {
        for i in 0..size.0 {
            for j in 0..size.1 { f((i, j)); }
        }
    }

    fn in_bounds(self, size: Self::Size) -> bool {
        self.0 < size.0 && self.1 < size.1
    }

    fn offset(self, by: Self) -> Self { (self.0 + by.0, self.1 + by.1) }

    fn map_dims(self, size: Self::Size, mut f: impl FnMut(usize, usize) -> usize) -> Self {
        (f(self.0, size.0), f(self.1, size.1))
    }

    fn size_union(a: Self::Size, b: Self::Size) -> Self::Size {
        (a.0.max(b.0), a.1.max(b.1))
    }

    fn fits_within(start: Self, extent: Self::Size, size: Self::Size) -> bool {
        start.0 + extent.0 <= size.0 && start.1 + extent.1 <= size.1
    }

    fn remove_dim(self, dim: usize) -> (usize, usize) {
        match dim {
            0 => (self.0, self.1),
            1 => (self.1, self.0),
            _ => panic!("dimension {} is out of range for rank 2", dim),
        }
    }

    fn insert_dim(lower: usize, dim: usize, coord: usize) -> Self {
        match dim {
            0 => (coord, lower),
            1 => (lower, coord),
            _ => panic!("dimension {} is out of range for rank 2", dim),
        }
    }

    fn remove_size_dim(size: Self::Size, dim: usize) -> (usize, usize) {
        Self::remove_dim(size, dim)
    }

    fn insert_size_dim(lower: usize, dim: usize, extent: usize) -> Self::Size {
        Self::insert_dim(lower, dim, extent)
    }

    fn raise_size(outer: usize, size: Self::Size) -> (usize, usize, usize) {
        (outer, size.0, size.1)
    }

    fn describe(self) -> String { format!("({},{})", self.0, self.1) }
    fn describe_size(size: Self::Size) -> String { format!("({},{})", size.0, size.1) }
}

// ----------------------------------------------------------------------------

impl ArrayIndex for (usize, usize, usize) {
    type Size = (usize, usize, usize);
    type Lower = (usize, usize);
    type Higher = (usize, usize, usize);
    const RANK: usize = 3;

    fn zero() -> Self { (0, 0, 0) }
    fn zero_size() -> Self::Size { (0, 0, 0) }
    fn unit_size() -> Self::Size { (1, 1, 1) }

    fn length(size: Self::Size) -> usize { size.0 * size.1 * size.2 }

    fn to_linear(self, size: Self::Size) -> usize {
        debug_assert!(
            self.in_bounds(size),
            "index {} is out of bounds for size {}", self.describe(), Self::describe_size(size),
        );
        (self.0 * size.1 + self.1) * size.2 + self.2
    }

    fn from_linear(size: Self::Size, pos: usize) -> (usize, Self) {
        let (pos, k) = div_mod(pos, size.2);
        let (pos, j) = div_mod(pos, size.1);
        let (pos, i) = div_mod(pos, size.0);
        (pos, (i, j, k))
    }

    fn each(size: Self::Size, mut f: impl FnMut(Self)) {
        for i in 0..size.0 {
            for j in 0..size.1 {
                for k in 0..size.2 { f((i, j, k)); }
            }
        }
    }

    fn in_bounds(self, size: Self::Size) -> bool {
        self.0 < size.0 && self.1 < size.1 && self.2 < size.2
    }

    fn offset(self, by: Self) -> Self {
        (self.0 + by.0, self.1 + by.1, self.2 + by.2)
    }

    fn map_dims(self, size: Self::Size, mut f: impl FnMut(usize, usize) -> usize) -> Self {
        (f(self.0, size.0), f(self.1, size.1), f(self.2, size.2))
    }

    fn size_union(a: Self::Size, b: Self::Size) -> Self::Size {
        (a.0.max(b.0), a.1.max(b.1), a.2.max(b.2))
    }

    fn fits_within(start: Self, extent: Self::Size, size: Self::Size) -> bool {
        start.0 + extent.0 <= size.0
            && start.1 + extent.1 <= size.1
            && start.2 + extent.2 <= size.2
    }

    fn remove_dim(self, dim: usize) -> (usize, (usize, usize)) {
        match dim {
            0 => (self.0, (self.1, self.2)),
            1 => (self.1, (self.0, self.2)),
            2 => (self.2, (self.0, self.1)),
            _ => panic!("dimension {} is out of range for rank 3", dim),
        }
    }

    fn insert_dim(lower: (usize, usize), dim: usize, coord: usize) -> Self {
        match dim {
            0 => (coord, lower.0, lower.1),
            1 => (lower.0, coord, lower.1),
            2 => (lower.0, lower.1, coord),
            _ => panic!("dimension {} is out of range for rank 3", dim),
        }
    }

    fn remove_size_dim(size: Self::Size, dim: usize) -> (usize, (usize, usize)) {
        Self::remove_dim(size, dim)
    }

    fn insert_size_dim(lower: (usize, usize), dim: usize, extent: usize) -> Self::Size {
        Self::insert_dim(lower, dim, extent)
    }

    fn raise_size(_: usize, _: Self::Size) -> Self::Size {
        panic!("arrays of rank above 3 are not supported");
    }

    fn describe(self) -> String { format!("({},{},{})", self.0, self.1, self.2) }
    fn describe_size(size: Self::Size) -> String {
        format!("({},{},{})", size.0, size.1, size.2)
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_bijective<I: ArrayIndex>(size: I::Size) {
        let mut seen = Vec::new();
        I::each(size, |ix| {
            let pos = ix.to_linear(size);
            let (carry, back) = I::from_linear(size, pos);
            assert_eq!(carry, 0);
            assert_eq!(back, ix);
            seen.push(pos);
        });
        let expected: Vec<usize> = (0..I::length(size)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn linear_bijection() {
        assert_bijective::<()>(());
        assert_bijective::<usize>(5);
        assert_bijective::<(usize, usize)>((3, 2));
        assert_bijective::<(usize, usize, usize)>((2, 3, 4));
    }

    #[test]
    fn bounds() {
        let size: (usize, usize) = (3, 2);
        assert!((2usize, 1usize).in_bounds(size));
        assert!(!(3usize, 0usize).in_bounds(size));
        assert!(!(0usize, 2usize).in_bounds(size));
        assert!(<(usize, usize)>::fits_within((1, 0), (2, 2), size));
        assert!(!<(usize, usize)>::fits_within((2, 0), (2, 2), size));
    }

    #[test]
    fn dimension_removal() {
        let ix: (usize, usize, usize) = (7, 8, 9);
        assert_eq!(ix.remove_dim(0), (7, (8, 9)));
        assert_eq!(ix.remove_dim(1), (8, (7, 9)));
        assert_eq!(ix.remove_dim(2), (9, (7, 8)));
        for dim in 0..3 {
            let (coord, lower) = ix.remove_dim(dim);
            assert_eq!(<(usize, usize, usize)>::insert_dim(lower, dim, coord), ix);
        }
    }

    #[test]
    fn unions_and_raises() {
        assert_eq!(<(usize, usize)>::size_union((1, 5), (4, 2)), (4, 5));
        assert_eq!(usize::raise_size(3, 7), (3, 7));
        assert_eq!(<()>::raise_size(4, ()), 4);
    }

    #[test]
    fn rendering() {
        assert_eq!((3usize, 0usize).describe(), "(3,0)");
        assert_eq!(<(usize, usize)>::describe_size((3, 2)), "(3,2)");
        assert_eq!(5usize.describe(), "5");
    }
}
