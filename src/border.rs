//! Border resolution and the safe indexing facade.
//!
//! Every checked lookup follows the same algorithm: test each coordinate
//! of the index against `[0, size)`; if all are in range, delegate to the
//! unchecked accessor; otherwise apply the active [`Border`] policy. The
//! remap policies compute an in-bounds substitute index and delegate once;
//! `Fail` and `Fill` short-circuit.
//!
//! The facade functions taking [`Manifest`] arrays read through
//! [`unsafe_manifest_index()`]; [`evaluate_at()`] and friends are the
//! analogous entry points for computed ([`Source`]-only) arrays, built on
//! the same policy machinery but the unchecked *index* accessor.
//!
//! [`unsafe_manifest_index()`]: Manifest::unsafe_manifest_index
//! [`evaluate_at()`]: evaluate_at

use super::{ArrayIndex, IndexError, Manifest, Source};

/// How an out-of-range lookup resolves.
///
/// A policy value, not a state machine: `Fail` signals the error, `Fill`
/// substitutes a constant, and the remaining variants remap the offending
/// index to an in-bounds one before reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Border<T> {
    /// Signal the lookup failure.
    Fail,
    /// Substitute the carried value.
    Fill(T),
    /// Wrap each coordinate around its extent (torus).
    Wrap,
    /// Clamp each coordinate to the nearest edge.
    Edge,
    /// Mirror each coordinate back into range, edge included.
    Reflect,
}

/// The outcome of applying a [`Border`] policy to a lookup.
enum Resolution<I, T> {
    /// Read at this (in-bounds) index.
    Direct(I),
    /// The policy supplied the value itself.
    Constant(T),
    /// The lookup has no value.
    Missing,
}

impl<T: Clone> Border<T> {
    fn resolve<I: ArrayIndex>(&self, size: I::Size, index: I) -> Resolution<I, T> {
        if index.in_bounds(size) {
            return Resolution::Direct(index);
        }
        match self {
            Border::Fail => Resolution::Missing,
            Border::Fill(value) => Resolution::Constant(value.clone()),
            // An empty axis leaves a remap with nowhere to land.
            _ if I::length(size) == 0 => Resolution::Missing,
            Border::Wrap => Resolution::Direct(index.map_dims(size, |i, n| i % n)),
            Border::Edge => Resolution::Direct(index.map_dims(size, |i, n| i.min(n - 1))),
            Border::Reflect => Resolution::Direct(index.map_dims(size, |i, n| {
                let m = i % (2 * n);
                if m < n { m } else { 2 * n - 1 - m }
            })),
        }
    }
}

// ----------------------------------------------------------------------------

/// Looks `index` up in a [`Manifest`] array, or reports why it could not.
pub fn try_index<A: Manifest>(array: &A, index: A::Ix) -> Result<A::Elem, IndexError> {
    let size = array.size();
    if index.in_bounds(size) {
        Ok(array.unsafe_manifest_index(index.to_linear(size)))
    } else {
        Err(IndexError::new(size, index))
    }
}

/// Looks `index` up in a [`Manifest`] array under the `Fail` policy.
///
/// ```
/// use multirep::{make_array, index, Strategy, Dense};
/// let a: Dense<(usize, usize), usize> =
///     make_array(Strategy::Sequential, (3, 2), |(i, j)| i * 10 + j);
/// assert_eq!(index(&a, (1, 1)), 11);
/// ```
///
/// # Panics
///
/// Panics on an out-of-bounds index; the message names both the array's
/// size and the offending index.
pub fn index<A: Manifest>(array: &A, index: A::Ix) -> A::Elem {
    match try_index(array, index) {
        Ok(value) => value,
        Err(e) => panic!("{}", e),
    }
}

/// Looks `index` up, mapping the `Fail` policy to an absent value.
pub fn maybe_index<A: Manifest>(array: &A, index: A::Ix) -> Option<A::Elem> {
    try_index(array, index).ok()
}

/// Looks `index` up under `Fill(default)`: the true element when in
/// bounds, `default` otherwise.
pub fn default_index<A: Manifest>(array: &A, default: A::Elem, index: A::Ix) -> A::Elem {
    maybe_index(array, index).unwrap_or(default)
}

/// Looks `index` up under an explicit [`Border`] policy.
///
/// Returns `None` only under `Fail`, or when a remap policy meets an
/// array with an empty axis.
///
/// ```
/// use multirep::{border_index, Border, Dense, Strategy};
/// let a: Dense<usize, i32> = Dense::from_elements(Strategy::Sequential, 3, vec![5, 6, 7]);
/// assert_eq!(border_index(&a, &Border::Wrap, 4), Some(6));
/// assert_eq!(border_index(&a, &Border::Edge, 9), Some(7));
/// assert_eq!(border_index(&a, &Border::Fill(0), 9), Some(0));
/// assert_eq!(border_index(&a, &Border::Fail, 9), None);
/// ```
pub fn border_index<A: Manifest>(
    array: &A,
    border: &Border<A::Elem>,
    index: A::Ix,
) -> Option<A::Elem> {
    let size = array.size();
    match border.resolve(size, index) {
        Resolution::Direct(ix) => Some(array.unsafe_manifest_index(ix.to_linear(size))),
        Resolution::Constant(value) => Some(value),
        Resolution::Missing => None,
    }
}

/// Looks `index` up through an optional array: absent array, absent
/// result.
pub fn maybe_lookup<A: Manifest>(array: Option<&A>, index: A::Ix) -> Option<A::Elem> {
    array.and_then(|array| maybe_index(array, index))
}

// ----------------------------------------------------------------------------

/// [`try_index`] for computed arrays, via the unchecked index accessor.
pub fn try_evaluate_at<A: Source>(array: &A, index: A::Ix) -> Result<A::Elem, IndexError> {
    let size = array.size();
    if index.in_bounds(size) {
        Ok(array.unsafe_index(index))
    } else {
        Err(IndexError::new(size, index))
    }
}

/// [`index`] for computed arrays: runs the element computation at
/// `index`.
///
/// [`index`]: index()
///
/// # Panics
///
/// Panics on an out-of-bounds index, naming the size and the index.
pub fn evaluate_at<A: Source>(array: &A, index: A::Ix) -> A::Elem {
    match try_evaluate_at(array, index) {
        Ok(value) => value,
        Err(e) => panic!("{}", e),
    }
}

/// [`border_index`] for computed arrays.
pub fn border_evaluate<A: Source>(
    array: &A,
    border: &Border<A::Elem>,
    index: A::Ix,
) -> Option<A::Elem> {
    match border.resolve(array.size(), index) {
        Resolution::Direct(ix) => Some(array.unsafe_index(ix)),
        Resolution::Constant(value) => Some(value),
        Resolution::Missing => None,
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{make_array, Delayed, Dense, Strategy};

    fn grid() -> Dense<(usize, usize), i64> {
        make_array(Strategy::Sequential, (3, 2), |(i, j)| (i * 10 + j) as i64)
    }

    #[test]
    fn in_bounds_lookups_succeed() {
        let a = grid();
        assert_eq!(index(&a, (1, 1)), 11);
        assert_eq!(maybe_index(&a, (2, 0)), Some(20));
        assert_eq!(default_index(&a, -1, (0, 1)), 1);
    }

    #[test]
    #[should_panic(expected = "(3,0)")]
    fn failing_lookup_names_the_index() {
        index(&grid(), (3, 0));
    }

    #[test]
    fn out_of_bounds_lookups_resolve_by_policy() {
        let a = grid();
        assert_eq!(maybe_index(&a, (3, 0)), None);
        assert_eq!(maybe_index(&a, (0, 2)), None);
        assert_eq!(default_index(&a, -1, (3, 0)), -1);
        assert_eq!(try_index(&a, (3, 0)).unwrap_err().to_string(),
                   "index (3,0) is out of bounds for array of size (3,2)");
    }

    #[test]
    fn remap_policies_land_in_bounds() {
        let a = grid();
        assert_eq!(border_index(&a, &Border::Wrap, (4, 3)), Some(11));
        assert_eq!(border_index(&a, &Border::Edge, (9, 9)), Some(21));
        // Mirror of 3 over extent 3 is 2; mirror of 2 over extent 2 is 1.
        assert_eq!(border_index(&a, &Border::Reflect, (3, 2)), Some(21));
        assert_eq!(border_index(&a, &Border::Fill(7), (5, 5)), Some(7));
        assert_eq!(border_index(&a, &Border::Fail, (5, 5)), None);
    }

    #[test]
    fn remap_over_an_empty_axis_is_missing() {
        let a: Dense<(usize, usize), i64> =
            make_array(Strategy::Sequential, (0, 2), |_| unreachable!());
        assert_eq!(border_index(&a, &Border::Wrap, (1, 0)), None);
        assert_eq!(border_index(&a, &Border::Fill(5), (1, 0)), Some(5));
    }

    #[test]
    fn optional_array_lookup() {
        let a = grid();
        assert_eq!(maybe_lookup(Some(&a), (1, 0)), Some(10));
        assert_eq!(maybe_lookup(Some(&a), (9, 0)), None);
        assert_eq!(maybe_lookup(None::<&Dense<(usize, usize), i64>>, (0, 0)), None);
    }

    #[test]
    fn computed_arrays_use_evaluate() {
        let a: Delayed<(usize, usize), i64> =
            make_array(Strategy::Sequential, (3, 2), |(i, j)| (i * 10 + j) as i64);
        assert_eq!(evaluate_at(&a, (2, 1)), 21);
        assert!(try_evaluate_at(&a, (3, 0)).is_err());
        assert_eq!(border_evaluate(&a, &Border::Edge, (8, 8)), Some(21));
        assert_eq!(border_evaluate(&a, &Border::Fail, (8, 8)), None);
    }
}
