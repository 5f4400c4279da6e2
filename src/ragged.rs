//! Ragged (irregularly nested) structures and their loading support.
//!
//! A [`List`] is a persistent cons list: `cons` and `uncons` share the
//! tail, so building many lists with common suffixes costs one node per
//! distinct element. Lists nest — a `List<List<i32>>` is a ragged
//! two-dimensional structure whose rows need not have equal lengths — and
//! the nesting depth maps onto the index algebra through
//! [`RaggedElement`], which is what lets [`edge_size()`] report a bounding
//! box in the same `Size` types the regular representations use.
//!
//! Loading a ragged structure is necessarily sequential (row lengths are
//! only discovered while walking), so [`load_ragged()`] writes through the
//! same [`Target`] abstraction as [`load_sequential`] and reports row
//! boundaries to the caller as it goes.
//!
//! [`edge_size()`]: Ragged::edge_size
//! [`load_ragged()`]: Ragged::load_ragged
//! [`load_sequential`]: super::load_sequential

use std::sync::{Arc};

use super::load::{Target};
use super::{ArrayIndex, Strategy};

/// A value that can appear inside a ragged structure.
///
/// Implemented by the scalar leaf types and, recursively, by [`List`]
/// itself. `Flat` names the leaf type reached by descending through every
/// nesting level, and `EdgeIx` fixes the rank of the bounding box a value
/// of this type occupies (rank 0 for a scalar, one higher per nesting
/// level).
pub trait RaggedElement: Clone + Send + Sync + 'static {
    /// The leaf element type.
    type Flat: Clone;

    /// The index type whose `Size` bounds this value.
    type EdgeIx: ArrayIndex;

    /// The bounding box of this value.
    fn edge(&self) -> <Self::EdgeIx as ArrayIndex>::Size;

    /// The number of leaf elements in this value.
    fn flat_len(&self) -> usize;

    /// Appends the leaf elements, in order, to `out`.
    fn flatten_into(&self, out: &mut Vec<Self::Flat>);

    /// Renders this value onto `out`, using `formatter` for leaves and
    /// `separator` between siblings at every nesting level.
    fn format_into(
        &self,
        formatter: &mut dyn FnMut(&Self::Flat) -> String,
        separator: &str,
        out: &mut String,
    );
}

macro_rules! scalar_ragged_element {
    ($($t:ty),* $(,)?) => {$(
        impl RaggedElement for $t {
            type Flat = $t;
            type EdgeIx = ();

            fn edge(&self) -> () {}
            fn flat_len(&self) -> usize { 1 }
            fn flatten_into(&self, out: &mut Vec<$t>) { out.push(self.clone()); }

            fn format_into(
                &self,
                formatter: &mut dyn FnMut(&$t) -> String,
                _separator: &str,
                out: &mut String,
            ) {
                out.push_str(&formatter(self));
            }
        }
    )*};
}

scalar_ragged_element!(
    u8, u16, u32, u64, usize,
    i8, i16, i32, i64, isize,
    f32, f64, bool, char, String,
);

// ----------------------------------------------------------------------------

/// The capability contract of a ragged structure.
///
/// Unlike the regular representations, a ragged structure has no total
/// size known up front; its shape is discovered by walking it. The
/// operations here are therefore sequential by nature, and the carried
/// [`Strategy`] only governs how a *flattened* result is materialised
/// afterwards.
pub trait Ragged: Clone + Sized {
    /// The per-row element type.
    type Elem: Clone;

    /// The index type whose `Size` bounds the whole structure.
    type EdgeIx: ArrayIndex;

    /// The leaf element type.
    type Flat: Clone;

    /// The structure with no rows.
    fn empty(strategy: Strategy) -> Self;

    /// Returns true if there are no rows.
    fn is_null(&self) -> bool;

    /// Prepends a row, sharing the tail.
    fn cons(elem: Self::Elem, tail: &Self) -> Self;

    /// Splits off the first row, or `None` if there is none.
    fn uncons(&self) -> Option<(Self::Elem, Self)>;

    /// The number of rows.
    fn outer_length(&self) -> usize;

    /// The smallest regular size containing every leaf: the row count
    /// paired with the componentwise maximum of the rows' own edges.
    fn edge_size(&self) -> <Self::EdgeIx as ArrayIndex>::Size;

    /// Builds a structure of `len` rows, calling `f` once per row index
    /// in ascending order.
    fn generate_with<F>(strategy: Strategy, len: usize, f: F) -> Self
    where
        F: FnMut(usize) -> Self::Elem;

    /// The leaf elements in depth-first order.
    fn flatten(&self) -> Vec<Self::Flat>;

    /// Writes every leaf element into `target` at consecutive positions
    /// starting from 0, in depth-first order.
    ///
    /// `mark_boundary(row, pos)` is called once per row, at the position
    /// its first leaf will occupy, before any of that row's leaves are
    /// written; an empty row is still marked. This is how callers recover
    /// the row structure that flattening erases.
    fn load_ragged<Tgt>(&self, target: &mut Tgt, mark_boundary: impl FnMut(usize, usize))
    where
        Tgt: Target<Self::Flat> + ?Sized;

    /// Renders the structure with nested brackets, using `formatter` for
    /// leaves and `separator` between siblings at every level.
    fn ragged_format(
        &self,
        formatter: impl FnMut(&Self::Flat) -> String,
        separator: &str,
    ) -> String;
}

// ----------------------------------------------------------------------------

#[derive(Debug)]
struct Node<T> {
    elem: T,
    next: Option<Arc<Node<T>>>,
}

/// A persistent singly-linked list of `T`s.
///
/// `cons` and `uncons` are O(1) and share structure through [`Arc`], so a
/// tail can belong to many lists at once. The row count is cached, making
/// [`outer_length()`] O(1) as well.
///
/// ```
/// use multirep::{List, Ragged, Strategy};
/// let empty = List::empty(Strategy::Sequential);
/// let xs = List::cons(1, &List::cons(2, &List::cons(3, &empty)));
/// assert_eq!(xs.outer_length(), 3);
/// assert_eq!(xs.flatten(), vec![1, 2, 3]);
/// ```
///
/// [`outer_length()`]: Ragged::outer_length
#[derive(Debug)]
pub struct List<T> {
    strategy: Strategy,
    len: usize,
    head: Option<Arc<Node<T>>>,
}

impl<T> Clone for List<T> {
    fn clone(&self) -> Self {
        List {
            strategy: self.strategy.clone(),
            len: self.len,
            head: self.head.clone(),
        }
    }
}

impl<T> List<T> {
    /// The materialisation strategy a flattened result will carry.
    pub fn strategy(&self) -> &Strategy { &self.strategy }

    /// Replaces the materialisation strategy.
    pub fn set_strategy(&mut self, strategy: Strategy) { self.strategy = strategy; }

    /// Iterates over the rows front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { node: self.head.as_deref() }
    }
}

/// Borrowing iterator over a [`List`]'s rows.
pub struct Iter<'a, T> {
    node: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.node?;
        self.node = node.next.as_deref();
        Some(&node.elem)
    }
}

/// Structural equality over the rows; the strategy is ignored.
impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: RaggedElement> FromIterator<T> for List<T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        let elems: Vec<T> = iter.into_iter().collect();
        let mut list = Self::empty(Strategy::default());
        for elem in elems.into_iter().rev() {
            list = Self::cons(elem, &list);
        }
        list
    }
}

// ----------------------------------------------------------------------------

impl<T: RaggedElement> RaggedElement for List<T> {
    type Flat = T::Flat;
    type EdgeIx = <T::EdgeIx as ArrayIndex>::Higher;

    fn edge(&self) -> <<T::EdgeIx as ArrayIndex>::Higher as ArrayIndex>::Size {
        let mut inner = <T::EdgeIx as ArrayIndex>::zero_size();
        for elem in self.iter() {
            inner = <T::EdgeIx as ArrayIndex>::size_union(inner, elem.edge());
        }
        <T::EdgeIx as ArrayIndex>::raise_size(self.len, inner)
    }

    fn flat_len(&self) -> usize {
        self.iter().map(|elem| elem.flat_len()).sum()
    }

    fn flatten_into(&self, out: &mut Vec<T::Flat>) {
        for elem in self.iter() {
            elem.flatten_into(out);
        }
    }

    fn format_into(
        &self,
        formatter: &mut dyn FnMut(&T::Flat) -> String,
        separator: &str,
        out: &mut String,
    ) {
        out.push('[');
        for (i, elem) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            elem.format_into(formatter, separator, out);
        }
        out.push(']');
    }
}

impl<T: RaggedElement> Ragged for List<T> {
    type Elem = T;
    type EdgeIx = <T::EdgeIx as ArrayIndex>::Higher;
    type Flat = T::Flat;

    fn empty(strategy: Strategy) -> Self {
        List { strategy, len: 0, head: None }
    }

    fn is_null(&self) -> bool { self.len == 0 }

    fn cons(elem: T, tail: &Self) -> Self {
        List {
            strategy: tail.strategy.clone(),
            len: tail.len + 1,
            head: Some(Arc::new(Node { elem, next: tail.head.clone() })),
        }
    }

    fn uncons(&self) -> Option<(T, Self)> {
        self.head.as_ref().map(|node| {
            let tail = List {
                strategy: self.strategy.clone(),
                len: self.len - 1,
                head: node.next.clone(),
            };
            (node.elem.clone(), tail)
        })
    }

    fn outer_length(&self) -> usize { self.len }

    fn edge_size(&self) -> <<T::EdgeIx as ArrayIndex>::Higher as ArrayIndex>::Size {
        self.edge()
    }

    fn generate_with<F>(strategy: Strategy, len: usize, mut f: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        // Rows are generated in ascending order, then consed from the back.
        let elems: Vec<T> = (0..len).map(&mut f).collect();
        let mut list = Self::empty(strategy);
        for elem in elems.into_iter().rev() {
            list = Self::cons(elem, &list);
        }
        list
    }

    fn flatten(&self) -> Vec<T::Flat> {
        let mut out = Vec::with_capacity(self.flat_len());
        self.flatten_into(&mut out);
        out
    }

    fn load_ragged<Tgt>(&self, target: &mut Tgt, mut mark_boundary: impl FnMut(usize, usize))
    where
        Tgt: Target<T::Flat> + ?Sized,
    {
        let mut pos = 0;
        let mut row_buffer = Vec::new();
        for (row, elem) in self.iter().enumerate() {
            mark_boundary(row, pos);
            row_buffer.clear();
            elem.flatten_into(&mut row_buffer);
            for value in row_buffer.drain(..) {
                target.write(pos, value);
                pos += 1;
            }
        }
    }

    fn ragged_format(
        &self,
        mut formatter: impl FnMut(&T::Flat) -> String,
        separator: &str,
    ) -> String {
        let mut out = String::new();
        self.format_into(&mut formatter, separator, &mut out);
        out
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn irregular() -> List<List<i32>> {
        [vec![1, 2, 3], vec![], vec![4, 5]]
            .into_iter()
            .map(|row| row.into_iter().collect::<List<i32>>())
            .collect()
    }

    #[test]
    fn empty_has_no_rows() {
        let empty: List<i32> = List::empty(Strategy::Sequential);
        assert!(empty.is_null());
        assert_eq!(empty.outer_length(), 0);
        assert!(empty.uncons().is_none());
        assert_eq!(empty.edge_size(), 0);
        assert_eq!(empty.flatten(), Vec::<i32>::new());
    }

    #[test]
    fn cons_then_uncons() {
        let empty: List<i32> = List::empty(Strategy::Sequential);
        let xs = List::cons(1, &List::cons(2, &empty));
        assert_eq!(xs.outer_length(), 2);
        let (head, tail) = xs.uncons().unwrap();
        assert_eq!(head, 1);
        assert_eq!(tail.outer_length(), 1);
        assert_eq!(tail.uncons().unwrap().0, 2);
    }

    #[test]
    fn tails_are_shared() {
        let tail: List<i32> = [10, 20].into_iter().collect();
        let a = List::cons(1, &tail);
        let b = List::cons(2, &tail);
        assert_eq!(a.flatten(), vec![1, 10, 20]);
        assert_eq!(b.flatten(), vec![2, 10, 20]);
        assert_eq!(a.uncons().unwrap().1, b.uncons().unwrap().1);
    }

    #[test]
    fn edge_bounds_every_row() {
        let xs = irregular();
        assert_eq!(xs.outer_length(), 3);
        assert_eq!(xs.edge_size(), (3, 3));
        let scalar_rows: List<i32> = [7, 8].into_iter().collect();
        assert_eq!(scalar_rows.edge_size(), 2);
    }

    #[test]
    fn flatten_is_depth_first() {
        let xs = irregular();
        assert_eq!(xs.flat_len(), 5);
        assert_eq!(xs.flatten(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn generate_with_calls_in_ascending_order() {
        let mut calls = Vec::new();
        let xs: List<i32> = List::generate_with(Strategy::Sequential, 4, |i| {
            calls.push(i);
            i as i32 * 10
        });
        assert_eq!(calls, vec![0, 1, 2, 3]);
        assert_eq!(xs.flatten(), vec![0, 10, 20, 30]);
    }

    #[test]
    fn loading_marks_every_row_boundary() {
        let xs = irregular();
        let mut out = vec![0; xs.flat_len()];
        let mut boundaries = Vec::new();
        xs.load_ragged(&mut out[..], |row, pos| boundaries.push((row, pos)));
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
        // The empty row is marked too, at the position it would start.
        assert_eq!(boundaries, vec![(0, 0), (1, 3), (2, 3)]);
    }

    #[test]
    fn formatting_nests_brackets() {
        let show = |x: &i32| x.to_string();
        assert_eq!(irregular().ragged_format(show, ", "), "[[1, 2, 3], [], [4, 5]]");
        let flat: List<i32> = [1, 2].into_iter().collect();
        assert_eq!(flat.ragged_format(show, "; "), "[1; 2]");
        let empty: List<i32> = List::empty(Strategy::Sequential);
        assert_eq!(empty.ragged_format(show, ", "), "[]");
        assert_eq!(
            irregular().ragged_format(|x| format!("{:02}", x), ","),
            "[[01,02,03],[],[04,05]]",
        );
    }

    #[test]
    fn equality_ignores_strategy() {
        let mut a: List<i32> = [1, 2, 3].into_iter().collect();
        let b: List<i32> = [1, 2, 3].into_iter().collect();
        a.set_strategy(Strategy::parallel());
        assert_eq!(a, b);
        let c: List<i32> = [1, 2].into_iter().collect();
        assert_ne!(a, c);
    }
}
