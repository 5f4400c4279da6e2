//! Representation-polymorphic multi-dimensional arrays.
//!
//! An array here is a total mapping from a bounded multi-dimensional index
//! to an element, and a *representation* is any type providing that
//! mapping. [`Dense<I, T>`] stores its elements in row-major memory;
//! [`Delayed<I, T>`] computes them on demand from a function. What a
//! representation can do is expressed through a family of capability
//! traits — [`Construct`], [`Size`], [`Source`], [`Manifest`] and
//! [`Mutable`] — and generic code is constrained by exactly the
//! capabilities it needs, so an algorithm written once works over every
//! representation that qualifies.
//!
//! Every array carries a [`Strategy`] saying how its elements should be
//! materialised: [`Sequential`] on the calling thread, or [`Parallel`]
//! across a set of workers. The loading engine ([`load_sequential`],
//! [`load_parallel`], [`compute`]) honours it by partitioning the linear
//! index space into disjoint contiguous ranges, one per worker.
//!
//! The `unsafe_`-prefixed trait operations form an unchecked layer: they
//! trust their arguments and perform no bounds validation (they are not
//! `unsafe fn`s; storage-level panics are the worst outcome). Everyday
//! code goes through the checked facade instead — [`index()`],
//! [`try_index`], [`maybe_index`] and the [`Border`] policies — which
//! validates every coordinate and resolves failures by policy.
//!
//! Irregularly nested data is served by [`List`], a persistent ragged
//! structure that flattens into the same loading machinery.
//!
//! [`Sequential`]: Strategy::Sequential
//! [`Parallel`]: Strategy::Parallel

mod index;
pub use index::{ArrayIndex};

mod strategy;
pub use strategy::{Strategy, WorkerSet};

mod error;
pub use error::{IndexError};

mod rep;
pub use rep::{
    Construct, InnerSlice, Manifest, Mutable, OuterSlice, Size, Source,
    make_array, singleton, slice,
};

mod dense;
pub use dense::{Dense, DenseBuffer};

mod delayed;
pub use delayed::{Delayed};

mod border;
pub use border::{
    Border, border_evaluate, border_index, default_index, evaluate_at, index,
    maybe_index, maybe_lookup, try_evaluate_at, try_index,
};

mod load;
pub use load::{Target, compute, load_parallel, load_sequential, partition};

mod ragged;
pub use ragged::{List, Ragged, RaggedElement};

/// Returns `(n / d, n % d)`, mapping a zero divisor to `(0, n)`.
///
/// The zero case is what makes linear decomposition total for sizes with
/// an empty axis.
pub(crate) fn div_mod(n: usize, d: usize) -> (usize, usize) {
    if d == 0 { (0, n) } else { (n / d, n % d) }
}
