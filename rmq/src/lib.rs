mod int_vector;
mod segment_tree;
mod sparse_table;

use std::ops::{Bound, RangeBounds};

pub use int_vector::IntVector;
pub use segment_tree::SegmentTree;
pub use sparse_table::SparseTable;

/// A fixed-length sequence of non-negative integers that RMQ structures are built over.
///
/// There is deliberately no way to grow or shrink the array through this trait:
/// structures built on top of it rely on the length never changing.
pub trait BackingArray {
    fn len(&self) -> usize;
    fn get(&self, i: usize) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A backing array whose values can be overwritten in place.
pub trait BackingArrayMut: BackingArray {
    fn set(&mut self, i: usize, v: u64);

    /// Prepare the storage so that a later `set` of `v` stores it in place.
    fn reserve(&mut self, _v: u64) {}
}

impl BackingArray for [u64] {
    fn len(&self) -> usize {
        <[u64]>::len(self)
    }
    fn get(&self, i: usize) -> u64 {
        self[i]
    }
}

impl BackingArrayMut for [u64] {
    fn set(&mut self, i: usize, v: u64) {
        self[i] = v;
    }
}

/// Index of the smaller of `a[i]` and `a[j]`; the smaller index on equal values.
#[inline]
pub fn min_index<A: BackingArray + ?Sized>(a: &A, i: usize, j: usize) -> usize {
    std::cmp::min_by_key(i, j, |&k| (a.get(k), k))
}

/// The comparison primitive every structure is expressed in.
///
/// `None` means "no candidate" and yields the other side unchanged.
#[inline]
pub fn combine<A: BackingArray + ?Sized>(
    a: &A,
    i: Option<usize>,
    j: Option<usize>,
) -> Option<usize> {
    match (i, j) {
        (Some(i), Some(j)) => Some(min_index(a, i, j)),
        (None, x) | (x, None) => x,
    }
}

/// Clamp `range` to the positions of an array of length `n`.
/// Returns the inclusive bounds `(l, r)`, or `None` when nothing is left.
pub fn clamp(range: impl RangeBounds<usize>, n: usize) -> Option<(usize, usize)> {
    let l = match range.start_bound() {
        Bound::Included(&l) => l,
        Bound::Excluded(&l) => l.checked_add(1)?,
        Bound::Unbounded => 0,
    };
    let r = match range.end_bound() {
        Bound::Included(&r) => r,
        Bound::Excluded(&r) => r.checked_sub(1)?,
        Bound::Unbounded => usize::MAX,
    };
    let r = r.min(n.checked_sub(1)?);
    (l <= r).then_some((l, r))
}

/// Range Minimum Query.
pub trait Rmq {
    /// The number of elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at position `i` of the backing array.
    fn get(&self, i: usize) -> u64;

    /// Position of the leftmost minimum in `range`, after clamping it to `0..len`.
    fn query(&self, range: impl RangeBounds<usize>) -> Option<usize>;

    /// Bytes used by the index structure, excluding the backing array.
    fn size_in_bytes(&self) -> usize;
}

/// An RMQ structure that supports point mutation of its backing array.
pub trait DynamicRmq: Rmq {
    /// Overwrite position `i` with `v` and bring the structure up to date.
    /// Out-of-range positions are ignored.
    fn set(&mut self, i: usize, v: u64);

    /// Make room for `v` in the backing array ahead of a [`DynamicRmq::set`],
    /// so the set itself does only the update work.
    fn reserve(&mut self, v: u64);
}
