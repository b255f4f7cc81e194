use std::ops::{Deref, DerefMut, RangeBounds};

use crate::{clamp, min_index, BackingArray, BackingArrayMut, DynamicRmq, Rmq};

/// O(1) query, O(n lg n) words of space.
///
/// The table is immutable: there is no incremental update. Writing a value
/// through [`DynamicRmq::set`] throws the table away and builds a new version
/// from scratch, in O(n lg n).
pub struct SparseTable<R> {
    a: R,
    /// The number of elements.
    n: usize,
    /// Packed rows of n elements.
    /// Row k at position i holds the position of the minimum of [i, i + 2^k).
    table: Vec<usize>,
    /// Number of rebuilds since construction.
    version: u64,
}

fn build<A: BackingArray + ?Sized>(a: &A) -> Vec<usize> {
    let n = a.len();
    if n == 0 {
        return vec![];
    }
    let logn = n.ilog2() as usize;
    let mut table = vec![0; n * (logn + 1)];
    for (i, x) in table[..n].iter_mut().enumerate() {
        *x = i;
    }
    for k in 1..=logn {
        let len = 1 << (k - 1);
        for i in 0..=n - 2 * len {
            table[k * n + i] = min_index(a, table[(k - 1) * n + i], table[(k - 1) * n + i + len]);
        }
    }
    table
}

impl<R> SparseTable<R>
where
    R: Deref,
    R::Target: BackingArray,
{
    pub fn new(a: R) -> Self {
        let table = build(&*a);
        Self {
            n: a.len(),
            a,
            table,
            version: 0,
        }
    }

    pub fn array(&self) -> &R::Target {
        &self.a
    }

    pub fn into_inner(self) -> R {
        self.a
    }

    /// Number of full rebuilds this table went through.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl<R> Rmq for SparseTable<R>
where
    R: Deref,
    R::Target: BackingArray,
{
    fn len(&self) -> usize {
        self.n
    }

    fn get(&self, i: usize) -> u64 {
        self.a.get(i)
    }

    /// Two overlapping power-of-two windows, one starting at l and one ending at r.
    fn query(&self, range: impl RangeBounds<usize>) -> Option<usize> {
        let (l, r) = clamp(range, self.n)?;
        let k = (r - l + 1).ilog2() as usize;
        Some(min_index(
            &*self.a,
            self.table[k * self.n + l],
            self.table[k * self.n + r + 1 - (1 << k)],
        ))
    }

    fn size_in_bytes(&self) -> usize {
        self.table.capacity() * std::mem::size_of::<usize>()
    }
}

impl<R> DynamicRmq for SparseTable<R>
where
    R: DerefMut,
    R::Target: BackingArrayMut,
{
    fn set(&mut self, i: usize, v: u64) {
        if i < self.n {
            self.a.set(i, v);
            self.table = build(&*self.a);
            self.version += 1;
        }
    }
    fn reserve(&mut self, v: u64) {
        self.a.reserve(v);
    }
}
