use std::ops::{Deref, DerefMut, RangeBounds};

use crate::{clamp, combine, min_index, BackingArray, BackingArrayMut, DynamicRmq, Rmq};

/// O(log n) query and O(log n) point update, O(n) words of space.
///
/// The tree refers to its values through `R`, which can be a shared borrow
/// (read-only), a mutable borrow (updates allowed), or an owning box. It never
/// changes the length of the array.
pub struct SegmentTree<R> {
    a: R,
    /// The number of elements.
    n: usize,
    /// Node `p` has children `2p+1` and `2p+2` and stores the position of the
    /// minimum of its range. The root covers `[0, n)`.
    nodes: Vec<usize>,
}

impl<R> SegmentTree<R>
where
    R: Deref,
    R::Target: BackingArray,
{
    pub fn new(a: R) -> Self {
        let mut tree = Self {
            a,
            n: 0,
            nodes: vec![],
        };
        tree.rebuild();
        tree
    }

    /// Recompute every node from the current values.
    pub fn rebuild(&mut self) {
        self.n = self.a.len();
        self.nodes.clear();
        if self.n == 0 {
            return;
        }
        // Splitting at the midpoint gives depth ceil(lg n).
        self.nodes.resize(2 * self.n.next_power_of_two() - 1, 0);
        self.build(0, 0, self.n - 1);
    }

    fn build(&mut self, p: usize, l: usize, r: usize) -> usize {
        let m = if l == r {
            l
        } else {
            let mid = l + (r - l) / 2;
            let left = self.build(2 * p + 1, l, mid);
            let right = self.build(2 * p + 2, mid + 1, r);
            min_index(&*self.a, left, right)
        };
        self.nodes[p] = m;
        m
    }

    fn query_rec(&self, p: usize, l: usize, r: usize, ql: usize, qr: usize) -> Option<usize> {
        if qr < l || r < ql {
            return None;
        }
        if ql <= l && r <= qr {
            return Some(self.nodes[p]);
        }
        let mid = l + (r - l) / 2;
        combine(
            &*self.a,
            self.query_rec(2 * p + 1, l, mid, ql, qr),
            self.query_rec(2 * p + 2, mid + 1, r, ql, qr),
        )
    }

    pub fn array(&self) -> &R::Target {
        &self.a
    }

    pub fn into_inner(self) -> R {
        self.a
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl<R> SegmentTree<R>
where
    R: DerefMut,
    R::Target: BackingArray,
{
    /// Mutable access to the values. Call [`SegmentTree::update`] for every
    /// position written before querying again.
    pub fn array_mut(&mut self) -> &mut R::Target {
        &mut self.a
    }

    /// Recompute the nodes covering position `i` after its value changed.
    /// Does nothing when `i` is out of range.
    pub fn update(&mut self, i: usize) {
        if i < self.n {
            self.update_rec(0, 0, self.n - 1, i);
        }
    }

    fn update_rec(&mut self, p: usize, l: usize, r: usize, i: usize) {
        if l == r {
            self.nodes[p] = l;
            return;
        }
        let mid = l + (r - l) / 2;
        if i <= mid {
            self.update_rec(2 * p + 1, l, mid, i);
        } else {
            self.update_rec(2 * p + 2, mid + 1, r, i);
        }
        let m = min_index(&*self.a, self.nodes[2 * p + 1], self.nodes[2 * p + 2]);
        self.nodes[p] = m;
    }
}

impl<R> Rmq for SegmentTree<R>
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

    fn query(&self, range: impl RangeBounds<usize>) -> Option<usize> {
        let (l, r) = clamp(range, self.n)?;
        self.query_rec(0, 0, self.n - 1, l, r)
    }

    fn size_in_bytes(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<usize>()
    }
}

impl<R> DynamicRmq for SegmentTree<R>
where
    R: DerefMut,
    R::Target: BackingArrayMut,
{
    fn set(&mut self, i: usize, v: u64) {
        if i < self.n {
            self.a.set(i, v);
            self.update(i);
        }
    }
    fn reserve(&mut self, v: u64) {
        self.a.reserve(v);
    }
}
