use std::{fmt, ops::Range};

use bitvec::prelude::*;

use crate::{BackingArray, BackingArrayMut};

/// A fixed-length vector of unsigned integers packed at a common bit width.
///
/// Element `i` occupies bits `[i * width, (i + 1) * width)` of a little-endian
/// bit vector. The width starts at 64 bits; [`IntVector::bit_compress`] shrinks
/// it to the minimum needed for the current maximum, and [`IntVector::set`]
/// widens it again when a value no longer fits.
#[derive(Clone, PartialEq, Eq)]
pub struct IntVector {
    bits: BitVec<u64, Lsb0>,
    len: usize,
    /// Bits per element, in 1..=64.
    width: u8,
}

/// Minimum number of bits needed to store `v`; at least 1.
fn bits_for(v: u64) -> u8 {
    (u64::BITS - v.leading_zeros()).max(1) as u8
}

impl IntVector {
    /// `len` zeros, each `width` bits wide.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=64`.
    pub fn new(len: usize, width: u8) -> Self {
        assert!((1..=64).contains(&width), "width {width} not in 1..=64");
        Self {
            bits: BitVec::repeat(false, len * width as usize),
            len,
            width,
        }
    }

    pub fn from_slice(values: &[u64]) -> Self {
        values.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits used per element.
    pub fn width(&self) -> u8 {
        self.width
    }

    fn slot(&self, i: usize) -> Range<usize> {
        let w = self.width as usize;
        i * w..(i + 1) * w
    }

    /// # Panics
    ///
    /// Panics if `i >= len`.
    pub fn get(&self, i: usize) -> u64 {
        assert!(i < self.len, "index {i} out of bounds");
        self.bits[self.slot(i)].load_le()
    }

    /// Store `v` at position `i`, widening every element first if `v` does not fit.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`.
    pub fn set(&mut self, i: usize, v: u64) {
        assert!(i < self.len, "index {i} out of bounds");
        self.reserve(v);
        let slot = self.slot(i);
        self.bits[slot].store_le(v);
    }

    /// Widen every element so that `v` fits, if it does not already.
    pub fn reserve(&mut self, v: u64) {
        let needed = bits_for(v);
        if needed > self.width {
            self.repack(needed);
        }
    }

    fn repack(&mut self, width: u8) {
        let mut packed = Self::new(self.len, width);
        for (i, v) in self.iter().enumerate() {
            let slot = packed.slot(i);
            packed.bits[slot].store_le(v);
        }
        *self = packed;
    }

    /// Shrink the width to the fewest bits that hold the current maximum.
    pub fn bit_compress(&mut self) {
        let width = bits_for(self.iter().max().unwrap_or(0));
        if width != self.width {
            self.repack(width);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len).map(|i| self.get(i))
    }

    /// Heap bytes used by the packed words.
    pub fn size_in_bytes(&self) -> usize {
        std::mem::size_of_val(self.bits.as_raw_slice())
    }
}

impl FromIterator<u64> for IntVector {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let words: Vec<u64> = iter.into_iter().collect();
        let len = words.len();
        Self {
            bits: BitVec::from_vec(words),
            len,
            width: u64::BITS as u8,
        }
    }
}

impl BackingArray for IntVector {
    fn len(&self) -> usize {
        self.len
    }
    fn get(&self, i: usize) -> u64 {
        IntVector::get(self, i)
    }
}

impl BackingArrayMut for IntVector {
    fn set(&mut self, i: usize, v: u64) {
        IntVector::set(self, i, v)
    }
    fn reserve(&mut self, v: u64) {
        IntVector::reserve(self, v)
    }
}

/// Space separated values.
impl fmt::Display for IntVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for IntVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntVector")
            .field("width", &self.width)
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
