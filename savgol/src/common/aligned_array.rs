//! Heap array whose first element sits on a multiple of `ALIGN` elements.

use std::mem::size_of;
use std::ops::{Deref, DerefMut};

use bytemuck::Zeroable;

/// A zero-initialized array of `T` whose data address is a multiple of
/// `ALIGN * size_of::<T>()` bytes. `ALIGN` of 0 or 1 requests no alignment
/// beyond `T`'s own; otherwise it must be a power of two.
///
/// The backing storage is over-allocated by `ALIGN - 1` elements and the
/// aligned window into it is remembered as an offset, so both are released
/// together. The type is deliberately not `Clone`: ownership moves, or is
/// exchanged in O(1) with [`AlignedArray::swap`].
#[derive(Debug)]
pub struct AlignedArray<T, const ALIGN: usize> {
    storage: Vec<T>,
    offset: usize,
    len: usize,
}

impl<T, const ALIGN: usize> Default for AlignedArray<T, ALIGN> {
    /// A null array: no storage, zero length.
    fn default() -> Self {
        Self {
            storage: Vec::new(),
            offset: 0,
            len: 0,
        }
    }
}

impl<T: Zeroable + Copy, const ALIGN: usize> AlignedArray<T, ALIGN> {
    /// Alignment in bytes guaranteed for [`Self::as_ptr`].
    pub const ALIGN_BYTES: usize = (if ALIGN > 1 { ALIGN } else { 1 }) * size_of::<T>();

    pub fn new(len: usize) -> Self {
        if len == 0 {
            return Self::default();
        }

        let align = ALIGN.max(1);
        assert!(
            align.is_power_of_two(),
            "alignment must be a power of two, got {}",
            align
        );
        let mask = align - 1;

        let storage = vec![T::zeroed(); len + mask];
        let address_in_units = storage.as_ptr() as usize / size_of::<T>().max(1);
        let offset = (align - (address_in_units & mask)) & mask;

        let array = Self {
            storage,
            offset,
            len,
        };
        debug_assert_eq!(array.as_ptr() as usize % Self::ALIGN_BYTES.max(1), 0);
        array
    }
}

impl<T, const ALIGN: usize> AlignedArray<T, ALIGN> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True for arrays created empty; they own no storage.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.storage.is_empty()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.as_slice().as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[self.offset..self.offset + self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage[self.offset..self.offset + self.len]
    }

    /// Exchanges contents with `other` without copying elements.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

impl<T, const ALIGN: usize> Deref for AlignedArray<T, ALIGN> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const ALIGN: usize> DerefMut for AlignedArray<T, ALIGN> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_aligned<T: Zeroable + Copy, const ALIGN: usize>(len: usize) {
        // Several allocations, so a lucky naturally-aligned one can't hide a bad offset.
        for _ in 0..8 {
            let array = AlignedArray::<T, ALIGN>::new(len);
            assert_eq!(array.len(), len);
            assert_eq!(
                array.as_ptr() as usize % AlignedArray::<T, ALIGN>::ALIGN_BYTES,
                0,
                "ALIGN={} len={}",
                ALIGN,
                len
            );
        }
    }

    #[test]
    fn data_is_aligned() {
        assert_aligned::<f32, 4>(1);
        assert_aligned::<f32, 4>(49);
        assert_aligned::<f32, 8>(13);
        assert_aligned::<f64, 16>(7);
        assert_aligned::<u8, 64>(100);
    }

    #[test]
    fn no_alignment_requested() {
        assert_aligned::<f32, 0>(5);
        assert_aligned::<f32, 1>(5);
        assert_eq!(AlignedArray::<f32, 0>::ALIGN_BYTES, 4);
    }

    #[test]
    fn new_is_zeroed_and_writable() {
        let mut array = AlignedArray::<f32, 4>::new(10);
        assert!(array.iter().all(|&v| v == 0.0));

        array[3] = 2.5;
        array.as_mut_slice()[9] = -1.0;
        assert_eq!(array[3], 2.5);
        assert_eq!(array.as_slice()[9], -1.0);
    }

    #[test]
    fn zero_length_is_null() {
        let array = AlignedArray::<f32, 4>::new(0);
        assert!(array.is_null());
        assert!(array.is_empty());
        assert!(array.as_slice().is_empty());
    }

    #[test]
    fn swap_into_null() {
        let mut null = AlignedArray::<f32, 4>::default();
        let mut filled = AlignedArray::<f32, 4>::new(3);
        filled[0] = 1.0;
        let ptr = filled.as_ptr();

        null.swap(&mut filled);

        assert!(filled.is_null());
        assert_eq!(null.len(), 3);
        assert_eq!(null[0], 1.0);
        assert_eq!(null.as_ptr(), ptr, "swap must not move the storage");
    }

    #[test]
    #[should_panic(expected = "alignment must be a power of two")]
    fn non_power_of_two_alignment_panics() {
        let _ = AlignedArray::<f32, 3>::new(4);
    }
}
