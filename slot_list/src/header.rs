/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

/// The metadata prefix of a [`SlotList`](crate::SlotList) allocation.
///
/// Lives at offset 0 of the heap block, ahead of the record array:
/// `EXT` caller-reserved words first, then the capacity and length.
/// Reallocation moves the whole block, so the prefix (including the
/// reserved words) survives growth byte-for-byte.
#[repr(C)]
pub(crate) struct Header<const EXT: usize> {
    ext: [u32; EXT],
    cap: u32,
    len: u32,
}

impl<const EXT: usize> Header<EXT> {
    /// Create a header for a freshly allocated, empty block.
    ///
    /// # Panics
    ///
    /// Panics if `cap` exceeds the handle width.
    pub(crate) fn for_capacity(cap: usize) -> Self {
        Self {
            ext: [0; EXT],
            cap: to_word(cap),
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap as usize
    }

    #[inline]
    pub(crate) fn set_capacity(&mut self, cap: usize) {
        assert!(
            cap >= self.len as usize,
            "capacity must not drop below the current length"
        );
        self.cap = to_word(cap);
    }

    #[inline]
    pub(crate) fn set_len(&mut self, len: usize) {
        assert!(
            len <= self.cap as usize,
            "length must not exceed the current capacity"
        );
        self.len = to_word(len);
    }

    #[inline]
    pub(crate) fn ext(&self) -> &[u32; EXT] {
        &self.ext
    }

    #[inline]
    pub(crate) fn ext_mut(&mut self) -> &mut [u32; EXT] {
        &mut self.ext
    }
}

#[inline]
fn to_word(val: usize) -> u32 {
    u32::try_from(val).expect("slot list size may not exceed the 32-bit handle width")
}
