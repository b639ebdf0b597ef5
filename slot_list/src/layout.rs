/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Layout arithmetic for the single [`SlotList`](crate::SlotList)
//! allocation: header prefix, padding, record array.

use crate::header::Header;
use std::alloc::Layout;

/// Layout of the whole allocation backing a `SlotList<T, EXT>` with the
/// given record capacity.
///
/// # Panics
///
/// Panics if the block size would overflow `isize::MAX`.
pub(crate) const fn allocation_layout<T, const EXT: usize>(cap: usize) -> Layout {
    let header = Layout::new::<Header<EXT>>();
    let Ok(records) = Layout::array::<T>(cap) else {
        // The message must be known at compile time for this to stay a
        // `const fn`, so the faulty capacity cannot be reported.
        panic!("the record array of a `SlotList` would exceed `isize::MAX` bytes")
    };
    let block = match header.extend(records) {
        Ok((layout, _)) => layout,
        Err(_) => {
            panic!("the allocation backing a `SlotList` would exceed `isize::MAX` bytes")
        }
    };
    block.pad_to_align()
}

/// Byte offset from the start of the block to the record array: the
/// header, padded out to the records' alignment.
pub(crate) const fn data_offset<T, const EXT: usize>() -> usize {
    let header = Layout::new::<Header<EXT>>();
    match header.extend(Layout::new::<T>()) {
        Ok((_, offset)) => offset,
        Err(_) => panic!("the header of a `SlotList` cannot be padded to the record alignment"),
    }
}
