/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! The wide-id variant of the slot pool: a `{u32 index, u32 version}`
//! id pair instead of the packed 24/8 word. More storage, and a version
//! space large enough that reuse collisions stop being a practical
//! concern.

use std::{fmt, mem, ops};

use slot_base::{CapacityError, NONE_ID};

use crate::flex_capacity;

/// The maximum number of slots a [`SlotMap64`] can hold; the top `u32`
/// value is reserved as the index sentinel.
pub const MAX_SLOTS_64: usize = u32::MAX as usize;

/// An id into a [`SlotMap64`]: a slot index and the version the slot
/// carried when the id was issued.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct SlotId64 {
    index: u32,
    version: u32,
}

impl SlotId64 {
    /// The sentinel id. Never issued for a live record.
    pub const NONE: SlotId64 = SlotId64 {
        index: u32::MAX,
        version: u32::MAX,
    };

    /// The slot index this id refers to.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// The version the slot carried when this id was issued.
    #[inline]
    pub const fn version(self) -> u32 {
        self.version
    }

    /// Rebuild an id from an index and version, e.g. after a round-trip
    /// through foreign code.
    #[inline]
    pub const fn from_raw_parts(index: u32, version: u32) -> Self {
        Self { index, version }
    }
}

impl fmt::Debug for SlotId64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotId64")
            .field("index", &self.index)
            .field("version", &self.version)
            .finish()
    }
}

#[derive(Clone)]
enum Slot<T> {
    Live { version: u32, value: T },
    Free { next_version: u32, next_free: u32 },
}

/// A versioned pool of records with two-word ids.
///
/// Semantics match [`SlotMap`](crate::SlotMap): insert/get/remove with
/// stale-id detection, slot reuse off an embedded free list, and
/// flex-paced growth that never invalidates ids. The difference is a
/// 32-bit version per slot and room for [`MAX_SLOTS_64`] records.
pub struct SlotMap64<T> {
    slots: Vec<Slot<T>>,
    free_head: u32,
    free_count: u32,
}

impl<T> SlotMap64<T> {
    /// Creates an empty pool. Does not allocate.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: NONE_ID,
            free_count: 0,
        }
    }

    /// Creates an empty pool with room for `cap` records.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap.min(MAX_SLOTS_64)),
            free_head: NONE_ID,
            free_count: 0,
        }
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_count as usize
    }

    /// Returns `true` if the pool holds no live records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever drawn from the pool (the high-water mark).
    pub fn used(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots the pool can hold without growing.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Bytes of the backing allocation.
    pub fn mem_usage(&self) -> usize {
        self.slots.capacity() * mem::size_of::<Slot<T>>()
    }

    /// Reserve room for at least `additional` fresh slots beyond the
    /// high-water mark, growing along the flex schedule.
    ///
    /// # Panics
    ///
    /// Panics if the pool would exceed [`MAX_SLOTS_64`].
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.slots.len() + additional;
        assert!(
            needed <= MAX_SLOTS_64,
            "slot map exceeded maximum capacity of {MAX_SLOTS_64} slots"
        );
        if needed <= self.slots.capacity() {
            return;
        }
        let new_cap = flex_capacity(
            self.slots.capacity(),
            needed,
            mem::size_of::<Slot<T>>(),
            MAX_SLOTS_64,
        );
        self.slots.reserve_exact(new_cap - self.slots.len());
    }

    /// Store a record, returning its id. Reuses the free list head if
    /// one is available, otherwise appends (growing if needed).
    ///
    /// # Panics
    ///
    /// Panics if the pool is at [`MAX_SLOTS_64`] with an empty free
    /// list. Use [`try_insert`](Self::try_insert) to handle that case.
    pub fn insert(&mut self, value: T) -> SlotId64 {
        match self.try_insert(value) {
            Ok(id) => id,
            Err(_) => panic!("slot map exceeded maximum capacity of {MAX_SLOTS_64} slots"),
        }
    }

    /// Store a record, or give it back if the pool is at
    /// [`MAX_SLOTS_64`] with an empty free list. The pool is untouched
    /// on failure.
    pub fn try_insert(&mut self, value: T) -> Result<SlotId64, CapacityError<T>> {
        if self.free_head != NONE_ID {
            let index = self.free_head;
            let slot = &mut self.slots[index as usize];
            let (version, next_free) = match *slot {
                Slot::Free {
                    next_version,
                    next_free,
                } => (next_version, next_free),
                Slot::Live { .. } => unreachable!("free list head points at a live slot"),
            };
            *slot = Slot::Live { version, value };
            self.free_head = next_free;
            self.free_count -= 1;
            return Ok(SlotId64::from_raw_parts(index, version));
        }

        if self.slots.len() == MAX_SLOTS_64 {
            return Err(CapacityError::new(value));
        }
        if self.slots.len() == self.slots.capacity() {
            let new_cap = flex_capacity(
                self.slots.capacity(),
                self.slots.len() + 1,
                mem::size_of::<Slot<T>>(),
                MAX_SLOTS_64,
            );
            self.slots.reserve_exact(new_cap - self.slots.len());
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot::Live { version: 0, value });
        Ok(SlotId64::from_raw_parts(index, 0))
    }

    /// Shared access to the record behind `id`, or `None` if the id is
    /// stale or was never issued.
    pub fn get(&self, id: SlotId64) -> Option<&T> {
        match self.slots.get(id.index as usize) {
            Some(Slot::Live { version, value }) if *version == id.version => Some(value),
            _ => None,
        }
    }

    /// Mutable access to the record behind `id`, or `None` if the id is
    /// stale or was never issued.
    pub fn get_mut(&mut self, id: SlotId64) -> Option<&mut T> {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot::Live { version, value }) if *version == id.version => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if `id` refers to a live record.
    pub fn contains(&self, id: SlotId64) -> bool {
        self.get(id).is_some()
    }

    /// Remove the record behind `id` and return it, or `None` if the id
    /// is stale or was never issued. The slot joins the free list with a
    /// bumped version.
    pub fn try_remove(&mut self, id: SlotId64) -> Option<T> {
        let index = id.index;
        if let Some(slot) = self.slots.get_mut(index as usize)
            && let Slot::Live { version, .. } = slot
            && *version == id.version
        {
            let next_version = version.wrapping_add(1);
            let old = mem::replace(
                slot,
                Slot::Free {
                    next_version,
                    next_free: self.free_head,
                },
            );
            self.free_head = index;
            self.free_count += 1;
            return match old {
                Slot::Live { value, .. } => Some(value),
                Slot::Free { .. } => unreachable!(),
            };
        }
        None
    }

    /// Remove and return the record behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if the id is stale or was never issued.
    #[track_caller]
    pub fn remove(&mut self, id: SlotId64) -> T {
        self.try_remove(id).expect("invalid slot id")
    }

    /// Recover the id of a live record from a reference into the pool.
    ///
    /// # Panics
    ///
    /// Panics if the reference does not point to a live record of this
    /// pool.
    #[track_caller]
    pub fn id_of(&self, record: &T) -> SlotId64 {
        let base = self.slots.as_ptr() as usize;
        let byte_offset = (record as *const T as usize).wrapping_sub(base);
        let index = byte_offset / mem::size_of::<Slot<T>>();
        if index >= self.slots.len() {
            panic!("the reference points to a record outside this slot map");
        }
        match &self.slots[index] {
            Slot::Live { version, .. } => SlotId64::from_raw_parts(index as u32, *version),
            Slot::Free { .. } => panic!("the reference points to a freed slot of this slot map"),
        }
    }

    /// Iterate over `(id, &record)` pairs, in slot order (not insertion
    /// order).
    pub fn iter(&self) -> impl Iterator<Item = (SlotId64, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            if let Slot::Live { version, value } = slot {
                Some((SlotId64::from_raw_parts(index as u32, *version), value))
            } else {
                None
            }
        })
    }

    /// Iterate over `(id, &mut record)` pairs, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId64, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                if let Slot::Live { version, value } = slot {
                    Some((SlotId64::from_raw_parts(index as u32, *version), value))
                } else {
                    None
                }
            })
    }
}

impl<T> Default for SlotMap64<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SlotMap64<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free_head: self.free_head,
            free_count: self.free_count,
        }
    }
}

impl<T> ops::Index<SlotId64> for SlotMap64<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, id: SlotId64) -> &T {
        self.get(id).expect("invalid slot id")
    }
}

impl<T> ops::IndexMut<SlotId64> for SlotMap64<T> {
    #[track_caller]
    fn index_mut(&mut self, id: SlotId64) -> &mut T {
        self.get_mut(id).expect("invalid slot id")
    }
}

impl<T: fmt::Debug> fmt::Debug for SlotMap64<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_map().entries(self.iter()).finish()
        } else {
            f.debug_struct("SlotMap64")
                .field("len", &self.len())
                .field("used", &self.used())
                .field("cap", &self.capacity())
                .finish()
        }
    }
}
