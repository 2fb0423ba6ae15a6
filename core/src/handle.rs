//! Generation-checked object handles.
//!
//! History records key their snapshots by [`ObjectHandle`] instead of a raw
//! address. A handle is a slot index plus the generation the slot had when
//! the object was allocated. Releasing a slot bumps its generation, so every
//! handle captured before the release is detectably stale afterwards, even
//! once the slot has been recycled for a different object.

use std::fmt;

use crate::undo::{EditActionError, EditActionResult};

/// A non-owning identity for an editable object.
///
/// Handles are only ever compared and hashed by the history engine, never
/// resolved. Resolution is the job of whoever owns the [`HandleAllocator`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectHandle {
    index: u32,
    generation: u32,
}

impl ObjectHandle {
    /// The "no specific object" key.
    ///
    /// Records store action-wide values (e.g. the array index an edit
    /// touched) under this key. It is never returned by an allocator.
    pub const NULL: ObjectHandle = ObjectHandle {
        index: u32::MAX,
        generation: u32::MAX,
    };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the owning allocator.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at allocation time.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns `true` for [`ObjectHandle::NULL`].
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl Default for ObjectHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Object(null)")
        } else {
            write!(f, "Object({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Allocates and recycles object handles.
///
/// Released slots go onto a LIFO free list and come back with a bumped
/// generation.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    /// Current generation per slot. Index = handle index.
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    count: usize,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new handle, reusing a recycled slot if available.
    pub fn allocate(&mut self) -> ObjectHandle {
        self.count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.alive[idx] = true;
            ObjectHandle::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u32;
            // u32::MAX is reserved for ObjectHandle::NULL.
            debug_assert!(index != u32::MAX, "handle space exhausted");
            self.generations.push(0);
            self.alive.push(true);
            ObjectHandle::new(index, 0)
        }
    }

    /// Releases a handle. Returns `false` if it was already dead or stale.
    pub fn release(&mut self, handle: ObjectHandle) -> bool {
        if !self.is_alive(handle) {
            return false;
        }

        let idx = handle.index() as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(handle.index());
        self.count -= 1;
        true
    }

    /// Returns whether the handle refers to a currently allocated object.
    pub fn is_alive(&self, handle: ObjectHandle) -> bool {
        let idx = handle.index() as usize;
        !handle.is_null()
            && idx < self.alive.len()
            && self.alive[idx]
            && self.generations[idx] == handle.generation()
    }

    /// Like [`is_alive`](Self::is_alive), but as an error suitable for `?`.
    pub fn validate(&self, handle: ObjectHandle) -> EditActionResult<()> {
        if self.is_alive(handle) {
            Ok(())
        } else {
            Err(EditActionError::InvalidHandle(handle))
        }
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterates over all live handles in slot order.
    pub fn iter_alive(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(idx, _)| ObjectHandle::new(idx as u32, self.generations[idx]))
    }
}
