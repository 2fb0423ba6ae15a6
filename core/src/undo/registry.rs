//! Registry of objects destroyed outside of history replay.
//!
//! Replay handlers consult it before touching a handle captured in an old
//! record. Generation-checked handles already make a recycled slot
//! detectable; the registry additionally covers objects that history itself
//! destroyed (a discarded creation, a purged deletion), so a later discard or
//! redo of an unrelated record can skip them without asking the scene.

use std::collections::HashMap;

use crate::handle::ObjectHandle;

/// Handle -> "this object has been destroyed" flags. No eviction; emptied
/// only by [`HistoryStack::clear`](super::HistoryStack::clear).
#[derive(Debug, Default, Clone)]
pub struct DeletedObjects {
    flags: HashMap<ObjectHandle, bool>,
}

impl DeletedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags `handle` as destroyed.
    pub fn mark(&mut self, handle: ObjectHandle) {
        self.set(handle, true);
    }

    /// Sets or clears the flag, e.g. when an undo brings an object back.
    pub fn set(&mut self, handle: ObjectHandle, deleted: bool) {
        self.flags.insert(handle, deleted);
    }

    /// Unknown handles are not deleted.
    pub fn is_deleted(&self, handle: ObjectHandle) -> bool {
        self.flags.get(&handle).copied().unwrap_or(false)
    }

    /// Handles currently flagged as destroyed, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.flags
            .iter()
            .filter(|(_, deleted)| **deleted)
            .map(|(h, _)| *h)
    }

    /// Number of handles currently flagged as destroyed.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_handle_is_not_deleted() {
        let registry = DeletedObjects::new();
        assert!(!registry.is_deleted(ObjectHandle::new(0, 0)));
        assert!(registry.is_empty());
    }

    #[test]
    fn mark_then_unset() {
        let mut registry = DeletedObjects::new();
        let h = ObjectHandle::new(4, 1);

        registry.mark(h);
        assert!(registry.is_deleted(h));
        assert_eq!(registry.len(), 1);

        registry.set(h, false);
        assert!(!registry.is_deleted(h));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut registry = DeletedObjects::new();
        registry.mark(ObjectHandle::new(1, 0));
        registry.mark(ObjectHandle::new(2, 0));
        registry.clear();
        assert!(registry.iter().next().is_none());
    }
}
