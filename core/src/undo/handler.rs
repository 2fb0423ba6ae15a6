//! Editable targets and replay handlers.
//!
//! - [`Editable`] — marker trait for types that history replays into
//! - [`RecordHandler`] — undo/redo/discard behavior of one record (Command pattern)
//! - [`FnHandler`] — a handler assembled from closures
//!
//! A handler receives the record's snapshot storage read-only together with
//! the live target, so replay can never disturb the snapshots it reads from.

use std::fmt;

use super::error::EditActionResult;
use super::record::RecordData;

/// Marker trait for types that serve as editing targets.
///
/// Implement this on any type that records replay into: a scene, an
/// animation clip, a material library.
///
/// # Example
///
/// ```ignore
/// struct MyScene { /* ... */ }
/// impl Editable for MyScene {}
/// ```
pub trait Editable: 'static {}

/// Replay behavior attached to an [`ActionRecord`](super::ActionRecord).
///
/// The history stack calls [`undo`](Self::undo) to move the target from the
/// record's "after" state back to its "before" state, [`redo`](Self::redo)
/// for the opposite direction, and [`discard`](Self::discard) when the record
/// is destroyed while it sits in the redo tail, i.e. its effects were undone
/// and the record can never be redone again.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// enum SceneEdit {
///     Rename,
/// }
///
/// impl RecordHandler<Scene> for SceneEdit {
///     fn undo(&mut self, data: &RecordData, scene: &mut Scene) -> EditActionResult {
///         match self {
///             SceneEdit::Rename => apply_names(data, 0, scene),
///         }
///     }
///
///     fn redo(&mut self, data: &RecordData, scene: &mut Scene) -> EditActionResult {
///         match self {
///             SceneEdit::Rename => apply_names(data, 1, scene),
///         }
///     }
/// }
/// ```
pub trait RecordHandler<T: Editable>: fmt::Debug + Send {
    /// Restores the "before" snapshot into the target.
    fn undo(&mut self, data: &RecordData, target: &mut T) -> EditActionResult;

    /// Re-applies the "after" snapshot to the target.
    fn redo(&mut self, data: &RecordData, target: &mut T) -> EditActionResult;

    /// Releases whatever the "after" state created and the undo did not.
    ///
    /// Only called for records destroyed while unreachable by undo (their
    /// index is past the cursor). Default: nothing to release.
    fn discard(&mut self, _data: &RecordData, _target: &mut T) -> EditActionResult {
        Ok(())
    }
}

type ReplayFn<T> = Box<dyn FnMut(&RecordData, &mut T) -> EditActionResult + Send>;

/// A [`RecordHandler`] built from up to three closures.
///
/// Unset closures are no-ops.
///
/// ```ignore
/// record.set_handler(
///     FnHandler::new()
///         .on_undo(|data, scene: &mut Scene| { /* ... */ Ok(()) })
///         .on_redo(|data, scene: &mut Scene| { /* ... */ Ok(()) }),
/// );
/// ```
pub struct FnHandler<T: Editable> {
    undo: Option<ReplayFn<T>>,
    redo: Option<ReplayFn<T>>,
    discard: Option<ReplayFn<T>>,
}

impl<T: Editable> FnHandler<T> {
    pub fn new() -> Self {
        Self {
            undo: None,
            redo: None,
            discard: None,
        }
    }

    pub fn on_undo(
        mut self,
        f: impl FnMut(&RecordData, &mut T) -> EditActionResult + Send + 'static,
    ) -> Self {
        self.undo = Some(Box::new(f));
        self
    }

    pub fn on_redo(
        mut self,
        f: impl FnMut(&RecordData, &mut T) -> EditActionResult + Send + 'static,
    ) -> Self {
        self.redo = Some(Box::new(f));
        self
    }

    pub fn on_discard(
        mut self,
        f: impl FnMut(&RecordData, &mut T) -> EditActionResult + Send + 'static,
    ) -> Self {
        self.discard = Some(Box::new(f));
        self
    }
}

impl<T: Editable> Default for FnHandler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for FnHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("undo", &self.undo.is_some())
            .field("redo", &self.redo.is_some())
            .field("discard", &self.discard.is_some())
            .finish()
    }
}

impl<T: Editable> RecordHandler<T> for FnHandler<T> {
    fn undo(&mut self, data: &RecordData, target: &mut T) -> EditActionResult {
        match &mut self.undo {
            Some(f) => f(data, target),
            None => Ok(()),
        }
    }

    fn redo(&mut self, data: &RecordData, target: &mut T) -> EditActionResult {
        match &mut self.redo {
            Some(f) => f(data, target),
            None => Ok(()),
        }
    }

    fn discard(&mut self, data: &RecordData, target: &mut T) -> EditActionResult {
        match &mut self.discard {
            Some(f) => f(data, target),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ObjectHandle;
    use crate::undo::error::EditActionError;

    struct Counter {
        value: i32,
    }

    impl Editable for Counter {}

    fn amount_data(amount: i32) -> RecordData {
        let mut data = RecordData::default();
        data.resize(1);
        data.set_global(0, amount);
        data
    }

    #[test]
    fn closures_receive_record_data() {
        let data = amount_data(5);
        let mut counter = Counter { value: 0 };
        let mut handler = FnHandler::new()
            .on_undo(|data: &RecordData, c: &mut Counter| {
                c.value -= data.get_as::<i32>(0, ObjectHandle::NULL)?;
                Ok(())
            })
            .on_redo(|data: &RecordData, c: &mut Counter| {
                c.value += data.get_as::<i32>(0, ObjectHandle::NULL)?;
                Ok(())
            });

        handler.redo(&data, &mut counter).unwrap();
        assert_eq!(counter.value, 5);
        handler.undo(&data, &mut counter).unwrap();
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn unset_closures_are_noops() {
        let data = RecordData::default();
        let mut counter = Counter { value: 3 };
        let mut handler = FnHandler::<Counter>::new();

        handler.undo(&data, &mut counter).unwrap();
        handler.redo(&data, &mut counter).unwrap();
        handler.discard(&data, &mut counter).unwrap();
        assert_eq!(counter.value, 3);
    }

    #[test]
    fn closure_errors_propagate() {
        let data = RecordData::default();
        let mut counter = Counter { value: 0 };
        let mut handler = FnHandler::new().on_undo(|data: &RecordData, _: &mut Counter| {
            data.get_as::<i32>(0, ObjectHandle::NULL).map(|_| ())
        });

        assert_eq!(
            handler.undo(&data, &mut counter),
            Err(EditActionError::LayerOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn handler_is_dyn_compatible() {
        let data = amount_data(2);
        let mut counter = Counter { value: 0 };
        let mut boxed: Box<dyn RecordHandler<Counter>> =
            Box::new(FnHandler::new().on_redo(|data: &RecordData, c: &mut Counter| {
                c.value += data.get_as::<i32>(0, ObjectHandle::NULL)?;
                Ok(())
            }));
        boxed.redo(&data, &mut counter).unwrap();
        assert_eq!(counter.value, 2);
        assert!(format!("{boxed:?}").contains("FnHandler"));
    }
}
