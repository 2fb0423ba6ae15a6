//! Undo/redo action history.
//!
//! [`HistoryStack`] owns a linear list of [`ActionRecord`]s and a cursor
//! pointing at the most recently applied one. Records before and at the
//! cursor are applied; records after it form the redo tail.
//!
//! ```text
//! append(A), append(B), append(C)     [A, B, C]   cursor = 2
//! undo(), undo()                      [A, B, C]   cursor = 0   (C, B undone)
//! append(D)                           [A, D]      cursor = 1   (B, C discarded)
//! ```
//!
//! Appending after an undo discards the redo tail. Each discarded record's
//! handler gets a [`discard`](super::RecordHandler::discard) call, because
//! whatever its "after" state created can no longer be reached by redo.

use std::fmt;

use super::error::{EditActionError, EditActionResult};
use super::handler::Editable;
use super::record::{ActionRecord, RecordId};
use super::registry::DeletedObjects;
use crate::handle::ObjectHandle;

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Limits applied by a [`HistoryStack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of records kept. The oldest applied records are
    /// dropped past this. `0` means unbounded.
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

impl HistoryConfig {
    pub fn new(max_undo: usize) -> Self {
        Self { max_undo }
    }

    /// No capacity limit.
    pub fn unbounded() -> Self {
        Self { max_undo: 0 }
    }
}

type ChangedCallback = Box<dyn FnMut() + Send>;

/// Manages the undo/redo history of one editing session.
///
/// The target is passed to every operation that may run a handler, so the
/// stack never holds on to the objects it replays into.
///
/// # Example
///
/// ```ignore
/// let mut history = HistoryStack::new(HistoryConfig::default());
/// let mut scene = Scene::new();
///
/// let record = history.append("Rename object", &mut scene);
/// record.data_mut().resize(2);
/// record.data_mut().set(0, object, old_name);
/// record.data_mut().set(1, object, new_name);
/// record.set_handler(SceneEdit::Rename);
///
/// history.undo(&mut scene)?;
/// history.redo(&mut scene)?;
/// ```
pub struct HistoryStack<T: Editable> {
    records: Vec<ActionRecord<T>>,
    /// Index of the most recently applied record; `None` is "before the
    /// first record".
    cursor: Option<usize>,
    config: HistoryConfig,
    next_id: u64,
    deleted: DeletedObjects,
    on_history_changed: Option<ChangedCallback>,
    /// Last record dropped by the capacity limit. The state at `cursor ==
    /// None` is the state right after it.
    base: Option<RecordId>,
    /// Position of the saved state, as the id of the record applied last
    /// at save time (`Some(None)` = the base state). `None` once the save
    /// point is unreachable.
    saved: Option<Option<RecordId>>,
}

impl<T: Editable> HistoryStack<T> {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            records: Vec::new(),
            cursor: None,
            config,
            next_id: 1,
            deleted: DeletedObjects::new(),
            on_history_changed: None,
            base: None,
            saved: Some(None),
        }
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Starts recording a new action and returns it for the caller to fill.
    ///
    /// The redo tail is discarded first (each record's handler gets a
    /// `discard` call), then an empty record labeled `label` is appended
    /// and becomes the current one.
    pub fn append(&mut self, label: impl Into<String>, target: &mut T) -> &mut ActionRecord<T> {
        self.push(ActionRecord::new(label), target);
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    /// Appends an already populated record. Same semantics as
    /// [`append`](Self::append).
    pub fn push(&mut self, mut record: ActionRecord<T>, target: &mut T) -> RecordId {
        self.truncate_redo(target);

        let id = RecordId(self.next_id);
        self.next_id += 1;
        record.id = id;

        log::debug!("History: recorded '{}' ({id})", record.label());
        self.records.push(record);
        self.cursor = Some(self.records.len() - 1);
        self.enforce_capacity(target);

        if let Some(callback) = &mut self.on_history_changed {
            callback();
        }
        id
    }

    /// Removes a record without replaying it.
    ///
    /// Used to retract a record that should never become undo-visible, e.g.
    /// when coalescing a drag into one step. A record past the cursor is
    /// discarded; removing an applied record shifts the cursor down by one.
    /// Returns `false` if no record has this id.
    pub fn remove(&mut self, id: RecordId, target: &mut T) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };

        let discard = self.is_past_cursor(pos);
        let record = self.records.remove(pos);
        if !discard {
            self.cursor = self.cursor.and_then(|c| c.checked_sub(1));
        }
        self.forget_save_point(id);

        log::debug!("History: removed '{}' ({id})", record.label());
        record.destroy(discard, target);
        true
    }

    /// Removes every record that references `handle`. Returns how many were
    /// removed.
    pub fn remove_referencing(&mut self, handle: ObjectHandle, target: &mut T) -> usize {
        let ids: Vec<RecordId> = self
            .records
            .iter()
            .filter(|r| r.has_object(handle))
            .map(|r| r.id())
            .collect();
        for id in &ids {
            self.remove(*id, target);
        }
        ids.len()
    }

    /// Destroys every record, empties the deleted-object registry and
    /// resets the cursor.
    ///
    /// Records still in the redo tail are discarded.
    pub fn clear(&mut self, target: &mut T) {
        let at_save_point = !self.has_unsaved_changes();
        let cursor = self.cursor;

        for (index, record) in self.records.drain(..).enumerate() {
            let discard = cursor.is_none_or(|c| index > c);
            record.destroy(discard, target);
        }

        self.cursor = None;
        self.base = None;
        self.deleted.clear();
        // Clearing doesn't change the target; the save point survives only
        // if we were standing on it.
        self.saved = at_save_point.then_some(None);
        log::debug!("History: cleared");
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Undoes the current record and steps the cursor back.
    ///
    /// Returns `Ok(false)` without doing anything if there is nothing to
    /// undo. If the handler fails, the cursor stays put and the error is
    /// returned.
    pub fn undo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let Some(current) = self.cursor else {
            return Ok(false);
        };

        let record = &mut self.records[current];
        if let Err(e) = record.run_undo(target) {
            log::warn!("Undo of '{}' failed: {e}", record.label());
            return Err(e);
        }
        log::debug!("History: undid '{}'", record.label());

        self.cursor = current.checked_sub(1);
        Ok(true)
    }

    /// Steps the cursor forward and re-applies that record.
    ///
    /// Returns `Ok(false)` without doing anything if there is nothing to
    /// redo. If the handler fails, the cursor stays put and the error is
    /// returned.
    pub fn redo(&mut self, target: &mut T) -> EditActionResult<bool> {
        let next = self.next_index();
        let Some(record) = self.records.get_mut(next) else {
            return Ok(false);
        };

        if let Err(e) = record.run_redo(target) {
            log::warn!("Redo of '{}' failed: {e}", record.label());
            return Err(e);
        }
        log::debug!("History: redid '{}'", record.label());

        self.cursor = Some(next);
        Ok(true)
    }

    /// Undoes until `id` is the most recently applied record, or redoes
    /// up to it if it is in the redo tail.
    pub fn jump_to(&mut self, id: RecordId, target: &mut T) -> EditActionResult {
        let pos = self
            .position(id)
            .ok_or_else(|| EditActionError::TargetNotFound(format!("history record {id}")))?;

        while self.cursor.is_some_and(|c| c > pos) {
            self.undo(target)?;
        }
        while self.cursor.is_none_or(|c| c < pos) {
            self.redo(target)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns `true` if there is a record that can be undone.
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    /// Returns `true` if there is a record that can be redone.
    pub fn can_redo(&self) -> bool {
        self.next_index() < self.records.len()
    }

    /// Label of the record the next [`undo`](Self::undo) would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.cursor.map(|c| self.records[c].label())
    }

    /// Label of the record the next [`redo`](Self::redo) would apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.records.get(self.next_index()).map(|r| r.label())
    }

    /// Menu text helper: the undo label, or an empty string.
    pub fn last_undo_name(&self) -> String {
        self.undo_label().unwrap_or_default().to_owned()
    }

    /// Menu text helper: the redo label, or an empty string.
    pub fn last_redo_name(&self) -> String {
        self.redo_label().unwrap_or_default().to_owned()
    }

    /// Returns an iterator over undo labels, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.records[..self.next_index()]
            .iter()
            .rev()
            .map(|r| r.label())
    }

    /// Returns an iterator over redo labels, next-to-redo first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.records[self.next_index()..].iter().map(|r| r.label())
    }

    /// Index of the most recently applied record.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of applied records.
    pub fn undo_count(&self) -> usize {
        self.next_index()
    }

    /// Number of records in the redo tail.
    pub fn redo_count(&self) -> usize {
        self.records.len() - self.next_index()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in chronological order.
    pub fn records(&self) -> &[ActionRecord<T>] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&ActionRecord<T>> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut ActionRecord<T>> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    /// Chronological index of the record with this id.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Returns `true` if any record still references `handle`.
    pub fn references(&self, handle: ObjectHandle) -> bool {
        self.records.iter().any(|r| r.has_object(handle))
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Returns the maximum undo depth (`0` = unbounded).
    pub fn max_undo(&self) -> usize {
        self.config.max_undo
    }

    // ------------------------------------------------------------------
    // Object lifetime
    // ------------------------------------------------------------------

    /// Flags `handle` as destroyed. Call this when an object is destroyed
    /// for good, right after destroying it.
    pub fn mark_object_deleted(&mut self, handle: ObjectHandle) {
        self.deleted.mark(handle);
    }

    pub fn set_object_deleted(&mut self, handle: ObjectHandle, deleted: bool) {
        self.deleted.set(handle, deleted);
    }

    pub fn is_object_deleted(&self, handle: ObjectHandle) -> bool {
        self.deleted.is_deleted(handle)
    }

    pub fn deleted_objects(&self) -> &DeletedObjects {
        &self.deleted
    }

    // ------------------------------------------------------------------
    // Notifications and save tracking
    // ------------------------------------------------------------------

    /// Registers a callback fired after every append, e.g. to refresh menu
    /// labels or the window title. Replaces any previous callback.
    pub fn set_on_history_changed(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_history_changed = Some(Box::new(callback));
    }

    pub fn clear_on_history_changed(&mut self) {
        self.on_history_changed = None;
    }

    /// Records the current state as the saved state.
    pub fn mark_saved(&mut self) {
        self.saved = Some(self.current_marker());
    }

    /// Returns `true` if the current state differs from the last saved
    /// state, or the saved state can no longer be reached.
    pub fn has_unsaved_changes(&self) -> bool {
        self.saved != Some(self.current_marker())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn next_index(&self) -> usize {
        self.cursor.map_or(0, |c| c + 1)
    }

    fn is_past_cursor(&self, index: usize) -> bool {
        self.cursor.is_none_or(|c| index > c)
    }

    fn current_marker(&self) -> Option<RecordId> {
        match self.cursor {
            Some(c) => Some(self.records[c].id()),
            None => self.base,
        }
    }

    fn forget_save_point(&mut self, id: RecordId) {
        if self.saved == Some(Some(id)) {
            self.saved = None;
        }
    }

    fn truncate_redo(&mut self, target: &mut T) {
        let start = self.next_index();
        if start >= self.records.len() {
            return;
        }

        let tail: Vec<ActionRecord<T>> = self.records.drain(start..).collect();
        log::debug!("History: discarding {} redo record(s)", tail.len());
        for record in tail {
            self.forget_save_point(record.id());
            record.destroy(true, target);
        }
    }

    fn enforce_capacity(&mut self, target: &mut T) {
        if self.config.max_undo == 0 {
            return;
        }

        while self.records.len() > self.config.max_undo {
            let oldest = self.records.remove(0);
            // The base state becomes unreachable once its successor goes.
            if self.saved == Some(self.base) {
                self.saved = None;
            }
            self.base = Some(oldest.id());
            self.cursor = self.cursor.and_then(|c| c.checked_sub(1));
            log::debug!("History: dropped oldest '{}'", oldest.label());
            // Only reached right after a push, so the oldest record is applied.
            oldest.destroy(false, target);
        }
    }
}

impl<T: Editable> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<T: Editable> Drop for HistoryStack<T> {
    fn drop(&mut self) {
        let pending = self.redo_count();
        if pending > 0 {
            log::debug!("History dropped without clear; {pending} redo record(s) not discarded");
        }
    }
}

impl<T: Editable> fmt::Debug for HistoryStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStack")
            .field("len", &self.records.len())
            .field("cursor", &self.cursor)
            .field("max_undo", &self.config.max_undo)
            .field("deleted_objects", &self.deleted.len())
            .field("saved", &self.saved)
            .finish()
    }
}
