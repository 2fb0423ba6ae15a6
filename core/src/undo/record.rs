//! Action records: one undoable unit of editor history.
//!
//! An [`ActionRecord`] pairs a label and a replay handler with
//! [`RecordData`], an ordered list of layers. Each layer maps object handles
//! to snapshot [`Value`]s. By convention layer 0 holds the "before" state and
//! layer 1 the "after" state; actions that need more (an edited index, a
//! previous parent) add further layers.

use std::collections::BTreeMap;
use std::fmt;

use super::error::{EditActionError, EditActionResult};
use super::handler::{Editable, RecordHandler};
use super::value::{FromValue, Value};
use crate::handle::ObjectHandle;

/// Identity of a record within the stack that owns it.
///
/// Ids are assigned on append/push and never reused by the same stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub(crate) u64);

impl RecordId {
    /// Id carried by a record that has not been pushed yet.
    pub const UNASSIGNED: RecordId = RecordId(0);
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One layer of snapshot values, keyed by object handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    name: String,
    entries: BTreeMap<ObjectHandle, Value>,
}

impl Layer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&Value> {
        self.entries.get(&handle)
    }

    pub fn insert(&mut self, handle: ObjectHandle, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(handle, value.into())
    }

    pub fn remove(&mut self, handle: ObjectHandle) -> Option<Value> {
        self.entries.remove(&handle)
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Entries in handle order. The `NULL` entry, if any, sorts last.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &Value)> {
        self.entries.iter().map(|(h, v)| (*h, v))
    }

    /// Object handles with an entry, excluding the `NULL` key.
    pub fn handles(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.entries.keys().copied().filter(|h| !h.is_null())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns `true` if `handle` is a key or is embedded in any value.
    pub fn has_object(&self, handle: ObjectHandle) -> bool {
        if handle.is_null() {
            return false;
        }
        self.entries.contains_key(&handle) || self.entries.values().any(|v| v.references(handle))
    }
}

/// Snapshot storage of a record.
///
/// Layer access by index follows the "size before use" contract: callers
/// [`resize`](Self::resize) (or [`add_layer`](Self::add_layer)) to the
/// number of layers the action needs before writing. The panicking
/// accessors fail loudly on an index past that; the `try_`/`get_as`
/// variants report [`EditActionError::LayerOutOfRange`] instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordData {
    layers: Vec<Layer>,
}

impl RecordData {
    /// Grows or shrinks to exactly `len` layers. New layers are unnamed.
    pub fn resize(&mut self, len: usize) {
        self.layers.resize_with(len, Layer::default);
    }

    /// Appends a named layer and returns its index.
    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        self.layers.push(Layer::named(name));
        self.layers.len() - 1
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// # Panics
    ///
    /// If `index` is past the sized layer count.
    pub fn layer(&self, index: usize) -> &Layer {
        let len = self.layers.len();
        self.layers
            .get(index)
            .unwrap_or_else(|| panic!("layer {index} out of range (record has {len} layers)"))
    }

    /// # Panics
    ///
    /// If `index` is past the sized layer count.
    pub fn layer_mut(&mut self, index: usize) -> &mut Layer {
        let len = self.layers.len();
        self.layers
            .get_mut(index)
            .unwrap_or_else(|| panic!("layer {index} out of range (record has {len} layers)"))
    }

    pub fn try_layer(&self, index: usize) -> EditActionResult<&Layer> {
        self.layers.get(index).ok_or(EditActionError::LayerOutOfRange {
            index,
            len: self.layers.len(),
        })
    }

    pub fn try_layer_mut(&mut self, index: usize) -> EditActionResult<&mut Layer> {
        let len = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or(EditActionError::LayerOutOfRange { index, len })
    }

    /// First layer with the given name.
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Stores `value` for `handle` in `layer`, replacing any previous value.
    ///
    /// # Panics
    ///
    /// If `layer` is past the sized layer count.
    pub fn set(&mut self, layer: usize, handle: ObjectHandle, value: impl Into<Value>) {
        self.layer_mut(layer).insert(handle, value);
    }

    /// Stores an action-wide value under the `NULL` key.
    ///
    /// # Panics
    ///
    /// If `layer` is past the sized layer count.
    pub fn set_global(&mut self, layer: usize, value: impl Into<Value>) {
        self.set(layer, ObjectHandle::NULL, value);
    }

    /// # Panics
    ///
    /// If `layer` is past the sized layer count.
    pub fn get(&self, layer: usize, handle: ObjectHandle) -> Option<&Value> {
        self.layer(layer).get(handle)
    }

    /// The action-wide value of `layer`, if any.
    ///
    /// # Panics
    ///
    /// If `layer` is past the sized layer count.
    pub fn global(&self, layer: usize) -> Option<&Value> {
        self.get(layer, ObjectHandle::NULL)
    }

    /// Reads the value for `handle` in `layer` as `V`.
    pub fn get_as<V: FromValue>(&self, layer: usize, handle: ObjectHandle) -> EditActionResult<V> {
        let value = self
            .try_layer(layer)?
            .get(handle)
            .ok_or(EditActionError::MissingValue { layer, handle })?;
        V::from_value(value).ok_or(EditActionError::TypeMismatch {
            expected: V::KIND,
            found: value.kind(),
        })
    }

    /// Returns `true` if any layer references `handle`, as a key or inside
    /// a handle-carrying value. `NULL` is never reported.
    pub fn has_object(&self, handle: ObjectHandle) -> bool {
        self.layers.iter().any(|l| l.has_object(handle))
    }

    /// Empties every layer, keeping the layer count.
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
    }
}

/// One undoable editor operation.
///
/// Created by [`HistoryStack::append`](super::HistoryStack::append) (or
/// [`ActionRecord::new`] followed by
/// [`HistoryStack::push`](super::HistoryStack::push)), populated by the
/// caller and owned by the stack from then on.
pub struct ActionRecord<T: Editable> {
    pub(crate) id: RecordId,
    label: String,
    data: RecordData,
    handler: Option<Box<dyn RecordHandler<T>>>,
}

impl<T: Editable> ActionRecord<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: RecordId::UNASSIGNED,
            label: label.into(),
            data: RecordData::default(),
            handler: None,
        }
    }

    /// Builder form of [`set_handler`](Self::set_handler).
    pub fn with_handler(mut self, handler: impl RecordHandler<T> + 'static) -> Self {
        self.set_handler(handler);
        self
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Menu text for this action, e.g. `"Rename object"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut RecordData {
        &mut self.data
    }

    pub fn set_handler(&mut self, handler: impl RecordHandler<T> + 'static) {
        self.handler = Some(Box::new(handler));
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Returns `true` if any snapshot in this record refers to `handle`.
    ///
    /// Callers check this before destroying an object for good, to find
    /// history that still depends on it.
    pub fn has_object(&self, handle: ObjectHandle) -> bool {
        self.data.has_object(handle)
    }

    pub(crate) fn run_undo(&mut self, target: &mut T) -> EditActionResult {
        match &mut self.handler {
            Some(handler) => handler.undo(&self.data, target),
            None => Ok(()),
        }
    }

    pub(crate) fn run_redo(&mut self, target: &mut T) -> EditActionResult {
        match &mut self.handler {
            Some(handler) => handler.redo(&self.data, target),
            None => Ok(()),
        }
    }

    /// Destroys the record. `discard` is set when the record sits past the
    /// cursor, in which case the handler releases the "after" state first.
    pub(crate) fn destroy(mut self, discard: bool, target: &mut T) {
        if discard && let Some(handler) = &mut self.handler {
            log::debug!("Discarding '{}' ({})", self.label, self.id);
            if let Err(e) = handler.discard(&self.data, target) {
                log::warn!("Discard of '{}' failed: {e}", self.label);
            }
        }
        self.data.clear();
    }
}

impl<T: Editable> fmt::Debug for ActionRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRecord")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("layers", &self.data.layer_count())
            .field("handler", &self.handler)
            .finish()
    }
}
