//! Error type shared by history operations and replay handlers.

use thiserror::Error;

use super::value::ValueKind;
use crate::handle::ObjectHandle;

/// Error returned by replay handlers and typed record access.
///
/// Handlers propagate these with `?`; [`HistoryStack`](super::HistoryStack)
/// hands them back to the caller of `undo`/`redo` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditActionError {
    /// The target object was not found.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// A handle captured in history no longer refers to a live object.
    #[error("stale or null handle: {0}")]
    InvalidHandle(ObjectHandle),
    /// The target is in an invalid state for this action.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A layer index beyond what the record was sized for.
    #[error("layer {index} out of range (record has {len} layers)")]
    LayerOutOfRange { index: usize, len: usize },
    /// No value stored for `handle` in `layer`.
    #[error("no value for {handle} in layer {layer}")]
    MissingValue { layer: usize, handle: ObjectHandle },
    /// A stored value had a different shape than the caller asked for.
    #[error("expected {expected} value, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;
