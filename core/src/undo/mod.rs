//! Undo/redo engine for editor actions.
//!
//! Every editor operation funnels through this module:
//!
//! - [`ActionRecord`] — one undoable action: a label, layered snapshot
//!   [`RecordData`] and a [`RecordHandler`] that replays it
//! - [`Value`] — the snapshot sum type stored per object handle
//! - [`HistoryStack`] — the ordered records plus a cursor, driving undo/redo
//! - [`DeletedObjects`] — flags for objects destroyed behind history's back
//!
//! # Recording an action
//!
//! Editor code captures the "before" state, mutates the live target once,
//! captures the "after" state and hands the record to the stack:
//!
//! ```ignore
//! let before = scene.camera_fov(camera)?;
//! scene.set_camera_fov(camera, fov)?;
//!
//! let record = history.append("Change camera FOV", &mut scene);
//! record.data_mut().resize(2);
//! record.data_mut().set(0, camera, before);
//! record.data_mut().set(1, camera, fov);
//! record.set_handler(SceneEdit::SetCameraFov);
//! ```
//!
//! # Discard
//!
//! A record destroyed while in the redo tail (by truncation, `remove` or
//! `clear`) has been undone and can never be redone. Its handler's
//! [`discard`](RecordHandler::discard) releases anything the "after" state
//! created that undo did not release, such as a newly spawned object.

mod error;
mod handler;
mod history;
mod record;
mod registry;
mod value;

pub use error::{EditActionError, EditActionResult};
pub use handler::{Editable, FnHandler, RecordHandler};
pub use history::{DEFAULT_MAX_UNDO, HistoryConfig, HistoryStack};
pub use record::{ActionRecord, Layer, RecordData, RecordId};
pub use registry::DeletedObjects;
pub use value::{FromValue, Value, ValueKind};
