//! # Gantry Core
//!
//! Undo/redo history engine shared by every editing tool of the Gantry
//! level editor.

pub mod handle;
pub mod math;
pub mod undo;

pub use handle::{HandleAllocator, ObjectHandle};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
