//! # Gantry Editor
//!
//! Headless scene-editing session on top of the `gantry-core` history
//! engine: a small scene model, the edit verbs that record into history,
//! and the Edit menu / history panel models a front end draws.

pub mod edit;
pub mod error;
pub mod history_panel;
pub mod menu;
pub mod scene;
pub mod session;
pub mod settings;

pub use error::EditorError;
pub use session::EditorSession;
pub use settings::EditorSettings;
