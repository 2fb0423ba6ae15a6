use std::path::PathBuf;

use gantry_core::ObjectHandle;
use gantry_core::undo::EditActionError;
use thiserror::Error;

/// Errors surfaced by editor verbs and settings loading.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Recording or replaying history failed.
    #[error(transparent)]
    Edit(#[from] EditActionError),
    /// The object exists but lacks the component the verb edits.
    #[error("{object} has no {component} component")]
    MissingComponent {
        object: ObjectHandle,
        component: &'static str,
    },
    /// A multi-object verb was given no objects.
    #[error("no objects selected")]
    EmptySelection,
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
