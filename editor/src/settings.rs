use std::path::Path;

use gantry_core::undo::{DEFAULT_MAX_UNDO, HistoryConfig};
use serde::Deserialize;

use crate::error::EditorError;

/// Editor configuration loaded from `editor.toml`.
///
/// Every section and key is optional:
///
/// ```toml
/// [session]
/// title = "Level 3"
///
/// [history]
/// max_undo = 250   # 0 = unbounded
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub session: SessionSettings,
    pub history: HistorySettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Window title; an unsaved session shows it with a trailing `*`.
    pub title: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            title: "Untitled".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub max_undo: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

impl EditorSettings {
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig::new(self.history.max_undo)
    }
}

/// Load editor settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<EditorSettings, EditorError> {
    let content = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| EditorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load editor settings, falling back to defaults if the file is missing or
/// malformed.
pub fn load_or_default(path: &Path) -> EditorSettings {
    match load_settings(path) {
        Ok(settings) => {
            log::info!(
                "Loaded settings: '{}' (max undo {})",
                settings.session.title,
                settings.history.max_undo
            );
            settings
        }
        Err(e) => {
            log::warn!("No settings file ({e}), using defaults");
            EditorSettings::default()
        }
    }
}
