use gantry_core::undo::{Editable, HistoryStack};

/// Actions that can be triggered from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Undo,
    Redo,
}

impl MenuAction {
    pub fn shortcut(&self) -> &'static str {
        match self {
            Self::Undo => "Ctrl+Z",
            Self::Redo => "Ctrl+Shift+Z",
        }
    }
}

/// One menu entry as a front end would draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub action: MenuAction,
    pub label: String,
    pub enabled: bool,
}

/// The Edit menu, labeled after the records the cursor points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditMenu {
    pub undo: MenuItem,
    pub redo: MenuItem,
}

impl EditMenu {
    pub fn from_history<T: Editable>(history: &HistoryStack<T>) -> Self {
        Self {
            undo: item(MenuAction::Undo, "Undo", history.undo_label()),
            redo: item(MenuAction::Redo, "Redo", history.redo_label()),
        }
    }

    pub fn items(&self) -> [&MenuItem; 2] {
        [&self.undo, &self.redo]
    }
}

fn item(action: MenuAction, verb: &str, label: Option<&str>) -> MenuItem {
    MenuItem {
        action,
        label: match label {
            Some(label) if !label.is_empty() => format!("{verb} {label}"),
            _ => verb.to_owned(),
        },
        enabled: label.is_some(),
    }
}
