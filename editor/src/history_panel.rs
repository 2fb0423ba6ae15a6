use std::fmt::Write as _;

use gantry_core::undo::{Editable, HistoryStack, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Redo,
    /// Marker between the redo and undo sections.
    Current,
    Undo,
}

/// One line of the history panel. Clicking a record row jumps to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub kind: RowKind,
    pub label: String,
    pub id: Option<RecordId>,
}

/// Rows of the undo/redo panel, top to bottom.
///
/// Redo entries come first with the next-to-redo closest to the marker, then
/// the undo entries, most recent first.
pub fn history_rows<T: Editable>(history: &HistoryStack<T>) -> Vec<HistoryRow> {
    let split = history.undo_count();
    let records = history.records();
    let mut rows = Vec::with_capacity(records.len() + 1);

    for record in records[split..].iter().rev() {
        rows.push(HistoryRow {
            kind: RowKind::Redo,
            label: record.label().to_owned(),
            id: Some(record.id()),
        });
    }
    rows.push(HistoryRow {
        kind: RowKind::Current,
        label: "current".into(),
        id: None,
    });
    for record in records[..split].iter().rev() {
        rows.push(HistoryRow {
            kind: RowKind::Undo,
            label: record.label().to_owned(),
            id: Some(record.id()),
        });
    }
    rows
}

/// Plain-text rendering of the panel, used by the headless front end.
pub fn render_history<T: Editable>(history: &HistoryStack<T>) -> String {
    let mut out = format!(
        "Undo: {} | Redo: {}\n",
        history.undo_count(),
        history.redo_count()
    );
    for row in history_rows(history) {
        let _ = match row.kind {
            RowKind::Redo => writeln!(out, "REDO {}", row.label),
            RowKind::Current => writeln!(out, "▸ {}", row.label),
            RowKind::Undo => writeln!(out, "UNDO {}", row.label),
        };
    }
    out
}
