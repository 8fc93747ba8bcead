//! Session undo log for highlight creation
//!
//! Only highlight creations are recorded. Entries are removed when undone or
//! when the highlight they name is removed by some other path, so the log
//! never points at a highlight known to be gone.

use crate::markup::MarkupId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoEntry {
    pub page: u32,
    pub highlight_id: MarkupId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, page: u32, highlight_id: MarkupId) {
        self.entries.push(UndoEntry { page, highlight_id });
    }

    /// Remove and return the most recent entry
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }

    /// Drop any entry naming this highlight on this page
    pub fn forget_highlight(&mut self, page: u32, highlight_id: MarkupId) {
        self.entries.retain(|e| !(e.page == page && e.highlight_id == highlight_id));
    }

    /// Drop every entry recorded against a page
    pub fn forget_page(&mut self, page: u32) {
        self.entries.retain(|e| e.page != page);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }
}
