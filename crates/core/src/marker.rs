//! Point annotation editor lifecycle
//!
//! At most one annotation has an open editor at a time; every other annotation
//! is `SavedCollapsed`. The editor never touches the markup store directly.
//! Each transition returns a [`MarkerOutcome`] the engine applies.

use crate::markup::MarkupId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPhase {
    /// Created by double-click, text never saved
    UnsavedEditing,
    /// Rendered as a bare marker
    SavedCollapsed,
    /// Saved text shown read-only
    SavedViewing,
    /// Saved text being edited
    SavedEditing,
}

/// What the engine must do after an editor transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerOutcome {
    /// Nothing to apply
    None,
    /// Store the text on the annotation and close the editor
    Commit(String),
    /// Remove the never-saved annotation and close the editor
    Discard,
    /// Close the editor, keeping the annotation as it is
    Collapse,
    /// Remove the annotation and close the editor
    Delete,
}

/// Host-visible editor commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MarkerAction {
    Edit,
    SetDraft { text: String },
    Save,
    Cancel,
    Close,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerEditor {
    annotation_id: MarkupId,
    page: u32,
    phase: MarkerPhase,
    saved_text: String,
    draft: String,
}

impl MarkerEditor {
    /// Editor for an annotation that was just created
    pub fn open_new(annotation_id: MarkupId, page: u32) -> Self {
        Self {
            annotation_id,
            page,
            phase: MarkerPhase::UnsavedEditing,
            saved_text: String::new(),
            draft: String::new(),
        }
    }

    /// Editor for a collapsed marker the user clicked.
    ///
    /// A marker without text can only exist transiently, so it reopens in the
    /// unsaved editing phase.
    pub fn open_saved(annotation_id: MarkupId, page: u32, text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::open_new(annotation_id, page);
        }
        Self {
            annotation_id,
            page,
            phase: MarkerPhase::SavedViewing,
            saved_text: text.to_string(),
            draft: text.to_string(),
        }
    }

    pub fn annotation_id(&self) -> MarkupId {
        self.annotation_id
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn phase(&self) -> MarkerPhase {
        self.phase
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.phase, MarkerPhase::UnsavedEditing | MarkerPhase::SavedEditing)
    }

    pub fn is_unsaved(&self) -> bool {
        self.phase == MarkerPhase::UnsavedEditing
    }

    pub fn apply(&mut self, action: MarkerAction) -> MarkerOutcome {
        match action {
            MarkerAction::Edit => self.edit(),
            MarkerAction::SetDraft { text } => {
                self.set_draft(text);
                MarkerOutcome::None
            }
            MarkerAction::Save => self.save(),
            MarkerAction::Cancel => self.cancel(),
            MarkerAction::Close => self.close(),
            MarkerAction::Delete => MarkerOutcome::Delete,
        }
    }

    /// SavedViewing -> SavedEditing with the draft seeded from the saved text
    pub fn edit(&mut self) -> MarkerOutcome {
        if self.phase == MarkerPhase::SavedViewing {
            self.phase = MarkerPhase::SavedEditing;
            self.draft = self.saved_text.clone();
        }
        MarkerOutcome::None
    }

    /// Ignored unless the editor is in an editing phase
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if self.is_editing() {
            self.draft = text.into();
        }
    }

    /// Commit the trimmed draft. A blank draft behaves like cancel.
    pub fn save(&mut self) -> MarkerOutcome {
        if !self.is_editing() {
            return MarkerOutcome::None;
        }
        let text = self.draft.trim();
        if text.is_empty() {
            return self.close();
        }
        let text = text.to_string();
        self.saved_text = text.clone();
        self.phase = MarkerPhase::SavedCollapsed;
        MarkerOutcome::Commit(text)
    }

    /// Abandon the current edit; same as [`close`](Self::close)
    pub fn cancel(&mut self) -> MarkerOutcome {
        self.draft = self.saved_text.clone();
        self.close()
    }

    /// Close the editor; a never-saved annotation is discarded
    pub fn close(&mut self) -> MarkerOutcome {
        if self.is_unsaved() {
            MarkerOutcome::Discard
        } else {
            self.phase = MarkerPhase::SavedCollapsed;
            MarkerOutcome::Collapse
        }
    }
}
