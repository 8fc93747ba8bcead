//! Pointer interaction state machine
//!
//! The controller turns pointer events into commands. It never mutates markup
//! itself; the engine applies the returned [`Command`] to the store and undo
//! log in a single step.

use crate::geometry::{normalize_drag, Rect, SurfacePoint};
use crate::markup::{Highlight, MarkupId, PointAnnotation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Draw,
    Delete,
}

/// What lies under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Bare page surface
    Surface,
    Highlight(MarkupId),
    Marker(MarkupId),
    /// The open annotation editor, as reported by the host
    Editor,
}

/// Classify a surface-local point against the markup of one page.
///
/// Markers sit above highlights, and later entries sit above earlier ones.
pub fn hit_test(
    point: SurfacePoint,
    highlights: &[Highlight],
    annotations: &[PointAnnotation],
    marker_size: f32,
) -> Hit {
    if let Some(marker) = annotations
        .iter()
        .rev()
        .find(|a| Rect::new(a.x, a.y, marker_size, marker_size).contains(point))
    {
        return Hit::Marker(marker.id);
    }

    if let Some(highlight) = highlights.iter().rev().find(|h| h.rect().contains(point)) {
        return Hit::Highlight(highlight.id);
    }

    Hit::Surface
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { start: SurfacePoint, pending: Rect },
}

/// Instruction for the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    None,
    CommitHighlight(Rect),
    DeleteHighlight(MarkupId),
    CreateAnnotation(SurfacePoint),
    OpenMarker(MarkupId),
    ClickOutside,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    mode: InteractionMode,
    active_tag: Option<String>,
    drag: DragState,
    min_highlight_size: f32,
    marker_offset: f32,
}

impl InteractionController {
    pub fn new(min_highlight_size: f32, marker_offset: f32) -> Self {
        Self {
            mode: InteractionMode::Draw,
            active_tag: None,
            drag: DragState::Idle,
            min_highlight_size,
            marker_offset,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Live rectangle of the drag in progress
    pub fn pending(&self) -> Option<Rect> {
        match self.drag {
            DragState::Dragging { pending, .. } => Some(pending),
            DragState::Idle => None,
        }
    }

    /// Selecting any tag re-enables drawing
    pub fn select_tag(&mut self, tag: Option<String>) {
        self.active_tag = tag;
        self.mode = InteractionMode::Draw;
    }

    /// Entering delete mode clears the tag and abandons any drag
    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        if mode == InteractionMode::Delete {
            self.active_tag = None;
            self.abandon_drag();
        }
    }

    pub fn toggle_delete_mode(&mut self) -> InteractionMode {
        let next = match self.mode {
            InteractionMode::Draw => InteractionMode::Delete,
            InteractionMode::Delete => InteractionMode::Draw,
        };
        self.set_mode(next);
        next
    }

    pub fn abandon_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Start a drag on bare surface in draw mode. Returns whether a drag began.
    pub fn pointer_down(&mut self, hit: Hit, point: SurfacePoint) -> bool {
        if self.mode != InteractionMode::Draw || hit != Hit::Surface {
            return false;
        }
        self.drag = DragState::Dragging { start: point, pending: Rect::at(point) };
        true
    }

    pub fn pointer_move(&mut self, point: SurfacePoint) -> Option<Rect> {
        match &mut self.drag {
            DragState::Dragging { start, pending } => {
                *pending = normalize_drag(*start, point);
                Some(*pending)
            }
            DragState::Idle => None,
        }
    }

    /// Finish the drag. Returns a commit command when the rectangle is large
    /// enough on both axes; the controller is idle afterwards either way.
    pub fn pointer_up(&mut self, point: Option<SurfacePoint>) -> Command {
        if let Some(point) = point {
            self.pointer_move(point);
        }
        let pending = self.pending();
        self.drag = DragState::Idle;

        match pending {
            Some(rect) if rect.exceeds(self.min_highlight_size) => Command::CommitHighlight(rect),
            _ => Command::None,
        }
    }

    /// Leaving the surface ends the drag exactly like releasing the pointer
    pub fn pointer_leave(&mut self) -> Command {
        self.pointer_up(None)
    }

    pub fn click(&self, hit: Hit) -> Command {
        match (self.mode, hit) {
            (InteractionMode::Delete, Hit::Highlight(id)) => Command::DeleteHighlight(id),
            (_, Hit::Marker(id)) => Command::OpenMarker(id),
            (_, Hit::Editor) => Command::None,
            (_, Hit::Surface) | (_, Hit::Highlight(_)) => Command::ClickOutside,
        }
    }

    /// Double-click on bare surface creates an annotation in either mode
    pub fn double_click(&self, hit: Hit, point: SurfacePoint) -> Command {
        if hit != Hit::Surface {
            return Command::None;
        }
        Command::CreateAnnotation(point.offset(-self.marker_offset, -self.marker_offset))
    }
}
