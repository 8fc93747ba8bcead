//! Overlay engine
//!
//! Owns the markup snapshot, undo log, page cursor, pointer controller, open
//! marker editor and render gate for one viewer. Every operation that changes
//! markup returns a [`MarkupUpdate`] carrying the complete new snapshot, which
//! the host persists verbatim.

use crate::color::{resolve_color_with, ColorPair};
use crate::config::{ConfigError, OverlayConfig};
use crate::controller::{hit_test, Command, Hit, InteractionController, InteractionMode};
use crate::geometry::{Rect, SurfaceBounds, SurfacePoint};
use crate::marker::{MarkerAction, MarkerEditor, MarkerOutcome, MarkerPhase};
use crate::markup::{Highlight, MarkupId, MarkupStore, PointAnnotation};
use crate::navigator::PageNavigator;
use crate::palette::Palette;
use crate::renderer::{
    DocumentHandle, DocumentRenderer, LoadTicket, RenderError, RenderGate, RenderTicket,
};
use crate::undo::UndoLog;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no document has been loaded")]
    NoDocument,
    #[error("document load was superseded by a newer load")]
    Superseded,
}

pub type OverlayResult<T> = Result<T, OverlayError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateReason {
    HighlightAdded,
    HighlightDeleted,
    AnnotationAdded,
    AnnotationUpdated,
    AnnotationDeleted,
    PageCleared,
    Undo,
}

/// Combined markup emitted to the host after every change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkupUpdate {
    pub reason: UpdateReason,
    /// Page the change applied to
    pub page: u32,
    pub markup: MarkupStore,
}

/// Where the host saw the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    #[default]
    Surface,
    /// Over the open annotation editor
    Editor,
}

/// Drag preview with the colors it would commit with
#[derive(Debug, Clone, PartialEq)]
pub struct PendingHighlight {
    pub rect: Rect,
    pub colors: ColorPair,
}

/// Host input, in client coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayEvent {
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        target: PointerTarget,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp {
        x: f32,
        y: f32,
    },
    PointerLeave,
    Click {
        x: f32,
        y: f32,
        #[serde(default)]
        target: PointerTarget,
    },
    DoubleClick {
        x: f32,
        y: f32,
    },
    ClickOutside,
    SelectTag {
        tag: Option<String>,
    },
    SetMode {
        mode: InteractionMode,
    },
    ToggleDeleteMode,
    NextPage,
    PrevPage,
    SetPage {
        page: u32,
    },
    Undo,
    ClearPage,
    MarkerEdit,
    MarkerDraft {
        text: String,
    },
    MarkerSave,
    MarkerCancel,
    MarkerClose,
    MarkerDelete,
}

#[derive(Debug)]
pub struct OverlayEngine {
    store: MarkupStore,
    undo: UndoLog,
    navigator: PageNavigator,
    controller: InteractionController,
    open_marker: Option<MarkerEditor>,
    gate: RenderGate,
    surface: Option<SurfaceBounds>,
    palette: Palette,
    config: OverlayConfig,
}

impl Default for OverlayEngine {
    fn default() -> Self {
        Self::new(Palette::default(), OverlayConfig::default())
    }
}

impl OverlayEngine {
    pub fn new(palette: Palette, config: OverlayConfig) -> Self {
        Self {
            store: MarkupStore::new(),
            undo: UndoLog::new(),
            navigator: PageNavigator::default(),
            controller: InteractionController::new(config.min_highlight_size, config.marker_offset),
            open_marker: None,
            gate: RenderGate::new(),
            surface: None,
            palette,
            config,
        }
    }

    pub fn try_new(palette: Palette, config: OverlayConfig) -> OverlayResult<Self> {
        config.validate()?;
        Ok(Self::new(palette, config))
    }

    // ---- state accessors ----

    pub fn markup(&self) -> &MarkupStore {
        &self.store
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    pub fn page(&self) -> u32 {
        self.navigator.page()
    }

    pub fn page_count(&self) -> u32 {
        self.navigator.page_count()
    }

    pub fn page_label(&self) -> String {
        self.navigator.label()
    }

    pub fn can_go_prev(&self) -> bool {
        self.navigator.can_go_prev()
    }

    pub fn can_go_next(&self) -> bool {
        self.navigator.can_go_next()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_clear_page(&self) -> bool {
        !self.store.is_page_empty(self.page())
    }

    pub fn mode(&self) -> InteractionMode {
        self.controller.mode()
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.controller.active_tag()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn open_marker(&self) -> Option<&MarkerEditor> {
        self.open_marker.as_ref()
    }

    pub fn surface(&self) -> Option<SurfaceBounds> {
        self.surface
    }

    pub fn document(&self) -> Option<DocumentHandle> {
        self.gate.document()
    }

    /// Pointer input is accepted only once the active page has been drawn
    pub fn is_interactive(&self) -> bool {
        self.surface.is_some() && self.gate.is_ready(self.page())
    }

    /// Live drag rectangle and the colors a commit would use right now
    pub fn pending_highlight(&self) -> Option<PendingHighlight> {
        let rect = self.controller.pending()?;
        Some(PendingHighlight { rect, colors: self.current_colors() })
    }

    /// Lifecycle phase of an annotation on the active page
    pub fn marker_phase(&self, id: MarkupId) -> Option<MarkerPhase> {
        match &self.open_marker {
            Some(editor) if editor.annotation_id() == id => Some(editor.phase()),
            _ => self.store.find_annotation(self.page(), id).map(|_| MarkerPhase::SavedCollapsed),
        }
    }

    // ---- document lifecycle ----

    /// Begin loading a document. Interaction stops until a page is rendered.
    pub fn load_document(&mut self, document: DocumentHandle) -> (LoadTicket, Option<MarkupUpdate>) {
        let discarded = self.leave_page();
        self.surface = None;
        (self.gate.begin_load(document), discarded)
    }

    /// Apply a page-count result. Returns `Ok(None)` for a superseded ticket.
    ///
    /// A new document starts on page 1 with an empty undo log.
    pub fn on_document_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<u32, RenderError>,
    ) -> OverlayResult<Option<u32>> {
        match result {
            Ok(page_count) => {
                if !self.gate.finish_load(ticket) {
                    return Ok(None);
                }
                self.navigator.on_document_changed(page_count);
                self.undo.clear();
                tracing::debug!(
                    document = ticket.document.raw(),
                    page_count = self.page_count(),
                    "document loaded"
                );
                Ok(Some(self.page_count()))
            }
            Err(err) => {
                if !self.gate.fail_load(ticket) {
                    return Ok(None);
                }
                tracing::error!(?err, document = ticket.document.raw(), "document load failed");
                Err(err.into())
            }
        }
    }

    /// Ticket for rendering the active page, once a document is loaded.
    ///
    /// The surface is invalidated until the render lands, so a drag in
    /// progress is abandoned.
    pub fn request_render(&mut self) -> Option<RenderTicket> {
        self.controller.abandon_drag();
        self.surface = None;
        self.gate.begin_render(self.page())
    }

    /// Apply a render result. Returns whether it made the overlay interactive.
    pub fn on_page_rendered(
        &mut self,
        ticket: RenderTicket,
        result: Result<SurfaceBounds, RenderError>,
    ) -> OverlayResult<bool> {
        if !self.gate.is_current_render(ticket) {
            tracing::warn!(page = ticket.page, "ignoring stale page render");
            return Ok(false);
        }
        match result {
            Ok(bounds) => {
                if !self.gate.finish_render(ticket) || ticket.page != self.page() {
                    return Ok(false);
                }
                self.surface = Some(bounds);
                Ok(true)
            }
            Err(err) => {
                tracing::error!(?err, page = ticket.page, "page render failed");
                Err(err.into())
            }
        }
    }

    /// Load a document and render its first page synchronously
    pub fn load_with<R: DocumentRenderer>(
        &mut self,
        renderer: &mut R,
        document: DocumentHandle,
    ) -> OverlayResult<u32> {
        let (ticket, _) = self.load_document(document);
        let result = renderer.page_count(document);
        let page_count = self.on_document_loaded(ticket, result)?.ok_or(OverlayError::Superseded)?;
        self.render_with(renderer)?;
        Ok(page_count)
    }

    /// Render the active page synchronously
    pub fn render_with<R: DocumentRenderer>(&mut self, renderer: &mut R) -> OverlayResult<()> {
        let ticket = self.request_render().ok_or(OverlayError::NoDocument)?;
        let result = renderer.render_page(ticket.document, ticket.page);
        self.on_page_rendered(ticket, result)?;
        Ok(())
    }

    /// Replace all markup with a persisted snapshot. The undo log starts empty.
    pub fn hydrate(&mut self, markup: MarkupStore) {
        self.controller.abandon_drag();
        self.open_marker = None;
        self.store = markup;
        self.undo.clear();
    }

    /// Tear down transient state when the viewer goes away
    pub fn unmount(&mut self) -> Option<MarkupUpdate> {
        let discarded = self.leave_page();
        self.surface = None;
        discarded
    }

    // ---- palette and mode ----

    pub fn select_tag(&mut self, tag: Option<String>) {
        if let Some(id) = tag.as_deref() {
            if !self.palette.contains(id) {
                tracing::warn!(tag = id, "unknown tag selected, using fallback color");
            }
        }
        self.controller.select_tag(tag);
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.controller.set_mode(mode);
    }

    pub fn toggle_delete_mode(&mut self) -> InteractionMode {
        self.controller.toggle_delete_mode()
    }

    // ---- navigation ----

    pub fn next_page(&mut self) -> Option<MarkupUpdate> {
        self.navigate(|nav| nav.next())
    }

    pub fn prev_page(&mut self) -> Option<MarkupUpdate> {
        self.navigate(|nav| nav.prev())
    }

    pub fn go_to(&mut self, delta: i64) -> Option<MarkupUpdate> {
        self.navigate(|nav| nav.go_to(delta))
    }

    pub fn set_page(&mut self, page: u32) -> Option<MarkupUpdate> {
        self.navigate(|nav| nav.set_page(page))
    }

    /// Navigation never edits markup, except that leaving the page discards a
    /// never-saved annotation.
    fn navigate(&mut self, step: impl FnOnce(&mut PageNavigator) -> u32) -> Option<MarkupUpdate> {
        let discarded = self.leave_page();
        let before = self.page();
        let after = step(&mut self.navigator);
        if after != before {
            self.surface = None;
            tracing::debug!(from = before, to = after, "page changed");
        }
        discarded
    }

    fn leave_page(&mut self) -> Option<MarkupUpdate> {
        self.controller.abandon_drag();
        self.close_marker()
    }

    // ---- pointer input ----

    fn locate(&self, client: SurfacePoint, target: PointerTarget) -> Option<(SurfacePoint, Hit)> {
        if !self.is_interactive() {
            return None;
        }
        let surface = self.surface?;
        let local = surface.to_local(client);
        let hit = match target {
            PointerTarget::Editor => Hit::Editor,
            PointerTarget::Surface => hit_test(
                local,
                self.store.highlights(self.page()),
                self.store.annotations(self.page()),
                self.config.marker_size,
            ),
        };
        Some((local, hit))
    }

    pub fn pointer_down(&mut self, client: SurfacePoint, target: PointerTarget) -> bool {
        let Some((local, hit)) = self.locate(client, target) else {
            return false;
        };
        self.controller.pointer_down(hit, local)
    }

    pub fn pointer_move(&mut self, client: SurfacePoint) -> Option<Rect> {
        let surface = self.surface.filter(|_| self.is_interactive())?;
        self.controller.pointer_move(surface.to_local(client))
    }

    pub fn pointer_up(&mut self, client: SurfacePoint) -> Option<MarkupUpdate> {
        let Some(surface) = self.surface.filter(|_| self.is_interactive()) else {
            self.controller.abandon_drag();
            return None;
        };
        let command = self.controller.pointer_up(Some(surface.to_local(client)));
        self.execute(command)
    }

    pub fn pointer_leave(&mut self) -> Option<MarkupUpdate> {
        if !self.is_interactive() {
            self.controller.abandon_drag();
            return None;
        }
        let command = self.controller.pointer_leave();
        self.execute(command)
    }

    pub fn click(&mut self, client: SurfacePoint, target: PointerTarget) -> Option<MarkupUpdate> {
        let (_, hit) = self.locate(client, target)?;
        let command = self.controller.click(hit);
        self.execute(command)
    }

    pub fn double_click(&mut self, client: SurfacePoint) -> Option<MarkupUpdate> {
        let (local, hit) = self.locate(client, PointerTarget::Surface)?;
        let command = self.controller.double_click(hit, local);
        self.execute(command)
    }

    /// Click that landed outside every marker and editor
    pub fn click_outside(&mut self) -> Option<MarkupUpdate> {
        self.close_marker()
    }

    fn execute(&mut self, command: Command) -> Option<MarkupUpdate> {
        match command {
            Command::None => None,
            Command::CommitHighlight(rect) => self.commit_highlight(rect),
            Command::DeleteHighlight(id) => self.delete_highlight(id),
            Command::CreateAnnotation(at) => self.create_annotation(at),
            Command::OpenMarker(id) => self.toggle_marker(id),
            Command::ClickOutside => self.close_marker(),
        }
    }

    // ---- highlight edits ----

    fn current_colors(&self) -> ColorPair {
        let base = self.palette.base_color(self.controller.active_tag());
        resolve_color_with(base, self.config.fill_opacity, self.config.border_opacity)
    }

    /// Append a highlight to the active page and record it for undo
    fn commit_highlight(&mut self, rect: Rect) -> Option<MarkupUpdate> {
        let page = self.page();
        let colors = self.current_colors();
        let highlight = Highlight {
            id: MarkupId::new(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            fill_color: colors.fill,
            border_color: colors.border,
        };
        let id = highlight.id;

        let mut highlights = self.store.highlights(page).to_vec();
        highlights.push(highlight);
        self.replace_page(page, highlights, self.store.annotations(page).to_vec());
        self.undo.record(page, id);

        tracing::debug!(page, %id, width = rect.width, height = rect.height, "highlight committed");
        Some(self.update(UpdateReason::HighlightAdded, page))
    }

    /// Remove a highlight from the active page along with its undo entry
    pub fn delete_highlight(&mut self, id: MarkupId) -> Option<MarkupUpdate> {
        let page = self.page();
        self.store.find_highlight(page, id)?;

        let highlights = self.store.highlights(page).iter().filter(|h| h.id != id).cloned().collect();
        self.replace_page(page, highlights, self.store.annotations(page).to_vec());
        self.undo.forget_highlight(page, id);

        tracing::debug!(page, %id, "highlight deleted");
        Some(self.update(UpdateReason::HighlightDeleted, page))
    }

    /// Remove the most recently created highlight, wherever it lives
    pub fn undo(&mut self) -> Option<MarkupUpdate> {
        let entry = self.undo.pop()?;
        if self.store.find_highlight(entry.page, entry.highlight_id).is_none() {
            tracing::warn!(
                page = entry.page,
                id = %entry.highlight_id,
                "undo entry references a missing highlight"
            );
            return None;
        }

        let highlights = self
            .store
            .highlights(entry.page)
            .iter()
            .filter(|h| h.id != entry.highlight_id)
            .cloned()
            .collect();
        self.replace_page(entry.page, highlights, self.store.annotations(entry.page).to_vec());

        tracing::debug!(page = entry.page, id = %entry.highlight_id, "highlight undone");
        Some(self.update(UpdateReason::Undo, entry.page))
    }

    /// Remove every highlight and annotation on the active page
    pub fn clear_page(&mut self) -> Option<MarkupUpdate> {
        let page = self.page();
        self.controller.abandon_drag();
        if self.open_marker.as_ref().is_some_and(|editor| editor.page() == page) {
            self.open_marker = None;
        }
        if self.store.is_page_empty(page) {
            return None;
        }

        self.replace_page(page, Vec::new(), Vec::new());
        self.undo.forget_page(page);

        tracing::debug!(page, "page cleared");
        Some(self.update(UpdateReason::PageCleared, page))
    }

    // ---- annotation edits ----

    /// Insert an empty annotation and open its editor
    fn create_annotation(&mut self, at: SurfacePoint) -> Option<MarkupUpdate> {
        self.close_marker();
        let page = self.page();
        let annotation = PointAnnotation { id: MarkupId::new(), x: at.x, y: at.y, text: String::new() };
        let id = annotation.id;

        let mut annotations = self.store.annotations(page).to_vec();
        annotations.push(annotation);
        self.replace_page(page, self.store.highlights(page).to_vec(), annotations);
        self.open_marker = Some(MarkerEditor::open_new(id, page));

        tracing::debug!(page, %id, "annotation created");
        Some(self.update(UpdateReason::AnnotationAdded, page))
    }

    /// Clicking a marker opens it; clicking the open marker closes it
    fn toggle_marker(&mut self, id: MarkupId) -> Option<MarkupUpdate> {
        if self.open_marker.as_ref().is_some_and(|editor| editor.annotation_id() == id) {
            return self.close_marker();
        }
        let discarded = self.close_marker();
        let page = self.page();
        if let Some(annotation) = self.store.find_annotation(page, id) {
            self.open_marker = Some(MarkerEditor::open_saved(id, page, &annotation.text));
        }
        discarded
    }

    /// Close the open editor, discarding a never-saved annotation
    fn close_marker(&mut self) -> Option<MarkupUpdate> {
        let mut editor = self.open_marker.take()?;
        let outcome = editor.close();
        self.apply_marker_outcome(&editor, outcome)
    }

    /// Route an editor command to the open marker
    pub fn marker_action(&mut self, action: MarkerAction) -> Option<MarkupUpdate> {
        let mut editor = self.open_marker.take()?;
        let outcome = editor.apply(action);
        if outcome == MarkerOutcome::None {
            self.open_marker = Some(editor);
            return None;
        }
        self.apply_marker_outcome(&editor, outcome)
    }

    fn apply_marker_outcome(
        &mut self,
        editor: &MarkerEditor,
        outcome: MarkerOutcome,
    ) -> Option<MarkupUpdate> {
        let (page, id) = (editor.page(), editor.annotation_id());
        match outcome {
            MarkerOutcome::None | MarkerOutcome::Collapse => None,
            MarkerOutcome::Commit(text) => self.update_annotation_text(page, id, text),
            MarkerOutcome::Discard | MarkerOutcome::Delete => self.remove_annotation(page, id),
        }
    }

    fn update_annotation_text(
        &mut self,
        page: u32,
        id: MarkupId,
        text: String,
    ) -> Option<MarkupUpdate> {
        self.store.find_annotation(page, id)?;
        let annotations = self
            .store
            .annotations(page)
            .iter()
            .map(|a| if a.id == id { PointAnnotation { text: text.clone(), ..a.clone() } } else { a.clone() })
            .collect();
        self.replace_page(page, self.store.highlights(page).to_vec(), annotations);

        tracing::debug!(page, %id, "annotation saved");
        Some(self.update(UpdateReason::AnnotationUpdated, page))
    }

    fn remove_annotation(&mut self, page: u32, id: MarkupId) -> Option<MarkupUpdate> {
        self.store.find_annotation(page, id)?;
        let annotations = self.store.annotations(page).iter().filter(|a| a.id != id).cloned().collect();
        self.replace_page(page, self.store.highlights(page).to_vec(), annotations);

        tracing::debug!(page, %id, "annotation removed");
        Some(self.update(UpdateReason::AnnotationDeleted, page))
    }

    /// Delete an annotation on the active page, closing its editor if open
    pub fn delete_annotation(&mut self, id: MarkupId) -> Option<MarkupUpdate> {
        if self.open_marker.as_ref().is_some_and(|editor| editor.annotation_id() == id) {
            self.open_marker = None;
        }
        self.remove_annotation(self.page(), id)
    }

    fn replace_page(&mut self, page: u32, highlights: Vec<Highlight>, annotations: Vec<PointAnnotation>) {
        self.store = self.store.replace_page(page, highlights, annotations);
    }

    fn update(&self, reason: UpdateReason, page: u32) -> MarkupUpdate {
        MarkupUpdate { reason, page, markup: self.store.clone() }
    }

    // ---- event dispatch ----

    pub fn apply(&mut self, event: OverlayEvent) -> Option<MarkupUpdate> {
        match event {
            OverlayEvent::PointerDown { x, y, target } => {
                self.pointer_down(SurfacePoint::new(x, y), target);
                None
            }
            OverlayEvent::PointerMove { x, y } => {
                self.pointer_move(SurfacePoint::new(x, y));
                None
            }
            OverlayEvent::PointerUp { x, y } => self.pointer_up(SurfacePoint::new(x, y)),
            OverlayEvent::PointerLeave => self.pointer_leave(),
            OverlayEvent::Click { x, y, target } => self.click(SurfacePoint::new(x, y), target),
            OverlayEvent::DoubleClick { x, y } => self.double_click(SurfacePoint::new(x, y)),
            OverlayEvent::ClickOutside => self.click_outside(),
            OverlayEvent::SelectTag { tag } => {
                self.select_tag(tag);
                None
            }
            OverlayEvent::SetMode { mode } => {
                self.set_mode(mode);
                None
            }
            OverlayEvent::ToggleDeleteMode => {
                self.toggle_delete_mode();
                None
            }
            OverlayEvent::NextPage => self.next_page(),
            OverlayEvent::PrevPage => self.prev_page(),
            OverlayEvent::SetPage { page } => self.set_page(page),
            OverlayEvent::Undo => self.undo(),
            OverlayEvent::ClearPage => self.clear_page(),
            OverlayEvent::MarkerEdit => self.marker_action(MarkerAction::Edit),
            OverlayEvent::MarkerDraft { text } => self.marker_action(MarkerAction::SetDraft { text }),
            OverlayEvent::MarkerSave => self.marker_action(MarkerAction::Save),
            OverlayEvent::MarkerCancel => self.marker_action(MarkerAction::Cancel),
            OverlayEvent::MarkerClose => self.marker_action(MarkerAction::Close),
            OverlayEvent::MarkerDelete => self.marker_action(MarkerAction::Delete),
        }
    }
}
