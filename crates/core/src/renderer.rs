//! Document renderer seam and stale-completion gate
//!
//! Rasterizing pages is the host's job. The engine only needs the page count
//! and the pixel bounds of the surface a page was drawn onto. Loads and renders
//! may complete out of order, so each request carries a generation-stamped
//! ticket and only the newest ticket is honored.

use crate::geometry::SurfaceBounds;

/// Opaque identifier for a document known to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("document {0} could not be opened: {1}")]
    Open(u64, String),
    #[error("page {page} is outside 1..={page_count}")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("renderer failure: {0}")]
    Backend(String),
}

/// Host-provided page renderer
pub trait DocumentRenderer {
    /// Total number of pages in the document
    fn page_count(&mut self, document: DocumentHandle) -> Result<u32, RenderError>;

    /// Draw a 1-based page and report the surface it was drawn onto
    fn render_page(
        &mut self,
        document: DocumentHandle,
        page: u32,
    ) -> Result<SurfaceBounds, RenderError>;
}

/// Renderer that reports a fixed page count and surface size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRenderer {
    pub page_count: u32,
    pub bounds: SurfaceBounds,
}

impl FixedRenderer {
    pub fn new(page_count: u32, bounds: SurfaceBounds) -> Self {
        Self { page_count, bounds }
    }
}

impl DocumentRenderer for FixedRenderer {
    fn page_count(&mut self, _document: DocumentHandle) -> Result<u32, RenderError> {
        Ok(self.page_count)
    }

    fn render_page(
        &mut self,
        _document: DocumentHandle,
        page: u32,
    ) -> Result<SurfaceBounds, RenderError> {
        let page_count = self.page_count.max(1);
        if page == 0 || page > page_count {
            return Err(RenderError::PageOutOfRange { page, page_count });
        }
        Ok(self.bounds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub document: DocumentHandle,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    pub document: DocumentHandle,
    pub page: u32,
    pub generation: u64,
    pub sequence: u64,
}

/// Tracks which load and render completions are still current
#[derive(Debug, Default)]
pub struct RenderGate {
    generation: u64,
    sequence: u64,
    document: Option<DocumentHandle>,
    loaded: bool,
    rendered_page: Option<u32>,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading a document, superseding every outstanding ticket
    pub fn begin_load(&mut self, document: DocumentHandle) -> LoadTicket {
        self.generation += 1;
        self.document = Some(document);
        self.loaded = false;
        self.rendered_page = None;
        LoadTicket { document, generation: self.generation }
    }

    /// Accept a load completion if its ticket is current
    pub fn finish_load(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current_load(ticket) {
            tracing::warn!(
                document = ticket.document.raw(),
                generation = ticket.generation,
                current = self.generation,
                "ignoring stale document load"
            );
            return false;
        }
        self.loaded = true;
        true
    }

    /// Mark a load as failed; the overlay stays non-interactive
    pub fn fail_load(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current_load(ticket) {
            return false;
        }
        self.loaded = false;
        self.rendered_page = None;
        true
    }

    fn is_current_load(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation && self.document == Some(ticket.document)
    }

    /// Request a page render; `None` until a document has loaded
    pub fn begin_render(&mut self, page: u32) -> Option<RenderTicket> {
        let document = self.document.filter(|_| self.loaded)?;
        self.sequence += 1;
        self.rendered_page = None;
        Some(RenderTicket { document, page, generation: self.generation, sequence: self.sequence })
    }

    /// Accept a render completion if it is the newest request of the current load
    pub fn finish_render(&mut self, ticket: RenderTicket) -> bool {
        if !self.is_current_render(ticket) {
            tracing::warn!(
                page = ticket.page,
                sequence = ticket.sequence,
                current = self.sequence,
                "ignoring stale page render"
            );
            return false;
        }
        self.rendered_page = Some(ticket.page);
        true
    }

    pub fn is_current_render(&self, ticket: RenderTicket) -> bool {
        self.loaded
            && ticket.generation == self.generation
            && ticket.sequence == self.sequence
            && self.document == Some(ticket.document)
    }

    pub fn document(&self) -> Option<DocumentHandle> {
        self.document
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True once the given page of the current document has been drawn
    pub fn is_ready(&self, page: u32) -> bool {
        self.loaded && self.rendered_page == Some(page)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
