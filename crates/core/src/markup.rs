//! Page-keyed markup model
//!
//! Highlights and point annotations are stored per 1-based page number.
//! Insertion order within a page is the z-order. A page with no entries is
//! never stored, so an absent page and an empty page are indistinguishable.

use crate::geometry::{Rect, SurfacePoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier shared by highlights and annotations.
///
/// Generated using UUID v4, unique for the lifetime of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkupId(uuid::Uuid);

impl MarkupId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for MarkupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MarkupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Rectangular colored region on one page.
///
/// Colors are resolved when the highlight is committed and never re-derived,
/// so later palette changes do not recolor existing highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: MarkupId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill_color: String,
    pub border_color: String,
}

impl Highlight {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Single-point marker carrying free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointAnnotation {
    pub id: MarkupId,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub text: String,
}

impl PointAnnotation {
    pub fn position(&self) -> SurfacePoint {
        SurfacePoint::new(self.x, self.y)
    }
}

/// Immutable snapshot of all markup in a document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PersistedMarkup", into = "PersistedMarkup")]
pub struct MarkupStore {
    highlights_by_page: BTreeMap<u32, Vec<Highlight>>,
    annotations_by_page: BTreeMap<u32, Vec<PointAnnotation>>,
}

/// Wire shape; page keys are serialized as strings by serde_json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedMarkup {
    #[serde(default)]
    highlights_by_page: BTreeMap<u32, Vec<Highlight>>,
    #[serde(default)]
    annotations_by_page: BTreeMap<u32, Vec<PointAnnotation>>,
}

impl From<PersistedMarkup> for MarkupStore {
    fn from(raw: PersistedMarkup) -> Self {
        let mut store =
            Self { highlights_by_page: raw.highlights_by_page, annotations_by_page: raw.annotations_by_page };
        store.highlights_by_page.retain(|_, items| !items.is_empty());
        store.annotations_by_page.retain(|_, items| !items.is_empty());
        store
    }
}

impl From<MarkupStore> for PersistedMarkup {
    fn from(store: MarkupStore) -> Self {
        Self {
            highlights_by_page: store.highlights_by_page,
            annotations_by_page: store.annotations_by_page,
        }
    }
}

impl MarkupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlights on a page in z-order; empty when the page has none
    pub fn highlights(&self, page: u32) -> &[Highlight] {
        self.highlights_by_page.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Annotations on a page in z-order; empty when the page has none
    pub fn annotations(&self, page: u32) -> &[PointAnnotation] {
        self.annotations_by_page.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Produce the next snapshot with one page's collections replaced
    pub fn replace_page(
        &self,
        page: u32,
        highlights: Vec<Highlight>,
        annotations: Vec<PointAnnotation>,
    ) -> Self {
        let mut next = self.clone();
        if highlights.is_empty() {
            next.highlights_by_page.remove(&page);
        } else {
            next.highlights_by_page.insert(page, highlights);
        }
        if annotations.is_empty() {
            next.annotations_by_page.remove(&page);
        } else {
            next.annotations_by_page.insert(page, annotations);
        }
        next
    }

    /// Pages that carry any markup, ascending
    pub fn pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .highlights_by_page
            .keys()
            .chain(self.annotations_by_page.keys())
            .copied()
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    pub fn is_page_empty(&self, page: u32) -> bool {
        self.highlights(page).is_empty() && self.annotations(page).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights_by_page.is_empty() && self.annotations_by_page.is_empty()
    }

    pub fn highlight_count(&self) -> usize {
        self.highlights_by_page.values().map(Vec::len).sum()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations_by_page.values().map(Vec::len).sum()
    }

    pub fn find_highlight(&self, page: u32, id: MarkupId) -> Option<&Highlight> {
        self.highlights(page).iter().find(|h| h.id == id)
    }

    pub fn find_annotation(&self, page: u32, id: MarkupId) -> Option<&PointAnnotation> {
        self.annotations(page).iter().find(|a| a.id == id)
    }

    /// Topmost highlight on a page containing the point
    pub fn highlight_at(&self, page: u32, point: SurfacePoint) -> Option<&Highlight> {
        self.highlights(page).iter().rev().find(|h| h.rect().contains(point))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
