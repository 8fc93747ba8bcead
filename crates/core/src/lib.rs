//! Scoremark Core Library
//!
//! Page-scoped highlight and point annotation overlay for paginated documents.

pub mod color;
pub mod config;
pub mod controller;
pub mod engine;
pub mod geometry;
pub mod marker;
pub mod markup;
pub mod navigator;
pub mod palette;
pub mod renderer;
pub mod undo;

pub use color::{resolve_color, resolve_color_with, Color, ColorError, ColorPair};
pub use config::{ConfigError, OverlayConfig};
pub use controller::{hit_test, Command, DragState, Hit, InteractionController, InteractionMode};
pub use engine::{
    MarkupUpdate, OverlayEngine, OverlayError, OverlayEvent, OverlayResult, PendingHighlight,
    PointerTarget, UpdateReason,
};
pub use geometry::{normalize_drag, Rect, SurfaceBounds, SurfacePoint};
pub use marker::{MarkerAction, MarkerEditor, MarkerOutcome, MarkerPhase};
pub use markup::{Highlight, MarkupId, MarkupStore, PointAnnotation};
pub use navigator::PageNavigator;
pub use palette::{Palette, TagDef, FALLBACK_COLOR};
pub use renderer::{
    DocumentHandle, DocumentRenderer, FixedRenderer, LoadTicket, RenderError, RenderGate,
    RenderTicket,
};
pub use undo::{UndoEntry, UndoLog};
