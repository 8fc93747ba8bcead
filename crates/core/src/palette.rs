//! Tag palette supplied by the host

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Base color used when no tag is active
pub const FALLBACK_COLOR: Color = Color::rgb(0xFF, 0xD7, 0x47);

/// A selectable highlight category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDef {
    pub id: String,
    pub label: String,
    pub base: Color,
}

impl TagDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>, base: Color) -> Self {
        Self { id: id.into(), label: label.into(), base }
    }
}

/// Ordered lookup table of tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    tags: Vec<TagDef>,
    #[serde(default = "fallback_color")]
    fallback: Color,
}

fn fallback_color() -> Color {
    FALLBACK_COLOR
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            tags: vec![
                TagDef::new("difficult", "Difficult", Color::rgb(0xFF, 0x3A, 0x3A)),
                TagDef::new("review", "Review", Color::rgb(0xFF, 0xD7, 0x47)),
                TagDef::new("mastered", "Mastered", Color::rgb(0x65, 0xDC, 0x65)),
                TagDef::new("practice", "Practice", Color::rgb(0x65, 0x77, 0xFF)),
                TagDef::new("focus", "Focus", Color::rgb(0xB1, 0x7A, 0xFE)),
            ],
            fallback: FALLBACK_COLOR,
        }
    }
}

impl Palette {
    pub fn new(tags: Vec<TagDef>) -> Self {
        Self { tags, fallback: FALLBACK_COLOR }
    }

    pub fn with_fallback(mut self, fallback: Color) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn tags(&self) -> &[TagDef] {
        &self.tags
    }

    pub fn get(&self, id: &str) -> Option<&TagDef> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn fallback(&self) -> Color {
        self.fallback
    }

    /// Base color for an optional tag id, falling back when absent or unknown
    pub fn base_color(&self, tag: Option<&str>) -> Color {
        tag.and_then(|id| self.get(id)).map(|tag| tag.base).unwrap_or(self.fallback)
    }
}
