use crate::engine::assets::ResourceId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontRenderMode {
    /// Anti-aliased coverage.
    Smooth,
    /// Coverage thresholded to fully opaque or fully transparent texels.
    #[default]
    Raster,
}

/// Placement of one glyph inside a bitmap page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphInfo {
    pub ch: char,
    pub page: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub advance: f32,
}

/// All glyphs of a font rendered at one size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontBitmap {
    pub size: u32,
    pub line_height: f32,
    pub ascent: f32,
    pub descent: f32,
    pub glyphs: Vec<GlyphInfo>,
    /// Texture resources holding the pages, indexed by [`GlyphInfo::page`].
    pub pages: Vec<ResourceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub bitmaps: Vec<FontBitmap>,
}

impl Font {
    pub fn bitmap(&self, size: u32) -> Option<&FontBitmap> {
        self.bitmaps.iter().find(|b| b.size == size)
    }
}

impl FontBitmap {
    pub fn glyph(&self, ch: char) -> Option<&GlyphInfo> {
        self.glyphs.iter().find(|g| g.ch == ch)
    }
}
