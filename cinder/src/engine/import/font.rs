use crate::engine::assets::{
    Font, FontBitmap, FontRenderMode, GlyphInfo, PixelFormat, Resource, ResourceData, Texture,
};
use crate::engine::import::{
    AssetImporter, AuxiliaryResource, FontImportOptions, ImportError, ImportOptions,
    ImportOutput, IoErr, OptionsMismatchErr, resource_name,
};
use etagere::{AtlasAllocator, size2};
use fontdue::FontSettings;
use itertools::Itertools;
use log::{debug, warn};
use snafu::ResultExt;
use std::fs;
use std::path::Path;
use ttf_parser::Face;

/// Coverage at or above this becomes an opaque texel in raster mode.
const RASTER_THRESHOLD: u8 = 128;
const GLYPH_PADDING: u32 = 1;

/// Slot a glyph was placed in by the [`AtlasPacker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasSlot {
    pub page: u32,
    pub x: u32,
    pub y: u32,
}

/// Packs rectangles into square pages. Only the newest page is ever filled: once a rectangle
/// doesn't fit, that page is closed and a new one is started.
pub struct AtlasPacker {
    page_size: u32,
    padding: u32,
    pages: Vec<AtlasAllocator>,
}

impl AtlasPacker {
    pub fn new(page_size: u32, padding: u32) -> Self {
        Self {
            page_size,
            padding,
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Returns `None` if the rectangle is larger than a whole page.
    pub fn place(&mut self, width: u32, height: u32) -> Option<AtlasSlot> {
        let padded_w = width + self.padding;
        let padded_h = height + self.padding;
        if padded_w > self.page_size || padded_h > self.page_size {
            return None;
        }
        let size = size2(padded_w as i32, padded_h as i32);

        if let Some(page) = self.pages.last_mut()
            && let Some(alloc) = page.allocate(size)
        {
            return Some(AtlasSlot {
                page: self.pages.len() as u32 - 1,
                x: alloc.rectangle.min.x as u32,
                y: alloc.rectangle.min.y as u32,
            });
        }

        let mut page = AtlasAllocator::new(size2(self.page_size as i32, self.page_size as i32));
        let alloc = page.allocate(size)?;
        self.pages.push(page);

        Some(AtlasSlot {
            page: self.pages.len() as u32 - 1,
            x: alloc.rectangle.min.x as u32,
            y: alloc.rectangle.min.y as u32,
        })
    }
}

/// Rasterizes TrueType and OpenType fonts into bitmap pages, one set per requested size.
///
/// The font resource references its pages by id. Every page is returned as an auxiliary
/// resource with the suffix `<size>_texpage_<page>`.
pub struct FontImporter;

impl AssetImporter for FontImporter {
    fn name(&self) -> &'static str {
        "font"
    }

    fn extensions(&self) -> &[&'static str] {
        &["ttf", "otf"]
    }

    fn default_options(&self, _path: &Path) -> ImportOptions {
        ImportOptions::Font(FontImportOptions::default())
    }

    fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportOutput, ImportError> {
        let ImportOptions::Font(options) = options else {
            return OptionsMismatchErr {
                path,
                given: options.kind(),
            }
            .fail();
        };

        let bytes = fs::read(path).context(IoErr { path })?;
        let face = Face::parse(&bytes, 0).map_err(|e| ImportError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let family = family_name(&face).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let font = fontdue::Font::from_bytes(bytes.as_slice(), FontSettings::default()).map_err(
            |reason| ImportError::Font {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            },
        )?;

        let name = resource_name(path);
        let sizes: Vec<u32> = options.sizes.iter().copied().sorted_unstable().dedup().collect();
        let mut auxiliary = Vec::new();
        let mut bitmaps = Vec::with_capacity(sizes.len());

        for size in sizes {
            let (mut bitmap, pages) = rasterize_size(path, &font, size, options)?;

            for (page_idx, pixels) in pages.into_iter().enumerate() {
                let suffix = format!("{size}_texpage_{page_idx}");
                let texture = Texture::load_pixels(
                    pixels,
                    options.page_size,
                    options.page_size,
                    PixelFormat::R8,
                );
                let page = Resource::new(
                    format!("{name}_{suffix}"),
                    ResourceData::Texture(texture),
                );
                bitmap.pages.push(page.id);
                auxiliary.push(AuxiliaryResource {
                    suffix,
                    resource: page,
                });
            }

            debug!(
                "[Import] Rasterized {family} at {size}pt: {} glyphs on {} pages",
                bitmap.glyphs.len(),
                bitmap.pages.len()
            );
            bitmaps.push(bitmap);
        }

        Ok(ImportOutput {
            primary: Resource::new(name, ResourceData::Font(Font { family, bitmaps })),
            auxiliary,
        })
    }
}

fn family_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|n| n.name_id == ttf_parser::name_id::FAMILY && n.is_unicode())
        .find_map(|n| n.to_string())
}

fn rasterize_size(
    path: &Path,
    font: &fontdue::Font,
    size: u32,
    options: &FontImportOptions,
) -> Result<(FontBitmap, Vec<Vec<u8>>), ImportError> {
    let px = size as f32 * options.dpi as f32 / 72.0;
    let page_size = options.page_size as usize;

    let (ascent, descent, line_height) = match font.horizontal_line_metrics(px) {
        Some(m) => (m.ascent, m.descent, m.new_line_size),
        None => (px, 0.0, px),
    };

    let mut packer = AtlasPacker::new(options.page_size, GLYPH_PADDING);
    let mut pages: Vec<Vec<u8>> = Vec::new();
    let mut glyphs = Vec::new();

    let chars = options
        .char_ranges
        .iter()
        .flat_map(|&(start, end)| start..=end)
        .filter_map(char::from_u32);

    for ch in chars {
        if font.lookup_glyph_index(ch) == 0 && !ch.is_whitespace() {
            continue;
        }

        let (metrics, coverage) = font.rasterize(ch, px);
        let width = metrics.width as u32;
        let height = metrics.height as u32;

        let mut glyph = GlyphInfo {
            ch,
            page: 0,
            x: 0,
            y: 0,
            width,
            height,
            x_offset: metrics.xmin,
            y_offset: metrics.ymin + metrics.height as i32,
            advance: metrics.advance_width,
        };

        if width > 0 && height > 0 {
            let Some(slot) = packer.place(width, height) else {
                warn!(
                    "[Import] Glyph {ch:?} of {} ({width}x{height}) does not fit a {page_size} page",
                    path.display()
                );
                return Err(ImportError::Font {
                    path: path.to_path_buf(),
                    reason: format!("glyph {ch:?} is larger than a bitmap page"),
                });
            };

            while pages.len() <= slot.page as usize {
                pages.push(vec![0; page_size * page_size]);
            }
            let page = &mut pages[slot.page as usize];

            for row in 0..metrics.height {
                let src = &coverage[row * metrics.width..(row + 1) * metrics.width];
                let start = (slot.y as usize + row) * page_size + slot.x as usize;
                let dst = &mut page[start..start + metrics.width];
                match options.render_mode {
                    FontRenderMode::Smooth => dst.copy_from_slice(src),
                    FontRenderMode::Raster => {
                        for (d, &s) in dst.iter_mut().zip(src) {
                            *d = if s >= RASTER_THRESHOLD { u8::MAX } else { 0 };
                        }
                    }
                }
            }

            glyph.page = slot.page;
            glyph.x = slot.x;
            glyph.y = slot.y;
        }

        glyphs.push(glyph);
    }

    Ok((
        FontBitmap {
            size,
            line_height,
            ascent,
            descent,
            glyphs,
            pages: Vec::new(),
        },
        pages,
    ))
}
