// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph source reading outlines with Skrifa and rasterizing them with Tiny-Skia.

#![allow(
    clippy::cast_possible_truncation,
    reason = "glyph bounds are clamped to small pixel extents before the casts"
)]

use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};
use tiny_skia::{FillRule, Mask, PathBuilder, Transform};

use crate::source::{GlyphSource, RasterGlyph, VerticalMetrics};

/// Glyphs larger than this on either axis are treated as blank.
const MAX_GLYPH_EXTENT: f32 = 4096.0;

/// A [`GlyphSource`] over an in-memory TrueType/OpenType file.
///
/// Owns the raw font bytes for as long as the font lives.
pub struct SkrifaSource {
    data: Vec<u8>,
    index: u32,
}

impl SkrifaSource {
    /// Parses `data` as a font file, using the font at `index` for collections.
    pub fn new(data: Vec<u8>, index: u32) -> Result<Self, skrifa::raw::ReadError> {
        FontRef::from_index(&data, index)?;
        Ok(Self { data, index })
    }

    /// The raw font file.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn font_ref(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(&self.data, self.index).ok()
    }
}

impl core::fmt::Debug for SkrifaSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SkrifaSource")
            .field("data", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

impl GlyphSource for SkrifaSource {
    fn vertical_metrics(&self, pixel_size: f32) -> VerticalMetrics {
        let Some(font) = self.font_ref() else {
            return VerticalMetrics::default();
        };
        let metrics = font.metrics(Size::new(pixel_size), LocationRef::default());
        VerticalMetrics {
            ascent: metrics.ascent,
            descent: metrics.descent,
            line_gap: metrics.leading,
        }
    }

    fn rasterize(&self, first: u32, count: usize, pixel_size: f32) -> Vec<Option<RasterGlyph>> {
        let Some(font) = self.font_ref() else {
            return vec![None; count];
        };
        let size = Size::new(pixel_size);
        let charmap = font.charmap();
        let advances = font.glyph_metrics(size, LocationRef::default());
        let outlines = font.outline_glyphs();
        let mut pen = MaskPen::default();

        (first..)
            .take(count)
            .map(|codepoint| {
                // Unmapped codepoints render as .notdef, like any other missing glyph.
                let glyph_id = charmap.map(codepoint).unwrap_or(GlyphId::NOTDEF);
                let advance = advances.advance_width(glyph_id).unwrap_or(0.0);
                let Some(outline) = outlines.get(glyph_id) else {
                    return Some(RasterGlyph::empty(advance));
                };
                let settings = DrawSettings::unhinted(size, LocationRef::default());
                if outline.draw(settings, &mut pen).is_err() {
                    pen.clear();
                    return Some(RasterGlyph::empty(advance));
                }
                Some(pen.rasterize(advance))
            })
            .collect()
    }
}

/// Collects a glyph outline into a Tiny-Skia path in y-down pixel space.
struct MaskPen {
    open_path: PathBuilder,
}

impl Default for MaskPen {
    fn default() -> Self {
        Self {
            open_path: PathBuilder::new(),
        }
    }
}

impl MaskPen {
    fn clear(&mut self) {
        self.open_path = PathBuilder::new();
    }

    fn rasterize(&mut self, advance: f32) -> RasterGlyph {
        let builder = core::mem::replace(&mut self.open_path, PathBuilder::new());
        let Some(path) = builder.finish() else {
            return RasterGlyph::empty(advance);
        };
        let bounds = path.bounds();
        if bounds.width() > MAX_GLYPH_EXTENT || bounds.height() > MAX_GLYPH_EXTENT {
            return RasterGlyph::empty(advance);
        }
        let left = bounds.left().floor() as i32;
        let top = bounds.top().floor() as i32;
        let right = bounds.right().ceil() as i32;
        let bottom = bounds.bottom().ceil() as i32;
        let (Ok(width), Ok(height)) = (u32::try_from(right - left), u32::try_from(bottom - top))
        else {
            return RasterGlyph::empty(advance);
        };
        let Some(mut mask) = Mask::new(width, height) else {
            return RasterGlyph::empty(advance);
        };
        mask.fill_path(
            &path,
            FillRule::Winding,
            true,
            Transform::from_translate(-left as f32, -top as f32),
        );
        RasterGlyph {
            advance,
            left,
            top,
            width,
            height,
            coverage: mask.data().to_vec(),
        }
    }
}

impl OutlinePen for MaskPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.open_path.move_to(x, -y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.open_path.line_to(x, -y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.open_path.quad_to(cx0, -cy0, x, -y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.open_path.cubic_to(cx0, -cy0, cx1, -cy1, x, -y);
    }

    fn close(&mut self) {
        self.open_path.close();
    }
}
