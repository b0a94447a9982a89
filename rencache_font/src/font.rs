// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(
    clippy::cast_possible_truncation,
    reason = "line metrics are small pixel values"
)]

use std::path::Path;

use hashbrown::HashMap;

use crate::block_index;
use crate::error::{AtlasError, FontLoadError};
use crate::glyph_set::{AtlasConfig, GlyphPage, GlyphQuad, GlyphSet};
use crate::skrifa_source::SkrifaSource;
use crate::source::GlyphSource;

const TAB: u32 = '\t' as u32;
const NEWLINE: u32 = '\n' as u32;

/// A font at one pixel size, with lazily baked glyph sets.
pub struct Font {
    source: Box<dyn GlyphSource>,
    pixel_size: f32,
    baseline: i32,
    height: i32,
    atlas: AtlasConfig,
    sets: HashMap<u32, GlyphSet>,
}

impl Font {
    /// Reads and parses the font file at `path`.
    pub fn load(
        path: impl AsRef<Path>,
        pixel_size: f32,
        atlas: AtlasConfig,
    ) -> Result<Self, FontLoadError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_data(data, pixel_size, atlas)
    }

    /// Parses an in-memory font file.
    pub fn from_data(
        data: Vec<u8>,
        pixel_size: f32,
        atlas: AtlasConfig,
    ) -> Result<Self, FontLoadError> {
        let source = SkrifaSource::new(data, 0).map_err(|err| FontLoadError::Malformed {
            reason: err.to_string(),
        })?;
        Ok(Self::from_source(Box::new(source), pixel_size, atlas))
    }

    /// Wraps an arbitrary glyph source.
    ///
    /// The first glyph set is baked immediately so the tab and newline glyphs exist.
    pub fn from_source(source: Box<dyn GlyphSource>, pixel_size: f32, atlas: AtlasConfig) -> Self {
        let metrics = source.vertical_metrics(pixel_size);
        let mut font = Self {
            source,
            pixel_size,
            baseline: (metrics.ascent + 0.5) as i32,
            height: (metrics.ascent - metrics.descent + metrics.line_gap + 0.5) as i32,
            atlas,
            sets: HashMap::new(),
        };
        let set = font.glyph_set(0);
        // Whitespace controls advance but never draw.
        for codepoint in [TAB, NEWLINE] {
            let glyph = set.glyph_mut(codepoint);
            glyph.x1 = glyph.x0;
        }
        font
    }

    /// Size in pixels per em.
    #[inline]
    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    /// Height of one line of text in pixels.
    #[inline]
    pub fn line_height(&self) -> i32 {
        self.height
    }

    /// Returns the glyph set containing `codepoint`, baking it on first use.
    pub fn glyph_set(&mut self, codepoint: u32) -> &mut GlyphSet {
        let block = block_index(codepoint);
        let Self {
            source,
            pixel_size,
            baseline,
            atlas,
            sets,
            ..
        } = self;
        sets.entry(block)
            .or_insert_with(|| GlyphSet::bake(source.as_ref(), block, *pixel_size, *baseline, atlas))
    }

    /// Like [`glyph_set`](Self::glyph_set), but reports a set that failed to bake.
    pub fn try_glyph_set(&mut self, codepoint: u32) -> Result<&GlyphSet, AtlasError> {
        let set = self.glyph_set(codepoint);
        match set.error() {
            Some(err) => Err(err.clone()),
            None => Ok(set),
        }
    }

    /// Number of glyph sets baked so far.
    #[inline]
    pub fn baked_sets(&self) -> usize {
        self.sets.len()
    }

    /// Advance of the tab glyph.
    pub fn tab_width(&mut self) -> i32 {
        self.glyph_set(TAB).glyph(TAB).advance
    }

    /// Overrides the advance of the tab glyph.
    pub fn set_tab_width(&mut self, width: i32) {
        self.glyph_set(TAB).glyph_mut(TAB).advance = width;
    }

    /// Width of `text` in pixels.
    pub fn text_width(&mut self, text: &str) -> i32 {
        text.chars()
            .map(|ch| {
                let codepoint = u32::from(ch);
                self.glyph_set(codepoint).glyph(codepoint).advance
            })
            .fold(0, i32::saturating_add)
    }

    /// Lays out `text` with the top-left of the line at `(x, y)`.
    ///
    /// `blit` is called for every glyph that has a bitmap in a baked page. Returns the
    /// pen position after the last glyph.
    pub fn draw_text(
        &mut self,
        text: &str,
        mut x: i32,
        y: i32,
        mut blit: impl FnMut(&GlyphPage, GlyphQuad),
    ) -> i32 {
        for ch in text.chars() {
            let codepoint = u32::from(ch);
            let set = self.glyph_set(codepoint);
            let glyph = *set.glyph(codepoint);
            if let Some(page) = set.page().filter(|_| !glyph.is_blank()) {
                let quad = GlyphQuad {
                    src_x: i32::from(glyph.x0),
                    src_y: i32::from(glyph.y0),
                    width: glyph.width() as i32,
                    height: glyph.height() as i32,
                    dst_x: x.saturating_add(glyph.x_offset),
                    dst_y: y.saturating_add(glyph.y_offset),
                };
                blit(page, quad);
            }
            x = x.saturating_add(glyph.advance);
        }
        x
    }
}

impl core::fmt::Debug for Font {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Font")
            .field("source", &self.source)
            .field("pixel_size", &self.pixel_size)
            .field("height", &self.height)
            .field("sets", &self.sets.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RasterGlyph, VerticalMetrics};

    /// ASCII glyphs are 3x5 bars advancing 4px; everything else advances 9px.
    #[derive(Debug)]
    struct Bars;

    impl GlyphSource for Bars {
        fn vertical_metrics(&self, _pixel_size: f32) -> VerticalMetrics {
            VerticalMetrics {
                ascent: 5.6,
                descent: -2.2,
                line_gap: 1.0,
            }
        }

        fn rasterize(&self, first: u32, count: usize, _pixel_size: f32) -> Vec<Option<RasterGlyph>> {
            (first..)
                .take(count)
                .map(|cp| {
                    Some(if cp < 0x80 {
                        RasterGlyph {
                            advance: 4.0,
                            left: 0,
                            top: -5,
                            width: 3,
                            height: 5,
                            coverage: vec![200; 15],
                        }
                    } else {
                        RasterGlyph::empty(9.0)
                    })
                })
                .collect()
        }
    }

    fn bars() -> Font {
        Font::from_source(Box::new(Bars), 10.0, AtlasConfig::default())
    }

    #[test]
    fn font_metrics_are_rounded() {
        let font = bars();
        assert_eq!(font.line_height(), 9);
        assert_eq!(font.baseline, 6);
        assert_eq!(font.baked_sets(), 1);
    }

    #[test]
    fn font_text_width() {
        let mut font = bars();
        assert_eq!(font.text_width(""), 0);
        assert_eq!(font.text_width("a"), 4);
        assert_eq!(font.text_width("ab\u{e9}"), 17);
    }

    #[test]
    fn font_bakes_sets_lazily() {
        let mut font = bars();
        font.text_width("plain ascii");
        assert_eq!(font.baked_sets(), 1);
        font.text_width("\u{3042}");
        assert_eq!(font.baked_sets(), 2);
        font.text_width("\u{3044}");
        assert_eq!(font.baked_sets(), 2);
    }

    #[test]
    fn font_tab_width_survives_refetch() {
        let mut font = bars();
        assert_eq!(font.tab_width(), 4);
        font.set_tab_width(32);
        font.text_width("\u{1234}");
        assert_eq!(font.tab_width(), 32);
        assert_eq!(font.text_width("\t\t"), 64);
    }

    #[test]
    fn font_draw_text_skips_blank_glyphs() {
        let mut font = bars();
        let mut quads = Vec::new();
        let end = font.draw_text("a\tb", 10, 20, |_, quad| quads.push(quad));
        assert_eq!(end, 22);
        assert_eq!(quads.len(), 2);
        assert_eq!((quads[0].dst_x, quads[0].dst_y), (10, 21));
        assert_eq!((quads[1].dst_x, quads[1].dst_y), (18, 21));
        assert_eq!((quads[0].width, quads[0].height), (3, 5));
    }

    #[test]
    fn font_from_data_rejects_garbage() {
        let err = Font::from_data(vec![0; 64], 12.0, AtlasConfig::default()).unwrap_err();
        assert!(matches!(err, FontLoadError::Malformed { .. }), "{err}");
    }

    #[test]
    fn font_load_missing_file() {
        let err = Font::load("/nonexistent/rencache/font.ttf", 12.0, AtlasConfig::default())
            .unwrap_err();
        assert!(matches!(err, FontLoadError::Io { .. }), "{err}");
    }
}
