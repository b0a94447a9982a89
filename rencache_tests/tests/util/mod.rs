// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures: a deterministic glyph source and a surface that records calls.

use rencache::rencache_font::{GlyphPage, GlyphQuad, GlyphSource, RasterGlyph, VerticalMetrics};
use rencache::{AtlasConfig, CacheConfig, Color, Font, FontId, FontStore, Rect, RenderContext, RenderSurface};

/// Advance of every glyph in the basic Latin block.
pub(crate) const ADVANCE: i32 = 5;
/// Advance of glyphs in the oversized block.
pub(crate) const WIDE_ADVANCE: i32 = 12;
/// First codepoint of the block that [`FakeGlyphSource::with_oversize_block`] inflates.
pub(crate) const WIDE_BLOCK_START: u32 = 0x4e00;
/// Line height of fonts built from [`FakeGlyphSource`].
pub(crate) const LINE_HEIGHT: i32 = 10;

/// Printable ASCII draws a 3x6 bar; every other codepoint is blank.
#[derive(Debug, Default)]
pub(crate) struct FakeGlyphSource {
    oversize_block: Option<u32>,
}

impl FakeGlyphSource {
    /// A source whose block starting at [`WIDE_BLOCK_START`] cannot fit a small atlas.
    pub(crate) fn with_oversize_block() -> Self {
        Self {
            oversize_block: Some(WIDE_BLOCK_START >> 8),
        }
    }
}

impl GlyphSource for FakeGlyphSource {
    fn vertical_metrics(&self, _pixel_size: f32) -> VerticalMetrics {
        VerticalMetrics {
            ascent: 8.0,
            descent: -2.0,
            line_gap: 0.0,
        }
    }

    fn rasterize(&self, first: u32, count: usize, _pixel_size: f32) -> Vec<Option<RasterGlyph>> {
        let oversize = self.oversize_block == Some(first >> 8);
        (first..)
            .take(count)
            .map(|cp| {
                Some(if oversize {
                    RasterGlyph {
                        advance: WIDE_ADVANCE as f32,
                        left: 0,
                        top: -8,
                        width: 12,
                        height: 12,
                        coverage: vec![255; 144],
                    }
                } else if (0x21..0x7f).contains(&cp) {
                    RasterGlyph {
                        advance: ADVANCE as f32,
                        left: 1,
                        top: -6,
                        width: 3,
                        height: 6,
                        coverage: vec![255; 18],
                    }
                } else {
                    RasterGlyph::empty(ADVANCE as f32)
                })
            })
            .collect()
    }
}

/// An atlas small enough that the oversized block fails to bake.
pub(crate) fn small_atlas() -> AtlasConfig {
    AtlasConfig {
        initial_page_size: 16,
        max_page_size: 64,
        padding: 1,
    }
}

/// A store holding one font built from `source`.
pub(crate) fn font_store(source: FakeGlyphSource) -> (FontStore, FontId) {
    let mut store = FontStore::new(small_atlas());
    let font = Font::from_source(Box::new(source), 12.0, small_atlas());
    let id = store.insert(font);
    (store, id)
}

/// One call made on a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SurfaceCall {
    SetClip(Rect),
    FillRect(Rect, Color),
    Glyph(GlyphQuad, Color),
    Present(Vec<Rect>),
}

/// A surface that draws nothing and remembers every call.
#[derive(Debug)]
pub(crate) struct RecordingSurface {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub(crate) fn fills(&self) -> Vec<(Rect, Color)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::FillRect(rect, color) => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn glyphs(&self) -> Vec<GlyphQuad> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Glyph(quad, _) => Some(*quad),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn presents(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Present(_)))
            .count()
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_clip_rect(&mut self, rect: Rect) {
        self.calls.push(SurfaceCall::SetClip(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(SurfaceCall::FillRect(rect, color));
    }

    fn draw_glyph(&mut self, _page: &GlyphPage, quad: GlyphQuad, color: Color) {
        self.calls.push(SurfaceCall::Glyph(quad, color));
    }

    fn present(&mut self, dirty: &[Rect]) {
        self.calls.push(SurfaceCall::Present(dirty.to_vec()));
    }
}

/// A 200x100 recording context with 32px tiles.
pub(crate) fn context() -> RenderContext<RecordingSurface> {
    context_with(CacheConfig {
        tile_size: 32,
        command_capacity: 4096,
    })
}

pub(crate) fn context_with(config: CacheConfig) -> RenderContext<RecordingSurface> {
    RenderContext::new(RecordingSurface::new(200, 100), config)
}

/// Like [`context`], owning a font built from `source`.
pub(crate) fn context_with_font(source: FakeGlyphSource) -> (RenderContext<RecordingSurface>, FontId) {
    let (store, id) = font_store(source);
    let config = CacheConfig {
        tile_size: 32,
        command_capacity: 4096,
    };
    (
        RenderContext::with_fonts(RecordingSurface::new(200, 100), config, store),
        id,
    )
}

/// Runs one frame that only draws `rect`, and returns the dirty rectangles.
pub(crate) fn frame_with_rect(cx: &mut RenderContext<RecordingSurface>, rect: Rect) -> Vec<Rect> {
    cx.begin_frame();
    cx.draw_rect(rect, Color::rgb(200, 40, 40));
    cx.end_frame();
    cx.dirty_rects().to_vec()
}

/// Whether `point` lies inside one of `rects`.
pub(crate) fn covered(rects: &[Rect], x: i32, y: i32) -> bool {
    rects
        .iter()
        .any(|r| x >= r.x && x < r.right() && y >= r.y && y < r.bottom())
}

/// A TrueType file installed on this machine, if one can be found.
///
/// `RENCACHE_TEST_FONT` takes precedence over the usual system locations.
pub(crate) fn system_font() -> Option<std::path::PathBuf> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    std::env::var_os("RENCACHE_TEST_FONT")
        .map(std::path::PathBuf::from)
        .into_iter()
        .chain(CANDIDATES.iter().map(std::path::PathBuf::from))
        .find(|path| path.is_file())
}
