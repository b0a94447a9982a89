// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Baking 256-codepoint glyph sets into texture pages.

#![allow(
    clippy::cast_possible_truncation,
    reason = "page coordinates are bounded by `AtlasConfig::max_page_size`"
)]

use core::fmt::{Debug, Formatter};

use tiny_skia::{IntSize, Pixmap};

use crate::GLYPHS_PER_SET;
use crate::error::AtlasError;
use crate::source::{GlyphSource, RasterGlyph};

/// Sizing of glyph-set pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Side length of the first page tried for a glyph set.
    pub initial_page_size: u32,
    /// Largest side length a page may grow to before baking gives up.
    pub max_page_size: u32,
    /// Empty pixels kept between glyphs and around the page border.
    pub padding: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            initial_page_size: 128,
            max_page_size: 4096,
            padding: 1,
        }
    }
}

/// Placement and metrics of one glyph inside its page.
///
/// `x0..x1` and `y0..y1` select the glyph bitmap in the page. `x_offset` and
/// `y_offset` position that bitmap relative to the pen, where the pen's y is the
/// top of the line box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BakedGlyph {
    /// Left edge in the page.
    pub x0: u16,
    /// Top edge in the page.
    pub y0: u16,
    /// Right edge (exclusive) in the page.
    pub x1: u16,
    /// Bottom edge (exclusive) in the page.
    pub y1: u16,
    /// Horizontal offset from the pen to the bitmap.
    pub x_offset: i32,
    /// Vertical offset from the top of the line to the bitmap.
    pub y_offset: i32,
    /// Horizontal pen advance in whole pixels.
    pub advance: i32,
}

impl BakedGlyph {
    /// Width of the glyph bitmap.
    #[inline]
    pub fn width(&self) -> u32 {
        u32::from(self.x1.saturating_sub(self.x0))
    }

    /// Height of the glyph bitmap.
    #[inline]
    pub fn height(&self) -> u32 {
        u32::from(self.y1.saturating_sub(self.y0))
    }

    /// Whether drawing this glyph would touch any pixel.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// A glyph positioned for drawing: copy `width × height` pixels from `(src_x, src_y)`
/// in the page to `(dst_x, dst_y)` on the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphQuad {
    /// Left edge of the source in the page.
    pub src_x: i32,
    /// Top edge of the source in the page.
    pub src_y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Left edge of the destination.
    pub dst_x: i32,
    /// Top edge of the destination.
    pub dst_y: i32,
}

/// The texture of one glyph set.
///
/// Stored as premultiplied white, so each pixel's alpha is the glyph coverage.
pub struct GlyphPage {
    pixmap: Pixmap,
}

impl GlyphPage {
    /// Builds a page from an 8-bit coverage mask.
    fn from_coverage(coverage: &[u8], width: u32, height: u32) -> Result<Self, AtlasError> {
        let bytes = coverage.len() * 4;
        let mut rgba = Vec::new();
        rgba.try_reserve_exact(bytes)
            .map_err(|_| AtlasError::Allocation { bytes })?;
        rgba.extend(coverage.iter().flat_map(|&c| [c, c, c, c]));
        let pixmap = IntSize::from_wh(width, height)
            .and_then(|size| Pixmap::from_vec(rgba, size))
            .ok_or(AtlasError::Texture { width, height })?;
        Ok(Self { pixmap })
    }

    /// Page width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Page height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Coverage at `(x, y)`, or 0 outside the page.
    #[inline]
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.width() || y >= self.height() {
            return 0;
        }
        let idx = (y * self.width() + x) as usize;
        self.pixmap.pixels()[idx].alpha()
    }

    /// The premultiplied page pixels.
    #[inline]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl Debug for GlyphPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphPage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

/// 256 consecutive codepoints baked into one page.
///
/// A set whose page could not be baked keeps its metrics and carries the error
/// instead; its glyphs advance the pen but draw nothing.
pub struct GlyphSet {
    page: Result<GlyphPage, AtlasError>,
    glyphs: Box<[BakedGlyph; GLYPHS_PER_SET]>,
}

impl GlyphSet {
    /// Bakes block `block` of `source` at `pixel_size`.
    ///
    /// `baseline` is the ascent in whole pixels; it is added to every glyph's
    /// vertical offset so that sets baked separately share one baseline.
    pub fn bake(
        source: &dyn GlyphSource,
        block: u32,
        pixel_size: f32,
        baseline: i32,
        config: &AtlasConfig,
    ) -> Self {
        let mut rasters = source.rasterize(block * GLYPHS_PER_SET as u32, GLYPHS_PER_SET, pixel_size);
        rasters.resize(GLYPHS_PER_SET, None);

        let mut glyphs = Box::new([BakedGlyph::default(); GLYPHS_PER_SET]);
        for (glyph, raster) in glyphs.iter_mut().zip(&rasters) {
            if let Some(raster) = raster {
                glyph.x_offset = raster.left;
                glyph.y_offset = raster.top + baseline;
                glyph.advance = raster.advance.floor() as i32;
            }
        }

        let page = bake_page(&rasters, &mut glyphs, config);
        match &page {
            Ok(page) => log::debug!(
                "baked glyph set {block} at {pixel_size}px into a {}x{} page",
                page.width(),
                page.height()
            ),
            Err(err) => log::warn!("glyph set {block} at {pixel_size}px is degraded: {err}"),
        }
        Self { page, glyphs }
    }

    /// The baked page, if baking succeeded.
    #[inline]
    pub fn page(&self) -> Option<&GlyphPage> {
        self.page.as_ref().ok()
    }

    /// The baking failure, if this set is degraded.
    #[inline]
    pub fn error(&self) -> Option<&AtlasError> {
        self.page.as_ref().err()
    }

    /// Metrics of the glyph for `codepoint` (only the low 8 bits are used).
    #[inline]
    pub fn glyph(&self, codepoint: u32) -> &BakedGlyph {
        &self.glyphs[(codepoint & 0xff) as usize]
    }

    pub(crate) fn glyph_mut(&mut self, codepoint: u32) -> &mut BakedGlyph {
        &mut self.glyphs[(codepoint & 0xff) as usize]
    }
}

impl Debug for GlyphSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphSet")
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

/// Packs `rasters` into the smallest page that fits, doubling the page on failure.
fn bake_page(
    rasters: &[Option<RasterGlyph>],
    glyphs: &mut [BakedGlyph; GLYPHS_PER_SET],
    config: &AtlasConfig,
) -> Result<GlyphPage, AtlasError> {
    let max = config.max_page_size.min(u32::from(u16::MAX));
    let mut size = config.initial_page_size.clamp(1, max.max(1));
    let mut retries = 0_u32;
    let placements = loop {
        if let Some(placements) = pack_rows(rasters, size, size, config.padding) {
            break placements;
        }
        if size >= max {
            return Err(AtlasError::PageTooLarge {
                width: size,
                height: size,
            });
        }
        size = size.saturating_mul(2).min(max);
        retries += 1;
    };
    if retries > 0 {
        log::debug!("glyph page grew to {size}x{size} after {retries} retries");
    }

    let bytes = (size as usize) * (size as usize);
    let mut coverage = Vec::new();
    coverage
        .try_reserve_exact(bytes)
        .map_err(|_| AtlasError::Allocation { bytes })?;
    coverage.resize(bytes, 0_u8);

    for ((glyph, raster), placement) in glyphs.iter_mut().zip(rasters).zip(&placements) {
        let (Some(raster), Some((x, y))) = (raster, placement) else {
            continue;
        };
        let w = raster.width as usize;
        for row in 0..raster.height as usize {
            let src = &raster.coverage[row * w..(row + 1) * w];
            let start = (*y as usize + row) * size as usize + *x as usize;
            coverage[start..start + w].copy_from_slice(src);
        }
        glyph.x0 = *x as u16;
        glyph.y0 = *y as u16;
        glyph.x1 = (*x + raster.width) as u16;
        glyph.y1 = (*y + raster.height) as u16;
    }

    GlyphPage::from_coverage(&coverage, size, size)
}

/// Shelf packing: left to right, starting a new row when the current one is full.
///
/// Returns the top-left corner of each glyph with a non-empty bitmap, or `None` if
/// the glyphs do not fit in `width × height`.
fn pack_rows(
    rasters: &[Option<RasterGlyph>],
    width: u32,
    height: u32,
    padding: u32,
) -> Option<Vec<Option<(u32, u32)>>> {
    let mut x = padding;
    let mut y = padding;
    let mut row_bottom = padding;
    let mut placements = Vec::with_capacity(rasters.len());
    for raster in rasters {
        let Some(raster) = raster.as_ref().filter(|r| r.width > 0 && r.height > 0) else {
            placements.push(None);
            continue;
        };
        if raster.coverage.len() < raster.width as usize * raster.height as usize {
            placements.push(None);
            continue;
        }
        if x + raster.width + padding > width {
            x = padding;
            y = row_bottom;
        }
        if x + raster.width + padding > width || y + raster.height + padding > height {
            return None;
        }
        placements.push(Some((x, y)));
        x += raster.width + padding;
        row_bottom = row_bottom.max(y + raster.height + padding);
    }
    Some(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::VerticalMetrics;

    /// Every glyph is a solid `size × size` block advancing `size + 1`.
    #[derive(Debug)]
    struct Blocks {
        size: u32,
    }

    impl GlyphSource for Blocks {
        fn vertical_metrics(&self, _pixel_size: f32) -> VerticalMetrics {
            VerticalMetrics {
                ascent: self.size as f32,
                descent: 0.0,
                line_gap: 0.0,
            }
        }

        fn rasterize(&self, _first: u32, count: usize, _pixel_size: f32) -> Vec<Option<RasterGlyph>> {
            let glyph = RasterGlyph {
                advance: self.size as f32 + 1.5,
                left: 0,
                top: -(self.size as i32),
                width: self.size,
                height: self.size,
                coverage: vec![255; (self.size * self.size) as usize],
            };
            vec![Some(glyph); count]
        }
    }

    #[test]
    fn bake_grows_page_until_the_set_fits() {
        // 11px cells: only 121 fit in 128x128, so the page doubles once.
        let config = AtlasConfig::default();
        let set = GlyphSet::bake(&Blocks { size: 10 }, 0, 12.0, 10, &config);
        let page = set.page().expect("set fits in the default max page");
        assert_eq!((page.width(), page.height()), (256, 256));
        assert!(set.error().is_none());
    }

    #[test]
    fn bake_applies_baseline_and_floors_advance() {
        let set = GlyphSet::bake(&Blocks { size: 4 }, 0, 12.0, 7, &AtlasConfig::default());
        let glyph = set.glyph(u32::from('A'));
        assert_eq!(glyph.advance, 5);
        assert_eq!(glyph.y_offset, 3);
        assert_eq!((glyph.width(), glyph.height()), (4, 4));
    }

    #[test]
    fn bake_copies_coverage_into_the_page() {
        let set = GlyphSet::bake(&Blocks { size: 3 }, 0, 12.0, 3, &AtlasConfig::default());
        let page = set.page().unwrap();
        let glyph = set.glyph(42);
        assert_eq!(page.coverage(u32::from(glyph.x0), u32::from(glyph.y0)), 255);
        // The padding column right of the glyph stays empty.
        assert_eq!(page.coverage(u32::from(glyph.x1), u32::from(glyph.y0)), 0);
    }

    #[test]
    fn bake_degrades_when_page_limit_is_hit() {
        let config = AtlasConfig {
            initial_page_size: 16,
            max_page_size: 64,
            padding: 1,
        };
        let set = GlyphSet::bake(&Blocks { size: 10 }, 3, 12.0, 10, &config);
        assert!(set.page().is_none());
        assert_eq!(
            set.error(),
            Some(&AtlasError::PageTooLarge {
                width: 64,
                height: 64
            })
        );
        // Metrics survive so text still advances.
        assert_eq!(set.glyph(0x341).advance, 11);
        assert!(set.glyph(0x341).is_blank());
    }

    #[test]
    fn pack_rows_skips_blank_glyphs() {
        let rasters = vec![Some(RasterGlyph::empty(3.0)), None];
        let placements = pack_rows(&rasters, 8, 8, 1).unwrap();
        assert_eq!(placements, vec![None, None]);
    }
}
