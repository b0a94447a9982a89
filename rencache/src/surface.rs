// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing backend the compositor replays into.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "pixel coordinates are clipped to the surface before conversion"
)]

use std::path::Path;

use rencache_font::{GlyphPage, GlyphQuad};
use tiny_skia::{Paint, Pixmap, PremultipliedColorU8, Transform};

use crate::rect::{Color, Rect};

/// A render target that can fill rectangles and blit glyph coverage.
///
/// All drawing is clipped to the rectangle passed to
/// [`set_clip_rect`](Self::set_clip_rect).
pub trait RenderSurface {
    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Restricts subsequent drawing to `rect`.
    fn set_clip_rect(&mut self, rect: Rect);

    /// Fills `rect` with `color`, blending by its alpha.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Blends `color` through the coverage in `quad`'s source area of `page`.
    fn draw_glyph(&mut self, page: &GlyphPage, quad: GlyphQuad, color: Color);

    /// Shows the repainted regions of the frame.
    ///
    /// Called once per frame that had at least one dirty rectangle.
    fn present(&mut self, dirty: &[Rect]);
}

/// A software surface backed by a [`tiny_skia::Pixmap`].
pub struct PixmapSurface {
    pixmap: Pixmap,
    clip: Rect,
    presented: usize,
}

impl PixmapSurface {
    /// Creates a transparent surface, or `None` if either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let pixmap = Pixmap::new(width, height)?;
        Some(Self::from_pixmap(pixmap))
    }

    /// Wraps an existing pixmap.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        let clip = Rect::new(0, 0, pixmap.width() as i32, pixmap.height() as i32);
        Self {
            pixmap,
            clip,
            presented: 0,
        }
    }

    /// The pixels drawn so far.
    #[inline]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Consumes the surface, returning its pixmap.
    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Number of frames presented.
    #[inline]
    pub fn presented(&self) -> usize {
        self.presented
    }

    /// The premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremultipliedColorU8> {
        self.pixmap.pixel(x, y)
    }

    /// Writes the surface to a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        self.pixmap.save_png(path).map_err(std::io::Error::other)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.pixmap.width() as i32, self.pixmap.height() as i32)
    }
}

impl RenderSurface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn set_clip_rect(&mut self, rect: Rect) {
        self.clip = rect.intersect(&self.bounds());
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let area = rect.intersect(&self.clip);
        if area.is_empty() {
            return;
        }
        let Some(target) = tiny_skia::Rect::from_xywh(
            area.x as f32,
            area.y as f32,
            area.width as f32,
            area.height as f32,
        ) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = false;
        self.pixmap
            .fill_rect(target, &paint, Transform::identity(), None);
    }

    fn draw_glyph(&mut self, page: &GlyphPage, quad: GlyphQuad, color: Color) {
        let dst = Rect::new(quad.dst_x, quad.dst_y, quad.width, quad.height).intersect(&self.clip);
        if dst.is_empty() {
            return;
        }
        let stride = self.pixmap.width() as usize;
        let pixels = self.pixmap.pixels_mut();
        for y in dst.y..dst.bottom() {
            let src_y = (quad.src_y + y - quad.dst_y) as u32;
            for x in dst.x..dst.right() {
                let src_x = (quad.src_x + x - quad.dst_x) as u32;
                let coverage = page.coverage(src_x, src_y);
                if coverage == 0 {
                    continue;
                }
                let pixel = &mut pixels[y as usize * stride + x as usize];
                *pixel = blend(*pixel, color, coverage);
            }
        }
    }

    fn present(&mut self, dirty: &[Rect]) {
        self.presented += 1;
        log::trace!("presented {} dirty rects", dirty.len());
    }
}

impl core::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("clip", &self.clip)
            .field("presented", &self.presented)
            .finish_non_exhaustive()
    }
}

/// `a * b / 255`, rounded.
#[inline]
fn mul255(a: u8, b: u8) -> u8 {
    let t = u32::from(a) * u32::from(b) + 128;
    ((t + (t >> 8)) >> 8) as u8
}

/// Source-over of `color` scaled by `coverage` onto a premultiplied pixel.
fn blend(dst: PremultipliedColorU8, color: Color, coverage: u8) -> PremultipliedColorU8 {
    let alpha = mul255(color.a, coverage);
    let inv = 255 - alpha;
    let r = mul255(color.r, alpha) + mul255(dst.red(), inv);
    let g = mul255(color.g, alpha) + mul255(dst.green(), inv);
    let b = mul255(color.b, alpha) + mul255(dst.blue(), inv);
    let a = alpha + mul255(dst.alpha(), inv);
    PremultipliedColorU8::from_rgba(r.min(a), g.min(a), b.min(a), a).unwrap_or(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul255_extremes() {
        assert_eq!(mul255(255, 255), 255);
        assert_eq!(mul255(255, 0), 0);
        assert_eq!(mul255(128, 255), 128);
    }

    #[test]
    fn fill_rect_respects_clip() {
        let mut surface = PixmapSurface::new(8, 8).unwrap();
        surface.set_clip_rect(Rect::new(2, 2, 2, 2));
        surface.fill_rect(Rect::new(0, 0, 8, 8), Color::rgb(255, 0, 0));
        assert_eq!(surface.pixel(2, 2).unwrap().red(), 255);
        assert_eq!(surface.pixel(3, 3).unwrap().alpha(), 255);
        assert_eq!(surface.pixel(4, 4).unwrap().alpha(), 0);
        assert_eq!(surface.pixel(1, 2).unwrap().alpha(), 0);
    }

    #[test]
    fn clip_is_bounded_by_surface() {
        let mut surface = PixmapSurface::new(4, 4).unwrap();
        surface.set_clip_rect(Rect::new(-10, -10, 100, 100));
        surface.fill_rect(Rect::new(-5, -5, 100, 100), Color::rgb(0, 0, 255));
        assert_eq!(surface.pixel(0, 0).unwrap().blue(), 255);
        assert_eq!(surface.pixel(3, 3).unwrap().blue(), 255);
    }

    #[test]
    fn blend_full_coverage_replaces() {
        let dst = PremultipliedColorU8::from_rgba(0, 0, 0, 255).unwrap();
        let out = blend(dst, Color::rgb(10, 20, 30), 255);
        assert_eq!(
            (out.red(), out.green(), out.blue(), out.alpha()),
            (10, 20, 30, 255)
        );
    }

    #[test]
    fn blend_zero_coverage_keeps_destination() {
        let dst = PremultipliedColorU8::from_rgba(40, 50, 60, 255).unwrap();
        let out = blend(dst, Color::rgb(255, 255, 255), 0);
        assert_eq!(out, dst);
    }
}
