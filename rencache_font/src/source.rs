// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rasterization seam between fonts and glyph-set baking.

use core::fmt::Debug;

/// Line metrics of a font at a given pixel size.
///
/// `descent` follows the usual font convention and is negative below the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VerticalMetrics {
    /// Distance from the baseline to the top of the line, in pixels.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line, in pixels.
    pub descent: f32,
    /// Extra spacing between lines, in pixels.
    pub line_gap: f32,
}

/// One glyph rendered to an 8-bit coverage mask.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterGlyph {
    /// Horizontal advance in pixels.
    pub advance: f32,
    /// Offset from the pen position to the left edge of the mask.
    pub left: i32,
    /// Offset from the baseline to the top edge of the mask (y grows downward).
    pub top: i32,
    /// Width of the mask in pixels.
    pub width: u32,
    /// Height of the mask in pixels.
    pub height: u32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

impl RasterGlyph {
    /// A glyph that only advances the pen.
    pub fn empty(advance: f32) -> Self {
        Self {
            advance,
            ..Self::default()
        }
    }
}

/// Something that can rasterize the glyphs of one font.
pub trait GlyphSource: Debug {
    /// Returns the line metrics at `pixel_size` pixels per em.
    fn vertical_metrics(&self, pixel_size: f32) -> VerticalMetrics;

    /// Rasterizes the codepoints `first..first + count` at `pixel_size` pixels per em.
    ///
    /// The result must have exactly `count` entries. `None` marks a glyph that could
    /// not be rendered at all; it is baked with zero metrics.
    fn rasterize(&self, first: u32, count: usize, pixel_size: f32) -> Vec<Option<RasterGlyph>>;
}
