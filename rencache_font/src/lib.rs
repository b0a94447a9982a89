// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rencache Font loads font files and bakes their glyphs into texture pages on demand.
//!
//! Glyphs are grouped into *glyph sets*: blocks of 256 consecutive codepoints that share
//! one [`GlyphPage`]. A [`Font`] bakes a glyph set the first time any of its codepoints
//! is queried and keeps it until the font is dropped.
//!
//! Rasterization sits behind the [`GlyphSource`] trait. [`SkrifaSource`] reads
//! TrueType/OpenType outlines with Skrifa and renders coverage with Tiny-Skia.
//!
//! Fonts are usually owned by a [`FontStore`], which hands out generation-checked
//! [`FontId`]s so that draw commands can refer to a font without owning it.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod font;
mod glyph_set;
mod skrifa_source;
mod source;
mod store;

pub use error::{AtlasError, FontLoadError};
pub use font::Font;
pub use glyph_set::{AtlasConfig, BakedGlyph, GlyphPage, GlyphQuad, GlyphSet};
pub use skrifa_source::SkrifaSource;
pub use source::{GlyphSource, RasterGlyph, VerticalMetrics};
pub use store::{FontId, FontStore};

/// Number of codepoints in one glyph set.
pub const GLYPHS_PER_SET: usize = 256;

/// Number of distinct glyph-set slots per font.
///
/// Codepoints map to slot `(codepoint >> 8) % MAX_GLYPH_SETS`, so planes above the
/// BMP share slots with lower blocks.
pub const MAX_GLYPH_SETS: u32 = 256;

/// Returns the glyph-set slot for `codepoint`.
#[inline]
pub fn block_index(codepoint: u32) -> u32 {
    (codepoint >> 8) % MAX_GLYPH_SETS
}
