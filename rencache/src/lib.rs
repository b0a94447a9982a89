// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rencache is a frame cache that turns a stream of draw commands into minimal repaints.
//!
//! Every frame, a collaborator issues drawing calls against a [`RenderContext`]:
//!
//! ```text
//! begin_frame → set_clip_rect / draw_rect / draw_text / free_font … → end_frame
//! ```
//!
//! The calls are not executed immediately. They are recorded into a [`CommandBuffer`];
//! at the end of the frame every record is hashed into a [`DirtyGrid`] of screen tiles.
//! Tiles whose hash differs from the previous frame are merged into a few dirty
//! rectangles, and only the commands that touch those rectangles are replayed against
//! the [`RenderSurface`]. If nothing changed, nothing is drawn.
//!
//! Fonts come from [`rencache_font`]; draw commands refer to them through weak
//! [`FontId`] handles, and freeing a font is itself deferred to the end of the frame.

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

mod command;
mod compositor;
mod context;
mod grid;
mod hash;
mod rect;
mod surface;

pub use command::{
    Command, CommandBuffer, CommandKind, CommandOverflow, Commands, RECORD_HEADER_LEN,
};
pub use compositor::FrameStats;
pub use context::{CacheConfig, RenderContext};
pub use grid::DirtyGrid;
pub use hash::{HASH_INITIAL, fnv1a};
pub use rect::{Color, Rect};
pub use surface::{PixmapSurface, RenderSurface};

pub use rencache_font::{self, AtlasConfig, Font, FontId, FontLoadError, FontStore};
