// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replay of recorded commands into the dirty regions of a surface.

use rencache_font::{FontId, FontStore};
use smallvec::SmallVec;

use crate::command::{CommandBuffer, CommandKind};
use crate::hash::{HASH_INITIAL, fnv1a};
use crate::rect::{Color, Rect};
use crate::surface::RenderSurface;

/// Alpha of the debug overlay.
const DEBUG_ALPHA: u8 = 50;

/// Counters describing one finished frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Commands recorded this frame.
    pub commands: usize,
    /// Commands rejected because the buffer was full.
    pub dropped: usize,
    /// Dirty rectangles repainted.
    pub dirty_rects: usize,
    /// Draw commands replayed, summed over all dirty rectangles.
    pub draws: usize,
    /// Draw commands skipped because they missed the active clip.
    pub skipped: usize,
    /// Fonts released at the end of the frame.
    pub fonts_freed: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Compositor {
    pub(crate) show_debug: bool,
    frame: u64,
}

impl Compositor {
    /// Replays `commands` once per rectangle in `dirty`, presents, then releases fonts.
    pub(crate) fn composite<S: RenderSurface + ?Sized>(
        &mut self,
        commands: &CommandBuffer,
        dirty: &[Rect],
        fonts: &mut FontStore,
        surface: &mut S,
        stats: &mut FrameStats,
    ) {
        for (index, &region) in dirty.iter().enumerate() {
            self.replay(commands, region, fonts, surface, stats);
            if self.show_debug {
                surface.set_clip_rect(region);
                surface.fill_rect(region, self.debug_color(index));
            }
        }
        if !dirty.is_empty() {
            surface.present(dirty);
        }
        stats.dirty_rects = dirty.len();

        let pending: SmallVec<[FontId; 4]> = commands
            .iter()
            .filter(|cmd| cmd.kind == CommandKind::FreeFont)
            .filter_map(|cmd| cmd.font)
            .collect();
        for id in pending {
            if fonts.free(id) {
                stats.fonts_freed += 1;
            } else {
                log::debug!("ignoring free of stale font {id:?}");
            }
        }
        self.frame = self.frame.wrapping_add(1);
    }

    fn replay<S: RenderSurface + ?Sized>(
        &self,
        commands: &CommandBuffer,
        region: Rect,
        fonts: &mut FontStore,
        surface: &mut S,
        stats: &mut FrameStats,
    ) {
        let mut clip = region;
        surface.set_clip_rect(clip);
        for cmd in commands {
            match cmd.kind {
                CommandKind::SetClip => {
                    clip = cmd.rect.intersect(&region);
                    surface.set_clip_rect(clip);
                }
                CommandKind::DrawRect => {
                    if !cmd.rect.intersects(&clip) {
                        stats.skipped += 1;
                        continue;
                    }
                    surface.fill_rect(cmd.rect, cmd.color);
                    stats.draws += 1;
                }
                CommandKind::DrawText => {
                    if !cmd.rect.intersects(&clip) {
                        stats.skipped += 1;
                        continue;
                    }
                    let Some(font) = cmd.font.and_then(|id| fonts.get_mut(id)) else {
                        log::debug!("skipping text drawn with stale font {:?}", cmd.font);
                        stats.skipped += 1;
                        continue;
                    };
                    // The recorded tab width applies to this run only.
                    let live_tab_width = font.tab_width();
                    font.set_tab_width(cmd.tab_width);
                    let color = cmd.color;
                    font.draw_text(cmd.text(), cmd.rect.x, cmd.rect.y, |page, quad| {
                        surface.draw_glyph(page, quad, color);
                    });
                    font.set_tab_width(live_tab_width);
                    stats.draws += 1;
                }
                CommandKind::FreeFont => {}
            }
        }
    }

    /// A translucent colour, stable for a given frame and rectangle.
    fn debug_color(&self, index: usize) -> Color {
        let hash = fnv1a(
            fnv1a(HASH_INITIAL, &self.frame.to_le_bytes()),
            &(index as u64).to_le_bytes(),
        );
        let [r, g, b, _] = hash.to_le_bytes();
        Color::rgba(r, g, b, DEBUG_ALPHA)
    }
}
