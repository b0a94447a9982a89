// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render context that collaborators drive frame by frame.

use std::path::Path;

use rencache_font::{AtlasConfig, FontId, FontLoadError, FontStore};

use crate::command::{CommandBuffer, CommandKind, CommandOverflow};
use crate::compositor::{Compositor, FrameStats};
use crate::grid::DirtyGrid;
use crate::rect::{Color, Rect};
use crate::surface::RenderSurface;

/// Sizes of the per-context storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Side length of a change-detection tile in pixels.
    pub tile_size: u32,
    /// Bytes available for recorded commands in one frame.
    pub command_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tile_size: 96,
            command_capacity: 512 * 1024,
        }
    }
}

/// Records drawing calls for a frame and repaints only what changed.
///
/// ```text
/// begin_frame → set_clip_rect / draw_rect / draw_text / free_font … → end_frame
/// ```
///
/// Nothing reaches the surface before [`end_frame`](Self::end_frame).
pub struct RenderContext<S> {
    surface: S,
    fonts: FontStore,
    commands: CommandBuffer,
    grid: DirtyGrid,
    compositor: Compositor,
    recorded: usize,
    dropped: usize,
}

impl<S: RenderSurface> RenderContext<S> {
    /// Creates a context drawing into `surface`, with an empty font store.
    pub fn new(surface: S, config: CacheConfig) -> Self {
        Self::with_fonts(surface, config, FontStore::new(AtlasConfig::default()))
    }

    /// Creates a context that owns `fonts`.
    pub fn with_fonts(surface: S, config: CacheConfig, fonts: FontStore) -> Self {
        let (width, height) = surface.size();
        Self {
            grid: DirtyGrid::new(config.tile_size, width, height),
            commands: CommandBuffer::with_capacity(config.command_capacity),
            compositor: Compositor::default(),
            surface,
            fonts,
            recorded: 0,
            dropped: 0,
        }
    }

    /// The surface being drawn into.
    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface.
    ///
    /// Drawing on it directly bypasses change detection; call
    /// [`invalidate`](Self::invalidate) afterwards.
    #[inline]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Consumes the context, returning its surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// The fonts owned by this context.
    #[inline]
    pub fn fonts(&self) -> &FontStore {
        &self.fonts
    }

    /// Mutable access to the fonts, for measuring and tab width changes.
    #[inline]
    pub fn fonts_mut(&mut self) -> &mut FontStore {
        &mut self.fonts
    }

    /// Loads a font file into this context's store.
    pub fn load_font(
        &mut self,
        path: impl AsRef<Path>,
        pixel_size: f32,
    ) -> Result<FontId, FontLoadError> {
        self.fonts.load(path, pixel_size)
    }

    /// The change-detection grid.
    #[inline]
    pub fn grid(&self) -> &DirtyGrid {
        &self.grid
    }

    /// The commands recorded so far in the current frame.
    #[inline]
    pub fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    /// Starts a frame.
    ///
    /// If the surface changed size since the last frame, the grid is rebuilt and the
    /// whole screen will be repainted.
    pub fn begin_frame(&mut self) {
        let (width, height) = self.surface.size();
        self.grid.resize(width, height);
        self.grid.begin_pass();
        self.commands.reset();
        self.recorded = 0;
        self.dropped = 0;
    }

    /// Restricts subsequent drawing in this frame to `rect`.
    pub fn set_clip_rect(&mut self, rect: Rect) {
        self.record(CommandKind::SetClip, rect, Color::default(), None, 0);
    }

    /// Fills `rect` with `color`.
    ///
    /// Rectangles entirely off screen are not recorded.
    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        if !rect.intersects(&self.grid.screen()) {
            return;
        }
        self.record(CommandKind::DrawRect, rect, color, None, 0);
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    ///
    /// Returns the x position following the run, so consecutive runs can be laid out
    /// without measuring again. A freed font draws nothing and returns `x`.
    ///
    /// The font's current tab width is recorded with the run and used when it is
    /// replayed. Replay leaves the font's tab width as it found it.
    pub fn draw_text(&mut self, font: FontId, text: &str, x: i32, y: i32, color: Color) -> i32 {
        let Some(face) = self.fonts.get_mut(font) else {
            log::debug!("draw_text with stale font {font:?}");
            return x;
        };
        let width = face.text_width(text);
        let rect = Rect::new(x, y, width, face.line_height());
        let tab_width = face.tab_width();
        if rect.intersects(&self.grid.screen()) {
            let result = self
                .commands
                .record_text(rect, color, font, tab_width, text)
                .map(|_| ());
            self.note(result);
        }
        x.saturating_add(width)
    }

    /// Releases `font` once this frame has been composited.
    ///
    /// Text already queued with the font this frame still draws.
    pub fn free_font(&mut self, font: FontId) {
        self.record(
            CommandKind::FreeFont,
            Rect::default(),
            Color::default(),
            Some(font),
            0,
        );
    }

    /// Toggles a translucent overlay over every repainted rectangle.
    pub fn show_debug(&mut self, enabled: bool) {
        self.compositor.show_debug = enabled;
    }

    /// Makes the next frame repaint the whole screen.
    pub fn invalidate(&mut self) {
        self.grid.invalidate();
    }

    /// Hashes the frame, repaints the dirty rectangles and presents them.
    pub fn end_frame(&mut self) -> FrameStats {
        for cmd in &self.commands {
            self.grid.fold(&cmd);
        }
        let dirty = self.grid.finish();

        let mut stats = FrameStats {
            commands: self.recorded,
            dropped: self.dropped,
            ..FrameStats::default()
        };
        self.compositor.composite(
            &self.commands,
            dirty,
            &mut self.fonts,
            &mut self.surface,
            &mut stats,
        );
        log::trace!("{stats:?}");

        self.commands.reset();
        self.recorded = 0;
        self.dropped = 0;
        stats
    }

    /// Dirty rectangles repainted by the last [`end_frame`](Self::end_frame).
    #[inline]
    pub fn dirty_rects(&self) -> &[Rect] {
        self.grid.dirty_rects()
    }

    fn record(
        &mut self,
        kind: CommandKind,
        rect: Rect,
        color: Color,
        font: Option<FontId>,
        tab_width: i32,
    ) {
        let result = self
            .commands
            .record(kind, rect, color, font, tab_width, &[])
            .map(|_| ());
        self.note(result);
    }

    fn note(&mut self, result: Result<(), CommandOverflow>) {
        match result {
            Ok(()) => self.recorded += 1,
            Err(err) => {
                log::warn!("{err}");
                self.dropped += 1;
            }
        }
    }
}

impl<S: core::fmt::Debug> core::fmt::Debug for RenderContext<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderContext")
            .field("surface", &self.surface)
            .field("fonts", &self.fonts)
            .field("commands", &self.commands)
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}
