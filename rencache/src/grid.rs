// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change detection over a grid of screen tiles.
//!
//! Each tile holds a hash of every command that touched it this frame. Comparing the
//! grid against last frame's grid tells which tiles need repainting; the two grids are
//! kept side by side and swap roles every frame.

#![allow(
    clippy::cast_possible_truncation,
    reason = "tile coordinates are bounded by the screen size, which fits in i32"
)]

use crate::command::{Command, CommandKind};
use crate::hash::{HASH_INITIAL, fnv1a};
use crate::rect::Rect;

/// A two-generation hash grid over fixed-size screen tiles.
pub struct DirtyGrid {
    tile_size: u32,
    cols: u32,
    rows: u32,
    screen: Rect,
    generations: [Vec<u32>; 2],
    active: usize,
    clip: Rect,
    full_redraw: bool,
    rects: Vec<Rect>,
}

impl DirtyGrid {
    /// Creates a grid of `tile_size` tiles covering a `width × height` screen.
    ///
    /// The first frame is treated as entirely dirty.
    pub fn new(tile_size: u32, width: u32, height: u32) -> Self {
        let mut grid = Self {
            tile_size: tile_size.max(1),
            cols: 0,
            rows: 0,
            screen: Rect::default(),
            generations: [Vec::new(), Vec::new()],
            active: 0,
            clip: Rect::default(),
            full_redraw: true,
            rects: Vec::new(),
        };
        grid.allocate(width, height);
        grid
    }

    fn allocate(&mut self, width: u32, height: u32) {
        let width = width.min(i32::MAX as u32);
        let height = height.min(i32::MAX as u32);
        self.cols = width.div_ceil(self.tile_size).max(1);
        self.rows = height.div_ceil(self.tile_size).max(1);
        self.screen = Rect::new(0, 0, width as i32, height as i32);
        self.clip = self.screen;
        let tiles = self.tile_count();
        for generation in &mut self.generations {
            generation.clear();
            generation.resize(tiles, HASH_INITIAL);
        }
        self.rects = Vec::with_capacity(tiles.div_ceil(2));
    }

    /// Adapts the grid to a new screen size.
    ///
    /// Returns `true` if the size changed, in which case the next frame is fully dirty.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if (width as i32, height as i32) == (self.screen.width, self.screen.height) {
            return false;
        }
        log::debug!(
            "resizing tile grid from {}x{} to {width}x{height}",
            self.screen.width,
            self.screen.height
        );
        self.allocate(width, height);
        self.full_redraw = true;
        true
    }

    /// Forces every tile to be dirty in the next frame.
    pub fn invalidate(&mut self) {
        log::debug!("tile grid invalidated");
        self.full_redraw = true;
    }

    /// Side length of a tile in pixels.
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Grid dimensions in tiles.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    /// The screen rectangle the grid covers.
    #[inline]
    pub fn screen(&self) -> Rect {
        self.screen
    }

    #[inline]
    fn tile_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Hash accumulated for tile `(x, y)` in the frame being built.
    pub fn current_hash(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|idx| self.generations[self.active][idx])
    }

    /// Hash of tile `(x, y)` in the previous frame.
    pub fn previous_hash(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y)
            .map(|idx| self.generations[self.active ^ 1][idx])
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.cols && y < self.rows).then(|| (x + y * self.cols) as usize)
    }

    /// Starts hashing a frame: the clip resets to the whole screen.
    pub fn begin_pass(&mut self) {
        self.clip = self.screen;
    }

    /// Folds one command into every tile it covers.
    ///
    /// The command is hashed over its full encoding and only touches the part of its
    /// rectangle inside the active clip. A [`SetClip`](CommandKind::SetClip) command
    /// becomes the active clip first.
    pub fn fold(&mut self, command: &Command<'_>) {
        if command.kind == CommandKind::SetClip {
            self.clip = command.rect;
        }
        let area = command.rect.intersect(&self.clip);
        if area.is_empty() {
            return;
        }
        let hash = fnv1a(HASH_INITIAL, command.as_bytes());
        self.fold_rect(area, hash);
    }

    /// Folds `hash` into every tile overlapping `rect`.
    ///
    /// The covered range includes the tile holding `rect`'s right and bottom edge.
    pub fn fold_rect(&mut self, rect: Rect, hash: u32) {
        let Some((x1, y1, x2, y2)) = self.tile_range(rect) else {
            return;
        };
        let cols = self.cols;
        let cells = &mut self.generations[self.active];
        let bytes = hash.to_le_bytes();
        for y in y1..=y2 {
            for x in x1..=x2 {
                let cell = &mut cells[(x + y * cols) as usize];
                *cell = fnv1a(*cell, &bytes);
            }
        }
    }

    /// Inclusive tile range for `rect`, clamped to the grid.
    fn tile_range(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let ts = self.tile_size as i32;
        let x1 = rect.x.div_euclid(ts);
        let y1 = rect.y.div_euclid(ts);
        let x2 = rect.right().div_euclid(ts);
        let y2 = rect.bottom().div_euclid(ts);
        let max_x = self.cols as i32 - 1;
        let max_y = self.rows as i32 - 1;
        if x2 < 0 || y2 < 0 || x1 > max_x || y1 > max_y {
            return None;
        }
        Some((
            x1.max(0) as u32,
            y1.max(0) as u32,
            x2.min(max_x) as u32,
            y2.min(max_y) as u32,
        ))
    }

    /// Ends the frame: collects the dirty rectangles and swaps generations.
    ///
    /// The returned rectangles are in screen pixels, clipped to the screen, and
    /// together cover every tile whose hash changed. An empty slice means nothing
    /// needs repainting.
    pub fn finish(&mut self) -> &[Rect] {
        let mut rects = core::mem::take(&mut self.rects);
        rects.clear();

        let (current, previous) = {
            let [a, b] = &mut self.generations;
            if self.active == 0 { (a, b) } else { (b, a) }
        };
        for y in 0..self.rows {
            for x in 0..self.cols {
                let idx = (x + y * self.cols) as usize;
                if self.full_redraw || current[idx] != previous[idx] {
                    push_rect(&mut rects, Rect::new(x as i32, y as i32, 1, 1));
                }
            }
        }
        previous.fill(HASH_INITIAL);

        let ts = self.tile_size as i32;
        for rect in &mut rects {
            let pixels = Rect::new(rect.x * ts, rect.y * ts, rect.width * ts, rect.height * ts);
            *rect = pixels.intersect(&self.screen);
        }
        rects.retain(|rect| !rect.is_empty());

        self.active ^= 1;
        self.full_redraw = false;
        self.rects = rects;
        &self.rects
    }

    /// The dirty rectangles produced by the last [`finish`](Self::finish).
    #[inline]
    pub fn dirty_rects(&self) -> &[Rect] {
        &self.rects
    }
}

/// Merges `rect` into the first touching entry, scanning newest first, or appends it.
fn push_rect(rects: &mut Vec<Rect>, rect: Rect) {
    if let Some(existing) = rects.iter_mut().rev().find(|r| r.touches(&rect)) {
        *existing = existing.union(&rect);
        return;
    }
    rects.push(rect);
}

impl core::fmt::Debug for DirtyGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DirtyGrid")
            .field("tile_size", &self.tile_size)
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("active", &self.active)
            .field("full_redraw", &self.full_redraw)
            .field("rects", &self.rects)
            .finish_non_exhaustive()
    }
}
