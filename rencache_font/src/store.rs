// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generation-checked ownership of loaded fonts.

use std::path::Path;

use crate::error::FontLoadError;
use crate::font::Font;
use crate::glyph_set::AtlasConfig;

/// A weak handle to a font owned by a [`FontStore`].
///
/// Handles stay cheap to copy and to hash into draw commands. A handle whose font
/// was freed never resolves again, even if its slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontId {
    index: u32,
    generation: u32,
}

impl FontId {
    /// Packs the handle into 64 bits.
    #[inline]
    pub fn to_bits(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Unpacks a handle produced by [`to_bits`](Self::to_bits).
    #[inline]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "the two halves are split on purpose"
    )]
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

struct Slot {
    generation: u32,
    font: Option<Font>,
}

/// Owns every font in use by a renderer.
pub struct FontStore {
    slots: Vec<Slot>,
    vacant: Vec<u32>,
    atlas: AtlasConfig,
}

impl FontStore {
    /// Creates an empty store whose fonts bake pages according to `atlas`.
    pub fn new(atlas: AtlasConfig) -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            atlas,
        }
    }

    /// The atlas configuration used by [`load`](Self::load).
    #[inline]
    pub fn atlas_config(&self) -> &AtlasConfig {
        &self.atlas
    }

    /// Loads the font file at `path` at `pixel_size` pixels per em.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        pixel_size: f32,
    ) -> Result<FontId, FontLoadError> {
        let font = Font::load(path, pixel_size, self.atlas)?;
        Ok(self.insert(font))
    }

    /// Takes ownership of `font`.
    pub fn insert(&mut self, font: Font) -> FontId {
        if let Some(index) = self.vacant.pop() {
            let slot = &mut self.slots[index as usize];
            slot.font = Some(font);
            return FontId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            font: Some(font),
        });
        FontId {
            index,
            generation: 0,
        }
    }

    /// Resolves `id`, or `None` if the font was freed.
    pub fn get(&self, id: FontId) -> Option<&Font> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.font.as_ref())
    }

    /// Resolves `id` mutably, or `None` if the font was freed.
    pub fn get_mut(&mut self, id: FontId) -> Option<&mut Font> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.font.as_mut())
    }

    /// Drops the font behind `id`, releasing its pages and font data.
    ///
    /// Returns `false` if `id` was already freed.
    pub fn free(&mut self, id: FontId) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
        else {
            return false;
        };
        let Some(font) = slot.font.take() else {
            return false;
        };
        log::debug!("freeing font {id:?} with {} baked glyph sets", font.baked_sets());
        drop(font);
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(id.index);
        true
    }

    /// Number of live fonts.
    pub fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    /// Whether no font is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FontStore {
    fn default() -> Self {
        Self::new(AtlasConfig::default())
    }
}

impl core::fmt::Debug for FontStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontStore")
            .field("live", &self.len())
            .field("slots", &self.slots.len())
            .field("atlas", &self.atlas)
            .finish_non_exhaustive()
    }
}
