// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame command arena.
//!
//! Commands are stored back to back in one fixed-capacity byte buffer. Every record
//! starts with a [`RECORD_HEADER_LEN`]-byte header that carries its own total size, so
//! the buffer can be walked front to back without an index:
//!
//! | offset | size | field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 1    | kind                                   |
//! | 1      | 3    | reserved, zero                         |
//! | 4      | 4    | record size in bytes (LE)              |
//! | 8      | 16   | rect `x, y, width, height` (LE `i32`)  |
//! | 24     | 4    | colour `r, g, b, a`                    |
//! | 28     | 8    | font id bits, or `u64::MAX` (LE)       |
//! | 36     | 4    | tab width (LE `i32`)                   |
//! | 40     | ..   | payload                                |
//!
//! Text payloads are the UTF-8 bytes followed by a single NUL.

use rencache_font::FontId;

use crate::rect::{Color, Rect};

/// Size of the fixed part of every record.
pub const RECORD_HEADER_LEN: usize = 40;

const NO_FONT: u64 = u64::MAX;

const NUL: &[u8] = &[0];

/// The operation a record performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandKind {
    /// Release a font once the frame has been drawn.
    FreeFont = 0,
    /// Restrict subsequent drawing to a rectangle.
    SetClip = 1,
    /// Draw a run of glyphs.
    DrawText = 2,
    /// Fill a rectangle.
    DrawRect = 3,
}

impl CommandKind {
    fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::FreeFont,
            1 => Self::SetClip,
            2 => Self::DrawText,
            3 => Self::DrawRect,
            _ => return None,
        })
    }
}

/// A record could not be appended because the buffer is full.
///
/// The buffer is unchanged when this is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandOverflow {
    /// The kind of the rejected command.
    pub kind: CommandKind,
    /// Bytes the record needed.
    pub required: usize,
    /// Bytes that were left.
    pub available: usize,
}

impl core::fmt::Display for CommandOverflow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "command buffer overflow: {:?} needed {} bytes, {} left",
            self.kind, self.required, self.available
        )
    }
}

impl core::error::Error for CommandOverflow {}

/// A decoded view of one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command<'a> {
    /// What the record does.
    pub kind: CommandKind,
    /// The affected area. For text this is the measured extent of the run.
    pub rect: Rect,
    /// Fill or text colour.
    pub color: Color,
    /// The referenced font, for text and font-release records.
    pub font: Option<FontId>,
    /// Tab advance to apply before drawing text.
    pub tab_width: i32,
    payload: &'a [u8],
    raw: &'a [u8],
}

impl<'a> Command<'a> {
    /// The text of a [`DrawText`](CommandKind::DrawText) record, empty otherwise.
    pub fn text(&self) -> &'a str {
        let bytes = self.payload.strip_suffix(NUL).unwrap_or(self.payload);
        core::str::from_utf8(bytes).unwrap_or_default()
    }

    /// The encoded record, header included.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.raw
    }
}

/// A fixed-capacity arena of variable-length command records.
pub struct CommandBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl CommandBuffer {
    /// Allocates a buffer that holds at most `capacity` bytes of records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record and returns a view of it.
    ///
    /// Fails without touching the buffer if the record does not fit.
    pub fn record(
        &mut self,
        kind: CommandKind,
        rect: Rect,
        color: Color,
        font: Option<FontId>,
        tab_width: i32,
        payload: &[u8],
    ) -> Result<Command<'_>, CommandOverflow> {
        self.push(kind, rect, color, font, tab_width, &[payload])
    }

    /// Appends a text record; the payload is `text` plus a trailing NUL.
    pub fn record_text(
        &mut self,
        rect: Rect,
        color: Color,
        font: FontId,
        tab_width: i32,
        text: &str,
    ) -> Result<Command<'_>, CommandOverflow> {
        self.push(
            CommandKind::DrawText,
            rect,
            color,
            Some(font),
            tab_width,
            &[text.as_bytes(), NUL],
        )
    }

    fn push(
        &mut self,
        kind: CommandKind,
        rect: Rect,
        color: Color,
        font: Option<FontId>,
        tab_width: i32,
        payload: &[&[u8]],
    ) -> Result<Command<'_>, CommandOverflow> {
        let available = self.remaining();
        let required = RECORD_HEADER_LEN + payload.iter().map(|part| part.len()).sum::<usize>();
        let size = u32::try_from(required).ok().filter(|_| required <= available);
        let Some(size) = size else {
            return Err(CommandOverflow {
                kind,
                required,
                available,
            });
        };

        let start = self.bytes.len();
        self.bytes.extend_from_slice(&[kind as u8, 0, 0, 0]);
        self.bytes.extend_from_slice(&size.to_le_bytes());
        self.bytes.extend_from_slice(&rect.to_le_bytes());
        self.bytes.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        let font_bits = font.map_or(NO_FONT, FontId::to_bits);
        self.bytes.extend_from_slice(&font_bits.to_le_bytes());
        self.bytes.extend_from_slice(&tab_width.to_le_bytes());
        for part in payload {
            self.bytes.extend_from_slice(part);
        }
        debug_assert_eq!(self.bytes.len() - start, required, "header layout drifted");

        let raw = &self.bytes[start..];
        Ok(Command {
            kind,
            rect,
            color,
            font,
            tab_width,
            payload: &raw[RECORD_HEADER_LEN..],
            raw,
        })
    }

    /// Forgets every record.
    #[inline]
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    /// Walks the records in the order they were written.
    #[inline]
    pub fn iter(&self) -> Commands<'_> {
        Commands { rest: &self.bytes }
    }

    /// Bytes used by records.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still free.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.bytes.len()
    }
}

impl core::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("len", &self.bytes.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = Command<'a>;
    type IntoIter = Commands<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the records of a [`CommandBuffer`].
#[derive(Clone, Debug)]
pub struct Commands<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Commands<'a> {
    type Item = Command<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match decode(self.rest) {
            Some(command) => {
                self.rest = &self.rest[command.raw.len()..];
                Some(command)
            }
            None => {
                debug_assert!(false, "corrupt command record");
                log::error!(
                    "corrupt command record with {} bytes left; abandoning replay",
                    self.rest.len()
                );
                self.rest = &[];
                None
            }
        }
    }
}

/// Decodes the record at the start of `bytes`.
fn decode(bytes: &[u8]) -> Option<Command<'_>> {
    let header: &[u8; RECORD_HEADER_LEN] = bytes.get(..RECORD_HEADER_LEN)?.try_into().ok()?;
    let kind = CommandKind::from_u8(header[0])?;
    let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if size < RECORD_HEADER_LEN {
        return None;
    }
    let raw = bytes.get(..size)?;
    let rect_bytes: &[u8; 16] = header[8..24].try_into().ok()?;
    let font_bits = u64::from_le_bytes(header[28..36].try_into().ok()?);
    Some(Command {
        kind,
        rect: Rect::from_le_bytes(rect_bytes),
        color: Color::rgba(header[24], header[25], header[26], header[27]),
        font: (font_bits != NO_FONT).then(|| FontId::from_bits(font_bits)),
        tab_width: i32::from_le_bytes(header[36..40].try_into().ok()?),
        payload: &raw[RECORD_HEADER_LEN..],
        raw,
    })
}
