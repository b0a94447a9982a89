// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;
use std::path::PathBuf;

/// Failure to turn a font file into a [`Font`](crate::Font).
///
/// No partially constructed font is ever returned alongside this error.
#[derive(Debug)]
#[non_exhaustive]
pub enum FontLoadError {
    /// The file could not be opened or read.
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The data is not a font the glyph source understands.
    Malformed {
        /// A description of what the parser rejected.
        reason: String,
    },
}

impl core::fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read font file {}: {source}", path.display())
            }
            Self::Malformed { reason } => write!(f, "malformed font data: {reason}"),
        }
    }
}

impl core::error::Error for FontLoadError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { .. } => None,
        }
    }
}

/// Failure to bake a glyph set into a texture page.
///
/// A glyph set that fails to bake is still kept by its font in degraded form: the
/// glyph advances are known but nothing is drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AtlasError {
    /// The glyphs did not fit even in the largest allowed page.
    PageTooLarge {
        /// Width of the largest page that was tried.
        width: u32,
        /// Height of the largest page that was tried.
        height: u32,
    },
    /// The coverage or pixel buffer could not be allocated.
    Allocation {
        /// Number of bytes that were requested.
        bytes: usize,
    },
    /// The texture page could not be created from the baked pixels.
    Texture {
        /// Width of the requested page.
        width: u32,
        /// Height of the requested page.
        height: u32,
    },
}

impl core::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PageTooLarge { width, height } => {
                write!(f, "glyph set does not fit in a {width}x{height} page")
            }
            Self::Allocation { bytes } => {
                write!(f, "failed to allocate {bytes} bytes for a glyph page")
            }
            Self::Texture { width, height } => {
                write!(f, "failed to create a {width}x{height} glyph texture")
            }
        }
    }
}

impl core::error::Error for AtlasError {}
