// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `rencache`.
//!
//! - The `util` module holds the fixtures shared by every topic: a glyph source with
//!   fixed metrics and a surface that records the calls made on it.
//! - We do not use the default Rust test harness; this `mod.rs` is the single entry point.
//! - Put a new test in the module of its topic and start its name with that topic, e.g.
//!   `grid_coverage_…` in `grid.rs`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod overflow;
mod util;
