// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders a short animation through a [`RenderContext`] into a software surface and
//! saves every frame as a PNG.
//!
//! ```text
//! cargo run -p headless_frames -- [path/to/font.ttf] [output-dir]
//! ```
//!
//! Without a font the frames contain only rectangles. Run with `RUST_LOG=debug` to see
//! which regions each frame repaints.

use std::error::Error;
use std::path::PathBuf;

use rencache::{CacheConfig, Color, PixmapSurface, Rect, RenderContext};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 200;
const FRAMES: i32 = 6;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let font_path = args.next().map(PathBuf::from);
    let out_dir = args.next().map_or_else(std::env::temp_dir, PathBuf::from);

    let surface = PixmapSurface::new(WIDTH, HEIGHT).ok_or("surface has zero size")?;
    let mut cx = RenderContext::new(surface, CacheConfig::default());
    let font = font_path
        .map(|path| cx.load_font(path, 16.0))
        .transpose()?;

    let background = Color::rgb(245, 245, 240);
    let panel = Color::rgb(40, 60, 90);
    let ink = Color::rgb(250, 250, 250);

    for frame in 0..FRAMES {
        cx.show_debug(frame == FRAMES - 1);
        cx.begin_frame();
        cx.draw_rect(Rect::new(0, 0, WIDTH as i32, HEIGHT as i32), background);
        cx.draw_rect(Rect::new(16, 16, 288, 40), panel);
        if let Some(font) = font {
            let x = cx.draw_text(font, "rencache", 24, 24, ink);
            // Only the counter changes between frames.
            cx.draw_text(font, &format!("  frame {}", frame / 2), x, 24, ink);
        }
        // A box that moves every other frame.
        let step = frame / 2;
        cx.set_clip_rect(Rect::new(0, 80, WIDTH as i32, 120));
        cx.draw_rect(Rect::new(20 + step * 70, 110, 48, 48), Color::rgb(200, 70, 50));
        let stats = cx.end_frame();

        log::info!(
            "frame {frame}: {} dirty rects, {} draws, {} skipped",
            stats.dirty_rects,
            stats.draws,
            stats.skipped
        );
        let path = out_dir.join(format!("rencache-frame-{frame}.png"));
        cx.surface().save_png(&path)?;
        log::info!("wrote {}", path.display());
    }

    if let Some(font) = font {
        cx.begin_frame();
        cx.free_font(font);
        cx.end_frame();
    }
    Ok(())
}
