// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use rencache::{
    CacheConfig, Color, CommandBuffer, CommandKind, CommandOverflow, RECORD_HEADER_LEN, Rect,
    RenderContext,
};

use crate::util::{FakeGlyphSource, RecordingSurface, context_with, font_store};

#[test]
fn overflow_second_rect_is_dropped() {
    let mut cx = context_with(CacheConfig {
        tile_size: 32,
        command_capacity: 64,
    });
    cx.begin_frame();
    cx.draw_rect(Rect::new(10, 10, 20, 20), Color::rgb(1, 1, 1));
    cx.draw_rect(Rect::new(50, 10, 20, 20), Color::rgb(2, 2, 2));
    assert_eq!(cx.commands().iter().count(), 1);

    let stats = cx.end_frame();
    assert_eq!(stats.commands, 1);
    assert_eq!(stats.dropped, 1);
    assert_eq!(
        cx.surface().fills(),
        vec![(Rect::new(10, 10, 20, 20), Color::rgb(1, 1, 1))]
    );
}

#[test]
fn overflow_rejected_record_leaves_buffer_intact() {
    let mut buffer = CommandBuffer::with_capacity(100);
    let first = Rect::new(1, 2, 3, 4);
    buffer
        .record(CommandKind::DrawRect, first, Color::rgb(5, 6, 7), None, 0, &[])
        .unwrap();
    let before: Vec<u8> = buffer.iter().flat_map(|cmd| cmd.as_bytes().to_vec()).collect();
    let len = buffer.len();

    let err = buffer
        .record(CommandKind::DrawText, first, Color::default(), None, 0, &[0; 64])
        .unwrap_err();
    assert_eq!(
        err,
        CommandOverflow {
            kind: CommandKind::DrawText,
            required: RECORD_HEADER_LEN + 64,
            available: 100 - RECORD_HEADER_LEN,
        }
    );
    assert_eq!(buffer.len(), len);
    let after: Vec<u8> = buffer.iter().flat_map(|cmd| cmd.as_bytes().to_vec()).collect();
    assert_eq!(before, after);
}

#[test]
fn overflow_later_commands_are_still_attempted() {
    let (fonts, font) = font_store(FakeGlyphSource::default());
    let config = CacheConfig {
        tile_size: 32,
        command_capacity: 2 * RECORD_HEADER_LEN + 8,
    };
    let mut cx = RenderContext::with_fonts(RecordingSurface::new(200, 100), config, fonts);
    cx.begin_frame();
    cx.draw_rect(Rect::new(0, 0, 5, 5), Color::rgb(1, 1, 1));
    let end = cx.draw_text(font, "far too long to fit", 20, 20, Color::rgb(0, 0, 0));
    cx.draw_rect(Rect::new(40, 40, 5, 5), Color::rgb(3, 3, 3));

    assert_eq!(end, 20 + 19 * crate::util::ADVANCE, "dropped text still advances");
    let stats = cx.end_frame();
    assert_eq!(stats.commands, 2);
    assert_eq!(stats.dropped, 1);
    assert!(cx.surface().glyphs().is_empty());
    assert_eq!(cx.surface().fills().len(), 2);
}

#[test]
fn overflow_counters_reset_each_frame() {
    let mut cx = context_with(CacheConfig {
        tile_size: 32,
        command_capacity: RECORD_HEADER_LEN,
    });
    cx.begin_frame();
    cx.draw_rect(Rect::new(0, 0, 5, 5), Color::rgb(1, 1, 1));
    cx.draw_rect(Rect::new(0, 0, 6, 6), Color::rgb(1, 1, 1));
    assert_eq!(cx.end_frame().dropped, 1);

    cx.begin_frame();
    cx.draw_rect(Rect::new(0, 0, 5, 5), Color::rgb(1, 1, 1));
    let stats = cx.end_frame();
    assert_eq!((stats.commands, stats.dropped), (1, 0));
}
