//! Cursor-driven printing and aligned string drawing.

use core::fmt::{self, Write as _};

use embedded_graphics::pixelcolor::Rgb888;
use heapless::String;

use crate::config::{FLOAT_MAX_DECIMALS, NUMBER_TEXT_LEN};
use crate::error::GfxResult;
use crate::gfx::Gfx;
use crate::panel::Panel;

use super::utf8::code_points;
use super::{Datum, Font, FontSlot, GlyphSink, HAlign, TextStyle, VAlign, VlwFont, mono};

/// Largest magnitude `format_float` prints digits for.
const FLOAT_PRINT_LIMIT: f64 = 4_294_967_040.0;

impl<P: Panel> GlyphSink for Gfx<P> {
    fn glyph_fill(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgb888,
    ) {
        self.set_color(color);
        self.write_fill_rect(x, y, w, h);
    }
}

impl<P: Panel> Gfx<P> {
    // =========================================================================
    // Style
    // =========================================================================

    pub fn set_cursor(
        &mut self,
        x: i32,
        y: i32,
    ) {
        self.text.cursor_x = x;
        self.text.cursor_y = y;
    }

    #[inline]
    pub fn cursor(&self) -> (i32, i32) { (self.text.cursor_x, self.text.cursor_y) }

    /// Sets the glyph color and the cell background (`None` draws glyphs only).
    pub fn set_text_color(
        &mut self,
        fore: Rgb888,
        back: Option<Rgb888>,
    ) {
        self.text.style.fore = fore;
        self.text.style.back = back;
    }

    /// Integer glyph scale per axis, at least 1.
    pub fn set_text_size(
        &mut self,
        size_x: i32,
        size_y: i32,
    ) {
        self.text.style.size_x = size_x.max(1);
        self.text.style.size_y = size_y.max(1);
    }

    pub fn set_text_datum(
        &mut self,
        datum: Datum,
    ) {
        self.text.style.datum = datum;
    }

    #[inline]
    pub fn text_style(&self) -> TextStyle { self.text.style }

    /// Wrap at the right edge of the clip, and restart at the top after the bottom.
    pub fn set_text_wrap(
        &mut self,
        wrap_x: bool,
        wrap_y: bool,
    ) {
        self.text.wrap_x = wrap_x;
        self.text.wrap_y = wrap_y;
    }

    /// Keeps printed text inside the scroll region, scrolling it up on overflow.
    pub fn set_text_scroll(
        &mut self,
        scroll: bool,
    ) {
        self.text.scroll = scroll;
        let s = self.scroll;
        self.text.cursor_x = self.text.cursor_x.max(s.x);
        self.text.cursor_y = self.text.cursor_y.max(s.y);
    }

    /// Minimum width `draw_string` covers with the background color.
    pub fn set_text_padding(
        &mut self,
        padding: i32,
    ) {
        self.text.padding_x = padding;
    }

    pub fn set_utf8(
        &mut self,
        utf8: bool,
    ) {
        self.text.style.utf8 = utf8;
        self.text.decoder.reset();
    }

    // =========================================================================
    // Fonts
    // =========================================================================

    /// Selects a compiled-in font, dropping any loaded runtime font.
    pub fn set_font(
        &mut self,
        font: &'static dyn Font,
    ) {
        self.text.metrics = font.default_metric();
        self.font = FontSlot::Builtin(font);
    }

    /// Parses a VLW font and makes it current. On failure the default
    /// compiled-in font is selected.
    pub fn load_font(
        &mut self,
        data: &[u8],
    ) -> GfxResult {
        self.unload_font();
        match VlwFont::parse(data) {
            Ok(font) => {
                log_info!("vlw font: {} glyphs", font.glyph_count());
                self.text.metrics = font.default_metric();
                self.font = FontSlot::Runtime(font);
                Ok(())
            }
            Err(err) => {
                log_warn!("vlw font rejected: {}", err);
                Err(err)
            }
        }
    }

    /// Drops a loaded runtime font, returning to the default font.
    pub fn unload_font(&mut self) {
        if matches!(self.font, FontSlot::Runtime(_)) {
            self.set_font(&mono::FONT_6X10);
        }
    }

    /// Height of the current glyph cell, scaled.
    #[inline]
    pub fn font_height(&self) -> i32 { self.text.metrics.height * self.text.style.size_y }

    #[inline]
    fn update_metric(
        &mut self,
        code: u16,
    ) -> bool {
        self.font.font().update_font_metric(&mut self.text.metrics, code)
    }

    /// Draws one glyph through the current font. Transaction already open.
    fn render_glyph(
        &mut self,
        x: i32,
        y: i32,
        code: u16,
    ) -> i32 {
        let style = self.text.style;
        let slot = core::mem::take(&mut self.font);
        let advance = slot.font().draw_char(self, x, y, code, &style);
        self.font = slot;
        advance
    }

    // =========================================================================
    // Measuring
    // =========================================================================

    /// Pixel width of `s` in the current font and scale.
    pub fn text_width(
        &mut self,
        s: &str,
    ) -> i32 {
        let sx = self.text.style.size_x;
        let (mut left, mut right) = (0, 0);
        for (_, code) in code_points(s.as_bytes(), self.text.style.utf8) {
            if !self.update_metric(code) {
                continue;
            }
            let m = self.text.metrics;
            if left == 0 && right == 0 && m.x_offset < 0 {
                left = -(m.x_offset * sx);
            }
            right = left + (m.x_advance * sx).max(m.width * sx + m.x_offset * sx);
            left += m.x_advance * sx;
        }
        right
    }

    /// Byte length of the longest prefix of `s` that fits in `width` pixels.
    pub fn text_length(
        &mut self,
        s: &str,
        width: i32,
    ) -> usize {
        let sx = self.text.style.size_x;
        let (mut left, mut right) = (0, 0);
        let mut fitted = 0;
        for (i, code) in code_points(s.as_bytes(), self.text.style.utf8) {
            if self.update_metric(code) {
                let m = self.text.metrics;
                if left == 0 && right == 0 && m.x_offset < 0 {
                    left = -(m.x_offset * sx);
                }
                right = left + (m.x_advance * sx).max(m.width * sx + m.x_offset * sx);
                left += m.x_advance * sx;
                if right > width {
                    return fitted;
                }
            }
            fitted = i + 1;
        }
        s.len()
    }

    // =========================================================================
    // Cursor Printing
    // =========================================================================

    /// Feeds one byte to the cursor printer.
    ///
    /// `\r` is ignored, `\n` moves to the start of the next line. Other
    /// bytes go through the UTF-8 decoder (when enabled) and draw one glyph
    /// once a code point is complete.
    pub fn write_byte(
        &mut self,
        byte: u8,
    ) {
        if byte == b'\r' {
            return;
        }
        let (sx, sy) = (self.text.style.size_x, self.text.style.size_y);
        if byte == b'\n' {
            self.text.cursor_x = if self.text.scroll { self.scroll.x } else { 0 };
            self.text.cursor_y += self.text.metrics.y_advance * sy;
            return;
        }

        let code = if self.text.style.utf8 { self.text.decoder.decode(byte) } else { u16::from(byte) };
        if self.text.style.utf8 && code < 0x20 {
            return;
        }
        if !self.update_metric(code) {
            return;
        }
        let m = self.text.metrics;
        let (clip, region) = (self.clip, self.scroll);

        let xo = m.x_offset * sx;
        let w = (xo + m.width * sx).max(m.x_advance * sx);
        if self.text.scroll || self.text.wrap_x {
            let left_limit = if self.text.scroll { region.x } else { clip.left };
            let right_limit = if self.text.scroll { region.x + region.w } else { clip.right + 1 };
            if self.text.cursor_x < left_limit - xo {
                self.text.cursor_x = left_limit - xo;
            } else if self.text.cursor_x + w > right_limit {
                self.text.cursor_x = left_limit - xo;
                self.text.cursor_y += m.y_advance * sy;
            }
        }

        let h = m.height * sy;
        let ydiff = match self.text.style.datum.vertical() {
            VAlign::Top => 0,
            VAlign::Middle => -(h >> 1),
            VAlign::Bottom => -h,
            VAlign::Baseline => -(m.baseline * sy),
        };
        let mut y = self.text.cursor_y + ydiff;

        if self.text.scroll {
            if y < region.y {
                y = region.y;
            } else {
                let shift = (region.y + region.h) - (y + h);
                if shift < 0 {
                    self.scroll(0, shift);
                    y += shift;
                }
            }
        } else if self.text.wrap_y {
            if y + h > clip.bottom + 1 {
                self.text.cursor_x = clip.left - xo;
                y = clip.top;
            } else if y < clip.top {
                y = clip.top;
            }
        }
        self.text.cursor_y = y - ydiff;
        y -= m.y_offset * sy;

        self.start_write();
        let advance = self.render_glyph(self.text.cursor_x, y, code);
        self.end_write();
        self.text.cursor_x += advance;
    }

    /// Prints `s` at the cursor.
    pub fn print(
        &mut self,
        s: &str,
    ) {
        self.start_write();
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
        self.end_write();
    }

    /// Prints `s` followed by a newline.
    pub fn println(
        &mut self,
        s: &str,
    ) {
        self.print(s);
        self.write_byte(b'\n');
    }

    // =========================================================================
    // Positioned Drawing
    // =========================================================================

    /// Draws one glyph with its cell at `(x, y)`. Returns the advance.
    pub fn draw_char(
        &mut self,
        code: u16,
        x: i32,
        y: i32,
    ) -> i32 {
        self.start_write();
        let advance = self.render_glyph(x, y, code);
        self.end_write();
        advance
    }

    /// Lays out the current font's glyphs as a grid, starting at `(x, y)`
    /// with glyph number `first`.
    ///
    /// Rows wrap at the clip's right edge and drawing stops at the first row
    /// that would cross its bottom. Returns the index of the first glyph left
    /// out, so a caller can page through a large font; a return equal to the
    /// glyph count means everything was drawn.
    pub fn show_font(
        &mut self,
        x: i32,
        y: i32,
        first: usize,
    ) -> usize {
        let (sx, sy) = (self.text.style.size_x, self.text.style.size_y);
        let (right, bottom) = (self.clip.right + 1, self.clip.bottom + 1);
        let (mut cx, mut cy) = (x, y);
        let mut index = first;
        self.start_write();
        while let Some(code) = self.font.font().glyph_code(index) {
            if self.update_metric(code) {
                let m = self.text.metrics;
                if cx > x && cx + (m.x_offset + m.width) * sx > right {
                    cx = x;
                    cy += m.y_advance * sy;
                }
                if cy + m.height * sy > bottom {
                    break;
                }
                cx += self.render_glyph(cx, cy, code);
            }
            index += 1;
        }
        self.end_write();
        index
    }

    /// Draws `s` anchored at `(x, y)` by the current datum, without moving
    /// the cursor. Returns the drawn width.
    pub fn draw_string(
        &mut self,
        s: &str,
        mut x: i32,
        mut y: i32,
    ) -> i32 {
        let style = self.text.style;
        let (sx, sy) = (style.size_x, style.size_y);
        let cwidth = self.text_width(s);
        let cheight = self.text.metrics.height * sy;

        let mut sum_x = 0;
        for (_, code) in code_points(s.as_bytes(), style.utf8) {
            if self.update_metric(code) {
                if self.text.metrics.x_offset < 0 {
                    sum_x = -self.text.metrics.x_offset * sx;
                }
                break;
            }
        }

        match style.datum.vertical() {
            VAlign::Top => {}
            VAlign::Middle => y -= cheight >> 1,
            VAlign::Bottom => y -= cheight,
            VAlign::Baseline => y -= self.text.metrics.baseline * sy,
        }

        self.start_write();
        let padding = self.text.padding_x;
        if let Some(back) = style.back {
            if padding > cwidth {
                self.set_color(back);
                match style.datum.horizontal() {
                    HAlign::Left => self.write_fill_rect(x + cwidth, y, padding - cwidth, cheight),
                    HAlign::Right => self.write_fill_rect(x - padding, y, padding - cwidth, cheight),
                    HAlign::Center => {
                        let (half_w, half_pad) = (cwidth >> 1, padding >> 1);
                        self.write_fill_rect(x - half_pad, y, half_pad - half_w, cheight);
                        let (half_w, half_pad) = (cwidth - half_w, padding - half_pad);
                        self.write_fill_rect(x + half_w, y, half_pad - half_w, cheight);
                    }
                }
            }
        }

        match style.datum.horizontal() {
            HAlign::Left => {}
            HAlign::Center => x -= cwidth >> 1,
            HAlign::Right => x -= cwidth,
        }
        y -= self.text.metrics.y_offset * sy;

        for (_, code) in code_points(s.as_bytes(), style.utf8) {
            sum_x += self.render_glyph(x + sum_x, y, code);
        }
        self.end_write();
        sum_x
    }

    /// Draws a decimal integer like `draw_string`.
    pub fn draw_number(
        &mut self,
        value: i64,
        x: i32,
        y: i32,
    ) -> i32 {
        let mut text: String<NUMBER_TEXT_LEN> = String::new();
        let _ = write!(text, "{}", value);
        self.draw_string(&text, x, y)
    }

    /// Draws `value` with `decimals` fractional digits (at most 7).
    pub fn draw_float(
        &mut self,
        value: f32,
        decimals: u8,
        x: i32,
        y: i32,
    ) -> i32 {
        let text = format_float(f64::from(value), decimals);
        self.draw_string(&text, x, y)
    }
}

impl<P: Panel> fmt::Write for Gfx<P> {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        self.print(s);
        Ok(())
    }
}

/// Fixed-point style rendering: `nan`, `inf` and `ovf` for values that
/// cannot be printed, otherwise rounded to `decimals` digits.
pub(crate) fn format_float(
    value: f64,
    decimals: u8,
) -> String<NUMBER_TEXT_LEN> {
    let mut out = String::new();
    if value.is_nan() {
        let _ = out.push_str("nan");
        return out;
    }
    if value.is_infinite() {
        let _ = out.push_str("inf");
        return out;
    }
    if !(-FLOAT_PRINT_LIMIT..=FLOAT_PRINT_LIMIT).contains(&value) {
        let _ = out.push_str("ovf");
        return out;
    }

    let decimals = decimals.min(FLOAT_MAX_DECIMALS);
    let mut number = value;
    if number < 0.0 {
        number = -number;
        let _ = out.push('-');
    }
    let mut rounding = 0.5;
    for _ in 0..decimals {
        rounding /= 10.0;
    }
    number += rounding;

    let int_part = number as u64;
    let mut remainder = number - int_part as f64;
    let _ = write!(out, "{}", int_part);
    if decimals > 0 {
        let _ = out.push('.');
    }
    for _ in 0..decimals {
        remainder *= 10.0;
        let digit = (remainder as u8).min(9);
        let _ = out.push(char::from(b'0' + digit));
        remainder -= f64::from(digit);
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use core::fmt::Write;

    use super::*;
    use crate::test_support::{BLACK, BLUE, RED, gfx, lit_pixels};
    use crate::text::FontMetrics;

    /// 4x8 solid block per glyph, advancing 5, 10 px lines, baseline 6.
    struct BlockFont;

    static BLOCK: BlockFont = BlockFont;

    impl Font for BlockFont {
        fn default_metric(&self) -> FontMetrics {
            FontMetrics { width: 4, height: 8, x_advance: 5, x_offset: 0, y_advance: 10, y_offset: 0, baseline: 6 }
        }

        fn update_font_metric(
            &self,
            metrics: &mut FontMetrics,
            code: u16,
        ) -> bool {
            if code < 0x20 {
                return false;
            }
            *metrics = self.default_metric();
            true
        }

        fn draw_char(
            &self,
            sink: &mut dyn GlyphSink,
            x: i32,
            y: i32,
            code: u16,
            style: &TextStyle,
        ) -> i32 {
            if code < 0x20 {
                return 0;
            }
            let (sx, sy) = (style.size_x, style.size_y);
            sink.glyph_fill(x, y, 4 * sx, 8 * sy, style.fore);
            if let Some(back) = style.back {
                sink.glyph_fill(x + 4 * sx, y, sx, 8 * sy, back);
            }
            5 * sx
        }

        fn glyph_code(
            &self,
            index: usize,
        ) -> Option<u16> {
            let code = u16::try_from(index).ok()? + 0x20;
            (code < 0x7F).then_some(code)
        }
    }

    /// `BlockFont` with a glyph for every code, control codes included.
    struct ControlBlockFont;

    static CONTROL_BLOCK: ControlBlockFont = ControlBlockFont;

    impl Font for ControlBlockFont {
        fn default_metric(&self) -> FontMetrics { BLOCK.default_metric() }

        fn update_font_metric(
            &self,
            metrics: &mut FontMetrics,
            _code: u16,
        ) -> bool {
            *metrics = self.default_metric();
            true
        }

        fn draw_char(
            &self,
            sink: &mut dyn GlyphSink,
            x: i32,
            y: i32,
            code: u16,
            style: &TextStyle,
        ) -> i32 {
            BLOCK.draw_char(sink, x, y, code.max(0x20), style)
        }

        fn glyph_code(
            &self,
            index: usize,
        ) -> Option<u16> {
            u16::try_from(index).ok().filter(|&c| c < 0x7F)
        }
    }

    fn block_gfx(
        w: u32,
        h: u32,
    ) -> Gfx<crate::FramePanel> {
        let mut g = gfx(w, h);
        g.set_font(&BLOCK);
        g.set_text_color(RED, None);
        g
    }

    #[test]
    fn test_print_advances_cursor() {
        let mut g = block_gfx(40, 20);
        g.print("AB");
        assert_eq!(g.cursor(), (10, 0));
        assert_eq!(lit_pixels(&g, RED), 64);
        assert_eq!(g.panel().pixel(4, 0), BLACK);
        assert_eq!(g.panel().pixel(5, 7), RED);
    }

    #[test]
    fn test_utf8_sequence_draws_once() {
        let mut g = block_gfx(40, 20);
        g.write_byte(0xE3);
        g.write_byte(0x81);
        assert_eq!(g.cursor(), (0, 0));
        assert_eq!(g.panel().write_count(), 0);
        g.write_byte(0x82);
        assert_eq!(g.cursor(), (5, 0));
        assert_eq!(g.panel().write_count(), 1);
    }

    #[test]
    fn test_newline_and_carriage_return() {
        let mut g = block_gfx(40, 40);
        g.print("A\r\nB");
        assert_eq!(g.cursor(), (5, 10));
        assert_eq!(g.panel().pixel(0, 10), RED);
        g.println("C");
        assert_eq!(g.cursor(), (0, 20));
    }

    #[test]
    fn test_text_width_scales() {
        let mut g = block_gfx(40, 20);
        assert_eq!(g.text_width("ABC"), 15);
        assert_eq!(g.text_width(""), 0);
        g.set_text_size(2, 2);
        assert_eq!(g.text_width("ABC"), 30);
        assert_eq!(g.font_height(), 16);
    }

    #[test]
    fn test_text_length_prefix() {
        let mut g = block_gfx(40, 20);
        assert_eq!(g.text_length("ABCDE", 12), 2);
        assert_eq!(g.text_length("ABCDE", 10), 2);
        assert_eq!(g.text_length("AB", 100), 2);
        assert_eq!(g.text_length("\u{e9}\u{e9}\u{e9}", 10), 4);
    }

    #[test]
    fn test_draw_string_middle_center() {
        let mut g = block_gfx(100, 100);
        g.set_text_datum(Datum::MiddleCenter);
        assert_eq!(g.draw_string("AB", 50, 50), 10);
        assert_eq!(g.panel().pixel(45, 46), RED);
        assert_eq!(g.panel().pixel(44, 46), BLACK);
        assert_eq!(g.panel().pixel(45, 45), BLACK);
        assert_eq!(g.panel().pixel(53, 53), RED);
        assert_eq!(g.panel().pixel(54, 53), BLACK);
        assert_eq!(g.cursor(), (0, 0));
    }

    #[test]
    fn test_draw_string_baseline_and_right() {
        let mut g = block_gfx(100, 100);
        g.set_text_datum(Datum::BaselineLeft);
        g.draw_string("A", 10, 20);
        assert_eq!(g.panel().pixel(10, 14), RED);
        assert_eq!(g.panel().pixel(10, 13), BLACK);

        g.set_text_datum(Datum::TopRight);
        g.draw_string("A", 60, 0);
        assert_eq!(g.panel().pixel(55, 0), RED);
        assert_eq!(g.panel().pixel(58, 0), RED);
        assert_eq!(g.panel().pixel(59, 0), BLACK);
    }

    #[test]
    fn test_wrap_at_right_edge() {
        let mut g = block_gfx(20, 40);
        g.print("ABCD");
        assert_eq!(g.cursor(), (20, 0));
        g.print("E");
        assert_eq!(g.cursor(), (5, 10));
        assert_eq!(g.panel().pixel(0, 10), RED);
    }

    #[test]
    fn test_no_wrap_runs_off_edge() {
        let mut g = block_gfx(20, 40);
        g.set_text_wrap(false, false);
        g.print("ABCDE");
        assert_eq!(g.cursor(), (25, 0));
        assert_eq!(g.panel().pixel(0, 10), BLACK);
    }

    #[test]
    fn test_wrap_y_restarts_at_top() {
        let mut g = block_gfx(20, 20);
        g.set_text_wrap(true, true);
        g.set_cursor(0, 15);
        g.print("A");
        assert_eq!(g.cursor(), (5, 0));
        assert_eq!(g.panel().pixel(0, 0), RED);
        assert_eq!(g.panel().pixel(0, 15), BLACK);
    }

    #[test]
    fn test_wrap_returns_to_clip_origin() {
        let mut g = block_gfx(40, 40);
        g.set_clip_rect(5, 4, 20, 20);
        g.set_text_wrap(true, true);
        g.print("ABCDE");
        assert_eq!(g.cursor(), (10, 14));
        assert_eq!(g.panel().pixel(5, 14), RED);
        assert_eq!(g.panel().pixel(4, 14), BLACK);
        g.print("FGH");
        g.set_text_color(BLUE, None);
        g.print("I");
        // The bottom row is full, so the next glyph restarts at the clip's top-left.
        assert_eq!(g.cursor(), (10, 4));
        assert_eq!(g.panel().pixel(5, 4), BLUE);
        assert_eq!(g.panel().pixel(0, 0), BLACK);
    }

    #[test]
    fn test_raw_control_bytes_measure_like_they_print() {
        let mut g = gfx(60, 20);
        g.set_font(&CONTROL_BLOCK);
        g.set_text_color(RED, None);
        g.set_utf8(false);
        let s = "a\u{1}b";
        assert_eq!(g.text_width(s), 15);
        assert_eq!(g.text_length(s, 10), 2);
        g.print(s);
        assert_eq!(g.cursor(), (15, 0));
        assert_eq!(g.draw_string(s, 0, 10), 15);

        // The UTF-8 printer drops control codes, and so does measuring.
        g.set_utf8(true);
        assert_eq!(g.text_width(s), 10);
    }

    #[test]
    fn test_show_font_fills_grid_and_reports_next_glyph() {
        let mut g = block_gfx(20, 20);
        // Four 5px cells per row, two 10px rows.
        assert_eq!(g.show_font(0, 0, 0), 8);
        assert_eq!(lit_pixels(&g, RED), 8 * 32);
        assert_eq!(g.panel().pixel(15, 10), RED);
        assert_eq!(g.panel().pixel(19, 0), BLACK);
        assert_eq!(g.cursor(), (0, 0));

        let mut g = block_gfx(20, 20);
        assert_eq!(g.show_font(0, 0, 93), 95);
        assert_eq!(lit_pixels(&g, RED), 2 * 32);
        assert_eq!(g.panel().write_count(), 2);
    }

    #[test]
    fn test_show_font_respects_clip() {
        let mut g = block_gfx(40, 40);
        g.set_clip_rect(10, 10, 12, 30);
        assert_eq!(g.show_font(10, 10, 0), 6);
        assert_eq!(g.panel().pixel(15, 30), RED);
        assert_eq!(g.panel().pixel(20, 10), BLACK);
    }

    #[test]
    fn test_scroll_mode_shifts_region() {
        let mut g = block_gfx(20, 20);
        g.fill_rect(10, 10, 1, 1, BLUE);
        g.set_text_scroll(true);
        g.set_cursor(0, 15);
        g.print("A");
        assert_eq!(g.cursor(), (5, 12));
        assert_eq!(g.panel().pixel(10, 7), BLUE);
        assert_eq!(g.panel().pixel(10, 10), BLACK);
        assert_eq!(g.panel().pixel(0, 12), RED);
        assert_eq!(g.panel().pixel(3, 19), RED);
    }

    #[test]
    fn test_padding_fills_background() {
        let mut g = block_gfx(40, 20);
        g.set_text_color(RED, Some(BLUE));
        g.set_text_padding(20);
        g.draw_string("A", 0, 0);
        assert_eq!(g.panel().pixel(0, 0), RED);
        assert_eq!(g.panel().pixel(4, 0), BLUE);
        assert_eq!(g.panel().pixel(19, 7), BLUE);
        assert_eq!(g.panel().pixel(20, 0), BLACK);
        assert_eq!(lit_pixels(&g, BLUE), 8 * 16);
    }

    #[test]
    fn test_draw_number_and_float() {
        let mut g = block_gfx(100, 20);
        assert_eq!(g.draw_number(-42, 0, 0), 15);
        assert_eq!(g.draw_float(1.5, 2, 0, 10), 20);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.999, 2).as_str(), "2.00");
        assert_eq!(format_float(-0.5, 1).as_str(), "-0.5");
        assert_eq!(format_float(3.0, 0).as_str(), "3");
        assert_eq!(format_float(f64::NAN, 2).as_str(), "nan");
        assert_eq!(format_float(f64::INFINITY, 2).as_str(), "inf");
        assert_eq!(format_float(5.0e9, 2).as_str(), "ovf");
        assert_eq!(format_float(0.125, 12).as_str(), "0.1250000");
    }

    #[test]
    fn test_fmt_write_prints_at_cursor() {
        let mut g = block_gfx(100, 20);
        write!(g, "{}", 12).unwrap();
        assert_eq!(g.cursor(), (10, 0));
    }

    #[test]
    fn test_failed_font_load_keeps_default_font() {
        let mut g = gfx(20, 20);
        assert_eq!(g.font_height(), 10);
        assert!(g.load_font(&[0u8; 10]).is_err());
        assert_eq!(g.font_height(), 10);
    }

    #[test]
    fn test_set_utf8_off_prints_bytes() {
        let mut g = block_gfx(40, 20);
        g.set_utf8(false);
        g.write_byte(0xE3);
        assert_eq!(g.cursor(), (5, 0));
    }
}
