//! Compiled-in fonts built on `embedded-graphics` mono fonts.
//!
//! Glyphs are rasterized once per character into a small bit mask (by
//! drawing the character with `embedded-graphics` itself) and then emitted
//! as scaled horizontal runs, so a glyph costs one write per run instead of
//! one per pixel.
//!
//! # Usage
//!
//! ```ignore
//! gfx.set_font(&mono::PROFONT_24_POINT);
//! gfx.draw_string("88", 120, 60);
//! ```

use core::convert::Infallible;

use embedded_graphics::{
    Pixel,
    mono_font::{MonoFont, MonoTextStyle, ascii},
    pixelcolor::{BinaryColor, Rgb888},
    prelude::*,
    text::{Baseline, Text},
};

use super::{Font, FontMetrics, GlyphSink, TextStyle};

/// Tallest glyph cell the mask can hold.
const MASK_ROWS: usize = 64;

/// Widest glyph cell the mask can hold.
const MASK_COLUMNS: i32 = 64;

// =============================================================================
// Font Table
// =============================================================================

pub static FONT_4X6: MonoGlyphFont = MonoGlyphFont::new(&ascii::FONT_4X6);
pub static FONT_5X8: MonoGlyphFont = MonoGlyphFont::new(&ascii::FONT_5X8);
pub static FONT_6X10: MonoGlyphFont = MonoGlyphFont::new(&ascii::FONT_6X10);
pub static FONT_6X13: MonoGlyphFont = MonoGlyphFont::new(&ascii::FONT_6X13);
pub static FONT_7X13: MonoGlyphFont = MonoGlyphFont::new(&ascii::FONT_7X13);
pub static FONT_8X13: MonoGlyphFont = MonoGlyphFont::new(&ascii::FONT_8X13);
pub static FONT_9X15: MonoGlyphFont = MonoGlyphFont::new(&ascii::FONT_9X15);
pub static FONT_10X20: MonoGlyphFont = MonoGlyphFont::new(&ascii::FONT_10X20);

pub static PROFONT_7_POINT: MonoGlyphFont = MonoGlyphFont::new(&profont::PROFONT_7_POINT);
pub static PROFONT_9_POINT: MonoGlyphFont = MonoGlyphFont::new(&profont::PROFONT_9_POINT);
pub static PROFONT_12_POINT: MonoGlyphFont = MonoGlyphFont::new(&profont::PROFONT_12_POINT);
pub static PROFONT_18_POINT: MonoGlyphFont = MonoGlyphFont::new(&profont::PROFONT_18_POINT);
pub static PROFONT_24_POINT: MonoGlyphFont = MonoGlyphFont::new(&profont::PROFONT_24_POINT);

// =============================================================================
// MonoGlyphFont
// =============================================================================

/// A fixed-cell font covering printable ASCII.
pub struct MonoGlyphFont {
    font: &'static MonoFont<'static>,
}

impl MonoGlyphFont {
    pub const fn new(font: &'static MonoFont<'static>) -> Self { Self { font } }

    /// Metrics shared by every glyph of the font.
    pub const fn metrics(&self) -> FontMetrics {
        let width = self.font.character_size.width as i32;
        let height = self.font.character_size.height as i32;
        FontMetrics {
            width,
            height,
            x_advance: width + self.font.character_spacing as i32,
            x_offset: 0,
            y_advance: height,
            y_offset: 0,
            baseline: self.font.baseline as i32,
        }
    }

    #[inline]
    const fn covers(code: u16) -> bool { code >= 0x20 && code < 0x7F }

    fn rasterize(
        &self,
        code: u16,
    ) -> GlyphMask {
        let mut mask = GlyphMask { rows: [0; MASK_ROWS], size: self.font.character_size };
        let Some(ch) = char::from_u32(u32::from(code)) else { return mask };
        let mut buf = [0u8; 4];
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let _ = Text::with_baseline(ch.encode_utf8(&mut buf), Point::zero(), style, Baseline::Top).draw(&mut mask);
        mask
    }
}

impl Font for MonoGlyphFont {
    fn default_metric(&self) -> FontMetrics { self.metrics() }

    fn glyph_code(
        &self,
        index: usize,
    ) -> Option<u16> {
        let code = u16::try_from(index).ok()?.checked_add(0x20)?;
        Self::covers(code).then_some(code)
    }

    fn update_font_metric(
        &self,
        metrics: &mut FontMetrics,
        code: u16,
    ) -> bool {
        if !Self::covers(code) {
            return false;
        }
        *metrics = self.metrics();
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
        if !Self::covers(code) {
            return 0;
        }
        let m = self.metrics();
        let (sx, sy) = (style.size_x, style.size_y);
        let mask = self.rasterize(code);
        let cell_w = m.x_advance.min(MASK_COLUMNS);

        for (r, &bits) in mask.rows.iter().take(m.height as usize).enumerate() {
            let py = y + r as i32 * sy;
            let mut col = 0;
            while col < cell_w {
                let on = bits & (1 << col) != 0;
                let start = col;
                while col < cell_w && (bits & (1 << col) != 0) == on {
                    col += 1;
                }
                let color = if on { Some(style.fore) } else { style.back };
                if let Some(color) = color {
                    sink.glyph_fill(x + start * sx, py, (col - start) * sx, sy, color);
                }
            }
        }
        m.x_advance * sx
    }
}

// =============================================================================
// Glyph Mask
// =============================================================================

/// One bit per pixel of a glyph cell, bit `x` of `rows[y]`.
struct GlyphMask {
    rows: [u64; MASK_ROWS],
    size: Size,
}

impl OriginDimensions for GlyphMask {
    fn size(&self) -> Size { self.size }
}

impl DrawTarget for GlyphMask {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if color.is_on() && (0..MASK_COLUMNS).contains(&x) && (0..MASK_ROWS as i32).contains(&y) {
                self.rows[y as usize] |= 1 << x;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BLACK, BLUE, RED, gfx, lit_pixels};

    #[test]
    fn test_metrics_follow_font() {
        let m = FONT_6X10.metrics();
        assert_eq!((m.width, m.height, m.x_advance, m.y_advance), (6, 10, 6, 10));
        assert!(m.baseline > 0 && m.baseline < m.height);
        let mut out = FontMetrics::default();
        assert!(!FONT_6X10.update_font_metric(&mut out, 0x1F));
        assert!(!FONT_6X10.update_font_metric(&mut out, 0x3042));
        assert_eq!(out, FontMetrics::default());
    }

    #[test]
    fn test_glyph_stays_inside_cell() {
        let mut g = gfx(30, 30);
        g.set_text_color(RED, None);
        g.set_cursor(10, 10);
        g.print("W");
        let lit = lit_pixels(&g, RED);
        assert!(lit > 5);
        for y in 0..30 {
            for x in 0..30 {
                if g.panel().pixel(x, y) == RED {
                    assert!((10..16).contains(&x) && (10..20).contains(&y), "({x}, {y}) outside the cell");
                }
            }
        }
        assert_eq!(g.cursor(), (16, 10));
    }

    #[test]
    fn test_space_with_background_fills_cell() {
        let mut g = gfx(20, 20);
        g.set_text_color(RED, Some(BLUE));
        let advance = g.draw_char(u16::from(b' '), 0, 0);
        assert_eq!(advance, 6);
        assert_eq!(lit_pixels(&g, BLUE), 60);
        assert_eq!(g.panel().pixel(6, 0), BLACK);
    }

    #[test]
    fn test_scaled_glyph_doubles_coverage() {
        let mut g = gfx(40, 40);
        g.set_text_color(RED, None);
        g.draw_char(u16::from(b'H'), 0, 0);
        let single = lit_pixels(&g, RED);
        let mut g = gfx(40, 40);
        g.set_text_color(RED, None);
        g.set_text_size(2, 2);
        assert_eq!(g.draw_char(u16::from(b'H'), 0, 0), 12);
        assert_eq!(lit_pixels(&g, RED), single * 4);
    }

    #[test]
    fn test_glyph_codes_cover_printable_ascii() {
        assert_eq!(FONT_6X10.glyph_code(0), Some(0x20));
        assert_eq!(FONT_6X10.glyph_code(94), Some(0x7E));
        assert_eq!(FONT_6X10.glyph_code(95), None);
        assert_eq!(FONT_6X10.glyph_code(usize::MAX), None);
    }

    #[test]
    fn test_show_font_draws_whole_ascii_set() {
        let mut g = gfx(120, 60);
        g.set_font(&FONT_6X10);
        g.set_text_color(RED, None);
        // Twenty 6px cells per row, so the last row holds 15 glyphs.
        assert_eq!(g.show_font(0, 0, 0), 95);
        let rows: Vec<i32> = (0..60).filter(|&y| (0..120).any(|x| g.panel().pixel(x, y) == RED)).collect();
        assert!(rows.iter().all(|&y| y < 50));
        assert!(rows.iter().any(|&y| y >= 40));
        assert!((90..120).all(|x| (40..50).all(|y| g.panel().pixel(x, y) == BLACK)));
    }
}
