//! 1-bit bitmaps.
//!
//! Rows are byte aligned. Runs of equal bits leave as one span each; clear
//! bits are skipped unless a background color is given.

use embedded_graphics::pixelcolor::Rgb888;

use crate::color::Color;
use crate::gfx::Gfx;
use crate::panel::Panel;

impl<P: Panel> Gfx<P> {
    /// Bitmap with the most significant bit leftmost (Adafruit layout).
    pub fn draw_bitmap(
        &mut self,
        x: i32,
        y: i32,
        bitmap: &[u8],
        w: i32,
        h: i32,
        fg: Rgb888,
        bg: Option<Rgb888>,
    ) {
        self.write_bitmap(x, y, bitmap, w, h, fg, bg, false);
    }

    /// Bitmap with the least significant bit leftmost (XBM layout).
    pub fn draw_xbitmap(
        &mut self,
        x: i32,
        y: i32,
        bitmap: &[u8],
        w: i32,
        h: i32,
        fg: Rgb888,
        bg: Option<Rgb888>,
    ) {
        self.write_bitmap(x, y, bitmap, w, h, fg, bg, true);
    }

    fn write_bitmap(
        &mut self,
        x: i32,
        y: i32,
        bitmap: &[u8],
        w: i32,
        h: i32,
        fg: Rgb888,
        bg: Option<Rgb888>,
        lsb_first: bool,
    ) {
        if w < 1 || h < 1 {
            return;
        }
        let row_bytes = ((w + 7) >> 3) as usize;
        let format = self.panel.write_format();
        let fg = Color::new(fg, format);
        let bg = bg.map(|c| Color::new(c, format));

        self.start_write();
        for (j, row) in bitmap.chunks(row_bytes).take(h as usize).enumerate() {
            let bit = |i: i32| {
                let byte = row.get((i >> 3) as usize).copied().unwrap_or(0);
                let shift = i & 7;
                if lsb_first { (byte >> shift) & 1 != 0 } else { (byte << shift) & 0x80 != 0 }
            };
            let mut i = 0;
            while i < w {
                let set = bit(i);
                let start = i;
                while i < w && bit(i) == set {
                    i += 1;
                }
                let color = if set { Some(fg) } else { bg };
                if let Some(color) = color {
                    self.color = color;
                    self.write_fast_hline(x + start, y + j as i32, i - start);
                }
            }
        }
        self.end_write();
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{BLACK, BLUE, RED, gfx, lit_pixels};

    const GLYPH: [u8; 4] = [0b1010_0000, 0xFF, 0b0100_0000, 0x00];

    #[test]
    fn test_draw_bitmap_msb_first() {
        let mut g = gfx(16, 8);
        g.draw_bitmap(1, 1, &GLYPH[..2], 8, 2, RED, None);
        assert_eq!(g.panel().pixel(1, 1), RED);
        assert_eq!(g.panel().pixel(2, 1), BLACK);
        assert_eq!(g.panel().pixel(3, 1), RED);
        assert_eq!(lit_pixels(&g, RED), 2 + 8);
        assert_eq!(g.panel().write_count(), 3);
    }

    #[test]
    fn test_draw_xbitmap_lsb_first() {
        let mut g = gfx(16, 8);
        g.draw_xbitmap(0, 0, &GLYPH[..1], 8, 1, RED, None);
        assert_eq!(g.panel().pixel(5, 0), RED);
        assert_eq!(g.panel().pixel(7, 0), RED);
        assert_eq!(lit_pixels(&g, RED), 2);
    }

    #[test]
    fn test_background_fills_clear_bits() {
        let mut g = gfx(16, 8);
        g.draw_bitmap(0, 0, &GLYPH[..2], 8, 2, RED, Some(BLUE));
        assert_eq!(lit_pixels(&g, RED), 10);
        assert_eq!(lit_pixels(&g, BLUE), 6);
        // Row 0 alternates 1,0,1,00000; row 1 is one run.
        assert_eq!(g.panel().write_count(), 5);
    }

    #[test]
    fn test_odd_width_rows_are_byte_aligned() {
        let mut g = gfx(16, 8);
        // 3 pixels wide: each row still takes one byte.
        g.draw_bitmap(0, 0, &GLYPH[2..4], 3, 2, RED, None);
        assert_eq!(g.panel().pixel(1, 0), RED);
        assert_eq!(lit_pixels(&g, RED), 1);
    }

    #[test]
    fn test_short_bitmap_is_harmless() {
        let mut g = gfx(16, 8);
        g.draw_bitmap(0, 0, &GLYPH[..1], 8, 5, RED, None);
        assert_eq!(lit_pixels(&g, RED), 2);
    }
}
