//! QR codes.
//!
//! Encoding is done by `qrcodegen-no-heap` into two scratch buffers sized for
//! the largest symbol; drawing is one filled square per dark module.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use qrcodegen_no_heap::{QrCode, QrCodeEcc, Version};

use crate::error::{GfxError, GfxResult};
use crate::gfx::Gfx;
use crate::panel::Panel;

fn scratch(len: usize) -> GfxResult<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| GfxError::OutOfMemory)?;
    v.resize(len, 0);
    Ok(v)
}

impl<P: Panel> Gfx<P> {
    /// Draws `text` as a black-on-white QR code inside a `width` square at `(x, y)`.
    ///
    /// A negative `width` picks 90% of the shorter surface side, and `x` or
    /// `y` of `-1` centers the square. The symbol starts at `version`
    /// (1..=40) and grows until the text fits at the lowest error correction
    /// level. Modules are whole pixels; the leftover margin is split evenly
    /// around the symbol. When `width` is smaller than the symbol the square
    /// is left plain white.
    pub fn qrcode(
        &mut self,
        text: &str,
        mut x: i32,
        mut y: i32,
        mut width: i32,
        version: u8,
    ) -> GfxResult {
        if width < 0 {
            width = self.width.min(self.height) * 9 / 10;
        }
        if x == -1 || y == -1 {
            x = (self.width - width) >> 1;
            y = (self.height - width) >> 1;
        }

        let len = Version::MAX.buffer_len();
        let mut temp = scratch(len)?;
        let mut out = scratch(len)?;
        let min = Version::new(version.clamp(Version::MIN.value(), Version::MAX.value()));
        let qr = QrCode::encode_text(text, &mut temp, &mut out, QrCodeEcc::Low, min, Version::MAX, None, false)
            .map_err(|_| {
                log_warn!("qrcode: {} bytes do not fit a version 40 symbol", text.len());
                GfxError::TooLong
            })?;

        self.set_color(Rgb888::WHITE);
        self.start_write();
        self.write_fill_rect(x, y, width, width);
        let size = qr.size();
        let module = width / size;
        if module > 0 {
            let offset = (width - size * module) >> 1;
            let (x0, y0) = (x + offset, y + offset);
            self.set_color(Rgb888::BLACK);
            for my in 0..size {
                for mx in 0..size {
                    if qr.get_module(mx, my) {
                        self.write_fill_rect(x0 + mx * module, y0 + my * module, module, module);
                    }
                }
            }
        } else {
            log_debug!("qrcode: {}px is too small for {} modules", width, size);
        }
        self.end_write();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

    use crate::GfxError;
    use crate::frame_panel::PanelOp;
    use crate::test_support::{BLACK, gfx, lit_pixels};

    const WHITE: Rgb888 = Rgb888::WHITE;

    /// Color of the module at `(mx, my)` for 2px modules placed at the origin.
    fn module(
        g: &crate::Gfx<crate::FramePanel>,
        mx: i32,
        my: i32,
    ) -> Rgb888 {
        g.panel().pixel(mx * 2, my * 2)
    }

    #[test]
    fn test_finder_patterns_sit_in_three_corners() {
        let mut g = gfx(50, 50);
        g.qrcode("HELLO", 0, 0, 42, 1).unwrap();
        // Version 1 is 21 modules wide; 42px gives 2px modules and no margin.
        for (cx, cy) in [(0, 0), (14, 0), (0, 14)] {
            // Dark ring, light ring, dark 3x3 core.
            assert_eq!(module(&g, cx, cy), BLACK, "corner ({cx}, {cy})");
            assert_eq!(module(&g, cx + 6, cy + 6), BLACK);
            assert_eq!(module(&g, cx + 1, cy + 1), WHITE);
            assert_eq!(module(&g, cx + 5, cy + 3), WHITE);
            assert_eq!(module(&g, cx + 3, cy + 3), BLACK);
            assert_eq!(module(&g, cx + 2, cy + 4), BLACK);
        }
        // Separators around the top-left finder are light.
        assert_eq!(module(&g, 7, 7), WHITE);
        assert_eq!(module(&g, 7, 0), WHITE);
        // Nothing outside the square.
        assert_eq!(g.panel().pixel(45, 45), BLACK);
    }

    #[test]
    fn test_qrcode_is_one_write_batch() {
        let mut g = gfx(50, 50);
        g.qrcode("HELLO", 0, 0, 42, 1).unwrap();
        let ops = g.panel().ops();
        assert_eq!(ops.iter().filter(|op| **op == PanelOp::Begin).count(), 1);
        assert_eq!(ops.first(), Some(&PanelOp::Begin));
        assert_eq!(ops.last(), Some(&PanelOp::End));
    }

    #[test]
    fn test_margin_is_split_around_symbol() {
        let mut g = gfx(50, 50);
        g.qrcode("HELLO", 0, 0, 46, 1).unwrap();
        // 46px holds 2px modules with 2px of white on each side.
        assert_eq!(g.panel().pixel(1, 1), WHITE);
        assert_eq!(g.panel().pixel(2, 2), BLACK);
        assert_eq!(g.panel().pixel(43, 2), BLACK);
        assert_eq!(g.panel().pixel(44, 2), WHITE);
        assert_eq!(g.panel().pixel(45, 2), WHITE);
    }

    #[test]
    fn test_too_small_square_stays_white() {
        let mut g = gfx(20, 20);
        g.qrcode("HELLO", 0, 0, 10, 1).unwrap();
        assert_eq!(lit_pixels(&g, WHITE), 100);
    }

    #[test]
    fn test_default_width_is_centered() {
        let mut g = gfx(100, 60);
        g.qrcode("HELLO", -1, -1, -1, 1).unwrap();
        // 54px square at (23, 3); 2px modules leave a 6px margin.
        assert_eq!(g.panel().pixel(22, 10), BLACK);
        assert_eq!(g.panel().pixel(23, 3), WHITE);
        assert_eq!(g.panel().pixel(29, 9), BLACK);
        assert_eq!(g.panel().pixel(76, 56), WHITE);
        assert_eq!(g.panel().pixel(77, 56), BLACK);
    }

    #[test]
    fn test_text_too_long_draws_nothing() {
        let mut g = gfx(20, 20);
        let text = "x".repeat(3000);
        assert_eq!(g.qrcode(&text, 0, 0, 20, 1), Err(GfxError::TooLong));
        assert_eq!(lit_pixels(&g, BLACK), 400);
        assert!(g.panel().ops().is_empty());
    }
}
