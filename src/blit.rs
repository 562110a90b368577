//! Image placement.
//!
//! Images are described by a [`PixelCopy`] and leave the engine one row
//! chunk at a time: the chunk is converted into a line buffer and sent with
//! a single `write_pixels`. Transparent source pixels split a row into
//! separate chunks.
//!
//! # Rotate / Zoom
//!
//! [`Gfx::push_image_rotate_zoom`] inverts the transform once: per
//! destination step the source cursor moves by fixed `FP_SCALE` increments,
//! so each destination row is a straight walk through the source. The
//! visible part of a row is the clip range narrowed by the four edges of the
//! rotated source rectangle.

use embedded_graphics::pixelcolor::Rgb888;
use libm::{cosf, roundf, sinf};

use crate::color::{ColorDepth, PixelFormat};
use crate::config::{DEG_TO_RAD, FP_SCALE, LINE_BUFFER_BYTES, LINE_BUFFER_PIXELS};
use crate::gfx::Gfx;
use crate::panel::Panel;
use crate::pixelcopy::PixelCopy;

const FP_HALF: i64 = 1 << (FP_SCALE - 1);

// =============================================================================
// Line Buffers
// =============================================================================

/// Two line buffers used alternately when the panel sends asynchronously.
struct LineBuffers {
    bufs: [[u8; LINE_BUFFER_BYTES]; 2],
    next: usize,
    in_flight: usize,
    dma: bool,
}

impl LineBuffers {
    fn new(dma: bool) -> Self { Self { bufs: [[0; LINE_BUFFER_BYTES]; 2], next: 0, in_flight: 0, dma } }

    /// Converts up to `len` pixels from the cursor and sends them at `(x, y)`.
    ///
    /// Returns the number of pixels sent; 0 means the cursor is on a
    /// transparent pixel.
    fn send<P: Panel>(
        &mut self,
        panel: &mut P,
        pc: &mut PixelCopy<'_>,
        x: i32,
        y: i32,
        len: usize,
    ) -> usize {
        if self.dma && self.in_flight == self.bufs.len() {
            panel.wait_dma();
            self.in_flight = 0;
        }
        let buf = &mut self.bufs[self.next];
        let n = pc.copy_run(buf, 0, len.min(LINE_BUFFER_PIXELS));
        if n == 0 {
            return 0;
        }
        let bytes = pc.dst_format().row_bytes(n).min(buf.len());
        panel.write_pixels(x, y, n as i32, 1, &buf[..bytes]);
        if self.dma {
            self.in_flight += 1;
            self.next ^= 1;
        }
        n
    }

    /// Waits for outstanding transfers before the buffers go away.
    fn finish<P: Panel>(
        &mut self,
        panel: &mut P,
    ) {
        if self.in_flight > 0 {
            panel.wait_dma();
            self.in_flight = 0;
        }
    }
}

impl<P: Panel> Gfx<P> {
    /// Sends `w` pixels from the cursor of `pc` to row `y` starting at `x`.
    ///
    /// The range must already be clipped.
    fn push_row(
        &mut self,
        bufs: &mut LineBuffers,
        pc: &mut PixelCopy<'_>,
        x: i32,
        y: i32,
        w: i32,
    ) {
        let mut i = 0;
        while i < w {
            let skipped = pc.skip_run((w - i) as usize) as i32;
            i += skipped;
            if i >= w {
                break;
            }
            let sent = bufs.send(&mut self.panel, pc, x + i, y, (w - i) as usize) as i32;
            if sent == 0 && skipped == 0 {
                break;
            }
            i += sent;
        }
    }

    // =========================================================================
    // Plain Placement
    // =========================================================================

    /// Draws the top-left `w` x `h` pixels of the image in `pc` at `(x, y)`.
    pub fn push_image(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        pc: &mut PixelCopy<'_>,
    ) {
        let c = self.clip;
        let (dx, x, dw) = clip_source_axis(x, w, c.left, c.right);
        let (dy, y, dh) = clip_source_axis(y, h, c.top, c.bottom);
        if dw <= 0 || dh <= 0 {
            return;
        }

        pc.set_dst_format(self.panel.write_format());
        let mut bufs = LineBuffers::new(self.panel.supports_dma());
        self.start_write();
        for row in 0..dh {
            pc.set_position(dx, dy + row);
            self.push_row(&mut bufs, pc, x, y + row, dw);
        }
        bufs.finish(&mut self.panel);
        self.end_write();
    }

    /// RGB565 image, two bytes per pixel, high byte first.
    pub fn push_image_rgb565(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &[u8],
    ) {
        self.push_image_as(x, y, w, h, data, PixelFormat::RGB565);
    }

    /// RGB888 image, bytes in R, G, B order.
    pub fn push_image_rgb888(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &[u8],
    ) {
        self.push_image_as(x, y, w, h, data, PixelFormat::RGB888);
    }

    pub fn push_image_rgb332(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &[u8],
    ) {
        self.push_image_as(x, y, w, h, data, PixelFormat::RGB332);
    }

    /// Palette image at 1, 2, 4 or 8 bits per pixel; sub-byte rows are byte aligned.
    pub fn push_image_indexed(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &[u8],
        depth: ColorDepth,
        palette: &[Rgb888],
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        let format = PixelFormat::indexed(depth);
        let mut pc = PixelCopy::new(data, w as u32, h as u32, format, self.panel.write_format()).with_palette(palette);
        self.push_image(x, y, w, h, &mut pc);
    }

    fn push_image_as(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &[u8],
        format: PixelFormat,
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        let mut pc = PixelCopy::new(data, w as u32, h as u32, format, self.panel.write_format());
        self.push_image(x, y, w, h, &mut pc);
    }

    // =========================================================================
    // Rotate / Zoom
    // =========================================================================

    /// Draws the image in `pc` rotated by `angle` degrees (clockwise) and scaled.
    ///
    /// Source pixel `(src_x, src_y)` lands on `(dst_x, dst_y)`. A zero or
    /// non-finite zoom draws nothing, and so does a zoom small enough that
    /// one destination pixel would step over more than `i32` fixed-point
    /// source units.
    pub fn push_image_rotate_zoom(
        &mut self,
        dst_x: i32,
        dst_y: i32,
        src_x: i32,
        src_y: i32,
        angle: f32,
        zoom_x: f32,
        zoom_y: f32,
        pc: &mut PixelCopy<'_>,
    ) {
        if zoom_x == 0.0 || zoom_y == 0.0 || !zoom_x.is_finite() || !zoom_y.is_finite() {
            return;
        }
        let w = i64::from(pc.src_width());
        let h = i64::from(pc.src_height());
        if w <= 0 || h <= 0 {
            return;
        }
        let (src_x, src_y) = (i64::from(src_x), i64::from(src_y));
        let (dst_x, dst_y) = (i64::from(dst_x), i64::from(dst_y));
        let c = self.clip;

        let radians = -angle * DEG_TO_RAD;
        let one = (1i64 << FP_SCALE) as f32;
        let sin_f = sinf(radians) * one;
        let cos_f = cosf(radians) * one;

        let steps = (
            fixed_step(cos_f / zoom_x),
            fixed_step(sin_f / zoom_x),
            fixed_step(sin_f / zoom_y),
            fixed_step(cos_f / zoom_y),
        );
        let (Some(cos_x), Some(sin_x), Some(sin_y), Some(cos_y)) = steps else {
            log_debug!("rotate/zoom: step out of range for zoom {}x{}", zoom_x, zoom_y);
            return;
        };
        pc.src_x32_add = cos_x;
        pc.src_y32_add = sin_y;
        let (cos_x, sin_x, sin_y, cos_y) = (i64::from(cos_x), -i64::from(sin_x), i64::from(sin_y), i64::from(cos_y));

        // Vertical extent of the rotated source rectangle.
        let (min_y, max_y) = {
            // Float-to-int casts saturate; a huge zoom saturates the extent.
            let sinra = roundf(sin_f * zoom_x) as i64;
            let cosra = roundf(cos_f * zoom_y) as i64;
            let wp = (src_x - w).saturating_mul(sinra);
            let sx = (src_x + 1).saturating_mul(sinra);
            let hp = (h - src_y).saturating_mul(cosra);
            let sy = (-1 - src_y).saturating_mul(cosra);
            let (a, b) = if (sinra < 0) == (cosra < 0) {
                (wp.saturating_add(sy), sx.saturating_add(hp))
            } else {
                (sx.saturating_add(sy), wp.saturating_add(hp))
            };
            (a.min(b), a.max(b))
        };
        let max_y = i64::from(c.bottom).min((max_y.saturating_add(FP_HALF) >> FP_SCALE) + dst_y) + 1;
        let mut y = i64::from(c.top).max((min_y.saturating_add(FP_HALF) >> FP_SCALE) + dst_y);
        if y >= max_y {
            return;
        }

        let xt = -dst_x;
        let yt = y - dst_y - 1;

        let mut xstart = cos_x * xt + sin_x * yt + (src_x << FP_SCALE) + FP_HALF;
        let scale_w = w << FP_SCALE;
        let xs1 = (if cos_x < 0 { -scale_w } else { 1 }) - cos_x;
        let xs2 = (if cos_x < 0 { 0 } else { 1 - scale_w }) - cos_x;

        let mut ystart = sin_y * xt + cos_y * yt + (src_y << FP_SCALE) + FP_HALF;
        let scale_h = h << FP_SCALE;
        let ys1 = (if sin_y < 0 { -scale_h } else { 1 }) - sin_y;
        let ys2 = (if sin_y < 0 { 0 } else { 1 - scale_h }) - sin_y;

        pc.set_dst_format(self.panel.write_format());

        let mut bufs = LineBuffers::new(self.panel.supports_dma());
        self.start_write();
        while y < max_y {
            let mut left = i64::from(c.left);
            let mut right = i64::from(c.right) + 1;
            xstart += sin_x;
            if cos_x != 0 {
                left = left.max((xstart + xs1) / -cos_x);
                right = right.min((xstart + xs2) / -cos_x);
            }
            ystart += cos_y;
            if sin_y != 0 {
                left = left.max((ystart + ys1) / -sin_y);
                right = right.min((ystart + ys2) / -sin_y);
            }
            if left < right {
                let x32 = xstart + left * cos_x;
                let y32 = ystart + left * sin_y;
                let inside = ((x32 >> FP_SCALE) as u64) < w as u64 && ((y32 >> FP_SCALE) as u64) < h as u64;
                if let (true, Ok(sx), Ok(sy)) = (inside, i32::try_from(x32), i32::try_from(y32)) {
                    pc.src_x32 = sx;
                    pc.src_y32 = sy;
                    self.push_row(&mut bufs, pc, left as i32, y as i32, (right - left) as i32);
                }
            }
            y += 1;
        }
        bufs.finish(&mut self.panel);
        self.end_write();
    }
}

/// Clips `len` pixels at `pos` to `lo..=hi`.
///
/// Returns the source pixels skipped, the clipped position and the clipped
/// length (0 when nothing is left).
fn clip_source_axis(
    pos: i32,
    len: i32,
    lo: i32,
    hi: i32,
) -> (i32, i32, i32) {
    let skip = (i64::from(lo) - i64::from(pos)).max(0);
    let start = i64::from(pos) + skip;
    let len = (i64::from(len) - skip).min(i64::from(hi) + 1 - start);
    if len <= 0 {
        return (0, pos, 0);
    }
    // A visible run skips fewer than `len` pixels and starts inside the clip.
    (skip as i32, start as i32, len as i32)
}

/// Rounds a fixed-point step, `None` when it does not fit the `i32` cursor.
#[inline]
fn fixed_step(v: f32) -> Option<i32> {
    if !v.is_finite() {
        return None;
    }
    i32::try_from(roundf(v) as i64).ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FramePanel;
    use crate::frame_panel::PanelOp;
    use crate::test_support::{BLACK, gfx};

    /// 10x10 RGB888 image where pixel (x, y) is `(x * 20, y * 20, 7)`.
    fn gradient() -> Vec<u8> {
        let mut data = Vec::new();
        for y in 0..10u8 {
            for x in 0..10u8 {
                data.extend_from_slice(&[x * 20, y * 20, 7]);
            }
        }
        data
    }

    fn source_color(
        x: i32,
        y: i32,
    ) -> Rgb888 {
        Rgb888::new((x * 20) as u8, (y * 20) as u8, 7)
    }

    #[test]
    fn test_push_image_places_pixels() {
        let data = gradient();
        let mut g = gfx(20, 20);
        g.push_image_rgb888(3, 4, 10, 10, &data);
        assert_eq!(g.panel().pixel(3, 4), source_color(0, 0));
        assert_eq!(g.panel().pixel(12, 13), source_color(9, 9));
        assert_eq!(g.panel().pixel(2, 4), BLACK);
        assert_eq!(g.panel().write_count(), 10);
    }

    #[test]
    fn test_push_image_clips_and_offsets_source() {
        let data = gradient();
        let mut g = gfx(20, 20);
        g.set_clip_rect(5, 6, 4, 3);
        g.push_image_rgb888(2, 2, 10, 10, &data);
        assert_eq!(g.panel().pixel(5, 6), source_color(3, 4));
        assert_eq!(g.panel().pixel(8, 8), source_color(6, 6));
        let ops: Vec<PanelOp> = g.panel().ops().iter().copied().filter(PanelOp::is_write).collect();
        assert_eq!(ops.len(), 3);
        assert!(ops.iter().all(|op| matches!(op, PanelOp::Pixels { x: 5, w: 4, h: 1, .. })));
    }

    #[test]
    fn test_push_image_outside_clip_writes_nothing() {
        let data = gradient();
        let mut g = gfx(20, 20);
        g.push_image_rgb888(20, 0, 10, 10, &data);
        g.push_image_rgb888(-10, 0, 10, 10, &data);
        g.push_image_rgb888(0, 0, 0, 10, &data);
        assert_eq!(g.panel().write_count(), 0);
    }

    #[test]
    fn test_push_image_far_left_origin() {
        let data = gradient();
        let mut g = gfx(20, 20);
        g.push_image_rgb888(i32::MIN, i32::MIN, 10, 10, &data);
        assert_eq!(g.panel().write_count(), 0);
        g.push_image_rgb888(-4, -6, 10, 10, &data);
        assert_eq!(g.panel().pixel(0, 0), source_color(4, 6));
        assert_eq!(g.panel().write_count(), 4);
    }

    #[test]
    fn test_transparent_pixels_are_skipped() {
        // 4x1 RGB565: red, key, key, blue.
        let data = [0xF8, 0x00, 0x12, 0x34, 0x12, 0x34, 0x00, 0x1F];
        let mut pc = PixelCopy::new(&data, 4, 1, PixelFormat::RGB565, PixelFormat::RGB888).with_transparent(0x1234);
        let mut g = gfx(8, 2);
        g.fill_rect(0, 0, 8, 2, Rgb888::new(1, 1, 1));
        g.panel_mut().clear_ops();
        g.push_image(0, 0, 4, 1, &mut pc);
        assert_eq!(g.panel().pixel(0, 0), Rgb888::new(255, 0, 0));
        assert_eq!(g.panel().pixel(1, 0), Rgb888::new(1, 1, 1));
        assert_eq!(g.panel().pixel(2, 0), Rgb888::new(1, 1, 1));
        assert_eq!(g.panel().pixel(3, 0), Rgb888::new(0, 0, 255));
        assert_eq!(g.panel().write_count(), 2);
    }

    #[test]
    fn test_indexed_image_uses_palette() {
        let palette = [Rgb888::new(0, 0, 0), Rgb888::new(10, 20, 30), Rgb888::new(40, 50, 60), Rgb888::new(1, 2, 3)];
        // 3 pixels at 2 bits: 1, 2, 3.
        let data = [0b0110_1100];
        let mut g = gfx(4, 1);
        g.push_image_indexed(0, 0, 3, 1, &data, ColorDepth::Bits2, &palette);
        assert_eq!(g.panel().pixel(0, 0), palette[1]);
        assert_eq!(g.panel().pixel(1, 0), palette[2]);
        assert_eq!(g.panel().pixel(2, 0), palette[3]);
    }

    #[test]
    fn test_long_rows_ping_pong_with_dma() {
        let data: Vec<u8> = (0..300u32).flat_map(|i| [i as u8, 0, 0]).collect();
        let panel = FramePanel::new(300, 1, PixelFormat::RGB888).unwrap().with_recording().with_dma();
        let mut g = crate::Gfx::new(panel);
        g.push_image_rgb888(0, 0, 300, 1, &data);
        // 128 + 128 + 44 pixels: one wait before reusing a buffer, one at the end.
        assert_eq!(g.panel().write_count(), 3);
        assert_eq!(g.panel().dma_waits(), 2);
        assert_eq!(g.panel().pixel(299, 0), Rgb888::new(43, 0, 0));
    }

    #[test]
    fn test_rotate_zoom_identity_matches_plain() {
        let data = gradient();
        let mut plain = gfx(30, 30);
        plain.push_image_rgb888(5, 7, 10, 10, &data);

        let mut rotated = gfx(30, 30);
        let mut pc = PixelCopy::new(&data, 10, 10, PixelFormat::RGB888, PixelFormat::RGB888);
        rotated.push_image_rotate_zoom(5, 7, 0, 0, 0.0, 1.0, 1.0, &mut pc);
        assert_eq!(plain.panel().data(), rotated.panel().data());
    }

    #[test]
    fn test_rotate_90_matches_manual_rotation() {
        let data = gradient();
        let mut g = gfx(40, 40);
        let mut pc = PixelCopy::new(&data, 10, 10, PixelFormat::RGB888, PixelFormat::RGB888);
        g.push_image_rotate_zoom(20, 20, 5, 5, 90.0, 1.0, 1.0, &mut pc);

        // Manually rotated reference: (sx, sy) -> (20 - (sy - 5), 20 + (sx - 5)).
        let mut expect = gfx(40, 40);
        for sy in 0..10 {
            for sx in 0..10 {
                expect.panel_mut().set_pixel(25 - sy, 15 + sx, source_color(sx, sy));
            }
        }
        assert_eq!(g.panel().data(), expect.panel().data());
    }

    #[test]
    fn test_rotate_180_about_center() {
        let data = gradient();
        let mut g = gfx(40, 40);
        let mut pc = PixelCopy::new(&data, 10, 10, PixelFormat::RGB888, PixelFormat::RGB888);
        g.push_image_rotate_zoom(20, 20, 5, 5, 180.0, 1.0, 1.0, &mut pc);
        assert_eq!(g.panel().pixel(20, 20), source_color(5, 5));
        assert_eq!(g.panel().pixel(24, 24), source_color(1, 1));
        assert_eq!(g.panel().pixel(15, 15), BLACK);
    }

    #[test]
    fn test_zoom_doubles_coverage() {
        let data = gradient();
        let mut g = gfx(40, 40);
        let mut pc = PixelCopy::new(&data, 10, 10, PixelFormat::RGB888, PixelFormat::RGB888);
        g.push_image_rotate_zoom(4, 4, 0, 0, 0.0, 2.0, 2.0, &mut pc);
        let covered = (0..40).flat_map(|y| (0..40).map(move |x| (x, y))).filter(|&(x, y)| g.panel().pixel(x, y) != BLACK).count();
        assert_eq!(covered, 400);
        assert_eq!(g.panel().pixel(4, 4), source_color(0, 0));
    }

    #[test]
    fn test_extreme_zooms_do_not_wrap() {
        let data = gradient();
        let mut g = gfx(20, 20);
        let mut pc = PixelCopy::new(&data, 10, 10, PixelFormat::RGB888, PixelFormat::RGB888);
        g.push_image_rotate_zoom(10, 10, 5, 5, 30.0, 1e-9, 1e-9, &mut pc);
        g.push_image_rotate_zoom(10, 10, 5, 5, 0.0, 1e-9, 1.0, &mut pc);
        g.push_image_rotate_zoom(10, 10, 5, 5, 0.0, f32::INFINITY, 1.0, &mut pc);
        g.push_image_rotate_zoom(10, 10, 5, 5, f32::NAN, 1.0, 1.0, &mut pc);
        assert!(g.panel().ops().is_empty());

        // Every destination pixel maps onto the anchor pixel.
        g.push_image_rotate_zoom(10, 10, 5, 5, 0.0, 1e30, 1e30, &mut pc);
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(g.panel().pixel(x, y), source_color(5, 5), "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_zero_zoom_is_noop() {
        let data = gradient();
        let mut g = gfx(20, 20);
        let mut pc = PixelCopy::new(&data, 10, 10, PixelFormat::RGB888, PixelFormat::RGB888);
        g.push_image_rotate_zoom(10, 10, 5, 5, 30.0, 0.0, 1.0, &mut pc);
        g.push_image_rotate_zoom(10, 10, 5, 5, 30.0, 1.0, 0.0, &mut pc);
        assert!(g.panel().ops().is_empty());
    }
}
