//! The engine context.
//!
//! [`Gfx`] owns a [`Panel`] together with all mutable drawing state: clip
//! and scroll regions, the current and base colors, the transaction depth,
//! and the text cursor/style/font. There is no global state; two engines on
//! two panels never interact.
//!
//! # Write Primitives
//!
//! Every shape ends up in one of two calls: a clipped filled rectangle (a
//! span is a 1-high or 1-wide rectangle) or a clipped pixel block from the
//! blitter. The `write_*` methods assume an open transaction and the current
//! color; the public `draw_*`/`fill_*` methods open one and take a color.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::clip::{ClipRect, ScrollRect, normalize};
use crate::color::{Color, PixelFormat};
use crate::config::LINE_BUFFER_BYTES;
use crate::panel::Panel;
use crate::text::{FontSlot, TextState};

/// Drawing engine bound to one panel.
pub struct Gfx<P: Panel> {
    pub(crate) panel: P,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) clip: ClipRect,
    pub(crate) scroll: ScrollRect,
    pub(crate) color: Color,
    pub(crate) base_color: Color,
    pub(crate) text: TextState,
    pub(crate) font: FontSlot,
    write_depth: u32,
    transport_open: bool,
}

impl<P: Panel> Gfx<P> {
    /// Wraps a panel. The clip and scroll regions start as the whole surface.
    pub fn new(panel: P) -> Self {
        let width = panel.width() as i32;
        let height = panel.height() as i32;
        let format = panel.write_format();
        Self {
            panel,
            width,
            height,
            clip: ClipRect::full(width, height),
            scroll: ScrollRect::full(width, height),
            color: Color::new(Rgb888::WHITE, format),
            base_color: Color::new(Rgb888::BLACK, format),
            text: TextState::new(),
            font: FontSlot::default(),
            write_depth: 0,
            transport_open: false,
        }
    }

    #[inline]
    pub fn panel(&self) -> &P { &self.panel }

    #[inline]
    pub fn panel_mut(&mut self) -> &mut P { &mut self.panel }

    /// Gives the panel back.
    pub fn release(self) -> P { self.panel }

    #[inline]
    pub const fn width(&self) -> i32 { self.width }

    #[inline]
    pub const fn height(&self) -> i32 { self.height }

    #[inline]
    pub fn write_format(&self) -> PixelFormat { self.panel.write_format() }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Opens a (nested) write batch.
    pub fn start_write(&mut self) { self.start_write_with(true); }

    /// Opens a write batch, touching the transport only if `transaction` is true.
    ///
    /// A decoder whose byte source already shares the bus passes `false`:
    /// the owner of that source runs the transaction.
    pub fn start_write_with(
        &mut self,
        transaction: bool,
    ) {
        self.write_depth += 1;
        if self.write_depth == 1 && transaction {
            self.panel.begin_transaction();
            self.transport_open = true;
        }
    }

    /// Closes one level of batching. The outermost close ends the transaction.
    pub fn end_write(&mut self) {
        if self.write_depth == 0 {
            return;
        }
        self.write_depth -= 1;
        if self.write_depth == 0 && self.transport_open {
            self.transport_open = false;
            self.panel.end_transaction();
        }
    }

    /// Current nesting depth of `start_write`.
    #[inline]
    pub const fn write_depth(&self) -> u32 { self.write_depth }

    // =========================================================================
    // Colors
    // =========================================================================

    /// Sets the current drawing color.
    pub fn set_color(
        &mut self,
        color: Rgb888,
    ) {
        if color != self.color.rgb {
            self.color = Color::new(color, self.panel.write_format());
        }
    }

    #[inline]
    pub fn color(&self) -> Rgb888 { self.color.rgb }

    /// Color exposed by `scroll` and used by `clear`.
    pub fn set_base_color(
        &mut self,
        color: Rgb888,
    ) {
        self.base_color = Color::new(color, self.panel.write_format());
    }

    #[inline]
    pub fn base_color(&self) -> Rgb888 { self.base_color.rgb }

    // =========================================================================
    // Clip / Scroll
    // =========================================================================

    /// Restricts all drawing to a rectangle, intersected with the surface.
    pub fn set_clip_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) {
        self.clip = ClipRect::bounded(x, y, w, h, self.width, self.height);
    }

    /// Active clip as `(x, y, w, h)`.
    pub fn clip_rect(&self) -> (i32, i32, i32, i32) {
        let c = self.clip;
        (c.left, c.top, c.width().max(0), c.height().max(0))
    }

    pub fn clear_clip_rect(&mut self) { self.clip = ClipRect::full(self.width, self.height); }

    /// Region scrolled by `scroll` and by text wrapping in scroll mode.
    pub fn set_scroll_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) {
        let c = ClipRect::bounded(x, y, w, h, self.width, self.height);
        self.scroll = ScrollRect { x: c.left, y: c.top, w: c.width().max(0), h: c.height().max(0) };
    }

    /// Active scroll region as `(x, y, w, h)`.
    pub fn scroll_rect(&self) -> (i32, i32, i32, i32) {
        let s = self.scroll;
        (s.x, s.y, s.w, s.h)
    }

    pub fn clear_scroll_rect(&mut self) { self.scroll = ScrollRect::full(self.width, self.height); }

    // =========================================================================
    // Write Primitives (transaction already open, current color)
    // =========================================================================

    /// Sends an already clipped rectangle in the current color.
    #[inline]
    pub(crate) fn fill_preclipped(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) {
        self.panel.set_raw_color(self.color.raw);
        self.panel.write_fill_rect(x, y, w, h);
    }

    pub(crate) fn write_pixel(
        &mut self,
        x: i32,
        y: i32,
    ) {
        if self.clip.contains(x, y) {
            self.fill_preclipped(x, y, 1, 1);
        }
    }

    pub(crate) fn write_fast_hline(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
    ) {
        if let Some((x, y, w, h)) = self.clip.clip(x, y, w, 1) {
            self.fill_preclipped(x, y, w, h);
        }
    }

    pub(crate) fn write_fast_vline(
        &mut self,
        x: i32,
        y: i32,
        h: i32,
    ) {
        if let Some((x, y, w, h)) = self.clip.clip(x, y, 1, h) {
            self.fill_preclipped(x, y, w, h);
        }
    }

    pub(crate) fn write_fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) {
        if let Some((x, y, w, h)) = self.clip.clip(x, y, w, h) {
            self.fill_preclipped(x, y, w, h);
        }
    }

    // =========================================================================
    // Basic Drawing
    // =========================================================================

    pub fn draw_pixel(
        &mut self,
        x: i32,
        y: i32,
        color: Rgb888,
    ) {
        if !self.clip.contains(x, y) {
            return;
        }
        self.set_color(color);
        self.start_write();
        self.fill_preclipped(x, y, 1, 1);
        self.end_write();
    }

    pub fn draw_fast_hline(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        color: Rgb888,
    ) {
        self.fill_rect(x, y, w, 1, color);
    }

    pub fn draw_fast_vline(
        &mut self,
        x: i32,
        y: i32,
        h: i32,
        color: Rgb888,
    ) {
        self.fill_rect(x, y, 1, h, color);
    }

    /// Fills a rectangle; negative sizes extend left/up from `(x, y)`.
    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgb888,
    ) {
        let Some((x, y, w, h)) = self.clip.clip(x, y, w, h) else { return };
        self.set_color(color);
        self.start_write();
        self.fill_preclipped(x, y, w, h);
        self.end_write();
    }

    /// Fills the whole surface (within the clip).
    pub fn fill_screen(
        &mut self,
        color: Rgb888,
    ) {
        self.fill_rect(0, 0, self.width, self.height, color);
    }

    /// Fills the surface with the base color.
    pub fn clear(&mut self) { self.fill_screen(self.base_color.rgb); }

    // =========================================================================
    // Read Back / Copy / Scroll
    // =========================================================================

    /// Color of one pixel, black outside the surface.
    pub fn read_pixel(
        &mut self,
        x: i32,
        y: i32,
    ) -> Rgb888 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Rgb888::BLACK;
        }
        let format = self.panel.read_format();
        let mut raw = [0u8; 4];
        self.start_write();
        self.panel.read_rect(x, y, 1, 1, &mut raw);
        self.end_write();
        format.decode(format.read_raw(&raw, 0), None)
    }

    /// Reads a rectangle as packed RGB888 (3 bytes per pixel, rows back to back).
    ///
    /// The rectangle is clamped to the surface; `out` is filled row by row
    /// for the clamped area.
    pub fn read_rect_rgb(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        out: &mut [u8],
    ) {
        let bounds = ClipRect::full(self.width, self.height);
        let Some((x, y, w, h)) = bounds.clip(x, y, w, h) else { return };
        let format = self.panel.read_format();
        let chunk = (LINE_BUFFER_BYTES * 8 / format.depth.storage_bits() as usize).max(1) as i32;
        let mut buf = [0u8; LINE_BUFFER_BYTES];
        let mut out_px = 0usize;
        self.start_write();
        for row in y..y + h {
            let mut col = 0;
            while col < w {
                let n = chunk.min(w - col);
                self.panel.read_rect(x + col, row, n, 1, &mut buf);
                for i in 0..n as usize {
                    let c = format.decode(format.read_raw(&buf, i), None);
                    if let Some(dst) = out.get_mut(out_px * 3..out_px * 3 + 3) {
                        dst.copy_from_slice(&[c.r(), c.g(), c.b()]);
                    }
                    out_px += 1;
                }
                col += n;
            }
        }
        self.end_write();
    }

    /// Copies a rectangle of the surface to another position.
    ///
    /// Both rectangles are clamped to the surface (not to the clip).
    pub fn copy_rect(
        &mut self,
        mut dst_x: i32,
        mut dst_y: i32,
        mut w: i32,
        mut h: i32,
        mut src_x: i32,
        mut src_y: i32,
    ) {
        if normalize(&mut src_x, &mut w) || normalize(&mut src_y, &mut h) {
            return;
        }
        if !clamp_copy_axis(&mut dst_x, &mut src_x, &mut w, self.width)
            || !clamp_copy_axis(&mut dst_y, &mut src_y, &mut h, self.height)
        {
            return;
        }
        self.start_write();
        self.panel.copy_rect(dst_x, dst_y, w, h, src_x, src_y);
        self.end_write();
    }

    /// Moves the scroll region's content by `(dx, dy)`, exposing the base color.
    pub fn scroll(
        &mut self,
        dx: i32,
        dy: i32,
    ) {
        let ScrollRect { x: sx, y: sy, w: sw, h: sh } = self.scroll;
        if sw <= 0 || sh <= 0 {
            return;
        }
        let previous = self.color;
        self.color = self.base_color;
        self.start_write();
        if dx.unsigned_abs() >= sw.unsigned_abs() || dy.unsigned_abs() >= sh.unsigned_abs() {
            self.fill_preclipped(sx, sy, sw, sh);
        } else {
            let w = sw - dx.abs();
            let h = sh - dy.abs();
            let src_x = if dx < 0 { sx - dx } else { sx };
            let src_y = if dy < 0 { sy - dy } else { sy };
            let dst_x = src_x + dx;
            let dst_y = src_y + dy;
            if dx != 0 || dy != 0 {
                self.panel.copy_rect(dst_x, dst_y, w, h, src_x, src_y);
            }
            if dx > 0 {
                self.fill_preclipped(sx, dst_y, dx, h);
            } else if dx < 0 {
                self.fill_preclipped(sx + sw + dx, dst_y, -dx, h);
            }
            if dy > 0 {
                self.fill_preclipped(sx, sy, sw, dy);
            } else if dy < 0 {
                self.fill_preclipped(sx, sy + sh + dy, sw, -dy);
            }
        }
        self.end_write();
        self.color = previous;
    }
}

/// Clamps one axis of a copy so both source and destination stay on the surface.
fn clamp_copy_axis(
    dst: &mut i32,
    src: &mut i32,
    len: &mut i32,
    limit: i32,
) -> bool {
    let (d, s) = (i64::from(*dst), i64::from(*src));
    let skip = (-d).max(-s).max(0);
    let (d, s) = (d + skip, s + skip);
    let n = (i64::from(*len) - skip).min(i64::from(limit) - d).min(i64::from(limit) - s);
    if n <= 0 {
        return false;
    }
    // All three now lie within `0..=limit`.
    *dst = d as i32;
    *src = s as i32;
    *len = n as i32;
    true
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_panel::PanelOp;
    use crate::test_support::gfx;

    const RED: Rgb888 = Rgb888::new(255, 0, 0);
    const BLUE: Rgb888 = Rgb888::new(0, 0, 255);

    #[test]
    fn test_rects_outside_clip_write_nothing() {
        let mut g = gfx(100, 100);
        g.set_clip_rect(20, 20, 40, 40);
        g.fill_rect(0, 0, 20, 100, RED);
        g.fill_rect(60, 0, 10, 10, RED);
        g.fill_rect(20, 60, 40, 5, RED);
        g.fill_rect(30, 30, 0, 10, RED);
        g.draw_fast_hline(-50, 10, 200, RED);
        g.draw_pixel(19, 19, RED);
        assert_eq!(g.panel().write_count(), 0);
    }

    #[test]
    fn test_fill_rect_is_clamped() {
        let mut g = gfx(100, 100);
        g.set_clip_rect(10, 10, 20, 20);
        g.fill_rect(0, 0, 100, 15, RED);
        let fills: Vec<PanelOp> = g.panel().ops().iter().copied().filter(PanelOp::is_write).collect();
        assert_eq!(fills, [PanelOp::Fill { x: 10, y: 10, w: 20, h: 5, raw: 0xFF_0000 }]);
    }

    #[test]
    fn test_nested_writes_open_one_transaction() {
        let mut g = gfx(10, 10);
        g.start_write();
        g.fill_rect(0, 0, 2, 2, RED);
        g.fill_rect(4, 4, 2, 2, BLUE);
        assert_eq!(g.panel().open_transactions(), 1);
        g.end_write();
        g.end_write();
        let begins = g.panel().ops().iter().filter(|op| **op == PanelOp::Begin).count();
        let ends = g.panel().ops().iter().filter(|op| **op == PanelOp::End).count();
        assert_eq!((begins, ends), (1, 1));
        assert_eq!(g.write_depth(), 0);
    }

    #[test]
    fn test_start_write_without_transaction() {
        let mut g = gfx(10, 10);
        g.start_write_with(false);
        g.fill_rect(0, 0, 2, 2, RED);
        g.end_write();
        assert!(!g.panel().ops().contains(&PanelOp::Begin));
        assert!(!g.panel().ops().contains(&PanelOp::End));
    }

    #[test]
    fn test_clip_rect_round_trip() {
        let mut g = gfx(100, 80);
        g.set_clip_rect(90, -10, 30, 30);
        assert_eq!(g.clip_rect(), (90, 0, 10, 20));
        g.clear_clip_rect();
        assert_eq!(g.clip_rect(), (0, 0, 100, 80));
    }

    #[test]
    fn test_read_rect_rgb() {
        let mut g = gfx(8, 8);
        g.fill_rect(2, 2, 2, 1, Rgb888::new(1, 2, 3));
        let mut out = [0u8; 9];
        g.read_rect_rgb(1, 2, 3, 1, &mut out);
        assert_eq!(out, [0, 0, 0, 1, 2, 3, 1, 2, 3]);
        assert_eq!(g.read_pixel(3, 2), Rgb888::new(1, 2, 3));
    }

    #[test]
    fn test_scroll_exposes_base_color() {
        let mut g = gfx(4, 4);
        g.fill_rect(0, 3, 4, 1, RED);
        g.set_base_color(BLUE);
        g.scroll(0, -1);
        assert_eq!(g.panel().pixel(0, 2), RED);
        assert_eq!(g.panel().pixel(0, 3), BLUE);
        assert_eq!(g.color(), RED);
    }

    #[test]
    fn test_copy_rect_clamps_to_surface() {
        let mut g = gfx(10, 10);
        g.fill_rect(0, 0, 2, 2, RED);
        g.copy_rect(8, 8, 5, 5, 0, 0);
        assert_eq!(g.panel().pixel(9, 9), RED);
        assert!(g.panel().ops().contains(&PanelOp::Copy { dst_x: 8, dst_y: 8, w: 2, h: 2, src_x: 0, src_y: 0 }));
    }

    #[test]
    fn test_copy_rect_extreme_extents() {
        let mut g = gfx(10, 10);
        g.copy_rect(0, 0, i32::MIN, i32::MIN, 5, 5);
        g.copy_rect(i32::MIN, 0, i32::MAX, 10, 0, 0);
        g.copy_rect(i32::MAX, i32::MAX, 4, 4, 0, 0);
        assert!(!g.panel().ops().iter().any(|op| matches!(op, PanelOp::Copy { .. })));

        g.copy_rect(-3, 0, i32::MAX, 4, 0, 0);
        assert!(g.panel().ops().contains(&PanelOp::Copy { dst_x: 0, dst_y: 0, w: 7, h: 4, src_x: 3, src_y: 0 }));
    }

    #[test]
    fn test_scroll_by_extreme_offset_clears_region() {
        let mut g = gfx(4, 4);
        g.fill_screen(RED);
        g.set_base_color(BLUE);
        g.scroll(i32::MIN, i32::MIN);
        assert_eq!(g.panel().pixel(3, 3), BLUE);
    }
}
