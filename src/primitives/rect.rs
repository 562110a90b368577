//! Rectangle outlines and rounded rectangles.

use embedded_graphics::pixelcolor::Rgb888;

use crate::clip::{normalize, trim_extent};
use crate::gfx::Gfx;
use crate::panel::Panel;

/// Largest corner radius that fits a `w` x `h` rectangle.
#[inline]
fn clamp_radius(
    r: i32,
    w: i32,
    h: i32,
) -> i32 {
    r.min(w.min(h) / 2).max(0)
}

impl<P: Panel> Gfx<P> {
    /// Trims a normalized rectangle to `margin` pixels around the clip.
    ///
    /// Returns `true` when the rectangle misses the clip entirely.
    fn trim_outline(
        &self,
        x: &mut i32,
        y: &mut i32,
        w: &mut i32,
        h: &mut i32,
        margin: i32,
    ) -> bool {
        let c = self.clip;
        let misses = |pos: i32, len: i32, lo: i32, hi: i32| pos > hi || i64::from(pos) + i64::from(len) <= i64::from(lo);
        if misses(*x, *w, c.left, c.right) || misses(*y, *h, c.top, c.bottom) {
            return true;
        }
        trim_extent(x, w, c.left, c.right, margin);
        trim_extent(y, h, c.top, c.bottom, margin);
        *w == 0 || *h == 0
    }

    /// One-pixel outline; the four edges never overlap.
    pub fn draw_rect(
        &mut self,
        mut x: i32,
        mut y: i32,
        mut w: i32,
        mut h: i32,
        color: Rgb888,
    ) {
        if normalize(&mut x, &mut w) || normalize(&mut y, &mut h) {
            return;
        }
        if self.trim_outline(&mut x, &mut y, &mut w, &mut h, 1) {
            return;
        }
        self.set_color(color);
        self.start_write();
        self.write_fast_hline(x, y, w);
        h -= 1;
        if h > 0 {
            self.write_fast_hline(x, y + h, w);
            h -= 1;
            if h > 0 {
                self.write_fast_vline(x, y + 1, h);
                self.write_fast_vline(x + w - 1, y + 1, h);
            }
        }
        self.end_write();
    }

    pub fn draw_round_rect(
        &mut self,
        mut x: i32,
        mut y: i32,
        mut w: i32,
        mut h: i32,
        r: i32,
        color: Rgb888,
    ) {
        if normalize(&mut x, &mut w) || normalize(&mut y, &mut h) {
            return;
        }
        let mut r = clamp_radius(r, w, h);
        if self.trim_outline(&mut x, &mut y, &mut w, &mut h, (r << 1) + 1) {
            return;
        }
        self.set_color(color);
        self.start_write();

        w -= 1;
        h -= 1;
        let edge = (r << 1) + 1;
        let y0 = y + r;
        let y1 = y + h - r;
        let x0 = x + r;
        let x1 = x + w - r;
        if h - edge > 0 {
            self.write_fast_vline(x, y0 + 1, h - edge);
            self.write_fast_vline(x + w, y0 + 1, h - edge);
        }
        if w - edge > 0 {
            self.write_fast_hline(x0 + 1, y, w - edge);
            self.write_fast_hline(x0 + 1, y + h, w - edge);
        }

        let mut f = 1 - r;
        let mut dd_y = -(r << 1);
        let mut dd_x = 1;
        let mut len = 0;
        let mut i = 0;
        while i <= r {
            len += 1;
            if f >= 0 {
                self.write_fast_hline(x0 - i, y0 - r, len);
                self.write_fast_hline(x0 - i, y1 + r, len);
                self.write_fast_hline(x1 + i - len + 1, y1 + r, len);
                self.write_fast_hline(x1 + i - len + 1, y0 - r, len);
                self.write_fast_vline(x1 + r, y1 + i - len + 1, len);
                self.write_fast_vline(x0 - r, y1 + i - len + 1, len);
                self.write_fast_vline(x1 + r, y0 - i, len);
                self.write_fast_vline(x0 - r, y0 - i, len);
                len = 0;
                r -= 1;
                dd_y += 2;
                f += dd_y;
            }
            dd_x += 2;
            f += dd_x;
            i += 1;
        }
        self.end_write();
    }

    pub fn fill_round_rect(
        &mut self,
        mut x: i32,
        mut y: i32,
        mut w: i32,
        mut h: i32,
        r: i32,
        color: Rgb888,
    ) {
        if normalize(&mut x, &mut w) || normalize(&mut y, &mut h) {
            return;
        }
        let mut r = clamp_radius(r, w, h);
        if self.trim_outline(&mut x, &mut y, &mut w, &mut h, (r << 1) + 1) {
            return;
        }
        self.set_color(color);
        self.start_write();

        let y2 = y + r;
        let y1 = y + h - r - 1;
        let mut dd_y = -(r << 1);
        let delta = w + dd_y;
        self.write_fill_rect(x, y2, w, h + dd_y);

        let x0 = x + r;
        let mut f = 1 - r;
        let mut dd_x = 1;
        let mut len = 0;
        let mut i = 0;
        while i <= r {
            len += 1;
            if f >= 0 {
                self.write_fill_rect(x0 - r, y2 - i, (r << 1) + delta, len);
                self.write_fill_rect(x0 - r, y1 + i - len + 1, (r << 1) + delta, len);
                if i == r {
                    break;
                }
                len = 0;
                self.write_fast_hline(x0 - i, y1 + r, (i << 1) + delta);
                dd_y += 2;
                f += dd_y;
                self.write_fast_hline(x0 - i, y2 - r, (i << 1) + delta);
                r -= 1;
            }
            dd_x += 2;
            f += dd_x;
            i += 1;
        }
        self.end_write();
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{RED, gfx, lit_pixels, row_extents};

    #[test]
    fn test_draw_rect_outline() {
        let mut g = gfx(20, 20);
        g.draw_rect(2, 3, 5, 4, RED);
        assert_eq!(lit_pixels(&g, RED), 2 * 5 + 2 * 2);
        assert_eq!(g.panel().write_count(), 4);
        assert_eq!(g.panel().pixel(6, 6), RED);
        assert_eq!(g.panel().pixel(4, 4), crate::test_support::BLACK);
    }

    #[test]
    fn test_draw_rect_degenerate_sizes() {
        let mut g = gfx(20, 20);
        g.draw_rect(2, 2, 4, 1, RED);
        assert_eq!(lit_pixels(&g, RED), 4);
        g.draw_rect(10, 10, 0, 5, RED);
        assert_eq!(lit_pixels(&g, RED), 4);
    }

    #[test]
    fn test_huge_rects_draw_their_visible_part() {
        let mut g = gfx(10, 10);
        g.fill_rect(-2_000_000_000, 0, -2_000_000_000, 1, RED);
        g.fill_rect(5, 5, i32::MIN, i32::MIN, RED);
        assert_eq!(lit_pixels(&g, RED), 36);

        let mut g = gfx(10, 10);
        g.draw_rect(i32::MIN + 5, 2, i32::MAX, 5, RED);
        // Right edge at x = 3; the left edge is far off the surface.
        assert_eq!(lit_pixels(&g, RED), 4 + 4 + 3);
        assert_eq!(g.panel().pixel(3, 4), RED);
        g.draw_rect(i32::MIN, 2, i32::MAX, 5, RED);
        assert_eq!(lit_pixels(&g, RED), 11);

        let mut g = gfx(10, 10);
        g.draw_rect(2, 2, i32::MIN, i32::MIN, RED);
        let rows = row_extents(&g, RED);
        assert_eq!(rows[&2], (0, 2));
        assert_eq!(rows[&0], (2, 2));

        let mut g = gfx(10, 10);
        g.fill_round_rect(i32::MIN, i32::MIN, i32::MAX, i32::MAX, 5, RED);
        g.draw_round_rect(i32::MAX - 5, 0, i32::MAX, 8, 3, RED);
        assert_eq!(lit_pixels(&g, RED), 0);
    }

    #[test]
    fn test_trimmed_round_rect_keeps_its_straight_edge() {
        let mut g = gfx(10, 10);
        g.fill_round_rect(-1_000_000, 2, 1_000_005, 6, 2, RED);
        let rows = row_extents(&g, RED);
        assert_eq!(rows.len(), 6);
        assert!(rows.values().all(|&(l, _)| l == 0));
        assert_eq!(rows[&4], (0, 4));
        assert!(rows[&2].1 < 4);
    }

    #[test]
    fn test_fill_round_rect_is_symmetric_and_inside() {
        let mut g = gfx(40, 40);
        g.fill_round_rect(5, 5, 20, 14, 5, RED);
        let rows = row_extents(&g, RED);
        assert_eq!(rows.len(), 14);
        for (y, (l, r)) in &rows {
            assert!((5..=18).contains(y));
            assert_eq!(l - 5, 24 - r, "row {y}");
        }
        // Middle rows are full width, corner rows are not.
        assert_eq!(rows[&10], (5, 24));
        assert!(rows[&5].0 > 5);
    }

    #[test]
    fn test_round_rect_radius_is_clamped() {
        let mut g = gfx(40, 40);
        g.fill_round_rect(0, 0, 10, 6, 100, RED);
        let rows = row_extents(&g, RED);
        assert_eq!(rows.len(), 6);
        assert!(rows.values().all(|(l, r)| *l >= 0 && *r <= 9));
    }

    #[test]
    fn test_draw_round_rect_has_straight_edges() {
        let mut g = gfx(40, 40);
        g.draw_round_rect(2, 2, 30, 20, 4, RED);
        for y in 8..16 {
            assert_eq!(g.panel().pixel(2, y), RED);
            assert_eq!(g.panel().pixel(31, y), RED);
        }
        for x in 8..26 {
            assert_eq!(g.panel().pixel(x, 2), RED);
            assert_eq!(g.panel().pixel(x, 21), RED);
        }
        assert_eq!(g.panel().pixel(2, 2), crate::test_support::BLACK);
    }
}
