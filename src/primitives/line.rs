//! Straight lines.
//!
//! Bresenham with run accumulation: pixels that share a row (or a column
//! for steep lines) leave as one span instead of one write each.

use core::mem::swap;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::gfx::Gfx;
use crate::panel::Panel;

impl<P: Panel> Gfx<P> {
    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Rgb888,
    ) {
        self.set_color(color);
        self.start_write();
        self.write_line(x0, y0, x1, y1);
        self.end_write();
    }

    /// Line in the current color, transaction already open.
    pub(crate) fn write_line(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            swap(&mut x0, &mut y0);
            swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            swap(&mut x0, &mut x1);
            swap(&mut y0, &mut y1);
        }

        let dy = (y1 - y0).abs();
        let ystep = if y1 > y0 { 1 } else { -1 };
        let dx = x1 - x0;
        let mut err = dx >> 1;

        let c = self.clip;
        let (x_lo, x_hi, y_lo, y_hi) = if steep {
            (c.top, c.bottom, c.left, c.right)
        } else {
            (c.left, c.right, c.top, c.bottom)
        };

        // Walk to the first point inside the clip.
        while x0 < x_lo || y0 < y_lo || y0 > y_hi {
            err -= dy;
            if err < 0 {
                err += dx;
                y0 += ystep;
            }
            x0 += 1;
            if x0 > x1 {
                return;
            }
        }
        x1 = x1.min(x_hi);

        let mut xs = x0;
        let mut run = 0;
        loop {
            run += 1;
            err -= dy;
            if err < 0 {
                self.write_run(steep, xs, y0, run);
                err += dx;
                xs = x0 + 1;
                run = 0;
                y0 += ystep;
                if y0 < y_lo || y0 > y_hi {
                    break;
                }
            }
            x0 += 1;
            if x0 > x1 {
                break;
            }
        }
        if run > 0 {
            self.write_run(steep, xs, y0, run);
        }
    }

    #[inline]
    fn write_run(
        &mut self,
        steep: bool,
        major: i32,
        minor: i32,
        len: i32,
    ) {
        if steep {
            self.write_fill_rect(minor, major, 1, len);
        } else {
            self.write_fill_rect(major, minor, len, 1);
        }
    }

    /// Line whose color moves linearly from `start` to `end`.
    pub fn draw_gradient_line(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
        mut start: Rgb888,
        mut end: Rgb888,
    ) {
        if start == end || (x0 == x1 && y0 == y1) {
            self.draw_line(x0, y0, x1, y1, start);
            return;
        }

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            swap(&mut x0, &mut y0);
            swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            swap(&mut x0, &mut x1);
            swap(&mut y0, &mut y1);
            swap(&mut start, &mut end);
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };
        let mut err = dx >> 1;

        let (r, g, b) = (i32::from(start.r()), i32::from(start.g()), i32::from(start.b()));
        let diff_r = i32::from(end.r()) - r;
        let diff_g = i32::from(end.g()) - g;
        let diff_b = i32::from(end.b()) - b;

        let previous = self.color.rgb;
        self.start_write();
        for x in x0..=x1 {
            let t = x - x0;
            self.set_color(Rgb888::new(
                (t * diff_r / dx + r) as u8,
                (t * diff_g / dx + g) as u8,
                (t * diff_b / dx + b) as u8,
            ));
            if steep {
                self.write_pixel(y0, x);
            } else {
                self.write_pixel(x, y0);
            }
            err -= dy;
            if err < 0 {
                err += dx;
                y0 += ystep;
            }
        }
        self.end_write();
        self.set_color(previous);
    }
}

#[cfg(test)]
mod tests {
    use crate::frame_panel::PanelOp;
    use crate::test_support::{RED, gfx, lit_pixels};

    #[test]
    fn test_horizontal_line_is_one_span() {
        let mut g = gfx(50, 50);
        g.draw_line(5, 10, 30, 10, RED);
        assert_eq!(g.panel().write_count(), 1);
        assert!(g.panel().ops().contains(&PanelOp::Fill { x: 5, y: 10, w: 26, h: 1, raw: 0xFF_0000 }));
    }

    #[test]
    fn test_vertical_line_is_one_span() {
        let mut g = gfx(50, 50);
        g.draw_line(7, 40, 7, 2, RED);
        assert_eq!(g.panel().write_count(), 1);
        assert!(g.panel().ops().contains(&PanelOp::Fill { x: 7, y: 2, w: 1, h: 39, raw: 0xFF_0000 }));
    }

    #[test]
    fn test_shallow_line_batches_runs() {
        let mut g = gfx(50, 50);
        g.draw_line(0, 0, 19, 1, RED);
        // Two rows, one run each.
        assert_eq!(g.panel().write_count(), 2);
        assert_eq!(lit_pixels(&g, RED), 20);
        assert_eq!(g.panel().pixel(0, 0), RED);
        assert_eq!(g.panel().pixel(19, 1), RED);
    }

    #[test]
    fn test_diagonal_line_hits_every_step() {
        let mut g = gfx(20, 20);
        g.draw_line(2, 2, 12, 12, RED);
        for i in 2..=12 {
            assert_eq!(g.panel().pixel(i, i), RED);
        }
        assert_eq!(lit_pixels(&g, RED), 11);
    }

    #[test]
    fn test_line_clipped_matches_unclipped_inside() {
        let mut full = gfx(40, 40);
        full.draw_line(-10, 3, 50, 31, RED);
        let mut clipped = gfx(40, 40);
        clipped.set_clip_rect(10, 0, 15, 40);
        clipped.draw_line(-10, 3, 50, 31, RED);
        for y in 0..40 {
            for x in 0..40 {
                let expect = if (10..25).contains(&x) { full.panel().pixel(x, y) } else { crate::test_support::BLACK };
                assert_eq!(clipped.panel().pixel(x, y), expect, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_line_fully_outside_writes_nothing() {
        let mut g = gfx(20, 20);
        g.draw_line(-5, -5, -1, 30, RED);
        g.draw_line(0, 25, 19, 40, RED);
        assert_eq!(g.panel().write_count(), 0);
    }

    #[test]
    fn test_gradient_line_endpoints() {
        use embedded_graphics::pixelcolor::Rgb888;

        let mut g = gfx(20, 4);
        let start = Rgb888::new(0, 0, 0);
        let end = Rgb888::new(200, 100, 10);
        g.draw_gradient_line(0, 1, 10, 1, start, end);
        assert_eq!(g.panel().pixel(0, 1), start);
        assert_eq!(g.panel().pixel(10, 1), end);
        assert_eq!(g.panel().pixel(5, 1), Rgb888::new(100, 50, 5));
    }
}
