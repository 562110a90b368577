//! Quadratic and cubic Bezier curves.
//!
//! The quadratic curve is walked pixel by pixel after being split where
//! either axis changes direction; each monotonic piece ends with a straight
//! line once the walker's decision variables stop converging. The cubic
//! curve is approximated by two short polylines that start at the end points
//! and meet in the middle.

use embedded_graphics::pixelcolor::Rgb888;
use libm::{fabs, floor, roundf, sqrtf};

use crate::gfx::Gfx;
use crate::panel::Panel;

#[inline]
fn round_half_up(v: f64) -> i32 { floor(v + 0.5) as i32 }

#[inline]
fn chord(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
) -> f32 {
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    sqrtf(dx * dx + dy * dy)
}

impl<P: Panel> Gfx<P> {
    /// Quadratic curve from `(x0, y0)` to `(x2, y2)` pulled towards `(x1, y1)`.
    pub fn draw_bezier(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
        mut x2: i32,
        mut y2: i32,
        color: Rgb888,
    ) {
        self.set_color(color);
        self.start_write();

        let mut x = x0 - x1;
        let mut y = y0 - y1;

        // Horizontal turning point.
        if x * (x2 - x1) > 0 {
            let mut t = (x0 - 2 * x1 + x2) as f64;
            if y * (y2 - y1) > 0 && fabs((y0 - 2 * y1 + y2) as f64 / t * x as f64) > y.abs() as f64 {
                x0 = x2;
                x2 = x + x1;
                y0 = y2;
                y2 = y + y1;
            }
            t = (x0 - x1) as f64 / t;
            let mut r = (1.0 - t) * ((1.0 - t) * y0 as f64 + 2.0 * t * y1 as f64) + t * t * y2 as f64;
            t = (x0 * x2 - x1 * x1) as f64 * t / (x0 - x1) as f64;
            x = round_half_up(t);
            y = round_half_up(r);
            r = (y1 - y0) as f64 * (t - x0 as f64) / (x1 - x0) as f64 + y0 as f64;
            self.write_bezier_segment(x0, y0, x, round_half_up(r), x, y);
            r = (y1 - y2) as f64 * (t - x2 as f64) / (x1 - x2) as f64 + y2 as f64;
            x0 = x;
            x1 = x;
            y0 = y;
            y1 = round_half_up(r);
        }

        // Vertical turning point.
        if (y0 - y1) * (y2 - y1) > 0 {
            let mut t = (y0 - 2 * y1 + y2) as f64;
            t = (y0 - y1) as f64 / t;
            let mut r = (1.0 - t) * ((1.0 - t) * x0 as f64 + 2.0 * t * x1 as f64) + t * t * x2 as f64;
            t = (y0 * y2 - y1 * y1) as f64 * t / (y0 - y1) as f64;
            x = round_half_up(r);
            y = round_half_up(t);
            r = (x1 - x0) as f64 * (t - y0 as f64) / (y1 - y0) as f64 + x0 as f64;
            self.write_bezier_segment(x0, y0, round_half_up(r), y, x, y);
            r = (x1 - x2) as f64 * (t - y2 as f64) / (y1 - y2) as f64 + x2 as f64;
            x0 = x;
            x1 = round_half_up(r);
            y0 = y;
            y1 = y;
        }

        self.write_bezier_segment(x0, y0, x1, y1, x2, y2);
        self.end_write();
    }

    /// One monotonic quadratic piece. Pieces that are not monotonic are ignored.
    fn write_bezier_segment(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        x1: i32,
        y1: i32,
        mut x2: i32,
        mut y2: i32,
    ) {
        let x_monotonic = (x2 >= x1 && x1 >= x0) || (x2 <= x1 && x1 <= x0);
        let y_monotonic = (y2 >= y1 && y1 >= y0) || (y2 <= y1 && y1 <= y0);
        if !(x_monotonic && y_monotonic) {
            return;
        }

        let mut sx = x2 - x1;
        let mut sy = y2 - y1;
        let mut xx = x0 - x1;
        let mut yy = y0 - y1;
        let mut cur = (xx * sy - yy * sx) as f32;

        // Start from the end with the longer control arm.
        if sx * sx + sy * sy > xx * xx + yy * yy {
            x2 = x0;
            x0 = sx + x1;
            y2 = y0;
            y0 = sy + y1;
            cur = -cur;
        }

        if cur != 0.0 {
            xx += sx;
            sx = if x0 < x2 { 1 } else { -1 };
            xx *= sx;
            yy += sy;
            sy = if y0 < y2 { 1 } else { -1 };
            yy *= sy;
            let mut xy = 2 * xx * yy;
            xx *= xx;
            yy *= yy;
            if cur * ((sx * sy) as f32) < 0.0 {
                xx = -xx;
                yy = -yy;
                xy = -xy;
                cur = -cur;
            }
            let mut dx = (4.0 * sy as f64 * cur as f64 * (x1 - x0) as f64 + xx as f64 - xy as f64) as f32;
            let mut dy = (4.0 * sx as f64 * cur as f64 * (y0 - y1) as f64 + yy as f64 - xy as f64) as f32;
            xx += xx;
            yy += yy;
            let mut err = dx + dy + xy as f32;
            loop {
                self.write_pixel(x0, y0);
                if x0 == x2 && y0 == y2 {
                    return;
                }
                let step_y = 2.0 * err < dx;
                if 2.0 * err > dy {
                    x0 += sx;
                    dx -= xy as f32;
                    dy += yy as f32;
                    err += dy;
                }
                if step_y {
                    y0 += sy;
                    dy -= xy as f32;
                    dx += xx as f32;
                    err += dx;
                }
                if dy >= dx {
                    break;
                }
            }
        }
        self.write_line(x0, y0, x2, y2);
    }

    /// Cubic curve through `(x0, y0)` and `(x3, y3)` with two control points.
    pub fn draw_bezier_cubic(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        mut x3: i32,
        mut y3: i32,
        color: Rgb888,
    ) {
        let polygon = chord(x0, y0, x1, y1) + chord(x1, y1, x2, y2) + chord(x2, y2, x3, y3);
        let steps = ((polygon / 4.0) as i32).max(1);

        let (fx0, fy0) = (x0 as f32, y0 as f32);
        let (fx1, fy1) = (x1 as f32, y1 as f32);
        let (fx2, fy2) = (x2 as f32, y2 as f32);
        let (fx3, fy3) = (x3 as f32, y3 as f32);

        self.set_color(color);
        self.start_write();
        for i in 0..=steps {
            let t = i as f32 / (steps * 2) as f32;
            let tr = 1.0 - t;
            let b0 = tr * tr * tr;
            let b1 = 3.0 * t * tr * tr;
            let b2 = 3.0 * t * t * tr;
            let b3 = t * t * t;

            // From the start point forwards...
            let nx = roundf(fx0 * b0 + fx1 * b1 + fx2 * b2 + fx3 * b3) as i32;
            let ny = roundf(fy0 * b0 + fy1 * b1 + fy2 * b2 + fy3 * b3) as i32;
            if nx != x0 || ny != y0 {
                self.write_line(x0, y0, nx, ny);
                x0 = nx;
                y0 = ny;
            }

            // ...and from the end point backwards.
            let nx = roundf(fx0 * b3 + fx1 * b2 + fx2 * b1 + fx3 * b0) as i32;
            let ny = roundf(fy0 * b3 + fy1 * b2 + fy2 * b1 + fy3 * b0) as i32;
            if nx != x3 || ny != y3 {
                self.write_line(x3, y3, nx, ny);
                x3 = nx;
                y3 = ny;
            }
        }
        self.end_write();
    }
}
