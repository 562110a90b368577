//! Arcs and donut segments.
//!
//! A pixel belongs to the arc when its squared distance from the center is
//! inside the ring and it lies on the correct side of the start and end
//! radii. Each radius is a half-plane test against a slope; sweeps wider
//! than 180 degrees accept either half-plane instead of both.
//!
//! Angles are degrees, clockwise from the positive x axis (screen y grows
//! downwards), normalized into `[0, 360)`.

use embedded_graphics::pixelcolor::Rgb888;
use libm::{cosf, fabsf, fmodf, sinf};

use crate::config::{ARC_FULL_EPSILON, ARC_NO_END_SLOPE, DEG_TO_RAD};
use crate::gfx::Gfx;
use crate::panel::Panel;

#[inline]
fn normalize_angle(angle: f32) -> f32 {
    let a = fmodf(angle, 360.0);
    if a < 0.0 { a + 360.0 } else { a }
}

/// Orders the radii (outer first) and keeps both at least 1.
#[inline]
fn order_radii(
    r0: i32,
    r1: i32,
) -> (i32, i32) {
    (r0.max(r1).max(1), r0.min(r1).max(1))
}

impl<P: Panel> Gfx<P> {
    /// Outline of a ring segment: both radial caps plus the inner and outer edges.
    pub fn draw_arc(
        &mut self,
        x: i32,
        y: i32,
        r0: i32,
        r1: i32,
        start: f32,
        end: f32,
        color: Rgb888,
    ) {
        let (outer, inner) = order_radii(r0, r1);
        let equal = fabsf(start - end) < f32::EPSILON;
        let mut start = normalize_angle(start);
        let mut end = normalize_angle(end);

        self.set_color(color);
        self.start_write();
        self.fill_arc_helper(x, y, outer, inner, start, start);
        self.fill_arc_helper(x, y, outer, inner, end, end);
        if !equal && fabsf(start - end) <= ARC_FULL_EPSILON {
            start = 0.0;
            end = 360.0;
        }
        self.fill_arc_helper(x, y, outer, outer, start, end);
        self.fill_arc_helper(x, y, inner, inner, start, end);
        self.end_write();
    }

    /// Filled ring segment between radii `r0` and `r1` from `start` to `end`.
    ///
    /// Identical angles draw nothing; different angles that land on the same
    /// direction (0 and 360, -90 and 270) fill the whole ring.
    pub fn fill_arc(
        &mut self,
        x: i32,
        y: i32,
        r0: i32,
        r1: i32,
        start: f32,
        end: f32,
        color: Rgb888,
    ) {
        if fabsf(start - end) < f32::EPSILON {
            return;
        }
        let (outer, inner) = order_radii(r0, r1);
        let mut start = normalize_angle(start);
        let mut end = normalize_angle(end);
        if fabsf(start - end) <= ARC_FULL_EPSILON {
            start = 0.0;
            end = 360.0;
        }

        self.set_color(color);
        self.start_write();
        self.fill_arc_helper(x, y, outer, inner, start, end);
        self.end_write();
    }

    /// Emits the arc as horizontal spans. `end == 360.0` has no end bound.
    fn fill_arc_helper(
        &mut self,
        cx: i32,
        cy: i32,
        oradius: i32,
        iradius: i32,
        start: f32,
        end: f32,
    ) {
        let s_cos = cosf(start * DEG_TO_RAD);
        let e_cos = cosf(end * DEG_TO_RAD);
        let sslope = s_cos / sinf(start * DEG_TO_RAD);
        let eslope = if end == 360.0 { ARC_NO_END_SLOPE } else { e_cos / sinf(end * DEG_TO_RAD) };
        let swidth = 0.5 / s_cos;
        let ewidth = -0.5 / e_cos;

        let iradius = iradius - 1;
        let ir2 = iradius * iradius + iradius;
        let or2 = oradius * oradius + oradius;

        let start180 = start >= 180.0;
        let end180 = end < 180.0;
        let reversed = start + 180.0 < end || (end < start && start < end + 180.0);

        // Narrow the scan box to the quadrants the sweep can touch.
        let mut xs = -oradius;
        let mut y = -oradius;
        let mut ye = oradius;
        let mut xe = oradius + 1;
        if !reversed {
            let right = |a: f32| a >= 270.0 || a < 90.0;
            if right(end) && right(start) {
                xs = 0;
            } else if !right(end) && !right(start) {
                xe = 1;
            }
            if end >= 180.0 && start >= 180.0 {
                ye = 0;
            } else if end < 180.0 && start < 180.0 {
                y = 0;
            }
        }

        while y <= ye {
            let y2 = y * y;
            let mut x = xs;
            if x < 0 {
                while x * x + y2 >= or2 {
                    x += 1;
                }
                if xe != 1 {
                    xe = 1 - x;
                }
            }
            let ysslope = (y as f32 + swidth) * sslope;
            let yeslope = (y as f32 + ewidth) * eslope;
            let mut len = 0;
            while x <= xe {
                let after_start = start180 != (x as f32 <= ysslope);
                let before_end = end180 != (x as f32 <= yeslope);
                let distance = x * x + y2;
                let in_sweep = (after_start && before_end) || (reversed && (after_start || before_end));
                if distance >= ir2 && in_sweep && x != xe && distance < or2 {
                    len += 1;
                } else {
                    if len > 0 {
                        self.write_fast_hline(cx + x - len, cy + y, len);
                        len = 0;
                    }
                    if distance >= or2 {
                        break;
                    }
                    // Jump over the hole.
                    if x < 0 && distance < ir2 {
                        x = -x;
                    }
                }
                x += 1;
            }
            y += 1;
        }
    }
}
