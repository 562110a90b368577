//! Circles and ellipses.
//!
//! Midpoint stepping with an integer decision variable `f` and the two
//! second differences `dd_x`/`dd_y`. Outlines emit the run gathered since the
//! previous step in all four octant pairs; filled shapes emit each band of
//! rows sharing an extent as a single rectangle.

use embedded_graphics::pixelcolor::Rgb888;

use crate::gfx::Gfx;
use crate::panel::Panel;

impl<P: Panel> Gfx<P> {
    pub fn draw_circle(
        &mut self,
        x: i32,
        y: i32,
        r: i32,
        color: Rgb888,
    ) {
        if r <= 0 {
            self.draw_pixel(x, y, color);
            return;
        }
        self.set_color(color);
        self.start_write();
        let mut r = r;
        let mut f = 1 - r;
        let mut dd_y = -(r << 1);
        let mut dd_x = 1;
        let mut i = 0;
        let mut j = -1;
        loop {
            while f < 0 {
                i += 1;
                dd_x += 2;
                f += dd_x;
            }
            dd_y += 2;
            f += dd_y;

            let len = i - j;
            self.write_fast_hline(x - i, y + r, len);
            self.write_fast_hline(x - i, y - r, len);
            self.write_fast_hline(x + j + 1, y - r, len);
            self.write_fast_hline(x + j + 1, y + r, len);

            self.write_fast_vline(x + r, y + j + 1, len);
            self.write_fast_vline(x + r, y - i, len);
            self.write_fast_vline(x - r, y - i, len);
            self.write_fast_vline(x - r, y + j + 1, len);
            j = i;

            r -= 1;
            if i >= r {
                break;
            }
        }
        self.end_write();
    }

    /// Filled disc covering rows `y - r ..= y + r`, one extent per row.
    pub fn fill_circle(
        &mut self,
        x: i32,
        y: i32,
        r: i32,
        color: Rgb888,
    ) {
        self.set_color(color);
        self.start_write();
        self.write_fast_hline(x - r, y, (r << 1) + 1);
        self.fill_circle_helper(x, y, r, 3, 0);
        self.end_write();
    }

    /// Upper (`corners & 2`) and/or lower (`corners & 1`) half of a disc,
    /// excluding the center row, widened by `delta` pixels.
    pub(crate) fn fill_circle_helper(
        &mut self,
        x: i32,
        y: i32,
        mut r: i32,
        corners: u8,
        delta: i32,
    ) {
        if r <= 0 {
            return;
        }
        let delta = delta + 1;
        let mut f = 1 - r;
        let mut dd_y = -(r << 1);
        let mut dd_x = 1;
        let mut i = 0;
        loop {
            let mut len = 0;
            while f < 0 {
                dd_x += 2;
                f += dd_x;
                len += 1;
            }
            i += len;
            dd_y += 2;
            f += dd_y;
            // When the band just emitted ends on row r, that row is already covered.
            let closes_band = len == 0 || i != r;

            if corners & 0x1 != 0 {
                if len > 0 {
                    self.write_fill_rect(x - r, y + i - len + 1, (r << 1) + delta, len);
                }
                if closes_band {
                    self.write_fast_hline(x - i, y + r, (i << 1) + delta);
                }
            }
            if corners & 0x2 != 0 {
                if closes_band {
                    self.write_fast_hline(x - i, y - r, (i << 1) + delta);
                }
                if len > 0 {
                    self.write_fill_rect(x - r, y - i, (r << 1) + delta, len);
                }
            }

            r -= 1;
            if i >= r {
                break;
            }
        }
    }

    pub fn draw_ellipse(
        &mut self,
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        color: Rgb888,
    ) {
        if ry == 0 {
            self.draw_fast_hline(x - rx, y, (rx << 1) + 1, color);
            return;
        }
        if rx == 0 {
            self.draw_fast_vline(x, y - ry, (ry << 1) + 1, color);
            return;
        }
        if rx < 0 || ry < 0 {
            return;
        }
        self.set_color(color);
        self.start_write();

        let rx2 = rx * rx;
        let ry2 = ry * ry;

        let mut i = -1;
        let mut xt = 0;
        let mut yt = ry;
        let mut s = (ry2 << 1) + rx2 * (1 - (ry << 1));
        loop {
            while s < 0 {
                xt += 1;
                s += ry2 * ((xt << 2) + 2);
            }
            let len = xt - i;
            self.write_fast_hline(x - xt, y - yt, len);
            self.write_fast_hline(x + i + 1, y - yt, len);
            self.write_fast_hline(x + i + 1, y + yt, len);
            self.write_fast_hline(x - xt, y + yt, len);
            i = xt;
            yt -= 1;
            s -= (yt * rx2) << 2;
            if ry2 * xt > rx2 * yt {
                break;
            }
        }

        i = -1;
        yt = 0;
        xt = rx;
        s = (rx2 << 1) + ry2 * (1 - (rx << 1));
        loop {
            while s < 0 {
                yt += 1;
                s += rx2 * ((yt << 2) + 2);
            }
            let len = yt - i;
            self.write_fast_vline(x - xt, y - yt, len);
            self.write_fast_vline(x - xt, y + i + 1, len);
            self.write_fast_vline(x + xt, y + i + 1, len);
            self.write_fast_vline(x + xt, y - yt, len);
            i = yt;
            xt -= 1;
            s -= (xt * ry2) << 2;
            if rx2 * yt > ry2 * xt {
                break;
            }
        }

        self.end_write();
    }

    pub fn fill_ellipse(
        &mut self,
        x: i32,
        y: i32,
        rx: i32,
        ry: i32,
        color: Rgb888,
    ) {
        if ry == 0 {
            self.draw_fast_hline(x - rx, y, (rx << 1) + 1, color);
            return;
        }
        if rx == 0 {
            self.draw_fast_vline(x, y - ry, (ry << 1) + 1, color);
            return;
        }
        if rx < 0 || ry < 0 {
            return;
        }
        self.set_color(color);
        self.start_write();

        let rx2 = rx * rx;
        let ry2 = ry * ry;

        self.write_fast_hline(x - rx, y, (rx << 1) + 1);
        let mut i = 0;
        let mut yt = 0;
        let mut xt = rx;
        let mut s = (rx2 << 1) + ry2 * (1 - (rx << 1));
        loop {
            while s < 0 {
                yt += 1;
                s += rx2 * ((yt << 2) + 2);
            }
            self.write_fill_rect(x - xt, y - yt, (xt << 1) + 1, yt - i);
            self.write_fill_rect(x - xt, y + i + 1, (xt << 1) + 1, yt - i);
            i = yt;
            xt -= 1;
            s -= (xt * ry2) << 2;
            if rx2 * yt > ry2 * xt {
                break;
            }
        }

        xt = 0;
        yt = ry;
        s = (ry2 << 1) + rx2 * (1 - (ry << 1));
        loop {
            while s < 0 {
                xt += 1;
                s += ry2 * ((xt << 2) + 2);
            }
            self.write_fast_hline(x - xt, y - yt, (xt << 1) + 1);
            self.write_fast_hline(x - xt, y + yt, (xt << 1) + 1);
            yt -= 1;
            s -= (yt * rx2) << 2;
            if ry2 * xt > rx2 * yt {
                break;
            }
        }

        self.end_write();
    }
}
