//! Triangles.

use core::mem::swap;

use embedded_graphics::pixelcolor::Rgb888;

use crate::gfx::Gfx;
use crate::panel::Panel;

/// Initial error of an edge walker stepping `xstep` per `dy` rows over `dx` columns.
#[inline]
fn edge_error(
    dx: i32,
    dy: i32,
    xstep: i32,
    toward_left: bool,
) -> i32 {
    let bias = if (xstep < 0) == toward_left { dx.min(dy) } else { dx };
    (dx.max(dy) >> 1) + bias
}

impl<P: Panel> Gfx<P> {
    pub fn draw_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Rgb888,
    ) {
        self.set_color(color);
        self.start_write();
        self.write_line(x0, y0, x1, y1);
        self.write_line(x1, y1, x2, y2);
        self.write_line(x2, y2, x0, y0);
        self.end_write();
    }

    /// Filled triangle, one span per scanline.
    pub fn fill_triangle(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
        mut x2: i32,
        mut y2: i32,
        color: Rgb888,
    ) {
        if y0 > y1 {
            swap(&mut y0, &mut y1);
            swap(&mut x0, &mut x1);
        }
        if y1 > y2 {
            swap(&mut y2, &mut y1);
            swap(&mut x2, &mut x1);
        }
        if y0 > y1 {
            swap(&mut y0, &mut y1);
            swap(&mut x0, &mut x1);
        }

        if y0 == y2 {
            let a = x0.min(x1).min(x2);
            let b = x0.max(x1).max(x2);
            self.draw_fast_hline(a, y0, b - a + 1, color);
            return;
        }
        let cross_a = i64::from(x1 - x0) * i64::from(y2 - y0);
        let cross_b = i64::from(x2 - x0) * i64::from(y1 - y0);
        if cross_a == cross_b {
            self.draw_line(x0, y0, x2, y2, color);
            return;
        }

        // Edge 1 is the left edge, edge 2 the right one.
        let mut dy1 = y1 - y0;
        let mut dy2 = y2 - y0;
        let change = cross_a > cross_b;
        let mut dx1 = (x1 - x0).abs();
        let mut dx2 = (x2 - x0).abs();
        let mut xstep1 = if x1 < x0 { -1 } else { 1 };
        let mut xstep2 = if x2 < x0 { -1 } else { 1 };
        let mut a = x0;
        let mut b = x0;
        if change {
            swap(&mut dx1, &mut dx2);
            swap(&mut dy1, &mut dy2);
            swap(&mut xstep1, &mut xstep2);
        }
        let mut err1 = edge_error(dx1, dy1, xstep1, true);
        let mut err2 = edge_error(dx2, dy2, xstep2, false);

        self.set_color(color);
        self.start_write();
        if y0 != y1 {
            loop {
                err1 -= dx1;
                while err1 < 0 {
                    err1 += dy1;
                    a += xstep1;
                }
                err2 -= dx2;
                while err2 < 0 {
                    err2 += dy2;
                    b += xstep2;
                }
                self.write_fast_hline(a, y0, b - a + 1);
                y0 += 1;
                if y0 >= y1 {
                    break;
                }
            }
        }

        if change {
            b = x1;
            xstep2 = if x2 < x1 { -1 } else { 1 };
            dx2 = (x2 - x1).abs();
            dy2 = y2 - y1;
            err2 = edge_error(dx2, dy2, xstep2, false);
        } else {
            a = x1;
            dx1 = (x2 - x1).abs();
            dy1 = y2 - y1;
            xstep1 = if x2 < x1 { -1 } else { 1 };
            err1 = edge_error(dx1, dy1, xstep1, true);
        }
        loop {
            err1 -= dx1;
            while err1 < 0 {
                err1 += dy1;
                a += xstep1;
                if a == x2 {
                    break;
                }
            }
            err2 -= dx2;
            while err2 < 0 {
                err2 += dy2;
                b += xstep2;
                if b == x2 {
                    break;
                }
            }
            self.write_fast_hline(a, y0, b - a + 1);
            y0 += 1;
            if y0 > y2 {
                break;
            }
        }
        self.end_write();
    }
}

#[cfg(test)]
mod tests {
    use crate::frame_panel::PanelOp;
    use crate::test_support::{RED, gfx, lit_pixels, row_extents};

    fn fill_ops(g: &crate::Gfx<crate::FramePanel>) -> Vec<PanelOp> {
        g.panel().ops().iter().copied().filter(PanelOp::is_write).collect()
    }

    #[test]
    fn test_fill_triangle_one_span_per_row() {
        let mut g = gfx(60, 60);
        g.fill_triangle(20, 40, 10, 10, 30, 10, RED);
        let ops = fill_ops(&g);
        assert_eq!(ops.len(), 31);
        let mut ys: Vec<i32> = ops
            .iter()
            .map(|op| match *op {
                PanelOp::Fill { y, h, .. } => {
                    assert_eq!(h, 1);
                    y
                }
                _ => unreachable!(),
            })
            .collect();
        ys.sort_unstable();
        assert_eq!(ys, (10..=40).collect::<Vec<_>>());

        let rows = row_extents(&g, RED);
        assert_eq!(rows[&10], (10, 30));
        assert_eq!(rows[&40], (20, 20));
    }

    #[test]
    fn test_fill_triangle_vertex_order_irrelevant() {
        let mut a = gfx(60, 60);
        a.fill_triangle(5, 5, 50, 20, 15, 45, RED);
        let mut b = gfx(60, 60);
        b.fill_triangle(15, 45, 5, 5, 50, 20, RED);
        assert_eq!(a.panel().data(), b.panel().data());
        assert!(lit_pixels(&a, RED) > 500);
    }

    #[test]
    fn test_fill_triangle_contains_vertices() {
        let mut g = gfx(60, 60);
        g.fill_triangle(5, 5, 50, 20, 15, 45, RED);
        assert_eq!(g.panel().pixel(5, 5), RED);
        assert_eq!(g.panel().pixel(50, 20), RED);
        assert_eq!(g.panel().pixel(15, 45), RED);
    }

    #[test]
    fn test_flat_triangle_is_single_span() {
        let mut g = gfx(40, 40);
        g.fill_triangle(30, 7, 4, 7, 12, 7, RED);
        assert_eq!(fill_ops(&g), [PanelOp::Fill { x: 4, y: 7, w: 27, h: 1, raw: 0xFF_0000 }]);
    }

    #[test]
    fn test_collinear_triangle_is_line() {
        let mut g = gfx(40, 40);
        g.fill_triangle(0, 0, 10, 10, 20, 20, RED);
        assert_eq!(lit_pixels(&g, RED), 21);
    }

    #[test]
    fn test_draw_triangle_outline() {
        let mut g = gfx(40, 40);
        g.draw_triangle(2, 2, 30, 2, 2, 30, RED);
        assert_eq!(g.panel().pixel(16, 2), RED);
        assert_eq!(g.panel().pixel(2, 16), RED);
        assert_eq!(g.panel().pixel(16, 16), RED);
        assert_eq!(g.panel().pixel(8, 8), crate::test_support::BLACK);
    }
}
