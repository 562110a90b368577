//! `embedded-graphics` interop.
//!
//! Lets any `embedded-graphics` drawable render through the engine. Pixels
//! are coalesced into horizontal runs of one color before they reach the
//! panel, so a `Text` or `Circle` from `embedded-graphics` costs one span
//! write per run rather than one per pixel. Everything honors the clip.
//!
//! # Usage
//!
//! ```ignore
//! Circle::new(Point::new(10, 10), 40)
//!     .into_styled(PrimitiveStyle::with_stroke(Rgb888::RED, 3))
//!     .draw(&mut gfx)?;
//! ```

use core::convert::Infallible;

use embedded_graphics::{Pixel, pixelcolor::Rgb888, prelude::*, primitives::Rectangle};

use crate::gfx::Gfx;
use crate::panel::Panel;

/// A horizontal run being accumulated.
#[derive(Clone, Copy)]
struct Run {
    x: i32,
    y: i32,
    len: i32,
    color: Rgb888,
}

impl Run {
    #[inline]
    fn extends(
        &self,
        x: i32,
        y: i32,
        color: Rgb888,
    ) -> bool {
        self.y == y && self.x + self.len == x && self.color == color
    }
}

impl<P: Panel> Gfx<P> {
    fn flush_run(
        &mut self,
        run: Option<Run>,
    ) {
        if let Some(run) = run {
            self.set_color(run.color);
            self.write_fast_hline(run.x, run.y, run.len);
        }
    }
}

impl<P: Panel> OriginDimensions for Gfx<P> {
    fn size(&self) -> Size { Size::new(self.width as u32, self.height as u32) }
}

impl<P: Panel> DrawTarget for Gfx<P> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.start_write();
        let mut run: Option<Run> = None;
        for Pixel(Point { x, y }, color) in pixels {
            match run.as_mut() {
                Some(r) if r.extends(x, y, color) => r.len += 1,
                _ => {
                    self.flush_run(run);
                    run = Some(Run { x, y, len: 1, color });
                }
            }
        }
        self.flush_run(run);
        self.end_write();
        Ok(())
    }

    fn fill_contiguous<I>(
        &mut self,
        area: &Rectangle,
        colors: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        if area.is_zero_sized() {
            return Ok(());
        }
        self.start_write();
        let mut run: Option<Run> = None;
        for (Point { x, y }, color) in area.points().zip(colors) {
            match run.as_mut() {
                Some(r) if r.extends(x, y, color) => r.len += 1,
                _ => {
                    self.flush_run(run);
                    run = Some(Run { x, y, len: 1, color });
                }
            }
        }
        self.flush_run(run);
        self.end_write();
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let Size { width, height } = area.size;
        self.fill_rect(area.top_left.x, area.top_left.y, width as i32, height as i32, color);
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.fill_screen(color);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics::{
        mono_font::{MonoTextStyle, ascii::FONT_6X10},
        primitives::{Circle, PrimitiveStyle},
        text::Text,
    };

    use super::*;
    use crate::test_support::{BLUE, RED, gfx, lit_pixels};

    #[test]
    fn test_pixels_coalesce_into_runs() {
        let mut g = gfx(20, 20);
        let pixels = (0..10).map(|x| Pixel(Point::new(x, 3), RED)).chain((0..4).map(|x| Pixel(Point::new(x, 4), BLUE)));
        g.draw_iter(pixels).unwrap();
        assert_eq!(g.panel().write_count(), 2);
        assert_eq!(lit_pixels(&g, RED), 10);
        assert_eq!(lit_pixels(&g, BLUE), 4);
    }

    #[test]
    fn test_clipped_pixels_are_dropped() {
        let mut g = gfx(20, 20);
        g.set_clip_rect(0, 0, 5, 5);
        g.draw_iter((0..20).map(|x| Pixel(Point::new(x, x), RED))).unwrap();
        assert_eq!(lit_pixels(&g, RED), 5);
    }

    #[test]
    fn test_fill_contiguous_breaks_runs_at_row_end() {
        let mut g = gfx(10, 10);
        let area = Rectangle::new(Point::new(2, 2), Size::new(3, 2));
        g.fill_contiguous(&area, core::iter::repeat(RED)).unwrap();
        assert_eq!(g.panel().write_count(), 2);
        assert_eq!(lit_pixels(&g, RED), 6);
    }

    #[test]
    fn test_fill_solid_is_one_write() {
        let mut g = gfx(10, 10);
        g.fill_solid(&Rectangle::new(Point::new(1, 1), Size::new(4, 4)), BLUE).unwrap();
        assert_eq!(g.panel().write_count(), 1);
        assert_eq!(lit_pixels(&g, BLUE), 16);
    }

    #[test]
    fn test_embedded_graphics_drawables() {
        let mut g = gfx(40, 40);
        Circle::new(Point::new(5, 5), 21).into_styled(PrimitiveStyle::with_fill(RED)).draw(&mut g).unwrap();
        assert_eq!(g.panel().pixel(15, 15), RED);
        Text::new("Hi", Point::new(2, 36), MonoTextStyle::new(&FONT_6X10, BLUE)).draw(&mut g).unwrap();
        assert!(lit_pixels(&g, BLUE) > 0);
    }
}
