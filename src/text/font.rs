//! Font capability interface.

use embedded_graphics::pixelcolor::Rgb888;

use super::TextStyle;

/// Metrics of the glyph last looked up, in unscaled font pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontMetrics {
    pub width: i32,
    pub height: i32,
    pub x_advance: i32,
    pub x_offset: i32,
    pub y_advance: i32,
    pub y_offset: i32,
    pub baseline: i32,
}

/// Where glyphs land. Implemented by the engine; every call is already
/// inside an open write batch.
pub trait GlyphSink {
    /// Fills a clipped rectangle with `color`.
    fn glyph_fill(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgb888,
    );
}

/// A source of glyphs.
pub trait Font {
    /// Metrics used before any glyph has been looked up.
    fn default_metric(&self) -> FontMetrics;

    /// Loads the metrics of `code` into `metrics`. Returns false (leaving
    /// `metrics` untouched) when the font has no such glyph.
    fn update_font_metric(
        &self,
        metrics: &mut FontMetrics,
        code: u16,
    ) -> bool;

    /// Draws `code` with its cell's top-left at `(x, y)` and returns the
    /// scaled advance. Unknown glyphs draw nothing and advance 0.
    fn draw_char(
        &self,
        sink: &mut dyn GlyphSink,
        x: i32,
        y: i32,
        code: u16,
        style: &TextStyle,
    ) -> i32;

    /// Code of the `index`th glyph in ascending code order, `None` past the last.
    fn glyph_code(
        &self,
        index: usize,
    ) -> Option<u16>;
}
