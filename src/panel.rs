//! Transport contract consumed by the engine.
//!
//! A [`Panel`] is whatever sits behind the bus: an SPI display driver on
//! hardware, a [`FramePanel`](crate::FramePanel) in memory. The engine only
//! ever hands it clipped, in-bounds rectangles.
//!
//! # Batching
//!
//! Every write happens between `begin_transaction` and `end_transaction`.
//! The engine counts nesting itself, so a panel sees exactly one
//! begin/end pair per outermost drawing call.

use crate::color::PixelFormat;

pub trait Panel {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Format of pixels sent by `write_pixels` and raw colors.
    fn write_format(&self) -> PixelFormat;

    /// Format of pixels returned by `read_rect`.
    fn read_format(&self) -> PixelFormat { self.write_format() }

    fn begin_transaction(&mut self);

    fn end_transaction(&mut self);

    /// Raw color, in `write_format`, used by `write_fill_rect`.
    fn set_raw_color(
        &mut self,
        raw: u32,
    );

    /// Fills a rectangle with the raw color. Spans are 1-high or 1-wide rectangles.
    fn write_fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    );

    /// Writes `w` x `h` pixels in `write_format`, rows packed back to back.
    fn write_pixels(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &[u8],
    );

    /// Reads `w` x `h` pixels in `read_format` into `data`, rows packed back to back.
    fn read_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &mut [u8],
    );

    /// Copies a rectangle within the surface. Overlapping regions are allowed.
    fn copy_rect(
        &mut self,
        dst_x: i32,
        dst_y: i32,
        w: i32,
        h: i32,
        src_x: i32,
        src_y: i32,
    );

    /// Whether `write_pixels` returns before the data has left the buffer.
    ///
    /// When true the engine alternates between two line buffers and calls
    /// `wait_dma` before reusing one.
    fn supports_dma(&self) -> bool { false }

    fn wait_dma(&mut self) {}
}
