//! Per-call pixel conversion context.
//!
//! A [`PixelCopy`] walks a source image with fixed-point cursors and either
//! converts pixels into a destination buffer (copy mode) or tests them
//! against a target value (compare mode). The conversion is chosen once, in
//! [`PixelCopy::new`], and never re-resolved per pixel.
//!
//! # Cursor Stepping
//!
//! Cursors are `FP_SCALE` fixed-point. Plain blits step `(FP_ONE, 0)` per
//! pixel; affine blits step by the inverse-mapped increments of a rotated
//! and scaled destination row.

use embedded_graphics::pixelcolor::Rgb888;

use crate::color::PixelFormat;
use crate::config::{FP_ONE, FP_SCALE};

/// Conversion selected for a source/destination format pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Conversion {
    /// Identical formats, raw values copied as-is.
    Passthrough,
    /// Both indexed, the index is truncated to the destination depth.
    Index,
    /// Indexed source, direct destination, via the palette.
    Palette,
    /// Decode to 24-bit and re-encode.
    Direct,
}

impl Conversion {
    fn resolve(
        src: PixelFormat,
        dst: PixelFormat,
        has_palette: bool,
    ) -> Self {
        if src == dst && !(src.is_index() && has_palette) {
            Self::Passthrough
        } else if src.is_index() && dst.is_index() {
            Self::Index
        } else if src.is_index() {
            Self::Palette
        } else {
            Self::Direct
        }
    }
}

/// Source image plus conversion state for one drawing call.
pub struct PixelCopy<'a> {
    src: &'a [u8],
    src_width: i32,
    src_height: i32,
    src_row_bytes: usize,
    src_format: PixelFormat,
    dst_format: PixelFormat,
    palette: Option<&'a [Rgb888]>,
    transparent: Option<u32>,
    conversion: Conversion,
    /// Source x in `FP_SCALE` fixed point.
    pub src_x32: i32,
    /// Source y in `FP_SCALE` fixed point.
    pub src_y32: i32,
    pub src_x32_add: i32,
    pub src_y32_add: i32,
}

impl<'a> PixelCopy<'a> {
    /// Creates a context over `src`, a `width` x `height` image in `src_format`.
    pub fn new(
        src: &'a [u8],
        width: u32,
        height: u32,
        src_format: PixelFormat,
        dst_format: PixelFormat,
    ) -> Self {
        Self {
            src,
            src_width: width as i32,
            src_height: height as i32,
            src_row_bytes: src_format.row_bytes(width as usize),
            src_format,
            dst_format,
            palette: None,
            transparent: None,
            conversion: Conversion::resolve(src_format, dst_format, false),
            src_x32: 0,
            src_y32: 0,
            src_x32_add: FP_ONE,
            src_y32_add: 0,
        }
    }

    /// Attaches a palette for indexed sources.
    pub fn with_palette(
        mut self,
        palette: &'a [Rgb888],
    ) -> Self {
        self.palette = Some(palette);
        self.conversion = Conversion::resolve(self.src_format, self.dst_format, true);
        self
    }

    /// Pixels whose raw source value equals `raw` are never written.
    pub fn with_transparent(
        mut self,
        raw: u32,
    ) -> Self {
        self.transparent = Some(raw & self.src_format.raw_mask());
        self
    }

    /// Changes the destination format, re-resolving the conversion.
    pub fn set_dst_format(
        &mut self,
        dst_format: PixelFormat,
    ) {
        self.dst_format = dst_format;
        self.conversion = Conversion::resolve(self.src_format, dst_format, self.palette.is_some());
    }

    #[inline]
    pub const fn src_width(&self) -> i32 { self.src_width }

    #[inline]
    pub const fn src_height(&self) -> i32 { self.src_height }

    #[inline]
    pub const fn src_format(&self) -> PixelFormat { self.src_format }

    #[inline]
    pub const fn dst_format(&self) -> PixelFormat { self.dst_format }

    #[inline]
    pub const fn conversion(&self) -> Conversion { self.conversion }

    #[inline]
    pub const fn has_transparent(&self) -> bool { self.transparent.is_some() }

    /// Places the cursors on integer source pixel `(x, y)` with a unit x step.
    pub fn set_position(
        &mut self,
        x: i32,
        y: i32,
    ) {
        self.src_x32 = x << FP_SCALE;
        self.src_y32 = y << FP_SCALE;
        self.src_x32_add = FP_ONE;
        self.src_y32_add = 0;
    }

    /// Raw source value under the cursor; 0 when the cursor is off the image.
    #[inline]
    fn current_raw(&self) -> u32 {
        let x = self.src_x32 >> FP_SCALE;
        let y = self.src_y32 >> FP_SCALE;
        if x < 0 || y < 0 || x >= self.src_width || y >= self.src_height {
            return 0;
        }
        let start = y as usize * self.src_row_bytes;
        let Some(row) = self.src.get(start..) else { return 0 };
        self.src_format.read_raw(row, x as usize)
    }

    #[inline]
    fn advance(&mut self) {
        self.src_x32 = self.src_x32.wrapping_add(self.src_x32_add);
        self.src_y32 = self.src_y32.wrapping_add(self.src_y32_add);
    }

    #[inline]
    fn is_transparent(
        &self,
        raw: u32,
    ) -> bool {
        self.transparent == Some(raw)
    }

    /// Converts one source raw value to the destination format.
    #[inline]
    pub fn convert(
        &self,
        raw: u32,
    ) -> u32 {
        match self.conversion {
            Conversion::Passthrough => raw,
            Conversion::Index => raw & self.dst_format.raw_mask(),
            Conversion::Palette | Conversion::Direct => {
                self.dst_format.encode(self.src_format.decode(raw, self.palette))
            }
        }
    }

    /// Copies up to `len` pixels into `dst` starting at destination pixel `dst_index`.
    ///
    /// Stops before the first transparent pixel and returns how many pixels
    /// were written; the cursor rests on the pixel that stopped the run.
    pub fn copy_run(
        &mut self,
        dst: &mut [u8],
        dst_index: usize,
        len: usize,
    ) -> usize {
        for i in 0..len {
            let raw = self.current_raw();
            if self.is_transparent(raw) {
                return i;
            }
            self.dst_format.write_raw(dst, dst_index + i, self.convert(raw));
            self.advance();
        }
        len
    }

    /// Skips up to `len` transparent pixels and returns how many were skipped.
    pub fn skip_run(
        &mut self,
        len: usize,
    ) -> usize {
        if self.transparent.is_none() {
            return 0;
        }
        for i in 0..len {
            if !self.is_transparent(self.current_raw()) {
                return i;
            }
            self.advance();
        }
        len
    }

    /// Compare mode: `out[i]` becomes true where the source equals `target`.
    ///
    /// `target` is a raw value in the source format.
    pub fn compare_run(
        &mut self,
        out: &mut [bool],
        target: u32,
    ) {
        for flag in out.iter_mut() {
            *flag = self.current_raw() == target;
            self.advance();
        }
    }

    /// Color of the pixel under the cursor, ignoring transparency.
    pub fn current_color(&self) -> Rgb888 { self.src_format.decode(self.current_raw(), self.palette) }
}

// =============================================================================
// Tests
// =============================================================================
