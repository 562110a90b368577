//! Runtime-loaded VLW fonts.
//!
//! # Format
//!
//! All fields are big-endian 32-bit integers.
//!
//! | Offset | Content |
//! |--------|---------|
//! | 0 | glyph count, version, point size, (unused), ascent, descent |
//! | 24 | one 28-byte record per glyph: code point, height, width, x advance, dY, dX, (unused) |
//! | 24 + 28 * count | glyph bitmaps back to back, one alpha byte per pixel |
//!
//! `dY` is the distance from the baseline up to the top of the bitmap.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::error::{GfxError, GfxResult};

use super::{Font, FontMetrics, GlyphSink, TextStyle};

const HEADER_LEN: usize = 24;
const RECORD_LEN: usize = 28;

/// Alpha at which a glyph pixel is drawn when there is no background to blend with.
const ALPHA_THRESHOLD: u8 = 128;

#[derive(Clone, Copy, Debug)]
struct Glyph {
    code: u16,
    width: i32,
    height: i32,
    x_advance: i32,
    dy: i32,
    dx: i32,
    offset: usize,
}

/// A parsed VLW font owning its glyph table and bitmaps.
pub struct VlwFont {
    glyphs: Vec<Glyph>,
    bitmaps: Vec<u8>,
    y_advance: i32,
    space_width: i32,
    max_ascent: i32,
}

#[inline]
fn be_i32(
    data: &[u8],
    at: usize,
) -> GfxResult<i32> {
    let bytes = data.get(at..at + 4).ok_or(GfxError::Truncated)?;
    Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

impl VlwFont {
    /// Parses a VLW font image. Nothing is kept from `data`.
    pub fn parse(data: &[u8]) -> GfxResult<Self> {
        let count = be_i32(data, 0)?;
        let ascent = be_i32(data, 16)?;
        let descent = be_i32(data, 20)?;
        if count <= 0 || count > i32::from(u16::MAX) || ascent < 0 || descent < 0 {
            return Err(GfxError::InvalidHeader);
        }
        let count = count as usize;

        let mut glyphs = Vec::new();
        glyphs.try_reserve_exact(count).map_err(|_| GfxError::OutOfMemory)?;
        let mut offset = 0usize;
        let mut max_ascent = ascent;
        let mut max_descent = descent;
        for i in 0..count {
            let at = HEADER_LEN + i * RECORD_LEN;
            let code = be_i32(data, at)?;
            let height = be_i32(data, at + 4)?;
            let width = be_i32(data, at + 8)?;
            if !(0..=i32::from(u16::MAX)).contains(&code) || !(0..=255).contains(&width) || !(0..=255).contains(&height) {
                return Err(GfxError::Corrupt);
            }
            let glyph = Glyph {
                code: code as u16,
                width,
                height,
                x_advance: be_i32(data, at + 12)?,
                dy: be_i32(data, at + 16)?,
                dx: be_i32(data, at + 20)?,
                offset,
            };
            max_ascent = max_ascent.max(glyph.dy);
            max_descent = max_descent.max(glyph.height - glyph.dy);
            offset += (width * height) as usize;
            glyphs.push(glyph);
        }

        let start = HEADER_LEN + count * RECORD_LEN;
        let bytes = data.get(start..start + offset).ok_or(GfxError::Truncated)?;
        let mut bitmaps = Vec::new();
        bitmaps.try_reserve_exact(offset).map_err(|_| GfxError::OutOfMemory)?;
        bitmaps.extend_from_slice(bytes);
        glyphs.sort_unstable_by_key(|g| g.code);

        let y_advance = max_ascent + max_descent;
        let space_width = match glyphs.binary_search_by_key(&0x20, |g| g.code) {
            Ok(i) => glyphs[i].x_advance,
            Err(_) => y_advance / 4,
        };
        Ok(Self { glyphs, bitmaps, y_advance, space_width, max_ascent })
    }

    #[inline]
    pub fn glyph_count(&self) -> usize { self.glyphs.len() }

    #[inline]
    fn find(
        &self,
        code: u16,
    ) -> Option<&Glyph> {
        self.glyphs.binary_search_by_key(&code, |g| g.code).ok().map(|i| &self.glyphs[i])
    }

    fn cell_metrics(&self) -> FontMetrics {
        FontMetrics {
            width: self.space_width,
            height: self.y_advance,
            x_advance: self.space_width,
            x_offset: 0,
            y_advance: self.y_advance,
            y_offset: 0,
            baseline: self.max_ascent,
        }
    }
}

/// `fore` over `back` at coverage `alpha`.
fn blend(
    fore: Rgb888,
    back: Rgb888,
    alpha: u8,
) -> Rgb888 {
    let a = u32::from(alpha);
    let mix = |f: u8, b: u8| ((u32::from(f) * a + u32::from(b) * (255 - a) + 127) / 255) as u8;
    Rgb888::new(mix(fore.r(), back.r()), mix(fore.g(), back.g()), mix(fore.b(), back.b()))
}

impl Font for VlwFont {
    fn default_metric(&self) -> FontMetrics { self.cell_metrics() }

    #[inline]
    fn glyph_code(
        &self,
        index: usize,
    ) -> Option<u16> {
        self.glyphs.get(index).map(|g| g.code)
    }

    fn update_font_metric(
        &self,
        metrics: &mut FontMetrics,
        code: u16,
    ) -> bool {
        if let Some(g) = self.find(code) {
            *metrics = FontMetrics { width: g.width, x_advance: g.x_advance, x_offset: g.dx, ..self.cell_metrics() };
            return true;
        }
        if code == 0x20 {
            *metrics = self.cell_metrics();
            return true;
        }
        false
    }

    fn draw_char(
        &self,
        sink: &mut dyn GlyphSink,
        x: i32,
        y: i32,
        code: u16,
        style: &TextStyle,
    ) -> i32 {
        let (sx, sy) = (style.size_x, style.size_y);
        let Some(g) = self.find(code) else {
            if code != 0x20 {
                return 0;
            }
            if let Some(back) = style.back {
                sink.glyph_fill(x, y, self.space_width * sx, self.y_advance * sy, back);
            }
            return self.space_width * sx;
        };

        if let Some(back) = style.back {
            let cell_w = g.x_advance.max(g.dx + g.width);
            sink.glyph_fill(x, y, cell_w * sx, self.y_advance * sy, back);
        }

        let Some(pixels) = self.bitmaps.get(g.offset..g.offset + (g.width * g.height) as usize) else {
            return g.x_advance * sx;
        };
        for (r, row) in pixels.chunks(g.width.max(1) as usize).enumerate() {
            let py = y + (self.max_ascent - g.dy + r as i32) * sy;
            let color_at = |alpha: u8| match style.back {
                Some(back) if alpha > 0 => Some(blend(style.fore, back, alpha)),
                None if alpha >= ALPHA_THRESHOLD => Some(style.fore),
                _ => None,
            };
            let mut col = 0usize;
            while col < row.len() {
                let color = color_at(row[col]);
                let start = col;
                while col < row.len() && color_at(row[col]) == color {
                    col += 1;
                }
                if let Some(color) = color {
                    let px = x + (g.dx + start as i32) * sx;
                    sink.glyph_fill(px, py, (col - start) as i32 * sx, sy, color);
                }
            }
        }
        g.x_advance * sx
    }
}

// =============================================================================
// Tests
// =============================================================================
