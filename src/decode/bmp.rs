//! BMP decoding.
//!
//! Uncompressed rows at 1/4/8/16/24/32 bits per pixel, plus RLE8 and RLE4.
//! Rows are decoded one at a time into a single row buffer and pushed with
//! a palette-aware [`PixelCopy`]. A positive height stores rows bottom-up.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;

use crate::color::{ByteOrder, ColorDepth, PixelFormat};
use crate::config::BMP_MAX_ROW_BYTES;
use crate::error::{GfxError, GfxResult};
use crate::gfx::Gfx;
use crate::panel::Panel;
use crate::pixelcopy::PixelCopy;

use super::{ByteSource, le_u16, le_u32};

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_MIN: u32 = 40;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Compression {
    None,
    Rle8,
    Rle4,
}

#[derive(Clone, Copy, Debug)]
struct BmpHeader {
    pixel_offset: u32,
    info_size: u32,
    width: i32,
    height: i32,
    bit_count: u16,
    compression: Compression,
    colors_used: u32,
}

impl BmpHeader {
    fn read<S: ByteSource + ?Sized>(src: &mut S) -> GfxResult<Self> {
        let mut raw = [0u8; FILE_HEADER_LEN + 36];
        src.pre_read();
        let read = src.read_exact(&mut raw);
        src.post_read();
        read?;

        if &raw[..2] != b"BM" {
            return Err(GfxError::InvalidHeader);
        }
        let info_size = le_u32(&raw, 14);
        if info_size < INFO_HEADER_MIN {
            log_warn!("bmp: info header of {} bytes", info_size);
            return Err(GfxError::UnsupportedFormat);
        }
        let bit_count = le_u16(&raw, 28);
        let compression = match le_u32(&raw, 30) {
            0 => Compression::None,
            1 => Compression::Rle8,
            2 => Compression::Rle4,
            other => {
                log_warn!("bmp: unsupported compression {}", other);
                return Err(GfxError::UnsupportedFormat);
            }
        };
        let header = Self {
            pixel_offset: le_u32(&raw, 10),
            info_size,
            width: le_u32(&raw, 18) as i32,
            height: le_u32(&raw, 22) as i32,
            bit_count,
            compression,
            colors_used: le_u32(&raw, 46),
        };

        if !matches!(bit_count, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(GfxError::UnsupportedFormat);
        }
        let rle_depth_ok = match compression {
            Compression::None => true,
            Compression::Rle8 => bit_count == 8,
            Compression::Rle4 => bit_count == 4,
        };
        if !rle_depth_ok || header.width <= 0 || header.height == 0 || header.height == i32::MIN {
            return Err(GfxError::InvalidHeader);
        }
        if header.row_bytes() > BMP_MAX_ROW_BYTES {
            return Err(GfxError::UnsupportedFormat);
        }
        Ok(header)
    }

    /// Stored row length, padded to 4 bytes.
    #[inline]
    fn row_bytes(&self) -> usize { (((self.width as usize) * usize::from(self.bit_count) + 31) >> 5) << 2 }

    /// Palette entries stored in the file.
    fn palette_len(&self) -> usize {
        let full = 1usize << self.bit_count;
        match self.colors_used as usize {
            0 => full,
            n => n.min(full),
        }
    }

    fn format(&self) -> PixelFormat {
        match self.bit_count {
            1 => PixelFormat::indexed(ColorDepth::Bits1),
            4 => PixelFormat::indexed(ColorDepth::Bits4),
            8 => PixelFormat::indexed(ColorDepth::Bits8),
            16 => PixelFormat::RGB565_LE,
            24 => PixelFormat::BGR888,
            _ => PixelFormat::ARGB8888.with_byte_order(ByteOrder::LittleEndian),
        }
    }
}

/// How an encoded row finished.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum RowEnd {
    /// End of line; the next row starts at column 0.
    Line,
    /// End of bitmap.
    Bitmap,
    /// Delta escape that moved `dy > 0` rows down, landing on column `x`.
    Delta { x: usize, dy: usize },
}

/// Decodes one RLE8 row into `line` (one index per byte), starting at column `x`.
fn rle8_row<S: ByteSource + ?Sized>(
    src: &mut S,
    line: &mut [u8],
    mut x: usize,
) -> GfxResult<RowEnd> {
    let mut put = |x: usize, v: u8| {
        if let Some(p) = line.get_mut(x) {
            *p = v;
        }
    };
    loop {
        let mut pair = [0u8; 2];
        src.read_exact(&mut pair)?;
        let [count, value] = pair;
        if count > 0 {
            for _ in 0..count {
                put(x, value);
                x += 1;
            }
            continue;
        }
        match value {
            0 => return Ok(RowEnd::Line),
            1 => return Ok(RowEnd::Bitmap),
            2 => {
                let mut delta = [0u8; 2];
                src.read_exact(&mut delta)?;
                x += usize::from(delta[0]);
                if delta[1] > 0 {
                    return Ok(RowEnd::Delta { x, dy: usize::from(delta[1]) });
                }
            }
            n => {
                let n = usize::from(n);
                let mut literal = [0u8; 256];
                src.read_exact(&mut literal[..n + (n & 1)])?;
                for &v in &literal[..n] {
                    put(x, v);
                    x += 1;
                }
            }
        }
    }
}

/// Decodes one RLE4 row into `line` (two indices per byte, high nibble first).
fn rle4_row<S: ByteSource + ?Sized>(
    src: &mut S,
    line: &mut [u8],
    mut x: usize,
) -> GfxResult<RowEnd> {
    let format = PixelFormat::indexed(ColorDepth::Bits4);
    loop {
        let mut pair = [0u8; 2];
        src.read_exact(&mut pair)?;
        let [count, value] = pair;
        if count > 0 {
            for i in 0..usize::from(count) {
                let nibble = if i & 1 == 0 { value >> 4 } else { value & 0x0F };
                format.write_raw(line, x, u32::from(nibble));
                x += 1;
            }
            continue;
        }
        match value {
            0 => return Ok(RowEnd::Line),
            1 => return Ok(RowEnd::Bitmap),
            2 => {
                let mut delta = [0u8; 2];
                src.read_exact(&mut delta)?;
                x += usize::from(delta[0]);
                if delta[1] > 0 {
                    return Ok(RowEnd::Delta { x, dy: usize::from(delta[1]) });
                }
            }
            n => {
                let n = usize::from(n);
                let bytes = n.div_ceil(2);
                let mut literal = [0u8; 128];
                src.read_exact(&mut literal[..bytes + (bytes & 1)])?;
                for i in 0..n {
                    format.write_raw(line, x, format.read_raw(&literal, i));
                    x += 1;
                }
            }
        }
    }
}

impl<P: Panel> Gfx<P> {
    /// Decodes a BMP image with its top-left corner at `(x, y)`.
    ///
    /// Header problems are reported before anything is drawn. A source that
    /// ends early stops the decode with [`GfxError::Truncated`]; rows already
    /// drawn stay.
    pub fn draw_bmp<S: ByteSource + ?Sized>(
        &mut self,
        src: &mut S,
        x: i32,
        y: i32,
    ) -> GfxResult {
        let header = BmpHeader::read(src)?;
        if x >= self.width || y >= self.height {
            return Ok(());
        }
        log_debug!("bmp: {}x{} at {} bpp", header.width, header.height, header.bit_count);

        let mut palette: heapless::Vec<Rgb888, 256> = heapless::Vec::new();
        if header.bit_count <= 8 {
            if !src.seek(FILE_HEADER_LEN + header.info_size as usize) {
                return Err(GfxError::Truncated);
            }
            let mut bgra = [0u8; 256 * 4];
            let bgra = &mut bgra[..header.palette_len() * 4];
            src.pre_read();
            let read = src.read_exact(bgra);
            src.post_read();
            read?;
            for entry in bgra.chunks_exact(4) {
                let _ = palette.push(Rgb888::new(entry[2], entry[1], entry[0]));
            }
        }
        if !src.seek(header.pixel_offset as usize) {
            return Err(GfxError::Truncated);
        }

        let row_bytes = header.row_bytes();
        let mut line = Vec::new();
        line.try_reserve_exact(row_bytes).map_err(|_| GfxError::OutOfMemory)?;
        line.resize(row_bytes, 0);

        self.start_write_with(!src.has_parent());
        let result = self.bmp_rows(src, &header, &palette, &mut line, x, y);
        self.end_write();
        result
    }

    fn bmp_rows<S: ByteSource + ?Sized>(
        &mut self,
        src: &mut S,
        header: &BmpHeader,
        palette: &[Rgb888],
        line: &mut [u8],
        x: i32,
        mut y: i32,
    ) -> GfxResult {
        let (w, h) = (header.width, header.height.unsigned_abs());
        let step = if header.height < 0 { 1 } else { -1 };
        if header.height > 0 {
            y += header.height - 1;
        }
        let format = header.format();

        let h = h as usize;
        let mut row = 0;
        let mut start_x = 0;
        while row < h {
            src.pre_read();
            let end = match header.compression {
                Compression::None => src.read_exact(line).map(|_| RowEnd::Line),
                Compression::Rle8 => {
                    line.fill(0);
                    rle8_row(src, line, start_x)
                }
                Compression::Rle4 => {
                    line.fill(0);
                    rle4_row(src, line, start_x)
                }
            };
            src.post_read();
            let end = end?;

            self.bmp_line(line, w, format, palette, x, y);

            let advance = match end {
                RowEnd::Line => {
                    start_x = 0;
                    1
                }
                RowEnd::Bitmap => break,
                RowEnd::Delta { x: landing, dy } => {
                    // Rows jumped over hold index 0, like skipped columns.
                    line.fill(0);
                    for _ in 1..dy.min(h - row) {
                        y += step;
                        self.bmp_line(line, w, format, palette, x, y);
                    }
                    start_x = landing;
                    dy
                }
            };
            row += advance;
            y += step;
        }
        Ok(())
    }

    fn bmp_line(
        &mut self,
        line: &[u8],
        w: i32,
        format: PixelFormat,
        palette: &[Rgb888],
        x: i32,
        y: i32,
    ) {
        let mut pc = PixelCopy::new(line, w as u32, 1, format, self.panel.write_format());
        if !palette.is_empty() {
            pc = pc.with_palette(palette);
        }
        self.push_image(x, y, w, 1, &mut pc);
    }
}

// =============================================================================
// Tests
// =============================================================================
