//! PNG decoding.
//!
//! Chunks are streamed in bounded reads and checked against their CRC.
//! `IDAT` data goes through a streaming inflater with a 32 KiB wrapping
//! window; each reconstructed row is drawn before the next is inflated.
//!
//! Gray, RGB, palette, gray+alpha and RGBA are accepted at every bit depth
//! the format defines. 16-bit channels are reduced to their high byte.
//! Interlaced (Adam7) images are rejected.
//!
//! # Placement
//!
//! Image pixel `(off_x, off_y)` (in scaled pixels) lands on `(x, y)`.
//! Scaling is nearest-neighbor: image row `y` covers output rows
//! `ceil(y * scale) .. ceil((y + 1) * scale)`, and likewise for columns.
//! An image with transparency is composited over the surface contents,
//! which are read back one output row at a time.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use miniz_oxide::inflate::TINFLStatus;
use miniz_oxide::inflate::core::{
    DecompressorOxide, decompress,
    inflate_flags::{TINFL_FLAG_HAS_MORE_INPUT, TINFL_FLAG_PARSE_ZLIB_HEADER},
};

use crate::clip::ClipRect;
use crate::config::{PNG_DICT_SIZE, PNG_READ_CHUNK};
use crate::error::{GfxError, GfxResult};
use crate::gfx::Gfx;
use crate::panel::Panel;

use super::{ByteSource, StreamReader, be_u32};

type Reader<'s, S> = StreamReader<'s, S, PNG_READ_CHUNK>;

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

// =============================================================================
// Options
// =============================================================================

/// Placement of a decoded PNG.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PngOptions {
    /// Widest output in pixels; 0 for no limit besides the clip.
    pub max_width: i32,
    /// Tallest output in pixels; 0 for no limit besides the clip.
    pub max_height: i32,
    pub off_x: i32,
    pub off_y: i32,
    /// Output pixels per image pixel.
    pub scale: f32,
}

impl Default for PngOptions {
    fn default() -> Self { Self { max_width: 0, max_height: 0, off_x: 0, off_y: 0, scale: 1.0 } }
}

// =============================================================================
// CRC
// =============================================================================

const CRC_POLY: u32 = 0xEDB8_8320;

/// Byte-at-a-time CRC-32 table, built at compile time.
static CRC_TABLE: [u32; 256] = crc_table();

const fn crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { (c >> 1) ^ CRC_POLY } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Feeds `data` into a running CRC-32 (start with `!0`, finish with `!crc`).
pub(crate) fn crc32_update(
    crc: u32,
    data: &[u8],
) -> u32 {
    data.iter().fold(crc, |crc, &b| CRC_TABLE[((crc ^ u32::from(b)) & 0xFF) as usize] ^ (crc >> 8))
}

// =============================================================================
// Header
// =============================================================================

#[derive(Clone, Copy, Debug)]
struct Header {
    width: u32,
    height: u32,
    depth: u8,
    color_type: u8,
}

impl Header {
    fn parse(raw: &[u8; 13]) -> GfxResult<Self> {
        let header = Self { width: be_u32(raw, 0), height: be_u32(raw, 4), depth: raw[8], color_type: raw[9] };
        if header.width == 0 || header.height == 0 || header.width > i32::MAX as u32 || header.height > i32::MAX as u32 {
            return Err(GfxError::InvalidHeader);
        }
        if raw[10] != 0 || raw[11] != 0 || raw[12] > 1 {
            return Err(GfxError::InvalidHeader);
        }
        if raw[12] == 1 {
            log_warn!("png: interlaced images are not supported");
            return Err(GfxError::UnsupportedFormat);
        }
        let valid = matches!(
            (header.color_type, header.depth),
            (0, 1 | 2 | 4 | 8 | 16) | (2, 8 | 16) | (3, 1 | 2 | 4 | 8) | (4, 8 | 16) | (6, 8 | 16)
        );
        if !valid {
            log_warn!("png: color type {} at depth {}", header.color_type, header.depth);
            return Err(GfxError::UnsupportedFormat);
        }
        Ok(header)
    }

    const fn channels(&self) -> usize {
        match self.color_type {
            0 | 3 => 1,
            2 => 3,
            4 => 2,
            _ => 4,
        }
    }

    #[inline]
    const fn bits_per_pixel(&self) -> usize { self.channels() * self.depth as usize }

    /// Filter stride: bytes per complete pixel, at least one.
    #[inline]
    const fn pixel_bytes(&self) -> usize { self.bits_per_pixel().div_ceil(8) }

    fn row_bytes(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.bits_per_pixel()).map(|bits| bits.div_ceil(8))
    }
}

/// Palette and transparency chunks seen before the image data.
#[derive(Default)]
struct Ancillary {
    palette: heapless::Vec<Rgb888, 256>,
    alpha: heapless::Vec<u8, 256>,
    /// Transparent sample value(s) for gray and RGB images.
    key: Option<[u16; 3]>,
}

// =============================================================================
// Output Window
// =============================================================================

#[derive(Clone, Copy, Debug)]
struct Window {
    x: i32,
    y: i32,
    off_x: i32,
    off_y: i32,
    max_w: i32,
    max_h: i32,
    scale: f32,
}

impl Window {
    /// Fits the requested window into `clip`; `None` if nothing is visible.
    fn fit(
        clip: ClipRect,
        mut x: i32,
        mut y: i32,
        opts: &PngOptions,
    ) -> Option<Self> {
        if opts.scale.is_nan() || opts.scale <= 0.0 {
            return None;
        }
        let (mut off_x, mut off_y) = (opts.off_x, opts.off_y);

        let mut max_h = if opts.max_height != 0 { opts.max_height } else { i32::MAX };
        if y < clip.top {
            max_h += y - clip.top;
            off_y -= y - clip.top;
            y = clip.top;
        }
        if off_y < 0 {
            y -= off_y;
            max_h += off_y;
            off_y = 0;
        }
        max_h = max_h.min(clip.bottom + 1 - y);

        let mut max_w = if opts.max_width != 0 { opts.max_width } else { i32::MAX };
        if x < clip.left {
            max_w += x - clip.left;
            off_x -= x - clip.left;
            x = clip.left;
        }
        if off_x < 0 {
            x -= off_x;
            max_w += off_x;
            off_x = 0;
        }
        max_w = max_w.min(clip.right + 1 - x);

        (max_w > 0 && max_h > 0).then_some(Self { x, y, off_x, off_y, max_w, max_h, scale: opts.scale })
    }

    /// Shrinks the window to the scaled image; false if nothing is left.
    fn fit_image(
        &mut self,
        header: &Header,
    ) -> bool {
        self.max_w = self.max_w.min(self.edge(header.width, self.off_x));
        self.max_h = self.max_h.min(self.edge(header.height, self.off_y));
        self.max_w > 0 && self.max_h > 0
    }

    /// Output coordinate of image edge `i`, shifted by `off`.
    #[inline]
    fn edge(
        &self,
        i: u32,
        off: i32,
    ) -> i32 {
        #[allow(clippy::float_cmp)]
        let scaled = if self.scale == 1.0 { i as i32 } else { libm::ceilf(i as f32 * self.scale) as i32 };
        scaled - off
    }
}

// =============================================================================
// Row Reconstruction
// =============================================================================

fn paeth(
    a: u8,
    b: u8,
    c: u8,
) -> u8 {
    let (ia, ib, ic) = (i16::from(a), i16::from(b), i16::from(c));
    let p = ia + ib - ic;
    let (pa, pb, pc) = ((p - ia).abs(), (p - ib).abs(), (p - ic).abs());
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn unfilter(
    filter: u8,
    cur: &mut [u8],
    prev: &[u8],
    bpp: usize,
) {
    match filter {
        1 => {
            for i in bpp..cur.len() {
                cur[i] = cur[i].wrapping_add(cur[i - bpp]);
            }
        }
        2 => {
            for (c, p) in cur.iter_mut().zip(prev) {
                *c = c.wrapping_add(*p);
            }
        }
        3 => {
            for i in 0..cur.len() {
                let left = if i >= bpp { cur[i - bpp] } else { 0 };
                cur[i] = cur[i].wrapping_add(((u16::from(left) + u16::from(prev[i])) >> 1) as u8);
            }
        }
        4 => {
            for i in 0..cur.len() {
                let (left, corner) = if i >= bpp { (cur[i - bpp], prev[i - bpp]) } else { (0, 0) };
                cur[i] = cur[i].wrapping_add(paeth(left, prev[i], corner));
            }
        }
        _ => {}
    }
}

/// `depth`-bit sample `x` of a packed row, most significant bits first.
#[inline]
fn packed(
    row: &[u8],
    x: usize,
    depth: u8,
) -> u8 {
    let bit = x * depth as usize;
    let shift = 8 - depth as usize - bit % 8;
    (row[bit / 8] >> shift) & (((1u16 << depth) - 1) as u8)
}

#[inline]
fn wide(
    row: &[u8],
    at: usize,
) -> u16 {
    u16::from_be_bytes([row[at], row[at + 1]])
}

/// Composites `px` (RGBA) over the RGB888 pixel `dst`.
fn blend_into(
    dst: &mut [u8],
    px: [u8; 4],
) {
    if px[3] == 255 {
        dst.copy_from_slice(&px[..3]);
        return;
    }
    let a = u32::from(px[3]) + 1;
    for (d, s) in dst.iter_mut().zip(px) {
        *d = ((u32::from(s) * a + u32::from(*d) * (257 - a)) >> 8) as u8;
    }
}

fn zeroed(len: usize) -> GfxResult<Vec<u8>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| GfxError::OutOfMemory)?;
    v.resize(len, 0);
    Ok(v)
}

/// Unfilters inflated bytes into rows and draws each finished row.
struct Rows {
    header: Header,
    win: Window,
    anc: Ancillary,
    /// Composite over read-back surface pixels.
    blend: bool,
    cur: Vec<u8>,
    prev: Vec<u8>,
    fill: usize,
    filter: Option<u8>,
    y: u32,
    /// One output row, RGB888.
    line: Vec<u8>,
}

impl Rows {
    fn new(
        header: Header,
        win: Window,
        anc: Ancillary,
    ) -> GfxResult<Self> {
        let row_bytes = header.row_bytes().ok_or(GfxError::OutOfMemory)?;
        let blend = matches!(header.color_type, 4 | 6) || !anc.alpha.is_empty() || anc.key.is_some();
        Ok(Self {
            header,
            win,
            anc,
            blend,
            cur: zeroed(row_bytes)?,
            prev: zeroed(row_bytes)?,
            fill: 0,
            filter: None,
            y: 0,
            line: zeroed(win.max_w as usize * 3)?,
        })
    }

    #[inline]
    fn complete(&self) -> bool { self.y >= self.header.height }

    fn push<P: Panel>(
        &mut self,
        gfx: &mut Gfx<P>,
        mut data: &[u8],
    ) -> GfxResult {
        while !data.is_empty() && !self.complete() {
            let Some(filter) = self.filter else {
                if data[0] > 4 {
                    return Err(GfxError::Corrupt);
                }
                self.filter = Some(data[0]);
                data = &data[1..];
                continue;
            };
            let n = (self.cur.len() - self.fill).min(data.len());
            self.cur[self.fill..self.fill + n].copy_from_slice(&data[..n]);
            self.fill += n;
            data = &data[n..];
            if self.fill == self.cur.len() {
                unfilter(filter, &mut self.cur, &self.prev, self.header.pixel_bytes());
                self.draw_row(gfx);
                core::mem::swap(&mut self.cur, &mut self.prev);
                self.fill = 0;
                self.filter = None;
                self.y += 1;
            }
        }
        Ok(())
    }

    /// Sample `x` of the current row as RGBA.
    fn sample(
        &self,
        x: usize,
    ) -> [u8; 4] {
        let row = &self.cur;
        let h = &self.header;
        let key = self.anc.key;
        let opaque = |hit: bool| if hit { 0 } else { 255 };
        match (h.color_type, h.depth) {
            (0, 16) => {
                let v = row[x * 2];
                [v, v, v, opaque(key.is_some_and(|k| k[0] == wide(row, x * 2)))]
            }
            (0, depth) => {
                let raw = packed(row, x, depth);
                let v = raw * (255 / ((1u16 << depth) - 1) as u8);
                [v, v, v, opaque(key.is_some_and(|k| k[0] == u16::from(raw)))]
            }
            (2, 16) => {
                let rgb = [wide(row, x * 6), wide(row, x * 6 + 2), wide(row, x * 6 + 4)];
                [row[x * 6], row[x * 6 + 2], row[x * 6 + 4], opaque(key == Some(rgb))]
            }
            (2, _) => {
                let p = &row[x * 3..x * 3 + 3];
                let rgb = [u16::from(p[0]), u16::from(p[1]), u16::from(p[2])];
                [p[0], p[1], p[2], opaque(key == Some(rgb))]
            }
            (3, depth) => {
                let i = packed(row, x, depth) as usize;
                let c = self.anc.palette.get(i).copied().unwrap_or(Rgb888::BLACK);
                [c.r(), c.g(), c.b(), self.anc.alpha.get(i).copied().unwrap_or(255)]
            }
            (4, 16) => [row[x * 4], row[x * 4], row[x * 4], row[x * 4 + 2]],
            (4, _) => [row[x * 2], row[x * 2], row[x * 2], row[x * 2 + 1]],
            (_, 16) => [row[x * 8], row[x * 8 + 2], row[x * 8 + 4], row[x * 8 + 6]],
            _ => [row[x * 4], row[x * 4 + 1], row[x * 4 + 2], row[x * 4 + 3]],
        }
    }

    /// Draws the current image row over every output row it covers.
    fn draw_row<P: Panel>(
        &mut self,
        gfx: &mut Gfx<P>,
    ) {
        let win = self.win;
        let top = win.edge(self.y, win.off_y).max(0);
        let bottom = win.edge(self.y + 1, win.off_y).min(win.max_h);
        for t in top..bottom {
            if self.blend {
                gfx.read_rect_rgb(win.x, win.y + t, win.max_w, 1, &mut self.line);
            }
            if self.blend || t == top {
                for col in 0..self.header.width {
                    let left = win.edge(col, win.off_x);
                    if left >= win.max_w {
                        break;
                    }
                    let right = win.edge(col + 1, win.off_x).min(win.max_w);
                    let left = left.max(0);
                    if left >= right {
                        continue;
                    }
                    let px = self.sample(col as usize);
                    for i in left as usize..right as usize {
                        blend_into(&mut self.line[i * 3..i * 3 + 3], px);
                    }
                }
            }
            gfx.push_image_rgb888(win.x, win.y + t, win.max_w, 1, &self.line);
        }
    }
}

// =============================================================================
// Inflate
// =============================================================================

/// Streaming zlib inflater over a wrapping window.
struct Inflater {
    state: Vec<DecompressorOxide>,
    dict: Vec<u8>,
    out_pos: usize,
    done: bool,
}

impl Inflater {
    fn new() -> GfxResult<Self> {
        let mut state = Vec::new();
        state.try_reserve_exact(1).map_err(|_| GfxError::OutOfMemory)?;
        state.push(DecompressorOxide::new());
        Ok(Self { state, dict: zeroed(PNG_DICT_SIZE)?, out_pos: 0, done: false })
    }

    /// Inflates `input`, handing every produced byte to `rows`.
    fn feed<P: Panel>(
        &mut self,
        gfx: &mut Gfx<P>,
        rows: &mut Rows,
        mut input: &[u8],
    ) -> GfxResult {
        let flags = TINFL_FLAG_PARSE_ZLIB_HEADER | TINFL_FLAG_HAS_MORE_INPUT;
        while !self.done {
            let (status, consumed, written) = decompress(&mut self.state[0], input, &mut self.dict, self.out_pos, flags);
            input = &input[consumed..];
            rows.push(gfx, &self.dict[self.out_pos..self.out_pos + written])?;
            self.out_pos = (self.out_pos + written) & (self.dict.len() - 1);
            match status {
                TINFLStatus::Done => self.done = true,
                TINFLStatus::NeedsMoreInput => return Ok(()),
                TINFLStatus::HasMoreOutput => {}
                _ => {
                    log_warn!("png: inflate failed");
                    return Err(GfxError::Corrupt);
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Drawing
// =============================================================================

fn chunk_header<S: ByteSource + ?Sized>(r: &mut Reader<'_, S>) -> GfxResult<(usize, [u8; 4])> {
    let len = r.u32()? as usize;
    let mut kind = [0u8; 4];
    r.read_into(&mut kind)?;
    Ok((len, kind))
}

fn check_crc<S: ByteSource + ?Sized>(
    r: &mut Reader<'_, S>,
    crc: u32,
) -> GfxResult {
    if r.u32()? != !crc {
        return Err(GfxError::Corrupt);
    }
    Ok(())
}

impl<P: Panel> Gfx<P> {
    /// Decodes a PNG from `src` and draws it at `(x, y)`.
    ///
    /// Fails before any pixel is written if the signature or header is
    /// malformed or describes an unsupported image. Returns `Ok` without
    /// drawing when the window is empty.
    pub fn draw_png<S: ByteSource + ?Sized>(
        &mut self,
        src: &mut S,
        x: i32,
        y: i32,
        opts: PngOptions,
    ) -> GfxResult {
        let Some(mut win) = Window::fit(self.clip, x, y, &opts) else {
            return Ok(());
        };
        let mut r = Reader::new(src);

        let mut signature = [0u8; 8];
        r.read_into(&mut signature)?;
        if signature != SIGNATURE {
            return Err(GfxError::InvalidHeader);
        }
        let (len, kind) = chunk_header(&mut r)?;
        if &kind != b"IHDR" || len != 13 {
            return Err(GfxError::InvalidHeader);
        }
        let mut raw = [0u8; 13];
        r.read_into(&mut raw)?;
        check_crc(&mut r, crc32_update(crc32_update(!0, &kind), &raw))?;
        let header = Header::parse(&raw)?;
        log_debug!("png: {}x{} type {} depth {}", header.width, header.height, header.color_type, header.depth);

        if !win.fit_image(&header) {
            return Ok(());
        }
        self.start_write_with(!r.src.has_parent());
        let result = self.png_chunks(&mut r, header, win);
        self.end_write();
        result
    }

    fn png_chunks<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
        header: Header,
        win: Window,
    ) -> GfxResult {
        let mut anc = Ancillary::default();
        let mut image: Option<(Inflater, Rows)> = None;
        loop {
            let (len, kind) = chunk_header(r)?;
            log_trace!("png: chunk {:#x}, {} bytes", u32::from_be_bytes(kind), len);
            let mut crc = crc32_update(!0, &kind);
            match &kind {
                b"PLTE" if image.is_none() => {
                    if len % 3 != 0 || len > 768 {
                        return Err(GfxError::Corrupt);
                    }
                    let mut raw = [0u8; 768];
                    r.read_into(&mut raw[..len])?;
                    crc = crc32_update(crc, &raw[..len]);
                    anc.palette.clear();
                    for rgb in raw[..len].chunks_exact(3) {
                        let _ = anc.palette.push(Rgb888::new(rgb[0], rgb[1], rgb[2]));
                    }
                }
                b"tRNS" if image.is_none() => {
                    if len > 256 {
                        return Err(GfxError::Corrupt);
                    }
                    let mut raw = [0u8; 256];
                    r.read_into(&mut raw[..len])?;
                    crc = crc32_update(crc, &raw[..len]);
                    match (header.color_type, len) {
                        (3, _) => {
                            anc.alpha.clear();
                            let _ = anc.alpha.extend_from_slice(&raw[..len]);
                        }
                        (0, 2) => anc.key = Some([wide(&raw, 0), 0, 0]),
                        (2, 6) => anc.key = Some([wide(&raw, 0), wide(&raw, 2), wide(&raw, 4)]),
                        _ => {}
                    }
                }
                b"IDAT" => {
                    if image.is_none() {
                        let rows = Rows::new(header, win, core::mem::take(&mut anc))?;
                        image = Some((Inflater::new()?, rows));
                    }
                    let Some((inflater, rows)) = image.as_mut() else {
                        return Err(GfxError::OutOfMemory);
                    };
                    let mut left = len;
                    while left > 0 {
                        let data = r.take(left)?;
                        crc = crc32_update(crc, data);
                        left -= data.len();
                        inflater.feed(self, rows, data)?;
                    }
                }
                _ if kind[0] & 0x20 == 0 && &kind != b"IEND" => {
                    log_warn!("png: unknown critical chunk");
                    return Err(GfxError::UnsupportedFormat);
                }
                _ => {
                    let mut left = len;
                    while left > 0 {
                        let data = r.take(left)?;
                        crc = crc32_update(crc, data);
                        left -= data.len();
                    }
                }
            }
            check_crc(r, crc)?;
            if &kind == b"IEND" {
                break;
            }
        }
        match image {
            Some((_, rows)) if rows.complete() => Ok(()),
            _ => Err(GfxError::Truncated),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::decode::SliceSource;
    use crate::decode::test_source::SharedSource;
    use crate::frame_panel::PanelOp;
    use crate::test_support::{BLACK, BLUE, RED, gfx};

    fn adler32(data: &[u8]) -> u32 {
        let (mut a, mut b) = (1u32, 0u32);
        for &d in data {
            a = (a + u32::from(d)) % 65521;
            b = (b + a) % 65521;
        }
        (b << 16) | a
    }

    /// zlib stream of a single stored block.
    fn zlib_stored(data: &[u8]) -> Vec<u8> {
        let len = data.len() as u16;
        let mut out = vec![0x78, 0x01, 0x01];
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(data);
        out.extend_from_slice(&adler32(data).to_be_bytes());
        out
    }

    fn chunk(
        out: &mut Vec<u8>,
        kind: &[u8; 4],
        data: &[u8],
    ) {
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        out.extend_from_slice(&(!crc32_update(crc32_update(!0, kind), data)).to_be_bytes());
    }

    /// PNG with `rows` (each led by its filter byte), the image data split
    /// into two `IDAT` chunks at `split`.
    fn png(
        width: u32,
        height: u32,
        depth: u8,
        color_type: u8,
        extra: &[(&[u8; 4], &[u8])],
        rows: &[&[u8]],
        split: usize,
    ) -> Vec<u8> {
        let mut out = SIGNATURE.to_vec();
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[depth, color_type, 0, 0, 0]);
        chunk(&mut out, b"IHDR", &ihdr);
        for (kind, data) in extra {
            chunk(&mut out, kind, data);
        }
        let raw: Vec<u8> = rows.concat();
        let z = zlib_stored(&raw);
        let split = split.min(z.len());
        chunk(&mut out, b"IDAT", &z[..split]);
        if split < z.len() {
            chunk(&mut out, b"IDAT", &z[split..]);
        }
        chunk(&mut out, b"IEND", &[]);
        out
    }

    fn gray(v: u8) -> Rgb888 { Rgb888::new(v, v, v) }

    fn two_by_two(split: usize) -> Vec<u8> {
        png(2, 2, 8, 2, &[], &[&[0, 255, 0, 0, 0, 0, 255], &[0, 0, 0, 255, 255, 0, 0]], split)
    }

    #[test]
    fn test_crc_of_iend() {
        assert_eq!(!crc32_update(!0, b"IEND"), 0xAE42_6082);
        assert_eq!(CRC_TABLE[1], 0x7707_3096);
        assert_eq!(CRC_TABLE[255], 0x2D02_EF8D);
        // Split feeds match one pass.
        let whole = crc32_update(!0, b"123456789");
        assert_eq!(crc32_update(crc32_update(!0, b"1234"), b"56789"), whole);
        assert_eq!(!whole, 0xCBF4_3926);
    }

    #[test]
    fn test_rgb_rows_draw() {
        let mut g = gfx(10, 10);
        g.draw_png(&mut SliceSource::new(&two_by_two(usize::MAX)), 1, 1, PngOptions::default()).unwrap();
        assert_eq!(g.panel().pixel(1, 1), RED);
        assert_eq!(g.panel().pixel(2, 1), BLUE);
        assert_eq!(g.panel().pixel(1, 2), BLUE);
        assert_eq!(g.panel().pixel(2, 2), RED);
        assert_eq!(g.panel().pixel(3, 1), BLACK);
    }

    #[test]
    fn test_split_image_data_streams() {
        let mut g = gfx(4, 4);
        g.draw_png(&mut SliceSource::new(&two_by_two(5)), 0, 0, PngOptions::default()).unwrap();
        assert_eq!(g.panel().pixel(0, 0), RED);
        assert_eq!(g.panel().pixel(1, 1), RED);
        assert_eq!(g.panel().pixel(0, 1), BLUE);
    }

    #[test]
    fn test_filters_reconstruct_rows() {
        let rows: [&[u8]; 4] = [&[1, 10, 5, 5], &[2, 1, 1, 1], &[4, 0, 0, 0], &[3, 0, 0, 0]];
        let data = png(3, 4, 8, 0, &[], &rows, usize::MAX);
        let mut g = gfx(4, 4);
        g.draw_png(&mut SliceSource::new(&data), 0, 0, PngOptions::default()).unwrap();
        let row = |y: i32| [0, 1, 2].map(|x| g.panel().pixel(x, y));
        assert_eq!(row(0), [gray(10), gray(15), gray(20)]);
        assert_eq!(row(1), [gray(11), gray(16), gray(21)]);
        assert_eq!(row(2), [gray(11), gray(16), gray(21)]);
        assert_eq!(row(3), [gray(5), gray(10), gray(15)]);
    }

    #[test]
    fn test_sub_byte_gray_and_wide_channels() {
        let data = png(4, 1, 2, 0, &[], &[&[0, 0b0001_1011]], usize::MAX);
        let mut g = gfx(4, 2);
        g.draw_png(&mut SliceSource::new(&data), 0, 0, PngOptions::default()).unwrap();
        assert_eq!([0, 1, 2, 3].map(|x| g.panel().pixel(x, 0)), [gray(0), gray(85), gray(170), gray(255)]);

        let data = png(1, 1, 16, 2, &[], &[&[0, 0x12, 0x34, 0xAB, 0xCD, 0xFF, 0x00]], usize::MAX);
        g.draw_png(&mut SliceSource::new(&data), 0, 1, PngOptions::default()).unwrap();
        assert_eq!(g.panel().pixel(0, 1), Rgb888::new(0x12, 0xAB, 0xFF));
    }

    #[test]
    fn test_palette_transparency_keeps_surface() {
        let plte: &[u8] = &[255, 0, 0, 0, 0, 255];
        let trns: &[u8] = &[0];
        let data = png(2, 1, 1, 3, &[(b"PLTE", plte), (b"tRNS", trns)], &[&[0, 0b0100_0000]], usize::MAX);
        let mut g = gfx(4, 4);
        g.fill_rect(0, 0, 2, 1, Rgb888::GREEN);
        g.draw_png(&mut SliceSource::new(&data), 0, 0, PngOptions::default()).unwrap();
        assert_eq!(g.panel().pixel(0, 0), Rgb888::GREEN);
        assert_eq!(g.panel().pixel(1, 0), BLUE);
    }

    #[test]
    fn test_alpha_blends_with_surface() {
        let data = png(1, 1, 8, 6, &[], &[&[0, 255, 0, 0, 128]], usize::MAX);
        let mut g = gfx(2, 2);
        g.fill_screen(BLUE);
        g.draw_png(&mut SliceSource::new(&data), 0, 0, PngOptions::default()).unwrap();
        assert_eq!(g.panel().pixel(0, 0), Rgb888::new(128, 0, 127));
        assert_eq!(g.panel().pixel(1, 0), BLUE);
    }

    #[test]
    fn test_scale_repeats_pixels() {
        let data = png(2, 1, 8, 2, &[], &[&[0, 255, 0, 0, 0, 0, 255]], usize::MAX);
        let mut g = gfx(8, 4);
        g.draw_png(&mut SliceSource::new(&data), 0, 0, PngOptions { scale: 2.0, ..Default::default() }).unwrap();
        assert_eq!(g.panel().pixel(0, 0), RED);
        assert_eq!(g.panel().pixel(1, 1), RED);
        assert_eq!(g.panel().pixel(2, 0), BLUE);
        assert_eq!(g.panel().pixel(3, 1), BLUE);
        assert_eq!(g.panel().pixel(4, 0), BLACK);
        assert_eq!(g.panel().pixel(0, 2), BLACK);
    }

    #[test]
    fn test_offset_window_and_clip() {
        let data = png(4, 1, 8, 0, &[], &[&[0, 10, 20, 30, 40]], usize::MAX);
        let mut g = gfx(8, 2);
        let opts = PngOptions { off_x: 1, max_width: 2, ..Default::default() };
        g.draw_png(&mut SliceSource::new(&data), 0, 0, opts).unwrap();
        assert_eq!([0, 1, 2].map(|x| g.panel().pixel(x, 0)), [gray(20), gray(30), BLACK]);

        g.draw_png(&mut SliceSource::new(&data), -1, 1, PngOptions::default()).unwrap();
        assert_eq!([0, 1, 2, 3].map(|x| g.panel().pixel(x, 1)), [gray(20), gray(30), gray(40), BLACK]);
    }

    #[test]
    fn test_bad_images_fail_before_drawing() {
        let mut g = gfx(4, 4);
        let mut bad_crc = two_by_two(usize::MAX);
        bad_crc[16] ^= 1;
        assert_eq!(g.draw_png(&mut SliceSource::new(&bad_crc), 0, 0, PngOptions::default()), Err(GfxError::Corrupt));

        let mut interlaced = two_by_two(usize::MAX);
        interlaced[28] = 1;
        let crc = !crc32_update(!0, &interlaced[12..29]);
        interlaced[29..33].copy_from_slice(&crc.to_be_bytes());
        assert_eq!(
            g.draw_png(&mut SliceSource::new(&interlaced), 0, 0, PngOptions::default()),
            Err(GfxError::UnsupportedFormat)
        );

        let mut signature = two_by_two(usize::MAX);
        signature[1] = b'Q';
        assert_eq!(
            g.draw_png(&mut SliceSource::new(&signature), 0, 0, PngOptions::default()),
            Err(GfxError::InvalidHeader)
        );
        assert!(g.panel().ops().is_empty());
    }

    #[test]
    fn test_truncated_stream() {
        let data = two_by_two(usize::MAX);
        let mut g = gfx(4, 4);
        let cut = &data[..data.len() - 20];
        assert_eq!(g.draw_png(&mut SliceSource::new(cut), 0, 0, PngOptions::default()), Err(GfxError::Truncated));
        assert_eq!(g.write_depth(), 0);
    }

    #[test]
    fn test_shared_source_skips_transaction() {
        let data = two_by_two(usize::MAX);
        let mut g = gfx(4, 4);
        let mut src = SharedSource::new(&data);
        g.draw_png(&mut src, 0, 0, PngOptions::default()).unwrap();
        assert_eq!(g.panel().pixel(0, 0), RED);
        assert!(!g.panel().ops().contains(&PanelOp::Begin));
        assert_eq!(src.open, 0);
    }
}
