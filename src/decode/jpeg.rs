//! Baseline JPEG decoding.
//!
//! Huffman-coded baseline frames (SOF0, SOF1) with one component (gray) or
//! three (YCbCr) sampled 4:4:4, 4:2:2 or 4:2:0, with restart intervals.
//! Every table and one MCU of pixels live in a fixed workspace; each MCU is
//! converted, optionally box-scaled, and pushed through the blit path before
//! the next one is decoded.
//!
//! # Output Window
//!
//! Image pixel `(off_x, off_y)` lands on `(x, y)`. At most `max_width` x
//! `max_height` pixels are shown (0 means up to the surface edge). The clip
//! is narrowed to that window for the decode and restored afterwards,
//! whatever the outcome.

use crate::color::PixelFormat;
use crate::config::{JPEG_MAX_DIMENSION, JPEG_READ_CHUNK};
use crate::error::{GfxError, GfxResult};
use crate::gfx::Gfx;
use crate::panel::Panel;
use crate::pixelcopy::PixelCopy;

use super::{ByteSource, StreamReader};

const SOF0: u8 = 0xC0;
const SOF1: u8 = 0xC1;
const DHT: u8 = 0xC4;
const RST0: u8 = 0xD0;
const RST7: u8 = 0xD7;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const DQT: u8 = 0xDB;
const DRI: u8 = 0xDD;

/// Natural (row-major) index of each zigzag position.
const ZIGZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27, 20, 13, 6, 7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58, 59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47,
    55, 62, 63,
];

/// `IDCT_BASIS[x][u] = C(u) / 2 * cos((2x + 1) * u * pi / 16)`.
#[rustfmt::skip]
const IDCT_BASIS: [[f32; 8]; 8] = [
    [0.353553391, 0.490392640, 0.461939766, 0.415734806, 0.353553391, 0.277785117, 0.191341716, 0.097545161],
    [0.353553391, 0.415734806, 0.191341716, -0.097545161, -0.353553391, -0.490392640, -0.461939766, -0.277785117],
    [0.353553391, 0.277785117, -0.191341716, -0.490392640, -0.353553391, 0.097545161, 0.461939766, 0.415734806],
    [0.353553391, 0.097545161, -0.461939766, -0.277785117, 0.353553391, 0.415734806, -0.191341716, -0.490392640],
    [0.353553391, -0.097545161, -0.461939766, 0.277785117, 0.353553391, -0.415734806, -0.191341716, 0.490392640],
    [0.353553391, -0.277785117, -0.191341716, 0.490392640, -0.353553391, -0.097545161, 0.461939766, -0.415734806],
    [0.353553391, -0.415734806, 0.191341716, 0.097545161, -0.353553391, 0.490392640, -0.461939766, 0.277785117],
    [0.353553391, -0.490392640, 0.461939766, -0.415734806, 0.353553391, -0.277785117, 0.191341716, -0.097545161],
];

// =============================================================================
// Options
// =============================================================================

/// Output reduction applied while decoding.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JpegScale {
    #[default]
    Full,
    Half,
    Quarter,
    Eighth,
}

impl JpegScale {
    #[inline]
    const fn shift(self) -> u32 {
        match self {
            Self::Full => 0,
            Self::Half => 1,
            Self::Quarter => 2,
            Self::Eighth => 3,
        }
    }
}

/// Placement of a decoded JPEG.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct JpegOptions {
    /// Widest output in pixels; 0 for up to the surface edge.
    pub max_width: i32,
    /// Tallest output in pixels; 0 for up to the surface edge.
    pub max_height: i32,
    /// First image column shown (in output pixels).
    pub off_x: i32,
    /// First image row shown (in output pixels).
    pub off_y: i32,
    pub scale: JpegScale,
}

// =============================================================================
// Markers
// =============================================================================

type Reader<'s, S> = StreamReader<'s, S, JPEG_READ_CHUNK>;

impl<S: ByteSource + ?Sized> StreamReader<'_, S, JPEG_READ_CHUNK> {
    /// Reads a segment length and returns the payload size after it.
    fn segment(&mut self) -> GfxResult<usize> { (self.u16()? as usize).checked_sub(2).ok_or(GfxError::Corrupt) }

    /// Reads the next marker code, skipping fill bytes.
    fn marker(&mut self) -> GfxResult<u8> {
        if self.byte()? != 0xFF {
            return Err(GfxError::Corrupt);
        }
        let mut code = self.byte()?;
        while code == 0xFF {
            code = self.byte()?;
        }
        Ok(code)
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Canonical Huffman table in max-code form.
#[derive(Clone, Copy)]
struct Huffman {
    max_code: [i32; 17],
    min_code: [i32; 17],
    val_ptr: [u16; 17],
    symbols: [u8; 256],
    defined: bool,
}

impl Huffman {
    const EMPTY: Self = Self { max_code: [-1; 17], min_code: [0; 17], val_ptr: [0; 17], symbols: [0; 256], defined: false };

    fn build(
        counts: &[u8; 16],
        symbols: &[u8],
    ) -> GfxResult<Self> {
        let mut table = Self::EMPTY;
        let mut code = 0i32;
        let mut k = 0usize;
        for len in 1..=16 {
            let n = counts[len - 1] as usize;
            if n > 0 {
                table.val_ptr[len] = k as u16;
                table.min_code[len] = code;
                code += n as i32;
                k += n;
                if code > 1 << len {
                    return Err(GfxError::Corrupt);
                }
                table.max_code[len] = code - 1;
            }
            code <<= 1;
        }
        table.symbols[..symbols.len()].copy_from_slice(symbols);
        table.defined = true;
        Ok(table)
    }
}

struct Tables {
    /// Quantizers in zigzag order.
    quant: [[u16; 64]; 4],
    dc: [Huffman; 4],
    ac: [Huffman; 4],
}

#[derive(Clone, Copy, Default)]
struct Component {
    id: u8,
    h: usize,
    v: usize,
    tq: usize,
    dc: usize,
    ac: usize,
    pred: i32,
}

// =============================================================================
// Entropy Decoding
// =============================================================================

/// MSB-first bit reader over entropy-coded data.
///
/// Stuffed `FF 00` pairs read as `FF`. Any other marker stops the stream:
/// it is latched in `marker` and zero bits are returned from then on.
#[derive(Default)]
struct BitReader {
    acc: u32,
    count: u32,
    marker: Option<u8>,
}

impl BitReader {
    fn reset(&mut self) {
        self.acc = 0;
        self.count = 0;
    }

    fn next_byte<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
    ) -> GfxResult<u32> {
        if self.marker.is_some() {
            return Ok(0);
        }
        let b = r.byte()?;
        if b != 0xFF {
            return Ok(u32::from(b));
        }
        let mut code = r.byte()?;
        while code == 0xFF {
            code = r.byte()?;
        }
        if code == 0 {
            return Ok(0xFF);
        }
        self.marker = Some(code);
        Ok(0)
    }

    fn bits<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
        n: u32,
    ) -> GfxResult<u32> {
        while self.count < n {
            self.acc = (self.acc << 8) | self.next_byte(r)?;
            self.count += 8;
        }
        self.count -= n;
        Ok((self.acc >> self.count) & ((1 << n) - 1))
    }

    /// Reads an `s`-bit magnitude and sign-extends it.
    fn receive_extend<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
        s: u32,
    ) -> GfxResult<i32> {
        if s == 0 {
            return Ok(0);
        }
        let v = self.bits(r, s)? as i32;
        Ok(if v < 1 << (s - 1) { v - (1 << s) + 1 } else { v })
    }

    fn decode<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
        table: &Huffman,
    ) -> GfxResult<u8> {
        let mut code = 0i32;
        for len in 1..=16 {
            code = (code << 1) | self.bits(r, 1)? as i32;
            if code <= table.max_code[len] {
                let idx = i32::from(table.val_ptr[len]) + code - table.min_code[len];
                return usize::try_from(idx)
                    .ok()
                    .and_then(|i| table.symbols.get(i).copied())
                    .ok_or(GfxError::Corrupt);
            }
        }
        Err(GfxError::Corrupt)
    }
}

// =============================================================================
// Pixel Stages
// =============================================================================

fn idct(
    coef: &[f32; 64],
    out: &mut [u8; 64],
) {
    let mut tmp = [0f32; 64];
    for v in 0..8 {
        for x in 0..8 {
            let mut s = 0.0;
            for u in 0..8 {
                s += IDCT_BASIS[x][u] * coef[v * 8 + u];
            }
            tmp[v * 8 + x] = s;
        }
    }
    for y in 0..8 {
        for x in 0..8 {
            let mut s = 0.0;
            for v in 0..8 {
                s += IDCT_BASIS[y][v] * tmp[v * 8 + x];
            }
            out[y * 8 + x] = level(s);
        }
    }
}

#[inline]
fn level(sample: f32) -> u8 { libm::roundf(sample + 128.0).clamp(0.0, 255.0) as u8 }

/// JFIF YCbCr to RGB in 16.16 fixed point.
#[inline]
fn ycc_to_rgb(
    y: u8,
    cb: u8,
    cr: u8,
) -> [u8; 3] {
    let (y, cb, cr) = (i32::from(y), i32::from(cb) - 128, i32::from(cr) - 128);
    let r = y + ((91_881 * cr + 32_768) >> 16);
    let g = y + ((-22_554 * cb - 46_802 * cr + 32_768) >> 16);
    let b = y + ((116_130 * cb + 32_768) >> 16);
    [r.clamp(0, 255) as u8, g.clamp(0, 255) as u8, b.clamp(0, 255) as u8]
}

/// Box-averages a `w` x `h` RGB888 tile by `1 << shift` in place.
///
/// Each output pixel is written at an index no greater than the first source
/// pixel of its own box, so no source is overwritten before it is read.
fn downscale(
    rgb: &mut [u8],
    w: usize,
    h: usize,
    shift: u32,
) -> (usize, usize) {
    if shift == 0 {
        return (w, h);
    }
    let f = 1usize << shift;
    let (ow, oh) = (w >> shift, h >> shift);
    let n = (f * f) as u32;
    for oy in 0..oh {
        for ox in 0..ow {
            for c in 0..3 {
                let mut sum = 0u32;
                for dy in 0..f {
                    let row = (oy * f + dy) * w + ox * f;
                    for dx in 0..f {
                        sum += u32::from(rgb[(row + dx) * 3 + c]);
                    }
                }
                rgb[(oy * ow + ox) * 3 + c] = ((sum + n / 2) / n) as u8;
            }
        }
    }
    (ow, oh)
}

/// One MCU of samples; at most 2x2 luma blocks.
struct Workspace {
    luma: [u8; 256],
    cb: [u8; 64],
    cr: [u8; 64],
    rgb: [u8; 16 * 16 * 3],
}

// =============================================================================
// Decoder
// =============================================================================

struct Decoder {
    tables: Tables,
    comps: [Component; 3],
    ncomp: usize,
    width: u16,
    height: u16,
    restart_interval: u16,
    has_frame: bool,
    bits: BitReader,
}

impl Decoder {
    fn new() -> Self {
        Self {
            tables: Tables { quant: [[1; 64]; 4], dc: [Huffman::EMPTY; 4], ac: [Huffman::EMPTY; 4] },
            comps: [Component::default(); 3],
            ncomp: 0,
            width: 0,
            height: 0,
            restart_interval: 0,
            has_frame: false,
            bits: BitReader::default(),
        }
    }

    /// Parses everything up to and including the start-of-scan header.
    fn read_headers<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
    ) -> GfxResult {
        if r.byte()? != 0xFF || r.byte()? != SOI {
            return Err(GfxError::InvalidHeader);
        }
        loop {
            match r.marker()? {
                SOF0 | SOF1 => self.read_frame(r)?,
                code @ (0xC2 | 0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) => {
                    log_warn!("jpeg: frame type {:#x} not supported", code);
                    return Err(GfxError::UnsupportedFormat);
                }
                DHT => self.read_huffman(r)?,
                DQT => self.read_quant(r)?,
                DRI => {
                    if r.segment()? != 2 {
                        return Err(GfxError::Corrupt);
                    }
                    self.restart_interval = r.u16()?;
                }
                SOS => return self.read_scan(r),
                EOI => return Err(GfxError::InvalidHeader),
                _ => {
                    let len = r.segment()?;
                    r.skip(len)?;
                }
            }
        }
    }

    fn read_frame<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
    ) -> GfxResult {
        let len = r.segment()?;
        let precision = r.byte()?;
        self.height = r.u16()?;
        self.width = r.u16()?;
        let n = r.byte()? as usize;
        if len != 6 + 3 * n {
            return Err(GfxError::Corrupt);
        }
        if precision != 8
            || self.width == 0
            || self.height == 0
            || self.width > JPEG_MAX_DIMENSION
            || self.height > JPEG_MAX_DIMENSION
            || (n != 1 && n != 3)
        {
            return Err(GfxError::UnsupportedFormat);
        }
        for comp in self.comps.iter_mut().take(n) {
            comp.id = r.byte()?;
            let hv = r.byte()?;
            comp.tq = r.byte()? as usize;
            if comp.tq > 3 {
                return Err(GfxError::Corrupt);
            }
            (comp.h, comp.v) = if n == 1 { (1, 1) } else { ((hv >> 4) as usize, (hv & 15) as usize) };
        }
        if n == 3 {
            let [y, cb, cr] = self.comps;
            let luma_ok = (1..=2).contains(&y.h) && (1..=2).contains(&y.v);
            let chroma_ok = (cb.h, cb.v, cr.h, cr.v) == (1, 1, 1, 1);
            if !luma_ok || !chroma_ok {
                return Err(GfxError::UnsupportedFormat);
            }
        }
        self.ncomp = n;
        self.has_frame = true;
        Ok(())
    }

    fn read_quant<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
    ) -> GfxResult {
        let mut len = r.segment()?;
        while len > 0 {
            let pq_tq = r.byte()?;
            let (wide, id) = (pq_tq >> 4, (pq_tq & 15) as usize);
            if wide > 1 || id > 3 {
                return Err(GfxError::Corrupt);
            }
            for q in self.tables.quant[id].iter_mut() {
                *q = if wide == 0 { u16::from(r.byte()?) } else { r.u16()? };
            }
            len = len.checked_sub(1 + 64 * (wide as usize + 1)).ok_or(GfxError::Corrupt)?;
        }
        Ok(())
    }

    fn read_huffman<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
    ) -> GfxResult {
        let mut len = r.segment()?;
        while len > 0 {
            let tc_th = r.byte()?;
            let (class, id) = (tc_th >> 4, (tc_th & 15) as usize);
            if class > 1 || id > 3 {
                return Err(GfxError::Corrupt);
            }
            let mut counts = [0u8; 16];
            for c in counts.iter_mut() {
                *c = r.byte()?;
            }
            let total: usize = counts.iter().map(|&c| c as usize).sum();
            if total > 256 {
                return Err(GfxError::Corrupt);
            }
            let mut symbols = [0u8; 256];
            for s in symbols[..total].iter_mut() {
                *s = r.byte()?;
            }
            let table = Huffman::build(&counts, &symbols[..total])?;
            if class == 0 {
                self.tables.dc[id] = table;
            } else {
                self.tables.ac[id] = table;
            }
            len = len.checked_sub(17 + total).ok_or(GfxError::Corrupt)?;
        }
        Ok(())
    }

    fn read_scan<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
    ) -> GfxResult {
        if !self.has_frame {
            return Err(GfxError::InvalidHeader);
        }
        let len = r.segment()?;
        let n = r.byte()? as usize;
        if n != self.ncomp || len != 4 + 2 * n {
            return Err(GfxError::UnsupportedFormat);
        }
        for _ in 0..n {
            let id = r.byte()?;
            let tables = r.byte()?;
            let comp = self.comps[..n].iter_mut().find(|c| c.id == id).ok_or(GfxError::Corrupt)?;
            comp.dc = (tables >> 4) as usize;
            comp.ac = (tables & 15) as usize;
            if comp.dc > 3 || comp.ac > 3 || !self.tables.dc[comp.dc].defined || !self.tables.ac[comp.ac].defined {
                return Err(GfxError::Corrupt);
            }
        }
        // Spectral selection and successive approximation are fixed for baseline.
        r.skip(3)
    }

    /// Consumes the restart marker that ends an interval.
    fn restart<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
    ) -> GfxResult {
        self.bits.reset();
        let code = match self.bits.marker.take() {
            Some(code) => code,
            None => loop {
                if r.byte()? != 0xFF {
                    continue;
                }
                let mut code = r.byte()?;
                while code == 0xFF {
                    code = r.byte()?;
                }
                if code != 0 {
                    break code;
                }
            },
        };
        if !(RST0..=RST7).contains(&code) {
            return Err(GfxError::Corrupt);
        }
        for comp in self.comps.iter_mut() {
            comp.pred = 0;
        }
        Ok(())
    }

    fn decode_block<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
        ci: usize,
        out: &mut [u8; 64],
    ) -> GfxResult {
        let comp = &mut self.comps[ci];
        let q = &self.tables.quant[comp.tq];
        let mut coef = [0f32; 64];

        let s = self.bits.decode(r, &self.tables.dc[comp.dc])?;
        if s > 15 {
            return Err(GfxError::Corrupt);
        }
        comp.pred = comp.pred.wrapping_add(self.bits.receive_extend(r, u32::from(s))?);
        coef[0] = comp.pred as f32 * f32::from(q[0]);

        let mut has_ac = false;
        let mut k = 1usize;
        while k < 64 {
            let rs = self.bits.decode(r, &self.tables.ac[comp.ac])?;
            let (run, size) = ((rs >> 4) as usize, u32::from(rs & 15));
            if size == 0 {
                if run != 15 {
                    break;
                }
                k += 16;
                continue;
            }
            k += run;
            if k > 63 {
                return Err(GfxError::Corrupt);
            }
            let v = self.bits.receive_extend(r, size)?;
            coef[ZIGZAG[k] as usize] = v as f32 * f32::from(q[k]);
            has_ac = true;
            k += 1;
        }

        if has_ac {
            idct(&coef, out);
        } else {
            out.fill(level(coef[0] / 8.0));
        }
        Ok(())
    }

    /// Decodes one MCU into `ws.rgb`; returns its size in pixels.
    fn decode_mcu<S: ByteSource + ?Sized>(
        &mut self,
        r: &mut Reader<'_, S>,
        ws: &mut Workspace,
    ) -> GfxResult<(usize, usize)> {
        let (hs, vs) = (self.comps[0].h, self.comps[0].v);
        let (mcu_w, mcu_h) = (8 * hs, 8 * vs);
        let mut block = [0u8; 64];

        for by in 0..vs {
            for bx in 0..hs {
                self.decode_block(r, 0, &mut block)?;
                for (row, src) in block.chunks_exact(8).enumerate() {
                    let at = (by * 8 + row) * mcu_w + bx * 8;
                    ws.luma[at..at + 8].copy_from_slice(src);
                }
            }
        }
        if self.ncomp == 3 {
            self.decode_block(r, 1, &mut ws.cb)?;
            self.decode_block(r, 2, &mut ws.cr)?;
        }

        for py in 0..mcu_h {
            for px in 0..mcu_w {
                let i = py * mcu_w + px;
                let luma = ws.luma[i];
                let rgb = if self.ncomp == 1 {
                    [luma; 3]
                } else {
                    let ci = (py >> (vs - 1)) * 8 + (px >> (hs - 1));
                    ycc_to_rgb(luma, ws.cb[ci], ws.cr[ci])
                };
                ws.rgb[i * 3..i * 3 + 3].copy_from_slice(&rgb);
            }
        }
        Ok((mcu_w, mcu_h))
    }

    /// Decodes the scan, pushing every MCU with image origin at `(ox, oy)`.
    fn decode_scan<P: Panel, S: ByteSource + ?Sized>(
        &mut self,
        gfx: &mut Gfx<P>,
        r: &mut Reader<'_, S>,
        ox: i32,
        oy: i32,
        shift: u32,
    ) -> GfxResult {
        let (mcu_w, mcu_h) = (8 * self.comps[0].h, 8 * self.comps[0].v);
        let (width, height) = (usize::from(self.width), usize::from(self.height));
        let (cols, rows) = (width.div_ceil(mcu_w), height.div_ceil(mcu_h));
        let round = (1usize << shift) - 1;
        let (out_w, out_h) = ((width + round) >> shift, (height + round) >> shift);
        let dst = gfx.write_format();

        let mut ws = Workspace { luma: [0; 256], cb: [128; 64], cr: [128; 64], rgb: [0; 16 * 16 * 3] };
        let mut left = self.restart_interval;
        for my in 0..rows {
            for mx in 0..cols {
                if self.restart_interval != 0 {
                    if left == 0 {
                        self.restart(r)?;
                        left = self.restart_interval;
                    }
                    left -= 1;
                }
                let (w, h) = self.decode_mcu(r, &mut ws)?;
                let (bw, bh) = downscale(&mut ws.rgb, w, h, shift);
                let (bx, by) = ((mx * mcu_w) >> shift, (my * mcu_h) >> shift);
                let mut pc = PixelCopy::new(&ws.rgb, bw as u32, bh as u32, PixelFormat::RGB888, dst);
                gfx.push_image(
                    ox + bx as i32,
                    oy + by as i32,
                    bw.min(out_w - bx) as i32,
                    bh.min(out_h - by) as i32,
                    &mut pc,
                );
            }
        }
        Ok(())
    }
}

// =============================================================================
// Drawing
// =============================================================================

impl<P: Panel> Gfx<P> {
    /// Decodes a baseline JPEG from `src` and draws it at `(x, y)`.
    ///
    /// Fails before any pixel is written if the headers are malformed or
    /// describe something other than a baseline Huffman frame.
    pub fn draw_jpg<S: ByteSource + ?Sized>(
        &mut self,
        src: &mut S,
        x: i32,
        y: i32,
        opts: JpegOptions,
    ) -> GfxResult {
        let mut reader = Reader::new(src);
        let mut dec = Decoder::new();
        dec.read_headers(&mut reader)?;
        log_debug!("jpeg: {}x{}, {} components", dec.width, dec.height, dec.ncomp);

        let (origin_x, origin_y) = (x - opts.off_x, y - opts.off_y);
        let c = self.clip;
        let (mut x, mut y) = (x, y);
        let mut w = if opts.max_width > 0 { opts.max_width } else { self.width };
        let mut h = if opts.max_height > 0 { opts.max_height } else { self.height };
        if x < c.left {
            w -= c.left - x;
            x = c.left;
        }
        if y < c.top {
            h -= c.top - y;
            y = c.top;
        }
        w = w.min(c.right + 1 - x);
        h = h.min(c.bottom + 1 - y);
        if w <= 0 || h <= 0 {
            return Ok(());
        }

        let saved = self.clip;
        self.set_clip_rect(x, y, w, h);
        self.start_write_with(!reader.src.has_parent());
        let result = dec.decode_scan(self, &mut reader, origin_x, origin_y, opts.scale.shift());
        self.end_write();
        self.clip = saved;
        result
    }
}

// =============================================================================
// Tests
// =============================================================================
