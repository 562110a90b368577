//! Pixel formats and raw color encoding.
//!
//! A [`PixelFormat`] fully determines how a raw sample maps to a 24-bit RGB
//! triple. Raw values are kept in the format's bit layout (`0xRRGGBB` for
//! 24-bit, `RRRRRGGGGGGBBBBB` for 16-bit and so on). Byte order only matters
//! when a raw value is read from or written to a byte slice.
//!
//! # Sub-byte depths
//!
//! 1/2/4-bit pixels are packed most significant bits first. A row always
//! starts on a byte boundary, so the byte width of a row is rounded up.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

// =============================================================================
// Depth / Layout / Byte Order
// =============================================================================

/// Bits per pixel of a format.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorDepth {
    Bits1,
    Bits2,
    Bits4,
    /// RGB332 when direct, 256 colors when indexed.
    Bits8,
    /// RGB565.
    Bits16,
    /// RGB666, transported as three bytes with the low two bits unused.
    Bits18,
    /// RGB888.
    Bits24,
    /// ARGB8888.
    Bits32,
}

impl ColorDepth {
    /// Significant bits of one sample.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits1 => 1,
            Self::Bits2 => 2,
            Self::Bits4 => 4,
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits18 => 18,
            Self::Bits24 => 24,
            Self::Bits32 => 32,
        }
    }

    /// Bits one sample occupies in memory.
    #[inline]
    pub const fn storage_bits(self) -> u32 {
        match self {
            Self::Bits18 => 24,
            other => other.bits(),
        }
    }

    /// Whole bytes per sample, `None` below 8 bits.
    #[inline]
    pub const fn bytes(self) -> Option<usize> {
        match self {
            Self::Bits1 | Self::Bits2 | Self::Bits4 => None,
            other => Some((other.storage_bits() / 8) as usize),
        }
    }

    /// Depth of an indexed image with `bits` per pixel.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            1 => Some(Self::Bits1),
            2 => Some(Self::Bits2),
            4 => Some(Self::Bits4),
            8 => Some(Self::Bits8),
            16 => Some(Self::Bits16),
            18 => Some(Self::Bits18),
            24 => Some(Self::Bits24),
            32 => Some(Self::Bits32),
            _ => None,
        }
    }
}

/// Channel order of a direct format.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelLayout {
    Rgb,
    Bgr,
}

/// Order of the bytes of a multi-byte sample.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    /// Wire order of serial panels.
    BigEndian,
    /// File formats (BMP).
    LittleEndian,
}

// =============================================================================
// Pixel Format
// =============================================================================

/// Descriptor mapping raw samples to 24-bit colors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelFormat {
    pub depth: ColorDepth,
    pub indexed: bool,
    pub layout: ChannelLayout,
    pub byte_order: ByteOrder,
}

impl PixelFormat {
    pub const RGB332: Self = Self::direct(ColorDepth::Bits8);
    pub const RGB565: Self = Self::direct(ColorDepth::Bits16);
    pub const RGB666: Self = Self::direct(ColorDepth::Bits18);
    pub const RGB888: Self = Self::direct(ColorDepth::Bits24);
    pub const ARGB8888: Self = Self::direct(ColorDepth::Bits32);
    pub const BGR888: Self = Self::direct(ColorDepth::Bits24).with_layout(ChannelLayout::Bgr);
    pub const RGB565_LE: Self = Self::direct(ColorDepth::Bits16).with_byte_order(ByteOrder::LittleEndian);

    /// Direct-color format, RGB order, big-endian.
    pub const fn direct(depth: ColorDepth) -> Self {
        Self { depth, indexed: false, layout: ChannelLayout::Rgb, byte_order: ByteOrder::BigEndian }
    }

    /// Palette-indexed format. Only 1/2/4/8 bits are meaningful.
    pub const fn indexed(depth: ColorDepth) -> Self {
        Self { depth, indexed: true, layout: ChannelLayout::Rgb, byte_order: ByteOrder::BigEndian }
    }

    pub const fn with_layout(
        mut self,
        layout: ChannelLayout,
    ) -> Self {
        self.layout = layout;
        self
    }

    pub const fn with_byte_order(
        mut self,
        byte_order: ByteOrder,
    ) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// True for depths below 8 bits, which have no direct-color meaning.
    #[inline]
    pub const fn is_sub_byte(&self) -> bool { self.depth.bytes().is_none() }

    /// True if samples carry a palette index (explicitly, or by being sub-byte).
    #[inline]
    pub const fn is_index(&self) -> bool { self.indexed || self.is_sub_byte() }

    /// Bytes of a row of `width` pixels, rounded up to a whole byte.
    #[inline]
    pub const fn row_bytes(
        &self,
        width: usize,
    ) -> usize {
        (width * self.depth.storage_bits() as usize).div_ceil(8)
    }

    /// Mask of the significant bits of a raw value.
    #[inline]
    pub const fn raw_mask(&self) -> u32 {
        match self.depth {
            ColorDepth::Bits32 => u32::MAX,
            ColorDepth::Bits18 => 0x00FC_FCFC,
            d => (1u32 << d.bits()) - 1,
        }
    }

    /// Reads the raw sample at pixel `index` of `row`. Out-of-range reads return 0.
    pub fn read_raw(
        &self,
        row: &[u8],
        index: usize,
    ) -> u32 {
        match self.depth.bytes() {
            None => {
                let bits = self.depth.bits() as usize;
                let bit = index * bits;
                let Some(&byte) = row.get(bit / 8) else { return 0 };
                let shift = 8 - bits - (bit % 8);
                u32::from(byte >> shift) & ((1 << bits) - 1)
            }
            Some(n) => {
                let start = index * n;
                let Some(bytes) = row.get(start..start + n) else { return 0 };
                match self.byte_order {
                    ByteOrder::BigEndian => bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
                    ByteOrder::LittleEndian => bytes.iter().rev().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
                }
            }
        }
    }

    /// Writes `raw` at pixel `index` of `row`. Out-of-range writes are dropped.
    pub fn write_raw(
        &self,
        row: &mut [u8],
        index: usize,
        raw: u32,
    ) {
        match self.depth.bytes() {
            None => {
                let bits = self.depth.bits() as usize;
                let bit = index * bits;
                let Some(byte) = row.get_mut(bit / 8) else { return };
                let shift = 8 - bits - (bit % 8);
                let mask = (((1u32 << bits) - 1) << shift) as u8;
                *byte = (*byte & !mask) | (((raw << shift) as u8) & mask);
            }
            Some(n) => {
                let start = index * n;
                let Some(bytes) = row.get_mut(start..start + n) else { return };
                for (i, b) in bytes.iter_mut().enumerate() {
                    let shift = match self.byte_order {
                        ByteOrder::BigEndian => (n - 1 - i) * 8,
                        ByteOrder::LittleEndian => i * 8,
                    };
                    *b = (raw >> shift) as u8;
                }
            }
        }
    }

    /// Encodes a color as a raw sample of this format.
    ///
    /// Indexed formats receive a gray index proportional to luminance.
    pub fn encode(
        &self,
        color: Rgb888,
    ) -> u32 {
        let (r, g, b) = match self.layout {
            ChannelLayout::Rgb => (color.r(), color.g(), color.b()),
            ChannelLayout::Bgr => (color.b(), color.g(), color.r()),
        };
        if self.is_index() {
            return quantize(luminance(r, g, b), self.depth.bits().min(8));
        }
        match self.depth {
            ColorDepth::Bits8 => (quantize(r, 3) << 5) | (quantize(g, 3) << 2) | quantize(b, 2),
            ColorDepth::Bits16 => (quantize(r, 5) << 11) | (quantize(g, 6) << 5) | quantize(b, 5),
            ColorDepth::Bits18 => (quantize(r, 6) << 18) | (quantize(g, 6) << 10) | (quantize(b, 6) << 2),
            ColorDepth::Bits24 => (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b),
            ColorDepth::Bits32 => 0xFF00_0000 | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b),
            ColorDepth::Bits1 | ColorDepth::Bits2 | ColorDepth::Bits4 => 0,
        }
    }

    /// Decodes a raw sample into a 24-bit color.
    ///
    /// Indexed samples look up `palette`; without one (or past its end) they
    /// expand to a gray level.
    pub fn decode(
        &self,
        raw: u32,
        palette: Option<&[Rgb888]>,
    ) -> Rgb888 {
        if self.is_index() {
            let bits = self.depth.bits().min(8);
            let index = raw & ((1 << bits) - 1);
            if let Some(c) = palette.and_then(|p| p.get(index as usize)) {
                return *c;
            }
            let v = expand(index, bits);
            return Rgb888::new(v, v, v);
        }
        let (r, g, b) = match self.depth {
            ColorDepth::Bits8 => (expand(raw >> 5, 3), expand(raw >> 2, 3), expand(raw, 2)),
            ColorDepth::Bits16 => (expand(raw >> 11, 5), expand(raw >> 5, 6), expand(raw, 5)),
            ColorDepth::Bits18 => (expand(raw >> 18, 6), expand(raw >> 10, 6), expand(raw >> 2, 6)),
            ColorDepth::Bits24 | ColorDepth::Bits32 => ((raw >> 16) as u8, (raw >> 8) as u8, raw as u8),
            ColorDepth::Bits1 | ColorDepth::Bits2 | ColorDepth::Bits4 => (0, 0, 0),
        };
        match self.layout {
            ChannelLayout::Rgb => Rgb888::new(r, g, b),
            ChannelLayout::Bgr => Rgb888::new(b, g, r),
        }
    }

    /// Alpha of a raw sample; opaque for every format but ARGB8888.
    #[inline]
    pub const fn alpha(
        &self,
        raw: u32,
    ) -> u8 {
        match self.depth {
            ColorDepth::Bits32 => (raw >> 24) as u8,
            _ => 0xFF,
        }
    }
}

// =============================================================================
// Channel Quantization
// =============================================================================

/// Rounds an 8-bit channel to `bits` bits.
#[inline]
pub const fn quantize(
    v: u8,
    bits: u32,
) -> u32 {
    let max = (1u32 << bits) - 1;
    (v as u32 * max + 127) / 255
}

/// Expands the low `bits` bits of `q` back to an 8-bit channel.
#[inline]
pub const fn expand(
    q: u32,
    bits: u32,
) -> u8 {
    let max = (1u32 << bits) - 1;
    (((q & max) * 255 + max / 2) / max) as u8
}

/// Integer luma (BT.601 weights, scaled by 256).
#[inline]
pub const fn luminance(
    r: u8,
    g: u8,
    b: u8,
) -> u8 {
    ((r as u32 * 77 + g as u32 * 150 + b as u32 * 29) >> 8) as u8
}

// =============================================================================
// Color
// =============================================================================

/// A 24-bit color together with its raw encoding in the active write format.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Color {
    pub rgb: Rgb888,
    pub raw: u32,
}

impl Color {
    pub fn new(
        rgb: Rgb888,
        format: PixelFormat,
    ) -> Self {
        Self { rgb, raw: format.encode(rgb) }
    }
}

/// Packs a color as `0xRRGGBB`.
#[inline]
pub fn to_u32(color: Rgb888) -> u32 { (u32::from(color.r()) << 16) | (u32::from(color.g()) << 8) | u32::from(color.b()) }

/// Unpacks `0xRRGGBB`.
#[inline]
pub const fn from_u32(rgb: u32) -> Rgb888 { Rgb888::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8) }

// =============================================================================
// Tests
// =============================================================================
