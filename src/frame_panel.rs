//! In-memory panel.
//!
//! [`FramePanel`] keeps the whole surface in a byte buffer laid out exactly
//! like the wire format. It serves as an off-screen canvas, as the back end
//! of the desktop simulator, and as the panel every test draws on. It can
//! optionally log each transport call as a [`PanelOp`].

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;

use crate::color::PixelFormat;
use crate::error::{GfxError, GfxResult};
use crate::panel::Panel;

/// One transport call seen by a recording [`FramePanel`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PanelOp {
    Begin,
    End,
    Fill { x: i32, y: i32, w: i32, h: i32, raw: u32 },
    Pixels { x: i32, y: i32, w: i32, h: i32 },
    Read { x: i32, y: i32, w: i32, h: i32 },
    Copy { dst_x: i32, dst_y: i32, w: i32, h: i32, src_x: i32, src_y: i32 },
}

impl PanelOp {
    /// True for calls that change pixels.
    #[inline]
    pub const fn is_write(&self) -> bool { matches!(self, Self::Fill { .. } | Self::Pixels { .. } | Self::Copy { .. }) }
}

/// Framebuffer-backed [`Panel`].
pub struct FramePanel {
    width: i32,
    height: i32,
    format: PixelFormat,
    row_bytes: usize,
    buf: Vec<u8>,
    raw_color: u32,
    recording: bool,
    ops: Vec<PanelOp>,
    dma: bool,
    dma_waits: u32,
    open: u32,
}

impl FramePanel {
    /// Allocates a zeroed `width` x `height` surface in `format`.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> GfxResult<Self> {
        let row_bytes = format.row_bytes(width as usize);
        let len = row_bytes * height as usize;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| GfxError::OutOfMemory)?;
        buf.resize(len, 0);
        Ok(Self {
            width: width as i32,
            height: height as i32,
            format,
            row_bytes,
            buf,
            raw_color: 0,
            recording: false,
            ops: Vec::new(),
            dma: false,
            dma_waits: 0,
            open: 0,
        })
    }

    /// Starts logging transport calls.
    pub fn with_recording(mut self) -> Self {
        self.recording = true;
        self
    }

    /// Advertises DMA capability, exercising the double-buffered blit path.
    pub fn with_dma(mut self) -> Self {
        self.dma = true;
        self
    }

    #[inline]
    pub const fn format(&self) -> PixelFormat { self.format }

    /// Raw framebuffer bytes, rows packed back to back.
    #[inline]
    pub fn data(&self) -> &[u8] { &self.buf }

    #[inline]
    pub fn ops(&self) -> &[PanelOp] { &self.ops }

    pub fn clear_ops(&mut self) { self.ops.clear(); }

    /// Number of logged calls that changed pixels.
    pub fn write_count(&self) -> usize { self.ops.iter().filter(|op| op.is_write()).count() }

    /// Times the engine waited for a DMA transfer.
    #[inline]
    pub const fn dma_waits(&self) -> u32 { self.dma_waits }

    /// Transactions currently open at the transport.
    #[inline]
    pub const fn open_transactions(&self) -> u32 { self.open }

    fn record(
        &mut self,
        op: PanelOp,
    ) {
        if self.recording {
            self.ops.push(op);
        }
    }

    #[inline]
    fn in_bounds(
        &self,
        x: i32,
        y: i32,
    ) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn row(
        &self,
        y: i32,
    ) -> &[u8] {
        let start = y as usize * self.row_bytes;
        self.buf.get(start..start + self.row_bytes).unwrap_or(&[])
    }

    fn row_mut(
        &mut self,
        y: i32,
    ) -> &mut [u8] {
        let start = y as usize * self.row_bytes;
        self.buf.get_mut(start..start + self.row_bytes).unwrap_or(&mut [])
    }

    /// Raw value at `(x, y)`, 0 outside the surface.
    pub fn raw_pixel(
        &self,
        x: i32,
        y: i32,
    ) -> u32 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        self.format.read_raw(self.row(y), x as usize)
    }

    /// Color at `(x, y)` decoded from the stored raw value.
    pub fn pixel(
        &self,
        x: i32,
        y: i32,
    ) -> Rgb888 {
        self.format.decode(self.raw_pixel(x, y), None)
    }

    /// Stores a raw value directly, bypassing the operation log.
    pub fn set_raw_pixel(
        &mut self,
        x: i32,
        y: i32,
        raw: u32,
    ) {
        if self.in_bounds(x, y) {
            let format = self.format;
            format.write_raw(self.row_mut(y), x as usize, raw);
        }
    }

    /// Stores a color directly, bypassing the operation log.
    pub fn set_pixel(
        &mut self,
        x: i32,
        y: i32,
        color: Rgb888,
    ) {
        self.set_raw_pixel(x, y, self.format.encode(color));
    }
}

impl Panel for FramePanel {
    fn width(&self) -> u32 { self.width as u32 }

    fn height(&self) -> u32 { self.height as u32 }

    fn write_format(&self) -> PixelFormat { self.format }

    fn begin_transaction(&mut self) {
        self.open += 1;
        self.record(PanelOp::Begin);
    }

    fn end_transaction(&mut self) {
        self.open = self.open.saturating_sub(1);
        self.record(PanelOp::End);
    }

    fn set_raw_color(
        &mut self,
        raw: u32,
    ) {
        self.raw_color = raw;
    }

    fn write_fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) {
        self.record(PanelOp::Fill { x, y, w, h, raw: self.raw_color });
        let raw = self.raw_color;
        for py in y..y + h {
            for px in x..x + w {
                self.set_raw_pixel(px, py, raw);
            }
        }
    }

    fn write_pixels(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &[u8],
    ) {
        self.record(PanelOp::Pixels { x, y, w, h });
        let src_row_bytes = self.format.row_bytes(w.max(0) as usize);
        for row in 0..h {
            let start = row as usize * src_row_bytes;
            let Some(src) = data.get(start..start + src_row_bytes) else { return };
            for i in 0..w {
                let raw = self.format.read_raw(src, i as usize);
                self.set_raw_pixel(x + i, y + row, raw);
            }
        }
    }

    fn read_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        data: &mut [u8],
    ) {
        self.record(PanelOp::Read { x, y, w, h });
        let dst_row_bytes = self.format.row_bytes(w.max(0) as usize);
        for row in 0..h {
            let start = row as usize * dst_row_bytes;
            for i in 0..w {
                let raw = self.raw_pixel(x + i, y + row);
                if let Some(dst) = data.get_mut(start..start + dst_row_bytes) {
                    self.format.write_raw(dst, i as usize, raw);
                }
            }
        }
    }

    fn copy_rect(
        &mut self,
        dst_x: i32,
        dst_y: i32,
        w: i32,
        h: i32,
        src_x: i32,
        src_y: i32,
    ) {
        self.record(PanelOp::Copy { dst_x, dst_y, w, h, src_x, src_y });
        // Walk away from the overlap so no source pixel is overwritten before it is read.
        let rows_down = dst_y > src_y;
        let cols_right = dst_x > src_x;
        for r in 0..h {
            let r = if rows_down { h - 1 - r } else { r };
            for c in 0..w {
                let c = if cols_right { w - 1 - c } else { c };
                let raw = self.raw_pixel(src_x + c, src_y + r);
                self.set_raw_pixel(dst_x + c, dst_y + r, raw);
            }
        }
    }

    fn supports_dma(&self) -> bool { self.dma }

    fn wait_dma(&mut self) { self.dma_waits += 1; }
}
