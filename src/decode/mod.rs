//! Streaming image decoders.
//!
//! Decoders pull bytes from a [`ByteSource`] and push decoded rows (BMP,
//! PNG) or blocks (JPEG) straight into the blit path. No decoder buffers a
//! whole frame: the largest allocation is a few rows of the image width,
//! plus the inflate window for PNG.
//!
//! # Bus Sharing
//!
//! A source that lives on the same bus as the panel (an SD card next to a
//! display, say) reports [`ByteSource::has_parent`]. The decoder then opens
//! its write batch without a transport transaction and brackets every read
//! with [`ByteSource::pre_read`] / [`ByteSource::post_read`], so the owner
//! can switch the bus between the two devices.

mod bmp;
mod jpeg;
mod png;

pub use self::jpeg::{JpegOptions, JpegScale};
pub use self::png::PngOptions;

use crate::error::{GfxError, GfxResult};

// =============================================================================
// Byte Sources
// =============================================================================

/// A readable, seekable stream of encoded image bytes.
pub trait ByteSource {
    /// Reads up to `buf.len()` bytes; returns how many were read (0 at the end).
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> usize;

    /// Skips `len` bytes; returns how many were skipped.
    fn skip(
        &mut self,
        len: usize,
    ) -> usize;

    /// Moves to absolute offset `offset`. Returns false if it is past the end.
    fn seek(
        &mut self,
        offset: usize,
    ) -> bool;

    /// Called before a read burst.
    fn pre_read(&mut self) {}

    /// Called after a read burst.
    fn post_read(&mut self) {}

    /// True if the source shares the panel's transport.
    fn has_parent(&self) -> bool { false }

    /// Fills `buf` completely or fails with [`GfxError::Truncated`].
    fn read_exact(
        &mut self,
        buf: &mut [u8],
    ) -> GfxResult {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..]);
            if n == 0 {
                return Err(GfxError::Truncated);
            }
            filled += n;
        }
        Ok(())
    }
}

/// In-memory byte source.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub const fn new(data: &'a [u8]) -> Self { Self { data, pos: 0 } }

    #[inline]
    pub const fn position(&self) -> usize { self.pos }
}

impl ByteSource for SliceSource<'_> {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> usize {
        let rest = self.data.get(self.pos..).unwrap_or(&[]);
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        n
    }

    fn skip(
        &mut self,
        len: usize,
    ) -> usize {
        let n = len.min(self.data.len().saturating_sub(self.pos));
        self.pos += n;
        n
    }

    fn seek(
        &mut self,
        offset: usize,
    ) -> bool {
        if offset > self.data.len() {
            return false;
        }
        self.pos = offset;
        true
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Reads one burst, bracketed by `pre_read` / `post_read`.
pub(crate) fn read_burst<S: ByteSource + ?Sized>(
    src: &mut S,
    buf: &mut [u8],
) -> usize {
    src.pre_read();
    let n = src.read(buf);
    src.post_read();
    n
}

/// Buffered big-endian reader; every refill is one bracketed read burst.
pub(crate) struct StreamReader<'s, S: ByteSource + ?Sized, const N: usize> {
    pub(crate) src: &'s mut S,
    buf: [u8; N],
    pos: usize,
    len: usize,
}

impl<'s, S: ByteSource + ?Sized, const N: usize> StreamReader<'s, S, N> {
    pub(crate) fn new(src: &'s mut S) -> Self { Self { src, buf: [0; N], pos: 0, len: 0 } }

    fn refill(&mut self) -> GfxResult {
        self.len = read_burst(&mut *self.src, &mut self.buf);
        self.pos = 0;
        if self.len == 0 {
            return Err(GfxError::Truncated);
        }
        Ok(())
    }

    pub(crate) fn byte(&mut self) -> GfxResult<u8> {
        if self.pos == self.len {
            self.refill()?;
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn u16(&mut self) -> GfxResult<u16> {
        let mut raw = [0u8; 2];
        self.read_into(&mut raw)?;
        Ok(u16::from_be_bytes(raw))
    }

    pub(crate) fn u32(&mut self) -> GfxResult<u32> {
        let mut raw = [0u8; 4];
        self.read_into(&mut raw)?;
        Ok(u32::from_be_bytes(raw))
    }

    /// Fills `out` completely.
    pub(crate) fn read_into(
        &mut self,
        out: &mut [u8],
    ) -> GfxResult {
        let mut filled = 0;
        while filled < out.len() {
            let chunk = self.take(out.len() - filled)?;
            out[filled..filled + chunk.len()].copy_from_slice(chunk);
            filled += chunk.len();
        }
        Ok(())
    }

    /// Borrows up to `max` buffered bytes, refilling once if the buffer is empty.
    pub(crate) fn take(
        &mut self,
        max: usize,
    ) -> GfxResult<&[u8]> {
        if self.pos == self.len {
            self.refill()?;
        }
        let start = self.pos;
        self.pos += (self.len - start).min(max);
        Ok(&self.buf[start..self.pos])
    }

    pub(crate) fn skip(
        &mut self,
        mut n: usize,
    ) -> GfxResult {
        let buffered = (self.len - self.pos).min(n);
        self.pos += buffered;
        n -= buffered;
        if n > 0 {
            self.src.pre_read();
            let skipped = self.src.skip(n);
            self.src.post_read();
            if skipped < n {
                return Err(GfxError::Truncated);
            }
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn le_u16(
    bytes: &[u8],
    at: usize,
) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
pub(crate) fn le_u32(
    bytes: &[u8],
    at: usize,
) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
pub(crate) fn be_u32(
    bytes: &[u8],
    at: usize,
) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_read_skip_seek() {
        let data = [1u8, 2, 3, 4, 5];
        let mut src = SliceSource::new(&data);
        let mut buf = [0u8; 2];
        assert_eq!(src.read(&mut buf), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(src.skip(10), 3);
        assert_eq!(src.read(&mut buf), 0);
        assert!(src.seek(4));
        assert!(!src.seek(6));
        assert_eq!(src.position(), 4);
        assert_eq!(src.read(&mut buf), 1);
    }

    #[test]
    fn test_stream_reader_spans_refills() {
        let data = [0x12u8, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE];
        let mut src = SliceSource::new(&data);
        let mut r = StreamReader::<_, 3>::new(&mut src);
        assert_eq!(r.u16().unwrap(), 0x1234);
        assert_eq!(r.u32().unwrap(), 0x5678_9ABC);
        assert_eq!(r.take(8).unwrap(), &[0xDE]);
        assert_eq!(r.byte(), Err(GfxError::Truncated));
    }

    #[test]
    fn test_read_exact_reports_truncation() {
        let mut src = SliceSource::new(&[9, 9, 9]);
        let mut buf = [0u8; 4];
        assert_eq!(src.read_exact(&mut buf), Err(GfxError::Truncated));
    }
}
