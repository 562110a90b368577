//! Byte-at-a-time UTF-8 decoding.
//!
//! Only the Basic Multilingual Plane is decoded. A 4-byte lead byte (or a
//! stray continuation byte) comes back as the raw byte, so Latin-1 text
//! still prints something sensible.

/// Three-state decoder: idle, one continuation byte left, two left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Utf8Decoder {
    pending: u8,
    buffer: u16,
}

impl Utf8Decoder {
    pub const fn new() -> Self { Self { pending: 0, buffer: 0 } }

    pub fn reset(&mut self) { *self = Self::new(); }

    /// Feeds one byte. Returns 0 while a sequence is incomplete, otherwise
    /// the decoded code point (or the raw byte when it cannot start one).
    pub fn decode(
        &mut self,
        byte: u8,
    ) -> u16 {
        if byte & 0x80 == 0 {
            self.reset();
            return u16::from(byte);
        }

        match self.pending {
            0 => {
                if byte & 0xE0 == 0xC0 {
                    self.buffer = u16::from(byte & 0x1F) << 6;
                    self.pending = 1;
                    return 0;
                }
                if byte & 0xF0 == 0xE0 {
                    self.buffer = u16::from(byte & 0x0F) << 12;
                    self.pending = 2;
                    return 0;
                }
                u16::from(byte)
            }
            2 => {
                self.buffer |= u16::from(byte & 0x3F) << 6;
                self.pending = 1;
                0
            }
            _ => {
                self.buffer |= u16::from(byte & 0x3F);
                self.pending = 0;
                self.buffer
            }
        }
    }

    /// True between the lead byte and the last continuation byte.
    #[inline]
    pub const fn is_pending(&self) -> bool { self.pending != 0 }
}

/// Iterates over the printable code points of `bytes` with their byte offsets.
///
/// With `utf8` false every byte is its own code point and is passed on as
/// is, control codes included. With `utf8` true, control codes and the
/// bytes of incomplete sequences are skipped, as the cursor printer does.
pub(crate) fn code_points(
    bytes: &[u8],
    utf8: bool,
) -> impl Iterator<Item = (usize, u16)> + '_ {
    let mut decoder = Utf8Decoder::new();
    bytes.iter().enumerate().filter_map(move |(i, &b)| {
        if !utf8 {
            return Some((i, u16::from(b)));
        }
        let code = decoder.decode(b);
        (code >= 0x20).then_some((i, code))
    })
}
