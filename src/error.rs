//! Errors reported by fallible engine calls.
//!
//! Only decoders, font loading, flood fill and QR encoding can fail. Rasterization clamps
//! its inputs instead of rejecting them.

use core::fmt;

/// Failure of a single engine call. The engine stays usable afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GfxError {
    /// A scratch buffer could not be allocated.
    OutOfMemory,
    /// Signature or header fields are not valid for the format.
    InvalidHeader,
    /// The data is valid but uses a feature this engine does not decode.
    UnsupportedFormat,
    /// The source ended before the data was complete.
    Truncated,
    /// The compressed or entropy-coded stream is inconsistent.
    Corrupt,
    /// The text does not fit the largest QR symbol.
    TooLong,
}

impl fmt::Display for GfxError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let msg = match self {
            Self::OutOfMemory => "out of memory",
            Self::InvalidHeader => "invalid header",
            Self::UnsupportedFormat => "unsupported format",
            Self::Truncated => "truncated data",
            Self::Corrupt => "corrupt data",
            Self::TooLong => "text too long",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for GfxError {}

/// Result of a fallible engine call.
pub type GfxResult<T = ()> = Result<T, GfxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(GfxError::OutOfMemory.to_string(), "out of memory");
        assert_eq!(GfxError::UnsupportedFormat.to_string(), "unsupported format");
    }
}
