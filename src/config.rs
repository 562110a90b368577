//! Compile-time engine configuration.
//!
//! Every buffer the engine touches is sized here. Nothing grows with the
//! image or the surface, apart from the flood-fill row cache (one row of the
//! clip width) and the decoder workspaces (a few rows of the image width).

// =============================================================================
// Fixed-Point Geometry
// =============================================================================

/// Fractional bits of the source cursors used by `PixelCopy`.
pub const FP_SCALE: u32 = 16;

/// `1.0` in the `FP_SCALE` fixed-point format.
pub const FP_ONE: i32 = 1 << FP_SCALE;

/// Degrees to radians.
pub const DEG_TO_RAD: f32 = 0.017_453_292;

/// Slope used by the arc rasterizer when the end angle is exactly 360 degrees.
///
/// Large enough that the end half-plane accepts every pixel of the ring.
pub const ARC_NO_END_SLOPE: f32 = -1_000_000.0;

/// Start and end angles closer than this (after normalization) sweep a full ring.
pub const ARC_FULL_EPSILON: f32 = 0.0001;

const _: () = assert!(FP_SCALE >= 8 && FP_SCALE <= 16);

// =============================================================================
// Line Buffers
// =============================================================================

/// Converted pixels per blit chunk. Each chunk is one transport write.
pub const LINE_BUFFER_PIXELS: usize = 128;

/// Bytes of one line buffer (sized for the widest destination depth).
pub const LINE_BUFFER_BYTES: usize = LINE_BUFFER_PIXELS * 4;

const _: () = assert!(LINE_BUFFER_PIXELS >= 8);

// =============================================================================
// Flood Fill
// =============================================================================

/// Row buffers kept by the flood fill before the oldest is evicted.
pub const FLOOD_FILL_ROW_CACHE: usize = 3;

/// Pending spans inspected when looking for one on a cached row.
pub const FLOOD_FILL_SCAN_LIMIT: usize = 256;

const _: () = assert!(FLOOD_FILL_ROW_CACHE >= 3);

// =============================================================================
// Text
// =============================================================================

/// Bytes formatted by `draw_number` / `draw_float`.
pub const NUMBER_TEXT_LEN: usize = 24;

/// Largest decimal count accepted by `draw_float`.
pub const FLOAT_MAX_DECIMALS: u8 = 7;

// =============================================================================
// Decoders
// =============================================================================

/// Bytes pulled from the source per read while inflating PNG data.
pub const PNG_READ_CHUNK: usize = 512;

/// Sliding window of the inflater.
pub const PNG_DICT_SIZE: usize = 32 * 1024;

/// Bytes buffered in front of the JPEG entropy decoder.
pub const JPEG_READ_CHUNK: usize = 512;

/// Largest JPEG dimension accepted before any allocation is attempted.
pub const JPEG_MAX_DIMENSION: u16 = 4096;

/// Largest BMP row accepted, in bytes.
pub const BMP_MAX_ROW_BYTES: usize = 16 * 1024;

const _: () = assert!(PNG_DICT_SIZE.is_power_of_two());
const _: () = assert!(PNG_READ_CHUNK >= 64 && JPEG_READ_CHUNK >= 64);
