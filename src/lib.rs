//! 2D raster engine for small serial displays.
//!
//! Everything draws through [`Gfx`], which owns a [`Panel`] (the transport
//! to one display controller) plus the drawing state: clip and scroll
//! rectangles, current color, text cursor and font.
//!
//! - [`pixelcopy`]: per-run pixel format conversion between any two formats
//! - [`primitives`]: lines, rectangles, circles, ellipses, triangles, arcs,
//!   Bezier curves and 1-bit bitmaps, emitted as batched spans
//! - [`blit`]: plain and rotate/zoom image placement through `PixelCopy`
//! - [`flood_fill`]: span-based region fill over read-back pixels
//! - [`text`]: UTF-8 text with datum alignment, wrapping and scrolling
//! - [`decode`]: streaming BMP, JPEG and PNG decoders
//! - [`frame_panel`]: in-memory panel for off-screen drawing and tests
//!
//! Any `embedded-graphics` drawable can also target a [`Gfx`] directly.
//!
//! # no_std Compatibility
//!
//! The crate is `no_std` and needs `alloc` only for the flood-fill work list,
//! decoder row buffers, runtime fonts and [`FramePanel`]. Float math goes
//! through `libm`. Enable the `defmt` feature for logging.
//!
//! # Example
//!
//! ```ignore
//! let panel = FramePanel::new(240, 135, PixelFormat::RGB565)?;
//! let mut gfx = Gfx::new(panel);
//! gfx.fill_screen(Rgb888::BLACK);
//! gfx.fill_arc(120, 67, 50, 60, 135.0, 45.0, Rgb888::RED);
//! gfx.set_text_datum(Datum::MiddleCenter);
//! gfx.draw_string("4500", 120, 67);
//! ```

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]

extern crate alloc;

#[macro_use]
mod log;

pub mod blit;
pub mod clip;
pub mod color;
pub mod config;
pub mod decode;
mod draw_target;
pub mod error;
pub mod flood_fill;
pub mod frame_panel;
pub mod gfx;
pub mod panel;
pub mod pixelcopy;
pub mod primitives;
pub mod text;

// Re-export commonly used items
pub use color::{ByteOrder, ColorDepth, PixelFormat};
pub use decode::{ByteSource, JpegOptions, JpegScale, PngOptions, SliceSource};
pub use error::{GfxError, GfxResult};
pub use frame_panel::{FramePanel, PanelOp};
pub use gfx::Gfx;
pub use panel::Panel;
pub use pixelcopy::PixelCopy;
pub use text::{Datum, Font, FontMetrics, GlyphSink, MonoGlyphFont, TextStyle, VlwFont, mono};
