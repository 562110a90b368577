//! Shape rasterization.
//!
//! Each submodule adds `draw_*`/`fill_*` methods to [`Gfx`](crate::Gfx).
//! Shapes are reduced to clipped spans and filled rectangles; nothing here
//! talks to the panel except through the engine's write primitives.

mod arc;
mod bezier;
mod bitmap;
mod circle;
mod line;
mod qrcode;
mod rect;
mod triangle;
