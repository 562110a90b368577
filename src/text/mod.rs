//! Text rendering.
//!
//! # Layout
//!
//! The engine keeps a cursor and a [`TextStyle`]. `print`/`write_byte` move
//! the cursor glyph by glyph, wrapping at the clip (or scroll region) edge;
//! `draw_string` places a whole string relative to a [`Datum`] and leaves
//! the cursor alone.
//!
//! # Fonts
//!
//! A font is anything implementing [`Font`]. Compiled-in fonts are
//! `'static` (see [`mono`]); a VLW font loaded at runtime is owned by the
//! engine until it is unloaded or replaced.

mod engine;
mod font;
pub mod mono;
mod utf8;
mod vlw;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

pub use self::font::{Font, FontMetrics, GlyphSink};
pub use self::mono::MonoGlyphFont;
pub use self::utf8::Utf8Decoder;
pub use self::vlw::VlwFont;

// =============================================================================
// Style
// =============================================================================

/// Anchor point of a string relative to the coordinates it is drawn at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Datum {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    BaselineLeft,
    BaselineCenter,
    BaselineRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VAlign {
    Top,
    Middle,
    Bottom,
    Baseline,
}

impl Datum {
    pub(crate) const fn horizontal(self) -> HAlign {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft | Self::BaselineLeft => HAlign::Left,
            Self::TopCenter | Self::MiddleCenter | Self::BottomCenter | Self::BaselineCenter => HAlign::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight | Self::BaselineRight => HAlign::Right,
        }
    }

    pub(crate) const fn vertical(self) -> VAlign {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => VAlign::Top,
            Self::MiddleLeft | Self::MiddleCenter | Self::MiddleRight => VAlign::Middle,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => VAlign::Bottom,
            Self::BaselineLeft | Self::BaselineCenter | Self::BaselineRight => VAlign::Baseline,
        }
    }
}

/// Colors, scale and anchor applied to every glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub fore: Rgb888,
    /// Cell background; `None` leaves the background untouched.
    pub back: Option<Rgb888>,
    pub size_x: i32,
    pub size_y: i32,
    pub datum: Datum,
    pub utf8: bool,
}

impl TextStyle {
    pub const fn new() -> Self {
        Self { fore: Rgb888::WHITE, back: None, size_x: 1, size_y: 1, datum: Datum::TopLeft, utf8: true }
    }
}

impl Default for TextStyle {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Engine State
// =============================================================================

/// Cursor, style and layout flags owned by the engine.
#[derive(Clone, Debug)]
pub(crate) struct TextState {
    pub cursor_x: i32,
    pub cursor_y: i32,
    pub style: TextStyle,
    pub wrap_x: bool,
    pub wrap_y: bool,
    pub scroll: bool,
    pub padding_x: i32,
    pub decoder: Utf8Decoder,
    pub metrics: FontMetrics,
}

impl TextState {
    pub fn new() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            style: TextStyle::new(),
            wrap_x: true,
            wrap_y: false,
            scroll: false,
            padding_x: 0,
            decoder: Utf8Decoder::new(),
            metrics: mono::FONT_6X10.metrics(),
        }
    }
}

/// The active font: compiled in, or loaded at runtime and owned here.
pub(crate) enum FontSlot {
    Builtin(&'static dyn Font),
    Runtime(VlwFont),
}

impl FontSlot {
    #[inline]
    pub fn font(&self) -> &dyn Font {
        match self {
            Self::Builtin(font) => *font,
            Self::Runtime(font) => font,
        }
    }
}

impl Default for FontSlot {
    fn default() -> Self { Self::Builtin(&mono::FONT_6X10) }
}
