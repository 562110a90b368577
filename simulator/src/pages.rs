//! Demo pages drawn with `panel-gfx`.
//!
//! Each page redraws the whole canvas from `t` (seconds of simulated time).

use embedded_graphics::pixelcolor::{Rgb888, RgbColor, WebColors};
use panel_gfx::text::mono;
use panel_gfx::{Datum, FramePanel, Gfx, PixelCopy, PixelFormat, SliceSource};

use crate::SCREEN_WIDTH;

const GAUGE_BG: Rgb888 = Rgb888::new(40, 40, 48);
const SPRITE_SIZE: u32 = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Gauge,
    Shapes,
    Images,
    Fonts,
}

impl Page {
    pub const fn next(self) -> Self {
        match self {
            Self::Gauge => Self::Shapes,
            Self::Shapes => Self::Images,
            Self::Images => Self::Fonts,
            Self::Fonts => Self::Gauge,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Gauge => "Gauge",
            Self::Shapes => "Shapes",
            Self::Images => "Images",
            Self::Fonts => "Fonts",
        }
    }
}

/// Static assets built once at startup.
pub struct Assets {
    bmp: Vec<u8>,
    sprite: Vec<u8>,
}

impl Assets {
    pub fn new() -> Self { Self { bmp: checker_bmp(48, 32), sprite: sprite_rgb565() } }
}

// =============================================================================
// Pages
// =============================================================================

pub fn draw_page(
    gfx: &mut Gfx<FramePanel>,
    page: Page,
    assets: &Assets,
    t: f32,
) {
    gfx.start_write();
    gfx.fill_screen(Rgb888::BLACK);
    match page {
        Page::Gauge => draw_gauge(gfx, t),
        Page::Shapes => draw_shapes(gfx, t),
        Page::Images => draw_images(gfx, assets, t),
        Page::Fonts => draw_fonts(gfx),
    }
    gfx.end_write();
}

fn draw_gauge(
    gfx: &mut Gfx<FramePanel>,
    t: f32,
) {
    let rpm = fake_signal(t, 800.0, 6800.0, 0.15);
    let (cx, cy) = (SCREEN_WIDTH as i32 / 2, 130);
    let sweep = 270.0 * (rpm / 7000.0);

    gfx.fill_arc(cx, cy, 80, 96, 135.0, 45.0, GAUGE_BG);
    let color = if rpm > 6000.0 { Rgb888::RED } else { Rgb888::CSS_ORANGE };
    gfx.fill_arc(cx, cy, 80, 96, 135.0, (135.0 + sweep) % 360.0, color);
    gfx.draw_arc(cx, cy, 100, 100, 135.0, 45.0, Rgb888::CSS_GRAY);

    // One tick per 1000 rpm, labelled in thousands.
    gfx.set_font(&mono::FONT_6X10);
    gfx.set_text_color(Rgb888::CSS_LIGHT_GRAY, None);
    gfx.set_text_datum(Datum::MiddleCenter);
    for k in 0..=7 {
        let (dx, dy) = polar(135.0 + 270.0 * k as f32 / 7.0);
        let at = |r: f32| (cx + (dx * r) as i32, cy + (dy * r) as i32);
        let (x0, y0) = at(100.0);
        let (x1, y1) = at(108.0);
        gfx.draw_line(x0, y0, x1, y1, Rgb888::WHITE);
        let (lx, ly) = at(118.0);
        gfx.draw_number(k, lx, ly);
    }

    let (dx, dy) = polar(135.0 + sweep);
    let tip = (cx + (dx * 76.0) as i32, cy + (dy * 76.0) as i32);
    let base = ((-dy * 5.0) as i32, (dx * 5.0) as i32);
    gfx.fill_triangle(tip.0, tip.1, cx + base.0, cy + base.1, cx - base.0, cy - base.1, Rgb888::RED);
    gfx.fill_circle(cx, cy, 6, Rgb888::CSS_DARK_GRAY);

    gfx.set_font(&mono::PROFONT_24_POINT);
    gfx.set_text_color(Rgb888::WHITE, Some(Rgb888::BLACK));
    gfx.set_text_datum(Datum::MiddleCenter);
    let pad = gfx.text_width("0000");
    gfx.set_text_padding(pad);
    gfx.draw_number(rpm as i64, cx, cy - 30);

    gfx.set_font(&mono::PROFONT_12_POINT);
    gfx.set_text_padding(0);
    gfx.draw_float(fake_signal(t, 0.0, 2.0, 0.08), 2, cx, cy + 40);
    gfx.draw_string("rpm", cx, cy + 24);
}

fn draw_shapes(
    gfx: &mut Gfx<FramePanel>,
    t: f32,
) {
    let wobble = fake_signal(t, -20.0, 20.0, 0.3) as i32;

    gfx.draw_round_rect(10, 10, 140, 100, 12, Rgb888::CSS_LIGHT_GRAY);
    gfx.draw_circle(80, 60, 30 + wobble / 2, Rgb888::CYAN);
    gfx.fill_triangle(170, 100, 240 + wobble, 20, 300, 100, Rgb888::CSS_DARK_GREEN);
    gfx.fill_ellipse(240, 170, 60, 25, Rgb888::CSS_NAVY);
    gfx.draw_bezier(10, 230, 80 + wobble * 3, 120, 150, 230, Rgb888::YELLOW);
    gfx.draw_gradient_line(160, 230, 310, 200, Rgb888::RED, Rgb888::BLUE);

    // Interior of the rounded rectangle, bounded by the circle outline.
    if gfx.flood_fill(20, 20, Rgb888::CSS_DARK_SLATE_BLUE).is_err() {
        gfx.draw_string("fill: out of memory", 10, 120);
    }
}

fn draw_images(
    gfx: &mut Gfx<FramePanel>,
    assets: &Assets,
    t: f32,
) {
    let mut src = SliceSource::new(&assets.bmp);
    if gfx.draw_bmp(&mut src, 16, 16).is_err() {
        gfx.draw_string("bmp error", 16, 16);
    }

    let angle = (t * 60.0) % 360.0;
    let zoom = fake_signal(t, 1.0, 3.0, 0.2);
    let dst = gfx.write_format();
    let mut pc = PixelCopy::new(&assets.sprite, SPRITE_SIZE, SPRITE_SIZE, PixelFormat::RGB565, dst);
    let half = SPRITE_SIZE as i32 / 2;
    gfx.push_image_rotate_zoom(200, 120, half, half, angle, zoom, zoom, &mut pc);

    if gfx.qrcode("panel-gfx simulator", 16, 140, 84, 1).is_err() {
        gfx.draw_string("qr error", 16, 140);
    }
}

fn draw_fonts(gfx: &mut Gfx<FramePanel>) {
    gfx.set_text_color(Rgb888::WHITE, None);
    gfx.set_font(&mono::PROFONT_12_POINT);
    gfx.show_font(8, 36, 0);

    gfx.set_text_color(Rgb888::CYAN, None);
    gfx.set_font(&mono::FONT_6X10);
    gfx.show_font(8, 120, 0);

    gfx.set_font(&mono::FONT_4X6);
    gfx.show_font(8, 180, 0);
}

// =============================================================================
// Asset Generation
// =============================================================================

/// Bottom-up 24-bit BMP with 8x8 checker cells.
fn checker_bmp(
    w: u32,
    h: u32,
) -> Vec<u8> {
    let row = (w * 3).next_multiple_of(4);
    let image_size = row * h;
    let mut out = Vec::with_capacity((54 + image_size) as usize);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(54 + image_size).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&54u32.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(w as i32).to_le_bytes());
    out.extend_from_slice(&(h as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&image_size.to_le_bytes());
    out.extend_from_slice(&[0; 16]);
    for y in (0..h).rev() {
        let start = out.len();
        for x in 0..w {
            let bgr = if (x / 8 + y / 8) % 2 == 0 { [40, 120, 220] } else { [240, 240, 240] };
            out.extend_from_slice(&bgr);
        }
        out.resize(start + row as usize, 0);
    }
    out
}

/// Arrow sprite in big-endian RGB565.
fn sprite_rgb565() -> Vec<u8> {
    let n = SPRITE_SIZE as i32;
    let mut out = Vec::with_capacity((n * n * 2) as usize);
    for y in 0..n {
        for x in 0..n {
            let arrow = (y < n / 2 && (x - n / 2).abs() <= y / 2) || (y >= n / 2 && (x - n / 2).abs() <= 3);
            let raw: u16 = if arrow { 0xF800 } else { 0x0010 };
            out.extend_from_slice(&raw.to_be_bytes());
        }
    }
    out
}

/// Unit vector for `degrees`, clockwise from the positive x axis.
fn polar(degrees: f32) -> (f32, f32) {
    let (s, c) = degrees.to_radians().sin_cos();
    (c, s)
}

/// Smooth sine between `min` and `max`.
pub fn fake_signal(
    t: f32,
    min: f32,
    max: f32,
    freq: f32,
) -> f32 {
    let mid = f32::midpoint(min, max);
    let amp = (max - min) / 2.0;
    amp.mul_add((t * freq * std::f32::consts::TAU).sin(), mid)
}
