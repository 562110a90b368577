//! Desktop preview for `panel-gfx`.
//!
//! Draws the demo pages into an RGB565 [`FramePanel`] and mirrors the
//! framebuffer into an `embedded-graphics-simulator` window every frame.
//!
//! # Keys
//!
//! - `Y`: next page
//! - `X`: toggle the frame statistics overlay

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod pages;
mod profiling;
mod timing;

use std::thread;
use std::time::Instant;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use panel_gfx::text::mono;
use panel_gfx::{Datum, FramePanel, Gfx, PixelFormat};

use crate::pages::{Assets, Page, draw_page};
use crate::profiling::ProfilingMetrics;
use crate::timing::{BANNER_DURATION, FRAME_TIME};

pub const SCREEN_WIDTH: u32 = 320;
pub const SCREEN_HEIGHT: u32 = 240;

fn main() {
    let Ok(panel) = FramePanel::new(SCREEN_WIDTH, SCREEN_HEIGHT, PixelFormat::RGB565) else {
        eprintln!("not enough memory for a {SCREEN_WIDTH}x{SCREEN_HEIGHT} canvas");
        return;
    };
    let mut gfx = Gfx::new(panel.with_recording());

    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("panel-gfx preview", &output_settings);

    let assets = Assets::new();
    let mut page = Page::default();
    let mut banner_since = Some(Instant::now());
    let mut show_stats = true;
    let mut metrics = ProfilingMetrics::new();
    let mut t = 0.0f32;

    loop {
        let frame_start = Instant::now();

        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => return,
                SimulatorEvent::KeyDown { keycode, repeat: false, .. } => match keycode {
                    Keycode::Y => {
                        page = page.next();
                        banner_since = Some(Instant::now());
                        metrics.inc_page_switches();
                    }
                    Keycode::X => show_stats = !show_stats,
                    _ => {}
                },
                _ => {}
            }
        }

        gfx.panel_mut().clear_ops();
        draw_page(&mut gfx, page, &assets, t);
        metrics.panel_writes = gfx.panel().write_count();

        if banner_since.is_some_and(|since| since.elapsed() < BANNER_DURATION) {
            draw_banner(&mut gfx, page.title());
        } else {
            banner_since = None;
        }
        if show_stats {
            draw_stats(&mut gfx, &metrics);
        }

        blit_to_display(gfx.panel(), &mut display);
        let render_time = frame_start.elapsed();
        window.update(&display);

        t += FRAME_TIME.as_secs_f32();

        let pre_sleep = frame_start.elapsed();
        if let Some(rest) = FRAME_TIME.checked_sub(pre_sleep) {
            thread::sleep(rest);
        }
        let sleep_time = frame_start.elapsed().saturating_sub(pre_sleep);

        metrics.record_frame(frame_start.elapsed(), render_time, sleep_time);
    }
}

fn draw_banner(
    gfx: &mut Gfx<FramePanel>,
    title: &str,
) {
    let w = gfx.width();
    gfx.fill_round_rect(w / 2 - 60, 4, 120, 24, 6, Rgb888::new(30, 30, 90));
    gfx.set_font(&mono::PROFONT_12_POINT);
    gfx.set_text_color(Rgb888::WHITE, None);
    gfx.set_text_datum(Datum::MiddleCenter);
    gfx.draw_string(title, w / 2, 16);
}

fn draw_stats(
    gfx: &mut Gfx<FramePanel>,
    metrics: &ProfilingMetrics,
) {
    use core::fmt::Write;

    let mut line: heapless::String<48> = heapless::String::new();
    let _ = write!(line, "{}us {}w {}", metrics.frame_time_avg_us(), metrics.panel_writes, metrics.uptime_string());
    gfx.set_font(&mono::FONT_6X10);
    gfx.set_text_color(Rgb888::GREEN, Some(Rgb888::BLACK));
    gfx.set_text_datum(Datum::BottomLeft);
    gfx.draw_string(&line, 2, gfx.height() - 1);
}

/// Copies the framebuffer into the simulator display.
fn blit_to_display(
    panel: &FramePanel,
    display: &mut SimulatorDisplay<Rgb565>,
) {
    let area = Rectangle::new(Point::zero(), Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let colors = (0..SCREEN_HEIGHT as i32)
        .flat_map(|y| (0..SCREEN_WIDTH as i32).map(move |x| (x, y)))
        .map(|(x, y)| Rgb565::from(panel.pixel(x, y)));
    display.fill_contiguous(&area, colors).ok();
}
