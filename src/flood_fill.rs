//! Scanline flood fill.
//!
//! Memory stays bounded by the clip width: matching cells of at most
//! [`FLOOD_FILL_ROW_CACHE`] rows are kept as `bool` flags, read back from the
//! panel on demand. Pending work is a list of spans. Each processed span is
//! widened to its maximal matching run, written as one span, and cleared in
//! the cache so it is never filled twice.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;

use crate::config::{FLOOD_FILL_ROW_CACHE, FLOOD_FILL_SCAN_LIMIT, LINE_BUFFER_BYTES};
use crate::error::{GfxError, GfxResult};
use crate::gfx::Gfx;
use crate::panel::Panel;
use crate::pixelcopy::PixelCopy;

const NO_ROW: i32 = i32::MIN;

/// A pending span on row `y`, discovered from row `origin_y`.
#[derive(Clone, Copy, Debug)]
struct Span {
    left: i32,
    right: i32,
    y: i32,
    origin_y: i32,
}

/// Matching flags of a few rows of the clip region.
struct RowCache {
    rows: [Vec<bool>; FLOOD_FILL_ROW_CACHE],
    ys: [i32; FLOOD_FILL_ROW_CACHE],
}

impl RowCache {
    fn new(width: usize) -> GfxResult<Self> {
        let mut rows: [Vec<bool>; FLOOD_FILL_ROW_CACHE] = Default::default();
        for row in &mut rows {
            row.try_reserve_exact(width).map_err(|_| GfxError::OutOfMemory)?;
            row.resize(width, false);
        }
        Ok(Self { rows, ys: [NO_ROW; FLOOD_FILL_ROW_CACHE] })
    }

    #[inline]
    fn find(
        &self,
        y: i32,
    ) -> Option<usize> {
        self.ys.iter().position(|&cached| cached == y)
    }

    /// Slot that may be overwritten without losing the rows around `keep`.
    fn victim(
        &self,
        keep: i32,
    ) -> usize {
        self.ys
            .iter()
            .position(|&cached| cached == NO_ROW || (cached - keep).abs() > 1)
            .unwrap_or(0)
    }
}

/// Appends one span per run of set flags in `left..=right`.
fn add_spans(
    pending: &mut Vec<Span>,
    row: &[bool],
    clip_left: i32,
    left: i32,
    right: i32,
    y: i32,
    origin_y: i32,
) -> GfxResult {
    let flag = |x: i32| row.get((x - clip_left) as usize).copied().unwrap_or(false);
    let mut x = left.max(clip_left);
    let right = right.min(clip_left + row.len() as i32 - 1);
    while x <= right {
        if !flag(x) {
            x += 1;
            continue;
        }
        let start = x;
        while x < right && flag(x + 1) {
            x += 1;
        }
        pending.try_reserve(1).map_err(|_| GfxError::OutOfMemory)?;
        pending.push(Span { left: start, right: x, y, origin_y });
        x += 1;
    }
    Ok(())
}

impl<P: Panel> Gfx<P> {
    /// Fills the 4-connected region around `(x, y)` whose pixels read back
    /// equal to the seed pixel.
    ///
    /// Nothing is written when the seed is outside the clip or already has
    /// `color`. Running out of memory for the row cache or the work list
    /// aborts this call with [`GfxError::OutOfMemory`]; spans already written
    /// stay on the panel.
    pub fn flood_fill(
        &mut self,
        x: i32,
        y: i32,
        color: Rgb888,
    ) -> GfxResult {
        if !self.clip.contains(x, y) {
            return Ok(());
        }
        self.set_color(color);

        let read_format = self.panel.read_format();
        let mut raw = [0u8; 4];
        self.start_write();
        self.panel.read_rect(x, y, 1, 1, &mut raw);
        self.end_write();
        let target = read_format.read_raw(&raw, 0);
        if self.panel.write_format().encode(read_format.decode(target, None)) == self.color.raw {
            return Ok(());
        }

        self.start_write();
        let result = self.flood_fill_spans(x, y, target);
        self.end_write();
        if result.is_err() {
            log_warn!("flood fill: out of memory");
        }
        result
    }

    fn flood_fill_spans(
        &mut self,
        seed_x: i32,
        seed_y: i32,
        target: u32,
    ) -> GfxResult {
        let c = self.clip;
        let mut cache = RowCache::new(c.width() as usize)?;
        let mut pending: Vec<Span> = Vec::new();
        pending.try_reserve(16).map_err(|_| GfxError::OutOfMemory)?;
        pending.push(Span { left: seed_x, right: seed_x, y: seed_y, origin_y: seed_y });
        let mut spans = 0u32;

        while !pending.is_empty() {
            // Prefer recent work on a row that is already cached.
            let scan_end = pending.len().saturating_sub(FLOOD_FILL_SCAN_LIMIT);
            let pick = (scan_end..pending.len()).rev().find(|&i| cache.find(pending[i].y).is_some());
            let Span { mut left, mut right, y, origin_y } = pending.swap_remove(pick.unwrap_or(pending.len() - 1));

            let slot = self.cached_row(&mut cache, y, y, target);
            let row = &mut cache.rows[slot];
            let at = |x: i32| (x - c.left) as usize;
            if !row.get(at(left)).copied().unwrap_or(false) {
                continue;
            }

            let left_edge = left - 1;
            let right_edge = right + 1;
            while left > c.left && row[at(left - 1)] {
                left -= 1;
            }
            while right < c.right && row[at(right + 1)] {
                right += 1;
            }
            self.write_fast_hline(left, y, right - left + 1);
            row[at(left)..=at(right)].fill(false);
            spans += 1;

            for next_y in [y - 1, y + 1] {
                if next_y == origin_y && left >= left_edge && right_edge >= right {
                    continue;
                }
                if next_y < c.top || next_y > c.bottom {
                    continue;
                }
                let slot = self.cached_row(&mut cache, next_y, y, target);
                let row = &cache.rows[slot];
                if next_y == origin_y {
                    add_spans(&mut pending, row, c.left, left, left_edge, next_y, y)?;
                    add_spans(&mut pending, row, c.left, right_edge, right, next_y, y)?;
                } else {
                    add_spans(&mut pending, row, c.left, left, right, next_y, y)?;
                }
            }
        }
        log_debug!("flood fill: {} spans", spans);
        Ok(())
    }

    /// Cache slot holding row `y`, reading it from the panel if needed.
    fn cached_row(
        &mut self,
        cache: &mut RowCache,
        y: i32,
        keep: i32,
        target: u32,
    ) -> usize {
        if let Some(slot) = cache.find(y) {
            return slot;
        }
        let slot = cache.victim(keep);
        cache.ys[slot] = y;
        self.read_matches(y, target, &mut cache.rows[slot]);
        slot
    }

    /// Marks the pixels of row `y` (within the clip) that equal `target`.
    fn read_matches(
        &mut self,
        y: i32,
        target: u32,
        out: &mut [bool],
    ) {
        let format = self.panel.read_format();
        let chunk = (LINE_BUFFER_BYTES * 8 / format.depth.storage_bits() as usize).max(1);
        let mut buf = [0u8; LINE_BUFFER_BYTES];
        let left = self.clip.left;
        for (i, flags) in out.chunks_mut(chunk).enumerate() {
            let n = flags.len();
            self.panel.read_rect(left + (i * chunk) as i32, y, n as i32, 1, &mut buf);
            PixelCopy::new(&buf, n as u32, 1, format, format).compare_run(flags, target);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::frame_panel::PanelOp;
    use crate::test_support::{BLACK, BLUE, RED, gfx, lit_pixels};

    fn filled_area(g: &crate::Gfx<crate::FramePanel>) -> i32 {
        g.panel()
            .ops()
            .iter()
            .map(|op| match *op {
                PanelOp::Fill { w, h, .. } => w * h,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_fill_inside_outline() {
        let mut g = gfx(20, 20);
        g.draw_rect(2, 2, 10, 8, BLUE);
        g.panel_mut().clear_ops();
        g.flood_fill(5, 5, RED).unwrap();
        assert_eq!(lit_pixels(&g, RED), 8 * 6);
        assert_eq!(g.panel().write_count(), 6);
        assert_eq!(g.panel().pixel(1, 1), BLACK);
        assert_eq!(g.panel().pixel(2, 5), BLUE);
    }

    #[test]
    fn test_seed_already_fill_color_writes_nothing() {
        let mut g = gfx(20, 20);
        g.fill_screen(RED);
        g.panel_mut().clear_ops();
        g.flood_fill(3, 3, RED).unwrap();
        assert_eq!(g.panel().write_count(), 0);
    }

    #[test]
    fn test_fill_wraps_around_wall_without_overdraw() {
        let mut g = gfx(20, 20);
        g.draw_fast_vline(10, 0, 16, BLUE);
        g.panel_mut().clear_ops();
        g.flood_fill(1, 1, RED).unwrap();
        assert_eq!(lit_pixels(&g, RED), 400 - 16);
        assert_eq!(filled_area(&g), 400 - 16);
    }

    #[test]
    fn test_fill_stays_inside_clip() {
        let mut g = gfx(20, 20);
        g.set_clip_rect(0, 0, 10, 10);
        g.flood_fill(1, 1, RED).unwrap();
        assert_eq!(lit_pixels(&g, RED), 100);
        assert_eq!(g.panel().write_count(), 10);
    }

    #[test]
    fn test_seed_outside_clip_is_noop() {
        let mut g = gfx(20, 20);
        g.set_clip_rect(0, 0, 10, 10);
        g.flood_fill(15, 15, RED).unwrap();
        assert!(g.panel().ops().is_empty());
    }

    #[test]
    fn test_serpentine_evicts_rows() {
        // Walls every third row with a gap alternating between the ends.
        let mut g = gfx(30, 30);
        let mut walls = 0;
        for (k, y) in (3..30).step_by(3).enumerate() {
            let gap = if k % 2 == 0 { 29 } else { 0 };
            let x = if gap == 0 { 1 } else { 0 };
            g.draw_fast_hline(x, y, 29, BLUE);
            walls += 29;
        }
        g.panel_mut().clear_ops();
        g.flood_fill(0, 0, RED).unwrap();
        assert_eq!(lit_pixels(&g, RED), 900 - walls);
        assert_eq!(lit_pixels(&g, BLACK), 0);
        assert_eq!(filled_area(&g) as usize, 900 - walls);
    }

    #[test]
    fn test_fill_on_rgb565_panel() {
        use crate::FramePanel;
        use crate::color::PixelFormat;

        let panel = FramePanel::new(16, 16, PixelFormat::RGB565).unwrap().with_recording();
        let mut g = crate::Gfx::new(panel);
        g.draw_circle(8, 8, 5, BLUE);
        g.flood_fill(8, 8, RED).unwrap();
        assert_eq!(g.panel().pixel(8, 8), RED);
        assert_eq!(g.panel().pixel(0, 0), BLACK);
        assert_eq!(g.panel().pixel(8, 3), BLUE);
    }
}
