//! Clip and scroll regions.
//!
//! Every write funnels through [`ClipRect`]. Rectangles with a negative
//! extent are first flipped onto their origin by [`normalize`], then clamped.
//! Anything left with no area is dropped without an error.

/// Flips a negative extent so that `pos..pos+len` covers the same pixels.
///
/// Returns `true` when the extent is zero and the caller should draw nothing.
#[inline]
pub fn normalize(
    pos: &mut i32,
    len: &mut i32,
) -> bool {
    if *len < 0 {
        // The flipped extent still ends on the pixel at `pos`.
        let end = i64::from(*pos) + 1;
        let flipped = (-i64::from(*len)).min(i64::from(i32::MAX));
        *pos = (end - flipped).max(i64::from(i32::MIN)) as i32;
        *len = flipped as i32;
    }
    *len == 0
}

/// Trims a normalized extent to end at most `margin` pixels outside `[lo, hi]`.
///
/// Pixels further out than `margin` are invisible either way; trimming them
/// keeps `pos + len` and the edge arithmetic of outlines inside `i32`.
pub fn trim_extent(
    pos: &mut i32,
    len: &mut i32,
    lo: i32,
    hi: i32,
    margin: i32,
) {
    let start = i64::from(*pos).max(i64::from(lo) - i64::from(margin));
    let end = (i64::from(*pos) + i64::from(*len))
        .min(i64::from(hi) + i64::from(margin) + 1)
        .min(i64::from(i32::MAX));
    if end <= start {
        *len = 0;
        return;
    }
    *pos = start as i32;
    *len = (end - start) as i32;
}

/// Inclusive clip rectangle. An empty clip has `right < left`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClipRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    /// Whole surface of `width` x `height`.
    pub const fn full(
        width: i32,
        height: i32,
    ) -> Self {
        Self { left: 0, top: 0, right: width - 1, bottom: height - 1 }
    }

    /// `x, y, w, h` region intersected with a `width` x `height` surface.
    pub fn bounded(
        mut x: i32,
        mut y: i32,
        mut w: i32,
        mut h: i32,
        width: i32,
        height: i32,
    ) -> Self {
        normalize(&mut x, &mut w);
        normalize(&mut y, &mut h);
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(w).min(width) - 1;
        let bottom = y.saturating_add(h).min(height) - 1;
        Self { left, top, right, bottom }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.right < self.left || self.bottom < self.top }

    #[inline]
    pub const fn width(&self) -> i32 { self.right - self.left + 1 }

    #[inline]
    pub const fn height(&self) -> i32 { self.bottom - self.top + 1 }

    #[inline]
    pub const fn contains(
        &self,
        x: i32,
        y: i32,
    ) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Clamps a 1-D extent against `[lo, hi]`. Returns the clamped start and length.
    #[inline]
    fn clamp_axis(
        mut pos: i32,
        mut len: i32,
        lo: i32,
        hi: i32,
    ) -> Option<(i32, i32)> {
        if normalize(&mut pos, &mut len) {
            return None;
        }
        trim_extent(&mut pos, &mut len, lo, hi, 0);
        (len > 0).then_some((pos, len))
    }

    /// Normalizes and clamps a rectangle, `None` if nothing remains.
    pub fn clip(
        &self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) -> Option<(i32, i32, i32, i32)> {
        let (x, w) = Self::clamp_axis(x, w, self.left, self.right)?;
        let (y, h) = Self::clamp_axis(y, h, self.top, self.bottom)?;
        Some((x, y, w, h))
    }
}

/// Region scrolled by text output and `scroll`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ScrollRect {
    pub const fn full(
        width: i32,
        height: i32,
    ) -> Self {
        Self { x: 0, y: 0, w: width, h: height }
    }

    #[inline]
    pub const fn right(&self) -> i32 { self.x + self.w - 1 }

    #[inline]
    pub const fn bottom(&self) -> i32 { self.y + self.h - 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_negative_extent() {
        let (mut x, mut w) = (10, -4);
        assert!(!normalize(&mut x, &mut w));
        assert_eq!((x, w), (7, 4));

        let (mut x, mut w) = (3, 0);
        assert!(normalize(&mut x, &mut w));
    }

    #[test]
    fn test_clip_inside_and_outside() {
        let clip = ClipRect::full(100, 50);
        assert_eq!(clip.clip(10, 10, 5, 5), Some((10, 10, 5, 5)));
        assert_eq!(clip.clip(-5, -5, 10, 10), Some((0, 0, 5, 5)));
        assert_eq!(clip.clip(95, 45, 10, 10), Some((95, 45, 5, 5)));
        assert_eq!(clip.clip(100, 0, 10, 10), None);
        assert_eq!(clip.clip(-20, 0, 10, 10), None);
        assert_eq!(clip.clip(0, 0, 0, 10), None);
    }

    #[test]
    fn test_clip_negative_size_flips() {
        let clip = ClipRect::full(100, 100);
        assert_eq!(clip.clip(10, 10, -3, -2), Some((8, 9, 3, 2)));
    }

    #[test]
    fn test_extreme_extents_saturate() {
        let (mut x, mut w) = (0, i32::MIN);
        assert!(!normalize(&mut x, &mut w));
        assert_eq!((x, w), (i32::MIN + 2, i32::MAX));

        let clip = ClipRect::full(10, 10);
        assert_eq!(clip.clip(-2_000_000_000, 0, -2_000_000_000, 1), None);
        assert_eq!(clip.clip(5, 5, i32::MIN, i32::MIN), Some((0, 0, 6, 6)));
        assert_eq!(clip.clip(i32::MIN, i32::MIN, i32::MAX, i32::MAX), None);
        assert_eq!(clip.clip(i32::MAX, 0, i32::MAX, 1), None);
        assert_eq!(clip.clip(-5, 0, i32::MAX, 1), Some((0, 0, 10, 1)));
    }

    #[test]
    fn test_trim_extent_keeps_margin() {
        let (mut x, mut w) = (-1_000_000, 2_000_000);
        trim_extent(&mut x, &mut w, 0, 99, 1);
        assert_eq!((x, w), (-1, 102));

        let (mut x, mut w) = (200, 10);
        trim_extent(&mut x, &mut w, 0, 99, 1);
        assert_eq!(w, 0);
    }

    #[test]
    fn test_bounded_region() {
        let clip = ClipRect::bounded(-10, 20, 50, 200, 100, 100);
        assert_eq!(clip, ClipRect { left: 0, top: 20, right: 39, bottom: 99 });
        assert_eq!(clip.width(), 40);
        assert_eq!(clip.height(), 80);

        let empty = ClipRect::bounded(120, 0, 10, 10, 100, 100);
        assert!(empty.is_empty());
        assert_eq!(empty.clip(0, 0, 200, 200), None);
    }
}
