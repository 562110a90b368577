//! Profiling metrics with time-based measurements.
//!
//! Tracks frame timing and how many transport calls each frame issued.

use core::fmt::Write;
use std::time::{Duration, Instant};

use heapless::String;

/// Frame timing and panel statistics for profiling.
pub struct ProfilingMetrics {
    // Frame timing (microseconds)
    pub frame_time_us: u32,
    pub render_time_us: u32,
    pub sleep_time_us: u32,

    // Statistics
    pub frame_time_min_us: u32,
    pub frame_time_max_us: u32,
    frame_time_avg_us: f32,

    // Counters
    pub total_frames: u64,
    pub panel_writes: usize,
    pub page_switches: u32,

    // Uptime tracking
    start_time: Instant,
}

impl ProfilingMetrics {
    const EMA_ALPHA: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            frame_time_us: 0,
            render_time_us: 0,
            sleep_time_us: 0,
            frame_time_min_us: u32::MAX,
            frame_time_max_us: 0,
            frame_time_avg_us: 0.0,
            total_frames: 0,
            panel_writes: 0,
            page_switches: 0,
            start_time: Instant::now(),
        }
    }

    /// Record frame timing for this frame.
    pub fn record_frame(
        &mut self,
        total_time: Duration,
        render_time: Duration,
        sleep_time: Duration,
    ) {
        let total_us = total_time.as_micros() as u32;

        self.frame_time_us = total_us;
        self.render_time_us = render_time.as_micros() as u32;
        self.sleep_time_us = sleep_time.as_micros() as u32;
        self.frame_time_min_us = self.frame_time_min_us.min(total_us);
        self.frame_time_max_us = self.frame_time_max_us.max(total_us);

        if self.total_frames == 0 {
            self.frame_time_avg_us = total_us as f32;
        } else {
            self.frame_time_avg_us =
                Self::EMA_ALPHA.mul_add(total_us as f32, (1.0 - Self::EMA_ALPHA) * self.frame_time_avg_us);
        }

        self.total_frames += 1;
    }

    /// Get average frame time in microseconds.
    #[inline]
    pub const fn frame_time_avg_us(&self) -> u32 { self.frame_time_avg_us as u32 }

    #[inline]
    pub fn uptime(&self) -> Duration { self.start_time.elapsed() }

    /// Format uptime as HH:MM:SS string.
    pub fn uptime_string(&self) -> String<12> {
        let secs = self.uptime().as_secs();
        let mut s = String::new();
        let _ = write!(s, "{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);
        s
    }

    #[inline]
    pub fn inc_page_switches(&mut self) { self.page_switches += 1; }
}

impl Default for ProfilingMetrics {
    fn default() -> Self { Self::new() }
}
