//! Timing constants for the simulator.
//!
//! These use `std::time::Duration`, which the `no_std` library does not have.

use std::time::Duration;

/// Target frame time (~50 FPS). The main loop sleeps if frame completes early.
pub const FRAME_TIME: Duration = Duration::from_millis(20);

/// How long the page-change banner stays on screen.
pub const BANNER_DURATION: Duration = Duration::from_secs(2);
