//! Frame timing.
//!
//! [`Clock`] measures real time between presented frames. [`FrameLimiter`]
//! decides which of those frames run an update, so the effect ticks at a
//! fixed target rate regardless of the display's refresh rate.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = Clock::new();
//! let mut limiter = FrameLimiter::new(1.0 / 60.0);
//!
//! // On every redraw:
//! let delta = clock.tick();
//! if let Some(elapsed) = limiter.advance(delta) {
//!     effect.update(elapsed);
//! }
//! ```

use std::time::{Duration, Instant};

/// Wall clock for measuring frame deltas.
#[derive(Debug)]
pub struct Clock {
    /// When the clock was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total frames since start.
    frame_count: u64,
}

impl Clock {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock whose first frame is measured from `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
            frame_count: 0,
        }
    }

    /// Seconds since the previous call. Call once per frame.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Seconds between the previous frame and `now`.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;
        delta
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Time since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-rate gate over variable frame deltas.
///
/// Deltas accumulate until they exceed the interval; the accumulator then
/// keeps only the remainder modulo the interval and the frame runs.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    interval: f32,
    accumulated: f32,
    /// Real time since the last executed update.
    since_update: f32,
}

impl FrameLimiter {
    /// A limiter targeting one update per `interval` seconds.
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(f32::EPSILON),
            accumulated: 0.0,
            since_update: 0.0,
        }
    }

    /// Target interval in seconds.
    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Feed a frame delta.
    ///
    /// Returns the real time elapsed since the previous executed update
    /// when this frame should run, `None` otherwise.
    pub fn advance(&mut self, delta: f32) -> Option<f32> {
        self.accumulated += delta;
        self.since_update += delta;
        if self.accumulated > self.interval {
            self.accumulated %= self.interval;
            let elapsed = self.since_update;
            self.since_update = 0.0;
            Some(elapsed)
        } else {
            None
        }
    }
}
