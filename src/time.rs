//! Frame clock and fixed simulation step.
//!
//! Every per-tick constant in the scene (forces, damping, gravity, drag,
//! rotation speed) assumes a 60 Hz tick. [`Clock`] measures wall time between
//! frames and [`FixedStep`] turns that into a whole number of ticks, so the
//! simulation behaves the same on a 30 Hz laptop panel and a 144 Hz monitor.
//!
//! # Example
//!
//! ```ignore
//! use tinsel::time::{Clock, FixedStep};
//!
//! let mut clock = Clock::new();
//! let mut step = FixedStep::new(60.0, 8);
//!
//! // In the redraw handler:
//! let dt = clock.update();
//! for _ in 0..step.accumulate(dt) {
//!     scene.tick();
//! }
//! ```

use std::time::{Duration, Instant};

/// Tick rate the per-tick constants are tuned for.
pub const REFERENCE_TICK_RATE: f32 = 60.0;

/// Frame deltas above this are clamped, so a stalled window does not
/// produce an enormous catch-up.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Wall-clock frame timing.
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Clock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Mark a new frame. Returns the clamped seconds since the previous one.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_secs = now
            .duration_since(self.last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_DELTA);
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Seconds since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulator that converts frame time into fixed ticks.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    accumulator: f32,
    max_steps: u32,
    dropped: u64,
}

impl FixedStep {
    /// `rate` ticks per second, at most `max_steps` ticks per frame.
    pub fn new(rate: f32, max_steps: u32) -> Self {
        Self {
            step: 1.0 / rate,
            accumulator: 0.0,
            max_steps: max_steps.max(1),
            dropped: 0,
        }
    }

    /// Seconds per tick.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add `dt` seconds and return how many ticks to run now.
    ///
    /// Time beyond `max_steps` ticks is discarded.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        // Tolerate float error just under a whole tick.
        let epsilon = self.step * 1e-3;
        let mut ticks = 0;
        while self.accumulator + epsilon >= self.step && ticks < self.max_steps {
            self.accumulator = (self.accumulator - self.step).max(0.0);
            ticks += 1;
        }
        if self.accumulator + epsilon >= self.step {
            let extra = (self.accumulator / self.step).round() as u64;
            self.dropped += extra;
            log::debug!("dropping {} simulation ticks", extra);
            self.accumulator = 0.0;
        }
        ticks
    }

    /// Fraction of a tick left in the accumulator.
    #[inline]
    pub fn leftover(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Ticks discarded so far because a frame took too long.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_clock_new() {
        let clock = Clock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_clock_update() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(10));
        let delta = clock.update();

        assert!(delta > 0.0);
        assert!(delta <= MAX_FRAME_DELTA);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_one_tick_per_60hz_frame() {
        let mut step = FixedStep::new(60.0, 8);
        for _ in 0..600 {
            assert_eq!(step.accumulate(DT), 1);
        }
        assert_eq!(step.dropped(), 0);
    }

    #[test]
    fn test_fast_display_accumulates() {
        let mut step = FixedStep::new(60.0, 8);
        let total: u32 = (0..240).map(|_| step.accumulate(1.0 / 144.0)).sum();
        // 240 frames at 144 Hz is 1.667 s, or 100 ticks
        assert!((99..=100).contains(&total), "ran {} ticks", total);
    }

    #[test]
    fn test_slow_display_catches_up() {
        let mut step = FixedStep::new(60.0, 8);
        let total: u32 = (0..30).map(|_| step.accumulate(1.0 / 30.0)).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut step = FixedStep::new(60.0, 8);
        assert_eq!(step.accumulate(1.0), 8);
        assert!(step.dropped() > 0);
        assert!(step.leftover() < 1.0);
        assert_eq!(step.accumulate(DT), 1);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut step = FixedStep::new(60.0, 8);
        assert_eq!(step.accumulate(-1.0), 0);
        assert_eq!(step.leftover(), 0.0);
    }
}
