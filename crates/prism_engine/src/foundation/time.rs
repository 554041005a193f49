//! Frame timing utilities
//!
//! Frame times and elapsed time are tracked in milliseconds, the unit the
//! rendering context and animation helpers work in.

use std::time::Instant;

/// Frame timer accumulating frametime, elapsed time and elapsed frames.
///
/// A frame is bracketed by [`begin_frame`](Self::begin_frame) and one of the
/// two end calls. `end_frame` measures the real duration of the bracket;
/// `end_frame_fixed` accumulates a caller-chosen fixed frametime instead,
/// which gives steadier animation when motion does not need to track wall
/// clock time.
pub struct FrameTimer {
    frame_start: Instant,
    last_frametime: f32,
    elapsed_time: f32,
    elapsed_frames: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            last_frametime: 0.0,
            elapsed_time: 0.0,
            elapsed_frames: 0,
        }
    }

    /// Begin frame timing
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// End frame timing, returning the measured frametime in milliseconds
    pub fn end_frame(&mut self) -> f32 {
        let frametime = self.frame_start.elapsed().as_secs_f32() * 1000.0;
        self.accumulate(frametime);
        frametime
    }

    /// End frame timing with a fixed frametime in milliseconds.
    ///
    /// Elapsed time advances by the given value rather than the measured
    /// one, so it tracks an ideal schedule instead of wall clock time.
    pub fn end_frame_fixed(&mut self, frametime: f32) -> f32 {
        self.accumulate(frametime);
        frametime
    }

    fn accumulate(&mut self, frametime: f32) {
        self.last_frametime = frametime;
        self.elapsed_time += frametime;
        self.elapsed_frames += 1;
    }

    /// Frametime of the most recently ended frame, in milliseconds
    pub fn last_frametime(&self) -> f32 {
        self.last_frametime
    }

    /// Total elapsed time in milliseconds
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Total number of ended frames
    pub fn elapsed_frames(&self) -> u64 {
        self.elapsed_frames
    }

    /// Reset all counters to zero
    pub fn reset(&mut self) {
        self.last_frametime = 0.0;
        self.elapsed_time = 0.0;
        self.elapsed_frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fixed_frametime_accumulates_ideal_schedule() {
        let mut timer = FrameTimer::new();
        for _ in 0..60 {
            timer.begin_frame();
            let frametime = timer.end_frame_fixed(16.0);
            assert_relative_eq!(frametime, 16.0);
        }
        assert_relative_eq!(timer.elapsed_time(), 960.0, epsilon = 1e-3);
        assert_eq!(timer.elapsed_frames(), 60);
        assert_relative_eq!(timer.last_frametime(), 16.0);
    }

    #[test]
    fn measured_frame_advances_counters() {
        let mut timer = FrameTimer::new();
        timer.begin_frame();
        let frametime = timer.end_frame();
        assert!(frametime >= 0.0);
        assert_eq!(timer.elapsed_frames(), 1);
    }

    #[test]
    fn reset_clears_counters() {
        let mut timer = FrameTimer::new();
        timer.begin_frame();
        timer.end_frame_fixed(16.0);
        timer.reset();
        assert_relative_eq!(timer.elapsed_time(), 0.0);
        assert_eq!(timer.elapsed_frames(), 0);
        assert_relative_eq!(timer.last_frametime(), 0.0);
    }
}
