//! Phase-driven animation helpers

use super::math::constants::{PI, TAU};

/// Oscillates a value between a minimum and a maximum.
///
/// The phase advances with frametime at a configured frequency (full cycles
/// per second) and wraps at one full turn. [`cosine_eased`](Self::cosine_eased)
/// maps the current phase onto the configured range with cosine easing, which
/// gives smooth turnarounds at both ends. Completed half cycles are counted
/// so callers can react to direction changes.
pub struct Scaler {
    phase: f32,
    phase_dir: f32,
    min_value: f32,
    max_value: f32,
    range: f32,
    freq: f32,
    // Frequency scaled for millisecond frametimes, cached on set.
    freq_per_ms: f32,
    phasetime: f32,
    last_cycle_time: f32,
    half_cycles: u32,
    half_cycle_completed: bool,
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scaler {
    /// Create a scaler over the range 0..1 at 1 Hz
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            phase_dir: 1.0,
            min_value: 0.0,
            max_value: 1.0,
            range: 1.0,
            freq: 1.0,
            freq_per_ms: 1.0 / 1000.0,
            phasetime: 0.0,
            last_cycle_time: 0.0,
            half_cycles: 0,
            half_cycle_completed: false,
        }
    }

    /// Advance the phase by a frametime in milliseconds, returning the new phase.
    ///
    /// Wraps back to zero after a full turn and counts half cycles as the
    /// phase passes the half and full turn marks.
    pub fn inc_phase(&mut self, frametime: f32) -> f32 {
        self.phase += self.phase_dir * (TAU * self.freq_per_ms) * frametime;
        self.phasetime += frametime;

        if self.phase > PI && !self.half_cycle_completed {
            self.half_cycles += 1;
            self.half_cycle_completed = true;
        }

        if self.phase > TAU {
            self.last_cycle_time = self.phasetime;
            self.phasetime = 0.0;
            self.phase = 0.0;
            self.half_cycles += 1;
            self.half_cycle_completed = false;
        }

        self.phase
    }

    /// Cosine eased value of the current phase, mapped into min..max
    pub fn cosine_eased(&self) -> f32 {
        let easing = (-self.phase.cos() / 2.0) + 0.5;
        self.min_value + easing * self.range
    }

    /// Set the value range the phase maps onto
    pub fn set_range(&mut self, min_value: f32, max_value: f32) {
        self.min_value = min_value;
        self.max_value = max_value;
        self.range = (max_value - min_value).abs();
    }

    /// Set the oscillation frequency in full cycles per second
    pub fn set_freq(&mut self, freq: f32) {
        self.freq = freq;
        self.freq_per_ms = freq / 1000.0;
    }

    /// Oscillation frequency in full cycles per second
    pub fn freq(&self) -> f32 {
        self.freq
    }

    /// Lower end of the value range
    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    /// Upper end of the value range
    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Current phase in radians
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Set the current phase in radians
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase;
    }

    /// Invert the direction the phase travels in, returning the new direction
    pub fn invert_direction(&mut self) -> f32 {
        self.phase_dir = -self.phase_dir;
        self.phase_dir
    }

    /// Number of completed half cycles
    pub fn half_cycles(&self) -> u32 {
        self.half_cycles
    }

    /// Reset the half cycle counter
    pub fn reset_cycles(&mut self) {
        self.half_cycles = 0;
    }

    /// Duration of the last completed full cycle, in milliseconds
    pub fn last_cycle_time(&self) -> f32 {
        self.last_cycle_time
    }

    /// Reset phase, timers and cycle counters
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.phasetime = 0.0;
        self.last_cycle_time = 0.0;
        self.half_cycles = 0;
        self.half_cycle_completed = false;
    }
}
