//! Simulation time.
//!
//! Scene time is integer microseconds so that advancing by a fixed step never
//! drifts. Gameplay code reads it in whole milliseconds (`now_ms`), which is
//! the unit every cooldown and scheduled event uses.
//!
//! `FrameClock` is the wall-clock side: it feeds real frame deltas into an
//! accumulator and reports how many fixed steps the host should run.

use std::time::Instant;

/// 60 Hz.
pub const DEFAULT_FIXED_DT_US: u64 = 16_667;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimClock {
    fixed_dt_us: u64,
    elapsed_us: u64,
    step_count: u64,
}

impl SimClock {
    pub fn new(fixed_dt_us: u64) -> Self {
        Self {
            fixed_dt_us: fixed_dt_us.max(1),
            elapsed_us: 0,
            step_count: 0,
        }
    }

    pub fn from_ms(fixed_dt_ms: u64) -> Self {
        Self::new(fixed_dt_ms.saturating_mul(1000))
    }

    pub fn advance(&mut self) {
        self.elapsed_us += self.fixed_dt_us;
        self.step_count += 1;
    }

    pub fn now_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }

    pub fn dt_secs(&self) -> f32 {
        self.fixed_dt_us as f32 / 1_000_000.0
    }

    pub fn fixed_dt_us(&self) -> u64 {
        self.fixed_dt_us
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_DT_US)
    }
}

pub struct FrameClock {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
}

impl FrameClock {
    pub fn new(fixed_dt_us: u64) -> Self {
        Self {
            fixed_dt: fixed_dt_us as f64 / 1_000_000.0,
            max_accumulator: 0.25,
            accumulator: 0.0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.feed(real_dt);
    }

    /// Feeds an externally measured frame delta.
    pub fn feed(&mut self, real_dt: f64) {
        self.real_dt = real_dt.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.fixed_dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_DT_US)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_clock_advances_in_whole_steps() {
        let mut clock = SimClock::from_ms(16);
        for _ in 0..10 {
            clock.advance();
        }
        assert_eq!(clock.now_ms(), 160);
        assert_eq!(clock.step_count(), 10);
        assert!((clock.dt_secs() - 0.016).abs() < 1e-6);
    }

    #[test]
    fn default_clock_reaches_one_second_after_sixty_steps() {
        let mut clock = SimClock::default();
        for _ in 0..60 {
            clock.advance();
        }
        assert_eq!(clock.now_ms(), 1000);
    }

    #[test]
    fn frame_clock_runs_expected_step_count() {
        let mut clock = FrameClock::new(10_000);
        clock.feed(0.035);
        let mut steps = 0;
        while clock.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!(clock.interpolation_alpha() > 0.4 && clock.interpolation_alpha() < 0.6);
    }

    #[test]
    fn frame_clock_caps_long_frames() {
        let mut clock = FrameClock::new(62_500);
        clock.feed(5.0);
        let mut steps = 0;
        while clock.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 4);
    }
}
