//! Game clock.
//!
//! Every timer in the core is measured on this clock, never on wall time.
//! The clock can be paused (elapsed forced to zero) and sped up or slowed
//! down with a multiplier; fractional milliseconds are carried between
//! ticks so slow motion does not lose time.

use serde::{Deserialize, Serialize};

/// Clock time in milliseconds
pub type Millis = i64;

/// Time handed to the simulation for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameTime {
    /// Clock time at the end of this frame
    pub now: Millis,
    /// Clock time that passed since the previous frame
    pub elapsed: Millis,
}

impl FrameTime {
    pub fn new(now: Millis, elapsed: Millis) -> Self {
        Self { now, elapsed }
    }
}

#[derive(Debug, Clone)]
pub struct GameClock {
    now: Millis,
    elapsed: Millis,
    paused: bool,
    speed: f64,
    carry: f64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            now: 0,
            elapsed: 0,
            paused: false,
            speed: 1.0,
            carry: 0.0,
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn elapsed(&self) -> Millis {
        self.elapsed
    }

    pub fn frame_time(&self) -> FrameTime {
        FrameTime::new(self.now, self.elapsed)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn speed(&self) -> f32 {
        self.speed as f32
    }

    /// Set the time multiplier (1.0 = real time, 0.25 = slow motion)
    pub fn set_speed(&mut self, multiplier: f32) {
        assert!(
            multiplier.is_finite() && multiplier >= 0.0,
            "clock speed must be a finite non-negative multiplier, got {multiplier}"
        );
        self.speed = multiplier as f64;
    }

    /// Advance by `real_ms` of real time and return the resulting frame time
    pub fn tick(&mut self, real_ms: f64) -> FrameTime {
        if self.paused {
            self.elapsed = 0;
            return self.frame_time();
        }

        let scaled = real_ms.max(0.0) * self.speed + self.carry;
        let whole = scaled.floor();
        self.carry = scaled - whole;
        self.elapsed = whole as Millis;
        self.now += self.elapsed;
        self.frame_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances_now() {
        let mut clock = GameClock::new();
        let t = clock.tick(16.0);
        assert_eq!(t, FrameTime::new(16, 16));
        let t = clock.tick(17.0);
        assert_eq!(t, FrameTime::new(33, 17));
    }

    #[test]
    fn test_pause_forces_zero_elapsed() {
        let mut clock = GameClock::new();
        clock.tick(100.0);
        clock.pause();
        let t = clock.tick(500.0);
        assert_eq!(t.elapsed, 0);
        assert_eq!(t.now, 100);

        clock.resume();
        let t = clock.tick(10.0);
        assert_eq!(t, FrameTime::new(110, 10));
    }

    #[test]
    fn test_slow_motion_carries_fractions() {
        let mut clock = GameClock::new();
        clock.set_speed(0.25);
        let total: Millis = (0..8).map(|_| clock.tick(10.0).elapsed).sum();
        // 8 frames of 2.5ms
        assert_eq!(total, 20);
        assert_eq!(clock.now(), 20);
    }

    #[test]
    #[should_panic]
    fn test_negative_speed_rejected() {
        GameClock::new().set_speed(-1.0);
    }
}
