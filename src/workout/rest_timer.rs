// ABOUTME: Rest interval countdown between sets with user adjustments
// ABOUTME: Fixed-interval tick driven by the caller, no drift correction
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Liftlog Project

use crate::constants::limits;

/// Countdown between sets.
///
/// The timer does not own a clock: the caller ticks it once per second
/// (matching the product's fixed-interval tick, drift not corrected).
/// Adjustments change the duration and restart the countdown; the duration
/// never goes below [`limits::REST_FLOOR_SECS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTimer {
    duration_secs: u32,
    remaining_secs: u32,
    running: bool,
}

impl RestTimer {
    /// Create a stopped timer with the given duration (floored)
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        let duration_secs = duration_secs.max(limits::REST_FLOOR_SECS);
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            running: false,
        }
    }

    /// Restart the countdown from the full duration
    pub fn start(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.running = true;
    }

    /// Halt the countdown without resetting it
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance one second; returns `true` when the countdown just expired
    pub fn tick(&mut self) -> bool {
        if !self.running || self.remaining_secs == 0 {
            return false;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Adjust the duration by `delta_secs` (floored) and restart the
    /// countdown at the new duration
    pub fn adjust(&mut self, delta_secs: i64) {
        let adjusted = i64::from(self.duration_secs) + delta_secs;
        let floored = adjusted.max(i64::from(limits::REST_FLOOR_SECS));
        self.duration_secs = u32::try_from(floored).unwrap_or(limits::REST_FLOOR_SECS);
        self.remaining_secs = self.duration_secs;
    }

    /// Seconds left on the countdown
    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Configured rest duration
    #[must_use]
    pub const fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Whether the countdown is running
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Elapsed fraction of the countdown, 0.0..=1.0, for progress displays
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        f64::from(self.duration_secs - self.remaining_secs) / f64::from(self.duration_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_expiry() {
        let mut timer = RestTimer::new(12);
        timer.start();
        for _ in 0..11 {
            assert!(!timer.tick());
        }
        assert!(timer.tick());
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn tick_is_inert_when_stopped() {
        let mut timer = RestTimer::new(30);
        assert!(!timer.tick());
        assert_eq!(timer.remaining_secs(), 30);
    }

    #[test]
    fn adjustments_restart_at_new_duration() {
        let mut timer = RestTimer::new(90);
        timer.start();
        timer.tick();
        timer.adjust(30);
        assert_eq!(timer.duration_secs(), 120);
        assert_eq!(timer.remaining_secs(), 120);
    }

    #[test]
    fn duration_never_drops_below_floor() {
        let mut timer = RestTimer::new(20);
        timer.adjust(-60);
        assert_eq!(timer.duration_secs(), limits::REST_FLOOR_SECS);

        let floored = RestTimer::new(3);
        assert_eq!(floored.duration_secs(), limits::REST_FLOOR_SECS);
    }
}
