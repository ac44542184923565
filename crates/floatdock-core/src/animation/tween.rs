#![forbid(unsafe_code)]

//! Fixed-duration interpolation between two values.
//!
//! # Invariants
//!
//! 1. `current()` equals `from` before the first tick and exactly `to` once
//!    complete, regardless of easing overshoot.
//! 2. A zero duration is clamped to 1ns; the tween completes on its first tick.

use std::time::Duration;

use super::{Animation, Easing};

/// Interpolates `from` → `to` over `duration` with an [`Easing`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    /// Create a linear tween.
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            elapsed: Duration::ZERO,
            easing: Easing::Linear,
        }
    }

    /// Set the easing (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Start value.
    #[inline]
    #[must_use]
    pub fn from(&self) -> f32 {
        self.from
    }

    /// End value.
    #[inline]
    #[must_use]
    pub fn to(&self) -> f32 {
        self.to
    }

    /// Elapsed fraction in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }

    /// Interpolated value at the current time.
    #[must_use]
    pub fn current(&self) -> f32 {
        if self.is_complete() {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(self.progress())
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Returns the eased progress (may exceed 1.0 for overshoot curves).
    fn value(&self) -> f32 {
        self.easing.apply(self.progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn linear_midpoint() {
        let mut tween = Tween::new(0.0, 100.0, Duration::from_millis(200));
        tween.tick(MS_100);
        assert!((tween.current() - 50.0).abs() < 1e-3);
        assert!(!tween.is_complete());
    }

    #[test]
    fn lands_exactly_on_target() {
        let mut tween =
            Tween::new(400.0, 0.0, Duration::from_millis(450)).easing(Easing::Overshoot(1.25));
        for _ in 0..10 {
            tween.tick(MS_100);
        }
        assert!(tween.is_complete());
        assert_eq!(tween.current(), 0.0);
    }

    #[test]
    fn overshoot_passes_target() {
        let mut tween =
            Tween::new(400.0, 0.0, Duration::from_millis(450)).easing(Easing::Overshoot(1.25));
        let mut min_seen = f32::MAX;
        for _ in 0..45 {
            tween.tick(Duration::from_millis(10));
            min_seen = min_seen.min(tween.current());
        }
        assert!(min_seen < 0.0, "overshoot should dip below target: {min_seen}");
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut tween = Tween::new(1.0, 2.0, Duration::ZERO);
        tween.tick(Duration::from_nanos(1));
        assert!(tween.is_complete());
        assert_eq!(tween.current(), 2.0);
    }

    #[test]
    fn reset_rewinds() {
        let mut tween = Tween::new(0.0, 10.0, MS_100);
        tween.tick(MS_100);
        tween.reset();
        assert_eq!(tween.current(), 0.0);
    }
}
