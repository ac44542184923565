#![forbid(unsafe_code)]

//! Friction-decayed fling bounded to a range.
//!
//! The velocity decays exponentially, `v(t) = v₀·e^(−4.2·friction·t)`, and the
//! position is its closed-form integral, so arbitrary frame gaps produce the
//! same trajectory as a steady 60 Hz cadence.
//!
//! # Invariants
//!
//! 1. The position never leaves `[min, max]`; touching a bound ends the fling.
//! 2. The fling ends once the speed drops below the velocity threshold.
//! 3. A start position outside the bounds is clamped on construction.

use std::time::Duration;

use super::Animation;

/// Friction scale applied to the user-facing friction value.
const FRICTION_SCALE: f64 = -4.2;

/// Velocity threshold multiplier relative to a one-pixel visible change.
const VELOCITY_THRESHOLD_MULTIPLIER: f64 = 1000.0 / 16.0;

/// Smallest visible change in pixel space.
const MIN_VISIBLE_CHANGE_PIXELS: f64 = 1.0;

/// A bounded fling along one axis.
#[derive(Debug, Clone)]
pub struct Fling {
    position: f64,
    velocity: f64,
    initial: (f64, f64),
    friction: f64,
    min: f64,
    max: f64,
    velocity_threshold: f64,
    finished: bool,
}

impl Fling {
    /// Create a fling starting at `start` with `velocity` pixels per second.
    ///
    /// Friction defaults to 1.0 and the range is unbounded.
    #[must_use]
    pub fn new(start: f32, velocity: f32) -> Self {
        let position = f64::from(start);
        let velocity = f64::from(velocity);
        Self {
            position,
            velocity,
            initial: (position, velocity),
            friction: FRICTION_SCALE,
            min: f64::MIN,
            max: f64::MAX,
            velocity_threshold: MIN_VISIBLE_CHANGE_PIXELS * VELOCITY_THRESHOLD_MULTIPLIER,
            finished: false,
        }
    }

    /// Set the friction (builder pattern). Non-positive values fall back to 1.0.
    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        let friction = if friction > 0.0 { friction } else { 1.0 };
        self.friction = f64::from(friction) * FRICTION_SCALE;
        self
    }

    /// Bound the fling to `[min, max]` (builder pattern).
    #[must_use]
    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        let (min, max) = (f64::from(min), f64::from(max.max(min)));
        self.min = min;
        self.max = max;
        self.position = self.position.clamp(min, max);
        self.initial.0 = self.position;
        self
    }

    /// Current position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> f32 {
        self.position as f32
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity as f32
    }

    /// Lower and upper bound.
    #[must_use]
    pub fn bounds(&self) -> (f32, f32) {
        (self.min as f32, self.max as f32)
    }

    /// Where the fling would come to rest if unbounded.
    #[must_use]
    pub fn projected_end(&self) -> f32 {
        (self.position - self.velocity / self.friction) as f32
    }

    fn advance(&mut self, dt: Duration) {
        if self.finished {
            return;
        }
        let secs = dt.as_secs_f64();
        if secs <= 0.0 {
            return;
        }

        let decay = (self.friction * secs).exp();
        let velocity = self.velocity * decay;
        let position = self.position - self.velocity / self.friction
            + self.velocity / self.friction * decay;

        self.velocity = velocity;
        self.position = position;

        if self.position <= self.min || self.position >= self.max {
            self.position = self.position.clamp(self.min, self.max);
            self.velocity = 0.0;
            self.finished = true;
        } else if self.velocity.abs() < self.velocity_threshold {
            self.velocity = 0.0;
            self.finished = true;
        }
    }
}

impl Animation for Fling {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.finished
    }

    fn value(&self) -> f32 {
        self.position as f32
    }

    fn reset(&mut self) {
        (self.position, self.velocity) = self.initial;
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_10: Duration = Duration::from_millis(10);

    fn run(fling: &mut Fling) {
        for _ in 0..1000 {
            if fling.is_complete() {
                break;
            }
            fling.tick(MS_10);
        }
    }

    #[test]
    fn decelerates_to_rest() {
        let mut fling = Fling::new(100.0, 800.0).with_friction(1.7);
        let projected = fling.projected_end();
        run(&mut fling);
        assert!(fling.is_complete());
        assert!(fling.position() > 100.0);
        assert!(fling.position() <= projected + 0.5);
    }

    #[test]
    fn stops_at_bound() {
        let mut fling = Fling::new(100.0, 5000.0)
            .with_friction(1.7)
            .with_bounds(0.0, 200.0);
        run(&mut fling);
        assert!(fling.is_complete());
        assert_eq!(fling.position(), 200.0);
    }

    #[test]
    fn negative_velocity_hits_lower_bound() {
        let mut fling = Fling::new(50.0, -5000.0)
            .with_friction(1.7)
            .with_bounds(0.0, 200.0);
        run(&mut fling);
        assert_eq!(fling.position(), 0.0);
    }

    #[test]
    fn frame_gaps_do_not_change_trajectory() {
        let mut steady = Fling::new(0.0, 600.0).with_friction(1.7);
        let mut gappy = steady.clone();
        for _ in 0..10 {
            steady.tick(MS_10);
        }
        gappy.tick(Duration::from_millis(100));
        assert!((steady.position() - gappy.position()).abs() < 1e-3);
    }

    #[test]
    fn slow_fling_finishes_immediately() {
        let mut fling = Fling::new(10.0, 20.0).with_friction(1.7);
        fling.tick(MS_10);
        assert!(fling.is_complete());
    }

    #[test]
    fn start_outside_bounds_is_clamped() {
        let fling = Fling::new(-50.0, 0.0).with_bounds(0.0, 100.0);
        assert_eq!(fling.position(), 0.0);
    }
}
