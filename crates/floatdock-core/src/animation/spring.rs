#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) animation in pixel space.
//!
//! Based on the classical damped spring equation with unit mass:
//!
//!   a = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! - **stiffness** (k): Restoring force strength. Higher = faster response.
//! - **damping ratio** (ζ): Fraction of critical damping. The damping
//!   coefficient is derived as `c = 2ζ√k`.
//!   - ζ < 1: oscillates past the target before settling
//!   - ζ = 1: fastest convergence without overshoot
//! - **start velocity**: pixels per second, typically a release velocity.
//!
//! # Integration
//!
//! Semi-implicit Euler, subdivided into steps of at most 4ms so a dropped
//! frame cannot destabilize a stiff spring.
//!
//! # Invariants
//!
//! 1. Once at rest, the position equals the target exactly and the velocity
//!    is zero.
//! 2. A spring at rest does not move again unless retargeted or given an
//!    impulse.
//! 3. Stiffness is always positive (clamped on construction).

use std::time::Duration;

use super::Animation;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Position delta (pixels) below which the spring may settle.
const DEFAULT_REST_THRESHOLD: f64 = 0.5;

/// Velocity (pixels/second) below which the spring may settle.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 5.0;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Common damping ratios.
pub mod damping_ratio {
    pub const HIGH_BOUNCY: f32 = 0.2;
    pub const MEDIUM_BOUNCY: f32 = 0.5;
    pub const LOW_BOUNCY: f32 = 0.75;
    pub const NO_BOUNCY: f32 = 1.0;
}

/// Common stiffness values.
pub mod stiffness {
    pub const HIGH: f32 = 10_000.0;
    pub const MEDIUM: f32 = 1_500.0;
    pub const LOW: f32 = 200.0;
    pub const VERY_LOW: f32 = 50.0;
}

/// A damped spring moving a single coordinate toward a target.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    initial_velocity: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring starting at `initial` and targeting `target`.
    ///
    /// Defaults to medium stiffness with no bounce.
    #[must_use]
    pub fn new(initial: f32, target: f32) -> Self {
        let k = f64::from(stiffness::MEDIUM);
        Self {
            position: f64::from(initial),
            velocity: 0.0,
            target: f64::from(target),
            initial: f64::from(initial),
            initial_velocity: 0.0,
            stiffness: k,
            damping: 2.0 * k.sqrt(),
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    /// Set stiffness, keeping the current damping ratio (builder pattern).
    #[must_use]
    pub fn with_stiffness(mut self, k: f32) -> Self {
        let ratio = self.damping_ratio();
        self.stiffness = f64::from(k).max(MIN_STIFFNESS);
        self.damping = 2.0 * ratio * self.stiffness.sqrt();
        self
    }

    /// Set the damping ratio ζ (builder pattern). Clamped to minimum 0.0.
    #[must_use]
    pub fn with_damping_ratio(mut self, ratio: f32) -> Self {
        self.damping = 2.0 * f64::from(ratio.max(0.0)) * self.stiffness.sqrt();
        self
    }

    /// Set the initial velocity in pixels per second (builder pattern).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = f64::from(velocity);
        self.initial_velocity = self.velocity;
        self
    }

    /// Set rest thresholds for position and velocity (builder pattern).
    #[must_use]
    pub fn with_rest_thresholds(mut self, position: f32, velocity: f32) -> Self {
        self.rest_threshold = f64::from(position.abs());
        self.velocity_threshold = f64::from(velocity.abs());
        self
    }

    /// Current position (unclamped).
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

    /// Current target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f32 {
        self.target as f32
    }

    /// Stiffness parameter.
    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f32 {
        self.stiffness as f32
    }

    /// Damping ratio ζ derived from the damping coefficient.
    #[must_use]
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * self.stiffness.sqrt())
    }

    /// Change the target. Wakes the spring if it was at rest.
    pub fn set_target(&mut self, target: f32) {
        let target = f64::from(target);
        if (self.target - target).abs() > f64::EPSILON {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Apply an impulse (add to velocity). Wakes the spring.
    pub fn impulse(&mut self, velocity_delta: f32) {
        self.velocity += f64::from(velocity_delta);
        self.at_rest = false;
    }

    /// Whether the spring has settled at the target.
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance the spring by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }

        let total_secs = dt.as_secs_f64();
        if total_secs <= 0.0 {
            return;
        }

        let mut remaining = total_secs;
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }

        let pos_delta = (self.position - self.target).abs();
        if pos_delta < self.rest_threshold && self.velocity.abs() < self.velocity_threshold {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    /// Returns the raw position.
    fn value(&self) -> f32 {
        self.position as f32
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = self.initial_velocity;
        self.at_rest = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_10: Duration = Duration::from_millis(10);

    fn simulate(spring: &mut Spring, frames: usize) {
        for _ in 0..frames {
            spring.tick(MS_10);
        }
    }

    #[test]
    fn spring_reaches_target() {
        let mut spring = Spring::new(400.0, 0.0)
            .with_stiffness(350.0)
            .with_damping_ratio(0.7);

        simulate(&mut spring, 300);

        assert!(spring.is_complete());
        assert_eq!(spring.position(), 0.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn damping_ratio_survives_stiffness_change() {
        let spring = Spring::new(0.0, 1.0)
            .with_damping_ratio(0.7)
            .with_stiffness(350.0);
        assert!((spring.damping_ratio() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn underdamped_spring_overshoots() {
        let mut spring = Spring::new(0.0, 100.0)
            .with_stiffness(stiffness::LOW)
            .with_damping_ratio(damping_ratio::HIGH_BOUNCY);
        let mut max_seen = 0.0_f32;
        for _ in 0..200 {
            spring.tick(MS_10);
            max_seen = max_seen.max(spring.position());
        }
        assert!(max_seen > 100.0, "max {max_seen}");
    }

    #[test]
    fn critically_damped_spring_does_not_overshoot() {
        let mut spring = Spring::new(0.0, 100.0)
            .with_stiffness(350.0)
            .with_damping_ratio(damping_ratio::NO_BOUNCY);
        for _ in 0..300 {
            spring.tick(MS_10);
            assert!(spring.position() <= 100.0 + 0.5);
        }
    }

    #[test]
    fn initial_velocity_carries_through_target() {
        let mut spring = Spring::new(0.0, 0.0)
            .with_stiffness(350.0)
            .with_damping_ratio(0.7)
            .with_velocity(2000.0);
        spring.tick(Duration::from_millis(30));
        assert!(spring.position() > 10.0);
    }

    #[test]
    fn large_dt_stays_stable() {
        let mut spring = Spring::new(0.0, 500.0)
            .with_stiffness(stiffness::HIGH)
            .with_damping_ratio(damping_ratio::NO_BOUNCY);
        spring.tick(Duration::from_secs(2));
        assert!(spring.position().is_finite());
        assert!((spring.position() - 500.0).abs() < 1.0);
    }

    #[test]
    fn rest_spring_wakes_on_retarget() {
        let mut spring = Spring::new(0.0, 10.0).with_stiffness(350.0);
        simulate(&mut spring, 300);
        assert!(spring.is_at_rest());
        spring.set_target(20.0);
        assert!(!spring.is_at_rest());
        spring.reset();
        assert_eq!(spring.position(), 0.0);
    }
}
