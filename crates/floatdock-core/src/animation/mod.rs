#![forbid(unsafe_code)]

//! Animation primitives.
//!
//! Every animator here is driven by explicit time deltas, never by a wall
//! clock, so a host can replay a gesture deterministically:
//!
//! - [`Capture`]: the touch-follow curve that pulls a floater toward the
//!   pointer (or toward the trash icon).
//! - [`Tween`]: fixed-duration interpolation between two values.
//! - [`Spring`]: damped harmonic oscillator toward a target.
//! - [`Fling`]: friction-decayed motion bounded by a range.
//!
//! All of them implement [`Animation`].

pub mod capture;
pub mod easing;
pub mod fling;
pub mod spring;
pub mod tween;

use std::time::Duration;

pub use capture::Capture;
pub use easing::{Easing, capture_curve, overshoot};
pub use fling::Fling;
pub use spring::Spring;
pub use tween::Tween;

/// Common contract for time-driven animations.
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation reached its end state.
    fn is_complete(&self) -> bool;

    /// Current output value.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);
}
