#![forbid(unsafe_code)]

//! Interpolation curves.
//!
//! # Invariants
//!
//! 1. Every curve maps `t = 0` to 0 and `t = 1` to 1 (within float error).
//! 2. Inputs outside `[0, 1]` are clamped before evaluation.
//! 3. [`capture_curve`] is continuous at its breakpoint `t = 0.4`.

use std::f64::consts::FRAC_PI_2;

/// Breakpoint between the sine and parabola branches of [`capture_curve`].
const CAPTURE_BREAKPOINT: f32 = 0.4;

/// Touch-follow curve.
///
/// A sine rise that overshoots to roughly 1.098 at `t = 0.4`, followed by a
/// parabola settling back onto 1.0 at `t = 1`.
#[must_use]
pub fn capture_curve(t: f32) -> f32 {
    let t = f64::from(t.clamp(0.0, 1.0));
    let value = if t <= f64::from(CAPTURE_BREAKPOINT) {
        0.55 * (8.0564 * t - FRAC_PI_2).sin() + 0.55
    } else {
        4.0 * (0.417 * t - 0.341).powi(2) - 4.0 * (0.417_f64 - 0.341).powi(2) + 1.0
    };
    value as f32
}

/// Overshoot curve: runs past 1.0 before settling back.
///
/// Larger `tension` overshoots further; zero tension degenerates to an
/// ease-out cubic.
#[must_use]
pub fn overshoot(tension: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * ((tension + 1.0) * t + tension) + 1.0
}

/// Selectable easing for [`super::Tween`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Overshoot with the given tension.
    Overshoot(f32),
    /// The touch-follow curve.
    Capture,
}

impl Easing {
    /// Evaluate the curve at `t`.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => t.clamp(0.0, 1.0),
            Self::Overshoot(tension) => overshoot(tension, t),
            Self::Capture => capture_curve(t),
        }
    }
}
