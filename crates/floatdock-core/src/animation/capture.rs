#![forbid(unsafe_code)]

//! Touch-follow ("capture") animation.
//!
//! Pulls a point from where the curve started toward a moving target using
//! [`capture_curve`]. The target is updated on every pointer sample; the
//! start is only reset by [`Capture::restart`], which happens when the
//! floater switches between following the finger and being pulled onto the
//! trash icon.
//!
//! # Invariants
//!
//! 1. A freshly created capture is saturated: `current()` equals the target,
//!    so the floater tracks the finger directly until the first restart.
//! 2. Once the elapsed time reaches the duration, `current()` equals the
//!    target exactly.

use std::time::Duration;

use super::{Animation, capture_curve};
use crate::geometry::PointF;

/// Default capture duration.
pub const CAPTURE_DURATION: Duration = Duration::from_millis(300);

/// Two-dimensional touch-follow animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    start: PointF,
    target: PointF,
    duration: Duration,
    elapsed: Duration,
}

impl Capture {
    /// Create a saturated capture at `target`.
    #[must_use]
    pub fn new(target: PointF, duration: Duration) -> Self {
        let duration = if duration.is_zero() {
            Duration::from_nanos(1)
        } else {
            duration
        };
        Self {
            start: target,
            target,
            duration,
            elapsed: duration,
        }
    }

    /// Restart the curve from `current`.
    pub fn restart(&mut self, current: PointF) {
        self.start = current;
        self.elapsed = Duration::ZERO;
    }

    /// Move the target without touching the curve's progress.
    pub fn set_target(&mut self, target: PointF) {
        self.target = target;
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> PointF {
        self.target
    }

    /// Elapsed fraction in `[0, 1]`.
    #[must_use]
    pub fn rate(&self) -> f32 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
    }

    /// Position along the curve.
    #[must_use]
    pub fn current(&self) -> PointF {
        if self.is_complete() {
            return self.target;
        }
        let s = capture_curve(self.rate());
        PointF::new(
            self.start.x + (self.target.x - self.start.x) * s,
            self.start.y + (self.target.y - self.start.y) * s,
        )
    }
}

impl Animation for Capture {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        capture_curve(self.rate())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
