#![forbid(unsafe_code)]

//! Pointer velocity estimation.
//!
//! [`VelocityTracker`] keeps a short history of pointer samples and fits a
//! straight line through the ones inside the horizon (least squares, per
//! axis). The slope is the release velocity in pixels per second.
//!
//! # Invariants
//!
//! 1. At most [`MAX_SAMPLES`] samples are retained.
//! 2. Samples older than [`HORIZON`] relative to the newest are ignored.
//! 3. The estimate is clamped to `±max_velocity` per axis.
//!
//! # Failure Modes
//!
//! - Fewer than two samples, or samples sharing one timestamp, yield `None`.
//! - Timestamps going backwards restart the history at the new sample.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

use crate::geometry::PointF;

/// Samples further back than this from the newest one do not contribute.
pub const HORIZON: Duration = Duration::from_millis(100);

/// History capacity.
pub const MAX_SAMPLES: usize = 20;

/// Least-squares velocity estimator for a single pointer.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<(Instant, PointF)>,
    max_velocity: f32,
}

impl VelocityTracker {
    /// Create a tracker that clamps estimates to `±max_velocity` px/s.
    #[must_use]
    pub fn new(max_velocity: f32) -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_SAMPLES),
            max_velocity: max_velocity.abs(),
        }
    }

    /// Record a pointer sample.
    pub fn add(&mut self, now: Instant, point: PointF) {
        if self
            .samples
            .back()
            .is_some_and(|&(last, _)| now < last)
        {
            self.samples.clear();
        }
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((now, point));
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Current estimate in pixels per second, if one can be made.
    #[must_use]
    pub fn velocity(&self) -> Option<PointF> {
        let &(newest, _) = self.samples.back()?;
        let window: Vec<(f64, PointF)> = self
            .samples
            .iter()
            .filter(|(t, _)| newest.duration_since(*t) <= HORIZON)
            .map(|&(t, p)| (-newest.duration_since(t).as_secs_f64(), p))
            .collect();
        if window.len() < 2 {
            return None;
        }

        let n = window.len() as f64;
        let mean_t = window.iter().map(|(t, _)| t).sum::<f64>() / n;
        let mean_x = window.iter().map(|(_, p)| f64::from(p.x)).sum::<f64>() / n;
        let mean_y = window.iter().map(|(_, p)| f64::from(p.y)).sum::<f64>() / n;

        let mut var_t = 0.0;
        let mut cov_x = 0.0;
        let mut cov_y = 0.0;
        for (t, p) in &window {
            let dt = t - mean_t;
            var_t += dt * dt;
            cov_x += dt * (f64::from(p.x) - mean_x);
            cov_y += dt * (f64::from(p.y) - mean_y);
        }
        if var_t <= f64::EPSILON {
            return None;
        }

        let max = self.max_velocity;
        Some(PointF::new(
            ((cov_x / var_t) as f32).clamp(-max, max),
            ((cov_y / var_t) as f32).clamp(-max, max),
        ))
    }

    /// Read the estimate once and clear the history.
    pub fn take(&mut self) -> Option<PointF> {
        let velocity = self.velocity();
        self.clear();
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_10: Duration = Duration::from_millis(10);

    #[test]
    fn constant_motion_is_recovered() {
        let mut tracker = VelocityTracker::new(10_000.0);
        let t = Instant::now();
        for i in 0..6 {
            tracker.add(t + MS_10 * i, PointF::new(100.0 + 10.0 * i as f32, 50.0));
        }
        let v = tracker.velocity().expect("two or more samples");
        assert!((v.x - 1000.0).abs() < 1.0, "vx {}", v.x);
        assert!(v.y.abs() < 1e-3);
    }

    #[test]
    fn single_sample_has_no_estimate() {
        let mut tracker = VelocityTracker::new(10_000.0);
        tracker.add(Instant::now(), PointF::new(0.0, 0.0));
        assert!(tracker.velocity().is_none());
    }

    #[test]
    fn stale_samples_are_ignored() {
        let mut tracker = VelocityTracker::new(10_000.0);
        let t = Instant::now();
        tracker.add(t, PointF::new(0.0, 0.0));
        tracker.add(t + Duration::from_millis(500), PointF::new(400.0, 0.0));
        assert!(tracker.velocity().is_none());
    }

    #[test]
    fn estimate_is_clamped() {
        let mut tracker = VelocityTracker::new(2000.0);
        let t = Instant::now();
        tracker.add(t, PointF::new(0.0, 0.0));
        tracker.add(t + MS_10, PointF::new(-500.0, 0.0));
        let v = tracker.velocity().expect("estimate");
        assert_eq!(v.x, -2000.0);
    }

    #[test]
    fn take_reads_once() {
        let mut tracker = VelocityTracker::new(10_000.0);
        let t = Instant::now();
        tracker.add(t, PointF::new(0.0, 0.0));
        tracker.add(t + MS_10, PointF::new(10.0, 0.0));
        assert!(tracker.take().is_some());
        assert!(tracker.take().is_none());
    }

    #[test]
    fn capacity_is_bounded() {
        let mut tracker = VelocityTracker::new(10_000.0);
        let t = Instant::now();
        for i in 0..50 {
            tracker.add(t + Duration::from_millis(i), PointF::new(i as f32, 0.0));
        }
        assert_eq!(tracker.len(), MAX_SAMPLES);
    }
}
