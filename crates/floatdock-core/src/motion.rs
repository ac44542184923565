#![forbid(unsafe_code)]

//! Per-floater motion: touch-follow, edge snap and release physics.
//!
//! A floater is driven by at most one [`Animator`] at a time. The variant
//! decides which axes it writes:
//!
//! - [`Animator::TouchFollow`] writes both axes while the pointer is down.
//! - [`Animator::EdgeTween`] runs a fixed-duration overshoot tween to the
//!   rest goal after a release without physics.
//! - [`Animator::Physics`] runs one spring or fling per axis after a
//!   release with physics.
//!
//! [`Motion`] owns the active animator and converts wall-clock instants into
//! the `dt` each animator consumes.
//!
//! # Invariants
//!
//! 1. At most one animator writes each axis at any instant.
//! 2. Starting any animator replaces the previous one.
//! 3. Every rest goal lies inside the position limit it was computed for.
//! 4. A zero-width position limit pins the goal to `left`.
//!
//! # Failure Modes
//!
//! - A release with physics requested but no velocity sample falls back to
//!   the edge tween.

use std::time::Duration;

use web_time::Instant;

use crate::animation::capture::CAPTURE_DURATION;
use crate::animation::spring::{damping_ratio, stiffness};
use crate::animation::{Animation, Capture, Easing, Fling, Spring, Tween};
use crate::geometry::{Limits, Point, PointF, Rect};
use crate::logging::{debug, trace};

/// Edge-snap policy of a floater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveDirection {
    /// Snap to the nearer horizontal edge.
    #[default]
    Default,
    /// Always snap to the left edge.
    Left,
    /// Always snap to the right edge.
    Right,
    /// Never snap.
    None,
    /// Snap to the nearest of all four edges.
    Nearest,
    /// Snap toward the throw direction, or like `Default` for slow releases.
    Thrown,
}

impl MoveDirection {
    /// Map an integer code; unknown codes are `Default`.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Left,
            2 => Self::Right,
            3 => Self::None,
            4 => Self::Nearest,
            5 => Self::Thrown,
            _ => Self::Default,
        }
    }

    /// Integer code of this direction.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Default => 0,
            Self::Left => 1,
            Self::Right => 2,
            Self::None => 3,
            Self::Nearest => 4,
            Self::Thrown => 5,
        }
    }

    /// Map a case-insensitive name; unknown names are `Default`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => Self::Left,
            "right" => Self::Right,
            "none" => Self::None,
            "nearest" => Self::Nearest,
            "thrown" => Self::Thrown,
            _ => Self::Default,
        }
    }

    /// Lowercase name, the inverse of [`Self::from_name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
            Self::Nearest => "nearest",
            Self::Thrown => "thrown",
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MoveDirection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Accepts either a name (`"left"`) or an integer code (`1`).
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MoveDirection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(i64),
            Name(String),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Code(code) => Self::from_code(i32::try_from(code).unwrap_or(-1)),
            Repr::Name(name) => Self::from_name(&name),
        })
    }
}

/// Spring parameters for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub damping_ratio: f32,
    pub stiffness: f32,
}

/// Motion tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// Touch-follow curve duration.
    pub capture_duration: Duration,
    /// Edge tween duration.
    pub edge_duration: Duration,
    /// Overshoot tension of the edge tween.
    pub edge_tension: f32,
    /// Maximum release velocity (pixels/second).
    pub max_fling_velocity: f32,
    /// Horizontal spring.
    pub spring_x: SpringParams,
    /// Vertical spring.
    pub spring_y: SpringParams,
    /// Friction of both flings.
    pub fling_friction: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            capture_duration: CAPTURE_DURATION,
            edge_duration: Duration::from_millis(450),
            edge_tension: 1.25,
            max_fling_velocity: 8000.0,
            spring_x: SpringParams {
                damping_ratio: 0.7,
                stiffness: 350.0,
            },
            spring_y: SpringParams {
                damping_ratio: damping_ratio::LOW_BOUNCY,
                stiffness: stiffness::LOW,
            },
            fling_friction: 1.7,
        }
    }
}

impl MotionConfig {
    /// Horizontal throw threshold and fling clamp. Never negative.
    #[must_use]
    pub fn throw_threshold(&self) -> f32 {
        self.fling_speed() / 9.0
    }

    /// Vertical fling clamp. Never negative.
    #[must_use]
    pub fn vertical_fling_limit(&self) -> f32 {
        self.fling_speed() / 8.0
    }

    /// Magnitude of the maximum fling velocity; NaN counts as zero.
    fn fling_speed(&self) -> f32 {
        let v = self.max_fling_velocity.abs();
        if v.is_nan() { 0.0 } else { v }
    }
}

/// Compute the rest goal for an anchor released at `start`.
///
/// `velocity` is in anchor space (y grows upward) and only matters for
/// [`MoveDirection::Thrown`].
#[must_use]
pub fn goal(
    start: Point,
    direction: MoveDirection,
    limit: &Rect,
    velocity: Option<PointF>,
    throw_threshold: f32,
) -> Point {
    let nearer_x = |x: i32| {
        if x > limit.left + limit.width() / 2 {
            limit.right
        } else {
            limit.left
        }
    };
    let nearer_y = |y: i32| {
        if y > limit.top + limit.height() / 2 {
            limit.bottom
        } else {
            limit.top
        }
    };

    let (x, y) = match direction {
        MoveDirection::Default => (nearer_x(start.x), start.y),
        MoveDirection::Left => (limit.left, start.y),
        MoveDirection::Right => (limit.right, start.y),
        MoveDirection::None => (start.x, start.y),
        MoveDirection::Nearest => {
            let dx = (start.x - limit.left).min(limit.right - start.x);
            let dy = (start.y - limit.top).min(limit.bottom - start.y);
            if dx < dy {
                (nearer_x(start.x), start.y)
            } else {
                (start.x, nearer_y(start.y))
            }
        }
        MoveDirection::Thrown => {
            let vx = velocity.map_or(0.0, |v| v.x);
            if vx > throw_threshold {
                (limit.right, start.y)
            } else if vx < -throw_threshold {
                (limit.left, start.y)
            } else {
                (nearer_x(start.x), start.y)
            }
        }
    };
    limit.clamp(Point::new(x, y))
}

/// Output of one animator step. `None` leaves that axis untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Step {
    pub x: Option<f32>,
    pub y: Option<f32>,
    /// The animator finished with this step.
    pub done: bool,
}

/// Release dynamics on one axis.
#[derive(Debug, Clone)]
pub enum AxisPhysics {
    Spring(Spring),
    Fling(Fling),
}

impl AxisPhysics {
    fn as_animation(&mut self) -> &mut dyn Animation {
        match self {
            Self::Spring(spring) => spring,
            Self::Fling(fling) => fling,
        }
    }

    fn value(&self) -> f32 {
        match self {
            Self::Spring(spring) => spring.value(),
            Self::Fling(fling) => fling.value(),
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            Self::Spring(spring) => spring.is_complete(),
            Self::Fling(fling) => fling.is_complete(),
        }
    }

    #[must_use]
    pub fn is_spring(&self) -> bool {
        matches!(self, Self::Spring(_))
    }

    #[must_use]
    pub fn is_fling(&self) -> bool {
        matches!(self, Self::Fling(_))
    }
}

/// The one animator driving a floater.
#[derive(Debug, Clone)]
pub enum Animator {
    TouchFollow(Capture),
    EdgeTween { x: Tween, y: Tween },
    Physics { x: AxisPhysics, y: AxisPhysics },
}

impl Animator {
    /// Advance by `dt` and report the new axis values.
    pub fn tick(&mut self, dt: Duration) -> Step {
        match self {
            Self::TouchFollow(capture) => {
                capture.tick(dt);
                let p = capture.current();
                Step {
                    x: Some(p.x),
                    y: Some(p.y),
                    done: false,
                }
            }
            Self::EdgeTween { x, y } => {
                x.tick(dt);
                y.tick(dt);
                Step {
                    x: Some(x.current()),
                    y: Some(y.current()),
                    done: x.is_complete() && y.is_complete(),
                }
            }
            Self::Physics { x, y } => {
                let step_x = (!x.is_complete()).then(|| {
                    x.as_animation().tick(dt);
                    x.value()
                });
                let step_y = (!y.is_complete()).then(|| {
                    y.as_animation().tick(dt);
                    y.value()
                });
                Step {
                    x: step_x,
                    y: step_y,
                    done: x.is_complete() && y.is_complete(),
                }
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TouchFollow(_) => "touch_follow",
            Self::EdgeTween { .. } => "edge_tween",
            Self::Physics { .. } => "physics",
        }
    }
}

/// Inputs to [`Motion::release`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseParams {
    /// Anchor implied by the last pointer sample.
    pub start: Point,
    pub direction: MoveDirection,
    pub use_physics: bool,
    /// Release velocity in anchor space.
    pub velocity: Option<PointF>,
}

/// How a release was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePlan {
    /// Already at the goal; nothing animates.
    AtRest(Point),
    /// Overshoot tween toward the goal.
    EdgeTween(Point),
    /// Spring or fling per axis; the goal is only known when both axes spring.
    Physics(Option<Point>),
}

/// Active animator plus its clock.
#[derive(Debug, Clone)]
pub struct Motion {
    config: MotionConfig,
    animator: Option<Animator>,
    goal: Option<Point>,
    last_tick: Option<Instant>,
}

impl Motion {
    #[must_use]
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            animator: None,
            goal: None,
            last_tick: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Stop whatever is running.
    pub fn cancel(&mut self) {
        if let Some(_animator) = self.animator.take() {
            trace!(target: "floatdock.motion", animator = _animator.name(), "cancelled");
        }
        self.goal = None;
        self.last_tick = None;
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.animator.is_some()
    }

    #[inline]
    #[must_use]
    pub fn animator(&self) -> Option<&Animator> {
        self.animator.as_ref()
    }

    #[must_use]
    pub fn is_touch_following(&self) -> bool {
        matches!(self.animator, Some(Animator::TouchFollow(_)))
    }

    /// Rest goal of the running release, when known.
    #[inline]
    #[must_use]
    pub fn goal(&self) -> Option<Point> {
        self.goal
    }

    /// Begin following the pointer from `anchor`.
    pub fn start_touch_follow(&mut self, anchor: PointF, now: Instant) {
        self.begin(
            Animator::TouchFollow(Capture::new(anchor, self.config.capture_duration)),
            None,
            now,
        );
    }

    /// Move the touch-follow target. No-op for other animators.
    pub fn follow(&mut self, target: PointF) {
        if let Some(Animator::TouchFollow(capture)) = &mut self.animator {
            capture.set_target(target);
        }
    }

    /// Restart the touch-follow curve from `current`. No-op for other animators.
    pub fn restart_follow(&mut self, current: PointF) {
        if let Some(Animator::TouchFollow(capture)) = &mut self.animator {
            capture.restart(current);
        }
    }

    /// Current touch-follow position, if following.
    #[must_use]
    pub fn follow_position(&self) -> Option<PointF> {
        match &self.animator {
            Some(Animator::TouchFollow(capture)) => Some(capture.current()),
            _ => None,
        }
    }

    /// Tween from `from` to `goal` with the edge curve.
    pub fn tween_to(&mut self, from: Point, goal: Point, now: Instant) -> ReleasePlan {
        if from == goal {
            self.cancel();
            return ReleasePlan::AtRest(goal);
        }
        let make = |a: i32, b: i32| {
            Tween::new(a as f32, b as f32, self.config.edge_duration)
                .easing(Easing::Overshoot(self.config.edge_tension))
        };
        let animator = Animator::EdgeTween {
            x: make(from.x, goal.x),
            y: make(from.y, goal.y),
        };
        self.begin(animator, Some(goal), now);
        ReleasePlan::EdgeTween(goal)
    }

    /// Plan and start the release animation for a finished drag.
    pub fn release(&mut self, params: ReleaseParams, limits: &Limits, now: Instant) -> ReleasePlan {
        let limit = &limits.position;
        let threshold = self.config.throw_threshold();
        let goal = goal(
            params.start,
            params.direction,
            limit,
            params.velocity,
            threshold,
        );

        let physics_velocity = params
            .velocity
            .filter(|_| params.use_physics && params.direction != MoveDirection::Nearest);
        let plan = match physics_velocity {
            Some(velocity) => self.start_physics(params.start, goal, params.direction, velocity, limit, now),
            None => self.tween_to(params.start, goal, now),
        };
        debug!(
            target: "floatdock.motion",
            start_x = params.start.x,
            start_y = params.start.y,
            direction = ?params.direction,
            plan = ?plan,
            "release"
        );
        plan
    }

    fn start_physics(
        &mut self,
        start: Point,
        goal: Point,
        direction: MoveDirection,
        velocity: PointF,
        limit: &Rect,
        now: Instant,
    ) -> ReleasePlan {
        let config = &self.config;
        let x = if limit.strictly_contains_x(start.x) && direction == MoveDirection::None {
            let v = config.throw_threshold();
            AxisPhysics::Fling(
                Fling::new(start.x as f32, velocity.x.clamp(-v, v))
                    .with_friction(config.fling_friction)
                    .with_bounds(limit.left as f32, limit.right as f32),
            )
        } else {
            AxisPhysics::Spring(
                Spring::new(start.x as f32, goal.x as f32)
                    .with_stiffness(config.spring_x.stiffness)
                    .with_damping_ratio(config.spring_x.damping_ratio)
                    .with_velocity(velocity.x),
            )
        };

        let (y, goal_y) = if limit.strictly_contains_y(start.y) {
            let v = config.vertical_fling_limit();
            let fling = Fling::new(start.y as f32, velocity.y.clamp(-v, v))
                .with_friction(config.fling_friction)
                .with_bounds(limit.top as f32, limit.bottom as f32);
            (AxisPhysics::Fling(fling), None)
        } else {
            let target = if (start.y - limit.top).abs() <= (limit.bottom - start.y).abs() {
                limit.top
            } else {
                limit.bottom
            };
            let spring = Spring::new(start.y as f32, target as f32)
                .with_stiffness(config.spring_y.stiffness)
                .with_damping_ratio(config.spring_y.damping_ratio)
                .with_velocity(velocity.y);
            (AxisPhysics::Spring(spring), Some(target))
        };

        let known_goal = match (&x, goal_y) {
            (AxisPhysics::Spring(_), Some(gy)) => Some(Point::new(goal.x, gy)),
            _ => None,
        };
        self.begin(Animator::Physics { x, y }, known_goal, now);
        ReleasePlan::Physics(known_goal)
    }

    fn begin(&mut self, animator: Animator, goal: Option<Point>, now: Instant) {
        trace!(target: "floatdock.motion", animator = animator.name(), "start");
        self.animator = Some(animator);
        self.goal = goal;
        self.last_tick = Some(now);
    }

    /// Advance the running animator to `now`.
    ///
    /// Returns `None` when idle. A step with `done` set also clears the
    /// animator.
    pub fn tick(&mut self, now: Instant) -> Option<Step> {
        let animator = self.animator.as_mut()?;
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        let step = animator.tick(dt);
        trace!(
            target: "floatdock.motion",
            x = ?step.x,
            y = ?step.y,
            done = step.done,
            "tick"
        );
        if step.done {
            self.animator = None;
            self.goal = None;
            self.last_tick = None;
        }
        Some(step)
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}
