#![forbid(unsafe_code)]

//! One draggable floater: gesture, motion and placement.
//!
//! A [`Floater`] owns its [`GestureTracker`] and [`Motion`]; it knows
//! nothing about the trash or the other floaters. The manager feeds it
//! pointer samples and layout changes, and reads back which samples were
//! accepted so it can run the trash logic.
//!
//! # Invariants
//!
//! 1. Once placed, a resting anchor lies inside `limits.position`.
//! 2. Pointer samples are dropped while the floater is hidden, not
//!    draggable, unplaced, or running its initial move.
//! 3. `Finishing` is terminal: nothing moves the phase out of it.
//! 4. Losing visibility or draggability mid-gesture ends the gesture; the
//!    rest of its samples fail the down-time gate.

use std::fmt;

use floatdock_core::display::{DisplayGeometry, GeometryChange};
use floatdock_core::geometry::{Limits, Point, PointF, Rect, Size, remap_proportional};
use floatdock_core::gesture::{GestureConfig, GestureEvent, GesturePhase, GestureTracker, PointerEvent};
use floatdock_core::motion::{self, Animator, Motion, MotionConfig, MoveDirection, ReleaseParams, ReleasePlan};
use tracing::{debug, trace};
use web_time::Instant;

use crate::config::{FloaterOptions, FloaterSize};
use crate::host::{FloatListener, Renderer};

/// Scale while the pointer is down.
pub const PRESSED_SCALE: f32 = 0.9;
/// Scale at rest.
pub const NORMAL_SCALE: f32 = 1.0;

/// Stable handle of a floater inside a [`crate::FloatManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FloaterId(u64);

impl FloaterId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FloaterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Relationship between a floater and the trash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloaterPhase {
    #[default]
    Normal,
    /// Held over the trash; touch-follow pulls toward `center`.
    Intersecting { center: Point },
    /// Dropped on the trash; removed when the trash finishes closing.
    Finishing,
}

/// Snapshot of a floater for hosts and tests.
#[derive(Debug, Clone)]
pub struct FloaterState {
    pub id: FloaterId,
    pub anchor: Point,
    pub size: Option<Size>,
    pub limits: Limits,
    pub phase: FloaterPhase,
    pub visible: bool,
    pub draggable: bool,
    pub scale: f32,
    pub gesture: GesturePhase,
    /// The running animator, if any.
    pub animator: Option<Animator>,
    pub initial_move: bool,
}

/// Pointer sample the floater accepted, as seen by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Accepted {
    Down,
    Move,
    /// `rest` is where the floater will come to rest, or the release point
    /// when physics leaves it open.
    Release { rest: Point },
}

/// Per-floater state machine.
#[derive(Debug, Clone)]
pub struct Floater {
    id: FloaterId,
    options: FloaterOptions,
    size: Option<Size>,
    anchor: Point,
    limits: Limits,
    gesture: GestureTracker,
    motion: Motion,
    phase: FloaterPhase,
    draggable: bool,
    visible: bool,
    placed: bool,
    scale: f32,
    initial_move: bool,
}

impl Floater {
    pub(crate) fn new(
        id: FloaterId,
        options: FloaterOptions,
        gesture: GestureConfig,
        motion: MotionConfig,
    ) -> Self {
        Self {
            id,
            options,
            size: None,
            anchor: Point::default(),
            limits: Limits::default(),
            gesture: GestureTracker::new(gesture),
            motion: Motion::new(motion),
            phase: FloaterPhase::Normal,
            draggable: true,
            visible: true,
            placed: false,
            scale: NORMAL_SCALE,
            initial_move: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> FloaterId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &FloaterOptions {
        &self.options
    }

    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Option<Size> {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> FloaterPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    #[must_use]
    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    #[inline]
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.placed
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.motion.is_active()
    }

    /// Pending long-press deadline, if armed.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.gesture.long_press_deadline()
    }

    #[must_use]
    pub fn state(&self) -> FloaterState {
        FloaterState {
            id: self.id,
            anchor: self.anchor,
            size: self.size,
            limits: self.limits,
            phase: self.phase,
            visible: self.visible,
            draggable: self.draggable,
            scale: self.scale,
            gesture: self.gesture.phase(),
            animator: self.motion.animator().cloned(),
            initial_move: self.initial_move,
        }
    }

    /// Fixed size from the options, if any.
    pub(crate) fn fixed_size(&self) -> Option<Size> {
        match self.options.size {
            FloaterSize::Fixed(size) => Some(size),
            FloaterSize::WrapContent => None,
        }
    }

    /// Anchor implied by the latest pointer sample, unclamped.
    #[must_use]
    pub fn touch_anchor(&self, geometry: &DisplayGeometry) -> Point {
        geometry.anchor_from_touch(
            self.gesture.last_raw(),
            self.gesture.local(),
            self.size.unwrap_or_default(),
        )
    }

    /// Drawing rectangle at the touch-implied anchor, used for trash hits.
    #[must_use]
    pub fn touch_rect(&self, geometry: &DisplayGeometry) -> Rect {
        Rect::from_origin(self.touch_anchor(geometry), self.size.unwrap_or_default())
    }

    fn compute_limits(&self, geometry: &DisplayGeometry, size: Size) -> Limits {
        Limits::compute(geometry.limit_inputs(), size, self.options.over_margin)
    }

    fn goal_from(&self, start: Point) -> Point {
        motion::goal(
            start,
            self.options.move_direction,
            &self.limits.position,
            None,
            self.motion.config().throw_threshold(),
        )
    }

    fn commit<R: Renderer + ?Sized>(&mut self, anchor: Point, renderer: &mut R) {
        if self.anchor != anchor {
            self.anchor = anchor;
            renderer.set_position(self.id, anchor);
        }
    }

    fn set_scale<R: Renderer + ?Sized>(&mut self, scale: f32, renderer: &mut R) {
        if self.scale != scale {
            self.scale = scale;
            renderer.set_scale(self.id, scale);
        }
    }

    /// Jump to the edge goal of `from` without animating.
    fn snap_now<R: Renderer + ?Sized>(&mut self, from: Point, renderer: &mut R) {
        self.motion.cancel();
        self.initial_move = false;
        let goal = self.goal_from(from);
        self.commit(goal, renderer);
    }

    /// Record a measured size. Places the floater on its first measure and
    /// re-clamps it afterwards. Returns whether this was the first placement.
    pub(crate) fn measure<R: Renderer + ?Sized>(
        &mut self,
        size: Size,
        geometry: &DisplayGeometry,
        now: Instant,
        renderer: &mut R,
    ) -> bool {
        self.size = Some(size);
        self.limits = self.compute_limits(geometry, size);
        if !self.placed {
            self.place(geometry, size, now, renderer);
            return true;
        }
        if self.gesture.is_active() {
            return false;
        }
        if self.motion.is_active() {
            // Retarget against the new limits; the old goal may lie outside them.
            let goal = self.goal_from(self.motion.goal().unwrap_or(self.anchor));
            if let ReleasePlan::AtRest(rest) = self.motion.tween_to(self.anchor, goal, now) {
                self.initial_move = false;
                self.commit(rest, renderer);
            }
            debug!(
                target: "floatdock.manager",
                id = self.id.get(),
                x = goal.x,
                y = goal.y,
                "motion retargeted after measure"
            );
        } else {
            let clamped = self.limits.position.clamp(self.anchor);
            self.commit(clamped, renderer);
        }
        false
    }

    fn place<R: Renderer + ?Sized>(
        &mut self,
        geometry: &DisplayGeometry,
        size: Size,
        now: Instant,
        renderer: &mut R,
    ) {
        let default = Point::new(
            0,
            geometry.screen().height - geometry.status_bar_height() - size.height,
        );
        let start = self.options.initial_anchor.unwrap_or(default);
        self.placed = true;

        // Always push the first position, even if it equals the default anchor.
        let first = if self.options.move_direction == MoveDirection::None {
            self.limits.position.clamp(start)
        } else {
            let goal = self.goal_from(start);
            if self.options.animate_initial_move && start != goal {
                self.motion.tween_to(start, goal, now);
                self.initial_move = true;
                start
            } else {
                goal
            }
        };
        self.anchor = first;
        renderer.set_position(self.id, first);
        debug!(
            target: "floatdock.manager",
            id = self.id.get(),
            x = first.x,
            y = first.y,
            animated = self.initial_move,
            "floater placed"
        );
    }

    /// Follow a layout change. Returns `true` if a gesture was interrupted.
    pub(crate) fn on_layout<R: Renderer + ?Sized>(
        &mut self,
        geometry: &DisplayGeometry,
        change: GeometryChange,
        renderer: &mut R,
    ) -> bool {
        let Some(size) = self.size else {
            return false;
        };
        if change.rotated && self.initial_move {
            self.options.animate_initial_move = false;
        }
        let old = self.limits;
        self.limits = self.compute_limits(geometry, size);
        if !self.placed {
            return false;
        }

        if self.gesture.is_active() {
            self.gesture.invalidate();
            self.set_scale(NORMAL_SCALE, renderer);
            if self.phase != FloaterPhase::Finishing {
                self.phase = FloaterPhase::Normal;
            }
            self.snap_now(self.anchor, renderer);
            debug!(target: "floatdock.manager", id = self.id.get(), "layout changed mid-gesture");
            return true;
        }

        if old == self.limits && !change.rotated {
            return false;
        }
        let from = self.motion.goal().unwrap_or(self.anchor);
        let mut anchor = remap_proportional(from, &old.position, &self.limits.position);
        if self.options.move_direction != MoveDirection::None {
            anchor = self.goal_from(anchor);
        }
        self.motion.cancel();
        self.initial_move = false;
        self.commit(anchor, renderer);
        false
    }

    /// Feed one pointer sample. Returns what the manager should see, or
    /// `None` when the sample was dropped.
    pub(crate) fn on_pointer<R, L>(
        &mut self,
        event: &PointerEvent,
        now: Instant,
        geometry: &DisplayGeometry,
        renderer: &mut R,
        listener: &mut L,
    ) -> Option<Accepted>
    where
        R: Renderer + ?Sized,
        L: FloatListener + ?Sized,
    {
        if !self.visible || !self.draggable || !self.placed || self.initial_move {
            trace!(
                target: "floatdock.gesture",
                id = self.id.get(),
                visible = self.visible,
                draggable = self.draggable,
                initial_move = self.initial_move,
                "pointer sample dropped"
            );
            return None;
        }

        let mut accepted = None;
        for event in self.gesture.process(event, now) {
            match event {
                GestureEvent::Pressed { .. } => {
                    self.motion.cancel();
                    self.initial_move = false;
                    self.set_scale(PRESSED_SCALE, renderer);
                    let target = self.limits.movement.clamp(self.touch_anchor(geometry));
                    self.motion.start_touch_follow(target.to_f32(), now);
                    accepted = Some(Accepted::Down);
                }
                GestureEvent::Dragged { .. } => {
                    if self.phase == FloaterPhase::Normal {
                        let target = self.limits.movement.clamp(self.touch_anchor(geometry));
                        self.motion.follow(target.to_f32());
                    }
                    accepted = Some(Accepted::Move);
                }
                GestureEvent::LongPress => self.long_click(listener),
                GestureEvent::Click => {
                    for child in 0..self.options.children {
                        listener.on_click(self.id, child);
                    }
                }
                GestureEvent::Released {
                    dragged, velocity, ..
                } => {
                    self.set_scale(NORMAL_SCALE, renderer);
                    let rest = if dragged {
                        self.release(velocity, geometry, now, renderer)
                    } else {
                        self.motion.cancel();
                        self.anchor
                    };
                    accepted = Some(Accepted::Release { rest });
                }
            }
        }
        accepted
    }

    fn release<R: Renderer + ?Sized>(
        &mut self,
        velocity: Option<PointF>,
        geometry: &DisplayGeometry,
        now: Instant,
        renderer: &mut R,
    ) -> Point {
        let start = self.limits.movement.clamp(self.touch_anchor(geometry));
        // Pointer y grows downward; anchors grow upward.
        let velocity = velocity.map(|v| PointF::new(v.x, -v.y));
        let params = ReleaseParams {
            start,
            direction: self.options.move_direction,
            use_physics: self.options.use_physics,
            velocity,
        };
        match self.motion.release(params, &self.limits, now) {
            ReleasePlan::AtRest(goal) => {
                self.commit(goal, renderer);
                goal
            }
            ReleasePlan::EdgeTween(goal) | ReleasePlan::Physics(Some(goal)) => goal,
            ReleasePlan::Physics(None) => start,
        }
    }

    fn long_click<L: FloatListener + ?Sized>(&mut self, listener: &mut L) {
        debug!(target: "floatdock.gesture", id = self.id.get(), "long press");
        for child in 0..self.options.children {
            listener.on_long_click(self.id, child);
        }
    }

    /// Pull toward the trash icon at `center`.
    pub(crate) fn set_intersecting(&mut self, center: Point) {
        if self.phase == FloaterPhase::Finishing {
            return;
        }
        let size = self.size.unwrap_or_default();
        if !matches!(self.phase, FloaterPhase::Intersecting { .. }) {
            self.motion.restart_follow(self.anchor.to_f32());
            debug!(target: "floatdock.manager", id = self.id.get(), "floater intersecting trash");
        }
        self.phase = FloaterPhase::Intersecting { center };
        let target = Point::new(center.x - size.width / 2, center.y - size.height / 2);
        self.motion.follow(target.to_f32());
    }

    /// Resume following the pointer.
    pub(crate) fn set_normal(&mut self, geometry: &DisplayGeometry) {
        if self.phase == FloaterPhase::Finishing {
            return;
        }
        if self.phase != FloaterPhase::Normal {
            self.motion.restart_follow(self.anchor.to_f32());
            debug!(target: "floatdock.manager", id = self.id.get(), "floater left trash");
        }
        self.phase = FloaterPhase::Normal;
        let target = self.limits.movement.clamp(self.touch_anchor(geometry));
        self.motion.follow(target.to_f32());
    }

    /// Mark as dropped on the trash and hide.
    pub(crate) fn set_finishing<R: Renderer + ?Sized>(&mut self, geometry: &DisplayGeometry, renderer: &mut R) {
        self.phase = FloaterPhase::Finishing;
        self.set_visible(false, geometry, renderer);
        self.motion.cancel();
        debug!(target: "floatdock.manager", id = self.id.get(), "floater finishing");
    }

    /// End a gesture in progress: snap a drag to its edge and gate the rest
    /// of its samples.
    fn interrupt<R: Renderer + ?Sized>(&mut self, geometry: &DisplayGeometry, renderer: &mut R) {
        self.gesture.cancel_long_press();
        self.set_scale(NORMAL_SCALE, renderer);
        if self.gesture.is_dragging() {
            let from = self.limits.movement.clamp(self.touch_anchor(geometry));
            self.snap_now(from, renderer);
        } else if self.motion.is_touch_following() {
            self.motion.cancel();
        }
        self.gesture.invalidate();
        if matches!(self.phase, FloaterPhase::Intersecting { .. }) {
            self.phase = FloaterPhase::Normal;
        }
    }

    pub(crate) fn set_visible<R: Renderer + ?Sized>(
        &mut self,
        visible: bool,
        geometry: &DisplayGeometry,
        renderer: &mut R,
    ) {
        if self.visible == visible {
            return;
        }
        if !visible {
            self.interrupt(geometry, renderer);
        }
        self.visible = visible;
        renderer.set_visibility(self.id, visible);
    }

    pub(crate) fn set_draggable<R: Renderer + ?Sized>(
        &mut self,
        draggable: bool,
        geometry: &DisplayGeometry,
        renderer: &mut R,
    ) {
        if self.draggable == draggable {
            return;
        }
        if !draggable && self.gesture.is_active() {
            self.interrupt(geometry, renderer);
        }
        self.draggable = draggable;
    }

    /// Stop every animation and timer.
    pub(crate) fn halt<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.motion.cancel();
        self.gesture.reset();
        self.initial_move = false;
        self.set_scale(NORMAL_SCALE, renderer);
        if matches!(self.phase, FloaterPhase::Intersecting { .. }) {
            self.phase = FloaterPhase::Normal;
        }
    }

    /// Fire a due long press and advance the running animator.
    pub(crate) fn tick<R, L>(&mut self, now: Instant, renderer: &mut R, listener: &mut L)
    where
        R: Renderer + ?Sized,
        L: FloatListener + ?Sized,
    {
        if let Some(GestureEvent::LongPress) = self.gesture.check_long_press(now) {
            self.long_click(listener);
        }
        if let Some(step) = self.motion.tick(now) {
            let x = step.x.map_or(self.anchor.x, |v| v.round() as i32);
            let y = step.y.map_or(self.anchor.y, |v| v.round() as i32);
            self.commit(Point::new(x, y), renderer);
            if step.done {
                self.initial_move = false;
            }
        }
    }
}
