#![forbid(unsafe_code)]

//! Per-floater pointer interpretation.
//!
//! [`GestureTracker`] turns the Down/Move/Up/Cancel stream of one floater
//! into [`GestureEvent`]s: press, accepted drag moves, long press, click and
//! release (with the release velocity).
//!
//! # State Machine
//!
//! ```text
//! Idle ──Down──▶ Pressed ──timeout──▶ LongPressed
//!                   │                     │
//!                   └──Move ≥ slop──▶ Dragging ◀──Move ≥ slop──┘
//! any ──Up/Cancel──▶ Idle
//! ```
//!
//! # Invariants
//!
//! 1. Click and drag never both fire for one Down → Up interaction.
//! 2. Long press fires at most once per gesture, and never after the drag
//!    was accepted.
//! 3. Events whose `down_time` differs from the one recorded on Down are
//!    dropped without any state change.
//! 4. The release velocity is read exactly once per gesture.
//!
//! # Failure Modes
//!
//! - After [`GestureTracker::invalidate`] every event up to the next Down is
//!   treated as stale.
//! - A Move or Up without a prior Down is stale as well.

use std::time::Duration;

use web_time::Instant;

use crate::geometry::PointF;
use crate::logging::{debug, trace};
use crate::velocity::VelocityTracker;

/// Kind of pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// One pointer sample addressed to a floater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub action: PointerAction,
    /// Pointer position in top-left origin screen coordinates.
    pub raw: PointF,
    /// Pointer position relative to the floater's top-left corner.
    pub local: PointF,
    /// Monotonic stamp identifying the gesture this sample belongs to.
    pub down_time: u64,
}

impl PointerEvent {
    #[must_use]
    pub fn new(action: PointerAction, raw: PointF, local: PointF, down_time: u64) -> Self {
        Self {
            action,
            raw,
            local,
            down_time,
        }
    }

    #[must_use]
    pub fn down(raw: PointF, local: PointF, down_time: u64) -> Self {
        Self::new(PointerAction::Down, raw, local, down_time)
    }

    #[must_use]
    pub fn moved(raw: PointF, local: PointF, down_time: u64) -> Self {
        Self::new(PointerAction::Move, raw, local, down_time)
    }

    #[must_use]
    pub fn up(raw: PointF, local: PointF, down_time: u64) -> Self {
        Self::new(PointerAction::Up, raw, local, down_time)
    }

    #[must_use]
    pub fn cancel(raw: PointF, local: PointF, down_time: u64) -> Self {
        Self::new(PointerAction::Cancel, raw, local, down_time)
    }
}

/// Thresholds for gesture recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Chebyshev distance (pixels) a Move must reach before a drag is accepted.
    pub slop: f32,
    /// Time a stationary press must be held to count as a long press.
    pub long_press_timeout: Duration,
    /// Release velocities are clamped to this magnitude (pixels/second).
    pub max_fling_velocity: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            slop: 8.0,
            long_press_timeout: Duration::from_millis(750),
            max_fling_velocity: 8000.0,
        }
    }
}

/// Where the current gesture stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    /// Down seen, long press armed.
    Pressed,
    /// The long press fired; a drag may still follow.
    LongPressed,
    /// A Move crossed the slop.
    Dragging,
}

/// Semantic output of [`GestureTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// A new gesture began at `raw`.
    Pressed { raw: PointF, local: PointF },
    /// An accepted drag sample.
    Dragged { raw: PointF },
    /// The press was held without moving past the slop.
    LongPress,
    /// Lifted with Up, without a drag and without a long press.
    Click,
    /// The gesture ended. `velocity` is only present for drags.
    Released {
        raw: PointF,
        dragged: bool,
        cancelled: bool,
        velocity: Option<PointF>,
    },
}

/// Stateful recognizer for one floater's pointer stream.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    config: GestureConfig,
    phase: GesturePhase,
    down_time: Option<u64>,
    down_raw: PointF,
    local: PointF,
    last_raw: PointF,
    long_press_at: Option<Instant>,
    velocity: VelocityTracker,
}

impl GestureTracker {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        let velocity = VelocityTracker::new(config.max_fling_velocity);
        Self {
            config,
            phase: GesturePhase::Idle,
            down_time: None,
            down_raw: PointF::default(),
            local: PointF::default(),
            last_raw: PointF::default(),
            long_press_at: None,
            velocity,
        }
    }

    /// Process one pointer sample.
    pub fn process(&mut self, event: &PointerEvent, now: Instant) -> Vec<GestureEvent> {
        let mut out = Vec::with_capacity(2);

        if event.action != PointerAction::Down && self.down_time != Some(event.down_time) {
            trace!(
                target: "floatdock.gesture",
                down_time = event.down_time,
                "dropping stale pointer event"
            );
            return out;
        }

        match event.action {
            PointerAction::Down => self.on_down(event, now, &mut out),
            PointerAction::Move => self.on_move(event, now, &mut out),
            PointerAction::Up => self.on_release(event, now, false, &mut out),
            PointerAction::Cancel => self.on_release(event, now, true, &mut out),
        }
        out
    }

    /// Fire the long press if its deadline passed. Call on every tick.
    pub fn check_long_press(&mut self, now: Instant) -> Option<GestureEvent> {
        let deadline = self.long_press_at?;
        if now < deadline {
            return None;
        }
        self.long_press_at = None;
        self.set_phase(GesturePhase::LongPressed);
        Some(GestureEvent::LongPress)
    }

    /// End the current gesture so that its remaining events are dropped.
    ///
    /// Returns whether a drag was in progress.
    pub fn invalidate(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.down_time = None;
        self.long_press_at = None;
        self.velocity.clear();
        self.set_phase(GesturePhase::Idle);
        was_dragging
    }

    /// Disarm the long press without ending the gesture.
    pub fn cancel_long_press(&mut self) {
        self.long_press_at = None;
    }

    /// Reset all state to idle.
    pub fn reset(&mut self) {
        self.invalidate();
        self.down_raw = PointF::default();
        self.local = PointF::default();
        self.last_raw = PointF::default();
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase == GesturePhase::Dragging
    }

    /// Whether a gesture is between Down and Up.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != GesturePhase::Idle
    }

    /// Pending long-press deadline, if armed.
    #[inline]
    #[must_use]
    pub fn long_press_deadline(&self) -> Option<Instant> {
        self.long_press_at
    }

    /// Pointer offset inside the floater recorded on Down.
    #[inline]
    #[must_use]
    pub fn local(&self) -> PointF {
        self.local
    }

    /// Latest pointer position of the current gesture.
    #[inline]
    #[must_use]
    pub fn last_raw(&self) -> PointF {
        self.last_raw
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }
}

impl GestureTracker {
    fn set_phase(&mut self, phase: GesturePhase) {
        if self.phase != phase {
            debug!(target: "floatdock.gesture", from = ?self.phase, to = ?phase, "gesture phase");
            self.phase = phase;
        }
    }

    fn on_down(&mut self, event: &PointerEvent, now: Instant, out: &mut Vec<GestureEvent>) {
        self.down_time = Some(event.down_time);
        self.down_raw = event.raw;
        self.last_raw = event.raw;
        self.local = event.local;
        self.long_press_at = Some(now + self.config.long_press_timeout);
        self.velocity.clear();
        self.velocity.add(now, event.raw);
        self.set_phase(GesturePhase::Pressed);
        out.push(GestureEvent::Pressed {
            raw: event.raw,
            local: event.local,
        });
    }

    fn on_move(&mut self, event: &PointerEvent, now: Instant, out: &mut Vec<GestureEvent>) {
        self.last_raw = event.raw;
        self.velocity.add(now, event.raw);

        if !self.is_dragging() {
            if self.down_raw.chebyshev_distance(event.raw) < self.config.slop {
                return;
            }
            self.long_press_at = None;
            self.set_phase(GesturePhase::Dragging);
        }
        out.push(GestureEvent::Dragged { raw: event.raw });
    }

    fn on_release(
        &mut self,
        event: &PointerEvent,
        now: Instant,
        cancelled: bool,
        out: &mut Vec<GestureEvent>,
    ) {
        self.last_raw = event.raw;
        self.long_press_at = None;
        let dragged = self.is_dragging();
        let velocity = if dragged {
            self.velocity.add(now, event.raw);
            self.velocity.take()
        } else {
            self.velocity.clear();
            None
        };

        if !cancelled && !dragged && self.phase != GesturePhase::LongPressed {
            out.push(GestureEvent::Click);
        }
        out.push(GestureEvent::Released {
            raw: event.raw,
            dragged,
            cancelled,
            velocity,
        });
        self.set_phase(GesturePhase::Idle);
    }
}
