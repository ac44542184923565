#![forbid(unsafe_code)]

//! The trash target: a drop zone that rises from the bottom edge while a
//! floater is held.
//!
//! # State Machine
//!
//! ```text
//! Hidden ──press + delay / move──▶ Opening ──icon settled──▶ Open
//!    ▲                                │                       │
//!    │                                └──── release ──────────┤
//!    │                                                        ▼
//!    └────────────── close finished ─────────────────────── Closing
//!
//! any ──dismiss / disable──▶ ForceClosing ──next tick──▶ Hidden
//! ```
//!
//! Positions live in two spaces. The icon's translation uses the renderer's
//! top-left origin (positive `ty` moves the icon down, `ty = limit.bottom` is
//! fully hidden). The icon center and the capture rectangle are reported in
//! anchor space (bottom-left origin) so they compare directly with floater
//! anchors.
//!
//! # Invariants
//!
//! 1. Every `Started(Close)` / `Started(ForceClose)` is followed by exactly
//!    one matching `Ended`, unless an open interrupts the close, in which
//!    case `Ended(Close)` is emitted before `Started(Open)`.
//! 2. A disabled trash ignores every input and stays `Hidden`.
//! 3. Alpha stays in `[0, 1]`.
//!
//! # Failure Modes
//!
//! - Without an action icon, scale requests are ignored and the fixed icon
//!   defines the hit geometry.

use std::time::Duration;

use floatdock_core::animation::{Animation, Easing, Tween, overshoot};
use floatdock_core::display::DisplayProfile;
use floatdock_core::geometry::{Point, PointF, Rect, Size};
use tracing::{debug, trace};
use web_time::Instant;

use crate::config::TrashStyle;
use crate::host::Renderer;

/// Visible state of the trash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrashPhase {
    #[default]
    Hidden,
    /// Fading in; the icon is rising.
    Opening,
    /// Fully shown; the icon keeps tracking the held floater.
    Open,
    Closing,
    /// Collapsing on the next tick without animation.
    ForceClosing,
}

/// Animation kinds reported through [`TrashSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrashAnimation {
    Open,
    Close,
    ForceClose,
}

/// Start/end notifications the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrashSignal {
    Started(TrashAnimation),
    Ended(TrashAnimation),
}

#[derive(Debug, Clone)]
struct ScaleTween {
    tween: Tween,
    last: Instant,
}

/// Trash state, geometry and animation clock.
#[derive(Debug, Clone)]
pub struct TrashTarget {
    style: TrashStyle,
    density: f32,
    screen: Size,
    enabled: bool,
    phase: TrashPhase,

    fixed_icon: Size,
    action_icon: Option<Size>,
    action_padding: (i32, i32),
    action_max_scale: f32,
    action_scale: f32,
    scale_tween: Option<ScaleTween>,

    limit: Rect,
    sticky_range: f32,

    alpha: f32,
    tx: f32,
    ty: f32,
    /// Last values pushed to the renderer: alpha, tx, ty.
    rendered: Option<(f32, f32, f32)>,

    target: Point,
    target_size: Size,
    open_delay: Duration,
    pending_open: Option<Instant>,
    started_at: Option<Instant>,
    start_alpha: f32,
    start_ty: f32,
}

impl TrashTarget {
    /// Hidden trash for a display of `screen`. `open_delay` is the hold time
    /// before a press opens it.
    #[must_use]
    pub fn new(style: TrashStyle, profile: &DisplayProfile, screen: Size, open_delay: Duration) -> Self {
        let mut trash = Self {
            style,
            density: profile.density,
            screen,
            enabled: true,
            phase: TrashPhase::Hidden,
            fixed_icon: Size::default(),
            action_icon: None,
            action_padding: (0, 0),
            action_max_scale: 1.0,
            action_scale: 1.0,
            scale_tween: None,
            limit: Rect::default(),
            sticky_range: 0.0,
            alpha: 0.0,
            tx: 0.0,
            ty: 0.0,
            rendered: None,
            target: Point::default(),
            target_size: Size::default(),
            open_delay,
            pending_open: None,
            started_at: None,
            start_alpha: 0.0,
            start_ty: 0.0,
        };
        trash.relayout();
        trash.ty = trash.limit.bottom as f32;
        trash
    }

    /// Start enabled or disabled. A new trash is `Hidden`, so nothing collapses.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> TrashPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Icon translation `(tx, ty)` in renderer space.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> PointF {
        PointF::new(self.tx, self.ty)
    }

    #[inline]
    #[must_use]
    pub fn action_icon_scale(&self) -> f32 {
        self.action_scale
    }

    /// Scale the action icon grows to while a floater is inside.
    #[inline]
    #[must_use]
    pub fn action_icon_max_scale(&self) -> f32 {
        self.action_max_scale
    }

    /// Range of icon translations, renderer space.
    #[inline]
    #[must_use]
    pub fn limit(&self) -> Rect {
        self.limit
    }

    /// When a scheduled open fires, if one is pending.
    #[inline]
    #[must_use]
    pub fn pending_open(&self) -> Option<Instant> {
        self.pending_open
    }

    /// Whether [`Self::tick`] has frames to produce.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.phase != TrashPhase::Hidden || self.scale_tween.is_some()
    }

    fn dp(&self, value: f32) -> f32 {
        value * self.density
    }

    fn has_action_icon(&self) -> bool {
        self.action_icon.is_some_and(|s| s.width != 0 && s.height != 0)
    }

    /// Intrinsic size of the icon used for hit testing.
    fn hit_icon(&self) -> Size {
        match self.action_icon {
            Some(size) if self.has_action_icon() => size,
            _ => self.fixed_icon,
        }
    }

    fn icon_root_size(&self) -> Size {
        let action = match self.action_icon {
            Some(size) if self.has_action_icon() => Size::new(
                size.width + 2 * self.action_padding.0,
                size.height + 2 * self.action_padding.1,
            ),
            _ => Size::default(),
        };
        Size::new(
            self.fixed_icon.width.max(action.width),
            self.fixed_icon.height.max(action.height),
        )
    }

    fn root_height(&self) -> f32 {
        self.dp(self.style.background_height_dp)
            .max(self.icon_root_size().height as f32)
    }

    fn relayout(&mut self) {
        let background = self.dp(self.style.background_height_dp);
        let offset_x = self.dp(self.style.limit_offset_x_dp);
        let icon_h = self.icon_root_size().height;
        let top = (icon_h as f32 - background) / 2.0 - self.dp(self.style.limit_offset_top_dp);
        self.limit = Rect::new(-offset_x as i32, top as i32, offset_x as i32, icon_h);
        self.sticky_range = background * self.style.sticky_range;
        if self.phase == TrashPhase::Hidden {
            self.ty = self.limit.bottom as f32;
        }
        trace!(target: "floatdock.trash", limit = ?self.limit, "trash layout");
    }

    /// Track a new display size.
    pub fn set_screen(&mut self, screen: Size) {
        self.screen = screen;
        self.relayout();
    }

    /// Intrinsic size of the always-visible icon.
    pub fn set_fixed_icon(&mut self, size: Size) {
        self.fixed_icon = size;
        self.relayout();
    }

    /// Intrinsic size of the icon that scales up on contact; `None` removes it.
    pub fn set_action_icon(&mut self, size: Option<Size>) {
        self.action_icon = size;
        if !self.has_action_icon() {
            self.action_padding = (0, 0);
            self.action_max_scale = 1.0;
            self.action_scale = 1.0;
            self.scale_tween = None;
        }
        self.relayout();
    }

    /// Size the action icon so it covers a floater of `target` with `shape`.
    ///
    /// The padding keeps the scaled icon inside its frame.
    pub fn calc_action_icon_padding<R: Renderer + ?Sized>(
        &mut self,
        target: Size,
        shape: f32,
        renderer: &mut R,
    ) {
        self.target_size = target;
        let Some(base) = self.action_icon.filter(|_| self.has_action_icon()) else {
            return;
        };
        let scale_w = target.width as f32 / base.width as f32 * shape;
        let scale_h = target.height as f32 / base.height as f32 * shape;
        self.action_max_scale = scale_w.max(scale_h);
        let pad = |dim: i32| (((self.action_max_scale - 1.0) * dim as f32 / 2.0 + 0.5) as i32).max(0);
        self.action_padding = (pad(base.width), pad(base.height));
        renderer.trash_set_action_icon_padding(self.action_padding.0, self.action_padding.1);
        self.relayout();
        debug!(
            target: "floatdock.trash",
            max_scale = self.action_max_scale,
            padding_h = self.action_padding.0,
            padding_v = self.action_padding.1,
            "action icon sized"
        );
    }

    /// Icon center in anchor space.
    #[must_use]
    pub fn icon_center(&self) -> Point {
        let x = self.screen.width as f32 / 2.0 + self.tx;
        let y = self.icon_root_size().height as f32 / 2.0 - self.ty;
        Point::new(x as i32, y as i32)
    }

    /// Region a floater must overlap to be captured, in anchor space.
    ///
    /// Grows the icon sideways and upward by the capture margins and reaches
    /// below the screen by the full root height.
    #[must_use]
    pub fn capture_rect(&self) -> Rect {
        let icon = self.hit_icon();
        let center = self.icon_center();
        let half_w = icon.width as f32 / 2.0;
        let half_h = icon.height as f32 / 2.0;
        let capture_h = self.dp(self.style.capture_horizontal_dp);
        let capture_v = self.dp(self.style.capture_vertical_dp);
        Rect::new(
            (center.x as f32 - half_w - capture_h) as i32,
            -self.root_height() as i32,
            (center.x as f32 + half_w + capture_h) as i32,
            (center.y as f32 + half_h + capture_v) as i32,
        )
    }

    /// Enable or disable. Disabling collapses the trash at once.
    pub fn set_enabled<R: Renderer + ?Sized>(
        &mut self,
        enabled: bool,
        now: Instant,
        renderer: &mut R,
    ) -> Vec<TrashSignal> {
        if self.enabled == enabled {
            return Vec::new();
        }
        let mut signals = Vec::new();
        if !enabled {
            self.dismiss(renderer);
            signals = self.tick(now, renderer);
        }
        self.enabled = enabled;
        debug!(target: "floatdock.trash", enabled, "trash enabled changed");
        signals
    }

    /// A floater was pressed at `target`. Opens after the hold delay.
    pub fn on_down(&mut self, target: Point, now: Instant) {
        if !self.enabled {
            return;
        }
        self.target = target;
        if !matches!(self.phase, TrashPhase::Opening | TrashPhase::Open) {
            self.pending_open = Some(now + self.open_delay);
        }
    }

    /// The held floater moved to `target`. Opens immediately if not open yet.
    pub fn on_move<R: Renderer + ?Sized>(
        &mut self,
        target: Point,
        now: Instant,
        renderer: &mut R,
    ) -> Vec<TrashSignal> {
        if !self.enabled {
            return Vec::new();
        }
        self.target = target;
        let mut signals = Vec::new();
        if !matches!(self.phase, TrashPhase::Opening | TrashPhase::Open) {
            self.pending_open = None;
            self.start_open(now, &mut signals);
            self.step(now, &mut signals);
            self.render(renderer);
        }
        signals
    }

    /// The held floater was released. Starts the close animation.
    pub fn on_release<R: Renderer + ?Sized>(&mut self, now: Instant, renderer: &mut R) -> Vec<TrashSignal> {
        if !self.enabled {
            return Vec::new();
        }
        self.pending_open = None;
        let mut signals = Vec::new();
        self.start_close(now, &mut signals);
        self.step(now, &mut signals);
        self.render(renderer);
        signals
    }

    /// Collapse without animation. The collapse itself happens on the next
    /// [`Self::tick`].
    pub fn dismiss<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        if !self.enabled {
            return;
        }
        self.pending_open = None;
        self.set_phase(TrashPhase::ForceClosing);
        self.scale_tween = None;
        if self.has_action_icon() && self.action_scale != 1.0 {
            self.action_scale = 1.0;
            renderer.trash_set_action_icon_scale(1.0);
        }
    }

    /// Grow (`enter`) or shrink the action icon with an overshoot tween.
    pub fn set_action_scale(&mut self, enter: bool, now: Instant) {
        if !self.has_action_icon() {
            return;
        }
        let to = if enter { self.action_max_scale } else { 1.0 };
        let tween = Tween::new(
            self.action_scale,
            to,
            Duration::from_millis(self.style.action_scale_ms),
        )
        .easing(Easing::Overshoot(self.style.action_scale_tension));
        self.scale_tween = Some(ScaleTween { tween, last: now });
    }

    /// Advance every running animation to `now`.
    pub fn tick<R: Renderer + ?Sized>(&mut self, now: Instant, renderer: &mut R) -> Vec<TrashSignal> {
        let mut signals = Vec::new();
        if !self.enabled {
            return signals;
        }
        if let Some(at) = self.pending_open
            && now >= at
        {
            self.pending_open = None;
            self.start_open(at, &mut signals);
        }
        self.step(now, &mut signals);
        self.step_scale(now, renderer);
        self.render(renderer);
        signals
    }

    /// Push the full visual state, e.g. after the host re-created its views.
    pub fn sync<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.rendered = None;
        self.render(renderer);
        renderer.trash_set_action_icon_scale(self.action_scale);
        if self.has_action_icon() {
            renderer.trash_set_action_icon_padding(self.action_padding.0, self.action_padding.1);
        }
    }

    fn set_phase(&mut self, phase: TrashPhase) {
        if self.phase != phase {
            debug!(target: "floatdock.trash", from = ?self.phase, to = ?phase, "trash phase");
            self.phase = phase;
        }
    }

    fn start_open(&mut self, at: Instant, signals: &mut Vec<TrashSignal>) {
        if self.phase == TrashPhase::Closing {
            signals.push(TrashSignal::Ended(TrashAnimation::Close));
        }
        self.started_at = Some(at);
        self.start_alpha = self.alpha;
        self.start_ty = self.ty;
        self.set_phase(TrashPhase::Opening);
        signals.push(TrashSignal::Started(TrashAnimation::Open));
    }

    fn start_close(&mut self, at: Instant, signals: &mut Vec<TrashSignal>) {
        self.started_at = Some(at);
        self.start_alpha = self.alpha;
        self.start_ty = self.ty;
        self.set_phase(TrashPhase::Closing);
        signals.push(TrashSignal::Started(TrashAnimation::Close));
    }

    fn elapsed_ms(&self, now: Instant) -> f32 {
        self.started_at
            .map_or(0.0, |start| now.saturating_duration_since(start).as_secs_f32() * 1000.0)
    }

    fn step(&mut self, now: Instant, signals: &mut Vec<TrashSignal>) {
        match self.phase {
            TrashPhase::Hidden => {}
            TrashPhase::Opening | TrashPhase::Open => self.step_open(now),
            TrashPhase::Closing => self.step_close(now, signals),
            TrashPhase::ForceClosing => {
                signals.push(TrashSignal::Started(TrashAnimation::ForceClose));
                self.alpha = 0.0;
                self.ty = self.limit.bottom as f32;
                self.started_at = None;
                self.set_phase(TrashPhase::Hidden);
                signals.push(TrashSignal::Ended(TrashAnimation::ForceClose));
            }
        }
    }

    fn step_open(&mut self, now: Instant) {
        let style = &self.style;
        let elapsed = self.elapsed_ms(now);
        if self.alpha < 1.0 {
            let rate = (elapsed / style.background_fade_ms as f32).min(1.0);
            self.alpha = (self.start_alpha + rate).min(1.0);
        }

        let delay = style.icon_open_delay_ms as f32;
        let open_ms = style.icon_open_ms as f32;
        if elapsed >= delay {
            let limit = self.limit;
            let (w, h) = (self.target_size.width as f32, self.target_size.height as f32);
            let screen_w = self.screen.width as f32;
            let screen_h = self.screen.height as f32;
            self.tx = (self.target.x as f32 + w) / (screen_w + w) * limit.width() as f32 + limit.left as f32;

            let rate_y = (2.0 * (self.target.y as f32 + h) / (screen_h + h)).min(1.0);
            let sticky = self.sticky_range * rate_y + limit.height() as f32 - self.sticky_range;
            let rate_t = ((elapsed - delay) / open_ms).min(1.0);
            self.ty = limit.bottom as f32 - sticky * overshoot(style.icon_open_tension, rate_t);
        }

        if self.phase == TrashPhase::Opening && elapsed >= delay + open_ms {
            self.alpha = 1.0;
            self.set_phase(TrashPhase::Open);
        }
        trace!(target: "floatdock.trash", alpha = self.alpha, tx = self.tx, ty = self.ty, "open frame");
    }

    fn step_close(&mut self, now: Instant, signals: &mut Vec<TrashSignal>) {
        let elapsed = self.elapsed_ms(now);
        let alpha_rate = (elapsed / self.style.background_fade_ms as f32).min(1.0);
        self.alpha = (self.start_alpha - alpha_rate).max(0.0);
        let move_rate = (elapsed / self.style.close_ms as f32).min(1.0);
        if alpha_rate < 1.0 || move_rate < 1.0 {
            self.ty = self.start_ty + self.limit.height() as f32 * move_rate;
            trace!(target: "floatdock.trash", alpha = self.alpha, ty = self.ty, "close frame");
        } else {
            self.ty = self.limit.bottom as f32;
            self.started_at = None;
            self.set_phase(TrashPhase::Hidden);
            signals.push(TrashSignal::Ended(TrashAnimation::Close));
        }
    }

    fn step_scale<R: Renderer + ?Sized>(&mut self, now: Instant, renderer: &mut R) {
        let Some(scale) = self.scale_tween.as_mut() else {
            return;
        };
        let dt = now.saturating_duration_since(scale.last);
        scale.last = now;
        scale.tween.tick(dt);
        self.action_scale = scale.tween.current();
        let done = scale.tween.is_complete();
        renderer.trash_set_action_icon_scale(self.action_scale);
        if done {
            self.scale_tween = None;
        }
    }

    fn render<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        let now = (self.alpha, self.tx, self.ty);
        let before = self.rendered;
        if before.is_none_or(|b| b.0 != now.0) {
            renderer.trash_set_alpha(now.0);
        }
        if before.is_none_or(|b| b.1 != now.1) {
            renderer.trash_set_icon_translation_x(now.1);
        }
        if before.is_none_or(|b| b.2 != now.2) {
            renderer.trash_set_icon_translation_y(now.2);
        }
        self.rendered = Some(now);
    }
}
