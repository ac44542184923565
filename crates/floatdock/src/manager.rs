#![forbid(unsafe_code)]

//! Multi-floater controller with the trash target.
//!
//! [`FloatManager`] owns every [`Floater`] in an arena keyed by
//! [`FloaterId`], the shared [`DisplayGeometry`] and the [`TrashTarget`].
//! Hosts forward pointer samples, layout notifications, measurements and
//! clock ticks; the manager answers through the [`Renderer`] and
//! [`FloatListener`] it was built with.
//!
//! # Driving the engine
//!
//! ```rust,ignore
//! let mut manager = FloatManager::new(config, profile, &layout, renderer, listener);
//! let id = manager.add_floater(FloaterOptions::default(), now);
//! manager.on_measure(id, Size::new(120, 120), now);
//! manager.on_pointer(id, &PointerEvent::down(raw, local, down_time), now);
//! while let Some(at) = manager.next_deadline() {
//!     manager.tick(at);
//! }
//! ```
//!
//! # Invariants
//!
//! 1. Ids are never reused; a lookup miss drops the request.
//! 2. `Finishing` floaters are removed only when a trash animation ends.
//! 3. While a trash close or force-close runs, no floater is draggable.
//! 4. `on_finish_all` fires only when a removal empties the arena.
//!
//! # Failure Modes
//!
//! - Samples, measurements and ticks for unknown ids are logged and dropped.
//! - While detached every pointer sample and tick is ignored.

use std::collections::BTreeMap;

use floatdock_core::display::{DisplayGeometry, DisplayProfile, LayoutUpdate};
use floatdock_core::geometry::Size;
use floatdock_core::gesture::PointerEvent;
use tracing::{debug, trace};
use web_time::Instant;

use crate::config::{DisplayMode, EngineConfig, FloaterOptions};
use crate::error::{EngineError, Result};
use crate::floater::{Accepted, Floater, FloaterId, FloaterPhase, FloaterState};
use crate::host::{FloatListener, Renderer};
use crate::trash::{TrashAnimation, TrashSignal, TrashTarget};

/// The engine.
#[derive(Debug)]
pub struct FloatManager<R: Renderer, L: FloatListener> {
    config: EngineConfig,
    geometry: DisplayGeometry,
    trash: TrashTarget,
    floaters: BTreeMap<FloaterId, Floater>,
    active: Option<FloaterId>,
    move_accept: bool,
    display_mode: DisplayMode,
    attached: bool,
    next_id: u64,
    last_now: Option<Instant>,
    renderer: R,
    listener: L,
}

impl<R: Renderer, L: FloatListener> FloatManager<R, L> {
    /// Build an attached engine for the display described by `layout`.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        profile: DisplayProfile,
        layout: &LayoutUpdate,
        renderer: R,
        listener: L,
    ) -> Self {
        let geometry = DisplayGeometry::new(profile, layout);
        let trash = TrashTarget::new(
            config.trash.clone(),
            geometry.profile(),
            geometry.screen(),
            config.trash_open_delay(),
        )
        .with_enabled(config.trash_enabled);
        let display_mode = config.display_mode;
        debug!(
            target: "floatdock.manager",
            screen_w = geometry.screen().width,
            screen_h = geometry.screen().height,
            display_mode = ?display_mode,
            "engine created"
        );
        Self {
            config,
            geometry,
            trash,
            floaters: BTreeMap::new(),
            active: None,
            move_accept: false,
            display_mode,
            attached: true,
            next_id: 1,
            last_now: None,
            renderer,
            listener,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn geometry(&self) -> &DisplayGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn trash(&self) -> &TrashTarget {
        &self.trash
    }

    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Floater that received the latest press.
    #[must_use]
    pub fn active(&self) -> Option<FloaterId> {
        self.active
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.floaters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.floaters.is_empty()
    }

    /// Live ids in creation order.
    pub fn floater_ids(&self) -> impl Iterator<Item = FloaterId> + '_ {
        self.floaters.keys().copied()
    }

    pub fn floater_state(&self, id: FloaterId) -> Result<FloaterState> {
        self.floaters
            .get(&id)
            .map(Floater::state)
            .ok_or(EngineError::UnknownFloater(id))
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Register a floater. Fixed-size floaters are placed at once; the rest
    /// wait for [`Self::on_measure`].
    pub fn add_floater(&mut self, options: FloaterOptions, now: Instant) -> FloaterId {
        self.last_now = Some(now);
        let id = FloaterId::new(self.next_id);
        self.next_id += 1;

        let profile = self.geometry.profile();
        let mut floater = Floater::new(
            id,
            options,
            self.config.gesture_config(profile),
            self.config.motion_config(profile),
        );
        if self.display_mode == DisplayMode::HideAlways {
            floater.set_visible(false, &self.geometry, &mut self.renderer);
        }
        let fixed = floater.fixed_size();
        self.floaters.insert(id, floater);
        debug!(target: "floatdock.manager", id = id.get(), count = self.floaters.len(), "floater added");

        if let Some(size) = fixed {
            self.on_measure(id, size, now);
        }
        id
    }

    /// Report a floater's measured size.
    pub fn on_measure(&mut self, id: FloaterId, size: Size, now: Instant) {
        self.last_now = Some(now);
        if size.is_empty() {
            debug!(target: "floatdock.manager", id = id.get(), "empty measurement ignored");
            return;
        }
        let Some(floater) = self.floaters.get_mut(&id) else {
            debug!(target: "floatdock.manager", id = id.get(), "measure for unknown floater");
            return;
        };
        if floater.measure(size, &self.geometry, now, &mut self.renderer) {
            let shape = floater.options().shape.factor();
            self.trash
                .calc_action_icon_padding(size, shape, &mut self.renderer);
        }
    }

    /// Feed one pointer sample addressed to floater `id`.
    pub fn on_pointer(&mut self, id: FloaterId, event: &PointerEvent, now: Instant) {
        self.last_now = Some(now);
        if !self.attached {
            trace!(target: "floatdock.manager", id = id.get(), "pointer sample while detached");
            return;
        }
        let Some(floater) = self.floaters.get_mut(&id) else {
            debug!(target: "floatdock.manager", id = id.get(), "pointer sample for unknown floater");
            return;
        };
        let Some(accepted) = floater.on_pointer(
            event,
            now,
            &self.geometry,
            &mut self.renderer,
            &mut self.listener,
        ) else {
            return;
        };

        if accepted != Accepted::Down && !self.move_accept {
            return;
        }

        let signals = match accepted {
            Accepted::Down => {
                self.active = Some(id);
                self.move_accept = true;
                self.trash.on_down(floater.anchor(), now);
                Vec::new()
            }
            Accepted::Move => {
                let was_intersecting = matches!(floater.phase(), FloaterPhase::Intersecting { .. });
                let hit = self.trash.is_enabled()
                    && floater
                        .touch_rect(&self.geometry)
                        .intersects(&self.trash.capture_rect());
                if hit {
                    floater.set_intersecting(self.trash.icon_center());
                }
                if hit && !was_intersecting {
                    self.renderer.haptic_pulse(self.config.haptic_pulse());
                    self.trash.set_action_scale(true, now);
                } else if !hit && was_intersecting {
                    floater.set_normal(&self.geometry);
                    self.trash.set_action_scale(false, now);
                }
                let target = if hit {
                    floater.touch_anchor(&self.geometry)
                } else {
                    floater.anchor()
                };
                self.trash.on_move(target, now, &mut self.renderer)
            }
            Accepted::Release { rest } => {
                let finishing = matches!(floater.phase(), FloaterPhase::Intersecting { .. });
                let at = if finishing {
                    let touch = floater.touch_anchor(&self.geometry);
                    floater.set_finishing(&self.geometry, &mut self.renderer);
                    self.trash.set_action_scale(false, now);
                    touch
                } else {
                    rest
                };
                self.move_accept = false;
                debug!(
                    target: "floatdock.manager",
                    id = id.get(),
                    finishing,
                    x = at.x,
                    y = at.y,
                    "touch finished"
                );
                self.listener.on_touch_finished(id, finishing, at.x, at.y);
                self.trash.on_release(now, &mut self.renderer)
            }
        };
        self.handle_trash_signals(signals);
    }

    /// Fold a layout notification into every floater and the trash.
    pub fn on_layout_changed(&mut self, update: &LayoutUpdate, now: Instant) {
        self.last_now = Some(now);
        let change = self.geometry.apply(update);
        if change.is_none() {
            return;
        }
        self.trash.set_screen(self.geometry.screen());

        let mut interrupted = false;
        for floater in self.floaters.values_mut() {
            interrupted |= floater.on_layout(&self.geometry, change, &mut self.renderer);
        }
        if interrupted && self.move_accept {
            self.move_accept = false;
            if self.trash.action_icon_scale() != 1.0 {
                self.trash.set_action_scale(false, now);
            }
            let signals = self.trash.on_release(now, &mut self.renderer);
            self.handle_trash_signals(signals);
        }
        if change.fullscreen_changed {
            self.on_screen_changed(self.geometry.is_fullscreen(), now);
        }
    }

    /// The status bar appeared (`false`) or disappeared (`true`).
    ///
    /// Only acts in [`DisplayMode::HideFullscreen`].
    pub fn on_screen_changed(&mut self, fullscreen: bool, now: Instant) {
        self.last_now = Some(now);
        if self.display_mode != DisplayMode::HideFullscreen {
            return;
        }
        self.move_accept = false;
        let active = self
            .active
            .and_then(|id| self.floaters.get(&id).map(|f| (id, f.phase())));
        match active.map(|(_, phase)| phase) {
            Some(FloaterPhase::Finishing) => {}
            Some(FloaterPhase::Intersecting { .. }) => {
                if let Some(floater) = active.and_then(|(id, _)| self.floaters.get_mut(&id)) {
                    floater.set_finishing(&self.geometry, &mut self.renderer);
                }
                self.dismiss_trash(now);
            }
            Some(FloaterPhase::Normal) | None => {
                for floater in self.floaters.values_mut() {
                    floater.set_visible(!fullscreen, &self.geometry, &mut self.renderer);
                }
                self.dismiss_trash(now);
            }
        }
        debug!(target: "floatdock.manager", fullscreen, "screen changed");
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode, now: Instant) {
        self.last_now = Some(now);
        self.display_mode = mode;
        let visible = mode != DisplayMode::HideAlways;
        for floater in self.floaters.values_mut() {
            floater.set_visible(visible, &self.geometry, &mut self.renderer);
        }
        if !visible {
            self.move_accept = false;
            self.dismiss_trash(now);
        }
        debug!(target: "floatdock.manager", mode = ?mode, "display mode changed");
    }

    pub fn set_trash_enabled(&mut self, enabled: bool, now: Instant) {
        self.last_now = Some(now);
        let signals = self.trash.set_enabled(enabled, now, &mut self.renderer);
        self.handle_trash_signals(signals);
    }

    /// Intrinsic size of the trash icon that is always shown.
    pub fn set_fixed_trash_icon(&mut self, size: Size) {
        self.trash.set_fixed_icon(size);
    }

    /// Intrinsic size of the icon that grows under a floater; `None` removes it.
    pub fn set_action_trash_icon(&mut self, size: Option<Size>) {
        self.trash.set_action_icon(size);
        let measured = self
            .floaters
            .values()
            .find_map(|f| f.size().map(|s| (s, f.options().shape.factor())));
        if let Some((target, shape)) = measured {
            self.trash
                .calc_action_icon_padding(target, shape, &mut self.renderer);
        }
    }

    /// Remove one floater. Fires `on_finish_all` if it was the last one.
    pub fn remove_floater(&mut self, id: FloaterId) -> Result<()> {
        if !self.floaters.contains_key(&id) {
            return Err(EngineError::UnknownFloater(id));
        }
        if self.active == Some(id) && self.move_accept {
            self.move_accept = false;
            if let Some(now) = self.last_now {
                let signals = self.trash.on_release(now, &mut self.renderer);
                self.handle_trash_signals(signals);
            }
        }
        self.remove(id, true);
        Ok(())
    }

    /// Remove every floater without firing `on_finish_all`.
    pub fn remove_all(&mut self) {
        let ids: Vec<FloaterId> = self.floaters.keys().copied().collect();
        for id in ids {
            self.remove(id, false);
        }
        self.move_accept = false;
        self.trash.dismiss(&mut self.renderer);
    }

    /// The host views are back: resume and push the full visual state.
    pub fn on_attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        for floater in self.floaters.values().filter(|f| f.is_placed()) {
            self.renderer.set_position(floater.id(), floater.anchor());
            self.renderer.set_visibility(floater.id(), floater.is_visible());
        }
        self.trash.sync(&mut self.renderer);
        debug!(target: "floatdock.manager", floaters = self.floaters.len(), "attached");
    }

    /// The host views are gone: stop every animation and timer.
    pub fn on_detach(&mut self) {
        if !self.attached {
            return;
        }
        for floater in self.floaters.values_mut() {
            floater.halt(&mut self.renderer);
        }
        self.move_accept = false;
        self.trash.dismiss(&mut self.renderer);
        self.attached = false;
        debug!(target: "floatdock.manager", floaters = self.floaters.len(), "detached");
    }

    /// Advance timers and animations to `now`.
    pub fn tick(&mut self, now: Instant) {
        self.last_now = Some(now);
        if !self.attached {
            return;
        }
        for floater in self.floaters.values_mut() {
            floater.tick(now, &mut self.renderer, &mut self.listener);
        }
        let signals = self.trash.tick(now, &mut self.renderer);
        self.handle_trash_signals(signals);
    }

    /// When the host should call [`Self::tick`] next, or `None` when idle.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.attached {
            return None;
        }
        let animating = self.trash.is_animating() || self.floaters.values().any(Floater::is_animating);
        let frame = self
            .last_now
            .filter(|_| animating)
            .map(|now| now + self.config.frame_period());
        self.floaters
            .values()
            .filter_map(Floater::next_deadline)
            .chain(self.trash.pending_open())
            .chain(frame)
            .min()
    }

    fn dismiss_trash(&mut self, now: Instant) {
        self.trash.dismiss(&mut self.renderer);
        let signals = self.trash.tick(now, &mut self.renderer);
        self.handle_trash_signals(signals);
    }

    fn set_all_draggable(&mut self, draggable: bool) {
        for floater in self.floaters.values_mut() {
            floater.set_draggable(draggable, &self.geometry, &mut self.renderer);
        }
    }

    fn handle_trash_signals(&mut self, signals: Vec<TrashSignal>) {
        for signal in signals {
            trace!(target: "floatdock.trash", signal = ?signal, "trash signal");
            match signal {
                TrashSignal::Started(TrashAnimation::Close | TrashAnimation::ForceClose) => {
                    self.set_all_draggable(false);
                }
                TrashSignal::Started(TrashAnimation::Open) => {}
                TrashSignal::Ended(_) => {
                    if let Some(id) = self.active
                        && self
                            .floaters
                            .get(&id)
                            .is_some_and(|f| f.phase() == FloaterPhase::Finishing)
                    {
                        self.remove(id, true);
                    }
                    self.set_all_draggable(true);
                }
            }
        }
    }

    fn remove(&mut self, id: FloaterId, notify_empty: bool) {
        if self.floaters.remove(&id).is_none() {
            return;
        }
        if self.active == Some(id) {
            self.active = None;
        }
        self.renderer.remove(id);
        let finish_all = notify_empty && self.floaters.is_empty();
        debug!(
            target: "floatdock.manager",
            id = id.get(),
            count = self.floaters.len(),
            finish_all,
            "floater removed"
        );
        if finish_all {
            self.listener.on_finish_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingListener, RecordingRenderer};
    use crate::trash::TrashPhase;
    use floatdock_core::geometry::{Point, PointF};
    use std::time::Duration;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn manager() -> FloatManager<RecordingRenderer, RecordingListener> {
        FloatManager::new(
            EngineConfig::default(),
            DisplayProfile::default(),
            &LayoutUpdate::portrait(1000, 2000),
            RecordingRenderer::new(),
            RecordingListener::new(),
        )
    }

    fn fixed() -> FloaterOptions {
        FloaterOptions::default().with_size(Size::new(100, 100))
    }

    fn grip() -> PointF {
        PointF::new(50.0, 50.0)
    }

    #[test]
    fn ids_are_unique_and_lookups_fail_cleanly() {
        let mut m = manager();
        let t0 = Instant::now();
        let a = m.add_floater(fixed(), t0);
        let b = m.add_floater(fixed(), t0);
        assert_ne!(a, b);
        assert_eq!(m.len(), 2);

        m.remove_floater(a).unwrap();
        assert!(matches!(m.remove_floater(a), Err(EngineError::UnknownFloater(id)) if id == a));
        assert!(m.floater_state(a).is_err());
        assert!(m.floater_state(b).is_ok());
        assert_eq!(m.listener().finish_all_count(), 0);

        m.remove_floater(b).unwrap();
        assert_eq!(m.listener().finish_all_count(), 1);
        assert_eq!(m.renderer().removed(), vec![a, b]);
    }

    #[test]
    fn remove_all_stays_quiet() {
        let mut m = manager();
        let t0 = Instant::now();
        m.add_floater(fixed(), t0);
        m.add_floater(fixed(), t0);
        m.remove_all();
        assert!(m.is_empty());
        assert_eq!(m.listener().finish_all_count(), 0);
    }

    #[test]
    fn wrap_content_waits_for_measure() {
        let mut m = manager();
        let t0 = Instant::now();
        let id = m.add_floater(FloaterOptions::default(), t0);
        assert_eq!(m.renderer().last_position(id), None);
        m.on_measure(id, Size::new(0, 0), t0);
        assert_eq!(m.renderer().last_position(id), None);
        m.on_measure(id, Size::new(80, 80), t0);
        assert_eq!(m.renderer().last_position(id), Some(Point::new(0, 1920)));
    }

    #[test]
    fn hide_always_hides_new_and_existing_floaters() {
        let mut m = manager();
        let t0 = Instant::now();
        let a = m.add_floater(fixed(), t0);
        m.set_display_mode(DisplayMode::HideAlways, t0);
        let b = m.add_floater(fixed(), t0);
        assert!(!m.floater_state(a).unwrap().visible);
        assert!(!m.floater_state(b).unwrap().visible);

        m.set_display_mode(DisplayMode::ShowAlways, t0);
        assert!(m.floater_state(a).unwrap().visible);
        assert!(m.floater_state(b).unwrap().visible);
    }

    #[test]
    fn screen_change_toggles_visibility_only_when_hiding_fullscreen() {
        let mut m = manager();
        let t0 = Instant::now();
        let id = m.add_floater(fixed(), t0);
        m.on_screen_changed(true, t0);
        assert!(!m.floater_state(id).unwrap().visible);
        m.on_screen_changed(false, t0);
        assert!(m.floater_state(id).unwrap().visible);

        m.set_display_mode(DisplayMode::ShowAlways, t0);
        m.on_screen_changed(true, t0);
        assert!(m.floater_state(id).unwrap().visible);
    }

    #[test]
    fn release_closes_trash_and_blocks_drags_until_closed() {
        let mut m = manager();
        let t0 = Instant::now();
        let id = m.add_floater(fixed(), t0);
        let raw = PointF::new(50.0, 50.0);
        m.on_pointer(id, &PointerEvent::down(raw, grip(), 1), t0);
        assert_eq!(m.active(), Some(id));
        m.on_pointer(id, &PointerEvent::moved(PointF::new(400.0, 300.0), grip(), 1), t0 + ms(20));
        m.on_pointer(id, &PointerEvent::up(PointF::new(400.0, 300.0), grip(), 1), t0 + ms(40));
        assert!(!m.floater_state(id).unwrap().draggable);

        let mut at = t0 + ms(40);
        while let Some(next) = m.next_deadline() {
            at = next;
            m.tick(at);
            if at > t0 + ms(5_000) {
                break;
            }
        }
        let state = m.floater_state(id).unwrap();
        assert!(state.draggable);
        assert_eq!(state.anchor, Point::new(0, 1650));
        assert!(m.next_deadline().is_none());
        assert_eq!(m.listener().touch_finished(), vec![(id, false, 0, 1650)]);
    }

    #[test]
    fn detach_drops_samples_and_ticks() {
        let mut m = manager();
        let t0 = Instant::now();
        let id = m.add_floater(fixed(), t0);
        m.on_detach();
        assert!(m.next_deadline().is_none());
        m.on_pointer(id, &PointerEvent::down(PointF::new(50.0, 50.0), grip(), 1), t0);
        assert_eq!(m.active(), None);

        m.renderer_mut().clear();
        m.on_attach();
        assert_eq!(m.renderer().last_position(id), Some(Point::new(0, 1900)));
        m.on_pointer(id, &PointerEvent::down(PointF::new(50.0, 50.0), grip(), 2), t0 + ms(10));
        assert_eq!(m.active(), Some(id));
    }

    #[test]
    fn pending_long_press_sets_the_deadline() {
        let mut m = manager();
        let t0 = Instant::now();
        let id = m.add_floater(fixed(), t0);
        m.on_pointer(id, &PointerEvent::down(PointF::new(50.0, 50.0), grip(), 1), t0);
        // Touch-follow is running, so the next frame comes first.
        assert_eq!(m.next_deadline(), Some(t0 + ms(17)));
    }

    #[test]
    fn disabled_trash_never_captures() {
        let config = EngineConfig {
            trash_enabled: false,
            ..EngineConfig::default()
        };
        let mut m = FloatManager::new(
            config,
            DisplayProfile::default(),
            &LayoutUpdate::portrait(1000, 2000),
            RecordingRenderer::new(),
            RecordingListener::new(),
        );
        assert!(!m.trash().is_enabled());
        assert_eq!(m.trash().phase(), TrashPhase::Hidden);
        assert!(m.renderer().commands().is_empty());
        assert!(m.listener().events().is_empty());
        m.set_fixed_trash_icon(Size::new(100, 100));
        let t0 = Instant::now();
        let id = m.add_floater(fixed(), t0);
        m.on_pointer(id, &PointerEvent::down(PointF::new(50.0, 50.0), grip(), 1), t0);
        m.on_pointer(id, &PointerEvent::moved(PointF::new(500.0, 1950.0), grip(), 1), t0 + ms(20));
        assert_eq!(m.floater_state(id).unwrap().phase, FloaterPhase::Normal);
        assert_eq!(m.renderer().haptic_count(), 0);
    }
}
