//! Property-based invariant tests for geometry, curves and gestures.
//!
//! 1. Limits are never inverted and clamp always lands inside.
//! 2. A proportional re-map followed by clamping stays inside the new limit.
//! 3. Applying the same layout twice is idempotent.
//! 4. The capture curve is continuous and bounded.
//! 5. Stale pointer events never change gesture state.
//! 6. Click vs drag is decided by the peak displacement against the slop.

use std::time::Duration;

use floatdock_core::animation::capture_curve;
use floatdock_core::display::{ChromeFlags, DisplayGeometry, DisplayProfile, LayoutUpdate};
use floatdock_core::geometry::{Insets, Limits, Point, PointF, Size, remap_proportional};
use floatdock_core::gesture::{GestureConfig, GestureEvent, GestureTracker, PointerEvent};
use floatdock_core::Instant;
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn profile_strategy() -> impl Strategy<Value = DisplayProfile> {
    (0i32..120, 0i32..120, 0i32..200, 0i32..200, any::<bool>(), any::<bool>()).prop_map(
        |(status, status_rot, nav, nav_rot, soft, tablet)| DisplayProfile {
            density: 2.0,
            status_bar_height: status,
            status_bar_rotated_height: status_rot,
            nav_bar_height: nav,
            nav_bar_rotated_height: nav_rot,
            has_soft_nav_bar: soft,
            is_tablet: tablet,
        },
    )
}

fn layout_strategy() -> impl Strategy<Value = LayoutUpdate> {
    (
        100i32..3000,
        100i32..3000,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        0i32..150,
        0i32..150,
    )
        .prop_map(|(w, h, portrait, status_hidden, nav_hidden, inset_top, left)| {
            let base = if portrait {
                LayoutUpdate::portrait(w, h)
            } else {
                LayoutUpdate::landscape(w, h)
            };
            let mut flags = base.flags;
            flags.set(ChromeFlags::STATUS_BAR_HIDDEN, status_hidden);
            flags.set(ChromeFlags::NAV_BAR_HIDDEN, nav_hidden);
            base.with_flags(flags)
                .with_safe_insets(Insets::top(inset_top))
                .with_window_rect(floatdock_core::Rect::new(left, 0, w, h))
        })
}

fn size_strategy() -> impl Strategy<Value = Size> {
    (1i32..400, 1i32..400).prop_map(|(w, h)| Size::new(w, h))
}

// ── Geometry ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn limits_are_never_inverted(
        profile in profile_strategy(),
        layout in layout_strategy(),
        size in size_strategy(),
        over_margin in 0i32..100,
    ) {
        let geometry = DisplayGeometry::new(profile, &layout);
        let limits = Limits::compute(geometry.limit_inputs(), size, over_margin);
        prop_assert!(limits.position.left <= limits.position.right);
        prop_assert!(limits.position.top <= limits.position.bottom);
        prop_assert!(limits.movement.left <= limits.movement.right);
        prop_assert!(limits.movement.top <= limits.movement.bottom);
    }

    #[test]
    fn anchor_stays_inside_after_layout_sequence(
        profile in profile_strategy(),
        first in layout_strategy(),
        updates in prop::collection::vec(layout_strategy(), 1..8),
        size in size_strategy(),
        x in -500i32..3500,
        y in -500i32..3500,
    ) {
        let mut geometry = DisplayGeometry::new(profile, &first);
        let mut limits = Limits::compute(geometry.limit_inputs(), size, 0);
        let mut anchor = limits.position.clamp(Point::new(x, y));
        for update in &updates {
            geometry.apply(update);
            let next = Limits::compute(geometry.limit_inputs(), size, 0);
            anchor = remap_proportional(anchor, &limits.position, &next.position);
            limits = next;
            prop_assert!(limits.position.contains(anchor), "{anchor:?} outside {:?}", limits.position);
        }
    }

    #[test]
    fn applying_same_layout_twice_is_idempotent(
        profile in profile_strategy(),
        first in layout_strategy(),
        layout in layout_strategy(),
        size in size_strategy(),
    ) {
        let mut geometry = DisplayGeometry::new(profile, &first);
        geometry.apply(&layout);
        let once = Limits::compute(geometry.limit_inputs(), size, 0);
        let change = geometry.apply(&layout);
        let twice = Limits::compute(geometry.limit_inputs(), size, 0);
        prop_assert_eq!(once, twice);
        prop_assert!(change.is_none());
    }
}

// ── Curves ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn capture_curve_is_continuous(t in 0.0f32..0.999) {
        let a = capture_curve(t);
        let b = capture_curve(t + 0.001);
        prop_assert!((a - b).abs() < 0.02, "jump between {} and {}", a, b);
        prop_assert!((-0.01..=1.11).contains(&a));
    }
}

// ── Gestures ────────────────────────────────────────────────────────────

fn local() -> PointF {
    PointF::new(10.0, 10.0)
}

proptest! {
    #[test]
    fn stale_events_never_change_state(
        down_time in 1u64..1000,
        offset in 1u64..1000,
        dx in -500.0f32..500.0,
    ) {
        let mut tracker = GestureTracker::new(GestureConfig::default());
        let t = Instant::now();
        tracker.process(&PointerEvent::down(PointF::new(500.0, 500.0), local(), down_time), t);
        let phase = tracker.phase();
        let stale = down_time + offset;

        let moved = tracker.process(
            &PointerEvent::moved(PointF::new(500.0 + dx, 500.0), local(), stale),
            t + Duration::from_millis(10),
        );
        let up = tracker.process(
            &PointerEvent::up(PointF::new(500.0 + dx, 500.0), local(), stale),
            t + Duration::from_millis(20),
        );
        prop_assert!(moved.is_empty());
        prop_assert!(up.is_empty());
        prop_assert_eq!(tracker.phase(), phase);
        prop_assert_eq!(tracker.last_raw(), PointF::new(500.0, 500.0));
    }

    #[test]
    fn click_iff_peak_displacement_below_slop(
        path in prop::collection::vec((-20.0f32..20.0, -20.0f32..20.0), 0..10),
    ) {
        let config = GestureConfig::default();
        let slop = config.slop;
        let mut tracker = GestureTracker::new(config);
        let t = Instant::now();
        let origin = PointF::new(500.0, 500.0);
        tracker.process(&PointerEvent::down(origin, local(), 1), t);

        let mut peak = 0.0f32;
        let mut last = origin;
        for (i, (dx, dy)) in path.iter().enumerate() {
            last = PointF::new(origin.x + dx, origin.y + dy);
            peak = peak.max(origin.chebyshev_distance(last));
            tracker.process(
                &PointerEvent::moved(last, local(), 1),
                t + Duration::from_millis(10 * (i as u64 + 1)),
            );
        }
        let events = tracker.process(&PointerEvent::up(last, local(), 1), t + Duration::from_millis(200));
        let clicks = events.iter().filter(|e| **e == GestureEvent::Click).count();
        if peak < slop {
            prop_assert_eq!(clicks, 1);
        } else {
            prop_assert_eq!(clicks, 0);
        }
    }
}
