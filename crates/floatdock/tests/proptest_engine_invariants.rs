//! Property-based invariant tests for the multi-floater engine.
//!
//! 1. After any sequence of drags, taps, layout changes and display-mode
//!    flips, every resting floater lies inside its position limit.
//! 2. Once the engine is idle, every floater is draggable again.
//! 3. A press that never leaves the slop is exactly one click and never
//!    moves the floater.
//! 4. Samples from a gesture ended by hiding the floater change nothing.
//! 5. `on_finish_all` fires at most once and only when the arena is empty.

use std::time::Duration;

use floatdock::{
    DisplayMode, DisplayProfile, EngineConfig, FloatManager, FloaterId, FloaterOptions, Instant, LayoutUpdate,
    MoveDirection, Point, PointF, PointerEvent, RecordingListener, RecordingRenderer, Size,
};
use proptest::prelude::*;

type Engine = FloatManager<RecordingRenderer, RecordingListener>;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Drag { floater: usize, path: Vec<(i32, i32)> },
    Tap { floater: usize },
    Layout { width: i32, height: i32, portrait: bool },
    Mode(DisplayMode),
    Screen(bool),
}

fn direction_strategy() -> impl Strategy<Value = MoveDirection> {
    prop_oneof![
        Just(MoveDirection::Default),
        Just(MoveDirection::Left),
        Just(MoveDirection::Right),
        Just(MoveDirection::None),
        Just(MoveDirection::Nearest),
        Just(MoveDirection::Thrown),
    ]
}

fn options_strategy() -> impl Strategy<Value = FloaterOptions> {
    (
        direction_strategy(),
        any::<bool>(),
        any::<bool>(),
        0i32..40,
        40i32..200,
        (0i32..1500, 0i32..2500),
    )
        .prop_map(|(direction, physics, animate, over_margin, side, (x, y))| {
            FloaterOptions::default()
                .with_move_direction(direction)
                .with_physics(physics)
                .with_animate_initial_move(animate)
                .with_over_margin(over_margin)
                .with_size(Size::new(side, side))
                .with_initial_anchor(Point::new(x, y))
        })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..4, prop::collection::vec((-400i32..400, -400i32..400), 1..6))
            .prop_map(|(floater, path)| Op::Drag { floater, path }),
        1 => (0usize..4).prop_map(|floater| Op::Tap { floater }),
        2 => (300i32..2400, 300i32..2400, any::<bool>())
            .prop_map(|(width, height, portrait)| Op::Layout { width, height, portrait }),
        1 => prop_oneof![
            Just(DisplayMode::ShowAlways),
            Just(DisplayMode::HideAlways),
            Just(DisplayMode::HideFullscreen),
        ]
        .prop_map(Op::Mode),
        1 => any::<bool>().prop_map(Op::Screen),
    ]
}

// ── Driver ──────────────────────────────────────────────────────────────

struct Driver {
    engine: Engine,
    t0: Instant,
    clock: u64,
    down_time: u64,
}

impl Driver {
    fn new(options: Vec<FloaterOptions>) -> (Self, Vec<FloaterId>) {
        let engine = FloatManager::new(
            EngineConfig::default(),
            DisplayProfile::default(),
            &LayoutUpdate::portrait(1000, 2000),
            RecordingRenderer::new(),
            RecordingListener::new(),
        );
        let mut driver = Self {
            engine,
            t0: Instant::now(),
            clock: 0,
            down_time: 0,
        };
        let now = driver.now();
        let ids = options
            .into_iter()
            .map(|o| driver.engine.add_floater(o, now))
            .collect();
        driver.settle();
        (driver, ids)
    }

    fn now(&self) -> Instant {
        self.t0 + Duration::from_millis(self.clock)
    }

    fn advance(&mut self, ms: u64) -> Instant {
        self.clock += ms;
        self.now()
    }

    fn settle(&mut self) {
        let mut guard = 0;
        while let Some(next) = self.engine.next_deadline() {
            self.engine.tick(next);
            self.clock = next.duration_since(self.t0).as_millis() as u64;
            guard += 1;
            assert!(guard < 20_000, "engine never went idle");
        }
    }

    /// Raw pointer sample for `anchor` with the floater grabbed at its center.
    fn raw(&self, anchor: Point, size: Size) -> PointF {
        let screen_h = self.engine.geometry().screen().height;
        PointF::new(
            (anchor.x + size.width / 2) as f32,
            (screen_h - anchor.y - size.height / 2) as f32,
        )
    }

    fn grip(size: Size) -> PointF {
        PointF::new((size.width / 2) as f32, (size.height / 2) as f32)
    }

    fn apply(&mut self, ids: &[FloaterId], op: &Op) {
        match op {
            Op::Drag { floater, path } => {
                let id = ids[floater % ids.len()];
                let Ok(state) = self.engine.floater_state(id) else {
                    return;
                };
                let size = state.size.unwrap_or_default();
                let grip = Self::grip(size);
                self.down_time += 1;
                let mut at = state.anchor;
                let now = self.advance(5);
                let down = PointerEvent::down(self.raw(at, size), grip, self.down_time);
                self.engine.on_pointer(id, &down, now);
                for (dx, dy) in path {
                    at = Point::new(at.x + dx, at.y + dy);
                    let now = self.advance(16);
                    let moved = PointerEvent::moved(self.raw(at, size), grip, self.down_time);
                    self.engine.on_pointer(id, &moved, now);
                    self.engine.tick(now);
                }
                let now = self.advance(16);
                let up = PointerEvent::up(self.raw(at, size), grip, self.down_time);
                self.engine.on_pointer(id, &up, now);
            }
            Op::Tap { floater } => {
                let id = ids[floater % ids.len()];
                let Ok(state) = self.engine.floater_state(id) else {
                    return;
                };
                let size = state.size.unwrap_or_default();
                self.down_time += 1;
                let raw = self.raw(state.anchor, size);
                let now = self.advance(5);
                self.engine
                    .on_pointer(id, &PointerEvent::down(raw, Self::grip(size), self.down_time), now);
                let now = self.advance(40);
                self.engine
                    .on_pointer(id, &PointerEvent::up(raw, Self::grip(size), self.down_time), now);
            }
            Op::Layout {
                width,
                height,
                portrait,
            } => {
                let update = if *portrait {
                    LayoutUpdate::portrait(*width, *height)
                } else {
                    LayoutUpdate::landscape(*width, *height)
                };
                let now = self.advance(5);
                self.engine.on_layout_changed(&update, now);
            }
            Op::Mode(mode) => {
                let now = self.advance(5);
                self.engine.set_display_mode(*mode, now);
            }
            Op::Screen(fullscreen) => {
                let now = self.advance(5);
                self.engine.on_screen_changed(*fullscreen, now);
            }
        }
        self.settle();
    }

    fn assert_resting_inside_limits(&self) {
        for id in self.engine.floater_ids() {
            let state = self.engine.floater_state(id).expect("listed id resolves");
            let p = state.limits.position;
            let a = state.anchor;
            assert!(
                a.x >= p.left - 1 && a.x <= p.right + 1 && a.y >= p.top - 1 && a.y <= p.bottom + 1,
                "floater {id} at {a:?} outside {p:?}"
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1-2. Resting anchors stay clamped; idle engine leaves everything draggable
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn arbitrary_sessions_keep_floaters_inside_limits(
        options in prop::collection::vec(options_strategy(), 1..4),
        ops in prop::collection::vec(op_strategy(), 1..12),
    ) {
        let (mut driver, ids) = Driver::new(options);
        driver.assert_resting_inside_limits();
        for op in &ops {
            driver.apply(&ids, op);
            driver.assert_resting_inside_limits();
        }
        for id in driver.engine.floater_ids() {
            let state = driver.engine.floater_state(id).expect("listed id resolves");
            prop_assert!(state.draggable, "floater {} stuck undraggable", id);
            prop_assert!(state.animator.is_none());
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // 5. on_finish_all only on an empty arena, at most once
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn finish_all_only_when_empty(
        options in prop::collection::vec(options_strategy(), 1..4),
        ops in prop::collection::vec(op_strategy(), 1..12),
    ) {
        let (mut driver, ids) = Driver::new(options);
        for op in &ops {
            driver.apply(&ids, op);
            let fired = driver.engine.listener().finish_all_count();
            prop_assert!(fired <= 1);
            if fired == 1 {
                prop_assert!(driver.engine.is_empty());
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Presses inside the slop are clicks
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn jitter_inside_slop_is_one_click(
        jitter in prop::collection::vec((-7i32..=7, -7i32..=7), 0..8),
        hold_ms in 10u64..600,
    ) {
        let options = FloaterOptions::default()
            .with_size(Size::new(100, 100))
            .with_initial_anchor(Point::new(900, 1000));
        let (mut driver, ids) = Driver::new(vec![options]);
        let id = ids[0];
        let start = driver.engine.floater_state(id).expect("added").anchor;
        let size = Size::new(100, 100);
        let grip = Driver::grip(size);

        let now = driver.advance(5);
        driver.engine.on_pointer(id, &PointerEvent::down(driver.raw(start, size), grip, 1), now);
        let step = hold_ms / (jitter.len() as u64 + 1);
        let mut last = start;
        for (dx, dy) in &jitter {
            last = Point::new(start.x + dx, start.y + dy);
            let now = driver.advance(step);
            driver.engine.on_pointer(id, &PointerEvent::moved(driver.raw(last, size), grip, 1), now);
            driver.engine.tick(now);
        }
        let now = driver.advance(step);
        driver.engine.on_pointer(id, &PointerEvent::up(driver.raw(last, size), grip, 1), now);
        driver.settle();

        prop_assert_eq!(driver.engine.listener().clicks(), 1);
        prop_assert_eq!(driver.engine.listener().long_clicks(), 0);
        prop_assert_eq!(driver.engine.floater_state(id).expect("alive").anchor, start);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Hiding mid-drag gates the rest of the gesture
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn samples_after_hide_are_dropped(
        before in prop::collection::vec((-300i32..300, -300i32..300), 1..4),
        after in prop::collection::vec((-300i32..300, -300i32..300), 0..4),
    ) {
        let options = FloaterOptions::default()
            .with_size(Size::new(100, 100))
            .with_initial_anchor(Point::new(0, 1000));
        let (mut driver, ids) = Driver::new(vec![options]);
        let id = ids[0];
        let size = Size::new(100, 100);
        let grip = Driver::grip(size);
        let start = driver.engine.floater_state(id).expect("added").anchor;

        let now = driver.advance(5);
        driver.engine.on_pointer(id, &PointerEvent::down(driver.raw(start, size), grip, 1), now);
        let mut at = start;
        for (dx, dy) in &before {
            at = Point::new(at.x + dx, at.y + dy);
            let now = driver.advance(16);
            driver.engine.on_pointer(id, &PointerEvent::moved(driver.raw(at, size), grip, 1), now);
        }

        let now = driver.advance(5);
        driver.engine.set_display_mode(DisplayMode::HideAlways, now);
        driver.engine.set_display_mode(DisplayMode::ShowAlways, now);
        driver.settle();
        let frozen = driver.engine.floater_state(id).expect("alive");
        let finished = driver.engine.listener().touch_finished().len();

        for (dx, dy) in &after {
            at = Point::new(at.x + dx, at.y + dy);
            let now = driver.advance(16);
            driver.engine.on_pointer(id, &PointerEvent::moved(driver.raw(at, size), grip, 1), now);
        }
        let now = driver.advance(16);
        driver.engine.on_pointer(id, &PointerEvent::up(driver.raw(at, size), grip, 1), now);
        driver.settle();

        let state = driver.engine.floater_state(id).expect("alive");
        prop_assert_eq!(state.anchor, frozen.anchor);
        prop_assert_eq!(driver.engine.listener().touch_finished().len(), finished);
        prop_assert_eq!(driver.engine.listener().clicks(), 0);
    }
}
