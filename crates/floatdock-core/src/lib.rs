#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: geometry, display model, animation, gesture and motion primitives.
//!
//! # Role in floatdock
//! `floatdock-core` holds everything a single floater needs that does not
//! depend on other floaters or on the trash target. The controller crate
//! (`floatdock`) composes these pieces into a multi-floater engine.
//!
//! # Primary responsibilities
//! - **Geometry**: anchor-space rectangles, movement/position limits and the
//!   proportional re-map used on screen changes.
//! - **Display**: status/navigation bar, cutout and rotation bookkeeping.
//! - **Animation**: capture curve, overshoot tween, spring and fling.
//! - **Gesture**: press, drag, long press and click recognition with the
//!   down-time gate and release velocity.
//! - **Motion**: one animator per floater, release planning and edge goals.
//!
//! # Time
//! Nothing here reads a clock. Entry points take an [`Instant`] (or a
//! `Duration`) from the caller, which keeps replayed gestures deterministic.

pub mod animation;
pub mod display;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod motion;
pub mod velocity;

pub use web_time::Instant;

pub use display::{ChromeFlags, DisplayGeometry, DisplayProfile, GeometryChange, LayoutUpdate, Rotation};
pub use geometry::{Insets, Limits, Point, PointF, Rect, Size};
pub use gesture::{GestureConfig, GestureEvent, GesturePhase, GestureTracker, PointerAction, PointerEvent};
pub use motion::{Motion, MotionConfig, MoveDirection, ReleasePlan, Step};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
