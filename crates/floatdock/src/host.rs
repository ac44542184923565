#![forbid(unsafe_code)]

//! Capability traits the host implements.
//!
//! The engine never draws. It pushes visual state through [`Renderer`] and
//! reports user intent through [`FloatListener`]. Both are called
//! synchronously from inside the [`crate::FloatManager`] entry point that
//! caused the change.

use std::time::Duration;

use floatdock_core::geometry::Point;

use crate::floater::FloaterId;

/// Visual state sink.
pub trait Renderer {
    /// Place a floater's anchor (bottom-left origin).
    fn set_position(&mut self, id: FloaterId, position: Point);

    fn set_scale(&mut self, id: FloaterId, scale: f32);

    fn set_visibility(&mut self, id: FloaterId, visible: bool);

    /// Alpha of the trash background and icons.
    fn trash_set_alpha(&mut self, alpha: f32);

    /// Horizontal offset of the trash icon from the screen center.
    fn trash_set_icon_translation_x(&mut self, dx: f32);

    /// Vertical offset of the trash icon (top-left origin, positive is down).
    fn trash_set_icon_translation_y(&mut self, dy: f32);

    fn trash_set_action_icon_scale(&mut self, scale: f32);

    /// Padding that keeps the scaled action icon inside its frame.
    fn trash_set_action_icon_padding(&mut self, horizontal: i32, vertical: i32);

    /// Short vibration when a floater enters the trash.
    fn haptic_pulse(&mut self, _duration: Duration) {}

    /// The floater left the engine; drop its view.
    fn remove(&mut self, _id: FloaterId) {}
}

/// User-intent sink. Every method defaults to a no-op.
pub trait FloatListener {
    fn on_click(&mut self, _id: FloaterId, _child: usize) {}

    fn on_long_click(&mut self, _id: FloaterId, _child: usize) {}

    /// A gesture ended. `finishing` is set when the floater was dropped on
    /// the trash. `x`/`y` is where the floater will rest, or the anchor
    /// implied by the last pointer sample when that is not known.
    fn on_touch_finished(&mut self, _id: FloaterId, _finishing: bool, _x: i32, _y: i32) {}

    /// The last floater was removed.
    fn on_finish_all(&mut self) {}
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn set_position(&mut self, id: FloaterId, position: Point) {
        (**self).set_position(id, position);
    }

    fn set_scale(&mut self, id: FloaterId, scale: f32) {
        (**self).set_scale(id, scale);
    }

    fn set_visibility(&mut self, id: FloaterId, visible: bool) {
        (**self).set_visibility(id, visible);
    }

    fn trash_set_alpha(&mut self, alpha: f32) {
        (**self).trash_set_alpha(alpha);
    }

    fn trash_set_icon_translation_x(&mut self, dx: f32) {
        (**self).trash_set_icon_translation_x(dx);
    }

    fn trash_set_icon_translation_y(&mut self, dy: f32) {
        (**self).trash_set_icon_translation_y(dy);
    }

    fn trash_set_action_icon_scale(&mut self, scale: f32) {
        (**self).trash_set_action_icon_scale(scale);
    }

    fn trash_set_action_icon_padding(&mut self, horizontal: i32, vertical: i32) {
        (**self).trash_set_action_icon_padding(horizontal, vertical);
    }

    fn haptic_pulse(&mut self, duration: Duration) {
        (**self).haptic_pulse(duration);
    }

    fn remove(&mut self, id: FloaterId) {
        (**self).remove(id);
    }
}

impl<L: FloatListener + ?Sized> FloatListener for &mut L {
    fn on_click(&mut self, id: FloaterId, child: usize) {
        (**self).on_click(id, child);
    }

    fn on_long_click(&mut self, id: FloaterId, child: usize) {
        (**self).on_long_click(id, child);
    }

    fn on_touch_finished(&mut self, id: FloaterId, finishing: bool, x: i32, y: i32) {
        (**self).on_touch_finished(id, finishing, x, y);
    }

    fn on_finish_all(&mut self) {
        (**self).on_finish_all();
    }
}
