#![forbid(unsafe_code)]

//! Display metrics and system-chrome model.
//!
//! [`DisplayGeometry`] folds layout notifications (window rect, bar
//! visibility, orientation, cutout insets) together with the static facts of
//! a device ([`DisplayProfile`]) into the handful of numbers the limit
//! rectangles need: usable screen size, status bar height, navigation bar
//! offsets and touch offsets.
//!
//! # Inset policy
//!
//! - The status bar contributes nothing when hidden, uses the rotated height
//!   in landscape, and is neutralized in portrait when a top cutout exists
//!   (the cutout already excludes it from the usable height).
//! - A navigation bar sits at the bottom on tablets and in portrait, and on
//!   the side of phones in landscape. Autohiding bars are detected from
//!   contradictions between the configured base heights and what the window
//!   rect reveals; anything inconsistent falls back to a zero offset.
//!
//! # Failure Modes
//!
//! - Measurements that contradict the profile never produce negative sizes:
//!   derived offsets are plain integers and the limit computation collapses
//!   inverted spans.

use bitflags::bitflags;

use crate::geometry::{Insets, LimitInputs, Point, PointF, Rect, Size};
use crate::logging::debug;

bitflags! {
    /// Visibility and orientation flags carried by a layout notification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChromeFlags: u8 {
        /// The status bar is hidden (fullscreen).
        const STATUS_BAR_HIDDEN = 0b0001;
        /// The navigation bar is hidden.
        const NAV_BAR_HIDDEN    = 0b0010;
        /// The display is in portrait orientation.
        const PORTRAIT          = 0b0100;
    }
}

/// Display rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Build from a degree value; anything unrecognized is treated as 0.
    #[must_use]
    pub const fn from_degrees(degrees: u32) -> Self {
        match degrees % 360 {
            90 => Self::Deg90,
            180 => Self::Deg180,
            270 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Degree value of this rotation.
    #[must_use]
    pub const fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// Static facts about the device, supplied once by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayProfile {
    /// Pixels per density-independent pixel.
    pub density: f32,
    /// Status bar height in portrait.
    pub status_bar_height: i32,
    /// Status bar height in landscape.
    pub status_bar_rotated_height: i32,
    /// Navigation bar height when drawn at the bottom.
    pub nav_bar_height: i32,
    /// Navigation bar width when drawn on the side (phone landscape).
    pub nav_bar_rotated_height: i32,
    /// Whether the navigation bar is a software bar.
    pub has_soft_nav_bar: bool,
    /// Tablets keep the navigation bar at the bottom in every orientation.
    pub is_tablet: bool,
}

impl Default for DisplayProfile {
    fn default() -> Self {
        Self {
            density: 1.0,
            status_bar_height: 0,
            status_bar_rotated_height: 0,
            nav_bar_height: 0,
            nav_bar_rotated_height: 0,
            has_soft_nav_bar: true,
            is_tablet: false,
        }
    }
}

impl DisplayProfile {
    /// Convert density-independent pixels to pixels.
    #[inline]
    #[must_use]
    pub fn dp(&self, value: f32) -> f32 {
        value * self.density
    }
}

/// One layout notification from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutUpdate {
    /// Usable display size (excludes system bars the platform already removes).
    pub display_size: Size,
    /// Physical display size.
    pub real_size: Size,
    /// Visible window frame in top-left origin screen coordinates.
    pub window_rect: Rect,
    pub flags: ChromeFlags,
    pub rotation: Rotation,
    /// Cutout safe insets.
    pub safe_insets: Insets,
}

impl LayoutUpdate {
    /// Portrait layout with no system chrome.
    #[must_use]
    pub fn portrait(width: i32, height: i32) -> Self {
        let size = Size::new(width, height);
        Self {
            display_size: size,
            real_size: size,
            window_rect: Rect::new(0, 0, width, height),
            flags: ChromeFlags::PORTRAIT,
            rotation: Rotation::Deg0,
            safe_insets: Insets::default(),
        }
    }

    /// Landscape layout with no system chrome.
    #[must_use]
    pub fn landscape(width: i32, height: i32) -> Self {
        let size = Size::new(width, height);
        Self {
            display_size: size,
            real_size: size,
            window_rect: Rect::new(0, 0, width, height),
            flags: ChromeFlags::empty(),
            rotation: Rotation::Deg90,
            safe_insets: Insets::default(),
        }
    }

    /// Set the chrome flags (builder pattern).
    #[must_use]
    pub fn with_flags(mut self, flags: ChromeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the cutout insets (builder pattern).
    #[must_use]
    pub fn with_safe_insets(mut self, insets: Insets) -> Self {
        self.safe_insets = insets;
        self
    }

    /// Set the window frame (builder pattern).
    #[must_use]
    pub fn with_window_rect(mut self, rect: Rect) -> Self {
        self.window_rect = rect;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_portrait(&self) -> bool {
        self.flags.contains(ChromeFlags::PORTRAIT)
    }

    #[inline]
    #[must_use]
    pub fn is_status_bar_hidden(&self) -> bool {
        self.flags.contains(ChromeFlags::STATUS_BAR_HIDDEN)
    }

    #[inline]
    #[must_use]
    pub fn is_nav_bar_hidden(&self) -> bool {
        self.flags.contains(ChromeFlags::NAV_BAR_HIDDEN)
    }
}

/// What a call to [`DisplayGeometry::apply`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryChange {
    /// Any derived value changed; limits must be recomputed.
    pub limits_changed: bool,
    /// The rotation differs from the previous notification.
    pub rotated: bool,
    /// The status bar visibility flipped.
    pub fullscreen_changed: bool,
}

impl GeometryChange {
    /// Whether nothing changed at all.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        !self.limits_changed && !self.rotated && !self.fullscreen_changed
    }
}

/// Process-wide display model shared by every floater.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayGeometry {
    profile: DisplayProfile,
    screen: Size,
    status_bar_height: i32,
    nav_bar_vertical_offset: i32,
    nav_bar_horizontal_offset: i32,
    touch_x_offset: i32,
    touch_y_offset: i32,
    safe_insets: Insets,
    rotation: Rotation,
    fullscreen: bool,
}

impl DisplayGeometry {
    /// Build the model from a profile and an initial layout.
    #[must_use]
    pub fn new(profile: DisplayProfile, initial: &LayoutUpdate) -> Self {
        let mut geometry = Self {
            profile,
            screen: Size::default(),
            status_bar_height: 0,
            nav_bar_vertical_offset: 0,
            nav_bar_horizontal_offset: 0,
            touch_x_offset: 0,
            touch_y_offset: 0,
            safe_insets: Insets::default(),
            rotation: initial.rotation,
            fullscreen: initial.is_status_bar_hidden(),
        };
        geometry.apply(initial);
        geometry
    }

    /// Fold a layout notification into the model.
    pub fn apply(&mut self, update: &LayoutUpdate) -> GeometryChange {
        let before = self.limit_inputs();
        let before_touch = (self.touch_x_offset, self.touch_y_offset);

        self.safe_insets = update.safe_insets;
        self.screen = update.display_size;
        self.status_bar_height = self.derive_status_bar_height(update);
        self.touch_x_offset = self.derive_touch_x_offset(update);
        self.touch_y_offset = if update.is_portrait() {
            self.safe_insets.top
        } else {
            0
        };
        let (vertical, horizontal) = self.derive_nav_bar_offsets(update);
        self.nav_bar_vertical_offset = vertical;
        self.nav_bar_horizontal_offset = horizontal;

        let rotated = self.rotation != update.rotation;
        self.rotation = update.rotation;
        let fullscreen = update.is_status_bar_hidden();
        let fullscreen_changed = self.fullscreen != fullscreen;
        self.fullscreen = fullscreen;

        let change = GeometryChange {
            limits_changed: before != self.limit_inputs()
                || before_touch != (self.touch_x_offset, self.touch_y_offset),
            rotated,
            fullscreen_changed,
        };
        if !change.is_none() {
            debug!(
                target: "floatdock.geometry",
                screen_w = self.screen.width,
                screen_h = self.screen.height,
                status_bar = self.status_bar_height,
                nav_v = self.nav_bar_vertical_offset,
                nav_h = self.nav_bar_horizontal_offset,
                rotation = self.rotation.degrees(),
                "display geometry updated"
            );
        }
        change
    }

    fn derive_status_bar_height(&self, update: &LayoutUpdate) -> i32 {
        if update.is_status_bar_hidden() {
            return 0;
        }
        let has_top_cutout = self.safe_insets.top != 0;
        match (has_top_cutout, update.is_portrait()) {
            (true, true) => 0,
            (_, false) => self.profile.status_bar_rotated_height,
            (false, true) => self.profile.status_bar_height,
        }
    }

    fn derive_touch_x_offset(&self, update: &LayoutUpdate) -> i32 {
        let window_left = update.window_rect.left;
        if self.safe_insets.bottom != 0 {
            return window_left;
        }
        if !update.is_nav_bar_hidden() && window_left > 0 {
            self.profile.nav_bar_rotated_height
        } else {
            0
        }
    }

    /// Returns `(vertical, horizontal)` navigation bar offsets.
    fn derive_nav_bar_offsets(&self, update: &LayoutUpdate) -> (i32, i32) {
        let profile = &self.profile;
        let current_height = update.real_size.height - update.window_rect.bottom;
        let current_width = update.real_size.width - update.display_size.width;
        let vertical_diff = profile.nav_bar_height - current_height;

        if !update.is_nav_bar_hidden() {
            let autohide_suspected = (vertical_diff != 0 && profile.nav_bar_height == 0)
                || (!profile.has_soft_nav_bar && profile.nav_bar_height != 0);
            let vertical = if autohide_suspected && !profile.has_soft_nav_bar {
                debug!(
                    target: "floatdock.geometry",
                    current_height,
                    "hardware navigation bar reported while shown"
                );
                -current_height
            } else {
                0
            };
            return (vertical, 0);
        }

        if update.is_portrait() {
            let vertical = if !profile.has_soft_nav_bar && profile.nav_bar_height != 0 {
                0
            } else {
                profile.nav_bar_height
            };
            return (vertical, 0);
        }

        if profile.is_tablet {
            return (profile.nav_bar_height, 0);
        }

        let horizontal = if !profile.has_soft_nav_bar && profile.nav_bar_rotated_height != 0 {
            0
        } else if profile.has_soft_nav_bar && profile.nav_bar_rotated_height == 0 {
            debug!(
                target: "floatdock.geometry",
                current_width,
                "side navigation bar measured without a base width"
            );
            current_width
        } else {
            profile.nav_bar_rotated_height
        };
        (0, horizontal)
    }

    /// The inputs for [`crate::geometry::Limits::compute`].
    #[must_use]
    pub fn limit_inputs(&self) -> LimitInputs {
        LimitInputs {
            screen: self.screen,
            status_bar_height: self.status_bar_height,
            nav_bar_vertical_offset: self.nav_bar_vertical_offset,
            nav_bar_horizontal_offset: self.nav_bar_horizontal_offset,
        }
    }

    /// Convert a raw pointer sample into the anchor it implies.
    ///
    /// `raw` is in top-left origin screen coordinates and `local` is the
    /// pointer offset from the floater's top-left corner.
    #[must_use]
    pub fn anchor_from_touch(&self, raw: PointF, local: PointF, size: Size) -> Point {
        let x = raw.x - local.x - self.touch_x_offset as f32;
        let y = (self.screen.height + self.nav_bar_vertical_offset) as f32
            - (raw.y - local.y + size.height as f32 - self.touch_y_offset as f32);
        Point::new(x as i32, y as i32)
    }

    #[inline]
    #[must_use]
    pub fn profile(&self) -> &DisplayProfile {
        &self.profile
    }

    #[inline]
    #[must_use]
    pub fn screen(&self) -> Size {
        self.screen
    }

    #[inline]
    #[must_use]
    pub fn status_bar_height(&self) -> i32 {
        self.status_bar_height
    }

    #[inline]
    #[must_use]
    pub fn nav_bar_offsets(&self) -> (i32, i32) {
        (self.nav_bar_vertical_offset, self.nav_bar_horizontal_offset)
    }

    #[inline]
    #[must_use]
    pub fn touch_offsets(&self) -> (i32, i32) {
        (self.touch_x_offset, self.touch_y_offset)
    }

    #[inline]
    #[must_use]
    pub fn safe_insets(&self) -> Insets {
        self.safe_insets
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Whether the status bar is currently hidden.
    #[inline]
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> DisplayProfile {
        DisplayProfile {
            density: 2.0,
            status_bar_height: 48,
            status_bar_rotated_height: 40,
            nav_bar_height: 96,
            nav_bar_rotated_height: 96,
            has_soft_nav_bar: true,
            is_tablet: false,
        }
    }

    #[test]
    fn status_bar_uses_orientation_variant() {
        let mut geometry = DisplayGeometry::new(phone(), &LayoutUpdate::portrait(1080, 1920));
        assert_eq!(geometry.status_bar_height(), 48);

        geometry.apply(&LayoutUpdate::landscape(1920, 1080));
        assert_eq!(geometry.status_bar_height(), 40);
    }

    #[test]
    fn hidden_status_bar_contributes_nothing() {
        let update = LayoutUpdate::portrait(1080, 1920)
            .with_flags(ChromeFlags::PORTRAIT | ChromeFlags::STATUS_BAR_HIDDEN);
        let geometry = DisplayGeometry::new(phone(), &update);
        assert_eq!(geometry.status_bar_height(), 0);
        assert!(geometry.is_fullscreen());
    }

    #[test]
    fn top_cutout_neutralizes_status_bar_in_portrait() {
        let update = LayoutUpdate::portrait(1080, 1920).with_safe_insets(Insets::top(80));
        let geometry = DisplayGeometry::new(phone(), &update);
        assert_eq!(geometry.status_bar_height(), 0);
        assert_eq!(geometry.touch_offsets(), (0, 80));
    }

    #[test]
    fn hidden_nav_bar_in_portrait_offsets_bottom() {
        let update = LayoutUpdate::portrait(1080, 1920)
            .with_flags(ChromeFlags::PORTRAIT | ChromeFlags::NAV_BAR_HIDDEN);
        let geometry = DisplayGeometry::new(phone(), &update);
        assert_eq!(geometry.nav_bar_offsets(), (96, 0));
    }

    #[test]
    fn phone_landscape_hidden_nav_bar_offsets_side() {
        let update = LayoutUpdate::landscape(1920, 1080).with_flags(ChromeFlags::NAV_BAR_HIDDEN);
        let geometry = DisplayGeometry::new(phone(), &update);
        assert_eq!(geometry.nav_bar_offsets(), (0, 96));
    }

    #[test]
    fn tablet_landscape_keeps_bottom_bar() {
        let profile = DisplayProfile {
            is_tablet: true,
            ..phone()
        };
        let update = LayoutUpdate::landscape(1920, 1080).with_flags(ChromeFlags::NAV_BAR_HIDDEN);
        let geometry = DisplayGeometry::new(profile, &update);
        assert_eq!(geometry.nav_bar_offsets(), (96, 0));
    }

    #[test]
    fn soft_bar_without_base_width_uses_measured_width() {
        let profile = DisplayProfile {
            nav_bar_rotated_height: 0,
            ..phone()
        };
        let mut update =
            LayoutUpdate::landscape(1800, 1080).with_flags(ChromeFlags::NAV_BAR_HIDDEN);
        update.real_size = Size::new(1920, 1080);
        let geometry = DisplayGeometry::new(profile, &update);
        assert_eq!(geometry.nav_bar_offsets(), (0, 120));
    }

    #[test]
    fn hardware_bar_while_shown_offsets_negative() {
        let profile = DisplayProfile {
            has_soft_nav_bar: false,
            ..phone()
        };
        let mut update = LayoutUpdate::portrait(1080, 1824);
        update.real_size = Size::new(1080, 1920);
        update.window_rect = Rect::new(0, 0, 1080, 1824);
        let geometry = DisplayGeometry::new(profile, &update);
        assert_eq!(geometry.nav_bar_offsets(), (-96, 0));
    }

    #[test]
    fn left_nav_bar_shifts_touch_x() {
        let update = LayoutUpdate::landscape(1824, 1080).with_window_rect(Rect::new(96, 0, 1920, 1080));
        let geometry = DisplayGeometry::new(phone(), &update);
        assert_eq!(geometry.touch_offsets(), (96, 0));
    }

    #[test]
    fn anchor_from_touch_flips_y() {
        let geometry = DisplayGeometry::new(DisplayProfile::default(), &LayoutUpdate::portrait(1000, 2000));
        let anchor = geometry.anchor_from_touch(
            PointF::new(450.0, 1550.0),
            PointF::new(50.0, 50.0),
            Size::new(100, 100),
        );
        assert_eq!(anchor, Point::new(400, 400));
    }

    #[test]
    fn identical_update_reports_no_change() {
        let update = LayoutUpdate::portrait(1080, 1920);
        let mut geometry = DisplayGeometry::new(phone(), &update);
        assert!(geometry.apply(&update).is_none());
    }

    #[test]
    fn rotation_is_reported() {
        let mut geometry = DisplayGeometry::new(phone(), &LayoutUpdate::portrait(1080, 1920));
        let change = geometry.apply(&LayoutUpdate::landscape(1920, 1080));
        assert!(change.rotated);
        assert!(change.limits_changed);
    }
}
