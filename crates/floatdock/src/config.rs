#![forbid(unsafe_code)]

//! Engine and per-floater configuration.
//!
//! [`EngineConfig`] collects every tunable of the controller. Distances are
//! stored in density-independent pixels (`*_dp`) and durations in
//! milliseconds (`*_ms`); [`EngineConfig::gesture_config`] and
//! [`EngineConfig::motion_config`] resolve them against a
//! [`DisplayProfile`].
//!
//! # Loading
//!
//! ```toml
//! # floatdock.toml
//! slop_dp = 8.0
//! display_mode = "hide_fullscreen"
//!
//! [trash]
//! background_height_dp = 164.0
//! ```
//!
//! ```rust,ignore
//! let config = EngineConfig::from_toml_file("floatdock.toml")?;
//! let config = EngineConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `EngineConfig::default()` reproduces the stock behavior; a file only
//! needs to list the values it overrides.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use floatdock_core::display::DisplayProfile;
use floatdock_core::geometry::{Point, Size};
use floatdock_core::gesture::GestureConfig;
use floatdock_core::motion::{MotionConfig, MoveDirection, SpringParams};

#[cfg(feature = "config")]
use crate::error::ConfigError;

/// Outline of a floater, used when scaling the trash action icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Shape {
    #[default]
    Circle,
    Rectangle,
}

impl Shape {
    /// Ratio between the trash icon needed to cover this shape and its box.
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::Circle => 1.0,
            Self::Rectangle => std::f32::consts::SQRT_2,
        }
    }
}

/// Floater size policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum FloaterSize {
    /// Known up front; the floater is placed when added.
    Fixed(Size),
    /// Wait for [`crate::FloatManager::on_measure`].
    #[default]
    WrapContent,
}

/// When floaters are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum DisplayMode {
    ShowAlways,
    HideAlways,
    /// Hide while the status bar is hidden.
    #[default]
    HideFullscreen,
}

/// Options for one floater.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct FloaterOptions {
    pub shape: Shape,
    /// Pixels the anchor may pass the left and right edges at rest.
    pub over_margin: i32,
    /// Starting anchor; `None` places the floater at the top-left.
    pub initial_anchor: Option<Point>,
    pub move_direction: MoveDirection,
    /// Spring/fling release instead of the edge tween.
    pub use_physics: bool,
    /// Tween from the initial anchor to the edge on first placement.
    pub animate_initial_move: bool,
    pub size: FloaterSize,
    /// Number of direct children receiving click and long-click callbacks.
    pub children: usize,
}

impl Default for FloaterOptions {
    fn default() -> Self {
        Self {
            shape: Shape::Circle,
            over_margin: 0,
            initial_anchor: None,
            move_direction: MoveDirection::Default,
            use_physics: false,
            animate_initial_move: true,
            size: FloaterSize::WrapContent,
            children: 1,
        }
    }
}

impl FloaterOptions {
    #[must_use]
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_over_margin(mut self, over_margin: i32) -> Self {
        self.over_margin = over_margin;
        self
    }

    #[must_use]
    pub fn with_initial_anchor(mut self, anchor: Point) -> Self {
        self.initial_anchor = Some(anchor);
        self
    }

    #[must_use]
    pub fn with_move_direction(mut self, direction: MoveDirection) -> Self {
        self.move_direction = direction;
        self
    }

    #[must_use]
    pub fn with_physics(mut self, use_physics: bool) -> Self {
        self.use_physics = use_physics;
        self
    }

    #[must_use]
    pub fn with_animate_initial_move(mut self, animate: bool) -> Self {
        self.animate_initial_move = animate;
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = FloaterSize::Fixed(size);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: usize) -> Self {
        self.children = children;
        self
    }
}

/// Spring parameters for one release axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SpringConfig {
    pub damping_ratio: f32,
    pub stiffness: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping_ratio: 0.7,
            stiffness: 350.0,
        }
    }
}

impl From<SpringConfig> for SpringParams {
    fn from(c: SpringConfig) -> Self {
        Self {
            damping_ratio: c.damping_ratio,
            stiffness: c.stiffness,
        }
    }
}

/// Trash target layout and timing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TrashStyle {
    /// Height of the gradient background behind the icon.
    pub background_height_dp: f32,
    /// Horizontal growth of the capture rectangle on each side.
    pub capture_horizontal_dp: f32,
    /// Vertical growth of the capture rectangle above the icon.
    pub capture_vertical_dp: f32,
    /// Share of the background height the icon drops toward a floater near the bottom edge.
    pub sticky_range: f32,
    /// Horizontal travel of the icon either side of center.
    pub limit_offset_x_dp: f32,
    /// Offset of the icon's highest rest position.
    pub limit_offset_top_dp: f32,
    /// Delay between the open trigger and the icon starting to rise.
    pub icon_open_delay_ms: u64,
    pub icon_open_ms: u64,
    pub icon_open_tension: f32,
    pub background_fade_ms: u64,
    pub close_ms: u64,
    /// Duration of the action icon's enter/exit scale tween.
    pub action_scale_ms: u64,
    pub action_scale_tension: f32,
}

impl Default for TrashStyle {
    fn default() -> Self {
        Self {
            background_height_dp: 164.0,
            capture_horizontal_dp: 30.0,
            capture_vertical_dp: 4.0,
            sticky_range: 0.2,
            limit_offset_x_dp: 22.0,
            limit_offset_top_dp: -4.0,
            icon_open_delay_ms: 200,
            icon_open_ms: 400,
            icon_open_tension: 1.0,
            background_fade_ms: 200,
            close_ms: 200,
            action_scale_ms: 200,
            action_scale_tension: 2.0,
        }
    }
}

impl TrashStyle {
    fn validate_into(&self, errors: &mut Vec<String>) {
        for (name, value) in [
            ("trash.background_height_dp", self.background_height_dp),
            ("trash.capture_horizontal_dp", self.capture_horizontal_dp),
            ("trash.capture_vertical_dp", self.capture_vertical_dp),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be >= 0, got {value}"));
            }
        }
        if !(0.0..=1.0).contains(&self.sticky_range) {
            errors.push(format!(
                "trash.sticky_range must be in [0, 1], got {}",
                self.sticky_range
            ));
        }
        for (name, value) in [
            ("trash.icon_open_ms", self.icon_open_ms),
            ("trash.background_fade_ms", self.background_fade_ms),
            ("trash.close_ms", self.close_ms),
            ("trash.action_scale_ms", self.action_scale_ms),
        ] {
            if value == 0 {
                errors.push(format!("{name} must be > 0"));
            }
        }
        for (name, value) in [
            ("trash.icon_open_tension", self.icon_open_tension),
            ("trash.action_scale_tension", self.action_scale_tension),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be >= 0, got {value}"));
            }
        }
    }
}

/// Every tunable of the controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct EngineConfig {
    /// Pointer travel below which a press is still a tap.
    pub slop_dp: f32,
    /// The platform long-press timeout. Floaters wait 1.5× this long; the
    /// trash opens after exactly this long.
    pub long_press_timeout_ms: u64,
    pub capture_ms: u64,
    /// Tick cadence requested while something animates.
    pub frame_period_ms: u64,
    pub edge_duration_ms: u64,
    pub edge_tension: f32,
    pub max_fling_velocity_dp: f32,
    pub spring_x: SpringConfig,
    pub spring_y: SpringConfig,
    pub fling_friction: f32,
    /// Length of the pulse when a floater enters the trash.
    pub haptic_pulse_ms: u64,
    pub display_mode: DisplayMode,
    pub trash_enabled: bool,
    pub trash: TrashStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slop_dp: 8.0,
            long_press_timeout_ms: 500,
            capture_ms: 300,
            frame_period_ms: 17,
            edge_duration_ms: 450,
            edge_tension: 1.25,
            max_fling_velocity_dp: 8000.0,
            spring_x: SpringConfig::default(),
            spring_y: SpringConfig {
                damping_ratio: 0.75,
                stiffness: 200.0,
            },
            fling_friction: 1.7,
            haptic_pulse_ms: 15,
            display_mode: DisplayMode::HideFullscreen,
            trash_enabled: true,
            trash: TrashStyle::default(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML and validate.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file and validate.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse from JSON and validate.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file and validate.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    #[cfg(feature = "config")]
    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Check every value and return all problems found (empty if valid).
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.slop_dp.is_finite() || self.slop_dp < 0.0 {
            errors.push(format!("slop_dp must be >= 0, got {}", self.slop_dp));
        }
        for (name, value) in [
            ("long_press_timeout_ms", self.long_press_timeout_ms),
            ("capture_ms", self.capture_ms),
            ("frame_period_ms", self.frame_period_ms),
            ("edge_duration_ms", self.edge_duration_ms),
        ] {
            if value == 0 {
                errors.push(format!("{name} must be > 0"));
            }
        }
        if !self.edge_tension.is_finite() || self.edge_tension < 0.0 {
            errors.push(format!("edge_tension must be >= 0, got {}", self.edge_tension));
        }
        if !self.max_fling_velocity_dp.is_finite() || self.max_fling_velocity_dp <= 0.0 {
            errors.push(format!(
                "max_fling_velocity_dp must be > 0, got {}",
                self.max_fling_velocity_dp
            ));
        }
        for (name, spring) in [("spring_x", &self.spring_x), ("spring_y", &self.spring_y)] {
            if !spring.damping_ratio.is_finite() || spring.damping_ratio < 0.0 {
                errors.push(format!(
                    "{name}.damping_ratio must be >= 0, got {}",
                    spring.damping_ratio
                ));
            }
            if !spring.stiffness.is_finite() || spring.stiffness <= 0.0 {
                errors.push(format!(
                    "{name}.stiffness must be > 0, got {}",
                    spring.stiffness
                ));
            }
        }
        if !self.fling_friction.is_finite() || self.fling_friction <= 0.0 {
            errors.push(format!(
                "fling_friction must be > 0, got {}",
                self.fling_friction
            ));
        }
        self.trash.validate_into(&mut errors);
        errors
    }

    /// How long a floater waits before reporting a long press.
    #[must_use]
    pub fn long_press_timeout(&self) -> Duration {
        Duration::from_millis(self.long_press_timeout_ms.saturating_mul(3) / 2)
    }

    /// How long the trash waits after a press before opening.
    #[must_use]
    pub fn trash_open_delay(&self) -> Duration {
        Duration::from_millis(self.long_press_timeout_ms)
    }

    #[must_use]
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_period_ms)
    }

    #[must_use]
    pub fn haptic_pulse(&self) -> Duration {
        Duration::from_millis(self.haptic_pulse_ms)
    }

    /// Gesture tunables in pixels for `profile`.
    #[must_use]
    pub fn gesture_config(&self, profile: &DisplayProfile) -> GestureConfig {
        GestureConfig {
            slop: profile.dp(self.slop_dp),
            long_press_timeout: self.long_press_timeout(),
            max_fling_velocity: profile.dp(self.max_fling_velocity_dp),
        }
    }

    /// Motion tunables in pixels for `profile`.
    #[must_use]
    pub fn motion_config(&self, profile: &DisplayProfile) -> MotionConfig {
        MotionConfig {
            capture_duration: Duration::from_millis(self.capture_ms),
            edge_duration: Duration::from_millis(self.edge_duration_ms),
            edge_tension: self.edge_tension,
            max_fling_velocity: profile.dp(self.max_fling_velocity_dp),
            spring_x: self.spring_x.into(),
            spring_y: self.spring_y.into(),
            fling_friction: self.fling_friction,
        }
    }
}
