#![forbid(unsafe_code)]

//! Geometric primitives in anchor space.
//!
//! Anchors use a bottom-left origin: `x` grows to the right and `y` grows
//! upward from the bottom edge of the display. A [`Rect`] keeps screen-style
//! edge names, so in anchor space `top` is the *smaller* y value and `bottom`
//! the larger one. Raw pointer coordinates (top-left origin) are converted by
//! [`crate::display::DisplayGeometry`].
//!
//! # Invariants
//!
//! 1. [`Limits::compute`] never produces a rectangle with `right < left` or
//!    `bottom < top`; degenerate spans collapse onto `left` / `top`.
//! 2. [`Rect::clamp`] always returns a point that [`Rect::contains`].
//! 3. [`remap_proportional`] never divides by zero: an empty old span keeps
//!    the coordinate unscaled before clamping.

/// Integer pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to a floating point position.
    #[inline]
    #[must_use]
    pub fn to_f32(self) -> PointF {
        PointF::new(self.x as f32, self.y as f32)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Sub-pixel position, used for pointer samples and in-flight animation values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (L∞) distance to another point.
    #[inline]
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> f32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Round both components to the nearest pixel.
    #[inline]
    #[must_use]
    pub fn round(self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<(f32, f32)> for PointF {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Measured size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Check if either dimension is zero or negative.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Axis-aligned rectangle described by its four edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from its edges.
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size.
    #[inline]
    #[must_use]
    pub const fn from_origin(origin: Point, size: Size) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + size.width,
            origin.y + size.height,
        )
    }

    /// Horizontal span.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Vertical span.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Check if the rectangle has no area.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Check whether a point lies within the edges (all edges inclusive).
    ///
    /// Limit rectangles describe the legal range of an anchor, so both
    /// `right` and `bottom` are valid positions.
    #[inline]
    #[must_use]
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Check whether `x` lies strictly between `left` and `right`.
    #[inline]
    #[must_use]
    pub const fn strictly_contains_x(&self, x: i32) -> bool {
        x > self.left && x < self.right
    }

    /// Check whether `y` lies strictly between `top` and `bottom`.
    #[inline]
    #[must_use]
    pub const fn strictly_contains_y(&self, y: i32) -> bool {
        y > self.top && y < self.bottom
    }

    /// Clamp a point into the rectangle.
    #[inline]
    #[must_use]
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(self.clamp_x(p.x), self.clamp_y(p.y))
    }

    /// Clamp an x coordinate into `[left, right]`.
    #[inline]
    #[must_use]
    pub fn clamp_x(&self, x: i32) -> i32 {
        x.max(self.left).min(self.right.max(self.left))
    }

    /// Clamp a y coordinate into `[top, bottom]`.
    #[inline]
    #[must_use]
    pub fn clamp_y(&self, y: i32) -> i32 {
        y.max(self.top).min(self.bottom.max(self.top))
    }

    /// Open-interval overlap test.
    ///
    /// Rectangles that only share an edge do not intersect.
    #[inline]
    #[must_use]
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Compute the overlapping region, returning `None` if there is none.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        ))
    }

    /// Collapse inverted spans so that `left <= right` and `top <= bottom`.
    ///
    /// An inverted span is pinned to its leading edge.
    #[must_use]
    pub const fn normalized(self) -> Self {
        let right = if self.right < self.left {
            self.left
        } else {
            self.right
        };
        let bottom = if self.bottom < self.top {
            self.top
        } else {
            self.bottom
        };
        Self::new(self.left, self.top, right, bottom)
    }
}

/// Safe-area insets (display cutouts), in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    /// Create new insets with specific values.
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Insets with only a top cutout.
    #[must_use]
    pub const fn top(val: i32) -> Self {
        Self::new(0, val, 0, 0)
    }

    /// Whether any edge is non-zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }
}

/// Movement and resting bounds for one floater's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    /// Legal resting rectangle for the anchor.
    pub position: Rect,
    /// Looser clamp applied while the pointer is down.
    pub movement: Rect,
}

/// Inputs to [`Limits::compute`] coming from the display model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitInputs {
    pub screen: Size,
    pub status_bar_height: i32,
    pub nav_bar_vertical_offset: i32,
    pub nav_bar_horizontal_offset: i32,
}

impl Limits {
    /// Derive both rectangles for a floater of `size` with `over_margin`.
    #[must_use]
    pub fn compute(inputs: LimitInputs, size: Size, over_margin: i32) -> Self {
        let LimitInputs {
            screen,
            status_bar_height,
            nav_bar_vertical_offset,
            nav_bar_horizontal_offset,
        } = inputs;
        let (w, h) = (size.width, size.height);

        let movement = Rect::new(
            -w,
            -2 * h,
            screen.width + w + nav_bar_horizontal_offset,
            screen.height + h + nav_bar_vertical_offset,
        )
        .normalized();
        let position = Rect::new(
            -over_margin,
            0,
            screen.width - w + over_margin + nav_bar_horizontal_offset,
            screen.height - status_bar_height - h + nav_bar_vertical_offset,
        )
        .normalized();

        Self { position, movement }
    }
}

/// Map a resting anchor proportionally from `old` into `new`, then clamp.
///
/// Each axis is scaled by `new_span / old_span` and rounded half-up. An axis
/// whose old span is zero is left unscaled.
#[must_use]
pub fn remap_proportional(anchor: Point, old: &Rect, new: &Rect) -> Point {
    let scale = |v: i32, old_span: i32, new_span: i32| -> i32 {
        if old_span == 0 {
            v
        } else {
            (v as f64 * f64::from(new_span) / f64::from(old_span)).round() as i32
        }
    };
    let x = scale(anchor.x, old.width(), new.width());
    let y = scale(anchor.y, old.height(), new.height());
    new.clamp(Point::new(x, y))
}
