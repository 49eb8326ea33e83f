//! Float geometry for text layout and hit-testing.
//!
//! Text components work in two coordinate spaces:
//!
//! - **field-local**: origin at the top-left corner of the text field frame.
//!   The content rect, the text rect, caret and handle rects live here.
//! - **text-local**: origin at the top-left corner of the laid-out paragraph.
//!   Paragraph queries take and return text-local values.
//!
//! Converting between them is a translation by the text rect's offset.
//!
//! # Coordinate System
//!
//! - Origin (0, 0) at the top-left corner
//! - X-axis increases to the right
//! - Y-axis increases downward
//! - Negative coordinates are allowed; a scrolled text rect usually has one.
//!
//! # Example
//!
//! ```
//! use arkui_core::geometry::{OffsetF, RectF, SizeF};
//!
//! let mut rect = RectF::new(10.0, 10.0, 40.0, 20.0);
//! rect.set_offset(rect.offset() + OffsetF::new(5.0, 0.0));
//! assert_eq!(rect.left(), 15.0);
//! assert_eq!(rect.size(), SizeF::new(40.0, 20.0));
//! ```

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A 2D point or translation.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OffsetF {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl OffsetF {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates an offset from its components.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns a copy translated by `dx`, `dy`.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns a copy with `x` replaced.
    pub fn with_x(self, x: f32) -> Self {
        Self::new(x, self.y)
    }

    /// Returns a copy with `y` replaced.
    pub fn with_y(self, y: f32) -> Self {
        Self::new(self.x, y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for OffsetF {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for OffsetF {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for OffsetF {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for OffsetF {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for OffsetF {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// A width and height pair.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SizeF {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl SizeF {
    /// An empty size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Creates a size from its components.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns `true` when either extent is zero or negative.
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// An axis-aligned rectangle described by its top-left corner and size.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RectF {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl RectF {
    /// An empty rectangle at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a rectangle from its top-left corner and size components.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from an offset and a size.
    pub fn from_offset_size(offset: OffsetF, size: SizeF) -> Self {
        Self::new(offset.x, offset.y, size.width, size.height)
    }

    /// The top-left corner.
    pub fn offset(&self) -> OffsetF {
        OffsetF::new(self.x, self.y)
    }

    /// Moves the rectangle so its top-left corner is at `offset`.
    pub fn set_offset(&mut self, offset: OffsetF) {
        self.x = offset.x;
        self.y = offset.y;
    }

    /// The rectangle's size.
    pub fn size(&self) -> SizeF {
        SizeF::new(self.width, self.height)
    }

    /// Resizes the rectangle keeping its top-left corner.
    pub fn set_size(&mut self, size: SizeF) {
        self.width = size.width;
        self.height = size.height;
    }

    /// Left edge.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> OffsetF {
        OffsetF::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns a copy translated by `delta`.
    pub fn translate(&self, delta: OffsetF) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Returns `true` if `point` lies inside the rectangle, edges included.
    pub fn contains(&self, point: OffsetF) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Returns `true` if the rectangles overlap with a non-empty area.
    pub fn intersects(&self, other: &RectF) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Smallest rectangle containing both rectangles.
    pub fn union(&self, other: &RectF) -> RectF {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        RectF::new(left, top, right - left, bottom - top)
    }

    /// Clamps `point` into the rectangle.
    pub fn clamp_point(&self, point: OffsetF) -> OffsetF {
        OffsetF::new(
            point.x.clamp(self.left(), self.right().max(self.left())),
            point.y.clamp(self.top(), self.bottom().max(self.top())),
        )
    }
}

/// Tolerance used when comparing layout values.
pub const EPSILON: f32 = 0.001;

/// `a > b` by more than [`EPSILON`].
pub fn greater_not_equal(a: f32, b: f32) -> bool {
    a - b > EPSILON
}

/// `a < b` by more than [`EPSILON`].
pub fn less_not_equal(a: f32, b: f32) -> bool {
    b - a > EPSILON
}

/// `a` and `b` differ by at most [`EPSILON`].
pub fn nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}
