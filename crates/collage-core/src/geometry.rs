//! Geometric primitives for element positioning and relocation.
//!
//! This module provides the geometric types used to capture where copied
//! elements were, and to compute where pasted elements go.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space, also used for offsets
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! Collage uses a screen-style coordinate system:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Shapes are positioned by their top-left corner; the modeling layer
//! receives centers.

use serde::{Deserialize, Serialize};

/// A 2D point representing a position or an offset in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use collage_core::geometry::Point;
/// let shape = Point::new(110.0, 110.0);
/// let anchor = Point::new(300.0, 200.0);
///
/// let delta = shape.delta(anchor);
/// assert_eq!(delta, Point::new(-190.0, -90.0));
/// assert_eq!(anchor.add_point(delta), shape);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point to this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Returns the offset of this point from `reference`.
    ///
    /// Adding the result back onto `reference` yields this point again.
    pub fn delta(self, reference: Point) -> Self {
        self.sub_point(reference)
    }

}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the vector from a shape's top-left corner to its center.
    pub fn half_extent(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and a size.
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Creates bounds centered on `center` with the given size.
    pub fn new_from_center(center: Point, size: Size) -> Self {
        Self::new_from_top_left(center.sub_point(size.half_extent()), size)
    }

    /// Creates the smallest bounds containing every point.
    ///
    /// Returns `None` when `points` is empty.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc, point| {
            let single = Self {
                min_x: point.x,
                min_y: point.y,
                max_x: point.x,
                max_y: point.y,
            };
            Some(match acc {
                Some(bounds) => bounds.merge(&single),
                None => single,
            })
        })
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Merges two bounds to create a larger bounds that contains both
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

}

/// Merges an iterator of bounds into the bounds containing all of them.
///
/// Returns `None` for an empty iterator.
pub fn union(bounds: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
    bounds
        .into_iter()
        .reduce(|acc, next| acc.merge(&next))
}
