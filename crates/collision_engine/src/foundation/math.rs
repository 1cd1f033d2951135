//! Math utilities and types
//!
//! Provides the 2D vector alias and the axis-aligned rectangle used by
//! every shape, query and broad-phase structure in the engine.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Axis-aligned rectangle described by its minimum and maximum corners.
///
/// Edges are inclusive: two rectangles that merely touch are considered
/// overlapping, and a point on the boundary is contained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    /// Create a rectangle from its minimum corner and its dimensions
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Create a rectangle from two corners (order of components is normalized)
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Create a rectangle centered on `center` with the given full size
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Minimum corner
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.min
    }

    /// Maximum corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.max
    }

    /// Width along X
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height along Y
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Full size as a vector
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Center point
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive overlap test
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Inclusive point containment
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Smallest rectangle containing both rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Rectangle moved by `delta`
    pub fn translated(&self, delta: Vec2) -> Rect {
        Rect {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Rectangle grown by `amount` on each side along each axis
    pub fn expanded(&self, amount: Vec2) -> Rect {
        Rect {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    /// Clamp a point into the rectangle (the point itself when inside)
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Squared distance from a point to the rectangle (zero when inside)
    pub fn distance_squared_to(&self, point: Vec2) -> f32 {
        (self.clamp_point(point) - point).norm_squared()
    }

    /// Whether all coordinates are finite and the extents are non-negative
    pub fn is_valid(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|c| c.is_finite())
            && self.width() >= 0.0
            && self.height() >= 0.0
    }
}

/// Math utility functions
pub mod utils {
    use super::Vec2;

    /// Normalize `v`, returning `None` for zero-length (or non-finite) vectors
    pub fn try_normalize(v: Vec2) -> Option<Vec2> {
        let len_sq = v.norm_squared();
        if len_sq > 0.0 && len_sq.is_finite() {
            Some(v / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Whether both components are finite
    pub fn is_finite(v: Vec2) -> bool {
        v.x.is_finite() && v.y.is_finite()
    }
}
