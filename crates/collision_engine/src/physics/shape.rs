//! Geometric shape primitives
//!
//! Shapes are immutable values described in body-local space. The collision
//! system places them in the world with [`Shape::translated`] and
//! re-evaluates them on every query; nothing is cached between frames.
//!
//! Pairwise tests are dispatched with an exhaustive `match` over the closed
//! [`Shape`] enum, so every ordered pair of kinds has a defined answer.

use crate::foundation::math::{utils, Rect, Vec2};
use crate::physics::error::CollisionError;

/// Contact information between two overlapping shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Representative point of the overlap region
    pub point: Vec2,
    /// Unit normal pointing from the other shape toward this one
    pub normal: Vec2,
    /// How far this shape must move along `normal` to separate (>= 0)
    pub depth: f32,
}

impl Contact {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// First entry of a segment into a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Position along the segment in `[0, 1]`
    pub fraction: f32,
    /// Entry point
    pub point: Vec2,
    /// Surface normal at the entry point
    pub normal: Vec2,
}

/// Axis-aligned box: local bounds plus an offset from the owner's origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    bounds: Rect,
    offset: Vec2,
}

impl BoxShape {
    /// Create a box from local bounds and an offset
    pub fn new(bounds: Rect, offset: Vec2) -> Result<Self, CollisionError> {
        if !bounds.is_valid() {
            return Err(CollisionError::InvalidShape(format!("box bounds {bounds:?} are not a valid rectangle")));
        }
        if !utils::is_finite(offset) {
            return Err(CollisionError::InvalidShape(format!("box offset {offset:?} is not finite")));
        }
        Ok(Self { bounds, offset })
    }

    /// Local bounds
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Offset applied to the bounds
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Bounds with the offset applied
    pub fn final_bounds(&self) -> Rect {
        self.bounds.translated(self.offset)
    }
}

/// Circle defined by center and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    center: Vec2,
    radius: f32,
}

impl CircleShape {
    /// Create a circle
    pub fn new(center: Vec2, radius: f32) -> Result<Self, CollisionError> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(CollisionError::InvalidShape(format!("circle radius {radius} must be finite and non-negative")));
        }
        if !utils::is_finite(center) {
            return Err(CollisionError::InvalidShape(format!("circle center {center:?} is not finite")));
        }
        Ok(Self { center, radius })
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Bounding box
    pub fn final_bounds(&self) -> Rect {
        Rect::from_center_size(self.center, Vec2::new(self.radius * 2.0, self.radius * 2.0))
    }

    /// Closest point on (or in) the circle. A point inside, including the
    /// center itself, is returned unchanged.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let offset = point - self.center;
        let dist_sq = offset.norm_squared();
        if dist_sq <= self.radius * self.radius {
            point
        } else {
            self.center + offset * (self.radius / dist_sq.sqrt())
        }
    }
}

/// Ordered union of child shapes
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeShape {
    children: Vec<Shape>,
}

impl CompositeShape {
    /// Create a composite; at least one child is required
    pub fn new(children: Vec<Shape>) -> Result<Self, CollisionError> {
        if children.is_empty() {
            return Err(CollisionError::InvalidShape("composite shape needs at least one child".to_string()));
        }
        Ok(Self { children })
    }

    /// Children in registration order
    pub fn children(&self) -> &[Shape] {
        &self.children
    }

    /// Union of every child's bounds
    pub fn final_bounds(&self) -> Rect {
        let mut children = self.children.iter();
        // Non-empty by construction
        let first = children.next().map_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0), Shape::final_bounds);
        children.fold(first, |acc, child| acc.union(&child.final_bounds()))
    }
}

/// A collision shape
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned box
    Box(BoxShape),
    /// Circle
    Circle(CircleShape),
    /// Union of children
    Composite(CompositeShape),
}

impl Shape {
    /// Box of the given size centered on the local origin
    pub fn rect(width: f32, height: f32) -> Result<Self, CollisionError> {
        let bounds = Rect::from_center_size(Vec2::zeros(), Vec2::new(width, height));
        Ok(Self::Box(BoxShape::new(bounds, Vec2::zeros())?))
    }

    /// Box from explicit local bounds and offset
    pub fn rect_with_offset(bounds: Rect, offset: Vec2) -> Result<Self, CollisionError> {
        Ok(Self::Box(BoxShape::new(bounds, offset)?))
    }

    /// Circle centered on the local origin
    pub fn circle(radius: f32) -> Result<Self, CollisionError> {
        Ok(Self::Circle(CircleShape::new(Vec2::zeros(), radius)?))
    }

    /// Circle with an explicit local center
    pub fn circle_at(center: Vec2, radius: f32) -> Result<Self, CollisionError> {
        Ok(Self::Circle(CircleShape::new(center, radius)?))
    }

    /// Union of child shapes
    pub fn composite(children: Vec<Shape>) -> Result<Self, CollisionError> {
        Ok(Self::Composite(CompositeShape::new(children)?))
    }

    /// Axis-aligned bounds of the shape
    pub fn final_bounds(&self) -> Rect {
        match self {
            Self::Box(b) => b.final_bounds(),
            Self::Circle(c) => c.final_bounds(),
            Self::Composite(c) => c.final_bounds(),
        }
    }

    /// The same shape moved by `delta`
    pub fn translated(&self, delta: Vec2) -> Shape {
        match self {
            Self::Box(b) => Self::Box(BoxShape {
                bounds: b.bounds,
                offset: b.offset + delta,
            }),
            Self::Circle(c) => Self::Circle(CircleShape {
                center: c.center + delta,
                radius: c.radius,
            }),
            Self::Composite(c) => Self::Composite(CompositeShape {
                children: c.children.iter().map(|child| child.translated(delta)).collect(),
            }),
        }
    }

    /// Whether the two shapes overlap (touching counts)
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Self::Composite(c), _) => c.children.iter().any(|child| child.intersects(other)),
            (_, Self::Composite(c)) => c.children.iter().any(|child| self.intersects(child)),
            (Self::Box(a), Self::Box(b)) => a.final_bounds().intersects(&b.final_bounds()),
            (Self::Box(b), Self::Circle(c)) | (Self::Circle(c), Self::Box(b)) => {
                rect_circle_overlap(&b.final_bounds(), c)
            }
            (Self::Circle(a), Self::Circle(b)) => {
                let radius_sum = a.radius + b.radius;
                (a.center - b.center).norm_squared() <= radius_sum * radius_sum
            }
        }
    }

    /// Inclusive point containment
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Self::Box(b) => b.final_bounds().contains(point),
            Self::Circle(c) => (point - c.center).norm_squared() <= c.radius * c.radius,
            Self::Composite(c) => c.children.iter().any(|child| child.contains(point)),
        }
    }

    /// Closest point of the shape to `point` (the point itself when inside)
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        match self {
            Self::Box(b) => b.final_bounds().clamp_point(point),
            Self::Circle(c) => c.closest_point(point),
            Self::Composite(c) => {
                let mut best = point;
                let mut best_dist_sq = f32::INFINITY;
                for child in &c.children {
                    let candidate = child.closest_point(point);
                    let dist_sq = (candidate - point).norm_squared();
                    // Strict: the earliest child wins exact ties
                    if dist_sq < best_dist_sq {
                        best = candidate;
                        best_dist_sq = dist_sq;
                    }
                }
                best
            }
        }
    }

    /// Contact between this shape and `other`, if they overlap.
    ///
    /// The normal points from `other` toward `self`.
    pub fn contact(&self, other: &Shape) -> Option<Contact> {
        match (self, other) {
            (Self::Composite(c), _) => deepest(c.children.iter().map(|child| child.contact(other))),
            (_, Self::Composite(c)) => deepest(c.children.iter().map(|child| self.contact(child))),
            (Self::Box(a), Self::Box(b)) => rect_rect_contact(&a.final_bounds(), &b.final_bounds()),
            (Self::Box(b), Self::Circle(c)) => circle_rect_contact(c, &b.final_bounds()).map(Contact::flipped),
            (Self::Circle(c), Self::Box(b)) => circle_rect_contact(c, &b.final_bounds()),
            (Self::Circle(a), Self::Circle(b)) => circle_circle_contact(a, b),
        }
    }

    /// First point where the segment `start -> end` enters the shape.
    ///
    /// A segment starting inside hits at fraction 0 with a normal opposing
    /// its direction.
    pub fn cast_segment(&self, start: Vec2, end: Vec2) -> Option<SegmentHit> {
        let delta = end - start;
        if !matches!(self, Self::Composite(_)) && self.contains(start) {
            return Some(SegmentHit {
                fraction: 0.0,
                point: start,
                normal: utils::try_normalize(-delta).unwrap_or_else(Vec2::zeros),
            });
        }

        match self {
            Self::Box(b) => segment_rect(start, delta, &b.final_bounds()),
            Self::Circle(c) => segment_circle(start, delta, c.center, c.radius),
            Self::Composite(c) => {
                let mut best: Option<SegmentHit> = None;
                for hit in c.children.iter().filter_map(|child| child.cast_segment(start, end)) {
                    if best.map_or(true, |b| hit.fraction < b.fraction) {
                        best = Some(hit);
                    }
                }
                best
            }
        }
    }
}

/// Shape families accepted by area overlap queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// Box of `size` centered on the query position
    Box,
    /// Circle whose diameter is `size.x`, centered on the query position
    Circle,
}

impl QueryShape {
    /// Build the world-space shape for a query
    pub fn build(self, size: Vec2, position: Vec2) -> Result<Shape, CollisionError> {
        match self {
            Self::Box => Shape::rect_with_offset(Rect::from_center_size(Vec2::zeros(), size), position),
            Self::Circle => Shape::circle_at(position, size.x * 0.5),
        }
    }
}

fn deepest(contacts: impl Iterator<Item = Option<Contact>>) -> Option<Contact> {
    let mut best: Option<Contact> = None;
    for contact in contacts.flatten() {
        if best.map_or(true, |b| contact.depth > b.depth) {
            best = Some(contact);
        }
    }
    best
}

fn rect_circle_overlap(rect: &Rect, circle: &CircleShape) -> bool {
    rect.distance_squared_to(circle.center) <= circle.radius * circle.radius
}

fn sign(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Contact for two boxes, resolved along the axis of least overlap
fn rect_rect_contact(a: &Rect, b: &Rect) -> Option<Contact> {
    let overlap_min = a.min().sup(&b.min());
    let overlap_max = a.max().inf(&b.max());
    let overlap = overlap_max - overlap_min;
    if overlap.x < 0.0 || overlap.y < 0.0 {
        return None;
    }

    let d = a.center() - b.center();
    let (normal, depth) = if overlap.x < overlap.y {
        (Vec2::new(sign(d.x), 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, sign(d.y)), overlap.y)
    };

    Some(Contact {
        point: (overlap_min + overlap_max) * 0.5,
        normal,
        depth,
    })
}

/// Contact for a circle against a box; normal points from the box to the circle
fn circle_rect_contact(circle: &CircleShape, rect: &Rect) -> Option<Contact> {
    let closest = rect.clamp_point(circle.center);
    let diff = circle.center - closest;
    let dist_sq = diff.norm_squared();
    if dist_sq > circle.radius * circle.radius {
        return None;
    }

    if dist_sq > 0.0 {
        let dist = dist_sq.sqrt();
        return Some(Contact {
            point: closest,
            normal: diff / dist,
            depth: circle.radius - dist,
        });
    }

    // Center inside the box: push out through the nearest face
    let c = circle.center;
    let faces = [
        (c.x - rect.min().x, Vec2::new(-1.0, 0.0), Vec2::new(rect.min().x, c.y)),
        (rect.max().x - c.x, Vec2::new(1.0, 0.0), Vec2::new(rect.max().x, c.y)),
        (c.y - rect.min().y, Vec2::new(0.0, -1.0), Vec2::new(c.x, rect.min().y)),
        (rect.max().y - c.y, Vec2::new(0.0, 1.0), Vec2::new(c.x, rect.max().y)),
    ];
    let mut best = faces[0];
    for face in &faces[1..] {
        if face.0 < best.0 {
            best = *face;
        }
    }
    let (distance, normal, point) = best;

    Some(Contact {
        point,
        normal,
        depth: distance + circle.radius,
    })
}

fn circle_circle_contact(a: &CircleShape, b: &CircleShape) -> Option<Contact> {
    let d = a.center - b.center;
    let radius_sum = a.radius + b.radius;
    let dist_sq = d.norm_squared();
    if dist_sq > radius_sum * radius_sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0 { d / dist } else { Vec2::new(0.0, 1.0) };
    Some(Contact {
        point: b.center + normal * b.radius,
        normal,
        depth: radius_sum - dist,
    })
}

/// Slab test; `start` is known to be outside the rectangle
fn segment_rect(start: Vec2, delta: Vec2, rect: &Rect) -> Option<SegmentHit> {
    let mut t_near = 0.0_f32;
    let mut t_far = 1.0_f32;
    let mut normal = Vec2::zeros();

    for axis in 0..2 {
        let (s, d) = (start[axis], delta[axis]);
        let (lo, hi) = (rect.min()[axis], rect.max()[axis]);
        if d == 0.0 {
            if s < lo || s > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let t1 = (lo - s) * inv;
        let t2 = (hi - s) * inv;
        let (t_enter, t_exit) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if t_enter > t_near {
            t_near = t_enter;
            normal = Vec2::zeros();
            normal[axis] = -sign(d);
        }
        t_far = t_far.min(t_exit);
        if t_near > t_far {
            return None;
        }
    }

    Some(SegmentHit {
        fraction: t_near,
        point: start + delta * t_near,
        normal,
    })
}

/// Quadratic ray/circle test; `start` is known to be outside the circle
fn segment_circle(start: Vec2, delta: Vec2, center: Vec2, radius: f32) -> Option<SegmentHit> {
    let a = delta.dot(&delta);
    if a == 0.0 {
        return None;
    }
    let f = start - center;
    let b = f.dot(&delta);
    let c = f.dot(&f) - radius * radius;
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / a;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let point = start + delta * t;
    let normal = utils::try_normalize(point - center)
        .or_else(|| utils::try_normalize(-delta))
        .unwrap_or_else(Vec2::zeros);
    Some(SegmentHit {
        fraction: t,
        point,
        normal,
    })
}
