//! Swept shape casts used by movement resolution
//!
//! A moving shape is reduced to a point cast against the obstacle grown by
//! the mover (Minkowski sum): box against box becomes a point against a
//! larger box, a circle against a box becomes a point against a rounded
//! box, and so on.
//!
//! Blocking semantics differ from query casts in [`crate::physics::shape`]:
//! - sliding along a touching face is not a hit,
//! - a mover that starts penetrating an obstacle may only move to reduce
//!   the overlap; any other motion is blocked where it stands,
//! - only motion *into* a surface reports a hit.

use crate::foundation::math::{utils, Rect, Vec2};
use crate::physics::shape::{CircleShape, Contact, Shape};

/// Distance within which a mover is considered touching rather than
/// penetrating or separated.
pub const CONTACT_TOLERANCE: f32 = 1e-4;

/// Time of first blocking contact along a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Fraction of the motion completed at contact, in `[0, 1]`
    pub fraction: f32,
    /// Unit normal of the blocking surface, pointing toward the mover
    pub normal: Vec2,
}

/// Sweep `moving` by `delta` against a static `obstacle`
pub fn sweep(moving: &Shape, delta: Vec2, obstacle: &Shape) -> Option<SweepHit> {
    if let Some(contact) = deep_contact(moving, obstacle) {
        // Escaping (or sliding out along the normal) is free, anything else stays put
        return (delta.dot(&contact.normal) < 0.0).then_some(SweepHit {
            fraction: 0.0,
            normal: contact.normal,
        });
    }

    match (moving, obstacle) {
        (Shape::Composite(c), _) => earliest(c.children().iter().map(|child| sweep(child, delta, obstacle))),
        (_, Shape::Composite(c)) => earliest(c.children().iter().map(|child| sweep(moving, delta, child))),
        (Shape::Box(a), Shape::Box(b)) => {
            let a = a.final_bounds();
            let b = b.final_bounds();
            let grown = Rect::from_corners(b.min() - a.size(), b.max());
            cast_point_rect(a.min(), delta, &grown)
        }
        (Shape::Circle(c), Shape::Box(b)) => cast_point_rounded_rect(c.center(), delta, &b.final_bounds(), c.radius()),
        (Shape::Box(b), Shape::Circle(c)) => {
            // Move the circle backwards against the box instead
            cast_point_rounded_rect(c.center(), -delta, &b.final_bounds(), c.radius()).map(|hit| SweepHit {
                fraction: hit.fraction,
                normal: -hit.normal,
            })
        }
        (Shape::Circle(a), Shape::Circle(b)) => cast_point_circle(a.center(), delta, b.center(), a.radius() + b.radius()),
    }
}

/// Contact of `moving` at rest against `obstacle`, if deeper than the contact tolerance
fn deep_contact(moving: &Shape, obstacle: &Shape) -> Option<Contact> {
    moving
        .contact(obstacle)
        .filter(|contact| contact.depth > CONTACT_TOLERANCE)
}

fn earliest(hits: impl Iterator<Item = Option<SweepHit>>) -> Option<SweepHit> {
    let mut best: Option<SweepHit> = None;
    for hit in hits.flatten() {
        if best.map_or(true, |b| hit.fraction < b.fraction) {
            best = Some(hit);
        }
    }
    best
}

fn sign(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Point against box, slab method with blocking semantics
fn cast_point_rect(origin: Vec2, delta: Vec2, rect: &Rect) -> Option<SweepHit> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut normal = Vec2::zeros();

    for axis in 0..2 {
        let (s, d) = (origin[axis], delta[axis]);
        let (lo, hi) = (rect.min()[axis], rect.max()[axis]);
        if d == 0.0 {
            // Parallel: only a strictly interior line can ever enter
            if s <= lo + CONTACT_TOLERANCE || s >= hi - CONTACT_TOLERANCE {
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
    }

    if t_near >= t_far || t_far <= 0.0 || t_near > 1.0 {
        return None;
    }
    if t_near < 0.0 {
        // Already inside: touching counts as a hit, deeper overlap was settled by `sweep`
        let penetration = -t_near * delta.norm();
        if penetration > CONTACT_TOLERANCE {
            return None;
        }
        t_near = 0.0;
    }

    Some(SweepHit {
        fraction: t_near,
        normal,
    })
}

/// Point against circle of `radius` with blocking semantics
fn cast_point_circle(origin: Vec2, delta: Vec2, center: Vec2, radius: f32) -> Option<SweepHit> {
    let a = delta.dot(&delta);
    if a == 0.0 {
        return None;
    }
    let f = origin - center;
    let b = f.dot(&delta);
    if b >= 0.0 {
        // Moving away or tangentially
        return None;
    }

    let c = f.dot(&f) - radius * radius;
    if c < 0.0 {
        let penetration = radius - f.norm();
        if penetration > CONTACT_TOLERANCE {
            return None;
        }
        return Some(SweepHit {
            fraction: 0.0,
            normal: utils::try_normalize(f).unwrap_or_else(|| -delta / a.sqrt()),
        });
    }

    let discriminant = b * b - a * c;
    if discriminant <= 0.0 {
        return None;
    }
    let t = ((-b - discriminant.sqrt()) / a).max(0.0);
    if t > 1.0 {
        return None;
    }

    let contact = origin + delta * t;
    Some(SweepHit {
        fraction: t,
        normal: utils::try_normalize(contact - center).unwrap_or_else(|| -delta / a.sqrt()),
    })
}

/// Point against a box with corners rounded by `radius`
fn cast_point_rounded_rect(origin: Vec2, delta: Vec2, rect: &Rect, radius: f32) -> Option<SweepHit> {
    if radius == 0.0 {
        return cast_point_rect(origin, delta, rect);
    }

    let dist_sq = rect.distance_squared_to(origin);
    if dist_sq < radius * radius && radius - dist_sq.sqrt() > CONTACT_TOLERANCE {
        return None;
    }

    let (min, max) = (rect.min(), rect.max());
    let corners = [min, Vec2::new(max.x, min.y), Vec2::new(min.x, max.y), max];

    let faces = [
        cast_point_rect(origin, delta, &rect.expanded(Vec2::new(radius, 0.0))),
        cast_point_rect(origin, delta, &rect.expanded(Vec2::new(0.0, radius))),
    ];
    let rounded = corners.iter().map(|corner| {
        let circle = CircleShape::new(*corner, radius).ok()?;
        cast_point_circle(origin, delta, circle.center(), circle.radius())
    });

    earliest(faces.into_iter().chain(rounded))
}
