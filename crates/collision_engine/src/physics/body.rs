//! Collision bodies registered with the collision system

use crate::foundation::math::{Rect, Vec2};
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::shape::Shape;

/// A shape plus the filtering and motion state the collision system tracks
///
/// The shape is in body-local space; [`CollisionBody::world_shape`] places it
/// at the last known position.
///
/// ```
/// use collision_engine::physics::{CollisionBody, CollisionLayers, Shape};
///
/// let body = CollisionBody::new(Shape::rect(16.0, 16.0).unwrap())
///     .with_layers(CollisionLayers::PLAYER)
///     .colliding_with(CollisionLayers::ALL_SOLID | CollisionLayers::ENEMY);
/// assert!(!body.is_trigger());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionBody {
    shape: Shape,
    layers: CollisionLayers,
    collides_with: CollisionLayers,
    is_trigger: bool,
    is_static: bool,
    velocity: Vec2,
    position: Vec2,
}

impl CollisionBody {
    /// Dynamic, non-trigger body on the `ENTITY` layer colliding with everything
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            layers: CollisionLayers::ENTITY,
            collides_with: CollisionLayers::ALL,
            is_trigger: false,
            is_static: false,
            velocity: Vec2::zeros(),
            position: Vec2::zeros(),
        }
    }

    /// Set the layers this body is on
    pub fn with_layers(mut self, layers: CollisionLayers) -> Self {
        self.layers = layers;
        self
    }

    /// Set the layers this body interacts with
    pub fn colliding_with(mut self, mask: CollisionLayers) -> Self {
        self.collides_with = mask;
        self
    }

    /// Make this body a trigger volume
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Make this body static: it blocks others but is never moved
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Local-space shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Layers this body is on
    pub fn layers(&self) -> CollisionLayers {
        self.layers
    }

    /// Layers this body interacts with
    pub fn collides_with(&self) -> CollisionLayers {
        self.collides_with
    }

    /// Whether this body only reports overlaps
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Whether this body is fixed in place
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Displacement applied by the last movement resolution
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Last known world position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Shape placed at the current position
    pub fn world_shape(&self) -> Shape {
        self.shape.translated(self.position)
    }

    /// World-space bounds
    pub fn world_bounds(&self) -> Rect {
        self.shape.final_bounds().translated(self.position)
    }

    /// Symmetric layer gate: both sides must accept the other's layers
    pub fn can_collide_with(&self, other: &CollisionBody) -> bool {
        CollisionLayers::should_collide(self.layers, self.collides_with, other.layers, other.collides_with)
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub(crate) fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Shape {
        Shape::rect(1.0, 1.0).expect("valid box")
    }

    #[test]
    fn test_gate_is_symmetric() {
        let a = CollisionBody::new(unit_box())
            .with_layers(CollisionLayers::ENTITY)
            .colliding_with(CollisionLayers::SOLID);
        let b = CollisionBody::new(unit_box())
            .with_layers(CollisionLayers::SOLID)
            .colliding_with(CollisionLayers::ENTITY);
        assert!(a.can_collide_with(&b));
        assert!(b.can_collide_with(&a));

        let b_closed = b.clone().colliding_with(CollisionLayers::PROJECTILE);
        assert!(!a.can_collide_with(&b_closed));
        assert!(!b_closed.can_collide_with(&a));

        let a_closed = a.colliding_with(CollisionLayers::WATER);
        assert!(!a_closed.can_collide_with(&b));
        assert!(!b.can_collide_with(&a_closed));
    }

    #[test]
    fn test_defaults() {
        let body = CollisionBody::new(unit_box());
        assert_eq!(body.layers(), CollisionLayers::ENTITY);
        assert_eq!(body.collides_with(), CollisionLayers::ALL);
        assert!(!body.is_trigger());
        assert!(!body.is_static());
        assert_eq!(body.velocity(), Vec2::zeros());
    }

    #[test]
    fn test_world_bounds_follow_position() {
        let mut body = CollisionBody::new(Shape::rect(2.0, 4.0).expect("box"));
        body.set_position(Vec2::new(10.0, 5.0));
        let bounds = body.world_bounds();
        assert_eq!(bounds.min(), Vec2::new(9.0, 3.0));
        assert_eq!(bounds.max(), Vec2::new(11.0, 7.0));
        assert_eq!(body.world_shape().final_bounds(), bounds);
    }
}
