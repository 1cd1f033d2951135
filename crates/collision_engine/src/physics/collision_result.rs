//! Outcome of a spatial query

use crate::foundation::entity::{ColliderId, EntityId, TileCoord};
use crate::foundation::math::Vec2;
use crate::physics::collision_layers::CollisionLayers;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HitInfo {
    point: Vec2,
    normal: Vec2,
    distance: f32,
    collider: ColliderId,
    layers: CollisionLayers,
}

/// Result of a raycast, linecast or overlap query
///
/// A hit always names exactly one collider, either an entity or a tile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionTestResult {
    hit: Option<HitInfo>,
}

impl CollisionTestResult {
    /// Nothing was struck
    pub const fn no_hit() -> Self {
        Self { hit: None }
    }

    /// A static level tile was struck
    pub fn hit_tile(tile: TileCoord, point: Vec2, normal: Vec2, distance: f32, layers: CollisionLayers) -> Self {
        Self::hit(ColliderId::Tile(tile), point, normal, distance, layers)
    }

    /// A registered entity body was struck
    pub fn hit_entity(entity: EntityId, point: Vec2, normal: Vec2, distance: f32, layers: CollisionLayers) -> Self {
        Self::hit(ColliderId::Entity(entity), point, normal, distance, layers)
    }

    pub(crate) fn hit(collider: ColliderId, point: Vec2, normal: Vec2, distance: f32, layers: CollisionLayers) -> Self {
        Self {
            hit: Some(HitInfo {
                point,
                normal,
                distance,
                collider,
                layers,
            }),
        }
    }

    /// Whether anything was struck
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }

    /// Contact point in world space
    pub fn point(&self) -> Option<Vec2> {
        self.hit.map(|h| h.point)
    }

    /// Surface normal at the contact point
    pub fn normal(&self) -> Option<Vec2> {
        self.hit.map(|h| h.normal)
    }

    /// Distance from the query origin
    pub fn distance(&self) -> Option<f32> {
        self.hit.map(|h| h.distance)
    }

    /// Whatever was struck
    pub fn collider(&self) -> Option<ColliderId> {
        self.hit.map(|h| h.collider)
    }

    /// Struck entity, `None` for tiles and misses
    pub fn entity(&self) -> Option<EntityId> {
        self.collider().and_then(|c| c.entity())
    }

    /// Struck tile, `None` for entities and misses
    pub fn tile(&self) -> Option<TileCoord> {
        self.collider().and_then(|c| c.tile())
    }

    /// Layers of what was struck, empty on a miss
    pub fn layers(&self) -> CollisionLayers {
        self.hit.map_or(CollisionLayers::NONE, |h| h.layers)
    }
}
