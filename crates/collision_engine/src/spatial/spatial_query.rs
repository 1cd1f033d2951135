//! Abstract spatial query interface for broad-phase collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.2:
//! "Spatial partitioning schemes... allow us to quickly cull out pairs of
//! objects that cannot possibly be colliding."
//!
//! This abstraction allows swapping different spatial partitioning schemes
//! (grid, quadtree, BVH, etc.) without changing the collision system.

use crate::foundation::entity::EntityId;
use crate::foundation::math::{Rect, Vec2};
use crate::spatial::SpatialGrid;

/// Abstract interface for spatial partitioning used in broad-phase collision detection
///
/// GEA 13.3.2: "The broad phase quickly identifies pairs of objects that might
/// be colliding using some kind of spatial partitioning scheme."
pub trait SpatialQuery: Send + Sync {
    /// Insert an entity with its world bounds
    fn insert(&mut self, entity: EntityId, bounds: Rect);

    /// Remove an entity from the spatial structure
    fn remove(&mut self, entity: EntityId);

    /// Update an entity's bounds in the spatial structure
    fn update(&mut self, entity: EntityId, bounds: Rect);

    /// Query entities whose bounds intersect an AABB
    fn query_aabb(&self, aabb: &Rect) -> Vec<EntityId>;

    /// Query entities whose bounds touch a circle's bounding box
    fn query_circle(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.query_aabb(&Rect::from_center_size(center, Vec2::new(radius * 2.0, radius * 2.0)))
    }

    /// Query entities whose bounds touch the bounding box of a segment
    fn query_segment(&self, start: Vec2, end: Vec2) -> Vec<EntityId> {
        self.query_aabb(&Rect::from_corners(start, end))
    }

    /// Query entities near a specific entity (for collision detection)
    fn query_nearby(&self, entity: EntityId) -> Vec<EntityId> {
        match self.get_bounds(entity) {
            Some(bounds) => self
                .query_aabb(&bounds)
                .into_iter()
                .filter(|other| *other != entity)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Get an entity's stored bounds
    fn get_bounds(&self, entity: EntityId) -> Option<Rect>;

    /// Clear all entities from the spatial structure
    fn clear(&mut self);

    /// Get the number of entities in the structure
    fn entity_count(&self) -> usize;
}

impl SpatialQuery for SpatialGrid<EntityId> {
    fn insert(&mut self, entity: EntityId, bounds: Rect) {
        SpatialGrid::insert(self, entity, bounds);
    }

    fn remove(&mut self, entity: EntityId) {
        SpatialGrid::remove(self, entity);
    }

    fn update(&mut self, entity: EntityId, bounds: Rect) {
        // Grid insert already re-buckets an existing key
        SpatialGrid::insert(self, entity, bounds);
    }

    fn query_aabb(&self, aabb: &Rect) -> Vec<EntityId> {
        self.query(aabb)
    }

    fn get_bounds(&self, entity: EntityId) -> Option<Rect> {
        self.bounds(entity)
    }

    fn clear(&mut self) {
        SpatialGrid::clear(self);
    }

    fn entity_count(&self) -> usize {
        self.len()
    }
}
