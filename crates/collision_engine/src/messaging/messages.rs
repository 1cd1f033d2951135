//! Message payloads carried by the bus
//!
//! The collision system emits the first three; the rest are common gameplay
//! notifications so behaviours do not each invent their own.

use crate::foundation::entity::{ColliderId, EntityId};
use crate::foundation::math::Vec2;
use crate::physics::CollisionLayers;

/// Two solid colliders began touching
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionMessage {
    /// Entity side of the contact
    pub entity_a: EntityId,
    /// Other collider: an entity or a tile
    pub entity_b: ColliderId,
    /// World-space contact point
    pub contact_point: Vec2,
    /// Unit normal pointing from `entity_b` toward `entity_a`
    pub contact_normal: Vec2,
    /// Overlap depth, zero when the contact came from a blocked sweep
    pub penetration_depth: f32,
}

/// An entity began overlapping a trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEnterMessage {
    /// Trigger body or trigger tile
    pub trigger_id: ColliderId,
    /// Entity that entered
    pub entity_id: EntityId,
    /// Layers of the trigger
    pub trigger_layers: CollisionLayers,
}

/// An entity stopped overlapping a trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerExitMessage {
    /// Trigger body or trigger tile
    pub trigger_id: ColliderId,
    /// Entity that left
    pub entity_id: EntityId,
    /// Layers of the trigger
    pub trigger_layers: CollisionLayers,
}

/// Damage applied to an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageMessage {
    /// Hit points removed
    pub amount: f32,
    /// Who dealt it, if anyone
    pub source: Option<EntityId>,
    /// Where it landed
    pub position: Vec2,
}

/// Hit points restored to an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealMessage {
    /// Hit points restored
    pub amount: f32,
}

/// A pickup was collected
#[derive(Debug, Clone, PartialEq)]
pub struct PickupMessage {
    /// Pickup entity
    pub pickup_id: EntityId,
    /// Collector
    pub collector_id: EntityId,
    /// Kind of pickup, e.g. `"coin"`
    pub kind: String,
}

/// Radial impulse request, usually sent with spatial scope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionMessage {
    /// Epicenter
    pub center: Vec2,
    /// Blast radius
    pub radius: f32,
    /// Damage at the epicenter
    pub damage: f32,
}

/// An entity is being removed from the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDestroyedMessage {
    /// Entity going away
    pub entity_id: EntityId,
}
