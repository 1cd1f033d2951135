//! Physics module for collision detection and movement resolution
//!
//! Provides kinematic 2D collision: shapes, bodies, static tile geometry,
//! swept movement against blocking colliders, and frame-to-frame contact
//! events for triggers and solids.

pub mod body;
pub mod collision_layers;
pub mod collision_result;
pub mod collision_system;
pub mod contacts;
mod error;
pub mod level;
pub mod shape;
pub mod sweep;

pub use body::CollisionBody;
pub use collision_layers::CollisionLayers;
pub use collision_result::CollisionTestResult;
pub use collision_system::{CollisionEvents, CollisionSystem, MovementResolution};
pub use contacts::{ContactKey, ContactRecord, ContactSet, Participant};
pub use error::CollisionError;
pub use level::{LevelGeometry, TileCollider};
pub use shape::{BoxShape, CircleShape, CompositeShape, Contact, QueryShape, SegmentHit, Shape};
