//! # Collision Engine
//!
//! Discrete 2D kinematic collision detection for tile-based games, paired
//! with a scoped message bus for gameplay notifications.
//!
//! ## Features
//!
//! - **Swept Movement**: Per-axis movement resolution that slides along walls
//! - **Layered Filtering**: Bitflag layers and masks decide who interacts
//! - **Triggers & Platforms**: Non-blocking volumes and one-way floors
//! - **Spatial Queries**: Linecasts, raycasts and area overlaps
//! - **Message Bus**: Local, entity, global and spatial delivery, immediate or queued
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let bus = Arc::new(MessageBus::new());
//! let mut collision = CollisionSystem::new(Arc::clone(&bus));
//!
//! let floor = LevelGeometry::from_grid(
//!     Vec2::new(-32.0, -16.0),
//!     16.0,
//!     &[vec![CollisionLayers::SOLID; 4]],
//! )?;
//! collision.initialize_levels(&[floor]);
//!
//! let player = EntityId::new(1);
//! let body = CollisionBody::new(Shape::rect(8.0, 8.0)?).with_layers(CollisionLayers::PLAYER);
//! collision.register_entity(player, body, Vec2::new(0.0, 10.0))?;
//!
//! // Falling onto the floor stops just above it
//! let landed = collision.resolve_movement(player, Vec2::new(0.0, 10.0), Vec2::new(0.0, -10.0))?;
//! assert!(landed.y > 3.9 && landed.y < 4.1);
//!
//! collision.process_collisions();
//! bus.process_queued_messages();
//! # Ok::<(), CollisionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod config;
pub mod foundation;
pub mod messaging;
pub mod physics;
pub mod spatial;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::config::{CollisionConfig, CollisionEventScope, EngineConfig, MessagingConfig},
        foundation::{
            entity::{ColliderId, EntityId, TileCoord},
            math::{Rect, Vec2},
        },
        messaging::{
            CollisionMessage, HandlerResult, Message, MessageBus, MessageEnvelope, MessageError, MessageOptions,
            MessageReceiver, MessageScope, TriggerEnterMessage, TriggerExitMessage,
        },
        physics::{
            CollisionBody, CollisionError, CollisionLayers, CollisionSystem, CollisionTestResult, LevelGeometry,
            QueryShape, Shape, TileCollider,
        },
        spatial::SpatialQuery,
    };
}
