//! Core engine modules
//!
//! Houses the unified configuration document shared by the collision system
//! and the message bus.

pub mod config;

pub use config::{CollisionConfig, CollisionEventScope, EngineConfig, MessagingConfig};
