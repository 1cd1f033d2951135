//! # Engine Configuration
//!
//! Tunables for the collision system and the message bus, grouped into one
//! serializable document so a game can ship them as a TOML or RON file.
//!
//! ```toml
//! [collision]
//! cell_size = 32.0
//! skin_width = 0.001
//! event_scope = "Entity"
//! deferred_events = false
//!
//! [messaging]
//! warn_on_missing_target = true
//! catch_handler_panics = true
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// How the collision system addresses the messages it emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollisionEventScope {
    /// One `Global` send per event: every global handler and every receiver
    #[default]
    Global,
    /// One `Entity` send per participating entity
    Entity,
}

/// # Collision Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Edge length of a broad-phase grid cell, in world units
    pub cell_size: f32,
    /// Gap left between a blocked body and the obstacle it hit
    pub skin_width: f32,
    /// Addressing used for trigger and collision messages
    pub event_scope: CollisionEventScope,
    /// Queue collision messages instead of dispatching them immediately
    pub deferred_events: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            skin_width: 0.001,
            event_scope: CollisionEventScope::Global,
            deferred_events: false,
        }
    }
}

impl CollisionConfig {
    /// Set the broad-phase cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the skin width
    pub fn with_skin_width(mut self, skin_width: f32) -> Self {
        self.skin_width = skin_width;
        self
    }

    /// Set the event scope
    pub fn with_event_scope(mut self, scope: CollisionEventScope) -> Self {
        self.event_scope = scope;
        self
    }

    /// Queue collision events for `MessageBus::process_queued_messages`
    pub fn with_deferred_events(mut self, deferred: bool) -> Self {
        self.deferred_events = deferred;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "collision.cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.skin_width.is_finite() && self.skin_width >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "collision.skin_width must be non-negative, got {}",
                self.skin_width
            )));
        }
        Ok(())
    }
}

/// # Messaging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Log a warning when an `Entity`-scoped send finds no receiver
    pub warn_on_missing_target: bool,
    /// Contain panics raised inside handlers and receivers
    pub catch_handler_panics: bool,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            warn_on_missing_target: true,
            catch_handler_panics: true,
        }
    }
}

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Collision system settings
    pub collision: CollisionConfig,
    /// Message bus settings
    pub messaging: MessagingConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.collision.validate()
    }
}
