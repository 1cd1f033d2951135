//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Entity identifiers shared by the collision system and the message bus
//! - Logging utilities

pub mod entity;
pub mod logging;
pub mod math;
