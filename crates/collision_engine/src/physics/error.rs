//! Collision system errors

use crate::foundation::entity::EntityId;
use thiserror::Error;

/// Errors raised by shapes and the collision system
///
/// `EntityNotFound` is a lookup miss: callers may ignore it, the system has
/// already logged it. Every other variant is a configuration error raised
/// at the call site that passed the bad value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// Shape parameters out of range (negative size, NaN, empty composite)
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Batch query inputs of different lengths
    #[error("Mismatched batch lengths: {left} origins vs {right} directions")]
    MismatchedLengths {
        /// Length of the first slice
        left: usize,
        /// Length of the second slice
        right: usize,
    },

    /// Query parameters out of range
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// No body is registered under this id
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),
}

impl CollisionError {
    /// Whether the error is a non-fatal lookup miss
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EntityNotFound(_))
    }
}
