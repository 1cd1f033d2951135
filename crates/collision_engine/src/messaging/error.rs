//! Message bus errors

use thiserror::Error;

/// Errors raised by the message bus and by handlers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Options are missing a field their scope requires
    #[error("Invalid message options: {0}")]
    InvalidOptions(String),

    /// A handler or receiver failed; logged by the bus, never returned to the sender
    #[error("Handler failed: {0}")]
    Handler(String),
}

impl MessageError {
    /// Convenience constructor for handler failures
    pub fn handler(reason: impl Into<String>) -> Self {
        Self::Handler(reason.into())
    }
}

/// Result returned by handlers and receivers
pub type HandlerResult = Result<(), MessageError>;
