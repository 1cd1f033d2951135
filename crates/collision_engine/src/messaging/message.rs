//! Message envelopes and receiver endpoints

use crate::foundation::entity::EntityId;
use crate::foundation::math::Vec2;
use crate::messaging::{HandlerResult, MessageOptions};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Anything that can travel on the bus
///
/// Implemented for every `'static + Send + Sync + Debug` type; payloads are
/// plain data.
pub trait Message: Any + Send + Sync + fmt::Debug {}

impl<T: Any + Send + Sync + fmt::Debug> Message for T {}

/// Object-safe view of a payload
trait Payload: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Message> Payload for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A message in flight together with its addressing
#[derive(Clone)]
pub struct MessageEnvelope {
    payload: Arc<dyn Payload>,
    type_id: TypeId,
    type_name: &'static str,
    sender: Option<EntityId>,
    options: MessageOptions,
}

impl MessageEnvelope {
    /// Wrap `message` for delivery
    pub fn new<T: Message>(message: T, options: MessageOptions, sender: Option<EntityId>) -> Self {
        Self {
            payload: Arc::new(message),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            sender,
            options,
        }
    }

    /// Typed view of the payload, `None` when it is not a `T`
    pub fn payload<T: Message>(&self) -> Option<&T> {
        // Deref first so the blanket impl does not pick up the Arc itself
        (*self.payload).as_any().downcast_ref::<T>()
    }

    /// Whether the payload is a `T`
    pub fn is<T: Message>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Payload type id
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Payload type name, used in logs
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Entity that sent the message, if any
    pub fn sender(&self) -> Option<EntityId> {
        self.sender
    }

    /// Options the message was sent with
    pub fn options(&self) -> &MessageOptions {
        &self.options
    }
}

impl fmt::Debug for MessageEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageEnvelope")
            .field("payload", &self.payload)
            .field("sender", &self.sender)
            .field("options", &self.options)
            .finish()
    }
}

/// Entity-side endpoint registered with the bus
///
/// Receivers take `&self`; keep mutable state behind a lock or atomics.
pub trait MessageReceiver: Send + Sync {
    /// World position used by spatial sends; receivers without one never get them
    fn position(&self) -> Option<Vec2> {
        None
    }

    /// Handle a delivered message
    fn receive(&self, envelope: &MessageEnvelope) -> HandlerResult;
}

/// Identifies a registered handler for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    #[derive(Debug)]
    struct Pong;

    #[test]
    fn test_payload_downcast() {
        let envelope = MessageEnvelope::new(Ping(7), MessageOptions::global(), Some(EntityId::new(3)));
        assert_eq!(envelope.payload::<Ping>(), Some(&Ping(7)));
        assert!(envelope.payload::<Pong>().is_none());
        assert!(envelope.is::<Ping>());
        assert!(!envelope.is::<Pong>());
        assert_eq!(envelope.type_id(), TypeId::of::<Ping>());
        assert!(envelope.type_name().ends_with("Ping"));
        assert_eq!(envelope.sender(), Some(EntityId::new(3)));
    }

    #[test]
    fn test_clone_shares_payload() {
        let envelope = MessageEnvelope::new(Ping(1), MessageOptions::local(), None);
        let copy = envelope.clone();
        assert_eq!(copy.payload::<Ping>(), Some(&Ping(1)));
        assert!(format!("{:?}", copy).contains("Ping(1)"));
    }
}
