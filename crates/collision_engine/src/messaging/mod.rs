//! Message bus following Game Engine Architecture Ch 16.8
//!
//! Producers (the collision system, gameplay code) send typed payloads with
//! [`MessageOptions`] describing who should get them; the [`MessageBus`]
//! delivers immediately or on the next queue drain.

pub mod bus;
mod error;
pub mod message;
pub mod messages;
pub mod options;

pub use bus::{DeliveryReport, MessageBus};
pub use error::{HandlerResult, MessageError};
pub use message::{HandlerId, Message, MessageEnvelope, MessageReceiver};
pub use messages::{
    CollisionMessage, DamageMessage, EntityDestroyedMessage, ExplosionMessage, HealMessage, PickupMessage,
    TriggerEnterMessage, TriggerExitMessage,
};
pub use options::{MessageOptions, MessageScope};
