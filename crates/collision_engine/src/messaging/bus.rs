//! Scoped publish/subscribe message bus
//!
//! Key principles:
//! - Typed global handlers (many per payload type) plus id-keyed receivers
//! - Four fan-out scopes: Local, Entity, Global, Spatial
//! - Immediate or deferred delivery through one dispatch routine
//! - A failing handler never stops delivery to the others
//!
//! All methods take `&self`. Target lists are snapshotted before any
//! callback runs, so handlers may send, register or unregister while a
//! message is being delivered.

use crate::core::config::MessagingConfig;
use crate::foundation::entity::EntityId;
use crate::messaging::message::{HandlerId, Message, MessageEnvelope, MessageReceiver};
use crate::messaging::options::{MessageOptions, MessageScope};
use crate::messaging::{HandlerResult, MessageError};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

type HandlerFn = dyn Fn(&MessageEnvelope) -> HandlerResult + Send + Sync;

#[derive(Clone)]
struct HandlerEntry {
    id: HandlerId,
    callback: Arc<HandlerFn>,
}

/// Outcome of one send
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Targets that handled the message
    pub delivered: usize,
    /// Targets that returned an error or panicked
    pub failed: usize,
    /// The message was queued for the next drain instead
    pub queued: bool,
}

impl DeliveryReport {
    fn queued() -> Self {
        Self {
            queued: true,
            ..Self::default()
        }
    }

    fn record(&mut self, ok: bool) {
        if ok {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Typed, scope-aware message bus
pub struct MessageBus {
    config: MessagingConfig,
    handlers: RwLock<HashMap<TypeId, Vec<HandlerEntry>>>,
    /// Registration order is delivery order
    receivers: RwLock<Vec<(EntityId, Arc<dyn MessageReceiver>)>>,
    queue_tx: Sender<MessageEnvelope>,
    queue_rx: Mutex<Receiver<MessageEnvelope>>,
    pending: AtomicUsize,
    next_handler_id: AtomicU64,
}

impl MessageBus {
    /// Create a bus with default settings
    pub fn new() -> Self {
        Self::with_config(MessagingConfig::default())
    }

    /// Create a bus with explicit settings
    pub fn with_config(config: MessagingConfig) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel();
        Self {
            config,
            handlers: RwLock::new(HashMap::new()),
            receivers: RwLock::new(Vec::new()),
            queue_tx,
            queue_rx: Mutex::new(queue_rx),
            pending: AtomicUsize::new(0),
            next_handler_id: AtomicU64::new(1),
        }
    }

    /// Settings in use
    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    /// Register a global handler for payloads of type `T`
    ///
    /// Global sends of a `T` reach every handler in registration order.
    pub fn register_handler<T, F>(&self, handler: F) -> HandlerId
    where
        T: Message,
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_handler_id.fetch_add(1, Ordering::Relaxed));
        let callback: Arc<HandlerFn> = Arc::new(move |envelope: &MessageEnvelope| match envelope.payload::<T>() {
            Some(message) => handler(message),
            None => Ok(()),
        });

        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(TypeId::of::<T>())
            .or_default()
            .push(HandlerEntry { id, callback });

        log::trace!("Registered handler {:?} for {}", id, std::any::type_name::<T>());
        id
    }

    /// Remove a handler; the type entry goes away with its last handler
    pub fn unregister_handler<T: Message>(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let type_id = TypeId::of::<T>();

        let Some(list) = handlers.get_mut(&type_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|entry| entry.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            handlers.remove(&type_id);
        }
        removed
    }

    /// Number of handlers registered for `T`
    pub fn handler_count<T: Message>(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .map_or(0, Vec::len)
    }

    /// Whether `T` has a handler list at all
    pub fn has_handlers<T: Message>(&self) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    /// Register the receiver for `id`, returning the one it replaced
    ///
    /// A replacement keeps the original's place in delivery order.
    pub fn register_entity(&self, id: EntityId, receiver: Arc<dyn MessageReceiver>) -> Option<Arc<dyn MessageReceiver>> {
        let mut receivers = self.receivers.write().unwrap_or_else(PoisonError::into_inner);
        match receivers.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, receiver)),
            None => {
                receivers.push((id, receiver));
                None
            }
        }
    }

    /// Remove the receiver for `id`
    pub fn unregister_entity(&self, id: EntityId) -> Option<Arc<dyn MessageReceiver>> {
        let mut receivers = self.receivers.write().unwrap_or_else(PoisonError::into_inner);
        let index = receivers.iter().position(|(existing, _)| *existing == id)?;
        Some(receivers.remove(index).1)
    }

    /// Whether a receiver is registered under `id`
    pub fn is_registered(&self, id: EntityId) -> bool {
        self.receivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    /// Number of registered receivers
    pub fn receiver_count(&self) -> usize {
        self.receivers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Messages waiting for the next drain
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Send `message` according to `options`
    ///
    /// Immediate sends are dispatched before returning; deferred sends wait
    /// for [`MessageBus::process_queued_messages`]. Only malformed options
    /// are an error: missing targets and failing handlers are logged.
    pub fn send_message<T: Message>(
        &self,
        message: T,
        options: MessageOptions,
        sender: Option<EntityId>,
    ) -> Result<DeliveryReport, MessageError> {
        options.validate()?;

        if options.scope == MessageScope::Local {
            return Ok(DeliveryReport::default());
        }

        let envelope = MessageEnvelope::new(message, options, sender);
        if options.immediate {
            return Ok(self.dispatch(&envelope));
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.queue_tx.send(envelope).is_err() {
            // Receiver lives as long as the bus, so this cannot happen
            self.pending.fetch_sub(1, Ordering::AcqRel);
            log::error!("Message queue closed, dropping {}", std::any::type_name::<T>());
            return Ok(DeliveryReport::default());
        }
        Ok(DeliveryReport::queued())
    }

    /// Deliver every queued message in FIFO order, returning how many were drained
    ///
    /// Messages queued while draining are left for the next call.
    pub fn process_queued_messages(&self) -> usize {
        let batch: Vec<MessageEnvelope> = {
            let rx = self.queue_rx.lock().unwrap_or_else(PoisonError::into_inner);
            rx.try_iter().collect()
        };
        if batch.is_empty() {
            return 0;
        }
        self.pending.fetch_sub(batch.len(), Ordering::AcqRel);

        log::trace!("Draining {} queued messages", batch.len());
        for envelope in &batch {
            self.dispatch(envelope);
        }
        batch.len()
    }

    /// Drop every handler, receiver and queued message
    pub fn clear(&self) {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.receivers.write().unwrap_or_else(PoisonError::into_inner).clear();

        let rx = self.queue_rx.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = rx.try_iter().count();
        self.pending.fetch_sub(dropped, Ordering::AcqRel);
        if dropped > 0 {
            log::debug!("Discarded {} queued messages", dropped);
        }
    }

    fn dispatch(&self, envelope: &MessageEnvelope) -> DeliveryReport {
        let options = envelope.options();
        let mut report = DeliveryReport::default();

        match options.scope {
            MessageScope::Local => {}
            MessageScope::Entity => {
                let Some(target) = options.target_entity else {
                    return report;
                };
                match self.receiver(target) {
                    Some(receiver) => {
                        report.record(self.invoke(envelope, target, || receiver.receive(envelope)));
                    }
                    None => {
                        if self.config.warn_on_missing_target {
                            log::warn!("No receiver for {} addressed to {}", envelope.type_name(), target);
                        }
                    }
                }
            }
            MessageScope::Global => {
                for entry in self.handlers_for(envelope.type_id()) {
                    report.record(self.invoke(envelope, entry.id, || (entry.callback)(envelope)));
                }
                for (id, receiver) in self.receivers_snapshot() {
                    report.record(self.invoke(envelope, id, || receiver.receive(envelope)));
                }
            }
            MessageScope::Spatial => {
                let (Some(center), Some(range)) = (options.position, options.range) else {
                    return report;
                };
                let range_sq = range * range;
                for (id, receiver) in self.receivers_snapshot() {
                    if !options.include_sender && envelope.sender() == Some(id) {
                        continue;
                    }
                    let Some(position) = receiver.position() else {
                        continue;
                    };
                    if (position - center).norm_squared() <= range_sq {
                        report.record(self.invoke(envelope, id, || receiver.receive(envelope)));
                    }
                }
            }
        }

        log::trace!(
            "{} ({:?}): {} delivered, {} failed",
            envelope.type_name(),
            options.scope,
            report.delivered,
            report.failed
        );
        report
    }

    fn receiver(&self, id: EntityId) -> Option<Arc<dyn MessageReceiver>> {
        self.receivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, receiver)| Arc::clone(receiver))
    }

    fn receivers_snapshot(&self) -> Vec<(EntityId, Arc<dyn MessageReceiver>)> {
        self.receivers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn handlers_for(&self, type_id: TypeId) -> Vec<HandlerEntry> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Run one delivery, logging failures; returns whether it succeeded
    fn invoke(&self, envelope: &MessageEnvelope, target: impl fmt::Debug, deliver: impl FnOnce() -> HandlerResult) -> bool {
        let outcome = if self.config.catch_handler_panics {
            panic::catch_unwind(AssertUnwindSafe(deliver))
        } else {
            Ok(deliver())
        };

        match outcome {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                log::error!("{:?} failed handling {}: {}", target, envelope.type_name(), err);
                false
            }
            Err(panic) => {
                log::error!(
                    "{:?} panicked handling {}: {}",
                    target,
                    envelope.type_name(),
                    panic_message(panic.as_ref())
                );
                false
            }
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handler_types = self.handlers.read().map_or(0, |h| h.len());
        f.debug_struct("MessageBus")
            .field("config", &self.config)
            .field("handler_types", &handler_types)
            .field("receivers", &self.receiver_count())
            .field("pending", &self.pending_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);

    #[derive(Debug)]
    struct Other;

    type Log = Arc<Mutex<Vec<(u32, u32)>>>;

    /// Records (receiver id, ping value)
    struct Recorder {
        id: u32,
        position: Option<Vec2>,
        log: Log,
    }

    impl MessageReceiver for Recorder {
        fn position(&self) -> Option<Vec2> {
            self.position
        }

        fn receive(&self, envelope: &MessageEnvelope) -> HandlerResult {
            if let Some(ping) = envelope.payload::<Ping>() {
                self.log.lock().expect("log").push((self.id, ping.0));
            }
            Ok(())
        }
    }

    struct Panicker;

    impl MessageReceiver for Panicker {
        fn receive(&self, _envelope: &MessageEnvelope) -> HandlerResult {
            panic!("receiver exploded");
        }
    }

    fn recorder(bus: &MessageBus, id: u32, position: Option<Vec2>, log: &Log) {
        bus.register_entity(
            EntityId::new(id),
            Arc::new(Recorder {
                id,
                position,
                log: Arc::clone(log),
            }),
        );
    }

    fn entries(log: &Log) -> Vec<(u32, u32)> {
        log.lock().expect("log").clone()
    }

    #[test]
    fn test_global_reaches_handlers_and_receivers() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        let handled = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&handled);
        bus.register_handler::<Ping, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        recorder(&bus, 1, None, &log);
        recorder(&bus, 2, None, &log);

        let report = bus.send_message(Ping(5), MessageOptions::global(), Some(EntityId::new(1))).expect("send");

        assert_eq!(report.delivered, 3);
        assert_eq!(handled.load(Ordering::SeqCst), 1);
        assert_eq!(entries(&log), vec![(1, 5), (2, 5)]);
    }

    #[test]
    fn test_handlers_only_see_their_type() {
        let bus = MessageBus::new();
        let handled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&handled);
        bus.register_handler::<Ping, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let report = bus.send_message(Other, MessageOptions::global(), None).expect("send");
        assert_eq!(report.delivered, 0);
        assert_eq!(handled.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_entity_scope_hits_only_target() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        recorder(&bus, 1, None, &log);
        recorder(&bus, 2, None, &log);

        bus.send_message(Ping(9), MessageOptions::entity(EntityId::new(2)), None).expect("send");
        assert_eq!(entries(&log), vec![(2, 9)]);
    }

    #[test]
    fn test_entity_scope_to_unknown_id_is_silent() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        recorder(&bus, 1, None, &log);

        let report = bus
            .send_message(Ping(1), MessageOptions::entity(EntityId::new(42)), None)
            .expect("missing target is not an error");
        assert_eq!(report, DeliveryReport::default());
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_spatial_scope_uses_range() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        let epicenter = Vec2::new(10.0, 10.0);
        recorder(&bus, 1, Some(epicenter + Vec2::new(1.0, 0.0)), &log);
        recorder(&bus, 2, Some(epicenter + Vec2::new(0.0, -2.0)), &log);
        recorder(&bus, 3, Some(epicenter + Vec2::new(-3.0, 0.0)), &log);
        recorder(&bus, 4, None, &log);

        let report = bus.send_message(Ping(0), MessageOptions::spatial(epicenter, 2.5), None).expect("send");

        assert_eq!(report.delivered, 2);
        assert_eq!(entries(&log), vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn test_spatial_scope_sender_exclusion() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        recorder(&bus, 1, Some(Vec2::zeros()), &log);
        recorder(&bus, 2, Some(Vec2::new(1.0, 0.0)), &log);

        let sender = Some(EntityId::new(1));
        bus.send_message(Ping(1), MessageOptions::spatial(Vec2::zeros(), 5.0), sender).expect("send");
        assert_eq!(entries(&log), vec![(2, 1)]);

        bus.send_message(Ping(2), MessageOptions::spatial(Vec2::zeros(), 5.0).include_sender(), sender)
            .expect("send");
        assert_eq!(entries(&log), vec![(2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_local_scope_is_a_no_op() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        recorder(&bus, 1, Some(Vec2::zeros()), &log);
        bus.register_handler::<Ping, _>(|_| panic!("local sends must not reach handlers"));

        let report = bus.send_message(Ping(1), MessageOptions::local(), Some(EntityId::new(1))).expect("send");
        assert_eq!(report, DeliveryReport::default());
        assert!(entries(&log).is_empty());
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_deferred_messages_drain_in_order_once() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        recorder(&bus, 1, None, &log);

        for value in 0..3 {
            let report = bus
                .send_message(Ping(value), MessageOptions::global().deferred(), None)
                .expect("send");
            assert!(report.queued);
        }
        assert!(entries(&log).is_empty());
        assert_eq!(bus.pending_count(), 3);

        assert_eq!(bus.process_queued_messages(), 3);
        assert_eq!(entries(&log), vec![(1, 0), (1, 1), (1, 2)]);
        assert_eq!(bus.pending_count(), 0);

        assert_eq!(bus.process_queued_messages(), 0);
        assert_eq!(entries(&log).len(), 3);
    }

    #[test]
    fn test_messages_queued_while_draining_wait() {
        let bus = Arc::new(MessageBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = Arc::downgrade(&bus);
        let inner_seen = Arc::clone(&seen);
        bus.register_handler::<Ping, _>(move |ping| {
            inner_seen.lock().expect("seen").push(ping.0);
            if ping.0 == 1 {
                if let Some(bus) = inner_bus.upgrade() {
                    bus.send_message(Ping(2), MessageOptions::global().deferred(), None)?;
                }
            }
            Ok(())
        });

        bus.send_message(Ping(1), MessageOptions::global().deferred(), None).expect("send");
        assert_eq!(bus.process_queued_messages(), 1);
        assert_eq!(*seen.lock().expect("seen"), vec![1]);

        assert_eq!(bus.process_queued_messages(), 1);
        assert_eq!(*seen.lock().expect("seen"), vec![1, 2]);
    }

    #[test]
    fn test_handlers_can_reenter_the_bus() {
        let bus = Arc::new(MessageBus::new());
        let others = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&bus);
        bus.register_handler::<Ping, _>(move |_| {
            if let Some(bus) = weak.upgrade() {
                bus.send_message(Other, MessageOptions::global(), None)?;
                bus.register_handler::<Ping, _>(|_| Ok(()));
            }
            Ok(())
        });
        let counter = Arc::clone(&others);
        bus.register_handler::<Other, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let report = bus.send_message(Ping(0), MessageOptions::global(), None).expect("send");
        assert_eq!(report.delivered, 1);
        assert_eq!(others.load(Ordering::SeqCst), 1);
        assert_eq!(bus.handler_count::<Ping>(), 2);
    }

    #[test]
    fn test_failures_do_not_stop_delivery() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();

        bus.register_handler::<Ping, _>(|_| Err(MessageError::handler("refused")));
        bus.register_handler::<Ping, _>(|_| panic!("handler exploded"));
        bus.register_entity(EntityId::new(1), Arc::new(Panicker));
        recorder(&bus, 2, None, &log);

        let report = bus.send_message(Ping(3), MessageOptions::global(), None).expect("send");

        assert_eq!(report.failed, 3);
        assert_eq!(report.delivered, 1);
        assert_eq!(entries(&log), vec![(2, 3)]);
    }

    #[test]
    fn test_unregister_last_handler_removes_type() {
        let bus = MessageBus::new();
        let first = bus.register_handler::<Ping, _>(|_| Ok(()));
        let second = bus.register_handler::<Ping, _>(|_| Ok(()));
        assert_eq!(bus.handler_count::<Ping>(), 2);

        assert!(bus.unregister_handler::<Ping>(first));
        assert!(bus.has_handlers::<Ping>());
        assert!(!bus.unregister_handler::<Ping>(first));
        assert!(!bus.unregister_handler::<Other>(second));

        assert!(bus.unregister_handler::<Ping>(second));
        assert!(!bus.has_handlers::<Ping>());
        assert_eq!(bus.handler_count::<Ping>(), 0);
    }

    #[test]
    fn test_replaced_receiver_keeps_its_slot() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        recorder(&bus, 1, None, &log);
        recorder(&bus, 2, None, &log);
        recorder(&bus, 1, None, &log);
        assert_eq!(bus.receiver_count(), 2);

        bus.send_message(Ping(4), MessageOptions::global(), None).expect("send");
        assert_eq!(entries(&log), vec![(1, 4), (2, 4)]);

        assert!(bus.unregister_entity(EntityId::new(1)).is_some());
        assert!(bus.unregister_entity(EntityId::new(1)).is_none());
        assert!(!bus.is_registered(EntityId::new(1)));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let bus = MessageBus::new();
        let options = MessageOptions {
            scope: MessageScope::Spatial,
            ..MessageOptions::local()
        };
        let result = bus.send_message(Ping(0), options, None);
        assert!(matches!(result, Err(MessageError::InvalidOptions(_))));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let bus = MessageBus::new();
        let log: Log = Arc::default();
        bus.register_handler::<Ping, _>(|_| Ok(()));
        recorder(&bus, 1, None, &log);
        bus.send_message(Ping(1), MessageOptions::global().deferred(), None).expect("send");

        bus.clear();
        bus.clear();

        assert!(!bus.has_handlers::<Ping>());
        assert_eq!(bus.receiver_count(), 0);
        assert_eq!(bus.pending_count(), 0);
        assert_eq!(bus.process_queued_messages(), 0);
        assert!(entries(&log).is_empty());
    }
}
