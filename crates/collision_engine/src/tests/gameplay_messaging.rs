//! Gameplay messaging scenarios
//!
//! Receivers reacting to collision events by sending further messages:
//! pickups, explosions and damage.

use crate::core::config::{CollisionConfig, CollisionEventScope};
use crate::foundation::entity::{ColliderId, EntityId};
use crate::foundation::math::Vec2;
use crate::messaging::{
    DamageMessage, ExplosionMessage, HandlerResult, MessageBus, MessageEnvelope, MessageError, MessageOptions,
    MessageReceiver, PickupMessage, TriggerEnterMessage,
};
use crate::physics::{CollisionBody, CollisionLayers, CollisionSystem, Shape};
use std::sync::{Arc, Mutex, Weak};

/// Actor with a position and a health pool
struct Actor {
    id: EntityId,
    position: Vec2,
    health: Mutex<f32>,
    bus: Weak<MessageBus>,
}

impl Actor {
    fn new(id: EntityId, position: Vec2, bus: &Arc<MessageBus>) -> Arc<Self> {
        Arc::new(Self {
            id,
            position,
            health: Mutex::new(100.0),
            bus: Arc::downgrade(bus),
        })
    }

    fn health(&self) -> f32 {
        *self.health.lock().expect("health")
    }
}

impl MessageReceiver for Actor {
    fn position(&self) -> Option<Vec2> {
        Some(self.position)
    }

    fn receive(&self, envelope: &MessageEnvelope) -> HandlerResult {
        if let Some(damage) = envelope.payload::<DamageMessage>() {
            *self.health.lock().expect("health") -= damage.amount;
        } else if let Some(explosion) = envelope.payload::<ExplosionMessage>() {
            // Falloff with distance from the epicenter
            let distance = (self.position - explosion.center).norm();
            let amount = explosion.damage * (1.0 - distance / explosion.radius).max(0.0);
            let bus = self.bus.upgrade().ok_or_else(|| MessageError::handler("bus dropped"))?;
            bus.send_message(
                DamageMessage {
                    amount,
                    source: envelope.sender(),
                    position: self.position,
                },
                MessageOptions::entity(self.id).deferred(),
                envelope.sender(),
            )?;
        }
        Ok(())
    }
}

/// Coin that turns a trigger enter into a pickup
struct Coin {
    id: EntityId,
    bus: Weak<MessageBus>,
}

impl MessageReceiver for Coin {
    fn receive(&self, envelope: &MessageEnvelope) -> HandlerResult {
        let Some(enter) = envelope.payload::<TriggerEnterMessage>() else {
            return Ok(());
        };
        if enter.trigger_id != ColliderId::Entity(self.id) {
            return Ok(());
        }
        let bus = self.bus.upgrade().ok_or_else(|| MessageError::handler("bus dropped"))?;
        bus.send_message(
            PickupMessage {
                pickup_id: self.id,
                collector_id: enter.entity_id,
                kind: "coin".to_string(),
            },
            MessageOptions::global().deferred(),
            Some(self.id),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coin_pickup_round_trip() {
        let bus = Arc::new(MessageBus::new());
        let config = CollisionConfig::default().with_event_scope(CollisionEventScope::Entity);
        let mut system = CollisionSystem::with_config(config, Arc::clone(&bus));

        let pickups = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&pickups);
        bus.register_handler::<PickupMessage, _>(move |pickup| {
            sink.lock().expect("pickups").push(pickup.clone());
            Ok(())
        });

        let coin_id = EntityId::new(10);
        let player_id = EntityId::new(1);
        bus.register_entity(
            coin_id,
            Arc::new(Coin {
                id: coin_id,
                bus: Arc::downgrade(&bus),
            }),
        );

        let coin = CollisionBody::new(Shape::circle(2.0).expect("circle"))
            .with_layers(CollisionLayers::PICKUP)
            .as_trigger();
        system.register_entity(coin_id, coin, Vec2::new(20.0, 0.0)).expect("register");
        let player = CollisionBody::new(Shape::rect(4.0, 4.0).expect("box")).with_layers(CollisionLayers::PLAYER);
        system.register_entity(player_id, player, Vec2::zeros()).expect("register");

        // Dash straight through the coin in one frame
        let end = system
            .resolve_movement(player_id, Vec2::zeros(), Vec2::new(40.0, 0.0))
            .expect("resolve");
        assert_eq!(end, Vec2::new(40.0, 0.0));

        assert_eq!(system.process_collisions().trigger_enters, 1);
        assert!(pickups.lock().expect("pickups").is_empty());

        assert_eq!(bus.process_queued_messages(), 1);
        let pickups = pickups.lock().expect("pickups");
        assert_eq!(pickups.len(), 1);
        assert_eq!(pickups[0].collector_id, player_id);
        assert_eq!(pickups[0].kind, "coin");
    }

    #[test]
    fn test_explosion_damages_only_actors_in_range() {
        let bus = Arc::new(MessageBus::new());
        let near = Actor::new(EntityId::new(1), Vec2::new(1.0, 0.0), &bus);
        let edge = Actor::new(EntityId::new(2), Vec2::new(0.0, 4.0), &bus);
        let far = Actor::new(EntityId::new(3), Vec2::new(10.0, 0.0), &bus);
        for actor in [&near, &edge, &far] {
            bus.register_entity(actor.id, Arc::clone(actor) as Arc<dyn MessageReceiver>);
        }

        let bomb = EntityId::new(99);
        let report = bus
            .send_message(
                ExplosionMessage {
                    center: Vec2::zeros(),
                    radius: 4.0,
                    damage: 40.0,
                },
                MessageOptions::spatial(Vec2::zeros(), 4.0),
                Some(bomb),
            )
            .expect("valid options");
        assert_eq!(report.delivered, 2);

        // Damage is queued by the receivers themselves
        assert_eq!(bus.pending_count(), 2);
        assert_eq!(bus.process_queued_messages(), 2);

        assert_relative_eq!(near.health(), 70.0);
        assert_relative_eq!(edge.health(), 100.0);
        assert_relative_eq!(far.health(), 100.0);
    }

    #[test]
    fn test_failing_receiver_does_not_stop_collision_events() {
        struct Grumpy;
        impl MessageReceiver for Grumpy {
            fn receive(&self, _envelope: &MessageEnvelope) -> HandlerResult {
                Err(MessageError::handler("not today"))
            }
        }

        let bus = Arc::new(MessageBus::new());
        let mut system = CollisionSystem::new(Arc::clone(&bus));
        bus.register_entity(EntityId::new(1), Arc::new(Grumpy));

        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        bus.register_handler::<TriggerEnterMessage, _>(move |_| {
            *counter.lock().expect("counter") += 1;
            Ok(())
        });

        let zone = CollisionBody::new(Shape::rect(10.0, 10.0).expect("box")).as_trigger();
        system.register_entity(EntityId::new(1), zone, Vec2::zeros()).expect("register");
        for id in 2..5 {
            let body = CollisionBody::new(Shape::rect(1.0, 1.0).expect("box"));
            system.register_entity(EntityId::new(id), body, Vec2::new(id as f32, 0.0)).expect("register");
        }

        assert_eq!(system.process_collisions().trigger_enters, 3);
        assert_eq!(*seen.lock().expect("counter"), 3);
    }
}
