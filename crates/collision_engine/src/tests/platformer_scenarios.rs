//! Platformer-style scenarios
//!
//! A small tile level with a floor, a water pool and a one-way ledge,
//! driven frame by frame through movement resolution and event processing.

use crate::core::config::{CollisionConfig, EngineConfig};
use crate::foundation::entity::{ColliderId, EntityId, TileCoord};
use crate::foundation::math::Vec2;
use crate::messaging::{CollisionMessage, Message, MessageBus, TriggerEnterMessage, TriggerExitMessage};
use crate::physics::{CollisionBody, CollisionLayers, CollisionSystem, LevelGeometry, Shape};
use std::sync::{Arc, Mutex};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SKIN: f32 = 0.001;
    const TILE: f32 = 16.0;

    /// Floor across row 0, water over columns 3-4 of row 1
    fn pool_level() -> LevelGeometry {
        let s = CollisionLayers::SOLID;
        let w = CollisionLayers::WATER;
        let n = CollisionLayers::NONE;
        LevelGeometry::from_grid(
            Vec2::zeros(),
            TILE,
            &[vec![s, s, s, s, s, s], vec![n, n, n, w, w, n]],
        )
        .expect("valid grid")
    }

    fn create_world() -> (CollisionSystem, Arc<MessageBus>) {
        let bus = Arc::new(MessageBus::new());
        let config = CollisionConfig::default().with_cell_size(TILE).with_skin_width(SKIN);
        let mut system = CollisionSystem::with_config(config, Arc::clone(&bus));
        system.initialize_levels(&[pool_level()]);
        (system, bus)
    }

    fn record<T: Message + Clone>(bus: &MessageBus) -> Arc<Mutex<Vec<T>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.register_handler::<T, _>(move |message| {
            sink.lock().expect("sink").push(message.clone());
            Ok(())
        });
        seen
    }

    fn player() -> CollisionBody {
        CollisionBody::new(Shape::rect(8.0, 8.0).expect("box")).with_layers(CollisionLayers::PLAYER)
    }

    #[test]
    fn test_player_lands_then_wades_into_water() {
        let (mut system, bus) = create_world();
        let collisions = record::<CollisionMessage>(&bus);
        let enters = record::<TriggerEnterMessage>(&bus);
        let exits = record::<TriggerExitMessage>(&bus);

        let id = EntityId::new(1);
        system.register_entity(id, player(), Vec2::new(16.0, 40.0)).expect("register");

        // Fall onto the floor
        let landing = system
            .resolve_movement_detailed(id, Vec2::new(16.0, 40.0), Vec2::new(16.0, 0.0))
            .expect("resolve");
        assert!(landing.blocked_y);
        assert_relative_eq!(landing.position.y, 20.0 + SKIN, epsilon = 1e-4);

        let events = system.process_collisions();
        assert_eq!(events.collisions, 1);
        {
            let collisions = collisions.lock().expect("collisions");
            assert_eq!(collisions[0].entity_a, id);
            assert_eq!(collisions[0].entity_b, ColliderId::Tile(TileCoord::new(0, 0)));
            assert_eq!(collisions[0].contact_normal, Vec2::new(0.0, 1.0));
        }

        // Walk right into the pool; water never blocks
        let start = landing.position;
        let wade = system
            .resolve_movement_detailed(id, start, start + Vec2::new(48.0, 0.0))
            .expect("resolve");
        assert!(!wade.blocked_x);
        assert_relative_eq!(wade.position.x, 64.0);
        assert_eq!(
            wade.touched,
            vec![ColliderId::Tile(TileCoord::new(3, 1)), ColliderId::Tile(TileCoord::new(4, 1))]
        );

        let events = system.process_collisions();
        assert_eq!(events.trigger_enters, 2);
        assert_eq!(events.collisions, 0);

        // Standing still in the water is quiet
        assert_eq!(system.process_collisions().total(), 0);

        // Jump out
        let out = system
            .resolve_movement(id, wade.position, wade.position + Vec2::new(0.0, 40.0))
            .expect("resolve");
        assert_relative_eq!(out.y, 60.0 + SKIN, epsilon = 1e-4);
        assert_eq!(system.process_collisions().trigger_exits, 2);

        let enters = enters.lock().expect("enters");
        assert!(enters.iter().all(|m| m.entity_id == id && m.trigger_layers == CollisionLayers::WATER));
        assert_eq!(exits.lock().expect("exits").len(), 2);
    }

    #[test]
    fn test_walking_many_frames_never_sinks_into_floor() {
        let (mut system, _bus) = create_world();
        let id = EntityId::new(1);
        let mut position = Vec2::new(8.0, 20.0 + SKIN);
        system.register_entity(id, player(), position).expect("register");

        // Gravity pulls down every frame while the player walks right
        for _ in 0..60 {
            position = system
                .resolve_movement(id, position, position + Vec2::new(1.0, -2.0))
                .expect("resolve");
            system.process_collisions();
            assert!(position.y >= 20.0, "sank to {}", position.y);
        }
        assert_relative_eq!(position.x, 68.0, epsilon = 1e-3);
    }

    #[test]
    fn test_one_way_ledge_lets_player_jump_through_and_stand() {
        let bus = Arc::new(MessageBus::new());
        let mut system = CollisionSystem::new(Arc::clone(&bus));
        let ledge = LevelGeometry::from_grid(Vec2::new(0.0, 32.0), TILE, &[vec![CollisionLayers::PLATFORM; 3]])
            .expect("valid grid");
        system.initialize_levels(&[pool_level(), ledge]);
        assert_eq!(system.static_tile_count(), 11);

        let id = EntityId::new(1);
        let mut position = Vec2::new(24.0, 20.0 + SKIN);
        system.register_entity(id, player(), position).expect("register");

        // Jump straight through the ledge from below
        position = system
            .resolve_movement(id, position, position + Vec2::new(0.0, 40.0))
            .expect("resolve");
        assert_relative_eq!(position.y, 60.0 + SKIN, epsilon = 1e-4);

        // Fall back onto its top face
        position = system
            .resolve_movement(id, position, position - Vec2::new(0.0, 40.0))
            .expect("resolve");
        assert_relative_eq!(position.y, 52.0 + SKIN, epsilon = 1e-4);

        // Walking along it does not snag on tile seams
        position = system
            .resolve_movement(id, position, position + Vec2::new(16.0, 0.0))
            .expect("resolve");
        assert_relative_eq!(position.x, 40.0);
    }

    #[test]
    fn test_projectile_raycast_hits_nearest_wall_tile() {
        let (mut system, _bus) = create_world();
        let enemy = EntityId::new(2);
        let body = CollisionBody::new(Shape::circle(4.0).expect("circle")).with_layers(CollisionLayers::ENEMY);
        system.register_entity(enemy, body, Vec2::new(88.0, 30.0)).expect("register");

        let shot = system.raycast(
            Vec2::new(0.0, 30.0),
            Vec2::new(1.0, 0.0),
            f32::INFINITY,
            CollisionLayers::ENEMY | CollisionLayers::SOLID,
        );
        assert_eq!(shot.entity(), Some(enemy));
        assert_relative_eq!(shot.distance().expect("distance"), 84.0, epsilon = 1e-4);

        // Straight down lands on the floor, skipping the water it starts above
        let drop = system.raycast(Vec2::new(56.0, 40.0), Vec2::new(0.0, -1.0), 100.0, CollisionLayers::SOLID);
        assert_eq!(drop.tile(), Some(TileCoord::new(3, 0)));
        assert_relative_eq!(drop.distance().expect("distance"), 24.0);
        assert_eq!(drop.layers(), CollisionLayers::SOLID);
    }

    #[test]
    fn test_config_document_drives_the_world() {
        let config: EngineConfig = toml::from_str(
            r#"
            [collision]
            cell_size = 16.0
            skin_width = 0.0
            deferred_events = true
            "#,
        )
        .expect("valid toml");
        config.validate().expect("valid config");

        let bus = Arc::new(MessageBus::with_config(config.messaging.clone()));
        let mut system = CollisionSystem::with_config(config.collision.clone(), Arc::clone(&bus));
        system.initialize_levels(&[pool_level()]);
        let collisions = record::<CollisionMessage>(&bus);

        let id = EntityId::new(1);
        system.register_entity(id, player(), Vec2::new(8.0, 30.0)).expect("register");
        let landed = system
            .resolve_movement(id, Vec2::new(8.0, 30.0), Vec2::new(8.0, 0.0))
            .expect("resolve");
        assert_relative_eq!(landed.y, 20.0, epsilon = 1e-4);

        assert_eq!(system.process_collisions().collisions, 1);
        assert!(collisions.lock().expect("collisions").is_empty());
        assert_eq!(bus.process_queued_messages(), 1);
        assert_eq!(collisions.lock().expect("collisions").len(), 1);
    }
}
