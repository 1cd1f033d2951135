//! Headless arena demo
//!
//! Builds a walled tile arena with a water pool, a hazard strip and a
//! one-way ledge, then lets a handful of randomly moving bodies bounce
//! around it while collision and trigger traffic is logged.
//!
//! Usage: `arena_demo [config.toml|config.ron] [frames]`

use collision_engine::core::config::{Config, ConfigError, EngineConfig};
use collision_engine::foundation::entity::EntityId;
use collision_engine::foundation::logging;
use collision_engine::foundation::math::Vec2;
use collision_engine::messaging::{
    CollisionMessage, DamageMessage, MessageBus, MessageOptions, TriggerEnterMessage, TriggerExitMessage,
};
use collision_engine::physics::{CollisionBody, CollisionError, CollisionLayers, CollisionSystem, LevelGeometry, Shape};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

// Arena configuration
const ARENA_COLUMNS: usize = 24;
const ARENA_ROWS: usize = 14;
const TILE_SIZE: f32 = 16.0;
const NUM_MOVERS: u32 = 8;
const MOVER_SIZE: f32 = 10.0;
const MAX_SPEED: f32 = 120.0;
const FRAME_TIME: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: usize = 600;
const HAZARD_DAMAGE: f32 = 10.0;
const RNG_SEED: u64 = 0x00C0_FFEE;

#[derive(Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Collision error: {0}")]
    Collision(#[from] CollisionError),

    #[error("Invalid frame count: {0}")]
    Frames(String),
}

/// Message traffic seen during the run
#[derive(Default)]
struct Tally {
    collisions: AtomicUsize,
    enters: AtomicUsize,
    exits: AtomicUsize,
    damage: AtomicUsize,
}

struct Mover {
    id: EntityId,
    position: Vec2,
    velocity: Vec2,
}

/// Walls around the edge, a water pool on the floor, a hazard strip on
/// the right and a one-way ledge across the middle
fn build_arena() -> Result<LevelGeometry, CollisionError> {
    let mut rows = vec![vec![CollisionLayers::NONE; ARENA_COLUMNS]; ARENA_ROWS];
    for (y, row) in rows.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            let border = x == 0 || y == 0 || x == ARENA_COLUMNS - 1 || y == ARENA_ROWS - 1;
            *cell = if border {
                CollisionLayers::SOLID
            } else if y == 1 && (8..14).contains(&x) {
                CollisionLayers::WATER
            } else if x == ARENA_COLUMNS - 2 && (2..6).contains(&y) {
                CollisionLayers::HAZARD
            } else if y == ARENA_ROWS / 2 && (4..10).contains(&x) {
                CollisionLayers::PLATFORM
            } else {
                CollisionLayers::NONE
            };
        }
    }
    LevelGeometry::from_grid(Vec2::zeros(), TILE_SIZE, &rows)
}

fn spawn_movers(collision: &mut CollisionSystem, rng: &mut StdRng) -> Result<Vec<Mover>, CollisionError> {
    let inner_min = TILE_SIZE * 2.0;
    let inner_max_x = TILE_SIZE * (ARENA_COLUMNS as f32 - 2.0);
    let inner_max_y = TILE_SIZE * (ARENA_ROWS as f32 / 2.0 - 1.0);

    let mut movers = Vec::new();
    for index in 0..NUM_MOVERS {
        let id = EntityId::new(index + 1);
        let position = Vec2::new(rng.gen_range(inner_min..inner_max_x), rng.gen_range(inner_min..inner_max_y));
        let velocity = Vec2::new(rng.gen_range(-MAX_SPEED..MAX_SPEED), rng.gen_range(-MAX_SPEED..MAX_SPEED));

        // Every other mover is round
        let shape = if index % 2 == 0 {
            Shape::rect(MOVER_SIZE, MOVER_SIZE)?
        } else {
            Shape::circle(MOVER_SIZE * 0.5)?
        };
        let body = CollisionBody::new(shape)
            .with_layers(CollisionLayers::ENTITY)
            .with_velocity(velocity);
        collision.register_entity(id, body, position)?;

        movers.push(Mover { id, position, velocity });
    }
    Ok(movers)
}

fn register_handlers(bus: &Arc<MessageBus>, tally: &Arc<Tally>) {
    let counter = Arc::clone(tally);
    bus.register_handler::<CollisionMessage, _>(move |message| {
        counter.collisions.fetch_add(1, Ordering::Relaxed);
        log::debug!("{} hit {} at {:?}", message.entity_a, message.entity_b, message.contact_point);
        Ok(())
    });

    // Hazards hurt on entry
    let counter = Arc::clone(tally);
    let weak_bus = Arc::downgrade(bus);
    bus.register_handler::<TriggerEnterMessage, _>(move |message| {
        counter.enters.fetch_add(1, Ordering::Relaxed);
        log::info!("{} entered {} ({:?})", message.entity_id, message.trigger_id, message.trigger_layers);
        if message.trigger_layers.contains(CollisionLayers::HAZARD) {
            if let Some(bus) = weak_bus.upgrade() {
                let damage = DamageMessage {
                    amount: HAZARD_DAMAGE,
                    source: None,
                    position: Vec2::zeros(),
                };
                bus.send_message(damage, MessageOptions::global().deferred(), None)?;
            }
        }
        Ok(())
    });

    let counter = Arc::clone(tally);
    bus.register_handler::<TriggerExitMessage, _>(move |message| {
        counter.exits.fetch_add(1, Ordering::Relaxed);
        log::info!("{} left {}", message.entity_id, message.trigger_id);
        Ok(())
    });

    let counter = Arc::clone(tally);
    bus.register_handler::<DamageMessage, _>(move |message| {
        counter.damage.fetch_add(1, Ordering::Relaxed);
        log::warn!("Hazard dealt {} damage", message.amount);
        Ok(())
    });
}

fn run(config: EngineConfig, frames: usize) -> Result<(), DemoError> {
    config.validate()?;

    let bus = Arc::new(MessageBus::with_config(config.messaging.clone()));
    let mut collision = CollisionSystem::with_config(config.collision.clone(), Arc::clone(&bus));
    let tally = Arc::new(Tally::default());
    register_handlers(&bus, &tally);

    let arena = build_arena()?;
    log::info!("Arena built with {} tiles", arena.len());
    collision.initialize_levels(&[arena]);

    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let mut movers = spawn_movers(&mut collision, &mut rng)?;

    for frame in 0..frames {
        for mover in &mut movers {
            let desired = mover.position + mover.velocity * FRAME_TIME;
            let resolution = collision.resolve_movement_detailed(mover.id, mover.position, desired)?;
            if resolution.blocked_x {
                mover.velocity.x = -mover.velocity.x;
            }
            if resolution.blocked_y {
                mover.velocity.y = -mover.velocity.y;
            }
            mover.position = resolution.position;
        }

        let events = collision.process_collisions();
        let drained = bus.process_queued_messages();
        if events.total() > 0 || drained > 0 {
            log::trace!("Frame {}: {} events, {} queued messages drained", frame, events.total(), drained);
        }
    }

    log::info!(
        "Simulated {} frames: {} collisions, {} trigger enters, {} trigger exits, {} hazard hits",
        frames,
        tally.collisions.load(Ordering::Relaxed),
        tally.enters.load(Ordering::Relaxed),
        tally.exits.load(Ordering::Relaxed),
        tally.damage.load(Ordering::Relaxed)
    );
    for mover in &movers {
        log::info!("{} finished at ({:.1}, {:.1})", mover.id, mover.position.x, mover.position.y);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            EngineConfig::load_or_default(&path).map_err(DemoError::from)?
        }
        None => EngineConfig::default(),
    };
    let frames = match args.next() {
        Some(text) => text.parse::<usize>().map_err(|_| DemoError::Frames(text))?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Starting arena demo");
    match run(config, frames) {
        Ok(()) => {
            log::info!("Arena demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Arena demo failed: {}", e);
            Err(e.into())
        }
    }
}
