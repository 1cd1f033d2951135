//! Core collision system
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! Discrete and kinematic: bodies are placed by the caller or by
//! [`CollisionSystem::resolve_movement`], never integrated from forces.
//! Once per frame [`CollisionSystem::process_collisions`] diffs the frame's
//! contacts against the previous frame and reports the changes on the
//! message bus.

use crate::core::config::{CollisionConfig, CollisionEventScope};
use crate::foundation::entity::{ColliderId, EntityId};
use crate::foundation::math::{utils, Rect, Vec2};
use crate::messaging::{
    CollisionMessage, Message, MessageBus, MessageOptions, TriggerEnterMessage, TriggerExitMessage,
};
use crate::physics::body::CollisionBody;
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::collision_result::CollisionTestResult;
use crate::physics::contacts::{ContactRecord, ContactSet, Participant};
use crate::physics::error::CollisionError;
use crate::physics::level::{LevelGeometry, TileCollider};
use crate::physics::shape::{QueryShape, Shape};
use crate::physics::sweep::{self, SweepHit, CONTACT_TOLERANCE};
use crate::spatial::{SpatialGrid, SpatialQuery};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of [`CollisionSystem::resolve_movement_detailed`]
#[derive(Debug, Clone, PartialEq)]
pub struct MovementResolution {
    /// Final non-penetrating position
    pub position: Vec2,
    /// Horizontal motion was cut short
    pub blocked_x: bool,
    /// Vertical motion was cut short
    pub blocked_y: bool,
    /// Colliders hit or passed through, in the order they were met
    pub touched: Vec<ColliderId>,
}

/// Messages emitted by one [`CollisionSystem::process_collisions`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionEvents {
    /// Trigger enter events
    pub trigger_enters: usize,
    /// Trigger exit events
    pub trigger_exits: usize,
    /// Solid contacts that began
    pub collisions: usize,
}

impl CollisionEvents {
    /// Total number of events
    pub fn total(&self) -> usize {
        self.trigger_enters + self.trigger_exits + self.collisions
    }
}

#[derive(Debug, Clone)]
struct BodyEntry {
    body: CollisionBody,
    /// Registration order, used for deterministic tie-breaks
    order: u64,
}

/// A broad-phase result placed in world space
#[derive(Debug, Clone)]
struct Candidate {
    id: ColliderId,
    /// Tiles sort before bodies, then index or registration order
    rank: (u8, u64),
    shape: Shape,
    layers: CollisionLayers,
    collides_with: CollisionLayers,
    is_trigger: bool,
}

impl Candidate {
    fn participant(&self) -> Participant {
        Participant {
            id: self.id,
            layers: self.layers,
            is_trigger: self.is_trigger,
        }
    }

    fn accepts(&self, body: &CollisionBody) -> bool {
        CollisionLayers::should_collide(body.layers(), body.collides_with(), self.layers, self.collides_with)
    }
}

/// How a contact is reported
enum Pairing {
    Trigger { trigger: Participant, entity: EntityId },
    Contact { entity: EntityId, other: ColliderId },
    Ignored,
}

impl Pairing {
    fn of(record: &ContactRecord) -> Self {
        let (a, b) = (record.a, record.b);
        if a.is_trigger || b.is_trigger {
            if let (true, ColliderId::Entity(entity)) = (a.is_trigger, b.id) {
                return Self::Trigger { trigger: a, entity };
            }
            if let (true, ColliderId::Entity(entity)) = (b.is_trigger, a.id) {
                return Self::Trigger { trigger: b, entity };
            }
            return Self::Ignored;
        }
        match a.id {
            ColliderId::Entity(entity) => Self::Contact { entity, other: b.id },
            ColliderId::Tile(_) => Self::Ignored,
        }
    }
}

/// Collision world: dynamic bodies, static tiles and frame-to-frame contacts
///
/// Owns its registries; the message bus is shared and passed in at
/// construction.
pub struct CollisionSystem {
    config: CollisionConfig,
    bus: Arc<MessageBus>,

    /// Registered bodies
    bodies: HashMap<EntityId, BodyEntry>,
    next_order: u64,

    /// Broad phase over registered bodies
    spatial_query: Box<dyn SpatialQuery>,

    /// Static tiles in index order, plus their broad phase
    tiles: Vec<TileCollider>,
    tile_grid: SpatialGrid<usize>,

    /// Contacts found by sweeps since the last `process_collisions`
    swept_contacts: ContactSet,
    /// Contacts reported by the last `process_collisions`
    previous_contacts: ContactSet,
}

impl CollisionSystem {
    /// Collision system with default settings
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self::with_config(CollisionConfig::default(), bus)
    }

    /// Collision system using a spatial hash sized from `config`
    pub fn with_config(config: CollisionConfig, bus: Arc<MessageBus>) -> Self {
        let spatial_query = Box::new(SpatialGrid::<EntityId>::new(config.cell_size));
        Self::with_spatial_query(config, bus, spatial_query)
    }

    /// Collision system with a custom broad phase for bodies
    pub fn with_spatial_query(config: CollisionConfig, bus: Arc<MessageBus>, spatial_query: Box<dyn SpatialQuery>) -> Self {
        if let Err(err) = config.validate() {
            log::warn!("Collision config out of range, continuing with clamped values: {}", err);
        }
        Self {
            tile_grid: SpatialGrid::new(config.cell_size),
            config,
            bus,
            bodies: HashMap::new(),
            next_order: 0,
            spatial_query,
            tiles: Vec::new(),
            swept_contacts: ContactSet::new(),
            previous_contacts: ContactSet::new(),
        }
    }

    /// Settings in use
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Bus collision events are sent on
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Replace all static geometry
    ///
    /// Tiles are indexed in the order given. Contacts with the old tiles are
    /// dropped without exit events.
    pub fn initialize_levels(&mut self, levels: &[LevelGeometry]) {
        self.tiles.clear();
        self.tile_grid.clear();
        let is_entity_pair = |record: &ContactRecord| {
            matches!(record.a.id, ColliderId::Entity(_)) && matches!(record.b.id, ColliderId::Entity(_))
        };
        self.previous_contacts.retain(is_entity_pair);
        self.swept_contacts.retain(is_entity_pair);

        for (index, level) in levels.iter().enumerate() {
            let level_index = u32::try_from(index).unwrap_or(u32::MAX);
            for tile in level.tiles() {
                self.tile_grid.insert(self.tiles.len(), tile.bounds());
                self.tiles.push(tile.clone().in_level(level_index));
            }
        }

        if self.tiles.is_empty() {
            log::info!("No static geometry loaded");
        } else {
            log::debug!("Loaded {} static tiles from {} levels", self.tiles.len(), levels.len());
        }
    }

    /// Register `body` at `position`; an existing body with the same id is replaced
    pub fn register_entity(&mut self, id: EntityId, body: CollisionBody, position: Vec2) -> Result<(), CollisionError> {
        if !utils::is_finite(position) {
            return Err(CollisionError::InvalidQuery(format!("{} registered at non-finite {:?}", id, position)));
        }

        let mut body = body;
        body.set_position(position);
        let bounds = body.world_bounds();

        let order = self.next_order;
        self.next_order += 1;

        if self.bodies.insert(id, BodyEntry { body, order }).is_some() {
            log::debug!("Replaced collision body for {}", id);
            self.spatial_query.update(id, bounds);
        } else {
            self.spatial_query.insert(id, bounds);
        }
        Ok(())
    }

    /// Remove a body, returning it
    pub fn unregister_entity(&mut self, id: EntityId) -> Option<CollisionBody> {
        match self.bodies.remove(&id) {
            Some(entry) => {
                self.spatial_query.remove(id);
                Some(entry.body)
            }
            None => {
                log::warn!("Cannot unregister {}: not registered", id);
                None
            }
        }
    }

    /// Teleport a body without collision resolution
    ///
    /// Unknown ids are logged and reported as the recoverable
    /// [`CollisionError::EntityNotFound`]. Static bodies keep their place.
    pub fn update_entity_position(&mut self, id: EntityId, position: Vec2) -> Result<(), CollisionError> {
        if !utils::is_finite(position) {
            return Err(CollisionError::InvalidQuery(format!("{} moved to non-finite {:?}", id, position)));
        }
        let Some(entry) = self.bodies.get_mut(&id) else {
            log::warn!("Cannot update position of {}: not registered", id);
            return Err(CollisionError::EntityNotFound(id));
        };
        if entry.body.is_static() {
            log::warn!("Ignoring position update for static body {}", id);
            return Ok(());
        }

        entry.body.set_position(position);
        self.spatial_query.update(id, entry.body.world_bounds());
        Ok(())
    }

    /// Registered body for `id`
    pub fn body(&self, id: EntityId) -> Option<&CollisionBody> {
        self.bodies.get(&id).map(|entry| &entry.body)
    }

    /// Whether a body is registered under `id`
    pub fn has_entity(&self, id: EntityId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// Number of registered bodies
    pub fn entity_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of static tiles
    pub fn static_tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Contacts reported by the last [`CollisionSystem::process_collisions`]
    pub fn active_contacts(&self) -> impl Iterator<Item = &ContactRecord> {
        self.previous_contacts.iter()
    }

    /// Broad phase: tiles in index order, then bodies in registration order
    fn candidates(&self, area: &Rect, exclude: Option<EntityId>) -> Vec<Candidate> {
        let mut found: Vec<Candidate> = self
            .tile_grid
            .query(area)
            .into_iter()
            .filter_map(|index| {
                let tile = self.tiles.get(index)?;
                Some(Candidate {
                    id: ColliderId::Tile(tile.coord()),
                    rank: (0, index as u64),
                    shape: tile.shape().clone(),
                    layers: tile.layers(),
                    collides_with: CollisionLayers::ALL,
                    is_trigger: tile.is_trigger(),
                })
            })
            .collect();

        let mut bodies: Vec<Candidate> = self
            .spatial_query
            .query_aabb(area)
            .into_iter()
            .filter(|id| Some(*id) != exclude)
            .filter_map(|id| {
                let entry = self.bodies.get(&id)?;
                Some(Candidate {
                    id: ColliderId::Entity(id),
                    rank: (1, entry.order),
                    shape: entry.body.world_shape(),
                    layers: entry.body.layers(),
                    collides_with: entry.body.collides_with(),
                    is_trigger: entry.body.is_trigger(),
                })
            })
            .collect();
        bodies.sort_by_key(|candidate| candidate.rank);

        found.extend(bodies);
        found
    }

    /// Nearest hit along `start -> end` whose layers intersect `mask`
    pub fn linecast(&self, start: Vec2, end: Vec2, mask: CollisionLayers) -> CollisionTestResult {
        self.cast(start, end, mask, None)
    }

    /// [`CollisionSystem::linecast`] ignoring one entity, usually the caster
    pub fn linecast_excluding(&self, start: Vec2, end: Vec2, mask: CollisionLayers, exclude: EntityId) -> CollisionTestResult {
        self.cast(start, end, mask, Some(exclude))
    }

    /// Nearest hit along a ray of at most `max_distance`
    ///
    /// `direction` is normalized; a zero direction or negative distance hits
    /// nothing. An infinite distance reaches the edge of the populated world.
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: CollisionLayers) -> CollisionTestResult {
        let Some(direction) = utils::try_normalize(direction) else {
            log::debug!("Raycast with zero direction from {:?}", origin);
            return CollisionTestResult::no_hit();
        };
        if max_distance.is_nan() || max_distance < 0.0 {
            log::debug!("Raycast with invalid distance {}", max_distance);
            return CollisionTestResult::no_hit();
        }

        let reach = if max_distance.is_finite() {
            max_distance
        } else {
            self.horizon(origin)
        };
        self.cast(origin, origin + direction * reach, mask, None)
    }

    /// One raycast per origin/direction pair
    pub fn raycast_batch(
        &self,
        origins: &[Vec2],
        directions: &[Vec2],
        max_distance: f32,
        mask: CollisionLayers,
    ) -> Result<Vec<CollisionTestResult>, CollisionError> {
        if origins.len() != directions.len() {
            return Err(CollisionError::MismatchedLengths {
                left: origins.len(),
                right: directions.len(),
            });
        }
        Ok(origins
            .iter()
            .zip(directions)
            .map(|(origin, direction)| self.raycast(*origin, *direction, max_distance, mask))
            .collect())
    }

    fn cast(&self, start: Vec2, end: Vec2, mask: CollisionLayers, exclude: Option<EntityId>) -> CollisionTestResult {
        if !utils::is_finite(start) || !utils::is_finite(end) {
            log::warn!("Ignoring cast with non-finite endpoints {:?} -> {:?}", start, end);
            return CollisionTestResult::no_hit();
        }

        let length = (end - start).norm();
        let mut best: Option<(f32, CollisionTestResult)> = None;
        for candidate in self.candidates(&Rect::from_corners(start, end), exclude) {
            if !candidate.layers.matches(mask) {
                continue;
            }
            let Some(hit) = candidate.shape.cast_segment(start, end) else {
                continue;
            };
            let distance = hit.fraction * length;
            // Strict: candidates arrive in tie-break order
            if best.as_ref().map_or(true, |(nearest, _)| distance < *nearest) {
                let result = CollisionTestResult::hit(candidate.id, hit.point, hit.normal, distance, candidate.layers);
                best = Some((distance, result));
            }
        }

        best.map_or_else(CollisionTestResult::no_hit, |(_, result)| result)
    }

    /// Distance from `origin` past the farthest corner of everything registered
    fn horizon(&self, origin: Vec2) -> f32 {
        let world = self
            .tiles
            .iter()
            .map(TileCollider::bounds)
            .chain(self.bodies.values().map(|entry| entry.body.world_bounds()))
            .reduce(|acc, bounds| acc.union(&bounds));

        world.map_or(0.0, |bounds| {
            let far = Vec2::new(
                (bounds.min().x - origin.x).abs().max((bounds.max().x - origin.x).abs()),
                (bounds.min().y - origin.y).abs().max((bounds.max().y - origin.y).abs()),
            );
            far.norm() + 1.0
        })
    }

    /// Every collider overlapping a box or circle query
    ///
    /// For [`QueryShape::Circle`] the diameter is `size.x`. Results come
    /// lazily in tile index order, then body registration order. Each hit's
    /// point is the closest point on the struck shape, its distance is
    /// measured from `position` and its normal points toward `position`.
    pub fn overlap_area(
        &self,
        shape: QueryShape,
        size: Vec2,
        position: Vec2,
        mask: CollisionLayers,
    ) -> Result<impl Iterator<Item = CollisionTestResult>, CollisionError> {
        let query = shape.build(size, position)?;
        let candidates = self.candidates(&query.final_bounds(), None);

        Ok(candidates
            .into_iter()
            .filter(move |candidate| candidate.layers.matches(mask))
            .filter_map(move |candidate| overlap_result(&query, position, &candidate)))
    }

    /// Move a body toward `desired`, stopping at blocking colliders
    ///
    /// See [`CollisionSystem::resolve_movement_detailed`].
    pub fn resolve_movement(&mut self, id: EntityId, current: Vec2, desired: Vec2) -> Result<Vec2, CollisionError> {
        self.resolve_movement_detailed(id, current, desired)
            .map(|resolution| resolution.position)
    }

    /// Swept per-axis movement, X first then Y
    ///
    /// Each axis sweeps the body against the colliders it may interact with:
    /// - non-trigger colliders block, and the body stops `skin_width` short,
    /// - one-way platforms block only downward motion onto their top face,
    /// - triggers (or a trigger body) never block but are recorded,
    /// - colliders the body starts inside do not block.
    ///
    /// The body ends at the returned position with its velocity set to the
    /// displacement.
    pub fn resolve_movement_detailed(
        &mut self,
        id: EntityId,
        current: Vec2,
        desired: Vec2,
    ) -> Result<MovementResolution, CollisionError> {
        if !utils::is_finite(current) || !utils::is_finite(desired) {
            return Err(CollisionError::InvalidQuery(format!(
                "movement of {} between non-finite points {:?} -> {:?}",
                id, current, desired
            )));
        }
        let Some(entry) = self.bodies.get(&id) else {
            log::warn!("Cannot resolve movement of {}: not registered", id);
            return Err(CollisionError::EntityNotFound(id));
        };
        let body = entry.body.clone();
        if body.is_static() {
            log::warn!("Ignoring movement request for static body {}", id);
            return Ok(MovementResolution {
                position: body.position(),
                blocked_x: false,
                blocked_y: false,
                touched: Vec::new(),
            });
        }

        let mover = Participant {
            id: ColliderId::Entity(id),
            layers: body.layers(),
            is_trigger: body.is_trigger(),
        };
        let skin = self.config.skin_width.max(0.0);
        let delta = desired - current;
        let mut resolution = MovementResolution {
            position: current,
            blocked_x: false,
            blocked_y: false,
            touched: Vec::new(),
        };

        for axis in 0..2 {
            let d = delta[axis];
            if d == 0.0 {
                continue;
            }
            let mut step = Vec2::zeros();
            step[axis] = d;

            let moving = body.shape().translated(resolution.position);
            let start_bounds = moving.final_bounds();
            let swept_area = start_bounds.union(&start_bounds.translated(step));

            let mut blocker: Option<(SweepHit, Candidate)> = None;
            let mut passable: Vec<Candidate> = Vec::new();
            for candidate in self.candidates(&swept_area, Some(id)) {
                if !candidate.accepts(&body) {
                    continue;
                }
                if candidate.is_trigger || body.is_trigger() {
                    passable.push(candidate);
                    continue;
                }
                // A body partway through a one-way platform passes it in either direction
                if candidate.layers.is_one_way_platform()
                    && moving
                        .contact(&candidate.shape)
                        .is_some_and(|contact| contact.depth > CONTACT_TOLERANCE)
                {
                    continue;
                }
                let Some(hit) = sweep::sweep(&moving, step, &candidate.shape) else {
                    continue;
                };
                if candidate.layers.is_one_way_platform() && !(axis == 1 && d < 0.0 && hit.normal.y > 0.0) {
                    continue;
                }
                if blocker.as_ref().map_or(true, |(nearest, _)| hit.fraction < nearest.fraction) {
                    blocker = Some((hit, candidate));
                }
            }

            let travel = match &blocker {
                Some((hit, _)) => (hit.fraction * d.abs() - skin).max(0.0),
                None => d.abs(),
            };
            let mut moved = Vec2::zeros();
            moved[axis] = travel * d.signum();
            resolution.position += moved;

            if let Some((hit, candidate)) = blocker {
                if axis == 0 {
                    resolution.blocked_x = true;
                } else {
                    resolution.blocked_y = true;
                }
                let center = body.shape().translated(resolution.position).final_bounds().center();
                let point = candidate.shape.closest_point(center);
                self.swept_contacts
                    .insert(ContactRecord::new(mover, candidate.participant(), point, hit.normal, 0.0));
                push_unique(&mut resolution.touched, candidate.id);
            }

            // Triggers the body actually reached while moving
            if moved == Vec2::zeros() {
                continue;
            }
            for candidate in passable {
                let Some(hit) = sweep::sweep(&moving, moved, &candidate.shape) else {
                    continue;
                };
                let center = start_bounds.center() + moved * hit.fraction;
                let point = candidate.shape.closest_point(center);
                self.swept_contacts
                    .insert(ContactRecord::new(mover, candidate.participant(), point, hit.normal, 0.0));
                push_unique(&mut resolution.touched, candidate.id);
            }
        }

        if let Some(entry) = self.bodies.get_mut(&id) {
            entry.body.set_position(resolution.position);
            entry.body.set_velocity(resolution.position - current);
            self.spatial_query.update(id, entry.body.world_bounds());
        }

        log::trace!(
            "{} moved {:?} -> {:?} (blocked x: {}, y: {})",
            id,
            current,
            resolution.position,
            resolution.blocked_x,
            resolution.blocked_y
        );
        Ok(resolution)
    }

    /// Diff this frame's contacts against the last frame and send events
    ///
    /// Contacts are the end-of-frame overlaps of every non-static body plus
    /// whatever sweeps recorded since the last call. A contact that persists
    /// produces one enter event when it begins and, for triggers, one exit
    /// event when it ends.
    pub fn process_collisions(&mut self) -> CollisionEvents {
        let mut current = self.overlaps();
        current.absorb(&mut self.swept_contacts);

        let diff = current.diff(&self.previous_contacts);
        let mut events = CollisionEvents::default();

        for record in &diff.entered {
            match Pairing::of(record) {
                Pairing::Trigger { trigger, entity } => {
                    let message = TriggerEnterMessage {
                        trigger_id: trigger.id,
                        entity_id: entity,
                        trigger_layers: trigger.layers,
                    };
                    self.emit(message, entity, trigger.id.entity());
                    events.trigger_enters += 1;
                }
                Pairing::Contact { entity, other } => {
                    let message = CollisionMessage {
                        entity_a: entity,
                        entity_b: other,
                        contact_point: record.point,
                        contact_normal: record.normal,
                        penetration_depth: record.depth,
                    };
                    self.emit(message, entity, other.entity());
                    events.collisions += 1;
                }
                Pairing::Ignored => {}
            }
        }

        for record in &diff.exited {
            if let Pairing::Trigger { trigger, entity } = Pairing::of(record) {
                let message = TriggerExitMessage {
                    trigger_id: trigger.id,
                    entity_id: entity,
                    trigger_layers: trigger.layers,
                };
                self.emit(message, entity, trigger.id.entity());
                events.trigger_exits += 1;
            }
        }

        self.previous_contacts = current;

        if events.total() > 0 {
            log::debug!(
                "Collision events: {} enters, {} exits, {} contacts",
                events.trigger_enters,
                events.trigger_exits,
                events.collisions
            );
        }
        events
    }

    /// End-of-frame overlaps of every non-static body
    fn overlaps(&self) -> ContactSet {
        let mut ordered: Vec<(&EntityId, &BodyEntry)> = self.bodies.iter().collect();
        ordered.sort_by_key(|(_, entry)| entry.order);

        let mut contacts = ContactSet::new();
        for (id, entry) in ordered {
            if entry.body.is_static() {
                continue;
            }
            let shape = entry.body.world_shape();
            let me = Participant {
                id: ColliderId::Entity(*id),
                layers: entry.body.layers(),
                is_trigger: entry.body.is_trigger(),
            };

            for candidate in self.candidates(&shape.final_bounds(), Some(*id)) {
                if !candidate.accepts(&entry.body) {
                    continue;
                }
                // Platforms report contact only through landing sweeps
                let solid_pair = !candidate.is_trigger && !entry.body.is_trigger();
                if solid_pair && candidate.layers.is_one_way_platform() {
                    continue;
                }
                if let Some(contact) = shape.contact(&candidate.shape) {
                    contacts.insert(ContactRecord::new(
                        me,
                        candidate.participant(),
                        contact.point,
                        contact.normal,
                        contact.depth,
                    ));
                }
            }
        }
        contacts
    }

    /// Send one event according to the configured scope
    fn emit<T: Message + Clone>(&self, message: T, entity: EntityId, other: Option<EntityId>) {
        match self.config.event_scope {
            CollisionEventScope::Global => self.send(message, MessageOptions::global(), entity),
            CollisionEventScope::Entity => {
                if let Some(other) = other {
                    self.send(message.clone(), MessageOptions::entity(other), entity);
                }
                self.send(message, MessageOptions::entity(entity), entity);
            }
        }
    }

    fn send<T: Message>(&self, message: T, options: MessageOptions, sender: EntityId) {
        let options = if self.config.deferred_events {
            options.deferred()
        } else {
            options
        };
        if let Err(err) = self.bus.send_message(message, options, Some(sender)) {
            log::error!("Failed to send collision event: {}", err);
        }
    }

    /// Drop every body, tile and contact
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.spatial_query.clear();
        self.tiles.clear();
        self.tile_grid.clear();
        self.swept_contacts.clear();
        self.previous_contacts.clear();
        self.next_order = 0;
        log::debug!("Collision system cleared");
    }
}

impl std::fmt::Debug for CollisionSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionSystem")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("tiles", &self.tiles.len())
            .field("contacts", &self.previous_contacts.len())
            .finish()
    }
}

fn push_unique(list: &mut Vec<ColliderId>, id: ColliderId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

fn overlap_result(query: &Shape, center: Vec2, candidate: &Candidate) -> Option<CollisionTestResult> {
    if !query.intersects(&candidate.shape) {
        return None;
    }
    let point = candidate.shape.closest_point(center);
    let offset = center - point;
    let normal = utils::try_normalize(offset)
        .or_else(|| query.contact(&candidate.shape).map(|contact| contact.normal))
        .unwrap_or_else(Vec2::zeros);

    Some(CollisionTestResult::hit(candidate.id, point, normal, offset.norm(), candidate.layers))
}
