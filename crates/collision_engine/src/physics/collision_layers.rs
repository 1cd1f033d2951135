//! Collision layer system for filtering collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8:
//! "Most games need to filter collisions... This is typically done via
//! collision layers or groups."
//!
//! Every body carries two masks: the layers it *is on* and the layers it
//! *collides with*. A pair interacts only when both sides opt in.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Collision layer definitions using bitflags for efficient filtering
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct CollisionLayers: u32 {
        /// Static, fully blocking level geometry
        const SOLID = 1 << 0;
        /// One-way platforms (block only when landed on from above)
        const PLATFORM = 1 << 1;
        /// Generic trigger volumes (no physical response)
        const TRIGGER = 1 << 2;
        /// Water volumes
        const WATER = 1 << 3;
        /// Damaging volumes (spikes, lava)
        const HAZARD = 1 << 4;
        /// Generic gameplay entities
        const ENTITY = 1 << 5;
        /// Projectiles (bullets, arrows, etc.)
        const PROJECTILE = 1 << 6;
        /// Ad-hoc query shapes
        const SHAPE = 1 << 7;
        /// Player character layer
        const PLAYER = 1 << 8;
        /// Enemy character layer
        const ENEMY = 1 << 9;
        /// Pickups and collectibles
        const PICKUP = 1 << 10;

        /// Everything that blocks movement
        const ALL_SOLID = Self::SOLID.bits() | Self::PLATFORM.bits();
        /// Every volume that only reports overlap
        const ALL_TRIGGERS = Self::TRIGGER.bits() | Self::WATER.bits() | Self::HAZARD.bits();
        /// All collision layers, including bits without a name
        const ALL = u32::MAX;
    }
}

impl CollisionLayers {
    /// No collision layer
    pub const NONE: Self = Self::empty();

    /// Check if two bodies should collide based on their layers and masks
    ///
    /// # Arguments
    /// * `layers_a` - Body A's layers (what it is)
    /// * `mask_a` - Body A's collision mask (what it collides with)
    /// * `layers_b` - Body B's layers
    /// * `mask_b` - Body B's collision mask
    ///
    /// # Example
    /// ```
    /// use collision_engine::physics::CollisionLayers;
    ///
    /// // Player collides with enemies and level geometry
    /// let player = CollisionLayers::PLAYER;
    /// let player_mask = CollisionLayers::ENEMY | CollisionLayers::SOLID;
    ///
    /// // Enemy collides with the player and projectiles
    /// let enemy = CollisionLayers::ENEMY;
    /// let enemy_mask = CollisionLayers::PLAYER | CollisionLayers::PROJECTILE;
    ///
    /// assert!(CollisionLayers::should_collide(player, player_mask, enemy, enemy_mask));
    /// ```
    pub fn should_collide(
        layers_a: CollisionLayers,
        mask_a: CollisionLayers,
        layers_b: CollisionLayers,
        mask_b: CollisionLayers,
    ) -> bool {
        // A's layer must be in B's mask AND B's layer must be in A's mask
        mask_a.intersects(layers_b) && mask_b.intersects(layers_a)
    }

    /// Whether a query mask selects anything on these layers
    #[inline]
    pub fn matches(self, mask: CollisionLayers) -> bool {
        self.intersects(mask)
    }

    /// Whether these layers describe a one-way platform rather than a wall
    #[inline]
    pub fn is_one_way_platform(self) -> bool {
        self.contains(Self::PLATFORM) && !self.contains(Self::SOLID)
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[CollisionLayers]) -> CollisionLayers {
        layers.iter().fold(Self::NONE, |acc, &layer| acc | layer)
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::NONE
    }
}
