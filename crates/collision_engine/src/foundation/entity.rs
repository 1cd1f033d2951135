//! Entity and collider identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    id: u32,
}

impl EntityId {
    /// Create an entity identifier from its raw value
    pub const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the raw entity ID
    pub const fn id(&self) -> u32 {
        self.id
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}

/// Integer coordinate of a static level tile.
///
/// The level index keeps tiles from separately loaded levels apart when
/// their grids share a column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Index of the level the tile was loaded from
    #[serde(default)]
    pub level: u32,
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl TileCoord {
    /// Create a tile coordinate in level 0
    pub const fn new(x: i32, y: i32) -> Self {
        Self { level: 0, x, y }
    }

    /// Same column and row in another level
    pub const fn in_level(self, level: u32) -> Self {
        Self { level, ..self }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.level == 0 {
            write!(f, "Tile({}, {})", self.x, self.y)
        } else {
            write!(f, "Tile({}, {} @ level {})", self.x, self.y, self.level)
        }
    }
}

/// Identity of anything the collision system can report: a registered
/// entity body or a static level tile, never both.
///
/// Ordering places entities before tiles; contact pairs rely on it to be
/// stored in a canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColliderId {
    /// A registered body
    Entity(EntityId),
    /// A static tile from level geometry
    Tile(TileCoord),
}

impl ColliderId {
    /// Entity id, if this is an entity
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Entity(id) => Some(*id),
            Self::Tile(_) => None,
        }
    }

    /// Tile coordinate, if this is a tile
    pub fn tile(&self) -> Option<TileCoord> {
        match self {
            Self::Entity(_) => None,
            Self::Tile(coord) => Some(*coord),
        }
    }
}

impl From<EntityId> for ColliderId {
    fn from(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

impl From<TileCoord> for ColliderId {
    fn from(coord: TileCoord) -> Self {
        Self::Tile(coord)
    }
}

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(id) => id.fmt(f),
            Self::Tile(coord) => coord.fmt(f),
        }
    }
}
