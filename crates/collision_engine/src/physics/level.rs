//! Static level geometry fed to the collision system at level load

use crate::foundation::entity::TileCoord;
use crate::foundation::math::{utils, Rect, Vec2};
use crate::physics::collision_layers::CollisionLayers;
use crate::physics::error::CollisionError;
use crate::physics::shape::Shape;

/// One static tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileCollider {
    coord: TileCoord,
    bounds: Rect,
    shape: Shape,
    layers: CollisionLayers,
    is_trigger: bool,
}

impl TileCollider {
    /// Tile covering `bounds` in world space
    ///
    /// Tiles on any of [`CollisionLayers::ALL_TRIGGERS`] are triggers unless
    /// overridden with [`TileCollider::with_trigger`].
    pub fn new(coord: TileCoord, bounds: Rect, layers: CollisionLayers) -> Result<Self, CollisionError> {
        if !bounds.is_valid() {
            return Err(CollisionError::InvalidShape(format!("tile {} has invalid bounds {:?}", coord, bounds)));
        }
        Ok(Self {
            coord,
            bounds,
            shape: Shape::rect_with_offset(bounds, Vec2::zeros())?,
            layers,
            is_trigger: layers.intersects(CollisionLayers::ALL_TRIGGERS),
        })
    }

    /// Override trigger behaviour
    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Tile coordinate
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Move the tile's coordinate into `level`
    pub(crate) fn in_level(mut self, level: u32) -> Self {
        self.coord = self.coord.in_level(level);
        self
    }

    /// World bounds
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Tile layers
    pub fn layers(&self) -> CollisionLayers {
        self.layers
    }

    /// Whether the tile only reports overlaps
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// World-space shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// A level's worth of static tiles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelGeometry {
    tiles: Vec<TileCollider>,
}

impl LevelGeometry {
    /// Empty level
    pub fn new() -> Self {
        Self::default()
    }

    /// Level from prebuilt tiles, kept in the given order
    pub fn from_tiles(tiles: impl IntoIterator<Item = TileCollider>) -> Self {
        Self {
            tiles: tiles.into_iter().collect(),
        }
    }

    /// Level from a grid of layer cells, row 0 at the bottom
    ///
    /// Cells equal to [`CollisionLayers::NONE`] are left empty. Tile `(x, y)`
    /// covers `origin + (x, y) * tile_size` to one `tile_size` beyond it.
    pub fn from_grid(origin: Vec2, tile_size: f32, rows: &[Vec<CollisionLayers>]) -> Result<Self, CollisionError> {
        if !(tile_size.is_finite() && tile_size > 0.0) || !utils::is_finite(origin) {
            return Err(CollisionError::InvalidShape(format!(
                "grid needs a finite origin and positive tile size, got {:?} and {}",
                origin, tile_size
            )));
        }

        let mut level = Self::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, layers) in row.iter().enumerate() {
                if layers.is_empty() {
                    continue;
                }
                let coord = TileCoord::new(x as i32, y as i32);
                let bounds = Rect::new(
                    origin.x + x as f32 * tile_size,
                    origin.y + y as f32 * tile_size,
                    tile_size,
                    tile_size,
                );
                level.push(TileCollider::new(coord, bounds, *layers)?);
            }
        }
        Ok(level)
    }

    /// Append a tile
    pub fn push(&mut self, tile: TileCollider) {
        self.tiles.push(tile);
    }

    /// Builder form of [`LevelGeometry::push`]
    pub fn with_tile(mut self, tile: TileCollider) -> Self {
        self.push(tile);
        self
    }

    /// Tiles in index order
    pub fn tiles(&self) -> &[TileCollider] {
        &self.tiles
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the level has no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
