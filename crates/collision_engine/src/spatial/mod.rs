//! Spatial partitioning data structures
//!
//! Provides spatial indexing for broad-phase collision detection,
//! ray casting, and proximity queries in 2D space.

mod grid;
pub mod spatial_query;

pub use grid::SpatialGrid;
pub use spatial_query::SpatialQuery;
