//! Uniform spatial hash grid
//!
//! World space is cut into square cells of `cell_size`. Each key is stored
//! in every cell its bounds overlap. Very large bounds skip the cells and
//! live in an oversized list that every query scans.

use crate::foundation::math::{Rect, Vec2};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Entries spanning more cells than this are kept in the oversized list
const MAX_CELLS_PER_ENTRY: i64 = 1024;

type CellCoord = (i32, i32);

#[derive(Debug, Clone, Copy)]
struct CellRange {
    min: CellCoord,
    max: CellCoord,
}

impl CellRange {
    fn cell_count(&self) -> i64 {
        let w = i64::from(self.max.0) - i64::from(self.min.0) + 1;
        let h = i64::from(self.max.1) - i64::from(self.min.1) + 1;
        w * h
    }

    fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.min.0..=self.max.0).flat_map(move |x| (self.min.1..=self.max.1).map(move |y| (x, y)))
    }
}

#[derive(Debug, Clone)]
struct GridEntry {
    bounds: Rect,
    /// `None` when the entry is in the oversized list
    range: Option<CellRange>,
}

/// Spatial hash over axis-aligned bounds
#[derive(Debug, Clone)]
pub struct SpatialGrid<K> {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<K>>,
    entries: HashMap<K, GridEntry>,
    oversized: Vec<K>,
}

impl<K> SpatialGrid<K>
where
    K: Copy + Eq + Hash + Ord,
{
    /// Create an empty grid. Non-positive or non-finite cell sizes fall back to 1.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("Invalid grid cell size {}, using 1.0", cell_size);
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            entries: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    /// Cell edge length
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, point: Vec2) -> CellCoord {
        // `as` saturates, so huge coordinates clamp to the outermost cells
        (
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }

    fn range_of(&self, bounds: &Rect) -> CellRange {
        CellRange {
            min: self.cell_of(bounds.min()),
            max: self.cell_of(bounds.max()),
        }
    }

    /// Insert or move `key`
    pub fn insert(&mut self, key: K, bounds: Rect) {
        self.remove(key);

        let range = self.range_of(&bounds);
        let range = if range.cell_count() > MAX_CELLS_PER_ENTRY {
            self.oversized.push(key);
            None
        } else {
            for cell in range.cells() {
                self.cells.entry(cell).or_default().push(key);
            }
            Some(range)
        };

        self.entries.insert(key, GridEntry { bounds, range });
    }

    /// Remove `key`, returning whether it was present
    pub fn remove(&mut self, key: K) -> bool {
        let Some(entry) = self.entries.remove(&key) else {
            return false;
        };

        match entry.range {
            Some(range) => {
                for cell in range.cells() {
                    if let Some(bucket) = self.cells.get_mut(&cell) {
                        bucket.retain(|k| *k != key);
                        if bucket.is_empty() {
                            self.cells.remove(&cell);
                        }
                    }
                }
            }
            None => self.oversized.retain(|k| *k != key),
        }
        true
    }

    /// Stored bounds of `key`
    pub fn bounds(&self, key: K) -> Option<Rect> {
        self.entries.get(&key).map(|entry| entry.bounds)
    }

    /// Keys whose bounds intersect `area` (inclusive edges), sorted and unique
    pub fn query(&self, area: &Rect) -> Vec<K> {
        let range = self.range_of(area);
        let mut found: HashSet<K> = HashSet::new();

        if range.cell_count() > self.cells.len() as i64 {
            // Cheaper to walk the occupied cells than the requested ones
            for bucket in self.cells.values() {
                found.extend(bucket.iter().copied());
            }
        } else {
            for cell in range.cells() {
                if let Some(bucket) = self.cells.get(&cell) {
                    found.extend(bucket.iter().copied());
                }
            }
        }
        found.extend(self.oversized.iter().copied());

        let mut result: Vec<K> = found
            .into_iter()
            .filter(|key| self.entries.get(key).is_some_and(|entry| entry.bounds.intersects(area)))
            .collect();
        result.sort_unstable();
        result
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.oversized.clear();
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the grid holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(1u32, Rect::new(0.0, 0.0, 5.0, 5.0));
        grid.insert(2u32, Rect::new(25.0, 25.0, 5.0, 5.0));
        grid.insert(3u32, Rect::new(-15.0, -15.0, 30.0, 30.0));

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.query(&Rect::new(1.0, 1.0, 1.0, 1.0)), vec![1, 3]);
        assert_eq!(grid.query(&Rect::new(24.0, 24.0, 2.0, 2.0)), vec![2]);
        assert!(grid.query(&Rect::new(100.0, 100.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_touching_bounds_are_found() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(7u32, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(grid.query(&Rect::new(10.0, 0.0, 5.0, 5.0)), vec![7]);
    }

    #[test]
    fn test_move_and_remove() {
        let mut grid = SpatialGrid::new(4.0);
        grid.insert(1u32, Rect::new(0.0, 0.0, 1.0, 1.0));
        grid.insert(1u32, Rect::new(50.0, 50.0, 1.0, 1.0));

        assert_eq!(grid.len(), 1);
        assert!(grid.query(&Rect::new(0.0, 0.0, 1.0, 1.0)).is_empty());
        assert_eq!(grid.query(&Rect::new(49.0, 49.0, 2.0, 2.0)), vec![1]);

        assert!(grid.remove(1));
        assert!(!grid.remove(1));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_huge_entries_and_queries() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(1u32, Rect::new(-1.0e6, -1.0e6, 2.0e6, 2.0e6));
        grid.insert(2u32, Rect::new(3.0, 3.0, 1.0, 1.0));

        assert_eq!(grid.query(&Rect::new(3.5, 3.5, 0.1, 0.1)), vec![1, 2]);
        assert_eq!(grid.query(&Rect::new(-1.0e7, -1.0e7, 2.0e7, 2.0e7)), vec![1, 2]);

        assert!(grid.remove(1));
        assert_eq!(grid.query(&Rect::new(-5.0, -5.0, 1.0, 1.0)), Vec::<u32>::new());
    }

    #[test]
    fn test_invalid_cell_size_falls_back() {
        let grid: SpatialGrid<u32> = SpatialGrid::new(0.0);
        assert_eq!(grid.cell_size(), 1.0);
    }
}
