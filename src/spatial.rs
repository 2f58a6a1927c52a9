//! Uniform-grid spatial index
//!
//! Divides the world into fixed-size cells and registers each entity in
//! every cell its bounding box overlaps, turning proximity queries into a
//! scan of a bounded neighborhood instead of the whole entity set.
//!
//! The grid is rebuilt on demand (see the optimizer's dirty flag), never
//! implicitly per frame. Queries operate at cell granularity: they return
//! the deduplicated union of entities registered in any overlapping cell.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::entity::{entity_bounds, EntityId, EntityView};

/// Default cell size in world units
///
/// Tuning knob: smaller cells cost memory, larger cells put more entities in
/// each query's scan set.
pub const DEFAULT_CELL_SIZE: f32 = 128.0;

/// Grid cell key - (x, y) cell coordinates
pub type CellKey = (i32, i32);

/// Cell keys for one entity; a 32x32 sprite on a 128-unit grid touches at
/// most 4 cells, so the key set lives inline
pub type CellKeySet = SmallVec<[CellKey; 4]>;

/// Uniform spatial hash grid over entity ids
pub struct SpatialGrid {
    /// Cell size in world units
    cell_size: f32,
    /// Inverse cell size for fast position-to-cell conversion
    inv_cell_size: f32,
    /// Map from cell key to entities registered in that cell
    cells: FxHashMap<CellKey, Vec<EntityId>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn coord_to_cell(&self, coord: f32) -> i32 {
        (coord * self.inv_cell_size).floor() as i32
    }

    /// Cell keys overlapped by an entity's bounding box
    ///
    /// Both the min and max extents are mapped with floor division and the
    /// range is inclusive, so an entity sitting exactly on a cell boundary is
    /// registered in both neighbors. Entities without a transform yield an
    /// empty set and are silently excluded from indexing.
    pub fn entity_keys(&self, entity: &impl EntityView) -> CellKeySet {
        let mut keys = CellKeySet::new();
        let Some(bounds) = entity_bounds(entity) else {
            return keys;
        };

        let min_cx = self.coord_to_cell(bounds.x);
        let max_cx = self.coord_to_cell(bounds.max_x());
        let min_cy = self.coord_to_cell(bounds.y);
        let max_cy = self.coord_to_cell(bounds.max_y());

        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                keys.push((cx, cy));
            }
        }
        keys
    }

    /// Register an entity in every cell its bounding box overlaps
    pub fn insert(&mut self, entity: &impl EntityView) {
        let id = entity.id();
        for key in self.entity_keys(entity) {
            let cell = self.cells.entry(key).or_default();
            if !cell.contains(&id) {
                cell.push(id);
            }
        }
    }

    /// Remove an entity from every cell its bounding box overlaps
    ///
    /// Uses the entity's current bounds; after bulk movement the canonical
    /// resync is a full [`rebuild`](Self::rebuild). Cells left empty are
    /// deleted so memory tracks occupied space, not world extent.
    pub fn remove(&mut self, entity: &impl EntityView) {
        let id = entity.id();
        for key in self.entity_keys(entity) {
            if let Some(cell) = self.cells.get_mut(&key) {
                if let Some(idx) = cell.iter().position(|&e| e == id) {
                    cell.swap_remove(idx);
                }
                if cell.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
    }

    /// Entities registered in any cell overlapping the rectangle
    ///
    /// Entities spanning several cells appear once (set dedup). A zero or
    /// negative extent returns no results.
    pub fn query(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<EntityId> {
        if width <= 0.0 || height <= 0.0 {
            return Vec::new();
        }

        let min_cx = self.coord_to_cell(x);
        let max_cx = self.coord_to_cell(x + width);
        let min_cy = self.coord_to_cell(y);
        let max_cy = self.coord_to_cell(y + height);

        let mut seen = FxHashSet::default();
        let mut results = Vec::new();
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                if let Some(cell) = self.cells.get(&(cx, cy)) {
                    for &id in cell {
                        if seen.insert(id) {
                            results.push(id);
                        }
                    }
                }
            }
        }
        results
    }

    /// Entities near a point, as a square query of side `2 * radius`
    ///
    /// The circle is approximated by its bounding square; callers needing
    /// exact circular containment must post-filter by distance.
    pub fn query_point(&self, x: f32, y: f32, radius: f32) -> Vec<EntityId> {
        self.query(x - radius, y - radius, radius * 2.0, radius * 2.0)
    }

    /// Clear the grid and reinsert only active entities
    ///
    /// O(n) in entity count - the optimizer invokes this only when its dirty
    /// flag is set.
    pub fn rebuild<'a, E: EntityView + 'a>(&mut self, entities: impl IntoIterator<Item = &'a E>) {
        self.cells.clear();
        for entity in entities {
            if entity.is_active() {
                self.insert(entity);
            }
        }
    }

    /// Drop all registrations
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Occupancy statistics, used to spot degenerate clustering
    pub fn stats(&self) -> GridStats {
        let cell_count = self.cells.len();
        let total_memberships: usize = self.cells.values().map(|c| c.len()).sum();
        let max_per_cell = self.cells.values().map(|c| c.len()).max().unwrap_or(0);
        let avg_per_cell = if cell_count > 0 {
            total_memberships as f32 / cell_count as f32
        } else {
            0.0
        };

        GridStats {
            cell_count,
            total_memberships,
            max_per_cell,
            avg_per_cell,
        }
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

/// Grid occupancy snapshot
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct GridStats {
    pub cell_count: usize,
    /// Entity-cell registrations; entities spanning cells count once per cell
    pub total_memberships: usize,
    pub max_per_cell: usize,
    pub avg_per_cell: f32,
}
