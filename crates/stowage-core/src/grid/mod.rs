//! Per-container voxel occupancy: region queries, placement bookkeeping, and
//! the best-fit position search.

mod cells;
#[cfg(test)]
mod tests;

use log::{debug, trace, warn};
use rustc_hash::FxHashMap;

use crate::geometry::{orientations, reduced_orientations};
use crate::types::{Container, Dimensions, Position};

use cells::{CellStore, Handle, Region};

/// Items above this volume subsample anchor positions along x and y.
const ANCHOR_SUBSAMPLE_VOLUME: u64 = 5_000;

/// Items above this volume search only the reduced orientation set.
const REDUCED_ORIENTATION_VOLUME: u64 = 10_000;

/// Hard cap on anchor positions examined per fit search.
const SEARCH_POSITION_BUDGET: usize = 10_000;

/// Outcome of a best-fit search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FitSearch {
    /// Best position found: minimal under the `(z, x, y)` key over the
    /// sampled anchors.
    Fit(Position),
    /// The search completed without finding a feasible position.
    NoFit,
    /// The position budget ran out before any feasible position was seen.
    Exhausted,
}

struct StoredItem {
    handle: Handle,
    name: String,
    volume: u64,
    position: Position,
}

/// Voxel occupancy map of a single container.
///
/// Every occupied voxel belongs to the contiguous box of exactly one item,
/// boxes of distinct items are disjoint, and the occupied volume equals the
/// sum of the stored items' volumes.
pub struct OccupancyGrid {
    container_id: String,
    dims: Dimensions,
    cells: CellStore,
    items: FxHashMap<String, StoredItem>,
    /// Interned ids, indexed by handle. Slot 0 is the "empty" sentinel and is
    /// never assigned; freed slots are recycled through `free_handles`.
    occupants: Vec<String>,
    free_handles: Vec<Handle>,
    occupied_volume: u64,
}

impl OccupancyGrid {
    pub fn new(container: &Container) -> Self {
        let cells = CellStore::for_container(&container.dimensions);
        debug!(
            "grid {}: {}x{}x{} voxels, {} storage",
            container.container_id,
            container.dimensions.width,
            container.dimensions.depth,
            container.dimensions.height,
            if cells.is_sparse() { "sparse" } else { "dense" },
        );
        Self {
            container_id: container.container_id.clone(),
            dims: container.dimensions,
            cells,
            items: FxHashMap::default(),
            occupants: vec![String::new()],
            free_handles: Vec::new(),
            occupied_volume: 0,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn total_volume(&self) -> u64 {
        self.dims.volume()
    }

    pub fn occupied_volume(&self) -> u64 {
        self.occupied_volume
    }

    pub fn available_volume(&self) -> u64 {
        self.total_volume() - self.occupied_volume
    }

    /// Number of voxels currently marked occupied. Always equals
    /// [`occupied_volume`](Self::occupied_volume).
    pub fn occupied_voxels(&self) -> u64 {
        self.cells.occupied_voxels()
    }

    pub fn contains_item(&self, item_id: &str) -> bool {
        self.items.contains_key(item_id)
    }

    pub fn item_position(&self, item_id: &str) -> Option<&Position> {
        self.items.get(item_id).map(|stored| &stored.position)
    }

    pub fn item_name(&self, item_id: &str) -> Option<&str> {
        self.items.get(item_id).map(|stored| stored.name.as_str())
    }

    /// Id of the item occupying voxel `(x, y, z)`, if any. The voxel must be
    /// in bounds.
    pub(crate) fn item_at(&self, x: u32, y: u32, z: u32) -> Option<&str> {
        self.cells
            .handle_at(x, y, z)
            .map(|handle| self.occupants[handle as usize].as_str())
    }

    fn region_of(position: &Position) -> Region {
        Region {
            x1: position.start_coordinates.width,
            y1: position.start_coordinates.depth,
            z1: position.start_coordinates.height,
            x2: position.end_coordinates.width,
            y2: position.end_coordinates.depth,
            z2: position.end_coordinates.height,
        }
    }

    /// True iff the half-open box is inside the container and fully empty.
    /// Degenerate and out-of-bounds boxes are rejected, never an error.
    pub fn is_region_empty(&self, x1: u32, y1: u32, z1: u32, x2: u32, y2: u32, z2: u32) -> bool {
        if x1 >= x2 || y1 >= y2 || z1 >= z2 {
            return false;
        }
        if x2 > self.dims.width || y2 > self.dims.depth || z2 > self.dims.height {
            return false;
        }
        self.cells.is_region_empty(&Region {
            x1,
            y1,
            z1,
            x2,
            y2,
            z2,
        })
    }

    /// Marks every voxel of `position` as occupied by `item_id`.
    ///
    /// `volume` is the item's original volume and must equal the box volume:
    /// orientations permute extents, they never scale them. Returns false
    /// with the grid untouched when the id is already present, the box is out
    /// of bounds or collides, or the volumes disagree.
    pub fn place_item(&mut self, item_id: &str, name: &str, volume: u64, position: &Position) -> bool {
        if self.items.contains_key(item_id) {
            return false;
        }
        if !self.is_region_empty(
            position.start_coordinates.width,
            position.start_coordinates.depth,
            position.start_coordinates.height,
            position.end_coordinates.width,
            position.end_coordinates.depth,
            position.end_coordinates.height,
        ) {
            return false;
        }
        if position.volume() != volume {
            warn!(
                "item {item_id}: box volume {} disagrees with item volume {volume}",
                position.volume()
            );
            return false;
        }

        let handle = self.allocate_handle(item_id);
        self.cells.write_box(&Self::region_of(position), handle);
        self.items.insert(
            item_id.to_string(),
            StoredItem {
                handle,
                name: name.to_string(),
                volume,
                position: *position,
            },
        );
        self.occupied_volume += volume;
        true
    }

    /// Clears the voxels written for `item_id` and forgets its metadata.
    /// Returns false if the id is unknown to this grid.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let Some(stored) = self.items.remove(item_id) else {
            return false;
        };
        self.cells
            .clear_box(&Self::region_of(&stored.position), stored.handle);
        self.occupants[stored.handle as usize].clear();
        self.free_handles.push(stored.handle);
        self.occupied_volume -= stored.volume;
        true
    }

    fn allocate_handle(&mut self, item_id: &str) -> Handle {
        match self.free_handles.pop() {
            Some(handle) => {
                self.occupants[handle as usize] = item_id.to_string();
                handle
            }
            None => {
                self.occupants.push(item_id.to_string());
                (self.occupants.len() - 1) as Handle
            }
        }
    }

    /// Finds the position minimising the lexicographic `(z, x, y)` key over
    /// every orientation and anchor that fits: lowest first, then leftmost,
    /// then closest to the front face.
    ///
    /// Large items trade completeness for speed: above
    /// [`REDUCED_ORIENTATION_VOLUME`] only the reduced orientation set is
    /// searched, and above [`ANCHOR_SUBSAMPLE_VOLUME`] the x and y anchors
    /// advance in steps of a tenth of the edge (both extremes always tested;
    /// z is never subsampled). The guarantee weakens to the minimum over the
    /// sampled anchors.
    pub fn find_best_fit(&self, item_dims: &Dimensions) -> FitSearch {
        let item_volume = item_dims.volume();
        let orientation_set = if item_volume > REDUCED_ORIENTATION_VOLUME {
            reduced_orientations(item_dims)
        } else {
            orientations(item_dims)
        };

        let mut best: Option<((u32, u32, u32), Position)> = None;
        let mut examined = 0usize;
        let mut budget_hit = false;

        'orientations: for extents in &orientation_set {
            if extents.width > self.dims.width
                || extents.depth > self.dims.depth
                || extents.height > self.dims.height
            {
                continue;
            }

            let (step_x, step_y) = if item_volume > ANCHOR_SUBSAMPLE_VOLUME {
                ((extents.width / 10).max(1), (extents.depth / 10).max(1))
            } else {
                (1, 1)
            };
            let xs = anchor_offsets(self.dims.width - extents.width, step_x);
            let ys = anchor_offsets(self.dims.depth - extents.depth, step_y);

            for z in 0..=self.dims.height - extents.height {
                for &x in &xs {
                    for &y in &ys {
                        examined += 1;
                        if examined > SEARCH_POSITION_BUDGET {
                            budget_hit = true;
                            break 'orientations;
                        }
                        if !self.cells.is_region_empty(&Region {
                            x1: x,
                            y1: y,
                            z1: z,
                            x2: x + extents.width,
                            y2: y + extents.depth,
                            z2: z + extents.height,
                        }) {
                            continue;
                        }
                        let key = (z, x, y);
                        if best.as_ref().map_or(true, |(best_key, _)| key < *best_key) {
                            best = Some((key, Position::from_anchor(x, y, z, extents)));
                        }
                    }
                }
            }
        }

        trace!(
            "best-fit in {}: examined {examined} anchors across {} orientations",
            self.container_id,
            orientation_set.len(),
        );
        match best {
            Some((_, position)) => FitSearch::Fit(position),
            None if budget_hit => FitSearch::Exhausted,
            None => FitSearch::NoFit,
        }
    }

    #[cfg(test)]
    fn is_sparse(&self) -> bool {
        self.cells.is_sparse()
    }
}

/// Anchor offsets `0, step, 2*step, ...`, with the far extreme `max_offset`
/// appended when stepping skips it.
fn anchor_offsets(max_offset: u32, step: u32) -> Vec<u32> {
    let mut offsets: Vec<u32> = (0..=max_offset).step_by(step as usize).collect();
    if offsets.last() != Some(&max_offset) {
        offsets.push(max_offset);
    }
    offsets
}
