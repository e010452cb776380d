use rustc_hash::FxHashMap;

use crate::types::Dimensions;

/// Containers with more voxels than this use the sparse representation.
const DENSE_VOXEL_LIMIT: u64 = 1_000_000;

/// Regions larger than this get a corner pre-check before the full scan.
const CORNER_CHECK_VOLUME: u64 = 10_000;

/// Interned occupant id. Cell storage never holds owned strings; handle 0 is
/// reserved to mean "empty" in the dense form.
pub(super) type Handle = u32;

/// Half-open voxel box used for all cell-level operations. Callers guarantee
/// it is non-degenerate and within bounds.
#[derive(Debug, Clone, Copy)]
pub(super) struct Region {
    pub x1: u32,
    pub y1: u32,
    pub z1: u32,
    pub x2: u32,
    pub y2: u32,
    pub z2: u32,
}

impl Region {
    pub(super) fn volume(&self) -> u64 {
        (self.x2 - self.x1) as u64 * (self.y2 - self.y1) as u64 * (self.z2 - self.z1) as u64
    }

    fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        self.x1 <= x && x < self.x2 && self.y1 <= y && y < self.y2 && self.z1 <= z && z < self.z2
    }

    fn corners(&self) -> [(u32, u32, u32); 8] {
        [
            (self.x1, self.y1, self.z1),
            (self.x1, self.y1, self.z2 - 1),
            (self.x1, self.y2 - 1, self.z1),
            (self.x1, self.y2 - 1, self.z2 - 1),
            (self.x2 - 1, self.y1, self.z1),
            (self.x2 - 1, self.y1, self.z2 - 1),
            (self.x2 - 1, self.y2 - 1, self.z1),
            (self.x2 - 1, self.y2 - 1, self.z2 - 1),
        ]
    }
}

/// Voxel storage for one container. The representation is chosen once, from
/// the container's size, and is invisible above this type: large containers
/// are mostly empty, so they map filled voxels instead of allocating all of
/// them.
pub(super) struct CellStore {
    width: u32,
    depth: u32,
    height: u32,
    repr: Repr,
}

enum Repr {
    /// Flat `[x][y][z]` array; 0 marks an empty voxel.
    Dense(Vec<Handle>),
    /// Voxel to handle map; absent keys are empty.
    Sparse(FxHashMap<(u32, u32, u32), Handle>),
}

impl CellStore {
    pub(super) fn for_container(dims: &Dimensions) -> Self {
        let repr = if dims.volume() > DENSE_VOXEL_LIMIT {
            Repr::Sparse(FxHashMap::default())
        } else {
            Repr::Dense(vec![0; dims.volume() as usize])
        };
        Self {
            width: dims.width,
            depth: dims.depth,
            height: dims.height,
            repr,
        }
    }

    pub(super) fn is_sparse(&self) -> bool {
        matches!(self.repr, Repr::Sparse(_))
    }

    fn index(&self, x: u32, y: u32, z: u32) -> usize {
        (x as usize * self.depth as usize + y as usize) * self.height as usize + z as usize
    }

    pub(super) fn handle_at(&self, x: u32, y: u32, z: u32) -> Option<Handle> {
        match &self.repr {
            Repr::Dense(cells) => match cells[self.index(x, y, z)] {
                0 => None,
                handle => Some(handle),
            },
            Repr::Sparse(cells) => cells.get(&(x, y, z)).copied(),
        }
    }

    /// True iff every voxel of `region` is empty.
    pub(super) fn is_region_empty(&self, region: &Region) -> bool {
        // corners are the likeliest voxels to be occupied; probing them first
        // short-circuits most failing queries on big regions
        if region.volume() > CORNER_CHECK_VOLUME {
            for (x, y, z) in region.corners() {
                if self.handle_at(x, y, z).is_some() {
                    return false;
                }
            }
        }

        match &self.repr {
            Repr::Dense(cells) => {
                for x in region.x1..region.x2 {
                    for y in region.y1..region.y2 {
                        for z in region.z1..region.z2 {
                            if cells[self.index(x, y, z)] != 0 {
                                return false;
                            }
                        }
                    }
                }
                true
            }
            Repr::Sparse(cells) => {
                if (cells.len() as u64) < region.volume() {
                    cells
                        .keys()
                        .all(|&(x, y, z)| !region.contains(x, y, z))
                } else {
                    for x in region.x1..region.x2 {
                        for y in region.y1..region.y2 {
                            for z in region.z1..region.z2 {
                                if cells.contains_key(&(x, y, z)) {
                                    return false;
                                }
                            }
                        }
                    }
                    true
                }
            }
        }
    }

    /// Marks every voxel of `region` with `handle`.
    pub(super) fn write_box(&mut self, region: &Region, handle: Handle) {
        match &mut self.repr {
            Repr::Dense(cells) => {
                for x in region.x1..region.x2 {
                    for y in region.y1..region.y2 {
                        let base =
                            (x as usize * self.depth as usize + y as usize) * self.height as usize;
                        for z in region.z1..region.z2 {
                            cells[base + z as usize] = handle;
                        }
                    }
                }
            }
            Repr::Sparse(cells) => {
                for x in region.x1..region.x2 {
                    for y in region.y1..region.y2 {
                        for z in region.z1..region.z2 {
                            cells.insert((x, y, z), handle);
                        }
                    }
                }
            }
        }
    }

    /// Clears the voxels of `region` that hold `handle`.
    pub(super) fn clear_box(&mut self, region: &Region, handle: Handle) {
        match &mut self.repr {
            Repr::Dense(cells) => {
                for x in region.x1..region.x2 {
                    for y in region.y1..region.y2 {
                        let base =
                            (x as usize * self.depth as usize + y as usize) * self.height as usize;
                        for z in region.z1..region.z2 {
                            if cells[base + z as usize] == handle {
                                cells[base + z as usize] = 0;
                            }
                        }
                    }
                }
            }
            Repr::Sparse(cells) => {
                for x in region.x1..region.x2 {
                    for y in region.y1..region.y2 {
                        for z in region.z1..region.z2 {
                            if cells.get(&(x, y, z)) == Some(&handle) {
                                cells.remove(&(x, y, z));
                            }
                        }
                    }
                }
            }
        }
    }

    pub(super) fn occupied_voxels(&self) -> u64 {
        match &self.repr {
            Repr::Dense(cells) => cells.iter().filter(|&&handle| handle != 0).count() as u64,
            Repr::Sparse(cells) => cells.len() as u64,
        }
    }
}
