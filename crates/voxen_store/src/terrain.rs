//! The external terrain-generation contract.
//!
//! Noise-based terrain fill rules are explicitly out of scope for this
//! crate; it only defines the pure-function boundary a real generator
//! plugs into, plus two trivial stand-ins used by tests and demos.

use voxen_core::VoxelId;

use crate::voxel_store::VoxelStore;
use crate::zone::ChunkCoord;

/// Produces a chunk's initial voxel contents from its coordinate and a
/// world seed.
///
/// Implementations MUST be pure (same inputs always produce the same
/// store, bit for bit) and thread-safe — the worker pool calls this from
/// any worker thread, possibly concurrently for different coordinates.
pub trait TerrainSource: Send + Sync {
    /// Generates the store for `coord`, sized `side` horizontally and
    /// `height` vertically (per the coordinate's zone), under `world_seed`.
    fn generate(&self, coord: ChunkCoord, side: usize, height: usize, world_seed: u64) -> VoxelStore;
}

/// Always produces an all-air chunk. Useful for tests that only care about
/// the streaming and pooling machinery, not generated content.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatTerrainSource {
    /// The id every cell is filled with. `AIR` (0) by default.
    pub fill: VoxelId,
}

impl FlatTerrainSource {
    /// Creates a source that fills every chunk with `fill`.
    #[must_use]
    pub const fn new(fill: VoxelId) -> Self {
        Self { fill }
    }
}

impl TerrainSource for FlatTerrainSource {
    fn generate(&self, _coord: ChunkCoord, _side: usize, _height: usize, _world_seed: u64) -> VoxelStore {
        VoxelStore::uniform(self.fill)
    }
}

/// Fills every other cell (3D checkerboard) with a solid id, the rest with
/// air. Exercises the greedy mesher's merging logic without a real noise
/// function — every quad this produces is exactly 1x1, the worst case for
/// greedy merging, which is useful as a stress case in benchmarks.
#[derive(Clone, Copy, Debug)]
pub struct CheckerboardTerrainSource {
    /// The id used for "on" cells.
    pub solid_id: VoxelId,
}

impl CheckerboardTerrainSource {
    /// Creates a source using `solid_id` for the "on" phase of the pattern.
    #[must_use]
    pub const fn new(solid_id: VoxelId) -> Self {
        Self { solid_id }
    }
}

impl TerrainSource for CheckerboardTerrainSource {
    fn generate(&self, coord: ChunkCoord, side: usize, height: usize, world_seed: u64) -> VoxelStore {
        let mut store = VoxelStore::dense_filled(side, height, 0);
        let (ox, oy, oz) = coord.world_origin();
        let seed_parity = (world_seed & 1) as i32;
        for y in 0..height {
            for z in 0..side {
                for x in 0..side {
                    let wx = ox + x as i32;
                    let wy = oy + y as i32;
                    let wz = oz + z as i32;
                    if (wx + wy + wz + seed_parity).rem_euclid(2) == 0 {
                        store.set(side, height, x, y, z, self.solid_id);
                    }
                }
            }
        }
        store
    }
}
