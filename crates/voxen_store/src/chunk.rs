//! A single loaded chunk: its voxel data, lifecycle state, neighbor links,
//! and most recently built mesh.

use voxen_core::{Aabb, PoolHandle, Vec3, VoxelError, VoxelId, VoxelResult, VoxelTypeTable, AIR};

use crate::mesh_data::MeshArrays;
use crate::voxel_store::VoxelStore;
use crate::zone::{ChunkCoord, Direction, CHUNK_SIDE};

/// Lifecycle state of a [`Chunk`].
///
/// Transitions into `Generating`, `Meshing`, and `Unloading` are initiated by
/// the owning manager; workers never change a chunk's state themselves —
/// they return artifacts, and the manager applies them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Not tracked; the default state, and the only terminal state.
    Unloaded,
    /// Queued for generation or cache read, not yet started.
    Pending,
    /// A generate-terrain job is in flight.
    Generating,
    /// A mesh job is in flight (initial build, or re-mesh after an edit or
    /// neighbor change).
    Meshing,
    /// Has voxel data and an up-to-date mesh.
    Active,
    /// Being evicted; neighbor links are being cleared.
    Unloading,
}

/// A chunk's voxel data, position, lifecycle state, neighbor links, and
/// cached mesh.
///
/// Neighbor references are non-owning [`PoolHandle`]s into the owning
/// manager's chunk pool, never raw pointers.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    side: usize,
    height: usize,
    store: VoxelStore,
    state: ChunkState,
    neighbors: [Option<PoolHandle>; 6],
    cached_mesh: MeshArrays,
    voxel_dirty: bool,
    mesh_dirty: bool,
}

fn direction_index(dir: Direction) -> usize {
    match dir {
        Direction::PosX => 0,
        Direction::NegX => 1,
        Direction::PosY => 2,
        Direction::NegY => 3,
        Direction::PosZ => 4,
        Direction::NegZ => 5,
    }
}

impl Chunk {
    /// Creates a new, empty (uniform AIR) chunk at `coord`, sized for its
    /// zone.
    #[must_use]
    pub fn new_empty(coord: ChunkCoord) -> Self {
        let side = usize::try_from(CHUNK_SIDE).unwrap_or(16);
        let height = usize::try_from(coord.height()).unwrap_or(16);
        Self {
            coord,
            side,
            height,
            store: VoxelStore::uniform(AIR),
            state: ChunkState::Unloaded,
            neighbors: [None; 6],
            cached_mesh: MeshArrays::empty(),
            voxel_dirty: false,
            mesh_dirty: false,
        }
    }

    /// Resets this chunk in place for reuse from the pool: new coordinate,
    /// empty store, `Unloaded` state, cleared neighbors and mesh. Does not
    /// touch any pool generation counter — that is the pool's job.
    pub fn reset_for_reuse(&mut self, coord: ChunkCoord) {
        *self = Self::new_empty(coord);
    }

    /// This chunk's coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ChunkState {
        self.state
    }

    /// Sets the lifecycle state. Only the owning manager should call this.
    pub fn set_state(&mut self, state: ChunkState) {
        self.state = state;
    }

    /// Horizontal side length.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Replaces this chunk's voxel data wholesale, e.g. after a generation
    /// or cache-read job completes.
    pub fn install_store(&mut self, store: VoxelStore) {
        self.store = store;
        self.mark_mesh_dirty();
    }

    /// Reads a cell at local coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::OutOfBounds`] if any coordinate is out of
    /// range for this chunk's dimensions.
    pub fn get(&self, x: i32, y: i32, z: i32) -> VoxelResult<VoxelId> {
        self.check_bounds(x, y, z)?;
        Ok(self.store.get(x as usize, y as usize, z as usize))
    }

    /// Writes a cell at local coordinates, marking this chunk mesh-dirty.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::OutOfBounds`] if any coordinate is out of
    /// range for this chunk's dimensions.
    pub fn set(&mut self, x: i32, y: i32, z: i32, id: VoxelId) -> VoxelResult<()> {
        self.check_bounds(x, y, z)?;
        self.store.set(self.side, self.height, x as usize, y as usize, z as usize, id);
        self.voxel_dirty = true;
        self.mark_mesh_dirty();
        Ok(())
    }

    fn check_bounds(&self, x: i32, y: i32, z: i32) -> VoxelResult<()> {
        let side = i32::try_from(self.side).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        if x < 0 || y < 0 || z < 0 || x >= side || y >= height || z >= side {
            return Err(VoxelError::OutOfBounds {
                x, y, z, max_x: side, max_y: height, max_z: side,
            });
        }
        Ok(())
    }

    /// Direct access to the underlying store, e.g. for the mesher's
    /// cross-chunk face sampling.
    #[must_use]
    pub const fn store(&self) -> &VoxelStore {
        &self.store
    }

    /// Marks this chunk's mesh stale; it should be re-meshed before its
    /// cached arrays are trusted again.
    pub fn mark_mesh_dirty(&mut self) {
        self.mesh_dirty = true;
    }

    /// Clears the mesh-dirty bit, typically once a fresh mesh job has been
    /// enqueued or has completed.
    pub fn clear_mesh_dirty(&mut self) {
        self.mesh_dirty = false;
    }

    /// Whether this chunk's cached mesh is stale.
    #[must_use]
    pub const fn is_mesh_dirty(&self) -> bool {
        self.mesh_dirty
    }

    /// Whether this chunk's voxel data has changed since it was last
    /// persisted.
    #[must_use]
    pub const fn is_voxel_dirty(&self) -> bool {
        self.voxel_dirty
    }

    /// Clears the voxel-dirty bit, typically after a successful cache
    /// write.
    pub fn clear_voxel_dirty(&mut self) {
        self.voxel_dirty = false;
    }

    /// Sets (or clears) the neighbor link in direction `dir`.
    pub fn set_neighbor(&mut self, dir: Direction, neighbor: Option<PoolHandle>) {
        self.neighbors[direction_index(dir)] = neighbor;
    }

    /// Gets the neighbor link in direction `dir`.
    #[must_use]
    pub fn get_neighbor(&self, dir: Direction) -> Option<PoolHandle> {
        self.neighbors[direction_index(dir)]
    }

    /// Replaces the cached mesh arrays, e.g. after a mesh job completes.
    pub fn set_cached_mesh(&mut self, mesh: MeshArrays) {
        self.cached_mesh = mesh;
    }

    /// The most recently built mesh arrays (may be empty).
    #[must_use]
    pub const fn cached_mesh(&self) -> &MeshArrays {
        &self.cached_mesh
    }

    /// World-space bounding box of this chunk.
    #[must_use]
    pub fn world_aabb(&self) -> Aabb {
        let (ox, oy, oz) = self.coord.world_origin();
        let min = Vec3::new(ox as f32, oy as f32, oz as f32);
        let max = Vec3::new(
            (ox + i32::try_from(self.side).unwrap_or(0)) as f32,
            (oy + i32::try_from(self.height).unwrap_or(0)) as f32,
            (oz + i32::try_from(self.side).unwrap_or(0)) as f32,
        );
        Aabb::new(min, max)
    }

    /// Whether this chunk is entirely `AIR`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.store, VoxelStore::Uniform(AIR))
    }

    /// Whether every cell in this chunk is opaque, per `table`.
    ///
    /// A uniform chunk resolves this in O(1); a dense chunk scans every
    /// cell. Used by the occlusion culler to decide whether this chunk
    /// blocks visibility through it entirely.
    #[must_use]
    pub fn is_fully_opaque(&self, table: &VoxelTypeTable) -> bool {
        match &self.store {
            VoxelStore::Uniform(id) => table.is_opaque(*id),
            VoxelStore::Dense { cells, .. } => cells.iter().all(|&id| table.is_opaque(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_empty_and_unloaded() {
        let chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        assert!(chunk.is_empty());
        assert_eq!(chunk.state(), ChunkState::Unloaded);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        chunk.set(1, 1, 1, 5).unwrap();
        assert_eq!(chunk.get(1, 1, 1).unwrap(), 5);
        assert!(!chunk.is_empty());
        assert!(chunk.is_mesh_dirty());
    }

    #[test]
    fn out_of_bounds_access_is_rejected() {
        let chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        assert!(matches!(chunk.get(16, 0, 0), Err(VoxelError::OutOfBounds { .. })));
        assert!(matches!(chunk.get(-1, 0, 0), Err(VoxelError::OutOfBounds { .. })));
    }

    #[test]
    fn neighbor_links_round_trip() {
        let mut chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        let handle = {
            let mut pool: voxen_core::Pool<()> = voxen_core::Pool::new(1);
            pool.acquire(|| ()).unwrap().0
        };
        chunk.set_neighbor(Direction::PosX, Some(handle));
        assert_eq!(chunk.get_neighbor(Direction::PosX), Some(handle));
        assert_eq!(chunk.get_neighbor(Direction::NegX), None);
    }

    #[test]
    fn uniform_opaque_chunk_is_fully_opaque() {
        let table = VoxelTypeTable::builder()
            .register(1, voxen_core::Properties { opaque: true, solid: true, ..voxen_core::Properties::AIR })
            .build();
        let mut chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        chunk.install_store(VoxelStore::uniform(1));
        assert!(chunk.is_fully_opaque(&table));
    }

    #[test]
    fn air_chunk_is_not_fully_opaque() {
        let table = VoxelTypeTable::builder().build();
        let chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        assert!(!chunk.is_fully_opaque(&table));
    }
}
