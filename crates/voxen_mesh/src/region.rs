//! The region batcher: groups chunks into fixed-size regions and folds
//! their member meshes into one combined buffer per region.
//!
//! A region's weak references to its member chunks are plain
//! [`voxen_core::PoolHandle`]s: resolving a handle against a chunk pool that
//! has since recycled the slot returns `None`, which this module surfaces
//! as [`VoxelError::MemberGone`].

use std::collections::HashSet;

use voxen_core::{Pool, PoolHandle, Vec3, VoxelError, VoxelResult};
use voxen_store::{Chunk, ChunkCoord, MeshArrays};

use crate::job::RegionMemberSnapshot;

/// Chunks per region edge.
pub const REGION_SIZE: i32 = 8;

fn div_floor(a: i32, b: i32) -> i32 {
    let d = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) { d - 1 } else { d }
}

/// A region's coordinate: which `REGION_SIZE`-chunk cube a `ChunkCoord`
/// falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionCoord {
    /// Region X.
    pub rx: i32,
    /// Region Y, in the same zone-local `cy` numbering as its member chunks.
    pub ry: i32,
    /// Region Z.
    pub rz: i32,
}

impl RegionCoord {
    /// Creates a new region coordinate.
    #[must_use]
    pub const fn new(rx: i32, ry: i32, rz: i32) -> Self {
        Self { rx, ry, rz }
    }

    /// The region containing `coord`.
    #[must_use]
    pub fn containing(coord: ChunkCoord) -> Self {
        Self {
            rx: div_floor(coord.cx, REGION_SIZE),
            ry: div_floor(coord.cy, REGION_SIZE),
            rz: div_floor(coord.cz, REGION_SIZE),
        }
    }

    /// The coordinate of this region's minimum-corner chunk, used to
    /// resolve the region's world-space origin.
    #[must_use]
    pub const fn anchor_chunk(self) -> ChunkCoord {
        ChunkCoord::new(self.rx * REGION_SIZE, self.ry * REGION_SIZE, self.rz * REGION_SIZE)
    }

    /// World-space origin (minimum corner) of this region.
    #[must_use]
    pub fn world_origin(self) -> Vec3 {
        let (ox, oy, oz) = self.anchor_chunk().world_origin();
        Vec3::new(ox as f32, oy as f32, oz as f32)
    }
}

/// One chunk's membership in a region: its coordinate and a non-owning
/// handle into the manager's chunk pool.
#[derive(Clone, Copy, Debug)]
struct Member {
    coord: ChunkCoord,
    handle: PoolHandle,
}

/// A group of up to `REGION_SIZE`³ chunks batched into one combined mesh.
pub struct Region {
    coord: RegionCoord,
    members: Vec<Member>,
    dirty_chunks: HashSet<ChunkCoord>,
    /// Set by `attach`/`detach`: membership changed since the last combine,
    /// independent of any single member's dirty state. Kept apart from
    /// `dirty_chunks` so that set only ever names chunks currently in
    /// `members`.
    membership_changed: bool,
    combined: MeshArrays,
}

impl Region {
    /// Creates an empty region with no members and an empty combined mesh.
    #[must_use]
    pub fn new(coord: RegionCoord) -> Self {
        Self {
            coord,
            members: Vec::new(),
            dirty_chunks: HashSet::new(),
            membership_changed: false,
            combined: MeshArrays::empty(),
        }
    }

    /// This region's coordinate.
    #[must_use]
    pub const fn coord(&self) -> RegionCoord {
        self.coord
    }

    /// The most recently combined mesh (may be empty, or stale if the
    /// region is dirty and awaiting a rebuild).
    #[must_use]
    pub const fn combined(&self) -> &MeshArrays {
        &self.combined
    }

    /// Whether any member's contribution is not yet reflected in `combined`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.membership_changed || !self.dirty_chunks.is_empty()
    }

    /// Number of currently attached members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Attaches a chunk to this region, or updates its handle if already
    /// attached. Marks the region dirty.
    pub fn attach(&mut self, coord: ChunkCoord, handle: PoolHandle) {
        if let Some(existing) = self.members.iter_mut().find(|m| m.coord == coord) {
            existing.handle = handle;
        } else {
            self.members.push(Member { coord, handle });
        }
        self.dirty_chunks.insert(coord);
        self.membership_changed = true;
    }

    /// Detaches a chunk from this region. Marks the region dirty so the
    /// next rebuild excludes it.
    pub fn detach(&mut self, coord: ChunkCoord) {
        self.members.retain(|m| m.coord != coord);
        self.dirty_chunks.remove(&coord);
        self.membership_changed = true;
    }

    /// Marks `coord`'s contribution as stale after it re-meshes, so the
    /// next `rebuild` folds its latest arrays in.
    pub fn notify_chunk_meshed(&mut self, coord: ChunkCoord) {
        if self.members.iter().any(|m| m.coord == coord) {
            self.dirty_chunks.insert(coord);
        }
    }

    /// Folds every current member's cached mesh into one combined buffer,
    /// offsetting positions by the member's world origin relative to the
    /// region's.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::MemberGone`] if a member's handle no longer
    /// resolves in `pool` (its chunk was recycled mid-combine); the caller
    /// should leave the region dirty and retry on a later tick.
    ///
    /// On success, returns whether any member contributed geometry; `false`
    /// means every member was empty (the caller's `NothingToBuild` case).
    pub fn rebuild(&mut self, pool: &Pool<Chunk>) -> VoxelResult<bool> {
        let origin = self.coord.world_origin();
        let mut combined = MeshArrays::empty();
        let mut any_nonempty = false;

        for member in &self.members {
            let Some(chunk) = pool.get(member.handle) else {
                return Err(VoxelError::MemberGone);
            };
            let mesh = chunk.cached_mesh();
            if mesh.is_empty() {
                continue;
            }
            any_nonempty = true;
            let (cox, coy, coz) = chunk.coord().world_origin();
            let offset = Vec3::new(cox as f32, coy as f32, coz as f32) - origin;
            combined.append_offset(mesh, offset);
        }

        self.combined = combined;
        self.dirty_chunks.clear();
        self.membership_changed = false;
        Ok(any_nonempty)
    }

    /// Captures every current member's cached mesh and its offset from the
    /// region's origin, for an off-thread combine job. Leaves this region's
    /// state untouched — the caller applies the result later via
    /// [`Region::apply_from_worker`] once the job completes.
    ///
    /// # Errors
    ///
    /// Returns [`VoxelError::MemberGone`] if a member's handle no longer
    /// resolves in `pool`.
    pub fn snapshot_members(&self, pool: &Pool<Chunk>) -> VoxelResult<Vec<RegionMemberSnapshot>> {
        let origin = self.coord.world_origin();
        let mut snapshots = Vec::with_capacity(self.members.len());

        for member in &self.members {
            let Some(chunk) = pool.get(member.handle) else {
                return Err(VoxelError::MemberGone);
            };
            let (cox, coy, coz) = chunk.coord().world_origin();
            let offset = Vec3::new(cox as f32, coy as f32, coz as f32) - origin;
            snapshots.push(RegionMemberSnapshot { coord: member.coord, mesh: chunk.cached_mesh().clone(), offset });
        }
        Ok(snapshots)
    }

    /// Installs a combined mesh produced by an off-thread combine job,
    /// clearing dirty state as [`Region::rebuild`] would.
    pub fn apply_from_worker(&mut self, mesh: MeshArrays) {
        self.combined = mesh;
        self.dirty_chunks.clear();
        self.membership_changed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxen_store::Chunk;

    #[test]
    fn region_containing_groups_chunks_by_region_size() {
        let a = RegionCoord::containing(ChunkCoord::new(0, 0, 0));
        let b = RegionCoord::containing(ChunkCoord::new(7, 7, 7));
        let c = RegionCoord::containing(ChunkCoord::new(8, 0, 0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn negative_coords_floor_correctly() {
        let r = RegionCoord::containing(ChunkCoord::new(-1, 0, 0));
        assert_eq!(r.rx, -1);
        let r2 = RegionCoord::containing(ChunkCoord::new(-8, 0, 0));
        assert_eq!(r2.rx, -1);
        let r3 = RegionCoord::containing(ChunkCoord::new(-9, 0, 0));
        assert_eq!(r3.rx, -2);
    }

    #[test]
    fn attach_marks_dirty_and_detach_clears_membership() {
        let mut pool: Pool<Chunk> = Pool::new(4);
        let (handle, _) = pool.acquire(|| Chunk::new_empty(ChunkCoord::new(0, 0, 0))).unwrap();
        let mut region = Region::new(RegionCoord::new(0, 0, 0));
        assert!(!region.is_dirty());

        region.attach(ChunkCoord::new(0, 0, 0), handle);
        assert!(region.is_dirty());
        assert_eq!(region.member_count(), 1);

        region.rebuild(&pool).unwrap();
        assert!(!region.is_dirty());

        region.detach(ChunkCoord::new(0, 0, 0));
        assert_eq!(region.member_count(), 0);
        assert!(region.is_dirty());
    }

    #[test]
    fn rebuild_with_all_empty_members_reports_no_geometry() {
        let mut pool: Pool<Chunk> = Pool::new(4);
        let (handle, _) = pool.acquire(|| Chunk::new_empty(ChunkCoord::new(0, 0, 0))).unwrap();
        let mut region = Region::new(RegionCoord::new(0, 0, 0));
        region.attach(ChunkCoord::new(0, 0, 0), handle);

        let produced_geometry = region.rebuild(&pool).unwrap();
        assert!(!produced_geometry);
        assert!(region.combined().is_empty());
    }

    #[test]
    fn rebuild_detects_a_recycled_member() {
        let mut pool: Pool<Chunk> = Pool::new(4);
        let (handle, _) = pool.acquire(|| Chunk::new_empty(ChunkCoord::new(0, 0, 0))).unwrap();
        let mut region = Region::new(RegionCoord::new(0, 0, 0));
        region.attach(ChunkCoord::new(0, 0, 0), handle);

        pool.release(handle);
        let _ = pool.acquire(|| Chunk::new_empty(ChunkCoord::new(1, 0, 0))).unwrap();

        assert!(matches!(region.rebuild(&pool), Err(VoxelError::MemberGone)));
    }

    #[test]
    fn rebuild_folds_member_mesh_with_world_offset() {
        let mut pool: Pool<Chunk> = Pool::new(4);
        let coord = ChunkCoord::new(1, 0, 0);
        let (handle, chunk) = pool.acquire(|| Chunk::new_empty(coord)).unwrap();
        let mut mesh = MeshArrays::empty();
        mesh.positions.push(Vec3::ZERO);
        mesh.normals.push(Vec3::new(0.0, 1.0, 0.0));
        mesh.uvs.push([0.0, 0.0]);
        mesh.colors.push(voxen_core::Rgba::rgb(255, 255, 255));
        mesh.indices.push(0);
        chunk.set_cached_mesh(mesh);

        let mut region = Region::new(RegionCoord::new(0, 0, 0));
        region.attach(coord, handle);
        let produced_geometry = region.rebuild(&pool).unwrap();

        assert!(produced_geometry);
        assert_eq!(region.combined().positions.len(), 1);
        let (ox, _, _) = coord.world_origin();
        assert_eq!(region.combined().positions[0].x, ox as f32);
    }
}
