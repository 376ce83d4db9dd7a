//! Greedy meshing: converts a chunk's voxels into a compact indexed
//! triangle mesh, consulting its six neighbors at chunk boundaries.
//!
//! A per-slice 2D mask is swept in row-major order; each maximal
//! same-valued rectangle is emitted as one quad, supporting variable
//! per-zone chunk height and indexed vertex arrays suitable for a renderer.

use voxen_core::{Rgba, Vec3, VoxelId, VoxelTypeTable, AIR};
use voxen_store::{Chunk, Direction, MeshArrays};

/// Read-only access to a chunk and its six neighbors, captured once at job
/// enqueue time (the snapshot rule) so the mesher never follows a live
/// mutable reference.
pub struct NeighborhoodSnapshot<'a> {
    chunk: &'a Chunk,
    neighbors: [Option<&'a Chunk>; 6],
}

impl<'a> NeighborhoodSnapshot<'a> {
    /// Builds a snapshot from a chunk and its neighbor in each direction
    /// (any may be absent).
    #[must_use]
    pub const fn new(chunk: &'a Chunk, neighbors: [Option<&'a Chunk>; 6]) -> Self {
        Self { chunk, neighbors }
    }

    fn neighbor(&self, dir: Direction) -> Option<&'a Chunk> {
        self.neighbors[direction_index(dir)]
    }
}

const fn direction_index(dir: Direction) -> usize {
    match dir {
        Direction::PosX => 0,
        Direction::NegX => 1,
        Direction::PosY => 2,
        Direction::NegY => 3,
        Direction::PosZ => 4,
        Direction::NegZ => 5,
    }
}

const fn direction_for(axis: usize, positive: bool) -> Direction {
    match (axis, positive) {
        (0, true) => Direction::PosX,
        (0, false) => Direction::NegX,
        (1, true) => Direction::PosY,
        (1, false) => Direction::NegY,
        (2, true) => Direction::PosZ,
        _ => Direction::NegZ,
    }
}

const fn normal_vector(dir: Direction) -> Vec3 {
    match dir {
        Direction::PosX => Vec3::new(1.0, 0.0, 0.0),
        Direction::NegX => Vec3::new(-1.0, 0.0, 0.0),
        Direction::PosY => Vec3::new(0.0, 1.0, 0.0),
        Direction::NegY => Vec3::new(0.0, -1.0, 0.0),
        Direction::PosZ => Vec3::new(0.0, 0.0, 1.0),
        Direction::NegZ => Vec3::new(0.0, 0.0, -1.0),
    }
}

/// Reference per-face shading factors: top faces brightest, bottom
/// darkest, the two horizontal-sweep side pairs in between.
fn shading_factor(dir: Direction) -> f32 {
    match dir {
        Direction::PosY => 1.0,
        Direction::NegY => 0.6,
        Direction::PosX | Direction::NegX => 0.85,
        Direction::PosZ | Direction::NegZ => 0.75,
    }
}

fn shade(color: Rgba, factor: f32) -> Rgba {
    let scale = |c: u8| (f32::from(c) * factor).clamp(0.0, 255.0) as u8;
    Rgba { r: scale(color.r), g: scale(color.g), b: scale(color.b), a: color.a }
}

/// One cell's face-visibility mask entry: the occupying id, or `None` if no
/// face should be emitted here.
#[derive(Clone, Copy, PartialEq, Eq)]
struct MaskCell(Option<VoxelId>);

impl MaskCell {
    const EMPTY: Self = Self(None);
}

/// Produces indexed mesh arrays from a chunk and its neighborhood.
///
/// Stateless and side-effect free: safe to invoke concurrently from many
/// worker threads on disjoint chunks. Owns only reusable scratch buffers
/// sized to the largest chunk side, to avoid repeated allocation across
/// calls from the same worker.
#[derive(Default)]
pub struct GreedyMesher {
    mask: Vec<MaskCell>,
}

impl GreedyMesher {
    /// Creates a mesher with no pre-allocated scratch space; the first call
    /// to [`GreedyMesher::mesh`] will size it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes `snapshot.chunk`, consulting its neighbors at chunk
    /// boundaries, using `table` for opacity and vertex-color lookups.
    ///
    /// Output is deterministic: the same chunk/neighbor/table contents
    /// always produce byte-identical arrays, since the mask sweep order is
    /// fixed (U ascending then V ascending per axis, axes swept X, Y, Z).
    pub fn mesh(&mut self, snapshot: &NeighborhoodSnapshot<'_>, table: &VoxelTypeTable) -> MeshArrays {
        let chunk = snapshot.chunk;
        let mut out = MeshArrays::empty();

        if chunk.is_empty() {
            return out;
        }

        let side = chunk.side();
        let height = chunk.height();
        let dims = [side, height, side];

        for axis in 0..3 {
            let u_axis = (axis + 1) % 3;
            let v_axis = (axis + 2) % 3;
            let u_len = dims[u_axis];
            let v_len = dims[v_axis];
            self.mask.clear();
            self.mask.resize(u_len * v_len, MaskCell::EMPTY);

            for positive in [true, false] {
                let dir = direction_for(axis, positive);
                for slice in 0..dims[axis] {
                    self.build_mask(snapshot, table, axis, u_axis, v_axis, slice, positive, u_len, v_len);
                    self.extract_mask(&mut out, table, axis, u_axis, v_axis, slice, dir, u_len, v_len);
                }
            }
        }

        out
    }

    #[allow(clippy::too_many_arguments)]
    fn build_mask(
        &mut self,
        snapshot: &NeighborhoodSnapshot<'_>,
        table: &VoxelTypeTable,
        axis: usize,
        u_axis: usize,
        v_axis: usize,
        slice: usize,
        positive: bool,
        u_len: usize,
        v_len: usize,
    ) {
        let chunk = snapshot.chunk;
        let dims = [chunk.side(), chunk.height(), chunk.side()];

        for cell in &mut self.mask {
            *cell = MaskCell::EMPTY;
        }

        for v in 0..v_len {
            for u in 0..u_len {
                let mut pos = [0usize; 3];
                pos[axis] = slice;
                pos[u_axis] = u;
                pos[v_axis] = v;

                let id = chunk.get(pos[0] as i32, pos[1] as i32, pos[2] as i32).unwrap_or(AIR);
                if id == AIR || !table.is_opaque(id) {
                    continue;
                }

                let mut adj = pos;
                let delta: isize = if positive { 1 } else { -1 };
                let adj_coord = pos[axis] as isize + delta;

                let adjacent_id = if adj_coord >= 0 && (adj_coord as usize) < dims[axis] {
                    adj[axis] = adj_coord as usize;
                    chunk.get(adj[0] as i32, adj[1] as i32, adj[2] as i32).unwrap_or(AIR)
                } else {
                    let dir = direction_for(axis, positive);
                    match snapshot.neighbor(dir) {
                        Some(neighbor) => {
                            let mut npos = pos;
                            let neighbor_extent = if axis == 1 { neighbor.height() } else { neighbor.side() };
                            npos[axis] = if positive { 0 } else { neighbor_extent - 1 };
                            neighbor.get(npos[0] as i32, npos[1] as i32, npos[2] as i32).unwrap_or(AIR)
                        }
                        None => AIR,
                    }
                };

                if adjacent_id == AIR || !table.is_opaque(adjacent_id) {
                    self.mask[v * u_len + u] = MaskCell(Some(id));
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn extract_mask(
        &mut self,
        out: &mut MeshArrays,
        table: &VoxelTypeTable,
        axis: usize,
        u_axis: usize,
        v_axis: usize,
        slice: usize,
        dir: Direction,
        u_len: usize,
        v_len: usize,
    ) {
        let positive = matches!(dir, Direction::PosX | Direction::PosY | Direction::PosZ);
        let slice_coord = if positive { slice as f32 + 1.0 } else { slice as f32 };

        for v in 0..v_len {
            let mut u = 0;
            while u < u_len {
                let cell = self.mask[v * u_len + u];
                let Some(id) = cell.0 else {
                    u += 1;
                    continue;
                };

                let mut width = 1;
                while u + width < u_len && self.mask[v * u_len + u + width] == cell {
                    width += 1;
                }

                let mut extent_v = 1;
                'grow: while v + extent_v < v_len {
                    for du in 0..width {
                        if self.mask[(v + extent_v) * u_len + u + du] != cell {
                            break 'grow;
                        }
                    }
                    extent_v += 1;
                }

                push_quad(out, table, id, axis, u_axis, v_axis, slice_coord, u, v, width, extent_v, dir);

                for dv in 0..extent_v {
                    for du in 0..width {
                        self.mask[(v + dv) * u_len + u + du] = MaskCell::EMPTY;
                    }
                }

                u += width;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn push_quad(
    out: &mut MeshArrays,
    table: &VoxelTypeTable,
    id: VoxelId,
    axis: usize,
    u_axis: usize,
    v_axis: usize,
    slice_coord: f32,
    u0: usize,
    v0: usize,
    width: usize,
    extent_v: usize,
    dir: Direction,
) {
    let corner = |du: f32, dv: f32| -> Vec3 {
        let mut p = [0.0f32; 3];
        p[axis] = slice_coord;
        p[u_axis] = u0 as f32 + du;
        p[v_axis] = v0 as f32 + dv;
        Vec3::new(p[0], p[1], p[2])
    };

    let c0 = corner(0.0, 0.0);
    let c1 = corner(width as f32, 0.0);
    let c2 = corner(width as f32, extent_v as f32);
    let c3 = corner(0.0, extent_v as f32);

    let desired_normal = normal_vector(dir);
    let face_normal = (c1 - c0).cross(c3 - c0);
    let (corners, uvs) = if face_normal.dot(desired_normal) >= 0.0 {
        ([c0, c1, c2, c3], [[0.0, 0.0], [width as f32, 0.0], [width as f32, extent_v as f32], [0.0, extent_v as f32]])
    } else {
        ([c0, c3, c2, c1], [[0.0, 0.0], [0.0, extent_v as f32], [width as f32, extent_v as f32], [width as f32, 0.0]])
    };

    let color = shade(table.color_of(id), shading_factor(dir));
    let base = u32::try_from(out.positions.len()).unwrap_or(u32::MAX);

    for (corner, uv) in corners.into_iter().zip(uvs) {
        out.positions.push(corner);
        out.normals.push(desired_normal);
        out.uvs.push(uv);
        out.colors.push(color);
    }

    out.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxen_core::Properties;
    use voxen_store::{ChunkCoord, VoxelStore};

    fn opaque_table() -> VoxelTypeTable {
        VoxelTypeTable::builder()
            .register(1, Properties { name: "stone", color: Rgba::rgb(200, 200, 200), opaque: true, solid: true, emissive: false, hardness: 1 })
            .build()
    }

    #[test]
    fn empty_chunk_produces_no_mesh() {
        let chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        let mut mesher = GreedyMesher::new();
        let table = opaque_table();
        let mesh = mesher.mesh(&NeighborhoodSnapshot::new(&chunk, [None; 6]), &table);
        assert!(mesh.is_empty());
    }

    #[test]
    fn single_solid_cell_in_isolated_chunk_produces_six_quads() {
        let mut chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        chunk.set(0, 0, 0, 1).unwrap();
        let mut mesher = GreedyMesher::new();
        let table = opaque_table();
        let mesh = mesher.mesh(&NeighborhoodSnapshot::new(&chunk, [None; 6]), &table);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn fully_filled_chunk_has_only_outward_faces() {
        let mut chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        chunk.install_store(VoxelStore::dense_filled(chunk.side(), chunk.height(), 1));
        let mut mesher = GreedyMesher::new();
        let table = opaque_table();
        let mesh = mesher.mesh(&NeighborhoodSnapshot::new(&chunk, [None; 6]), &table);
        // Every outward face is one greedy quad per direction: 6 quads, 24 verts.
        assert_eq!(mesh.vertex_count(), 24);
    }

    #[test]
    fn shared_opaque_face_between_full_neighbors_is_culled() {
        let side = 16;
        let height = 16;
        let mut a = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        a.install_store(VoxelStore::dense_filled(side, height, 1));
        let mut b = Chunk::new_empty(ChunkCoord::new(1, 0, 0));
        b.install_store(VoxelStore::dense_filled(side, height, 1));

        let mut neighbors = [None; 6];
        neighbors[direction_index(Direction::PosX)] = Some(&b);
        let mut mesher = GreedyMesher::new();
        let table = opaque_table();
        let mesh = mesher.mesh(&NeighborhoodSnapshot::new(&a, neighbors), &table);
        // 5 outward faces remain (shared +X face culled), each one quad.
        assert_eq!(mesh.vertex_count(), 20);
    }

    #[test]
    fn meshing_is_deterministic() {
        let mut chunk = Chunk::new_empty(ChunkCoord::new(0, 0, 0));
        chunk.set(0, 0, 0, 1).unwrap();
        chunk.set(1, 0, 0, 1).unwrap();
        let table = opaque_table();

        let mesh_a = GreedyMesher::new().mesh(&NeighborhoodSnapshot::new(&chunk, [None; 6]), &table);
        let mesh_b = GreedyMesher::new().mesh(&NeighborhoodSnapshot::new(&chunk, [None; 6]), &table);
        assert_eq!(mesh_a, mesh_b);
    }
}
