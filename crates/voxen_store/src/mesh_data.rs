//! The output shape shared by the mesher, the cached per-chunk mesh, and the
//! region combiner: five parallel arrays plus an index list.

use voxen_core::{Rgba, Vec3};

/// GPU-ready triangle-list arrays for a chunk or a combined region.
///
/// All arrays are indexed in lockstep: `positions[i]`, `normals[i]`,
/// `uvs[i]`, `colors[i]` describe vertex `i`. `indices` lists triangles as
/// flat vertex-index triples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshArrays {
    /// Vertex positions, chunk-local unless already offset by a region.
    pub positions: Vec<Vec3>,
    /// Per-vertex face normals.
    pub normals: Vec<Vec3>,
    /// Per-vertex texture coordinates.
    pub uvs: Vec<[f32; 2]>,
    /// Per-vertex colors (fallback shading path).
    pub colors: Vec<Rgba>,
    /// Flat triangle index list, three per triangle.
    pub indices: Vec<u32>,
}

impl MeshArrays {
    /// An empty mesh bundle — zero vertices, zero triangles.
    #[must_use]
    pub const fn empty() -> Self {
        Self { positions: Vec::new(), normals: Vec::new(), uvs: Vec::new(), colors: Vec::new(), indices: Vec::new() }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether this bundle has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends `other`'s geometry, offsetting its vertex positions by
    /// `offset` and its indices by this bundle's current vertex count.
    ///
    /// Used by the region combiner to fold a child chunk's cached mesh into
    /// the region's running combined mesh.
    pub fn append_offset(&mut self, other: &Self, offset: Vec3) {
        let base = u32::try_from(self.positions.len()).unwrap_or(u32::MAX);
        self.positions.extend(other.positions.iter().map(|&p| p + offset));
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.colors.extend_from_slice(&other.colors);
        self.indices.extend(other.indices.iter().map(|&i| i + base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_has_no_vertices_or_triangles() {
        let mesh = MeshArrays::empty();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn append_offset_shifts_positions_and_rebases_indices() {
        let mut combined = MeshArrays::empty();
        combined.positions.push(Vec3::new(0.0, 0.0, 0.0));
        combined.indices.push(0);

        let mut child = MeshArrays::empty();
        child.positions.push(Vec3::new(1.0, 0.0, 0.0));
        child.normals.push(Vec3::new(0.0, 1.0, 0.0));
        child.uvs.push([0.0, 0.0]);
        child.colors.push(Rgba::rgb(255, 255, 255));
        child.indices.push(0);

        combined.append_offset(&child, Vec3::new(16.0, 0.0, 0.0));

        assert_eq!(combined.positions[1], Vec3::new(17.0, 0.0, 0.0));
        assert_eq!(combined.indices, vec![0, 1]);
    }
}
