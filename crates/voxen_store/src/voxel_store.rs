//! Per-chunk cell storage with a uniform/dense duality: a chunk that is
//! entirely one voxel type (commonly air, or a solid block of stone deep
//! underground) never allocates its full dense array.

use voxen_core::VoxelId;

/// The voxel contents of a single chunk.
///
/// Starts `Uniform` and is promoted to `Dense` on the first write that
/// introduces a second distinct id. It is never automatically demoted back
/// to `Uniform` even if a later write makes it uniform again — collapsing
/// requires an explicit [`VoxelStore::try_collapse`] call, since scanning the
/// whole dense array on every write would defeat the point of the
/// optimization.
#[derive(Clone, Debug)]
pub enum VoxelStore {
    /// Every cell holds the same id.
    Uniform(VoxelId),
    /// Cells are stored individually, row-major in (x, y, z) with x fastest.
    Dense {
        /// Flattened cell data, length `side * height * side`.
        cells: Box<[VoxelId]>,
        /// Horizontal side length.
        side: usize,
        /// Vertical extent (zone-dependent).
        height: usize,
        /// Running count of non-`AIR` cells, kept in sync with every write
        /// so [`VoxelStore::count_solid`] never rescans `cells`.
        solid_count: usize,
    },
}

fn is_solid_id(id: VoxelId) -> bool {
    id != 0
}

impl VoxelStore {
    /// Creates a uniform store.
    #[must_use]
    pub const fn uniform(id: VoxelId) -> Self {
        Self::Uniform(id)
    }

    /// Creates a dense store, every cell initialized to `fill`.
    #[must_use]
    pub fn dense_filled(side: usize, height: usize, fill: VoxelId) -> Self {
        let count = side * height * side;
        let solid_count = if is_solid_id(fill) { count } else { 0 };
        Self::Dense { cells: vec![fill; count].into_boxed_slice(), side, height, solid_count }
    }

    fn index(side: usize, height: usize, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < side && y < height && z < side);
        (y * side + z) * side + x
    }

    /// Reads the cell at local coordinates `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is out of bounds for a `Dense` store. Callers
    /// with untrusted coordinates should bounds-check against the chunk's
    /// known side/height first.
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> VoxelId {
        match self {
            Self::Uniform(id) => *id,
            Self::Dense { cells, side, height, .. } => cells[Self::index(*side, *height, x, y, z)],
        }
    }

    /// Writes the cell at local coordinates `(x, y, z)`, promoting a
    /// `Uniform` store to `Dense` if `id` differs from the uniform value.
    ///
    /// `side`/`height` are needed to size the promotion and are only used
    /// the first time a `Uniform` store is written with a differing id.
    pub fn set(&mut self, side: usize, height: usize, x: usize, y: usize, z: usize, id: VoxelId) {
        match self {
            Self::Dense { cells, side: s, height: h, solid_count } => {
                let idx = Self::index(*s, *h, x, y, z);
                let previous = cells[idx];
                if previous == id {
                    return;
                }
                if is_solid_id(previous) && !is_solid_id(id) {
                    *solid_count -= 1;
                } else if !is_solid_id(previous) && is_solid_id(id) {
                    *solid_count += 1;
                }
                cells[idx] = id;
            }
            Self::Uniform(current) => {
                if *current == id {
                    return;
                }
                let count = side * height * side;
                let mut solid_count = if is_solid_id(*current) { count } else { 0 };
                let mut cells = vec![*current; count].into_boxed_slice();
                let idx = Self::index(side, height, x, y, z);
                if is_solid_id(*current) && !is_solid_id(id) {
                    solid_count -= 1;
                } else if !is_solid_id(*current) && is_solid_id(id) {
                    solid_count += 1;
                }
                cells[idx] = id;
                *self = Self::Dense { cells, side, height, solid_count };
            }
        }
    }

    /// If every cell in a `Dense` store holds the same id, collapses it back
    /// to `Uniform` and returns `true`. No-op (returns `false`) for an
    /// already-`Uniform` store or a `Dense` store with mixed contents.
    pub fn try_collapse(&mut self) -> bool {
        let Self::Dense { cells, .. } = self else {
            return false;
        };
        let Some(&first) = cells.first() else {
            return false;
        };
        if cells.iter().all(|&c| c == first) {
            *self = Self::Uniform(first);
            true
        } else {
            false
        }
    }

    /// The uniform id, if this store is in its compact `Uniform`
    /// representation; `None` for a `Dense` store, regardless of whether its
    /// contents happen to be uniform (use [`VoxelStore::try_collapse`] first
    /// to find out).
    #[must_use]
    pub const fn is_uniform(&self) -> Option<VoxelId> {
        match self {
            Self::Uniform(id) => Some(*id),
            Self::Dense { .. } => None,
        }
    }

    /// Sets every cell to `id` and collapses the store to `Uniform`,
    /// dropping any existing `Dense` allocation.
    pub fn fill(&mut self, id: VoxelId) {
        *self = Self::Uniform(id);
    }

    /// Counts non-`AIR` cells. `Dense` stores track this incrementally on
    /// every write, so this never rescans `cells`; `Uniform` stores compute
    /// it from the given dimensions.
    #[must_use]
    pub fn count_solid(&self, side: usize, height: usize) -> usize {
        match self {
            Self::Uniform(id) => {
                if is_solid_id(*id) {
                    side * height * side
                } else {
                    0
                }
            }
            Self::Dense { solid_count, .. } => *solid_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_reads_return_constant() {
        let store = VoxelStore::uniform(5);
        assert_eq!(store.get(0, 0, 0), 5);
        assert_eq!(store.get(3, 2, 1), 5);
    }

    #[test]
    fn writing_same_value_keeps_uniform() {
        let mut store = VoxelStore::uniform(5);
        store.set(4, 4, 4, 1, 1, 1, 5);
        assert_eq!(store.is_uniform(), Some(5));
    }

    #[test]
    fn writing_different_value_promotes_to_dense() {
        let mut store = VoxelStore::uniform(5);
        store.set(4, 4, 4, 1, 1, 1, 9);
        assert_eq!(store.is_uniform(), None);
        assert_eq!(store.get(1, 1, 1), 9);
        assert_eq!(store.get(0, 0, 0), 5);
    }

    #[test]
    fn collapse_reunifies_when_all_cells_match() {
        let mut store = VoxelStore::dense_filled(2, 2, 2, 7);
        assert!(store.try_collapse());
        assert_eq!(store.is_uniform(), Some(7));
    }

    #[test]
    fn collapse_fails_on_mixed_contents() {
        let mut store = VoxelStore::dense_filled(2, 2, 2, 7);
        store.set(2, 2, 2, 0, 0, 0, 8);
        assert!(!store.try_collapse());
    }

    #[test]
    fn fill_sets_uniform_and_discards_dense_allocation() {
        let mut store = VoxelStore::dense_filled(2, 2, 2, 7);
        store.set(2, 2, 2, 0, 0, 0, 8);
        store.fill(3);
        assert_eq!(store.is_uniform(), Some(3));
        assert_eq!(store.get(1, 1, 1), 3);
    }

    #[test]
    fn count_solid_on_uniform_store() {
        let air = VoxelStore::uniform(0);
        assert_eq!(air.count_solid(4, 4), 0);

        let stone = VoxelStore::uniform(1);
        assert_eq!(stone.count_solid(4, 4), 4 * 4 * 4);
    }

    #[test]
    fn count_solid_tracks_writes_after_promotion() {
        let mut store = VoxelStore::uniform(0);
        store.set(2, 2, 2, 0, 0, 0, 1);
        assert_eq!(store.count_solid(2, 2), 1);

        store.set(2, 2, 2, 1, 0, 0, 1);
        assert_eq!(store.count_solid(2, 2), 2);

        store.set(2, 2, 2, 0, 0, 0, 0);
        assert_eq!(store.count_solid(2, 2), 1);

        // Overwriting with the same value already there must not double-count.
        store.set(2, 2, 2, 1, 0, 0, 1);
        assert_eq!(store.count_solid(2, 2), 1);
    }

    #[test]
    fn count_solid_on_dense_filled_store() {
        let store = VoxelStore::dense_filled(3, 3, 1);
        assert_eq!(store.count_solid(3, 3), 27);

        let empty = VoxelStore::dense_filled(3, 3, 0);
        assert_eq!(empty.count_solid(3, 3), 0);
    }
}
