//! Adaptive vertical zoning and chunk coordinates.
//!
//! The Y axis is split into three zones with distinct per-chunk heights.
//! A chunk's height is determined solely by which zone its vertical slot
//! falls in; chunks never straddle a zone boundary.

/// Horizontal chunk side length. Fixed at the reference value.
pub const CHUNK_SIDE: i32 = 16;

/// A vertical zone with a fixed chunk height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    /// `y < -64`, chunk height 32.
    Deep,
    /// `-64 <= y < 180`, chunk height 16.
    Dense,
    /// `y >= 180`, chunk height 64.
    Sky,
}

impl Zone {
    /// The world-y boundaries, in ascending order: (deep/dense boundary,
    /// dense/sky boundary).
    const DEEP_DENSE_BOUNDARY: i32 = -64;
    const DENSE_SKY_BOUNDARY: i32 = 180;

    /// Classifies a world-y coordinate into its zone.
    #[must_use]
    pub const fn of_world_y(world_y: i32) -> Self {
        if world_y < Self::DEEP_DENSE_BOUNDARY {
            Self::Deep
        } else if world_y < Self::DENSE_SKY_BOUNDARY {
            Self::Dense
        } else {
            Self::Sky
        }
    }

    /// The fixed chunk height (in voxels) for this zone.
    #[must_use]
    pub const fn chunk_height(self) -> i32 {
        match self {
            Self::Deep => 32,
            Self::Dense => 16,
            Self::Sky => 64,
        }
    }

    /// Number of dense-zone chunk slots, `cy` in `[0, N)`. The dense span
    /// (`DENSE_SKY_BOUNDARY - DEEP_DENSE_BOUNDARY`) is 244, not a multiple
    /// of the dense chunk height (16), so this is a ceiling division: the
    /// last slot (`cy == N - 1`) is a partial chunk shorter than the
    /// nominal dense height. Sky `cy` numbering starts right after this.
    #[must_use]
    const fn dense_chunk_count() -> i32 {
        let span = Self::DENSE_SKY_BOUNDARY - Self::DEEP_DENSE_BOUNDARY;
        let h = Self::Dense.chunk_height();
        (span + h - 1) / h
    }
}

/// A signed chunk coordinate triple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// Chunk X.
    pub cx: i32,
    /// Chunk Y (meaning depends on `cy`'s zone; see [`ChunkCoord::zone`]).
    pub cy: i32,
    /// Chunk Z.
    pub cz: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// Resolves the vertical zone this chunk's `cy` slot belongs to.
    ///
    /// Zone slots are numbered independently per zone, counting from each
    /// zone's floor: `cy = 0` is the lowest dense chunk (covering `y` in
    /// `[-64, -48)`), `cy = -1` the highest deep chunk (`[-96, -64)`), and
    /// so on. This keeps dense-zone addressing (the common case) at small
    /// `cy` values near zero.
    #[must_use]
    pub fn zone(self) -> Zone {
        let dense_chunks_below_sky = Zone::dense_chunk_count();
        if self.cy >= dense_chunks_below_sky {
            Zone::Sky
        } else if self.cy >= 0 {
            Zone::Dense
        } else {
            Zone::Deep
        }
    }

    /// Chunk height in voxels for this coordinate's zone.
    ///
    /// Almost always the zone's nominal height, except the single partial
    /// chunk straddling the end of the dense zone's span (see
    /// [`Zone::dense_chunk_count`]), which is shorter so it doesn't reach
    /// into the sky zone's `y` range.
    #[must_use]
    pub fn height(self) -> i32 {
        let zone = self.zone();
        if zone == Zone::Dense {
            let dense_chunks = Zone::dense_chunk_count();
            if self.cy == dense_chunks - 1 {
                let span = Zone::DENSE_SKY_BOUNDARY - Zone::DEEP_DENSE_BOUNDARY;
                let remainder = span - (dense_chunks - 1) * zone.chunk_height();
                if remainder != zone.chunk_height() {
                    return remainder;
                }
            }
        }
        zone.chunk_height()
    }

    /// World-space origin (minimum corner) of this chunk.
    #[must_use]
    pub fn world_origin(self) -> (i32, i32, i32) {
        let zone = self.zone();
        let dense_h = Zone::Dense.chunk_height();
        let dense_chunks_below_sky = Zone::dense_chunk_count();
        let world_y = match zone {
            Zone::Dense => Zone::DEEP_DENSE_BOUNDARY + self.cy * dense_h,
            Zone::Sky => Zone::DENSE_SKY_BOUNDARY + (self.cy - dense_chunks_below_sky) * zone.chunk_height(),
            Zone::Deep => Zone::DEEP_DENSE_BOUNDARY + self.cy * zone.chunk_height(),
        };
        (self.cx * CHUNK_SIDE, world_y, self.cz * CHUNK_SIDE)
    }

    /// Resolves world-space coordinates to the containing chunk coordinate
    /// and the local position within that chunk.
    #[must_use]
    pub fn from_world_pos(world_x: i32, world_y: i32, world_z: i32) -> (Self, (i32, i32, i32)) {
        let cx = world_x.div_euclid(CHUNK_SIDE);
        let cz = world_z.div_euclid(CHUNK_SIDE);
        let local_x = world_x.rem_euclid(CHUNK_SIDE);
        let local_z = world_z.rem_euclid(CHUNK_SIDE);

        let zone = Zone::of_world_y(world_y);
        let dense_h = Zone::Dense.chunk_height();
        let dense_chunks_below_sky = Zone::dense_chunk_count();
        let (cy, local_y) = match zone {
            Zone::Dense => {
                let rel = world_y - Zone::DEEP_DENSE_BOUNDARY;
                (rel.div_euclid(dense_h), rel.rem_euclid(dense_h))
            }
            Zone::Sky => {
                let rel = world_y - Zone::DENSE_SKY_BOUNDARY;
                (dense_chunks_below_sky + rel.div_euclid(zone.chunk_height()), rel.rem_euclid(zone.chunk_height()))
            }
            Zone::Deep => {
                let rel = world_y - Zone::DEEP_DENSE_BOUNDARY;
                (rel.div_euclid(zone.chunk_height()), rel.rem_euclid(zone.chunk_height()))
            }
        };

        (Self::new(cx, cy, cz), (local_x, local_y, local_z))
    }

    /// The chunk adjacent to this one in the given direction.
    #[must_use]
    pub fn neighbor(self, dir: Direction) -> Self {
        let (dx, dy, dz) = dir.offset();
        // Moving across a Y-zone boundary changes the chunk height, so we
        // can't just add 1 to cy in the zone-local numbering near the
        // deep/dense or dense/sky seams. Go through world coordinates to
        // stay correct there.
        if dy != 0 {
            let (ox, oy, oz) = self.world_origin();
            let probe_y = if dy > 0 { oy + self.height() } else { oy - 1 };
            let (coord, _) = Self::from_world_pos(ox, probe_y, oz);
            return coord;
        }
        Self::new(self.cx + dx, self.cy, self.cz + dz)
    }
}

/// The six axis-aligned face directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// +X
    PosX,
    /// -X
    NegX,
    /// +Y
    PosY,
    /// -Y
    NegY,
    /// +Z
    PosZ,
    /// -Z
    NegZ,
}

impl Direction {
    /// All six directions, in a fixed order.
    pub const ALL: [Self; 6] = [Self::PosX, Self::NegX, Self::PosY, Self::NegY, Self::PosZ, Self::NegZ];

    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Unit offset in chunk-coordinate space (not meaningful along Y; use
    /// [`ChunkCoord::neighbor`] for vertical moves, which must account for
    /// zone-height changes).
    #[must_use]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_classification_matches_boundaries() {
        assert_eq!(Zone::of_world_y(-65), Zone::Deep);
        assert_eq!(Zone::of_world_y(-64), Zone::Dense);
        assert_eq!(Zone::of_world_y(179), Zone::Dense);
        assert_eq!(Zone::of_world_y(180), Zone::Sky);
    }

    #[test]
    fn dense_zone_round_trip() {
        let (coord, local) = ChunkCoord::from_world_pos(5, 64, 12);
        assert_eq!(coord.zone(), Zone::Dense);
        let (ox, oy, oz) = coord.world_origin();
        assert_eq!((ox + local.0, oy + local.1, oz + local.2), (5, 64, 12));
    }

    #[test]
    fn sky_zone_round_trip() {
        let (coord, local) = ChunkCoord::from_world_pos(-3, 200, 40);
        assert_eq!(coord.zone(), Zone::Sky);
        assert_eq!(coord.height(), 64);
        let (ox, oy, oz) = coord.world_origin();
        assert_eq!((ox + local.0, oy + local.1, oz + local.2), (-3, 200, 40));
    }

    #[test]
    fn deep_zone_round_trip() {
        let (coord, local) = ChunkCoord::from_world_pos(1, -100, 1);
        assert_eq!(coord.zone(), Zone::Deep);
        assert_eq!(coord.height(), 32);
        let (ox, oy, oz) = coord.world_origin();
        assert_eq!((ox + local.0, oy + local.1, oz + local.2), (1, -100, 1));
    }

    #[test]
    fn partial_top_dense_chunk_does_not_alias_with_sky() {
        // The dense zone's span (244) isn't a multiple of its chunk height
        // (16), so the last dense slot, y in [176, 180), is a 4-tall
        // partial chunk rather than a full 16-tall one reaching into sky.
        for y in 176..180 {
            let (coord, local) = ChunkCoord::from_world_pos(0, y, 0);
            assert_eq!(coord.zone(), Zone::Dense, "y={y}");
            assert_eq!(coord.height(), 4, "y={y}");
            let (_, oy, _) = coord.world_origin();
            assert_eq!(oy + local.1, y, "y={y}");
        }

        let (sky_coord, _) = ChunkCoord::from_world_pos(0, 180, 0);
        assert_eq!(sky_coord.zone(), Zone::Sky);
        let (partial_coord, _) = ChunkCoord::from_world_pos(0, 176, 0);
        assert_ne!(sky_coord, partial_coord);
    }

    #[test]
    fn vertical_neighbors_cross_zone_boundary_correctly() {
        // Highest dense chunk's +Y neighbor must be the lowest sky chunk.
        let (top_dense, _) = ChunkCoord::from_world_pos(0, 179, 0);
        let above = top_dense.neighbor(Direction::PosY);
        assert_eq!(above.zone(), Zone::Sky);
        let (expected, _) = ChunkCoord::from_world_pos(0, 180, 0);
        assert_eq!(above, expected);
    }

    #[test]
    fn horizontal_neighbor_offsets() {
        let coord = ChunkCoord::new(0, 0, 0);
        assert_eq!(coord.neighbor(Direction::PosX), ChunkCoord::new(1, 0, 0));
        assert_eq!(coord.neighbor(Direction::NegZ), ChunkCoord::new(0, 0, -1));
    }

    #[test]
    fn direction_opposite_is_involutive() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
        }
    }
}
