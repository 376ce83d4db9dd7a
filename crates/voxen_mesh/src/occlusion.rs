//! The occlusion culler: a flood-fill visibility estimate over the active
//! chunk graph, amortized across frames.

use std::collections::{HashSet, VecDeque};

use voxen_core::VoxelTypeTable;
use voxen_store::{Chunk, ChunkCoord, Direction};

/// Which visibility strategy the culler runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OcclusionMode {
    /// Every active chunk is considered visible.
    Disabled,
    /// Debug-only straight-line visibility, not implemented here — the
    /// manager should treat this the same as `Disabled` unless a debug
    /// renderer supplies its own raycast.
    Raycast,
    /// Flood-fill from the observer's chunk through non-opaque-sealed faces.
    FloodFill,
}

/// How far (Manhattan distance, in chunks) and how often the visibility
/// graph is allowed to spread and rebuild.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OcclusionConfig {
    /// Flood-fill search radius, in chunks, from the observer's chunk.
    pub manhattan_radius: i32,
    /// Minimum number of manager ticks between graph rebuilds, unless the
    /// observer's chunk changes (which always forces a refresh).
    pub rebuild_graph_interval: u32,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self { manhattan_radius: 16, rebuild_graph_interval: 30 }
    }
}

/// Flood-fills the active-chunk adjacency graph from an observer position to
/// estimate which chunks are visible.
///
/// The visible set is a conservative superset of true visibility: chunks
/// with no non-opaque path to the observer are excluded, but nothing here
/// ever excludes a chunk that could genuinely be seen.
pub struct OcclusionCuller {
    mode: OcclusionMode,
    config: OcclusionConfig,
    visible: HashSet<ChunkCoord>,
    dirty: bool,
    ticks_since_rebuild: u32,
    last_observer_chunk: Option<ChunkCoord>,
}

impl OcclusionCuller {
    /// Creates a culler in the given mode with the given config. Starts
    /// dirty so the first tick always computes a visible set.
    #[must_use]
    pub fn new(mode: OcclusionMode, config: OcclusionConfig) -> Self {
        Self { mode, config, visible: HashSet::new(), dirty: true, ticks_since_rebuild: 0, last_observer_chunk: None }
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> OcclusionMode {
        self.mode
    }

    /// Changes the active mode. Marks the graph dirty.
    pub fn set_mode(&mut self, mode: OcclusionMode) {
        self.mode = mode;
        self.dirty = true;
    }

    /// Marks the visibility graph dirty, forcing a rebuild on the next
    /// `tick` regardless of the amortization interval. Call after any chunk
    /// load, unload, or opacity-affecting edit.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether `coord` is in the current visible set. With `Disabled` or
    /// `Raycast`, every coordinate is treated as visible.
    #[must_use]
    pub fn is_visible(&self, coord: ChunkCoord) -> bool {
        match self.mode {
            OcclusionMode::Disabled | OcclusionMode::Raycast => true,
            OcclusionMode::FloodFill => self.visible.contains(&coord),
        }
    }

    /// Number of chunks currently marked hidden, for diagnostics (`stats()`
    /// at the manager layer counts `active_chunks.len() - visible.len()`
    /// when in `FloodFill` mode).
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Advances one manager tick. Rebuilds the visible set if: the observer
    /// moved to a new chunk, or the graph is dirty and the amortization
    /// interval has elapsed. `lookup` resolves a coordinate to its active
    /// chunk, when present.
    pub fn tick<'a>(
        &mut self,
        observer_chunk: ChunkCoord,
        active: impl Iterator<Item = ChunkCoord>,
        lookup: impl Fn(ChunkCoord) -> Option<&'a Chunk>,
        table: &VoxelTypeTable,
    ) {
        self.ticks_since_rebuild += 1;

        let observer_changed = self.last_observer_chunk != Some(observer_chunk);
        self.last_observer_chunk = Some(observer_chunk);

        if self.mode != OcclusionMode::FloodFill {
            return;
        }

        let interval_elapsed = self.ticks_since_rebuild >= self.config.rebuild_graph_interval;
        if !(observer_changed || (self.dirty && interval_elapsed)) {
            return;
        }

        self.visible = flood_fill(observer_chunk, active, lookup, table, self.config.manhattan_radius);
        self.dirty = false;
        self.ticks_since_rebuild = 0;
    }
}

fn manhattan(a: ChunkCoord, b: ChunkCoord) -> i32 {
    (a.cx - b.cx).abs() + (a.cy - b.cy).abs() + (a.cz - b.cz).abs()
}

fn flood_fill<'a>(
    observer: ChunkCoord,
    active: impl Iterator<Item = ChunkCoord>,
    lookup: impl Fn(ChunkCoord) -> Option<&'a Chunk>,
    table: &VoxelTypeTable,
    radius: i32,
) -> HashSet<ChunkCoord> {
    let active_set: HashSet<ChunkCoord> = active.collect();
    let mut visited = HashSet::new();
    if !active_set.contains(&observer) {
        return visited;
    }

    let mut queue = VecDeque::new();
    visited.insert(observer);
    queue.push_back(observer);

    while let Some(current) = queue.pop_front() {
        if manhattan(current, observer) >= radius {
            continue;
        }
        let Some(current_chunk) = lookup(current) else { continue };

        for dir in Direction::ALL {
            let next = current.neighbor(dir);
            if visited.contains(&next) || !active_set.contains(&next) {
                continue;
            }
            let passable = match lookup(next) {
                Some(next_chunk) => !current_chunk.is_fully_opaque(table) || !next_chunk.is_fully_opaque(table),
                None => true,
            };
            if passable {
                visited.insert(next);
                queue.push_back(next);
            }
        }
    }

    visited
}
