//! `VoxelWorld`: the public-facing engine that owns every active chunk,
//! streams them in and out around an observer, and routes work through the
//! worker pool, the region batcher, and the occlusion culler.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use voxen_core::{Pool, PoolHandle, Vec3, VoxelId, VoxelResult, VoxelTypeTable};
use voxen_store::{CacheKey, Chunk, ChunkCache, ChunkCoord, ChunkState, Direction, TerrainSource, VoxelStore};

use crate::job::{ChunkSnapshot, Completion, JobId, JobKind, JobOutput, WorkerPool};
use crate::occlusion::{OcclusionConfig, OcclusionCuller, OcclusionMode};
use crate::region::{Region, RegionCoord};

/// How the observer moves before the streaming set is recomputed, in world
/// units.
const UPDATE_THRESHOLD: f32 = 8.0;
/// Chunk-mesh completions applied per tick.
const MAX_MESH_COMPLETIONS_PER_TICK: usize = 8;
/// Region-combine completions applied per tick.
const MAX_REGION_COMPLETIONS_PER_TICK: usize = 2;
/// How many completions to pull off the worker pool's channel per tick,
/// before sorting into the per-kind budgets above. Generous relative to the
/// per-kind caps so a tick never starves the completion queue.
const DRAIN_BATCH_SIZE: usize = 64;

/// Configuration for a [`VoxelWorld`].
#[derive(Clone, Copy, Debug)]
pub struct VoxelWorldConfig {
    /// Horizontal streaming radius, in chunks.
    pub render_distance_horizontal: i32,
    /// Vertical streaming radius, in chunks.
    pub render_distance_vertical: i32,
    /// Worker thread count. `0` spawns no worker and submitted jobs sit
    /// pending forever — only useful for tests that inspect submit-time
    /// queue state and never call [`VoxelWorld::tick`].
    pub worker_thread_count: usize,
    /// Seed passed to the terrain source and used as the chunk cache's key
    /// namespace.
    pub world_seed: u64,
    /// Chunks per region edge. Informational — region grouping itself uses
    /// the fixed [`crate::region::REGION_SIZE`]; this field exists so config
    /// round-trips the value the embedding asked for and [`VoxelWorld::new`]
    /// can warn if it disagrees.
    pub region_size: i32,
    /// New terrain generations initiated per tick.
    pub max_chunks_per_frame: usize,
    /// Occlusion culling strategy.
    pub occlusion_mode: OcclusionMode,
}

impl Default for VoxelWorldConfig {
    fn default() -> Self {
        Self {
            render_distance_horizontal: 8,
            render_distance_vertical: 4,
            worker_thread_count: 4,
            world_seed: 0,
            region_size: crate::region::REGION_SIZE,
            max_chunks_per_frame: 4,
            occlusion_mode: OcclusionMode::FloodFill,
        }
    }
}

/// A snapshot of engine-internal counters, exposed to the embedding for
/// diagnostics and tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldStats {
    /// Chunks currently tracked in the active map.
    pub active_chunks: usize,
    /// Chunks sitting idle in the object pool.
    pub pooled_chunks: usize,
    /// Regions currently tracked (including empty ones awaiting cleanup).
    pub regions: usize,
    /// Jobs waiting to start.
    pub pending_jobs: usize,
    /// Total completions applied over the world's lifetime.
    pub completed_jobs: u64,
    /// Active chunks the occlusion culler currently reports hidden.
    pub occlusion_hidden: usize,
    /// Fraction of cache lookups for new chunks that were hits, over the
    /// world's lifetime. `1.0` if no lookups have happened yet.
    pub cache_hit_rate: f32,
}

struct InFlightGeneration {
    id: JobId,
    cancelled: Arc<AtomicBool>,
}

struct InFlightMesh {
    id: JobId,
    cancelled: Arc<AtomicBool>,
}

/// Owns every active chunk, streams them around an observer position, and
/// routes generation/mesh/combine work through a [`WorkerPool`].
pub struct VoxelWorld {
    config: VoxelWorldConfig,
    table: Arc<VoxelTypeTable>,
    cache: Arc<dyn ChunkCache + Send + Sync>,
    workers: WorkerPool,
    occlusion: OcclusionCuller,

    active_chunks: HashMap<ChunkCoord, PoolHandle>,
    chunk_pool: Pool<Chunk>,
    regions: HashMap<RegionCoord, Region>,
    region_combine_inflight: HashSet<RegionCoord>,

    generating: HashMap<ChunkCoord, InFlightGeneration>,
    meshing: HashMap<ChunkCoord, InFlightMesh>,

    /// Mesh completions pulled off the worker channel but not yet applied,
    /// because more finished this tick than `MAX_MESH_COMPLETIONS_PER_TICK`
    /// allows. Carried over and applied first next tick, so nothing is ever
    /// silently discarded.
    mesh_backlog: VecDeque<Completion>,
    /// Same as `mesh_backlog`, for region-combine completions.
    region_backlog: VecDeque<Completion>,

    observer_pos: Vec3,
    last_streamed_pos: Option<Vec3>,
    /// The last computed needed set, recomputed only when the observer moves
    /// far enough. Loading still drains this every tick regardless of
    /// movement, so an initial load larger than `max_chunks_per_frame`
    /// finishes over several ticks instead of stalling at the first budget.
    needed_set: HashSet<ChunkCoord>,

    completed_jobs_total: u64,
    cache_lookups: u64,
    cache_hits: u64,
}

impl VoxelWorld {
    /// Creates a new world. No chunks are loaded until the first
    /// [`VoxelWorld::tick`] after [`VoxelWorld::set_observer_position`].
    #[must_use]
    pub fn new(
        config: VoxelWorldConfig,
        table: Arc<VoxelTypeTable>,
        terrain: Arc<dyn TerrainSource>,
        cache: Arc<dyn ChunkCache + Send + Sync>,
    ) -> Self {
        if config.region_size != crate::region::REGION_SIZE {
            tracing::warn!(
                configured = config.region_size,
                actual = crate::region::REGION_SIZE,
                "region_size in config does not match the engine's fixed region size; the fixed size wins"
            );
        }

        let workers = WorkerPool::new(config.worker_thread_count, Arc::clone(&table), terrain);

        let occlusion = OcclusionCuller::new(
            config.occlusion_mode,
            OcclusionConfig::default(),
        );

        let pool_capacity = streaming_set_capacity(config.render_distance_horizontal, config.render_distance_vertical);

        Self {
            config,
            table,
            cache,
            workers,
            occlusion,
            active_chunks: HashMap::new(),
            chunk_pool: Pool::new(pool_capacity),
            regions: HashMap::new(),
            region_combine_inflight: HashSet::new(),
            generating: HashMap::new(),
            meshing: HashMap::new(),
            mesh_backlog: VecDeque::new(),
            region_backlog: VecDeque::new(),
            observer_pos: Vec3::ZERO,
            last_streamed_pos: None,
            needed_set: HashSet::new(),
            completed_jobs_total: 0,
            cache_lookups: 0,
            cache_hits: 0,
        }
    }

    /// Updates the observer's world-space position. Streaming happens on
    /// the next [`VoxelWorld::tick`] once the observer has moved far enough.
    pub fn set_observer_position(&mut self, pos: Vec3) {
        self.observer_pos = pos;
    }

    /// Reads the voxel at a world-space position.
    ///
    /// # Errors
    ///
    /// Returns [`voxen_core::VoxelError::Unloaded`] if the containing chunk
    /// is not currently active.
    pub fn get_voxel(&self, world_pos: (i32, i32, i32)) -> VoxelResult<VoxelId> {
        let (coord, local) = ChunkCoord::from_world_pos(world_pos.0, world_pos.1, world_pos.2);
        let handle = self.active_chunks.get(&coord).copied().ok_or(voxen_core::VoxelError::Unloaded)?;
        let chunk = self.chunk_pool.get(handle).ok_or(voxen_core::VoxelError::Unloaded)?;
        chunk.get(local.0, local.1, local.2)
    }

    /// Writes a voxel at a world-space position, marking the owning chunk
    /// (and any neighbor sharing the touched face) mesh-dirty and enqueuing
    /// a re-mesh.
    ///
    /// # Errors
    ///
    /// Returns [`voxen_core::VoxelError::Unloaded`] if the containing chunk
    /// is not currently active.
    pub fn set_voxel(&mut self, world_pos: (i32, i32, i32), id: VoxelId) -> VoxelResult<()> {
        let (coord, local) = ChunkCoord::from_world_pos(world_pos.0, world_pos.1, world_pos.2);
        let handle = self.active_chunks.get(&coord).copied().ok_or(voxen_core::VoxelError::Unloaded)?;

        let side = self.chunk_pool.get(handle).ok_or(voxen_core::VoxelError::Unloaded)?.side();
        let height = self.chunk_pool.get(handle).ok_or(voxen_core::VoxelError::Unloaded)?.height();
        let on_boundary = [
            (Direction::NegX, local.0 == 0),
            (Direction::PosX, local.0 as usize == side - 1),
            (Direction::NegY, local.1 == 0),
            (Direction::PosY, local.1 as usize == height - 1),
            (Direction::NegZ, local.2 == 0),
            (Direction::PosZ, local.2 as usize == side - 1),
        ];

        let chunk = self.chunk_pool.get_mut(handle).ok_or(voxen_core::VoxelError::Unloaded)?;
        chunk.set(local.0, local.1, local.2, id)?;
        self.occlusion.mark_dirty();

        self.enqueue_mesh_job(coord);
        for (dir, touches) in on_boundary {
            if touches {
                self.enqueue_mesh_job(coord.neighbor(dir));
            }
        }
        Ok(())
    }

    /// Drops every active chunk back to the pool and clears all regions,
    /// without touching the cache. The next tick re-streams from scratch.
    pub fn clear(&mut self) {
        let coords: Vec<ChunkCoord> = self.active_chunks.keys().copied().collect();
        for coord in coords {
            self.unload(coord);
        }
        self.regions.clear();
        self.generating.clear();
        self.meshing.clear();
        self.mesh_backlog.clear();
        self.region_backlog.clear();
        self.last_streamed_pos = None;
        self.needed_set.clear();
        self.occlusion.mark_dirty();
    }

    /// Clears this seed's persisted chunks and every active chunk, forcing
    /// full regeneration from the terrain source on the next stream.
    pub fn regenerate(&mut self) {
        self.clear();
        if let Err(err) = self.cache.clear_seed(self.config.world_seed) {
            tracing::warn!(%err, "failed to clear cache for regenerate()");
        }
    }

    /// A snapshot of current engine counters.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            active_chunks: self.active_chunks.len(),
            pooled_chunks: self.chunk_pool.pooled_count(),
            regions: self.regions.len(),
            pending_jobs: self.workers.pending_count(),
            completed_jobs: self.completed_jobs_total,
            occlusion_hidden: self.active_chunks.len().saturating_sub(self.occlusion.visible_count()),
            cache_hit_rate: if self.cache_lookups == 0 {
                1.0
            } else {
                self.cache_hits as f32 / self.cache_lookups as f32
            },
        }
    }

    /// For each visible region, yields its world-space origin and combined
    /// mesh. Consumption is non-blocking; callers must not mutate the
    /// returned arrays.
    pub fn iter_visible_region_meshes(&self) -> impl Iterator<Item = (Vec3, &voxen_store::MeshArrays)> {
        let (observer_chunk, _) =
            ChunkCoord::from_world_pos(self.observer_pos.x as i32, self.observer_pos.y as i32, self.observer_pos.z as i32);

        self.regions.values().filter_map(move |region| {
            if region.combined().is_empty() {
                return None;
            }
            let anchor = region.coord().anchor_chunk();
            let any_member_visible = region_member_coords(region.coord()).any(|c| self.occlusion.is_visible(c));
            if !any_member_visible && anchor != observer_chunk {
                return None;
            }
            Some((region.coord().world_origin(), region.combined()))
        })
    }

    /// Advances one frame: streams chunks around the observer, drains
    /// bounded completions, refreshes occlusion, and schedules region
    /// combines.
    pub fn tick(&mut self) {
        self.stream_chunks();
        self.drain_completions();
        self.refresh_occlusion();
        self.schedule_region_combines();
    }

    fn stream_chunks(&mut self) {
        let moved_far_enough = match self.last_streamed_pos {
            None => true,
            Some(last) => last.distance_squared(self.observer_pos) >= UPDATE_THRESHOLD * UPDATE_THRESHOLD,
        };

        let (observer_chunk, _) =
            ChunkCoord::from_world_pos(self.observer_pos.x as i32, self.observer_pos.y as i32, self.observer_pos.z as i32);

        if moved_far_enough {
            self.last_streamed_pos = Some(self.observer_pos);
            self.needed_set =
                needed_set(observer_chunk, self.config.render_distance_horizontal, self.config.render_distance_vertical);

            let gone: Vec<ChunkCoord> = self.active_chunks.keys().copied().filter(|c| !self.needed_set.contains(c)).collect();
            for coord in gone {
                self.unload(coord);
            }
        }

        let mut new: Vec<ChunkCoord> =
            self.needed_set.iter().copied().filter(|c| !self.active_chunks.contains_key(c)).collect();
        new.sort_by_key(|c| manhattan(*c, observer_chunk));
        new.truncate(self.config.max_chunks_per_frame);

        for coord in new {
            self.start_loading(coord, observer_chunk);
        }
    }

    fn start_loading(&mut self, coord: ChunkCoord, observer_chunk: ChunkCoord) {
        let Some((handle, chunk)) = self.chunk_pool.acquire(|| Chunk::new_empty(coord)) else {
            tracing::warn!(?coord, "chunk pool exhausted, deferring load");
            return;
        };
        chunk.set_state(ChunkState::Pending);
        self.active_chunks.insert(coord, handle);

        self.cache_lookups += 1;
        let key = CacheKey { world_seed: self.config.world_seed, coord };
        match self.cache.get(key) {
            Ok(Some(store)) => {
                self.cache_hits += 1;
                self.install_generated(coord, store);
            }
            Ok(None) => self.submit_generation(coord, observer_chunk),
            Err(err) => {
                tracing::warn!(?coord, %err, "cache read failed, treating as miss");
                self.submit_generation(coord, observer_chunk);
            }
        }
    }

    fn submit_generation(&mut self, coord: ChunkCoord, observer_chunk: ChunkCoord) {
        let priority = priority_for(coord, observer_chunk);
        let side = usize::try_from(voxen_store::CHUNK_SIDE).unwrap_or(16);
        let height = usize::try_from(coord.height()).unwrap_or(16);
        let kind = JobKind::GenerateTerrain { coord, side, height, world_seed: self.config.world_seed };
        match self.workers.submit(kind, priority) {
            Ok((id, cancelled)) => {
                if let Some(handle) = self.active_chunks.get(&coord) {
                    if let Some(chunk) = self.chunk_pool.get_mut(*handle) {
                        chunk.set_state(ChunkState::Generating);
                    }
                }
                self.generating.insert(coord, InFlightGeneration { id, cancelled });
            }
            Err(err) => tracing::warn!(?coord, %err, "failed to submit generation job"),
        }
    }

    fn unload(&mut self, coord: ChunkCoord) {
        let Some(handle) = self.active_chunks.remove(&coord) else { return };

        if let Some(gen) = self.generating.remove(&coord) {
            gen.cancelled.store(true, Ordering::Release);
        }
        if let Some(mesh) = self.meshing.remove(&coord) {
            mesh.cancelled.store(true, Ordering::Release);
        }

        if let Some(chunk) = self.chunk_pool.get_mut(handle) {
            chunk.set_state(ChunkState::Unloading);
            if chunk.is_voxel_dirty() {
                let key = CacheKey { world_seed: self.config.world_seed, coord };
                if let Err(err) = self.cache.put(key, chunk.store()) {
                    tracing::warn!(?coord, %err, "failed to persist chunk on unload");
                } else {
                    chunk.clear_voxel_dirty();
                }
            }
        }

        self.unlink_neighbors(handle);

        let region_coord = RegionCoord::containing(coord);
        if let Some(region) = self.regions.get_mut(&region_coord) {
            region.detach(coord);
        }

        self.chunk_pool.release(handle);
        self.occlusion.mark_dirty();
    }

    fn unlink_neighbors(&mut self, handle: PoolHandle) {
        let neighbor_handles: Vec<(Direction, PoolHandle)> = {
            let Some(chunk) = self.chunk_pool.get(handle) else { return };
            Direction::ALL.iter().filter_map(|&dir| chunk.get_neighbor(dir).map(|h| (dir, h))).collect()
        };
        for (dir, neighbor_handle) in neighbor_handles {
            if let Some(neighbor) = self.chunk_pool.get_mut(neighbor_handle) {
                neighbor.set_neighbor(dir.opposite(), None);
            }
        }
    }

    fn link_neighbors(&mut self, coord: ChunkCoord, handle: PoolHandle) {
        for dir in Direction::ALL {
            let neighbor_coord = coord.neighbor(dir);
            let Some(&neighbor_handle) = self.active_chunks.get(&neighbor_coord) else { continue };

            if let Some(neighbor) = self.chunk_pool.get_mut(neighbor_handle) {
                neighbor.set_neighbor(dir.opposite(), Some(handle));
            }
            if let Some(chunk) = self.chunk_pool.get_mut(handle) {
                chunk.set_neighbor(dir, Some(neighbor_handle));
            }
        }
    }

    fn install_generated(&mut self, coord: ChunkCoord, store: VoxelStore) {
        let Some(&handle) = self.active_chunks.get(&coord) else { return };
        if let Some(chunk) = self.chunk_pool.get_mut(handle) {
            chunk.install_store(store);
            chunk.clear_voxel_dirty();
            chunk.set_state(ChunkState::Meshing);
        }
        self.link_neighbors(coord, handle);
        self.enqueue_mesh_job(coord);

        for dir in Direction::ALL {
            let neighbor_coord = coord.neighbor(dir);
            if self.active_chunks.contains_key(&neighbor_coord) {
                self.enqueue_mesh_job(neighbor_coord);
            }
        }
    }

    fn enqueue_mesh_job(&mut self, coord: ChunkCoord) {
        let Some(&handle) = self.active_chunks.get(&coord) else { return };

        if let Some(existing) = self.meshing.remove(&coord) {
            existing.cancelled.store(true, Ordering::Release);
        }

        let neighbor_handles: [Option<PoolHandle>; 6] = {
            let Some(chunk) = self.chunk_pool.get(handle) else { return };
            std::array::from_fn(|i| chunk.get_neighbor(Direction::ALL[i]))
        };

        let Some(target_store) = self.chunk_pool.get(handle).map(|chunk| chunk.store().clone()) else { return };
        let target = ChunkSnapshot { coord, store: target_store };
        let neighbor_snapshots: [Option<ChunkSnapshot>; 6] = std::array::from_fn(|i| {
            neighbor_handles[i]
                .and_then(|h| self.chunk_pool.get(h))
                .map(|n| ChunkSnapshot { coord: n.coord(), store: n.store().clone() })
        });

        let (observer_chunk, _) =
            ChunkCoord::from_world_pos(self.observer_pos.x as i32, self.observer_pos.y as i32, self.observer_pos.z as i32);
        let priority = priority_for(coord, observer_chunk);
        let kind = JobKind::BuildChunkMesh { target, neighbors: neighbor_snapshots };

        match self.workers.submit(kind, priority) {
            Ok((id, cancelled)) => {
                if let Some(chunk) = self.chunk_pool.get_mut(handle) {
                    chunk.set_state(ChunkState::Meshing);
                }
                self.meshing.insert(coord, InFlightMesh { id, cancelled });
            }
            Err(err) => tracing::warn!(?coord, %err, "failed to submit mesh job"),
        }
    }

    fn drain_completions(&mut self) {
        let drained = self.workers.drain_completed(DRAIN_BATCH_SIZE);

        for completion in drained {
            match completion.output {
                JobOutput::Terrain { .. } => self.apply_completion(completion),
                JobOutput::ChunkMesh { .. } => self.mesh_backlog.push_back(completion),
                JobOutput::RegionMesh { .. } | JobOutput::NothingToBuild { .. } => {
                    self.region_backlog.push_back(completion);
                }
            }
        }

        // Anything beyond the per-kind cap stays queued in the backlog and
        // is applied first next tick — never dropped.
        for _ in 0..MAX_MESH_COMPLETIONS_PER_TICK {
            let Some(completion) = self.mesh_backlog.pop_front() else { break };
            self.apply_completion(completion);
        }
        for _ in 0..MAX_REGION_COMPLETIONS_PER_TICK {
            let Some(completion) = self.region_backlog.pop_front() else { break };
            self.apply_completion(completion);
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        self.completed_jobs_total += 1;
        match completion.output {
            JobOutput::Terrain { coord, store } => self.apply_terrain_completion(coord, completion.id, store),
            JobOutput::ChunkMesh { coord, mesh } => self.apply_mesh_completion(coord, completion.id, mesh),
            JobOutput::RegionMesh { region, mesh } => self.apply_region_completion(region, Some(mesh)),
            JobOutput::NothingToBuild { region } => self.apply_region_completion(region, None),
        }
    }

    fn apply_terrain_completion(&mut self, coord: ChunkCoord, id: JobId, store: VoxelStore) {
        let Some(gen) = self.generating.get(&coord) else { return };
        if gen.id != id {
            return;
        }
        self.generating.remove(&coord);
        self.install_generated(coord, store);
    }

    fn apply_mesh_completion(&mut self, coord: ChunkCoord, id: JobId, mesh: voxen_store::MeshArrays) {
        let Some(inflight) = self.meshing.get(&coord) else { return };
        if inflight.id != id {
            return;
        }
        self.meshing.remove(&coord);

        let Some(&handle) = self.active_chunks.get(&coord) else { return };
        if let Some(chunk) = self.chunk_pool.get_mut(handle) {
            chunk.set_cached_mesh(mesh);
            chunk.clear_mesh_dirty();
            chunk.set_state(ChunkState::Active);
        }

        let region_coord = RegionCoord::containing(coord);
        let region = self.regions.entry(region_coord).or_insert_with(|| Region::new(region_coord));
        region.attach(coord, handle);
        region.notify_chunk_meshed(coord);
        self.occlusion.mark_dirty();
    }

    fn apply_region_completion(&mut self, region_coord: RegionCoord, mesh: Option<voxen_store::MeshArrays>) {
        self.region_combine_inflight.remove(&region_coord);
        let Some(mesh) = mesh else { return };
        if let Some(region) = self.regions.get_mut(&region_coord) {
            region.apply_from_worker(mesh);
        }
    }

    fn refresh_occlusion(&mut self) {
        let (observer_chunk, _) =
            ChunkCoord::from_world_pos(self.observer_pos.x as i32, self.observer_pos.y as i32, self.observer_pos.z as i32);
        let active = self.active_chunks.keys().copied().collect::<Vec<_>>();
        let pool = &self.chunk_pool;
        let active_chunks = &self.active_chunks;
        self.occlusion.tick(
            observer_chunk,
            active.into_iter(),
            |c| active_chunks.get(&c).and_then(|&h| pool.get(h)),
            &self.table,
        );
    }

    fn schedule_region_combines(&mut self) {
        let (observer_chunk, _) =
            ChunkCoord::from_world_pos(self.observer_pos.x as i32, self.observer_pos.y as i32, self.observer_pos.z as i32);

        let mut dirty: Vec<RegionCoord> = self
            .regions
            .iter()
            .filter(|(coord, region)| region.is_dirty() && !self.region_combine_inflight.contains(coord))
            .map(|(&coord, _)| coord)
            .collect();
        dirty.sort_by_key(|r| manhattan(r.anchor_chunk(), observer_chunk));

        for region_coord in dirty.into_iter().take(MAX_REGION_COMPLETIONS_PER_TICK) {
            let Some(region) = self.regions.get(&region_coord) else { continue };
            let Ok(members) = region.snapshot_members(&self.chunk_pool) else {
                continue; // MemberGone — leave dirty, retry next tick.
            };
            if members.is_empty() {
                continue;
            }
            let kind = JobKind::BuildRegionMesh { region: region_coord, members };
            let priority = -manhattan(region_coord.anchor_chunk(), observer_chunk) as f32;
            match self.workers.submit(kind, priority) {
                Ok(_) => {
                    self.region_combine_inflight.insert(region_coord);
                }
                Err(err) => tracing::warn!(?region_coord, %err, "failed to submit region combine job"),
            }
        }
    }
}

fn manhattan(a: ChunkCoord, b: ChunkCoord) -> i32 {
    (a.cx - b.cx).abs() + (a.cy - b.cy).abs() + (a.cz - b.cz).abs()
}

fn priority_for(coord: ChunkCoord, observer_chunk: ChunkCoord) -> f32 {
    -manhattan(coord, observer_chunk) as f32
}

fn needed_set(observer_chunk: ChunkCoord, horizontal: i32, vertical: i32) -> HashSet<ChunkCoord> {
    let mut set = HashSet::new();
    for dx in -horizontal..=horizontal {
        for dy in -vertical..=vertical {
            for dz in -horizontal..=horizontal {
                if dx.abs() + dy.abs() + dz.abs() > horizontal {
                    continue;
                }
                set.insert(ChunkCoord::new(observer_chunk.cx + dx, observer_chunk.cy + dy, observer_chunk.cz + dz));
            }
        }
    }
    set
}

fn streaming_set_capacity(horizontal: i32, vertical: i32) -> usize {
    let h = usize::try_from(horizontal.max(1)).unwrap_or(8);
    let v = usize::try_from(vertical.max(1)).unwrap_or(4);
    (2 * h + 3) * (2 * h + 3) * (2 * v + 3) * 2
}

fn region_member_coords(region: RegionCoord) -> impl Iterator<Item = ChunkCoord> {
    let anchor = region.anchor_chunk();
    (0..crate::region::REGION_SIZE).flat_map(move |dy| {
        (0..crate::region::REGION_SIZE).flat_map(move |dz| {
            (0..crate::region::REGION_SIZE).map(move |dx| ChunkCoord::new(anchor.cx + dx, anchor.cy + dy, anchor.cz + dz))
        })
    })
}
