//! The priority job pool: N worker threads draining a single
//! priority-ordered queue of generate/mesh/combine jobs.
//!
//! Uses `crossbeam-channel` for the completion queue and `parking_lot` for
//! the pending-queue lock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use voxen_core::{Vec3, VoxelTypeTable};
use voxen_store::{ChunkCoord, MeshArrays, TerrainSource, VoxelStore};

use crate::greedy_mesh::{GreedyMesher, NeighborhoodSnapshot};
use crate::region::RegionCoord;

/// A unique id for a submitted job, used to cancel or coalesce it later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobId(u64);

/// An owned copy of one chunk's coordinate and voxel data, captured at
/// enqueue time so a worker never dereferences a live chunk.
#[derive(Clone, Debug)]
pub struct ChunkSnapshot {
    /// The chunk's coordinate.
    pub coord: ChunkCoord,
    /// The chunk's voxel data at the moment of capture.
    pub store: VoxelStore,
}

/// One region member's contribution to a region-combine job: its cached
/// mesh arrays and its offset from the region's origin.
#[derive(Clone, Debug)]
pub struct RegionMemberSnapshot {
    /// The member chunk's coordinate, for diagnostics.
    pub coord: ChunkCoord,
    /// The member's last-built mesh arrays.
    pub mesh: MeshArrays,
    /// World-space offset of this chunk's origin from the region's origin.
    pub offset: Vec3,
}

/// The work a job performs. All inputs are owned/cloned at construction
/// time — the snapshot rule.
pub enum JobKind {
    /// Generate terrain for a chunk coordinate.
    GenerateTerrain {
        /// Target coordinate.
        coord: ChunkCoord,
        /// Horizontal side length to generate.
        side: usize,
        /// Vertical extent to generate.
        height: usize,
        /// The world seed to generate under.
        world_seed: u64,
    },
    /// Mesh a chunk given its own and its neighbors' snapshots.
    BuildChunkMesh {
        /// The chunk being meshed.
        target: ChunkSnapshot,
        /// Its six neighbors, in `Direction` order, any of which may be
        /// absent.
        neighbors: [Option<ChunkSnapshot>; 6],
    },
    /// Combine region members' cached meshes into one buffer.
    BuildRegionMesh {
        /// The region being combined.
        region: RegionCoord,
        /// Snapshots of every currently attached member.
        members: Vec<RegionMemberSnapshot>,
    },
}

/// The outcome of a completed job.
pub enum JobOutput {
    /// `GenerateTerrain` succeeded.
    Terrain {
        /// The coordinate that was generated.
        coord: ChunkCoord,
        /// The produced voxel data.
        store: VoxelStore,
    },
    /// `BuildChunkMesh` succeeded.
    ChunkMesh {
        /// The chunk that was meshed.
        coord: ChunkCoord,
        /// The produced mesh arrays.
        mesh: MeshArrays,
    },
    /// `BuildRegionMesh` succeeded.
    RegionMesh {
        /// The region that was combined.
        region: RegionCoord,
        /// The folded mesh.
        mesh: MeshArrays,
    },
    /// `BuildRegionMesh` found every member empty.
    NothingToBuild {
        /// The region that failed to combine.
        region: RegionCoord,
    },
}

/// A completed job, still tagged with its id so the manager can discard
/// results for jobs it has since cancelled or superseded.
pub struct Completion {
    /// The id of the job that produced this result.
    pub id: JobId,
    /// The result.
    pub output: JobOutput,
}

struct PendingJob {
    id: JobId,
    priority: f32,
    cancelled: Arc<AtomicBool>,
    kind: JobKind,
}

/// A fixed pool of worker threads draining a single priority-ordered job
/// queue.
///
/// Jobs are inserted in priority order (binary search into a sorted
/// deque — O(log n)) and popped from the head (O(1)); this is a required
/// design decision, not an incidental one, since resorting on every pop
/// would defeat the point of a priority queue under a busy render thread.
pub struct WorkerPool {
    pending: Arc<Mutex<VecDeque<PendingJob>>>,
    completed_rx: crossbeam_channel::Receiver<Completion>,
    next_id: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `thread_count` worker threads.
    #[must_use]
    pub fn new(thread_count: usize, table: Arc<VoxelTypeTable>, terrain: Arc<dyn TerrainSource>) -> Self {
        let pending: Arc<Mutex<VecDeque<PendingJob>>> = Arc::new(Mutex::new(VecDeque::new()));
        let (completed_tx, completed_rx) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));

        let handles = (0..thread_count)
            .map(|worker_index| {
                let pending = Arc::clone(&pending);
                let tx = completed_tx.clone();
                let shutdown = Arc::clone(&shutdown);
                let table = Arc::clone(&table);
                let terrain = Arc::clone(&terrain);
                std::thread::Builder::new()
                    .name(format!("voxen-worker-{worker_index}"))
                    .spawn(move || worker_loop(&pending, &tx, &shutdown, &table, terrain.as_ref()))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        drop(completed_tx);

        Self {
            pending,
            completed_rx,
            next_id: Arc::new(AtomicU64::new(1)),
            shutdown,
            handles,
        }
    }

    /// Submits a job at the given priority (higher runs first). Returns a
    /// handle that can be used to cancel it.
    ///
    /// # Errors
    ///
    /// Returns [`voxen_core::VoxelError::PoolShutdown`] if the pool has
    /// begun shutting down.
    pub fn submit(&self, kind: JobKind, priority: f32) -> voxen_core::VoxelResult<(JobId, Arc<AtomicBool>)> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(voxen_core::VoxelError::PoolShutdown);
        }

        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cancelled = Arc::new(AtomicBool::new(false));
        let job = PendingJob { id, priority, cancelled: Arc::clone(&cancelled), kind };

        let mut queue = self.pending.lock();
        let insert_at = queue.partition_point(|existing| existing.priority >= priority);
        queue.insert(insert_at, job);
        drop(queue);

        Ok((id, cancelled))
    }

    /// Drains up to `max` completed jobs without blocking.
    pub fn drain_completed(&self, max: usize) -> Vec<Completion> {
        let mut out = Vec::with_capacity(max);
        for _ in 0..max {
            match self.completed_rx.try_recv() {
                Ok(completion) => out.push(completion),
                Err(_) => break,
            }
        }
        out
    }

    /// Number of jobs waiting to start.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Begins shutdown: no new jobs are accepted, but in-flight and queued
    /// jobs still drain.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

const WORKER_IDLE_SLEEP: Duration = Duration::from_millis(2);

fn worker_loop(
    pending: &Mutex<VecDeque<PendingJob>>,
    completed: &crossbeam_channel::Sender<Completion>,
    shutdown: &AtomicBool,
    table: &VoxelTypeTable,
    terrain: &dyn TerrainSource,
) {
    let mut mesher = GreedyMesher::new();
    loop {
        let job = {
            let mut queue = pending.lock();
            queue.pop_front()
        };

        let Some(job) = job else {
            if shutdown.load(Ordering::Acquire) {
                return;
            }
            std::thread::sleep(WORKER_IDLE_SLEEP);
            continue;
        };

        if job.cancelled.load(Ordering::Acquire) {
            continue;
        }

        let output = run_job(job.kind, &mut mesher, table, terrain);
        let _ = completed.send(Completion { id: job.id, output });
    }
}

fn run_job(kind: JobKind, mesher: &mut GreedyMesher, table: &VoxelTypeTable, terrain: &dyn TerrainSource) -> JobOutput {
    match kind {
        JobKind::GenerateTerrain { coord, side, height, world_seed } => {
            let store = terrain.generate(coord, side, height, world_seed);
            JobOutput::Terrain { coord, store }
        }
        JobKind::BuildChunkMesh { target, neighbors } => {
            let target_chunk = snapshot_to_chunk(&target);
            let neighbor_chunks: Vec<Option<voxen_store::Chunk>> =
                neighbors.iter().map(|n| n.as_ref().map(snapshot_to_chunk)).collect();
            let neighbor_refs: [Option<&voxen_store::Chunk>; 6] = std::array::from_fn(|i| neighbor_chunks[i].as_ref());

            let snapshot = NeighborhoodSnapshot::new(&target_chunk, neighbor_refs);
            let mesh = mesher.mesh(&snapshot, table);
            JobOutput::ChunkMesh { coord: target.coord, mesh }
        }
        JobKind::BuildRegionMesh { region, members } => {
            if members.iter().all(|member| member.mesh.is_empty()) {
                return JobOutput::NothingToBuild { region };
            }
            let mut combined = MeshArrays::empty();
            for member in &members {
                combined.append_offset(&member.mesh, member.offset);
            }
            JobOutput::RegionMesh { region, mesh: combined }
        }
    }
}

fn snapshot_to_chunk(snapshot: &ChunkSnapshot) -> voxen_store::Chunk {
    let mut chunk = voxen_store::Chunk::new_empty(snapshot.coord);
    chunk.install_store(snapshot.store.clone());
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxen_core::Properties;
    use voxen_store::FlatTerrainSource;

    fn table() -> Arc<VoxelTypeTable> {
        Arc::new(
            VoxelTypeTable::builder()
                .register(1, Properties { name: "stone", opaque: true, solid: true, ..Properties::AIR })
                .build(),
        )
    }

    #[test]
    fn submit_and_drain_generate_job() {
        let pool = WorkerPool::new(1, table(), Arc::new(FlatTerrainSource::new(1)));
        let coord = ChunkCoord::new(0, 0, 0);
        pool.submit(JobKind::GenerateTerrain { coord, side: 16, height: 16, world_seed: 1 }, 1.0).unwrap();

        let mut results = Vec::new();
        for _ in 0..50 {
            results.extend(pool.drain_completed(8));
            if !results.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(results.len(), 1);
        match &results[0].output {
            JobOutput::Terrain { coord: c, store } => {
                assert_eq!(*c, coord);
                assert_eq!(store.get(0, 0, 0), 1);
            }
            _ => panic!("expected a terrain result"),
        }
    }

    #[test]
    fn cancelling_a_job_marks_its_flag() {
        let pool = WorkerPool::new(0, table(), Arc::new(FlatTerrainSource::new(0)));
        let coord = ChunkCoord::new(1, 1, 1);
        let (_id, cancelled) = pool.submit(JobKind::GenerateTerrain { coord, side: 16, height: 16, world_seed: 1 }, 1.0).unwrap();
        cancelled.store(true, Ordering::Release);

        let queue = pool.pending.lock();
        assert!(queue[0].cancelled.load(Ordering::Acquire));
    }

    #[test]
    fn submit_after_shutdown_is_rejected() {
        let pool = WorkerPool::new(0, table(), Arc::new(FlatTerrainSource::new(0)));
        pool.shutdown();
        let result = pool.submit(JobKind::GenerateTerrain { coord: ChunkCoord::new(0, 0, 0), side: 16, height: 16, world_seed: 1 }, 1.0);
        assert!(matches!(result, Err(voxen_core::VoxelError::PoolShutdown)));
    }

    #[test]
    fn higher_priority_jobs_are_queued_ahead() {
        let pool = WorkerPool::new(0, table(), Arc::new(FlatTerrainSource::new(0)));
        pool.submit(JobKind::GenerateTerrain { coord: ChunkCoord::new(0, 0, 0), side: 16, height: 16, world_seed: 1 }, 1.0).unwrap();
        pool.submit(JobKind::GenerateTerrain { coord: ChunkCoord::new(1, 0, 0), side: 16, height: 16, world_seed: 1 }, 5.0).unwrap();
        pool.submit(JobKind::GenerateTerrain { coord: ChunkCoord::new(2, 0, 0), side: 16, height: 16, world_seed: 1 }, 3.0).unwrap();

        let queue = pool.pending.lock();
        let priorities: Vec<f32> = queue.iter().map(|job| job.priority).collect();
        assert_eq!(priorities, vec![5.0, 3.0, 1.0]);
    }
}
