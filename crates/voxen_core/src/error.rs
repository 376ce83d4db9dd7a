//! Cross-cutting error taxonomy.
//!
//! No error kind in this enum is fatal to the process: `OutOfBounds` is the
//! one kind treated as a programmer error (and may legitimately panic at the
//! call site instead of being returned); every other kind is recoverable by
//! the caller (retry, treat-as-air, leave-dirty-for-next-frame).

use thiserror::Error;

/// Errors surfaced by the world engine core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoxelError {
    /// A local voxel index was outside `[0, S)` horizontally or `[0, H)`
    /// vertically. Indicates a programmer error at the call site.
    #[error("out of bounds: ({x}, {y}, {z}) is outside the chunk's [0, {max_x}) x [0, {max_y}) x [0, {max_z}) extent")]
    OutOfBounds {
        /// The X coordinate that was queried.
        x: i32,
        /// The Y coordinate that was queried.
        y: i32,
        /// The Z coordinate that was queried.
        z: i32,
        /// The exclusive upper bound on X.
        max_x: i32,
        /// The exclusive upper bound on Y.
        max_y: i32,
        /// The exclusive upper bound on Z.
        max_z: i32,
    },

    /// An operation referenced a chunk that is no longer active.
    #[error("chunk is not active")]
    Unloaded,

    /// A mesh job observed a neighbor chunk transition mid-run.
    #[error("neighbor chunk changed identity while meshing")]
    StaleNeighbor,

    /// A region combine job observed a weak chunk reference cleared
    /// mid-combine.
    #[error("a region member was detached mid-combine")]
    MemberGone,

    /// Persistence failed. Treated as a cache miss on read, logged and
    /// dropped on write.
    #[error("chunk cache I/O failed: {0}")]
    CacheIoError(String),

    /// The terrain source failed to produce a chunk.
    #[error("terrain generation failed: {0}")]
    TerrainSourceError(String),

    /// A job was enqueued after the worker pool began shutting down.
    #[error("worker pool has shut down")]
    PoolShutdown,
}

/// Result type used throughout the world engine.
pub type VoxelResult<T> = Result<T, VoxelError>;
