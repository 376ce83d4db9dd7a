//! Chunk storage: zoning, cell data, lifecycle, and persistence.
//!
//! This crate owns everything about a chunk's data at rest — it never
//! spawns threads and never touches the renderer. Streaming, scheduling,
//! and meshing live above it.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod chunk;
pub mod mesh_data;
pub mod terrain;
pub mod voxel_store;
pub mod zone;

pub use cache::{CacheKey, ChunkCache, DirChunkCache};
pub use chunk::{Chunk, ChunkState};
pub use mesh_data::MeshArrays;
pub use terrain::{CheckerboardTerrainSource, FlatTerrainSource, TerrainSource};
pub use voxel_store::VoxelStore;
pub use zone::{ChunkCoord, Direction, Zone, CHUNK_SIDE};
