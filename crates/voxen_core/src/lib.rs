//! # VOXEN Core
//!
//! Process-wide primitives shared by every other crate in the workspace:
//! the voxel type registry, the error taxonomy, minimal 3D math, and the
//! generation-tagged object pool used to recycle chunks.
//!
//! Nothing in this crate touches threads, the filesystem, or a rendering
//! backend. It is the one crate every other crate in the workspace depends
//! on.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod math;
pub mod pool;
pub mod types;

pub use error::{VoxelError, VoxelResult};
pub use math::{Aabb, Vec3};
pub use pool::{Pool, PoolHandle};
pub use types::{Properties, Rgba, VoxelId, VoxelTypeTable, AIR};
